use anyhow::Result;
use clap::Parser;
use schemabridge::cli::commands::create_table::{CreateTableCommand, CreateTableCommandHandler};
use schemabridge::cli::commands::generate_ddl::{GenerateDdlCommand, GenerateDdlCommandHandler};
use schemabridge::cli::commands::insert::{cancel_on_ctrl_c, InsertCommand, InsertCommandHandler};
use schemabridge::cli::commands::introspect::{IntrospectCommand, IntrospectCommandHandler};
use schemabridge::cli::commands::render_outcome;
use schemabridge::cli::{Cli, Commands};
use schemabridge::core::config::Dialect;
use schemabridge::services::step::StepOutcome;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create Tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(outcome) => {
            let output = render_outcome(&outcome);
            if outcome.is_success() {
                if !output.is_empty() {
                    println!("{}", output);
                }
            } else {
                eprintln!("{}", output);
            }
            process::exit(outcome.exit_code());
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化（RUST_LOGが優先、--verboseでdebugレベル）
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("schemabridge=debug")
        } else {
            EnvFilter::new("schemabridge=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<StepOutcome<String>> {
    let config_path = cli.config;

    match cli.command {
        Commands::CreateTable { connection, schema } => {
            let handler = CreateTableCommandHandler::new();
            let command = CreateTableCommand {
                config_path,
                connection,
                schema_path: schema,
            };
            handler.execute(&command).await
        }

        Commands::GenerateDdl { dialect, schema } => {
            let dialect: Dialect = dialect.parse()?;
            let handler = GenerateDdlCommandHandler::new();
            let command = GenerateDdlCommand {
                dialect,
                schema_path: schema,
            };
            handler.execute(&command)
        }

        Commands::Introspect {
            connection,
            table,
            db_schema,
        } => {
            let handler = IntrospectCommandHandler::new();
            let command = IntrospectCommand {
                config_path,
                connection,
                table,
                db_schema,
            };
            handler.execute(&command).await
        }

        Commands::Insert {
            connection,
            schema,
            records,
            db_schema,
        } => {
            let handler = InsertCommandHandler::new();
            let command = InsertCommand {
                config_path,
                connection,
                schema_path: schema,
                records_path: records,
                db_schema,
            };
            let cancel = cancel_on_ctrl_c();
            handler.execute(&command, &cancel).await
        }
    }
}
