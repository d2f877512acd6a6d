// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SchemaBridge - Portable table schemas for five SQL dialects
#[derive(Parser, Debug)]
#[command(name = "schemabridge")]
#[command(author = "SchemaBridge Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate portable table schemas to SQL, introspect tables and bulk-insert records")]
#[command(long_about = "SchemaBridge - Portable table schemas for five SQL dialects

SchemaBridge helps you:
  • Generate CREATE TABLE statements from a dialect-agnostic schema
  • Create tables on SQLite, SQL Server, PostgreSQL, MySQL and MariaDB
  • Recover a portable schema from an existing table
  • Insert records in batches that respect each driver's parameter limit")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Describe your connections:   edit schemabridge.yaml
  2. Preview the DDL:             schemabridge generate-ddl --dialect sqlite --schema users.yaml
  3. Create the table:            schemabridge create-table --connection local --schema users.yaml
  4. Load records:                schemabridge insert --connection local --schema users.yaml --records users.json

For detailed help on each command, use: schemabridge <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a table from a portable schema
    ///
    /// EXAMPLES:
    ///   schemabridge create-table --connection local --schema users.yaml
    CreateTable {
        /// Connection name from the config file
        #[arg(long, value_name = "NAME")]
        connection: String,

        /// Schema file (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,
    },

    /// Print the CREATE TABLE statement for a schema without connecting
    ///
    /// EXAMPLES:
    ///   schemabridge generate-ddl --dialect postgres --schema users.yaml
    GenerateDdl {
        /// Target dialect (sqlite, mssql, postgres, mysql, mariadb)
        #[arg(short, long, value_name = "DIALECT")]
        dialect: String,

        /// Schema file (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,
    },

    /// Recover the portable schema of an existing table
    ///
    /// EXAMPLES:
    ///   schemabridge introspect --connection warehouse --table Orders --db-schema sales
    Introspect {
        /// Connection name from the config file
        #[arg(long, value_name = "NAME")]
        connection: String,

        /// Table name
        #[arg(short, long, value_name = "TABLE")]
        table: String,

        /// Database schema qualifier (PostgreSQL only)
        #[arg(long, value_name = "SCHEMA")]
        db_schema: Option<String>,
    },

    /// Insert records (JSON array of objects) into a table
    ///
    /// Records are sent in batches; Ctrl-C stops before the next batch.
    ///
    /// EXAMPLES:
    ///   schemabridge insert --connection local --schema users.yaml --records users.json
    Insert {
        /// Connection name from the config file
        #[arg(long, value_name = "NAME")]
        connection: String,

        /// Schema file (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,

        /// Records file (JSON array of objects)
        #[arg(long, value_name = "FILE")]
        records: PathBuf,

        /// Database schema qualifier
        #[arg(long, value_name = "SCHEMA")]
        db_schema: Option<String>,
    },
}
