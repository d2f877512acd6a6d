// create-tableコマンドハンドラー
//
// スキーマファイルを読み込み、設定ファイルの接続先にテーブルを作成します。

use crate::cli::command_context::{load_schema, CommandContext};
use crate::services::step::StepOutcome;
use crate::services::table_service::TableService;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// create-tableコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct CreateTableCommand {
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 接続名
    pub connection: String,
    /// スキーマファイルのパス
    pub schema_path: PathBuf,
}

/// create-tableコマンドハンドラー
#[derive(Debug, Clone)]
pub struct CreateTableCommandHandler {
    service: TableService,
}

impl CreateTableCommandHandler {
    /// 標準ドライバーを使うハンドラーを作成
    pub fn new() -> Self {
        Self::with_service(TableService::with_default_drivers())
    }

    /// 任意のTableServiceを使うハンドラーを作成
    pub fn with_service(service: TableService) -> Self {
        Self { service }
    }

    /// create-tableコマンドを実行
    pub async fn execute(&self, command: &CreateTableCommand) -> Result<StepOutcome<String>> {
        let context = CommandContext::load(command.config_path.clone())?;
        let connection = context.connection(&command.connection)?;
        let schema = load_schema(&command.schema_path)?;

        let outcome: StepOutcome<u64> = self.service.create_table(connection, &schema).await.into();

        Ok(outcome.map(|_| {
            format!(
                "{} Created table {} on '{}' ({})",
                "✓".green(),
                schema.name.bold(),
                command.connection,
                connection.dialect
            )
        }))
    }
}

impl Default for CreateTableCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
