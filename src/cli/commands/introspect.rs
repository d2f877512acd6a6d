// introspectコマンドハンドラー
//
// 既存テーブルのスキーマを取得し、YAMLとして表示します。

use crate::cli::command_context::CommandContext;
use crate::services::step::StepOutcome;
use crate::services::table_service::TableService;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// introspectコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct IntrospectCommand {
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 接続名
    pub connection: String,
    /// テーブル名
    pub table: String,
    /// スキーマ修飾子
    pub db_schema: Option<String>,
}

/// introspectコマンドハンドラー
#[derive(Debug, Clone)]
pub struct IntrospectCommandHandler {
    service: TableService,
}

impl IntrospectCommandHandler {
    /// 標準ドライバーを使うハンドラーを作成
    pub fn new() -> Self {
        Self::with_service(TableService::with_default_drivers())
    }

    /// 任意のTableServiceを使うハンドラーを作成
    pub fn with_service(service: TableService) -> Self {
        Self { service }
    }

    /// introspectコマンドを実行
    pub async fn execute(&self, command: &IntrospectCommand) -> Result<StepOutcome<String>> {
        let context = CommandContext::load(command.config_path.clone())?;
        let connection = context.connection(&command.connection)?;

        let result = self
            .service
            .introspect_table(connection, &command.table, command.db_schema.as_deref())
            .await;

        match result {
            Ok(schema) => {
                let yaml = serde_saphyr::to_string(&schema)
                    .with_context(|| format!("Failed to serialize schema '{}'", schema.name))?;
                Ok(StepOutcome::Success(yaml))
            }
            Err(e) => Ok(StepOutcome::from(Err::<String, _>(e))),
        }
    }
}

impl Default for IntrospectCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
