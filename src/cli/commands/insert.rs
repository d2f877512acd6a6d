// insertコマンドハンドラー
//
// JSONのレコード配列をバッチ単位で挿入します。
// Ctrl-Cを受け取ると次のバッチの前に中断します。

use crate::cli::command_context::{load_records, load_schema, CommandContext};
use crate::services::step::StepOutcome;
use crate::services::table_service::TableService;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// insertコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct InsertCommand {
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 接続名
    pub connection: String,
    /// スキーマファイルのパス
    pub schema_path: PathBuf,
    /// レコードファイルのパス
    pub records_path: PathBuf,
    /// スキーマ修飾子
    pub db_schema: Option<String>,
}

/// insertコマンドハンドラー
#[derive(Debug, Clone)]
pub struct InsertCommandHandler {
    service: TableService,
}

impl InsertCommandHandler {
    /// 標準ドライバーを使うハンドラーを作成
    pub fn new() -> Self {
        Self::with_service(TableService::with_default_drivers())
    }

    /// 任意のTableServiceを使うハンドラーを作成
    pub fn with_service(service: TableService) -> Self {
        Self { service }
    }

    /// insertコマンドを実行
    ///
    /// # Arguments
    ///
    /// * `command` - insertコマンドのパラメータ
    /// * `cancel` - 中断要求を受け取るトークン
    pub async fn execute(
        &self,
        command: &InsertCommand,
        cancel: &CancellationToken,
    ) -> Result<StepOutcome<String>> {
        let context = CommandContext::load(command.config_path.clone())?;
        let connection = context.connection(&command.connection)?;
        let schema = load_schema(&command.schema_path)?;
        let records = load_records(&command.records_path)?;
        let count = records.len();

        let outcome: StepOutcome<u64> = self
            .service
            .insert_records(
                connection,
                &schema,
                records,
                command.db_schema.as_deref(),
                cancel,
            )
            .await
            .into();

        Ok(outcome.map(|affected| {
            format!(
                "{} Inserted {} of {} records into {}",
                "✓".green(),
                affected,
                count,
                schema.name.bold()
            )
        }))
    }
}

impl Default for InsertCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Ctrl-Cでキャンセルされるトークンを作成
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping before the next batch");
            child.cancel();
        }
    });
    token
}
