// generate-ddlコマンドハンドラー
//
// 接続せずにCREATE TABLE文を生成して表示します。

use crate::adapters::sql_generator::CreateTableGenerator;
use crate::cli::command_context::load_schema;
use crate::core::config::Dialect;
use crate::core::error::ErrorList;
use crate::services::step::StepOutcome;
use anyhow::Result;
use std::path::PathBuf;

/// generate-ddlコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct GenerateDdlCommand {
    /// 対象方言
    pub dialect: Dialect,
    /// スキーマファイルのパス
    pub schema_path: PathBuf,
}

/// generate-ddlコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct GenerateDdlCommandHandler {}

impl GenerateDdlCommandHandler {
    /// 新しいGenerateDdlCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// generate-ddlコマンドを実行
    ///
    /// 検証エラーはすべてまとめて UserError として返します。
    pub fn execute(&self, command: &GenerateDdlCommand) -> Result<StepOutcome<String>> {
        let schema = load_schema(&command.schema_path)?;

        let result = CreateTableGenerator::new(command.dialect)
            .build_create_table(&schema)
            .map_err(ErrorList::into_engine_error);

        Ok(result.into())
    }
}
