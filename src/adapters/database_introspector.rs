// データベースイントロスペクター
//
// 既存テーブルからポータブルスキーマを復元します。
// SQLiteは保存されたCREATE TABLE文を解析し、それ以外の方言は
// INFORMATION_SCHEMA.COLUMNS を問い合わせて型文字列を逆マッピングします。

use crate::adapters::database::{DbConnection, DbType, SqlCommand};
use crate::adapters::sql_quote::validate_identifier;
use crate::adapters::sqlite_ddl_parser::parse_create_table;
use crate::adapters::type_mapping::{parse_sqlite_type_keyword, TypeMappingService};
use crate::core::config::Dialect;
use crate::core::error::{EngineError, IntrospectionParseError, UnsupportedTypeError};
use crate::core::record::{Record, Value};
use crate::core::schema::{ExtraPropertyBehavior, Multiplicity, Schema, SchemaProperty};
use tracing::{debug, info};

/// データベースイントロスペクター
#[derive(Debug, Clone, Copy)]
pub struct DatabaseIntrospector {
    dialect: Dialect,
    type_mapping: TypeMappingService,
}

impl DatabaseIntrospector {
    /// 新しいDatabaseIntrospectorを作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            type_mapping: TypeMappingService::new(dialect),
        }
    }

    /// イントロスペクション用のクエリを組み立てる
    ///
    /// テーブル名と修飾子はクエリに渡す前に検証します。
    /// スキーマ修飾子で絞り込むのはPostgreSQLのみで、省略時は current_schema() に限定します。
    /// SQLiteのテーブル名は大文字小文字を区別せずに照合します。
    pub fn build_query(&self, table: &str, qualifier: Option<&str>) -> Result<SqlCommand, EngineError> {
        validate_identifier(table)?;
        if let Some(schema) = qualifier {
            validate_identifier(schema)?;
        }

        let text = match self.dialect {
            Dialect::SQLite => {
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE"
                    .to_string()
            }
            Dialect::MsSql => r#"
                SELECT COLUMN_NAME, IS_NULLABLE, DATA_TYPE
                FROM INFORMATION_SCHEMA.COLUMNS
                WHERE TABLE_NAME = @P1
                ORDER BY ORDINAL_POSITION
            "#
            .to_string(),
            Dialect::Postgres => {
                let scope = if qualifier.is_some() {
                    "$2"
                } else {
                    "current_schema()"
                };
                format!(
                    r#"
                SELECT column_name::text, is_nullable::text, data_type::text
                FROM information_schema.columns
                WHERE table_name = $1 AND table_schema = {}
                ORDER BY ordinal_position
            "#,
                    scope
                )
            }
            Dialect::MySql | Dialect::MariaDb => r#"
                SELECT CAST(COLUMN_NAME AS CHAR), CAST(IS_NULLABLE AS CHAR), CAST(DATA_TYPE AS CHAR)
                FROM INFORMATION_SCHEMA.COLUMNS
                WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
                ORDER BY ORDINAL_POSITION
            "#
            .to_string(),
        };

        let mut command = SqlCommand::new(text);
        command.add_parameter("p1", Value::String(table.to_string()), DbType::String);
        if let (Dialect::Postgres, Some(schema)) = (self.dialect, qualifier) {
            command.add_parameter("p2", Value::String(schema.to_string()), DbType::String);
        }
        Ok(command)
    }

    /// テーブルのスキーマを取得
    ///
    /// 最初にマッピングできなかったカラムのエラーで中断します。
    ///
    /// # Arguments
    ///
    /// * `table` - テーブル名
    /// * `connection` - 開いている接続
    /// * `qualifier` - スキーマ修飾子（任意）
    pub async fn introspect(
        &self,
        table: &str,
        connection: &mut dyn DbConnection,
        qualifier: Option<&str>,
    ) -> Result<Schema, EngineError> {
        let command = self.build_query(table, qualifier)?;
        debug!(dialect = %self.dialect, table, "introspecting table");

        let rows = connection.execute_reader(&command).await?;

        let schema = match self.dialect {
            Dialect::SQLite => self.schema_from_stored_ddl(table, &rows)?,
            _ => self.schema_from_column_rows(table, &rows)?,
        };

        info!(
            dialect = %self.dialect,
            table,
            columns = schema.property_count(),
            "introspected table"
        );
        Ok(schema)
    }

    /// sqlite_master の行からスキーマを復元
    pub fn schema_from_stored_ddl(&self, table: &str, rows: &[Record]) -> Result<Schema, EngineError> {
        let ddl = match rows {
            [row] => row.value_at(0).and_then(Value::as_str),
            _ => None,
        }
        .ok_or_else(|| IntrospectionParseError {
            table: table.to_string(),
            message: format!("expected exactly one stored definition, found {}", rows.len()),
        })?;

        let parsed = parse_create_table(table, ddl)?;

        let mut schema = closed_schema(table);
        for column in parsed.columns {
            let property_type = parse_sqlite_type_keyword(&column.type_keyword).ok_or_else(|| {
                UnsupportedTypeError::NativeType {
                    type_name: column.type_keyword.clone(),
                    column: Some(column.name.clone()),
                    dialect: Dialect::SQLite,
                }
            })?;
            let multiplicity = Multiplicity::from_nullable(!column.not_null);
            schema.add_property(SchemaProperty::new(column.name, property_type, multiplicity))?;
        }
        Ok(schema)
    }

    /// INFORMATION_SCHEMA の行（カラム名, NULL可否, 型名）からスキーマを復元
    pub fn schema_from_column_rows(&self, table: &str, rows: &[Record]) -> Result<Schema, EngineError> {
        if rows.is_empty() {
            return Err(IntrospectionParseError {
                table: table.to_string(),
                message: "table does not exist or has no columns".to_string(),
            }
            .into());
        }

        let mut schema = closed_schema(table);
        for row in rows {
            let text_at = |index: usize| {
                row.value_at(index).and_then(Value::as_str).ok_or_else(|| IntrospectionParseError {
                    table: table.to_string(),
                    message: format!("column metadata field {} is missing or not text", index + 1),
                })
            };

            let name = text_at(0)?;
            let nullable = text_at(1)?.eq_ignore_ascii_case("YES");
            let property_type = self.type_mapping.from_native_type(text_at(2)?, name)?;

            schema.add_property(SchemaProperty::new(
                name,
                property_type,
                Multiplicity::from_nullable(nullable),
            ))?;
        }
        Ok(schema)
    }
}

/// 追加プロパティを許可しないスキーマ
fn closed_schema(table: &str) -> Schema {
    Schema::new(table).with_extra_properties(ExtraPropertyBehavior::Fail)
}

/// テーブルのスキーマを取得する
pub async fn introspect(
    table: &str,
    dialect: Dialect,
    connection: &mut dyn DbConnection,
    qualifier: Option<&str>,
) -> Result<Schema, EngineError> {
    DatabaseIntrospector::new(dialect)
        .introspect(table, connection, qualifier)
        .await
}
