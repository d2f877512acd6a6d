// SQL生成アダプター
//
// ポータブルスキーマから各方言用のCREATE TABLE文とINSERT文を生成します。
// 方言ごとの差異（改行・カンマの位置）は方言別モジュールのレイアウト関数に閉じ込めます。

pub mod insert;
mod mssql;
mod mysql;
mod postgres;
mod sqlite;

use crate::adapters::sql_quote::quote_for_ddl;
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::Dialect;
use crate::core::error::{ErrorList, SchemaConstraintError};
use crate::core::schema::{ExtraPropertyBehavior, Multiplicity, Schema, SchemaProperty};
use tracing::debug;

/// 検証済みのカラム定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnDefinition {
    /// クォート済みカラム名
    pub name: String,
    /// ネイティブ型
    pub native_type: &'static str,
    /// NULL制約
    pub null_clause: &'static str,
}

impl ColumnDefinition {
    /// `<name> <type> <constraint>` 形式に組み立てる
    pub fn render(&self) -> String {
        format!("{} {} {}", self.name, self.native_type, self.null_clause)
    }
}

/// 多重度をNULL制約句に変換
///
/// ExactlyOne -> `NOT NULL`、UpToOne -> `NULL`。それ以外はエラー。
pub fn null_clause(
    column: &str,
    multiplicity: Multiplicity,
) -> Result<&'static str, SchemaConstraintError> {
    match multiplicity.nullable() {
        Some(false) => Ok("NOT NULL"),
        Some(true) => Ok("NULL"),
        None => Err(SchemaConstraintError::UnsupportedMultiplicity {
            column: column.to_string(),
            multiplicity,
        }),
    }
}

/// CREATE TABLE ジェネレーター
#[derive(Debug, Clone)]
pub struct CreateTableGenerator {
    dialect: Dialect,
    type_mapping: TypeMappingService,
}

impl CreateTableGenerator {
    /// 新しいCreateTableGeneratorを作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            type_mapping: TypeMappingService::new(dialect),
        }
    }

    /// 方言を取得
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// CREATE TABLE文を生成
    ///
    /// 最初のエラーで中断せず、スキーマ全体の問題をすべて収集します。
    /// 問題のあるカラムは出力から除外され、残りのカラムの検査は続行されます。
    ///
    /// # Returns
    ///
    /// CREATE TABLE文、またはすべてのエラーを含むErrorList
    pub fn build_create_table(&self, schema: &Schema) -> Result<String, ErrorList> {
        let mut errors = ErrorList::new();

        if schema.extra_properties == ExtraPropertyBehavior::Allow {
            errors.push(SchemaConstraintError::ExtraPropertiesAllowed {
                schema: schema.name.clone(),
            });
        }

        let table_name = match quote_for_ddl(&schema.name, self.dialect) {
            Ok(name) => Some(name),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if schema.properties.is_empty() {
            errors.push(SchemaConstraintError::NoProperties {
                schema: schema.name.clone(),
            });
        }

        for duplicate in schema.duplicate_property_names() {
            errors.push(SchemaConstraintError::DuplicateProperty {
                column: duplicate.to_string(),
            });
        }

        let mut columns = Vec::with_capacity(schema.property_count());
        for property in &schema.properties {
            match self.column_definition(property) {
                Ok(column) => columns.push(column),
                Err(column_errors) => {
                    for e in column_errors {
                        errors.push(e);
                    }
                }
            }
        }

        let table_name = match table_name {
            Some(name) if errors.is_empty() => name,
            _ => return Err(errors),
        };

        let sql = match self.dialect {
            Dialect::SQLite => sqlite::render_create_table(&table_name, &columns),
            Dialect::MsSql => mssql::render_create_table(&table_name, &columns),
            Dialect::Postgres => postgres::render_create_table(&table_name, &columns),
            Dialect::MySql | Dialect::MariaDb => mysql::render_create_table(&table_name, &columns),
        };

        debug!(dialect = %self.dialect, table = %schema.name, "generated CREATE TABLE: {}", sql);
        Ok(sql)
    }

    /// 1プロパティ分のカラム定義を組み立てる（型・多重度・名前のエラーをすべて収集）
    fn column_definition(&self, property: &SchemaProperty) -> Result<ColumnDefinition, ErrorList> {
        let mut errors = ErrorList::new();

        let native_type = self
            .type_mapping
            .to_native_type(&property.property_type)
            .map_err(|e| errors.push(e.with_column(&property.name)))
            .ok();

        let null_clause = null_clause(&property.name, property.multiplicity)
            .map_err(|e| errors.push(e))
            .ok();

        let name = quote_for_ddl(&property.name, self.dialect)
            .map_err(|e| errors.push(e))
            .ok();

        match (name, native_type, null_clause) {
            (Some(name), Some(native_type), Some(null_clause)) => Ok(ColumnDefinition {
                name,
                native_type,
                null_clause,
            }),
            _ => Err(errors),
        }
    }
}

/// CREATE TABLE文を生成する
pub fn build_create_table(schema: &Schema, dialect: Dialect) -> Result<String, ErrorList> {
    CreateTableGenerator::new(dialect).build_create_table(schema)
}
