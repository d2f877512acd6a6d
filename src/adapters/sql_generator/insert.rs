// INSERTバッチビルダー
//
// レコード列をバインドパラメータ数の上限に収まるバッチに分割し、
// バッチごとに1つのパラメータ化されたINSERT文を組み立てます。
// バッチは遅延生成され、呼び出し元が1つずつ順番に実行します。

use crate::adapters::database::{DbType, SqlCommand};
use crate::adapters::sql_generator::null_clause;
use crate::adapters::sql_quote::{qualified_table_name, quote_columns, validate_identifier};
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::{Dialect, MAX_BOUND_PARAMETERS};
use crate::core::error::{EngineError, ErrorList, SchemaConstraintError};
use crate::core::record::{apply_schema, Record};
use crate::core::schema::Schema;
use tracing::{debug, warn};

/// 1バッチ分のINSERT文
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// SQL文とバインドパラメータ
    pub command: SqlCommand,
    /// バッチに含まれるレコード数
    pub row_count: usize,
    /// バッチ番号（0始まり）
    pub batch_index: usize,
}

/// INSERTバッチビルダー
#[derive(Debug, Clone)]
pub struct InsertBatchBuilder {
    schema: Schema,
    dialect: Dialect,
    table: String,
    columns: String,
    db_types: Vec<DbType>,
    max_parameters: usize,
}

impl InsertBatchBuilder {
    /// 新しいInsertBatchBuilderを作成
    ///
    /// テーブル名・修飾子・カラム名・カラム型をここで検証するため、
    /// 以降のバッチ生成で失敗するのはレコード値の不適合だけです。
    ///
    /// # Arguments
    ///
    /// * `schema` - 挿入先テーブルのスキーマ
    /// * `dialect` - 対象方言
    /// * `qualifier` - スキーマ修飾子（任意）
    pub fn new(
        schema: &Schema,
        dialect: Dialect,
        qualifier: Option<&str>,
    ) -> Result<Self, EngineError> {
        let quoting = dialect.quotes_insert_identifiers();
        let type_mapping = TypeMappingService::new(dialect);
        let mut errors = ErrorList::new();

        let table = qualified_table_name(qualifier, &schema.name, quoting)
            .map_err(|e| errors.push(e))
            .ok();

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

        let mut db_types = Vec::with_capacity(schema.property_count());
        for property in &schema.properties {
            if let Err(e) = validate_identifier(&property.name) {
                errors.push(e);
            }
            // 単一カラムに格納できない多重度はSQLを発行する前に拒否
            if let Err(e) = null_clause(&property.name, property.multiplicity) {
                errors.push(e);
            }
            match type_mapping.db_type(&property.property_type) {
                Ok(db_type) => db_types.push(db_type),
                Err(e) => errors.push(e.with_column(&property.name)),
            }
        }

        let table = match table {
            Some(table) if errors.is_empty() => table,
            _ => return Err(errors.into_engine_error()),
        };

        let columns = quote_columns(schema.properties.iter().map(|p| p.name.as_str()), quoting);

        Ok(Self {
            schema: schema.clone(),
            dialect,
            table,
            columns,
            db_types,
            max_parameters: MAX_BOUND_PARAMETERS,
        })
    }

    /// パラメータ数の上限を変更したビルダーを返す
    pub fn with_max_parameters(mut self, max_parameters: usize) -> Self {
        self.max_parameters = max_parameters;
        self
    }

    /// 方言を取得
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 1バッチあたりのレコード数
    ///
    /// `floor(max_parameters / カラム数)`。1レコードだけで上限を超える場合でも
    /// 1を返し、ドライバー側のエラーに委ねます。
    pub fn batch_size(&self) -> usize {
        let column_count = self.db_types.len().max(1);
        let size = self.max_parameters / column_count;
        if size == 0 {
            warn!(
                columns = column_count,
                max_parameters = self.max_parameters,
                "a single record exceeds the bound parameter limit"
            );
            return 1;
        }
        size
    }

    /// 1バッチ分のINSERT文を組み立てる
    ///
    /// バッチ内のすべてのレコードにスキーマを適用し、不適合はすべて収集します。
    /// 1件でも不適合があればバッチ全体が失敗します。
    ///
    /// # Arguments
    ///
    /// * `records` - バッチのレコード
    /// * `first_row` - 先頭レコードの入力全体での位置（エラー報告用）
    /// * `batch_index` - バッチ番号
    pub fn build_statement(
        &self,
        records: &[Record],
        first_row: usize,
        batch_index: usize,
    ) -> Result<InsertStatement, ErrorList> {
        let mut errors = ErrorList::new();
        let mut rows = Vec::with_capacity(records.len());

        for (offset, record) in records.iter().enumerate() {
            match apply_schema(&self.schema, record, first_row + offset) {
                Ok(row) => rows.push(row),
                Err(record_errors) => {
                    for e in record_errors {
                        errors.push(e);
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut command = SqlCommand::default();
        let mut value_rows = Vec::with_capacity(rows.len());
        let mut ordinal = 0;

        for row in rows {
            let mut placeholders = Vec::with_capacity(self.db_types.len());
            for ((_, value), db_type) in row.iter().zip(&self.db_types) {
                ordinal += 1;
                placeholders.push(self.dialect.placeholder(ordinal));
                command.add_parameter(format!("p{}", ordinal), value.clone(), *db_type);
            }
            value_rows.push(format!("({})", placeholders.join(", ")));
        }

        command.text = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            self.columns,
            value_rows.join(", ")
        );

        debug!(
            table = %self.table,
            batch = batch_index,
            rows = records.len(),
            parameters = command.parameters.len(),
            "built INSERT batch"
        );

        Ok(InsertStatement {
            command,
            row_count: records.len(),
            batch_index,
        })
    }

    /// レコード列をバッチの遅延シーケンスに変換
    pub fn into_batches<I>(self, records: I) -> InsertBatches<I::IntoIter>
    where
        I: IntoIterator<Item = Record>,
    {
        let batch_size = self.batch_size();
        InsertBatches {
            builder: self,
            records: records.into_iter(),
            batch_size,
            next_row: 0,
            next_batch: 0,
        }
    }
}

/// INSERTバッチの遅延シーケンス
///
/// `next()` のたびに最大 `batch_size` 件のレコードを入力から取り出します。
#[derive(Debug)]
pub struct InsertBatches<I> {
    builder: InsertBatchBuilder,
    records: I,
    batch_size: usize,
    next_row: usize,
    next_batch: usize,
}

impl<I> InsertBatches<I> {
    /// 1バッチあたりのレコード数
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<I: Iterator<Item = Record>> Iterator for InsertBatches<I> {
    type Item = Result<InsertStatement, ErrorList>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk: Vec<Record> = self.records.by_ref().take(self.batch_size).collect();
        if chunk.is_empty() {
            return None;
        }

        let first_row = self.next_row;
        let batch_index = self.next_batch;
        self.next_row += chunk.len();
        self.next_batch += 1;

        Some(self.builder.build_statement(&chunk, first_row, batch_index))
    }
}

/// INSERTバッチの遅延シーケンスを作成する
pub fn build_insert_batches<I>(
    schema: &Schema,
    records: I,
    dialect: Dialect,
    qualifier: Option<&str>,
) -> Result<InsertBatches<I::IntoIter>, EngineError>
where
    I: IntoIterator<Item = Record>,
{
    Ok(InsertBatchBuilder::new(schema, dialect, qualifier)?.into_batches(records))
}
