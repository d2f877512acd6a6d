// SQLiteドライバー（sqlx）

use super::{bind_parameters, execution_error, first_value};
use crate::adapters::database::{ConnectionFactory, DbConnection, SqlCommand};
use crate::core::config::Dialect;
use crate::core::error::{ConnectionError, ExecutionError};
use crate::core::record::{Record, Value};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};
use tracing::debug;

/// SQLite接続ファクトリ
///
/// 接続文字列は sqlx の形式（例: `sqlite://data.db?mode=rwc`, `sqlite::memory:`）です。
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnectionFactory;

#[async_trait]
impl ConnectionFactory for SqliteConnectionFactory {
    async fn open(&self, url: &str) -> Result<Box<dyn DbConnection>, ConnectionError> {
        let conn = SqliteConnection::connect(url)
            .await
            .map_err(|e| ConnectionError {
                dialect: Dialect::SQLite,
                message: e.to_string(),
            })?;
        debug!("opened SQLite connection");
        Ok(Box::new(SqliteDbConnection { conn }))
    }
}

/// SQLite接続
pub struct SqliteDbConnection {
    conn: SqliteConnection,
}

#[async_trait]
impl DbConnection for SqliteDbConnection {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    async fn execute_non_query(&mut self, command: &SqlCommand) -> Result<u64, ExecutionError> {
        let result = bind_parameters(sqlx::query(&command.text), &command.parameters)
            .execute(&mut self.conn)
            .await
            .map_err(|e| execution_error(Dialect::SQLite, &command.text, e))?;
        Ok(result.rows_affected())
    }

    async fn execute_reader(&mut self, command: &SqlCommand) -> Result<Vec<Record>, ExecutionError> {
        let rows = bind_parameters(sqlx::query(&command.text), &command.parameters)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| execution_error(Dialect::SQLite, &command.text, e))?;

        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| execution_error(Dialect::SQLite, &command.text, e))
    }

    async fn execute_scalar(&mut self, command: &SqlCommand) -> Result<Option<Value>, ExecutionError> {
        Ok(first_value(self.execute_reader(command).await?))
    }

    async fn close(self: Box<Self>) -> Result<(), ExecutionError> {
        self.conn
            .close()
            .await
            .map_err(|e| ExecutionError::new(Dialect::SQLite, e.to_string()))
    }
}

/// 行をレコードに変換（値ごとのストレージクラスで判定）
fn decode_row(row: &SqliteRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::Integer(row.try_get_unchecked::<i64, _>(i)?),
                "REAL" => Value::Double(row.try_get_unchecked::<f64, _>(i)?),
                _ => Value::String(row.try_get_unchecked::<String, _>(i)?),
            }
        };
        record.insert(column.name(), value);
    }
    Ok(record)
}
