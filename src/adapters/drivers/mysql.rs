// MySQL / MariaDBドライバー（sqlx）
//
// MariaDBはMySQLプロトコル互換のため同じ実装を使い、方言だけを切り替えます。

use super::{bind_parameters, execution_error, first_value};
use crate::adapters::database::{ConnectionFactory, DbConnection, SqlCommand};
use crate::core::config::Dialect;
use crate::core::error::{ConnectionError, ExecutionError};
use crate::core::record::{Record, Value};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Row, TypeInfo};
use tracing::debug;

/// MySQL / MariaDB接続ファクトリ
#[derive(Debug, Clone, Copy)]
pub struct MySqlConnectionFactory {
    dialect: Dialect,
}

impl MySqlConnectionFactory {
    /// 指定した方言（MySql または MariaDb）のファクトリを作成
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

#[async_trait]
impl ConnectionFactory for MySqlConnectionFactory {
    async fn open(&self, url: &str) -> Result<Box<dyn DbConnection>, ConnectionError> {
        let conn = MySqlConnection::connect(url)
            .await
            .map_err(|e| ConnectionError {
                dialect: self.dialect,
                message: e.to_string(),
            })?;
        debug!(dialect = %self.dialect, "opened MySQL protocol connection");
        Ok(Box::new(MySqlDbConnection {
            conn,
            dialect: self.dialect,
        }))
    }
}

/// MySQL / MariaDB接続
pub struct MySqlDbConnection {
    conn: MySqlConnection,
    dialect: Dialect,
}

#[async_trait]
impl DbConnection for MySqlDbConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute_non_query(&mut self, command: &SqlCommand) -> Result<u64, ExecutionError> {
        let result = bind_parameters(sqlx::query(&command.text), &command.parameters)
            .execute(&mut self.conn)
            .await
            .map_err(|e| execution_error(self.dialect, &command.text, e))?;
        Ok(result.rows_affected())
    }

    async fn execute_reader(&mut self, command: &SqlCommand) -> Result<Vec<Record>, ExecutionError> {
        let rows = bind_parameters(sqlx::query(&command.text), &command.parameters)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| execution_error(self.dialect, &command.text, e))?;

        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| execution_error(self.dialect, &command.text, e))
    }

    async fn execute_scalar(&mut self, command: &SqlCommand) -> Result<Option<Value>, ExecutionError> {
        Ok(first_value(self.execute_reader(command).await?))
    }

    async fn close(self: Box<Self>) -> Result<(), ExecutionError> {
        let dialect = self.dialect;
        self.conn
            .close()
            .await
            .map_err(|e| ExecutionError::new(dialect, e.to_string()))
    }
}

/// 行をレコードに変換（カラムの型名で判定）
fn decode_row(row: &MySqlRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (i, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        let value = match type_name {
            "BOOLEAN" => row.try_get_unchecked::<Option<bool>, _>(i)?.map(Value::Bool),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => row
                .try_get_unchecked::<Option<i64>, _>(i)?
                .map(Value::Integer),
            name if name.ends_with("UNSIGNED") => row
                .try_get_unchecked::<Option<u64>, _>(i)?
                .map(|v| i64::try_from(v).map_or(Value::String(v.to_string()), Value::Integer)),
            "BIT" => row
                .try_get_unchecked::<Option<u64>, _>(i)?
                .map(|v| Value::Bool(v != 0)),
            "FLOAT" => row
                .try_get::<Option<f32>, _>(i)?
                .map(|v| Value::Double(v.into())),
            "DOUBLE" => row.try_get::<Option<f64>, _>(i)?.map(Value::Double),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(i)?
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(Value::Date),
            "DATETIME" | "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(i)?.map(Value::Date),
            _ => row
                .try_get_unchecked::<Option<String>, _>(i)?
                .map(Value::String),
        };
        record.insert(column.name(), value.unwrap_or(Value::Null));
    }
    Ok(record)
}
