// PostgreSQLドライバー（sqlx）

use super::{bind_parameters, execution_error, first_value};
use crate::adapters::database::{ConnectionFactory, DbConnection, SqlCommand};
use crate::core::config::Dialect;
use crate::core::error::{ConnectionError, ExecutionError};
use crate::core::record::{Record, Value};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, Connection, Row, TypeInfo};
use tracing::debug;

/// PostgreSQL接続ファクトリ
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresConnectionFactory;

#[async_trait]
impl ConnectionFactory for PostgresConnectionFactory {
    async fn open(&self, url: &str) -> Result<Box<dyn DbConnection>, ConnectionError> {
        let conn = PgConnection::connect(url)
            .await
            .map_err(|e| ConnectionError {
                dialect: Dialect::Postgres,
                message: e.to_string(),
            })?;
        debug!("opened PostgreSQL connection");
        Ok(Box::new(PostgresConnection { conn }))
    }
}

/// PostgreSQL接続
pub struct PostgresConnection {
    conn: PgConnection,
}

#[async_trait]
impl DbConnection for PostgresConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute_non_query(&mut self, command: &SqlCommand) -> Result<u64, ExecutionError> {
        let result = bind_parameters(sqlx::query(&command.text), &command.parameters)
            .execute(&mut self.conn)
            .await
            .map_err(|e| execution_error(Dialect::Postgres, &command.text, e))?;
        Ok(result.rows_affected())
    }

    async fn execute_reader(&mut self, command: &SqlCommand) -> Result<Vec<Record>, ExecutionError> {
        let rows = bind_parameters(sqlx::query(&command.text), &command.parameters)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| execution_error(Dialect::Postgres, &command.text, e))?;

        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| execution_error(Dialect::Postgres, &command.text, e))
    }

    async fn execute_scalar(&mut self, command: &SqlCommand) -> Result<Option<Value>, ExecutionError> {
        Ok(first_value(self.execute_reader(command).await?))
    }

    async fn close(self: Box<Self>) -> Result<(), ExecutionError> {
        self.conn
            .close()
            .await
            .map_err(|e| ExecutionError::new(Dialect::Postgres, e.to_string()))
    }
}

/// 行をレコードに変換（カラムの型名で判定）
fn decode_row(row: &PgRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(i)?.map(Value::Bool),
            "INT2" => row
                .try_get::<Option<i16>, _>(i)?
                .map(|v| Value::Integer(v.into())),
            "INT4" => row
                .try_get::<Option<i32>, _>(i)?
                .map(|v| Value::Integer(v.into())),
            "INT8" => row.try_get::<Option<i64>, _>(i)?.map(Value::Integer),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(i)?
                .map(|v| Value::Double(v.into())),
            "FLOAT8" => row.try_get::<Option<f64>, _>(i)?.map(Value::Double),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(i)?
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(Value::Date),
            "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(i)?.map(Value::Date),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(i)?
                .map(|d| Value::Date(d.naive_utc())),
            _ => row
                .try_get_unchecked::<Option<String>, _>(i)?
                .map(Value::String),
        };
        record.insert(column.name(), value.unwrap_or(Value::Null));
    }
    Ok(record)
}
