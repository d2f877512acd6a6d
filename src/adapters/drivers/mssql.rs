// SQL Serverドライバー（tiberius）
//
// 接続文字列はADO.NET形式（例: `server=tcp:localhost,1433;user=sa;password=...;TrustServerCertificate=true`）です。

use super::{execution_error, first_value};
use crate::adapters::database::{ConnectionFactory, DbConnection, DbType, SqlCommand};
use crate::core::config::Dialect;
use crate::core::error::{ConnectionError, ExecutionError};
use crate::core::record::{Record, Value};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tiberius::{Client, ColumnData, Config, FromSql, Query, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

/// SQL Server接続ファクトリ
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSqlConnectionFactory;

#[async_trait]
impl ConnectionFactory for MsSqlConnectionFactory {
    async fn open(&self, url: &str) -> Result<Box<dyn DbConnection>, ConnectionError> {
        let connection_error = |message: String| ConnectionError {
            dialect: Dialect::MsSql,
            message,
        };

        let config = Config::from_ado_string(url).map_err(|e| connection_error(e.to_string()))?;
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| connection_error(e.to_string()))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        debug!("opened SQL Server connection");
        Ok(Box::new(MsSqlConnection { client }))
    }
}

/// SQL Server接続
pub struct MsSqlConnection {
    client: Client<Compat<TcpStream>>,
}

#[async_trait]
impl DbConnection for MsSqlConnection {
    fn dialect(&self) -> Dialect {
        Dialect::MsSql
    }

    async fn execute_non_query(&mut self, command: &SqlCommand) -> Result<u64, ExecutionError> {
        let result = build_query(command)
            .execute(&mut self.client)
            .await
            .map_err(|e| execution_error(Dialect::MsSql, &command.text, e))?;
        Ok(result.total())
    }

    async fn execute_reader(&mut self, command: &SqlCommand) -> Result<Vec<Record>, ExecutionError> {
        let rows = build_query(command)
            .query(&mut self.client)
            .await
            .map_err(|e| execution_error(Dialect::MsSql, &command.text, e))?
            .into_first_result()
            .await
            .map_err(|e| execution_error(Dialect::MsSql, &command.text, e))?;

        rows.into_iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| execution_error(Dialect::MsSql, &command.text, e))
    }

    async fn execute_scalar(&mut self, command: &SqlCommand) -> Result<Option<Value>, ExecutionError> {
        Ok(first_value(self.execute_reader(command).await?))
    }

    async fn close(self: Box<Self>) -> Result<(), ExecutionError> {
        self.client
            .close()
            .await
            .map_err(|e| ExecutionError::new(Dialect::MsSql, e.to_string()))
    }
}

/// SqlCommandをtiberiusのクエリに変換（@P1, @P2, ... の順に束縛）
fn build_query(command: &SqlCommand) -> Query<'_> {
    let mut query = Query::new(command.text.as_str());
    for parameter in &command.parameters {
        match (&parameter.value, parameter.db_type) {
            (Value::Null, DbType::String) => query.bind(Option::<&str>::None),
            (Value::Null, DbType::Int64) => query.bind(Option::<i64>::None),
            (Value::Null, DbType::Double) => query.bind(Option::<f64>::None),
            (Value::Null, DbType::Boolean) => query.bind(Option::<bool>::None),
            (Value::Null, DbType::DateTime) => query.bind(Option::<NaiveDateTime>::None),
            (Value::String(s) | Value::Enum(s), _) => query.bind(s.as_str()),
            (Value::Integer(i), _) => query.bind(*i),
            (Value::Double(f), _) => query.bind(*f),
            (Value::Bool(b), _) => query.bind(*b),
            (Value::Date(d), _) => query.bind(*d),
        }
    }
    query
}

/// 行をレコードに変換
fn decode_row(row: Row) -> Result<Record, String> {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let mut record = Record::new();
    for (name, data) in names.into_iter().zip(row) {
        let value = decode_column(&data).map_err(|e| format!("column '{}': {}", name, e))?;
        record.insert(name, value);
    }
    Ok(record)
}

/// TDSの値をスカラー値に変換
fn decode_column(data: &ColumnData<'static>) -> Result<Value, String> {
    let convert = |e: tiberius::error::Error| e.to_string();

    let value = match data {
        ColumnData::U8(v) => v.map(|v| Value::Integer(v.into())),
        ColumnData::I16(v) => v.map(|v| Value::Integer(v.into())),
        ColumnData::I32(v) => v.map(|v| Value::Integer(v.into())),
        ColumnData::I64(v) => v.map(Value::Integer),
        ColumnData::F32(v) => v.map(|v| Value::Double(v.into())),
        ColumnData::F64(v) => v.map(Value::Double),
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| Value::String(s.to_string())),
        ColumnData::Guid(v) => v.map(|g| Value::String(g.to_string())),
        ColumnData::Numeric(v) => v.map(|n| {
            let text = n.to_string();
            text.parse::<f64>().map_or(Value::String(text), Value::Double)
        }),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data).map_err(convert)?.map(Value::Date)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(data)
            .map_err(convert)?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Value::Date),
        ColumnData::DateTimeOffset(_) => DateTime::<Utc>::from_sql(data)
            .map_err(convert)?
            .map(|d| Value::Date(d.naive_utc())),
        ColumnData::Time(_) => NaiveTime::from_sql(data)
            .map_err(convert)?
            .map(|t| Value::String(t.to_string())),
        _ => return Err("binary and xml values are not supported".to_string()),
    };

    Ok(value.unwrap_or(Value::Null))
}
