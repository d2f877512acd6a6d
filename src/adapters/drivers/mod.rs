// データベースドライバー
//
// DbConnection / ConnectionFactory の方言別実装。
// SQLite / PostgreSQL / MySQL / MariaDB は sqlx の型付き接続、SQL Server は tiberius を使用します。

mod mssql;
mod mysql;
mod postgres;
mod sqlite;

pub use mssql::{MsSqlConnection, MsSqlConnectionFactory};
pub use mysql::{MySqlConnectionFactory, MySqlDbConnection};
pub use postgres::{PostgresConnection, PostgresConnectionFactory};
pub use sqlite::{SqliteConnectionFactory, SqliteDbConnection};

use crate::adapters::database::{BoundParameter, DbType};
use crate::core::config::Dialect;
use crate::core::error::ExecutionError;
use crate::core::record::{Record, Value};
use chrono::NaiveDateTime;
use sqlx::{Database, Encode, Type};

/// sqlxのクエリにバインドパラメータを順番に束縛
///
/// NULLは型ヒントに従って型付きNULLとして束縛します。
pub(crate) fn bind_parameters<'q, DB>(
    mut query: sqlx::query::Query<'q, DB, <DB as Database>::Arguments<'q>>,
    parameters: &[BoundParameter],
) -> sqlx::query::Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    String: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    bool: Encode<'q, DB> + Type<DB>,
    NaiveDateTime: Encode<'q, DB> + Type<DB>,
    Option<String>: Encode<'q, DB>,
    Option<i64>: Encode<'q, DB>,
    Option<f64>: Encode<'q, DB>,
    Option<bool>: Encode<'q, DB>,
    Option<NaiveDateTime>: Encode<'q, DB>,
{
    for parameter in parameters {
        query = match (&parameter.value, parameter.db_type) {
            (Value::Null, DbType::String) => query.bind(Option::<String>::None),
            (Value::Null, DbType::Int64) => query.bind(Option::<i64>::None),
            (Value::Null, DbType::Double) => query.bind(Option::<f64>::None),
            (Value::Null, DbType::Boolean) => query.bind(Option::<bool>::None),
            (Value::Null, DbType::DateTime) => query.bind(Option::<NaiveDateTime>::None),
            (Value::String(s) | Value::Enum(s), _) => query.bind(s.clone()),
            (Value::Integer(i), _) => query.bind(*i),
            (Value::Double(f), _) => query.bind(*f),
            (Value::Bool(b), _) => query.bind(*b),
            (Value::Date(d), _) => query.bind(*d),
        };
    }
    query
}

/// ドライバーエラーを実行エラーに変換
pub(crate) fn execution_error(
    dialect: Dialect,
    statement: &str,
    error: impl std::fmt::Display,
) -> ExecutionError {
    ExecutionError::new(dialect, error.to_string()).with_statement(statement)
}

/// 先頭行の先頭列を取り出す
pub(crate) fn first_value(rows: Vec<Record>) -> Option<Value> {
    rows.into_iter()
        .next()
        .and_then(|row| row.value_at(0).cloned())
}
