// データベース接続インターフェース
//
// 物理接続とネイティブなクエリ実行はドライバー側の責務です。
// このモジュールはエンジンが必要とする最小限の能力をトレイトとして定義し、
// 方言 -> 接続ファクトリの対応をプロセス全体の状態ではなく明示的な値として渡します。

use crate::core::config::Dialect;
use crate::core::error::{ConnectionError, ExecutionError};
use crate::core::record::{Record, Value};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// バインドパラメータの型ヒント
///
/// NULL値を型付きのSQL NULLとしてバインドするために使用します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    String,
    Int64,
    Double,
    Boolean,
    DateTime,
}

/// バインドパラメータ
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    /// パラメータ名（文全体で一意、`p1`, `p2`, ...）
    pub name: String,
    /// 値
    pub value: Value,
    /// 型ヒント
    pub db_type: DbType,
}

/// 実行するSQLコマンド
///
/// パラメータはプレースホルダーの出現順に並びます。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlCommand {
    /// SQL文
    pub text: String,
    /// バインドパラメータ
    pub parameters: Vec<BoundParameter>,
}

impl SqlCommand {
    /// パラメータなしのコマンドを作成
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    /// パラメータを追加
    pub fn add_parameter(&mut self, name: impl Into<String>, value: Value, db_type: DbType) {
        self.parameters.push(BoundParameter {
            name: name.into(),
            value,
            db_type,
        });
    }
}

/// データベース接続
///
/// 1つの接続は同時に1つのコマンドしか実行しません（`&mut self`）。
#[async_trait]
pub trait DbConnection: Send {
    /// 接続先の方言
    fn dialect(&self) -> Dialect;

    /// 更新系コマンドを実行し、影響を受けた行数を返す
    async fn execute_non_query(&mut self, command: &SqlCommand) -> Result<u64, ExecutionError>;

    /// 問い合わせを実行し、すべての行を返す
    ///
    /// 行カーソルは戻る前に解放されます。各行のフィールドはSELECTの列順です。
    async fn execute_reader(&mut self, command: &SqlCommand) -> Result<Vec<Record>, ExecutionError>;

    /// 問い合わせを実行し、先頭行の先頭列を返す
    async fn execute_scalar(&mut self, command: &SqlCommand)
        -> Result<Option<Value>, ExecutionError>;

    /// 接続を閉じる
    async fn close(self: Box<Self>) -> Result<(), ExecutionError>;
}

/// 接続ファクトリ
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// 接続文字列から接続を開く
    async fn open(&self, url: &str) -> Result<Box<dyn DbConnection>, ConnectionError>;
}

/// ドライバーレジストリ
///
/// 方言ごとの接続ファクトリを保持します。
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: HashMap<Dialect, Arc<dyn ConnectionFactory>>,
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dialects: Vec<String> = self.factories.keys().map(|d| d.to_string()).collect();
        dialects.sort();
        f.debug_struct("DriverRegistry")
            .field("dialects", &dialects)
            .finish()
    }
}

impl DriverRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// 標準ドライバーを登録したレジストリを作成
    ///
    /// SQLite / PostgreSQL / MySQL / MariaDB は sqlx、SQL Server は tiberius を使用します。
    pub fn with_default_drivers() -> Self {
        use crate::adapters::drivers::{
            MsSqlConnectionFactory, MySqlConnectionFactory, PostgresConnectionFactory,
            SqliteConnectionFactory,
        };

        Self::new()
            .with_factory(Dialect::SQLite, Arc::new(SqliteConnectionFactory))
            .with_factory(Dialect::Postgres, Arc::new(PostgresConnectionFactory))
            .with_factory(Dialect::MySql, Arc::new(MySqlConnectionFactory::new(Dialect::MySql)))
            .with_factory(
                Dialect::MariaDb,
                Arc::new(MySqlConnectionFactory::new(Dialect::MariaDb)),
            )
            .with_factory(Dialect::MsSql, Arc::new(MsSqlConnectionFactory))
    }

    /// ファクトリを登録したレジストリを返す
    pub fn with_factory(mut self, dialect: Dialect, factory: Arc<dyn ConnectionFactory>) -> Self {
        self.factories.insert(dialect, factory);
        self
    }

    /// 方言に対応するファクトリを取得
    pub fn factory(&self, dialect: Dialect) -> Result<&Arc<dyn ConnectionFactory>, ConnectionError> {
        self.factories.get(&dialect).ok_or_else(|| ConnectionError {
            dialect,
            message: "no driver registered for this dialect".to_string(),
        })
    }

    /// 接続を開く
    pub async fn open(
        &self,
        dialect: Dialect,
        url: &str,
    ) -> Result<Box<dyn DbConnection>, ConnectionError> {
        self.factory(dialect)?.open(url).await
    }
}
