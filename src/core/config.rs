// 設定ファイル管理
//
// データベース方言の定義と、接続設定（YAML形式）の読み込み・検証を行います。

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// 1ステートメントあたりのバインドパラメータ数の上限
///
/// 最も制限の厳しいドライバー（SQL Server: 2100）を下回るよう固定しています。
pub const MAX_BOUND_PARAMETERS: usize = 2099;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "sqlite")]
    SQLite,
    #[serde(rename = "mssql")]
    MsSql,
    #[serde(rename = "postgres")]
    Postgres,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "mariadb")]
    MariaDb,
}

impl Dialect {
    /// サポートされる全方言
    pub const ALL: [Dialect; 5] = [
        Dialect::SQLite,
        Dialect::MsSql,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::MariaDb,
    ];

    /// DDL生成時にテーブル名・カラム名をダブルクォートで囲むか
    pub fn quotes_ddl_identifiers(&self) -> bool {
        matches!(self, Dialect::SQLite | Dialect::MsSql | Dialect::Postgres)
    }

    /// INSERT文生成時に識別子をクォートするか
    ///
    /// PostgreSQLのみ、大文字小文字を保持するためにクォートが必要です。
    pub fn quotes_insert_identifiers(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// MySQL系（MySQL / MariaDB）かどうか
    pub fn is_mysql_family(&self) -> bool {
        matches!(self, Dialect::MySql | Dialect::MariaDb)
    }

    /// n番目（1始まり）のバインドパラメータのプレースホルダー
    pub fn placeholder(&self, ordinal: usize) -> String {
        match self {
            Dialect::SQLite => format!("?{}", ordinal),
            Dialect::Postgres => format!("${}", ordinal),
            Dialect::MsSql => format!("@P{}", ordinal),
            Dialect::MySql | Dialect::MariaDb => "?".to_string(),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::SQLite => write!(f, "sqlite"),
            Dialect::MsSql => write!(f, "mssql"),
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::MariaDb => write!(f, "mariadb"),
        }
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Dialect::SQLite),
            "mssql" | "sqlserver" => Ok(Dialect::MsSql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "mariadb" => Ok(Dialect::MariaDb),
            other => Err(anyhow!(
                "Unsupported database dialect: {}. Please specify one of: sqlite, mssql, postgres, mysql, mariadb.",
                other
            )),
        }
    }
}

/// 設定ファイル
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// 名前付き接続設定
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = "schemabridge.yaml";

    /// 設定ファイルを読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    /// 名前を指定して接続設定を取得
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionConfig> {
        self.connections.get(name).ok_or_else(|| {
            let mut available: Vec<_> = self.connections.keys().collect();
            available.sort();
            anyhow!(
                "Connection '{}' not found. Available connections: {:?}",
                name,
                available
            )
        })
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        if self.connections.is_empty() {
            return Err(anyhow!("At least one connection configuration is required"));
        }

        for (name, connection) in &self.connections {
            connection
                .validate()
                .with_context(|| format!("Invalid config for connection '{}'", name))?;
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}

/// 接続設定
///
/// 接続文字列はドライバーにそのまま渡されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// データベース方言
    pub dialect: Dialect,

    /// 接続文字列（sqlx URL または SQL Server の ADO.NET 形式）
    pub url: String,

    /// 接続タイムアウト（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ConnectionConfig {
    /// 新しい接続設定を作成
    pub fn new(dialect: Dialect, url: impl Into<String>) -> Self {
        Self {
            dialect,
            url: url.into(),
            timeout: None,
        }
    }

    /// 接続設定を検証
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("Connection url is not specified"));
        }
        Ok(())
    }
}
