// コマンド共通コンテキスト
//
// 設定ファイル・スキーマファイル・レコードファイルの読み込みをCLI層で集約する。

use crate::core::config::{Config, ConnectionConfig};
use crate::core::record::Record;
use crate::core::schema::Schema;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config_path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// 設定ファイルを読み込んでコンテキストを作成
    ///
    /// パスが指定されない場合はカレントディレクトリの `schemabridge.yaml` を使います。
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path =
            config_path.unwrap_or_else(|| PathBuf::from(Config::DEFAULT_CONFIG_PATH));
        if !config_path.exists() {
            return Err(anyhow!("Config file not found: {:?}", config_path));
        }

        let config = Config::load(&config_path)?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// 名前付き接続設定を取得
    pub fn connection(&self, name: &str) -> Result<&ConnectionConfig> {
        self.config.get_connection(name)
    }
}

/// スキーマファイルを読み込む
///
/// 拡張子が `.json` の場合はJSON、それ以外はYAMLとして解析します。
pub fn load_schema(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse schema JSON: {}", path.display()))
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse schema YAML: {}", path.display()))
    }
}

/// レコードファイル（JSONのオブジェクト配列）を読み込む
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;
    parse_records(&content).with_context(|| format!("Invalid records file: {}", path.display()))
}

/// JSONテキストをレコード列に変換
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("expected a JSON array of objects"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let object = item
                .as_object()
                .ok_or_else(|| anyhow!("record {} is not a JSON object", i))?;
            Record::from_json_object(object).map_err(|e| anyhow!("record {}: {}", i, e))
        })
        .collect()
}
