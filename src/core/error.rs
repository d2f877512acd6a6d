// エラー型定義
//
// エンジン全体で使用されるカスタムエラー型を提供します。
// 識別子・型・スキーマ制約・イントロスペクション・実行の各エラーを
// thiserror で定義し、EngineError に集約します。

use crate::core::config::Dialect;
use crate::core::schema::Multiplicity;
use thiserror::Error;

/// 識別子が不正な理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameReason {
    /// 空文字列または空白のみ
    Empty,
    /// 先頭文字が英字ではない
    InvalidFirstCharacter(char),
    /// 英数字と `@ _ $` 以外の文字を含む
    InvalidCharacter(char),
}

impl std::fmt::Display for InvalidNameReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidNameReason::Empty => write!(f, "name must not be empty"),
            InvalidNameReason::InvalidFirstCharacter(c) => {
                write!(f, "name must start with a letter, found '{}'", c)
            }
            InvalidNameReason::InvalidCharacter(c) => write!(
                f,
                "character '{}' is not allowed (only letters, digits, '@', '_' and '$')",
                c
            ),
        }
    }
}

/// 識別子検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid name '{name}': {reason}")]
pub struct InvalidNameError {
    /// 検証に失敗した名前
    pub name: String,
    /// 失敗理由
    pub reason: InvalidNameReason,
}

/// 型マッピングエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedTypeError {
    /// ネストしたエンティティはどの方言でもカラム型にできない
    #[error("Nested entities are not supported as column types ({dialect}){}", format_column_opt(.column))]
    NestedEntity {
        column: Option<String>,
        dialect: Dialect,
    },

    /// ネイティブ型にポータブルな表現がない
    #[error("Type '{type_name}' is not supported for {dialect}{}", format_column_opt(.column))]
    NativeType {
        type_name: String,
        column: Option<String>,
        dialect: Dialect,
    },

    /// この方言では逆方向マッピングを提供しない（SQLite）
    #[error("Reverse type mapping of '{type_name}' is unsupported for this dialect ({dialect}){}", format_column_opt(.column))]
    ReverseMappingUnsupported {
        type_name: String,
        column: Option<String>,
        dialect: Dialect,
    },
}

impl UnsupportedTypeError {
    /// 対象カラム名を取得
    pub fn column(&self) -> Option<&str> {
        match self {
            UnsupportedTypeError::NestedEntity { column, .. }
            | UnsupportedTypeError::NativeType { column, .. }
            | UnsupportedTypeError::ReverseMappingUnsupported { column, .. } => column.as_deref(),
        }
    }

    /// カラム名を付与したエラーを返す
    pub fn with_column(self, name: &str) -> Self {
        let column = Some(name.to_string());
        match self {
            UnsupportedTypeError::NestedEntity { dialect, .. } => {
                UnsupportedTypeError::NestedEntity { column, dialect }
            }
            UnsupportedTypeError::NativeType {
                type_name, dialect, ..
            } => UnsupportedTypeError::NativeType {
                type_name,
                column,
                dialect,
            },
            UnsupportedTypeError::ReverseMappingUnsupported {
                type_name, dialect, ..
            } => UnsupportedTypeError::ReverseMappingUnsupported {
                type_name,
                column,
                dialect,
            },
        }
    }
}

/// スキーマ制約エラー
///
/// SQLを発行する前に検出される、テーブルとして表現できないスキーマ定義。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaConstraintError {
    #[error("Schema '{schema}' allows extra properties; a table definition cannot represent this")]
    ExtraPropertiesAllowed { schema: String },

    #[error("Multiplicity '{multiplicity}' of column '{column}' cannot be represented as a SQL column constraint")]
    UnsupportedMultiplicity {
        column: String,
        multiplicity: Multiplicity,
    },

    #[error("Schema already contains a property named '{column}'")]
    DuplicateProperty { column: String },

    #[error("Schema '{schema}' has no properties; a table needs at least one column")]
    NoProperties { schema: String },
}

/// イントロスペクション解析エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not retrieve create-table statement for '{table}': {message}")]
pub struct IntrospectionParseError {
    /// 対象テーブル名
    pub table: String,
    /// 詳細
    pub message: String,
}

/// レコード適用エラー
///
/// スキーマに適合しないレコード値を表現します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Record {row}, field '{field}': {message}")]
pub struct RecordError {
    /// レコード番号（入力全体での0始まりの位置）
    pub row: usize,
    /// フィールド名
    pub field: String,
    /// 詳細
    pub message: String,
}

/// 接続エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to open {dialect} connection: {message}")]
pub struct ConnectionError {
    pub dialect: Dialect,
    pub message: String,
}

/// SQL実行エラー
///
/// ドライバーのメッセージをそのまま保持します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{dialect} execution failed: {message}")]
pub struct ExecutionError {
    /// 実行した方言
    pub dialect: Dialect,
    /// ドライバーのエラーメッセージ
    pub message: String,
    /// 失敗したSQL文
    pub statement: Option<String>,
}

impl ExecutionError {
    /// 新しい実行エラーを作成
    pub fn new(dialect: Dialect, message: impl Into<String>) -> Self {
        Self {
            dialect,
            message: message.into(),
            statement: None,
        }
    }

    /// SQL文を付与
    pub fn with_statement(mut self, statement: &str) -> Self {
        self.statement = Some(statement.to_string());
        self
    }
}

/// エンジンエラー
///
/// 公開操作が返すエラーの総称。どのエラーもプロセスを停止させる致命的な
/// ものではなく、呼び出し元に通常の結果として返されます。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),

    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedTypeError),

    #[error(transparent)]
    SchemaConstraint(#[from] SchemaConstraintError),

    #[error(transparent)]
    IntrospectionParse(#[from] IntrospectionParseError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Operation cancelled before batch {batch}")]
    Cancelled { batch: usize },

    #[error(transparent)]
    Multiple(#[from] ErrorList),
}

impl EngineError {
    /// 呼び出し元の入力に起因するエラーかどうか
    ///
    /// 接続・実行エラーとキャンセルは予期しない失敗として扱います。
    pub fn is_user_error(&self) -> bool {
        match self {
            EngineError::InvalidName(_)
            | EngineError::UnsupportedType(_)
            | EngineError::SchemaConstraint(_)
            | EngineError::IntrospectionParse(_)
            | EngineError::Record(_) => true,
            EngineError::Connection(_)
            | EngineError::Execution(_)
            | EngineError::Cancelled { .. } => false,
            EngineError::Multiple(list) => list.iter().all(EngineError::is_user_error),
        }
    }

    /// キャンセルによるエラーかどうか
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled { .. })
    }
}

/// 集約エラー
///
/// 最初のエラーで中断せず、検出したすべてのエラーを発見順に保持します。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorList {
    errors: Vec<EngineError>,
}

impl ErrorList {
    /// 空のエラーリストを作成
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// エラーを追加
    pub fn push(&mut self, error: impl Into<EngineError>) {
        self.errors.push(error.into());
    }

    /// エラーがないかどうか
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// エラーの数を取得
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// エラーを順に参照
    pub fn iter(&self) -> std::slice::Iter<'_, EngineError> {
        self.errors.iter()
    }

    /// 単一のEngineErrorに変換（1件のみの場合はそのエラー自体を返す）
    pub fn into_engine_error(mut self) -> EngineError {
        if self.errors.len() == 1 {
            if let Some(only) = self.errors.pop() {
                return only;
            }
        }
        EngineError::Multiple(self)
    }

    /// Result型に変換する
    ///
    /// エラーがない場合は `Ok(value)`、ある場合は `Err(self)` を返します。
    pub fn into_result<T>(self, value: T) -> Result<T, ErrorList> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ErrorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("\n"))
    }
}

impl std::error::Error for ErrorList {}

impl IntoIterator for ErrorList {
    type Item = EngineError;
    type IntoIter = std::vec::IntoIter<EngineError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// カラム名をエラーメッセージ用にフォーマット
fn format_column_opt(column: &Option<String>) -> String {
    column
        .as_ref()
        .map_or(String::new(), |c| format!(" (column: {})", c))
}
