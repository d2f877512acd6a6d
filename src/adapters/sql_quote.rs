// SQL識別子の検証とクォート
//
// テーブル名・カラム名をSQLテキストに埋め込む前の唯一の防御層です。
// 値は常にバインドパラメータで渡し、識別子だけがこの検証を経て埋め込まれます。

use crate::core::config::Dialect;
use crate::core::error::{InvalidNameError, InvalidNameReason};

/// 識別子を検証
///
/// 先頭が英字で、以降が英数字または `@ _ $` のみで構成される場合に成功し、
/// 入力をそのまま（大文字小文字を保持して）返します。
///
/// # Examples
/// ```
/// use schemabridge::adapters::sql_quote::validate_identifier;
/// assert_eq!(validate_identifier("Hello1").unwrap(), "Hello1");
/// assert!(validate_identifier("_Hello").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<&str, InvalidNameError> {
    let invalid = |reason| InvalidNameError {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid(InvalidNameReason::Empty));
    }

    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        if !first.is_alphabetic() {
            return Err(invalid(InvalidNameReason::InvalidFirstCharacter(first)));
        }
    }

    if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '_' | '$'))) {
        return Err(invalid(InvalidNameReason::InvalidCharacter(bad)));
    }

    Ok(name)
}

/// 識別子をクォート
///
/// `requires_quoting` が true の場合のみダブルクォートで囲みます。
/// 識別子内のダブルクォートは二重にエスケープします。
///
/// # Examples
/// ```
/// use schemabridge::adapters::sql_quote::quote_identifier;
/// assert_eq!(quote_identifier("users", true), r#""users""#);
/// assert_eq!(quote_identifier("users", false), "users");
/// ```
pub fn quote_identifier(name: &str, requires_quoting: bool) -> String {
    if requires_quoting {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

/// 検証してからクォート
pub fn validate_and_quote(name: &str, requires_quoting: bool) -> Result<String, InvalidNameError> {
    validate_identifier(name).map(|n| quote_identifier(n, requires_quoting))
}

/// DDL用に識別子を検証・クォート（SQLite / SQL Server / PostgreSQL はクォート）
pub fn quote_for_ddl(name: &str, dialect: Dialect) -> Result<String, InvalidNameError> {
    validate_and_quote(name, dialect.quotes_ddl_identifiers())
}

/// スキーマ修飾付きのテーブル名を組み立てる
///
/// 修飾子とテーブル名の両方を検証します。
pub fn qualified_table_name(
    qualifier: Option<&str>,
    table: &str,
    requires_quoting: bool,
) -> Result<String, InvalidNameError> {
    let table = validate_and_quote(table, requires_quoting)?;
    match qualifier {
        Some(schema) => Ok(format!(
            "{}.{}",
            validate_and_quote(schema, requires_quoting)?,
            table
        )),
        None => Ok(table),
    }
}

/// カラム名リストをクォートしてカンマ区切りで結合
pub fn quote_columns<'a>(columns: impl IntoIterator<Item = &'a str>, requires_quoting: bool) -> String {
    columns
        .into_iter()
        .map(|c| quote_identifier(c, requires_quoting))
        .collect::<Vec<_>>()
        .join(", ")
}
