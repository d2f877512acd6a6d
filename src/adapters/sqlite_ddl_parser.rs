// SQLite DDLパーサー
//
// sqlite_master に保存された CREATE TABLE 文からカラム定義を読み戻します。
// 汎用のSQLパーサーではなく、このエンジン自身が出力する
// `CREATE TABLE <name> ( <col> <type> [NOT NULL] [PRIMARY KEY], ... )` の範囲に限定しています。

use crate::core::error::IntrospectionParseError;
use regex::Regex;
use std::sync::LazyLock;

/// 解析済みのカラム定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedColumn {
    /// カラム名（クォート除去済み）
    pub name: String,
    /// 型キーワード（DDLに書かれたまま、例: "INT", "varchar(20)"）
    pub type_keyword: String,
    /// NOT NULL 制約の有無
    pub not_null: bool,
}

/// 解析済みのCREATE TABLE文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    /// テーブル名（クォート除去済み）
    pub name: String,
    /// カラム定義（宣言順）
    pub columns: Vec<ParsedColumn>,
}

/// カラム制約の開始キーワード（型キーワードの終端）
const COLUMN_CONSTRAINT_KEYWORDS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "CHECK",
    "DEFAULT",
    "REFERENCES",
    "COLLATE",
    "GENERATED",
    "AS",
];

/// テーブル制約の開始キーワード
const TABLE_CONSTRAINT_KEYWORDS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

/// CREATE TABLE文のヘッダー（テーブル名と本体）
static HEADER: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^\s*CREATE\s+(?:TEMP(?:ORARY)?\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?("(?:[^"]|"")*"|\[[^\]]*\]|`[^`]*`|[^\s(]+)\s*\((.*)\)\s*(?:WITHOUT\s+ROWID\s*)?;?\s*$"#,
    )
});

/// カラム制約中の NOT NULL（括弧とクォートの外側のみで照合）
static NOT_NULL: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b"));

/// CREATE TABLE文を解析
///
/// # Arguments
///
/// * `table` - エラー報告用のテーブル名
/// * `sql` - sqlite_master.sql の値
pub fn parse_create_table(table: &str, sql: &str) -> Result<ParsedTable, IntrospectionParseError> {
    let fail = |message: String| IntrospectionParseError {
        table: table.to_string(),
        message,
    };

    let header = HEADER.as_ref().map_err(|e| fail(e.to_string()))?;

    let captures = header
        .captures(sql)
        .ok_or_else(|| fail("stored definition is not a CREATE TABLE statement".to_string()))?;

    let name = unquote(&captures[1]);
    let body = &captures[2];

    let not_null = NOT_NULL.as_ref().map_err(|e| fail(e.to_string()))?;

    let mut columns = Vec::new();
    for element in split_top_level(body) {
        let element = element.trim();
        if element.is_empty() {
            return Err(fail("empty column definition".to_string()));
        }
        if starts_with_keyword(element, TABLE_CONSTRAINT_KEYWORDS) {
            continue;
        }

        let (column_name, rest) = split_identifier(element)
            .ok_or_else(|| fail(format!("could not read column name from '{}'", element)))?;

        let type_end = find_constraint_start(rest);
        columns.push(ParsedColumn {
            name: column_name,
            type_keyword: rest[..type_end].trim().to_string(),
            not_null: not_null.is_match(&top_level_text(&rest[type_end..])),
        });
    }

    if columns.is_empty() {
        return Err(fail("statement defines no columns".to_string()));
    }

    Ok(ParsedTable { name, columns })
}

/// 括弧とクォートの外側にあるカンマで分割
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => quote = Some(c),
                '[' => quote = Some(']'),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(&body[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&body[start..]);
    parts
}

/// 括弧の内側とクォートされた部分を空白に置き換える
///
/// `CHECK ("a" IS NOT NULL)` や `DEFAULT 'NOT NULL'` を制約と誤認しないため。
fn top_level_text(constraints: &str) -> String {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    constraints
        .chars()
        .map(|c| {
            let inside = depth > 0 || quote.is_some();
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                }
                None => match c {
                    '"' | '\'' | '`' => quote = Some(c),
                    '[' => quote = Some(']'),
                    '(' => depth += 1,
                    ')' => depth = depth.saturating_sub(1),
                    _ => {}
                },
            }
            if inside || quote.is_some() || depth > 0 {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// 先頭の識別子（クォート付き可）と残りの文字列に分割
fn split_identifier(element: &str) -> Option<(String, &str)> {
    let mut chars = element.char_indices();
    let (_, first) = chars.next()?;

    let closing = match first {
        '"' => Some('"'),
        '[' => Some(']'),
        '`' => Some('`'),
        _ => None,
    };

    match closing {
        Some(close) => {
            let mut end = None;
            let mut iter = element[1..].char_indices().peekable();
            while let Some((i, c)) = iter.next() {
                if c == close {
                    // 二重にエスケープされたクォート
                    if close == '"' && iter.peek().map(|(_, n)| *n) == Some('"') {
                        iter.next();
                        continue;
                    }
                    end = Some(i + 1);
                    break;
                }
            }
            let end = end?;
            Some((unquote(&element[..=end]), &element[end + 1..]))
        }
        None => {
            let end = element
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(element.len());
            Some((element[..end].to_string(), &element[end..]))
        }
    }
}

/// 最初のカラム制約キーワードの位置（なければ末尾）
fn find_constraint_start(rest: &str) -> usize {
    let mut depth = 0usize;
    let mut word_start: Option<usize> = None;

    for (i, c) in rest.char_indices().chain(std::iter::once((rest.len(), ' '))) {
        if c.is_alphanumeric() || c == '_' {
            if word_start.is_none() {
                word_start = Some(i);
            }
        } else if let Some(start) = word_start.take() {
            if depth == 0 && is_keyword(&rest[start..i], COLUMN_CONSTRAINT_KEYWORDS) {
                return start;
            }
        }

        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth = depth.saturating_sub(1);
        }
    }
    rest.len()
}

fn starts_with_keyword(element: &str, keywords: &[&str]) -> bool {
    element
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .is_some_and(|word| is_keyword(word, keywords))
}

fn is_keyword(word: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// 識別子のクォートを除去
fn unquote(identifier: &str) -> String {
    let trimmed = identifier.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some('"'), Some('"')) if trimmed.len() >= 2 => {
            trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
        }
        (Some('['), Some(']')) | (Some('`'), Some('`')) if trimmed.len() >= 2 => {
            trimmed[1..trimmed.len() - 1].to_string()
        }
        _ => trimmed.to_string(),
    }
}
