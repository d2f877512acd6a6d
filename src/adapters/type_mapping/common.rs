// 共通型フォーマットロジック
//
// 複数の方言で共通する型変換と、型名の正規化を提供します。

use crate::core::schema::PortableType;

/// T-SQL系の型語彙（SQLite / SQL Server で共通）
///
/// SQLiteのDDLはこのエンジン自身が書いたキーワードをそのまま保存するため、
/// SQL Server と同じ語彙を使います。
pub fn format_tsql_type(portable_type: &PortableType) -> Option<&'static str> {
    match portable_type {
        PortableType::String | PortableType::Enum { .. } => Some("NTEXT"),
        PortableType::Integer => Some("INT"),
        PortableType::Double => Some("FLOAT"),
        PortableType::Bool => Some("BIT"),
        PortableType::Date => Some("DATETIME2"),
        PortableType::Entity => None,
    }
}

/// 型名を正規化
///
/// 小文字化し、前後の空白と長さ・精度指定（`varchar(50)` の `(50)`）を取り除きます。
pub fn normalize_type_name(type_name: &str) -> String {
    let lowered = type_name.trim().to_lowercase();
    let base = match lowered.find('(') {
        Some(open) => {
            let close = lowered[open..].find(')').map(|i| open + i + 1);
            let mut stripped = lowered[..open].to_string();
            if let Some(close) = close {
                stripped.push_str(&lowered[close..]);
            }
            stripped
        }
        None => lowered,
    };
    base.split_whitespace().collect::<Vec<_>>().join(" ")
}
