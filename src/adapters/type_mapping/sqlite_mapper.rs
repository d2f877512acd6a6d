// SQLite用型マッパー

use super::common::{format_tsql_type, normalize_type_name};
use crate::core::schema::PortableType;

pub(super) fn format_native_type(portable_type: &PortableType) -> Option<&'static str> {
    format_tsql_type(portable_type)
}

/// SQLiteのDDLに書かれた型キーワード -> PortableType
///
/// SQLiteのカタログは元のCREATE TABLE文しか保持しないため、イントロスペクションは
/// DDLテキストのキーワードをこの表で逆引きします。このエンジンが生成する
/// キーワード（INT, NTEXT, FLOAT, BIT, DATETIME2）に加えて、一般的な同義語も受け付けます。
pub fn parse_sqlite_type_keyword(keyword: &str) -> Option<PortableType> {
    match normalize_type_name(keyword).as_str() {
        "int" | "integer" | "bigint" | "smallint" | "tinyint" | "mediumint" => {
            Some(PortableType::Integer)
        }
        "ntext" | "text" | "nvarchar" | "varchar" | "nchar" | "char" | "character" | "clob"
        | "varying character" | "native character" => Some(PortableType::String),
        "float" | "real" | "double" | "double precision" | "numeric" | "decimal" => {
            Some(PortableType::Double)
        }
        "bit" | "boolean" | "bool" => Some(PortableType::Bool),
        "datetime2" | "datetime" | "date" | "timestamp" => Some(PortableType::Date),
        _ => None,
    }
}
