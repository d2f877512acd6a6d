// PostgreSQL用型マッパー

use crate::core::schema::PortableType;

pub(super) fn format_native_type(portable_type: &PortableType) -> Option<&'static str> {
    match portable_type {
        PortableType::String | PortableType::Enum { .. } => Some("text"),
        PortableType::Integer => Some("integer"),
        PortableType::Double => Some("double precision"),
        PortableType::Bool => Some("boolean"),
        PortableType::Date => Some("date"),
        PortableType::Entity => None,
    }
}

/// information_schema.columns.data_type（正規化済み）-> PortableType
pub(super) fn parse_native_type(type_name: &str) -> Option<PortableType> {
    match type_name {
        "bigint" | "integer" | "smallint" => Some(PortableType::Integer),
        "bit" | "bit varying" | "boolean" => Some(PortableType::Bool),
        "char" | "varchar" | "character" | "character varying" | "text" => {
            Some(PortableType::String)
        }
        "date"
        | "time"
        | "time without time zone"
        | "time with time zone"
        | "timestamp"
        | "timestamp without time zone"
        | "timestamp with time zone" => Some(PortableType::Date),
        "double precision" | "numeric" | "decimal" | "real" => Some(PortableType::Double),
        _ => None,
    }
}
