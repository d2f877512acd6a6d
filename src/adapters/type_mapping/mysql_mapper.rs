// MySQL / MariaDB用型マッパー

use crate::core::schema::PortableType;

pub(super) fn format_native_type(portable_type: &PortableType) -> Option<&'static str> {
    match portable_type {
        PortableType::String | PortableType::Enum { .. } => Some("TEXT"),
        PortableType::Integer => Some("INT"),
        PortableType::Double => Some("FLOAT"),
        PortableType::Bool => Some("BIT"),
        PortableType::Date => Some("DATETIME"),
        PortableType::Entity => None,
    }
}

/// information_schema.columns.data_type（正規化済み）-> PortableType
pub(super) fn parse_native_type(type_name: &str) -> Option<PortableType> {
    match type_name {
        "int" | "integer" | "bigint" | "smallint" | "mediumint" | "tinyint" => {
            Some(PortableType::Integer)
        }
        "bit" | "bool" | "boolean" => Some(PortableType::Bool),
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" => {
            Some(PortableType::String)
        }
        "date" | "datetime" | "timestamp" | "time" | "year" => Some(PortableType::Date),
        "float" | "double" | "double precision" | "decimal" | "numeric" | "real" => {
            Some(PortableType::Double)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_format() {
        assert_eq!(format_native_type(&PortableType::String), Some("TEXT"));
        assert_eq!(format_native_type(&PortableType::Integer), Some("INT"));
        assert_eq!(format_native_type(&PortableType::Double), Some("FLOAT"));
        assert_eq!(format_native_type(&PortableType::Bool), Some("BIT"));
        assert_eq!(format_native_type(&PortableType::Date), Some("DATETIME"));
    }

    #[test]
    fn test_mysql_parse_generated_types() {
        assert_eq!(parse_native_type("text"), Some(PortableType::String));
        assert_eq!(parse_native_type("int"), Some(PortableType::Integer));
        assert_eq!(parse_native_type("float"), Some(PortableType::Double));
        assert_eq!(parse_native_type("bit"), Some(PortableType::Bool));
        assert_eq!(parse_native_type("datetime"), Some(PortableType::Date));
    }

    #[test]
    fn test_mysql_parse_unmapped() {
        assert_eq!(parse_native_type("blob"), None);
        assert_eq!(parse_native_type("json"), None);
        assert_eq!(parse_native_type("enum"), None);
        assert_eq!(parse_native_type("geometry"), None);
    }
}
