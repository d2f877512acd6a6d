// SQL Server用型マッパー

use super::common::format_tsql_type;
use crate::core::schema::PortableType;

pub(super) fn format_native_type(portable_type: &PortableType) -> Option<&'static str> {
    format_tsql_type(portable_type)
}

/// INFORMATION_SCHEMA.COLUMNS.DATA_TYPE（正規化済み）-> PortableType
///
/// binary, geography, geometry, hierarchyid, image, uniqueidentifier,
/// varbinary, sql_variant, xml は安全なポータブル表現がないため None を返します。
pub(super) fn parse_native_type(type_name: &str) -> Option<PortableType> {
    match type_name {
        "bigint" | "int" | "smallint" | "tinyint" => Some(PortableType::Integer),
        "bit" => Some(PortableType::Bool),
        "char" | "nchar" | "varchar" | "nvarchar" | "text" | "ntext" | "sysname" => {
            Some(PortableType::String)
        }
        "date" | "datetime" | "datetime2" | "datetimeoffset" | "smalldatetime" | "time"
        | "timestamp" => Some(PortableType::Date),
        "decimal" | "numeric" | "float" | "real" | "money" | "smallmoney" => {
            Some(PortableType::Double)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mssql_format() {
        assert_eq!(format_native_type(&PortableType::String), Some("NTEXT"));
        assert_eq!(format_native_type(&PortableType::Integer), Some("INT"));
        assert_eq!(format_native_type(&PortableType::Double), Some("FLOAT"));
        assert_eq!(format_native_type(&PortableType::Bool), Some("BIT"));
        assert_eq!(format_native_type(&PortableType::Date), Some("DATETIME2"));
    }

    #[test]
    fn test_mssql_parse_closed_set() {
        assert_eq!(parse_native_type("bigint"), Some(PortableType::Integer));
        assert_eq!(parse_native_type("tinyint"), Some(PortableType::Integer));
        assert_eq!(parse_native_type("bit"), Some(PortableType::Bool));
        assert_eq!(parse_native_type("nvarchar"), Some(PortableType::String));
        assert_eq!(parse_native_type("sysname"), Some(PortableType::String));
        assert_eq!(parse_native_type("datetimeoffset"), Some(PortableType::Date));
        assert_eq!(parse_native_type("smallmoney"), Some(PortableType::Double));
    }

    #[test]
    fn test_mssql_parse_unsafe_types() {
        for name in [
            "binary",
            "geography",
            "geometry",
            "hierarchyid",
            "image",
            "uniqueidentifier",
            "varbinary",
            "sql_variant",
            "xml",
        ] {
            assert_eq!(parse_native_type(name), None, "{}", name);
        }
    }
}
