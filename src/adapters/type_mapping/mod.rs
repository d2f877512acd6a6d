// 型マッピングサービス
//
// PortableType <-> 方言ネイティブ型文字列 の双方向変換を一元管理します。
// 方言ごとの対応表は閉じた列挙（Dialect）で選択し、動的ディスパッチは使いません。
//
// 対応表は意図的に網羅的ではありません。ポータブルな等価表現を持たない
// ネイティブ型は黙って縮小せず、エラーにします。

pub mod common;
mod mssql_mapper;
mod mysql_mapper;
mod postgres_mapper;
mod sqlite_mapper;

pub use sqlite_mapper::parse_sqlite_type_keyword;

use crate::adapters::database::DbType;
use crate::core::config::Dialect;
use crate::core::error::UnsupportedTypeError;
use crate::core::schema::PortableType;

/// 型マッピングサービス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMappingService {
    dialect: Dialect,
}

impl TypeMappingService {
    /// 新しいTypeMappingServiceを作成
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// 方言を取得
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// PortableType -> ネイティブ型文字列
    ///
    /// # Returns
    /// ネイティブ型文字列（例: "NTEXT", "double precision"）。
    /// Entity はどの方言でもエラーになります。
    pub fn to_native_type(
        &self,
        portable_type: &PortableType,
    ) -> Result<&'static str, UnsupportedTypeError> {
        let native = match self.dialect {
            Dialect::SQLite => sqlite_mapper::format_native_type(portable_type),
            Dialect::MsSql => mssql_mapper::format_native_type(portable_type),
            Dialect::Postgres => postgres_mapper::format_native_type(portable_type),
            Dialect::MySql | Dialect::MariaDb => mysql_mapper::format_native_type(portable_type),
        };

        native.ok_or(UnsupportedTypeError::NestedEntity {
            column: None,
            dialect: self.dialect,
        })
    }

    /// ネイティブ型文字列 -> PortableType
    ///
    /// SQLiteはイントロスペクションでカラムごとの型文字列を提供しないため、
    /// 常に「この方言では非対応」のエラーを返します。SQLiteのDDLキーワードは
    /// [`parse_sqlite_type_keyword`] を使ってください。
    ///
    /// # Arguments
    /// * `type_name` - データベースから取得した型文字列
    /// * `column` - エラー報告用のカラム名
    pub fn from_native_type(
        &self,
        type_name: &str,
        column: &str,
    ) -> Result<PortableType, UnsupportedTypeError> {
        if self.dialect == Dialect::SQLite {
            return Err(UnsupportedTypeError::ReverseMappingUnsupported {
                type_name: type_name.to_string(),
                column: Some(column.to_string()),
                dialect: self.dialect,
            });
        }

        let normalized = common::normalize_type_name(type_name);
        let parsed = match self.dialect {
            Dialect::MsSql => mssql_mapper::parse_native_type(&normalized),
            Dialect::Postgres => postgres_mapper::parse_native_type(&normalized),
            Dialect::MySql | Dialect::MariaDb => mysql_mapper::parse_native_type(&normalized),
            Dialect::SQLite => None,
        };

        parsed.ok_or_else(|| UnsupportedTypeError::NativeType {
            type_name: type_name.to_string(),
            column: Some(column.to_string()),
            dialect: self.dialect,
        })
    }

    /// バインドパラメータの型ヒントを取得
    ///
    /// NULL値を型付きNULLとしてバインドするために使用します。
    pub fn db_type(&self, portable_type: &PortableType) -> Result<DbType, UnsupportedTypeError> {
        match portable_type {
            PortableType::String | PortableType::Enum { .. } => Ok(DbType::String),
            PortableType::Integer => Ok(DbType::Int64),
            PortableType::Double => Ok(DbType::Double),
            PortableType::Bool => Ok(DbType::Boolean),
            PortableType::Date => Ok(DbType::DateTime),
            PortableType::Entity => Err(UnsupportedTypeError::NestedEntity {
                column: None,
                dialect: self.dialect,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_types() -> Vec<PortableType> {
        vec![
            PortableType::String,
            PortableType::Integer,
            PortableType::Double,
            PortableType::Bool,
            PortableType::Date,
            PortableType::Enum {
                name: "Color".to_string(),
                values: vec!["red".to_string()],
            },
        ]
    }

    #[test]
    fn test_new_service() {
        let service = TypeMappingService::new(Dialect::Postgres);
        assert_eq!(service.dialect(), Dialect::Postgres);
    }

    #[test]
    fn test_every_scalar_maps_for_every_dialect() {
        for dialect in Dialect::ALL {
            let service = TypeMappingService::new(dialect);
            for portable_type in scalar_types() {
                let native = service.to_native_type(&portable_type).unwrap();
                assert!(!native.is_empty(), "{} / {}", dialect, portable_type);
            }
        }
    }

    #[test]
    fn test_entity_fails_for_every_dialect() {
        for dialect in Dialect::ALL {
            let service = TypeMappingService::new(dialect);
            let err = service.to_native_type(&PortableType::Entity).unwrap_err();
            assert!(matches!(err, UnsupportedTypeError::NestedEntity { .. }));
        }
    }

    #[test]
    fn test_sqlite_reverse_mapping_is_unsupported() {
        let service = TypeMappingService::new(Dialect::SQLite);
        let err = service.from_native_type("INT", "Id").unwrap_err();
        assert!(matches!(
            err,
            UnsupportedTypeError::ReverseMappingUnsupported { .. }
        ));
        assert_eq!(err.column(), Some("Id"));
    }

    #[test]
    fn test_reverse_mapping_error_names_column() {
        let service = TypeMappingService::new(Dialect::Postgres);
        let err = service.from_native_type("geometry", "Shape").unwrap_err();
        assert_eq!(err.column(), Some("Shape"));
        assert!(err.to_string().contains("geometry"));
    }

    #[test]
    fn test_db_type_hints() {
        let service = TypeMappingService::new(Dialect::MsSql);
        assert_eq!(service.db_type(&PortableType::Integer), Ok(DbType::Int64));
        assert_eq!(service.db_type(&PortableType::Date), Ok(DbType::DateTime));
        assert!(service.db_type(&PortableType::Entity).is_err());
    }
}
