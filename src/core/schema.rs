// スキーマドメインモデル
//
// 方言に依存しないテーブル形状の表現。
// PortableType, Multiplicity, SchemaProperty, Schema を提供します。

use crate::core::error::SchemaConstraintError;
use serde::{Deserialize, Serialize};

/// ポータブル型
///
/// 全方言で共通のスカラー型の集合です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PortableType {
    /// 文字列型
    String,

    /// 整数型
    Integer,

    /// 浮動小数点数型
    Double,

    /// 真偽値型
    Bool,

    /// 日付・日時型
    Date,

    /// 列挙型（値は文字列として格納）
    Enum {
        /// 列挙型名
        name: String,
        /// 許可される値（順序を保持）
        values: Vec<String>,
    },

    /// ネストしたエンティティ（どの方言でもカラム型としては非対応）
    Entity,
}

impl std::fmt::Display for PortableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortableType::String => write!(f, "String"),
            PortableType::Integer => write!(f, "Integer"),
            PortableType::Double => write!(f, "Double"),
            PortableType::Bool => write!(f, "Bool"),
            PortableType::Date => write!(f, "Date"),
            PortableType::Enum { name, .. } => write!(f, "Enum({})", name),
            PortableType::Entity => write!(f, "Entity"),
        }
    }
}

/// 多重度
///
/// カラム値の存在に関する制約。ExactlyOne と UpToOne だけが
/// SQLのカラム制約（NOT NULL / NULL）として表現できます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    ExactlyOne,
    UpToOne,
    AtLeastOne,
    Any,
}

impl Multiplicity {
    /// NULL許可かどうか
    ///
    /// SQLカラム制約で表現できない多重度の場合は None を返します。
    pub fn nullable(&self) -> Option<bool> {
        match self {
            Multiplicity::ExactlyOne => Some(false),
            Multiplicity::UpToOne => Some(true),
            Multiplicity::AtLeastOne | Multiplicity::Any => None,
        }
    }

    /// NULL許可フラグから多重度を作成
    pub fn from_nullable(nullable: bool) -> Self {
        if nullable {
            Multiplicity::UpToOne
        } else {
            Multiplicity::ExactlyOne
        }
    }
}

impl std::fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Multiplicity::ExactlyOne => write!(f, "ExactlyOne"),
            Multiplicity::UpToOne => write!(f, "UpToOne"),
            Multiplicity::AtLeastOne => write!(f, "AtLeastOne"),
            Multiplicity::Any => write!(f, "Any"),
        }
    }
}

/// 追加プロパティの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPropertyBehavior {
    /// 未定義のプロパティを拒否
    #[default]
    Fail,
    /// 未定義のプロパティを許可（DDLでは表現不可）
    Allow,
    /// 未定義のプロパティを無視
    Ignore,
}

/// スキーマプロパティ（1カラム分）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// プロパティ名（カラム名）
    pub name: String,

    /// ポータブル型
    #[serde(rename = "type")]
    pub property_type: PortableType,

    /// 多重度
    pub multiplicity: Multiplicity,
}

impl SchemaProperty {
    /// 新しいプロパティを作成
    pub fn new(name: impl Into<String>, property_type: PortableType, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.into(),
            property_type,
            multiplicity,
        }
    }

    /// 列挙型の場合は許可される値を返す
    pub fn enum_values(&self) -> Option<&[String]> {
        match &self.property_type {
            PortableType::Enum { values, .. } => Some(values),
            _ => None,
        }
    }
}

/// スキーマ定義
///
/// 1テーブル分の形状を表現します。プロパティの挿入順が
/// 生成されるSQLのカラム順になります。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// スキーマ名（テーブル名）
    pub name: String,

    /// 追加プロパティの扱い
    #[serde(default)]
    pub extra_properties: ExtraPropertyBehavior,

    /// プロパティ定義のリスト（順序を保持）
    #[serde(default)]
    pub properties: Vec<SchemaProperty>,
}

impl Schema {
    /// 新しいスキーマを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra_properties: ExtraPropertyBehavior::Fail,
            properties: Vec::new(),
        }
    }

    /// 追加プロパティの扱いを指定したスキーマを返す
    pub fn with_extra_properties(mut self, behavior: ExtraPropertyBehavior) -> Self {
        self.extra_properties = behavior;
        self
    }

    /// プロパティを追加したスキーマを返す
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        property_type: PortableType,
        multiplicity: Multiplicity,
    ) -> Result<Self, SchemaConstraintError> {
        self.add_property(SchemaProperty::new(name, property_type, multiplicity))?;
        Ok(self)
    }

    /// プロパティを追加
    ///
    /// 同名のプロパティが既に存在する場合はエラーになります。
    pub fn add_property(&mut self, property: SchemaProperty) -> Result<(), SchemaConstraintError> {
        if self.has_property(&property.name) {
            return Err(SchemaConstraintError::DuplicateProperty {
                column: property.name,
            });
        }
        self.properties.push(property);
        Ok(())
    }

    /// 指定されたプロパティが存在するか確認
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// 指定されたプロパティを取得
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// プロパティ数（カラム数）を取得
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// 重複しているプロパティ名を列挙
    ///
    /// デシリアライズ経由で構築されたスキーマは add_property を通らないため、
    /// DDL生成前にこのメソッドで検査します。
    pub fn duplicate_property_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) && !duplicates.contains(&property.name.as_str())
            {
                duplicates.push(property.name.as_str());
            }
        }
        duplicates
    }
}
