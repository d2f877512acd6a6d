// レコードモデル
//
// フィールド名 -> スカラー値 の順序付きマッピング。
// INSERTの入力とクエリ結果の両方で使用し、スキーマへの適用（型変換と検証）を提供します。

use crate::core::error::RecordError;
use crate::core::schema::{ExtraPropertyBehavior, PortableType, Schema, SchemaProperty};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// スカラー値
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Double(f64),
    Bool(bool),
    /// 列挙値のタグ
    Enum(String),
    Date(NaiveDateTime),
}

impl Value {
    /// NULLかどうか
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// 文字列として参照（String / Enum のみ）
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// JSON値から変換
    ///
    /// 配列とオブジェクトはスカラーではないため拒否します。
    pub fn from_json(value: &serde_json::Value) -> Result<Value, String> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Double(f))
                } else {
                    Err(format!("number {} is out of range", n))
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Array(_) => Err("arrays are not scalar values".to_string()),
            serde_json::Value::Object(_) => Err("nested objects are not scalar values".to_string()),
        }
    }

    /// JSON値に変換
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) | Value::Enum(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Double(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        }
    }

    /// テキスト表現（NULLの場合は None）
    fn render_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) | Value::Enum(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Double(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Date(d) => Some(d.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Enum(_) => "enum",
            Value::Date(_) => "date",
        }
    }
}

/// レコード
///
/// フィールドの挿入順を保持します。同名フィールドの再挿入は値を置き換えます。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// 空のレコードを作成
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// フィールドを追加したレコードを返す
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// フィールドを追加（既存の場合は置き換え）
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// フィールド値を取得
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// フィールド値を取得（完全一致がなければ大文字小文字を無視）
    pub fn find(&self, name: &str) -> Option<(&str, &Value)> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.fields.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(n, v)| (n.as_str(), v))
    }

    /// 位置を指定して値を取得
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.fields.get(index).map(|(_, v)| v)
    }

    /// フィールド数を取得
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// フィールドがないかどうか
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// フィールドを順に参照
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// JSONオブジェクトから変換
    pub fn from_json_object(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Record, String> {
        let mut record = Record::new();
        for (name, value) in object {
            let value = Value::from_json(value).map_err(|e| format!("field '{}': {}", name, e))?;
            record.insert(name.clone(), value);
        }
        Ok(record)
    }

    /// JSONオブジェクトに変換
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// レコードにスキーマを適用
///
/// 戻り値のレコードはスキーマのプロパティ順に並び、各値は宣言された型に
/// 変換済みです。不適合なフィールドはすべて収集して返します。
///
/// # Arguments
///
/// * `schema` - 適用するスキーマ
/// * `record` - 入力レコード
/// * `row` - 入力全体でのレコード位置（エラー報告用）
pub fn apply_schema(schema: &Schema, record: &Record, row: usize) -> Result<Record, Vec<RecordError>> {
    let mut errors = Vec::new();
    let mut output = Record::new();
    let mut consumed = Vec::with_capacity(schema.property_count());

    for property in &schema.properties {
        let value = match record.find(&property.name) {
            Some((field_name, value)) => {
                consumed.push(field_name);
                value.clone()
            }
            None => Value::Null,
        };

        match coerce_value(property, value) {
            Ok(value) => output.insert(property.name.clone(), value),
            Err(message) => errors.push(RecordError {
                row,
                field: property.name.clone(),
                message,
            }),
        }
    }

    if schema.extra_properties == ExtraPropertyBehavior::Fail {
        for (name, _) in record.iter() {
            if !consumed.contains(&name) {
                errors.push(RecordError {
                    row,
                    field: name.to_string(),
                    message: format!("field is not defined in schema '{}'", schema.name),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(output)
    } else {
        Err(errors)
    }
}

/// 値をプロパティの型と多重度に合わせて変換
fn coerce_value(property: &SchemaProperty, value: Value) -> Result<Value, String> {
    if value.is_null() {
        return match property.multiplicity.nullable() {
            Some(true) => Ok(Value::Null),
            Some(false) => Err("value is required but missing or null".to_string()),
            None => Err(format!(
                "multiplicity '{}' cannot be stored in a single column",
                property.multiplicity
            )),
        };
    }

    let kind = value.kind_name();
    let mismatch = || format!("cannot convert {} value to {}", kind, property.property_type);

    match &property.property_type {
        PortableType::String => value.render_text().map(Value::String).ok_or_else(mismatch),
        PortableType::Integer => match value {
            Value::Integer(i) => Ok(Value::Integer(i)),
            Value::Double(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Ok(Value::Integer(f as i64))
            }
            Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        PortableType::Double => match value {
            Value::Double(f) => Ok(Value::Double(f)),
            Value::Integer(i) => Ok(Value::Double(i as f64)),
            Value::String(s) => s.trim().parse::<f64>().map(Value::Double).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        PortableType::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::Integer(0) => Ok(Value::Bool(false)),
            Value::Integer(1) => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },
        PortableType::Date => match value {
            Value::Date(d) => Ok(Value::Date(d)),
            Value::String(s) => parse_date(&s).map(Value::Date).ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        PortableType::Enum { name, values } => match value.as_str() {
            Some(tag) if values.iter().any(|v| v == tag) => Ok(Value::Enum(tag.to_string())),
            Some(tag) => Err(format!("'{}' is not a member of enum '{}'", tag, name)),
            None => Err(mismatch()),
        },
        PortableType::Entity => Err("nested entities cannot be stored in a column".to_string()),
    }
}

/// 日付文字列を解析
///
/// RFC 3339、`YYYY-MM-DD HH:MM:SS[.f]`、`YYYY-MM-DDTHH:MM:SS[.f]`、`YYYY-MM-DD` を受け付けます。
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Multiplicity;

    fn orders_schema() -> Schema {
        Schema::new("Orders")
            .with_property("Id", PortableType::Integer, Multiplicity::ExactlyOne)
            .and_then(|s| s.with_property("Note", PortableType::String, Multiplicity::UpToOne))
            .and_then(|s| {
                s.with_property(
                    "Status",
                    PortableType::Enum {
                        name: "OrderStatus".to_string(),
                        values: vec!["open".to_string(), "closed".to_string()],
                    },
                    Multiplicity::ExactlyOne,
                )
            })
            .unwrap()
    }

    #[test]
    fn test_record_insert_replaces_existing() {
        let record = Record::new()
            .with_field("a", Value::Integer(1))
            .with_field("a", Value::Integer(2));
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("a"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_record_find_falls_back_to_case_insensitive() {
        let record = Record::new().with_field("userName", Value::String("x".to_string()));
        assert_eq!(record.find("UserName").map(|(n, _)| n), Some("userName"));
        assert!(record.get("UserName").is_none());
    }

    #[test]
    fn test_apply_schema_orders_and_coerces() {
        let record = Record::new()
            .with_field("Status", Value::String("open".to_string()))
            .with_field("Id", Value::String("42".to_string()));

        let applied = apply_schema(&orders_schema(), &record, 0).unwrap();
        let fields: Vec<(&str, &Value)> = applied.iter().collect();
        assert_eq!(
            fields,
            vec![
                ("Id", &Value::Integer(42)),
                ("Note", &Value::Null),
                ("Status", &Value::Enum("open".to_string())),
            ]
        );
    }

    #[test]
    fn test_apply_schema_collects_all_errors() {
        let record = Record::new()
            .with_field("Id", Value::String("forty-two".to_string()))
            .with_field("Status", Value::String("pending".to_string()))
            .with_field("Extra", Value::Bool(true));

        let errors = apply_schema(&orders_schema(), &record, 5).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["Id", "Status", "Extra"]);
        assert!(errors.iter().all(|e| e.row == 5));
    }

    #[test]
    fn test_apply_schema_ignores_extra_fields_when_not_fail() {
        let schema = orders_schema().with_extra_properties(ExtraPropertyBehavior::Ignore);
        let record = Record::new()
            .with_field("Id", Value::Integer(1))
            .with_field("Status", Value::Enum("closed".to_string()))
            .with_field("Extra", Value::Bool(true));

        let applied = apply_schema(&schema, &record, 0).unwrap();
        assert!(applied.get("Extra").is_none());
    }

    #[test]
    fn test_missing_required_field() {
        let record = Record::new().with_field("Status", Value::String("open".to_string()));
        let errors = apply_schema(&orders_schema(), &record, 0).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "Id");
    }

    #[test]
    fn test_coerce_bool_and_double() {
        let flag = SchemaProperty::new("Flag", PortableType::Bool, Multiplicity::ExactlyOne);
        assert_eq!(coerce_value(&flag, Value::Integer(1)), Ok(Value::Bool(true)));
        assert_eq!(coerce_value(&flag, Value::String("FALSE".to_string())), Ok(Value::Bool(false)));
        assert!(coerce_value(&flag, Value::Integer(7)).is_err());

        let price = SchemaProperty::new("Price", PortableType::Double, Multiplicity::ExactlyOne);
        assert_eq!(coerce_value(&price, Value::Integer(3)), Ok(Value::Double(3.0)));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .unwrap();
        assert_eq!(parse_date("2024-03-01 12:30:00"), Some(expected));
        assert_eq!(parse_date("2024-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_date("2024-03-01T12:30:00Z"), Some(expected));
        assert_eq!(
            parse_date("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_record_from_json_object() {
        let json = serde_json::json!({ "Id": 1, "Price": 2.5, "Name": null });
        let record = Record::from_json_object(json.as_object().unwrap()).unwrap();
        assert_eq!(record.get("Id"), Some(&Value::Integer(1)));
        assert_eq!(record.get("Price"), Some(&Value::Double(2.5)));
        assert_eq!(record.get("Name"), Some(&Value::Null));

        let nested = serde_json::json!({ "Tags": ["a"] });
        assert!(Record::from_json_object(nested.as_object().unwrap()).is_err());
    }
}
