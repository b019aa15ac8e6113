//! Decoded JSON tree with native dates and enum values.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::dates::format_date;

/// An enum field after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub value: i32,
    /// Member name (`"a, b"` for combined flags); `None` when unknown.
    pub name: Option<String>,
}

impl EnumValue {
    pub fn is_known(&self) -> bool {
        self.name.is_some()
    }
}

/// Key of a decoded dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictionaryKey {
    Name(String),
    Enum(EnumValue),
}

impl DictionaryKey {
    /// Wire form of the key. Enum keys render as their integer.
    pub fn to_wire(&self) -> String {
        match self {
            DictionaryKey::Name(name) => name.clone(),
            DictionaryKey::Enum(value) => value.value.to_string(),
        }
    }
}

/// A JSON value after TypeInfo conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    Enum(EnumValue),
    Array(Vec<Decoded>),
    Object(IndexMap<String, Decoded>),
    Dictionary(IndexMap<DictionaryKey, Decoded>),
}

impl Decoded {
    /// Convert a JSON value with no conversion rules.
    pub fn plain(value: &Value) -> Self {
        match value {
            Value::Null => Decoded::Null,
            Value::Bool(b) => Decoded::Bool(*b),
            Value::Number(n) => Decoded::Number(n.clone()),
            Value::String(s) => Decoded::String(s.clone()),
            Value::Array(items) => Decoded::Array(items.iter().map(Decoded::plain).collect()),
            Value::Object(map) => Decoded::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Decoded::plain(value)))
                    .collect(),
            ),
        }
    }

    /// Re-encode: dates as RFC 3339 strings, enums as integers.
    pub fn to_json(&self) -> Value {
        match self {
            Decoded::Null => Value::Null,
            Decoded::Bool(b) => Value::Bool(*b),
            Decoded::Number(n) => Value::Number(n.clone()),
            Decoded::String(s) => Value::String(s.clone()),
            Decoded::Date(date) => Value::String(format_date(date)),
            Decoded::Enum(value) => Value::from(value.value),
            Decoded::Array(items) => Value::Array(items.iter().map(Decoded::to_json).collect()),
            Decoded::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            Decoded::Dictionary(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.to_wire(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Decoded::Null)
    }

    /// Field of an object, or entry of a name-keyed dictionary.
    pub fn get(&self, key: &str) -> Option<&Decoded> {
        match self {
            Decoded::Object(map) => map.get(key),
            Decoded::Dictionary(map) => map.get(&DictionaryKey::Name(key.to_string())),
            _ => None,
        }
    }

    /// Walk a chain of object keys.
    pub fn pointer<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&Decoded> {
        keys.into_iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Decoded::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Decoded::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Decoded]> {
        match self {
            Decoded::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&IndexMap<DictionaryKey, Decoded>> {
        match self {
            Decoded::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Decoded::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dates::parse_date;

    #[test]
    fn plain_conversion_round_trips() {
        let raw = json!({"b": [1, "two", null, {"c": true}], "a": 1.5});
        let decoded = Decoded::plain(&raw);
        assert_eq!(decoded.to_json(), raw);
    }

    #[test]
    fn plain_conversion_keeps_key_order() {
        let raw: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": 2}"#).unwrap();
        let Decoded::Object(map) = Decoded::plain(&raw) else {
            panic!("expected object");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn dates_and_enums_re_encode() {
        let mut dict = IndexMap::new();
        dict.insert(
            DictionaryKey::Enum(EnumValue {
                value: 2,
                name: Some("completed".into()),
            }),
            Decoded::Date(parse_date("2024-01-01T00:00:00Z").unwrap()),
        );
        let decoded = Decoded::Object(IndexMap::from([
            (
                "status".to_string(),
                Decoded::Enum(EnumValue {
                    value: 77,
                    name: None,
                }),
            ),
            ("byState".to_string(), Decoded::Dictionary(dict)),
        ]));

        assert_eq!(
            decoded.to_json(),
            json!({"status": 77, "byState": {"2": "2024-01-01T00:00:00Z"}})
        );
        assert_eq!(
            decoded
                .pointer(["status"])
                .and_then(Decoded::as_enum)
                .map(EnumValue::is_known),
            Some(false)
        );
    }
}
