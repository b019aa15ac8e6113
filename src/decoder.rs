//! TypeInfo-driven JSON decoder.
//!
//! The decoder interprets [`TypeDescriptor`]s from a [`SchemaRegistry`]: date
//! fields become timestamps, enum fields become [`EnumValue`]s, nested
//! objects/arrays/dictionaries recurse. Fields without a rule pass through.

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    contracts::Contract,
    dates::parse_date,
    errors::{DecodeError, DecodeErrorKind, Result},
    schema::{EnumDescriptor, FieldKind, SchemaRegistry},
    value::{Decoded, DictionaryKey, EnumValue},
};

/// What to do with an enum value missing from its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownEnumPolicy {
    /// Keep the raw value (numbers) or the raw string (names).
    #[default]
    Preserve,
    /// Fail the decode.
    Reject,
}

/// What to do with a date field that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    #[default]
    Strict,
    /// Keep the raw string.
    Lenient,
}

/// Decoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub unknown_enums: UnknownEnumPolicy,
    pub dates: DatePolicy,
    /// Unwrap top-level `{ "count": n, "value": [...] }` envelopes.
    pub unwrap_collections: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            unknown_enums: UnknownEnumPolicy::Preserve,
            dates: DatePolicy::Strict,
            unwrap_collections: true,
        }
    }
}

impl DecoderConfig {
    pub fn with_unknown_enums(mut self, policy: UnknownEnumPolicy) -> Self {
        self.unknown_enums = policy;
        self
    }

    pub fn with_dates(mut self, policy: DatePolicy) -> Self {
        self.dates = policy;
        self
    }

    pub fn with_unwrap_collections(mut self, unwrap: bool) -> Self {
        self.unwrap_collections = unwrap;
        self
    }

    /// Reject unknown enum values and malformed dates.
    pub fn strict() -> Self {
        Self::default().with_unknown_enums(UnknownEnumPolicy::Reject)
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment<'v> {
    Key(&'v str),
    Index(usize),
}

/// Location inside the input, rendered only when an error is raised.
#[derive(Debug, Default)]
struct Path<'v>(Vec<Segment<'v>>);

impl<'v> Path<'v> {
    fn render(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                Segment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(self.render(), kind)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Interpreter over a schema registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r SchemaRegistry,
    config: DecoderConfig,
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder<'static> {
    /// Decoder over the builtin registry with default options.
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::builtin(),
            config: DecoderConfig::default(),
        }
    }
}

impl<'r> Decoder<'r> {
    pub fn with_registry(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            config: DecoderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Decode a payload of the named type.
    ///
    /// A top-level array decodes element-wise; a wrapped collection is
    /// unwrapped first when configured.
    pub fn decode(&self, value: &Value, type_name: &str) -> Result<Decoded, DecodeError> {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!("devops_contracts.decode", type_name = %type_name);
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        let mut path = Path::default();
        let kind = FieldKind::object(type_name);
        let value = self.unwrap_collection(value);
        match value {
            Value::Array(items) => self.decode_array(items, &kind, &mut path),
            _ => self.decode_kind(value, &kind, &mut path),
        }
    }

    /// Decode one value against a field rule.
    pub fn decode_field(&self, value: &Value, kind: &FieldKind) -> Result<Decoded, DecodeError> {
        self.decode_kind(value, kind, &mut Path::default())
    }

    /// Decode and re-encode: dates as RFC 3339, enums as integers.
    pub fn normalize(&self, value: &Value, type_name: &str) -> Result<Value, DecodeError> {
        Ok(self.decode(value, type_name)?.to_json())
    }

    /// Decode one record into a typed contract.
    ///
    /// The value must be a single object: envelopes and arrays belong to
    /// [`Decoder::decode_list`].
    pub fn decode_as<T: Contract>(&self, value: &Value) -> Result<T> {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!("devops_contracts.decode", type_name = %T::TYPE_NAME);
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        let kind = FieldKind::object(T::TYPE_NAME);
        let decoded = self.decode_kind(value, &kind, &mut Path::default())?;
        Ok(serde_json::from_value(decoded.to_json())?)
    }

    /// Decode a list response (bare array or wrapped collection).
    pub fn decode_list<T: Contract>(&self, value: &Value) -> Result<Vec<T>> {
        let normalized = match self.unwrap_collection(value) {
            Value::Array(items) => {
                let kind = FieldKind::object(T::TYPE_NAME);
                self.decode_array(items, &kind, &mut Path::default())?
                    .to_json()
            }
            other => {
                let found = json_kind(other);
                return Err(Path::default()
                    .error(DecodeErrorKind::TypeMismatch {
                        expected: "array",
                        found,
                    })
                    .into());
            }
        };
        Ok(serde_json::from_value(normalized)?)
    }

    fn unwrap_collection<'v>(&self, value: &'v Value) -> &'v Value {
        if !self.config.unwrap_collections {
            return value;
        }
        match value {
            Value::Object(map)
                if map.len() == 2
                    && map.get("count").is_some_and(Value::is_number)
                    && map.get("value").is_some_and(Value::is_array) =>
            {
                &map["value"]
            }
            _ => value,
        }
    }

    fn decode_kind<'v>(
        &self,
        value: &'v Value,
        kind: &FieldKind,
        path: &mut Path<'v>,
    ) -> Result<Decoded, DecodeError> {
        if value.is_null() {
            return Ok(Decoded::Null);
        }
        match kind {
            FieldKind::Date => self.decode_date(value, path),
            FieldKind::Enum(name) => {
                let descriptor = self
                    .registry
                    .enum_info(name)
                    .ok_or_else(|| path.error(DecodeErrorKind::UnknownEnum(name.clone())))?;
                self.decode_enum(value, descriptor, path)
            }
            FieldKind::Object(name) => self.decode_object(value, name, path),
            FieldKind::Array(element) => match value {
                Value::Array(items) => self.decode_array(items, element, path),
                other => Err(path.error(DecodeErrorKind::TypeMismatch {
                    expected: "array",
                    found: json_kind(other),
                })),
            },
            FieldKind::Dictionary { key, value: entry } => {
                self.decode_dictionary(value, key.as_deref(), entry.as_deref(), path)
            }
        }
    }

    fn decode_object<'v>(
        &self,
        value: &'v Value,
        type_name: &str,
        path: &mut Path<'v>,
    ) -> Result<Decoded, DecodeError> {
        let descriptor = self
            .registry
            .type_info(type_name)
            .ok_or_else(|| path.error(DecodeErrorKind::UnknownType(type_name.to_string())))?;
        let Value::Object(map) = value else {
            return Err(path.error(DecodeErrorKind::TypeMismatch {
                expected: "object",
                found: json_kind(value),
            }));
        };

        let mut out = IndexMap::with_capacity(map.len());
        for (key, field) in map {
            let decoded = match descriptor.get(key) {
                Some(kind) => {
                    path.0.push(Segment::Key(key));
                    let decoded = self.decode_kind(field, kind, path);
                    path.0.pop();
                    decoded?
                }
                None => Decoded::plain(field),
            };
            out.insert(key.clone(), decoded);
        }
        Ok(Decoded::Object(out))
    }

    fn decode_array<'v>(
        &self,
        items: &'v [Value],
        element: &FieldKind,
        path: &mut Path<'v>,
    ) -> Result<Decoded, DecodeError> {
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path.0.push(Segment::Index(index));
            let decoded = self.decode_kind(item, element, path);
            path.0.pop();
            out.push(decoded?);
        }
        Ok(Decoded::Array(out))
    }

    fn decode_dictionary<'v>(
        &self,
        value: &'v Value,
        key_enum: Option<&str>,
        entry: Option<&FieldKind>,
        path: &mut Path<'v>,
    ) -> Result<Decoded, DecodeError> {
        let Value::Object(map) = value else {
            return Err(path.error(DecodeErrorKind::TypeMismatch {
                expected: "object",
                found: json_kind(value),
            }));
        };
        let key_descriptor = match key_enum {
            Some(name) => Some(
                self.registry
                    .enum_info(name)
                    .ok_or_else(|| path.error(DecodeErrorKind::UnknownEnum(name.to_string())))?,
            ),
            None => None,
        };

        let mut out = IndexMap::with_capacity(map.len());
        for (key, item) in map {
            path.0.push(Segment::Key(key));
            let decoded_key = match key_descriptor {
                Some(descriptor) => match self.enum_from_name(key, descriptor, path)? {
                    Decoded::Enum(value) => DictionaryKey::Enum(value),
                    _ => DictionaryKey::Name(key.clone()),
                },
                None => DictionaryKey::Name(key.clone()),
            };
            let decoded = match entry {
                Some(kind) => self.decode_kind(item, kind, path),
                None => Ok(Decoded::plain(item)),
            };
            if out.contains_key(&decoded_key) {
                return Err(path.error(DecodeErrorKind::DuplicateKey(key.clone())));
            }
            path.0.pop();
            out.insert(decoded_key, decoded?);
        }
        Ok(Decoded::Dictionary(out))
    }

    fn decode_date(&self, value: &Value, path: &Path<'_>) -> Result<Decoded, DecodeError> {
        let Value::String(raw) = value else {
            return Err(path.error(DecodeErrorKind::TypeMismatch {
                expected: "date string",
                found: json_kind(value),
            }));
        };
        match parse_date(raw) {
            Some(date) => Ok(Decoded::Date(date)),
            None if self.config.dates == DatePolicy::Lenient => {
                #[cfg(feature = "tracing")]
                tracing::warn!(path = %path.render(), raw = %raw, "keeping unparseable date");
                Ok(Decoded::String(raw.clone()))
            }
            None => Err(path.error(DecodeErrorKind::InvalidDate(raw.clone()))),
        }
    }

    fn decode_enum(
        &self,
        value: &Value,
        descriptor: &EnumDescriptor,
        path: &Path<'_>,
    ) -> Result<Decoded, DecodeError> {
        match value {
            Value::Number(number) => {
                let raw = number
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| path.error(DecodeErrorKind::ValueOutOfRange(number.to_string())))?;
                self.enum_from_value(raw, descriptor, path)
            }
            Value::String(name) => self.enum_from_name(name, descriptor, path),
            other => Err(path.error(DecodeErrorKind::TypeMismatch {
                expected: "enum number or name",
                found: json_kind(other),
            })),
        }
    }

    fn enum_from_value(
        &self,
        raw: i32,
        descriptor: &EnumDescriptor,
        path: &Path<'_>,
    ) -> Result<Decoded, DecodeError> {
        let name = descriptor.name_of(raw);
        if name.is_none() {
            if self.config.unknown_enums == UnknownEnumPolicy::Reject {
                return Err(path.error(DecodeErrorKind::UnknownEnumValue {
                    enum_name: descriptor.name().to_string(),
                    value: raw,
                }));
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                path = %path.render(),
                enum_name = descriptor.name(),
                value = raw,
                "preserving unknown enum value"
            );
        }
        Ok(Decoded::Enum(EnumValue { value: raw, name }))
    }

    fn enum_from_name(
        &self,
        raw: &str,
        descriptor: &EnumDescriptor,
        path: &Path<'_>,
    ) -> Result<Decoded, DecodeError> {
        match descriptor.value_of(raw) {
            Some(value) => self.enum_from_value(value, descriptor, path),
            None if self.config.unknown_enums == UnknownEnumPolicy::Preserve => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    path = %path.render(),
                    enum_name = descriptor.name(),
                    name = raw,
                    "preserving unknown enum name"
                );
                Ok(Decoded::String(raw.to_string()))
            }
            None => Err(path.error(DecodeErrorKind::UnknownEnumName {
                enum_name: descriptor.name().to_string(),
                name: raw.to_string(),
            })),
        }
    }
}

/// Decode a typed contract from JSON text with the builtin registry.
pub fn from_str<T: Contract>(json: &str) -> Result<T> {
    let value: Value = serde_json::from_str(json)?;
    from_value(&value)
}

/// Decode a typed contract from a JSON value with the builtin registry.
pub fn from_value<T: Contract>(value: &Value) -> Result<T> {
    Decoder::new().decode_as(value)
}

/// Decode a list of typed contracts, unwrapping `{ count, value }` envelopes.
pub fn list_from_value<T: Contract>(value: &Value) -> Result<Vec<T>> {
    Decoder::new().decode_list(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{EnumDescriptor, TypeDescriptor};

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register_enum(EnumDescriptor::new(
                "test.State",
                vec![("pending".into(), 0), ("done".into(), 2)],
                false,
            ))
            .register_enum(EnumDescriptor::new(
                "test.Days",
                vec![("monday".into(), 1), ("tuesday".into(), 2), ("all".into(), 3)],
                true,
            ))
            .register_type(
                TypeDescriptor::new("test.Step")
                    .date("startedOn")
                    .enumeration("state", "test.State"),
            )
            .register_type(
                TypeDescriptor::new("test.Job")
                    .date("queuedOn")
                    .enumeration("days", "test.Days")
                    .array("steps", "test.Step")
                    .array_of("checkpoints", FieldKind::Date)
                    .dictionary("byState", Some("test.State"), Some(FieldKind::object("test.Step")))
                    .dictionary("labels", None, Some(FieldKind::enumeration("test.State"))),
            );
        registry
    }

    #[test]
    fn decodes_nested_rules() {
        let registry = registry();
        let decoder = Decoder::with_registry(&registry);
        let job = decoder
            .decode(
                &json!({
                    "id": 7,
                    "queuedOn": "2024-01-01T00:00:00Z",
                    "days": "monday, tuesday",
                    "steps": [
                        {"state": 2, "startedOn": "2024-01-01T00:00:05.5Z"},
                        {"state": "PENDING"}
                    ],
                    "checkpoints": [],
                    "byState": {"done": {"state": 2}},
                    "labels": {"x": 0}
                }),
                "test.Job",
            )
            .unwrap();

        assert_eq!(job.get("id"), Some(&Decoded::Number(7.into())));
        assert!(job.get("queuedOn").and_then(Decoded::as_date).is_some());
        assert_eq!(
            job.get("days").and_then(Decoded::as_enum),
            Some(&EnumValue {
                value: 3,
                name: Some("all".into())
            })
        );
        let steps = job.get("steps").and_then(Decoded::as_array).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].get("state").and_then(Decoded::as_enum).unwrap().value, 0);
        assert_eq!(job.get("checkpoints").and_then(Decoded::as_array), Some(&[][..]));

        let by_state = job.get("byState").and_then(Decoded::as_dictionary).unwrap();
        let (key, _) = by_state.first().unwrap();
        assert_eq!(
            key,
            &DictionaryKey::Enum(EnumValue {
                value: 2,
                name: Some("done".into())
            })
        );
        assert_eq!(
            job.to_json()["byState"],
            json!({"2": {"state": 2}})
        );
    }

    #[test]
    fn errors_carry_the_path() {
        let registry = registry();
        let decoder = Decoder::with_registry(&registry);
        let err = decoder
            .decode(
                &json!({"steps": [{}, {"startedOn": "soon"}]}),
                "test.Job",
            )
            .unwrap_err();
        assert_eq!(err.path, "$.steps[1].startedOn");
        assert_eq!(err.kind, DecodeErrorKind::InvalidDate("soon".into()));
    }

    #[test]
    fn lenient_dates_keep_the_string() {
        let registry = registry();
        let decoder = Decoder::with_registry(&registry)
            .with_config(DecoderConfig::default().with_dates(DatePolicy::Lenient));
        let step = decoder
            .decode(&json!({"startedOn": "soon"}), "test.Step")
            .unwrap();
        assert_eq!(step.get("startedOn").and_then(Decoded::as_str), Some("soon"));
    }

    #[test]
    fn unknown_enum_values_follow_policy() {
        let registry = registry();
        let preserve = Decoder::with_registry(&registry);
        let step = preserve
            .decode(&json!({"state": 9}), "test.Step")
            .unwrap();
        assert_eq!(
            step.get("state").and_then(Decoded::as_enum),
            Some(&EnumValue {
                value: 9,
                name: None
            })
        );
        let named = preserve
            .decode(&json!({"state": "archived"}), "test.Step")
            .unwrap();
        assert_eq!(named.get("state").and_then(Decoded::as_str), Some("archived"));

        let strict = Decoder::with_registry(&registry).with_config(DecoderConfig::strict());
        let err = strict.decode(&json!({"state": 9}), "test.Step").unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::UnknownEnumValue {
                enum_name: "test.State".into(),
                value: 9
            }
        );
    }

    #[test]
    fn shape_mismatches_are_errors() {
        let registry = registry();
        let decoder = Decoder::with_registry(&registry);
        let err = decoder
            .decode(&json!({"steps": {"state": 0}}), "test.Job")
            .unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::TypeMismatch {
                expected: "array",
                found: "object"
            }
        );
        let err = decoder
            .decode(&json!({"state": true}), "test.Step")
            .unwrap_err();
        assert_eq!(err.path, "$.state");

        let err = decoder
            .decode(&json!({"state": 4294967296u64}), "test.Step")
            .unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::ValueOutOfRange("4294967296".into())
        );
    }

    #[test]
    fn nulls_pass_for_every_kind() {
        let registry = registry();
        let decoder = Decoder::with_registry(&registry);
        let job = decoder
            .decode(
                &json!({"queuedOn": null, "days": null, "steps": null, "byState": null}),
                "test.Job",
            )
            .unwrap();
        assert!(job.get("steps").unwrap().is_null());
        assert!(job.get("days").unwrap().is_null());
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = registry();
        let err = Decoder::with_registry(&registry)
            .decode(&json!({}), "test.Nope")
            .unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnknownType("test.Nope".into()));
        assert_eq!(err.path, "$");
    }

    #[test]
    fn wrapped_collections_unwrap_when_configured() {
        let registry = registry();
        let payload = json!({"count": 2, "value": [{"state": 0}, {"state": 2}]});

        let decoded = Decoder::with_registry(&registry)
            .decode(&payload, "test.Step")
            .unwrap();
        assert_eq!(decoded.as_array().map(<[Decoded]>::len), Some(2));

        let kept = Decoder::with_registry(&registry)
            .with_config(DecoderConfig::default().with_unwrap_collections(false))
            .decode(&payload, "test.Step")
            .unwrap();
        assert_eq!(kept.get("count"), Some(&Decoded::Number(2.into())));
    }

    #[test]
    fn enum_keys_naming_the_same_member_are_rejected() {
        let registry = registry();
        let decoder = Decoder::with_registry(&registry);
        let err = decoder
            .decode(
                &json!({"byState": {"done": {"state": 2}, "2": {"state": 0}}}),
                "test.Job",
            )
            .unwrap_err();
        assert_eq!(err.path, "$.byState.2");
        assert_eq!(err.kind, DecodeErrorKind::DuplicateKey("2".into()));

        let labels = decoder
            .decode(&json!({"labels": {"done": 2, "2": 0}}), "test.Job")
            .unwrap();
        assert_eq!(labels.get("labels").and_then(Decoded::as_dictionary).map(IndexMap::len), Some(2));
    }
}
