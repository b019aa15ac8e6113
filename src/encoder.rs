//! Request-body encoding: the inverse of the decoder.
//!
//! Typed contracts serialize enums as integers. Some endpoints (JSON patch
//! documents, several settings APIs) expect member names instead; the encoder
//! rewrites enum fields per descriptor and normalizes date strings.

use serde_json::{Map, Value};

use crate::{
    contracts::Contract,
    dates::{format_date, parse_date},
    errors::{DecodeError, DecodeErrorKind, Result},
    schema::{EnumDescriptor, FieldKind, SchemaRegistry},
};

/// Wire form of enum fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumEncoding {
    #[default]
    Numbers,
    /// camelCase member names; flags as `"a, b"`.
    Names,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderConfig {
    pub enum_encoding: EnumEncoding,
}

impl EncoderConfig {
    pub fn with_enum_encoding(mut self, encoding: EnumEncoding) -> Self {
        self.enum_encoding = encoding;
        self
    }
}

/// Rewrites JSON values per descriptor for sending.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'r> {
    registry: &'r SchemaRegistry,
    config: EncoderConfig,
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<'static> {
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::builtin(),
            config: EncoderConfig::default(),
        }
    }
}

impl<'r> Encoder<'r> {
    pub fn with_registry(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            config: EncoderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn enum_encoding(self, encoding: EnumEncoding) -> Self {
        self.with_config(self.config.with_enum_encoding(encoding))
    }

    /// Encode a payload of the named type. Top-level arrays encode element-wise.
    pub fn encode(&self, value: &Value, type_name: &str) -> Result<Value, DecodeError> {
        let kind = FieldKind::object(type_name);
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.encode_kind(item, &kind, "$"))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            _ => self.encode_kind(value, &kind, "$"),
        }
    }

    /// Serialize a typed contract and encode it.
    pub fn to_wire<T: Contract>(&self, contract: &T) -> Result<Value> {
        let value = serde_json::to_value(contract)?;
        Ok(self.encode(&value, T::TYPE_NAME)?)
    }

    fn encode_kind(&self, value: &Value, kind: &FieldKind, path: &str) -> Result<Value, DecodeError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match kind {
            FieldKind::Date => Ok(match value {
                Value::String(raw) => parse_date(raw)
                    .map(|date| Value::String(format_date(&date)))
                    .ok_or_else(|| DecodeError::new(path, DecodeErrorKind::InvalidDate(raw.clone())))?,
                other => other.clone(),
            }),
            FieldKind::Enum(name) => {
                let descriptor = self.enum_descriptor(name, path)?;
                Ok(self.encode_enum(value, descriptor))
            }
            FieldKind::Object(name) => {
                let descriptor = self.registry.type_info(name).ok_or_else(|| {
                    DecodeError::new(path, DecodeErrorKind::UnknownType(name.clone()))
                })?;
                let Value::Object(map) = value else {
                    return Ok(value.clone());
                };
                let mut out = Map::with_capacity(map.len());
                for (key, field) in map {
                    let encoded = match descriptor.get(key) {
                        Some(kind) => self.encode_kind(field, kind, &format!("{path}.{key}"))?,
                        None => field.clone(),
                    };
                    out.insert(key.clone(), encoded);
                }
                Ok(Value::Object(out))
            }
            FieldKind::Array(element) => match value {
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.encode_kind(item, element, &format!("{path}[{index}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                other => Ok(other.clone()),
            },
            FieldKind::Dictionary { key, value: entry } => {
                let Value::Object(map) = value else {
                    return Ok(value.clone());
                };
                let key_descriptor = match key {
                    Some(name) => Some(self.enum_descriptor(name, path)?),
                    None => None,
                };
                let mut out = Map::with_capacity(map.len());
                for (name, item) in map {
                    let encoded_key = match key_descriptor {
                        Some(descriptor) => match self.encode_enum(&Value::String(name.clone()), descriptor) {
                            Value::String(s) => s,
                            other => other.to_string(),
                        },
                        None => name.clone(),
                    };
                    let encoded = match entry {
                        Some(kind) => self.encode_kind(item, kind, &format!("{path}.{name}"))?,
                        None => item.clone(),
                    };
                    out.insert(encoded_key, encoded);
                }
                Ok(Value::Object(out))
            }
        }
    }

    fn enum_descriptor(&self, name: &str, path: &str) -> Result<&'r EnumDescriptor, DecodeError> {
        self.registry
            .enum_info(name)
            .ok_or_else(|| DecodeError::new(path, DecodeErrorKind::UnknownEnum(name.to_string())))
    }

    /// Unknown values and names are left as they are.
    fn encode_enum(&self, value: &Value, descriptor: &EnumDescriptor) -> Value {
        let raw = match value {
            Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(name) => descriptor.value_of(name),
            _ => None,
        };
        let Some(raw) = raw else {
            return value.clone();
        };
        match self.config.enum_encoding {
            EnumEncoding::Numbers => Value::from(raw),
            EnumEncoding::Names => descriptor
                .name_of(raw)
                .map(Value::String)
                .unwrap_or_else(|| Value::from(raw)),
        }
    }
}

/// Serialize a typed contract with the builtin registry.
pub fn to_wire<T: Contract>(contract: &T, encoding: EnumEncoding) -> Result<Value> {
    Encoder::new().enum_encoding(encoding).to_wire(contract)
}
