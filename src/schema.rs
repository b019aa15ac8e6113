//! TypeInfo metadata: which fields of a contract need more than plain JSON.
//!
//! Descriptors live in a [`SchemaRegistry`] keyed by qualified name
//! (`area.Type`) and reference each other by name, so the registry is a flat
//! arena that the decoder interprets.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::{
    contracts::{self, Contract},
    enums::ContractEnum,
    errors::{DanglingReference, SchemaError},
};

/// Conversion rule for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// ISO-8601 string to timestamp.
    Date,
    /// Integer or name to enum value, by enum name.
    Enum(String),
    /// Nested record, by type name.
    Object(String),
    /// Element-wise conversion.
    Array(Box<FieldKind>),
    /// Keys and values converted independently. `key` names an enum.
    Dictionary {
        key: Option<String>,
        value: Option<Box<FieldKind>>,
    },
}

impl FieldKind {
    pub fn enumeration(name: impl Into<String>) -> Self {
        FieldKind::Enum(name.into())
    }

    pub fn object(name: impl Into<String>) -> Self {
        FieldKind::Object(name.into())
    }

    pub fn array(element: FieldKind) -> Self {
        FieldKind::Array(Box::new(element))
    }

    pub fn dictionary(key: Option<&str>, value: Option<FieldKind>) -> Self {
        FieldKind::Dictionary {
            key: key.map(str::to_string),
            value: value.map(Box::new),
        }
    }

    /// Every `(name, is_enum)` reference this kind makes, nested ones included.
    fn references(&self, out: &mut Vec<(String, bool)>) {
        match self {
            FieldKind::Date => {}
            FieldKind::Enum(name) => out.push((name.clone(), true)),
            FieldKind::Object(name) => out.push((name.clone(), false)),
            FieldKind::Array(element) => element.references(out),
            FieldKind::Dictionary { key, value } => {
                if let Some(key) = key {
                    out.push((key.clone(), true));
                }
                if let Some(value) = value {
                    value.references(out);
                }
            }
        }
    }
}

/// Per-type field rules. Fields that need no conversion are not listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    fields: IndexMap<String, FieldKind>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(field.into(), kind);
        self
    }

    pub fn date(self, field: impl Into<String>) -> Self {
        self.field(field, FieldKind::Date)
    }

    pub fn enumeration(self, field: impl Into<String>, enum_name: &str) -> Self {
        self.field(field, FieldKind::enumeration(enum_name))
    }

    pub fn object(self, field: impl Into<String>, type_name: &str) -> Self {
        self.field(field, FieldKind::object(type_name))
    }

    /// Array of nested records.
    pub fn array(self, field: impl Into<String>, type_name: &str) -> Self {
        self.field(field, FieldKind::array(FieldKind::object(type_name)))
    }

    pub fn array_of(self, field: impl Into<String>, element: FieldKind) -> Self {
        self.field(field, FieldKind::array(element))
    }

    pub fn dictionary(
        self,
        field: impl Into<String>,
        key_enum: Option<&str>,
        value: Option<FieldKind>,
    ) -> Self {
        self.field(field, FieldKind::dictionary(key_enum, value))
    }

    pub fn get(&self, field: &str) -> Option<&FieldKind> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldKind)> {
        self.fields.iter().map(|(name, kind)| (name.as_str(), kind))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Name/value table of one enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    members: Vec<(String, i32)>,
    flags: bool,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, members: Vec<(String, i32)>, flags: bool) -> Self {
        Self {
            name: name.into(),
            members,
            flags,
        }
    }

    pub fn of<E: ContractEnum>() -> Self {
        Self::new(
            E::ENUM_NAME,
            E::MEMBERS
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
            E::FLAGS,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[(String, i32)] {
        &self.members
    }

    pub fn is_flags(&self) -> bool {
        self.flags
    }

    pub fn value_of(&self, name: &str) -> Option<i32> {
        crate::enums::parse_enum(self.members.as_slice(), name, self.flags)
    }

    pub fn name_of(&self, value: i32) -> Option<String> {
        crate::enums::format_enum(self.members.as_slice(), value, self.flags)
    }

    /// Whether every bit (flags) or the exact value (discriminants) is named.
    pub fn is_known(&self, value: i32) -> bool {
        self.name_of(value).is_some()
    }
}

/// Arena of type and enum descriptors, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: IndexMap<String, TypeDescriptor>,
    enums: IndexMap<String, EnumDescriptor>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry with every service area.
    pub fn builtin() -> &'static SchemaRegistry {
        static BUILTIN: OnceLock<SchemaRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = SchemaRegistry::new();
            contracts::register_all(&mut registry);
            registry
        })
    }

    /// Register (or replace) a type descriptor.
    pub fn register_type(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Register (or replace) an enum descriptor.
    pub fn register_enum(&mut self, descriptor: EnumDescriptor) -> &mut Self {
        self.enums.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Register the descriptor of a Rust enum or flag set.
    pub fn enumeration<E: ContractEnum>(&mut self) -> &mut Self {
        self.register_enum(EnumDescriptor::of::<E>())
    }

    /// Register the field rules of a typed contract.
    pub fn contract<T, F>(&mut self, describe: F) -> &mut Self
    where
        T: Contract,
        F: FnOnce(TypeDescriptor) -> TypeDescriptor,
    {
        self.register_type(describe(TypeDescriptor::new(T::TYPE_NAME)))
    }

    /// Register a typed contract whose fields all pass through unchanged.
    pub fn plain<T: Contract>(&mut self) -> &mut Self {
        self.register_type(TypeDescriptor::new(T::TYPE_NAME))
    }

    pub fn type_info(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn enum_info(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.values()
    }

    /// Check that every enum and type reference resolves.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut dangling = Vec::new();
        let mut references = Vec::new();
        for descriptor in self.types.values() {
            for (field, kind) in descriptor.fields() {
                references.clear();
                kind.references(&mut references);
                for (target, is_enum) in references.drain(..) {
                    let resolved = if is_enum {
                        self.enums.contains_key(&target)
                    } else {
                        self.types.contains_key(&target)
                    };
                    if !resolved {
                        dangling.push(DanglingReference {
                            owner: descriptor.name.clone(),
                            field: field.to_string(),
                            target,
                            is_enum,
                        });
                    }
                }
            }
        }
        if dangling.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { dangling })
        }
    }
}
