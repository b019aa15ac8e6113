//! Typed data contracts for the work tracking, build, test and process
//! services, plus the TypeInfo metadata that turns their JSON wire shape into
//! real dates, enums and nested records.
//!
//! Two ways in:
//!
//! - Typed: [`from_str`] / [`from_value`] decode a payload straight into a
//!   contract such as [`contracts::build::Build`], accepting enum members by
//!   number or by name and parsing every date the metadata names.
//! - Dynamic: [`Decoder::decode`] walks any payload against a named
//!   [`TypeDescriptor`] and returns a [`Decoded`] tree, so unknown enum
//!   values and extra fields survive untouched.
//!
//! ```
//! use devops_contracts::contracts::build::{Build, BuildStatus};
//! use serde_json::json;
//!
//! let build: Build = devops_contracts::from_value(&json!({
//!     "id": 7,
//!     "status": "completed",
//!     "queueTime": "2024-06-01T09:00:00Z"
//! }))?;
//! assert_eq!(build.status, Some(BuildStatus::Completed));
//! assert!(build.queue_time.is_some());
//! # Ok::<(), devops_contracts::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod enums;

mod dates;
mod decoder;
mod encoder;
mod errors;
mod schema;
mod value;

pub mod contracts;

pub use contracts::{Contract, PropertyBag};
pub use dates::{format_date, parse_date};
pub use decoder::{
    from_str, from_value, list_from_value, DatePolicy, Decoder, DecoderConfig, UnknownEnumPolicy,
};
pub use encoder::{to_wire, EnumEncoding, Encoder, EncoderConfig};
pub use enums::{format_enum, lookup_value, parse_enum, ContractEnum};
pub use errors::{
    DanglingReference, DecodeError, DecodeErrorKind, Error, Result, SchemaError,
};
pub use schema::{EnumDescriptor, FieldKind, SchemaRegistry, TypeDescriptor};
pub use value::{Decoded, DictionaryKey, EnumValue};
