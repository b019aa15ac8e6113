//! Data contracts grouped by service area.
//!
//! Records are declared with `contract!`: every field is optional, camelCase
//! on the wire, and omitted when `None`. Each area also contributes its
//! TypeInfo rules to the builtin [`SchemaRegistry`].

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Serialize};

use crate::schema::SchemaRegistry;

/// A record with a TypeInfo entry in the registry.
pub trait Contract: Serialize + DeserializeOwned {
    /// Qualified schema name, e.g. `build.Build`.
    const TYPE_NAME: &'static str;
}

/// Open-ended property bag, insertion ordered.
pub type PropertyBag = IndexMap<String, serde_json::Value>;

/// Declare a data contract.
macro_rules! contract {
    (
        $(#[$meta:meta])*
        $name:ident($type_name:literal) {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::contracts::Contract for $name {
            const TYPE_NAME: &'static str = $type_name;
        }
    };
}

pub mod build;
pub mod common;
pub mod core;
pub mod dashboard;
pub mod extension_management;
pub mod file_container;
pub mod identities;
pub mod locations;
pub mod notification;
pub mod policy;
pub mod profile;
pub mod task_agent;
pub mod tfvc;
pub mod work;
pub mod work_item_tracking;
pub mod work_item_tracking_process;

/// Populate a registry with every service area.
pub(crate) fn register_all(registry: &mut SchemaRegistry) {
    common::register(registry);
    self::core::register(registry);
    build::register(registry);
    dashboard::register(registry);
    extension_management::register(registry);
    file_container::register(registry);
    identities::register(registry);
    locations::register(registry);
    notification::register(registry);
    policy::register(registry);
    profile::register(registry);
    task_agent::register(registry);
    test::register(registry);
    tfvc::register(registry);
    work::register(registry);
    work_item_tracking::register(registry);
    work_item_tracking_process::register(registry);
}
