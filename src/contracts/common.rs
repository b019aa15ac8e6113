//! Contracts shared by every service area.

use serde_json::Value;

use super::PropertyBag;
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    /// JSON patch operation.
    Operation("common.Operation") {
        Add = 0 => "add",
        Remove = 1 => "remove",
        Replace = 2 => "replace",
        Move = 3 => "move",
        Copy = 4 => "copy",
        Test = 5 => "test",
    }
}

contract! {
    /// Base shape of graph subjects (users, groups, service principals).
    GraphSubjectBase("common.GraphSubjectBase") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        descriptor: String,
        display_name: String,
        url: String,
    }
}

contract! {
    /// Lightweight reference to an identity.
    IdentityRef("common.IdentityRef") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        descriptor: String,
        display_name: String,
        url: String,
        directory_alias: String,
        id: String,
        image_url: String,
        inactive: bool,
        is_aad_identity: bool,
        is_container: bool,
        is_deleted_in_origin: bool,
        profile_url: String,
        unique_name: String,
    }
}

contract! {
    /// One operation of a JSON patch document.
    JsonPatchOperation("common.JsonPatchOperation") {
        /// Source path for `move` and `copy`.
        from: String,
        op: Operation,
        path: String,
        value: Value,
    }
}

/// A JSON patch document is an ordered list of operations.
pub type JsonPatchDocument = Vec<JsonPatchOperation>;

impl JsonPatchOperation {
    fn with(op: Operation, path: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            from: None,
            op: Some(op),
            path: Some(path.into()),
            value,
        }
    }

    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(Operation::Add, path, Some(value.into()))
    }

    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(Operation::Replace, path, Some(value.into()))
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self::with(Operation::Remove, path, None)
    }

    /// Guard operation: the patch fails unless `path` holds `value`.
    pub fn test(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(Operation::Test, path, Some(value.into()))
    }
}

contract! {
    ResourceRef("common.ResourceRef") {
        id: String,
        url: String,
    }
}

contract! {
    /// Server envelope around list responses.
    VssJsonCollectionWrapper("common.VssJsonCollectionWrapper") {
        count: i32,
        value: Vec<Value>,
    }
}

contract! {
    TeamMember("common.TeamMember") {
        identity: IdentityRef,
        is_team_admin: bool,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<Operation>()
        .plain::<GraphSubjectBase>()
        .plain::<IdentityRef>()
        .contract::<JsonPatchOperation, _>(|t| t.enumeration("op", Operation::ENUM_NAME))
        .plain::<ResourceRef>()
        .plain::<VssJsonCollectionWrapper>()
        .plain::<TeamMember>();
}
