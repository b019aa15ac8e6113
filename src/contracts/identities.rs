//! Identities, descriptors and membership queries.

use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::Contract;
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    /// How far to expand group membership.
    QueryMembership("identities.QueryMembership") {
        /// Do not query membership.
        None = 0 => "none",
        Direct = 1 => "direct",
        /// Transitive membership.
        Expanded = 2 => "expanded",
        ExpandedUp = 3 => "expandedUp",
        ExpandedDown = 4 => "expandedDown",
    }
}

contract_enum! {
    ReadIdentitiesOptions("identities.ReadIdentitiesOptions") {
        None = 0 => "none",
        FilterIllegalMemberships = 1 => "filterIllegalMemberships",
    }
}

contract_enum! {
    FrameworkIdentityType("identities.FrameworkIdentityType") {
        None = 0 => "none",
        ServiceIdentity = 1 => "serviceIdentity",
        AggregateIdentity = 2 => "aggregateIdentity",
        ImportedIdentity = 3 => "importedIdentity",
    }
}

contract_enum! {
    IdentityMetaType("identities.IdentityMetaType") {
        Member = 0 => "member",
        Guest = 1 => "guest",
        CompanyAdministrator = 2 => "companyAdministrator",
        HelpdeskAdministrator = 3 => "helpdeskAdministrator",
        Unknown = 255 => "unknown",
    }
}

contract! {
    /// `identityType;identifier` pair naming an identity.
    IdentityDescriptor("identities.IdentityDescriptor") {
        identifier: String,
        identity_type: String,
    }
}

impl IdentityDescriptor {
    pub fn new(identity_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            identity_type: Some(identity_type.into()),
        }
    }
}

impl std::fmt::Display for IdentityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{};{}",
            self.identity_type.as_deref().unwrap_or_default(),
            self.identifier.as_deref().unwrap_or_default()
        )
    }
}

contract! {
    IdentityBase("identities.IdentityBase") {
        custom_display_name: String,
        descriptor: IdentityDescriptor,
        id: Uuid,
        is_active: bool,
        is_container: bool,
        master_id: Uuid,
        member_ids: Vec<Uuid>,
        member_of: Vec<IdentityDescriptor>,
        members: Vec<IdentityDescriptor>,
        meta_type_id: i32,
        /// Extended properties; values are typed by the server.
        properties: IndexMap<String, Value>,
        provider_display_name: String,
        resource_version: i32,
        social_descriptor: String,
        subject_descriptor: String,
        unique_user_id: i32,
    }
}

contract! {
    Identity("identities.Identity") {
        custom_display_name: String,
        descriptor: IdentityDescriptor,
        id: Uuid,
        is_active: bool,
        is_container: bool,
        master_id: Uuid,
        member_ids: Vec<Uuid>,
        member_of: Vec<IdentityDescriptor>,
        members: Vec<IdentityDescriptor>,
        meta_type_id: i32,
        properties: IndexMap<String, Value>,
        provider_display_name: String,
        resource_version: i32,
        social_descriptor: String,
        subject_descriptor: String,
        unique_user_id: i32,
    }
}

impl Identity {
    /// Display name as shown in the UI: the custom name when set.
    pub fn display_name(&self) -> Option<&str> {
        self.custom_display_name
            .as_deref()
            .or(self.provider_display_name.as_deref())
    }

    pub fn meta_type(&self) -> Option<IdentityMetaType> {
        self.meta_type_id.map(IdentityMetaType::from_value)
    }
}

contract! {
    IdentityBatchInfo("identities.IdentityBatchInfo") {
        descriptors: Vec<IdentityDescriptor>,
        identity_ids: Vec<Uuid>,
        include_restricted_visibility: bool,
        property_names: Vec<String>,
        query_membership: QueryMembership,
        social_descriptors: Vec<String>,
        subject_descriptors: Vec<String>,
    }
}

contract! {
    IdentityScope("identities.IdentityScope") {
        administrators: IdentityDescriptor,
        id: Uuid,
        is_active: bool,
        is_global: bool,
        local_scope_id: Uuid,
        name: String,
        parent_id: Uuid,
        scope_type: i32,
        securing_host_id: Uuid,
        subject_descriptor: String,
    }
}

contract! {
    IdentitySelf("identities.IdentitySelf") {
        account_name: String,
        display_name: String,
        domain: String,
        id: Uuid,
        origin: String,
        origin_id: String,
        tenants: Vec<Value>,
    }
}

contract! {
    ChangedIdentitiesContext("identities.ChangedIdentitiesContext") {
        group_sequence_id: i32,
        identity_sequence_id: i32,
        organization_identity_sequence_id: i32,
        page_size: i32,
    }
}

contract! {
    ChangedIdentities("identities.ChangedIdentities") {
        identities: Vec<Identity>,
        more_data: bool,
        sequence_context: ChangedIdentitiesContext,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<QueryMembership>()
        .enumeration::<ReadIdentitiesOptions>()
        .enumeration::<FrameworkIdentityType>()
        .enumeration::<IdentityMetaType>()
        .plain::<IdentityDescriptor>()
        .plain::<IdentityBase>()
        .plain::<Identity>()
        .contract::<IdentityBatchInfo, _>(|t| {
            t.enumeration("queryMembership", QueryMembership::ENUM_NAME)
        })
        .plain::<IdentityScope>()
        .plain::<IdentitySelf>()
        .plain::<ChangedIdentitiesContext>()
        .contract::<ChangedIdentities, _>(|t| {
            t.array("identities", Identity::TYPE_NAME)
                .object("sequenceContext", ChangedIdentitiesContext::TYPE_NAME)
        });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        decoder::from_value,
        encoder::{to_wire, EnumEncoding},
    };

    #[test]
    fn descriptor_renders_type_and_identifier() {
        let descriptor = IdentityDescriptor::new(
            "Microsoft.TeamFoundation.Identity",
            "S-1-9-1551374245-1204400969",
        );
        assert_eq!(
            descriptor.to_string(),
            "Microsoft.TeamFoundation.Identity;S-1-9-1551374245-1204400969"
        );
    }

    #[test]
    fn identity_prefers_custom_display_name() {
        let identity: Identity = from_value(&json!({
            "providerDisplayName": "Jamal Hartnett",
            "isActive": true,
            "metaTypeId": 1,
            "properties": {"Mail": {"$type": "System.String", "$value": "jamal@fabrikam.com"}}
        }))
        .unwrap();
        assert_eq!(identity.display_name(), Some("Jamal Hartnett"));
        assert_eq!(identity.meta_type(), Some(IdentityMetaType::Guest));
        assert!(identity.properties.unwrap().contains_key("Mail"));
    }

    #[test]
    fn batch_request_encodes_membership_by_name() {
        let batch = IdentityBatchInfo {
            identity_ids: Some(vec![Uuid::nil()]),
            query_membership: Some(QueryMembership::Expanded),
            ..Default::default()
        };
        let wire = to_wire(&batch, EnumEncoding::Names).unwrap();
        assert_eq!(
            wire,
            json!({
                "identityIds": ["00000000-0000-0000-0000-000000000000"],
                "queryMembership": "expanded"
            })
        );
    }
}
