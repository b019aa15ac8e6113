//! Service locations and connection data.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{identities::Identity, Contract, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    ServiceStatus("locations.ServiceStatus") {
        Assigned = 0 => "assigned",
        Active = 1 => "active",
        Moving = 2 => "moving",
    }
}

contract_enum! {
    RelativeToSetting("locations.RelativeToSetting") {
        Context = 0 => "context",
        WebApplication = 2 => "webApplication",
        FullyQualified = 3 => "fullyQualified",
    }
}

contract_flags! {
    /// Which hosts inherit a service definition.
    InheritLevel("locations.InheritLevel") {
        NONE = 0 => "none",
        DEPLOYMENT = 1 => "deployment",
        ACCOUNT = 2 => "account",
        COLLECTION = 4 => "collection",
        ALL = 7 => "all",
    }
}

contract_flags! {
    ConnectOptions("locations.ConnectOptions") {
        /// Retrieve no optional data.
        NONE = 0 => "none",
        INCLUDE_SERVICES = 1 => "includeServices",
        INCLUDE_LAST_USER_ACCESS = 2 => "includeLastUserAccess",
        INCLUDE_INHERITED_DEFINITIONS_ONLY = 4 => "includeInheritedDefinitionsOnly",
        INCLUDE_NON_INHERITED_DEFINITIONS_ONLY = 8 => "includeNonInheritedDefinitionsOnly",
    }
}

contract! {
    AccessMapping("locations.AccessMapping") {
        access_point: String,
        display_name: String,
        moniker: String,
        service_owner: Uuid,
        virtual_directory: String,
    }
}

contract! {
    LocationMapping("locations.LocationMapping") {
        access_mapping_moniker: String,
        location: String,
    }
}

contract! {
    ServiceDefinition("locations.ServiceDefinition") {
        description: String,
        display_name: String,
        identifier: Uuid,
        inherit_level: InheritLevel,
        location_mappings: Vec<LocationMapping>,
        max_version: String,
        min_version: String,
        parent_identifier: Uuid,
        parent_service_type: String,
        properties: PropertyBag,
        relative_path: String,
        relative_to_setting: RelativeToSetting,
        released_version: String,
        resource_version: i32,
        service_owner: Uuid,
        service_type: String,
        status: ServiceStatus,
        tool_id: String,
    }
}

impl ServiceDefinition {
    /// Location for an access mapping moniker.
    pub fn location_for(&self, moniker: &str) -> Option<&str> {
        self.location_mappings
            .iter()
            .flatten()
            .find(|mapping| mapping.access_mapping_moniker.as_deref() == Some(moniker))
            .and_then(|mapping| mapping.location.as_deref())
    }
}

contract! {
    LocationServiceData("locations.LocationServiceData") {
        access_mappings: Vec<AccessMapping>,
        client_cache_fresh: bool,
        client_cache_time_to_live: i32,
        default_access_mapping_moniker: String,
        last_change_id: i32,
        last_change_id64: i64,
        service_definitions: Vec<ServiceDefinition>,
        service_owner: Uuid,
    }
}

contract! {
    /// Result of the connect call: who is calling and where services live.
    ConnectionData("locations.ConnectionData") {
        authenticated_user: Identity,
        authorized_user: Identity,
        deployment_id: Uuid,
        deployment_type: String,
        instance_id: Uuid,
        last_user_access: DateTime<Utc>,
        location_service_data: LocationServiceData,
        web_application_relative_directory: String,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<ServiceStatus>()
        .enumeration::<RelativeToSetting>()
        .enumeration::<InheritLevel>()
        .enumeration::<ConnectOptions>()
        .plain::<AccessMapping>()
        .plain::<LocationMapping>()
        .contract::<ServiceDefinition, _>(|t| {
            t.enumeration("inheritLevel", InheritLevel::ENUM_NAME)
                .enumeration("relativeToSetting", RelativeToSetting::ENUM_NAME)
                .enumeration("status", ServiceStatus::ENUM_NAME)
        })
        .contract::<LocationServiceData, _>(|t| {
            t.array("serviceDefinitions", ServiceDefinition::TYPE_NAME)
        })
        .contract::<ConnectionData, _>(|t| {
            t.object("authenticatedUser", Identity::TYPE_NAME)
                .object("authorizedUser", Identity::TYPE_NAME)
                .date("lastUserAccess")
                .object("locationServiceData", LocationServiceData::TYPE_NAME)
        });
}
