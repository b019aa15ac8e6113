//! Installed extensions and extension requests.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{Contract, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_flags! {
    /// State of an installed extension.
    ExtensionStateFlags("extensionManagement.ExtensionStateFlags") {
        NONE = 0 => "none",
        DISABLED = 1 => "disabled",
        /// Installed by the system and cannot be uninstalled.
        BUILT_IN = 2 => "builtIn",
        /// Eligible for automatic updates.
        MULTI_VERSION = 4 => "multiVersion",
        UNINSTALLED = 8 => "uninstalled",
        VERSION_CHECK_ERROR = 16 => "versionCheckError",
        /// Trusted by the organization.
        TRUSTED = 32 => "trusted",
        ERROR = 64 => "error",
        NEEDS_REAUTHORIZATION = 128 => "needsReauthorization",
        AUTO_UPGRADE_ERROR = 256 => "autoUpgradeError",
        WARNING = 512 => "warning",
    }
}

contract_flags! {
    ExtensionFlags("extensionManagement.ExtensionFlags") {
        BUILT_IN = 1 => "builtIn",
        TRUSTED = 2 => "trusted",
    }
}

contract_enum! {
    ExtensionRequestState("extensionManagement.ExtensionRequestState") {
        Open = 0 => "open",
        Accepted = 1 => "accepted",
        Rejected = 2 => "rejected",
    }
}

contract_enum! {
    ExtensionUpdateType("extensionManagement.ExtensionUpdateType") {
        Installed = 1 => "installed",
        Uninstalled = 2 => "uninstalled",
        Enabled = 3 => "enabled",
        Disabled = 4 => "disabled",
        VersionUpdated = 5 => "versionUpdated",
        ActionRequired = 6 => "actionRequired",
        ActionResolved = 7 => "actionResolved",
    }
}

contract! {
    InstalledExtensionStateIssue("extensionManagement.InstalledExtensionStateIssue") {
        message: String,
        source: String,
        r#type: String,
    }
}

contract! {
    InstalledExtensionState("extensionManagement.InstalledExtensionState") {
        flags: ExtensionStateFlags,
        installation_issues: Vec<InstalledExtensionStateIssue>,
        last_updated: DateTime<Utc>,
    }
}

impl InstalledExtensionState {
    pub fn is_enabled(&self) -> bool {
        self.flags.is_some_and(|flags| {
            !flags.intersects(ExtensionStateFlags::DISABLED | ExtensionStateFlags::UNINSTALLED)
        })
    }
}

contract! {
    ContributionBase("extensionManagement.ContributionBase") {
        description: String,
        id: String,
        visible_to: Vec<String>,
    }
}

contract! {
    Contribution("extensionManagement.Contribution") {
        description: String,
        id: String,
        visible_to: Vec<String>,
        includes: Vec<String>,
        properties: PropertyBag,
        targets: Vec<String>,
        r#type: String,
    }
}

contract! {
    InstalledExtension("extensionManagement.InstalledExtension") {
        base_uri: String,
        contributions: Vec<Contribution>,
        contribution_types: Vec<Value>,
        demands: Vec<String>,
        event_callbacks: Value,
        fallback_base_uri: String,
        language: String,
        licensing: Value,
        manifest_version: f64,
        scopes: Vec<String>,
        service_instance_type: String,
        extension_id: String,
        extension_name: String,
        files: Vec<Value>,
        flags: ExtensionFlags,
        install_state: InstalledExtensionState,
        last_published: DateTime<Utc>,
        publisher_id: String,
        publisher_name: String,
        registration_id: String,
        version: String,
    }
}

impl InstalledExtension {
    /// `publisher.extension`, the identifier used in URLs.
    pub fn full_name(&self) -> Option<String> {
        Some(format!(
            "{}.{}",
            self.publisher_name.as_deref()?,
            self.extension_name.as_deref()?
        ))
    }
}

contract! {
    ExtensionRequest("extensionManagement.ExtensionRequest") {
        reject_message: String,
        request_date: DateTime<Utc>,
        requested_by: super::common::IdentityRef,
        request_message: String,
        request_state: ExtensionRequestState,
        resolve_date: DateTime<Utc>,
        resolved_by: super::common::IdentityRef,
    }
}

contract! {
    RequestedExtension("extensionManagement.RequestedExtension") {
        extension_name: String,
        extension_requests: Vec<ExtensionRequest>,
        publisher_display_name: String,
        publisher_name: String,
        request_count: i32,
    }
}

contract! {
    ExtensionEvent("extensionManagement.ExtensionEvent") {
        extension: InstalledExtension,
        host: Value,
        links: PropertyBag,
        update_type: ExtensionUpdateType,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<ExtensionStateFlags>()
        .enumeration::<ExtensionFlags>()
        .enumeration::<ExtensionRequestState>()
        .enumeration::<ExtensionUpdateType>()
        .plain::<InstalledExtensionStateIssue>()
        .contract::<InstalledExtensionState, _>(|t| {
            t.enumeration("flags", ExtensionStateFlags::ENUM_NAME)
                .array("installationIssues", InstalledExtensionStateIssue::TYPE_NAME)
                .date("lastUpdated")
        })
        .plain::<ContributionBase>()
        .plain::<Contribution>()
        .contract::<InstalledExtension, _>(|t| {
            t.array("contributions", Contribution::TYPE_NAME)
                .enumeration("flags", ExtensionFlags::ENUM_NAME)
                .object("installState", InstalledExtensionState::TYPE_NAME)
                .date("lastPublished")
        })
        .contract::<ExtensionRequest, _>(|t| {
            t.date("requestDate")
                .enumeration("requestState", ExtensionRequestState::ENUM_NAME)
                .date("resolveDate")
        })
        .contract::<RequestedExtension, _>(|t| {
            t.array("extensionRequests", ExtensionRequest::TYPE_NAME)
        })
        .contract::<ExtensionEvent, _>(|t| {
            t.object("extension", InstalledExtension::TYPE_NAME)
                .enumeration("updateType", ExtensionUpdateType::ENUM_NAME)
        });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{decoder::Decoder, value::Decoded};

    #[test]
    fn install_state_flags_decode_from_combined_names() {
        let extension: InstalledExtension = Decoder::new()
            .decode_as(&json!({
                "publisherName": "ms",
                "extensionName": "vss-code-search",
                "flags": "builtIn, trusted",
                "installState": {
                    "flags": "builtIn, trusted",
                    "lastUpdated": "2024-03-01T10:00:00Z"
                }
            }))
            .unwrap();

        assert_eq!(extension.full_name().as_deref(), Some("ms.vss-code-search"));
        assert_eq!(extension.flags, Some(ExtensionFlags::BUILT_IN | ExtensionFlags::TRUSTED));
        let state = extension.install_state.unwrap();
        assert_eq!(state.flags.map(|f| f.bits()), Some(34));
        assert!(state.is_enabled());
    }

    #[test]
    fn disabled_extension_is_not_enabled() {
        let state = InstalledExtensionState {
            flags: Some(ExtensionStateFlags::DISABLED | ExtensionStateFlags::TRUSTED),
            ..Default::default()
        };
        assert!(!state.is_enabled());
    }

    #[test]
    fn request_dates_and_states_decode() {
        let decoded = Decoder::new()
            .decode(
                &json!({
                    "extensionRequests": [
                        {"requestState": 1, "requestDate": "2024-01-02T03:04:05.678Z"}
                    ]
                }),
                RequestedExtension::TYPE_NAME,
            )
            .unwrap();
        let request = &decoded.get("extensionRequests").and_then(Decoded::as_array).unwrap()[0];
        assert_eq!(
            request.get("requestState").and_then(Decoded::as_enum).and_then(|e| e.name.as_deref()),
            Some("accepted")
        );
        assert!(request.get("requestDate").and_then(Decoded::as_date).is_some());
    }
}
