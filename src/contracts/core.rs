//! Projects, teams, processes and collections.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::{common::IdentityRef, Contract, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    /// Lifecycle state of a project. `All` and `Unchanged` are query/update sentinels.
    ProjectState("core.ProjectState") {
        /// Project is being deleted.
        Deleting = 2 => "deleting",
        /// Project is being created.
        New = 0 => "new",
        /// Project is completely created and ready to use.
        WellFormed = 1 => "wellFormed",
        /// Project has been queued for creation but processing has not begun.
        CreatePending = 3 => "createPending",
        All = -1 => "all",
        Unchanged = -2 => "unchanged",
        /// Project has been deleted.
        Deleted = 4 => "deleted",
    }
}

contract_enum! {
    ProjectVisibility("core.ProjectVisibility") {
        Private = 0 => "private",
        /// Visible to everyone in the organization.
        Organization = 1 => "organization",
        /// Anonymous access.
        Public = 2 => "public",
        SystemPrivate = 3 => "systemPrivate",
        Unchanged = -1 => "unchanged",
    }
}

contract_enum! {
    ProcessType("core.ProcessType") {
        System = 0 => "system",
        Custom = 1 => "custom",
        Inherited = 2 => "inherited",
    }
}

contract_enum! {
    SourceControlTypes("core.SourceControlTypes") {
        Tfvc = 1 => "tfvc",
        Git = 2 => "git",
    }
}

contract_enum! {
    ConnectedServiceKind("core.ConnectedServiceKind") {
        /// Custom or unknown service.
        Custom = 0 => "custom",
        AzureSubscription = 1 => "azureSubscription",
        Chef = 2 => "chef",
        /// Generic endpoint.
        Generic = 3 => "generic",
    }
}

contract! {
    /// Shallow reference to a project.
    TeamProjectReference("core.TeamProjectReference") {
        abbreviation: String,
        default_team_image_url: String,
        description: String,
        id: Uuid,
        last_update_time: DateTime<Utc>,
        name: String,
        revision: i64,
        state: ProjectState,
        url: String,
        visibility: ProjectVisibility,
    }
}

contract! {
    WebApiTeamRef("core.WebApiTeamRef") {
        id: Uuid,
        name: String,
        url: String,
    }
}

contract! {
    /// Full project with capabilities.
    TeamProject("core.TeamProject") {
        abbreviation: String,
        default_team_image_url: String,
        description: String,
        id: Uuid,
        last_update_time: DateTime<Utc>,
        name: String,
        revision: i64,
        state: ProjectState,
        url: String,
        visibility: ProjectVisibility,
        #[serde(rename = "_links")]
        links: PropertyBag,
        /// Capability name (e.g. `versioncontrol`) to its settings.
        capabilities: IndexMap<String, IndexMap<String, String>>,
        default_team: WebApiTeamRef,
    }
}

impl TeamProject {
    /// Source control type from the `versioncontrol` capability.
    pub fn source_control_type(&self) -> Option<SourceControlTypes> {
        self.capabilities
            .as_ref()?
            .get("versioncontrol")?
            .get("sourceControlType")
            .and_then(|raw| SourceControlTypes::from_name(raw))
    }
}

contract! {
    WebApiTeam("core.WebApiTeam") {
        id: Uuid,
        name: String,
        url: String,
        description: String,
        identity_url: String,
        project_id: Uuid,
        project_name: String,
    }
}

contract! {
    Process("core.Process") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        description: String,
        id: Uuid,
        is_default: bool,
        name: String,
        r#type: ProcessType,
        url: String,
    }
}

contract! {
    TeamProjectCollectionReference("core.TeamProjectCollectionReference") {
        avatar_url: String,
        id: Uuid,
        name: String,
        url: String,
    }
}

contract! {
    TeamProjectCollection("core.TeamProjectCollection") {
        avatar_url: String,
        id: Uuid,
        name: String,
        url: String,
        #[serde(rename = "_links")]
        links: PropertyBag,
        description: String,
        /// Process customization type of the collection.
        process_customization_type: ProcessType,
        state: String,
    }
}

contract! {
    ProjectProperty("core.ProjectProperty") {
        name: String,
        value: Value,
    }
}

contract! {
    WebApiConnectedService("core.WebApiConnectedService") {
        authenticated_by: IdentityRef,
        description: String,
        friendly_name: String,
        id: String,
        kind: String,
        name: String,
        project: TeamProjectReference,
        service_uri: String,
        url: String,
    }
}

contract! {
    WebApiTagDefinition("core.WebApiTagDefinition") {
        active: bool,
        id: Uuid,
        name: String,
        url: String,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<ProjectState>()
        .enumeration::<ProjectVisibility>()
        .enumeration::<ProcessType>()
        .enumeration::<SourceControlTypes>()
        .enumeration::<ConnectedServiceKind>()
        .contract::<TeamProjectReference, _>(|t| {
            t.date("lastUpdateTime")
                .enumeration("state", ProjectState::ENUM_NAME)
                .enumeration("visibility", ProjectVisibility::ENUM_NAME)
        })
        .plain::<WebApiTeamRef>()
        .contract::<TeamProject, _>(|t| {
            t.date("lastUpdateTime")
                .enumeration("state", ProjectState::ENUM_NAME)
                .enumeration("visibility", ProjectVisibility::ENUM_NAME)
        })
        .plain::<WebApiTeam>()
        .contract::<Process, _>(|t| t.enumeration("type", ProcessType::ENUM_NAME))
        .plain::<TeamProjectCollectionReference>()
        .contract::<TeamProjectCollection, _>(|t| {
            t.enumeration("processCustomizationType", ProcessType::ENUM_NAME)
        })
        .plain::<ProjectProperty>()
        .contract::<WebApiConnectedService, _>(|t| {
            t.object("project", TeamProjectReference::TYPE_NAME)
        })
        .plain::<WebApiTagDefinition>();
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decoder::from_value;

    #[test]
    fn project_reference_decodes_state_names_and_dates() {
        let project: TeamProjectReference = from_value(&json!({
            "id": "eb6e4656-77fc-42a1-9181-4c6d8e9da5d1",
            "name": "Fabrikam-Fiber-TFVC",
            "state": "wellFormed",
            "visibility": 0,
            "revision": 411,
            "lastUpdateTime": "2024-05-01T12:30:00.123"
        }))
        .unwrap();

        assert_eq!(project.state, Some(ProjectState::WellFormed));
        assert_eq!(project.visibility, Some(ProjectVisibility::Private));
        assert_eq!(
            project.last_update_time.map(|t| t.to_rfc3339()),
            Some("2024-05-01T12:30:00.123+00:00".to_string())
        );
    }

    #[test]
    fn negative_sentinels_round_trip() {
        assert_eq!(ProjectState::from_value(-1), ProjectState::All);
        assert_eq!(serde_json::to_value(ProjectState::Unchanged).unwrap(), json!(-2));
        assert_eq!(ProjectVisibility::from_name("UNCHANGED"), Some(ProjectVisibility::Unchanged));
    }

    #[test]
    fn source_control_type_reads_capabilities() {
        let project: TeamProject = from_value(&json!({
            "name": "Fabrikam",
            "capabilities": {
                "versioncontrol": {"sourceControlType": "Git"},
                "processTemplate": {"templateName": "Agile"}
            }
        }))
        .unwrap();
        assert_eq!(project.source_control_type(), Some(SourceControlTypes::Git));
    }

    #[test]
    fn process_type_field_uses_type_key() {
        let process: Process = from_value(&json!({"name": "Agile", "type": "inherited"})).unwrap();
        assert_eq!(process.r#type, Some(ProcessType::Inherited));
        let back = serde_json::to_value(&process).unwrap();
        assert_eq!(back, json!({"name": "Agile", "type": 2}));
    }
}
