//! Dashboards and widgets.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Contract, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_flags! {
    /// Permissions a team grants on its dashboards.
    TeamDashboardPermission("dashboard.TeamDashboardPermission") {
        NONE = 0 => "none",
        READ = 1 => "read",
        CREATE = 2 => "create",
        EDIT = 4 => "edit",
        DELETE = 8 => "delete",
        MANAGE_PERMISSIONS = 16 => "managePermissions",
    }
}

contract_flags! {
    GroupMemberPermission("dashboard.GroupMemberPermission") {
        NONE = 0 => "none",
        EDIT = 1 => "edit",
        MANAGE = 2 => "manage",
        MANAGE_PERMISSIONS = 3 => "managePermissions",
    }
}

contract_enum! {
    DashboardScope("dashboard.DashboardScope") {
        CollectionUser = 0 => "collection_User",
        ProjectTeam = 1 => "project_Team",
        Project = 2 => "project",
    }
}

contract_enum! {
    /// Where a widget may be placed.
    WidgetScope("dashboard.WidgetScope") {
        CollectionUser = 0 => "collection_User",
        ProjectTeam = 1 => "project_Team",
    }
}

contract_enum! {
    ContributedFeatureState("dashboard.ContributedFeatureState") {
        Disabled = 0 => "disabled",
        Enabled = 1 => "enabled",
    }
}

contract! {
    WidgetPosition("dashboard.WidgetPosition") {
        column: i32,
        row: i32,
    }
}

contract! {
    WidgetSize("dashboard.WidgetSize") {
        column_span: i32,
        row_span: i32,
    }
}

contract! {
    LightboxOptions("dashboard.LightboxOptions") {
        height: i32,
        resizable: bool,
        width: i32,
    }
}

contract! {
    SemanticVersion("dashboard.SemanticVersion") {
        major: i32,
        minor: i32,
        patch: i32,
    }
}

contract! {
    /// A widget instance on a dashboard.
    Widget("dashboard.Widget") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        allowed_sizes: Vec<WidgetSize>,
        are_settings_blocked_for_user: bool,
        artifact_id: String,
        configuration_contribution_id: String,
        configuration_contribution_relative_id: String,
        content_uri: String,
        contribution_id: String,
        /// Partial dashboard carrying the dashboard-level ETag.
        dashboard: Box<Dashboard>,
        #[serde(rename = "eTag")]
        e_tag: String,
        id: Uuid,
        is_enabled: bool,
        is_name_configurable: bool,
        lightbox_options: LightboxOptions,
        loading_image_url: String,
        name: String,
        position: WidgetPosition,
        /// Serialized widget settings; the schema is owned by the widget.
        settings: String,
        settings_version: SemanticVersion,
        size: WidgetSize,
        type_id: String,
        url: String,
    }
}

contract! {
    /// Catalog entry describing a widget type.
    WidgetMetadata("dashboard.WidgetMetadata") {
        allowed_sizes: Vec<WidgetSize>,
        analytics_service_required: bool,
        catalog_icon_url: String,
        catalog_info_url: String,
        configuration_contribution_id: String,
        content_uri: String,
        contribution_id: String,
        default_settings: String,
        description: String,
        is_enabled: bool,
        is_name_configurable: bool,
        is_visible_from_catalog: bool,
        lightbox_options: LightboxOptions,
        loading_image_url: String,
        name: String,
        publisher_name: String,
        supported_scopes: Vec<WidgetScope>,
        targets: Vec<String>,
        type_id: String,
    }
}

contract! {
    Dashboard("dashboard.Dashboard") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        dashboard_scope: DashboardScope,
        description: String,
        #[serde(rename = "eTag")]
        e_tag: String,
        group_id: Uuid,
        id: Uuid,
        last_accessed_date: DateTime<Utc>,
        modified_by: Uuid,
        modified_date: DateTime<Utc>,
        name: String,
        owner_id: Uuid,
        position: i32,
        refresh_interval: i32,
        url: String,
        widgets: Vec<Widget>,
    }
}

impl Dashboard {
    /// Widgets sorted top-to-bottom, then left-to-right.
    pub fn widgets_in_layout_order(&self) -> Vec<&Widget> {
        let mut widgets: Vec<&Widget> = self.widgets.iter().flatten().collect();
        widgets.sort_by_key(|widget| {
            let position = widget.position.as_ref();
            (
                position.and_then(|p| p.row).unwrap_or(i32::MAX),
                position.and_then(|p| p.column).unwrap_or(i32::MAX),
            )
        });
        widgets
    }
}

contract! {
    DashboardGroupEntry("dashboard.DashboardGroupEntry") {
        dashboard_scope: DashboardScope,
        id: Uuid,
        name: String,
        position: i32,
        url: String,
        widgets: Vec<Widget>,
    }
}

contract! {
    DashboardGroup("dashboard.DashboardGroup") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        dashboard_entries: Vec<DashboardGroupEntry>,
        permission: GroupMemberPermission,
        team_dashboard_permission: TeamDashboardPermission,
        url: String,
    }
}

contract! {
    WidgetsVersionedList("dashboard.WidgetsVersionedList") {
        #[serde(rename = "eTag")]
        e_tag: Vec<String>,
        widgets: Vec<Widget>,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<TeamDashboardPermission>()
        .enumeration::<GroupMemberPermission>()
        .enumeration::<DashboardScope>()
        .enumeration::<WidgetScope>()
        .enumeration::<ContributedFeatureState>()
        .plain::<WidgetPosition>()
        .plain::<WidgetSize>()
        .plain::<LightboxOptions>()
        .plain::<SemanticVersion>()
        .contract::<Widget, _>(|t| t.object("dashboard", Dashboard::TYPE_NAME))
        .contract::<WidgetMetadata, _>(|t| {
            t.array_of(
                "supportedScopes",
                crate::schema::FieldKind::enumeration(WidgetScope::ENUM_NAME),
            )
        })
        .contract::<Dashboard, _>(|t| {
            t.enumeration("dashboardScope", DashboardScope::ENUM_NAME)
                .date("lastAccessedDate")
                .date("modifiedDate")
                .array("widgets", Widget::TYPE_NAME)
        })
        .contract::<DashboardGroupEntry, _>(|t| {
            t.enumeration("dashboardScope", DashboardScope::ENUM_NAME)
                .array("widgets", Widget::TYPE_NAME)
        })
        .contract::<DashboardGroup, _>(|t| {
            t.array("dashboardEntries", DashboardGroupEntry::TYPE_NAME)
                .enumeration("permission", GroupMemberPermission::ENUM_NAME)
                .enumeration("teamDashboardPermission", TeamDashboardPermission::ENUM_NAME)
        })
        .contract::<WidgetsVersionedList, _>(|t| t.array("widgets", Widget::TYPE_NAME));
}
