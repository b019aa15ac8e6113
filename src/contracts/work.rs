//! Team settings, iterations, capacity, backlogs and boards.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::{common::IdentityRef, Contract, PropertyBag};
use crate::{
    enums::ContractEnum,
    schema::{FieldKind, SchemaRegistry},
};

contract_enum! {
    /// How bugs appear on backlogs.
    BugsBehavior("work.BugsBehavior") {
        Off = 0 => "off",
        AsRequirements = 1 => "asRequirements",
        AsTasks = 2 => "asTasks",
    }
}

contract_enum! {
    TimeFrame("work.TimeFrame") {
        Past = 0 => "past",
        Current = 1 => "current",
        Future = 2 => "future",
    }
}

contract_enum! {
    BacklogType("work.BacklogType") {
        /// Portfolio backlog (epics, features).
        Portfolio = 0 => "portfolio",
        Requirement = 1 => "requirement",
        Task = 2 => "task",
    }
}

contract_enum! {
    BoardColumnType("work.BoardColumnType") {
        Incoming = 0 => "incoming",
        InProgress = 1 => "inProgress",
        Outgoing = 2 => "outgoing",
    }
}

contract_enum! {
    DayOfWeek("work.DayOfWeek") {
        Sunday = 0 => "sunday",
        Monday = 1 => "monday",
        Tuesday = 2 => "tuesday",
        Wednesday = 3 => "wednesday",
        Thursday = 4 => "thursday",
        Friday = 5 => "friday",
        Saturday = 6 => "saturday",
    }
}

contract_enum! {
    PlanType("work.PlanType") {
        DeliveryTimelineView = 0 => "deliveryTimelineView",
    }
}

contract! {
    TeamSettingsIterationReference("work.TeamSettingsIterationReference") {
        id: Uuid,
        name: String,
        path: String,
        url: String,
    }
}

contract! {
    TeamSettingsDataContractBase("work.TeamSettingsDataContractBase") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
    }
}

contract! {
    /// Team backlog and working-day settings.
    TeamSetting("work.TeamSetting") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        backlog_iteration: TeamSettingsIterationReference,
        /// Backlog category reference name to visibility.
        backlog_visibilities: IndexMap<String, bool>,
        bugs_behavior: BugsBehavior,
        default_iteration: TeamSettingsIterationReference,
        default_iteration_macro: String,
        working_days: Vec<DayOfWeek>,
    }
}

contract! {
    TeamIterationAttributes("work.TeamIterationAttributes") {
        finish_date: DateTime<Utc>,
        start_date: DateTime<Utc>,
        time_frame: TimeFrame,
    }
}

contract! {
    TeamSettingsIteration("work.TeamSettingsIteration") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        attributes: TeamIterationAttributes,
        id: Uuid,
        name: String,
        path: String,
    }
}

impl TeamSettingsIteration {
    /// Whether `at` falls within the iteration, both ends inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let Some(attributes) = &self.attributes else {
            return false;
        };
        match (attributes.start_date, attributes.finish_date) {
            (Some(start), Some(finish)) => start <= at && at <= finish,
            _ => false,
        }
    }
}

contract! {
    DateRange("work.DateRange") {
        end: DateTime<Utc>,
        start: DateTime<Utc>,
    }
}

contract! {
    Activity("work.Activity") {
        capacity_per_day: f64,
        name: String,
    }
}

contract! {
    TeamMemberCapacity("work.TeamMemberCapacity") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        activities: Vec<Activity>,
        days_off: Vec<DateRange>,
        team_member: IdentityRef,
    }
}

impl TeamMemberCapacity {
    /// Sum of per-activity daily capacity.
    pub fn capacity_per_day(&self) -> f64 {
        self.activities
            .iter()
            .flatten()
            .filter_map(|activity| activity.capacity_per_day)
            .sum()
    }
}

contract! {
    TeamSettingsDaysOff("work.TeamSettingsDaysOff") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        days_off: Vec<DateRange>,
    }
}

contract! {
    WorkItemTypeReference("work.WorkItemTypeReference") {
        name: String,
        url: String,
    }
}

contract! {
    WorkItemTypeStateInfo("work.WorkItemTypeStateInfo") {
        /// State name to state category.
        states: IndexMap<String, String>,
        work_item_type_name: String,
    }
}

contract! {
    BacklogLevelConfiguration("work.BacklogLevelConfiguration") {
        add_panel_fields: Vec<super::work_item_tracking::WorkItemFieldReference>,
        color: String,
        column_fields: Vec<Value>,
        default_work_item_type: WorkItemTypeReference,
        id: String,
        is_hidden: bool,
        name: String,
        rank: i32,
        r#type: BacklogType,
        work_item_count_limit: i32,
        work_item_types: Vec<WorkItemTypeReference>,
    }
}

contract! {
    BacklogConfiguration("work.BacklogConfiguration") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        backlog_fields: Value,
        bugs_behavior: BugsBehavior,
        hidden_backlogs: Vec<String>,
        is_bugs_behavior_configured: bool,
        portfolio_backlogs: Vec<BacklogLevelConfiguration>,
        requirement_backlog: BacklogLevelConfiguration,
        task_backlog: BacklogLevelConfiguration,
        work_item_type_mapped_states: Vec<WorkItemTypeStateInfo>,
    }
}

contract! {
    BoardColumn("work.BoardColumn") {
        column_type: BoardColumnType,
        description: String,
        id: Uuid,
        is_split: bool,
        item_limit: i32,
        name: String,
        /// Work item type name to mapped state.
        state_mappings: IndexMap<String, String>,
    }
}

contract! {
    BoardRow("work.BoardRow") {
        color: String,
        id: Uuid,
        name: String,
    }
}

contract! {
    BoardReference("work.BoardReference") {
        id: Uuid,
        name: String,
        url: String,
    }
}

contract! {
    Board("work.Board") {
        id: Uuid,
        name: String,
        url: String,
        #[serde(rename = "_links")]
        links: PropertyBag,
        allowed_mappings: IndexMap<String, IndexMap<String, Vec<String>>>,
        can_edit: bool,
        columns: Vec<BoardColumn>,
        fields: Value,
        is_valid: bool,
        revision: i32,
        rows: Vec<BoardRow>,
    }
}

impl Board {
    /// Sum of WIP limits over in-progress columns.
    pub fn in_progress_limit(&self) -> i32 {
        self.columns
            .iter()
            .flatten()
            .filter(|column| column.column_type == Some(BoardColumnType::InProgress))
            .filter_map(|column| column.item_limit)
            .sum()
    }
}

contract! {
    Plan("work.Plan") {
        created_by_identity: IdentityRef,
        created_date: DateTime<Utc>,
        description: String,
        id: Uuid,
        modified_by_identity: IdentityRef,
        modified_date: DateTime<Utc>,
        name: String,
        properties: Value,
        revision: i32,
        r#type: PlanType,
        url: String,
        user_permissions: i32,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<BugsBehavior>()
        .enumeration::<TimeFrame>()
        .enumeration::<BacklogType>()
        .enumeration::<BoardColumnType>()
        .enumeration::<DayOfWeek>()
        .enumeration::<PlanType>();

    registry
        .plain::<TeamSettingsIterationReference>()
        .plain::<TeamSettingsDataContractBase>()
        .contract::<TeamSetting, _>(|t| {
            t.object("backlogIteration", TeamSettingsIterationReference::TYPE_NAME)
                .enumeration("bugsBehavior", BugsBehavior::ENUM_NAME)
                .object("defaultIteration", TeamSettingsIterationReference::TYPE_NAME)
                .array_of("workingDays", FieldKind::enumeration(DayOfWeek::ENUM_NAME))
        })
        .contract::<TeamIterationAttributes, _>(|t| {
            t.date("finishDate")
                .date("startDate")
                .enumeration("timeFrame", TimeFrame::ENUM_NAME)
        })
        .contract::<TeamSettingsIteration, _>(|t| {
            t.object("attributes", TeamIterationAttributes::TYPE_NAME)
        })
        .contract::<DateRange, _>(|t| t.date("end").date("start"))
        .plain::<Activity>()
        .contract::<TeamMemberCapacity, _>(|t| t.array("daysOff", DateRange::TYPE_NAME))
        .contract::<TeamSettingsDaysOff, _>(|t| t.array("daysOff", DateRange::TYPE_NAME))
        .plain::<WorkItemTypeReference>()
        .plain::<WorkItemTypeStateInfo>()
        .contract::<BacklogLevelConfiguration, _>(|t| {
            t.enumeration("type", BacklogType::ENUM_NAME)
        })
        .contract::<BacklogConfiguration, _>(|t| {
            t.enumeration("bugsBehavior", BugsBehavior::ENUM_NAME)
                .array("portfolioBacklogs", BacklogLevelConfiguration::TYPE_NAME)
                .object("requirementBacklog", BacklogLevelConfiguration::TYPE_NAME)
                .object("taskBacklog", BacklogLevelConfiguration::TYPE_NAME)
        })
        .contract::<BoardColumn, _>(|t| t.enumeration("columnType", BoardColumnType::ENUM_NAME))
        .plain::<BoardRow>()
        .plain::<BoardReference>()
        .contract::<Board, _>(|t| {
            t.array("columns", BoardColumn::TYPE_NAME)
                .array("rows", BoardRow::TYPE_NAME)
        })
        .contract::<Plan, _>(|t| {
            t.date("createdDate")
                .date("modifiedDate")
                .enumeration("type", PlanType::ENUM_NAME)
        });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{dates::parse_date, decoder::from_value};

    #[test]
    fn team_setting_working_days_decode_from_names() {
        let setting: TeamSetting = from_value(&json!({
            "bugsBehavior": "asTasks",
            "workingDays": ["monday", "tuesday", "wednesday", "thursday", "friday"],
            "backlogVisibilities": {
                "Microsoft.EpicCategory": false,
                "Microsoft.FeatureCategory": true
            },
            "defaultIterationMacro": "@currentIteration"
        }))
        .unwrap();

        assert_eq!(setting.bugs_behavior, Some(BugsBehavior::AsTasks));
        let days = setting.working_days.unwrap();
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], DayOfWeek::Monday);
        assert!(!days.contains(&DayOfWeek::Sunday));
        assert_eq!(
            setting.backlog_visibilities.unwrap().get("Microsoft.EpicCategory"),
            Some(&false)
        );
    }

    #[test]
    fn iteration_contains_dates_in_range() {
        let iteration: TeamSettingsIteration = from_value(&json!({
            "name": "Sprint 12",
            "attributes": {
                "startDate": "2024-06-03T00:00:00Z",
                "finishDate": "2024-06-14T00:00:00Z",
                "timeFrame": "current"
            }
        }))
        .unwrap();

        assert_eq!(
            iteration.attributes.as_ref().and_then(|a| a.time_frame),
            Some(TimeFrame::Current)
        );
        assert!(iteration.contains(parse_date("2024-06-10").unwrap()));
        assert!(!iteration.contains(parse_date("2024-06-15").unwrap()));
        assert!(!TeamSettingsIteration::default().contains(parse_date("2024-06-10").unwrap()));
    }

    #[test]
    fn capacity_and_days_off() {
        let capacity: TeamMemberCapacity = from_value(&json!({
            "teamMember": {"displayName": "Chuck Reinhart"},
            "activities": [
                {"name": "Development", "capacityPerDay": 5.0},
                {"name": "Testing", "capacityPerDay": 1.5}
            ],
            "daysOff": [{"start": "2024-06-05T00:00:00Z", "end": "2024-06-06T00:00:00Z"}]
        }))
        .unwrap();

        assert_eq!(capacity.capacity_per_day(), 6.5);
        let days_off = capacity.days_off.unwrap();
        assert_eq!(days_off[0].start, parse_date("2024-06-05"));
    }

    #[test]
    fn board_limits_sum_in_progress_columns() {
        let board: Board = from_value(&json!({
            "name": "Stories",
            "columns": [
                {"name": "New", "columnType": "incoming", "itemLimit": 0},
                {"name": "Active", "columnType": 1, "itemLimit": 5, "isSplit": true},
                {"name": "Resolved", "columnType": "inProgress", "itemLimit": 3},
                {"name": "Closed", "columnType": "outgoing", "itemLimit": 0}
            ]
        }))
        .unwrap();
        assert_eq!(board.in_progress_limit(), 8);
    }
}
