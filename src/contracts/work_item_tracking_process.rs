//! Inherited process customization: work item types, states, layouts and rules.

use uuid::Uuid;

use super::{work_item_tracking::WorkItemFieldReference, Contract, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    ProcessClass("workItemTrackingProcess.ProcessClass") {
        System = 0 => "system",
        Derived = 1 => "derived",
        Custom = 2 => "custom",
    }
}

contract_enum! {
    CustomizationType("workItemTrackingProcess.CustomizationType") {
        /// Shipped with the system process.
        System = 1 => "system",
        /// Inherited and modified.
        Inherited = 2 => "inherited",
        /// Created in the derived process.
        Custom = 3 => "custom",
    }
}

contract_enum! {
    PageType("workItemTrackingProcess.PageType") {
        Custom = 1 => "custom",
        History = 2 => "history",
        Links = 3 => "links",
        Attachments = 4 => "attachments",
    }
}

contract_enum! {
    WorkItemTypeClass("workItemTrackingProcess.WorkItemTypeClass") {
        System = 0 => "system",
        Derived = 1 => "derived",
        Custom = 2 => "custom",
    }
}

contract_enum! {
    RuleActionType("workItemTrackingProcess.RuleActionType") {
        MakeRequired = 1 => "makeRequired",
        MakeReadOnly = 2 => "makeReadOnly",
        SetDefaultValue = 3 => "setDefaultValue",
        SetDefaultFromClock = 4 => "setDefaultFromClock",
        SetDefaultFromCurrentUser = 5 => "setDefaultFromCurrentUser",
        SetDefaultFromField = 6 => "setDefaultFromField",
        CopyValue = 7 => "copyValue",
        CopyFromClock = 8 => "copyFromClock",
        CopyFromCurrentUser = 9 => "copyFromCurrentUser",
        CopyFromField = 10 => "copyFromField",
        SetValueToEmpty = 11 => "setValueToEmpty",
        CopyFromServerClock = 12 => "copyFromServerClock",
        CopyFromServerCurrentUser = 13 => "copyFromServerCurrentUser",
        HideTargetField = 14 => "hideTargetField",
        DisallowValue = 15 => "disallowValue",
    }
}

contract_enum! {
    RuleConditionType("workItemTrackingProcess.RuleConditionType") {
        When = 1 => "when",
        WhenNot = 2 => "whenNot",
        WhenChanged = 3 => "whenChanged",
        WhenNotChanged = 4 => "whenNotChanged",
        WhenWas = 5 => "whenWas",
        WhenStateChangedTo = 6 => "whenStateChangedTo",
        WhenStateChangedFromAndTo = 7 => "whenStateChangedFromAndTo",
        WhenWorkItemIsCreated = 8 => "whenWorkItemIsCreated",
        WhenValueIsDefined = 9 => "whenValueIsDefined",
        WhenValueIsNotDefined = 10 => "whenValueIsNotDefined",
        WhenCurrentUserIsMemberOfGroup = 11 => "whenCurrentUserIsMemberOfGroup",
        WhenCurrentUserIsNotMemberOfGroup = 12 => "whenCurrentUserIsNotMemberOfGroup",
    }
}

contract_flags! {
    GetWorkItemTypeExpand("workItemTrackingProcess.GetWorkItemTypeExpand") {
        NONE = 0 => "none",
        STATES = 1 => "states",
        BEHAVIORS = 2 => "behaviors",
        LAYOUT = 4 => "layout",
    }
}

contract_flags! {
    GetProcessExpandLevel("workItemTrackingProcess.GetProcessExpandLevel") {
        NONE = 0 => "none",
        PROJECTS = 1 => "projects",
    }
}

contract! {
    ProjectReference("workItemTrackingProcess.ProjectReference") {
        description: String,
        id: Uuid,
        name: String,
        url: String,
    }
}

contract! {
    ProcessProperties("workItemTrackingProcess.ProcessProperties") {
        class: ProcessClass,
        is_default: bool,
        is_enabled: bool,
        parent_process_type_id: Uuid,
        version: String,
    }
}

contract! {
    /// A process template and the projects using it.
    ProcessInfo("workItemTrackingProcess.ProcessInfo") {
        customization_type: CustomizationType,
        description: String,
        is_default: bool,
        is_enabled: bool,
        name: String,
        parent_process_type_id: Uuid,
        projects: Vec<ProjectReference>,
        reference_name: String,
        type_id: Uuid,
    }
}

impl ProcessInfo {
    /// True for processes derived from a system process.
    pub fn is_inherited(&self) -> bool {
        matches!(self.customization_type, Some(CustomizationType::Inherited))
            || self.parent_process_type_id.is_some_and(|id| !id.is_nil())
    }
}

contract! {
    CreateProcessModel("workItemTrackingProcess.CreateProcessModel") {
        description: String,
        name: String,
        parent_process_type_id: Uuid,
        reference_name: String,
    }
}

contract! {
    WorkItemStateResultModel("workItemTrackingProcess.WorkItemStateResultModel") {
        color: String,
        customization_type: CustomizationType,
        hidden: bool,
        id: Uuid,
        name: String,
        order: i32,
        state_category: String,
        url: String,
    }
}

contract! {
    WorkItemBehaviorReference("workItemTrackingProcess.WorkItemBehaviorReference") {
        id: String,
        url: String,
    }
}

contract! {
    WorkItemTypeBehavior("workItemTrackingProcess.WorkItemTypeBehavior") {
        behavior: WorkItemBehaviorReference,
        is_default: bool,
        is_legacy_default: bool,
        url: String,
    }
}

contract! {
    Extension("workItemTrackingProcess.Extension") {
        id: String,
    }
}

contract! {
    Control("workItemTrackingProcess.Control") {
        contribution: PropertyBag,
        control_type: String,
        height: i32,
        id: String,
        inherited: bool,
        is_contribution: bool,
        label: String,
        metadata: String,
        order: i32,
        overridden: bool,
        read_only: bool,
        visible: bool,
        watermark: String,
    }
}

contract! {
    Group("workItemTrackingProcess.Group") {
        contribution: PropertyBag,
        controls: Vec<Control>,
        height: i32,
        id: String,
        inherited: bool,
        is_contribution: bool,
        label: String,
        order: i32,
        overridden: bool,
        visible: bool,
    }
}

contract! {
    Section("workItemTrackingProcess.Section") {
        groups: Vec<Group>,
        id: String,
        overridden: bool,
    }
}

contract! {
    Page("workItemTrackingProcess.Page") {
        contribution: PropertyBag,
        id: String,
        inherited: bool,
        is_contribution: bool,
        label: String,
        locked: bool,
        order: i32,
        overridden: bool,
        page_type: PageType,
        sections: Vec<Section>,
        visible: bool,
    }
}

contract! {
    /// Form layout of a work item type.
    FormLayout("workItemTrackingProcess.FormLayout") {
        extensions: Vec<Extension>,
        pages: Vec<Page>,
        system_controls: Vec<Control>,
    }
}

impl FormLayout {
    /// Every control on every page, in layout order.
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.pages
            .iter()
            .flatten()
            .flat_map(|page| page.sections.iter().flatten())
            .flat_map(|section| section.groups.iter().flatten())
            .flat_map(|group| group.controls.iter().flatten())
    }

    /// Control bound to the given field reference name.
    pub fn control_for(&self, field: &str) -> Option<&Control> {
        self.controls().find(|control| control.id.as_deref() == Some(field))
    }
}

contract! {
    ProcessWorkItemType("workItemTrackingProcess.ProcessWorkItemType") {
        behaviors: Vec<WorkItemTypeBehavior>,
        class: WorkItemTypeClass,
        color: String,
        customization: CustomizationType,
        description: String,
        icon: String,
        inherits: String,
        is_disabled: bool,
        layout: FormLayout,
        name: String,
        reference_name: String,
        states: Vec<WorkItemStateResultModel>,
        url: String,
    }
}

impl ProcessWorkItemType {
    /// Visible states ordered by their `order`.
    pub fn visible_states(&self) -> Vec<&WorkItemStateResultModel> {
        let mut states: Vec<_> = self
            .states
            .iter()
            .flatten()
            .filter(|state| !state.hidden.unwrap_or(false))
            .collect();
        states.sort_by_key(|state| state.order.unwrap_or(i32::MAX));
        states
    }
}

contract! {
    ProcessWorkItemTypeField("workItemTrackingProcess.ProcessWorkItemTypeField") {
        allow_groups: bool,
        customization: CustomizationType,
        default_value: serde_json::Value,
        description: String,
        name: String,
        read_only: bool,
        reference_name: String,
        required: bool,
        r#type: super::work_item_tracking::FieldType,
        url: String,
    }
}

contract! {
    RuleAction("workItemTrackingProcess.RuleAction") {
        action_type: RuleActionType,
        target_field: String,
        value: String,
    }
}

contract! {
    RuleCondition("workItemTrackingProcess.RuleCondition") {
        condition_type: RuleConditionType,
        field: String,
        value: String,
    }
}

contract! {
    ProcessRule("workItemTrackingProcess.ProcessRule") {
        actions: Vec<RuleAction>,
        conditions: Vec<RuleCondition>,
        is_disabled: bool,
        name: String,
        customization_type: CustomizationType,
        id: Uuid,
        is_system: bool,
        url: String,
    }
}

impl ProcessRule {
    /// Fields this rule writes to.
    pub fn target_fields(&self) -> Vec<&str> {
        self.actions
            .iter()
            .flatten()
            .filter_map(|action| action.target_field.as_deref())
            .collect()
    }
}

contract! {
    PickListMetadata("workItemTrackingProcess.PickListMetadata") {
        id: Uuid,
        is_suggested: bool,
        name: String,
        r#type: String,
        url: String,
    }
}

contract! {
    PickList("workItemTrackingProcess.PickList") {
        id: Uuid,
        is_suggested: bool,
        name: String,
        r#type: String,
        url: String,
        items: Vec<String>,
    }
}

contract! {
    ProcessBehaviorField("workItemTrackingProcess.ProcessBehaviorField") {
        name: String,
        reference_name: String,
        url: String,
    }
}

contract! {
    ProcessBehavior("workItemTrackingProcess.ProcessBehavior") {
        color: String,
        customization: CustomizationType,
        description: String,
        fields: Vec<ProcessBehaviorField>,
        inherits: WorkItemBehaviorReference,
        name: String,
        rank: i32,
        reference_name: String,
        url: String,
    }
}

contract! {
    FieldRuleModel("workItemTrackingProcess.FieldRuleModel") {
        fields: Vec<WorkItemFieldReference>,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<ProcessClass>()
        .enumeration::<CustomizationType>()
        .enumeration::<PageType>()
        .enumeration::<WorkItemTypeClass>()
        .enumeration::<RuleActionType>()
        .enumeration::<RuleConditionType>()
        .enumeration::<GetWorkItemTypeExpand>()
        .enumeration::<GetProcessExpandLevel>();

    registry
        .plain::<ProjectReference>()
        .contract::<ProcessProperties, _>(|t| t.enumeration("class", ProcessClass::ENUM_NAME))
        .contract::<ProcessInfo, _>(|t| {
            t.enumeration("customizationType", CustomizationType::ENUM_NAME)
                .array("projects", ProjectReference::TYPE_NAME)
        })
        .plain::<CreateProcessModel>()
        .contract::<WorkItemStateResultModel, _>(|t| {
            t.enumeration("customizationType", CustomizationType::ENUM_NAME)
        })
        .plain::<WorkItemBehaviorReference>()
        .contract::<WorkItemTypeBehavior, _>(|t| {
            t.object("behavior", WorkItemBehaviorReference::TYPE_NAME)
        })
        .plain::<Extension>()
        .plain::<Control>()
        .contract::<Group, _>(|t| t.array("controls", Control::TYPE_NAME))
        .contract::<Section, _>(|t| t.array("groups", Group::TYPE_NAME))
        .contract::<Page, _>(|t| {
            t.enumeration("pageType", PageType::ENUM_NAME)
                .array("sections", Section::TYPE_NAME)
        })
        .contract::<FormLayout, _>(|t| {
            t.array("pages", Page::TYPE_NAME)
                .array("systemControls", Control::TYPE_NAME)
        })
        .contract::<ProcessWorkItemType, _>(|t| {
            t.array("behaviors", WorkItemTypeBehavior::TYPE_NAME)
                .enumeration("class", WorkItemTypeClass::ENUM_NAME)
                .enumeration("customization", CustomizationType::ENUM_NAME)
                .object("layout", FormLayout::TYPE_NAME)
                .array("states", WorkItemStateResultModel::TYPE_NAME)
        })
        .contract::<ProcessWorkItemTypeField, _>(|t| {
            t.enumeration("customization", CustomizationType::ENUM_NAME)
                .enumeration("type", super::work_item_tracking::FieldType::ENUM_NAME)
        })
        .contract::<RuleAction, _>(|t| t.enumeration("actionType", RuleActionType::ENUM_NAME))
        .contract::<RuleCondition, _>(|t| {
            t.enumeration("conditionType", RuleConditionType::ENUM_NAME)
        })
        .contract::<ProcessRule, _>(|t| {
            t.array("actions", RuleAction::TYPE_NAME)
                .array("conditions", RuleCondition::TYPE_NAME)
                .enumeration("customizationType", CustomizationType::ENUM_NAME)
        })
        .plain::<PickListMetadata>()
        .plain::<PickList>()
        .plain::<ProcessBehaviorField>()
        .contract::<ProcessBehavior, _>(|t| {
            t.enumeration("customization", CustomizationType::ENUM_NAME)
                .array("fields", ProcessBehaviorField::TYPE_NAME)
                .object("inherits", WorkItemBehaviorReference::TYPE_NAME)
        })
        .plain::<FieldRuleModel>();
}
