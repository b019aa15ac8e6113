//! Work items, fields, queries and classification nodes.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::{common::IdentityRef, Contract, PropertyBag};
use crate::{
    enums::ContractEnum,
    schema::{FieldKind, SchemaRegistry},
};

/// Link type of a child-to-parent relation.
pub const PARENT_LINK: &str = "System.LinkTypes.Hierarchy-Reverse";
/// Link type of a parent-to-child relation.
pub const CHILD_LINK: &str = "System.LinkTypes.Hierarchy-Forward";

contract_enum! {
    FieldType("workItemTracking.FieldType") {
        String = 0 => "string",
        Integer = 1 => "integer",
        DateTime = 2 => "dateTime",
        PlainText = 3 => "plainText",
        Html = 4 => "html",
        TreePath = 5 => "treePath",
        History = 6 => "history",
        Double = 7 => "double",
        Guid = 8 => "guid",
        Boolean = 9 => "boolean",
        Identity = 10 => "identity",
        PicklistString = 11 => "picklistString",
        PicklistInteger = 12 => "picklistInteger",
        PicklistDouble = 13 => "picklistDouble",
    }
}

contract_enum! {
    FieldUsage("workItemTracking.FieldUsage") {
        None = 0 => "none",
        WorkItem = 1 => "workItem",
        WorkItemLink = 2 => "workItemLink",
        Tree = 3 => "tree",
        WorkItemTypeExtension = 4 => "workItemTypeExtension",
    }
}

contract_enum! {
    QueryType("workItemTracking.QueryType") {
        /// Work items only.
        Flat = 1 => "flat",
        /// Parent/child tree.
        Tree = 2 => "tree",
        OneHop = 3 => "oneHop",
    }
}

contract_enum! {
    QueryResultType("workItemTracking.QueryResultType") {
        WorkItem = 1 => "workItem",
        WorkItemLink = 2 => "workItemLink",
    }
}

contract_enum! {
    QueryExpand("workItemTracking.QueryExpand") {
        None = 0 => "none",
        Wiql = 1 => "wiql",
        Clauses = 2 => "clauses",
        All = 3 => "all",
        Minimal = 4 => "minimal",
    }
}

contract_enum! {
    LinkQueryMode("workItemTracking.LinkQueryMode") {
        WorkItems = 0 => "workItems",
        LinksOneHopMustContain = 1 => "linksOneHopMustContain",
        LinksOneHopMayContain = 2 => "linksOneHopMayContain",
        LinksOneHopDoesNotContain = 3 => "linksOneHopDoesNotContain",
        LinksRecursiveMustContain = 4 => "linksRecursiveMustContain",
        LinksRecursiveMayContain = 5 => "linksRecursiveMayContain",
        LinksRecursiveDoesNotContain = 6 => "linksRecursiveDoesNotContain",
    }
}

contract_enum! {
    QueryRecursionOption("workItemTracking.QueryRecursionOption") {
        ParentFirst = 0 => "parentFirst",
        ChildFirst = 1 => "childFirst",
    }
}

contract_enum! {
    LogicalOperation("workItemTracking.LogicalOperation") {
        None = 0 => "nONE",
        And = 1 => "aND",
        Or = 2 => "oR",
    }
}

contract_enum! {
    TreeNodeStructureType("workItemTracking.TreeNodeStructureType") {
        Area = 0 => "area",
        Iteration = 1 => "iteration",
    }
}

contract_enum! {
    TreeStructureGroup("workItemTracking.TreeStructureGroup") {
        Areas = 0 => "areas",
        Iterations = 1 => "iterations",
    }
}

contract_enum! {
    WorkItemExpand("workItemTracking.WorkItemExpand") {
        None = 0 => "none",
        Relations = 1 => "relations",
        Fields = 2 => "fields",
        Links = 3 => "links",
        All = 4 => "all",
    }
}

contract_enum! {
    WorkItemErrorPolicy("workItemTracking.WorkItemErrorPolicy") {
        /// Fail the whole request on the first error.
        Fail = 1 => "fail",
        /// Return null for items that fail.
        Omit = 2 => "omit",
    }
}

contract_enum! {
    GetFieldsExpand("workItemTracking.GetFieldsExpand") {
        None = 0 => "none",
        ExtensionFields = 1 => "extensionFields",
        IncludeDeleted = 2 => "includeDeleted",
    }
}

contract_flags! {
    WorkItemTypeFieldsExpandLevel("workItemTracking.WorkItemTypeFieldsExpandLevel") {
        NONE = 0 => "none",
        ALLOWED_VALUES = 1 => "allowedValues",
        DEPENDENT_FIELDS = 2 => "dependentFields",
        ALL = 3 => "all",
    }
}

contract! {
    WorkItemFieldReference("workItemTracking.WorkItemFieldReference") {
        name: String,
        /// e.g. `System.Title`.
        reference_name: String,
        url: String,
    }
}

contract! {
    WorkItemReference("workItemTracking.WorkItemReference") {
        id: i32,
        url: String,
    }
}

contract! {
    WorkItemRelation("workItemTracking.WorkItemRelation") {
        attributes: PropertyBag,
        /// Link type reference name.
        rel: String,
        url: String,
    }
}

impl WorkItemRelation {
    /// Id of the linked work item, read from the end of its url.
    pub fn target_id(&self) -> Option<i32> {
        self.url.as_deref()?.rsplit('/').next()?.parse().ok()
    }
}

contract! {
    WorkItemCommentVersionRef("workItemTracking.WorkItemCommentVersionRef") {
        comment_id: i32,
        created_in_revision: i32,
        is_deleted: bool,
        text: String,
        url: String,
        version: i32,
    }
}

contract! {
    /// A work item at one revision.
    WorkItem("workItemTracking.WorkItem") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        comment_version_ref: WorkItemCommentVersionRef,
        /// Field reference name to value.
        fields: PropertyBag,
        id: i32,
        relations: Vec<WorkItemRelation>,
        rev: i32,
    }
}

impl WorkItem {
    pub fn field(&self, reference_name: &str) -> Option<&Value> {
        self.fields.as_ref()?.get(reference_name)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("System.Title")?.as_str()
    }

    pub fn state(&self) -> Option<&str> {
        self.field("System.State")?.as_str()
    }

    pub fn work_item_type(&self) -> Option<&str> {
        self.field("System.WorkItemType")?.as_str()
    }

    /// Relations of the given link type.
    pub fn relations_of<'a>(&'a self, rel: &'a str) -> impl Iterator<Item = &'a WorkItemRelation> {
        self.relations
            .iter()
            .flatten()
            .filter(move |relation| relation.rel.as_deref() == Some(rel))
    }

    pub fn parent_id(&self) -> Option<i32> {
        self.relations_of(PARENT_LINK).find_map(WorkItemRelation::target_id)
    }

    pub fn child_ids(&self) -> Vec<i32> {
        self.relations_of(CHILD_LINK)
            .filter_map(WorkItemRelation::target_id)
            .collect()
    }
}

contract! {
    WorkItemFieldUpdate("workItemTracking.WorkItemFieldUpdate") {
        new_value: Value,
        old_value: Value,
    }
}

contract! {
    WorkItemRelationUpdates("workItemTracking.WorkItemRelationUpdates") {
        added: Vec<WorkItemRelation>,
        removed: Vec<WorkItemRelation>,
        updated: Vec<WorkItemRelation>,
    }
}

contract! {
    /// Delta between two revisions.
    WorkItemUpdate("workItemTracking.WorkItemUpdate") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        fields: IndexMap<String, WorkItemFieldUpdate>,
        id: i32,
        relations: WorkItemRelationUpdates,
        rev: i32,
        revised_by: IdentityRef,
        revised_date: DateTime<Utc>,
        work_item_id: i32,
    }
}

contract! {
    WorkItemFieldOperation("workItemTracking.WorkItemFieldOperation") {
        name: String,
        reference_name: String,
    }
}

contract! {
    WorkItemField("workItemTracking.WorkItemField") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        can_sort_by: bool,
        description: String,
        is_deleted: bool,
        is_identity: bool,
        is_picklist: bool,
        is_picklist_suggested: bool,
        is_queryable: bool,
        name: String,
        picklist_id: Uuid,
        read_only: bool,
        reference_name: String,
        supported_operations: Vec<WorkItemFieldOperation>,
        r#type: FieldType,
        usage: FieldUsage,
    }
}

contract! {
    WorkItemLink("workItemTracking.WorkItemLink") {
        rel: String,
        source: WorkItemReference,
        target: WorkItemReference,
    }
}

contract! {
    WorkItemQuerySortColumn("workItemTracking.WorkItemQuerySortColumn") {
        descending: bool,
        field: WorkItemFieldReference,
    }
}

contract! {
    /// Result of running a WIQL query.
    WorkItemQueryResult("workItemTracking.WorkItemQueryResult") {
        as_of: DateTime<Utc>,
        columns: Vec<WorkItemFieldReference>,
        query_result_type: QueryResultType,
        query_type: QueryType,
        sort_columns: Vec<WorkItemQuerySortColumn>,
        work_item_relations: Vec<WorkItemLink>,
        work_items: Vec<WorkItemReference>,
    }
}

impl WorkItemQueryResult {
    /// Ids in result order, from either result shape.
    pub fn ids(&self) -> Vec<i32> {
        match self.query_result_type {
            Some(QueryResultType::WorkItemLink) => self
                .work_item_relations
                .iter()
                .flatten()
                .filter_map(|link| link.target.as_ref()?.id)
                .collect(),
            _ => self
                .work_items
                .iter()
                .flatten()
                .filter_map(|item| item.id)
                .collect(),
        }
    }
}

contract! {
    Wiql("workItemTracking.Wiql") {
        query: String,
    }
}

impl Wiql {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
        }
    }
}

contract! {
    WorkItemQueryClause("workItemTracking.WorkItemQueryClause") {
        clauses: Vec<WorkItemQueryClause>,
        field: WorkItemFieldReference,
        field_value: WorkItemFieldReference,
        is_field_value: bool,
        logical_operator: LogicalOperation,
        operator: WorkItemFieldOperation,
        value: String,
    }
}

contract! {
    /// Saved query or query folder.
    QueryHierarchyItem("workItemTracking.QueryHierarchyItem") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        children: Vec<QueryHierarchyItem>,
        clauses: WorkItemQueryClause,
        columns: Vec<WorkItemFieldReference>,
        created_by: IdentityRef,
        created_date: DateTime<Utc>,
        filter_options: LinkQueryMode,
        has_children: bool,
        id: Uuid,
        is_deleted: bool,
        is_folder: bool,
        is_invalid_syntax: bool,
        is_public: bool,
        last_executed_by: IdentityRef,
        last_executed_date: DateTime<Utc>,
        last_modified_by: IdentityRef,
        last_modified_date: DateTime<Utc>,
        link_clauses: WorkItemQueryClause,
        name: String,
        path: String,
        query_recursion_option: QueryRecursionOption,
        query_type: QueryType,
        sort_columns: Vec<WorkItemQuerySortColumn>,
        source_clauses: WorkItemQueryClause,
        target_clauses: WorkItemQueryClause,
        wiql: String,
    }
}

impl QueryHierarchyItem {
    /// Find a descendant by its path, this item included.
    pub fn find(&self, path: &str) -> Option<&QueryHierarchyItem> {
        if self.path.as_deref() == Some(path) {
            return Some(self);
        }
        self.children
            .iter()
            .flatten()
            .find_map(|child| child.find(path))
    }
}

contract! {
    /// Area or iteration node.
    WorkItemClassificationNode("workItemTracking.WorkItemClassificationNode") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        /// Iterations carry `startDate` and `finishDate` here.
        attributes: PropertyBag,
        children: Vec<WorkItemClassificationNode>,
        has_children: bool,
        id: i32,
        identifier: Uuid,
        name: String,
        path: String,
        structure_type: TreeNodeStructureType,
    }
}

impl WorkItemClassificationNode {
    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(WorkItemClassificationNode::node_count)
            .sum::<usize>()
    }
}

contract! {
    WorkItemBatchGetRequest("workItemTracking.WorkItemBatchGetRequest") {
        #[serde(rename = "$expand")]
        expand: WorkItemExpand,
        as_of: DateTime<Utc>,
        error_policy: WorkItemErrorPolicy,
        fields: Vec<String>,
        ids: Vec<i32>,
    }
}

contract! {
    WorkItemStateColor("workItemTracking.WorkItemStateColor") {
        /// `Proposed`, `InProgress`, `Resolved`, `Completed` or `Removed`.
        category: String,
        color: String,
        name: String,
    }
}

contract! {
    WorkItemStateTransition("workItemTracking.WorkItemStateTransition") {
        actions: Vec<String>,
        to: String,
    }
}

contract! {
    WorkItemIcon("workItemTracking.WorkItemIcon") {
        id: String,
        url: String,
    }
}

contract! {
    WorkItemTypeFieldInstance("workItemTracking.WorkItemTypeFieldInstance") {
        name: String,
        reference_name: String,
        url: String,
        always_required: bool,
        allowed_values: Vec<String>,
        default_value: String,
        dependent_fields: Vec<WorkItemFieldReference>,
        help_text: String,
    }
}

contract! {
    WorkItemType("workItemTracking.WorkItemType") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        color: String,
        description: String,
        field_instances: Vec<WorkItemTypeFieldInstance>,
        fields: Vec<WorkItemTypeFieldInstance>,
        icon: WorkItemIcon,
        is_disabled: bool,
        name: String,
        reference_name: String,
        states: Vec<WorkItemStateColor>,
        /// From-state to allowed transitions; `""` is the initial state.
        transitions: IndexMap<String, Vec<WorkItemStateTransition>>,
        xml_form: String,
    }
}

impl WorkItemType {
    /// States reachable from `from` in one transition.
    pub fn next_states(&self, from: &str) -> Vec<&str> {
        self.transitions
            .as_ref()
            .and_then(|transitions| transitions.get(from))
            .into_iter()
            .flatten()
            .filter_map(|transition| transition.to.as_deref())
            .collect()
    }
}

contract! {
    WorkItemTypeReference("workItemTracking.WorkItemTypeReference") {
        name: String,
        url: String,
    }
}

contract! {
    WorkItemTypeCategory("workItemTracking.WorkItemTypeCategory") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        url: String,
        default_work_item_type: WorkItemTypeReference,
        name: String,
        reference_name: String,
        work_item_types: Vec<WorkItemTypeReference>,
    }
}

contract! {
    WorkItemDelete("workItemTracking.WorkItemDelete") {
        code: i32,
        deleted_by: String,
        deleted_date: String,
        id: i32,
        message: String,
        name: String,
        project: String,
        r#type: String,
        url: String,
        resource: WorkItem,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<FieldType>()
        .enumeration::<FieldUsage>()
        .enumeration::<QueryType>()
        .enumeration::<QueryResultType>()
        .enumeration::<QueryExpand>()
        .enumeration::<LinkQueryMode>()
        .enumeration::<QueryRecursionOption>()
        .enumeration::<LogicalOperation>()
        .enumeration::<TreeNodeStructureType>()
        .enumeration::<TreeStructureGroup>()
        .enumeration::<WorkItemExpand>()
        .enumeration::<WorkItemErrorPolicy>()
        .enumeration::<GetFieldsExpand>()
        .enumeration::<WorkItemTypeFieldsExpandLevel>();

    registry
        .plain::<WorkItemFieldReference>()
        .plain::<WorkItemReference>()
        .plain::<WorkItemRelation>()
        .plain::<WorkItemCommentVersionRef>()
        .contract::<WorkItem, _>(|t| {
            t.object("commentVersionRef", WorkItemCommentVersionRef::TYPE_NAME)
                .array("relations", WorkItemRelation::TYPE_NAME)
        })
        .plain::<WorkItemFieldUpdate>()
        .plain::<WorkItemRelationUpdates>()
        .contract::<WorkItemUpdate, _>(|t| {
            t.dictionary(
                "fields",
                None,
                Some(FieldKind::object(WorkItemFieldUpdate::TYPE_NAME)),
            )
            .object("relations", WorkItemRelationUpdates::TYPE_NAME)
            .date("revisedDate")
        })
        .plain::<WorkItemFieldOperation>()
        .contract::<WorkItemField, _>(|t| {
            t.enumeration("type", FieldType::ENUM_NAME)
                .enumeration("usage", FieldUsage::ENUM_NAME)
        })
        .plain::<WorkItemLink>()
        .plain::<WorkItemQuerySortColumn>()
        .contract::<WorkItemQueryResult, _>(|t| {
            t.date("asOf")
                .enumeration("queryResultType", QueryResultType::ENUM_NAME)
                .enumeration("queryType", QueryType::ENUM_NAME)
                .array("workItemRelations", WorkItemLink::TYPE_NAME)
        })
        .plain::<Wiql>()
        .contract::<WorkItemQueryClause, _>(|t| {
            t.array("clauses", WorkItemQueryClause::TYPE_NAME)
                .enumeration("logicalOperator", LogicalOperation::ENUM_NAME)
        })
        .contract::<QueryHierarchyItem, _>(|t| {
            t.array("children", QueryHierarchyItem::TYPE_NAME)
                .object("clauses", WorkItemQueryClause::TYPE_NAME)
                .date("createdDate")
                .enumeration("filterOptions", LinkQueryMode::ENUM_NAME)
                .date("lastExecutedDate")
                .date("lastModifiedDate")
                .object("linkClauses", WorkItemQueryClause::TYPE_NAME)
                .enumeration("queryRecursionOption", QueryRecursionOption::ENUM_NAME)
                .enumeration("queryType", QueryType::ENUM_NAME)
                .object("sourceClauses", WorkItemQueryClause::TYPE_NAME)
                .object("targetClauses", WorkItemQueryClause::TYPE_NAME)
        })
        .contract::<WorkItemClassificationNode, _>(|t| {
            t.array("children", WorkItemClassificationNode::TYPE_NAME)
                .enumeration("structureType", TreeNodeStructureType::ENUM_NAME)
        })
        .contract::<WorkItemBatchGetRequest, _>(|t| {
            t.enumeration("$expand", WorkItemExpand::ENUM_NAME)
                .date("asOf")
                .enumeration("errorPolicy", WorkItemErrorPolicy::ENUM_NAME)
        })
        .plain::<WorkItemStateColor>()
        .plain::<WorkItemStateTransition>()
        .plain::<WorkItemIcon>()
        .plain::<WorkItemTypeFieldInstance>()
        .contract::<WorkItemType, _>(|t| {
            t.dictionary(
                "transitions",
                None,
                Some(FieldKind::array(FieldKind::object(
                    WorkItemStateTransition::TYPE_NAME,
                ))),
            )
        })
        .plain::<WorkItemTypeReference>()
        .plain::<WorkItemTypeCategory>()
        .contract::<WorkItemDelete, _>(|t| t.object("resource", WorkItem::TYPE_NAME));
}
