//! Team Foundation Version Control: changesets, items, branches and labels.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{common::IdentityRef, Contract, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_flags! {
    /// Kind of change to an item. A change usually combines several bits.
    VersionControlChangeType("tfvc.VersionControlChangeType") {
        NONE = 0 => "none",
        ADD = 1 => "add",
        EDIT = 2 => "edit",
        ENCODING = 4 => "encoding",
        RENAME = 8 => "rename",
        DELETE = 16 => "delete",
        UNDELETE = 32 => "undelete",
        BRANCH = 64 => "branch",
        MERGE = 128 => "merge",
        LOCK = 256 => "lock",
        ROLLBACK = 512 => "rollback",
        SOURCE_RENAME = 1024 => "sourceRename",
        TARGET_RENAME = 2048 => "targetRename",
        PROPERTY = 4096 => "property",
        ALL = 8191 => "all",
    }
}

contract_enum! {
    ItemContentType("tfvc.ItemContentType") {
        RawText = 0 => "rawText",
        Base64Encoded = 1 => "base64Encoded",
    }
}

contract_enum! {
    VersionControlRecursionType("tfvc.VersionControlRecursionType") {
        /// Only the item itself.
        None = 0 => "none",
        /// The item and its direct children.
        OneLevel = 1 => "oneLevel",
        /// Direct children, plus the item itself if it is a folder.
        OneLevelPlusNestedEmptyFolders = 4 => "oneLevelPlusNestedEmptyFolders",
        Full = 120 => "full",
    }
}

contract_enum! {
    TfvcVersionType("tfvc.TfvcVersionType") {
        None = 0 => "none",
        Changeset = 1 => "changeset",
        Shelveset = 2 => "shelveset",
        Change = 3 => "change",
        Date = 4 => "date",
        Latest = 5 => "latest",
        Tip = 6 => "tip",
        MergeSource = 7 => "mergeSource",
    }
}

contract_enum! {
    TfvcVersionOption("tfvc.TfvcVersionOption") {
        None = 0 => "none",
        Previous = 1 => "previous",
        UseRename = 2 => "useRename",
    }
}

contract! {
    FileContentMetadata("tfvc.FileContentMetadata") {
        content_type: String,
        encoding: i32,
        extension: String,
        file_name: String,
        is_binary: bool,
        is_image: bool,
        vs_link: String,
    }
}

contract! {
    ItemContent("tfvc.ItemContent") {
        content: String,
        content_type: ItemContentType,
    }
}

contract! {
    TfvcItem("tfvc.TfvcItem") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        content: String,
        content_metadata: FileContentMetadata,
        is_folder: bool,
        is_sym_link: bool,
        path: String,
        url: String,
        change_date: DateTime<Utc>,
        deletion_id: i32,
        encoding: i32,
        hash_value: String,
        is_branch: bool,
        is_pending_change: bool,
        size: i64,
        version: i32,
    }
}

contract! {
    TfvcChange("tfvc.TfvcChange") {
        change_type: VersionControlChangeType,
        item: TfvcItem,
        new_content: ItemContent,
        source_server_item: String,
        url: String,
        merge_sources: Vec<TfvcMergeSource>,
        pending_version: i32,
    }
}

contract! {
    TfvcMergeSource("tfvc.TfvcMergeSource") {
        is_rename: bool,
        server_item: String,
        version_from: i32,
        version_to: i32,
    }
}

contract! {
    CheckinNote("tfvc.CheckinNote") {
        name: String,
        value: String,
    }
}

contract! {
    TfvcPolicyOverrideInfo("tfvc.TfvcPolicyOverrideInfo") {
        comment: String,
        policy_failures: Vec<TfvcPolicyFailureInfo>,
    }
}

contract! {
    TfvcPolicyFailureInfo("tfvc.TfvcPolicyFailureInfo") {
        message: String,
        policy_name: String,
    }
}

contract! {
    AssociatedWorkItem("tfvc.AssociatedWorkItem") {
        assigned_to: String,
        id: i32,
        state: String,
        title: String,
        url: String,
        web_url: String,
        work_item_type: String,
    }
}

contract! {
    TfvcChangesetRef("tfvc.TfvcChangesetRef") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        author: IdentityRef,
        changeset_id: i32,
        checked_in_by: IdentityRef,
        comment: String,
        comment_truncated: bool,
        created_date: DateTime<Utc>,
        url: String,
    }
}

contract! {
    TfvcChangeset("tfvc.TfvcChangeset") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        author: IdentityRef,
        changeset_id: i32,
        checked_in_by: IdentityRef,
        comment: String,
        comment_truncated: bool,
        created_date: DateTime<Utc>,
        url: String,
        account_id: Uuid,
        changes: Vec<TfvcChange>,
        checkin_notes: Vec<CheckinNote>,
        collection_id: Uuid,
        has_more_changes: bool,
        policy_override: TfvcPolicyOverrideInfo,
        team_project_ids: Vec<Uuid>,
        work_items: Vec<AssociatedWorkItem>,
    }
}

impl TfvcChangeset {
    /// Changes whose type includes every bit of `kind`.
    pub fn changes_of(&self, kind: VersionControlChangeType) -> impl Iterator<Item = &TfvcChange> {
        self.changes
            .iter()
            .flatten()
            .filter(move |change| change.change_type.is_some_and(|t| t.contains(kind)))
    }
}

contract! {
    TfvcShallowBranchRef("tfvc.TfvcShallowBranchRef") {
        path: String,
    }
}

contract! {
    TfvcBranchMapping("tfvc.TfvcBranchMapping") {
        depth: String,
        server_item: String,
        r#type: String,
    }
}

contract! {
    TfvcBranch("tfvc.TfvcBranch") {
        path: String,
        #[serde(rename = "_links")]
        links: PropertyBag,
        created_date: DateTime<Utc>,
        description: String,
        is_deleted: bool,
        owner: IdentityRef,
        url: String,
        children: Vec<TfvcBranch>,
        mappings: Vec<TfvcBranchMapping>,
        parent: TfvcShallowBranchRef,
        related_branches: Vec<TfvcShallowBranchRef>,
    }
}

impl TfvcBranch {
    /// This branch and every descendant, depth first.
    pub fn descendants(&self) -> Vec<&TfvcBranch> {
        let mut out = vec![self];
        for child in self.children.iter().flatten() {
            out.extend(child.descendants());
        }
        out
    }
}

contract! {
    TfvcLabelRef("tfvc.TfvcLabelRef") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        description: String,
        id: i32,
        label_scope: String,
        modified_date: DateTime<Utc>,
        name: String,
        owner: IdentityRef,
        url: String,
    }
}

contract! {
    TfvcLabel("tfvc.TfvcLabel") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        description: String,
        id: i32,
        label_scope: String,
        modified_date: DateTime<Utc>,
        name: String,
        owner: IdentityRef,
        url: String,
        items: Vec<TfvcItem>,
    }
}

contract! {
    TfvcShelvesetRef("tfvc.TfvcShelvesetRef") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        comment: String,
        comment_truncated: bool,
        created_date: DateTime<Utc>,
        id: String,
        name: String,
        owner: IdentityRef,
        url: String,
    }
}

contract! {
    TfvcVersionDescriptor("tfvc.TfvcVersionDescriptor") {
        version: String,
        version_option: TfvcVersionOption,
        version_type: TfvcVersionType,
    }
}

contract! {
    TfvcItemDescriptor("tfvc.TfvcItemDescriptor") {
        path: String,
        recursion_level: VersionControlRecursionType,
        version: String,
        version_option: TfvcVersionOption,
        version_type: TfvcVersionType,
    }
}

contract! {
    TfvcItemRequestData("tfvc.TfvcItemRequestData") {
        include_content_metadata: bool,
        include_links: bool,
        item_descriptors: Vec<TfvcItemDescriptor>,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<VersionControlChangeType>()
        .enumeration::<ItemContentType>()
        .enumeration::<VersionControlRecursionType>()
        .enumeration::<TfvcVersionType>()
        .enumeration::<TfvcVersionOption>();

    registry
        .plain::<FileContentMetadata>()
        .contract::<ItemContent, _>(|t| t.enumeration("contentType", ItemContentType::ENUM_NAME))
        .contract::<TfvcItem, _>(|t| t.date("changeDate"))
        .contract::<TfvcChange, _>(|t| {
            t.enumeration("changeType", VersionControlChangeType::ENUM_NAME)
                .object("item", TfvcItem::TYPE_NAME)
                .object("newContent", ItemContent::TYPE_NAME)
                .array("mergeSources", TfvcMergeSource::TYPE_NAME)
        })
        .plain::<TfvcMergeSource>()
        .plain::<CheckinNote>()
        .plain::<TfvcPolicyFailureInfo>()
        .contract::<TfvcPolicyOverrideInfo, _>(|t| {
            t.array("policyFailures", TfvcPolicyFailureInfo::TYPE_NAME)
        })
        .plain::<AssociatedWorkItem>()
        .contract::<TfvcChangesetRef, _>(|t| t.date("createdDate"))
        .contract::<TfvcChangeset, _>(|t| {
            t.array("changes", TfvcChange::TYPE_NAME)
                .date("createdDate")
                .object("policyOverride", TfvcPolicyOverrideInfo::TYPE_NAME)
        })
        .plain::<TfvcShallowBranchRef>()
        .plain::<TfvcBranchMapping>()
        .contract::<TfvcBranch, _>(|t| {
            t.array("children", TfvcBranch::TYPE_NAME)
                .date("createdDate")
        })
        .contract::<TfvcLabelRef, _>(|t| t.date("modifiedDate"))
        .contract::<TfvcLabel, _>(|t| {
            t.array("items", TfvcItem::TYPE_NAME)
                .date("modifiedDate")
        })
        .contract::<TfvcShelvesetRef, _>(|t| t.date("createdDate"))
        .contract::<TfvcVersionDescriptor, _>(|t| {
            t.enumeration("versionOption", TfvcVersionOption::ENUM_NAME)
                .enumeration("versionType", TfvcVersionType::ENUM_NAME)
        })
        .contract::<TfvcItemDescriptor, _>(|t| {
            t.enumeration("recursionLevel", VersionControlRecursionType::ENUM_NAME)
                .enumeration("versionOption", TfvcVersionOption::ENUM_NAME)
                .enumeration("versionType", TfvcVersionType::ENUM_NAME)
        })
        .contract::<TfvcItemRequestData, _>(|t| {
            t.array("itemDescriptors", TfvcItemDescriptor::TYPE_NAME)
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
    fn changeset_changes_decode_combined_change_types() {
        let changeset: TfvcChangeset = from_value(&json!({
            "changesetId": 16,
            "createdDate": "2024-03-14T15:09:26.53Z",
            "comment": "Rename and edit",
            "changes": [
                {"changeType": "edit, rename", "item": {"path": "$/Fabrikam/src/app.cs", "version": 16}},
                {"changeType": 1, "item": {"path": "$/Fabrikam/src/new.cs", "changeDate": "2024-03-14T15:09:26Z"}},
                {"changeType": "delete", "item": {"path": "$/Fabrikam/src/old.cs"}}
            ]
        }))
        .unwrap();

        let first = &changeset.changes.as_ref().unwrap()[0];
        let kind = first.change_type.unwrap();
        assert_eq!(kind.bits(), 10);
        assert_eq!(kind.to_string(), "edit, rename");

        let renamed: Vec<_> = changeset
            .changes_of(VersionControlChangeType::RENAME)
            .filter_map(|c| c.item.as_ref()?.path.as_deref())
            .collect();
        assert_eq!(renamed, ["$/Fabrikam/src/app.cs"]);
        assert_eq!(changeset.changes_of(VersionControlChangeType::ADD).count(), 1);
    }

    #[test]
    fn branch_tree_walks_depth_first() {
        let root: TfvcBranch = from_value(&json!({
            "path": "$/Fabrikam/Main",
            "createdDate": "2023-01-01T00:00:00Z",
            "children": [
                {"path": "$/Fabrikam/Dev", "children": [{"path": "$/Fabrikam/Dev-Feature"}]},
                {"path": "$/Fabrikam/Release"}
            ]
        }))
        .unwrap();

        let paths: Vec<_> = root
            .descendants()
            .into_iter()
            .filter_map(|b| b.path.as_deref())
            .collect();
        assert_eq!(
            paths,
            ["$/Fabrikam/Main", "$/Fabrikam/Dev", "$/Fabrikam/Dev-Feature", "$/Fabrikam/Release"]
        );
    }

    #[test]
    fn item_request_encodes_recursion_names() {
        let request = TfvcItemRequestData {
            include_links: Some(false),
            item_descriptors: Some(vec![TfvcItemDescriptor {
                path: Some("$/Fabrikam".into()),
                recursion_level: Some(VersionControlRecursionType::OneLevel),
                version_type: Some(TfvcVersionType::Latest),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let wire = to_wire(&request, EnumEncoding::Names).unwrap();
        assert_eq!(
            wire,
            json!({
                "includeLinks": false,
                "itemDescriptors": [
                    {"path": "$/Fabrikam", "recursionLevel": "oneLevel", "versionType": "latest"}
                ]
            })
        );
    }
}
