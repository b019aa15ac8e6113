//! File containers (build drops, test attachments).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    ContainerItemType("fileContainer.ContainerItemType") {
        Any = 0 => "any",
        Folder = 1 => "folder",
        File = 2 => "file",
    }
}

contract_enum! {
    ContainerItemStatus("fileContainer.ContainerItemStatus") {
        /// Item is created.
        Created = 1 => "created",
        /// Item is a file pending upload.
        PendingUpload = 2 => "pendingUpload",
    }
}

contract_flags! {
    ContainerOptions("fileContainer.ContainerOptions") {
        NONE = 0 => "none",
    }
}

contract! {
    /// A container of files and folders.
    FileContainer("fileContainer.FileContainer") {
        artifact_uri: String,
        content_location: String,
        created_by: Uuid,
        date_created: DateTime<Utc>,
        description: String,
        id: i64,
        item_location: String,
        locator_path: String,
        name: String,
        options: ContainerOptions,
        scope_identifier: Uuid,
        security_token: String,
        signing_key_id: Uuid,
        size: i64,
    }
}

contract! {
    FileContainerItem("fileContainer.FileContainerItem") {
        artifact_id: i64,
        blob_metadata: super::PropertyBag,
        container_id: i64,
        /// Base64 on the wire.
        content_id: String,
        content_location: String,
        created_by: Uuid,
        date_created: DateTime<Utc>,
        date_last_modified: DateTime<Utc>,
        file_encoding: i32,
        file_hash: String,
        file_id: i32,
        file_length: i64,
        file_type: i32,
        item_location: String,
        item_type: ContainerItemType,
        last_modified_by: Uuid,
        /// Container-relative path, `/` separated.
        path: String,
        scope_identifier: Uuid,
        status: ContainerItemStatus,
        ticket: String,
    }
}

impl FileContainerItem {
    pub fn is_folder(&self) -> bool {
        self.item_type == Some(ContainerItemType::Folder)
    }

    /// Last path segment.
    pub fn file_name(&self) -> Option<&str> {
        self.path.as_deref()?.rsplit('/').next()
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<ContainerItemType>()
        .enumeration::<ContainerItemStatus>()
        .enumeration::<ContainerOptions>()
        .contract::<FileContainer, _>(|t| {
            t.date("dateCreated")
                .enumeration("options", ContainerOptions::ENUM_NAME)
        })
        .contract::<FileContainerItem, _>(|t| {
            t.date("dateCreated")
                .date("dateLastModified")
                .enumeration("itemType", ContainerItemType::ENUM_NAME)
                .enumeration("status", ContainerItemStatus::ENUM_NAME)
        });
}
