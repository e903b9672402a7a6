//! Subset of the Drive Activity API v2 resources used by the collector.
//!
//! Every union ("oneOf") resource is modelled as a struct of optional
//! members; the `kind()` helpers return the name of the member that is set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QueryDriveActivityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ancestor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryDriveActivityResponse {
    #[serde(default)]
    pub activities: Vec<DriveActivity>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DriveActivity {
    pub primary_action_detail: Option<ActionDetail>,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub targets: Vec<Target>,
    pub timestamp: Option<String>,
    pub time_range: Option<TimeRange>,
}

impl DriveActivity {
    /// The activity's timestamp, else the end of its time range, else `unknown`.
    pub fn time(&self) -> &str {
        self.timestamp
            .as_deref()
            .or_else(|| {
                self.time_range
                    .as_ref()
                    .and_then(|range| range.end_time.as_deref())
            })
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Action {
    pub detail: Option<ActionDetail>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActionDetail {
    pub create: Option<Create>,
    pub edit: Option<Value>,
    #[serde(rename = "move")]
    pub move_: Option<Move>,
    pub rename: Option<Rename>,
    pub delete: Option<Delete>,
    pub restore: Option<Restore>,
    pub permission_change: Option<PermissionChange>,
    pub comment: Option<Comment>,
    pub dlp_change: Option<Value>,
    pub reference: Option<Value>,
    pub settings_change: Option<Value>,
    pub applied_label_change: Option<Value>,
}

impl ActionDetail {
    pub fn kind(&self) -> &'static str {
        if self.create.is_some() {
            "create"
        } else if self.edit.is_some() {
            "edit"
        } else if self.move_.is_some() {
            "move"
        } else if self.rename.is_some() {
            "rename"
        } else if self.delete.is_some() {
            "delete"
        } else if self.restore.is_some() {
            "restore"
        } else if self.permission_change.is_some() {
            "permissionChange"
        } else if self.comment.is_some() {
            "comment"
        } else if self.dlp_change.is_some() {
            "dlpChange"
        } else if self.reference.is_some() {
            "reference"
        } else if self.settings_change.is_some() {
            "settingsChange"
        } else if self.applied_label_change.is_some() {
            "appliedLabelChange"
        } else {
            "unknown"
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub new: Option<Value>,
    pub upload: Option<Value>,
    pub copy: Option<Copy>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Copy {
    pub original_object: Option<TargetReference>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    #[serde(default)]
    pub added_parents: Vec<TargetReference>,
    #[serde(default)]
    pub removed_parents: Vec<TargetReference>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Rename {
    pub old_title: Option<String>,
    pub new_title: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Delete {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Restore {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PermissionChange {
    #[serde(default)]
    pub added_permissions: Vec<Permission>,
    #[serde(default)]
    pub removed_permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub role: Option<String>,
    pub user: Option<User>,
    pub group: Option<Group>,
    pub domain: Option<Domain>,
    pub anyone: Option<Value>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Group {
    pub email: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: Option<String>,
    pub legacy_id: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post: Option<Subtyped>,
    pub assignment: Option<Assignment>,
    pub suggestion: Option<Subtyped>,
    #[serde(default)]
    pub mentioned_users: Vec<User>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Subtyped {
    pub subtype: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub subtype: Option<String>,
    pub assigned_user: Option<User>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub known_user: Option<KnownUser>,
    pub deleted_user: Option<Value>,
    pub unknown_user: Option<Value>,
}

impl User {
    pub fn kind(&self) -> &'static str {
        if self.known_user.is_some() {
            "knownUser"
        } else if self.deleted_user.is_some() {
            "deletedUser"
        } else if self.unknown_user.is_some() {
            "unknownUser"
        } else {
            "unknown"
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct KnownUser {
    pub person_name: Option<String>,
    pub is_current_user: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user: Option<User>,
    pub anonymous: Option<Value>,
    pub impersonation: Option<Value>,
    pub system: Option<Value>,
    pub administrator: Option<Value>,
}

impl Actor {
    pub fn kind(&self) -> &'static str {
        if self.user.is_some() {
            "user"
        } else if self.anonymous.is_some() {
            "anonymous"
        } else if self.impersonation.is_some() {
            "impersonation"
        } else if self.system.is_some() {
            "system"
        } else if self.administrator.is_some() {
            "administrator"
        } else {
            "unknown"
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub drive_item: Option<TitledItem>,
    pub drive: Option<TitledItem>,
    pub file_comment: Option<FileComment>,
}

impl Target {
    pub fn kind(&self) -> &'static str {
        if self.drive_item.is_some() {
            "driveItem"
        } else if self.drive.is_some() {
            "drive"
        } else if self.file_comment.is_some() {
            "fileComment"
        } else {
            "unknown"
        }
    }
}

/// Drive items, shared drives and their references all carry `name` and `title`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TitledItem {
    pub name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileComment {
    pub legacy_comment_id: Option<String>,
    pub legacy_discussion_id: Option<String>,
    pub link_to_discussion: Option<String>,
    pub parent: Option<TitledItem>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TargetReference {
    pub drive_item: Option<TitledItem>,
    pub drive: Option<TitledItem>,
}

impl TargetReference {
    pub fn kind(&self) -> &'static str {
        if self.drive_item.is_some() {
            "driveItem"
        } else if self.drive.is_some() {
            "drive"
        } else {
            "unknown"
        }
    }
}
