// --- File: crates/gactivity_drive/src/logic.rs ---
use std::collections::{BTreeSet, HashMap};

use gactivity_common::format::{normalize_timestamp, truncated};
use gactivity_common::{external_service_error, DriveActivityRecord, GactivityError};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ActionDetail, Actor, Comment, DriveActivity, Permission, PermissionChange, Target,
    TargetReference, TitledItem, User,
};

// --- Error Handling ---
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Drive Activity API error ({status}): {message}")]
    ApiError { status: u16, message: String },
}

impl From<DriveError> for GactivityError {
    fn from(err: DriveError) -> Self {
        external_service_error("Google Drive Activity", err)
    }
}

/// Every `people/{id}` name referenced by the activities, so they can be
/// resolved to email addresses before formatting.
pub fn person_names(activities: &[DriveActivity]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut add = |user: Option<&User>| {
        if let Some(name) = user
            .and_then(|user| user.known_user.as_ref())
            .and_then(|known| known.person_name.as_ref())
        {
            names.insert(name.clone());
        }
    };

    for activity in activities {
        for actor in &activity.actors {
            add(actor.user.as_ref());
        }
        let details = activity
            .primary_action_detail
            .iter()
            .chain(activity.actions.iter().filter_map(|action| action.detail.as_ref()));
        for detail in details {
            if let Some(comment) = &detail.comment {
                comment.mentioned_users.iter().for_each(|user| add(Some(user)));
                add(comment
                    .assignment
                    .as_ref()
                    .and_then(|assignment| assignment.assigned_user.as_ref()));
            }
            if let Some(change) = &detail.permission_change {
                change
                    .added_permissions
                    .iter()
                    .chain(&change.removed_permissions)
                    .for_each(|permission| add(permission.user.as_ref()));
            }
        }
    }
    names
}

/// Targets, moved parents and permission changes show at most this many entries.
pub const LIST_PREVIEW: usize = 2;

/// Turns Drive Activity resources into table rows.
///
/// Person names are looked up in `emails`; names without an entry are kept as is.
pub struct ActivityFormatter<'a> {
    emails: &'a HashMap<String, String>,
    actor_preview: usize,
}

impl<'a> ActivityFormatter<'a> {
    pub fn new(emails: &'a HashMap<String, String>, actor_preview: usize) -> Self {
        Self {
            emails,
            actor_preview,
        }
    }

    fn email_for(&self, person_name: &str) -> String {
        self.emails
            .get(person_name)
            .cloned()
            .unwrap_or_else(|| person_name.to_string())
    }

    pub fn user_info(&self, user: Option<&User>) -> String {
        let Some(user) = user else {
            return "unknown".to_string();
        };
        match user
            .known_user
            .as_ref()
            .and_then(|known| known.person_name.as_deref())
        {
            Some(person_name) => self.email_for(person_name),
            None => user.kind().to_string(),
        }
    }

    pub fn actor_info(&self, actor: &Actor) -> String {
        match &actor.user {
            Some(user) => self.user_info(Some(user)),
            None => actor.kind().to_string(),
        }
    }

    pub fn target_info(&self, target: &Target) -> String {
        if let Some(item) = &target.drive_item {
            return titled("driveItem", item);
        }
        if let Some(drive) = &target.drive {
            return titled("drive", drive);
        }
        if let Some(comment) = &target.file_comment {
            return match &comment.parent {
                Some(parent) => titled("fileComment", parent),
                None => "fileComment:unknown".to_string(),
            };
        }
        target.kind().to_string()
    }

    /// One row per action; all rows of an activity share a fresh id.
    pub fn to_records(&self, activity: &DriveActivity) -> Vec<DriveActivityRecord> {
        let activity_id = Uuid::new_v4().to_string();
        let time_activity = normalize_timestamp(activity.time());
        let primary_action = action_info(activity.primary_action_detail.as_ref());
        let actors: Vec<String> = activity.actors.iter().map(|a| self.actor_info(a)).collect();
        let targets: Vec<String> = activity.targets.iter().map(|t| self.target_info(t)).collect();
        let user_action = truncated(&actors, self.actor_preview);
        let item = truncated(&targets, LIST_PREVIEW);

        activity
            .actions
            .iter()
            .map(|action| {
                let detail = action.detail.as_ref();
                DriveActivityRecord {
                    activity_id: activity_id.clone(),
                    time_activity: time_activity.clone(),
                    user_action: user_action.clone(),
                    primary_action: primary_action.clone(),
                    sub_action: action_info(detail),
                    sub_action_type: detail.map(sub_action_type).unwrap_or_default(),
                    sub_action_result: detail
                        .map(|detail| self.sub_action_result(detail))
                        .unwrap_or_default(),
                    item: item.clone(),
                }
            })
            .collect()
    }

    /// Sorts activities by time, then flattens them into rows.
    pub fn to_sorted_records(&self, mut activities: Vec<DriveActivity>) -> Vec<DriveActivityRecord> {
        activities.sort_by_cached_key(|activity| normalize_timestamp(activity.time()));
        activities
            .iter()
            .flat_map(|activity| self.to_records(activity))
            .collect()
    }

    pub fn sub_action_result(&self, detail: &ActionDetail) -> String {
        if let Some(comment) = &detail.comment {
            return self.comment_result(comment);
        }
        if let Some(create) = &detail.create {
            return create
                .copy
                .as_ref()
                .map(|copy| target_reference_info(copy.original_object.as_ref()))
                .unwrap_or_default();
        }
        if let Some(moved) = &detail.move_ {
            let parents = if !moved.added_parents.is_empty() {
                &moved.added_parents
            } else {
                &moved.removed_parents
            };
            let parents: Vec<String> = parents
                .iter()
                .map(|parent| target_reference_info(Some(parent)))
                .collect();
            return truncated(&parents, LIST_PREVIEW);
        }
        if let Some(rename) = &detail.rename {
            return format!(
                "[oldTitle:'{}', newTitle:'{}']",
                rename.old_title.as_deref().unwrap_or("null"),
                rename.new_title.as_deref().unwrap_or("null")
            );
        }
        if let Some(change) = &detail.permission_change {
            return truncated(&self.permission_changes(change), LIST_PREVIEW);
        }
        String::new()
    }

    /// `{"mentionedUsers": [...],"assignment": {...},"post": {...},"suggestion": {...}}`
    /// with only the members that are present.
    fn comment_result(&self, comment: &Comment) -> String {
        let mut parts = Vec::new();
        if !comment.mentioned_users.is_empty() {
            let users: Vec<String> = comment
                .mentioned_users
                .iter()
                .map(|user| format!("\"{}\"", self.user_info(Some(user))))
                .collect();
            parts.push(format!("\"mentionedUsers\": [{}]", users.join(",")));
        }
        if let Some(assignment) = &comment.assignment {
            parts.push(format!(
                "\"assignment\": {{\"assignedUser\": \"{}\",\"subtype\": \"{}\"}}",
                self.user_info(assignment.assigned_user.as_ref()),
                assignment.subtype.as_deref().unwrap_or("null")
            ));
        }
        if let Some(post) = &comment.post {
            parts.push(format!(
                "\"post\": {{\"subtype\": \"{}\"}}",
                post.subtype.as_deref().unwrap_or("null")
            ));
        }
        if let Some(suggestion) = &comment.suggestion {
            parts.push(format!(
                "\"suggestion\": {{\"subtype\": \"{}\"}}",
                suggestion.subtype.as_deref().unwrap_or("null")
            ));
        }
        format!("{{{}}}", parts.join(","))
    }

    /// Added permissions win over removed ones.
    fn permission_changes(&self, change: &PermissionChange) -> Vec<String> {
        let permissions = if !change.added_permissions.is_empty() {
            &change.added_permissions
        } else {
            &change.removed_permissions
        };
        permissions
            .iter()
            .map(|permission| self.permission_info(permission))
            .collect()
    }

    fn permission_info(&self, permission: &Permission) -> String {
        let mut grantee = "unknown".to_string();
        if let Some(user) = &permission.user {
            grantee = match user
                .known_user
                .as_ref()
                .and_then(|known| known.person_name.as_deref())
            {
                Some(person_name) => person_name.to_string(),
                None => user.kind().to_string(),
            };
        }
        if let Some(email) = permission.group.as_ref().and_then(|group| group.email.as_deref()) {
            grantee = email.to_string();
        }
        if let Some(name) = permission.domain.as_ref().and_then(|domain| domain.name.as_deref()) {
            grantee = name.to_string();
        }
        if permission.anyone.is_some() {
            grantee = "anyone".to_string();
        }
        format!(
            "Role:'{}', User:'{}'",
            permission.role.as_deref().unwrap_or("null"),
            self.email_for(&grantee)
        )
    }
}

fn titled(kind: &str, item: &TitledItem) -> String {
    format!("{}:'{}'", kind, item.title.as_deref().unwrap_or("null"))
}

pub fn action_info(detail: Option<&ActionDetail>) -> String {
    detail.map(ActionDetail::kind).unwrap_or("unknown").to_string()
}

pub fn target_reference_info(reference: Option<&TargetReference>) -> String {
    let Some(reference) = reference else {
        return "unknown".to_string();
    };
    if let Some(item) = &reference.drive_item {
        return titled("driveItem", item);
    }
    if let Some(drive) = &reference.drive {
        return titled("drive", drive);
    }
    reference.kind().to_string()
}

/// Finer classification of an action, e.g. the kind of creation or move.
pub fn sub_action_type(detail: &ActionDetail) -> String {
    if detail.comment.is_some() {
        return "commented".to_string();
    }
    if let Some(create) = &detail.create {
        let kind = if create.copy.is_some() {
            "copy"
        } else if create.new.is_some() {
            "new"
        } else if create.upload.is_some() {
            "upload"
        } else {
            ""
        };
        return kind.to_string();
    }
    if let Some(delete) = &detail.delete {
        return delete.kind.clone().unwrap_or_default();
    }
    if detail.edit.is_some() {
        return "edit".to_string();
    }
    if let Some(moved) = &detail.move_ {
        if !moved.added_parents.is_empty() {
            return "addedParents".to_string();
        }
        if !moved.removed_parents.is_empty() {
            return "removedParents".to_string();
        }
        return String::new();
    }
    if detail.rename.is_some() {
        return "rename".to_string();
    }
    if let Some(restore) = &detail.restore {
        return restore.kind.clone().unwrap_or_default();
    }
    if let Some(change) = &detail.permission_change {
        if !change.added_permissions.is_empty() {
            return "addedPermissions".to_string();
        }
        if !change.removed_permissions.is_empty() {
            return "removedPermissions".to_string();
        }
    }
    String::new()
}
