//! Work-item record and the DTOs that create and patch it.
//!
//! One record shape covers tickets, tasks, milestones and projects. Free-form
//! fields (title, assignee, priority, `attributes`) pass straight through;
//! only status and the timestamp pair feed the lifecycle rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::status::{Status, WorkItemKind};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Maximum length for `title` and `name` (characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for `description` (characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored work item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItem {
    pub id: DbId,
    pub kind: WorkItemKind,
    /// Tickets only. Assigned once at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_number: Option<String>,
    pub status: Status,
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub attributes: serde_json::Value,
    pub raised_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    /// Fractional days from `raised_at` to `closed_at` (tickets, tasks,
    /// milestones).
    pub elapsed_days: Option<f64>,
    /// Whole days from `raised_at` to `closed_at` (projects).
    pub gap_days: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A work item that has not been assigned an `id` yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkItem {
    pub kind: WorkItemKind,
    pub display_number: Option<String>,
    pub status: Status,
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub attributes: serde_json::Value,
    pub raised_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub elapsed_days: Option<f64>,
    pub gap_days: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NewWorkItem {
    /// Attach the store-assigned id.
    pub fn into_work_item(self, id: DbId) -> WorkItem {
        WorkItem {
            id,
            kind: self.kind,
            display_number: self.display_number,
            status: self.status,
            title: self.title,
            name: self.name,
            description: self.description,
            assignee: self.assignee,
            priority: self.priority,
            attributes: self.attributes,
            raised_at: self.raised_at,
            closed_at: self.closed_at,
            elapsed_days: self.elapsed_days,
            gap_days: self.gap_days,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Text fields
// ---------------------------------------------------------------------------

/// Free-text fields a search filter can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Name,
    Description,
}

impl TextField {
    /// Column / document key holding the field.
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Name => "name",
            Self::Description => "description",
        }
    }
}

impl WorkItem {
    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => self.title.as_deref(),
            TextField::Name => self.name.as_deref(),
            TextField::Description => self.description.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Payload for creating a work item.
///
/// Timestamps arrive as strings and are parsed by the lifecycle layer so
/// that a bad value surfaces as a domain error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateWorkItem {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    /// Defaults to the kind's initial status.
    pub status: Option<String>,
    /// Defaults to now.
    pub raised_at: Option<String>,
    pub closed_at: Option<String>,
    pub attributes: Option<serde_json::Value>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct WorkItemPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub raised_at: Option<String>,
    pub closed_at: Option<String>,
    pub attributes: Option<serde_json::Value>,
}

/// Payload for the status-only transition endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkItemStatus {
    pub status: String,
    pub closed_at: Option<String>,
}

impl From<UpdateWorkItemStatus> for WorkItemPatch {
    fn from(input: UpdateWorkItemStatus) -> Self {
        Self {
            status: Some(input.status),
            closed_at: input.closed_at,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Run the derive-based field checks and fold failures into a [`CoreError`].
pub fn validate_fields<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(errors.to_string()))
}

/// Check the fields each kind requires at creation.
///
/// - ticket: `title` and `description`
/// - task: `title`
/// - milestone, project: `name`
pub fn validate_required(kind: WorkItemKind, input: &CreateWorkItem) -> Result<(), CoreError> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

    let missing: Vec<&str> = match kind {
        WorkItemKind::Ticket => [("title", &input.title), ("description", &input.description)]
            .into_iter()
            .filter(|(_, v)| !present(*v))
            .map(|(name, _)| name)
            .collect(),
        WorkItemKind::Task => (!present(&input.title))
            .then_some("title")
            .into_iter()
            .collect(),
        WorkItemKind::Milestone | WorkItemKind::Project => (!present(&input.name))
            .then_some("name")
            .into_iter()
            .collect(),
    };

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "A {kind} requires: {}",
            missing.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
