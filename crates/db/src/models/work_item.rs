//! Row model for the `work_items` table.

use sqlx::FromRow;
use tracklane_core::error::CoreError;
use tracklane_core::status::{Status, WorkItemKind};
use tracklane_core::types::{DbId, Timestamp};
use tracklane_core::work_item::WorkItem;

/// A row from the `work_items` table, with `kind` and `status` still as text.
#[derive(Debug, Clone, FromRow)]
pub struct WorkItemRow {
    pub id: DbId,
    pub kind: String,
    pub display_number: Option<String>,
    pub status: String,
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

impl TryFrom<WorkItemRow> for WorkItem {
    type Error = CoreError;

    /// Fails only if the row holds a kind or status the code no longer knows.
    fn try_from(row: WorkItemRow) -> Result<Self, Self::Error> {
        let kind = WorkItemKind::from_name(&row.kind)
            .map_err(|e| CoreError::Storage(format!("work_items row {}: {e}", row.id)))?;
        let status = Status::parse(kind, &row.status)
            .map_err(|e| CoreError::Storage(format!("work_items row {}: {e}", row.id)))?;

        Ok(WorkItem {
            id: row.id,
            kind,
            display_number: row.display_number,
            status,
            title: row.title,
            name: row.name,
            description: row.description,
            assignee: row.assignee,
            priority: row.priority,
            attributes: row.attributes,
            raised_at: row.raised_at,
            closed_at: row.closed_at,
            elapsed_days: row.elapsed_days,
            gap_days: row.gap_days,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
