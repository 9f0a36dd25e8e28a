//! Repository for the `work_items` table.

use async_trait::async_trait;
use sqlx::PgPool;
use tracklane_core::error::CoreError;
use tracklane_core::repository::WorkItemRepository;
use tracklane_core::search::WorkItemFilter;
use tracklane_core::types::DbId;
use tracklane_core::work_item::{NewWorkItem, WorkItem};

use crate::models::work_item::WorkItemRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, kind, display_number, status, title, name, description, \
    assignee, priority, attributes, raised_at, closed_at, \
    elapsed_days, gap_days, created_at, updated_at";

/// Stable newest-first ordering for listings.
const ORDER_BY: &str = "ORDER BY raised_at DESC, id DESC";

/// PostgreSQL-backed [`WorkItemRepository`].
#[derive(Clone)]
pub struct PgWorkItemRepo {
    pool: PgPool,
}

impl PgWorkItemRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Log a driver error and hide it behind [`CoreError::Storage`].
fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "work_items query failed");
    CoreError::Storage(err.to_string())
}

/// Escape `LIKE` metacharacters so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build the `WHERE` clause for `filter`.
///
/// Every bound value is text, returned in placeholder order starting at `$1`.
fn build_where(filter: &WorkItemFilter) -> (String, Vec<String>) {
    let mut conditions = vec!["kind = $1".to_string()];
    let mut binds = vec![filter.kind.as_str().to_string()];

    if let Some(status) = filter.status {
        binds.push(status.as_str().to_string());
        conditions.push(format!("status = ${}", binds.len()));
    }

    if let Some(text) = &filter.text {
        binds.push(format!("%{}%", escape_like(&text.needle)));
        let idx = binds.len();
        let ors: Vec<String> = text
            .fields
            .iter()
            .map(|f| format!("{} ILIKE ${idx}", f.column()))
            .collect();
        conditions.push(format!("({})", ors.join(" OR ")));
    }

    (format!("WHERE {}", conditions.join(" AND ")), binds)
}

#[async_trait]
impl WorkItemRepository for PgWorkItemRepo {
    async fn insert(&self, record: NewWorkItem) -> Result<WorkItem, CoreError> {
        let query = format!(
            "INSERT INTO work_items \
                (kind, display_number, status, title, name, description, \
                 assignee, priority, attributes, raised_at, closed_at, \
                 elapsed_days, gap_days, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, WorkItemRow>(&query)
            .bind(record.kind.as_str())
            .bind(&record.display_number)
            .bind(record.status.as_str())
            .bind(&record.title)
            .bind(&record.name)
            .bind(&record.description)
            .bind(&record.assignee)
            .bind(&record.priority)
            .bind(&record.attributes)
            .bind(record.raised_at)
            .bind(record.closed_at)
            .bind(record.elapsed_days)
            .bind(record.gap_days)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<WorkItem>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM work_items WHERE id = $1");
        sqlx::query_as::<_, WorkItemRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(WorkItem::try_from)
            .transpose()
    }

    async fn find_many(
        &self,
        filter: &WorkItemFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<WorkItem>, CoreError> {
        let (where_clause, binds) = build_where(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM work_items {where_clause} {ORDER_BY} \
             LIMIT ${} OFFSET ${}",
            binds.len() + 1,
            binds.len() + 2
        );

        let mut q = sqlx::query_as::<_, WorkItemRow>(&query);
        for value in &binds {
            q = q.bind(value);
        }
        q = q.bind(limit).bind(skip);

        q.fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(WorkItem::try_from)
            .collect()
    }

    async fn count(&self, filter: &WorkItemFilter) -> Result<i64, CoreError> {
        let (where_clause, binds) = build_where(filter);
        let query = format!("SELECT COUNT(*) FROM work_items {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for value in &binds {
            q = q.bind(value);
        }
        q.fetch_one(&self.pool).await.map_err(storage_error)
    }

    async fn update_by_id(
        &self,
        id: DbId,
        record: &WorkItem,
    ) -> Result<Option<WorkItem>, CoreError> {
        // kind, display_number and created_at are fixed at insert.
        let query = format!(
            "UPDATE work_items SET \
                status = $2, title = $3, name = $4, description = $5, \
                assignee = $6, priority = $7, attributes = $8, \
                raised_at = $9, closed_at = $10, \
                elapsed_days = $11, gap_days = $12, updated_at = $13 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkItemRow>(&query)
            .bind(id)
            .bind(record.status.as_str())
            .bind(&record.title)
            .bind(&record.name)
            .bind(&record.description)
            .bind(&record.assignee)
            .bind(&record.priority)
            .bind(&record.attributes)
            .bind(record.raised_at)
            .bind(record.closed_at)
            .bind(record.elapsed_days)
            .bind(record.gap_days)
            .bind(record.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(WorkItem::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM work_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(storage_error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
