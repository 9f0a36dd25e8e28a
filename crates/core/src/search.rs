//! Filtered, paginated listing of work items.
//!
//! The engine only builds the filter and the window; the repository does
//! the matching. Text matching is a case-insensitive substring test,
//! OR-combined across the kind's searchable fields and AND-combined with
//! the optional status filter.

use serde::Serialize;

use crate::error::CoreError;
use crate::repository::WorkItemRepository;
use crate::status::{Status, WorkItemKind};
use crate::work_item::{TextField, WorkItem};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default 1-based page number.
pub const DEFAULT_PAGE: i64 = 1;

/// Default number of items per page.
pub const DEFAULT_LIMIT: i64 = 25;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// Fields the free-text search runs over for each kind.
pub fn search_fields(kind: WorkItemKind) -> &'static [TextField] {
    match kind {
        WorkItemKind::Ticket | WorkItemKind::Task => &[TextField::Title, TextField::Description],
        WorkItemKind::Milestone => &[TextField::Name],
        WorkItemKind::Project => &[TextField::Name, TextField::Description],
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Case-insensitive substring match over a set of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    pub needle: String,
    pub fields: &'static [TextField],
}

impl TextMatch {
    pub fn matches(&self, item: &WorkItem) -> bool {
        let needle = self.needle.to_lowercase();
        self.fields.iter().any(|field| {
            item.text(*field)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
    }
}

/// What a listing selects. Always scoped to one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemFilter {
    pub kind: WorkItemKind,
    /// `None` matches every item.
    pub text: Option<TextMatch>,
    pub status: Option<Status>,
}

impl WorkItemFilter {
    /// Filter that selects every item of `kind`.
    pub fn all(kind: WorkItemKind) -> Self {
        Self {
            kind,
            text: None,
            status: None,
        }
    }

    /// Reference implementation of the filter, used by in-process stores.
    pub fn matches(&self, item: &WorkItem) -> bool {
        item.kind == self.kind
            && self.status.map_or(true, |s| item.status == s)
            && self.text.as_ref().map_or(true, |t| t.matches(item))
    }
}

// ---------------------------------------------------------------------------
// Query & results
// ---------------------------------------------------------------------------

/// A listing request as the inbound layer hands it over.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// Free text; empty means match all.
    pub search: String,
    /// 1-based.
    pub page: i64,
    pub limit: i64,
    /// Exact status name, validated against the kind.
    pub status: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            status: None,
        }
    }
}

/// Pagination summary returned alongside each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Number of items to skip before `page`, or `None` if it does not fit in
/// an `i64`.
pub fn skip_for(page: i64, limit: i64) -> Option<i64> {
    page.checked_sub(1)?.checked_mul(limit)
}

/// `ceil(total / limit)`.
pub fn page_count(total: i64, limit: i64) -> i64 {
    total / limit + i64::from(total % limit != 0)
}

/// Check a page window before handing it to [`paginate`].
///
/// The engine itself does not clamp; out-of-range values are the caller's
/// problem and this is where the caller finds out.
pub fn validate_window(page: i64, limit: i64) -> Result<(), CoreError> {
    if page < 1 {
        return Err(CoreError::Validation(format!(
            "page must be 1 or greater (got {page})"
        )));
    }
    if limit <= 0 || limit > MAX_LIMIT {
        return Err(CoreError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT} (got {limit})"
        )));
    }
    if skip_for(page, limit).is_none() {
        return Err(CoreError::Validation(format!(
            "page {page} is out of range"
        )));
    }
    Ok(())
}

/// Turn a listing request into a repository filter.
pub fn build_filter(kind: WorkItemKind, query: &ListQuery) -> Result<WorkItemFilter, CoreError> {
    let needle = query.search.trim();
    let text = (!needle.is_empty()).then(|| TextMatch {
        needle: needle.to_string(),
        fields: search_fields(kind),
    });
    let status = query
        .status
        .as_deref()
        .map(|s| Status::parse(kind, s))
        .transpose()?;

    Ok(WorkItemFilter { kind, text, status })
}

/// Fetch one page of `kind` items plus the total match count.
///
/// Expects a window that already passed [`validate_window`].
pub async fn paginate(
    repo: &dyn WorkItemRepository,
    kind: WorkItemKind,
    query: &ListQuery,
) -> Result<Page<WorkItem>, CoreError> {
    let filter = build_filter(kind, query)?;
    let skip = skip_for(query.page, query.limit).ok_or_else(|| {
        CoreError::Validation(format!("page {} is out of range", query.page))
    })?;
    let total = repo.count(&filter).await?;
    let items = repo.find_many(&filter, skip, query.limit).await?;

    Ok(Page {
        items,
        pagination: Pagination {
            total,
            page: query.page,
            pages: page_count(total, query.limit),
            limit: query.limit,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
