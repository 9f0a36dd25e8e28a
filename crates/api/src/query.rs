//! Shared query parameter types for API handlers.

use serde::Deserialize;
use tracklane_core::search::{ListQuery, DEFAULT_LIMIT, DEFAULT_PAGE};

/// Listing parameters (`?search=&page=&limit=&status=`).
///
/// Missing values take the engine defaults; out-of-range values are
/// rejected by the handler, not clamped.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        Self {
            search: params.search.unwrap_or_default(),
            page: params.page.unwrap_or(DEFAULT_PAGE),
            limit: params.limit.unwrap_or(DEFAULT_LIMIT),
            status: params.status.filter(|s| !s.is_empty()),
        }
    }
}
