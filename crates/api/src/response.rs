//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Listings add a
//! sibling `pagination` object.

use serde::Serialize;
use tracklane_core::search::{Page, Pagination};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [...], "pagination": { total, page, pages, limit } }`.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.items,
            pagination: page.pagination,
        }
    }
}
