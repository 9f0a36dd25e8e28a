//! Route definitions for one work-item collection.
//!
//! Mounted once per kind by `api_routes()`.

use axum::routing::{get, put};
use axum::{Extension, Router};

use tracklane_core::status::WorkItemKind;

use crate::handlers::work_items;
use crate::state::AppState;

/// Collection routes for `kind`.
///
/// ```text
/// POST   /                  -> create
/// GET    /                  -> list (?search=&page=&limit=&status=)
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// PUT    /{id}/status       -> update_status
/// ```
pub fn router(kind: WorkItemKind) -> Router<AppState> {
    Router::new()
        .route("/", get(work_items::list).post(work_items::create))
        .route(
            "/{id}",
            get(work_items::get_by_id)
                .put(work_items::update)
                .delete(work_items::delete),
        )
        .route("/{id}/status", put(work_items::update_status))
        .layer(Extension(kind))
}
