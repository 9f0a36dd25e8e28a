pub mod health;
pub mod work_items;

use axum::Router;

use tracklane_core::status::ALL_KINDS;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tickets                       list, create
/// /tickets/{id}                  get, update, delete
/// /tickets/{id}/status           status transition (PUT)
///
/// /tasks, /milestones, /projects same shape as /tickets
/// ```
pub fn api_routes() -> Router<AppState> {
    ALL_KINDS.iter().fold(Router::new(), |router, kind| {
        router.nest(&format!("/{}", kind.collection()), work_items::router(*kind))
    })
}
