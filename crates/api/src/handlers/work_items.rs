//! Handlers for the work-item collections (`/tickets`, `/tasks`,
//! `/milestones`, `/projects`).
//!
//! Each collection router injects its [`WorkItemKind`] as an extension, so
//! one set of handlers serves all four kinds.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use tracklane_core::error::CoreError;
use tracklane_core::search::{self, ListQuery};
use tracklane_core::status::WorkItemKind;
use tracklane_core::types::DbId;
use tracklane_core::work_item::{CreateWorkItem, UpdateWorkItemStatus, WorkItem, WorkItemPatch};

use crate::error::{AppError, AppResult};
use crate::query::ListParams;
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /{collection}
// ---------------------------------------------------------------------------

/// Create a work item. Status defaults to the kind's initial status.
pub async fn create(
    Extension(kind): Extension<WorkItemKind>,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkItem>,
) -> AppResult<(StatusCode, Json<DataResponse<WorkItem>>)> {
    let item = state.service.create(kind, input).await?;

    tracing::info!(
        work_item_id = item.id,
        kind = %kind,
        status = %item.status,
        display_number = item.display_number.as_deref(),
        "Work item created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

// ---------------------------------------------------------------------------
// GET /{collection}
// ---------------------------------------------------------------------------

/// List items with optional search, status filter and pagination.
///
/// `page < 1` and `limit <= 0` are rejected with 400.
pub async fn list(
    Extension(kind): Extension<WorkItemKind>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResponse<WorkItem>>> {
    let query = ListQuery::from(params);

    search::validate_window(query.page, query.limit).map_err(|e| match e {
        CoreError::Validation(msg) => AppError::BadRequest(msg),
        other => AppError::Core(other),
    })?;

    let page = state.service.list(kind, &query).await?;
    Ok(Json(page.into()))
}

// ---------------------------------------------------------------------------
// GET /{collection}/{id}
// ---------------------------------------------------------------------------

pub async fn get_by_id(
    Extension(kind): Extension<WorkItemKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WorkItem>>> {
    let item = state.service.get(kind, id).await?;
    Ok(Json(DataResponse { data: item }))
}

// ---------------------------------------------------------------------------
// PUT /{collection}/{id}
// ---------------------------------------------------------------------------

/// Partial update. Derived fields follow any status or timestamp change.
pub async fn update(
    Extension(kind): Extension<WorkItemKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<WorkItemPatch>,
) -> AppResult<Json<DataResponse<WorkItem>>> {
    let updated = state.service.update(kind, id, input).await?;

    if updated.previous_status != updated.item.status {
        tracing::info!(
            work_item_id = id,
            kind = %kind,
            from = %updated.previous_status,
            to = %updated.item.status,
            "Work item status changed",
        );
    } else {
        tracing::debug!(work_item_id = id, kind = %kind, "Work item updated");
    }

    Ok(Json(DataResponse { data: updated.item }))
}

// ---------------------------------------------------------------------------
// PUT /{collection}/{id}/status
// ---------------------------------------------------------------------------

/// Move an item to a new status, optionally stamping `closed_at`.
pub async fn update_status(
    Extension(kind): Extension<WorkItemKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkItemStatus>,
) -> AppResult<Json<DataResponse<WorkItem>>> {
    let updated = state.service.update_status(kind, id, input).await?;

    tracing::info!(
        work_item_id = id,
        kind = %kind,
        from = %updated.previous_status,
        to = %updated.item.status,
        elapsed_days = updated.item.elapsed_days,
        gap_days = updated.item.gap_days,
        "Work item status updated",
    );

    Ok(Json(DataResponse { data: updated.item }))
}

// ---------------------------------------------------------------------------
// DELETE /{collection}/{id}
// ---------------------------------------------------------------------------

pub async fn delete(
    Extension(kind): Extension<WorkItemKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.service.delete(kind, id).await?;
    tracing::info!(work_item_id = id, kind = %kind, "Work item deleted");
    Ok(StatusCode::NO_CONTENT)
}
