//! Status transitions and derived-field maintenance.
//!
//! Any status in a kind's enumeration may follow any other. What matters is
//! keeping the closing timestamp and the duration metric consistent with the
//! status:
//!
//! - into a terminal status: compute the metric when `closed_at` is known,
//!   otherwise record the status and leave the metric unset for backfill;
//! - out of a terminal status (reopen): clear `closed_at` and the metric;
//! - between non-terminal statuses: leave derived fields alone.
//!
//! Recomputation only looks at the record being written, never at other
//! items.

use crate::clock::Clock;
use crate::elapsed::{self, parse_instant};
use crate::error::CoreError;
use crate::identifier;
use crate::status::{DurationMetric, Status, WorkItemKind};
use crate::types::Timestamp;
use crate::work_item::{
    validate_fields, validate_required, CreateWorkItem, NewWorkItem, WorkItem, WorkItemPatch,
};

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Validate that `from` may move to `to`.
///
/// Every pair within one kind is allowed. Stricter workflows would add a
/// transition table here.
pub fn validate_transition(from: Status, to: Status) -> Result<(), CoreError> {
    if from.kind() == to.kind() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move a {} to a {} status",
            from.kind(),
            to.kind()
        )))
    }
}

/// Derived duration fields for one record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub elapsed_days: Option<f64>,
    pub gap_days: Option<i64>,
}

/// Compute the metric `kind` carries for the span `raised_at..closed_at`.
///
/// A missing `closed_at` is not an error here: the metric is simply unset.
pub fn derive_metrics(
    kind: WorkItemKind,
    raised_at: &Timestamp,
    closed_at: Option<&Timestamp>,
) -> Metrics {
    match kind.duration_metric() {
        DurationMetric::ElapsedDays => Metrics {
            elapsed_days: elapsed::elapsed_days(Some(raised_at), closed_at).ok(),
            gap_days: None,
        },
        DurationMetric::GapDays => Metrics {
            elapsed_days: None,
            // Stored gaps never go negative.
            gap_days: elapsed::gap_in_days(Some(raised_at), closed_at)
                .ok()
                .map(|d| d.max(0)),
        },
    }
}

fn parse_optional_instant(raw: Option<&str>) -> Result<Option<Timestamp>, CoreError> {
    raw.map(parse_instant).transpose()
}

fn reject_closed_at_for_open(status: Status) -> CoreError {
    CoreError::Validation(format!(
        "closed_at can only be set when the status is one of {:?} (got '{status}')",
        status.kind().terminal_statuses()
    ))
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Build the record for a new item of `kind`.
///
/// Validates the payload, defaults the status to the kind's initial status
/// and `raised_at` to now, assigns a display number to tickets, and derives
/// metrics when the item is created already closed.
pub fn plan_create(
    kind: WorkItemKind,
    input: CreateWorkItem,
    clock: &dyn Clock,
) -> Result<NewWorkItem, CoreError> {
    validate_fields(&input)?;
    validate_required(kind, &input)?;

    let now = clock.now();
    let status = match input.status.as_deref() {
        Some(s) => Status::parse(kind, s)?,
        None => kind.initial_status(),
    };
    let raised_at = parse_optional_instant(input.raised_at.as_deref())?.unwrap_or(now);
    let closed_at = parse_optional_instant(input.closed_at.as_deref())?;

    if closed_at.is_some() && !status.is_terminal() {
        return Err(reject_closed_at_for_open(status));
    }

    let metrics = if status.is_terminal() {
        derive_metrics(kind, &raised_at, closed_at.as_ref())
    } else {
        Metrics::default()
    };

    let attributes = input
        .attributes
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
    if !attributes.is_object() {
        return Err(CoreError::Validation(
            "attributes must be a JSON object".into(),
        ));
    }

    Ok(NewWorkItem {
        kind,
        display_number: kind
            .has_display_number()
            .then(|| identifier::display_number(&now)),
        status,
        title: input.title,
        name: input.name,
        description: input.description,
        assignee: input.assignee,
        priority: input.priority,
        attributes,
        raised_at,
        closed_at,
        elapsed_days: metrics.elapsed_days,
        gap_days: metrics.gap_days,
        created_at: now,
        updated_at: now,
    })
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// Merge `patch` into `current`, returning the record to write back.
///
/// `id`, `kind`, `display_number` and `created_at` are never changed.
pub fn apply_patch(
    current: &WorkItem,
    patch: WorkItemPatch,
    now: Timestamp,
) -> Result<WorkItem, CoreError> {
    validate_fields(&patch)?;

    let next_status = match patch.status.as_deref() {
        Some(s) => Status::parse(current.kind, s)?,
        None => current.status,
    };
    validate_transition(current.status, next_status)?;

    let raised_at = parse_optional_instant(patch.raised_at.as_deref())?;
    let closed_at = parse_optional_instant(patch.closed_at.as_deref())?;

    if let Some(attributes) = &patch.attributes {
        if !attributes.is_object() {
            return Err(CoreError::Validation(
                "attributes must be a JSON object".into(),
            ));
        }
    }

    let mut next = current.clone();
    if let Some(v) = patch.title {
        next.title = Some(v);
    }
    if let Some(v) = patch.name {
        next.name = Some(v);
    }
    if let Some(v) = patch.description {
        next.description = Some(v);
    }
    if let Some(v) = patch.assignee {
        next.assignee = Some(v);
    }
    if let Some(v) = patch.priority {
        next.priority = Some(v);
    }
    if let Some(v) = patch.attributes {
        next.attributes = v;
    }
    if let Some(v) = raised_at {
        next.raised_at = v;
    }
    next.status = next_status;
    next.updated_at = now;

    let timing_touched =
        next_status != current.status || closed_at.is_some() || raised_at.is_some();
    if !timing_touched {
        return Ok(next);
    }

    match (current.status.is_terminal(), next_status.is_terminal()) {
        (_, true) => {
            next.closed_at = closed_at.or(current.closed_at);
            let metrics = derive_metrics(next.kind, &next.raised_at, next.closed_at.as_ref());
            next.elapsed_days = metrics.elapsed_days;
            next.gap_days = metrics.gap_days;
        }
        (true, false) => {
            if closed_at.is_some() {
                return Err(reject_closed_at_for_open(next_status));
            }
            next.closed_at = None;
            next.elapsed_days = None;
            next.gap_days = None;
        }
        (false, false) => {
            if closed_at.is_some() {
                return Err(reject_closed_at_for_open(next_status));
            }
        }
    }

    Ok(next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::status::{ProjectStatus, TaskStatus, TicketStatus};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 5, 15, 7, 0).unwrap()
    }

    fn ticket_input() -> CreateWorkItem {
        CreateWorkItem {
            title: Some("Printer on fire".into()),
            description: Some("Third floor".into()),
            raised_at: Some("2024-03-01T00:00:00Z".into()),
            ..CreateWorkItem::default()
        }
    }

    fn created_ticket() -> WorkItem {
        plan_create(WorkItemKind::Ticket, ticket_input(), &FixedClock(now()))
            .unwrap()
            .into_work_item(1)
    }

    fn status_patch(status: &str, closed_at: Option<&str>) -> WorkItemPatch {
        WorkItemPatch {
            status: Some(status.into()),
            closed_at: closed_at.map(Into::into),
            ..WorkItemPatch::default()
        }
    }

    // -- creation ------------------------------------------------------------

    #[test]
    fn create_defaults_to_initial_status_without_metrics() {
        let item = created_ticket();
        assert_eq!(item.status, Status::Ticket(TicketStatus::Open));
        assert!(item.closed_at.is_none());
        assert!(item.elapsed_days.is_none());
        assert!(item.gap_days.is_none());
    }

    #[test]
    fn create_assigns_display_number_to_tickets_only() {
        assert_eq!(created_ticket().display_number.as_deref(), Some("053020241507"));

        let task = plan_create(
            WorkItemKind::Task,
            CreateWorkItem {
                title: Some("Refill toner".into()),
                ..CreateWorkItem::default()
            },
            &FixedClock(now()),
        )
        .unwrap();
        assert!(task.display_number.is_none());
        assert_eq!(task.status, Status::Task(TaskStatus::Pending));
    }

    #[test]
    fn create_defaults_raised_at_to_clock() {
        let mut input = ticket_input();
        input.raised_at = None;
        let item = plan_create(WorkItemKind::Ticket, input, &FixedClock(now())).unwrap();
        assert_eq!(item.raised_at, now());
        assert_eq!(item.created_at, now());
    }

    #[test]
    fn create_rejects_unknown_status() {
        let mut input = ticket_input();
        input.status = Some("done".into());
        assert_matches!(
            plan_create(WorkItemKind::Ticket, input, &FixedClock(now())),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn create_rejects_closed_at_on_open_item() {
        let mut input = ticket_input();
        input.closed_at = Some("2024-03-02T00:00:00Z".into());
        assert_matches!(
            plan_create(WorkItemKind::Ticket, input, &FixedClock(now())),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn create_closed_computes_metric() {
        let mut input = ticket_input();
        input.status = Some("closed".into());
        input.closed_at = Some("2024-03-03T12:00:00Z".into());
        let item = plan_create(WorkItemKind::Ticket, input, &FixedClock(now())).unwrap();
        assert_eq!(item.elapsed_days, Some(2.5));
    }

    #[test]
    fn create_with_unparsable_instant_is_missing_data() {
        let mut input = ticket_input();
        input.raised_at = Some("last tuesday".into());
        assert_matches!(
            plan_create(WorkItemKind::Ticket, input, &FixedClock(now())),
            Err(CoreError::MissingData(_))
        );
    }

    #[test]
    fn create_rejects_non_object_attributes() {
        let mut input = ticket_input();
        input.attributes = Some(serde_json::json!([1, 2]));
        assert_matches!(
            plan_create(WorkItemKind::Ticket, input, &FixedClock(now())),
            Err(CoreError::Validation(_))
        );
    }

    // -- transitions ---------------------------------------------------------

    #[test]
    fn close_then_reopen() {
        let open = created_ticket();

        let closed =
            apply_patch(&open, status_patch("closed", Some("2024-03-02T06:00:00Z")), now())
                .unwrap();
        assert_eq!(closed.status, Status::Ticket(TicketStatus::Closed));
        assert_eq!(closed.elapsed_days, Some(1.25));
        assert!(closed.closed_at.is_some());

        let reopened = apply_patch(&closed, status_patch("open", None), now()).unwrap();
        assert_eq!(reopened.status, Status::Ticket(TicketStatus::Open));
        assert!(reopened.closed_at.is_none());
        assert!(reopened.elapsed_days.is_none());
    }

    #[test]
    fn close_without_closed_at_leaves_metric_for_backfill() {
        let closed = apply_patch(&created_ticket(), status_patch("closed", None), now()).unwrap();
        assert!(closed.status.is_terminal());
        assert!(closed.closed_at.is_none());
        assert!(closed.elapsed_days.is_none());

        let backfilled = apply_patch(
            &closed,
            WorkItemPatch {
                closed_at: Some("2024-03-04T00:00:00Z".into()),
                ..WorkItemPatch::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(backfilled.elapsed_days, Some(3.0));
    }

    #[test]
    fn closed_before_raised_clamps_to_zero() {
        let closed = apply_patch(
            &created_ticket(),
            status_patch("resolved", Some("2024-02-01T00:00:00Z")),
            now(),
        )
        .unwrap();
        assert_eq!(closed.elapsed_days, Some(0.0));
    }

    #[test]
    fn any_to_any_within_kind_is_allowed() {
        let item = created_ticket();
        for from in WorkItemKind::Ticket.statuses() {
            let start = apply_patch(&item, status_patch(from, None), now()).unwrap();
            for to in WorkItemKind::Ticket.statuses() {
                assert!(
                    apply_patch(&start, status_patch(to, None), now()).is_ok(),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn resolved_to_closed_keeps_closing_instant() {
        let resolved = apply_patch(
            &created_ticket(),
            status_patch("resolved", Some("2024-03-02T00:00:00Z")),
            now(),
        )
        .unwrap();
        let closed = apply_patch(&resolved, status_patch("closed", None), now()).unwrap();
        assert_eq!(closed.closed_at, resolved.closed_at);
        assert_eq!(closed.elapsed_days, Some(1.0));
    }

    #[test]
    fn open_to_in_progress_leaves_derived_fields() {
        let item = created_ticket();
        let moved = apply_patch(&item, status_patch("in_progress", None), now()).unwrap();
        assert_eq!(moved.closed_at, item.closed_at);
        assert_eq!(moved.elapsed_days, item.elapsed_days);
    }

    #[test]
    fn closed_at_on_non_terminal_update_is_rejected() {
        assert_matches!(
            apply_patch(
                &created_ticket(),
                status_patch("in_progress", Some("2024-03-02T00:00:00Z")),
                now()
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn unknown_status_in_patch_is_rejected() {
        assert_matches!(
            apply_patch(&created_ticket(), status_patch("completed", None), now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn same_update_twice_is_idempotent() {
        let closed = apply_patch(
            &created_ticket(),
            status_patch("closed", Some("2024-03-02T12:00:00Z")),
            now(),
        )
        .unwrap();
        let patch = WorkItemPatch {
            assignee: Some("dana".into()),
            ..WorkItemPatch::default()
        };
        let once = apply_patch(&closed, patch.clone(), now()).unwrap();
        let twice = apply_patch(&once, patch, now()).unwrap();
        assert_eq!(once.elapsed_days, Some(1.5));
        assert_eq!(once.elapsed_days, twice.elapsed_days);
        assert_eq!(once.closed_at, twice.closed_at);
        assert_eq!(once, twice);
    }

    #[test]
    fn changing_raised_at_recomputes_metric() {
        let closed = apply_patch(
            &created_ticket(),
            status_patch("closed", Some("2024-03-03T00:00:00Z")),
            now(),
        )
        .unwrap();
        let moved = apply_patch(
            &closed,
            WorkItemPatch {
                raised_at: Some("2024-03-02T00:00:00Z".into()),
                ..WorkItemPatch::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(moved.elapsed_days, Some(1.0));
    }

    #[test]
    fn patch_never_touches_identity_fields() {
        let item = created_ticket();
        let later = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let updated = apply_patch(&item, status_patch("closed", None), later).unwrap();
        assert_eq!(updated.id, item.id);
        assert_eq!(updated.display_number, item.display_number);
        assert_eq!(updated.created_at, item.created_at);
        assert_eq!(updated.updated_at, later);
    }

    // -- projects ------------------------------------------------------------

    #[test]
    fn project_close_uses_ceiling_gap_days() {
        let project = plan_create(
            WorkItemKind::Project,
            CreateWorkItem {
                name: Some("Migration".into()),
                raised_at: Some("2024-01-01T00:00".into()),
                ..CreateWorkItem::default()
            },
            &FixedClock(now()),
        )
        .unwrap()
        .into_work_item(7);

        let closed =
            apply_patch(&project, status_patch("closed", Some("2024-01-02T01:00")), now()).unwrap();
        assert_eq!(closed.status, Status::Project(ProjectStatus::Closed));
        assert_eq!(closed.gap_days, Some(2));
        assert!(closed.elapsed_days.is_none());
    }

    #[test]
    fn project_gap_never_stored_negative() {
        let m = derive_metrics(
            WorkItemKind::Project,
            &Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            Some(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        );
        assert_eq!(m.gap_days, Some(0));
    }

    #[test]
    fn cross_kind_transition_is_rejected() {
        assert_matches!(
            validate_transition(
                Status::Ticket(TicketStatus::Open),
                Status::Task(TaskStatus::Pending)
            ),
            Err(CoreError::Validation(_))
        );
    }
}
