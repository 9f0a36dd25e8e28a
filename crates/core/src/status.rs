//! Work-item kinds and their status enumerations.
//!
//! Each kind owns a closed set of statuses. [`Status`] is a tagged variant
//! per kind so a ticket status can never be stored on a task. The mapping
//! table ([`WorkItemKind::statuses`], [`WorkItemKind::terminal_statuses`],
//! [`WorkItemKind::initial_status`]) is the single place those sets live.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The four trackable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Ticket,
    Task,
    Milestone,
    Project,
}

/// Which derived duration a kind carries once it is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationMetric {
    /// Fractional days, two decimals, clamped at zero.
    ElapsedDays,
    /// Whole days, ceiling.
    GapDays,
}

pub const ALL_KINDS: &[WorkItemKind] = &[
    WorkItemKind::Ticket,
    WorkItemKind::Task,
    WorkItemKind::Milestone,
    WorkItemKind::Project,
];

impl WorkItemKind {
    /// Stored and logged name (`ticket`, `task`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Task => "task",
            Self::Milestone => "milestone",
            Self::Project => "project",
        }
    }

    /// Entity label used in not-found errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Ticket => "Ticket",
            Self::Task => "Task",
            Self::Milestone => "Milestone",
            Self::Project => "Project",
        }
    }

    /// Plural path segment the kind is served under (`tickets`, ...).
    pub fn collection(self) -> &'static str {
        match self {
            Self::Ticket => "tickets",
            Self::Task => "tasks",
            Self::Milestone => "milestones",
            Self::Project => "projects",
        }
    }

    /// Parse the stored name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        ALL_KINDS
            .iter()
            .copied()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown work item kind '{name}'")))
    }

    /// Parse a collection path segment.
    pub fn from_collection(segment: &str) -> Option<Self> {
        ALL_KINDS.iter().copied().find(|k| k.collection() == segment)
    }

    /// Every status string valid for this kind, in workflow order.
    pub fn statuses(self) -> &'static [&'static str] {
        match self {
            Self::Ticket => TicketStatus::ALL_NAMES,
            Self::Task => TaskStatus::ALL_NAMES,
            Self::Milestone => MilestoneStatus::ALL_NAMES,
            Self::Project => ProjectStatus::ALL_NAMES,
        }
    }

    /// The subset of [`statuses`](Self::statuses) that mark the item finished.
    pub fn terminal_statuses(self) -> &'static [&'static str] {
        match self {
            Self::Ticket => &["resolved", "closed"],
            Self::Task => &["completed"],
            Self::Milestone | Self::Project => &["closed"],
        }
    }

    /// Status assigned at creation when the caller does not pick one.
    pub fn initial_status(self) -> Status {
        match self {
            Self::Ticket => Status::Ticket(TicketStatus::Open),
            Self::Task => Status::Task(TaskStatus::Pending),
            Self::Milestone => Status::Milestone(MilestoneStatus::Open),
            Self::Project => Status::Project(ProjectStatus::Open),
        }
    }

    pub fn duration_metric(self) -> DurationMetric {
        match self {
            Self::Project => DurationMetric::GapDays,
            Self::Ticket | Self::Task | Self::Milestone => DurationMetric::ElapsedDays,
        }
    }

    /// Only tickets are given a display number.
    pub fn has_display_number(self) -> bool {
        matches!(self, Self::Ticket)
    }
}

impl fmt::Display for WorkItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Per-kind status enums
// ---------------------------------------------------------------------------

/// Declares a per-kind status enum with string conversions.
macro_rules! kind_status {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL_NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

kind_status!(
    /// Ticket workflow.
    TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
);

kind_status!(
    /// Task workflow.
    TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
);

kind_status!(
    /// Milestone workflow.
    MilestoneStatus {
        Open => "open",
        InProgress => "in_progress",
        Closed => "closed",
    }
);

kind_status!(
    /// Project workflow.
    ProjectStatus {
        Open => "open",
        InProgress => "in_progress",
        Closed => "closed",
    }
);

// ---------------------------------------------------------------------------
// Tagged status
// ---------------------------------------------------------------------------

/// A status value bound to the kind it belongs to.
///
/// Serializes as the bare status string; deserialization needs the kind, so
/// go through [`Status::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ticket(TicketStatus),
    Task(TaskStatus),
    Milestone(MilestoneStatus),
    Project(ProjectStatus),
}

impl Status {
    /// Parse `value` as a status of `kind`.
    ///
    /// Values outside the kind's enumeration are rejected, never coerced.
    pub fn parse(kind: WorkItemKind, value: &str) -> Result<Self, CoreError> {
        let parsed = match kind {
            WorkItemKind::Ticket => TicketStatus::from_name(value).map(Self::Ticket),
            WorkItemKind::Task => TaskStatus::from_name(value).map(Self::Task),
            WorkItemKind::Milestone => MilestoneStatus::from_name(value).map(Self::Milestone),
            WorkItemKind::Project => ProjectStatus::from_name(value).map(Self::Project),
        };
        parsed.ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid {kind} status '{value}'. Must be one of: {:?}",
                kind.statuses()
            ))
        })
    }

    pub fn kind(self) -> WorkItemKind {
        match self {
            Self::Ticket(_) => WorkItemKind::Ticket,
            Self::Task(_) => WorkItemKind::Task,
            Self::Milestone(_) => WorkItemKind::Milestone,
            Self::Project(_) => WorkItemKind::Project,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ticket(s) => s.as_str(),
            Self::Task(s) => s.as_str(),
            Self::Milestone(s) => s.as_str(),
            Self::Project(s) => s.as_str(),
        }
    }

    pub fn is_terminal(self) -> bool {
        self.kind().terminal_statuses().contains(&self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn every_listed_status_parses() {
        for kind in ALL_KINDS {
            for name in kind.statuses() {
                let status = Status::parse(*kind, name).unwrap();
                assert_eq!(status.as_str(), *name);
                assert_eq!(status.kind(), *kind);
            }
        }
    }

    #[test]
    fn terminal_statuses_are_subset_of_statuses() {
        for kind in ALL_KINDS {
            for t in kind.terminal_statuses() {
                assert!(kind.statuses().contains(t), "{kind}: {t}");
            }
        }
    }

    #[test]
    fn initial_status_is_not_terminal() {
        for kind in ALL_KINDS {
            assert!(!kind.initial_status().is_terminal(), "{kind}");
        }
    }

    #[test]
    fn status_from_another_kind_is_rejected() {
        assert_matches!(
            Status::parse(WorkItemKind::Task, "closed"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            Status::parse(WorkItemKind::Milestone, "resolved"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            Status::parse(WorkItemKind::Ticket, "pending"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn status_parsing_is_exact() {
        assert!(Status::parse(WorkItemKind::Ticket, "Open").is_err());
        assert!(Status::parse(WorkItemKind::Ticket, " open").is_err());
        assert!(Status::parse(WorkItemKind::Ticket, "").is_err());
    }

    #[test]
    fn ticket_resolved_and_closed_are_terminal() {
        assert!(Status::Ticket(TicketStatus::Resolved).is_terminal());
        assert!(Status::Ticket(TicketStatus::Closed).is_terminal());
        assert!(!Status::Ticket(TicketStatus::InProgress).is_terminal());
        assert!(Status::Task(TaskStatus::Completed).is_terminal());
        assert!(!Status::Milestone(MilestoneStatus::InProgress).is_terminal());
    }

    #[test]
    fn collection_round_trip() {
        for kind in ALL_KINDS {
            assert_eq!(WorkItemKind::from_collection(kind.collection()), Some(*kind));
            assert_eq!(WorkItemKind::from_name(kind.as_str()).unwrap(), *kind);
        }
        assert_eq!(WorkItemKind::from_collection("bugs"), None);
    }

    #[test]
    fn only_projects_use_gap_days() {
        assert_eq!(WorkItemKind::Project.duration_metric(), DurationMetric::GapDays);
        assert_eq!(WorkItemKind::Ticket.duration_metric(), DurationMetric::ElapsedDays);
    }

    #[test]
    fn status_serializes_as_plain_string() {
        let json = serde_json::to_value(Status::Task(TaskStatus::InProgress)).unwrap();
        assert_eq!(json, serde_json::json!("in_progress"));
    }
}
