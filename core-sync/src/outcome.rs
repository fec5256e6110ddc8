//! Per-item results and progress reports of a sync run

use core_content::ItemKind;
use core_runtime::events::{ItemStatus, SyncEvent};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorClass, SyncError};

/// Reason recorded for items skipped because they already exist remotely
pub const DUPLICATE_REASON: &str = "duplicate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success { remote_id: String },
    Failure { class: ErrorClass, message: String },
}

/// Result of one item of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub kind: ItemKind,
    pub label: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl SyncOutcome {
    pub fn success(kind: ItemKind, label: impl Into<String>, remote_id: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            status: OutcomeStatus::Success {
                remote_id: remote_id.into(),
            },
        }
    }

    pub fn duplicate(kind: ItemKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            status: OutcomeStatus::Failure {
                class: ErrorClass::Duplicate,
                message: DUPLICATE_REASON.to_string(),
            },
        }
    }

    pub fn failure(kind: ItemKind, label: impl Into<String>, error: &SyncError) -> Self {
        Self {
            kind,
            label: label.into(),
            status: OutcomeStatus::Failure {
                class: error.class(),
                message: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::Failure {
                class: ErrorClass::Duplicate,
                ..
            }
        )
    }

    pub fn error_class(&self) -> Option<ErrorClass> {
        match &self.status {
            OutcomeStatus::Success { .. } => None,
            OutcomeStatus::Failure { class, .. } => Some(*class),
        }
    }

    pub fn remote_id(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Success { remote_id } => Some(remote_id),
            OutcomeStatus::Failure { .. } => None,
        }
    }

    /// Status as reported on the event bus
    pub fn item_status(&self) -> ItemStatus {
        if self.is_success() {
            ItemStatus::Uploaded
        } else if self.is_duplicate() {
            ItemStatus::Duplicate
        } else {
            ItemStatus::Failed
        }
    }
}

/// Progress callback payload
///
/// Emitted before each item with `completed` equal to the item's index, and
/// once more after the last item with `completed == total` and an empty label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub current_label: String,
}

impl ProgressEvent {
    pub fn new(completed: usize, total: usize, current_label: impl Into<String>) -> Self {
        Self {
            completed,
            total,
            current_label: current_label.into(),
        }
    }

    pub fn is_final(&self) -> bool {
        self.completed == self.total
    }

    pub fn percent(&self) -> u8 {
        SyncEvent::percent(self.completed as u64, self.total as u64)
    }
}

/// Aggregate of a run's outcomes for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total: usize,
    pub succeeded: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// `label: message` for every failure other than a duplicate skip
    pub errors: Vec<String>,
}

impl SyncSummary {
    pub fn from_outcomes(outcomes: &[SyncOutcome]) -> Self {
        let mut summary = SyncSummary {
            total: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match &outcome.status {
                OutcomeStatus::Success { .. } => summary.succeeded += 1,
                OutcomeStatus::Failure {
                    class: ErrorClass::Duplicate,
                    ..
                } => summary.duplicates += 1,
                OutcomeStatus::Failure { message, .. } => {
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", outcome.label, message));
                }
            }
        }

        summary
    }

    /// Items that did not end up newly uploaded, duplicates included
    pub fn not_synced(&self) -> usize {
        self.duplicates + self.failed
    }

    /// User-facing message. Items that were not synced are presented as most
    /// likely already present remotely; literal errors follow for diagnostics.
    pub fn message(&self) -> String {
        if self.total == 0 {
            return "Nothing to sync.".to_string();
        }

        let mut message = format!(
            "Synced {} of {} item{}.",
            self.succeeded,
            self.total,
            if self.total == 1 { "" } else { "s" }
        );

        let skipped = self.not_synced();
        if skipped > 0 {
            message.push_str(&format!(
                " {} item{} {} skipped, most likely because {} already in your account.",
                skipped,
                if skipped == 1 { "" } else { "s" },
                if skipped == 1 { "was" } else { "were" },
                if skipped == 1 { "it is" } else { "they are" },
            ));
        }

        if !self.errors.is_empty() {
            message.push_str("\nDetails:");
            for error in &self.errors {
                message.push_str("\n- ");
                message.push_str(error);
            }
        }

        message
    }
}
