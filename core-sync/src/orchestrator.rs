//! # Sync Orchestrator
//!
//! Pushes a batch of local items to the remote store, one item at a time.
//!
//! ## Workflow
//!
//! 1. Flatten the batch: documents, then interviews, then question banks,
//!    each group in input order
//! 2. For every item: report progress, ask the classifier whether it already
//!    exists remotely, and upload it through its kind's retry policy if not
//! 3. Report final progress and return one outcome per item, in batch order
//!
//! Per item the states are
//!
//! ```text
//! Pending -> Classifying -> Duplicate
//!                        -> Uploading -> Succeeded | Failed
//! ```
//!
//! A failing item never stops the batch. Items are processed strictly one
//! after another, so two copies of the same item in one batch can never both
//! be written.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let orchestrator = SyncOrchestrator::new(classifier, uploader, SyncConfig::default());
//! let outcomes = orchestrator
//!     .sync_all(&history.entries, &history.question_banks, |p| {
//!         println!("{}/{} {}", p.completed, p.total, p.current_label)
//!     })
//!     .await;
//! ```

use core_content::{ItemKind, LocalItem, QuestionBank};
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::classifier::DuplicateCheck;
use crate::config::SyncConfig;
use crate::outcome::{ProgressEvent, SyncOutcome, SyncSummary};
use crate::retry::RetryExecutor;
use crate::uploader::ItemUpload;

/// Lifecycle of a single item within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Classifying,
    Duplicate,
    Uploading,
    Succeeded,
    Failed,
}

impl ItemState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemState::Duplicate | ItemState::Succeeded | ItemState::Failed
        )
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemState::Pending => "pending",
            ItemState::Classifying => "classifying",
            ItemState::Duplicate => "duplicate",
            ItemState::Uploading => "uploading",
            ItemState::Succeeded => "succeeded",
            ItemState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Order a batch for syncing: documents, interviews, then question banks.
///
/// Question banks found in `history` come before those in `question_banks`.
pub fn flatten(history: &[LocalItem], question_banks: &[QuestionBank]) -> Vec<LocalItem> {
    let of_kind = |kind: ItemKind| {
        history
            .iter()
            .filter(move |item| item.kind() == kind)
            .cloned()
    };

    of_kind(ItemKind::Document)
        .chain(of_kind(ItemKind::Interview))
        .chain(of_kind(ItemKind::QuestionBank))
        .chain(question_banks.iter().cloned().map(LocalItem::QuestionBank))
        .collect()
}

/// Runs sync batches against a classifier and an uploader
pub struct SyncOrchestrator {
    classifier: Arc<dyn DuplicateCheck>,
    uploader: Arc<dyn ItemUpload>,
    config: SyncConfig,
    event_bus: Option<EventBus>,
}

impl SyncOrchestrator {
    pub fn new(
        classifier: Arc<dyn DuplicateCheck>,
        uploader: Arc<dyn ItemUpload>,
        config: SyncConfig,
    ) -> Self {
        Self {
            classifier,
            uploader,
            config,
            event_bus: None,
        }
    }

    /// Also publish `SyncEvent`s for every run
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Sync every item of `history` and every bank of `question_banks`.
    ///
    /// `on_progress` is called synchronously before each item and once after
    /// the last one. An empty batch returns no outcomes and reports nothing.
    #[instrument(skip_all, fields(items = history.len(), banks = question_banks.len()))]
    pub async fn sync_all<F>(
        &self,
        history: &[LocalItem],
        question_banks: &[QuestionBank],
        on_progress: F,
    ) -> Vec<SyncOutcome>
    where
        F: FnMut(&ProgressEvent),
    {
        let items = flatten(history, question_banks);
        self.sync_items(&items, on_progress).await
    }

    /// Sync an already ordered batch
    pub async fn sync_items<F>(&self, items: &[LocalItem], mut on_progress: F) -> Vec<SyncOutcome>
    where
        F: FnMut(&ProgressEvent),
    {
        let total = items.len();
        if total == 0 {
            debug!("Nothing to sync");
            return Vec::new();
        }

        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        info!(%run_id, total, "Starting sync run");
        self.publish(SyncEvent::Started {
            run_id: run_id.clone(),
            total: total as u64,
        });

        let mut outcomes = Vec::with_capacity(total);
        for (index, item) in items.iter().enumerate() {
            let label = item.label();
            let progress = ProgressEvent::new(index, total, label.clone());
            on_progress(&progress);
            self.publish_progress(&run_id, &progress);

            let outcome = self.sync_item(item, label).await;

            self.publish(SyncEvent::ItemCompleted {
                run_id: run_id.clone(),
                index: index as u64,
                label: outcome.label.clone(),
                status: outcome.item_status(),
            });
            outcomes.push(outcome);
        }

        let done = ProgressEvent::new(total, total, "");
        on_progress(&done);
        self.publish_progress(&run_id, &done);

        let summary = SyncSummary::from_outcomes(&outcomes);
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            %run_id,
            succeeded = summary.succeeded,
            duplicates = summary.duplicates,
            failed = summary.failed,
            duration_ms,
            "Sync run finished"
        );
        self.publish(SyncEvent::Completed {
            run_id,
            succeeded: summary.succeeded as u64,
            duplicates: summary.duplicates as u64,
            failed: summary.failed as u64,
            duration_ms,
        });

        outcomes
    }

    #[instrument(skip(self, item), fields(kind = %item.kind()))]
    async fn sync_item(&self, item: &LocalItem, label: String) -> SyncOutcome {
        let kind = item.kind();
        debug!(state = %ItemState::Classifying);

        match self.classifier.is_duplicate(item).await {
            Ok(true) => {
                debug!(state = %ItemState::Duplicate, "Already present remotely");
                return SyncOutcome::duplicate(kind, label);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(state = %ItemState::Failed, error = %e, "Duplicate check failed");
                return SyncOutcome::failure(kind, label, &e);
            }
        }

        debug!(state = %ItemState::Uploading);
        let executor = RetryExecutor::new(self.config.policy_for(kind).clone());
        let uploader = &self.uploader;
        match executor.run(move || uploader.upload(item)).await {
            Ok(record) => {
                debug!(state = %ItemState::Succeeded, remote_id = %record.id);
                SyncOutcome::success(kind, label, record.id)
            }
            Err(e) => {
                warn!(state = %ItemState::Failed, class = %e.class(), error = %e, "Upload failed");
                SyncOutcome::failure(kind, label, &e)
            }
        }
    }

    fn publish_progress(&self, run_id: &str, progress: &ProgressEvent) {
        self.publish(SyncEvent::Progress {
            run_id: run_id.to_string(),
            completed: progress.completed as u64,
            total: progress.total as u64,
            current_label: progress.current_label.clone(),
            percent: progress.percent(),
        });
    }

    fn publish(&self, event: SyncEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine
            let _ = bus.emit(CoreEvent::Sync(event));
        }
    }
}
