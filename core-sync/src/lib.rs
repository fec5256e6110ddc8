//! # Sync Engine
//!
//! Pushes the local study history to the remote store without creating
//! duplicates.
//!
//! ## Components
//!
//! - **Duplicate Classifier** (`classifier`): asks the remote store whether an
//!   item already exists, by content fingerprint for documents
//! - **Item Uploader** (`uploader`): maps local items to request bodies and
//!   issues exactly one write per call
//! - **Retry Executor** (`retry`): exponential backoff with jitter for
//!   transient failures
//! - **Sync Orchestrator** (`orchestrator`): runs a batch sequentially,
//!   reporting progress and collecting one outcome per item
//! - **Outcomes** (`outcome`): per-item results and the run summary shown to
//!   users
//!
//! ## Error Classes
//!
//! Every per-item failure carries an [`ErrorClass`]. Only
//! `TransientNetwork` is retried; a 409 from the store is treated like a
//! duplicate found during classification.

pub mod classifier;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod retry;
pub mod uploader;

pub use classifier::{DuplicateCheck, DuplicateClassifier};
pub use config::SyncConfig;
pub use error::{Cancelled, ErrorClass, Result, Retryable, SyncError};
pub use orchestrator::{flatten, ItemState, SyncOrchestrator};
pub use outcome::{OutcomeStatus, ProgressEvent, SyncOutcome, SyncSummary, DUPLICATE_REASON};
pub use retry::{RetryExecutor, RetryPolicy};
pub use uploader::{ItemUpload, RemoteItemUploader};
