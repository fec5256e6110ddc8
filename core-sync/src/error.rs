use core_content::{ContentError, ItemKind, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse category of a per-item failure, deciding whether it is retried and
/// how it is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The item already exists remotely. Skipped, never retried.
    Duplicate,
    /// Connection failure, timeout, 5xx, 408 or 429. Retried.
    TransientNetwork,
    /// The store rejected the payload (400/422) or it could not be encoded.
    Validation,
    Unknown,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Duplicate => "duplicate",
            ErrorClass::TransientNetwork => "transient_network",
            ErrorClass::Validation => "validation",
            ErrorClass::Unknown => "unknown",
        }
    }

    /// Class of an HTTP status returned by the remote store
    pub fn from_status(status: u16) -> Self {
        match status {
            409 => ErrorClass::Duplicate,
            408 | 429 | 500..=599 => ErrorClass::TransientNetwork,
            400 | 422 => ErrorClass::Validation,
            _ => ErrorClass::Unknown,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors the retry executor knows how to judge
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// An operation was abandoned because its cancellation token fired
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode {kind}: {message}")]
    Encoding { kind: ItemKind, message: String },

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Sync cancelled")]
    Cancelled,
}

impl SyncError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SyncError::Store(StoreError::Status { status, .. }) => ErrorClass::from_status(*status),
            SyncError::Store(StoreError::Network(e)) if e.is_transient() => {
                ErrorClass::TransientNetwork
            }
            SyncError::Store(StoreError::Encode(_)) => ErrorClass::Validation,
            // The write may have landed before the body was garbled
            SyncError::Store(StoreError::Decode(_)) => ErrorClass::Unknown,
            SyncError::Store(_) => ErrorClass::Unknown,
            SyncError::Encoding { .. } => ErrorClass::Validation,
            SyncError::Content(ContentError::Serialization(_)) => ErrorClass::Validation,
            SyncError::Content(ContentError::InvalidInput { .. }) => ErrorClass::Validation,
            SyncError::Content(ContentError::Io(_)) => ErrorClass::Unknown,
            SyncError::Cancelled => ErrorClass::Unknown,
        }
    }
}

impl From<Cancelled> for SyncError {
    fn from(_: Cancelled) -> Self {
        SyncError::Cancelled
    }
}

impl Retryable for SyncError {
    fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::TransientNetwork
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
