use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Failures talking to the remote store.
///
/// `Status` carries the store's answer verbatim; classifying it (duplicate,
/// transient, validation) is the sync engine's job.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote store responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] BridgeError),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
}

impl StoreError {
    /// HTTP status of the failure, if the store answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            StoreError::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Local failures: fingerprinting and the history file.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("History file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, ContentError>;
