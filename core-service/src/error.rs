use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("No local history file configured")]
    HistoryNotConfigured,

    #[error("Failed to read local history at {path}: {source}")]
    History {
        path: PathBuf,
        #[source]
        source: core_content::ContentError,
    },

    #[error("Content error: {0}")]
    Content(#[from] core_content::ContentError),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),

    #[error("Generator error: {0}")]
    Generator(#[from] core_generator::GeneratorError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
