use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cache configuration error: {0}")]
    CacheConfig(String),

    #[error("Failed to derive cache key: {0}")]
    CacheKey(#[from] core_content::ContentError),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
