//! # Content Generator Cache
//!
//! Study material (summaries, quizzes, interview questions and feedback) is
//! produced by an external AI provider that this workspace treats as a black
//! box behind [`ContentGenerator`]. Calls are slow and billed, so identical
//! requests are answered from a bounded cache:
//!
//! ```ignore
//! use core_generator::{CachedGenerator, LruResultCache};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(LruResultCache::new(128)?);
//! let generator = CachedGenerator::new(Arc::new(provider), cache);
//!
//! let first = generator.generate(&request).await?;  // calls the provider
//! let second = generator.generate(&request).await?; // served from cache
//! ```
//!
//! Cache keys are content fingerprints of the provider name and the full
//! request, so any change to prompt, input or parameters is a different entry.

pub mod cache;
pub mod error;
pub mod generator;

pub use cache::{CacheStats, CachedGenerator, LruResultCache, ResultCache};
pub use error::{GeneratorError, Result};
pub use generator::{cache_key, ContentGenerator, GeneratedContent, GenerationKind, GenerationRequest};
