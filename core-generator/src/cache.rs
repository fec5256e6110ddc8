//! Memoization of generated content
//!
//! [`ResultCache`] is the storage seam; [`LruResultCache`] keeps a bounded
//! number of entries and evicts the least recently used. [`CachedGenerator`]
//! wraps any [`ContentGenerator`] and consults the cache first. Failed
//! generations are never cached.

use async_trait::async_trait;
use core_runtime::events::{CoreEvent, EventBus, GenerationEvent};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{GeneratorError, Result};
use crate::generator::{cache_key, ContentGenerator, GeneratedContent, GenerationRequest};

/// Storage for generated results, keyed by [`cache_key`]
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<GeneratedContent>;

    async fn put(&self, key: String, content: GeneratedContent);

    async fn len(&self) -> usize;

    async fn clear(&self);
}

/// Bounded in-memory cache with least-recently-used eviction
pub struct LruResultCache {
    entries: RwLock<LruCache<String, GeneratedContent>>,
}

impl LruResultCache {
    /// Create a cache holding at most `capacity` results
    ///
    /// # Errors
    ///
    /// `GeneratorError::CacheConfig` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            GeneratorError::CacheConfig("capacity must be at least 1".to_string())
        })?;
        Ok(Self::with_capacity(capacity))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub async fn capacity(&self) -> usize {
        self.entries.read().await.cap().get()
    }
}

#[async_trait]
impl ResultCache for LruResultCache {
    async fn get(&self, key: &str) -> Option<GeneratedContent> {
        // get() refreshes recency, so it needs the write lock
        self.entries.write().await.get(key).cloned()
    }

    async fn put(&self, key: String, content: GeneratedContent) {
        let mut entries = self.entries.write().await;
        if let Some((evicted, _)) = entries.push(key.clone(), content) {
            if evicted != key {
                debug!(key = %evicted, "Evicted generated content");
            }
        }
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Hit and miss counters of a [`CachedGenerator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A [`ContentGenerator`] that answers repeated requests from a cache
pub struct CachedGenerator {
    inner: Arc<dyn ContentGenerator>,
    cache: Arc<dyn ResultCache>,
    event_bus: Option<EventBus>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedGenerator {
    pub fn new(inner: Arc<dyn ContentGenerator>, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            inner,
            cache,
            event_bus: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Publish `GenerationEvent`s for every hit and miss
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn publish(&self, event: GenerationEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine
            let _ = bus.emit(CoreEvent::Generation(event));
        }
    }
}

#[async_trait]
impl ContentGenerator for CachedGenerator {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    #[instrument(skip_all, fields(provider = %self.inner.provider(), kind = ?request.kind))]
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        request.validate()?;

        let provider = self.inner.provider().to_string();
        let key = cache_key(&provider, request)?;

        if let Some(content) = self.cache.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "Generated content cache hit");
            self.publish(GenerationEvent::CacheHit { provider, key });
            return Ok(content);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(%key, "Generated content cache miss");

        let content = self.inner.generate(request).await?;
        self.cache.put(key.clone(), content.clone()).await;
        self.publish(GenerationEvent::CacheMiss { provider, key });

        Ok(content)
    }
}
