//! Core service façade.
//!
//! Wires a validated [`CoreConfig`] into the pieces a host application uses:
//! the remote store client, the sync orchestrator, the event bus and the
//! content generator cache. Desktop hosts enable the `desktop-shims` feature
//! so the reqwest client is injected by default; other hosts pass their own
//! `HttpClient` through the config builder.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .remote_base_url("https://study.example.com")
//!     .history_path(history_file)
//!     .build()?;
//! let core = CoreService::new(config)?;
//!
//! let outcomes = core.sync_history_file(|p| println!("{}%", p.percent())).await?;
//! println!("{}", SyncSummary::from_outcomes(&outcomes).message());
//! ```

pub mod error;

pub use error::{CoreError, Result};

pub use core_runtime::config::{CoreConfig, CoreConfigBuilder, FeatureFlags};
pub use core_sync::{ProgressEvent, SyncConfig, SyncOutcome, SyncSummary};

use core_content::{HttpRemoteStore, LocalHistory, LocalItem, QuestionBank, RemoteStore};
use core_generator::{CachedGenerator, ContentGenerator, LruResultCache};
use core_runtime::events::{CoreEvent, EventBus};
use core_sync::{DuplicateClassifier, RemoteItemUploader, SyncOrchestrator};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tracing::{info, instrument};

const EVENT_BUS_CAPACITY: usize = 256;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    store: Arc<dyn RemoteStore>,
    orchestrator: Arc<SyncOrchestrator>,
    event_bus: EventBus,
}

impl CoreService {
    /// Create a service talking to the remote store over the configured
    /// `HttpClient`.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let mut store = HttpRemoteStore::new(config.http_client.clone(), &config.remote_base_url)
            .with_request_timeout(config.request_timeout);
        if let Some(token) = &config.api_token {
            store = store.with_api_token(token.clone());
        }

        Self::with_store(config, Arc::new(store))
    }

    /// Create a service over an explicit remote store, such as
    /// `InMemoryRemoteStore` for offline use.
    pub fn with_store(config: CoreConfig, store: Arc<dyn RemoteStore>) -> Result<Self> {
        Self::with_sync_config(config, store, SyncConfig::default())
    }

    /// Like [`with_store`](Self::with_store) with custom retry policies
    pub fn with_sync_config(
        config: CoreConfig,
        store: Arc<dyn RemoteStore>,
        sync_config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
        let classifier = DuplicateClassifier::new(store.clone());
        let uploader = RemoteItemUploader::new(store.clone(), config.clock.clone());

        let mut orchestrator =
            SyncOrchestrator::new(Arc::new(classifier), Arc::new(uploader), sync_config);
        if config.features.publish_sync_events {
            orchestrator = orchestrator.with_event_bus(event_bus.clone());
        }

        info!(remote = %config.remote_base_url, "Core service initialized");

        Ok(Self {
            config: Arc::new(config),
            store,
            orchestrator: Arc::new(orchestrator),
            event_bus,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn remote_store(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.store)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Receive sync and generator events published from now on
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Push `history` and `question_banks` to the remote store.
    ///
    /// Never fails as a whole; each item reports its own outcome.
    pub async fn sync_all<F>(
        &self,
        history: &[LocalItem],
        question_banks: &[QuestionBank],
        on_progress: F,
    ) -> Vec<SyncOutcome>
    where
        F: FnMut(&ProgressEvent),
    {
        self.orchestrator
            .sync_all(history, question_banks, on_progress)
            .await
    }

    /// Read the configured local history file
    pub async fn load_history(&self) -> Result<LocalHistory> {
        let path = self
            .config
            .history_path
            .as_ref()
            .ok_or(CoreError::HistoryNotConfigured)?;

        LocalHistory::load(path)
            .await
            .map_err(|source| CoreError::History {
                path: path.clone(),
                source,
            })
    }

    /// Sync everything in the configured local history file.
    ///
    /// The file itself is left untouched.
    #[instrument(skip_all)]
    pub async fn sync_history_file<F>(&self, on_progress: F) -> Result<Vec<SyncOutcome>>
    where
        F: FnMut(&ProgressEvent),
    {
        let history = self.load_history().await?;
        Ok(self
            .sync_all(&history.entries, &history.question_banks, on_progress)
            .await)
    }

    /// Wrap `generator` in the result cache when caching is enabled.
    pub fn content_generator(
        &self,
        generator: Arc<dyn ContentGenerator>,
    ) -> Result<Arc<dyn ContentGenerator>> {
        if !self.config.features.cache_generated_content {
            return Ok(generator);
        }

        let cache = LruResultCache::new(self.config.generator_cache_capacity)?;
        let cached = CachedGenerator::new(generator, Arc::new(cache))
            .with_event_bus(self.event_bus.clone());
        Ok(Arc::new(cached))
    }
}
