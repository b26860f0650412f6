//! Shared application state.

use std::sync::Arc;

use scrubber_analyze::{Analyzer, Anonymizer, RecognizerRegistry};
use scrubber_core::ScrubberConfig;
use scrubber_store::{Cache, RecognizerStore, TemplateStore};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ScrubberConfig,
    pub recognizers: Arc<RecognizerStore>,
    pub templates: TemplateStore,
    pub analyzer: Arc<Analyzer>,
    pub anonymizer: Anonymizer,
}

impl AppState {
    /// Wire stores and ports over one cache backend.
    pub fn new(config: ScrubberConfig, cache: Arc<dyn Cache>) -> Self {
        let recognizers = Arc::new(RecognizerStore::new(cache.clone()));
        let registry = Arc::new(RecognizerRegistry::with_store(recognizers.clone()));
        let analyzer = Arc::new(Analyzer::new(registry, config.min_score));

        Self {
            templates: TemplateStore::new(cache),
            recognizers,
            analyzer,
            anonymizer: Anonymizer::new(),
            config,
        }
    }
}
