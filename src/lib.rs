pub mod api;
pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod logging;
pub mod store;
pub mod summary;
pub mod text;

use std::sync::Arc;
use api::middleware::RateLimit;
use config::Config;
use llm::GenerationProvider;
use store::CaptureStore;
use summary::Summarizer;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn CaptureStore>,
    pub summarizer: Arc<Summarizer>,
    pub rate_limit: RateLimit,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn CaptureStore>,
        provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        let rate_limit = RateLimit::new(config.rate_limit_max, config.rate_limit_window);
        Self {
            config: Arc::new(config),
            store,
            summarizer: Arc::new(Summarizer::new(provider)),
            rate_limit,
        }
    }
}
