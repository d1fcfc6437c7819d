use std::sync::Arc;

use crate::agents::GuidanceGenerator;
use crate::fetch::RoyaleClient;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn GuidanceGenerator>,
    /// `None` when no game-data API token is configured
    pub royale: Option<Arc<RoyaleClient>>,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(generator: Arc<dyn GuidanceGenerator>, royale: Option<RoyaleClient>) -> Self {
        Self {
            generator,
            royale: royale.map(Arc::new),
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}
