use std::sync::Arc;

use crate::config::Settings;
use crate::services::GenerationBackend;

// ---------- App with immutable settings and the upstream backend ----------

#[derive(Clone)]
pub struct App {
    pub settings: Arc<Settings>,
    pub backend: Arc<dyn GenerationBackend>,
}

impl App {
    pub fn new(settings: Settings, backend: impl GenerationBackend + 'static) -> Self {
        Self {
            settings: Arc::new(settings),
            backend: Arc::new(backend),
        }
    }
}
