pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod report;

use std::sync::Arc;
use audit::AuditInvoker;
use config::Config;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub invoker: Arc<AuditInvoker>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let invoker = AuditInvoker::from_config(&config);
        Self {
            config: Arc::new(config),
            invoker: Arc::new(invoker),
        }
    }
}
