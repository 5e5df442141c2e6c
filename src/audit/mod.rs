//! Audit invocation: one disposable browser per audit.
//!
//! The browser and the auditing tool sit behind narrow traits so the
//! invoker can be driven by fakes in tests.

pub mod chrome;
pub mod lighthouse;
pub mod settings;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};

pub use chrome::ChromeLauncher;
pub use lighthouse::LighthouseCli;
pub use settings::AuditSettings;

/// Starts browser processes.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>>;
}

/// A running browser reachable over the DevTools protocol.
#[async_trait]
pub trait BrowserInstance: Send + Sync {
    /// DevTools port the audit engine connects to.
    fn port(&self) -> u16;
    /// Terminates the browser. Consumes the instance so it can only run once.
    async fn kill(self: Box<Self>) -> Result<()>;
}

/// Produces a raw audit report for a URL using an already running browser.
#[async_trait]
pub trait AuditEngine: Send + Sync {
    async fn run(&self, url: &str, port: u16, settings: &AuditSettings) -> Result<Value>;
}

pub struct AuditInvoker {
    launcher: Arc<dyn BrowserLauncher>,
    engine: Arc<dyn AuditEngine>,
    settings: AuditSettings,
    timeout: Duration,
}

impl AuditInvoker {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        engine: Arc<dyn AuditEngine>,
        settings: AuditSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            launcher,
            engine,
            settings,
            timeout,
        }
    }

    /// Chrome + Lighthouse CLI wired from the service configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ChromeLauncher::new(config.chrome_path.clone())),
            Arc::new(LighthouseCli::new(config.lighthouse_path.clone())),
            AuditSettings::default(),
            config.audit_timeout,
        )
    }

    /// Launches a browser, audits `url` and kills the browser again.
    ///
    /// The browser is released on success, on engine errors, on timeout and
    /// when the engine panics. A panic becomes an `AuditFailure`.
    pub async fn run_audit(&self, url: &str) -> Result<Value> {
        let browser = self.launcher.launch().await?;
        let port = browser.port();
        debug!(port, "browser launched");

        let start = Instant::now();
        let audit = AssertUnwindSafe(self.engine.run(url, port, &self.settings))
            .catch_unwind()
            .map(|caught| caught.unwrap_or_else(|panic| Err(panic_failure(panic))));
        let outcome = tokio::time::timeout(self.timeout, audit).await;

        if let Err(e) = browser.kill().await {
            warn!(port, error = %e, "failed to terminate browser");
        }

        match outcome {
            Ok(Ok(report)) => {
                info!(url, elapsed = ?start.elapsed(), "audit finished");
                Ok(report)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::AuditFailure(format!(
                "audit timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn panic_failure(panic: Box<dyn Any + Send>) -> AppError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    AppError::AuditFailure(format!("audit engine panicked: {message}"))
}
