//! Headless Chrome launcher built on chromiumoxide.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::{BrowserInstance, BrowserLauncher};
use crate::error::{AppError, Result};

pub const CHROME_FLAGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--no-first-run",
    "--no-default-browser-check",
];

const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }

    fn resolve_executable(&self) -> Result<PathBuf> {
        if let Some(path) = &self.chrome_path {
            return Ok(path.clone());
        }

        CHROME_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| {
                AppError::AuditFailure(
                    "Chrome not found on PATH; set CHROME_PATH to the browser executable"
                        .to_string(),
                )
            })
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>> {
        let executable = self.resolve_executable()?;
        let profile = tempfile::Builder::new()
            .prefix("lighthouse-chrome-")
            .tempdir()
            .map_err(|e| {
                AppError::AuditFailure(format!("failed to create Chrome profile dir: {e}"))
            })?;

        // Port 0: Chrome picks its own DevTools port and reports it on startup
        let config = BrowserConfig::builder()
            .chrome_executable(&executable)
            .user_data_dir(profile.path())
            .port(0)
            .args(CHROME_FLAGS.iter().copied())
            .build()
            .map_err(|e| AppError::AuditFailure(format!("invalid browser config: {e}")))?;

        let (mut browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            AppError::AuditFailure(format!(
                "failed to launch Chrome at {}: {e}",
                executable.display()
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "DevTools handler event failed");
                }
            }
        });

        let port = match devtools_port(browser.websocket_address()) {
            Ok(port) => port,
            Err(e) => {
                let _ = browser.kill().await;
                handler.abort();
                return Err(e);
            }
        };

        info!(port, executable = %executable.display(), "Chrome ready");
        Ok(Box::new(ChromeInstance {
            browser,
            handler,
            port,
            _profile: profile,
        }))
    }
}

pub struct ChromeInstance {
    browser: Browser,
    handler: JoinHandle<()>,
    port: u16,
    // Removed when the instance is dropped, after the process is gone
    _profile: TempDir,
}

#[async_trait]
impl BrowserInstance for ChromeInstance {
    fn port(&self) -> u16 {
        self.port
    }

    async fn kill(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let killed = this.browser.kill().await;
        this.handler.abort();

        match killed {
            Some(Err(e)) => Err(AppError::AuditFailure(format!("failed to kill Chrome: {e}"))),
            Some(Ok(())) => {
                debug!(port = this.port, "Chrome terminated");
                Ok(())
            }
            None => {
                warn!(port = this.port, "Chrome had no child process to kill");
                Ok(())
            }
        }
    }
}

/// Port of the announced DevTools websocket, e.g. `ws://127.0.0.1:9222/devtools/browser/<id>`.
fn devtools_port(websocket_address: &str) -> Result<u16> {
    Url::parse(websocket_address)
        .ok()
        .and_then(|url| url.port())
        .ok_or_else(|| {
            AppError::AuditFailure(format!(
                "Chrome reported an unusable DevTools address: {websocket_address:?}"
            ))
        })
}
