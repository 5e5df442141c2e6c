//! Runs the `lighthouse` CLI against an already launched browser.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use super::{AuditEngine, AuditSettings};
use crate::error::{AppError, Result};

pub struct LighthouseCli {
    program: PathBuf,
}

impl LighthouseCli {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

#[async_trait]
impl AuditEngine for LighthouseCli {
    async fn run(&self, url: &str, port: u16, settings: &AuditSettings) -> Result<Value> {
        debug!(url, port, program = %self.program.display(), "running lighthouse");

        let output = Command::new(&self.program)
            .arg(url)
            .args(settings.cli_args(port))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AppError::AuditFailure(format!(
                    "failed to run {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("no output");
            return Err(AppError::AuditFailure(format!(
                "lighthouse exited with {}: {}",
                output.status,
                reason.trim()
            )));
        }

        parse_report(&output.stdout)
    }
}

/// Parses CLI stdout into a report, rejecting runs where the page never loaded.
pub fn parse_report(stdout: &[u8]) -> Result<Value> {
    let report: Value = serde_json::from_slice(stdout)
        .map_err(|e| AppError::AuditFailure(format!("unreadable lighthouse report: {e}")))?;
    check_runtime_error(&report)?;
    Ok(report)
}

/// Lighthouse still emits a report when the target fails to load, flagged with `runtimeError`.
pub fn check_runtime_error(report: &Value) -> Result<()> {
    let Some(runtime_error) = report.get("runtimeError") else {
        return Ok(());
    };

    match runtime_error.get("code").and_then(Value::as_str) {
        Some(code) => {
            let message = runtime_error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("page could not be audited");
            Err(AppError::AuditFailure(format!("{code}: {message}")))
        }
        None => Ok(()),
    }
}
