//! Packet capture engine backed by the `tshark` tool.
//!
//! Spawns `tshark -i <interface> -a duration:<secs>` and collects its
//! one-line packet summaries. The capture is finite (bounded by the
//! duration) and not restartable; protocol decoding stays inside tshark.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::CaptureEngine;

/// Extra time allowed for tshark to flush and exit after the capture
/// window closes
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Capture engine using the tshark subprocess
pub struct TsharkEngine {
    /// Path to the tshark binary (default: "tshark")
    binary_path: String,
}

impl Default for TsharkEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TsharkEngine {
    /// Create an engine with the default binary path
    pub fn new() -> Self {
        Self {
            binary_path: "tshark".to_string(),
        }
    }

    /// Create an engine with a custom binary path
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl CaptureEngine for TsharkEngine {
    fn name(&self) -> &str {
        "tshark"
    }

    async fn capture(&self, interface: &str, duration: Duration) -> Result<Vec<String>> {
        let duration_arg = format!("duration:{}", duration.as_secs().max(1));

        let child = Command::new(&self.binary_path)
            .args(["-i", interface, "-a", &duration_arg, "-l"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to spawn {} on interface '{}'",
                    self.binary_path, interface
                )
            })?;

        // tshark stops itself via the autostop condition; the outer
        // timeout only guards against a hung capture process.
        let output = timeout(duration + SHUTDOWN_GRACE, child.wait_with_output())
            .await
            .with_context(|| {
                format!(
                    "Capture on '{}' did not stop within {:?} after its window",
                    interface, SHUTDOWN_GRACE
                )
            })?
            .with_context(|| format!("Failed to wait for capture on '{}'", interface))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "tshark failed on interface '{}' with exit code {}: {}",
                interface,
                exit_code,
                stderr.trim()
            );
        }

        let stdout =
            String::from_utf8(output.stdout).context("tshark output is not valid UTF-8")?;

        Ok(stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("-v")
            .output()
            .await
            .with_context(|| format!("{} not found in PATH", self.binary_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tshark health check failed: {}", stderr.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_engine_creation() {
        let engine = TsharkEngine::new();
        assert_eq!(engine.name(), "tshark");
        assert_eq!(engine.binary_path, "tshark");
    }

    #[tokio::test]
    async fn test_custom_binary_path() {
        let engine = TsharkEngine::with_binary_path("/usr/local/bin/tshark");
        assert_eq!(engine.binary_path, "/usr/local/bin/tshark");
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let engine = TsharkEngine::with_binary_path("/nonexistent/tshark");
        let err = engine
            .capture("eth0", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }
}
