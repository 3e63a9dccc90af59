//! Document metadata reader backed by the `pdfinfo` tool.
//!
//! Spawns `pdfinfo <file>` and parses its `Key: value` output lines. All
//! PDF container parsing stays inside the external tool.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use super::MetadataReader;

/// Metadata reader using the poppler `pdfinfo` subprocess
pub struct PdfInfoReader {
    /// Path to the pdfinfo binary (default: "pdfinfo")
    binary_path: String,
}

impl Default for PdfInfoReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfInfoReader {
    /// Create a reader with the default binary path
    pub fn new() -> Self {
        Self {
            binary_path: "pdfinfo".to_string(),
        }
    }

    /// Create a reader with a custom binary path
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

/// Parse `Key: value` lines into an ordered mapping
fn parse_metadata(output: &str) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for line in output.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if !key.is_empty() {
                metadata.insert(key.to_string(), value.to_string());
            }
        }
    }

    metadata
}

#[async_trait]
impl MetadataReader for PdfInfoReader {
    fn name(&self) -> &str {
        "pdfinfo"
    }

    async fn read(&self, document: &Path) -> Result<BTreeMap<String, String>> {
        let output = Command::new(&self.binary_path)
            .arg(document)
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to spawn {} for {}",
                    self.binary_path,
                    document.display()
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "pdfinfo failed on {} with exit code {}: {}",
                document.display(),
                exit_code,
                stderr.trim()
            );
        }

        let stdout =
            String::from_utf8(output.stdout).context("pdfinfo output is not valid UTF-8")?;

        Ok(parse_metadata(&stdout))
    }

    async fn health_check(&self) -> Result<()> {
        Command::new(&self.binary_path)
            .arg("-v")
            .output()
            .await
            .with_context(|| format!("{} not found in PATH", self.binary_path))?;
        Ok(())
    }
}
