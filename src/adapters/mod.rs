//! Narrow interfaces to external forensic tools.
//!
//! Custodia performs no document parsing and no protocol decoding of its
//! own. The two collaborators are consumed through these traits for
//! display/audit purposes only:
//!
//! - [`MetadataReader`]: document handle -> metadata key/value mapping
//! - [`CaptureEngine`]: interface + duration -> finite sequence of
//!   captured packet summaries (bounded by the duration, not restartable)

pub mod pdfinfo;
pub mod tshark;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the subprocess implementations
pub use pdfinfo::PdfInfoReader;
pub use tshark::TsharkEngine;

/// Reads document metadata through an external parsing engine.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Human-readable reader name
    fn name(&self) -> &str;

    /// Return the document's metadata as a key -> value mapping
    async fn read(&self, document: &Path) -> Result<BTreeMap<String, String>>;

    /// Check that the external tool is available
    async fn health_check(&self) -> Result<()>;
}

/// Captures live packets through an external capture engine.
#[async_trait]
pub trait CaptureEngine: Send + Sync {
    /// Human-readable engine name
    fn name(&self) -> &str;

    /// Capture on the given interface until the duration elapses and
    /// return the engine's packet summary lines
    async fn capture(&self, interface: &str, duration: Duration) -> Result<Vec<String>>;

    /// Check that the external tool is available
    async fn health_check(&self) -> Result<()>;
}
