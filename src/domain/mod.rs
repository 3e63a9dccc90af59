//! Domain types for the custodia evidence hasher.
//!
//! This module contains the core data structures:
//! - HashAlgorithm: the supported digest algorithms
//! - DigestRequest / DigestResult: one digest operation
//! - LogRecord / LedgerEntry: the chain-of-custody record format

pub mod algorithm;
pub mod digest;
pub mod record;

// Re-export commonly used types
pub use algorithm::{HashAlgorithm, UnsupportedAlgorithm};
pub use digest::{DigestRequest, DigestResult};
pub use record::{LedgerEntry, LogRecord};
