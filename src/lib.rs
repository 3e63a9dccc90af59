//! custodia - digital-evidence hashing and chain-of-custody ledger
//!
//! Computes cryptographic digests of evidence inputs and appends an
//! immutable record of every operation to an append-only evidence log.
//!
//! # Architecture
//!
//! The system is built around a write-once custody ledger:
//! - Every digest operation is recorded as an immutable log line
//! - A record is persisted before success is reported (durable write
//!   before acknowledge)
//! - Log lines are independent; a malformed line never poisons its
//!   neighbors
//!
//! # Modules
//!
//! - `adapters`: External collaborators (document metadata, packet capture)
//! - `core`: Hasher, ledger and custodian
//! - `domain`: Data structures (HashAlgorithm, DigestResult, LogRecord)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Digest text and record it
//! custodia hash "hello" --algorithm sha256
//!
//! # Digest a file in streaming chunks
//! custodia hash --file disk.img --algorithm sha512
//!
//! # Audit the custody log
//! custodia log verify
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{compute_digest, digest_file, Custodian, CustodyError, Ledger, LedgerError};
pub use crate::domain::{
    DigestRequest, DigestResult, HashAlgorithm, LedgerEntry, LogRecord, UnsupportedAlgorithm,
};

// External collaborators
pub use crate::adapters::{CaptureEngine, MetadataReader, PdfInfoReader, TsharkEngine};
