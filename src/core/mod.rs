//! Core evidence-handling logic.
//!
//! This module contains:
//! - Hasher: pure, streaming digest computation
//! - Ledger: append-only custody log with locked, durable appends
//! - Custodian: compute-and-record orchestration

pub mod custodian;
pub mod hasher;
pub mod ledger;

// Re-export commonly used types
pub use custodian::{Custodian, CustodyError};
pub use hasher::{compute_digest, digest_file, DigestContext};
pub use ledger::{Ledger, LedgerError};
