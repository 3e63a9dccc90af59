//! Digest request and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HashAlgorithm;

/// A request to digest a byte sequence with a specific algorithm.
///
/// Immutable once constructed. The input may be empty (a zero-length
/// digest is well-defined) but never absent.
#[derive(Debug, Clone)]
pub struct DigestRequest {
    input: Vec<u8>,
    algorithm: HashAlgorithm,
}

impl DigestRequest {
    /// Create a request for the given input bytes and algorithm
    pub fn new(input: impl Into<Vec<u8>>, algorithm: HashAlgorithm) -> Self {
        Self {
            input: input.into(),
            algorithm,
        }
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

/// The result of a digest computation.
///
/// `hex_digest` is lowercase hex of the algorithm-specific fixed length
/// (32/40/64/128 chars). The timestamp records when the digest was
/// computed, not when it was persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestResult {
    /// Algorithm that produced the digest
    pub algorithm: HashAlgorithm,

    /// Lowercase hex digest
    pub hex_digest: String,

    /// When the digest was computed (ISO 8601)
    pub computed_at: DateTime<Utc>,
}

impl DigestResult {
    /// Create a result stamped with the current time
    pub fn new(algorithm: HashAlgorithm, hex_digest: String) -> Self {
        debug_assert_eq!(hex_digest.len(), algorithm.hex_len());
        Self {
            algorithm,
            hex_digest,
            computed_at: Utc::now(),
        }
    }
}
