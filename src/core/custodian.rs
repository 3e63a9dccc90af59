//! Combined compute-and-record orchestration.
//!
//! The custodian owns the ledger handle and enforces the ordering
//! contract: a digest is computed first, then its custody record is
//! durably appended before success is reported. If persistence fails the
//! digest itself is never discarded; the error variant carries the
//! in-memory result so the caller can retry or abort.

use thiserror::Error;
use tracing::info;

use super::hasher::compute_digest;
use super::ledger::{Ledger, LedgerError};
use crate::domain::{DigestRequest, DigestResult, LogRecord};

/// Errors from the compute-and-record path.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// Empty input was rejected by policy before any digest was computed
    #[error("empty input rejected by policy (set policy.allow_empty_input to permit it)")]
    EmptyInput,

    /// The digest was computed but the custody record was not persisted.
    /// No log line was written; the result is still available in memory.
    #[error("digest computed but custody record not persisted: {source}")]
    Unrecorded {
        result: DigestResult,
        #[source]
        source: LedgerError,
    },
}

impl CustodyError {
    /// The digest result, when one survived the failure
    pub fn digest_result(&self) -> Option<&DigestResult> {
        match self {
            CustodyError::Unrecorded { result, .. } => Some(result),
            CustodyError::EmptyInput => None,
        }
    }
}

/// Evidence custodian: digest computation plus durable custody logging.
pub struct Custodian {
    ledger: Ledger,
    allow_empty_input: bool,
}

impl Custodian {
    /// Create a custodian over the given ledger. Empty input is allowed
    /// by default (the zero-length digest is well-defined).
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            allow_empty_input: true,
        }
    }

    /// Override the empty-input policy
    pub fn with_empty_input_policy(mut self, allow_empty_input: bool) -> Self {
        self.allow_empty_input = allow_empty_input;
        self
    }

    /// The underlying ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Apply the empty-input policy to an input of known byte length.
    ///
    /// The compute-and-record path calls this before any digest work;
    /// callers that digest out-of-band (e.g. streamed files) must call
    /// it before recording, so a zero-length file cannot slip past the
    /// policy.
    pub fn check_input_len(&self, input_len: u64) -> Result<(), CustodyError> {
        if input_len == 0 && !self.allow_empty_input {
            return Err(CustodyError::EmptyInput);
        }
        Ok(())
    }

    /// Compute a digest and durably record it in one operation.
    ///
    /// `input_reference` is the exact text/identifier that produced the
    /// digest; it is preserved verbatim apart from newline flattening.
    pub fn compute_and_record(
        &self,
        request: &DigestRequest,
        input_reference: &str,
    ) -> Result<LogRecord, CustodyError> {
        self.check_input_len(request.input().len() as u64)?;

        let result = compute_digest(request);
        self.record(result, input_reference)
    }

    /// Persist an already-computed digest result.
    ///
    /// The record is appended before this returns successfully. On
    /// storage failure nothing was written and the result travels back
    /// inside the error.
    pub fn record(
        &self,
        result: DigestResult,
        input_reference: &str,
    ) -> Result<LogRecord, CustodyError> {
        let record = LogRecord::new(&result, input_reference);

        match self.ledger.append(&record) {
            Ok(()) => {
                info!(
                    method = %record.method,
                    hash = %record.hash,
                    "evidence recorded"
                );
                Ok(record)
            }
            Err(source) => Err(CustodyError::Unrecorded { result, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HashAlgorithm;
    use tempfile::TempDir;

    fn custodian_in(temp: &TempDir) -> Custodian {
        Custodian::new(Ledger::at(temp.path().join("evidence.log")))
    }

    #[test]
    fn test_compute_and_record_end_to_end() {
        let temp = TempDir::new().unwrap();
        let custodian = custodian_in(&temp);

        let request = DigestRequest::new(b"hello".to_vec(), HashAlgorithm::Sha256);
        let record = custodian.compute_and_record(&request, "hello").unwrap();

        assert_eq!(
            record.hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );

        let contents = std::fs::read_to_string(custodian.ledger().path()).unwrap();
        assert_eq!(
            contents,
            "SHA256 | input:hello | hash:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824\n"
        );
    }

    #[test]
    fn test_empty_input_allowed_by_default() {
        let temp = TempDir::new().unwrap();
        let custodian = custodian_in(&temp);

        let request = DigestRequest::new(Vec::new(), HashAlgorithm::Md5);
        let record = custodian.compute_and_record(&request, "").unwrap();
        assert_eq!(record.hash, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_empty_input_policy_rejects_before_logging() {
        let temp = TempDir::new().unwrap();
        let custodian = custodian_in(&temp).with_empty_input_policy(false);

        let request = DigestRequest::new(Vec::new(), HashAlgorithm::Md5);
        let err = custodian.compute_and_record(&request, "").unwrap_err();
        assert!(matches!(err, CustodyError::EmptyInput));

        // Failed fast: no log file was created
        assert!(!custodian.ledger().path().exists());
    }

    #[test]
    fn test_input_len_policy_check() {
        let temp = TempDir::new().unwrap();

        let permissive = custodian_in(&temp);
        assert!(permissive.check_input_len(0).is_ok());
        assert!(permissive.check_input_len(1024).is_ok());

        let strict = custodian_in(&temp).with_empty_input_policy(false);
        assert!(matches!(
            strict.check_input_len(0),
            Err(CustodyError::EmptyInput)
        ));
        assert!(strict.check_input_len(1).is_ok());
    }

    #[test]
    fn test_storage_failure_preserves_digest() {
        let temp = TempDir::new().unwrap();
        // A directory at the log path forces the append to fail
        let dir_path = temp.path().join("evidence.log");
        std::fs::create_dir(&dir_path).unwrap();

        let custodian = Custodian::new(Ledger::at(&dir_path));
        let request = DigestRequest::new(b"hello".to_vec(), HashAlgorithm::Sha256);
        let err = custodian.compute_and_record(&request, "hello").unwrap_err();

        let result = err.digest_result().expect("digest survives log failure");
        assert_eq!(
            result.hex_digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
