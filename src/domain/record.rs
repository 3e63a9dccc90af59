//! Chain-of-custody records and their on-disk line format.
//!
//! One record per digest operation, one line per record:
//!
//! ```text
//! <METHOD> | input:<input_reference> | hash:<hex_digest>
//! ```
//!
//! Records are append-only: once written they are never modified or
//! deleted by this component. The input reference is preserved verbatim
//! except for newline flattening, which is the minimum escaping needed to
//! keep every record on a single line.

use serde::{Deserialize, Serialize};

use super::{DigestResult, HashAlgorithm};

/// A single custody record, as appended to the evidence log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Canonical algorithm name (MD5, SHA1, SHA256, SHA512)
    pub method: HashAlgorithm,

    /// The exact text/identifier that produced the digest, flattened to
    /// a single line
    pub input_reference: String,

    /// Lowercase hex digest
    pub hash: String,
}

impl LogRecord {
    /// Build a record from a digest result and its input reference.
    ///
    /// Newlines in the reference are flattened so the record always
    /// occupies exactly one line.
    pub fn new(result: &DigestResult, input_reference: &str) -> Self {
        Self {
            method: result.algorithm,
            input_reference: flatten_reference(input_reference),
            hash: result.hex_digest.clone(),
        }
    }

    /// Render the record in the evidence-log line format (no trailing
    /// newline)
    pub fn to_line(&self) -> String {
        format!(
            "{} | input:{} | hash:{}",
            self.method, self.input_reference, self.hash
        )
    }

    /// Parse a single log line back into a record.
    ///
    /// Returns `None` for lines that do not match the format; consumers
    /// treat the log as a sequence of independent lines, so a malformed
    /// line (e.g. from a manual edit) never poisons its neighbors.
    pub fn parse_line(line: &str) -> Option<Self> {
        // The hash field is parsed from the right: the reference may
        // itself contain " | ", but the digest is always the final field.
        let (head, hash) = line.rsplit_once(" | hash:")?;
        let (method_str, input_reference) = head.split_once(" | input:")?;

        let method: HashAlgorithm = method_str.parse().ok()?;

        if hash.len() != method.hex_len() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        Some(Self {
            method,
            input_reference: input_reference.to_string(),
            hash: hash.to_ascii_lowercase(),
        })
    }
}

/// One line of the evidence log as seen during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntry {
    /// A well-formed custody record
    Record(LogRecord),

    /// A line that does not parse as a record (manual edits, truncation
    /// by external tools). Kept so audits can report it.
    Malformed {
        /// 1-indexed line number in the log file
        line_number: usize,
        raw: String,
    },
}

impl LedgerEntry {
    /// The record, if this entry is well-formed
    pub fn record(&self) -> Option<&LogRecord> {
        match self {
            LedgerEntry::Record(record) => Some(record),
            LedgerEntry::Malformed { .. } => None,
        }
    }
}

/// Flatten newlines so a reference can never break the one-record-per-line
/// invariant
fn flatten_reference(reference: &str) -> String {
    reference.replace('\r', "\\r").replace('\n', "\\n")
}
