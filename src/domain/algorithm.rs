//! Supported hash algorithms.
//!
//! Selectors are accepted case-insensitively and canonicalized to
//! uppercase for the custody log. Anything outside the supported set is
//! a hard error: digest integrity must never be ambiguous, so an unknown
//! selector is reported, never mapped to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A hash algorithm supported by the evidence hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

/// Error returned when a selector is outside the supported set.
#[derive(Debug, Clone, Error)]
#[error("unsupported hash algorithm '{selector}' (expected MD5, SHA1, SHA256 or SHA512)")]
pub struct UnsupportedAlgorithm {
    /// The selector as the caller supplied it
    pub selector: String,
}

impl HashAlgorithm {
    /// All supported algorithms, in selector-menu order
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    /// Canonical uppercase name as written to the custody log
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Length of the lowercase hex digest produced by this algorithm
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MD5" => Ok(HashAlgorithm::Md5),
            "SHA1" => Ok(HashAlgorithm::Sha1),
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            _ => Err(UnsupportedAlgorithm {
                selector: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_parsing() {
        assert_eq!("md5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!(
            "Sha256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            " SHA512 ".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha512
        );
    }

    #[test]
    fn test_unknown_selector_is_rejected() {
        let err = "sha3".parse::<HashAlgorithm>().unwrap_err();
        assert_eq!(err.selector, "sha3");

        assert!("".parse::<HashAlgorithm>().is_err());
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_canonical_names_and_lengths() {
        assert_eq!(HashAlgorithm::Md5.name(), "MD5");
        assert_eq!(HashAlgorithm::Sha1.name(), "SHA1");

        assert_eq!(HashAlgorithm::Md5.hex_len(), 32);
        assert_eq!(HashAlgorithm::Sha1.hex_len(), 40);
        assert_eq!(HashAlgorithm::Sha256.hex_len(), 64);
        assert_eq!(HashAlgorithm::Sha512.hex_len(), 128);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&HashAlgorithm::Sha256).unwrap();
        assert_eq!(json, "\"SHA256\"");

        let parsed: HashAlgorithm = serde_json::from_str("\"MD5\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Md5);
    }
}
