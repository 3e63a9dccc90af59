//! Digest computation for the evidence hasher.
//!
//! Computation is pure: it never touches the custody ledger. Digests are
//! produced by the RustCrypto reference implementations and rendered as
//! lowercase hex. Large inputs are digested incrementally through
//! [`DigestContext`] so a file never has to be materialized in memory.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::domain::{DigestRequest, DigestResult, HashAlgorithm};

/// Chunk size for streaming file digests
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// An incremental hasher over one of the supported algorithms.
pub enum DigestContext {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl DigestContext {
    /// Start a fresh context for the given algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => DigestContext::Md5(Md5::new()),
            HashAlgorithm::Sha1 => DigestContext::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => DigestContext::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => DigestContext::Sha512(Sha512::new()),
        }
    }

    /// The algorithm this context is computing
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            DigestContext::Md5(_) => HashAlgorithm::Md5,
            DigestContext::Sha1(_) => HashAlgorithm::Sha1,
            DigestContext::Sha256(_) => HashAlgorithm::Sha256,
            DigestContext::Sha512(_) => HashAlgorithm::Sha512,
        }
    }

    /// Feed a chunk of input into the digest
    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            DigestContext::Md5(h) => h.update(chunk),
            DigestContext::Sha1(h) => h.update(chunk),
            DigestContext::Sha256(h) => h.update(chunk),
            DigestContext::Sha512(h) => h.update(chunk),
        }
    }

    /// Finish the computation and produce the timestamped result
    pub fn finalize(self) -> DigestResult {
        let algorithm = self.algorithm();
        let hex_digest = match self {
            DigestContext::Md5(h) => hex::encode(h.finalize()),
            DigestContext::Sha1(h) => hex::encode(h.finalize()),
            DigestContext::Sha256(h) => hex::encode(h.finalize()),
            DigestContext::Sha512(h) => hex::encode(h.finalize()),
        };
        DigestResult::new(algorithm, hex_digest)
    }
}

/// Compute the digest of a request's input bytes.
///
/// Pure and deterministic: the same input under the same algorithm always
/// yields an identical hex string, bit-for-bit equal to the reference
/// implementation. Empty input is valid and produces the algorithm's
/// empty-string digest.
pub fn compute_digest(request: &DigestRequest) -> DigestResult {
    let mut context = DigestContext::new(request.algorithm());
    context.update(request.input());
    context.finalize()
}

/// Digest a file's contents in fixed-size chunks.
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<DigestResult> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let mut context = DigestContext::new(algorithm);
    let mut buffer = vec![0u8; READ_CHUNK_BYTES];

    loop {
        let read = file
            .read(&mut buffer)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        if read == 0 {
            break;
        }
        context.update(&buffer[..read]);
    }

    Ok(context.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn hex_of(input: &[u8], algorithm: HashAlgorithm) -> String {
        compute_digest(&DigestRequest::new(input.to_vec(), algorithm)).hex_digest
    }

    #[test]
    fn test_known_answers_empty_input() {
        assert_eq!(
            hex_of(b"", HashAlgorithm::Md5),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            hex_of(b"", HashAlgorithm::Sha1),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            hex_of(b"", HashAlgorithm::Sha256),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_known_answers_abc() {
        assert_eq!(
            hex_of(b"abc", HashAlgorithm::Md5),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            hex_of(b"abc", HashAlgorithm::Sha1),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex_of(b"abc", HashAlgorithm::Sha256),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex_of(b"abc", HashAlgorithm::Sha512),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_known_answer_hello_sha256() {
        assert_eq!(
            hex_of(b"hello", HashAlgorithm::Sha256),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_idempotence() {
        let request = DigestRequest::new(b"same input".to_vec(), HashAlgorithm::Sha512);
        let first = compute_digest(&request);
        let second = compute_digest(&request);
        assert_eq!(first.hex_digest, second.hex_digest);
    }

    #[test]
    fn test_digest_lengths_per_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let digest = hex_of(b"fixture", algorithm);
            assert_eq!(digest.len(), algorithm.hex_len());
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(digest, digest.to_lowercase());
        }
    }

    #[test]
    fn test_no_cross_algorithm_collisions_on_fixtures() {
        let fixtures: [&[u8]; 3] = [b"", b"abc", b"hello"];
        let mut seen = std::collections::HashSet::new();
        for input in fixtures {
            for algorithm in HashAlgorithm::ALL {
                assert!(seen.insert(hex_of(input, algorithm)));
            }
        }
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let input = b"abcdefghijklmnopqrstuvwxyz".repeat(4096);

        let mut context = DigestContext::new(HashAlgorithm::Sha256);
        for chunk in input.chunks(1000) {
            context.update(chunk);
        }
        let streamed = context.finalize();

        let one_shot = compute_digest(&DigestRequest::new(input, HashAlgorithm::Sha256));
        assert_eq!(streamed.hex_digest, one_shot.hex_digest);
    }

    #[test]
    fn test_digest_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        file.flush().unwrap();

        let result = digest_file(file.path(), HashAlgorithm::Sha256).unwrap();
        assert_eq!(
            result.hex_digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_digest_file_missing() {
        let err = digest_file(Path::new("/nonexistent/evidence.bin"), HashAlgorithm::Md5);
        assert!(err.is_err());
    }
}
