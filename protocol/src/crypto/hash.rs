//! # Hashing Utilities
//!
//! SHA-256 is the only hash the ledger format uses. It names networks,
//! derives the payload every signer signs, and identifies transactions and
//! liquidity pools.

use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a fixed-size array.
///
/// ```
/// use ledgerline_protocol::crypto::sha256;
///
/// let hash = sha256(b"ledgerline");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over several slices, without concatenating them first.
pub fn sha256_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// The 32-byte network identifier: `SHA-256(passphrase)`.
///
/// Mixed into every signing payload, so a signature produced for one
/// network is worthless on any other.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    sha256(passphrase.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn parts_match_concatenation() {
        let joined = sha256(b"hello world");
        let parts = sha256_parts(&[b"hello", b" ", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn network_id_depends_on_passphrase() {
        assert_ne!(network_id("a"), network_id("b"));
        assert_eq!(network_id("a"), sha256(b"a"));
    }
}
