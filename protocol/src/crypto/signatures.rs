//! # Signatures
//!
//! Raw Ed25519 signatures, and the hint-decorated form attached to
//! envelopes. The hint is the last four bytes of the signer's public key.
//! Verifiers use it to find candidate signers without trying every key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 64-byte Ed25519 signature.
///
/// Stored as a `Vec` because the wire format carries signatures as variable
/// opaque data. Anything decoded off the wire may not be 64 bytes; such a
/// signature simply never verifies.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "hex_bytes")] Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes.to_vec())
    }

    /// Wraps bytes of any length. Used by the decoder.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "Signature({}…)", &hex[..hex.len().min(16)])
    }
}

/// Last four bytes of a public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureHint(pub [u8; 4]);

impl fmt::Debug for SignatureHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureHint({})", hex::encode(self.0))
    }
}

/// A signature as it sits in an envelope: hint plus signature bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecoratedSignature {
    pub hint: SignatureHint,
    pub signature: Signature,
}

impl DecoratedSignature {
    /// `true` if the hint matches `key` and the signature verifies over
    /// `payload`.
    pub fn is_valid_for(&self, key: &super::PublicKey, payload: &[u8]) -> bool {
        self.hint == key.hint() && key.verify(payload, &self.signature)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        hex::decode(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn decorated_signature_checks_hint_and_bytes() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let decorated = kp.sign_decorated(b"payload").unwrap();

        assert!(decorated.is_valid_for(kp.public_key(), b"payload"));
        assert!(!decorated.is_valid_for(kp.public_key(), b"tampered"));
        assert!(!decorated.is_valid_for(other.public_key(), b"payload"));
    }

    #[test]
    fn short_signature_never_verifies() {
        let kp = KeyPair::generate();
        let bogus = Signature::from_vec(vec![1, 2, 3]);
        assert!(!kp.verify(b"payload", &bogus));
    }

    #[test]
    fn signature_serializes_as_hex() {
        let sig = Signature::from_bytes([0xab; 64]);
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(64)));
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
