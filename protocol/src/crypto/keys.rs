//! # Key Management
//!
//! Ed25519 keys, account addresses and secret seeds.
//!
//! An [`Address`] is a Bech32 string with the `acct` prefix that carries the
//! raw 32-byte public key. Because the key is embedded (not hashed), any
//! address can be turned back into a verifying key, which is what makes a
//! public-only [`KeyPair`] useful: it can check signatures and compute
//! signature hints for accounts whose secrets live somewhere else.
//!
//! ```text
//! public_key (32 bytes) -> Bech32("acct", public_key) -> acct1...
//! secret    (32 bytes) -> Bech32("seed", secret)     -> seed1...
//! ```
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (ed25519-dalek does this for us).
//! - `Debug` never prints secret material.
//! - Key bytes are never logged.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::signatures::{DecoratedSignature, Signature, SignatureHint};

/// Human-readable prefix for account addresses.
pub const ACCOUNT_HRP: Hrp = Hrp::parse_unchecked("acct");

/// Human-readable prefix for secret seeds.
pub const SEED_HRP: Hrp = Hrp::parse_unchecked("seed");

/// Errors that can occur during key operations.
///
/// Deliberately terse about secrets: the seed text itself never appears in
/// an error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid secret seed")]
    InvalidSeed,

    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    /// The keypair was built from an address and holds no signing key.
    #[error("keypair for {address} is public-only and cannot sign")]
    PublicOnly { address: String },
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A validated Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl PublicKey {
    /// Validates that the bytes decode to a curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// The last four bytes of the key, used to match signatures to signers
    /// without trying every key.
    pub fn hint(&self) -> SignatureHint {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.bytes[28..]);
        SignatureHint(hint)
    }

    /// Returns `true` if `signature` is a valid signature of `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature.as_bytes()) else {
            return false;
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }

    pub fn to_address(&self) -> Address {
        Address(*self)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An account address: `acct1…`, carrying the account's master public key.
///
/// Equality, ordering and hashing follow the key bytes, so two textual
/// spellings of the same address (upper/lower case Bech32) compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(PublicKey);

impl Address {
    pub fn from_public_key(key: PublicKey) -> Self {
        Self(key)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.0
    }

    /// Canonical lower-case Bech32 text.
    pub fn to_text(&self) -> String {
        // A 32-byte payload is far below the Bech32 code length limit.
        bech32::encode::<Bech32>(ACCOUNT_HRP, self.0.as_bytes()).unwrap_or_default()
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (hrp, data) = bech32::decode(s).map_err(|_| KeyError::InvalidAddress(s.to_string()))?;
        if hrp != ACCOUNT_HRP {
            return Err(KeyError::InvalidAddress(s.to_string()));
        }
        let bytes: [u8; 32] = data
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidAddress(s.to_string()))?;
        Ok(Self(PublicKey::from_bytes(bytes)?))
    }
}

impl TryFrom<String> for Address {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_text()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_text())
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A public key plus, optionally, the secret that signs for it.
///
/// Capability-typed at runtime: [`KeyPair::from_address`] builds a
/// public-only pair whose [`sign`](Self::sign) fails with
/// [`KeyError::PublicOnly`]. Every other constructor holds a signing key.
///
/// `KeyPair` does not implement `Serialize`. Exporting a secret is an
/// explicit call to [`secret_seed`](Self::secret_seed).
pub struct KeyPair {
    public_key: PublicKey,
    signing_key: Option<SigningKey>,
}

impl KeyPair {
    /// Fresh random keypair from the OS RNG.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Deterministic keypair from 32 bytes of secret material.
    pub fn from_seed_bytes(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Parses a `seed1…` secret.
    pub fn from_secret(secret: &str) -> Result<Self, KeyError> {
        let (hrp, data) = bech32::decode(secret.trim()).map_err(|_| KeyError::InvalidSeed)?;
        if hrp != SEED_HRP {
            return Err(KeyError::InvalidSeed);
        }
        let seed: [u8; 32] = data.as_slice().try_into().map_err(|_| KeyError::InvalidSeed)?;
        Ok(Self::from_seed_bytes(&seed))
    }

    /// Public-only keypair for an address.
    pub fn from_address(address: &Address) -> Self {
        Self {
            public_key: *address.public_key(),
            signing_key: None,
        }
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey {
            bytes: signing_key.verifying_key().to_bytes(),
        };
        Self {
            public_key,
            signing_key: Some(signing_key),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.public_key.to_address()
    }

    /// `false` for public-only keypairs.
    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    pub fn hint(&self) -> SignatureHint {
        self.public_key.hint()
    }

    /// Signs raw bytes.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, KeyError> {
        let signing_key = self.signing_key.as_ref().ok_or_else(|| KeyError::PublicOnly {
            address: self.address().to_text(),
        })?;
        Ok(Signature::from_bytes(signing_key.sign(message).to_bytes()))
    }

    /// Signs a payload and tags the signature with this key's hint.
    pub fn sign_decorated(&self, payload: &[u8]) -> Result<DecoratedSignature, KeyError> {
        Ok(DecoratedSignature {
            hint: self.hint(),
            signature: self.sign(payload)?,
        })
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key.verify(message, signature)
    }

    /// Exports the `seed1…` secret. `None` for public-only keypairs.
    ///
    /// Handle the result like the secret it is: don't log it.
    pub fn secret_seed(&self) -> Option<String> {
        self.signing_key
            .as_ref()
            .and_then(|key| bech32::encode::<Bech32>(SEED_HRP, &key.to_bytes()).ok())
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self {
            public_key: self.public_key,
            signing_key: self
                .signing_key
                .as_ref()
                .map(|key| SigningKey::from_bytes(&key.to_bytes())),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyPair(pub={}, can_sign={})",
            self.address(),
            self.can_sign()
        )
    }
}

impl PartialEq for KeyPair {
    /// Public keys only. Comparing secrets is never what the caller wants.
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for KeyPair {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_text_roundtrip() {
        let kp = KeyPair::generate();
        let text = kp.address().to_string();
        assert!(text.starts_with("acct1"));
        let parsed: Address = text.parse().unwrap();
        assert_eq!(parsed, kp.address());
    }

    #[test]
    fn address_parse_is_case_insensitive() {
        let kp = KeyPair::generate();
        let upper = kp.address().to_string().to_uppercase();
        assert_eq!(upper.parse::<Address>().unwrap(), kp.address());
    }

    #[test]
    fn address_rejects_seed_prefix_and_garbage() {
        let kp = KeyPair::generate();
        let seed = kp.secret_seed().unwrap();
        assert!(seed.parse::<Address>().is_err());
        assert!("acct1notanaddress".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn secret_seed_roundtrip() {
        let kp = KeyPair::generate();
        let seed = kp.secret_seed().unwrap();
        assert!(seed.starts_with("seed1"));
        let restored = KeyPair::from_secret(&seed).unwrap();
        assert_eq!(restored, kp);
        assert!(KeyPair::from_secret(&kp.address().to_string()).is_err());
    }

    #[test]
    fn public_only_keypair_cannot_sign() {
        let kp = KeyPair::generate();
        let public_only = KeyPair::from_address(&kp.address());
        assert!(!public_only.can_sign());
        assert!(public_only.secret_seed().is_none());
        assert!(matches!(
            public_only.sign(b"pay 10"),
            Err(KeyError::PublicOnly { .. })
        ));

        let sig = kp.sign(b"pay 10").unwrap();
        assert!(public_only.verify(b"pay 10", &sig));
    }

    #[test]
    fn hint_is_last_four_key_bytes() {
        let kp = KeyPair::from_seed_bytes(&[7u8; 32]);
        let hint = kp.hint();
        assert_eq!(&hint.0, &kp.public_key().as_bytes()[28..]);
    }

    #[test]
    fn deterministic_from_seed_bytes() {
        let a = KeyPair::from_seed_bytes(&[42u8; 32]);
        let b = KeyPair::from_seed_bytes(&[42u8; 32]);
        assert_eq!(a.address(), b.address());
        assert_eq!(a.sign(b"x").unwrap(), b.sign(b"x").unwrap());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let sig = a.sign(b"message").unwrap();
        assert!(!b.verify(b"message", &sig));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = KeyPair::generate();
        let debug = format!("{:?}", kp);
        let seed = kp.secret_seed().unwrap();
        assert!(debug.starts_with("KeyPair(pub=acct1"));
        assert!(!debug.contains(&seed));
    }

    #[test]
    fn address_serde_as_string() {
        let kp = KeyPair::generate();
        let json = serde_json::to_string(&kp.address()).unwrap();
        assert_eq!(json, format!("\"{}\"", kp.address()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kp.address());
    }
}
