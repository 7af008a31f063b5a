//! # Cryptographic Primitives
//!
//! Everything signature-shaped flows through here: Ed25519 keys and account
//! addresses, SHA-256 payload hashing, and the hint-decorated signatures
//! attached to envelopes.
//!
//! - **Ed25519** for signatures, via `ed25519-dalek`.
//! - **SHA-256** for network ids, signing payloads and transaction hashes.
//!
//! Nothing here is home-grown crypto. These are thin, typed wrappers around
//! audited implementations.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{network_id, sha256};
pub use keys::{Address, KeyError, KeyPair, PublicKey};
pub use signatures::{DecoratedSignature, Signature, SignatureHint};
