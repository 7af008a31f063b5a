//! Transaction envelopes: a transaction plus the signatures authorizing it.
//!
//! # Signing payload
//!
//! Every signature in an envelope signs the same 32 bytes:
//!
//! ```text
//! SHA-256( network_id || envelope_type (i32, big-endian) || encoded tx )
//! ```
//!
//! where `network_id = SHA-256(passphrase)`. The same hash, hex-encoded, is
//! the transaction hash the ledger reports after submission.

use serde::{Deserialize, Serialize};

use crate::codec::Encode;
use crate::crypto::hash::sha256_parts;
use crate::crypto::DecoratedSignature;

use super::fee_bump::FeeBumpTransaction;
use super::types::Transaction;

/// Envelope type tags. Also the discriminant of the signing payload.
pub const ENVELOPE_TYPE_TX: i32 = 2;
pub const ENVELOPE_TYPE_TX_FEE_BUMP: i32 = 5;

/// A regular transaction and its signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionV1Envelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionV1Envelope {
    pub fn unsigned(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    pub fn signature_payload(&self, network_id: &[u8; 32]) -> [u8; 32] {
        sha256_parts(&[
            network_id,
            &ENVELOPE_TYPE_TX.to_be_bytes(),
            &self.tx.to_xdr(),
        ])
    }
}

/// A fee bump wrapper and the fee source's signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBumpEnvelope {
    pub tx: FeeBumpTransaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl FeeBumpEnvelope {
    pub fn signature_payload(&self, network_id: &[u8; 32]) -> [u8; 32] {
        sha256_parts(&[
            network_id,
            &ENVELOPE_TYPE_TX_FEE_BUMP.to_be_bytes(),
            &self.tx.to_xdr(),
        ])
    }
}

/// Anything that can be submitted to the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionEnvelope {
    Transaction(TransactionV1Envelope),
    FeeBump(FeeBumpEnvelope),
}

impl TransactionEnvelope {
    pub fn envelope_type(&self) -> i32 {
        match self {
            Self::Transaction(_) => ENVELOPE_TYPE_TX,
            Self::FeeBump(_) => ENVELOPE_TYPE_TX_FEE_BUMP,
        }
    }

    /// The hash every signer of this (outer) envelope signs.
    pub fn signature_payload(&self, network_id: &[u8; 32]) -> [u8; 32] {
        match self {
            Self::Transaction(env) => env.signature_payload(network_id),
            Self::FeeBump(env) => env.signature_payload(network_id),
        }
    }

    /// Hex transaction hash, as the ledger API reports it.
    pub fn hash_hex(&self, network_id: &[u8; 32]) -> String {
        hex::encode(self.signature_payload(network_id))
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        match self {
            Self::Transaction(env) => &env.signatures,
            Self::FeeBump(env) => &env.signatures,
        }
    }

    pub(crate) fn signatures_mut(&mut self) -> &mut Vec<DecoratedSignature> {
        match self {
            Self::Transaction(env) => &mut env.signatures,
            Self::FeeBump(env) => &mut env.signatures,
        }
    }

    /// The transaction whose operations will run. For a fee bump, the
    /// wrapped one.
    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Transaction(env) => &env.tx,
            Self::FeeBump(env) => &env.tx.inner.tx,
        }
    }

    pub fn is_fee_bump(&self) -> bool {
        matches!(self, Self::FeeBump(_))
    }

    /// The fee the submitter is willing to pay, in stroops.
    pub fn max_fee(&self) -> i64 {
        match self {
            Self::Transaction(env) => i64::from(env.tx.fee),
            Self::FeeBump(env) => env.tx.fee,
        }
    }
}

impl From<TransactionV1Envelope> for TransactionEnvelope {
    fn from(env: TransactionV1Envelope) -> Self {
        Self::Transaction(env)
    }
}

impl From<FeeBumpEnvelope> for TransactionEnvelope {
    fn from(env: FeeBumpEnvelope) -> Self {
        Self::FeeBump(env)
    }
}
