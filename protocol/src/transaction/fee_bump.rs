//! Fee bump transactions.
//!
//! A fee bump wraps an already-signed transaction and lets a different
//! account pay a (higher) fee for it. The inner transaction, including its
//! signatures and sequence number, is carried byte-for-byte; only the fee
//! source signs the wrapper.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BASE_FEE;
use crate::crypto::Address;
use crate::error::ValidationError;

use super::envelope::{FeeBumpEnvelope, TransactionEnvelope, TransactionV1Envelope};

/// The wrapper: who pays, how much, and for what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBumpTransaction {
    pub fee_source: Address,
    /// Total fee for the wrapper and the inner transaction, in stroops.
    pub fee: i64,
    pub inner: TransactionV1Envelope,
}

impl FeeBumpTransaction {
    /// Wraps `inner`, checking the fee against both the inner fee and the
    /// network minimum for `inner operations + 1`.
    pub fn new(
        inner: TransactionEnvelope,
        fee_source: Address,
        fee: i64,
    ) -> Result<Self, ValidationError> {
        let inner = match inner {
            TransactionEnvelope::Transaction(env) => env,
            TransactionEnvelope::FeeBump(_) => return Err(ValidationError::NestedFeeBump),
        };
        let minimum = Self::minimum_fee(&inner)?;
        if fee < minimum {
            return Err(ValidationError::FeeTooLow { fee, minimum });
        }
        debug!(
            fee_source = %fee_source,
            fee,
            minimum,
            inner_fee = inner.tx.fee,
            "wrapped transaction in fee bump"
        );
        Ok(Self {
            fee_source,
            fee,
            inner,
        })
    }

    /// `max(inner fee, base fee × (inner operations + 1))`.
    pub fn minimum_fee(inner: &TransactionV1Envelope) -> Result<i64, ValidationError> {
        let ops = i64::try_from(inner.tx.operations.len())
            .map_err(|_| ValidationError::FeeOutOfRange)?;
        let network_minimum = i64::from(BASE_FEE)
            .checked_mul(ops + 1)
            .ok_or(ValidationError::FeeOutOfRange)?;
        Ok(network_minimum.max(i64::from(inner.tx.fee)))
    }

    /// An envelope with no fee-source signatures yet.
    pub fn into_envelope(self) -> TransactionEnvelope {
        TransactionEnvelope::FeeBump(FeeBumpEnvelope {
            tx: self,
            signatures: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountState;
    use crate::asset::Asset;
    use crate::crypto::KeyPair;
    use crate::operation::OperationBuilder;
    use crate::transaction::TransactionAssembler;

    fn inner_envelope(ops: usize) -> TransactionEnvelope {
        let source = KeyPair::from_seed_bytes(&[1u8; 32]).address();
        let dest = KeyPair::from_seed_bytes(&[2u8; 32]).address();
        let mut assembler = TransactionAssembler::new(&AccountState::new(source, 5));
        for _ in 0..ops {
            assembler = assembler
                .add_operation(OperationBuilder::payment(dest, Asset::Native, "1").unwrap())
                .unwrap();
        }
        assembler.seal().unwrap()
    }

    #[test]
    fn fee_must_cover_inner_ops_plus_one() {
        let payer = KeyPair::from_seed_bytes(&[3u8; 32]).address();
        match FeeBumpTransaction::new(inner_envelope(1), payer, 199) {
            Err(ValidationError::FeeTooLow { fee: 199, minimum: 200 }) => {}
            other => panic!("expected FeeTooLow, got {:?}", other),
        }
        let bump = FeeBumpTransaction::new(inner_envelope(1), payer, 500).unwrap();
        assert_eq!(bump.fee, 500);
        assert_eq!(bump.inner.tx.sequence.value(), 6);
    }

    #[test]
    fn fee_must_cover_inner_fee() {
        let source = KeyPair::from_seed_bytes(&[1u8; 32]).address();
        let payer = KeyPair::from_seed_bytes(&[3u8; 32]).address();
        let inner = TransactionAssembler::new(&AccountState::new(source, 1))
            .fee(10_000)
            .add_operation(OperationBuilder::account_merge(payer).unwrap())
            .unwrap()
            .seal()
            .unwrap();
        assert!(matches!(
            FeeBumpTransaction::new(inner, payer, 5_000),
            Err(ValidationError::FeeTooLow { minimum: 10_000, .. })
        ));
    }

    #[test]
    fn nested_fee_bump_is_rejected() {
        let payer = KeyPair::from_seed_bytes(&[3u8; 32]).address();
        let bumped = FeeBumpTransaction::new(inner_envelope(2), payer, 1_000)
            .unwrap()
            .into_envelope();
        assert_eq!(
            FeeBumpTransaction::new(bumped, payer, 10_000),
            Err(ValidationError::NestedFeeBump)
        );
    }
}
