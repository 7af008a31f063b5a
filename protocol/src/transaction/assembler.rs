//! Transaction assembly via the builder pattern.
//!
//! [`TransactionAssembler`] turns an account snapshot and a list of
//! operations into an unsigned [`Transaction`] with the right sequence
//! number, fee and validity window. It does not sign; that happens in
//! [`super::signing`]. This separation keeps assembly testable without key
//! material, and lets the signing happen on another machine entirely.
//!
//! # Sequence numbers
//!
//! The assembled transaction uses `snapshot.sequence + 1`. Two assemblers
//! over the same snapshot produce the same sequence number, and at most one
//! of the resulting transactions can ever be accepted. After a successful
//! submission, advance the snapshot with
//! [`AccountState::increment_sequence`] (or re-fetch it) before assembling
//! the next transaction.

use chrono::Utc;
use tracing::debug;

use crate::account::{AccountState, SequenceNumber};
use crate::config::{BASE_FEE, DEFAULT_TIMEOUT, MAX_OPERATIONS};
use crate::crypto::Address;
use crate::error::ValidationError;
use crate::operation::{Operation, OperationBody};

use super::envelope::{TransactionEnvelope, TransactionV1Envelope};
use super::types::{Memo, TimeBounds, Transaction};

/// How the validity window is chosen at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validity {
    /// `[0, now + DEFAULT_TIMEOUT]`.
    Default,
    /// `[0, now + secs]`.
    Timeout(u64),
    Explicit(TimeBounds),
    Unbounded,
}

/// Fluent builder for unsigned transactions.
///
/// Every method consumes the assembler and returns a new one, so a
/// half-configured assembler can be cloned and finished two different ways.
///
/// ```
/// use ledgerline_protocol::account::AccountState;
/// use ledgerline_protocol::asset::Asset;
/// use ledgerline_protocol::crypto::KeyPair;
/// use ledgerline_protocol::operation::OperationBuilder;
/// use ledgerline_protocol::transaction::TransactionAssembler;
///
/// let source = KeyPair::generate();
/// let dest = KeyPair::generate();
/// let snapshot = AccountState::new(source.address(), 5);
///
/// let tx = TransactionAssembler::new(&snapshot)
///     .add_operation(OperationBuilder::payment(dest.address(), Asset::Native, "10").unwrap())
///     .unwrap()
///     .set_timeout(30)
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.sequence.value(), 6);
/// assert_eq!(tx.fee, 100);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionAssembler {
    source: Address,
    snapshot_sequence: SequenceNumber,
    fee: Option<u32>,
    validity: Validity,
    memo: Memo,
    operations: Vec<Operation>,
}

impl TransactionAssembler {
    /// Starts assembling a transaction sourced from the snapshot's account.
    pub fn new(account: &AccountState) -> Self {
        Self {
            source: account.address,
            snapshot_sequence: account.sequence,
            fee: None,
            validity: Validity::Default,
            memo: Memo::None,
            operations: Vec::new(),
        }
    }

    /// Pins the total fee. Must be at least `100 × operations` at build.
    pub fn fee(mut self, fee: u32) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Appends an operation. Fails on the 101st.
    pub fn add_operation(mut self, op: Operation) -> Result<Self, ValidationError> {
        if self.operations.len() >= MAX_OPERATIONS {
            return Err(ValidationError::TooManyOperations {
                count: self.operations.len() + 1,
                max: MAX_OPERATIONS,
            });
        }
        self.operations.push(op);
        Ok(self)
    }

    pub fn add_operations(
        self,
        ops: impl IntoIterator<Item = Operation>,
    ) -> Result<Self, ValidationError> {
        ops.into_iter().try_fold(self, Self::add_operation)
    }

    /// Valid from now until `now + secs`, measured when the transaction is
    /// built.
    pub fn set_timeout(mut self, secs: u64) -> Self {
        self.validity = Validity::Timeout(secs);
        self
    }

    pub fn time_bounds(mut self, bounds: TimeBounds) -> Self {
        self.validity = Validity::Explicit(bounds);
        self
    }

    /// No validity window at all. The transaction stays valid until its
    /// sequence number is consumed.
    pub fn unbounded(mut self) -> Self {
        self.validity = Validity::Unbounded;
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// `100 × operations`, the lowest fee the network accepts.
    pub fn minimum_fee(&self) -> Result<u32, ValidationError> {
        let ops = u32::try_from(self.operations.len()).map_err(|_| ValidationError::FeeOutOfRange)?;
        BASE_FEE
            .checked_mul(ops)
            .ok_or(ValidationError::FeeOutOfRange)
    }

    /// Builds the unsigned transaction using the current wall clock.
    pub fn build(self) -> Result<Transaction, ValidationError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        self.build_at(now)
    }

    /// Builds the unsigned transaction as if the clock read `now` (Unix
    /// seconds).
    pub fn build_at(self, now: u64) -> Result<Transaction, ValidationError> {
        if self.operations.is_empty() {
            return Err(ValidationError::MissingOperation);
        }
        self.check_self_references()?;

        let minimum = self.minimum_fee()?;
        let fee = match self.fee {
            Some(fee) if fee < minimum => {
                return Err(ValidationError::FeeTooLow {
                    fee: i64::from(fee),
                    minimum: i64::from(minimum),
                })
            }
            Some(fee) => fee,
            None => minimum,
        };

        let sequence = self.snapshot_sequence.next()?;
        let time_bounds = match self.validity {
            Validity::Default => Some(TimeBounds::timeout(now, DEFAULT_TIMEOUT.as_secs())),
            Validity::Timeout(secs) => Some(TimeBounds::timeout(now, secs)),
            Validity::Explicit(bounds) => Some(bounds),
            Validity::Unbounded => None,
        };

        debug!(
            source = %self.source,
            sequence = sequence.value(),
            fee,
            operations = self.operations.len(),
            "assembled transaction"
        );

        Ok(Transaction {
            source: self.source,
            fee,
            sequence,
            time_bounds,
            memo: self.memo,
            operations: self.operations,
        })
    }

    /// Builds and wraps the transaction in an unsigned envelope, ready for
    /// the signature collector.
    pub fn seal(self) -> Result<TransactionEnvelope, ValidationError> {
        Ok(TransactionEnvelope::Transaction(TransactionV1Envelope::unsigned(
            self.build()?,
        )))
    }

    /// Rejects operations whose effective source is also their target where
    /// the ledger would refuse it.
    fn check_self_references(&self) -> Result<(), ValidationError> {
        for op in &self.operations {
            let source = op.effective_source(&self.source);
            let target = match &op.body {
                OperationBody::AccountMerge { destination } => destination,
                OperationBody::BeginSponsoringFutureReserves { sponsored_id } => sponsored_id,
                _ => continue,
            };
            if *target == source {
                return Err(ValidationError::SelfReference(source.to_string()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
