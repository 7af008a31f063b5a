//! # Error Taxonomy
//!
//! Two layers. Module-level enums ([`ValidationError`], [`KeyError`],
//! [`CodecError`], [`SigningError`], [`ClientError`]) describe exactly what
//! went wrong where. [`LedgerError`] folds them into the four outcomes a
//! caller actually has to branch on:
//!
//! | Variant             | Detected by     | Recovery                                  |
//! |---------------------|-----------------|-------------------------------------------|
//! | `Validation`        | this crate      | fix the input; nothing was assembled      |
//! | `StaleState`        | the network     | re-fetch the account and re-assemble      |
//! | `MalformedEnvelope` | this crate      | request the payload again                 |
//! | `Submission`        | the network     | inspect per-operation messages, decide    |
//!
//! Nothing here is retried automatically.

use thiserror::Error;

pub use crate::codec::CodecError;
pub use crate::crypto::keys::KeyError;
pub use crate::submission::ClientError;
pub use crate::transaction::signing::SigningError;

use crate::submission::SubmissionFailure;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Malformed input caught before any network contact.
///
/// Always recoverable: the offending value is reported and no operation or
/// transaction is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Asset codes are 1-12 ASCII alphanumeric characters.
    #[error("invalid asset code {code:?}: must be 1-12 ASCII alphanumeric characters")]
    InvalidAssetCode { code: String },

    /// The text could not be parsed as `native`, `XLM` or `CODE:ISSUER`.
    #[error("invalid asset identifier {0:?}")]
    InvalidAssetIdentifier(String),

    /// The native asset cannot be the subject of a trustline.
    #[error("the native asset does not need a trustline")]
    NativeTrustline,

    /// A liquidity pool needs two distinct assets.
    #[error("liquidity pool assets must differ")]
    IdenticalPoolAssets,

    /// The amount string is not a plain decimal number.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    /// More than 7 fractional digits.
    #[error("amount {0:?} has more than 7 fractional digits")]
    ExcessPrecision(String),

    /// The scaled amount does not fit in a signed 64-bit integer.
    #[error("amount {0:?} is out of range")]
    AmountOutOfRange(String),

    /// The operation needs a strictly positive amount.
    #[error("{field} must be greater than zero")]
    NonPositiveAmount { field: &'static str },

    /// The amount may not be negative.
    #[error("{field} must not be negative")]
    NegativeAmount { field: &'static str },

    /// Prices are positive rationals that fit in two 32-bit integers.
    #[error("invalid price {0:?}")]
    InvalidPrice(String),

    /// A liquidity pool deposit with `min_price > max_price`.
    #[error("minimum price exceeds maximum price")]
    InvertedPriceBounds,

    /// Data entry names are 1-64 bytes.
    #[error("data entry name must not be empty")]
    EmptyDataName,

    #[error("data entry name is {len} bytes (max {max})")]
    DataNameTooLong { len: usize, max: usize },

    #[error("data entry value is {len} bytes (max {max})")]
    DataValueTooLong { len: usize, max: usize },

    #[error("home domain is {len} bytes (max {max})")]
    HomeDomainTooLong { len: usize, max: usize },

    #[error("text memo is {len} bytes (max {max})")]
    MemoTooLong { len: usize, max: usize },

    /// Path payments route through at most 5 intermediate assets.
    #[error("payment path has {len} hops (max {max})")]
    PathTooLong { len: usize, max: usize },

    /// Claimable balances need between 1 and 10 claimants.
    #[error("claimable balance has {count} claimants (must be 1-{max})")]
    InvalidClaimantCount { count: usize, max: usize },

    /// A claim predicate nested beyond what the ledger will decode.
    #[error("claim predicate is {depth} levels deep (max {max})")]
    PredicateTooDeep { depth: usize, max: usize },

    /// Signer weights and thresholds are single bytes on the ledger.
    #[error("{field} is {value} (must be 0-255)")]
    WeightOutOfRange { field: &'static str, value: u32 },

    /// A set-options call that changes nothing.
    #[error("set options operation has no fields set")]
    EmptySetOptions,

    /// Offer ids are non-negative; zero means "new offer".
    #[error("invalid offer id {0}")]
    InvalidOfferId(i64),

    /// The operation would move funds from an account to itself.
    #[error("source and destination are the same account: {0}")]
    SelfReference(String),

    /// Transactions carry at least one operation.
    #[error("transaction has no operations")]
    MissingOperation,

    /// Transactions carry at most 100 operations.
    #[error("transaction would have {count} operations (max {max})")]
    TooManyOperations { count: usize, max: usize },

    /// The pinned fee is below `base_fee * operation_count`.
    #[error("fee {fee} is below the minimum of {minimum} stroops")]
    FeeTooLow { fee: i64, minimum: i64 },

    /// Fee arithmetic overflowed the wire type.
    #[error("fee is out of range")]
    FeeOutOfRange,

    /// A fee bump cannot wrap another fee bump.
    #[error("a fee bump transaction cannot wrap another fee bump")]
    NestedFeeBump,

    /// `max_time` earlier than `min_time`.
    #[error("time bounds are inverted: min {min_time} > max {max_time}")]
    InvertedTimeBounds { min_time: u64, max_time: u64 },

    /// The sequence number cannot be advanced any further.
    #[error("sequence number {0} cannot be incremented")]
    SequenceOverflow(i64),
}

// ---------------------------------------------------------------------------
// LedgerError
// ---------------------------------------------------------------------------

/// Top-level error for a complete build → sign → submit flow.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input rejected before a transaction was assembled.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The network rejected the sequence number. The snapshot used to
    /// assemble the transaction is out of date.
    #[error("stale account state: {title} ({code})")]
    StaleState { title: String, code: String },

    /// An externally supplied envelope could not be decoded.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] CodecError),

    /// The network evaluated the transaction and rejected it.
    #[error("submission failed: {}", .0.title)]
    Submission(Box<SubmissionFailure>),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl LedgerError {
    /// `true` when re-fetching the account and re-assembling may succeed.
    pub fn is_stale_state(&self) -> bool {
        matches!(self, Self::StaleState { .. })
    }
}
