//! Core transaction value types.
//!
//! A [`Transaction`] is plain data: source, fee, sequence, validity window,
//! memo and operations. It carries no signatures; those live on the
//! envelope (see [`super::envelope`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::SequenceNumber;
use crate::config::MAX_MEMO_TEXT_LENGTH;
use crate::crypto::Address;
use crate::error::ValidationError;
use crate::operation::Operation;

// ---------------------------------------------------------------------------
// TimeBounds
// ---------------------------------------------------------------------------

/// Validity window in Unix seconds. `max_time == 0` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    pub fn new(min_time: u64, max_time: u64) -> Result<Self, ValidationError> {
        if max_time != 0 && min_time > max_time {
            return Err(ValidationError::InvertedTimeBounds { min_time, max_time });
        }
        Ok(Self { min_time, max_time })
    }

    /// Valid from now until `now + secs`.
    pub fn timeout(now: u64, secs: u64) -> Self {
        Self {
            min_time: 0,
            max_time: now.saturating_add(secs),
        }
    }

    /// `true` if a ledger closing at `now` would accept the transaction.
    pub fn contains(&self, now: u64) -> bool {
        now >= self.min_time && (self.max_time == 0 || now <= self.max_time)
    }
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Free-form annotation attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Memo {
    #[default]
    None,
    /// At most 28 bytes of UTF-8.
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    /// A text memo, checking the byte length.
    pub fn text(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.len() > MAX_MEMO_TEXT_LENGTH {
            return Err(ValidationError::MemoTooLong {
                len: text.len(),
                max: MAX_MEMO_TEXT_LENGTH,
            });
        }
        Ok(Self::Text(text))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Text(t) => write!(f, "text:{}", t),
            Self::Id(id) => write!(f, "id:{}", id),
            Self::Hash(h) => write!(f, "hash:{}", hex::encode(h)),
            Self::Return(h) => write!(f, "return:{}", hex::encode(h)),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An unsigned transaction.
///
/// Fields are public so decoded transactions can be inspected, but the only
/// supported way to *make* one is [`super::TransactionAssembler`], which
/// enforces the fee, sequence and operation-count rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub source: Address,
    /// Maximum total fee in stroops.
    pub fee: u32,
    /// Must be exactly the source account's current sequence plus one.
    pub sequence: SequenceNumber,
    pub time_bounds: Option<TimeBounds>,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

impl Transaction {
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Every account that is the effective source of at least one
    /// operation, plus the transaction source, in first-seen order.
    pub fn source_accounts(&self) -> Vec<Address> {
        let mut out = vec![self.source];
        for op in &self.operations {
            let src = op.effective_source(&self.source);
            if !out.contains(&src) {
                out.push(src);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_text_limit_is_bytes() {
        assert!(Memo::text("a".repeat(28)).is_ok());
        assert_eq!(
            Memo::text("a".repeat(29)),
            Err(ValidationError::MemoTooLong { len: 29, max: 28 })
        );
        // 10 three-byte characters = 30 bytes.
        assert!(Memo::text("€".repeat(10)).is_err());
    }

    #[test]
    fn time_bounds_validation() {
        assert!(TimeBounds::new(10, 5).is_err());
        assert!(TimeBounds::new(10, 0).is_ok());
        let tb = TimeBounds::new(10, 20).unwrap();
        assert!(tb.contains(15));
        assert!(!tb.contains(21));
        assert!(TimeBounds::new(0, 0).unwrap().contains(u64::MAX));
    }

    #[test]
    fn timeout_saturates() {
        let tb = TimeBounds::timeout(u64::MAX - 1, 3600);
        assert_eq!(tb.max_time, u64::MAX);
        assert_eq!(TimeBounds::timeout(1_000, 60).max_time, 1_060);
    }
}
