//! Operation data types.
//!
//! [`OperationBody`] is a closed enum. Adding a variant is a compile error
//! everywhere that matches on it (codec, threshold classification, JSON
//! view), which is exactly where a new variant needs attention.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::account::Signer;
use crate::amount::{Amount, Price};
use crate::asset::{Asset, ChangeTrustAsset, PoolId};
use crate::crypto::Address;
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Account flags for set-options `set_flags` / `clear_flags`.
pub mod account_flags {
    pub const AUTH_REQUIRED: u32 = 0x1;
    pub const AUTH_REVOCABLE: u32 = 0x2;
    pub const AUTH_IMMUTABLE: u32 = 0x4;
    pub const AUTH_CLAWBACK_ENABLED: u32 = 0x8;
}

/// Trustline flags for set-trustline-flags.
pub mod trustline_flags {
    pub const AUTHORIZED: u32 = 0x1;
    pub const AUTHORIZED_TO_MAINTAIN_LIABILITIES: u32 = 0x2;
    pub const CLAWBACK_ENABLED: u32 = 0x4;
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Which of an account's three thresholds an operation must meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdClass {
    Low,
    Medium,
    High,
}

impl fmt::Display for ThresholdClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Operation discriminant. The numeric values are the wire tags and are
/// append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum OperationKind {
    CreateAccount = 0,
    Payment = 1,
    PathPaymentStrictReceive = 2,
    ManageSellOffer = 3,
    CreatePassiveSellOffer = 4,
    SetOptions = 5,
    ChangeTrust = 6,
    AccountMerge = 8,
    ManageData = 10,
    ManageBuyOffer = 12,
    PathPaymentStrictSend = 13,
    CreateClaimableBalance = 14,
    ClaimClaimableBalance = 15,
    BeginSponsoringFutureReserves = 16,
    EndSponsoringFutureReserves = 17,
    SetTrustLineFlags = 21,
    LiquidityPoolDeposit = 22,
    LiquidityPoolWithdraw = 23,
}

impl OperationKind {
    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        use OperationKind::*;
        Some(match tag {
            0 => CreateAccount,
            1 => Payment,
            2 => PathPaymentStrictReceive,
            3 => ManageSellOffer,
            4 => CreatePassiveSellOffer,
            5 => SetOptions,
            6 => ChangeTrust,
            8 => AccountMerge,
            10 => ManageData,
            12 => ManageBuyOffer,
            13 => PathPaymentStrictSend,
            14 => CreateClaimableBalance,
            15 => ClaimClaimableBalance,
            16 => BeginSponsoringFutureReserves,
            17 => EndSponsoringFutureReserves,
            21 => SetTrustLineFlags,
            22 => LiquidityPoolDeposit,
            23 => LiquidityPoolWithdraw,
            _ => return None,
        })
    }

    /// `true` for the three order-book operations whose results carry an
    /// offer outcome.
    pub fn is_offer(self) -> bool {
        matches!(
            self,
            Self::ManageSellOffer | Self::ManageBuyOffer | Self::CreatePassiveSellOffer
        )
    }
}

// ---------------------------------------------------------------------------
// Claimable balances
// ---------------------------------------------------------------------------

/// A claimable balance identifier. Displayed the way the ledger API prints
/// it: a 4-byte type prefix (`00000000`) followed by the 32-byte hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClaimableBalanceId(pub [u8; 32]);

impl FromStr for ClaimableBalanceId {
    type Err = ValidationError;

    /// Accepts the prefixed 72-character form or the bare 64-character hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = match s.len() {
            72 if s.starts_with("00000000") => &s[8..],
            64 => s,
            _ => return Err(ValidationError::InvalidAssetIdentifier(s.to_string())),
        };
        let bytes = hex::decode(hash)
            .map_err(|_| ValidationError::InvalidAssetIdentifier(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ValidationError::InvalidAssetIdentifier(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for ClaimableBalanceId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ClaimableBalanceId> for String {
    fn from(id: ClaimableBalanceId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for ClaimableBalanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "00000000{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ClaimableBalanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimableBalanceId({})", self)
    }
}

/// When a claimant may claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPredicate {
    Unconditional,
    And(Box<ClaimPredicate>, Box<ClaimPredicate>),
    Or(Box<ClaimPredicate>, Box<ClaimPredicate>),
    Not(Box<ClaimPredicate>),
    /// Unix seconds.
    BeforeAbsoluteTime(i64),
    /// Seconds after the balance was created.
    BeforeRelativeTime(i64),
}

impl ClaimPredicate {
    pub fn and(a: ClaimPredicate, b: ClaimPredicate) -> Self {
        Self::And(Box::new(a), Box::new(b))
    }

    pub fn or(a: ClaimPredicate, b: ClaimPredicate) -> Self {
        Self::Or(Box::new(a), Box::new(b))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: ClaimPredicate) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Levels in the predicate tree. A leaf is depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Unconditional | Self::BeforeAbsoluteTime(_) | Self::BeforeRelativeTime(_) => 1,
            Self::And(a, b) | Self::Or(a, b) => 1 + a.depth().max(b.depth()),
            Self::Not(inner) => 1 + inner.depth(),
        }
    }

    /// Evaluates the predicate for a balance created at `created_at`, at
    /// time `now` (both Unix seconds).
    pub fn is_satisfied(&self, created_at: i64, now: i64) -> bool {
        match self {
            Self::Unconditional => true,
            Self::And(a, b) => a.is_satisfied(created_at, now) && b.is_satisfied(created_at, now),
            Self::Or(a, b) => a.is_satisfied(created_at, now) || b.is_satisfied(created_at, now),
            Self::Not(inner) => !inner.is_satisfied(created_at, now),
            Self::BeforeAbsoluteTime(t) => now < *t,
            Self::BeforeRelativeTime(secs) => now < created_at.saturating_add(*secs),
        }
    }
}

/// Someone who may claim a claimable balance, and when.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claimant {
    pub destination: Address,
    pub predicate: ClaimPredicate,
}

// ---------------------------------------------------------------------------
// SetOptions
// ---------------------------------------------------------------------------

/// Fields of a set-options operation. Every field is optional; at least one
/// must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetOptions {
    pub inflation_dest: Option<Address>,
    pub clear_flags: Option<u32>,
    pub set_flags: Option<u32>,
    pub master_weight: Option<u8>,
    pub low_threshold: Option<u8>,
    pub med_threshold: Option<u8>,
    pub high_threshold: Option<u8>,
    pub home_domain: Option<String>,
    /// Adds, reweights or (with weight 0) removes a signer.
    pub signer: Option<Signer>,
}

impl SetOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Touches signers, thresholds or the master weight.
    pub fn changes_authorization(&self) -> bool {
        self.signer.is_some()
            || self.master_weight.is_some()
            || self.low_threshold.is_some()
            || self.med_threshold.is_some()
            || self.high_threshold.is_some()
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The payload of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationBody {
    CreateAccount {
        destination: Address,
        starting_balance: Amount,
    },
    Payment {
        destination: Address,
        asset: Asset,
        amount: Amount,
    },
    PathPaymentStrictReceive {
        send_asset: Asset,
        send_max: Amount,
        destination: Address,
        dest_asset: Asset,
        dest_amount: Amount,
        path: Vec<Asset>,
    },
    ManageSellOffer {
        selling: Asset,
        buying: Asset,
        amount: Amount,
        price: Price,
        offer_id: i64,
    },
    CreatePassiveSellOffer {
        selling: Asset,
        buying: Asset,
        amount: Amount,
        price: Price,
    },
    SetOptions(SetOptions),
    ChangeTrust {
        line: ChangeTrustAsset,
        limit: Amount,
    },
    AccountMerge {
        destination: Address,
    },
    ManageData {
        name: String,
        /// `None` deletes the entry.
        value: Option<Vec<u8>>,
    },
    ManageBuyOffer {
        selling: Asset,
        buying: Asset,
        buy_amount: Amount,
        price: Price,
        offer_id: i64,
    },
    PathPaymentStrictSend {
        send_asset: Asset,
        send_amount: Amount,
        destination: Address,
        dest_asset: Asset,
        dest_min: Amount,
        path: Vec<Asset>,
    },
    CreateClaimableBalance {
        asset: Asset,
        amount: Amount,
        claimants: Vec<Claimant>,
    },
    ClaimClaimableBalance {
        balance_id: ClaimableBalanceId,
    },
    BeginSponsoringFutureReserves {
        sponsored_id: Address,
    },
    EndSponsoringFutureReserves,
    SetTrustLineFlags {
        trustor: Address,
        asset: Asset,
        clear_flags: u32,
        set_flags: u32,
    },
    LiquidityPoolDeposit {
        pool_id: PoolId,
        max_amount_a: Amount,
        max_amount_b: Amount,
        min_price: Price,
        max_price: Price,
    },
    LiquidityPoolWithdraw {
        pool_id: PoolId,
        amount: Amount,
        min_amount_a: Amount,
        min_amount_b: Amount,
    },
}

impl OperationBody {
    pub fn kind(&self) -> OperationKind {
        use OperationBody as B;
        match self {
            B::CreateAccount { .. } => OperationKind::CreateAccount,
            B::Payment { .. } => OperationKind::Payment,
            B::PathPaymentStrictReceive { .. } => OperationKind::PathPaymentStrictReceive,
            B::ManageSellOffer { .. } => OperationKind::ManageSellOffer,
            B::CreatePassiveSellOffer { .. } => OperationKind::CreatePassiveSellOffer,
            B::SetOptions(_) => OperationKind::SetOptions,
            B::ChangeTrust { .. } => OperationKind::ChangeTrust,
            B::AccountMerge { .. } => OperationKind::AccountMerge,
            B::ManageData { .. } => OperationKind::ManageData,
            B::ManageBuyOffer { .. } => OperationKind::ManageBuyOffer,
            B::PathPaymentStrictSend { .. } => OperationKind::PathPaymentStrictSend,
            B::CreateClaimableBalance { .. } => OperationKind::CreateClaimableBalance,
            B::ClaimClaimableBalance { .. } => OperationKind::ClaimClaimableBalance,
            B::BeginSponsoringFutureReserves { .. } => {
                OperationKind::BeginSponsoringFutureReserves
            }
            B::EndSponsoringFutureReserves => OperationKind::EndSponsoringFutureReserves,
            B::SetTrustLineFlags { .. } => OperationKind::SetTrustLineFlags,
            B::LiquidityPoolDeposit { .. } => OperationKind::LiquidityPoolDeposit,
            B::LiquidityPoolWithdraw { .. } => OperationKind::LiquidityPoolWithdraw,
        }
    }

    /// The threshold the operation's source account must meet.
    pub fn threshold_class(&self) -> ThresholdClass {
        use OperationBody as B;
        match self {
            B::SetOptions(opts) if opts.changes_authorization() => ThresholdClass::High,
            B::AccountMerge { .. } => ThresholdClass::High,
            B::SetTrustLineFlags { .. } | B::ClaimClaimableBalance { .. } => ThresholdClass::Low,
            B::CreateAccount { .. }
            | B::Payment { .. }
            | B::PathPaymentStrictReceive { .. }
            | B::PathPaymentStrictSend { .. }
            | B::ManageSellOffer { .. }
            | B::ManageBuyOffer { .. }
            | B::CreatePassiveSellOffer { .. }
            | B::SetOptions(_)
            | B::ChangeTrust { .. }
            | B::ManageData { .. }
            | B::CreateClaimableBalance { .. }
            | B::BeginSponsoringFutureReserves { .. }
            | B::EndSponsoringFutureReserves
            | B::LiquidityPoolDeposit { .. }
            | B::LiquidityPoolWithdraw { .. } => ThresholdClass::Medium,
        }
    }
}

/// One operation, optionally run on behalf of an account other than the
/// transaction source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Address>,
    pub body: OperationBody,
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        Self { source: None, body }
    }

    /// Runs this operation on behalf of `source`.
    pub fn with_source(mut self, source: Address) -> Self {
        self.source = Some(source);
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.body.kind()
    }

    pub fn threshold_class(&self) -> ThresholdClass {
        self.body.threshold_class()
    }

    /// The account whose signature this operation needs.
    pub fn effective_source(&self, tx_source: &Address) -> Address {
        self.source.unwrap_or(*tx_source)
    }
}

impl From<OperationBody> for Operation {
    fn from(body: OperationBody) -> Self {
        Self::new(body)
    }
}
