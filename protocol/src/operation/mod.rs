//! # Operations
//!
//! The individual state changes a transaction carries: payments, offers,
//! trustlines, signer changes, sponsorships, claimable balances and
//! liquidity pool moves.
//!
//! - [`types`] holds the closed [`OperationBody`] enum and its threshold
//!   classification.
//! - [`builder`] holds validated constructors that turn user-facing input
//!   into operations.

pub mod builder;
pub mod types;

pub use builder::{OperationBuilder, SetOptionsBuilder, TrustLineFlagChanges};
pub use types::{
    account_flags, trustline_flags, ClaimPredicate, ClaimableBalanceId, Claimant, Operation,
    OperationBody, OperationKind, SetOptions, ThresholdClass,
};
