//! # Transaction Module
//!
//! Assembly, fee bumping and signing of ledger transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs         — Transaction, Memo, TimeBounds
//! assembler.rs     — Fluent TransactionAssembler: sequence, fee, validity window
//! fee_bump.rs      — FeeBumpTransaction wrapper and its fee rule
//! envelope.rs      — Envelopes and the signing payload / transaction hash
//! signing.rs       — SignatureCollector: attach signatures to an envelope
//! authorization.rs — Required signers per operation, weight accounting
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Assemble**: [`TransactionAssembler`] over an account snapshot.
//! 2. **Seal**: `seal()` yields an unsigned [`TransactionEnvelope`].
//! 3. **Sign**: [`SignatureCollector`] adds one signature per key, possibly
//!    after a round trip through base64 for an external signer.
//! 4. **Check** (optional): [`authorization_status`] reports which accounts
//!    still lack weight.
//! 5. **Submit**: hand the envelope to a [`crate::submission::LedgerApi`].
//!
//! ## Design Decisions
//!
//! - Every value here is immutable once built. Builders and the collector
//!   consume `self` and hand back a new value.
//! - The assembler never reads the network. Sequence numbers come from the
//!   snapshot the caller supplies.
//! - The network passphrase is an explicit argument to signing; there is no
//!   global "current network".

pub mod assembler;
pub mod authorization;
pub mod envelope;
pub mod fee_bump;
pub mod signing;
pub mod types;

pub use assembler::TransactionAssembler;
pub use authorization::{
    authorization_status, required_signers, select_signers, AuthorizationStatus, RequiredSigner,
    SignatureScope, SignerStatus,
};
pub use envelope::{FeeBumpEnvelope, TransactionEnvelope, TransactionV1Envelope};
pub use fee_bump::FeeBumpTransaction;
pub use signing::{SignatureCollector, SigningError};
pub use types::{Memo, TimeBounds, Transaction};
