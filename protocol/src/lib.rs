// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledgerline Protocol: Core Library
//!
//! Client-side plumbing for a ledger network: build transactions, collect
//! the signatures they need, ship them to the network and make sense of
//! what comes back.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants and network presets.
//! - **crypto** — Ed25519 keys, addresses, hashes and decorated signatures.
//! - **amount** / **asset** — Fixed-point amounts, prices and asset identities.
//! - **account** — Account snapshots: sequence, signers, thresholds, balances.
//! - **operation** — The closed set of ledger operations and their builders.
//! - **transaction** — Assembly, fee bumps, signing and authorization checks.
//! - **codec** — Canonical binary encoding, base64 interchange, result decoding.
//! - **submission** — The network API: fetch snapshots, submit, read verdicts.
//! - **error** — The error taxonomy callers branch on.
//!
//! ## Lifecycle
//!
//! ```text
//! AccountState ─► TransactionAssembler ─► SignatureCollector ─► LedgerApi::submit
//!                        ▲                       │
//!                 OperationBuilder        export / import (base64)
//! ```
//!
//! Nothing here keeps global state. The network is always passed in, and
//! account snapshots are plain values: re-fetch or advance them yourself
//! after a submission.

pub mod account;
pub mod amount;
pub mod asset;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod operation;
pub mod submission;
pub mod transaction;

pub use error::{LedgerError, ValidationError};

/// Crate version, for `version` output and user agents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
