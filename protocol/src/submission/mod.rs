//! Talking to the network: account snapshots in, signed envelopes out,
//! structured verdicts back.
//!
//! [`LedgerApi`] is the seam. [`HorizonClient`] implements it over HTTP;
//! the end-to-end tests implement it in memory.

pub mod client;
pub mod error;
pub mod horizon;
pub mod result;

pub use client::LedgerApi;
pub use error::ClientError;
pub use horizon::HorizonClient;
pub use result::{
    describe, OperationError, SubmissionFailure, SubmissionResult, SubmissionSuccess,
};
