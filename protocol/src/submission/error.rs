use thiserror::Error;

use crate::account::RecordError;
use crate::codec::CodecError;

/// Transport and decoding failures talking to the query service.
///
/// A submission the network evaluated and rejected is not a `ClientError`;
/// it comes back as [`super::SubmissionResult::Failure`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("result_xdr: {0}")]
    Codec(#[from] CodecError),

    #[error("network {0} has no friendbot")]
    NoFriendbot(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
