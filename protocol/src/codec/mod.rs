//! Canonical binary encoding of envelopes and results.
//!
//! Every entity that travels to or from the network implements [`Encode`]
//! and [`Decode`]. The binary form is what gets hashed for signing, so it
//! must be byte-for-byte stable: an envelope decoded from bytes re-encodes
//! to the same bytes.
//!
//! Envelopes move between processes as base64 text. The two functions at
//! the bottom of this module are the whole external-signing protocol: one
//! side exports an unsigned envelope, the other imports a signed one.

pub mod impls;
pub mod results;
pub mod xdr;

pub use results::{
    operation_code_name, ClaimedOffer, Counterparty, InnerTransactionResult, OfferEffect,
    OfferEntry, OfferOutcome, OperationNotRun, OperationOutcome, OperationResult,
    PaymentReceipt, TransactionResult, TransactionResultCode,
};
pub use xdr::{CodecError, Decode, Encode, XdrReader, XdrWriter};

use tracing::debug;

use crate::error::LedgerError;
use crate::transaction::TransactionEnvelope;

/// Base64 text of `envelope`, for a signer elsewhere.
pub fn export_for_external_signing(envelope: &TransactionEnvelope) -> String {
    envelope.to_base64()
}

/// Parses an envelope received as base64 text. Surrounding whitespace is
/// ignored; anything else that is not a canonical envelope is rejected.
pub fn import_signed_envelope(text: &str) -> Result<TransactionEnvelope, LedgerError> {
    let envelope = TransactionEnvelope::from_base64(text)?;
    debug!(
        fee_bump = envelope.is_fee_bump(),
        signatures = envelope.signatures().len(),
        "imported envelope"
    );
    Ok(envelope)
}
