//! Outcome of a submission, and the human-readable messages for the codes
//! the network reports.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, Decode, OperationResult, TransactionResult, TransactionResultCode};
use crate::error::LedgerError;

/// The network accepted the transaction into a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSuccess {
    pub hash: String,
    pub ledger: u32,
    pub fee_charged: i64,
    /// One entry per operation, in order. Empty when the network sent no
    /// result or one this crate could not decode; `result_xdr` still holds it.
    pub operation_results: Vec<OperationResult>,
    pub result_xdr: Option<String>,
}

/// The network evaluated the transaction and rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFailure {
    pub title: String,
    pub detail: Option<String>,
    /// e.g. `tx_failed`, `tx_bad_seq`.
    pub transaction_code: String,
    /// One code per operation; empty when the transaction was rejected as a
    /// whole before any operation ran.
    pub operation_codes: Vec<String>,
    pub result_xdr: Option<String>,
}

/// A failed operation with its position in the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    pub index: usize,
    pub code: String,
    pub message: String,
}

impl SubmissionFailure {
    /// `true` when the network refused the sequence number.
    pub fn is_stale_sequence(&self) -> bool {
        self.transaction_code == TransactionResultCode::BadSeq.name()
    }

    /// `true` when no single operation is to blame.
    pub fn is_transaction_level(&self) -> bool {
        self.operation_codes.is_empty()
    }

    /// Operations that did not succeed.
    pub fn operation_errors(&self) -> Vec<OperationError> {
        self.operation_codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.as_str() != "op_success")
            .map(|(index, code)| OperationError {
                index,
                code: code.clone(),
                message: describe(code),
            })
            .collect()
    }

    /// One message per failed operation, or the transaction-level message
    /// when no operation is to blame.
    pub fn messages(&self) -> Vec<String> {
        let errors = self.operation_errors();
        if errors.is_empty() {
            vec![describe(&self.transaction_code)]
        } else {
            errors.into_iter().map(|e| e.message).collect()
        }
    }

    /// Decodes `result_xdr`, if the network sent one.
    pub fn decoded_result(&self) -> Result<Option<TransactionResult>, CodecError> {
        self.result_xdr
            .as_deref()
            .map(TransactionResult::from_base64)
            .transpose()
    }
}

/// What came back from a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionResult {
    Success(SubmissionSuccess),
    Failure(SubmissionFailure),
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn hash(&self) -> Option<&str> {
        match self {
            Self::Success(s) => Some(&s.hash),
            Self::Failure(_) => None,
        }
    }

    /// Maps a rejected sequence number to [`LedgerError::StaleState`] and
    /// every other rejection to [`LedgerError::Submission`].
    pub fn into_result(self) -> Result<SubmissionSuccess, LedgerError> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure(failure) if failure.is_stale_sequence() => Err(LedgerError::StaleState {
                title: failure.title,
                code: failure.transaction_code,
            }),
            Self::Failure(failure) => Err(LedgerError::Submission(Box::new(failure))),
        }
    }
}

/// Human-readable message for a result code. Unknown codes come back
/// verbatim.
pub fn describe(code: &str) -> String {
    message(code).map_or_else(|| code.to_string(), str::to_string)
}

fn message(code: &str) -> Option<&'static str> {
    Some(match code {
        "tx_success" => "The transaction succeeded.",
        "tx_failed" => "One of the operations failed.",
        "tx_too_early" => "The ledger close time was before the transaction's minimum time.",
        "tx_too_late" => "The ledger close time was after the transaction's maximum time.",
        "tx_missing_operation" => "The transaction has no operations.",
        "tx_bad_seq" => "The sequence number does not match the source account.",
        "tx_bad_auth" => "Too few valid signatures, or signed for the wrong network.",
        "tx_insufficient_balance" => "The fee would bring the source account below its reserve.",
        "tx_no_source_account" => "The source account does not exist.",
        "tx_insufficient_fee" => "The fee is too small.",
        "tx_bad_auth_extra" => "The transaction carries unused signatures.",
        "tx_internal_error" => "The network hit an unexpected error.",
        "tx_not_supported" => "This transaction type is not supported.",
        "tx_fee_bump_inner_failed" => "The fee bump's inner transaction failed.",
        "tx_bad_sponsorship" => "A sponsorship sandwich was left open.",
        "tx_malformed" => "The transaction is malformed.",
        "op_bad_auth" => "Too few valid signatures for this operation's source account.",
        "op_no_source_account" => "The operation's source account does not exist.",
        "op_not_supported" => "The operation is not supported.",
        "op_too_many_subentries" => "The account has reached its subentry limit.",
        "op_too_many_sponsoring" => "The account is sponsoring too many entries.",
        "op_malformed" => "The operation is malformed.",
        "op_underfunded" => "The source account does not have enough funds.",
        "op_low_reserve" => "The account would fall below its minimum reserve.",
        "op_already_exists" => "The destination account already exists.",
        "op_src_no_trust" => "The source account does not trust the asset.",
        "op_src_not_authorized" => "The source account is not authorized to send the asset.",
        "op_no_destination" => "The destination account does not exist.",
        "op_no_trust" => "The destination account does not trust the asset.",
        "op_not_authorized" => "The destination account is not authorized to hold the asset.",
        "op_line_full" => "The destination trustline would exceed its limit.",
        "op_no_issuer" => "The asset's issuer does not exist.",
        "op_too_few_offers" => "There is not enough liquidity along the path.",
        "op_cross_self" => "The payment would cross one of the account's own offers.",
        "op_over_source_max" => "The path costs more than the maximum send amount.",
        "op_under_dest_min" => "The path delivers less than the minimum destination amount.",
        "op_sell_no_trust" => "The account does not trust the asset being sold.",
        "op_buy_no_trust" => "The account does not trust the asset being bought.",
        "op_sell_not_authorized" => "The account is not authorized to sell the asset.",
        "op_buy_not_authorized" => "The account is not authorized to buy the asset.",
        "op_sell_no_issuer" => "The issuer of the asset being sold does not exist.",
        "op_buy_no_issuer" => "The issuer of the asset being bought does not exist.",
        "op_offer_not_found" => "The offer to update does not exist.",
        "op_too_many_signers" => "The account already has the maximum number of signers.",
        "op_bad_flags" => "The flags are invalid or conflict.",
        "op_cant_change" => "The account's flags are immutable.",
        "op_unknown_flag" => "An unknown flag was set.",
        "op_threshold_out_of_range" => "A weight or threshold is out of range.",
        "op_bad_signer" => "The signer is the account's own master key.",
        "op_invalid_home_domain" => "The home domain is invalid.",
        "op_invalid_limit" => "The limit is below the current balance.",
        "op_self_not_allowed" => "An issuer cannot trust its own asset.",
        "op_cannot_delete" => "The trustline still has a balance or liabilities.",
        "op_no_account" => "The destination account does not exist.",
        "op_immutable_set" => "The account has immutable flags and cannot be merged.",
        "op_has_sub_entries" => "The account still has subentries.",
        "op_seq_num_too_far" => "The sequence number is too high to merge.",
        "op_dest_full" => "The destination would exceed its maximum balance.",
        "op_is_sponsor" => "The account is sponsoring other entries.",
        "op_data_name_not_found" => "The data entry does not exist.",
        "op_data_invalid_name" => "The data entry name is invalid.",
        "op_does_not_exist" => "The claimable balance does not exist.",
        "op_cannot_claim" => "The account is not an eligible claimant right now.",
        "op_already_sponsored" => "The account is already being sponsored.",
        "op_recursive" => "Sponsorships cannot be nested.",
        "op_not_sponsored" => "There is no open sponsorship to end.",
        "op_no_trustline" => "The trustor has no trustline for the asset.",
        "op_cant_revoke" => "The issuer cannot revoke authorization.",
        "op_invalid_state" => "The requested flag combination is invalid.",
        "op_bad_price" => "The pool price is outside the requested range.",
        "op_pool_full" => "The pool is full.",
        "op_under_minimum" => "The withdrawal would return less than the requested minimum.",
        _ => return None,
    })
}
