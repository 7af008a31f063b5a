//! Transaction results as returned by the network (`result_xdr`).
//!
//! Only the parts a client acts on are modelled in full: per-operation
//! result codes, the offers crossed by trading operations, the offer left
//! resting on the book, and the ids created by claimable-balance and merge
//! operations. Everything else decodes to [`OperationOutcome::None`].

use serde::{Deserialize, Serialize};

use crate::amount::{Amount, Price};
use crate::asset::{Asset, PoolId};
use crate::config::MAX_OPERATIONS;
use crate::crypto::{Address, PublicKey};
use crate::operation::{ClaimableBalanceId, OperationKind};

use super::xdr::{CodecError, Decode, Encode, XdrReader, XdrWriter};

/// Upper bound on offers crossed by a single operation.
const MAX_CLAIM_ATOMS: usize = 1_000;

// ---------------------------------------------------------------------------
// Transaction-level codes
// ---------------------------------------------------------------------------

/// Transaction-level outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionResultCode {
    FeeBumpInnerSuccess,
    Success,
    Failed,
    TooEarly,
    TooLate,
    MissingOperation,
    BadSeq,
    BadAuth,
    InsufficientBalance,
    NoSourceAccount,
    InsufficientFee,
    BadAuthExtra,
    InternalError,
    NotSupported,
    FeeBumpInnerFailed,
    BadSponsorship,
    BadMinSeqAgeOrGap,
    Malformed,
    SorobanInvalid,
}

impl TransactionResultCode {
    const ALL: [Self; 19] = [
        Self::FeeBumpInnerSuccess,
        Self::Success,
        Self::Failed,
        Self::TooEarly,
        Self::TooLate,
        Self::MissingOperation,
        Self::BadSeq,
        Self::BadAuth,
        Self::InsufficientBalance,
        Self::NoSourceAccount,
        Self::InsufficientFee,
        Self::BadAuthExtra,
        Self::InternalError,
        Self::NotSupported,
        Self::FeeBumpInnerFailed,
        Self::BadSponsorship,
        Self::BadMinSeqAgeOrGap,
        Self::Malformed,
        Self::SorobanInvalid,
    ];

    pub fn code(self) -> i32 {
        match self {
            Self::FeeBumpInnerSuccess => 1,
            Self::Success => 0,
            Self::Failed => -1,
            Self::TooEarly => -2,
            Self::TooLate => -3,
            Self::MissingOperation => -4,
            Self::BadSeq => -5,
            Self::BadAuth => -6,
            Self::InsufficientBalance => -7,
            Self::NoSourceAccount => -8,
            Self::InsufficientFee => -9,
            Self::BadAuthExtra => -10,
            Self::InternalError => -11,
            Self::NotSupported => -12,
            Self::FeeBumpInnerFailed => -13,
            Self::BadSponsorship => -14,
            Self::BadMinSeqAgeOrGap => -15,
            Self::Malformed => -16,
            Self::SorobanInvalid => -17,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// The name the query service reports in `result_codes.transaction`.
    pub fn name(self) -> &'static str {
        match self {
            Self::FeeBumpInnerSuccess => "tx_fee_bump_inner_success",
            Self::Success => "tx_success",
            Self::Failed => "tx_failed",
            Self::TooEarly => "tx_too_early",
            Self::TooLate => "tx_too_late",
            Self::MissingOperation => "tx_missing_operation",
            Self::BadSeq => "tx_bad_seq",
            Self::BadAuth => "tx_bad_auth",
            Self::InsufficientBalance => "tx_insufficient_balance",
            Self::NoSourceAccount => "tx_no_source_account",
            Self::InsufficientFee => "tx_insufficient_fee",
            Self::BadAuthExtra => "tx_bad_auth_extra",
            Self::InternalError => "tx_internal_error",
            Self::NotSupported => "tx_not_supported",
            Self::FeeBumpInnerFailed => "tx_fee_bump_inner_failed",
            Self::BadSponsorship => "tx_bad_sponsorship",
            Self::BadMinSeqAgeOrGap => "tx_bad_min_seq_age_or_gap",
            Self::Malformed => "tx_malformed",
            Self::SorobanInvalid => "tx_soroban_invalid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::FeeBumpInnerSuccess)
    }

    /// Codes whose result body carries per-operation results.
    fn has_operation_results(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    fn is_fee_bump(self) -> bool {
        matches!(self, Self::FeeBumpInnerSuccess | Self::FeeBumpInnerFailed)
    }
}

impl Encode for TransactionResultCode {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.code());
    }
}

impl Decode for TransactionResultCode {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let tag = r.read_i32()?;
        Self::from_code(tag).ok_or(CodecError::InvalidTag {
            type_name: "transaction result",
            tag,
        })
    }
}

// ---------------------------------------------------------------------------
// Operation-level codes
// ---------------------------------------------------------------------------

/// Why an operation did not run at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationNotRun {
    BadAuth,
    NoSourceAccount,
    NotSupported,
    TooManySubentries,
    ExceededWorkLimit,
    TooManySponsoring,
}

impl OperationNotRun {
    fn code(self) -> i32 {
        match self {
            Self::BadAuth => -1,
            Self::NoSourceAccount => -2,
            Self::NotSupported => -3,
            Self::TooManySubentries => -4,
            Self::ExceededWorkLimit => -5,
            Self::TooManySponsoring => -6,
        }
    }

    fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            -1 => Self::BadAuth,
            -2 => Self::NoSourceAccount,
            -3 => Self::NotSupported,
            -4 => Self::TooManySubentries,
            -5 => Self::ExceededWorkLimit,
            -6 => Self::TooManySponsoring,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BadAuth => "op_bad_auth",
            Self::NoSourceAccount => "op_no_source_account",
            Self::NotSupported => "op_not_supported",
            Self::TooManySubentries => "op_too_many_subentries",
            Self::ExceededWorkLimit => "op_exceeded_work_limit",
            Self::TooManySponsoring => "op_too_many_sponsoring",
        }
    }
}

/// Name of an inner result code, as the query service reports it in
/// `result_codes.operations`. `None` for codes this client does not know.
pub fn operation_code_name(kind: OperationKind, code: i32) -> Option<&'static str> {
    use OperationKind as K;
    if code == 0 {
        return Some("op_success");
    }
    let table: &[&'static str] = match kind {
        K::CreateAccount => &[
            "op_malformed",
            "op_underfunded",
            "op_low_reserve",
            "op_already_exists",
        ],
        K::Payment => &[
            "op_malformed",
            "op_underfunded",
            "op_src_no_trust",
            "op_src_not_authorized",
            "op_no_destination",
            "op_no_trust",
            "op_not_authorized",
            "op_line_full",
            "op_no_issuer",
        ],
        K::PathPaymentStrictReceive => &[
            "op_malformed",
            "op_underfunded",
            "op_src_no_trust",
            "op_src_not_authorized",
            "op_no_destination",
            "op_no_trust",
            "op_not_authorized",
            "op_line_full",
            "op_no_issuer",
            "op_too_few_offers",
            "op_cross_self",
            "op_over_source_max",
        ],
        K::PathPaymentStrictSend => &[
            "op_malformed",
            "op_underfunded",
            "op_src_no_trust",
            "op_src_not_authorized",
            "op_no_destination",
            "op_no_trust",
            "op_not_authorized",
            "op_line_full",
            "op_no_issuer",
            "op_too_few_offers",
            "op_cross_self",
            "op_under_dest_min",
        ],
        K::ManageSellOffer | K::CreatePassiveSellOffer | K::ManageBuyOffer => &[
            "op_malformed",
            "op_sell_no_trust",
            "op_buy_no_trust",
            "op_sell_not_authorized",
            "op_buy_not_authorized",
            "op_line_full",
            "op_underfunded",
            "op_cross_self",
            "op_sell_no_issuer",
            "op_buy_no_issuer",
            "op_offer_not_found",
            "op_low_reserve",
        ],
        K::SetOptions => &[
            "op_low_reserve",
            "op_too_many_signers",
            "op_bad_flags",
            "op_invalid_inflation",
            "op_cant_change",
            "op_unknown_flag",
            "op_threshold_out_of_range",
            "op_bad_signer",
            "op_invalid_home_domain",
            "op_auth_revocable_required",
        ],
        K::ChangeTrust => &[
            "op_malformed",
            "op_no_issuer",
            "op_invalid_limit",
            "op_low_reserve",
            "op_self_not_allowed",
            "op_trust_line_missing",
            "op_cannot_delete",
            "op_not_aut_maintain_liabilities",
        ],
        K::AccountMerge => &[
            "op_malformed",
            "op_no_account",
            "op_immutable_set",
            "op_has_sub_entries",
            "op_seq_num_too_far",
            "op_dest_full",
            "op_is_sponsor",
        ],
        K::ManageData => &[
            "op_not_supported_yet",
            "op_data_name_not_found",
            "op_low_reserve",
            "op_data_invalid_name",
        ],
        K::CreateClaimableBalance => &[
            "op_malformed",
            "op_low_reserve",
            "op_no_trust",
            "op_not_authorized",
            "op_underfunded",
        ],
        K::ClaimClaimableBalance => &[
            "op_does_not_exist",
            "op_cannot_claim",
            "op_line_full",
            "op_no_trust",
            "op_not_authorized",
        ],
        K::BeginSponsoringFutureReserves => {
            &["op_malformed", "op_already_sponsored", "op_recursive"]
        }
        K::EndSponsoringFutureReserves => &["op_not_sponsored"],
        K::SetTrustLineFlags => &[
            "op_malformed",
            "op_no_trustline",
            "op_cant_revoke",
            "op_invalid_state",
            "op_low_reserve",
        ],
        K::LiquidityPoolDeposit => &[
            "op_malformed",
            "op_no_trust",
            "op_not_authorized",
            "op_underfunded",
            "op_line_full",
            "op_bad_price",
            "op_pool_full",
        ],
        K::LiquidityPoolWithdraw => &[
            "op_malformed",
            "op_no_trust",
            "op_underfunded",
            "op_line_full",
            "op_under_minimum",
        ],
    };
    let index = usize::try_from(code.checked_neg()?).ok()?.checked_sub(1)?;
    table.get(index).copied()
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

/// Who was on the other side of a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Counterparty {
    Offer { seller: Address, offer_id: i64 },
    LiquidityPool { pool_id: PoolId },
}

/// One offer (or pool) crossed while executing a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedOffer {
    pub counterparty: Counterparty,
    /// What the counterparty gave up.
    pub asset_sold: Asset,
    pub amount_sold: Amount,
    pub asset_bought: Asset,
    pub amount_bought: Amount,
}

impl ClaimedOffer {
    /// Id of the crossed offer, `None` for a pool.
    pub fn offer_id(&self) -> Option<i64> {
        match self.counterparty {
            Counterparty::Offer { offer_id, .. } => Some(offer_id),
            Counterparty::LiquidityPool { .. } => None,
        }
    }
}

const CLAIM_ATOM_V0: i32 = 0;
const CLAIM_ATOM_ORDER_BOOK: i32 = 1;
const CLAIM_ATOM_LIQUIDITY_POOL: i32 = 2;

impl Encode for ClaimedOffer {
    fn encode(&self, w: &mut XdrWriter) {
        match &self.counterparty {
            Counterparty::Offer { seller, offer_id } => {
                w.write_i32(CLAIM_ATOM_ORDER_BOOK);
                seller.encode(w);
                w.write_i64(*offer_id);
            }
            Counterparty::LiquidityPool { pool_id } => {
                w.write_i32(CLAIM_ATOM_LIQUIDITY_POOL);
                pool_id.encode(w);
            }
        }
        self.asset_sold.encode(w);
        self.amount_sold.encode(w);
        self.asset_bought.encode(w);
        self.amount_bought.encode(w);
    }
}

impl Decode for ClaimedOffer {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let counterparty = match r.read_i32()? {
            CLAIM_ATOM_V0 => {
                let key = PublicKey::from_bytes(r.read_fixed::<32>()?)
                    .map_err(|e| CodecError::invalid("claim atom", e))?;
                Counterparty::Offer {
                    seller: Address::from_public_key(key),
                    offer_id: r.read_i64()?,
                }
            }
            CLAIM_ATOM_ORDER_BOOK => Counterparty::Offer {
                seller: Address::decode(r)?,
                offer_id: r.read_i64()?,
            },
            CLAIM_ATOM_LIQUIDITY_POOL => Counterparty::LiquidityPool {
                pool_id: PoolId::decode(r)?,
            },
            tag => {
                return Err(CodecError::InvalidTag {
                    type_name: "claim atom",
                    tag,
                })
            }
        };
        Ok(Self {
            counterparty,
            asset_sold: Asset::decode(r)?,
            amount_sold: Amount::decode(r)?,
            asset_bought: Asset::decode(r)?,
            amount_bought: Amount::decode(r)?,
        })
    }
}

/// An offer as it sits on the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferEntry {
    pub seller: Address,
    pub offer_id: i64,
    pub selling: Asset,
    pub buying: Asset,
    pub amount: Amount,
    pub price: Price,
    pub flags: u32,
}

impl Encode for OfferEntry {
    fn encode(&self, w: &mut XdrWriter) {
        self.seller.encode(w);
        w.write_i64(self.offer_id);
        self.selling.encode(w);
        self.buying.encode(w);
        self.amount.encode(w);
        self.price.encode(w);
        w.write_u32(self.flags);
        // ext
        w.write_i32(0);
    }
}

impl Decode for OfferEntry {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let entry = Self {
            seller: Address::decode(r)?,
            offer_id: r.read_i64()?,
            selling: Asset::decode(r)?,
            buying: Asset::decode(r)?,
            amount: Amount::decode(r)?,
            price: Price::decode(r)?,
            flags: r.read_u32()?,
        };
        let ext = r.read_i32()?;
        if ext != 0 {
            return Err(CodecError::InvalidTag {
                type_name: "offer entry ext",
                tag: ext,
            });
        }
        Ok(entry)
    }
}

/// What happened to the submitting account's own offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "offer", rename_all = "snake_case")]
pub enum OfferEffect {
    /// A new offer now rests on the book.
    Created(OfferEntry),
    /// An existing offer was modified and still rests on the book.
    Updated(OfferEntry),
    /// Fully filled, or cancelled; nothing rests.
    Deleted,
}

/// Result of a successful offer operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferOutcome {
    pub claimed: Vec<ClaimedOffer>,
    pub effect: OfferEffect,
}

impl OfferOutcome {
    /// The part of the offer left on the book, if any.
    pub fn resting(&self) -> Option<&OfferEntry> {
        match &self.effect {
            OfferEffect::Created(entry) | OfferEffect::Updated(entry) => Some(entry),
            OfferEffect::Deleted => None,
        }
    }

    /// `true` when the offer crossed at least one counterparty.
    pub fn traded(&self) -> bool {
        !self.claimed.is_empty()
    }
}

impl Encode for OfferOutcome {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_array(&self.claimed);
        match &self.effect {
            OfferEffect::Created(entry) => {
                w.write_i32(0);
                entry.encode(w);
            }
            OfferEffect::Updated(entry) => {
                w.write_i32(1);
                entry.encode(w);
            }
            OfferEffect::Deleted => w.write_i32(2),
        }
    }
}

impl Decode for OfferOutcome {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let claimed = r.read_array("claimed offers", MAX_CLAIM_ATOMS)?;
        let effect = match r.read_i32()? {
            0 => OfferEffect::Created(OfferEntry::decode(r)?),
            1 => OfferEffect::Updated(OfferEntry::decode(r)?),
            2 => OfferEffect::Deleted,
            tag => {
                return Err(CodecError::InvalidTag {
                    type_name: "offer effect",
                    tag,
                })
            }
        };
        Ok(Self { claimed, effect })
    }
}

/// Final leg of a path payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub destination: Address,
    pub asset: Asset,
    pub amount: Amount,
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// Payload attached to an operation's result code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationOutcome {
    None,
    Offer(OfferOutcome),
    PathPayment {
        claimed: Vec<ClaimedOffer>,
        last: PaymentReceipt,
    },
    ClaimableBalanceCreated {
        balance_id: ClaimableBalanceId,
    },
    AccountMerged {
        source_balance: Amount,
    },
    /// Path payment failed because this asset has no issuer.
    NoIssuer {
        asset: Asset,
    },
}

/// Result of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationResult {
    /// The operation ran; `code` is 0 on success.
    Ran {
        kind: OperationKind,
        code: i32,
        outcome: OperationOutcome,
    },
    NotRun { reason: OperationNotRun },
}

impl OperationResult {
    pub fn success(kind: OperationKind, outcome: OperationOutcome) -> Self {
        Self::Ran {
            kind,
            code: 0,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ran { code: 0, .. })
    }

    /// Code name as the query service would report it; `op_unknown` for
    /// codes this client cannot name.
    pub fn code_name(&self) -> &'static str {
        match self {
            Self::Ran { kind, code, .. } => {
                operation_code_name(*kind, *code).unwrap_or("op_unknown")
            }
            Self::NotRun { reason } => reason.name(),
        }
    }

    pub fn outcome(&self) -> Option<&OperationOutcome> {
        match self {
            Self::Ran { outcome, .. } => Some(outcome),
            Self::NotRun { .. } => None,
        }
    }

    /// Shorthand for offer operations.
    pub fn offer(&self) -> Option<&OfferOutcome> {
        match self.outcome() {
            Some(OperationOutcome::Offer(offer)) => Some(offer),
            _ => None,
        }
    }
}

const PATH_PAYMENT_NO_ISSUER: i32 = -9;

impl Encode for OperationResult {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            Self::NotRun { reason } => w.write_i32(reason.code()),
            Self::Ran {
                kind,
                code,
                outcome,
            } => {
                w.write_i32(0);
                w.write_i32(kind.tag());
                w.write_i32(*code);
                match outcome {
                    OperationOutcome::None => {}
                    OperationOutcome::Offer(offer) => offer.encode(w),
                    OperationOutcome::PathPayment { claimed, last } => {
                        w.write_array(claimed);
                        last.destination.encode(w);
                        last.asset.encode(w);
                        last.amount.encode(w);
                    }
                    OperationOutcome::ClaimableBalanceCreated { balance_id } => {
                        balance_id.encode(w)
                    }
                    OperationOutcome::AccountMerged { source_balance } => {
                        source_balance.encode(w)
                    }
                    OperationOutcome::NoIssuer { asset } => asset.encode(w),
                }
            }
        }
    }
}

fn decode_outcome(
    r: &mut XdrReader<'_>,
    kind: OperationKind,
    code: i32,
) -> Result<OperationOutcome, CodecError> {
    use OperationKind as K;
    let path_payment = matches!(kind, K::PathPaymentStrictReceive | K::PathPaymentStrictSend);
    Ok(match code {
        0 if kind.is_offer() => OperationOutcome::Offer(OfferOutcome::decode(r)?),
        0 if path_payment => OperationOutcome::PathPayment {
            claimed: r.read_array("claimed offers", MAX_CLAIM_ATOMS)?,
            last: PaymentReceipt {
                destination: Address::decode(r)?,
                asset: Asset::decode(r)?,
                amount: Amount::decode(r)?,
            },
        },
        0 if kind == K::CreateClaimableBalance => OperationOutcome::ClaimableBalanceCreated {
            balance_id: ClaimableBalanceId::decode(r)?,
        },
        0 if kind == K::AccountMerge => OperationOutcome::AccountMerged {
            source_balance: Amount::decode(r)?,
        },
        PATH_PAYMENT_NO_ISSUER if path_payment => OperationOutcome::NoIssuer {
            asset: Asset::decode(r)?,
        },
        _ => OperationOutcome::None,
    })
}

impl Decode for OperationResult {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let outer = r.read_i32()?;
        if outer != 0 {
            return OperationNotRun::from_code(outer)
                .map(|reason| Self::NotRun { reason })
                .ok_or(CodecError::InvalidTag {
                    type_name: "operation result",
                    tag: outer,
                });
        }
        let tag = r.read_i32()?;
        let kind = OperationKind::from_tag(tag).ok_or(CodecError::InvalidTag {
            type_name: "operation result",
            tag,
        })?;
        let code = r.read_i32()?;
        if operation_code_name(kind, code).is_none() {
            return Err(CodecError::InvalidTag {
                type_name: "operation result code",
                tag: code,
            });
        }
        let outcome = decode_outcome(r, kind, code)?;
        Ok(Self::Ran {
            kind,
            code,
            outcome,
        })
    }
}

// ---------------------------------------------------------------------------
// Transaction results
// ---------------------------------------------------------------------------

/// Result of the inner transaction of a fee bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerTransactionResult {
    /// Hash of the inner transaction, hex.
    pub transaction_hash: String,
    pub fee_charged: i64,
    pub code: TransactionResultCode,
}

/// The decoded `result_xdr` of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub fee_charged: i64,
    pub code: TransactionResultCode,
    /// Per-operation results. For a fee bump these belong to the inner
    /// transaction.
    pub operations: Vec<OperationResult>,
    pub inner: Option<InnerTransactionResult>,
}

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// The code that describes what the operations did: the inner code for
    /// a fee bump, the outer one otherwise.
    pub fn effective_code(&self) -> TransactionResultCode {
        self.inner.as_ref().map_or(self.code, |inner| inner.code)
    }
}

fn decode_operations(
    r: &mut XdrReader<'_>,
    code: TransactionResultCode,
) -> Result<Vec<OperationResult>, CodecError> {
    if code.has_operation_results() {
        r.read_array("operation results", MAX_OPERATIONS)
    } else {
        Ok(Vec::new())
    }
}

fn expect_ext(r: &mut XdrReader<'_>) -> Result<(), CodecError> {
    match r.read_i32()? {
        0 => Ok(()),
        tag => Err(CodecError::InvalidTag {
            type_name: "transaction result ext",
            tag,
        }),
    }
}

impl Encode for TransactionResult {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i64(self.fee_charged);
        self.code.encode(w);
        match &self.inner {
            Some(inner) if self.code.is_fee_bump() => {
                let mut hash = [0u8; 32];
                if let Ok(bytes) = hex::decode(&inner.transaction_hash) {
                    if bytes.len() == 32 {
                        hash.copy_from_slice(&bytes);
                    }
                }
                w.write_fixed(&hash);
                w.write_i64(inner.fee_charged);
                inner.code.encode(w);
                if inner.code.has_operation_results() {
                    w.write_array(&self.operations);
                }
                w.write_i32(0);
            }
            _ if self.code.has_operation_results() => w.write_array(&self.operations),
            _ => {}
        }
        w.write_i32(0);
    }
}

impl Decode for TransactionResult {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let fee_charged = r.read_i64()?;
        let code = TransactionResultCode::decode(r)?;
        let (operations, inner) = if code.is_fee_bump() {
            let transaction_hash = hex::encode(r.read_fixed::<32>()?);
            let inner_fee = r.read_i64()?;
            let inner_code = TransactionResultCode::decode(r)?;
            if inner_code.is_fee_bump() {
                return Err(CodecError::invalid(
                    "inner transaction result",
                    "nested fee bump",
                ));
            }
            let operations = decode_operations(r, inner_code)?;
            expect_ext(r)?;
            (
                operations,
                Some(InnerTransactionResult {
                    transaction_hash,
                    fee_charged: inner_fee,
                    code: inner_code,
                }),
            )
        } else {
            (decode_operations(r, code)?, None)
        };
        expect_ext(r)?;
        Ok(Self {
            fee_charged,
            code,
            operations,
            inner,
        })
    }
}
