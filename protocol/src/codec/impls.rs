//! `Encode` / `Decode` for every ledger entity.
//!
//! Union tags follow the ledger's published numbering and are append-only.
//! Decoding is strict: unknown tags, out-of-range weights and malformed
//! asset codes are errors, never silently mapped to something else.

use crate::account::{SequenceNumber, Signer};
use crate::amount::{Amount, Price};
use crate::asset::{Asset, ChangeTrustAsset, LiquidityPoolParameters, PoolId};
use crate::config::{
    MAX_CLAIMANTS, MAX_DATA_NAME_LENGTH, MAX_DATA_VALUE_LENGTH, MAX_HOME_DOMAIN_LENGTH,
    MAX_MEMO_TEXT_LENGTH, MAX_OPERATIONS, MAX_PATH_LENGTH, MAX_PREDICATE_DEPTH, MAX_SIGNATURES,
};
use crate::crypto::{Address, DecoratedSignature, PublicKey, Signature, SignatureHint};
use crate::operation::{
    ClaimPredicate, ClaimableBalanceId, Claimant, Operation, OperationBody, OperationKind,
    SetOptions,
};
use crate::transaction::envelope::{ENVELOPE_TYPE_TX, ENVELOPE_TYPE_TX_FEE_BUMP};
use crate::transaction::{
    FeeBumpEnvelope, FeeBumpTransaction, Memo, TimeBounds, Transaction, TransactionEnvelope,
    TransactionV1Envelope,
};

use super::xdr::{CodecError, Decode, Encode, XdrReader, XdrWriter};

const KEY_TYPE_ED25519: i32 = 0;

const ASSET_TYPE_NATIVE: i32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: i32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: i32 = 2;
const ASSET_TYPE_POOL_SHARE: i32 = 3;

const LIQUIDITY_POOL_CONSTANT_PRODUCT: i32 = 0;
const CLAIMANT_TYPE_V0: i32 = 0;
const CLAIMABLE_BALANCE_ID_TYPE_V0: i32 = 0;

const PRECOND_NONE: i32 = 0;
const PRECOND_TIME: i32 = 1;

const MEMO_NONE: i32 = 0;
const MEMO_TEXT: i32 = 1;
const MEMO_ID: i32 = 2;
const MEMO_HASH: i32 = 3;
const MEMO_RETURN: i32 = 4;

fn expect_tag(r: &mut XdrReader<'_>, type_name: &'static str, want: i32) -> Result<(), CodecError> {
    let tag = r.read_i32()?;
    if tag != want {
        return Err(CodecError::InvalidTag { type_name, tag });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Keys and signatures
// ---------------------------------------------------------------------------

impl Encode for PublicKey {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(KEY_TYPE_ED25519);
        w.write_fixed(self.as_bytes());
    }
}

impl Decode for PublicKey {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        expect_tag(r, "public key", KEY_TYPE_ED25519)?;
        let bytes = r.read_fixed::<32>()?;
        PublicKey::from_bytes(bytes).map_err(|e| CodecError::invalid("public key", e))
    }
}

impl Encode for Address {
    fn encode(&self, w: &mut XdrWriter) {
        self.public_key().encode(w);
    }
}

impl Decode for Address {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        PublicKey::decode(r).map(Address::from_public_key)
    }
}

impl Encode for DecoratedSignature {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed(&self.hint.0);
        w.write_var_opaque(self.signature.as_bytes());
    }
}

impl Decode for DecoratedSignature {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let hint = SignatureHint(r.read_fixed::<4>()?);
        let signature = Signature::from_vec(r.read_var_opaque("signature", 64)?);
        Ok(Self { hint, signature })
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

impl Encode for Amount {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i64(self.stroops());
    }
}

impl Decode for Amount {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        r.read_i64().map(Amount::from_stroops)
    }
}

impl Encode for Price {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.n);
        w.write_i32(self.d);
    }
}

impl Decode for Price {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            n: r.read_i32()?,
            d: r.read_i32()?,
        })
    }
}

impl Encode for SequenceNumber {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i64(self.value());
    }
}

impl Decode for SequenceNumber {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        r.read_i64().map(SequenceNumber)
    }
}

fn read_weight(r: &mut XdrReader<'_>, type_name: &'static str) -> Result<u8, CodecError> {
    let raw = r.read_u32()?;
    u8::try_from(raw).map_err(|_| CodecError::invalid(type_name, format!("{} exceeds 255", raw)))
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

fn write_code(w: &mut XdrWriter, code: &str, width: usize) {
    let mut buf = vec![0u8; width];
    let len = code.len().min(width);
    buf[..len].copy_from_slice(&code.as_bytes()[..len]);
    w.write_fixed(&buf);
}

fn parse_code(raw: &[u8], min: usize, max: usize) -> Result<String, CodecError> {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let code = &raw[..end];
    if code.len() < min || code.len() > max || !code.iter().all(u8::is_ascii_alphanumeric) {
        return Err(CodecError::invalid(
            "asset code",
            format!("{:?}", String::from_utf8_lossy(raw)),
        ));
    }
    String::from_utf8(code.to_vec()).map_err(|_| CodecError::InvalidUtf8)
}

impl Encode for Asset {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            Asset::Native => w.write_i32(ASSET_TYPE_NATIVE),
            Asset::CreditAlphanum4 { code, issuer } => {
                w.write_i32(ASSET_TYPE_CREDIT_ALPHANUM4);
                write_code(w, code, 4);
                issuer.encode(w);
            }
            Asset::CreditAlphanum12 { code, issuer } => {
                w.write_i32(ASSET_TYPE_CREDIT_ALPHANUM12);
                write_code(w, code, 12);
                issuer.encode(w);
            }
        }
    }
}

fn decode_asset_arm(r: &mut XdrReader<'_>, tag: i32) -> Result<Asset, CodecError> {
    match tag {
        ASSET_TYPE_NATIVE => Ok(Asset::Native),
        ASSET_TYPE_CREDIT_ALPHANUM4 => {
            let code = parse_code(&r.read_fixed::<4>()?, 1, 4)?;
            Ok(Asset::CreditAlphanum4 {
                code,
                issuer: Address::decode(r)?,
            })
        }
        ASSET_TYPE_CREDIT_ALPHANUM12 => {
            let code = parse_code(&r.read_fixed::<12>()?, 5, 12)?;
            Ok(Asset::CreditAlphanum12 {
                code,
                issuer: Address::decode(r)?,
            })
        }
        tag => Err(CodecError::InvalidTag {
            type_name: "asset",
            tag,
        }),
    }
}

impl Decode for Asset {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let tag = r.read_i32()?;
        decode_asset_arm(r, tag)
    }
}

impl Encode for LiquidityPoolParameters {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(LIQUIDITY_POOL_CONSTANT_PRODUCT);
        self.asset_a.encode(w);
        self.asset_b.encode(w);
        w.write_i32(self.fee);
    }
}

impl Decode for LiquidityPoolParameters {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        expect_tag(r, "liquidity pool type", LIQUIDITY_POOL_CONSTANT_PRODUCT)?;
        let asset_a = Asset::decode(r)?;
        let asset_b = Asset::decode(r)?;
        let fee = r.read_i32()?;
        if asset_a >= asset_b {
            return Err(CodecError::invalid(
                "liquidity pool parameters",
                "assets not in canonical order",
            ));
        }
        Ok(Self {
            asset_a,
            asset_b,
            fee,
        })
    }
}

impl Encode for PoolId {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed(&self.0);
    }
}

impl Decode for PoolId {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        r.read_fixed::<32>().map(PoolId)
    }
}

impl Encode for ChangeTrustAsset {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ChangeTrustAsset::Asset(asset) => asset.encode(w),
            ChangeTrustAsset::Pool(params) => {
                w.write_i32(ASSET_TYPE_POOL_SHARE);
                params.encode(w);
            }
        }
    }
}

impl Decode for ChangeTrustAsset {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        match r.read_i32()? {
            ASSET_TYPE_POOL_SHARE => LiquidityPoolParameters::decode(r).map(Self::Pool),
            tag => decode_asset_arm(r, tag).map(Self::Asset),
        }
    }
}

// ---------------------------------------------------------------------------
// Claimable balances
// ---------------------------------------------------------------------------

impl Encode for ClaimableBalanceId {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(CLAIMABLE_BALANCE_ID_TYPE_V0);
        w.write_fixed(&self.0);
    }
}

impl Decode for ClaimableBalanceId {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        expect_tag(r, "claimable balance id", CLAIMABLE_BALANCE_ID_TYPE_V0)?;
        r.read_fixed::<32>().map(Self)
    }
}

impl Encode for ClaimPredicate {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ClaimPredicate::Unconditional => w.write_i32(0),
            ClaimPredicate::And(a, b) => {
                w.write_i32(1);
                w.write_u32(2);
                a.encode(w);
                b.encode(w);
            }
            ClaimPredicate::Or(a, b) => {
                w.write_i32(2);
                w.write_u32(2);
                a.encode(w);
                b.encode(w);
            }
            ClaimPredicate::Not(inner) => {
                w.write_i32(3);
                w.write_u32(1);
                inner.encode(w);
            }
            ClaimPredicate::BeforeAbsoluteTime(t) => {
                w.write_i32(4);
                w.write_i64(*t);
            }
            ClaimPredicate::BeforeRelativeTime(t) => {
                w.write_i32(5);
                w.write_i64(*t);
            }
        }
    }
}

fn decode_predicate(r: &mut XdrReader<'_>, depth: usize) -> Result<ClaimPredicate, CodecError> {
    if depth > MAX_PREDICATE_DEPTH {
        return Err(CodecError::invalid("claim predicate", "nested too deeply"));
    }
    let pair = |r: &mut XdrReader<'_>| -> Result<(ClaimPredicate, ClaimPredicate), CodecError> {
        let len = r.read_u32()? as usize;
        if len != 2 {
            return Err(CodecError::invalid(
                "claim predicate",
                format!("expected 2 operands, found {}", len),
            ));
        }
        Ok((decode_predicate(r, depth + 1)?, decode_predicate(r, depth + 1)?))
    };
    match r.read_i32()? {
        0 => Ok(ClaimPredicate::Unconditional),
        1 => pair(r).map(|(a, b)| ClaimPredicate::and(a, b)),
        2 => pair(r).map(|(a, b)| ClaimPredicate::or(a, b)),
        3 => {
            if !r.read_bool()? {
                return Err(CodecError::invalid("claim predicate", "empty not"));
            }
            decode_predicate(r, depth + 1).map(ClaimPredicate::not)
        }
        4 => r.read_i64().map(ClaimPredicate::BeforeAbsoluteTime),
        5 => r.read_i64().map(ClaimPredicate::BeforeRelativeTime),
        tag => Err(CodecError::InvalidTag {
            type_name: "claim predicate",
            tag,
        }),
    }
}

impl Decode for ClaimPredicate {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        decode_predicate(r, 1)
    }
}

impl Encode for Claimant {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(CLAIMANT_TYPE_V0);
        self.destination.encode(w);
        self.predicate.encode(w);
    }
}

impl Decode for Claimant {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        expect_tag(r, "claimant", CLAIMANT_TYPE_V0)?;
        Ok(Self {
            destination: Address::decode(r)?,
            predicate: ClaimPredicate::decode(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl Encode for Signer {
    fn encode(&self, w: &mut XdrWriter) {
        self.key.encode(w);
        w.write_u32(u32::from(self.weight));
    }
}

impl Decode for Signer {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            key: Address::decode(r)?,
            weight: read_weight(r, "signer weight")?,
        })
    }
}

fn write_opt_weight(w: &mut XdrWriter, value: Option<u8>) {
    w.write_option(&value.map(u32::from));
}

fn read_opt_weight(r: &mut XdrReader<'_>, type_name: &'static str) -> Result<Option<u8>, CodecError> {
    if r.read_bool()? {
        read_weight(r, type_name).map(Some)
    } else {
        Ok(None)
    }
}

impl Encode for SetOptions {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_option(&self.inflation_dest);
        w.write_option(&self.clear_flags);
        w.write_option(&self.set_flags);
        write_opt_weight(w, self.master_weight);
        write_opt_weight(w, self.low_threshold);
        write_opt_weight(w, self.med_threshold);
        write_opt_weight(w, self.high_threshold);
        match &self.home_domain {
            Some(domain) => {
                w.write_u32(1);
                w.write_string(domain);
            }
            None => w.write_u32(0),
        }
        w.write_option(&self.signer);
    }
}

impl Decode for SetOptions {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            inflation_dest: r.read_option()?,
            clear_flags: r.read_option()?,
            set_flags: r.read_option()?,
            master_weight: read_opt_weight(r, "master weight")?,
            low_threshold: read_opt_weight(r, "low threshold")?,
            med_threshold: read_opt_weight(r, "medium threshold")?,
            high_threshold: read_opt_weight(r, "high threshold")?,
            home_domain: if r.read_bool()? {
                Some(r.read_string("home domain", MAX_HOME_DOMAIN_LENGTH)?)
            } else {
                None
            },
            signer: r.read_option()?,
        })
    }
}

impl Encode for OperationBody {
    fn encode(&self, w: &mut XdrWriter) {
        use OperationBody as B;
        w.write_i32(self.kind().tag());
        match self {
            B::CreateAccount {
                destination,
                starting_balance,
            } => {
                destination.encode(w);
                starting_balance.encode(w);
            }
            B::Payment {
                destination,
                asset,
                amount,
            } => {
                destination.encode(w);
                asset.encode(w);
                amount.encode(w);
            }
            B::PathPaymentStrictReceive {
                send_asset,
                send_max,
                destination,
                dest_asset,
                dest_amount,
                path,
            } => {
                send_asset.encode(w);
                send_max.encode(w);
                destination.encode(w);
                dest_asset.encode(w);
                dest_amount.encode(w);
                w.write_array(path);
            }
            B::ManageSellOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            } => {
                selling.encode(w);
                buying.encode(w);
                amount.encode(w);
                price.encode(w);
                w.write_i64(*offer_id);
            }
            B::CreatePassiveSellOffer {
                selling,
                buying,
                amount,
                price,
            } => {
                selling.encode(w);
                buying.encode(w);
                amount.encode(w);
                price.encode(w);
            }
            B::SetOptions(opts) => opts.encode(w),
            B::ChangeTrust { line, limit } => {
                line.encode(w);
                limit.encode(w);
            }
            B::AccountMerge { destination } => destination.encode(w),
            B::ManageData { name, value } => {
                w.write_string(name);
                match value {
                    Some(v) => {
                        w.write_u32(1);
                        w.write_var_opaque(v);
                    }
                    None => w.write_u32(0),
                }
            }
            B::ManageBuyOffer {
                selling,
                buying,
                buy_amount,
                price,
                offer_id,
            } => {
                selling.encode(w);
                buying.encode(w);
                buy_amount.encode(w);
                price.encode(w);
                w.write_i64(*offer_id);
            }
            B::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                path,
            } => {
                send_asset.encode(w);
                send_amount.encode(w);
                destination.encode(w);
                dest_asset.encode(w);
                dest_min.encode(w);
                w.write_array(path);
            }
            B::CreateClaimableBalance {
                asset,
                amount,
                claimants,
            } => {
                asset.encode(w);
                amount.encode(w);
                w.write_array(claimants);
            }
            B::ClaimClaimableBalance { balance_id } => balance_id.encode(w),
            B::BeginSponsoringFutureReserves { sponsored_id } => sponsored_id.encode(w),
            B::EndSponsoringFutureReserves => {}
            B::SetTrustLineFlags {
                trustor,
                asset,
                clear_flags,
                set_flags,
            } => {
                trustor.encode(w);
                asset.encode(w);
                w.write_u32(*clear_flags);
                w.write_u32(*set_flags);
            }
            B::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price,
                max_price,
            } => {
                pool_id.encode(w);
                max_amount_a.encode(w);
                max_amount_b.encode(w);
                min_price.encode(w);
                max_price.encode(w);
            }
            B::LiquidityPoolWithdraw {
                pool_id,
                amount,
                min_amount_a,
                min_amount_b,
            } => {
                pool_id.encode(w);
                amount.encode(w);
                min_amount_a.encode(w);
                min_amount_b.encode(w);
            }
        }
    }
}

impl Decode for OperationBody {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        use OperationBody as B;
        let tag = r.read_i32()?;
        let kind = OperationKind::from_tag(tag).ok_or(CodecError::InvalidTag {
            type_name: "operation",
            tag,
        })?;
        Ok(match kind {
            OperationKind::CreateAccount => B::CreateAccount {
                destination: Address::decode(r)?,
                starting_balance: Amount::decode(r)?,
            },
            OperationKind::Payment => B::Payment {
                destination: Address::decode(r)?,
                asset: Asset::decode(r)?,
                amount: Amount::decode(r)?,
            },
            OperationKind::PathPaymentStrictReceive => B::PathPaymentStrictReceive {
                send_asset: Asset::decode(r)?,
                send_max: Amount::decode(r)?,
                destination: Address::decode(r)?,
                dest_asset: Asset::decode(r)?,
                dest_amount: Amount::decode(r)?,
                path: r.read_array("path", MAX_PATH_LENGTH)?,
            },
            OperationKind::ManageSellOffer => B::ManageSellOffer {
                selling: Asset::decode(r)?,
                buying: Asset::decode(r)?,
                amount: Amount::decode(r)?,
                price: Price::decode(r)?,
                offer_id: r.read_i64()?,
            },
            OperationKind::CreatePassiveSellOffer => B::CreatePassiveSellOffer {
                selling: Asset::decode(r)?,
                buying: Asset::decode(r)?,
                amount: Amount::decode(r)?,
                price: Price::decode(r)?,
            },
            OperationKind::SetOptions => B::SetOptions(SetOptions::decode(r)?),
            OperationKind::ChangeTrust => B::ChangeTrust {
                line: ChangeTrustAsset::decode(r)?,
                limit: Amount::decode(r)?,
            },
            OperationKind::AccountMerge => B::AccountMerge {
                destination: Address::decode(r)?,
            },
            OperationKind::ManageData => B::ManageData {
                name: r.read_string("data name", MAX_DATA_NAME_LENGTH)?,
                value: if r.read_bool()? {
                    Some(r.read_var_opaque("data value", MAX_DATA_VALUE_LENGTH)?)
                } else {
                    None
                },
            },
            OperationKind::ManageBuyOffer => B::ManageBuyOffer {
                selling: Asset::decode(r)?,
                buying: Asset::decode(r)?,
                buy_amount: Amount::decode(r)?,
                price: Price::decode(r)?,
                offer_id: r.read_i64()?,
            },
            OperationKind::PathPaymentStrictSend => B::PathPaymentStrictSend {
                send_asset: Asset::decode(r)?,
                send_amount: Amount::decode(r)?,
                destination: Address::decode(r)?,
                dest_asset: Asset::decode(r)?,
                dest_min: Amount::decode(r)?,
                path: r.read_array("path", MAX_PATH_LENGTH)?,
            },
            OperationKind::CreateClaimableBalance => B::CreateClaimableBalance {
                asset: Asset::decode(r)?,
                amount: Amount::decode(r)?,
                claimants: r.read_array("claimants", MAX_CLAIMANTS)?,
            },
            OperationKind::ClaimClaimableBalance => B::ClaimClaimableBalance {
                balance_id: ClaimableBalanceId::decode(r)?,
            },
            OperationKind::BeginSponsoringFutureReserves => B::BeginSponsoringFutureReserves {
                sponsored_id: Address::decode(r)?,
            },
            OperationKind::EndSponsoringFutureReserves => B::EndSponsoringFutureReserves,
            OperationKind::SetTrustLineFlags => B::SetTrustLineFlags {
                trustor: Address::decode(r)?,
                asset: Asset::decode(r)?,
                clear_flags: r.read_u32()?,
                set_flags: r.read_u32()?,
            },
            OperationKind::LiquidityPoolDeposit => B::LiquidityPoolDeposit {
                pool_id: PoolId::decode(r)?,
                max_amount_a: Amount::decode(r)?,
                max_amount_b: Amount::decode(r)?,
                min_price: Price::decode(r)?,
                max_price: Price::decode(r)?,
            },
            OperationKind::LiquidityPoolWithdraw => B::LiquidityPoolWithdraw {
                pool_id: PoolId::decode(r)?,
                amount: Amount::decode(r)?,
                min_amount_a: Amount::decode(r)?,
                min_amount_b: Amount::decode(r)?,
            },
        })
    }
}

impl Encode for Operation {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_option(&self.source);
        self.body.encode(w);
    }
}

impl Decode for Operation {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            source: r.read_option()?,
            body: OperationBody::decode(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

impl Encode for TimeBounds {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_u64(self.min_time);
        w.write_u64(self.max_time);
    }
}

impl Decode for TimeBounds {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            min_time: r.read_u64()?,
            max_time: r.read_u64()?,
        })
    }
}

impl Encode for Memo {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            Memo::None => w.write_i32(MEMO_NONE),
            Memo::Text(text) => {
                w.write_i32(MEMO_TEXT);
                w.write_string(text);
            }
            Memo::Id(id) => {
                w.write_i32(MEMO_ID);
                w.write_u64(*id);
            }
            Memo::Hash(hash) => {
                w.write_i32(MEMO_HASH);
                w.write_fixed(hash);
            }
            Memo::Return(hash) => {
                w.write_i32(MEMO_RETURN);
                w.write_fixed(hash);
            }
        }
    }
}

impl Decode for Memo {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        match r.read_i32()? {
            MEMO_NONE => Ok(Memo::None),
            MEMO_TEXT => r.read_string("memo text", MAX_MEMO_TEXT_LENGTH).map(Memo::Text),
            MEMO_ID => r.read_u64().map(Memo::Id),
            MEMO_HASH => r.read_fixed::<32>().map(Memo::Hash),
            MEMO_RETURN => r.read_fixed::<32>().map(Memo::Return),
            tag => Err(CodecError::InvalidTag {
                type_name: "memo",
                tag,
            }),
        }
    }
}

impl Encode for Transaction {
    fn encode(&self, w: &mut XdrWriter) {
        self.source.encode(w);
        w.write_u32(self.fee);
        self.sequence.encode(w);
        match &self.time_bounds {
            Some(bounds) => {
                w.write_i32(PRECOND_TIME);
                bounds.encode(w);
            }
            None => w.write_i32(PRECOND_NONE),
        }
        self.memo.encode(w);
        w.write_array(&self.operations);
        // ext
        w.write_i32(0);
    }
}

impl Decode for Transaction {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let source = Address::decode(r)?;
        let fee = r.read_u32()?;
        let sequence = SequenceNumber::decode(r)?;
        let time_bounds = match r.read_i32()? {
            PRECOND_NONE => None,
            PRECOND_TIME => Some(TimeBounds::decode(r)?),
            tag => {
                return Err(CodecError::InvalidTag {
                    type_name: "preconditions",
                    tag,
                })
            }
        };
        let memo = Memo::decode(r)?;
        let operations = r.read_array("operations", MAX_OPERATIONS)?;
        expect_tag(r, "transaction ext", 0)?;
        Ok(Self {
            source,
            fee,
            sequence,
            time_bounds,
            memo,
            operations,
        })
    }
}

impl Encode for TransactionV1Envelope {
    fn encode(&self, w: &mut XdrWriter) {
        self.tx.encode(w);
        w.write_array(&self.signatures);
    }
}

impl Decode for TransactionV1Envelope {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            tx: Transaction::decode(r)?,
            signatures: r.read_array("signatures", MAX_SIGNATURES)?,
        })
    }
}

impl Encode for FeeBumpTransaction {
    fn encode(&self, w: &mut XdrWriter) {
        self.fee_source.encode(w);
        w.write_i64(self.fee);
        w.write_i32(ENVELOPE_TYPE_TX);
        self.inner.encode(w);
        // ext
        w.write_i32(0);
    }
}

impl Decode for FeeBumpTransaction {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        let fee_source = Address::decode(r)?;
        let fee = r.read_i64()?;
        expect_tag(r, "fee bump inner transaction", ENVELOPE_TYPE_TX)?;
        let inner = TransactionV1Envelope::decode(r)?;
        expect_tag(r, "fee bump ext", 0)?;
        Ok(Self {
            fee_source,
            fee,
            inner,
        })
    }
}

impl Encode for FeeBumpEnvelope {
    fn encode(&self, w: &mut XdrWriter) {
        self.tx.encode(w);
        w.write_array(&self.signatures);
    }
}

impl Decode for FeeBumpEnvelope {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            tx: FeeBumpTransaction::decode(r)?,
            signatures: r.read_array("signatures", MAX_SIGNATURES)?,
        })
    }
}

impl Encode for TransactionEnvelope {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.envelope_type());
        match self {
            TransactionEnvelope::Transaction(env) => env.encode(w),
            TransactionEnvelope::FeeBump(env) => env.encode(w),
        }
    }
}

impl Decode for TransactionEnvelope {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        match r.read_i32()? {
            ENVELOPE_TYPE_TX => TransactionV1Envelope::decode(r).map(Self::Transaction),
            ENVELOPE_TYPE_TX_FEE_BUMP => FeeBumpEnvelope::decode(r).map(Self::FeeBump),
            tag => Err(CodecError::InvalidTag {
                type_name: "envelope",
                tag,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountState;
    use crate::crypto::KeyPair;
    use crate::operation::{OperationBuilder, TrustLineFlagChanges};
    use crate::transaction::TransactionAssembler;
    use proptest::prelude::*;

    fn addr(seed: u8) -> Address {
        KeyPair::from_seed_bytes(&[seed; 32]).address()
    }

    fn usd() -> Asset {
        Asset::credit("USD", addr(7)).unwrap()
    }

    fn long_asset() -> Asset {
        Asset::credit("LONGCODE", addr(8)).unwrap()
    }

    fn every_kind() -> Vec<Operation> {
        let pool = LiquidityPoolParameters::new(Asset::Native, usd()).unwrap();
        vec![
            OperationBuilder::create_account(addr(2), "10").unwrap(),
            OperationBuilder::payment(addr(2), usd(), "1.5").unwrap(),
            OperationBuilder::path_payment_strict_receive(
                Asset::Native,
                "20",
                addr(2),
                usd(),
                "5",
                vec![long_asset()],
            )
            .unwrap(),
            OperationBuilder::manage_sell_offer(Asset::Native, usd(), "10", "0.25", 0).unwrap(),
            OperationBuilder::create_passive_sell_offer(usd(), Asset::Native, "3", "4").unwrap(),
            OperationBuilder::set_options()
                .inflation_dest(addr(3))
                .set_flags(1)
                .master_weight(0)
                .thresholds(1, 2, 3)
                .home_domain("example.com")
                .signer(addr(4), 2)
                .build()
                .unwrap(),
            OperationBuilder::change_trust(pool.clone(), None).unwrap(),
            OperationBuilder::account_merge(addr(5)).unwrap(),
            OperationBuilder::manage_data("config", Some(b"on")).unwrap(),
            OperationBuilder::manage_data("config", None).unwrap(),
            OperationBuilder::manage_buy_offer(usd(), Asset::Native, "7", "1.5", 12).unwrap(),
            OperationBuilder::path_payment_strict_send(
                usd(),
                "5",
                addr(2),
                Asset::Native,
                "1",
                vec![],
            )
            .unwrap(),
            OperationBuilder::create_claimable_balance(
                usd(),
                "4",
                vec![Claimant {
                    destination: addr(6),
                    predicate: ClaimPredicate::or(
                        ClaimPredicate::BeforeRelativeTime(3600),
                        ClaimPredicate::not(ClaimPredicate::BeforeAbsoluteTime(1_700_000_000)),
                    ),
                }],
            )
            .unwrap(),
            OperationBuilder::claim_claimable_balance(ClaimableBalanceId([9u8; 32])).unwrap(),
            OperationBuilder::begin_sponsoring_future_reserves(addr(6)).unwrap(),
            OperationBuilder::end_sponsoring_future_reserves(addr(6)),
            OperationBuilder::set_trustline_flags(
                addr(6),
                usd(),
                TrustLineFlagChanges::default().authorized(true),
            )
            .unwrap(),
            OperationBuilder::liquidity_pool_deposit(pool.pool_id(), "10", "20", "0.5", "2")
                .unwrap(),
            OperationBuilder::liquidity_pool_withdraw(pool.pool_id(), "1", "0", "0").unwrap(),
        ]
    }

    fn transaction() -> Transaction {
        TransactionAssembler::new(&AccountState::new(addr(1), 99))
            .add_operations(every_kind())
            .unwrap()
            .memo(Memo::text("round trip").unwrap())
            .build_at(1_000)
            .unwrap()
    }

    #[test]
    fn every_operation_kind_round_trips() {
        let tx = transaction();
        let kinds: std::collections::BTreeSet<i32> =
            tx.operations.iter().map(|op| op.kind().tag()).collect();
        assert_eq!(kinds.len(), 18);
        assert_eq!(Transaction::from_xdr(&tx.to_xdr()).unwrap(), tx);
    }

    #[test]
    fn envelope_round_trips_with_signatures() {
        let kp = KeyPair::from_seed_bytes(&[1u8; 32]);
        let mut env = TransactionV1Envelope::unsigned(transaction());
        env.signatures.push(kp.sign_decorated(b"payload").unwrap());
        let env = TransactionEnvelope::Transaction(env);
        assert_eq!(TransactionEnvelope::from_base64(&env.to_base64()).unwrap(), env);
    }

    #[test]
    fn fee_bump_carries_inner_bytes() {
        let inner = TransactionV1Envelope::unsigned(transaction());
        let inner_bytes = inner.to_xdr();
        let bump = FeeBumpTransaction::new(inner.into(), addr(9), 1_000_000)
            .unwrap()
            .into_envelope();
        let bytes = bump.to_xdr();
        // envelope tag, fee source, fee, inner tag
        let offset = 4 + 36 + 8 + 4;
        assert_eq!(&bytes[offset..offset + inner_bytes.len()], inner_bytes.as_slice());
        assert_eq!(TransactionEnvelope::from_xdr(&bytes).unwrap(), bump);
    }

    #[test]
    fn asset_code_layout() {
        let bytes = usd().to_xdr();
        assert_eq!(&bytes[..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..8], b"USD\0");
        assert_eq!(bytes.len(), 4 + 4 + 36);

        let bytes = long_asset().to_xdr();
        assert_eq!(&bytes[..4], &[0, 0, 0, 2]);
        assert_eq!(&bytes[4..16], b"LONGCODE\0\0\0\0");
    }

    #[test]
    fn short_code_in_long_arm_is_rejected() {
        let mut w = XdrWriter::new();
        w.write_i32(ASSET_TYPE_CREDIT_ALPHANUM12);
        w.write_fixed(b"USD\0\0\0\0\0\0\0\0\0");
        addr(7).encode(&mut w);
        assert!(matches!(
            Asset::from_xdr(&w.into_bytes()),
            Err(CodecError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(
            TransactionEnvelope::from_xdr(&[0, 0, 0, 0]),
            Err(CodecError::InvalidTag {
                type_name: "envelope",
                tag: 0
            })
        );
        assert_eq!(
            Memo::from_xdr(&[0, 0, 0, 9]),
            Err(CodecError::InvalidTag {
                type_name: "memo",
                tag: 9
            })
        );
        let mut w = XdrWriter::new();
        w.write_u32(0);
        w.write_i32(7);
        assert!(matches!(
            Operation::from_xdr(&w.into_bytes()),
            Err(CodecError::InvalidTag { tag: 7, .. })
        ));
    }

    #[test]
    fn weights_above_255_are_rejected() {
        let mut w = XdrWriter::new();
        addr(4).encode(&mut w);
        w.write_u32(256);
        assert!(matches!(
            Signer::from_xdr(&w.into_bytes()),
            Err(CodecError::InvalidValue { .. })
        ));
    }

    #[test]
    fn deep_predicates_are_rejected() {
        let mut predicate = ClaimPredicate::Unconditional;
        for _ in 0..MAX_PREDICATE_DEPTH {
            predicate = ClaimPredicate::not(predicate);
        }
        assert!(matches!(
            ClaimPredicate::from_xdr(&predicate.to_xdr()),
            Err(CodecError::InvalidValue { .. })
        ));
    }

    #[test]
    fn truncated_envelope_fails() {
        let env = TransactionEnvelope::from(TransactionV1Envelope::unsigned(transaction()));
        let bytes = env.to_xdr();
        assert!(matches!(
            TransactionEnvelope::from_xdr(&bytes[..bytes.len() - 3]),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    proptest! {
        #[test]
        fn memo_text_round_trips(text in "[ -~]{0,28}") {
            let memo = Memo::Text(text);
            prop_assert_eq!(Memo::from_xdr(&memo.to_xdr()).unwrap(), memo);
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = TransactionEnvelope::from_xdr(&bytes);
        }
    }
}
