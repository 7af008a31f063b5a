//! # Account State
//!
//! A read-only snapshot of an account as the ledger reported it: sequence
//! number, signers and their weights, thresholds, balances and data
//! entries. Snapshots are plain values. Nothing in this crate mutates one in
//! place; advancing the sequence after a submitted transaction produces a
//! new snapshot via [`AccountState::increment_sequence`].
//!
//! The ledger API returns accounts as JSON. The `Horizon*` records at the
//! bottom of this file mirror that shape and convert into the typed
//! snapshot.

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::asset::{Asset, PoolId};
use crate::crypto::Address;
use crate::error::ValidationError;
use crate::operation::{ClaimPredicate, ClaimableBalanceId, Claimant, ThresholdClass};

// ---------------------------------------------------------------------------
// SequenceNumber
// ---------------------------------------------------------------------------

/// An account's sequence number. The next valid transaction uses `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceNumber(pub i64);

impl SequenceNumber {
    pub fn value(self) -> i64 {
        self.0
    }

    pub fn next(self) -> Result<Self, ValidationError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(ValidationError::SequenceOverflow(self.0))
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Signers and thresholds
// ---------------------------------------------------------------------------

/// An additional Ed25519 signer on an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signer {
    pub key: Address,
    /// 0 removes the signer when used in a set-options operation.
    pub weight: u8,
}

/// The weights an account demands for each threshold class, plus the weight
/// of its own master key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Thresholds {
    pub master_weight: u8,
    pub low: u8,
    pub medium: u8,
    pub high: u8,
}

impl Thresholds {
    /// The threshold for a class, as configured (possibly 0).
    pub fn for_class(&self, class: ThresholdClass) -> u8 {
        match class {
            ThresholdClass::Low => self.low,
            ThresholdClass::Medium => self.medium,
            ThresholdClass::High => self.high,
        }
    }

    /// The weight actually needed. A zero threshold still needs one valid
    /// signature.
    pub fn required_weight(&self, class: ThresholdClass) -> u32 {
        u32::from(self.for_class(class)).max(1)
    }
}

impl Default for Thresholds {
    /// A freshly created account: master key weight 1, all thresholds 0.
    fn default() -> Self {
        Self {
            master_weight: 1,
            low: 0,
            medium: 0,
            high: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// What a balance line is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceAsset {
    Asset(Asset),
    PoolShare(PoolId),
}

/// One balance line. `limit` is `None` for the native balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: BalanceAsset,
    pub amount: Amount,
    pub limit: Option<Amount>,
    /// Trustline authorization flag. Always `true` for native.
    pub authorized: bool,
}

// ---------------------------------------------------------------------------
// AccountState
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of an on-chain account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: Address,
    pub sequence: SequenceNumber,
    /// Additional signers, in the order the ledger lists them. The master
    /// key is not in this list; its weight lives in `thresholds`.
    pub signers: Vec<Signer>,
    pub thresholds: Thresholds,
    pub balances: Vec<Balance>,
    pub data: BTreeMap<String, Vec<u8>>,
}

impl AccountState {
    /// A snapshot with only a master key and no balances.
    ///
    /// Handy for offline assembly and for evaluating accounts whose real
    /// state was never fetched.
    pub fn new(address: Address, sequence: i64) -> Self {
        Self {
            address,
            sequence: SequenceNumber(sequence),
            signers: Vec::new(),
            thresholds: Thresholds::default(),
            balances: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    /// The same account with its sequence advanced by one.
    pub fn increment_sequence(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            sequence: self.sequence.next()?,
            ..self.clone()
        })
    }

    /// Every key that can sign for this account with its weight, master key
    /// first. Zero-weight entries are left out.
    pub fn weighted_signers(&self) -> Vec<(Address, u8)> {
        let mut out = Vec::with_capacity(self.signers.len() + 1);
        if self.thresholds.master_weight > 0 {
            out.push((self.address, self.thresholds.master_weight));
        }
        for signer in &self.signers {
            if signer.weight > 0 && signer.key != self.address {
                out.push((signer.key, signer.weight));
            }
        }
        out
    }

    /// The weight `key` carries on this account (0 if it is not a signer).
    pub fn signer_weight(&self, key: &Address) -> u8 {
        self.weighted_signers()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, w)| w)
            .unwrap_or(0)
    }

    pub fn balance(&self, asset: &Asset) -> Option<&Balance> {
        self.balances
            .iter()
            .find(|b| matches!(&b.asset, BalanceAsset::Asset(a) if a == asset))
    }

    pub fn native_balance(&self) -> Amount {
        self.balance(&Asset::Native)
            .map(|b| b.amount)
            .unwrap_or(Amount::ZERO)
    }

    pub fn has_trustline(&self, asset: &Asset) -> bool {
        !asset.is_native() && self.balance(asset).is_some()
    }
}

// ---------------------------------------------------------------------------
// Claimable balances
// ---------------------------------------------------------------------------

/// A claimable balance as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimableBalanceEntry {
    pub id: ClaimableBalanceId,
    pub asset: Asset,
    pub amount: Amount,
    pub sponsor: Option<Address>,
    pub claimants: Vec<Claimant>,
}

impl ClaimableBalanceEntry {
    pub fn claimant(&self, address: &Address) -> Option<&Claimant> {
        self.claimants.iter().find(|c| &c.destination == address)
    }
}

// ---------------------------------------------------------------------------
// Ledger API records
// ---------------------------------------------------------------------------

/// `GET /accounts/{id}` response body (the fields this crate reads).
#[derive(Debug, Clone, Deserialize)]
pub struct HorizonAccount {
    pub account_id: String,
    pub sequence: String,
    #[serde(default)]
    pub thresholds: HorizonThresholds,
    #[serde(default)]
    pub balances: Vec<HorizonBalance>,
    #[serde(default)]
    pub signers: Vec<HorizonSigner>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HorizonThresholds {
    #[serde(default)]
    pub low_threshold: u8,
    #[serde(default)]
    pub med_threshold: u8,
    #[serde(default)]
    pub high_threshold: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorizonBalance {
    pub balance: String,
    pub asset_type: String,
    pub asset_code: Option<String>,
    pub asset_issuer: Option<String>,
    pub liquidity_pool_id: Option<String>,
    pub limit: Option<String>,
    pub is_authorized: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorizonSigner {
    pub key: String,
    pub weight: u8,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Why a ledger API record could not become a typed value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected {field} in ledger API record: {value:?}")]
pub struct RecordError {
    pub field: &'static str,
    pub value: String,
}

impl RecordError {
    fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

fn parse_address(field: &'static str, raw: &str) -> Result<Address, RecordError> {
    raw.parse().map_err(|_| RecordError::new(field, raw))
}

fn parse_amount(field: &'static str, raw: &str) -> Result<Amount, RecordError> {
    Amount::parse(raw).map_err(|_| RecordError::new(field, raw))
}

fn parse_credit(
    code: Option<&String>,
    issuer: Option<&String>,
) -> Result<Asset, RecordError> {
    let code = code.ok_or_else(|| RecordError::new("asset_code", ""))?;
    let issuer = issuer.ok_or_else(|| RecordError::new("asset_issuer", ""))?;
    Asset::credit(code, parse_address("asset_issuer", issuer)?)
        .map_err(|_| RecordError::new("asset_code", code.as_str()))
}

impl TryFrom<HorizonBalance> for Balance {
    type Error = RecordError;

    fn try_from(raw: HorizonBalance) -> Result<Self, Self::Error> {
        let asset = match raw.asset_type.as_str() {
            "native" => BalanceAsset::Asset(Asset::Native),
            "credit_alphanum4" | "credit_alphanum12" => BalanceAsset::Asset(parse_credit(
                raw.asset_code.as_ref(),
                raw.asset_issuer.as_ref(),
            )?),
            "liquidity_pool_shares" => {
                let id = raw.liquidity_pool_id.unwrap_or_default();
                BalanceAsset::PoolShare(
                    id.parse()
                        .map_err(|_| RecordError::new("liquidity_pool_id", id.as_str()))?,
                )
            }
            other => return Err(RecordError::new("asset_type", other)),
        };
        let limit = raw
            .limit
            .as_deref()
            .map(|l| parse_amount("limit", l))
            .transpose()?;
        Ok(Self {
            asset,
            amount: parse_amount("balance", &raw.balance)?,
            limit,
            authorized: raw.is_authorized.unwrap_or(true),
        })
    }
}

impl TryFrom<HorizonAccount> for AccountState {
    type Error = RecordError;

    fn try_from(raw: HorizonAccount) -> Result<Self, Self::Error> {
        let address = parse_address("account_id", &raw.account_id)?;
        let sequence = raw
            .sequence
            .parse::<i64>()
            .map_err(|_| RecordError::new("sequence", raw.sequence.as_str()))?;

        // The master key shows up in the signer list with its weight.
        let mut master_weight = 0;
        let mut signers = Vec::new();
        for signer in raw.signers {
            if !signer.kind.is_empty() && signer.kind != "ed25519_public_key" {
                // Pre-authorized hashes and hash-x signers cannot sign here.
                continue;
            }
            let key = parse_address("signer", &signer.key)?;
            if key == address {
                master_weight = signer.weight;
            } else {
                signers.push(Signer {
                    key,
                    weight: signer.weight,
                });
            }
        }

        let balances = raw
            .balances
            .into_iter()
            .map(Balance::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = BTreeMap::new();
        for (name, value) in raw.data {
            let bytes = BASE64
                .decode(value.as_bytes())
                .map_err(|_| RecordError::new("data", name.as_str()))?;
            data.insert(name, bytes);
        }

        Ok(Self {
            address,
            sequence: SequenceNumber(sequence),
            signers,
            thresholds: Thresholds {
                master_weight,
                low: raw.thresholds.low_threshold,
                medium: raw.thresholds.med_threshold,
                high: raw.thresholds.high_threshold,
            },
            balances,
            data,
        })
    }
}

/// `GET /claimable_balances/{id}` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct HorizonClaimableBalance {
    pub id: String,
    pub asset: String,
    pub amount: String,
    pub sponsor: Option<String>,
    #[serde(default)]
    pub claimants: Vec<HorizonClaimant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorizonClaimant {
    pub destination: String,
    pub predicate: HorizonPredicate,
}

/// The ledger API's JSON rendering of a claim predicate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HorizonPredicate {
    #[serde(default)]
    pub unconditional: Option<bool>,
    #[serde(default)]
    pub and: Option<Vec<HorizonPredicate>>,
    #[serde(default)]
    pub or: Option<Vec<HorizonPredicate>>,
    #[serde(default)]
    pub not: Option<Box<HorizonPredicate>>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub abs_before: Option<String>,
    /// Seconds, as a decimal string.
    #[serde(default)]
    pub rel_before: Option<String>,
}

impl TryFrom<HorizonPredicate> for ClaimPredicate {
    type Error = RecordError;

    fn try_from(raw: HorizonPredicate) -> Result<Self, Self::Error> {
        fn pair(
            field: &'static str,
            items: Vec<HorizonPredicate>,
        ) -> Result<(ClaimPredicate, ClaimPredicate), RecordError> {
            let mut iter = items.into_iter();
            match (iter.next(), iter.next(), iter.next()) {
                (Some(a), Some(b), None) => Ok((a.try_into()?, b.try_into()?)),
                _ => Err(RecordError::new(field, "expected two predicates")),
            }
        }

        if raw.unconditional == Some(true) {
            return Ok(ClaimPredicate::Unconditional);
        }
        if let Some(items) = raw.and {
            let (a, b) = pair("and", items)?;
            return Ok(ClaimPredicate::and(a, b));
        }
        if let Some(items) = raw.or {
            let (a, b) = pair("or", items)?;
            return Ok(ClaimPredicate::or(a, b));
        }
        if let Some(inner) = raw.not {
            return Ok(ClaimPredicate::not((*inner).try_into()?));
        }
        if let Some(ts) = raw.abs_before {
            let at = chrono::DateTime::parse_from_rfc3339(&ts)
                .map_err(|_| RecordError::new("abs_before", ts.as_str()))?;
            return Ok(ClaimPredicate::BeforeAbsoluteTime(at.timestamp()));
        }
        if let Some(secs) = raw.rel_before {
            let secs = secs
                .parse::<i64>()
                .map_err(|_| RecordError::new("rel_before", secs.as_str()))?;
            return Ok(ClaimPredicate::BeforeRelativeTime(secs));
        }
        Err(RecordError::new("predicate", "empty"))
    }
}

impl TryFrom<HorizonClaimableBalance> for ClaimableBalanceEntry {
    type Error = RecordError;

    fn try_from(raw: HorizonClaimableBalance) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .parse()
            .map_err(|_| RecordError::new("id", raw.id.as_str()))?;
        let asset = raw
            .asset
            .parse()
            .map_err(|_| RecordError::new("asset", raw.asset.as_str()))?;
        let sponsor = raw
            .sponsor
            .as_deref()
            .map(|s| parse_address("sponsor", s))
            .transpose()?;
        let claimants = raw
            .claimants
            .into_iter()
            .map(|c| {
                Ok(Claimant {
                    destination: parse_address("destination", &c.destination)?,
                    predicate: c.predicate.try_into()?,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;
        Ok(Self {
            id,
            asset,
            amount: parse_amount("amount", &raw.amount)?,
            sponsor,
            claimants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn addr(seed: u8) -> Address {
        KeyPair::from_seed_bytes(&[seed; 32]).address()
    }

    #[test]
    fn increment_returns_new_snapshot() {
        let state = AccountState::new(addr(1), 5);
        let next = state.increment_sequence().unwrap();
        assert_eq!(state.sequence.value(), 5);
        assert_eq!(next.sequence.value(), 6);
        assert_eq!(next.address, state.address);
    }

    #[test]
    fn increment_at_max_overflows() {
        let state = AccountState::new(addr(1), i64::MAX);
        assert_eq!(
            state.increment_sequence(),
            Err(ValidationError::SequenceOverflow(i64::MAX))
        );
    }

    #[test]
    fn zero_threshold_still_needs_one() {
        let t = Thresholds::default();
        assert_eq!(t.required_weight(ThresholdClass::High), 1);
        let t = Thresholds {
            master_weight: 1,
            low: 1,
            medium: 2,
            high: 3,
        };
        assert_eq!(t.required_weight(ThresholdClass::Medium), 2);
    }

    #[test]
    fn weighted_signers_skip_zero_weight_master() {
        let mut state = AccountState::new(addr(1), 1);
        state.signers.push(Signer {
            key: addr(2),
            weight: 2,
        });
        state.thresholds.master_weight = 0;
        assert_eq!(state.weighted_signers(), vec![(addr(2), 2)]);
        assert_eq!(state.signer_weight(&addr(1)), 0);
        assert_eq!(state.signer_weight(&addr(2)), 2);
    }

    #[test]
    fn account_from_ledger_json() {
        let account = addr(1);
        let issuer = addr(9);
        let cosigner = addr(2);
        let json = serde_json::json!({
            "account_id": account.to_string(),
            "sequence": "4294967296",
            "thresholds": {"low_threshold": 1, "med_threshold": 2, "high_threshold": 3},
            "balances": [
                {"balance": "9999.9999900", "asset_type": "native"},
                {"balance": "10.0000000", "limit": "922337203685.4775807",
                 "asset_type": "credit_alphanum4", "asset_code": "USD",
                 "asset_issuer": issuer.to_string(), "is_authorized": true}
            ],
            "signers": [
                {"key": cosigner.to_string(), "weight": 1, "type": "ed25519_public_key"},
                {"key": account.to_string(), "weight": 2, "type": "ed25519_public_key"}
            ],
            "data": {"config": "aGVsbG8="}
        });
        let raw: HorizonAccount = serde_json::from_value(json).unwrap();
        let state = AccountState::try_from(raw).unwrap();

        assert_eq!(state.sequence.value(), 4_294_967_296);
        assert_eq!(state.thresholds.master_weight, 2);
        assert_eq!(state.thresholds.high, 3);
        assert_eq!(state.signers, vec![Signer { key: cosigner, weight: 1 }]);
        assert_eq!(state.native_balance().stroops(), 99_999_999_900);
        let usd = Asset::credit("USD", issuer).unwrap();
        assert!(state.has_trustline(&usd));
        assert_eq!(state.balance(&usd).unwrap().limit, Some(Amount::MAX));
        assert_eq!(state.data.get("config").unwrap(), b"hello");
    }

    #[test]
    fn bad_sequence_is_a_record_error() {
        let json = serde_json::json!({
            "account_id": addr(1).to_string(),
            "sequence": "not-a-number",
        });
        let raw: HorizonAccount = serde_json::from_value(json).unwrap();
        let err = AccountState::try_from(raw).unwrap_err();
        assert_eq!(err.field, "sequence");
    }

    #[test]
    fn claimable_balance_from_ledger_json() {
        let claimant = addr(4);
        let json = serde_json::json!({
            "id": format!("00000000{}", "ab".repeat(32)),
            "asset": "native",
            "amount": "5.0000000",
            "sponsor": addr(5).to_string(),
            "claimants": [
                {"destination": claimant.to_string(),
                 "predicate": {"not": {"rel_before": "3600"}}},
                {"destination": addr(5).to_string(),
                 "predicate": {"unconditional": true}}
            ]
        });
        let raw: HorizonClaimableBalance = serde_json::from_value(json).unwrap();
        let entry = ClaimableBalanceEntry::try_from(raw).unwrap();
        assert_eq!(entry.amount.stroops(), 50_000_000);
        assert_eq!(
            entry.claimant(&claimant).unwrap().predicate,
            ClaimPredicate::not(ClaimPredicate::BeforeRelativeTime(3600))
        );
        assert_eq!(entry.id.to_string(), format!("00000000{}", "ab".repeat(32)));
    }
}
