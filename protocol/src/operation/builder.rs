//! Validated operation constructors.
//!
//! [`OperationBuilder`] is a namespace of pure functions: each takes
//! user-facing inputs (decimal amount strings, assets, addresses), checks
//! them against the ledger's limits and returns an [`Operation`] with no
//! explicit source. Call [`Operation::with_source`] on the result to run it
//! on behalf of another account.
//!
//! Nothing here touches the network, and nothing here knows which account
//! will be the transaction source. Checks that need that (e.g. merging an
//! account into itself) happen when the transaction is assembled.

use crate::account::Signer;
use crate::amount::{Amount, Price};
use crate::asset::{validate_asset_code, Asset, ChangeTrustAsset, PoolId};
use crate::config::{
    MAX_CLAIMANTS, MAX_DATA_NAME_LENGTH, MAX_DATA_VALUE_LENGTH, MAX_HOME_DOMAIN_LENGTH,
    MAX_PATH_LENGTH, MAX_PREDICATE_DEPTH,
};
use crate::crypto::Address;
use crate::error::ValidationError;

use super::types::{
    trustline_flags, ClaimableBalanceId, Claimant, Operation, OperationBody, SetOptions,
};

fn positive(text: &str, field: &'static str) -> Result<Amount, ValidationError> {
    Amount::parse(text)?.ensure_positive(field)
}

fn non_negative(text: &str, field: &'static str) -> Result<Amount, ValidationError> {
    Amount::parse(text)?.ensure_non_negative(field)
}

fn check_asset(asset: &Asset) -> Result<(), ValidationError> {
    match asset {
        Asset::Native => Ok(()),
        Asset::CreditAlphanum4 { code, .. } | Asset::CreditAlphanum12 { code, .. } => {
            validate_asset_code(code)
        }
    }
}

fn check_path(path: &[Asset]) -> Result<(), ValidationError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(ValidationError::PathTooLong {
            len: path.len(),
            max: MAX_PATH_LENGTH,
        });
    }
    path.iter().try_for_each(check_asset)
}

fn check_offer_id(offer_id: i64) -> Result<(), ValidationError> {
    if offer_id < 0 {
        return Err(ValidationError::InvalidOfferId(offer_id));
    }
    Ok(())
}

fn weight(field: &'static str, value: u32) -> Result<u8, ValidationError> {
    u8::try_from(value).map_err(|_| ValidationError::WeightOutOfRange { field, value })
}

/// Constructors for every operation the ledger supports.
pub struct OperationBuilder;

impl OperationBuilder {
    /// Creates and funds a new account.
    pub fn create_account(
        destination: Address,
        starting_balance: &str,
    ) -> Result<Operation, ValidationError> {
        Ok(Operation::new(OperationBody::CreateAccount {
            destination,
            starting_balance: positive(starting_balance, "starting balance")?,
        }))
    }

    pub fn payment(
        destination: Address,
        asset: Asset,
        amount: &str,
    ) -> Result<Operation, ValidationError> {
        check_asset(&asset)?;
        Ok(Operation::new(OperationBody::Payment {
            destination,
            asset,
            amount: positive(amount, "amount")?,
        }))
    }

    /// Pays exactly `dest_amount`, spending at most `send_max`.
    pub fn path_payment_strict_receive(
        send_asset: Asset,
        send_max: &str,
        destination: Address,
        dest_asset: Asset,
        dest_amount: &str,
        path: Vec<Asset>,
    ) -> Result<Operation, ValidationError> {
        check_asset(&send_asset)?;
        check_asset(&dest_asset)?;
        check_path(&path)?;
        Ok(Operation::new(OperationBody::PathPaymentStrictReceive {
            send_asset,
            send_max: positive(send_max, "send max")?,
            destination,
            dest_asset,
            dest_amount: positive(dest_amount, "destination amount")?,
            path,
        }))
    }

    /// Spends exactly `send_amount`, delivering at least `dest_min`.
    pub fn path_payment_strict_send(
        send_asset: Asset,
        send_amount: &str,
        destination: Address,
        dest_asset: Asset,
        dest_min: &str,
        path: Vec<Asset>,
    ) -> Result<Operation, ValidationError> {
        check_asset(&send_asset)?;
        check_asset(&dest_asset)?;
        check_path(&path)?;
        Ok(Operation::new(OperationBody::PathPaymentStrictSend {
            send_asset,
            send_amount: positive(send_amount, "send amount")?,
            destination,
            dest_asset,
            dest_min: positive(dest_min, "destination minimum")?,
            path,
        }))
    }

    /// Creates (`offer_id` 0), updates or, with amount `"0"`, deletes a sell
    /// offer. `price` is units of `buying` per unit of `selling`.
    pub fn manage_sell_offer(
        selling: Asset,
        buying: Asset,
        amount: &str,
        price: &str,
        offer_id: i64,
    ) -> Result<Operation, ValidationError> {
        check_asset(&selling)?;
        check_asset(&buying)?;
        check_offer_id(offer_id)?;
        Ok(Operation::new(OperationBody::ManageSellOffer {
            selling,
            buying,
            amount: non_negative(amount, "amount")?,
            price: Price::parse(price)?,
            offer_id,
        }))
    }

    /// Like [`manage_sell_offer`](Self::manage_sell_offer) but fixes the
    /// amount bought. `price` is units of `selling` per unit of `buying`.
    pub fn manage_buy_offer(
        selling: Asset,
        buying: Asset,
        buy_amount: &str,
        price: &str,
        offer_id: i64,
    ) -> Result<Operation, ValidationError> {
        check_asset(&selling)?;
        check_asset(&buying)?;
        check_offer_id(offer_id)?;
        Ok(Operation::new(OperationBody::ManageBuyOffer {
            selling,
            buying,
            buy_amount: non_negative(buy_amount, "buy amount")?,
            price: Price::parse(price)?,
            offer_id,
        }))
    }

    /// An offer that never takes an equal-priced counter offer.
    pub fn create_passive_sell_offer(
        selling: Asset,
        buying: Asset,
        amount: &str,
        price: &str,
    ) -> Result<Operation, ValidationError> {
        check_asset(&selling)?;
        check_asset(&buying)?;
        Ok(Operation::new(OperationBody::CreatePassiveSellOffer {
            selling,
            buying,
            amount: positive(amount, "amount")?,
            price: Price::parse(price)?,
        }))
    }

    /// Creates or updates a trustline. `None` means the maximum limit.
    pub fn change_trust(
        line: impl Into<ChangeTrustAsset>,
        limit: Option<&str>,
    ) -> Result<Operation, ValidationError> {
        let line = line.into();
        match &line {
            ChangeTrustAsset::Asset(Asset::Native) => {
                return Err(ValidationError::NativeTrustline)
            }
            ChangeTrustAsset::Asset(asset) => check_asset(asset)?,
            ChangeTrustAsset::Pool(params) => {
                check_asset(&params.asset_a)?;
                check_asset(&params.asset_b)?;
            }
        }
        let limit = match limit {
            Some(text) => non_negative(text, "limit")?,
            None => Amount::MAX,
        };
        Ok(Operation::new(OperationBody::ChangeTrust { line, limit }))
    }

    /// Removes a trustline (limit zero). The balance must already be zero.
    pub fn remove_trust(line: impl Into<ChangeTrustAsset>) -> Result<Operation, ValidationError> {
        Self::change_trust(line, Some("0"))
    }

    /// Merges the source account into `destination`, deleting the source.
    pub fn account_merge(destination: Address) -> Result<Operation, ValidationError> {
        Ok(Operation::new(OperationBody::AccountMerge { destination }))
    }

    /// Sets a data entry, or deletes it when `value` is `None`.
    pub fn manage_data(name: &str, value: Option<&[u8]>) -> Result<Operation, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyDataName);
        }
        if name.len() > MAX_DATA_NAME_LENGTH {
            return Err(ValidationError::DataNameTooLong {
                len: name.len(),
                max: MAX_DATA_NAME_LENGTH,
            });
        }
        if let Some(value) = value {
            if value.len() > MAX_DATA_VALUE_LENGTH {
                return Err(ValidationError::DataValueTooLong {
                    len: value.len(),
                    max: MAX_DATA_VALUE_LENGTH,
                });
            }
        }
        Ok(Operation::new(OperationBody::ManageData {
            name: name.to_string(),
            value: value.map(<[u8]>::to_vec),
        }))
    }

    /// Starts a set-options operation.
    pub fn set_options() -> SetOptionsBuilder {
        SetOptionsBuilder::default()
    }

    /// Opens a sponsorship sandwich: the source pays reserves for whatever
    /// `sponsored` creates until the matching end-sponsoring.
    pub fn begin_sponsoring_future_reserves(
        sponsored: Address,
    ) -> Result<Operation, ValidationError> {
        Ok(Operation::new(OperationBody::BeginSponsoringFutureReserves {
            sponsored_id: sponsored,
        }))
    }

    /// Closes a sponsorship sandwich. Its source must be the sponsored
    /// account, so the sponsored account signs the transaction too.
    pub fn end_sponsoring_future_reserves(sponsored: Address) -> Operation {
        Operation::new(OperationBody::EndSponsoringFutureReserves).with_source(sponsored)
    }

    pub fn create_claimable_balance(
        asset: Asset,
        amount: &str,
        claimants: Vec<Claimant>,
    ) -> Result<Operation, ValidationError> {
        check_asset(&asset)?;
        if claimants.is_empty() || claimants.len() > MAX_CLAIMANTS {
            return Err(ValidationError::InvalidClaimantCount {
                count: claimants.len(),
                max: MAX_CLAIMANTS,
            });
        }
        if let Some(depth) = claimants
            .iter()
            .map(|c| c.predicate.depth())
            .find(|&depth| depth > MAX_PREDICATE_DEPTH)
        {
            return Err(ValidationError::PredicateTooDeep {
                depth,
                max: MAX_PREDICATE_DEPTH,
            });
        }
        Ok(Operation::new(OperationBody::CreateClaimableBalance {
            asset,
            amount: positive(amount, "amount")?,
            claimants,
        }))
    }

    pub fn claim_claimable_balance(
        balance_id: ClaimableBalanceId,
    ) -> Result<Operation, ValidationError> {
        Ok(Operation::new(OperationBody::ClaimClaimableBalance { balance_id }))
    }

    /// Changes an issued asset's flags on someone else's trustline.
    pub fn set_trustline_flags(
        trustor: Address,
        asset: Asset,
        changes: TrustLineFlagChanges,
    ) -> Result<Operation, ValidationError> {
        if asset.is_native() {
            return Err(ValidationError::NativeTrustline);
        }
        check_asset(&asset)?;
        let (set_flags, clear_flags) = changes.masks();
        Ok(Operation::new(OperationBody::SetTrustLineFlags {
            trustor,
            asset,
            clear_flags,
            set_flags,
        }))
    }

    /// Deposits up to the given amounts, accepting any pool price between
    /// `min_price` and `max_price`.
    pub fn liquidity_pool_deposit(
        pool_id: PoolId,
        max_amount_a: &str,
        max_amount_b: &str,
        min_price: &str,
        max_price: &str,
    ) -> Result<Operation, ValidationError> {
        let min_price = Price::parse(min_price)?;
        let max_price = Price::parse(max_price)?;
        if min_price > max_price {
            return Err(ValidationError::InvertedPriceBounds);
        }
        Ok(Operation::new(OperationBody::LiquidityPoolDeposit {
            pool_id,
            max_amount_a: positive(max_amount_a, "max amount A")?,
            max_amount_b: positive(max_amount_b, "max amount B")?,
            min_price,
            max_price,
        }))
    }

    /// Redeems `amount` pool shares for at least the given amounts.
    pub fn liquidity_pool_withdraw(
        pool_id: PoolId,
        amount: &str,
        min_amount_a: &str,
        min_amount_b: &str,
    ) -> Result<Operation, ValidationError> {
        Ok(Operation::new(OperationBody::LiquidityPoolWithdraw {
            pool_id,
            amount: positive(amount, "amount")?,
            min_amount_a: non_negative(min_amount_a, "min amount A")?,
            min_amount_b: non_negative(min_amount_b, "min amount B")?,
        }))
    }
}

// ---------------------------------------------------------------------------
// SetOptionsBuilder
// ---------------------------------------------------------------------------

/// Collects set-options fields; validation happens in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SetOptionsBuilder {
    inflation_dest: Option<Address>,
    clear_flags: Option<u32>,
    set_flags: Option<u32>,
    master_weight: Option<u32>,
    low_threshold: Option<u32>,
    med_threshold: Option<u32>,
    high_threshold: Option<u32>,
    home_domain: Option<String>,
    signer: Option<(Address, u32)>,
}

impl SetOptionsBuilder {
    pub fn inflation_dest(mut self, address: Address) -> Self {
        self.inflation_dest = Some(address);
        self
    }

    /// Account flags to set; see [`account_flags`](super::types::account_flags).
    pub fn set_flags(mut self, flags: u32) -> Self {
        self.set_flags = Some(flags);
        self
    }

    pub fn clear_flags(mut self, flags: u32) -> Self {
        self.clear_flags = Some(flags);
        self
    }

    pub fn master_weight(mut self, weight: u32) -> Self {
        self.master_weight = Some(weight);
        self
    }

    /// Sets all three thresholds at once.
    pub fn thresholds(mut self, low: u32, medium: u32, high: u32) -> Self {
        self.low_threshold = Some(low);
        self.med_threshold = Some(medium);
        self.high_threshold = Some(high);
        self
    }

    pub fn low_threshold(mut self, value: u32) -> Self {
        self.low_threshold = Some(value);
        self
    }

    pub fn med_threshold(mut self, value: u32) -> Self {
        self.med_threshold = Some(value);
        self
    }

    pub fn high_threshold(mut self, value: u32) -> Self {
        self.high_threshold = Some(value);
        self
    }

    pub fn home_domain(mut self, domain: impl Into<String>) -> Self {
        self.home_domain = Some(domain.into());
        self
    }

    /// Adds or reweights a signer.
    pub fn signer(mut self, key: Address, weight: u32) -> Self {
        self.signer = Some((key, weight));
        self
    }

    /// Removes a signer (weight zero).
    pub fn remove_signer(self, key: Address) -> Self {
        self.signer(key, 0)
    }

    pub fn build(self) -> Result<Operation, ValidationError> {
        if let Some(domain) = &self.home_domain {
            if domain.len() > MAX_HOME_DOMAIN_LENGTH {
                return Err(ValidationError::HomeDomainTooLong {
                    len: domain.len(),
                    max: MAX_HOME_DOMAIN_LENGTH,
                });
            }
        }
        let opts = SetOptions {
            inflation_dest: self.inflation_dest,
            clear_flags: self.clear_flags,
            set_flags: self.set_flags,
            master_weight: self
                .master_weight
                .map(|w| weight("master weight", w))
                .transpose()?,
            low_threshold: self
                .low_threshold
                .map(|w| weight("low threshold", w))
                .transpose()?,
            med_threshold: self
                .med_threshold
                .map(|w| weight("medium threshold", w))
                .transpose()?,
            high_threshold: self
                .high_threshold
                .map(|w| weight("high threshold", w))
                .transpose()?,
            home_domain: self.home_domain,
            signer: self
                .signer
                .map(|(key, w)| {
                    Ok::<_, ValidationError>(Signer {
                        key,
                        weight: weight("signer weight", w)?,
                    })
                })
                .transpose()?,
        };
        if opts.is_empty() {
            return Err(ValidationError::EmptySetOptions);
        }
        Ok(Operation::new(OperationBody::SetOptions(opts)))
    }
}

// ---------------------------------------------------------------------------
// TrustLineFlagChanges
// ---------------------------------------------------------------------------

/// Desired trustline flag changes. `Some(true)` sets a flag, `Some(false)`
/// clears it, `None` leaves it alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustLineFlagChanges {
    pub authorized: Option<bool>,
    pub authorized_to_maintain_liabilities: Option<bool>,
    pub clawback_enabled: Option<bool>,
}

impl TrustLineFlagChanges {
    pub fn authorized(mut self, on: bool) -> Self {
        self.authorized = Some(on);
        self
    }

    pub fn authorized_to_maintain_liabilities(mut self, on: bool) -> Self {
        self.authorized_to_maintain_liabilities = Some(on);
        self
    }

    pub fn clawback_enabled(mut self, on: bool) -> Self {
        self.clawback_enabled = Some(on);
        self
    }

    /// `(set_flags, clear_flags)`.
    pub fn masks(&self) -> (u32, u32) {
        let mut set = 0;
        let mut clear = 0;
        for (change, flag) in [
            (self.authorized, trustline_flags::AUTHORIZED),
            (
                self.authorized_to_maintain_liabilities,
                trustline_flags::AUTHORIZED_TO_MAINTAIN_LIABILITIES,
            ),
            (self.clawback_enabled, trustline_flags::CLAWBACK_ENABLED),
        ] {
            match change {
                Some(true) => set |= flag,
                Some(false) => clear |= flag,
                None => {}
            }
        }
        (set, clear)
    }
}
