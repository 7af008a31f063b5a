//! # Assets
//!
//! An asset is either the ledger's native currency or a credit issued by an
//! account, identified by a short code plus the issuer's address. Codes of
//! 1-4 characters are `CreditAlphanum4`, 5-12 characters `CreditAlphanum12`;
//! the split exists because the wire format pads codes to a fixed width.
//!
//! The derived `Ord` (native first, then 4-char, then 12-char codes, then by
//! code, then issuer) is the canonical order liquidity pools use for their
//! asset pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::Encode;
use crate::config::{LIQUIDITY_POOL_FEE_BPS, MAX_ASSET_CODE_LENGTH};
use crate::crypto::{sha256, Address};
use crate::error::ValidationError;

/// An asset the ledger can hold balances of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Asset {
    Native,
    CreditAlphanum4 { code: String, issuer: Address },
    CreditAlphanum12 { code: String, issuer: Address },
}

/// Checks an asset code: 1-12 ASCII alphanumeric characters.
pub fn validate_asset_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty()
        || code.len() > MAX_ASSET_CODE_LENGTH
        || !code.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(ValidationError::InvalidAssetCode {
            code: code.to_string(),
        });
    }
    Ok(())
}

impl Asset {
    /// A credit asset, choosing the 4- or 12-character variant by length.
    pub fn credit(code: &str, issuer: Address) -> Result<Self, ValidationError> {
        validate_asset_code(code)?;
        let code = code.to_string();
        if code.len() <= 4 {
            Ok(Self::CreditAlphanum4 { code, issuer })
        } else {
            Ok(Self::CreditAlphanum12 { code, issuer })
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// The asset code, `XLM` for the native asset.
    pub fn code(&self) -> &str {
        match self {
            Self::Native => "XLM",
            Self::CreditAlphanum4 { code, .. } | Self::CreditAlphanum12 { code, .. } => code,
        }
    }

    pub fn issuer(&self) -> Option<&Address> {
        match self {
            Self::Native => None,
            Self::CreditAlphanum4 { issuer, .. } | Self::CreditAlphanum12 { issuer, .. } => {
                Some(issuer)
            }
        }
    }

    /// `native` or `CODE:ISSUER`.
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Native => "native".to_string(),
            Self::CreditAlphanum4 { code, issuer } | Self::CreditAlphanum12 { code, issuer } => {
                format!("{}:{}", code, issuer)
            }
        }
    }
}

impl FromStr for Asset {
    type Err = ValidationError;

    /// Accepts `native`, `XLM` (any case) or `CODE:ISSUER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") || s.eq_ignore_ascii_case("xlm") {
            return Ok(Self::Native);
        }
        let (code, issuer) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::InvalidAssetIdentifier(s.to_string()))?;
        let issuer: Address = issuer
            .parse()
            .map_err(|_| ValidationError::InvalidAssetIdentifier(s.to_string()))?;
        Self::credit(code, issuer)
    }
}

impl TryFrom<String> for Asset {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.canonical_name()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

// ---------------------------------------------------------------------------
// Liquidity pools
// ---------------------------------------------------------------------------

/// A constant-product pool's defining parameters.
///
/// The asset pair is always stored in canonical order, so
/// `new(a, b)` and `new(b, a)` describe the same pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidityPoolParameters {
    pub asset_a: Asset,
    pub asset_b: Asset,
    pub fee: i32,
}

impl LiquidityPoolParameters {
    pub fn new(first: Asset, second: Asset) -> Result<Self, ValidationError> {
        let (asset_a, asset_b) = match first.cmp(&second) {
            std::cmp::Ordering::Less => (first, second),
            std::cmp::Ordering::Greater => (second, first),
            std::cmp::Ordering::Equal => return Err(ValidationError::IdenticalPoolAssets),
        };
        Ok(Self {
            asset_a,
            asset_b,
            fee: LIQUIDITY_POOL_FEE_BPS,
        })
    }

    /// SHA-256 of the canonical encoding.
    pub fn pool_id(&self) -> PoolId {
        PoolId(sha256(&self.to_xdr()))
    }
}

/// A liquidity pool identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PoolId(pub [u8; 32]);

impl FromStr for PoolId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|_| ValidationError::InvalidAssetIdentifier(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ValidationError::InvalidAssetIdentifier(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for PoolId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PoolId> for String {
    fn from(id: PoolId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", self)
    }
}

/// What a trustline can point at: a plain asset or a pool share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeTrustAsset {
    Asset(Asset),
    Pool(LiquidityPoolParameters),
}

impl From<Asset> for ChangeTrustAsset {
    fn from(asset: Asset) -> Self {
        Self::Asset(asset)
    }
}

impl From<LiquidityPoolParameters> for ChangeTrustAsset {
    fn from(params: LiquidityPoolParameters) -> Self {
        Self::Pool(params)
    }
}

impl fmt::Display for ChangeTrustAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(asset) => write!(f, "{}", asset),
            Self::Pool(params) => write!(f, "pool:{}", params.pool_id()),
        }
    }
}
