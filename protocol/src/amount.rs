//! # Amounts and Prices
//!
//! Every asset amount on the ledger is a signed 64-bit count of *stroops*,
//! with 10^7 stroops to one whole unit. Users type decimal strings like
//! `"10.1234567"`; this module is the only place those strings are turned
//! into integers, and it refuses to round. An eighth fractional digit is an
//! error, not a truncation.
//!
//! Prices are rationals `n/d` with both parts in `i32`. A decimal price such
//! as `"0.25"` becomes `1/4` after scaling by 10^7 and reducing.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{AMOUNT_DECIMALS, STROOPS_PER_UNIT};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Decimal parsing
// ---------------------------------------------------------------------------

/// Parses a plain decimal string into a value scaled by 10^7.
///
/// Accepts an optional leading `-`, an integer part, and an optional
/// fractional part of at most 7 digits. No exponents, no separators.
fn parse_scaled(text: &str) -> Result<i128, ValidationError> {
    let raw = text.trim();
    let invalid = || ValidationError::InvalidAmount(text.to_string());

    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let frac = frac_part.unwrap_or("");
    if frac_part.is_some() && frac.is_empty() {
        return Err(invalid());
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > AMOUNT_DECIMALS {
        return Err(ValidationError::ExcessPrecision(text.to_string()));
    }

    let out_of_range = || ValidationError::AmountOutOfRange(text.to_string());
    let mut scaled: i128 = 0;
    for b in int_part.bytes() {
        scaled = scaled
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(b - b'0')))
            .ok_or_else(out_of_range)?;
        // Anything past i64::MAX units is hopeless; stop before i128 overflows.
        if scaled > i128::from(i64::MAX) {
            return Err(out_of_range());
        }
    }
    scaled *= i128::from(STROOPS_PER_UNIT);

    let mut frac_value: i128 = 0;
    for b in frac.bytes() {
        frac_value = frac_value * 10 + i128::from(b - b'0');
    }
    frac_value *= 10i128.pow((AMOUNT_DECIMALS - frac.len()) as u32);

    let value = scaled + frac_value;
    Ok(if negative { -value } else { value })
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// A quantity of some asset, in stroops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// The largest representable amount. Used as the "unlimited" trustline
    /// limit.
    pub const MAX: Amount = Amount(i64::MAX);

    pub const fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    pub const fn stroops(self) -> i64 {
        self.0
    }

    /// Parses a decimal string such as `"10.1234567"`.
    ///
    /// ```
    /// use ledgerline_protocol::amount::Amount;
    ///
    /// assert_eq!(Amount::parse("10.1234567").unwrap().stroops(), 101_234_567);
    /// assert!(Amount::parse("10.12345678").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let scaled = parse_scaled(text)?;
        i64::try_from(scaled)
            .map(Self)
            .map_err(|_| ValidationError::AmountOutOfRange(text.to_string()))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Rejects zero and negative amounts, naming the offending field.
    pub fn ensure_positive(self, field: &'static str) -> Result<Self, ValidationError> {
        if self.0 > 0 {
            Ok(self)
        } else {
            Err(ValidationError::NonPositiveAmount { field })
        }
    }

    pub fn ensure_non_negative(self, field: &'static str) -> Result<Self, ValidationError> {
        if self.0 >= 0 {
            Ok(self)
        } else {
            Err(ValidationError::NegativeAmount { field })
        }
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    /// Always 7 decimals, the way the ledger API prints balances.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = i128::from(self.0);
        let unit = i128::from(STROOPS_PER_UNIT);
        let sign = if value < 0 { "-" } else { "" };
        let abs = value.abs();
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            abs / unit,
            abs % unit,
            width = AMOUNT_DECIMALS
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Amount::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// A positive rational price `n / d`.
///
/// Equality, hashing and ordering are by value: `1/2 == 2/4`. The parts are
/// kept as given so a decoded price re-encodes to the same bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    /// Builds a price from its parts, reducing by the gcd.
    pub fn new(n: i32, d: i32) -> Result<Self, ValidationError> {
        if n <= 0 || d <= 0 {
            return Err(ValidationError::InvalidPrice(format!("{}/{}", n, d)));
        }
        let g = gcd(i64::from(n), i64::from(d));
        // Reducing positive i32s by their gcd keeps them in range.
        Ok(Self {
            n: (i64::from(n) / g) as i32,
            d: (i64::from(d) / g) as i32,
        })
    }

    /// Parses a decimal price such as `"0.25"` (→ 1/4).
    ///
    /// The value must be strictly positive, carry at most 7 fractional
    /// digits, and reduce to a numerator that fits in `i32`.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let scaled = parse_scaled(text).map_err(|err| match err {
            ValidationError::ExcessPrecision(s) => ValidationError::ExcessPrecision(s),
            _ => ValidationError::InvalidPrice(text.to_string()),
        })?;
        if scaled <= 0 {
            return Err(ValidationError::InvalidPrice(text.to_string()));
        }
        let numerator =
            i64::try_from(scaled).map_err(|_| ValidationError::InvalidPrice(text.to_string()))?;
        let g = gcd(numerator, STROOPS_PER_UNIT);
        let n = i32::try_from(numerator / g)
            .map_err(|_| ValidationError::InvalidPrice(text.to_string()))?;
        let d = i32::try_from(STROOPS_PER_UNIT / g)
            .map_err(|_| ValidationError::InvalidPrice(text.to_string()))?;
        Ok(Self { n, d })
    }

    /// Lowest terms with a non-negative denominator. `0/0` stays `0/0`.
    fn reduced(self) -> (i64, i64) {
        let (n, d) = (i64::from(self.n), i64::from(self.d));
        let g = gcd(n, d);
        if g == 0 {
            return (0, 0);
        }
        let sign = if d < 0 { -1 } else { 1 };
        (sign * n / g, sign * d / g)
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.reduced() == other.reduced()
    }
}

impl Eq for Price {}

impl std::hash::Hash for Price {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.reduced().hash(state);
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    /// Cross-multiplied in lowest terms. Ties that are not the same value
    /// (only possible with a zero denominator) fall back to the parts.
    fn cmp(&self, other: &Self) -> Ordering {
        let (an, ad) = self.reduced();
        let (bn, bd) = other.reduced();
        (an * bd)
            .cmp(&(bn * ad))
            .then_with(|| (an, ad).cmp(&(bn, bd)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}
