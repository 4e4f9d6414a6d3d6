//! Baht prices using decimal arithmetic.
//!
//! The backend is loose about numeric types: product prices arrive as JSON
//! numbers, order-line totals as strings such as `"120.00"`, and the odd row
//! carries `null` or garbage. Deserialization therefore accepts any of those,
//! reads a string up to the end of its leading number (`"120 baht"` is 120)
//! and treats a value with no number at all as zero.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

/// An amount in Thai baht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero baht.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole satang (1/100 baht).
    #[must_use]
    pub fn from_satang(satang: i64) -> Self {
        Self(Decimal::new(satang, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Parse a whole form value: surrounding whitespace is ignored, anything
    /// else that is not part of a decimal number yields `None`.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Option<Self> {
        Decimal::from_str(s.trim()).ok().map(Self)
    }

    /// Read the number at the start of `s`, ignoring whatever follows it:
    /// `"120 baht"` is 120, `".5"` is 0.5, `"baht 120"` is `None`.
    #[must_use]
    pub fn parse_prefix(s: &str) -> Option<Self> {
        let s = s.trim_start();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, s.get(1..)?),
            Some(b'+') => (false, s.get(1..)?),
            _ => (false, s),
        };

        let digits = |text: &str| text.bytes().take_while(u8::is_ascii_digit).count();
        let int_len = digits(rest);
        let frac_len = rest
            .get(int_len..)
            .and_then(|tail| tail.strip_prefix('.'))
            .map_or(0, digits);
        if int_len + frac_len == 0 {
            return None;
        }

        let int_part = rest.get(..int_len).filter(|p| !p.is_empty()).unwrap_or("0");
        let mut number = format!("{}{int_part}", if negative { "-" } else { "" });
        if frac_len > 0 {
            number.push('.');
            number.push_str(rest.get(int_len + 1..int_len + 1 + frac_len)?);
        }
        Decimal::from_str(&number).ok().map(Self)
    }

    /// Format for display, e.g. `฿120.00`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("฿{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(price_from_value(&value))
    }
}

fn price_from_value(value: &serde_json::Value) -> Price {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .map_or(Price::ZERO, Price),
        serde_json::Value::String(s) => Price::parse_prefix(s).unwrap_or(Price::ZERO),
        _ => Price::ZERO,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Price = serde_json::from_str("45.5").unwrap();
        let b: Price = serde_json::from_str("\"45.50\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.display(), "฿45.50");
    }

    #[test]
    fn test_deserialize_garbage_is_zero() {
        let p: Price = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(p, Price::ZERO);
        let p: Price = serde_json::from_str("null").unwrap();
        assert_eq!(p, Price::ZERO);
    }

    #[test]
    fn test_leading_number_is_kept() {
        let p: Price = serde_json::from_str("\"120 baht\"").unwrap();
        assert_eq!(p, Price::from_satang(12_000));

        assert_eq!(Price::parse_prefix(" 45.50THB"), Some(Price::from_satang(4_550)));
        assert_eq!(Price::parse_prefix(".5"), Some(Price::from_satang(50)));
        assert_eq!(Price::parse_prefix("12."), Some(Price::from_satang(1_200)));
        assert_eq!(Price::parse_prefix("-3.25 off"), Some(Price::from_satang(-325)));
        assert_eq!(Price::parse_prefix("baht 120"), None);
        assert_eq!(Price::parse_prefix("-"), None);
        assert_eq!(Price::parse_prefix(""), None);
    }

    #[test]
    fn test_form_parse_stays_strict() {
        assert_eq!(Price::parse_lenient(" 45.5 "), Some(Price::from_satang(4_550)));
        assert_eq!(Price::parse_lenient("120 baht"), None);
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::from_satang(3_500);
        assert_eq!(unit.times(3), Price::from_satang(10_500));

        let total: Price = [unit, unit.times(2)].into_iter().sum();
        assert_eq!(total.to_string(), "105.00");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_satang(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
    }
}
