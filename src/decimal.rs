//! Arbitrary-precision decimal values and their order-preserving term encoding.
//!
//! Search backends compare keyword terms lexicographically. A decimal stored
//! as its plain textual form would sort `"10" < "9"`, so decimal arguments are
//! encoded with [`Decimal::encode`] before they reach term, terms or range
//! leaves. The encoding sorts exactly like the numeric values:
//!
//! ```
//! use docquery::decimal::Decimal;
//!
//! let small: Decimal = "9".parse().unwrap();
//! let large: Decimal = "10".parse().unwrap();
//! assert!(small.encode() < large.encode());
//!
//! let negative: Decimal = "-0.5".parse().unwrap();
//! assert!(negative.encode() < small.encode());
//! ```
//!
//! # Layout
//!
//! A non-zero value is normalized to `0.d1d2...dn * 10^e` with `d1 != 0` and
//! `dn != 0`.
//!
//! - zero: `1`
//! - positive: `2`, then `e + 5000` as four digits, then `d1...dn`
//! - negative: `0`, then `9999 - (e + 5000)` as four digits, then the nines
//!   complement of every digit, then `~`
//!
//! The trailing `~` sorts above every digit, which keeps `-5` above `-51`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

const MIN_EXPONENT: i64 = -5000;
const MAX_EXPONENT: i64 = 4999;
const EXPONENT_BIAS: i64 = 5000;
const EXPONENT_MAX_ENCODED: i64 = 9999;

/// A normalized decimal number.
///
/// Two decimals that denote the same number compare equal regardless of how
/// they were written (`"1.50"`, `"1.5"` and `"15e-1"` are the same value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Decimal {
    negative: bool,
    /// Significant digits without leading or trailing zeros; empty for zero.
    digits: String,
    /// Position of the decimal point relative to the first significant digit.
    exponent: i32,
}

impl Decimal {
    /// The value zero.
    pub fn zero() -> Self {
        Decimal {
            negative: false,
            digits: String::new(),
            exponent: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Encode this value into a string whose lexicographic order matches the
    /// numeric order of the decimals.
    pub fn encode(&self) -> String {
        if self.is_zero() {
            return "1".to_string();
        }

        let biased = i64::from(self.exponent) + EXPONENT_BIAS;
        if self.negative {
            let mut encoded = format!("0{:04}", EXPONENT_MAX_ENCODED - biased);
            encoded.extend(
                self.digits
                    .bytes()
                    .map(|digit| char::from(b'9' - (digit - b'0'))),
            );
            encoded.push('~');
            encoded
        } else {
            format!("2{:04}{}", biased, self.digits)
        }
    }

    fn from_normalized(negative: bool, digits: &str, exponent: i64) -> Result<Self> {
        let leading = digits.bytes().take_while(|b| *b == b'0').count();
        let significant = digits[leading..].trim_end_matches('0');
        if significant.is_empty() {
            return Ok(Decimal::zero());
        }

        let exponent = exponent - leading as i64;
        if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return Err(QueryError::invalid_argument(format!(
                "Decimal exponent {exponent} is outside the supported range"
            )));
        }

        Ok(Decimal {
            negative,
            digits: significant.to_string(),
            exponent: exponent as i32,
        })
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Decimal {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let invalid = || QueryError::invalid_argument(format!("Invalid decimal literal: '{s}'"));

        let (negative, unsigned) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };

        let (mantissa, scale) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let scale = unsigned[pos + 1..].parse::<i64>().map_err(|_| invalid())?;
                (&unsigned[..pos], scale)
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part
            .bytes()
            .chain(frac_part.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let digits = format!("{int_part}{frac_part}");
        let exponent = (int_part.len() as i64)
            .checked_add(scale)
            .ok_or_else(invalid)?;
        Decimal::from_normalized(negative, &digits, exponent)
    }
}

impl TryFrom<String> for Decimal {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> Self {
        value.to_string()
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        let digits = value.unsigned_abs().to_string();
        let significant = digits.trim_end_matches('0');
        if significant.is_empty() {
            return Decimal::zero();
        }
        Decimal {
            negative: value < 0,
            digits: significant.to_string(),
            exponent: digits.len() as i32,
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.negative {
            f.write_str("-")?;
        }

        let len = self.digits.len() as i64;
        let exponent = i64::from(self.exponent);
        if exponent <= 0 {
            write!(
                f,
                "0.{}{}",
                "0".repeat(exponent.unsigned_abs() as usize),
                self.digits
            )
        } else if exponent >= len {
            write!(
                f,
                "{}{}",
                self.digits,
                "0".repeat((exponent - len) as usize)
            )
        } else {
            let (int_part, frac_part) = self.digits.split_at(exponent as usize);
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(dec("1.50"), dec("1.5"));
        assert_eq!(dec("15e-1"), dec("1.5"));
        assert_eq!(dec("+0001.5000"), dec("1.5"));
        assert_eq!(dec("-0.0"), Decimal::zero());
        assert_eq!(dec(".25").to_string(), "0.25");
        assert_eq!(dec("7.").to_string(), "7");
    }

    #[test]
    fn test_display() {
        assert_eq!(dec("123.45").to_string(), "123.45");
        assert_eq!(dec("0.005").to_string(), "0.005");
        assert_eq!(dec("-1200").to_string(), "-1200");
        assert_eq!(dec("1.2E3").to_string(), "1200");
        assert_eq!(dec("0").to_string(), "0");
    }

    #[test]
    fn test_invalid_literals() {
        for literal in ["", ".", "-", "abc", "1.2.3", "1e", "1e999999", "--1", "1_000"] {
            assert!(literal.parse::<Decimal>().is_err(), "{literal}");
        }
    }

    #[test]
    fn test_encoding_preserves_order() {
        let sorted = [
            "-1000", "-51", "-5", "-0.5", "-0.05", "0", "0.001", "0.5", "1", "9", "9.99", "10",
            "10.5", "100", "12345.678",
        ];
        let encoded: Vec<String> = sorted.iter().map(|s| dec(s).encode()).collect();
        for pair in encoded.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_encoding_is_canonical() {
        assert_eq!(dec("1.50").encode(), dec("1.5").encode());
        assert_eq!(dec("0").encode(), "1");
        assert_eq!(dec("5").encode(), "250015");
        assert_eq!(dec("-5").encode(), "049984~");
    }

    #[test]
    fn test_from_i64() {
        assert_eq!(Decimal::from(1200), dec("1200"));
        assert_eq!(Decimal::from(-7), dec("-7"));
        assert_eq!(Decimal::from(0), Decimal::zero());
        assert_eq!(Decimal::from(i64::MIN).to_string(), i64::MIN.to_string());
    }

    #[test]
    fn test_serde_as_string() {
        let value = dec("-12.5");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"-12.5\"");
        let back: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
        assert!(serde_json::from_str::<Decimal>("\"x\"").is_err());
    }
}
