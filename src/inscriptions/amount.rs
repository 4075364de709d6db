use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimal places of the token ledger's fixed-point amounts
pub const TOKEN_DECIMALS: u32 = 18;
const UNITS_PER_TOKEN: u128 = 10u128.pow(TOKEN_DECIMALS);

/// Token amount held as an 18-decimal fixed-point integer.
///
/// Inscriptions carry decimal strings ("1000", "12.5"); the ledger reports
/// fixed-point integers ("1000000000000000000000"). Both normalise to the
/// same value so they can be compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn from_units(units: u128) -> Self {
        Self(units)
    }

    pub fn units(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse the ledger's fixed-point integer representation
    pub fn from_fixed_point(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("'{}' is not a fixed-point integer", raw));
        }
        raw.parse::<u128>()
            .map(Self)
            .map_err(|e| format!("'{}': {}", raw, e))
    }

    /// Parse the text of a JSON number holding fixed-point units.
    ///
    /// Integers above `u64::MAX` reach us as floats printed in exponent form
    /// ("1.23456789e26"); the digits are shifted exactly instead of going
    /// through `f64`.
    pub fn from_number_text(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let (mantissa, exponent) = match raw.split_once(|c| c == 'e' || c == 'E') {
            Some((mantissa, exponent)) => {
                let exponent = exponent
                    .strip_prefix('+')
                    .unwrap_or(exponent)
                    .parse::<i64>()
                    .map_err(|e| format!("'{}': {}", raw, e))?;
                (mantissa, exponent)
            }
            None => (raw, 0),
        };
        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) {
            return Err(format!("'{}' is not a non-negative number", raw));
        }

        let mut digits = format!("{}{}", whole, fraction);
        let shift = exponent - fraction.len() as i64;
        if shift >= 0 {
            if shift > 2 * TOKEN_DECIMALS as i64 + 2 {
                return Err(format!("'{}' overflows", raw));
            }
            digits.extend(std::iter::repeat('0').take(shift as usize));
        } else {
            let dropped = usize::try_from(-shift).unwrap_or(usize::MAX).min(digits.len());
            let tail = digits.split_off(digits.len() - dropped);
            if !tail.bytes().all(|b| b == b'0') {
                return Err(format!("'{}' is not a whole number of units", raw));
            }
            if digits.is_empty() {
                digits.push('0');
            }
        }
        Self::from_fixed_point(&digits)
    }

    /// Parse a decimal token amount as written in an inscription
    pub fn from_decimal(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw, ""),
        };

        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction)
        {
            return Err(format!("'{}' is not a decimal amount", raw));
        }
        if fraction.len() > TOKEN_DECIMALS as usize {
            return Err(format!(
                "'{}' has more than {} decimals",
                raw, TOKEN_DECIMALS
            ));
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|e| format!("'{}': {}", raw, e))?
        };
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let scale = 10u128.pow(TOKEN_DECIMALS - fraction.len() as u32);
            fraction
                .parse::<u128>()
                .map_err(|e| format!("'{}': {}", raw, e))?
                * scale
        };

        whole_units
            .checked_mul(UNITS_PER_TOKEN)
            .and_then(|units| units.checked_add(fraction_units))
            .map(Self)
            .ok_or_else(|| format!("'{}' overflows", raw))
    }
}

impl fmt::Display for TokenAmount {
    /// Decimal token amount without trailing zeros
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let fraction = self.0 % UNITS_PER_TOKEN;
        if fraction == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", fraction, width = TOKEN_DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for TokenAmount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_decimal(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_and_fixed_point_agree() {
        let inscribed = TokenAmount::from_decimal("1000").unwrap();
        let ledger = TokenAmount::from_fixed_point("1000000000000000000000").unwrap();
        assert_eq!(inscribed, ledger);

        let fractional = TokenAmount::from_decimal("12.5").unwrap();
        assert_eq!(
            fractional,
            TokenAmount::from_fixed_point("12500000000000000000").unwrap()
        );
        assert_eq!(TokenAmount::from_decimal(".5").unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenAmount::from_units(0).to_string(), "0");
        assert_eq!(TokenAmount::from_units(1).to_string(), "0.000000000000000001");
        assert_eq!(
            TokenAmount::from_decimal("42.120").unwrap().to_string(),
            "42.12"
        );
    }

    #[test]
    fn test_number_text_is_exact() {
        let expected = TokenAmount::from_decimal("123456789").unwrap();
        assert_eq!(TokenAmount::from_number_text("1.23456789e26").unwrap(), expected);
        assert_eq!(TokenAmount::from_number_text("1.23456789E+26").unwrap(), expected);
        assert_eq!(
            TokenAmount::from_number_text("123456789000000000000000000").unwrap(),
            expected
        );
        assert_eq!(TokenAmount::from_number_text("2.5e19").unwrap().to_string(), "25");
        assert_eq!(TokenAmount::from_number_text("100.0").unwrap().units(), 100);
        assert_eq!(TokenAmount::from_number_text("120e-1").unwrap().units(), 12);

        for bad in ["1.5", "-1e20", "e5", "1e", "1e400", "abc"] {
            assert!(TokenAmount::from_number_text(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", ".", "-1", "1e18", "1.2.3", "abc", "0.0000000000000000001"] {
            assert!(TokenAmount::from_decimal(bad).is_err(), "{}", bad);
        }
        assert!(TokenAmount::from_fixed_point("1.5").is_err());
        assert!(TokenAmount::from_fixed_point("").is_err());
    }
}
