//! Kubernetes-style resource quantities (`10G`, `512Mi`, `1e3`, `8192`).
//!
//! The original string is kept as written; the integer value is computed on
//! demand and rounded up, so `100m` counts as 1.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(pub String);

const MAX_DIGITS: usize = 36;

enum Scale {
    Decimal(i32),
    Binary(u32),
}

impl Quantity {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An unset quantity leaves the corresponding setting untouched
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Unset, or set to a value of zero such as `0` or `0Gi`
    pub fn is_zero(&self) -> bool {
        self.is_empty() || self.value() == Ok(0)
    }

    /// Integer value, rounded towards positive infinity
    pub fn value(&self) -> std::result::Result<i64, String> {
        let s = self.0.trim();
        if s.is_empty() {
            return Err("empty quantity".to_string());
        }

        let (negative, rest) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let number_len = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_len);

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("no digits in {s:?}"));
        }
        if frac_part.contains('.') {
            return Err(format!("more than one decimal point in {s:?}"));
        }

        let digits = format!("{int_part}{frac_part}");
        let digits = digits.trim_start_matches('0');
        if digits.len() > MAX_DIGITS {
            return Err(format!("too many digits in {s:?}"));
        }
        let mantissa: u128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|e| format!("{s:?}: {e}"))?
        };

        let frac_len = i32::try_from(frac_part.len()).map_err(|_| format!("{s:?} is out of range"))?;
        let magnitude = match parse_suffix(suffix).ok_or_else(|| format!("unknown suffix {suffix:?} in {s:?}"))? {
            Scale::Decimal(exp) => exp
                .checked_sub(frac_len)
                .and_then(|exp| scale_decimal(mantissa, exp, negative)),
            Scale::Binary(shift) => {
                let scaled = mantissa
                    .checked_mul(1u128 << shift)
                    .ok_or_else(|| format!("{s:?} is out of range"))?;
                frac_len
                    .checked_neg()
                    .and_then(|exp| scale_decimal(scaled, exp, negative))
            }
        }
        .ok_or_else(|| format!("{s:?} is out of range"))?;

        let magnitude = i64::try_from(magnitude).map_err(|_| format!("{s:?} is out of range"))?;
        Ok(if negative { -magnitude } else { magnitude })
    }
}

/// `mantissa * 10^exp`, rounded away from zero for positives and towards
/// zero for negatives
fn scale_decimal(
    mantissa: u128,
    exp: i32,
    negative: bool,
) -> Option<u128> {
    if exp >= 0 {
        let factor = 10u128.checked_pow(exp as u32)?;
        return mantissa.checked_mul(factor);
    }
    let divisor = 10u128.checked_pow(exp.unsigned_abs())?;
    let whole = mantissa / divisor;
    if !negative && mantissa % divisor != 0 {
        Some(whole + 1)
    } else {
        Some(whole)
    }
}

fn parse_suffix(suffix: &str) -> Option<Scale> {
    let scale = match suffix {
        "" => Scale::Decimal(0),
        "n" => Scale::Decimal(-9),
        "u" => Scale::Decimal(-6),
        "m" => Scale::Decimal(-3),
        "k" => Scale::Decimal(3),
        "M" => Scale::Decimal(6),
        "G" => Scale::Decimal(9),
        "T" => Scale::Decimal(12),
        "P" => Scale::Decimal(15),
        "E" => Scale::Decimal(18),
        "Ki" => Scale::Binary(10),
        "Mi" => Scale::Binary(20),
        "Gi" => Scale::Binary(30),
        "Ti" => Scale::Binary(40),
        "Pi" => Scale::Binary(50),
        "Ei" => Scale::Binary(60),
        other => {
            let exp = other.strip_prefix('e').or_else(|| other.strip_prefix('E'))?;
            if exp.is_empty() {
                return None;
            }
            Scale::Decimal(exp.parse().ok()?)
        }
    };
    Some(scale)
}

impl fmt::Display for Quantity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
