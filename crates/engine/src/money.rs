use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as integer **minor units** (cents for EUR).
///
/// Every amount in the engine (expense totals, splits, settlements, balances)
/// uses this type. Arithmetic is exact, so the one-cent tolerance used when
/// validating splits and when deciding whether a balance is settled is an
/// exact comparison rather than a float epsilon.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest absolute amount still considered "zero": one minor unit.
    ///
    /// Splits may differ from their expense total by at most this much, and a
    /// balance within this distance of zero is settled.
    pub const TOLERANCE: Money = Money(1);

    /// Largest amount accepted for one expense, split or settlement (one
    /// billion major units). Keeps every group balance far from `i64` limits.
    pub const MAX: Money = Money(100_000_000_000);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn abs(self) -> Money {
        Money(self.0.abs())
    }

    /// Returns `true` when the amount is within [`Money::TOLERANCE`] of zero.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        self.0.unsigned_abs() <= Self::TOLERANCE.0 as u64
    }

    /// Returns `true` when `self` and `other` differ by at most
    /// [`Money::TOLERANCE`].
    #[must_use]
    pub const fn approx_eq(self, other: Money) -> bool {
        self.0.abs_diff(other.0) <= Self::TOLERANCE.0 as u64
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Accepts amounts in `1..=Money::MAX`, otherwise `InvalidAmount` naming
    /// `label`.
    pub(crate) fn ensure_payable(self, label: &str) -> ResultEngine<Money> {
        if !self.is_positive() {
            return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
        }
        if self > Self::MAX {
            return Err(EngineError::InvalidAmount(format!(
                "{label} must be <= {}",
                Self::MAX.0
            )));
        }
        Ok(self)
    }

    /// Splits a non-negative amount into `parts` shares that sum exactly to
    /// `self`.
    ///
    /// The remainder is handed out one minor unit at a time to the leading
    /// shares, so `10.00` over 3 gives `[3.34, 3.33, 3.33]`.
    ///
    /// Returns `None` for zero parts or a negative amount.
    #[must_use]
    pub fn split_evenly(self, parts: usize) -> Option<Vec<Money>> {
        if parts == 0 || self.0 < 0 {
            return None;
        }
        let parts_i64 = i64::try_from(parts).ok()?;
        let base = self.0 / parts_i64;
        let remainder = usize::try_from(self.0 % parts_i64).ok()?;
        Some(
            (0..parts)
                .map(|idx| Money(base + i64::from(idx < remainder)))
                .collect(),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let (major_str, minor_str) = match rest.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (rest.as_str(), None),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let major: i64 = major_str.parse().map_err(|_| overflow())?;

        let minor: i64 = match minor_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = major
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(10).to_string(), "0.10");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().minor(), 100);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn tolerance_is_one_minor_unit() {
        assert!(Money::new(0).is_settled());
        assert!(Money::new(1).is_settled());
        assert!(Money::new(-1).is_settled());
        assert!(!Money::new(2).is_settled());
        assert!(!Money::new(-2).is_settled());

        assert!(Money::new(9000).approx_eq(Money::new(8999)));
        assert!(!Money::new(9000).approx_eq(Money::new(8998)));
    }

    #[test]
    fn split_evenly_hands_remainder_to_leading_shares() {
        let shares = Money::new(1000).split_evenly(3).unwrap();
        assert_eq!(shares, vec![Money::new(334), Money::new(333), Money::new(333)]);
        assert_eq!(shares.iter().sum::<Money>(), Money::new(1000));

        let shares = Money::new(9000).split_evenly(3).unwrap();
        assert_eq!(shares, vec![Money::new(3000); 3]);
    }

    #[test]
    fn split_evenly_rejects_degenerate_input() {
        assert!(Money::new(100).split_evenly(0).is_none());
        assert!(Money::new(-100).split_evenly(2).is_none());
    }

    #[test]
    fn tolerance_checks_hold_at_the_i64_limits() {
        assert!(!Money::new(i64::MAX).approx_eq(Money::new(i64::MIN)));
        assert!(Money::new(i64::MAX).approx_eq(Money::new(i64::MAX - 1)));
        assert!(!Money::new(i64::MIN).is_settled());
        assert!(Money::new(-1).is_settled());
    }

    #[test]
    fn checked_add_reports_overflow() {
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);
        assert_eq!(Money::new(2).checked_add(Money::new(3)), Some(Money::new(5)));
    }

    #[test]
    fn ensure_payable_bounds() {
        assert_eq!(Money::MAX.ensure_payable("amount_minor"), Ok(Money::MAX));
        assert_eq!(
            Money::new(0).ensure_payable("amount_minor"),
            Err(EngineError::InvalidAmount("amount_minor must be > 0".to_string()))
        );
        assert_eq!(
            (Money::MAX + Money::new(1)).ensure_payable("amount_minor"),
            Err(EngineError::InvalidAmount(
                "amount_minor must be <= 100000000000".to_string()
            ))
        );
    }
}
