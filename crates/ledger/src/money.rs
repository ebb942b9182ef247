use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
};

/// A monetary amount in integer cents.
///
/// Every amount in the ledger is one of these: entry amounts, salary
/// figures, report totals. Arithmetic stays in `i64` cents end to end, so
/// totals are exact and a balance is a plain subtraction.
///
/// Positive means money coming in, negative money going out; the sign is
/// carried by the value, the direction of an entry by its kind.
///
/// ```rust
/// use ledger::MoneyCents;
///
/// let rent = MoneyCents::new(90_000);
/// assert_eq!(rent.cents(), 90_000);
/// assert_eq!(rent.to_string(), "R$ 900.00");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Scales the amount by a month count. `None` on overflow, which a
    /// report treats as an internal error rather than wrapping silently.
    #[must_use]
    pub const fn checked_mul(self, factor: i64) -> Option<MoneyCents> {
        match self.0.checked_mul(factor) {
            Some(cents) => Some(MoneyCents(cents)),
            None => None,
        }
    }
}

impl fmt::Display for MoneyCents {
    /// `R$ 12.34`, with the sign ahead of the currency: `-R$ 12.34`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let cents = self.0.unsigned_abs();
        write!(f, "R$ {}.{:02}", cents / 100, cents % 100)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_reais_with_two_decimals() {
        assert_eq!(MoneyCents::ZERO.to_string(), "R$ 0.00");
        assert_eq!(MoneyCents::new(7).to_string(), "R$ 0.07");
        assert_eq!(MoneyCents::new(90_000).to_string(), "R$ 900.00");
        assert_eq!(MoneyCents::new(123_456).to_string(), "R$ 1234.56");
        assert_eq!(MoneyCents::new(-105).to_string(), "-R$ 1.05");
    }

    #[test]
    fn arithmetic_stays_in_cents() {
        let mut total = MoneyCents::ZERO;
        total += MoneyCents::new(1_050);
        total += MoneyCents::new(2_000);
        assert_eq!(total, MoneyCents::new(3_050));
        assert_eq!(total - MoneyCents::new(50), MoneyCents::new(3_000));
        assert_eq!(
            MoneyCents::new(1_000) + MoneyCents::new(-2_500),
            MoneyCents::new(-1_500)
        );
    }

    #[test]
    fn checked_mul_scales_and_catches_overflow() {
        assert_eq!(
            MoneyCents::new(5_000).checked_mul(12),
            Some(MoneyCents::new(60_000))
        );
        assert_eq!(MoneyCents::new(i64::MAX).checked_mul(2), None);
    }

    #[test]
    fn sign_predicates() {
        assert!(MoneyCents::new(1).is_positive());
        assert!(MoneyCents::new(-1).is_negative());
        assert!(!MoneyCents::ZERO.is_positive());
        assert!(!MoneyCents::ZERO.is_negative());
    }
}
