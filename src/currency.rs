use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A fixed-currency (INR) amount in paise. Bills never carry fractions of a
/// paisa and amounts are immutable once a bill exists, so a plain integer
/// newtype is all we need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    pub fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    pub fn paise(&self) -> i64 {
        self.0
    }

    pub fn whole_rupees(&self) -> i64 {
        self.0 / 100
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_inr(*self))
    }
}

/// Format an amount the way the portal shows it: rupee sign, en-IN digit
/// grouping (last three digits, then groups of two), no fraction digits.
pub fn format_inr(amount: Money) -> String {
    let rupees = amount.whole_rupees();
    let sign = if rupees < 0 { "-" } else { "" };
    format!("{}₹{}", sign, group_indian(rupees.unsigned_abs()))
}

fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let head_bytes = head.as_bytes();
    let mut end = head_bytes.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
