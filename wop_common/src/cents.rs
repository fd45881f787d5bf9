use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;

use crate::op;

//--------------------------------------        Cents         ---------------------------------------------------------
/// A monetary amount in US cents. All arithmetic saturates, so sums of catalogue prices can never wrap.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Cents(i64);

op!(binary Cents, Add, add, saturating_add);
op!(binary Cents, Sub, sub, saturating_sub);
op!(inplace Cents, AddAssign, add_assign, saturating_add);
op!(inplace Cents, SubAssign, sub_assign, saturating_sub);
op!(unary Cents, Neg, neg, saturating_neg);

impl Mul<i64> for Cents {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl Cents {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Clamps negative amounts to zero.
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0))
    }
}
