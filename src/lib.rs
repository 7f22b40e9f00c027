use std::fmt;

use derive_more::{Add, Mul, Sub, Sum};
use serde::Deserialize;

pub mod holding;
pub mod portfolio;
pub mod target;

/// Fraction of total portfolio value, in `[0, 1]`.
pub type Fraction = f64;

/// A dollar amount.
///
/// Amounts add and subtract with each other, scale by a plain number, and
/// sum over an iterator. Anything else (dividing value by price to get a
/// share count, say) goes through the inner `f64`.
#[derive(Add, Clone, Copy, Debug, Default, Deserialize, Mul, PartialEq, PartialOrd, Sub, Sum)]
#[serde(transparent)]
pub struct Dollar(pub f64);

impl Dollar {
    pub fn abs(self) -> Dollar {
        Dollar(self.0.abs())
    }

    /// Rounded to whole cents.
    pub fn round_cents(self) -> Dollar {
        Dollar(round_to(self.0, 2))
    }
}

impl fmt::Display for Dollar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// Round half away from zero at `places` decimal digits.
pub(crate) fn round_to(x: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (x * factor).round() / factor
}
