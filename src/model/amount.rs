//! Amount type for handling monetary values read from minor currency units.
//!
//! This module provides the `Amount` type which wraps `Decimal`. The source database stores
//! amounts as whole minor units (cents), so conversion is exact and the textual form is the
//! shortest decimal that represents the value.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};

/// The character used between the integer and fractional part of an amount when it is written
/// out.
///
/// # Examples
///  - `DecimalSeparator::Dot` -> `-1234.5`
///  - `DecimalSeparator::Comma` -> `-1234,5`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecimalSeparator {
    #[default]
    Dot,
    Comma,
}

impl DecimalSeparator {
    /// Returns `Comma` when `decimal_commas` is true, otherwise `Dot`.
    pub fn from_flag(decimal_commas: bool) -> Self {
        if decimal_commas {
            DecimalSeparator::Comma
        } else {
            DecimalSeparator::Dot
        }
    }
}

/// Represents a monetary amount in major units.
///
/// The value is kept normalized, so trailing fractional zeros are never printed.
///
/// # Examples
///
/// From minor units:
/// ```
/// # use expense_export::model::Amount;
/// let amount = Amount::from_minor_units(1050);
/// assert_eq!(amount.to_string(), "10.5");
/// ```
///
/// Whole amounts have no fractional part:
/// ```
/// # use expense_export::model::Amount;
/// let amount = Amount::from_minor_units(-1200);
/// assert_eq!(amount.to_string(), "-12");
/// ```
///
/// Decimal commas are a textual substitution:
/// ```
/// # use expense_export::model::{Amount, DecimalSeparator};
/// let amount = Amount::from_minor_units(307);
/// assert_eq!(amount.format_with(DecimalSeparator::Comma), "3,07");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    /// Creates a new Amount from a Decimal value.
    pub fn new(value: Decimal) -> Self {
        Self {
            value: value.normalize(),
        }
    }

    /// Creates an Amount from an integer number of hundredths, e.g. cents.
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self::new(Decimal::new(minor_units, 2))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Writes the amount using `separator`. The comma form is produced by replacing the `.` of
    /// the plain form, so no digits are ever changed.
    pub fn format_with(&self, separator: DecimalSeparator) -> String {
        let s = self.to_string();
        match separator {
            DecimalSeparator::Dot => s,
            DecimalSeparator::Comma => s.replacen('.', ",", 1),
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
