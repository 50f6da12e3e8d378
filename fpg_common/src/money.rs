use std::{fmt::Display, str::FromStr};

use rust_decimal::{
    prelude::{ToPrimitive, Zero},
    Decimal,
};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "NGN";
/// Kobo per naira (or cents per dollar). Every currency the gateway supports for this deployment uses 2 decimals.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyConversionError {
    #[error("{0} cannot be expressed as a whole number of minor units")]
    FractionalMinorUnits(Decimal),
    #[error("{0} is too large to be expressed in minor units")]
    Overflow(Decimal),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

//--------------------------------------     MinorUnits      ---------------------------------------------------------
/// An amount in the smallest indivisible unit of a currency (e.g. kobo). Payment gateway APIs speak in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} minor units", self.0)
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts to major units by dividing by [`MINOR_UNITS_PER_MAJOR`].
    ///
    /// Call this at the payment gateway boundary only. The rest of the system never sees minor units.
    pub fn to_major_units(&self) -> MajorUnits {
        MajorUnits((Decimal::from(self.0) / Decimal::from(MINOR_UNITS_PER_MAJOR)).normalize())
    }
}

//--------------------------------------     MajorUnits      ---------------------------------------------------------
/// An amount in the standard display unit of a currency (e.g. naira). This is the unit used throughout the engine and
/// in the database.
///
/// Whole amounts serialize as JSON integers and fractional amounts as JSON floats. Strings and numbers are both
/// accepted when deserializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct MajorUnits(Decimal);

impl MajorUnits {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn from_whole(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::zero()
    }

    /// Converts to minor units by multiplying by [`MINOR_UNITS_PER_MAJOR`].
    ///
    /// Like [`MinorUnits::to_major_units`], this belongs at the payment gateway boundary and nowhere else.
    /// Amounts with a fraction of a minor unit (e.g. 10.005) are rejected rather than rounded.
    pub fn to_minor_units(&self) -> Result<MinorUnits, MoneyConversionError> {
        let scaled =
            self.0.checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR)).ok_or(MoneyConversionError::Overflow(self.0))?;
        if !scaled.fract().is_zero() {
            return Err(MoneyConversionError::FractionalMinorUnits(self.0));
        }
        scaled.to_i64().map(MinorUnits).ok_or(MoneyConversionError::Overflow(self.0))
    }
}

impl From<Decimal> for MajorUnits {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Display for MajorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for MajorUnits {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self).map_err(|e| MoneyConversionError::InvalidAmount(format!("{s}. {e}")))
    }
}

impl TryFrom<String> for MajorUnits {
    type Error = MoneyConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for MajorUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0.normalize();
        match (value.fract().is_zero(), value.to_i64(), value.to_f64()) {
            (true, Some(v), _) => serializer.serialize_i64(v),
            (_, _, Some(v)) => serializer.serialize_f64(v),
            _ => serializer.serialize_str(&value.to_string()),
        }
    }
}
