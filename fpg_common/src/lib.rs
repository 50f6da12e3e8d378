pub mod helpers;
mod money;
mod secret;

pub use money::{MajorUnits, MinorUnits, MoneyConversionError, DEFAULT_CURRENCY_CODE, MINOR_UNITS_PER_MAJOR};
pub use secret::Secret;
