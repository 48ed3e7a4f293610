use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and factors expressed as decimals (0.04 = 4%). Never as percentages.
pub type Rate = Decimal;

/// Energy quantities in kWh, and the physical inputs that produce them.
pub type Energy = Decimal;

/// Supply voltage level. Serialized as its regulatory integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TensionLevel {
    /// Level 1: low voltage
    Low,
    /// Level 2: medium voltage
    Medium,
}

impl TensionLevel {
    pub fn code(self) -> u8 {
        match self {
            TensionLevel::Low => 1,
            TensionLevel::Medium => 2,
        }
    }
}

impl TryFrom<u8> for TensionLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TensionLevel::Low),
            2 => Ok(TensionLevel::Medium),
            other => Err(format!("tension level must be 1 or 2, got {other}")),
        }
    }
}

impl From<TensionLevel> for u8 {
    fn from(level: TensionLevel) -> Self {
        level.code()
    }
}

impl fmt::Display for TensionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Money rounding: two decimal places, midpoint to even.
///
/// Applied once, when a value is written into a result structure.
pub fn money(value: Decimal) -> Money {
    value.round_dp(2)
}
