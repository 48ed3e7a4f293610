use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::TensionLevel;

#[derive(Debug, Error)]
pub enum TariffError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Duplicate tension level {level} in {section}")]
    DuplicateLevel {
        section: String,
        level: TensionLevel,
    },

    #[error(
        "Capital unit #{unit} at tension level {level} declares a luminaire cost \
         but no luminous efficacy (lm/W)"
    )]
    MissingLuminousEfficacy { level: TensionLevel, unit: usize },

    #[error(
        "No energy tariff (TEE) for tension level {level}; it is required to price VCEEI"
    )]
    MissingEnergyLevel { level: TensionLevel },

    #[error(
        "Environmental costs ({environmental_cost}) exceed 5% of CAOM \
         (limit: {limit:.2}, excess: {excess:.2})"
    )]
    EnvironmentalCapExceeded {
        environmental_cost: Decimal,
        limit: Decimal,
        excess: Decimal,
    },

    #[error("Invalid parameter: {parameter}: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Broad class of an engine error, as seen by the calling service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected by a business rule or a precondition.
    Validation,
    /// The formulas degenerated on otherwise valid input.
    Calculation,
}

impl TariffError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TariffError::CalculationError(_) => ErrorKind::Calculation,
            TariffError::InvalidInput { .. }
            | TariffError::DuplicateLevel { .. }
            | TariffError::MissingLuminousEfficacy { .. }
            | TariffError::MissingEnergyLevel { .. }
            | TariffError::EnvironmentalCapExceeded { .. }
            | TariffError::InvalidParameter { .. }
            | TariffError::SerializationError(_) => ErrorKind::Validation,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

impl From<serde_json::Error> for TariffError {
    fn from(e: serde_json::Error) -> Self {
        TariffError::SerializationError(e.to_string())
    }
}
