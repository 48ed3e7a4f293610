pub mod annualization;
pub mod availability;
pub mod calculator;
mod checked;
pub mod energy;
pub mod error;
pub mod indexation;
pub mod investment;
pub mod levels;
pub mod maintenance;
pub mod other_costs;
pub mod receipt;
pub mod tables;
pub mod types;

pub use calculator::{
    calculate, render_receipt_from_calculation, CalculationRequest, CalculationResult,
};
pub use error::{ErrorKind, TariffError};
pub use receipt::{render_receipt, ReceiptComponents, ReceiptMetadata, ReceiptResult};
pub use tables::{faoml_for_year, regulatory_parameters};
pub use types::*;

/// Standard result type for all tariff operations
pub type TariffResult<T> = Result<T, TariffError>;
