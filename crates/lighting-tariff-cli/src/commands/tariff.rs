use clap::Args;
use serde_json::Value;

use lighting_tariff_core::{calculate, regulatory_parameters, CalculationRequest};

use crate::input;

/// Arguments for the full tariff calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Tenant the calculation is issued for
    #[arg(long, default_value = "public")]
    pub tenant: String,
}

/// Arguments for the regulatory parameter lookup
#[derive(Args)]
pub struct ParametersArgs {
    /// Application year (2022 or later)
    #[arg(long)]
    pub year: i32,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CalculationRequest =
        input::read_required(args.input.as_deref(), "tariff calculation")?;
    let result = calculate(&request, &args.tenant)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_parameters(args: ParametersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = regulatory_parameters(args.year)?;
    Ok(serde_json::to_value(params)?)
}
