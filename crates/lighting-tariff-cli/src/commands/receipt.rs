use clap::Args;
use serde_json::Value;

use lighting_tariff_core::receipt::{receipt_template, render_template, ReceiptTemplate};
use lighting_tariff_core::{render_receipt_from_calculation, CalculationRequest, ReceiptMetadata};

use crate::input;

/// Arguments for rendering a receipt from a filled-in template
#[derive(Args)]
pub struct ReceiptArgs {
    /// Path to JSON or YAML receipt template
    #[arg(long)]
    pub input: Option<String>,

    /// Tenant the receipt is issued for
    #[arg(long, default_value = "public")]
    pub tenant: String,
}

/// Arguments for rendering a receipt straight from a calculation request
#[derive(Args)]
pub struct ReceiptFromCalculationArgs {
    /// Path to JSON or YAML calculation request
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON or YAML receipt metadata (issuing entity, data source, ...)
    #[arg(long)]
    pub metadata: String,

    /// Tenant the receipt is issued for
    #[arg(long, default_value = "public")]
    pub tenant: String,
}

pub fn run_receipt(args: ReceiptArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let template: ReceiptTemplate = input::read_required(args.input.as_deref(), "receipt")?;
    let result = render_template(&template, &args.tenant)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_receipt_from_calculation(
    args: ReceiptFromCalculationArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CalculationRequest =
        input::read_required(args.input.as_deref(), "receipt from calculation")?;
    let metadata: ReceiptMetadata = input::file::read_input(&args.metadata)?;
    let result = render_receipt_from_calculation(&request, &metadata, &args.tenant)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_receipt_template() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(receipt_template())?)
}
