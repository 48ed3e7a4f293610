use napi::Result as NapiResult;
use napi_derive::napi;

use lighting_tariff_core::receipt::{self, ReceiptTemplate};
use lighting_tariff_core::{CalculationRequest, ReceiptMetadata};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Tariff calculation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_tariff(input_json: String, tenant_id: String) -> NapiResult<String> {
    let input: CalculationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lighting_tariff_core::calculate(&input, &tenant_id).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn regulatory_parameters(year: i32) -> NapiResult<String> {
    let output = lighting_tariff_core::regulatory_parameters(year).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn faoml_for_year(year: i32) -> String {
    lighting_tariff_core::faoml_for_year(year).to_string()
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

#[napi]
pub fn render_receipt(template_json: String, tenant_id: String) -> NapiResult<String> {
    let template: ReceiptTemplate = serde_json::from_str(&template_json).map_err(to_napi_error)?;
    let output = receipt::render_template(&template, &tenant_id).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn render_receipt_from_calculation(
    input_json: String,
    metadata_json: String,
    tenant_id: String,
) -> NapiResult<String> {
    let input: CalculationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let metadata: ReceiptMetadata =
        serde_json::from_str(&metadata_json).map_err(to_napi_error)?;
    let output =
        lighting_tariff_core::render_receipt_from_calculation(&input, &metadata, &tenant_id)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn receipt_template() -> NapiResult<String> {
    serde_json::to_string(&receipt::receipt_template()).map_err(to_napi_error)
}
