use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::availability::{availability_index, AvailabilityInput};
use crate::checked;
use crate::energy::{energy_cost, EnergyLevelInput, EnergyLevelResult};
use crate::error::TariffError;
use crate::indexation::{apply_indexation, CostTotals, IndexationResult, PriceIndexInput};
use crate::investment::{
    investment_cost, InvestmentLevelInput, InvestmentLevelResult, InvestmentParams,
};
use crate::levels::index_by_level;
use crate::maintenance::{maintenance_cost, AomLevelInput, AomLevelResult, MaintenanceParams};
use crate::other_costs::{check_environmental_cap, other_costs_total, OtherCostsInput};
use crate::receipt::{
    receipt_summary, render_receipt, ReceiptComponents, ReceiptMetadata, ReceiptResult,
    ReceiptSummary,
};
use crate::tables::{
    faoml_for_year, faoms_for, DEFAULT_FAOM_N, DEFAULT_NE_FRACTION, FIRST_APPLICATION_YEAR,
    METHODOLOGY,
};
use crate::types::{money, Money, Rate};
use crate::TariffResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A complete tariff calculation request for one municipality and period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub municipality: String,
    /// Billing period label, e.g. "2026-01"
    pub period: String,
    pub application_year: i32,
    pub discount_rate: Rate,
    /// Non-exclusive-use fraction (NE)
    #[serde(default = "default_ne_fraction")]
    pub unmetered_fraction: Rate,
    #[serde(default)]
    pub marine_environment: bool,
    /// FAOM_N
    #[serde(default = "default_faom_n")]
    pub base_om_factor: Rate,
    pub energy_levels: Vec<EnergyLevelInput>,
    pub investment_levels: Vec<InvestmentLevelInput>,
    pub availability: AvailabilityInput,
    pub aom_levels: Vec<AomLevelInput>,
    #[serde(default)]
    pub other_costs: OtherCostsInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_index: Option<PriceIndexInput>,
    /// Bill metered + estimated energy instead of metered-else-estimated.
    #[serde(default = "default_true")]
    pub mixed_energy_formulation: bool,
}

fn default_ne_fraction() -> Rate {
    DEFAULT_NE_FRACTION
}

fn default_faom_n() -> Rate {
    DEFAULT_FAOM_N
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Result of a tariff calculation. Monetary fields are money-rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub tenant_id: String,
    pub methodology: String,
    pub municipality: String,
    pub period: String,
    pub application_year: i32,
    pub availability_index: Rate,
    pub faoml: Rate,
    pub faoms: Rate,
    pub csee: Money,
    pub cinv: Money,
    pub caom: Money,
    pub cotr: Money,
    pub cap: Money,
    pub energy_levels: Vec<EnergyLevelResult>,
    pub investment_levels: Vec<InvestmentLevelResult>,
    pub aom_levels: Vec<AomLevelResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexation: Option<IndexationResult>,
    pub receipt: ReceiptSummary,
    pub alerts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Run the CREG 101 013 cost model for one request.
///
/// CAP = CSEE + CINV + CAOM + COTR, where CINV and CAOM are scaled by the
/// availability index and CAOM nets out the value of energy not supplied.
/// The environmental-cost cap is checked against CAOM before CAP is formed.
pub fn calculate(request: &CalculationRequest, tenant_id: &str) -> TariffResult<CalculationResult> {
    let _span = info_span!("calculate", tenant = tenant_id, municipality = %request.municipality)
        .entered();
    let mut alerts: Vec<String> = Vec::new();

    validate_request(request)?;

    let energy_map = index_by_level("energy_levels", &request.energy_levels)?;
    let investment_map = index_by_level("investment_levels", &request.investment_levels)?;
    let aom_map = index_by_level("aom_levels", &request.aom_levels)?;

    // --- CSEE ---
    let energy = energy_cost(&energy_map, request.mixed_energy_formulation)?;

    // --- Availability index ---
    let id = availability_index(&request.availability, &mut alerts)?;

    // --- CINV ---
    let investment = investment_cost(
        &investment_map,
        InvestmentParams {
            discount_rate: request.discount_rate,
            unmetered_fraction: request.unmetered_fraction,
            availability_index: id,
        },
    )?;

    // --- CAOM ---
    let faoml = faoml_for_year(request.application_year);
    let faoms = faoms_for(request.marine_environment);
    let maintenance = maintenance_cost(
        &aom_map,
        &energy.tariffs,
        MaintenanceParams {
            base_om_factor: request.base_om_factor,
            faoml,
            faoms,
            availability_index: id,
        },
    )?;

    // --- COTR and environmental cap ---
    let cotr = other_costs_total(&request.other_costs)?;
    check_environmental_cap(&request.other_costs, maintenance.total)?;

    // --- CAP ---
    let totals = CostTotals {
        csee: energy.total,
        cinv: investment.total,
        caom: maintenance.total,
        cotr,
    };
    let cap = checked::sum([totals.csee, totals.cinv, totals.caom, totals.cotr], "cap")?;
    debug!(csee = %totals.csee, cinv = %totals.cinv, caom = %totals.caom, cotr = %cotr, %cap);

    let indexation = request
        .price_index
        .as_ref()
        .map(|index| apply_indexation(index, totals))
        .transpose()?;

    let receipt = receipt_summary(
        &request.municipality,
        &request.period,
        &ReceiptComponents {
            csee: totals.csee,
            cinv: totals.cinv,
            caom: totals.caom,
            cotr: totals.cotr,
        },
        cap,
    );

    info!(cap = %money(cap), alerts = alerts.len(), "tariff calculated");

    Ok(CalculationResult {
        tenant_id: tenant_id.to_string(),
        methodology: METHODOLOGY.to_string(),
        municipality: request.municipality.clone(),
        period: request.period.clone(),
        application_year: request.application_year,
        availability_index: id,
        faoml,
        faoms,
        csee: money(totals.csee),
        cinv: money(totals.cinv),
        caom: money(totals.caom),
        cotr: money(totals.cotr),
        cap: money(cap),
        energy_levels: energy.levels,
        investment_levels: investment.levels,
        aom_levels: maintenance.levels,
        indexation,
        receipt,
        alerts,
    })
}

/// Calculate, then render a receipt from the rounded totals.
pub fn render_receipt_from_calculation(
    request: &CalculationRequest,
    metadata: &ReceiptMetadata,
    tenant_id: &str,
) -> TariffResult<ReceiptResult> {
    let result = calculate(request, tenant_id)?;
    let components = ReceiptComponents {
        csee: result.csee,
        cinv: result.cinv,
        caom: result.caom,
        cotr: result.cotr,
    };
    render_receipt(
        &components,
        metadata,
        &result.municipality,
        &result.period,
        &result.methodology,
        tenant_id,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_request(request: &CalculationRequest) -> TariffResult<()> {
    if request.municipality.chars().count() < 2 {
        return Err(TariffError::InvalidInput {
            field: "municipality".into(),
            reason: "Municipality must have at least 2 characters".into(),
        });
    }
    if request.period.chars().count() < 3 {
        return Err(TariffError::InvalidInput {
            field: "period".into(),
            reason: "Period must have at least 3 characters".into(),
        });
    }
    if request.application_year < FIRST_APPLICATION_YEAR {
        return Err(TariffError::InvalidInput {
            field: "application_year".into(),
            reason: format!("Application year must be {FIRST_APPLICATION_YEAR} or later"),
        });
    }
    if request.discount_rate <= Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be positive".into(),
        });
    }
    if request.unmetered_fraction < Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "unmetered_fraction".into(),
            reason: "Non-exclusive-use fraction cannot be negative".into(),
        });
    }
    if request.base_om_factor < Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "base_om_factor".into(),
            reason: "FAOM_N cannot be negative".into(),
        });
    }

    let sections = [
        ("energy_levels", request.energy_levels.is_empty()),
        ("investment_levels", request.investment_levels.is_empty()),
        ("aom_levels", request.aom_levels.is_empty()),
    ];
    for (field, empty) in sections {
        if empty {
            return Err(TariffError::InvalidInput {
                field: field.into(),
                reason: "Section must contain at least one tension level".into(),
            });
        }
    }

    Ok(())
}
