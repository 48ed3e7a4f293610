use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checked;
use crate::energy::TariffLookup;
use crate::error::TariffError;
use crate::levels::{LevelKeyed, LevelMap};
use crate::types::{money, Money, Rate, TensionLevel};
use crate::TariffResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Capacity left unavailable for a number of hours at one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityEvent {
    pub power_kw: Decimal,
    pub unavailable_hours: Decimal,
}

/// Administration, operation and maintenance inputs for one tension level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AomLevelInput {
    pub level: TensionLevel,
    /// Recurring administration cost (CRA)
    pub recurring_admin_cost: Money,
    /// Recurring luminaire maintenance cost (CRAL)
    pub recurring_luminaire_maintenance_cost: Money,
    #[serde(default)]
    pub unavailability_events: Vec<UnavailabilityEvent>,
}

impl LevelKeyed for AomLevelInput {
    fn tension_level(&self) -> TensionLevel {
        self.level
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-level CAOM breakdown, money-rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AomLevelResult {
    pub level: TensionLevel,
    /// Value of energy not supplied (VCEEI)
    pub vceei_n: Money,
    /// CRA + CRAL for this level
    pub crta_n: Money,
    pub caom_n: Money,
}

#[derive(Debug, Clone)]
pub struct MaintenanceCost {
    pub total: Money,
    pub levels: Vec<AomLevelResult>,
}

/// Factors shared by every level of the O&M calculation.
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceParams {
    /// FAOM_N, applied to each level's own CRA
    pub base_om_factor: Rate,
    pub faoml: Rate,
    pub faoms: Rate,
    pub availability_index: Rate,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Operation and maintenance cost (CAOM) across tension levels.
///
/// caom_n = (CRA_n * FAOM_N + sum(CRAL) * FAOML + CRTA_n * FAOMS) * ID - VCEEI_n
///
/// The CRAL term sums across every AOM level, not just the current one.
/// VCEEI_n prices unavailable energy at the level's TEE, so every AOM level
/// needs a tariff in `tariffs`. Negative level and total values are kept.
pub fn maintenance_cost(
    levels: &LevelMap<'_, AomLevelInput>,
    tariffs: &TariffLookup,
    params: MaintenanceParams,
) -> TariffResult<MaintenanceCost> {
    for item in levels.values() {
        validate_aom_level(item)?;
    }

    let cral_total = checked::sum(
        levels
            .values()
            .map(|item| item.recurring_luminaire_maintenance_cost),
        "aom.cral_total",
    )?;

    let mut total = Decimal::ZERO;
    let mut results = Vec::with_capacity(levels.len());

    for (&level, item) in levels {
        let tariff = tariffs
            .get(&level)
            .copied()
            .ok_or(TariffError::MissingEnergyLevel { level })?;

        let mut unavailable_energy = Decimal::ZERO;
        for (i, event) in item.unavailability_events.iter().enumerate() {
            let field = format!("aom[{level}].unavailability_events[{i}]");
            let energy = checked::mul(event.power_kw, event.unavailable_hours, &field)?;
            unavailable_energy = checked::add(unavailable_energy, energy, &field)?;
        }
        let vceei_n = checked::mul(
            tariff,
            unavailable_energy,
            format_args!("aom[{level}].vceei_n"),
        )?;
        let crta_n = checked::add(
            item.recurring_admin_cost,
            item.recurring_luminaire_maintenance_cost,
            format_args!("aom[{level}].crta_n"),
        )?;

        let recognised_field = format!("aom[{level}].recognised_cost");
        let own_admin = checked::mul(
            item.recurring_admin_cost,
            params.base_om_factor,
            &recognised_field,
        )?;
        let shared_luminaire = checked::mul(cral_total, params.faoml, &recognised_field)?;
        let marine = checked::mul(crta_n, params.faoms, &recognised_field)?;
        let recognised = checked::sum([own_admin, shared_luminaire, marine], &recognised_field)?;
        let caom_field = format!("aom[{level}].caom_n");
        let caom_n = checked::sub(
            checked::mul(recognised, params.availability_index, &caom_field)?,
            vceei_n,
            &caom_field,
        )?;
        total = checked::add(total, caom_n, "caom")?;
        debug!(%level, %vceei_n, %caom_n, "maintenance level priced");

        results.push(AomLevelResult {
            level,
            vceei_n: money(vceei_n),
            crta_n: money(crta_n),
            caom_n: money(caom_n),
        });
    }

    Ok(MaintenanceCost {
        total,
        levels: results,
    })
}

fn validate_aom_level(item: &AomLevelInput) -> TariffResult<()> {
    if item.recurring_admin_cost < Decimal::ZERO
        || item.recurring_luminaire_maintenance_cost < Decimal::ZERO
    {
        return Err(TariffError::InvalidInput {
            field: format!("aom[{}]", item.level),
            reason: "Recurring admin and luminaire maintenance costs cannot be negative".into(),
        });
    }
    for (i, event) in item.unavailability_events.iter().enumerate() {
        if event.power_kw < Decimal::ZERO || event.unavailable_hours < Decimal::ZERO {
            return Err(TariffError::InvalidInput {
                field: format!("aom[{}].unavailability_events[{i}]", item.level),
                reason: "Unavailable power and hours cannot be negative".into(),
            });
        }
    }
    Ok(())
}
