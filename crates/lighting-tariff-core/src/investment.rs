use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annualization::annualization_factor;
use crate::checked;
use crate::error::TariffError;
use crate::levels::{LevelKeyed, LevelMap};
use crate::tables::{DEFAULT_LAND_FRACTION, REFERENCE_EFFICACY};
use crate::types::{money, Money, Rate, TensionLevel};
use crate::TariffResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A capital unit (UCAP): infrastructure plus luminaire, recovered over its useful life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalUnit {
    #[serde(default)]
    pub base_infrastructure_cost: Money,
    #[serde(default)]
    pub base_luminaire_cost: Money,
    /// Luminous efficacy in lm/W. Required when `base_luminaire_cost` > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luminous_efficacy: Option<Decimal>,
    pub useful_life_years: u32,
}

/// Land used by the installation, valued at its cadastral assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandParcel {
    pub area_m2: Decimal,
    pub assessed_value_per_m2: Money,
}

/// Investment inputs for one tension level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentLevelInput {
    pub level: TensionLevel,
    #[serde(default)]
    pub capital_units: Vec<CapitalUnit>,
    #[serde(default)]
    pub land_parcels: Vec<LandParcel>,
    #[serde(default = "default_land_fraction")]
    pub land_cost_fraction: Rate,
}

fn default_land_fraction() -> Rate {
    DEFAULT_LAND_FRACTION
}

impl LevelKeyed for InvestmentLevelInput {
    fn tension_level(&self) -> TensionLevel {
        self.level
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-level CINV breakdown, money-rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentLevelResult {
    pub level: TensionLevel,
    /// Annualized cost of exclusive-use assets
    pub caae_n: Money,
    /// Annual land cost
    pub cat_n: Money,
    /// Non-exclusive-use adjustment
    pub caane_n: Money,
    /// Total annual investment cost before availability
    pub caa_n: Money,
    /// Investment cost after availability
    pub cinv_n: Money,
}

#[derive(Debug, Clone)]
pub struct InvestmentCost {
    pub total: Money,
    pub levels: Vec<InvestmentLevelResult>,
}

/// Parameters shared by every level of the investment calculation.
#[derive(Debug, Clone, Copy)]
pub struct InvestmentParams {
    pub discount_rate: Rate,
    /// Non-exclusive-use fraction (NE)
    pub unmetered_fraction: Rate,
    pub availability_index: Rate,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Annualized investment cost (CINV) across tension levels.
///
/// caae_n  = sum((CR_I + CR_L * eff / 130) * annuity(r, life))
/// cat_n   = land_fraction * sum(area * assessed_value)
/// caane_n = NE * caae_n
/// cinv_n  = (caae_n + cat_n + caane_n) * ID
pub fn investment_cost(
    levels: &LevelMap<'_, InvestmentLevelInput>,
    params: InvestmentParams,
) -> TariffResult<InvestmentCost> {
    let mut total = Decimal::ZERO;
    let mut results = Vec::with_capacity(levels.len());

    for (&level, item) in levels {
        validate_investment_level(item)?;

        let mut caae_n = Decimal::ZERO;
        for (i, unit) in item.capital_units.iter().enumerate() {
            let annuity = annualization_factor(params.discount_rate, unit.useful_life_years)?;
            let luminaire = scaled_luminaire_cost(level, i, unit)?;
            let field = format!("investment[{level}].capital_units[{i}]");
            let base = checked::add(unit.base_infrastructure_cost, luminaire, &field)?;
            let annualized = checked::mul(base, annuity, &field)?;
            caae_n = checked::add(
                caae_n,
                annualized,
                format_args!("investment[{level}].caae_n"),
            )?;
        }

        let mut land_value = Decimal::ZERO;
        for (i, parcel) in item.land_parcels.iter().enumerate() {
            let field = format!("investment[{level}].land_parcels[{i}]");
            let value = checked::mul(parcel.area_m2, parcel.assessed_value_per_m2, &field)?;
            land_value = checked::add(land_value, value, &field)?;
        }
        let cat_n = checked::mul(
            item.land_cost_fraction,
            land_value,
            format_args!("investment[{level}].cat_n"),
        )?;
        let caane_n = checked::mul(
            params.unmetered_fraction,
            caae_n,
            format_args!("investment[{level}].caane_n"),
        )?;
        let caa_n = checked::sum(
            [caae_n, cat_n, caane_n],
            format_args!("investment[{level}].caa_n"),
        )?;
        let cinv_n = checked::mul(
            caa_n,
            params.availability_index,
            format_args!("investment[{level}].cinv_n"),
        )?;
        total = checked::add(total, cinv_n, "cinv")?;
        debug!(%level, %caa_n, %cinv_n, "investment level annualized");

        results.push(InvestmentLevelResult {
            level,
            caae_n: money(caae_n),
            cat_n: money(cat_n),
            caane_n: money(caane_n),
            caa_n: money(caa_n),
            cinv_n: money(cinv_n),
        });
    }

    Ok(InvestmentCost {
        total,
        levels: results,
    })
}

/// Luminaire cost scaled by efficacy relative to the reference; zero when no
/// luminaire cost is declared.
fn scaled_luminaire_cost(
    level: TensionLevel,
    index: usize,
    unit: &CapitalUnit,
) -> TariffResult<Money> {
    if unit.base_luminaire_cost <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let efficacy = unit
        .luminous_efficacy
        .ok_or(TariffError::MissingLuminousEfficacy { level, unit: index })?;
    checked::mul(
        efficacy / REFERENCE_EFFICACY,
        unit.base_luminaire_cost,
        format_args!("investment[{level}].capital_units[{index}].luminaire_cost"),
    )
}

fn validate_investment_level(item: &InvestmentLevelInput) -> TariffResult<()> {
    if item.land_cost_fraction < Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: format!("investment[{}].land_cost_fraction", item.level),
            reason: "Land cost fraction cannot be negative".into(),
        });
    }

    for (i, unit) in item.capital_units.iter().enumerate() {
        let field = format!("investment[{}].capital_units[{i}]", item.level);
        if unit.base_infrastructure_cost < Decimal::ZERO || unit.base_luminaire_cost < Decimal::ZERO
        {
            return Err(TariffError::InvalidInput {
                field,
                reason: "Infrastructure and luminaire costs cannot be negative".into(),
            });
        }
        if unit.useful_life_years == 0 {
            return Err(TariffError::InvalidInput {
                field,
                reason: "Useful life must be at least one year".into(),
            });
        }
        match unit.luminous_efficacy {
            Some(efficacy) if efficacy <= Decimal::ZERO => {
                return Err(TariffError::InvalidInput {
                    field,
                    reason: "Luminous efficacy must be positive".into(),
                });
            }
            None if unit.base_luminaire_cost > Decimal::ZERO => {
                return Err(TariffError::MissingLuminousEfficacy {
                    level: item.level,
                    unit: i,
                });
            }
            _ => {}
        }
    }

    for (i, parcel) in item.land_parcels.iter().enumerate() {
        if parcel.area_m2 <= Decimal::ZERO || parcel.assessed_value_per_m2 < Decimal::ZERO {
            return Err(TariffError::InvalidInput {
                field: format!("investment[{}].land_parcels[{i}]", item.level),
                reason: "Parcel area must be positive and assessed value non-negative".into(),
            });
        }
    }

    Ok(())
}
