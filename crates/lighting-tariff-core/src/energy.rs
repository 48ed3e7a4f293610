use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checked;
use crate::error::TariffError;
use crate::levels::{LevelKeyed, LevelMap};
use crate::types::{money, Energy, Money, TensionLevel};
use crate::TariffResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Unmetered ("aforado") load of one illumination class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeteredClassRecord {
    /// Illumination class, 1 to 3
    pub illumination_class: u8,
    pub load_kw: Decimal,
    pub daily_hours: Decimal,
    pub billing_days: Decimal,
}

impl MeteredClassRecord {
    /// load x hours x days, in kWh. `None` when the product overflows.
    pub fn estimated_energy(&self) -> Option<Energy> {
        self.load_kw
            .checked_mul(self.daily_hours)?
            .checked_mul(self.billing_days)
    }
}

/// Energy supply inputs for one tension level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyLevelInput {
    pub level: TensionLevel,
    /// Unit energy tariff (TEE) for this level
    pub unit_energy_tariff: Money,
    #[serde(default)]
    pub metered_energy_kwh: Energy,
    #[serde(default)]
    pub class_records: Vec<MeteredClassRecord>,
}

impl LevelKeyed for EnergyLevelInput {
    fn tension_level(&self) -> TensionLevel {
        self.level
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-level CSEE breakdown, money-rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyLevelResult {
    pub level: TensionLevel,
    pub unit_energy_tariff: Money,
    pub metered_energy_kwh: Energy,
    pub estimated_energy_kwh: Energy,
    pub total_energy_kwh: Energy,
    pub csee_n: Money,
}

/// Unit tariff (TEE) per tension level, read by the O&M calculator.
pub type TariffLookup = BTreeMap<TensionLevel, Money>;

/// Full-precision CSEE total plus the emitted per-level rows.
#[derive(Debug, Clone)]
pub struct EnergyCost {
    pub total: Money,
    pub levels: Vec<EnergyLevelResult>,
    pub tariffs: TariffLookup,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Energy supply cost (CSEE) across tension levels.
///
/// With the mixed formulation, billed energy is metered + estimated. Without
/// it, a metered reading above zero takes precedence and the estimate is only
/// used when nothing was metered.
pub fn energy_cost(
    levels: &LevelMap<'_, EnergyLevelInput>,
    mixed_formulation: bool,
) -> TariffResult<EnergyCost> {
    let mut total = Decimal::ZERO;
    let mut results = Vec::with_capacity(levels.len());
    let mut tariffs = TariffLookup::new();

    for (&level, item) in levels {
        validate_energy_level(item)?;

        let mut estimated: Energy = Decimal::ZERO;
        for (i, record) in item.class_records.iter().enumerate() {
            let energy = record.estimated_energy().ok_or_else(|| {
                checked::overflow(format_args!("energy[{level}].class_records[{i}]"))
            })?;
            estimated = checked::add(
                estimated,
                energy,
                format_args!("energy[{level}].estimated_energy_kwh"),
            )?;
        }

        let total_energy = if mixed_formulation {
            checked::add(
                item.metered_energy_kwh,
                estimated,
                format_args!("energy[{level}].total_energy_kwh"),
            )?
        } else if item.metered_energy_kwh > Decimal::ZERO {
            item.metered_energy_kwh
        } else {
            estimated
        };

        let csee_n = checked::mul(
            item.unit_energy_tariff,
            total_energy,
            format_args!("energy[{level}].csee_n"),
        )?;
        total = checked::add(total, csee_n, "csee")?;
        debug!(%level, %total_energy, %csee_n, "energy level priced");

        tariffs.insert(level, item.unit_energy_tariff);
        results.push(EnergyLevelResult {
            level,
            unit_energy_tariff: money(item.unit_energy_tariff),
            metered_energy_kwh: money(item.metered_energy_kwh),
            estimated_energy_kwh: money(estimated),
            total_energy_kwh: money(total_energy),
            csee_n: money(csee_n),
        });
    }

    Ok(EnergyCost {
        total,
        levels: results,
        tariffs,
    })
}

fn validate_energy_level(item: &EnergyLevelInput) -> TariffResult<()> {
    if item.unit_energy_tariff < Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: format!("energy[{}].unit_energy_tariff", item.level),
            reason: "Unit energy tariff cannot be negative".into(),
        });
    }
    if item.metered_energy_kwh < Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: format!("energy[{}].metered_energy_kwh", item.level),
            reason: "Metered energy cannot be negative".into(),
        });
    }
    for (i, record) in item.class_records.iter().enumerate() {
        if !(1..=3).contains(&record.illumination_class) {
            return Err(TariffError::InvalidInput {
                field: format!("energy[{}].class_records[{i}].illumination_class", item.level),
                reason: "Illumination class must be 1, 2 or 3".into(),
            });
        }
        if record.load_kw <= Decimal::ZERO
            || record.daily_hours <= Decimal::ZERO
            || record.billing_days <= Decimal::ZERO
        {
            return Err(TariffError::InvalidInput {
                field: format!("energy[{}].class_records[{i}]", item.level),
                reason: "Load, daily hours and billing days must be positive".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::index_by_level;
    use rust_decimal_macros::dec;

    fn class(load_kw: Decimal, daily_hours: Decimal, billing_days: Decimal) -> MeteredClassRecord {
        MeteredClassRecord {
            illumination_class: 1,
            load_kw,
            daily_hours,
            billing_days,
        }
    }

    fn sample_levels() -> Vec<EnergyLevelInput> {
        vec![
            EnergyLevelInput {
                level: TensionLevel::Low,
                unit_energy_tariff: dec!(100),
                metered_energy_kwh: dec!(10),
                class_records: vec![class(dec!(1), dec!(2), dec!(3))],
            },
            EnergyLevelInput {
                level: TensionLevel::Medium,
                unit_energy_tariff: dec!(200),
                metered_energy_kwh: dec!(5),
                class_records: vec![],
            },
        ]
    }

    #[test]
    fn test_mixed_formulation_adds_metered_and_estimated() {
        let inputs = sample_levels();
        let map = index_by_level("energy", &inputs).unwrap();
        let cost = energy_cost(&map, true).unwrap();

        // L1: 100 * (10 + 6) = 1600, L2: 200 * 5 = 1000
        assert_eq!(cost.total, dec!(2600));
        assert_eq!(cost.levels.len(), 2);
        assert_eq!(cost.levels[0].estimated_energy_kwh, dec!(6));
        assert_eq!(cost.levels[0].total_energy_kwh, dec!(16));
        assert_eq!(cost.levels[0].csee_n, dec!(1600));
        assert_eq!(cost.levels[1].csee_n, dec!(1000));
    }

    #[test]
    fn test_either_or_prefers_metered_reading() {
        // Legacy policy when the mixed formulation is off: the estimate is
        // ignored whenever a metered reading exists.
        let inputs = sample_levels();
        let map = index_by_level("energy", &inputs).unwrap();
        let cost = energy_cost(&map, false).unwrap();

        assert_eq!(cost.levels[0].total_energy_kwh, dec!(10));
        assert_eq!(cost.total, dec!(2000));
    }

    #[test]
    fn test_either_or_falls_back_to_estimate() {
        let mut inputs = sample_levels();
        inputs[0].metered_energy_kwh = Decimal::ZERO;
        let map = index_by_level("energy", &inputs).unwrap();
        let cost = energy_cost(&map, false).unwrap();

        assert_eq!(cost.levels[0].total_energy_kwh, dec!(6));
        assert_eq!(cost.levels[0].csee_n, dec!(600));
    }

    #[test]
    fn test_levels_emitted_ascending() {
        let mut inputs = sample_levels();
        inputs.reverse();
        let map = index_by_level("energy", &inputs).unwrap();
        let cost = energy_cost(&map, true).unwrap();

        assert_eq!(cost.levels[0].level, TensionLevel::Low);
        assert_eq!(cost.levels[1].level, TensionLevel::Medium);
    }

    #[test]
    fn test_tariff_lookup_carries_unrounded_tee() {
        let mut inputs = sample_levels();
        inputs[1].unit_energy_tariff = dec!(200.4567);
        let map = index_by_level("energy", &inputs).unwrap();
        let cost = energy_cost(&map, true).unwrap();

        assert_eq!(cost.tariffs[&TensionLevel::Medium], dec!(200.4567));
        assert_eq!(cost.levels[1].unit_energy_tariff, dec!(200.46));
    }

    #[test]
    fn test_overflowing_class_record_is_a_calculation_error() {
        let mut inputs = sample_levels();
        inputs[0].class_records = vec![class(
            dec!(1_000_000_000_000),
            dec!(1_000_000_000),
            dec!(1_000_000_000),
        )];
        let map = index_by_level("energy", &inputs).unwrap();
        let err = energy_cost(&map, true).unwrap_err();

        assert!(matches!(err, TariffError::CalculationError(_)));
        assert!(err.to_string().contains("energy[1].class_records[0]"));
    }

    #[test]
    fn test_overflowing_level_cost_is_a_calculation_error() {
        let mut inputs = sample_levels();
        inputs[1].unit_energy_tariff = Decimal::MAX;
        let map = index_by_level("energy", &inputs).unwrap();
        let err = energy_cost(&map, true).unwrap_err();

        assert!(err.to_string().contains("energy[2].csee_n"));
    }

    #[test]
    fn test_invalid_illumination_class_rejected() {
        let mut inputs = sample_levels();
        inputs[0].class_records[0].illumination_class = 4;
        let map = index_by_level("energy", &inputs).unwrap();
        assert!(energy_cost(&map, true).is_err());
    }

    #[test]
    fn test_non_positive_load_rejected() {
        let mut inputs = sample_levels();
        inputs[0].class_records[0].load_kw = Decimal::ZERO;
        let map = index_by_level("energy", &inputs).unwrap();
        assert!(energy_cost(&map, true).is_err());
    }
}
