use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checked;
use crate::error::TariffError;
use crate::tables::{ENVIRONMENTAL_CAP_RATIO, ENVIRONMENTAL_CAP_TOLERANCE};
use crate::types::Money;
use crate::TariffResult;

/// Other regulated costs (COTR). Omitted fields default to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherCostsInput {
    #[serde(default)]
    pub oversight_cost: Money,
    #[serde(default)]
    pub environmental_cost: Money,
    #[serde(default)]
    pub insurance_cost: Money,
    #[serde(default)]
    pub permit_tax_cost: Money,
    #[serde(default)]
    pub miscellaneous_cost: Money,
}

impl OtherCostsInput {
    fn components(&self) -> [(&'static str, Money); 5] {
        [
            ("oversight_cost", self.oversight_cost),
            ("environmental_cost", self.environmental_cost),
            ("insurance_cost", self.insurance_cost),
            ("permit_tax_cost", self.permit_tax_cost),
            ("miscellaneous_cost", self.miscellaneous_cost),
        ]
    }
}

/// COTR: plain sum of the five components.
pub fn other_costs_total(input: &OtherCostsInput) -> TariffResult<Money> {
    let mut total = Decimal::ZERO;
    for (field, value) in input.components() {
        if value < Decimal::ZERO {
            return Err(TariffError::InvalidInput {
                field: format!("other_costs.{field}"),
                reason: "Other regulated costs cannot be negative".into(),
            });
        }
        total = checked::add(total, value, "cotr")?;
    }
    Ok(total)
}

/// Largest environmental cost admitted for a given CAOM total.
pub fn environmental_cost_limit(caom_total: Money) -> Money {
    caom_total.max(Decimal::ZERO) * ENVIRONMENTAL_CAP_RATIO
}

/// Environmental costs may not exceed 5% of max(CAOM, 0).
///
/// Runs after CAOM is known. A breach rejects the whole calculation.
pub fn check_environmental_cap(input: &OtherCostsInput, caom_total: Money) -> TariffResult<()> {
    let limit = environmental_cost_limit(caom_total);
    if input.environmental_cost > limit + ENVIRONMENTAL_CAP_TOLERANCE {
        return Err(TariffError::EnvironmentalCapExceeded {
            environmental_cost: input.environmental_cost,
            limit,
            excess: input.environmental_cost - limit,
        });
    }
    Ok(())
}
