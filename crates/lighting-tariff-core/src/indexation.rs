use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checked;
use crate::error::TariffError;
use crate::types::{money, Money, Rate};
use crate::TariffResult;

/// Producer price index (IPP) pair used to bring costs to the billing month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceIndexInput {
    pub base_index: Decimal,
    pub prior_month_index: Decimal,
}

/// Cost totals after price-index rebasing, money-rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexationResult {
    pub factor: Rate,
    pub cinv_adjusted: Money,
    pub caom_adjusted: Money,
    pub cap_adjusted: Money,
}

/// Full-precision totals the indexation reads from.
#[derive(Debug, Clone, Copy)]
pub struct CostTotals {
    pub csee: Money,
    pub cinv: Money,
    pub caom: Money,
    pub cotr: Money,
}

/// Rebase CINV and CAOM by prior_month_index / base_index.
///
/// CSEE and COTR are carried over unchanged into the adjusted CAP.
pub fn apply_indexation(
    index: &PriceIndexInput,
    totals: CostTotals,
) -> TariffResult<IndexationResult> {
    if index.base_index <= Decimal::ZERO || index.prior_month_index <= Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "price_index".into(),
            reason: "Base and prior-month price indices must be positive".into(),
        });
    }

    let factor = checked::div(index.prior_month_index, index.base_index, "price_index.factor")?;
    let cinv_adjusted = checked::mul(totals.cinv, factor, "indexation.cinv_adjusted")?;
    let caom_adjusted = checked::mul(totals.caom, factor, "indexation.caom_adjusted")?;
    let cap_adjusted = checked::sum(
        [totals.csee, cinv_adjusted, caom_adjusted, totals.cotr],
        "indexation.cap_adjusted",
    )?;

    Ok(IndexationResult {
        factor: money(factor),
        cinv_adjusted: money(cinv_adjusted),
        caom_adjusted: money(caom_adjusted),
        cap_adjusted: money(cap_adjusted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn totals() -> CostTotals {
        CostTotals {
            csee: dec!(2600),
            cinv: dec!(1916.15787),
            caom: dec!(102.86),
            cotr: dec!(40),
        }
    }

    #[test]
    fn test_ten_percent_rebase() {
        let index = PriceIndexInput {
            base_index: dec!(100),
            prior_month_index: dec!(110),
        };
        let result = apply_indexation(&index, totals()).unwrap();

        assert_eq!(result.factor, dec!(1.10));
        assert_eq!(result.cinv_adjusted, dec!(2107.77));
        assert_eq!(result.caom_adjusted, dec!(113.15));
        // 2600 + 2107.773657 + 113.146 + 40
        assert_eq!(result.cap_adjusted, dec!(4860.92));
    }

    #[test]
    fn test_unit_factor_leaves_totals() {
        let index = PriceIndexInput {
            base_index: dec!(120),
            prior_month_index: dec!(120),
        };
        let result = apply_indexation(&index, totals()).unwrap();

        assert_eq!(result.factor, Decimal::ONE);
        assert_eq!(result.cap_adjusted, dec!(4659.02));
    }

    #[test]
    fn test_non_positive_index_rejected() {
        let index = PriceIndexInput {
            base_index: Decimal::ZERO,
            prior_month_index: dec!(110),
        };
        assert!(apply_indexation(&index, totals()).is_err());
    }

    #[test]
    fn test_extreme_index_ratio_is_a_calculation_error() {
        let index = PriceIndexInput {
            base_index: dec!(0.0000000000000000000001),
            prior_month_index: dec!(1_000_000_000_000_000_000),
        };
        let err = apply_indexation(&index, totals()).unwrap_err();
        assert!(matches!(err, TariffError::CalculationError(_)));
    }
}
