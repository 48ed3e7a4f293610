use rust_decimal::{Decimal, MathematicalOps};

use crate::error::TariffError;
use crate::types::Rate;
use crate::TariffResult;

/// Capital-recovery factor that turns a one-off capital cost into a uniform
/// annual charge over `useful_life` years at discount `rate`.
///
/// rate = 0: 1 / n (straight line)
/// otherwise: r / (1 - (1 + r)^-n)
pub fn annualization_factor(rate: Rate, useful_life: u32) -> TariffResult<Decimal> {
    if useful_life == 0 {
        return Err(TariffError::InvalidParameter {
            parameter: "useful_life_years".into(),
            reason: "Useful life must be greater than zero".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(TariffError::InvalidParameter {
            parameter: "discount_rate".into(),
            reason: "Discount rate cannot be negative".into(),
        });
    }

    if rate.is_zero() {
        return Ok(Decimal::ONE / Decimal::from(useful_life));
    }

    let denominator = Decimal::ONE - discount_factor(rate, useful_life);
    if denominator.is_zero() {
        return Err(TariffError::CalculationError(format!(
            "Annualization factor is undefined for rate {rate} over {useful_life} years"
        )));
    }

    Ok(rate / denominator)
}

/// (1 + r)^-n. A compounding factor too large to represent discounts to zero.
fn discount_factor(rate: Rate, periods: u32) -> Decimal {
    let compound = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powu(u64::from(periods)));
    match compound {
        Some(compound) => Decimal::ONE / compound,
        None => Decimal::ZERO,
    }
}
