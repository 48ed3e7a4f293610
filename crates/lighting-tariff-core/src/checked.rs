//! Overflow-checked decimal arithmetic for the cost model.
//!
//! Every operation takes a label naming the quantity being computed, which
//! ends up in the `CalculationError` when the result does not fit a Decimal.

use std::fmt::Display;

use rust_decimal::Decimal;

use crate::error::TariffError;
use crate::TariffResult;

pub(crate) fn overflow(what: impl Display) -> TariffError {
    TariffError::CalculationError(format!("Arithmetic overflow computing {what}"))
}

pub(crate) fn add(lhs: Decimal, rhs: Decimal, what: impl Display) -> TariffResult<Decimal> {
    lhs.checked_add(rhs).ok_or_else(|| overflow(what))
}

pub(crate) fn sub(lhs: Decimal, rhs: Decimal, what: impl Display) -> TariffResult<Decimal> {
    lhs.checked_sub(rhs).ok_or_else(|| overflow(what))
}

pub(crate) fn mul(lhs: Decimal, rhs: Decimal, what: impl Display) -> TariffResult<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(|| overflow(what))
}

/// Division by zero is reported the same way as overflow.
pub(crate) fn div(lhs: Decimal, rhs: Decimal, what: impl Display) -> TariffResult<Decimal> {
    lhs.checked_div(rhs).ok_or_else(|| overflow(what))
}

pub(crate) fn sum<I>(values: I, what: impl Display) -> TariffResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut total = Decimal::ZERO;
    for value in values {
        match total.checked_add(value) {
            Some(next) => total = next,
            None => return Err(overflow(what)),
        }
    }
    Ok(total)
}
