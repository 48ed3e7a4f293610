//! Regulatory constants and year-indexed factors for the CREG 101 013 cost model.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TariffError;
use crate::types::Rate;
use crate::TariffResult;

pub const METHODOLOGY: &str = "CREG 101 013 de 2022";

/// Reference luminous efficacy (lm/W) against which luminaire costs are scaled.
pub const REFERENCE_EFFICACY: Decimal = dec!(130);

/// FAOMS applied when the installation sits in a marine environment.
pub const FAOMS_MARINE: Rate = dec!(0.005);

/// First year the methodology applies.
pub const FIRST_APPLICATION_YEAR: i32 = 2022;

/// Floor value of FAOML from 2028 onwards.
pub const FAOML_FLOOR: Rate = dec!(0.063);
const FAOML_FLOOR_YEAR: i32 = 2028;

const FAOML_BY_YEAR: [(i32, Rate); 6] = [
    (2022, dec!(0.097)),
    (2023, dec!(0.092)),
    (2024, dec!(0.086)),
    (2025, dec!(0.080)),
    (2026, dec!(0.074)),
    (2027, dec!(0.069)),
];

pub const DEFAULT_FAOM_N: Rate = dec!(0.04);
pub const DEFAULT_NE_FRACTION: Rate = dec!(0.041);
pub const DEFAULT_LAND_FRACTION: Rate = dec!(0.069);

/// Environmental costs may not exceed this share of CAOM.
pub const ENVIRONMENTAL_CAP_RATIO: Rate = dec!(0.05);
pub const ENVIRONMENTAL_CAP_TOLERANCE: Decimal = dec!(0.000000001);

/// FAOML for an application year.
///
/// Years from 2028 get the floor value. Years missing from the table
/// (anything before 2022) fall back to the 2022 value.
pub fn faoml_for_year(year: i32) -> Rate {
    if year >= FAOML_FLOOR_YEAR {
        return FAOML_FLOOR;
    }
    FAOML_BY_YEAR
        .iter()
        .find(|(y, _)| *y == year)
        .or_else(|| FAOML_BY_YEAR.first())
        .map(|(_, factor)| *factor)
        .unwrap_or(FAOML_FLOOR)
}

/// FAOMS for the installation environment.
pub fn faoms_for(marine_environment: bool) -> Rate {
    if marine_environment {
        FAOMS_MARINE
    } else {
        Decimal::ZERO
    }
}

/// Published parameter set for a given application year, for previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryParameters {
    pub methodology: String,
    pub year: i32,
    pub faom_n: Rate,
    pub faoml: Rate,
    pub faoms_marine: Rate,
    pub ne_fraction: Rate,
    pub reference_efficacy_lm_w: Decimal,
    pub land_fraction: Rate,
    pub environmental_cap_over_caom: Rate,
}

pub fn regulatory_parameters(year: i32) -> TariffResult<RegulatoryParameters> {
    if year < FIRST_APPLICATION_YEAR {
        return Err(TariffError::InvalidInput {
            field: "year".into(),
            reason: format!("Application year must be {FIRST_APPLICATION_YEAR} or later"),
        });
    }

    Ok(RegulatoryParameters {
        methodology: METHODOLOGY.to_string(),
        year,
        faom_n: DEFAULT_FAOM_N,
        faoml: faoml_for_year(year),
        faoms_marine: FAOMS_MARINE,
        ne_fraction: DEFAULT_NE_FRACTION,
        reference_efficacy_lm_w: REFERENCE_EFFICACY,
        land_fraction: DEFAULT_LAND_FRACTION,
        environmental_cap_over_caom: ENVIRONMENTAL_CAP_RATIO,
    })
}
