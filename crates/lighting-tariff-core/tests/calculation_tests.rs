use lighting_tariff_core::availability::OutageEvent;
use lighting_tariff_core::energy::EnergyLevelResult;
use lighting_tariff_core::{
    calculate, faoml_for_year, CalculationRequest, ErrorKind, TariffError, TensionLevel,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

/// Two tension levels, one capital unit each, one outage, one unavailability event.
fn reference_json() -> serde_json::Value {
    serde_json::json!({
        "municipality": "Alcaldía de Prueba",
        "period": "2026-01",
        "application_year": 2026,
        "discount_rate": "0.1",
        "energy_levels": [
            {
                "level": 1,
                "unit_energy_tariff": 100,
                "metered_energy_kwh": 10,
                "class_records": [
                    { "illumination_class": 1, "load_kw": 1, "daily_hours": 2, "billing_days": 3 }
                ]
            },
            { "level": 2, "unit_energy_tariff": 200, "metered_energy_kwh": 5 }
        ],
        "investment_levels": [
            {
                "level": 1,
                "capital_units": [
                    {
                        "base_infrastructure_cost": 1000,
                        "base_luminaire_cost": 130,
                        "luminous_efficacy": 130,
                        "useful_life_years": 1
                    }
                ],
                "land_parcels": [ { "area_m2": 10, "assessed_value_per_m2": 100 } ]
            },
            {
                "level": 2,
                "capital_units": [ { "base_infrastructure_cost": 500, "useful_life_years": 1 } ]
            }
        ],
        "availability": {
            "total_capacity_kw": 10,
            "period_hours": 100,
            "events": [ { "power_kw": 1, "hours_without_service": 10 } ]
        },
        "aom_levels": [
            {
                "level": 1,
                "recurring_admin_cost": 700,
                "recurring_luminaire_maintenance_cost": 300,
                "unavailability_events": [ { "power_kw": "0.1", "unavailable_hours": 1 } ]
            },
            { "level": 2, "recurring_admin_cost": 300, "recurring_luminaire_maintenance_cost": 200 }
        ],
        "other_costs": {
            "oversight_cost": 20,
            "environmental_cost": 5,
            "insurance_cost": 10,
            "permit_tax_cost": 5
        },
        "price_index": { "base_index": 100, "prior_month_index": 110 }
    })
}

fn reference_request() -> CalculationRequest {
    serde_json::from_value(reference_json()).unwrap()
}

fn assert_cap_is_sum_of_components(result: &lighting_tariff_core::CalculationResult) {
    let sum = result.csee + result.cinv + result.caom + result.cotr;
    assert!(
        (result.cap - sum).abs() <= dec!(0.02),
        "CAP {} should equal CSEE + CINV + CAOM + COTR = {}",
        result.cap,
        sum
    );
}

// ===========================================================================
// End-to-end
// ===========================================================================

#[test]
fn test_defaults_applied_from_json() {
    let request = reference_request();
    assert_eq!(request.unmetered_fraction, dec!(0.041));
    assert_eq!(request.base_om_factor, dec!(0.04));
    assert!(request.mixed_energy_formulation);
    assert!(!request.marine_environment);
    assert_eq!(request.investment_levels[1].land_cost_fraction, dec!(0.069));
    assert_eq!(request.other_costs.miscellaneous_cost, Decimal::ZERO);
}

#[test]
fn test_reference_scenario() {
    let result = calculate(&reference_request(), "public").unwrap();

    assert_eq!(result.tenant_id, "public");
    assert_eq!(result.availability_index, dec!(0.99));
    assert_eq!(result.csee, dec!(2600.00));
    assert_eq!(result.cinv, dec!(1916.16));
    assert_eq!(result.caom, dec!(102.86));
    assert_eq!(result.cotr, dec!(40.00));
    assert_eq!(result.cap, dec!(4659.02));
    assert!(result.cap > Decimal::ZERO);

    assert_eq!(result.energy_levels.len(), 2);
    assert_eq!(result.investment_levels.len(), 2);
    assert_eq!(result.aom_levels.len(), 2);
    assert!(result.alerts.is_empty());

    assert_cap_is_sum_of_components(&result);
    assert_eq!(result.receipt.total, result.cap);
}

#[test]
fn test_energy_breakdown() {
    let result = calculate(&reference_request(), "public").unwrap();
    assert_eq!(
        result.energy_levels[0],
        EnergyLevelResult {
            level: TensionLevel::Low,
            unit_energy_tariff: dec!(100),
            metered_energy_kwh: dec!(10),
            estimated_energy_kwh: dec!(6),
            total_energy_kwh: dec!(16),
            csee_n: dec!(1600),
        }
    );
}

#[test]
fn test_level_results_ascending_regardless_of_input_order() {
    let mut request = reference_request();
    request.energy_levels.reverse();
    request.investment_levels.reverse();
    request.aom_levels.reverse();
    let result = calculate(&request, "public").unwrap();

    assert_eq!(result.energy_levels[0].level, TensionLevel::Low);
    assert_eq!(result.investment_levels[0].level, TensionLevel::Low);
    assert_eq!(result.aom_levels[0].level, TensionLevel::Low);
    assert_eq!(result.cap, dec!(4659.02));
}

#[test]
fn test_calculation_is_deterministic() {
    let first = calculate(&reference_request(), "public").unwrap();
    let second = calculate(&reference_request(), "public").unwrap();
    assert_eq!(first, second);
}

// ===========================================================================
// Availability clamping
// ===========================================================================

#[test]
fn test_availability_clamped_with_alert() {
    let mut request = reference_request();
    request.availability.events.push(OutageEvent {
        power_kw: dec!(10),
        hours_without_service: dec!(200),
    });
    // CAOM falls to -10 with ID = 0; environmental costs must go to zero.
    request.other_costs.environmental_cost = Decimal::ZERO;
    let result = calculate(&request, "public").unwrap();

    assert_eq!(result.availability_index, Decimal::ZERO);
    assert_eq!(result.alerts.len(), 1);
    assert_eq!(result.cinv, Decimal::ZERO);
    assert_eq!(result.caom, dec!(-10.00));
    assert!(result.availability_index >= Decimal::ZERO);
    assert!(result.availability_index <= Decimal::ONE);
}

// ===========================================================================
// Validation errors
// ===========================================================================

#[test]
fn test_duplicate_level_is_validation_error() {
    let mut json = reference_json();
    json["investment_levels"][1]["level"] = serde_json::json!(1);
    let request: CalculationRequest = serde_json::from_value(json).unwrap();

    let err = calculate(&request, "public").unwrap_err();
    assert!(matches!(err, TariffError::DuplicateLevel { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_missing_energy_level_names_level() {
    let mut request = reference_request();
    request.energy_levels.retain(|l| l.level == TensionLevel::Low);

    let err = calculate(&request, "public").unwrap_err();
    assert!(err.to_string().contains("tension level 2"), "{err}");
}

#[test]
fn test_missing_luminous_efficacy() {
    let mut json = reference_json();
    json["investment_levels"][0]["capital_units"][0]
        .as_object_mut()
        .unwrap()
        .remove("luminous_efficacy");
    let request: CalculationRequest = serde_json::from_value(json).unwrap();

    assert!(matches!(
        calculate(&request, "public"),
        Err(TariffError::MissingLuminousEfficacy { .. })
    ));
}

#[test]
fn test_environmental_cost_above_limit() {
    let mut request = reference_request();
    request.other_costs.environmental_cost = dec!(20);

    let err = calculate(&request, "public").unwrap_err();
    assert!(err.to_string().contains("limit: 5.14"), "{err}");
}

#[test]
fn test_environmental_cost_exactly_at_limit() {
    let mut request = reference_request();
    // 5% of CAOM = 102.86 * 0.05
    request.other_costs.environmental_cost = dec!(5.143);
    assert!(calculate(&request, "public").is_ok());
}

#[test]
fn test_tension_level_out_of_domain_rejected_at_parse() {
    let mut json = reference_json();
    json["energy_levels"][0]["level"] = serde_json::json!(3);
    assert!(serde_json::from_value::<CalculationRequest>(json).is_err());
}

// ===========================================================================
// Indexation and lookup
// ===========================================================================

#[test]
fn test_indexation_scales_only_cinv_and_caom() {
    let mut request = reference_request();
    request.price_index = None;
    let plain = calculate(&request, "public").unwrap();
    let indexed = calculate(&reference_request(), "public").unwrap();
    let indexation = indexed.indexation.unwrap();

    assert_eq!(indexation.factor, dec!(1.10));
    let expected = plain.csee + dec!(1.10) * plain.cinv + dec!(1.10) * plain.caom + plain.cotr;
    assert!((indexation.cap_adjusted - expected).abs() <= dec!(0.01));
}

#[test]
fn test_faoml_lookup() {
    assert_eq!(faoml_for_year(2022), dec!(0.097));
    assert_eq!(faoml_for_year(2026), dec!(0.074));
    assert_eq!(faoml_for_year(2030), dec!(0.063));
    assert_eq!(faoml_for_year(2021), faoml_for_year(2022));
}

#[test]
fn test_either_or_energy_policy() {
    let mut request = reference_request();
    request.mixed_energy_formulation = false;
    let result = calculate(&request, "public").unwrap();

    // Level 1 has a metered reading, so its class estimate is ignored.
    assert_eq!(result.energy_levels[0].total_energy_kwh, dec!(10));
    assert_eq!(result.csee, dec!(2000.00));
}
