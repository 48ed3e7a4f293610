use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::checked;
use crate::error::TariffError;
use crate::types::Rate;
use crate::TariffResult;

/// A service interruption affecting part of the installed capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutageEvent {
    pub power_kw: Decimal,
    pub hours_without_service: Decimal,
}

/// Installed capacity, billing period and the outages recorded in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityInput {
    pub total_capacity_kw: Decimal,
    pub period_hours: Decimal,
    #[serde(default)]
    pub events: Vec<OutageEvent>,
}

/// Availability index (ID): share of capacity-hours actually delivered.
///
/// ID = 1 - sum(P_i * h_i) / (P_total * H_period), clamped to [0, 1].
/// Clamping is not an error; it appends an alert and the clamped value is used.
pub fn availability_index(
    input: &AvailabilityInput,
    alerts: &mut Vec<String>,
) -> TariffResult<Rate> {
    validate_availability_input(input)?;

    let capacity_hours = checked::mul(
        input.total_capacity_kw,
        input.period_hours,
        "availability.capacity_hours",
    )?;
    let mut penalty = Decimal::ZERO;
    for (i, event) in input.events.iter().enumerate() {
        let field = format!("availability.events[{i}]");
        let lost = checked::mul(event.power_kw, event.hours_without_service, &field)?;
        let share = checked::div(lost, capacity_hours, &field)?;
        penalty = checked::add(penalty, share, &field)?;
    }

    let raw = checked::sub(Decimal::ONE, penalty, "availability_index")?;
    if raw < Decimal::ZERO {
        push_alert(
            alerts,
            format!("Availability index computed as {raw}, below 0; clamped to 0"),
        );
        return Ok(Decimal::ZERO);
    }
    if raw > Decimal::ONE {
        push_alert(
            alerts,
            format!("Availability index computed as {raw}, above 1; clamped to 1"),
        );
        return Ok(Decimal::ONE);
    }

    Ok(raw)
}

fn push_alert(alerts: &mut Vec<String>, message: String) {
    warn!("{message}");
    alerts.push(message);
}

fn validate_availability_input(input: &AvailabilityInput) -> TariffResult<()> {
    if input.total_capacity_kw <= Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "availability.total_capacity_kw".into(),
            reason: "Total installed capacity must be positive".into(),
        });
    }
    if input.period_hours <= Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "availability.period_hours".into(),
            reason: "Period hours must be positive".into(),
        });
    }
    for (i, event) in input.events.iter().enumerate() {
        if event.power_kw < Decimal::ZERO || event.hours_without_service < Decimal::ZERO {
            return Err(TariffError::InvalidInput {
                field: format!("availability.events[{i}]"),
                reason: "Outage power and hours cannot be negative".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input_with(events: Vec<OutageEvent>) -> AvailabilityInput {
        AvailabilityInput {
            total_capacity_kw: dec!(10),
            period_hours: dec!(100),
            events,
        }
    }

    fn outage(power_kw: Decimal, hours: Decimal) -> OutageEvent {
        OutageEvent {
            power_kw,
            hours_without_service: hours,
        }
    }

    #[test]
    fn test_no_outages_is_full_availability() {
        let mut alerts = Vec::new();
        let id = availability_index(&input_with(vec![]), &mut alerts).unwrap();
        assert_eq!(id, Decimal::ONE);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_single_outage() {
        let mut alerts = Vec::new();
        let id = availability_index(&input_with(vec![outage(dec!(1), dec!(10))]), &mut alerts)
            .unwrap();
        assert_eq!(id, dec!(0.99));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_penalties_accumulate() {
        let mut alerts = Vec::new();
        let events = vec![outage(dec!(2), dec!(50)), outage(dec!(5), dec!(20))];
        let id = availability_index(&input_with(events), &mut alerts).unwrap();
        // 1 - (100 + 100) / 1000
        assert_eq!(id, dec!(0.8));
    }

    #[test]
    fn test_excessive_outages_clamp_to_zero_with_alert() {
        let mut alerts = Vec::new();
        let id = availability_index(&input_with(vec![outage(dec!(20), dec!(100))]), &mut alerts)
            .unwrap();
        assert_eq!(id, Decimal::ZERO);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("clamped to 0"));
    }

    #[test]
    fn test_exactly_zero_is_not_clamped() {
        let mut alerts = Vec::new();
        let id = availability_index(&input_with(vec![outage(dec!(10), dec!(100))]), &mut alerts)
            .unwrap();
        assert_eq!(id, Decimal::ZERO);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_non_positive_capacity_rejected() {
        let mut input = input_with(vec![]);
        input.total_capacity_kw = Decimal::ZERO;
        assert!(availability_index(&input, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_negative_event_rejected() {
        let input = input_with(vec![outage(dec!(-1), dec!(1))]);
        assert!(availability_index(&input, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_overflowing_outage_is_a_calculation_error() {
        let mut alerts = Vec::new();
        let input = AvailabilityInput {
            total_capacity_kw: dec!(0.0000000001),
            period_hours: dec!(0.0000000001),
            events: vec![outage(dec!(1_000_000_000_000), dec!(1_000_000_000_000))],
        };
        let err = availability_index(&input, &mut alerts).unwrap_err();

        assert!(matches!(err, TariffError::CalculationError(_)));
        assert!(err.to_string().contains("availability.events[0]"));
        assert!(alerts.is_empty());
    }
}
