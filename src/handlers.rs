use crate::readings::{MeterPayload, ProductionReading, ProductionSnapshot};

/// One line summary of a meter event:
/// solar total, net (solar minus consumption), consumption total and per phase consumption.
pub fn meter_summary(payload: &MeterPayload) -> String {
    let solar = payload.solar_power();
    let consumption = payload.consumption_power();
    format!(
        "Solar: {:4.0}, Net {:4.0}, Consumption: {:4.0} (A {:4.0} B {:4.0} C {:4.0})",
        solar,
        payload.net_power(),
        consumption,
        payload.consumption.a.power,
        payload.consumption.b.power,
        payload.consumption.c.power,
    )
}

/// Default meter stream handler
pub fn print_meter_summary(payload: &MeterPayload) {
    println!("{}", meter_summary(payload));
}

pub fn production_summary(snapshot: &ProductionSnapshot) -> String {
    // Unlabelled entries fall back to their position in the arrays
    let production = snapshot
        .production_by_measurement("production")
        .or_else(|| snapshot.production.get(1));
    let consumption = snapshot
        .consumption_by_measurement("total-consumption")
        .or_else(|| snapshot.consumption.first());
    format!(
        "Production: {}, Consumption: {}",
        describe(production),
        describe(consumption)
    )
}

pub fn print_production_summary(snapshot: &ProductionSnapshot) {
    println!("{}", production_summary(snapshot));
}

fn describe(reading: Option<&ProductionReading>) -> String {
    match reading {
        Some(reading) => format!(
            "{:.0} W (today {:.0} Wh)",
            reading.w_now.unwrap_or_default(),
            reading.wh_today.unwrap_or_default()
        ),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::tests::PRODUCTION_JSON;
    use crate::readings::{PhaseReading, ThreePhase};

    fn three_phase(a: f32, b: f32, c: f32) -> ThreePhase {
        let phase = |power| PhaseReading {
            power,
            ..PhaseReading::default()
        };
        ThreePhase {
            a: phase(a),
            b: phase(b),
            c: phase(c),
        }
    }

    #[test]
    fn test_meter_summary_totals() {
        let payload = MeterPayload {
            production: three_phase(10.0, 20.0, 30.0),
            net: ThreePhase::default(),
            consumption: three_phase(1.0, 2.0, 3.0),
        };

        assert_eq!(payload.solar_power(), 60.0);
        assert_eq!(payload.consumption_power(), 6.0);
        assert_eq!(payload.net_power(), 54.0);
        assert_eq!(
            meter_summary(&payload),
            "Solar:   60, Net   54, Consumption:    6 (A    1 B    2 C    3)"
        );
    }

    #[test]
    fn test_meter_summary_importing() {
        let payload = MeterPayload {
            production: three_phase(0.0, 0.0, 0.0),
            net: ThreePhase::default(),
            consumption: three_phase(500.4, 250.6, 1249.0),
        };

        assert_eq!(
            meter_summary(&payload),
            "Solar:    0, Net -2000, Consumption: 2000 (A  500 B  251 C 1249)"
        );
    }

    #[test]
    fn test_production_summary_by_label() {
        let snapshot: ProductionSnapshot = serde_json::from_str(PRODUCTION_JSON).unwrap();

        assert_eq!(
            production_summary(&snapshot),
            "Production: 2398 W (today 10123 Wh), Consumption: 812 W (today 6543 Wh)"
        );
    }

    #[test]
    fn test_production_summary_by_position() {
        let mut snapshot: ProductionSnapshot = serde_json::from_str(PRODUCTION_JSON).unwrap();
        for reading in snapshot
            .production
            .iter_mut()
            .chain(snapshot.consumption.iter_mut())
        {
            reading.measurement_type = None;
        }

        assert_eq!(
            production_summary(&snapshot),
            "Production: 2398 W (today 10123 Wh), Consumption: 812 W (today 6543 Wh)"
        );
    }

    #[test]
    fn test_production_summary_empty() {
        assert_eq!(
            production_summary(&ProductionSnapshot::default()),
            "Production: n/a, Consumption: n/a"
        );
    }
}
