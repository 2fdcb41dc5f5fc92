use serde_derive::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

/// One instant's measurement on a single electrical phase.
///
/// Missing or `null` values read as zero.
#[serde_as]
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseReading {
    /// Active power (W)
    #[serde(rename = "p")]
    #[serde_as(as = "DefaultOnNull")]
    pub power: f32,
    /// Reactive power (var)
    #[serde(rename = "q")]
    #[serde_as(as = "DefaultOnNull")]
    pub reactive_power: f32,
    /// Apparent power (VA)
    #[serde(rename = "s")]
    #[serde_as(as = "DefaultOnNull")]
    pub apparent_power: f32,
    #[serde(rename = "v")]
    #[serde_as(as = "DefaultOnNull")]
    pub voltage: f32,
    #[serde(rename = "i")]
    #[serde_as(as = "DefaultOnNull")]
    pub current: f32,
    #[serde(rename = "pf")]
    #[serde_as(as = "DefaultOnNull")]
    pub power_factor: f32,
    #[serde(rename = "f")]
    #[serde_as(as = "DefaultOnNull")]
    pub frequency: f32,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreePhase {
    #[serde(rename = "ph-a")]
    pub a: PhaseReading,
    #[serde(rename = "ph-b")]
    pub b: PhaseReading,
    #[serde(rename = "ph-c")]
    pub c: PhaseReading,
}

impl ThreePhase {
    /// Sum of the active power of all three phases
    pub fn total_power(&self) -> f32 {
        self.a.power + self.b.power + self.c.power
    }

    pub fn phases(&self) -> [&PhaseReading; 3] {
        [&self.a, &self.b, &self.c]
    }
}

/// A single event pushed by `/stream/meter`
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterPayload {
    pub production: ThreePhase,
    #[serde(rename = "net-consumption")]
    pub net: ThreePhase,
    #[serde(rename = "total-consumption")]
    pub consumption: ThreePhase,
}

impl MeterPayload {
    pub fn solar_power(&self) -> f32 {
        self.production.total_power()
    }

    pub fn consumption_power(&self) -> f32 {
        self.consumption.total_power()
    }

    /// Production minus total consumption. Positive when exporting.
    pub fn net_power(&self) -> f32 {
        self.solar_power() - self.consumption_power()
    }
}

/// One entry of the `production`, `consumption` or `storage` arrays of `/production.json`.
///
/// Inverter and battery entries only carry a subset of the fields, so everything
/// except the type label is optional and omitted again when re-encoded.
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionReading {
    #[serde(rename = "type")]
    pub kind: String,
    pub active_count: Option<i64>,
    pub measurement_type: Option<String>,
    /// Epoch seconds
    pub reading_time: Option<i64>,
    pub w_now: Option<f64>,
    pub wh_lifetime: Option<f64>,
    pub varh_lead_lifetime: Option<f64>,
    pub varh_lag_lifetime: Option<f64>,
    pub vah_lifetime: Option<f64>,
    pub rms_current: Option<f64>,
    pub rms_voltage: Option<f64>,
    pub react_pwr: Option<f64>,
    pub apprnt_pwr: Option<f64>,
    pub pwr_factor: Option<f64>,
    pub wh_today: Option<f64>,
    pub wh_last_seven_days: Option<f64>,
    pub vah_today: Option<f64>,
    pub varh_lead_today: Option<f64>,
    pub varh_lag_today: Option<f64>,
    /// Battery entries only
    pub wh_now: Option<f64>,
    pub state: Option<String>,
}

impl ProductionReading {
    pub fn is_measurement(&self, measurement_type: &str) -> bool {
        self.measurement_type.as_deref() == Some(measurement_type)
    }
}

/// Decoded `/production.json`.
///
/// Array order is kept exactly as the device sent it. Code that indexes by
/// position relies on the device's ordering; prefer the `*_by_measurement` lookups.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSnapshot {
    #[serde(default)]
    pub production: Vec<ProductionReading>,
    #[serde(default)]
    pub consumption: Vec<ProductionReading>,
    #[serde(default)]
    pub storage: Vec<ProductionReading>,
}

impl ProductionSnapshot {
    pub fn production_by_measurement(&self, measurement_type: &str) -> Option<&ProductionReading> {
        self.production
            .iter()
            .find(|reading| reading.is_measurement(measurement_type))
    }

    pub fn consumption_by_measurement(
        &self,
        measurement_type: &str,
    ) -> Option<&ProductionReading> {
        self.consumption
            .iter()
            .find(|reading| reading.is_measurement(measurement_type))
    }
}
