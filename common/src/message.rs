//! Flat JSON sensor messages published to the broker.
//!
//! Shape: `{"id": "...", "sensor": "...", "data": {"temperature": {"value":
//! "23.4", "unit": "C"}, ...}}`. Values are pre-formatted strings so the
//! wire precision is fixed regardless of the float the driver produced:
//! one decimal for temperature and humidity, two for voltage. Absent
//! readings are omitted from `data`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measurement {
    pub value: String,
    pub unit: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeasurementSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Measurement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorMessage {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,
    pub data: MeasurementSet,
}

impl SensorMessage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sensor: None,
            data: MeasurementSet::default(),
        }
    }

    pub fn sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = Some(sensor.into());
        self
    }

    pub fn temperature_c(mut self, celsius: f32) -> Self {
        self.data.temperature = Some(Measurement {
            value: format!("{celsius:.1}"),
            unit: "C",
        });
        self
    }

    pub fn humidity_percent(mut self, humidity: f32) -> Self {
        self.data.humidity = Some(Measurement {
            value: format!("{humidity:.1}"),
            unit: "%",
        });
        self
    }

    pub fn voltage_v(mut self, volts: f32) -> Self {
        self.data.voltage = Some(Measurement {
            value: format!("{volts:.2}"),
            unit: "V",
        });
        self
    }

    /// Compact JSON for publishing.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
