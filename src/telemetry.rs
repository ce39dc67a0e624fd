//! Telemetry ingestion and unit conversion.
//!
//! The host game pushes JSON payloads (one object per line on stdin); the
//! fields the cluster cares about are `gear` and the `electrics` block.
//! Every field is optional: a missing value leaves the previous gauge
//! target untouched instead of faulting.

use serde::Deserialize;

/// m/s from the wheels to the speedometer's display units.
const WHEELSPEED_SCALE: f64 = 2.3;

/// A telemetry sample from the host. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Telemetry {
    pub gear: Option<String>,
    #[serde(default)]
    pub electrics: Electrics,
}

/// The `electrics` block of a telemetry payload.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Electrics {
    /// Wheel speed in m/s.
    pub wheelspeed: Option<f64>,
    /// Tachometer RPM, passed through to the gauge as-is.
    #[serde(rename = "rpmTacho")]
    pub rpm_tacho: Option<f64>,
    /// Normalized oil temperature in [0, 1].
    pub oil: Option<f64>,
}

impl Telemetry {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Speedometer target, if the sample carried a wheel speed.
    pub fn speed_display(&self) -> Option<f64> {
        self.electrics.wheelspeed.map(|ws| ws * WHEELSPEED_SCALE)
    }

    /// Tachometer target. Pass-through.
    pub fn rpm_display(&self) -> Option<f64> {
        self.electrics.rpm_tacho
    }

    /// Oil temperature in Fahrenheit: the normalized value scales to
    /// whole degrees Celsius first.
    pub fn oil_temp_fahrenheit(&self) -> Option<f64> {
        self.electrics.oil.map(|oil| to_fahrenheit((oil * 130.0).round()))
    }
}

pub fn to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
