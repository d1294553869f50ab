//! Sensor result passed from the worker core to the display core

use super::status::StatusCode;

/// One sensor read attempt
///
/// Units: temperature in °C, pressure in Pa, humidity in %RH.
/// The payload fields are zero unless `status` is [`StatusCode::Ok`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorResult {
    pub temperature: f32,
    pub pressure: f32,
    pub humidity: f32,
    pub status: StatusCode,
}

impl SensorResult {
    /// Create a valid reading
    pub const fn ok(temperature: f32, pressure: f32, humidity: f32) -> Self {
        Self {
            temperature,
            pressure,
            humidity,
            status: StatusCode::Ok,
        }
    }

    /// Create a failed read attempt with a zeroed payload
    pub const fn failed(status: StatusCode) -> Self {
        Self {
            temperature: 0.0,
            pressure: 0.0,
            humidity: 0.0,
            status,
        }
    }

    /// Check if the payload may be rendered
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}
