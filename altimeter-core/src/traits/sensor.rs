//! Sensor session trait

use crate::sensor::{InitError, SensorResult};

/// Trait for one initialized environmental sensor
///
/// The core treats the sensor as a black box: it starts background
/// measurements once and then asks for the latest reading. Implementations
/// must not retry on their own; retry pacing belongs to the caller.
pub trait SensorSession {
    /// Start measuring
    ///
    /// Called once at startup. Returns a hint, in milliseconds, for how long
    /// one conversion takes.
    fn start_measurement(&mut self) -> Result<u32, InitError>;

    /// Read the latest measurement
    ///
    /// Takes `&mut self` because bus reads require mutable access.
    fn read_measurement(&mut self) -> SensorResult;
}
