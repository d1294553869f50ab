//! Station configuration types

use heapless::String;

/// Maximum length of a sensor type name
pub const MAX_TYPE_NAME_LEN: usize = 16;

/// Loop timing, all values in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacingConfig {
    /// Display loop tick
    pub poll_interval_ms: u32,
    /// Wait before re-issuing a request when no result arrived
    pub sensor_retry_delay_ms: u32,
    /// Worker pause around each dequeue and after forwarding a result
    pub post_read_settle_delay_ms: u32,
    /// Worker wait between dequeuing a read and performing it
    pub conversion_wait_ms: u32,
    /// Worker back-off after the sensor reported it was not ready
    pub not_ready_backoff_ms: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            sensor_retry_delay_ms: 1000,
            post_read_settle_delay_ms: 1000,
            conversion_wait_ms: 1000,
            not_ready_backoff_ms: 6000,
        }
    }
}

/// SSD1306 panel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// 7-bit I2C address
    pub address: u8,
    /// Contrast (0-255)
    pub contrast: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            address: 0x3C,
            contrast: 255,
        }
    }
}

/// Environmental sensor settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Driver name, resolved when the session is created (e.g. "DPS310")
    pub kind: String<MAX_TYPE_NAME_LEN>,
    /// 7-bit I2C address
    pub address: u8,
    /// Oversampling for pressure and temperature (1, 2, 4 ... 128)
    pub oversampling: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        let mut kind = String::new();
        let _ = kind.push_str("DPS310");
        Self {
            kind,
            address: 0x77,
            oversampling: 8,
        }
    }
}

/// Complete station configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StationConfig {
    pub pacing: PacingConfig,
    pub display: DisplayConfig,
    pub sensor: SensorConfig,
}
