//! Station configuration
//!
//! The configuration is compiled into the firmware from station.toml
//! (validated on the host by build.rs) and parsed at boot.

use altimeter_core::config::{parse_config, StationConfig};
use defmt::*;

/// Embedded configuration
/// Edit station.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../station.toml");

/// Parse the embedded configuration
///
/// Falls back to the built-in defaults if parsing fails, so a bad file
/// never keeps the station from booting.
pub fn load() -> StationConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Configuration loaded: poll={}ms, display@{=u8:#x}, {} sensor@{=u8:#x} x{}",
                config.pacing.poll_interval_ms,
                config.display.address,
                config.sensor.kind.as_str(),
                config.sensor.address,
                config.sensor.oversampling
            );
            config
        }
        Err(e) => {
            warn!("Invalid embedded configuration ({:?}), using defaults", e);
            StationConfig::default()
        }
    }
}
