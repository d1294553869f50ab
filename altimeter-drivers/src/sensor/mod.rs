//! Environmental sensor drivers
//!
//! Sensors are brought up by name: the type is looked up first, then the
//! bus address is claimed, then the driver runs its own init. Each step
//! has its own [`InitError`].

pub mod dps310;

pub use dps310::{Coefficients, Dps310, Dps310Error, Oversampling, DPS310_ADDR, DPS310_ADDR_ALT};

use altimeter_core::sensor::InitError;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;

/// Maximum sensors tracked by one registry
pub const MAX_SENSORS: usize = 4;

/// Supported sensor types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorType {
    /// Infineon DPS310 pressure and temperature sensor
    Dps310,
}

impl SensorType {
    /// Look up a sensor type by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("DPS310") {
            Some(SensorType::Dps310)
        } else {
            None
        }
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            SensorType::Dps310 => "DPS310",
        }
    }
}

/// Bus addresses already claimed by a sensor
#[derive(Debug, Default)]
pub struct SensorRegistry {
    claimed: Vec<u8, MAX_SENSORS>,
}

impl SensorRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { claimed: Vec::new() }
    }

    /// Claim an address for a new sensor
    ///
    /// A full registry reports [`InitError::DriverFailure`]: the address is
    /// free, there is just no room to bring up another sensor.
    pub fn claim(&mut self, address: u8) -> Result<(), InitError> {
        if self.claimed.contains(&address) {
            return Err(InitError::AddressInUse);
        }
        self.claimed
            .push(address)
            .map_err(|_| InitError::DriverFailure)
    }

    /// Check whether an address is claimed
    pub fn is_claimed(&self, address: u8) -> bool {
        self.claimed.contains(&address)
    }
}

/// Bring up a sensor by type name
///
/// Errors in order of checking: unknown type or unsupported oversampling
/// ([`InitError::InvalidType`]), address already claimed
/// ([`InitError::AddressInUse`]), driver init failure
/// ([`InitError::DriverFailure`]). The address stays claimed even when the
/// driver fails, as the device is still on the bus.
pub fn init_sensor<I2C: I2c, D: DelayNs>(
    registry: &mut SensorRegistry,
    type_name: &str,
    i2c: I2C,
    address: u8,
    oversampling: u8,
    delay: &mut D,
) -> Result<Dps310<I2C>, InitError> {
    let sensor_type = SensorType::from_name(type_name).ok_or(InitError::InvalidType)?;
    let oversampling = Oversampling::from_rate(oversampling).ok_or(InitError::InvalidType)?;

    registry.claim(address)?;

    match sensor_type {
        SensorType::Dps310 => Ok(Dps310::new(i2c, address, oversampling, delay)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Bus with nothing attached
    struct EmptyBus;

    impl ErrorType for EmptyBus {
        type Error = ErrorKind;
    }

    impl I2c for EmptyBus {
        fn transaction(&mut self, _address: u8, _operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            Err(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address))
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_sensor_type_lookup() {
        assert_eq!(SensorType::from_name("DPS310"), Some(SensorType::Dps310));
        assert_eq!(SensorType::from_name("dps310"), Some(SensorType::Dps310));
        assert_eq!(SensorType::from_name("BME280"), None);
        assert_eq!(SensorType::Dps310.name(), "DPS310");
    }

    #[test]
    fn test_registry_rejects_duplicate_address() {
        let mut registry = SensorRegistry::new();
        assert_eq!(registry.claim(DPS310_ADDR), Ok(()));
        assert_eq!(registry.claim(DPS310_ADDR_ALT), Ok(()));
        assert_eq!(registry.claim(DPS310_ADDR), Err(InitError::AddressInUse));
        assert!(registry.is_claimed(DPS310_ADDR_ALT));
        assert!(!registry.is_claimed(0x3C));
    }

    #[test]
    fn test_full_registry_is_not_address_in_use() {
        let mut registry = SensorRegistry::new();
        for address in 0x70..0x70 + MAX_SENSORS as u8 {
            assert_eq!(registry.claim(address), Ok(()));
        }

        assert_eq!(registry.claim(0x10), Err(InitError::DriverFailure));
        assert!(!registry.is_claimed(0x10));
        // Duplicates are still reported as such
        assert_eq!(registry.claim(0x70), Err(InitError::AddressInUse));
    }

    #[test]
    fn test_init_error_order() {
        let mut registry = SensorRegistry::new();

        let result = init_sensor(&mut registry, "BMP180", EmptyBus, DPS310_ADDR, 8, &mut NoDelay);
        assert!(matches!(result, Err(InitError::InvalidType)));
        // Type is checked before the address is claimed
        assert!(!registry.is_claimed(DPS310_ADDR));

        let result = init_sensor(&mut registry, "DPS310", EmptyBus, DPS310_ADDR, 8, &mut NoDelay);
        assert!(matches!(result, Err(InitError::DriverFailure)));
        assert!(registry.is_claimed(DPS310_ADDR));

        let result = init_sensor(&mut registry, "DPS310", EmptyBus, DPS310_ADDR, 8, &mut NoDelay);
        assert!(matches!(result, Err(InitError::AddressInUse)));
    }

    #[test]
    fn test_invalid_oversampling() {
        let mut registry = SensorRegistry::new();
        let result = init_sensor(&mut registry, "DPS310", EmptyBus, DPS310_ADDR, 5, &mut NoDelay);
        assert!(matches!(result, Err(InitError::InvalidType)));
    }
}
