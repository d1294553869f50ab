//! Sensor status codes

/// Outcome of a sensor read or init attempt
///
/// Only [`StatusCode::Ok`] means the accompanying reading is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    /// Reading is valid
    Ok,
    /// Sensor or its calibration coefficients are not ready yet
    MeasurementNotReady,
    /// No fresh temperature result
    TemperatureNotReady,
    /// No fresh pressure result
    PressureNotReady,
    /// Requested sensor type is unknown
    InitInvalidType,
    /// Bus address already claimed by another session
    InitAddressInUse,
    /// Driver failed during its own init or bus transfer
    InitDriverFailure,
}

impl StatusCode {
    /// Check if the reading carrying this status may be used
    pub fn is_ok(self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    /// Check if this is a transient "not ready" condition
    ///
    /// Transient conditions clear on their own once the sensor finishes
    /// its conversion; init failures never do.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            StatusCode::MeasurementNotReady
                | StatusCode::TemperatureNotReady
                | StatusCode::PressureNotReady
        )
    }

    /// Check if this status reports a failed sensor init
    pub fn is_init_failure(self) -> bool {
        matches!(
            self,
            StatusCode::InitInvalidType | StatusCode::InitAddressInUse | StatusCode::InitDriverFailure
        )
    }
}

/// Errors that can occur while bringing up a sensor session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Sensor type lookup failed
    InvalidType,
    /// Another session already owns this bus address
    AddressInUse,
    /// Driver-internal failure (bus error, wrong product ID, ...)
    DriverFailure,
}

impl InitError {
    /// Status code reported for reads against a session that failed init
    pub fn status(self) -> StatusCode {
        match self {
            InitError::InvalidType => StatusCode::InitInvalidType,
            InitError::AddressInUse => StatusCode::InitAddressInUse,
            InitError::DriverFailure => StatusCode::InitDriverFailure,
        }
    }
}
