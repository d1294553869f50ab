//! Work descriptors sent from the display core to the sensor core

/// Names a sensor session owned by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionHandle(u8);

impl SessionHandle {
    /// Handle for the session at `index`
    ///
    /// Handles are normally obtained from `Worker::attach`; the worker
    /// answers reads for an index it does not hold with `InitInvalidType`.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Session index
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Operations the worker knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Read one measurement from a session
    ReadSensor(SessionHandle),
}

/// One unit of work
///
/// `Copy`, so the requester keeps its own copy to re-issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkDescriptor {
    pub operation: Operation,
}

impl WorkDescriptor {
    /// Descriptor reading the given session
    pub const fn read_sensor(session: SessionHandle) -> Self {
        Self {
            operation: Operation::ReadSensor(session),
        }
    }
}
