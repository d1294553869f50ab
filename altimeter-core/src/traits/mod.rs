//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod display;
pub mod sensor;

pub use display::DisplayTransport;
pub use sensor::SensorSession;
