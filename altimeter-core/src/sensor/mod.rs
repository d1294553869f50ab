//! Sensor reading types
//!
//! A reading crosses the core boundary by value, tagged with the
//! outcome of the read attempt that produced it.

pub mod result;
pub mod status;

pub use result::SensorResult;
pub use status::{InitError, StatusCode};
