//! Embassy async tasks
//!
//! One task per core: the display loop runs on core 0, the sensor worker
//! on core 1. They communicate only through the dispatcher queues.

pub mod display;
pub mod worker;

pub use display::{display_task, Panel};
pub use worker::{worker_task, SensorDriver, SensorWorker};
