//! Sensor worker task (core 1)
//!
//! Serves work descriptors from core 0 against the DPS310 session and
//! forwards good readings back.

use altimeter_core::dispatch::{WorkOutcome, Worker};
use altimeter_drivers::sensor::Dps310;
use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_time::Delay;

use crate::channels::CoreMutex;

/// DPS310 on I2C1
pub type SensorDriver = Dps310<I2c<'static, I2C1, Blocking>>;

/// Worker owning the sensor session
pub type SensorWorker = Worker<'static, CoreMutex, SensorDriver>;

/// Worker task - never returns
#[embassy_executor::task]
pub async fn worker_task(mut worker: SensorWorker) {
    info!("Sensor worker started on core 1 with {} session(s)", worker.session_count());

    let mut delay = Delay;

    loop {
        match worker.serve_one(&mut delay).await {
            WorkOutcome::Delivered(result) => {
                debug!(
                    "Reading forwarded: {} C, {} Pa",
                    result.temperature, result.pressure
                );
            }
            WorkOutcome::Dropped(status) => {
                // Requester is not told; it re-issues on its own schedule
                warn!("Sensor read dropped: {:?}", status);
            }
        }
    }
}
