//! Display task (core 0)
//!
//! Brings up the SSD1306 panel, then runs the display loop on a fixed tick.

use altimeter_core::config::{DisplayConfig, PacingConfig};
use altimeter_core::dispatch::{Requester, WorkDescriptor};
use altimeter_core::display::PanelFramebuffer;
use altimeter_core::display_loop::{DisplayLoop, TickOutcome};
use altimeter_drivers::display::Ssd1306;
use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Timer};

use crate::channels::CoreMutex;

/// SSD1306 on I2C0
pub type Panel = Ssd1306<I2c<'static, I2C0, Async>>;

/// Display task - renders readings and the fault line
#[embassy_executor::task]
pub async fn display_task(
    mut panel: Panel,
    requester: Requester<'static, CoreMutex>,
    descriptor: WorkDescriptor,
    display_config: DisplayConfig,
    pacing: PacingConfig,
) {
    info!("Display task started");

    match panel.init(display_config.contrast).await {
        Ok(()) => info!("SSD1306 initialized"),
        // The loop still has to drive the sensor core
        Err(e) => error!("Failed to initialize display: {:?}", e),
    }

    let region = unwrap!(PanelFramebuffer::full_region());
    let mut display = DisplayLoop::new(requester, panel, region, descriptor, pacing);

    if let Err(e) = display.start().await {
        warn!("Failed to blank display: {:?}", e);
    }
    info!("First sensor request issued");

    let mut delay = Delay;

    loop {
        Timer::after_millis(pacing.poll_interval_ms as u64).await;

        match display.tick(&mut delay).await {
            Ok(TickOutcome::Rendered(readout)) => {
                info!(
                    "Baro: {}/100 inHg, Temp: {}/100 F, Hum: {}/100",
                    readout.pressure_inhg_x100,
                    readout.temperature_f_x100,
                    readout.humidity_x100
                );
            }
            Ok(TickOutcome::Faulted) => {
                debug!("No sensor result, request re-issued");
            }
            Err(e) => {
                warn!("Display transfer failed: {:?}", e);
            }
        }
    }
}
