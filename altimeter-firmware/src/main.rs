//! Altimeter - Dual-core barometric station firmware
//!
//! Core 0 runs the display loop: it drives an SSD1306 OLED over I2C0 and
//! asks core 1 for readings. Core 1 runs the sensor worker: it owns a
//! DPS310 on I2C1 and answers each request with a reading when one is
//! ready.
//!
//! Pins (Raspberry Pi Pico):
//! - GPIO4 I2C0 SDA, GPIO5 I2C0 SCL -> SSD1306
//! - GPIO6 I2C1 SDA, GPIO7 I2C1 SCL -> DPS310

#![no_std]
#![no_main]

use altimeter_core::config::SensorConfig;
use altimeter_core::dispatch::{Dispatcher, Session, WorkDescriptor, Worker};
use altimeter_core::traits::SensorSession;
use altimeter_drivers::display::Ssd1306;
use altimeter_drivers::sensor::{init_sensor, SensorRegistry};
use defmt::*;
use embassy_executor::Executor;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{I2C0, I2C1, PIN_6, PIN_7};
use embassy_rp::Peri;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::channels::DISPATCHER;
use crate::tasks::SensorDriver;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

/// Display I2C clock
const DISPLAY_I2C_HZ: u32 = 400_000;

/// Sensor I2C clock
const SENSOR_I2C_HZ: u32 = 100_000;

// Core 1 stack and one executor per core (must live forever)
static CORE1_STACK: StaticCell<Stack<8192>> = StaticCell::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Main entry point (core 0)
#[cortex_m_rt::entry]
fn main() -> ! {
    info!("Altimeter firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Sensor session is created here and handed to core 1
    let session = init_sensor_session(p.I2C1, p.PIN_7, p.PIN_6, &config.sensor);

    let dispatcher = DISPATCHER.init(Dispatcher::new());
    let (requester, link) = dispatcher.split();
    info!("Queues initialized");

    let mut worker: tasks::SensorWorker = Worker::new(link, config.pacing);
    let handle = unwrap!(worker.attach(session));
    let descriptor = WorkDescriptor::read_sensor(handle);

    // Display on I2C0
    let mut display_i2c_config = i2c::Config::default();
    display_i2c_config.frequency = DISPLAY_I2C_HZ;
    let display_i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, display_i2c_config);
    let panel = Ssd1306::new(display_i2c, config.display.address);

    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| spawner.spawn(tasks::worker_task(worker)).unwrap())
    });
    info!("Core 1 started");

    let display_config = config.display;
    let pacing = config.pacing;

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        spawner
            .spawn(tasks::display_task(panel, requester, descriptor, display_config, pacing))
            .unwrap();
    })
}

/// Bring up the configured sensor and start background measurements
///
/// Failures are logged once and recorded in the session; the worker then
/// answers every read with the failure status.
fn init_sensor_session(
    i2c1: Peri<'static, I2C1>,
    scl: Peri<'static, PIN_7>,
    sda: Peri<'static, PIN_6>,
    sensor: &SensorConfig,
) -> Session<SensorDriver> {
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = SENSOR_I2C_HZ;
    let bus = I2c::new_blocking(i2c1, scl, sda, i2c_config);

    let mut registry = SensorRegistry::new();
    let mut driver = match init_sensor(
        &mut registry,
        sensor.kind.as_str(),
        bus,
        sensor.address,
        sensor.oversampling,
        &mut Delay,
    ) {
        Ok(driver) => {
            info!("Sensor initialized: {} at {=u8:#x}", sensor.kind.as_str(), sensor.address);
            driver
        }
        Err(e) => {
            error!("Sensor init failed: {:?}", e);
            return Session::Failed(e);
        }
    };

    match driver.start_measurement() {
        Ok(delay_hint_ms) => {
            info!("Background measurement started, ~{}ms per cycle", delay_hint_ms);
            Session::Ready(driver)
        }
        Err(e) => {
            error!("Failed to start measurement: {:?}", e);
            Session::Failed(e)
        }
    }
}
