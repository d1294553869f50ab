//! Infineon DPS310 barometric pressure sensor
//!
//! Runs the sensor in continuous background mode and compensates raw
//! readings with the factory calibration coefficients read at init.
//!
//! Compensation (datasheet section 4.9):
//! ```text
//! T = c0 / 2 + c1 * Traw_sc
//! P = c00 + Praw_sc * (c10 + Praw_sc * (c20 + Praw_sc * c30))
//!         + Traw_sc * c01 + Traw_sc * Praw_sc * (c11 + Praw_sc * c21)
//! ```
//! where `X_sc = Xraw / kX` and `kX` is the scale factor of the configured
//! oversampling rate.

use altimeter_core::sensor::{InitError, SensorResult, StatusCode};
use altimeter_core::traits::SensorSession;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Default I2C address (SDO high)
pub const DPS310_ADDR: u8 = 0x77;

/// Alternate I2C address (SDO low)
pub const DPS310_ADDR_ALT: u8 = 0x76;

/// Expected content of the product ID register
const PRODUCT_ID: u8 = 0x10;

/// Readiness polls during init
const READY_POLLS: u32 = 10;

/// Delay between readiness polls
const READY_POLL_INTERVAL_MS: u32 = 10;

/// DPS310 registers
#[allow(dead_code)]
mod reg {
    pub const PSR_B2: u8 = 0x00;
    pub const TMP_B2: u8 = 0x03;
    pub const PRS_CFG: u8 = 0x06;
    pub const TMP_CFG: u8 = 0x07;
    pub const MEAS_CFG: u8 = 0x08;
    pub const CFG_REG: u8 = 0x09;
    pub const RESET: u8 = 0x0C;
    pub const PRODUCT_ID: u8 = 0x0D;
    pub const COEF: u8 = 0x10;
    pub const COEF_SRCE: u8 = 0x28;
}

/// MEAS_CFG bits
mod meas {
    pub const COEF_RDY: u8 = 1 << 7;
    pub const SENSOR_RDY: u8 = 1 << 6;
    pub const TMP_RDY: u8 = 1 << 5;
    pub const PRS_RDY: u8 = 1 << 4;
    /// Continuous pressure and temperature measurement
    pub const CONTINUOUS_BOTH: u8 = 0b111;
}

/// CFG_REG bits
mod cfg {
    pub const T_SHIFT: u8 = 1 << 3;
    pub const P_SHIFT: u8 = 1 << 2;
}

/// Length of the coefficient block
const COEF_LEN: usize = 18;

/// DPS310 driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dps310Error<E> {
    /// I2C transfer failed
    Bus(E),
    /// Product ID register held an unexpected value
    UnknownProduct(u8),
    /// Sensor or coefficients did not become ready in time
    NotReady,
}

impl<E> From<E> for Dps310Error<E> {
    fn from(e: E) -> Self {
        Dps310Error::Bus(e)
    }
}

impl<E> From<Dps310Error<E>> for InitError {
    fn from(_: Dps310Error<E>) -> Self {
        InitError::DriverFailure
    }
}

/// Oversampling rate for pressure and temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Oversampling(u8);

impl Oversampling {
    /// Precision setting (log2 of the rate) for a power-of-two rate
    ///
    /// Rates that are not a power of two between 1 and 128 yield `None`.
    pub fn from_rate(rate: u8) -> Option<Self> {
        if rate.is_power_of_two() {
            Some(Self(rate.trailing_zeros() as u8))
        } else {
            None
        }
    }

    /// Samples per measurement
    pub fn rate(self) -> u8 {
        1 << self.0
    }

    /// PM_PRC / TMP_PRC field value
    fn precision(self) -> u8 {
        self.0
    }

    /// Compensation scale factor (datasheet table 9)
    pub fn scale_factor(self) -> f32 {
        const SCALE: [f32; 8] = [
            524_288.0,
            1_572_864.0,
            3_670_016.0,
            7_864_320.0,
            253_952.0,
            516_096.0,
            1_040_384.0,
            2_088_960.0,
        ];
        SCALE[self.0 as usize]
    }

    /// Conversion time of one measurement in milliseconds, rounded up
    pub fn conversion_time_ms(self) -> u32 {
        const TIME_MS: [u32; 8] = [4, 6, 9, 15, 28, 54, 105, 207];
        TIME_MS[self.0 as usize]
    }

    /// Results must be bit-shifted above 8x oversampling
    fn needs_shift(self) -> bool {
        self.rate() > 8
    }
}

impl Default for Oversampling {
    fn default() -> Self {
        Self(3)
    }
}

/// Factory calibration coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coefficients {
    pub c0: i32,
    pub c1: i32,
    pub c00: i32,
    pub c10: i32,
    pub c01: i32,
    pub c11: i32,
    pub c20: i32,
    pub c21: i32,
    pub c30: i32,
}

impl Coefficients {
    /// Decode the coefficient block starting at register 0x10
    pub fn from_bytes(b: &[u8; COEF_LEN]) -> Self {
        let be16 = |hi: u8, lo: u8| i16::from_be_bytes([hi, lo]) as i32;

        Self {
            c0: sign_extend(((b[0] as u32) << 4) | ((b[1] as u32) >> 4), 12),
            c1: sign_extend((((b[1] & 0x0F) as u32) << 8) | b[2] as u32, 12),
            c00: sign_extend(
                ((b[3] as u32) << 12) | ((b[4] as u32) << 4) | ((b[5] as u32) >> 4),
                20,
            ),
            c10: sign_extend(
                (((b[5] & 0x0F) as u32) << 16) | ((b[6] as u32) << 8) | b[7] as u32,
                20,
            ),
            c01: be16(b[8], b[9]),
            c11: be16(b[10], b[11]),
            c20: be16(b[12], b[13]),
            c21: be16(b[14], b[15]),
            c30: be16(b[16], b[17]),
        }
    }

    /// Compensated temperature in °C
    pub fn temperature(&self, t_sc: f32) -> f32 {
        self.c0 as f32 * 0.5 + self.c1 as f32 * t_sc
    }

    /// Compensated pressure in Pa
    pub fn pressure(&self, p_sc: f32, t_sc: f32) -> f32 {
        self.c00 as f32
            + p_sc * (self.c10 as f32 + p_sc * (self.c20 as f32 + p_sc * self.c30 as f32))
            + t_sc * self.c01 as f32
            + t_sc * p_sc * (self.c11 as f32 + p_sc * self.c21 as f32)
    }
}

/// Interpret the low `bits` bits of `value` as two's complement
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// 24-bit big-endian two's complement
fn raw24(b: &[u8]) -> i32 {
    sign_extend(((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32, 24)
}

/// DPS310 sensor on a blocking I2C bus
pub struct Dps310<I2C> {
    i2c: I2C,
    address: u8,
    oversampling: Oversampling,
    coefficients: Coefficients,
    /// Temperature sensor the coefficients were calibrated against
    external_temp_sensor: bool,
}

impl<I2C: I2c> Dps310<I2C> {
    /// Probe the sensor and read its calibration
    ///
    /// Waits up to 100 ms for the sensor and its coefficients to become
    /// ready. Measurements are not started; see
    /// [`SensorSession::start_measurement`].
    pub fn new<D: DelayNs>(
        i2c: I2C,
        address: u8,
        oversampling: Oversampling,
        delay: &mut D,
    ) -> Result<Self, Dps310Error<I2C::Error>> {
        let mut sensor = Self {
            i2c,
            address,
            oversampling,
            coefficients: Coefficients::default(),
            external_temp_sensor: false,
        };
        sensor.init(delay)?;
        Ok(sensor)
    }

    fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Dps310Error<I2C::Error>> {
        let id = self.read_register(reg::PRODUCT_ID)?;
        if id != PRODUCT_ID {
            return Err(Dps310Error::UnknownProduct(id));
        }

        let ready = meas::COEF_RDY | meas::SENSOR_RDY;
        let mut polls = 0;
        while self.read_register(reg::MEAS_CFG)? & ready != ready {
            polls += 1;
            if polls >= READY_POLLS {
                return Err(Dps310Error::NotReady);
            }
            delay.delay_ms(READY_POLL_INTERVAL_MS);
        }

        let mut coef = [0u8; COEF_LEN];
        self.i2c.write_read(self.address, &[reg::COEF], &mut coef)?;
        self.coefficients = Coefficients::from_bytes(&coef);

        self.external_temp_sensor = self.read_register(reg::COEF_SRCE)? & 0x80 != 0;
        Ok(())
    }

    /// Calibration coefficients read at init
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Configured oversampling
    pub fn oversampling(&self) -> Oversampling {
        self.oversampling
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Program rates, oversampling and continuous mode
    fn configure(&mut self) -> Result<u32, Dps310Error<I2C::Error>> {
        // Measurement rate 1/s, so the rate field stays 0
        let precision = self.oversampling.precision();
        let tmp_ext = if self.external_temp_sensor { 0x80 } else { 0x00 };

        self.write_register(reg::PRS_CFG, precision)?;
        self.write_register(reg::TMP_CFG, tmp_ext | precision)?;

        let shift = if self.oversampling.needs_shift() {
            cfg::T_SHIFT | cfg::P_SHIFT
        } else {
            0
        };
        self.write_register(reg::CFG_REG, shift)?;
        self.write_register(reg::MEAS_CFG, meas::CONTINUOUS_BOTH)?;

        // One temperature and one pressure conversion per cycle
        Ok(2 * self.oversampling.conversion_time_ms())
    }

    fn measure(&mut self) -> Result<SensorResult, Dps310Error<I2C::Error>> {
        let status = self.read_register(reg::MEAS_CFG)?;

        let ready = meas::COEF_RDY | meas::SENSOR_RDY;
        if status & ready != ready {
            return Ok(SensorResult::failed(StatusCode::MeasurementNotReady));
        }
        if status & meas::TMP_RDY == 0 {
            return Ok(SensorResult::failed(StatusCode::TemperatureNotReady));
        }
        if status & meas::PRS_RDY == 0 {
            return Ok(SensorResult::failed(StatusCode::PressureNotReady));
        }

        let mut raw = [0u8; 6];
        self.i2c.write_read(self.address, &[reg::PSR_B2], &mut raw)?;

        let scale = self.oversampling.scale_factor();
        let p_sc = raw24(&raw[0..3]) as f32 / scale;
        let t_sc = raw24(&raw[3..6]) as f32 / scale;

        // No humidity channel on this part
        Ok(SensorResult::ok(
            self.coefficients.temperature(t_sc),
            self.coefficients.pressure(p_sc, t_sc),
            0.0,
        ))
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Dps310Error<I2C::Error>> {
        let mut value = [0u8];
        self.i2c.write_read(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Dps310Error<I2C::Error>> {
        self.i2c.write(self.address, &[register, value])?;
        Ok(())
    }
}

impl<I2C: I2c> SensorSession for Dps310<I2C> {
    fn start_measurement(&mut self) -> Result<u32, InitError> {
        Ok(self.configure()?)
    }

    fn read_measurement(&mut self) -> SensorResult {
        self.measure()
            .unwrap_or(SensorResult::failed(StatusCode::InitDriverFailure))
    }
}
