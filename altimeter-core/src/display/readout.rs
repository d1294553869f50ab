//! Sensor readout formatting
//!
//! Converts a reading to display units and lays it out as text lines.
//! Values are kept as fixed-point hundredths and shown with two decimals,
//! truncated toward zero.

use core::fmt::{self, Write};

use heapless::String;

use super::framebuffer::Framebuffer;
use super::text::write_string;
use crate::sensor::SensorResult;

/// Maximum characters per formatted line
///
/// The longest line is "Baro: " plus an `i32` in hundredths
/// ("-21474836.48") plus "inHg", 22 characters, so formatting never runs
/// out of room.
pub const LINE_LEN: usize = 24;

/// Text line buffer
pub type Line = String<LINE_LEN>;

/// Pascal to inches of mercury
pub const PASCAL_TO_INHG: f64 = 0.000296134;

/// Shown instead of readings when no result arrived
pub const FAULT_LINE: &str = "Sensor fault...";

/// Vertical positions of the readout lines, in pixels
pub const RESERVED_Y: u16 = 0;
pub const BARO_Y: u16 = 10;
pub const TEMP_Y: u16 = 20;
pub const HUM_Y: u16 = 30;

/// One reading converted to display units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readout {
    /// Barometric pressure in 0.01 inHg
    pub pressure_inhg_x100: i32,
    /// Temperature in 0.01 °F
    pub temperature_f_x100: i32,
    /// Relative humidity in 0.01 %
    pub humidity_x100: i32,
}

impl Readout {
    /// Convert a sensor result
    ///
    /// Returns `None` unless the result status is `Ok` (failed results carry
    /// no usable payload), or if a converted value is not finite or does not
    /// fit in hundredths.
    pub fn from_result(result: &SensorResult) -> Option<Self> {
        if !result.is_ok() {
            return None;
        }

        let pressure_inhg = result.pressure as f64 * PASCAL_TO_INHG;
        let temperature_f = result.temperature as f64 * 1.8 + 32.0;
        let humidity = result.humidity as f64;

        Some(Self {
            pressure_inhg_x100: to_hundredths(pressure_inhg)?,
            temperature_f_x100: to_hundredths(temperature_f)?,
            humidity_x100: to_hundredths(humidity)?,
        })
    }

    /// "Baro: 30.00inHg"
    pub fn baro_line(&self) -> Result<Line, fmt::Error> {
        format_line("Baro: ", self.pressure_inhg_x100, "inHg")
    }

    /// "Temp: 68.00F"
    pub fn temp_line(&self) -> Result<Line, fmt::Error> {
        format_line("Temp: ", self.temperature_f_x100, "F")
    }

    /// "Hum: 45.00"
    pub fn hum_line(&self) -> Result<Line, fmt::Error> {
        format_line("Hum: ", self.humidity_x100, "")
    }

    /// Baro, temp and hum lines, top to bottom
    pub fn lines(&self) -> Result<[Line; 3], fmt::Error> {
        Ok([self.baro_line()?, self.temp_line()?, self.hum_line()?])
    }

    /// Draw the readout onto a cleared framebuffer
    ///
    /// Nothing is drawn if a line fails to format.
    pub fn render<const WIDTH: usize, const PAGES: usize>(
        &self,
        buffer: &mut Framebuffer<WIDTH, PAGES>,
    ) -> fmt::Result {
        let lines = self.lines()?;
        render_lines(buffer, &lines);
        Ok(())
    }
}

/// Draw formatted readout lines
///
/// The first line is reserved (drawn blank) so the fault message can take
/// it without covering a reading.
pub fn render_lines<const WIDTH: usize, const PAGES: usize>(
    buffer: &mut Framebuffer<WIDTH, PAGES>,
    lines: &[Line; 3],
) {
    let [baro, temp, hum] = lines;
    write_string(buffer, 0, RESERVED_Y, " ");
    write_string(buffer, 0, BARO_Y, baro);
    write_string(buffer, 0, TEMP_Y, temp);
    write_string(buffer, 0, HUM_Y, hum);
}

/// Draw the fault line over the reserved first line
pub fn render_fault<const WIDTH: usize, const PAGES: usize>(buffer: &mut Framebuffer<WIDTH, PAGES>) {
    write_string(buffer, 0, RESERVED_Y, FAULT_LINE);
}

/// Scale to hundredths, truncating toward zero
///
/// The small bias absorbs binary representation error, so 0.29 becomes 29
/// rather than 28. NaN, infinities and values beyond `i32` give `None`.
fn to_hundredths(value: f64) -> Option<i32> {
    let magnitude = if value < 0.0 { -value } else { value };
    let scaled = magnitude * 100.0 + 1e-6;
    if !scaled.is_finite() || scaled > i32::MAX as f64 {
        return None;
    }

    let scaled = scaled as i32;
    Some(if value < 0.0 { -scaled } else { scaled })
}

fn format_line(label: &str, value_x100: i32, unit: &str) -> Result<Line, fmt::Error> {
    let mut line = Line::new();
    line.push_str(label).map_err(|_| fmt::Error)?;
    write_fixed2(&mut line, value_x100)?;
    line.push_str(unit).map_err(|_| fmt::Error)?;
    Ok(line)
}

fn write_fixed2<const N: usize>(out: &mut String<N>, value_x100: i32) -> fmt::Result {
    let sign = if value_x100 < 0 { "-" } else { "" };
    let magnitude = value_x100.unsigned_abs();
    write!(out, "{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
}
