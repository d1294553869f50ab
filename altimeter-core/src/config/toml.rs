//! Minimal TOML parser for the station configuration
//!
//! Handles only the subset the station file uses; it is NOT a general TOML
//! parser.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs (string, integer)
//! - Basic (`"..."`) strings without escapes, and literal (`'...'`) strings
//! - Integers in decimal (optionally `+`), `0x` hex, `0o` octal or `0b`
//!   binary, with `_` separators
//! - Comments (`# ...`), including trailing ones
//!
//! Unknown sections and keys are errors, so a typo never silently falls
//! back to a default.

use heapless::String;

use super::types::{StationConfig, MAX_TYPE_NAME_LEN};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Key not valid in its section, or a line that is not `key = value`
    UnknownKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Pacing,
    Display,
    Sensor,
}

/// Parse TOML text into a StationConfig
///
/// Keys missing from the text keep their default values.
pub fn parse_config(input: &str) -> Result<StationConfig, ParseError> {
    let mut config = StationConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::UnknownKey)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "pacing" => Ok(Section::Pacing),
        "display" => Ok(Section::Display),
        "sensor" => Ok(Section::Sensor),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut StationConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Pacing => {
            let p = &mut config.pacing;
            match key {
                "poll_interval_ms" => p.poll_interval_ms = parse_int(value)?,
                "sensor_retry_delay_ms" => p.sensor_retry_delay_ms = parse_int(value)?,
                "post_read_settle_delay_ms" => p.post_read_settle_delay_ms = parse_int(value)?,
                "conversion_wait_ms" => p.conversion_wait_ms = parse_int(value)?,
                "not_ready_backoff_ms" => p.not_ready_backoff_ms = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Display => {
            let d = &mut config.display;
            match key {
                "address" => d.address = parse_address(value)?,
                "contrast" => d.contrast = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Sensor => {
            let s = &mut config.sensor;
            match key {
                "type" => {
                    s.kind = String::<MAX_TYPE_NAME_LEN>::try_from(parse_string(value)?)
                        .map_err(|_| ParseError::InvalidValue)?;
                }
                "address" => s.address = parse_address(value)?,
                "oversampling" => s.oversampling = parse_oversampling(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
    }
    Ok(())
}

/// Drop a trailing comment, unless the `#` sits inside a string
fn strip_comment(value: &str) -> &str {
    let mut quote = None;
    for (pos, ch) in value.char_indices() {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            (None, '#') => return value[..pos].trim(),
            _ => {}
        }
    }
    value
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Quoted string value
///
/// Basic strings with escape sequences are rejected rather than taken
/// verbatim.
fn parse_string(value: &str) -> Result<&str, ParseError> {
    let basic = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|inner| !inner.contains(['"', '\\']));
    let literal = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .filter(|inner| !inner.contains('\''));

    basic.or(literal).ok_or(ParseError::InvalidValue)
}

fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let mut digits: String<24> = String::new();
    for ch in value.chars().filter(|&c| c != '_') {
        digits.push(ch).map_err(|_| ParseError::InvalidValue)?;
    }

    let (radix, body) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(octal) = digits.strip_prefix("0o") {
        (8, octal)
    } else if let Some(binary) = digits.strip_prefix("0b") {
        (2, binary)
    } else {
        (10, digits.strip_prefix('+').unwrap_or(digits.as_str()))
    };

    // from_str_radix would accept a second sign after the prefix
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return Err(ParseError::InvalidValue);
    }
    let parsed = u64::from_str_radix(body, radix).map_err(|_| ParseError::InvalidValue)?;

    T::try_from(parsed).map_err(|_| ParseError::InvalidValue)
}

/// 7-bit I2C address
fn parse_address(value: &str) -> Result<u8, ParseError> {
    let address: u8 = parse_int(value)?;
    if address > 0x7F {
        return Err(ParseError::InvalidValue);
    }
    Ok(address)
}

/// Power of two from 1 to 128
fn parse_oversampling(value: &str) -> Result<u8, ParseError> {
    let rate: u8 = parse_int(value)?;
    if rate == 0 || !rate.is_power_of_two() {
        return Err(ParseError::InvalidValue);
    }
    Ok(rate)
}
