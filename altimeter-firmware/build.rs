//! Build script for altimeter-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates station.toml at compile time, with the `toml` crate and
//!   with the firmware's own parser

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys allowed in each section
const PACING_KEYS: &[&str] = &[
    "poll_interval_ms",
    "sensor_retry_delay_ms",
    "post_read_settle_delay_ms",
    "conversion_wait_ms",
    "not_ready_backoff_ms",
];
const DISPLAY_KEYS: &[&str] = &["address", "contrast"];
const SENSOR_KEYS: &[&str] = &["type", "address", "oversampling"];

/// Sensor drivers compiled into the firmware
const SENSOR_TYPES: &[&str] = &["DPS310"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate station.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=station.toml");

    let config_path = Path::new("station.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: station.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds station.toml as its configuration.          ║\n\
            ║  Please create one in the altimeter-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read station.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in station.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    validate_sections(&config, &mut errors);
    validate_pacing(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_sensor(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid station configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    // The firmware's own subset parser must accept the file too
    if let Err(e) = altimeter_core::config::parse_config(&config_content) {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: station.toml uses TOML the firmware cannot parse         ║\n\
            ║                                                                  ║\n\
            ║  Error: {:<56} ║\n\
            ║  Use plain strings and integers, one key per line.               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format!("{:?}", e)
        );
    }

    println!("cargo:warning=station.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only the known sections, each a table with only known keys
///
/// The on-target parser rejects anything else, so catch it here first.
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("station.toml must be a table".to_string());
        return;
    };

    for (name, section) in root {
        let allowed = match name.as_str() {
            "pacing" => PACING_KEYS,
            "display" => DISPLAY_KEYS,
            "sensor" => SENSOR_KEYS,
            _ => {
                errors.push(format!("unknown section [{}]", name));
                continue;
            }
        };

        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };

        for key in table.keys() {
            if !allowed.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

/// Integer value of `section.key`, if present
fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match config.get(section)?.get(key)? {
        toml::Value::Integer(value) => Some(*value),
        _ => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn validate_pacing(config: &toml::Value, errors: &mut Vec<String>) {
    for key in PACING_KEYS {
        if let Some(value) = integer(config, "pacing", key, errors) {
            if !(0..=u32::MAX as i64).contains(&value) {
                errors.push(format!("[pacing] {} out of range", key));
            }
        }
    }

    if let Some(0) = integer(config, "pacing", "poll_interval_ms", &mut Vec::new()) {
        errors.push("[pacing] poll_interval_ms must be above 0".to_string());
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(address) = integer(config, "display", "address", errors) {
        if !(0..=0x7F).contains(&address) {
            errors.push("[display] address must be a 7-bit I2C address".to_string());
        }
    }

    if let Some(contrast) = integer(config, "display", "contrast", errors) {
        if !(0..=255).contains(&contrast) {
            errors.push("[display] contrast must be 0-255".to_string());
        }
    }
}

fn validate_sensor(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("sensor").and_then(|s| s.get("type")) {
        Some(toml::Value::String(kind)) => {
            if !SENSOR_TYPES.iter().any(|t| t.eq_ignore_ascii_case(kind)) {
                errors.push(format!("[sensor] unsupported type '{}'", kind));
            }
        }
        Some(_) => errors.push("[sensor] type must be a string".to_string()),
        None => {}
    }

    if let Some(address) = integer(config, "sensor", "address", errors) {
        if !(0..=0x7F).contains(&address) {
            errors.push("[sensor] address must be a 7-bit I2C address".to_string());
        }
    }

    if let Some(rate) = integer(config, "sensor", "oversampling", errors) {
        if !(1..=128).contains(&rate) || (rate & (rate - 1)) != 0 {
            errors.push("[sensor] oversampling must be 1, 2, 4 ... 128".to_string());
        }
    }
}
