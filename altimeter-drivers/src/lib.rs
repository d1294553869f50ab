//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in altimeter-core:
//!
//! - SSD1306 OLED panel over async I2C (display transport)
//! - DPS310 barometric pressure sensor over blocking I2C (sensor session)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod sensor;
