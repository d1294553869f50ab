//! Board-agnostic core logic for the altimeter station firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (display transport, sensor session)
//! - Paged framebuffer, 8x8 font and glyph renderer
//! - Sensor result types and status codes
//! - Cross-core dispatcher (command and result queues)
//! - Display loop state machine
//! - Station configuration types and parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod display;
pub mod display_loop;
pub mod sensor;
pub mod traits;
