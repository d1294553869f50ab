//! Station configuration
//!
//! Typed settings plus a small `no_std` parser for the TOML file the
//! firmware embeds.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
