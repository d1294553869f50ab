//! Monochrome paged framebuffer and text rendering
//!
//! The panel is addressed in pages: each page is an 8-pixel-tall band, and
//! each byte of a page is one 8-pixel column slice with bit 0 at the top.
//! Text is drawn with a fixed 8x8 font, so one glyph is exactly 8 bytes of
//! one page.

pub mod font;
pub mod framebuffer;
pub mod readout;
pub mod region;
pub mod text;

pub use framebuffer::{Framebuffer, PanelFramebuffer, PAGE_HEIGHT, PANEL_HEIGHT, PANEL_PAGES, PANEL_WIDTH};
pub use readout::{render_fault, render_lines, Line, Readout, FAULT_LINE};
pub use region::{compute_region_length, RegionError, RenderRegion};
pub use text::{glyph_index, write_char, write_string, GLYPH_SIZE};
