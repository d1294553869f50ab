//! Glyph renderer
//!
//! Writes 8x8 glyphs straight into framebuffer pages. Vertical placement is
//! quantized to pages: `y` selects page `y / 8`, so every `y` inside the same
//! 8-pixel band lands on the same row. Anything that would not fit on the
//! panel is skipped whole; a glyph is never partially drawn.

use super::font::FONT_8X8;
use super::framebuffer::{Framebuffer, PAGE_HEIGHT};

/// Glyph width and height in pixels
pub const GLYPH_SIZE: usize = 8;

/// Map a character to its font index
///
/// `' '..=DEL` map to `ch - ' '`; everything else falls back to glyph 0
/// (blank).
pub fn glyph_index(ch: char) -> usize {
    let code = ch as u32;
    if (0x20..=0x7F).contains(&code) {
        (code - 0x20) as usize
    } else {
        0
    }
}

fn fits<const WIDTH: usize, const PAGES: usize>(x: u16, y: u16) -> bool {
    let height = PAGES * PAGE_HEIGHT;
    WIDTH >= GLYPH_SIZE
        && height >= GLYPH_SIZE
        && x as usize <= WIDTH - GLYPH_SIZE
        && y as usize <= height - GLYPH_SIZE
}

/// Draw one character with its top-left corner at `(x, y)`
///
/// No-op if `x > WIDTH - 8` or `y > HEIGHT - 8`.
pub fn write_char<const WIDTH: usize, const PAGES: usize>(
    buffer: &mut Framebuffer<WIDTH, PAGES>,
    x: u16,
    y: u16,
    ch: char,
) {
    if !fits::<WIDTH, PAGES>(x, y) {
        return;
    }

    let row = y as usize / PAGE_HEIGHT;
    let x = x as usize;
    let glyph = &FONT_8X8[glyph_index(ch)];

    if let Some(page) = buffer.page_mut(row) {
        page[x..x + GLYPH_SIZE].copy_from_slice(glyph);
    }
}

/// Draw a string left to right starting at `(x, y)`
///
/// Advances 8 pixels per byte with no wrapping. Each byte is bounds-checked
/// on its own, so text running off the right edge is cut at the last whole
/// glyph. Bytes of a multi-byte UTF-8 character are outside the font and
/// each draw a blank cell.
pub fn write_string<const WIDTH: usize, const PAGES: usize>(
    buffer: &mut Framebuffer<WIDTH, PAGES>,
    x: u16,
    y: u16,
    text: &str,
) {
    if !fits::<WIDTH, PAGES>(x, y) {
        return;
    }

    let mut x = x;
    for byte in text.bytes() {
        write_char(buffer, x, y, byte as char);
        x = x.saturating_add(GLYPH_SIZE as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::PanelFramebuffer;
    use proptest::prelude::*;

    fn glyph_at(fb: &PanelFramebuffer, page: usize, x: usize) -> [u8; 8] {
        let mut out = [0u8; 8];
        out.copy_from_slice(&fb.page(page).unwrap()[x..x + 8]);
        out
    }

    #[test]
    fn test_glyph_index() {
        assert_eq!(glyph_index(' '), 0);
        assert_eq!(glyph_index('!'), 1);
        assert_eq!(glyph_index('A'), 33);
        assert_eq!(glyph_index('~'), 94);
        assert_eq!(glyph_index('\u{7f}'), 95);
        assert_eq!(glyph_index('\n'), 0);
        assert_eq!(glyph_index('°'), 0);
    }

    #[test]
    fn test_write_char_copies_glyph() {
        let mut fb = PanelFramebuffer::new();
        write_char(&mut fb, 16, 8, 'A');

        assert_eq!(glyph_at(&fb, 1, 16), FONT_8X8[glyph_index('A')]);
        // Linear offset is row * width + x
        assert_eq!(fb.as_bytes()[128 + 16..128 + 24], FONT_8X8[33]);
    }

    #[test]
    fn test_vertical_position_is_quantized() {
        let mut a = PanelFramebuffer::new();
        let mut b = PanelFramebuffer::new();
        write_char(&mut a, 0, 8, 'H');
        write_char(&mut b, 0, 15, 'H');
        assert_eq!(a, b);

        // y = 10 and y = 12 share page 1, the second write wins
        let mut fb = PanelFramebuffer::new();
        write_char(&mut fb, 0, 10, 'X');
        write_char(&mut fb, 0, 12, 'O');
        assert_eq!(glyph_at(&fb, 1, 0), FONT_8X8[glyph_index('O')]);
    }

    #[test]
    fn test_edge_positions_are_drawn() {
        let mut fb = PanelFramebuffer::new();
        write_char(&mut fb, 120, 56, '#');
        assert_eq!(glyph_at(&fb, 7, 120), FONT_8X8[glyph_index('#')]);
    }

    #[test]
    fn test_string_truncates_at_right_edge() {
        let mut fb = PanelFramebuffer::new();
        // 20 characters, only 16 fit across 128 pixels
        write_string(&mut fb, 0, 0, "ABCDEFGHIJKLMNOPQRST");

        assert_eq!(glyph_at(&fb, 0, 120), FONT_8X8[glyph_index('P')]);
        // Nothing spilled into the next page
        assert!(fb.page(1).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_string_with_partial_last_cell() {
        let mut fb = PanelFramebuffer::new();
        write_string(&mut fb, 4, 0, "ABCDEFGHIJKLMNOPQ");

        // Characters at x = 4..=116 fit; 'P' at x = 124 does not
        assert_eq!(glyph_at(&fb, 0, 116), FONT_8X8[glyph_index('O')]);
        assert!(fb.page(0).unwrap()[124..].iter().all(|&b| b == 0));
        let mut without_tail = PanelFramebuffer::new();
        write_string(&mut without_tail, 4, 0, "ABCDEFGHIJKLMNO");
        assert_eq!(fb, without_tail);
        assert!(fb.page(1).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_multibyte_char_draws_blank_cell_per_byte() {
        let mut fb = PanelFramebuffer::new();
        // '°' is two bytes in UTF-8
        write_string(&mut fb, 0, 0, "1°F");

        let mut expected = PanelFramebuffer::new();
        write_char(&mut expected, 0, 0, '1');
        write_char(&mut expected, 24, 0, 'F');
        assert_eq!(fb, expected);
    }

    #[test]
    fn test_blank_string_clears_cell() {
        let mut fb = PanelFramebuffer::new();
        write_char(&mut fb, 0, 0, 'W');
        write_string(&mut fb, 0, 0, " ");
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    proptest! {
        #[test]
        fn prop_out_of_bounds_is_noop(x in any::<u16>(), y in any::<u16>(), text in "[ -~]{0,24}") {
            prop_assume!(x > 120 || y > 56);

            let mut fb = PanelFramebuffer::new();
            write_string(&mut fb, 0, 0, "seed");
            let before = fb.clone();

            write_char(&mut fb, x, y, 'M');
            write_string(&mut fb, x, y, &text);

            prop_assert_eq!(fb, before);
        }

        #[test]
        fn prop_unmapped_chars_render_glyph_zero(ch in any::<char>(), x in 0u16..=120, y in 0u16..=56) {
            prop_assume!(!(' '..='\u{7f}').contains(&ch));

            let mut expected = PanelFramebuffer::new();
            for page in 0..8 {
                expected.page_mut(page).unwrap().fill(0xFF);
            }
            let mut fb = expected.clone();

            write_char(&mut expected, x, y, ' ');
            write_char(&mut fb, x, y, ch);

            prop_assert_eq!(fb, expected);
        }

        #[test]
        fn prop_write_touches_only_its_cell(x in 0u16..=120, y in 0u16..=56, ch in proptest::char::range('!', '~')) {
            let mut fb = PanelFramebuffer::new();
            for page in 0..8 {
                fb.page_mut(page).unwrap().fill(0x55);
            }

            write_char(&mut fb, x, y, ch);

            let row = y as usize / 8;
            for (i, &byte) in fb.as_bytes().iter().enumerate() {
                let (page, column) = (i / 128, i % 128);
                let inside = page == row && column >= x as usize && column < x as usize + 8;
                if !inside {
                    prop_assert_eq!(byte, 0x55);
                }
            }
        }
    }
}
