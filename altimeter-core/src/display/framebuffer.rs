//! Paged framebuffer storage

use super::region::RenderRegion;

/// Height of one page in pixels
pub const PAGE_HEIGHT: usize = 8;

/// SSD1306 panel width in pixels
pub const PANEL_WIDTH: usize = 128;

/// SSD1306 panel height in pixels
pub const PANEL_HEIGHT: usize = 64;

/// SSD1306 panel height in pages
pub const PANEL_PAGES: usize = PANEL_HEIGHT / PAGE_HEIGHT;

/// Framebuffer sized for the 128x64 panel
pub type PanelFramebuffer = Framebuffer<PANEL_WIDTH, PANEL_PAGES>;

/// Monochrome framebuffer organized as `PAGES` pages of `WIDTH` column bytes
///
/// Storage is page-major, then column: byte `page * WIDTH + column` holds the
/// 8 vertical pixels of `column` within `page`. The length is fixed at
/// `WIDTH * PAGES` by the type.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer<const WIDTH: usize, const PAGES: usize> {
    pages: [[u8; WIDTH]; PAGES],
}

impl<const WIDTH: usize, const PAGES: usize> Default for Framebuffer<WIDTH, PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const WIDTH: usize, const PAGES: usize> Framebuffer<WIDTH, PAGES> {
    /// Width in pixels
    pub const WIDTH: usize = WIDTH;

    /// Height in pixels
    pub const HEIGHT: usize = PAGES * PAGE_HEIGHT;

    /// Total length in bytes
    pub const LEN: usize = WIDTH * PAGES;

    /// Create a blank framebuffer
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Clear every pixel
    pub fn clear(&mut self) {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Raw bytes in panel order
    pub fn as_bytes(&self) -> &[u8] {
        self.pages.as_flattened()
    }

    /// Get one page
    pub fn page(&self, page: usize) -> Option<&[u8; WIDTH]> {
        self.pages.get(page)
    }

    /// Get one page mutably
    pub fn page_mut(&mut self, page: usize) -> Option<&mut [u8; WIDTH]> {
        self.pages.get_mut(page)
    }

    /// Region covering the whole panel
    ///
    /// Returns `None` when the dimensions don't fit the panel's 8-bit
    /// column/page addressing.
    pub fn full_region() -> Option<RenderRegion> {
        if WIDTH == 0 || PAGES == 0 {
            return None;
        }
        let end_column = u8::try_from(WIDTH - 1).ok()?;
        let end_page = u8::try_from(PAGES - 1).ok()?;
        RenderRegion::new(0, end_column, 0, end_page).ok()
    }
}

impl<const WIDTH: usize, const PAGES: usize> core::fmt::Debug for Framebuffer<WIDTH, PAGES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &WIDTH)
            .field("pages", &PAGES)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_dimensions() {
        assert_eq!(PanelFramebuffer::WIDTH, 128);
        assert_eq!(PanelFramebuffer::HEIGHT, 64);
        assert_eq!(PanelFramebuffer::LEN, 1024);

        let fb = PanelFramebuffer::new();
        assert_eq!(fb.as_bytes().len(), 1024);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_page_major_layout() {
        let mut fb = Framebuffer::<16, 4>::new();
        fb.page_mut(2).unwrap()[5] = 0xAA;

        assert_eq!(fb.as_bytes()[2 * 16 + 5], 0xAA);
        assert_eq!(fb.as_bytes().iter().filter(|&&b| b != 0).count(), 1);
    }

    #[test]
    fn test_out_of_range_page() {
        let mut fb = Framebuffer::<16, 4>::new();
        assert!(fb.page(4).is_none());
        assert!(fb.page_mut(4).is_none());
    }

    #[test]
    fn test_clear() {
        let mut fb = PanelFramebuffer::new();
        fb.page_mut(7).unwrap().fill(0xFF);
        fb.clear();
        assert_eq!(fb, PanelFramebuffer::new());
    }

    #[test]
    fn test_full_region() {
        let region = PanelFramebuffer::full_region().unwrap();
        assert_eq!(region.end_column(), 127);
        assert_eq!(region.end_page(), 7);
        assert_eq!(region.byte_length(), PanelFramebuffer::LEN);

        assert!(Framebuffer::<300, 1>::full_region().is_none());
    }
}
