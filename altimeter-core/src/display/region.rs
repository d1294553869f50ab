//! Render region (panel write window)

/// Errors constructing a render region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionError {
    /// End column lies before start column
    InvertedColumns,
    /// End page lies before start page
    InvertedPages,
}

/// Column/page window on the panel, inclusive on both ends
///
/// `byte_length` is derived from the bounds and recomputed by every setter,
/// so it can never disagree with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderRegion {
    start_column: u8,
    end_column: u8,
    start_page: u8,
    end_page: u8,
    byte_length: usize,
}

impl RenderRegion {
    /// Create a region covering columns `start_column..=end_column` and
    /// pages `start_page..=end_page`
    pub fn new(start_column: u8, end_column: u8, start_page: u8, end_page: u8) -> Result<Self, RegionError> {
        check_bounds(start_column, end_column, start_page, end_page)?;

        let mut region = Self {
            start_column,
            end_column,
            start_page,
            end_page,
            byte_length: 0,
        };
        compute_region_length(&mut region);
        Ok(region)
    }

    /// Move the column bounds
    pub fn set_columns(&mut self, start_column: u8, end_column: u8) -> Result<(), RegionError> {
        check_bounds(start_column, end_column, self.start_page, self.end_page)?;
        self.start_column = start_column;
        self.end_column = end_column;
        compute_region_length(self);
        Ok(())
    }

    /// Move the page bounds
    pub fn set_pages(&mut self, start_page: u8, end_page: u8) -> Result<(), RegionError> {
        check_bounds(self.start_column, self.end_column, start_page, end_page)?;
        self.start_page = start_page;
        self.end_page = end_page;
        compute_region_length(self);
        Ok(())
    }

    pub fn start_column(&self) -> u8 {
        self.start_column
    }

    pub fn end_column(&self) -> u8 {
        self.end_column
    }

    pub fn start_page(&self) -> u8 {
        self.start_page
    }

    pub fn end_page(&self) -> u8 {
        self.end_page
    }

    /// Number of framebuffer bytes the panel expects for this window
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }
}

fn check_bounds(start_column: u8, end_column: u8, start_page: u8, end_page: u8) -> Result<(), RegionError> {
    if end_column < start_column {
        return Err(RegionError::InvertedColumns);
    }
    if end_page < start_page {
        return Err(RegionError::InvertedPages);
    }
    Ok(())
}

/// Recompute `byte_length` from the region bounds
pub fn compute_region_length(region: &mut RenderRegion) {
    let columns = (region.end_column - region.start_column) as usize + 1;
    let pages = (region.end_page - region.start_page) as usize + 1;
    region.byte_length = columns * pages;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_panel_length() {
        let region = RenderRegion::new(0, 127, 0, 7).unwrap();
        assert_eq!(region.byte_length(), 1024);
    }

    #[test]
    fn test_single_byte_region() {
        let region = RenderRegion::new(5, 5, 3, 3).unwrap();
        assert_eq!(region.byte_length(), 1);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert_eq!(RenderRegion::new(10, 9, 0, 0), Err(RegionError::InvertedColumns));
        assert_eq!(RenderRegion::new(0, 0, 4, 2), Err(RegionError::InvertedPages));
    }

    #[test]
    fn test_setters_recompute_length() {
        let mut region = RenderRegion::new(0, 127, 0, 7).unwrap();

        region.set_columns(0, 63).unwrap();
        assert_eq!(region.byte_length(), 64 * 8);

        region.set_pages(2, 3).unwrap();
        assert_eq!(region.byte_length(), 64 * 2);

        // A rejected update leaves the region untouched
        assert!(region.set_pages(3, 2).is_err());
        assert_eq!(region.start_page(), 2);
        assert_eq!(region.byte_length(), 64 * 2);
    }

    proptest! {
        #[test]
        fn prop_length_matches_bounds(a in any::<u8>(), b in any::<u8>(), c in any::<u8>(), d in any::<u8>()) {
            let (start_column, end_column) = (a.min(b), a.max(b));
            let (start_page, end_page) = (c.min(d), c.max(d));
            let mut region = RenderRegion::new(start_column, end_column, start_page, end_page).unwrap();
            compute_region_length(&mut region);

            let expected = (end_column as usize - start_column as usize + 1)
                * (end_page as usize - start_page as usize + 1);
            prop_assert_eq!(region.byte_length(), expected);
        }
    }
}
