//! Panel geometry
//!
//! The 128x64 surface is two 64x64 controllers side by side. Each
//! controller stores its half as 8 pages of 64 columns; one byte covers
//! 8 vertically stacked pixels of a page, bit 0 on top.

/// Panel width in pixels
pub const WIDTH: u8 = 128;

/// Panel height in pixels
pub const HEIGHT: u8 = 64;

/// Columns driven by one controller
pub const COLUMNS_PER_CONTROLLER: u8 = 64;

/// Pages per controller
pub const PAGES: u8 = 8;

/// Pixel rows per page
pub const PAGE_HEIGHT: u8 = 8;

/// Number of controllers
pub const CONTROLLERS: usize = (WIDTH / COLUMNS_PER_CONTROLLER) as usize;

/// Horizontal pixel step of one built-in text cell (5 px glyph + 1 px spacer)
pub const CELL_WIDTH: u8 = 6;

/// Text cells per line with the built-in font
pub const TEXT_COLUMNS: u8 = WIDTH.div_ceil(CELL_WIDTH);

/// One of the two display controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Controller {
    /// Columns 0-63
    Left = 0,
    /// Columns 64-127
    Right = 1,
}

impl Controller {
    /// Both controllers, in index order
    pub const ALL: [Controller; CONTROLLERS] = [Controller::Left, Controller::Right];

    /// Controller index (0 or 1)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Controller by index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Controller::Left),
            1 => Some(Controller::Right),
            _ => None,
        }
    }

    /// Controller owning surface column `x` (x < 128)
    pub fn for_column(x: u8) -> Self {
        if x < COLUMNS_PER_CONTROLLER {
            Controller::Left
        } else {
            Controller::Right
        }
    }
}

/// A pixel on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

impl Point {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Whether the point lies on the 128x64 surface
    pub fn is_on_surface(&self) -> bool {
        self.x < WIDTH && self.y < HEIGHT
    }

    /// Page holding this pixel and the bit inside that page's byte
    pub fn page_bit(&self) -> (u8, u8) {
        (self.y / PAGE_HEIGHT, self.y % PAGE_HEIGHT)
    }
}

/// Validated byte address: surface column plus page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelAddress {
    x: u8,
    page: u8,
}

impl PixelAddress {
    /// Home position (0, 0)
    pub const HOME: Self = Self { x: 0, page: 0 };

    /// Create an address; `None` when `x >= 128` or `page >= 8`
    pub fn new(x: u8, page: u8) -> Option<Self> {
        (x < WIDTH && page < PAGES).then_some(Self { x, page })
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn controller(&self) -> Controller {
        Controller::for_column(self.x)
    }

    /// Column inside the owning controller (0-63)
    pub fn local_x(&self) -> u8 {
        self.x % COLUMNS_PER_CONTROLLER
    }

    /// Address after one data transfer.
    ///
    /// Returns the new address and whether the column wrapped, in which
    /// case the page moved on (page 7 wraps back to page 0) and the
    /// controllers must be re-addressed.
    pub fn advance(self) -> (Self, bool) {
        if self.x + 1 < WIDTH {
            (
                Self {
                    x: self.x + 1,
                    page: self.page,
                },
                false,
            )
        } else {
            (
                Self {
                    x: 0,
                    page: (self.page + 1) % PAGES,
                },
                true,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_address_bounds() {
        assert!(PixelAddress::new(127, 7).is_some());
        assert!(PixelAddress::new(128, 0).is_none());
        assert!(PixelAddress::new(0, 8).is_none());
    }

    #[test]
    fn test_controller_split() {
        let addr = PixelAddress::new(63, 0).unwrap();
        assert_eq!(addr.controller(), Controller::Left);
        assert_eq!(addr.local_x(), 63);

        let addr = PixelAddress::new(64, 0).unwrap();
        assert_eq!(addr.controller(), Controller::Right);
        assert_eq!(addr.local_x(), 0);
    }

    #[test]
    fn test_advance_wraps_to_next_page() {
        let (next, wrapped) = PixelAddress::new(126, 3).unwrap().advance();
        assert_eq!((next.x(), next.page(), wrapped), (127, 3, false));

        let (next, wrapped) = PixelAddress::new(127, 3).unwrap().advance();
        assert_eq!((next.x(), next.page(), wrapped), (0, 4, true));

        let (next, wrapped) = PixelAddress::new(127, 7).unwrap().advance();
        assert_eq!((next.x(), next.page(), wrapped), (0, 0, true));
    }

    #[test]
    fn test_text_columns() {
        // Cell 21 starts at x=126, cell 22 would start off-surface
        assert_eq!(TEXT_COLUMNS, 22);
        assert!((TEXT_COLUMNS - 1) * CELL_WIDTH < WIDTH);
    }

    proptest! {
        #[test]
        fn prop_address_translation(x in 0u8..128, page in 0u8..8) {
            let addr = PixelAddress::new(x, page).unwrap();
            prop_assert_eq!(addr.controller().index(), (x / 64) as usize);
            prop_assert_eq!(addr.local_x(), x % 64);
            prop_assert_eq!(addr.page(), page);
        }

        #[test]
        fn prop_out_of_range_rejected(x in 128u8..=255, page in 8u8..=255) {
            prop_assert!(PixelAddress::new(x, 0).is_none());
            prop_assert!(PixelAddress::new(0, page).is_none());
        }
    }
}
