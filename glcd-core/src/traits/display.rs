//! Drawing API consumed by applications

use crate::geometry::WIDTH;

/// Pixel and text drawing on a page-addressed monochrome panel
///
/// `line`/`col` address text cells (8 px rows, 6 px built-in cells);
/// `x`/`y` address raw pixels.
///
/// Implementations mutate hardware state across several bus transfers
/// per call. A handle shared between threads must be serialized by the
/// caller.
pub trait GraphicDisplay {
    /// Error type for display operations
    type Error;

    /// Clear the whole surface and home the cursor
    fn cls(&mut self) -> Result<(), Self::Error>;

    /// Draw `text` with the built-in font starting at a text cell
    fn display_string_at(&mut self, text: &str, line: u8, col: u8) -> Result<(), Self::Error>;

    /// Draw `text` with a selectable font starting at a text cell.
    ///
    /// Unknown `font` selectors fall back to the built-in font.
    fn display_string_with_font_at(
        &mut self,
        text: &str,
        font: u8,
        line: u8,
        col: u8,
    ) -> Result<(), Self::Error>;

    /// Outline a rectangle `length` pixels wide and `width` pixels tall
    fn draw_rect(&mut self, x: u8, y: u8, length: u8, width: u8) -> Result<(), Self::Error>;

    /// Draw a line between two pixels, both included
    fn draw_line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8) -> Result<(), Self::Error>;

    /// Blit pre-packed page bytes: `dy / 8` page rows of `dx` bytes each
    fn draw_bitmap(&mut self, data: &[u8], x: u8, y: u8, dx: u8, dy: u8)
        -> Result<(), Self::Error>;

    /// Select the memory line shown at the top of the panel (vertical scroll)
    fn set_start_line(&mut self, line: u8) -> Result<(), Self::Error>;

    /// Whether the panel has been initialized and is not faulted
    fn is_ready(&self) -> bool;
}

/// Helpers built from the core drawing operations
pub trait GraphicDisplayExt: GraphicDisplay {
    /// Draw a horizontal rule across the full panel width at pixel row `y`
    fn draw_hrule(&mut self, y: u8) -> Result<(), Self::Error> {
        self.draw_line(0, y, WIDTH - 1, y)
    }
}

// Blanket implementation for all GraphicDisplay types
impl<T: GraphicDisplay> GraphicDisplayExt for T {}
