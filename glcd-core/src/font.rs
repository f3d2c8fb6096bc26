//! Font descriptors
//!
//! Fonts are immutable byte tables parsed once at startup and passed to
//! the renderer by reference. Layout:
//!
//! ```text
//! offset  size        field
//! 0       2           total size (big-endian, informational)
//! 2       1           nominal width (informational)
//! 3       1           glyph height in pixels
//! 4       1           first character code
//! 5       1           glyph count N
//! 6       N           per-glyph width in pixels
//! 6+N     ...         glyph bitmaps, concatenated
//! ```
//!
//! Each glyph bitmap holds `ceil(height / 8)` page rows of `width`
//! bytes, first row first. When the height is not a multiple of 8 the
//! last row is stored bottom-aligned and must be shifted right before
//! display.

use heapless::Vec;

use crate::geometry::PAGE_HEIGHT;

/// Offset of the width table
const WIDTH_TABLE: usize = 6;

/// Maximum fonts held by a [`FontSet`]
pub const MAX_FONTS: usize = 4;

/// Font table problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontError {
    /// Table shorter than its header and width table
    Truncated,
    /// Glyph height of 0 or more than 64 pixels
    InvalidHeight(u8),
    /// Character range runs past code 255
    InvalidRange,
    /// Bitmap stream shorter than the width table implies
    MissingBitmaps {
        required: usize,
        provided: usize,
    },
    /// Font set capacity exhausted
    RegistryFull,
}

impl core::fmt::Display for FontError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FontError::Truncated => write!(f, "font table truncated"),
            FontError::InvalidHeight(h) => write!(f, "invalid glyph height {h}"),
            FontError::InvalidRange => write!(f, "character range exceeds 255"),
            FontError::MissingBitmaps { required, provided } => {
                write!(f, "font bitmaps need {required} bytes, table has {provided}")
            }
            FontError::RegistryFull => write!(f, "font set full"),
        }
    }
}

impl core::error::Error for FontError {}

/// A parsed, validated font table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontDescriptor<'a> {
    height: u8,
    first_char: u8,
    widths: &'a [u8],
    bitmaps: &'a [u8],
}

impl<'a> FontDescriptor<'a> {
    /// Parse and validate a font table
    pub fn parse(data: &'a [u8]) -> Result<Self, FontError> {
        if data.len() < WIDTH_TABLE {
            return Err(FontError::Truncated);
        }

        let height = data[3];
        let first_char = data[4];
        let count = data[5] as usize;

        if height == 0 || height > 64 {
            return Err(FontError::InvalidHeight(height));
        }
        if first_char as usize + count > 256 {
            return Err(FontError::InvalidRange);
        }
        if data.len() < WIDTH_TABLE + count {
            return Err(FontError::Truncated);
        }

        let widths = &data[WIDTH_TABLE..WIDTH_TABLE + count];
        let bitmaps = &data[WIDTH_TABLE + count..];

        let columns: usize = widths.iter().map(|&w| w as usize).sum();
        let required = columns * Self::rows_for(height) as usize;
        if bitmaps.len() < required {
            return Err(FontError::MissingBitmaps {
                required,
                provided: bitmaps.len(),
            });
        }

        Ok(Self {
            height,
            first_char,
            widths,
            bitmaps,
        })
    }

    fn rows_for(height: u8) -> u8 {
        height.div_ceil(PAGE_HEIGHT)
    }

    /// Glyph height in pixels
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Bytes per glyph column (page rows per glyph)
    pub fn bytes_per_column(&self) -> u8 {
        Self::rows_for(self.height)
    }

    pub fn first_char(&self) -> u8 {
        self.first_char
    }

    pub fn glyph_count(&self) -> usize {
        self.widths.len()
    }

    /// Whether `code` has a glyph in this font
    pub fn contains(&self, code: u8) -> bool {
        code >= self.first_char && ((code - self.first_char) as usize) < self.widths.len()
    }

    /// Look up the glyph for `code`; `None` outside the font's range
    pub fn glyph(&self, code: u8) -> Option<Glyph<'a>> {
        if !self.contains(code) {
            return None;
        }

        let index = (code - self.first_char) as usize;
        let rows = self.bytes_per_column();
        let width = self.widths[index];

        let preceding: usize = self.widths[..index].iter().map(|&w| w as usize).sum();
        let start = preceding * rows as usize;
        let end = start + width as usize * rows as usize;

        Some(Glyph {
            width,
            rows,
            height: self.height,
            data: &self.bitmaps[start..end],
        })
    }
}

/// One character's bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph<'a> {
    width: u8,
    rows: u8,
    height: u8,
    data: &'a [u8],
}

impl Glyph<'_> {
    /// Width in pixels (columns)
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Page rows covered by the glyph
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Display byte for page row `row`, column `col`
    ///
    /// The last row of a font whose height is not a multiple of 8 is
    /// shifted right so the unused high bits come out zero.
    pub fn column_byte(&self, row: u8, col: u8) -> u8 {
        let byte = self.data[row as usize * self.width as usize + col as usize];
        let covered = (row as u16 + 1) * PAGE_HEIGHT as u16;
        if (self.height as u16) < covered {
            byte >> (covered - self.height as u16)
        } else {
            byte
        }
    }
}

/// Font selector used by the text API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FontId {
    /// Variable-width 8 px font
    Proportional = 0,
    /// Variable-width 14 px font
    Tall = 1,
}

impl FontId {
    /// Map a numeric selector; unknown selectors yield `None`
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FontId::Proportional),
            1 => Some(FontId::Tall),
            _ => None,
        }
    }
}

/// Fonts available to the text API, built once at startup
#[derive(Debug, Clone, Default)]
pub struct FontSet<'a> {
    fonts: Vec<(FontId, FontDescriptor<'a>), MAX_FONTS>,
}

impl<'a> FontSet<'a> {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Register a font under `id`, replacing any earlier registration
    pub fn register(&mut self, id: FontId, font: FontDescriptor<'a>) -> Result<(), FontError> {
        if let Some(slot) = self.fonts.iter_mut().find(|(existing, _)| *existing == id) {
            slot.1 = font;
            return Ok(());
        }
        self.fonts
            .push((id, font))
            .map_err(|_| FontError::RegistryFull)
    }

    pub fn get(&self, id: FontId) -> Option<&FontDescriptor<'a>> {
        self.fonts
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, font)| font)
    }

    /// Resolve a numeric selector; `None` means "use the built-in font"
    pub fn select(&self, selector: u8) -> Option<&FontDescriptor<'a>> {
        FontId::from_u8(selector).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
