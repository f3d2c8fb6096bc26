//! Primitive renderer
//!
//! Pixels, lines, rectangles, bitmaps and text, expressed purely in
//! terms of address-space operations. Pixel plotting is
//! read-modify-write so neighbouring pixels in the same byte survive.

use embedded_hal::delay::DelayNs;
use glcd_core::geometry::{PAGES, PAGE_HEIGHT, WIDTH};
use glcd_core::raster::{LinePoints, RectOutline};
use glcd_core::{DisplayError, FontDescriptor, Point};
use glcd_hal::ByteBus;

use super::address::AddressSpace;
use super::bus::Result;
use crate::fonts::builtin;

/// Light the pixel at `(x, y)`
pub fn set_pixel<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    x: u8,
    y: u8,
) -> Result<(), B> {
    let point = Point::new(x, y);
    if !point.is_on_surface() {
        return Err(DisplayError::coordinate(x, y));
    }

    let (page, bit) = point.page_bit();
    let current = space.read_cell(x, page)?;
    space.set_address(x, page)?;
    space.write_byte(current | (1 << bit))
}

/// Bresenham line between two on-surface endpoints, both inclusive
pub fn draw_line<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    start: Point,
    end: Point,
) -> Result<(), B> {
    for endpoint in [start, end] {
        if !endpoint.is_on_surface() {
            return Err(DisplayError::coordinate(endpoint.x, endpoint.y));
        }
    }

    for point in LinePoints::new(start, end) {
        set_pixel(space, point.x, point.y)?;
    }
    Ok(())
}

/// Outline of the `length` x `width` rectangle with top-left `(x, y)`
pub fn draw_rect<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    x: u8,
    y: u8,
    length: u8,
    width: u8,
) -> Result<(), B> {
    let outline = RectOutline::on_surface(x, y, length, width).ok_or_else(|| {
        DisplayError::coordinate(
            (x as u16 + length as u16).saturating_sub(1),
            (y as u16 + width as u16).saturating_sub(1),
        )
    })?;

    for point in outline {
        set_pixel(space, point.x, point.y)?;
    }
    Ok(())
}

/// Copy a page-packed image to the panel.
///
/// `data` holds `dy / 8` rows of `dx` column bytes. `y` is the pixel row
/// of the top edge and must sit on a page boundary.
pub fn draw_bitmap<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    data: &[u8],
    x: u8,
    y: u8,
    dx: u8,
    dy: u8,
) -> Result<(), B> {
    let rows = dy / PAGE_HEIGHT;
    let first_page = y / PAGE_HEIGHT;
    if y % PAGE_HEIGHT != 0 || x >= WIDTH || first_page + rows > PAGES {
        return Err(DisplayError::coordinate(x, y));
    }

    let required = dx as usize * rows as usize;
    if data.len() < required {
        return Err(DisplayError::BufferTooShort {
            required,
            provided: data.len(),
        });
    }

    if dx == 0 {
        return Ok(());
    }
    for (row, columns) in data[..required].chunks(dx as usize).enumerate() {
        space.set_address(x, first_page + row as u8)?;
        for &byte in columns {
            space.write_byte(byte)?;
        }
    }
    Ok(())
}

/// Draw `code` in `font` at the cursor.
///
/// Each page row of the glyph is followed by a blank spacer column. The
/// cursor then moves right by the glyph width plus spacer on the origin
/// page, or to column 0 of the next text row when that runs off the
/// panel. Codes outside the font are skipped without bus traffic.
/// Glyphs whose rows would run below the last page are rejected before
/// anything is drawn.
///
/// A multi-row glyph starting near column 127 keeps the hardware
/// auto-increment for its first row, so the columns past the edge land
/// at the left of the next page while later rows restart at the origin
/// column.
pub fn draw_char<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    code: u8,
    font: &FontDescriptor<'_>,
) -> Result<(), B> {
    let Some(glyph) = font.glyph(code) else {
        return Ok(());
    };
    let origin = space.cursor();
    if origin.page() + glyph.rows() > PAGES {
        return Err(DisplayError::coordinate(
            origin.x(),
            origin.page() + glyph.rows() - 1,
        ));
    }

    for row in 0..glyph.rows() {
        if row > 0 {
            space.set_address(origin.x(), origin.page() + row)?;
        }
        for col in 0..glyph.width() {
            space.write_byte(glyph.column_byte(row, col))?;
        }
        space.write_byte(0)?;
    }

    let next_x = origin.x() as u16 + glyph.width() as u16 + 1;
    if next_x < WIDTH as u16 {
        space.set_address(next_x as u8, origin.page())
    } else {
        space.set_address(0, (origin.page() + glyph.rows()) % PAGES)
    }
}

/// Draw `code` in the built-in 5x8 font: five columns and a spacer
pub fn write_char<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    code: u8,
) -> Result<(), B> {
    for &column in builtin::glyph(code) {
        space.write_byte(column)?;
    }
    space.write_byte(0)
}

/// Draw a byte string at the cursor, stopping at the first NUL.
///
/// Uses `font` when given, the built-in font otherwise.
pub fn display_string<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    text: Option<&[u8]>,
    font: Option<&FontDescriptor<'_>>,
) -> Result<(), B> {
    let text = text.ok_or(DisplayError::NullArgument)?;

    for &code in text.iter().take_while(|&&code| code != 0) {
        match font {
            Some(font) => draw_char(space, code, font)?,
            None => write_char(space, code)?,
        }
    }
    Ok(())
}

/// Zero all display RAM, then home: start line 0, cursor (0, 0)
pub fn clear<B: ByteBus, D: DelayNs>(space: &mut AddressSpace<B, D>) -> Result<(), B> {
    for page in 0..PAGES {
        space.set_address(0, page)?;
        for _ in 0..WIDTH {
            space.write_byte(0)?;
        }
    }
    space.set_start_line(0)?;
    space.set_address(0, 0)
}
