//! Raster algorithms
//!
//! Pure point generators. The driver feeds every point to its
//! read-modify-write pixel routine, so these never touch the bus and
//! can be checked exhaustively on the host.

use crate::geometry::{Point, HEIGHT, WIDTH};

/// Integer Bresenham line from `start` to `end`, both endpoints included
///
/// The driving axis is the one with the larger delta (x on ties). Yields
/// exactly `max(|dx|, |dy|) + 1` points, monotonic along the driving
/// axis, starting with `start` even for a zero-length line.
#[derive(Debug, Clone)]
pub struct LinePoints {
    x: i16,
    y: i16,
    end_x: i16,
    end_y: i16,
    dx: i16,
    dy: i16,
    x_inc: i16,
    y_inc: i16,
    err: i16,
    x_major: bool,
    started: bool,
    done: bool,
}

impl LinePoints {
    pub fn new(start: Point, end: Point) -> Self {
        let dx = end.x as i16 - start.x as i16;
        let dy = end.y as i16 - start.y as i16;

        Self {
            x: start.x as i16,
            y: start.y as i16,
            end_x: end.x as i16,
            end_y: end.y as i16,
            dx: dx.abs(),
            dy: dy.abs(),
            x_inc: if dx < 0 { -1 } else { 1 },
            y_inc: if dy < 0 { -1 } else { 1 },
            err: 0,
            x_major: dy.abs() <= dx.abs(),
            started: false,
            done: false,
        }
    }

    fn point(&self) -> Point {
        Point::new(self.x as u8, self.y as u8)
    }
}

impl Iterator for LinePoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            self.done = self.dx == 0 && self.dy == 0;
            return Some(self.point());
        }

        if self.x_major {
            self.x += self.x_inc;
            self.err += 2 * self.dy;
            if self.err > self.dx {
                self.y += self.y_inc;
                self.err -= 2 * self.dx;
            }
            self.done = self.x == self.end_x;
        } else {
            self.y += self.y_inc;
            self.err += 2 * self.dx;
            if self.err > self.dy {
                self.x += self.x_inc;
                self.err -= 2 * self.dy;
            }
            self.done = self.y == self.end_y;
        }

        Some(self.point())
    }
}

/// Rectangle outline as four independent edge runs
///
/// Yields the left and right columns (`width` pixels each, interleaved)
/// then the top and bottom rows (`length` pixels each, interleaved).
/// Corner pixels come out twice; plotting is idempotent.
#[derive(Debug, Clone)]
pub struct RectOutline {
    x: u8,
    y: u8,
    length: u8,
    width: u8,
    vertical: bool,
    index: u8,
    far_side: bool,
}

impl RectOutline {
    /// Outline with top-left `(x, y)`, `length` pixels wide and `width`
    /// pixels tall.
    ///
    /// Returns `None` when any edge pixel would fall off the panel. A
    /// zero `length` or `width` gives an empty outline.
    pub fn on_surface(x: u8, y: u8, length: u8, width: u8) -> Option<Self> {
        let mut outline = Self {
            x,
            y,
            length,
            width,
            vertical: true,
            index: 0,
            far_side: false,
        };

        if length == 0 || width == 0 {
            outline.vertical = false;
            outline.length = 0;
            return Some(outline);
        }

        let right = x as u16 + length as u16 - 1;
        let bottom = y as u16 + width as u16 - 1;
        (right < WIDTH as u16 && bottom < HEIGHT as u16).then_some(outline)
    }
}

impl Iterator for RectOutline {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.vertical && self.index >= self.width {
            self.vertical = false;
            self.index = 0;
        }
        if !self.vertical && self.index >= self.length {
            return None;
        }

        let point = match (self.vertical, self.far_side) {
            (true, false) => Point::new(self.x, self.y + self.index),
            (true, true) => Point::new(self.x + self.length - 1, self.y + self.index),
            (false, false) => Point::new(self.x + self.index, self.y),
            (false, true) => Point::new(self.x + self.index, self.y + self.width - 1),
        };

        if self.far_side {
            self.index += 1;
        }
        self.far_side = !self.far_side;

        Some(point)
    }
}
