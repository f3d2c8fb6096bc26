//! Compiled-in fonts
//!
//! - [`builtin`] - fixed 5x8 ASCII font used by the plain text calls
//! - [`PROPORTIONAL_8`] - variable-width, one page row
//! - [`TALL_14`] - variable-width, two page rows

pub mod builtin;
mod tables;

use glcd_core::{FontDescriptor, FontId, FontSet};

pub use tables::{PROPORTIONAL_8, TALL_14};

/// Font set holding every compiled-in variable-width font
pub fn builtin_fonts() -> FontSet<'static> {
    let mut set = FontSet::new();
    for (id, table) in [(FontId::Proportional, PROPORTIONAL_8), (FontId::Tall, TALL_14)] {
        if FontDescriptor::parse(table)
            .and_then(|font| set.register(id, font))
            .is_err()
        {
            warn!("compiled-in font {} rejected", id as u8);
        }
    }
    set
}
