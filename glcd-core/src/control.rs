//! Control-line shadow
//!
//! The control expander is write-only from the driver's point of view,
//! so the driver keeps a shadow of the six lines and always writes the
//! whole byte. `ControlLines` is that shadow.
//!
//! ```text
//! P7 P6 P5  P4  P3  P2 P1 P0
//!       RST CS2 CS1 E  RW RS
//! ```

use crate::geometry::Controller;

/// Register select: high = display data, low = instruction/status
pub const RS: u8 = 0x01;
/// Read/write: high = read
pub const RW: u8 = 0x02;
/// Enable strobe
pub const EN: u8 = 0x04;
/// Chip select line 1
pub const CS1: u8 = 0x08;
/// Chip select line 2
pub const CS2: u8 = 0x10;
/// Reset, active low
pub const RST: u8 = 0x20;

/// All six control lines
pub const ALL: u8 = RS | RW | EN | CS1 | CS2 | RST;

/// Shadow of the control-line expander
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlLines(u8);

impl ControlLines {
    /// Every line high (power-on idle state)
    pub const IDLE: Self = Self(ALL);

    /// Shadow from raw expander bits (bits outside the six lines are dropped)
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & ALL)
    }

    /// Raw byte to write to the control expander
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn set(&mut self, mask: u8) {
        self.0 |= mask & ALL;
    }

    pub fn clear(&mut self, mask: u8) {
        self.0 &= !mask;
    }

    pub fn is_set(self, mask: u8) -> bool {
        self.0 & mask == mask
    }

    /// Route the next strobe to one controller.
    ///
    /// The board wires controller 0 to respond with CS1 high and CS2 low,
    /// controller 1 with CS2 high and CS1 low.
    pub fn select(&mut self, controller: Controller) {
        match controller {
            Controller::Left => {
                self.clear(CS2);
                self.set(CS1);
            }
            Controller::Right => {
                self.clear(CS1);
                self.set(CS2);
            }
        }
    }

    /// Controller currently addressed, if exactly one is
    pub fn selected(self) -> Option<Controller> {
        match (self.is_set(CS1), self.is_set(CS2)) {
            (true, false) => Some(Controller::Left),
            (false, true) => Some(Controller::Right),
            _ => None,
        }
    }

    /// RS low, RW low
    pub fn command_write(&mut self) {
        self.clear(RS | RW);
    }

    /// RS high, RW low
    pub fn data_write(&mut self) {
        self.set(RS);
        self.clear(RW);
    }

    /// RS low, RW high
    pub fn status_read(&mut self) {
        self.clear(RS);
        self.set(RW);
    }

    /// RS high, RW high
    pub fn data_read(&mut self) {
        self.set(RS | RW);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_has_all_lines_high() {
        assert_eq!(ControlLines::IDLE.bits(), 0x3F);
        assert_eq!(ControlLines::IDLE.selected(), None);
    }

    #[test]
    fn test_partial_update_preserves_other_lines() {
        let mut lines = ControlLines::IDLE;
        lines.clear(EN);
        assert_eq!(lines.bits(), 0x3B);
        lines.set(EN);
        assert_eq!(lines.bits(), 0x3F);
    }

    #[test]
    fn test_select_asserts_one_controller() {
        let mut lines = ControlLines::IDLE;

        lines.select(Controller::Left);
        assert!(lines.is_set(CS1));
        assert!(!lines.is_set(CS2));
        assert_eq!(lines.selected(), Some(Controller::Left));

        lines.select(Controller::Right);
        assert!(!lines.is_set(CS1));
        assert!(lines.is_set(CS2));
        assert_eq!(lines.selected(), Some(Controller::Right));
    }

    #[test]
    fn test_transfer_modes() {
        let mut lines = ControlLines::from_bits(RST);

        lines.data_write();
        assert!(lines.is_set(RS) && !lines.is_set(RW));

        lines.status_read();
        assert!(!lines.is_set(RS) && lines.is_set(RW));

        lines.data_read();
        assert!(lines.is_set(RS | RW));

        lines.command_write();
        assert_eq!(lines.bits(), RST);
    }

    #[test]
    fn test_from_bits_masks_unused_pins() {
        assert_eq!(ControlLines::from_bits(0xFF).bits(), 0x3F);
    }
}
