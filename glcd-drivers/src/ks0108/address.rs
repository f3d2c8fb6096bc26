//! Dual-controller address space
//!
//! Presents the two 64-column controllers as one 128x64 surface of 8
//! pages. The software cursor mirrors the active controller's counters:
//! it advances after every data transfer and, on wrapping past column
//! 127, moves to the next page and re-addresses both controllers.
//!
//! Addressing always runs the same three steps:
//!
//! 1. `SET_PAGE` to both controllers
//! 2. `SET_Y 0` to both controllers
//! 3. `SET_Y local_x` to the controller owning the column
//!
//! Step 2 keeps the inactive controller parked at column 0, so a run of
//! writes crossing x=64 continues seamlessly on the right controller.

use embedded_hal::delay::DelayNs;
use glcd_core::command::Instruction;
use glcd_core::geometry::HEIGHT;
use glcd_core::{Controller, DisplayConfig, DisplayError, PixelAddress};
use glcd_hal::ByteBus;

use super::bus::{BusAdapter, Result};

/// Cursor-tracking view over both controllers
pub struct AddressSpace<B, D> {
    bus: BusAdapter<B, D>,
    cursor: PixelAddress,
}

impl<B: ByteBus, D: DelayNs> AddressSpace<B, D> {
    pub fn new(bus: B, delay: D, config: DisplayConfig) -> Self {
        Self {
            bus: BusAdapter::new(bus, delay, config),
            cursor: PixelAddress::HOME,
        }
    }

    /// Where the next data byte lands
    pub fn cursor(&self) -> PixelAddress {
        self.cursor
    }

    pub fn bus(&mut self) -> &mut BusAdapter<B, D> {
        &mut self.bus
    }

    /// Pulse reset and forget the cursor (the controllers reset to 0,0)
    pub fn reset(&mut self) -> Result<(), B> {
        self.bus.reset()?;
        self.cursor = PixelAddress::HOME;
        Ok(())
    }

    /// Send one instruction to both controllers, controller 0 first
    pub fn broadcast(&mut self, instruction: Instruction) -> Result<(), B> {
        for controller in Controller::ALL {
            self.bus.write_command(instruction, controller)?;
        }
        Ok(())
    }

    /// Point both controllers at column `x` (0-127) of `page` (0-7)
    pub fn set_address(&mut self, x: u8, page: u8) -> Result<(), B> {
        let address = PixelAddress::new(x, page).ok_or(DisplayError::coordinate(x, page))?;
        self.select(address)?;
        self.cursor = address;
        Ok(())
    }

    fn select(&mut self, address: PixelAddress) -> Result<(), B> {
        self.broadcast(Instruction::SetPage(address.page()))?;
        self.broadcast(Instruction::SetY(0))?;
        self.bus
            .write_command(Instruction::SetY(address.local_x()), address.controller())
    }

    fn advance(&mut self) -> Result<(), B> {
        let (next, wrapped) = self.cursor.advance();
        if wrapped {
            self.select(next)?;
        }
        self.cursor = next;
        Ok(())
    }

    /// Write one byte at the cursor and advance it
    pub fn write_byte(&mut self, byte: u8) -> Result<(), B> {
        self.bus.write_display_data(byte, self.cursor.controller())?;
        self.advance()
    }

    /// Read one byte at the cursor and advance it.
    ///
    /// This is a raw transfer: right after an address change it returns
    /// the controller's stale output latch. Use [`read_cell`](Self::read_cell)
    /// for the value actually stored.
    pub fn read_byte(&mut self) -> Result<u8, B> {
        let byte = self.bus.read_display_data(self.cursor.controller())?;
        self.advance()?;
        Ok(byte)
    }

    /// Stored byte at column `x` of `page`
    ///
    /// Performs a dummy read to prime the output latch, then re-addresses
    /// and reads again. Leaves the cursor one column past `x`.
    pub fn read_cell(&mut self, x: u8, page: u8) -> Result<u8, B> {
        self.set_address(x, page)?;
        self.read_byte()?;
        self.set_address(x, page)?;
        self.read_byte()
    }

    /// Scroll the panel so RAM row `line` is shown at the top
    pub fn set_start_line(&mut self, line: u8) -> Result<(), B> {
        if line >= HEIGHT {
            return Err(DisplayError::coordinate(line, 0u8));
        }
        debug!("start line {}", line);
        self.broadcast(Instruction::StartLine(line))
    }

    pub fn set_display_on(&mut self, on: bool) -> Result<(), B> {
        self.broadcast(Instruction::DisplayOn(on))
    }

    pub fn release(self) -> (B, D) {
        self.bus.release()
    }

    #[cfg(test)]
    pub(crate) fn panel(&self) -> &B {
        self.bus.bus()
    }

    #[cfg(test)]
    pub(crate) fn panel_mut(&mut self) -> &mut B {
        self.bus.bus_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NoopDelay, SimulatedPanel};
    use glcd_core::geometry::{PAGES, WIDTH};
    use proptest::prelude::*;

    fn space() -> AddressSpace<SimulatedPanel, NoopDelay> {
        AddressSpace::new(SimulatedPanel::new(), NoopDelay::new(), DisplayConfig::default())
    }

    #[test]
    fn test_set_address_command_sequence() {
        let mut space = space();
        space.set_address(70, 3).unwrap();

        assert_eq!(
            space.panel().commands(),
            &[
                (Controller::Left, Instruction::SetPage(3)),
                (Controller::Right, Instruction::SetPage(3)),
                (Controller::Left, Instruction::SetY(0)),
                (Controller::Right, Instruction::SetY(0)),
                (Controller::Right, Instruction::SetY(6)),
            ]
        );
        assert_eq!(space.cursor(), PixelAddress::new(70, 3).unwrap());
        assert_eq!(space.panel().select_violations(), 0);
    }

    #[test]
    fn test_set_address_rejects_off_surface() {
        let mut space = space();

        assert_eq!(
            space.set_address(128, 0),
            Err(DisplayError::coordinate(128u8, 0u8))
        );
        assert_eq!(space.set_address(0, 8), Err(DisplayError::coordinate(0u8, 8u8)));
        assert_eq!(space.panel().writes(), 0);
        assert_eq!(space.cursor(), PixelAddress::HOME);
    }

    #[test]
    fn test_write_crosses_controller_boundary() {
        let mut space = space();
        space.set_address(62, 0).unwrap();
        for byte in [0x01, 0x02, 0x03, 0x04] {
            space.write_byte(byte).unwrap();
        }

        let panel = space.panel();
        assert_eq!(panel.cell(62, 0), 0x01);
        assert_eq!(panel.cell(63, 0), 0x02);
        assert_eq!(panel.cell(64, 0), 0x03);
        assert_eq!(panel.cell(65, 0), 0x04);
        assert_eq!(space.cursor().x(), 66);
    }

    #[test]
    fn test_write_wraps_to_next_page() {
        let mut space = space();
        space.set_address(127, 2).unwrap();
        space.write_byte(0xAA).unwrap();
        space.write_byte(0xBB).unwrap();

        assert_eq!(space.panel().cell(127, 2), 0xAA);
        assert_eq!(space.panel().cell(0, 3), 0xBB);
        assert_eq!(space.cursor(), PixelAddress::new(1, 3).unwrap());
    }

    #[test]
    fn test_last_page_wraps_to_first() {
        let mut space = space();
        space.set_address(127, 7).unwrap();
        space.write_byte(0xFF).unwrap();

        assert_eq!(space.cursor(), PixelAddress::HOME);
        space.write_byte(0x11).unwrap();
        assert_eq!(space.panel().cell(0, 0), 0x11);
    }

    #[test]
    fn test_raw_read_after_address_is_stale() {
        let mut space = space();
        space.panel_mut().set_cell(10, 1, 0x5A);

        space.set_address(10, 1).unwrap();
        let stale = space.read_byte().unwrap();
        assert_ne!(stale, 0x5A);

        assert_eq!(space.read_cell(10, 1).unwrap(), 0x5A);
    }

    #[test]
    fn test_start_line_bounds() {
        let mut space = space();

        assert_eq!(
            space.set_start_line(64),
            Err(DisplayError::coordinate(64u8, 0u8))
        );
        assert!(space.panel().commands().is_empty());

        space.set_start_line(63).unwrap();
        assert_eq!(
            space.panel().commands(),
            &[
                (Controller::Left, Instruction::StartLine(63)),
                (Controller::Right, Instruction::StartLine(63)),
            ]
        );
        assert_eq!(space.panel().start_line(Controller::Right), 63);
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut space = space();
        space.panel_mut().fail_writes_after(3);

        let result = space.set_address(0, 0);
        assert!(matches!(result, Err(DisplayError::BusWrite(_))));
    }

    proptest! {
        #[test]
        fn prop_read_back(x in 0u8..WIDTH, page in 0u8..PAGES, value: u8) {
            let mut space = space();
            space.set_address(x, page).unwrap();
            space.write_byte(value).unwrap();

            prop_assert_eq!(space.read_cell(x, page).unwrap(), value);
        }

        #[test]
        fn prop_inactive_controller_parked(x in 0u8..WIDTH, page in 0u8..PAGES) {
            let mut space = space();
            space.set_address(x, page).unwrap();

            let active = Controller::for_column(x);
            let idle = Controller::ALL[1 - active.index()];
            prop_assert_eq!(space.panel().counters(active), (page, x % 64));
            prop_assert_eq!(space.panel().counters(idle), (page, 0));
        }

        #[test]
        fn prop_cursor_tracks_hardware(x in 0u8..WIDTH, page in 0u8..PAGES, count in 0usize..300) {
            let mut space = space();
            space.set_address(x, page).unwrap();
            for _ in 0..count {
                space.write_byte(0x81).unwrap();
            }

            let cursor = space.cursor();
            let (hw_page, hw_column) = space.panel().counters(cursor.controller());
            prop_assert_eq!(hw_page, cursor.page());
            prop_assert_eq!(hw_column, cursor.local_x());
        }
    }
}
