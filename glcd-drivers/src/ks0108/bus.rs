//! Bus protocol adapter
//!
//! Emulates the controller's parallel bus handshake over the two byte
//! ports: the control port carries a shadow of the six control lines,
//! the data port carries D0-D7. Every control change is a
//! read-modify-write of the shadow followed by a full-byte write.

use embedded_hal::delay::DelayNs;
use glcd_core::command::{Instruction, STATUS_BUSY};
use glcd_core::control::{EN, RST, RW};
use glcd_core::{ControlLines, Controller, DisplayConfig, DisplayError};
use glcd_hal::bus::INPUT_MODE;
use glcd_hal::{ByteBus, Port};

/// Result of a driver operation over bus `B`
pub type Result<T, B> = core::result::Result<T, DisplayError<<B as ByteBus>::Error>>;

/// Low-level bus handshake for the controller pair
pub struct BusAdapter<B, D> {
    bus: B,
    delay: D,
    lines: ControlLines,
    config: DisplayConfig,
}

impl<B: ByteBus, D: DelayNs> BusAdapter<B, D> {
    pub fn new(bus: B, delay: D, config: DisplayConfig) -> Self {
        Self {
            bus,
            delay,
            lines: ControlLines::IDLE,
            config,
        }
    }

    /// Current control-line shadow
    pub fn lines(&self) -> ControlLines {
        self.lines
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Update the shadow and push it to the control port.
    ///
    /// The shadow keeps the update even if the write fails.
    pub fn write_control(&mut self, update: impl FnOnce(&mut ControlLines)) -> Result<(), B> {
        update(&mut self.lines);
        self.bus
            .write(Port::Control, self.lines.bits())
            .map_err(DisplayError::BusWrite)
    }

    /// Present a byte on D0-D7
    pub fn write_data(&mut self, byte: u8) -> Result<(), B> {
        self.bus
            .write(Port::Data, byte)
            .map_err(DisplayError::BusWrite)
    }

    /// Sample D0-D7
    ///
    /// The expander pins are released (written high) first so the panel
    /// can drive them.
    pub fn read_data(&mut self) -> Result<u8, B> {
        self.write_data(INPUT_MODE)?;
        self.bus.read(Port::Data).map_err(DisplayError::BusRead)
    }

    /// Pulse Enable high then low, holding each level
    pub fn strobe(&mut self) -> Result<(), B> {
        self.write_control(|lines| lines.set(EN))?;
        self.delay.delay_us(self.config.strobe_delay_us);
        self.write_control(|lines| lines.clear(EN))?;
        self.delay.delay_us(self.config.strobe_delay_us);
        Ok(())
    }

    /// Select `controller` and poll its status until BUSY clears.
    ///
    /// Leaves the controller selected with RW low. Fails with
    /// `BusyTimeout` once the poll limit is exhausted.
    pub fn wait_not_busy(&mut self, controller: Controller) -> Result<(), B> {
        self.write_control(|lines| {
            lines.select(controller);
            lines.status_read();
        })?;

        for _ in 0..self.config.busy_poll_limit {
            self.write_control(|lines| lines.set(EN))?;
            self.delay.delay_us(self.config.strobe_delay_us);
            let status = self.read_data()?;
            self.write_control(|lines| lines.clear(EN))?;

            if status & STATUS_BUSY == 0 {
                return self.write_control(|lines| lines.clear(RW));
            }
            self.delay.delay_us(self.config.busy_poll_interval_us);
        }

        warn!("controller {} stayed busy", controller.index());
        Err(DisplayError::BusyTimeout { controller })
    }

    /// Issue one instruction to one controller
    pub fn write_command(
        &mut self,
        instruction: Instruction,
        controller: Controller,
    ) -> Result<(), B> {
        self.wait_not_busy(controller)?;
        self.write_control(|lines| lines.command_write())?;
        self.write_data(instruction.encode())?;
        self.strobe()
    }

    /// Write one byte to display RAM at the controller's current column
    pub fn write_display_data(&mut self, byte: u8, controller: Controller) -> Result<(), B> {
        self.wait_not_busy(controller)?;
        self.write_control(|lines| lines.data_write())?;
        self.write_data(byte)?;
        self.strobe()
    }

    /// Read one byte of display RAM from the controller's output latch
    pub fn read_display_data(&mut self, controller: Controller) -> Result<u8, B> {
        self.wait_not_busy(controller)?;
        self.write_control(|lines| lines.data_read())?;
        self.write_control(|lines| lines.set(EN))?;
        self.delay.delay_us(self.config.strobe_delay_us);
        let byte = self.read_data()?;
        self.write_control(|lines| lines.clear(EN))?;
        self.delay.delay_us(self.config.strobe_delay_us);
        Ok(byte)
    }

    /// Hardware reset pulse: all lines high, RST low, RST high
    pub fn reset(&mut self) -> Result<(), B> {
        self.write_control(|lines| *lines = ControlLines::IDLE)?;
        self.delay.delay_us(self.config.reset_pulse_us);
        self.write_control(|lines| lines.clear(RST))?;
        self.delay.delay_us(self.config.reset_pulse_us);
        self.write_control(|lines| lines.set(RST))
    }

    /// Give back the bus and delay provider
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    #[cfg(test)]
    pub(crate) fn bus(&self) -> &B {
        &self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NoopDelay, SimulatedPanel};
    use glcd_core::control::{CS1, CS2, RS};

    fn adapter() -> BusAdapter<SimulatedPanel, NoopDelay> {
        BusAdapter::new(SimulatedPanel::new(), NoopDelay::new(), DisplayConfig::default())
    }

    #[test]
    fn test_shadow_starts_idle() {
        let bus = adapter();
        assert_eq!(bus.lines(), ControlLines::IDLE);
    }

    #[test]
    fn test_write_control_pushes_shadow() {
        let mut bus = adapter();
        bus.write_control(|lines| lines.clear(RS)).unwrap();

        assert_eq!(bus.bus().last_control(), Some(0x3E));
        assert_eq!(bus.bus().writes(), 1);
    }

    #[test]
    fn test_shadow_updated_even_when_write_fails() {
        let mut bus = adapter();
        bus.bus_mut().fail_writes_after(0);

        let result = bus.write_control(|lines| lines.clear(RS));
        assert!(matches!(result, Err(DisplayError::BusWrite(_))));
        assert!(!bus.lines().is_set(RS));
    }

    #[test]
    fn test_strobe_returns_enable_low() {
        let mut bus = adapter();
        bus.strobe().unwrap();

        assert!(!bus.lines().is_set(EN));
        assert_eq!(bus.bus().writes(), 2);
    }

    #[test]
    fn test_read_data_releases_pins_first() {
        let mut bus = adapter();
        bus.read_data().unwrap();

        assert_eq!(bus.bus().last_data(), Some(INPUT_MODE));
        assert_eq!(bus.bus().reads(), 1);
    }

    #[test]
    fn test_command_reaches_selected_controller_only() {
        let mut bus = adapter();
        bus.write_command(Instruction::SetPage(3), Controller::Right)
            .unwrap();

        assert_eq!(
            bus.bus().commands(),
            &[(Controller::Right, Instruction::SetPage(3))]
        );
        assert!(bus.lines().is_set(CS2));
        assert!(!bus.lines().is_set(CS1));
        assert!(!bus.lines().is_set(RW));
    }

    #[test]
    fn test_busy_wait_polls_until_ready() {
        let mut bus = adapter();
        bus.bus_mut().set_busy_polls(Controller::Left, 3);

        bus.wait_not_busy(Controller::Left).unwrap();
        // One status read per poll: three busy, one ready
        assert_eq!(bus.bus().reads(), 4);
        assert!(!bus.lines().is_set(RW));
    }

    #[test]
    fn test_busy_wait_times_out() {
        let config = DisplayConfig {
            busy_poll_limit: 5,
            ..DisplayConfig::default()
        };
        let mut bus = BusAdapter::new(SimulatedPanel::new(), NoopDelay::new(), config);
        bus.bus_mut().set_stuck_busy(Controller::Right, true);

        let result = bus.wait_not_busy(Controller::Right);
        assert_eq!(
            result,
            Err(DisplayError::BusyTimeout {
                controller: Controller::Right
            })
        );
        assert_eq!(bus.bus().reads(), 5);
    }

    #[test]
    fn test_read_failure_maps_to_bus_read() {
        let mut bus = adapter();
        bus.bus_mut().fail_reads(true);

        let result = bus.wait_not_busy(Controller::Left);
        assert!(matches!(result, Err(DisplayError::BusRead(_))));
    }

    #[test]
    fn test_reset_pulses_rst() {
        let mut bus = adapter();
        bus.reset().unwrap();

        assert_eq!(bus.bus().control_history(), &[0x3F, 0x1F, 0x3F]);
        assert!(bus.lines().is_set(RST));
    }

    #[test]
    fn test_delays_are_lower_bounds() {
        let config = DisplayConfig {
            strobe_delay_us: 7,
            ..DisplayConfig::default()
        };
        let mut bus = BusAdapter::new(SimulatedPanel::new(), NoopDelay::new(), config);
        bus.strobe().unwrap();

        let (_, delay) = bus.release();
        assert!(delay.total_ns() >= 14_000);
    }
}
