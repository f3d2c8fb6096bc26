//! KS0108 128x64 graphic LCD over two PCF8574 expanders
//!
//! The panel is driven by two 64-column controllers sharing one
//! parallel bus, which is itself emulated by a pair of I2C port
//! expanders (data and control). Layers, bottom up:
//!
//! - [`bus::BusAdapter`] - control-line shadow, strobe, busy wait
//! - [`address::AddressSpace`] - page/column addressing and cursor
//! - [`render`] - pixels, lines, rectangles, bitmaps, text
//!
//! [`Ks0108`] owns the stack and gates every call on its lifecycle state.
//!
//! # Example
//!
//! ```ignore
//! let bus = Pcf8574Pair::new(i2c, ExpanderAddresses::default())?;
//! let mut lcd = Ks0108::new(bus, delay, DisplayConfig::default())?;
//! lcd.init()?;
//! lcd.cls()?;
//! lcd.display_string_at("Hello", 0, 0)?;
//! ```

pub mod address;
pub mod bus;
pub mod render;

use embedded_hal::delay::DelayNs;
use glcd_core::geometry::{CELL_WIDTH, PAGES, TEXT_COLUMNS};
use glcd_core::state::HandleEvent;
use glcd_core::traits::GraphicDisplay;
use glcd_core::{
    ConfigError, DisplayConfig, DisplayError, FontDescriptor, FontId, FontSet, HandleState,
    PixelAddress, Point,
};
use glcd_hal::ByteBus;

use self::address::AddressSpace;
use self::bus::Result;
use crate::fonts;

/// Dual-controller graphic LCD handle
pub struct Ks0108<'a, B, D> {
    space: AddressSpace<B, D>,
    fonts: FontSet<'a>,
    state: HandleState,
}

impl<B: ByteBus, D: DelayNs> Ks0108<'static, B, D> {
    /// Create a handle with the compiled-in fonts
    ///
    /// No bus traffic happens until [`init`](Self::init).
    pub fn new(bus: B, delay: D, config: DisplayConfig) -> core::result::Result<Self, ConfigError> {
        Self::with_fonts(bus, delay, config, fonts::builtin_fonts())
    }
}

impl<'a, B: ByteBus, D: DelayNs> Ks0108<'a, B, D> {
    /// Create a handle with a caller-supplied font set
    pub fn with_fonts(
        bus: B,
        delay: D,
        config: DisplayConfig,
        fonts: FontSet<'a>,
    ) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            space: AddressSpace::new(bus, delay, config),
            fonts,
            state: HandleState::Uninitialized,
        })
    }

    /// Reset the panel and switch both controllers on.
    ///
    /// Accepted in any state; a successful init recovers a faulted handle.
    pub fn init(&mut self) -> Result<(), B> {
        info!("initializing panel");

        let result = self
            .space
            .reset()
            .and_then(|()| self.space.set_display_on(true));

        match result {
            Ok(()) => {
                self.state = self.state.transition(HandleEvent::InitComplete);
                info!("panel ready");
                Ok(())
            }
            Err(e) => {
                error!("panel init failed");
                self.state = self.state.transition(HandleEvent::BusFault);
                Err(e)
            }
        }
    }

    /// Release the bus and delay provider
    pub fn teardown(self) -> (B, D) {
        self.space.release()
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Where the next data byte lands
    pub fn cursor(&self) -> PixelAddress {
        self.space.cursor()
    }

    pub fn fonts(&self) -> &FontSet<'a> {
        &self.fonts
    }

    /// Run `op` if the handle is ready; a bus fault or busy timeout
    /// faults the handle.
    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut AddressSpace<B, D>) -> Result<T, B>,
    ) -> Result<T, B> {
        match self.state {
            HandleState::Uninitialized => return Err(DisplayError::NotReady),
            HandleState::Faulted => return Err(DisplayError::Faulted),
            HandleState::Ready => {}
        }

        let result = op(&mut self.space);
        if let Err(e) = &result {
            if e.is_fatal() {
                error!("bus fault, handle needs init");
                self.state = self.state.transition(HandleEvent::BusFault);
            }
        }
        result
    }

    /// Clear the whole surface and home the cursor
    pub fn cls(&mut self) -> Result<(), B> {
        self.guarded(render::clear)
    }

    pub fn set_display_on(&mut self, on: bool) -> Result<(), B> {
        self.guarded(|space| space.set_display_on(on))
    }

    /// Move the cursor to column `x` (0-127) of `page` (0-7)
    pub fn set_address(&mut self, x: u8, page: u8) -> Result<(), B> {
        self.guarded(|space| space.set_address(x, page))
    }

    /// Write a raw display byte at the cursor
    pub fn write_byte(&mut self, byte: u8) -> Result<(), B> {
        self.guarded(|space| space.write_byte(byte))
    }

    /// Stored display byte at column `x` of `page`
    pub fn read_cell(&mut self, x: u8, page: u8) -> Result<u8, B> {
        self.guarded(|space| space.read_cell(x, page))
    }

    pub fn set_start_line(&mut self, line: u8) -> Result<(), B> {
        self.guarded(|space| space.set_start_line(line))
    }

    pub fn set_pixel(&mut self, x: u8, y: u8) -> Result<(), B> {
        self.guarded(|space| render::set_pixel(space, x, y))
    }

    pub fn draw_line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8) -> Result<(), B> {
        self.guarded(|space| render::draw_line(space, Point::new(x0, y0), Point::new(x1, y1)))
    }

    pub fn draw_rect(&mut self, x: u8, y: u8, length: u8, width: u8) -> Result<(), B> {
        self.guarded(|space| render::draw_rect(space, x, y, length, width))
    }

    pub fn draw_bitmap(&mut self, data: &[u8], x: u8, y: u8, dx: u8, dy: u8) -> Result<(), B> {
        self.guarded(|space| render::draw_bitmap(space, data, x, y, dx, dy))
    }

    /// Draw one character of `font` at the cursor
    pub fn draw_char(&mut self, code: u8, font: &FontDescriptor<'_>) -> Result<(), B> {
        self.guarded(|space| render::draw_char(space, code, font))
    }

    /// Draw one built-in 5x8 character at the cursor
    pub fn write_char(&mut self, code: u8) -> Result<(), B> {
        self.guarded(|space| render::write_char(space, code))
    }

    /// Draw a byte string at the cursor, stopping at the first NUL
    pub fn display_string(
        &mut self,
        text: Option<&[u8]>,
        font: Option<&FontDescriptor<'_>>,
    ) -> Result<(), B> {
        let text = text.ok_or(DisplayError::NullArgument)?;
        self.guarded(|space| render::display_string(space, Some(text), font))
    }

    /// Move the cursor to text cell `(line, col)` of the built-in grid
    pub fn set_text_cell(&mut self, line: u8, col: u8) -> Result<(), B> {
        self.guarded(|space| goto_cell(space, line, col))
    }

    /// Resolve a numeric font selector, falling back to the built-in font
    fn resolve_font(&self, selector: u8) -> Option<FontDescriptor<'a>> {
        let font = self.fonts.select(selector).copied();
        if font.is_none() {
            match FontId::from_u8(selector) {
                Some(_) => warn!("font {} not registered, using built-in", selector),
                None => warn!("unsupported font {}, using built-in", selector),
            }
        }
        font
    }
}

fn goto_cell<B: ByteBus, D: DelayNs>(
    space: &mut AddressSpace<B, D>,
    line: u8,
    col: u8,
) -> Result<(), B> {
    if line >= PAGES || col >= TEXT_COLUMNS {
        return Err(DisplayError::coordinate(col, line));
    }
    space.set_address(col * CELL_WIDTH, line)
}

impl<'a, B: ByteBus, D: DelayNs> GraphicDisplay for Ks0108<'a, B, D> {
    type Error = DisplayError<B::Error>;

    fn cls(&mut self) -> Result<(), B> {
        Ks0108::cls(self)
    }

    fn display_string_at(&mut self, text: &str, line: u8, col: u8) -> Result<(), B> {
        self.guarded(|space| {
            goto_cell(space, line, col)?;
            render::display_string(space, Some(text.as_bytes()), None)
        })
    }

    fn display_string_with_font_at(
        &mut self,
        text: &str,
        font: u8,
        line: u8,
        col: u8,
    ) -> Result<(), B> {
        let font = self.resolve_font(font);
        self.guarded(|space| {
            goto_cell(space, line, col)?;
            render::display_string(space, Some(text.as_bytes()), font.as_ref())
        })
    }

    fn draw_rect(&mut self, x: u8, y: u8, length: u8, width: u8) -> Result<(), B> {
        Ks0108::draw_rect(self, x, y, length, width)
    }

    fn draw_line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8) -> Result<(), B> {
        Ks0108::draw_line(self, x0, y0, x1, y1)
    }

    fn draw_bitmap(&mut self, data: &[u8], x: u8, y: u8, dx: u8, dy: u8) -> Result<(), B> {
        Ks0108::draw_bitmap(self, data, x, y, dx, dy)
    }

    fn set_start_line(&mut self, line: u8) -> Result<(), B> {
        Ks0108::set_start_line(self, line)
    }

    fn is_ready(&self) -> bool {
        Ks0108::is_ready(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NoopDelay, SimError, SimulatedPanel};
    use glcd_core::command::Instruction;
    use glcd_core::traits::GraphicDisplayExt;
    use glcd_core::Controller;

    type Lcd = Ks0108<'static, SimulatedPanel, NoopDelay>;

    fn lcd() -> Lcd {
        Ks0108::new(SimulatedPanel::new(), NoopDelay::new(), DisplayConfig::default()).unwrap()
    }

    fn ready_lcd() -> Lcd {
        let mut lcd = lcd();
        lcd.init().unwrap();
        lcd.space.panel_mut().clear_trace();
        lcd
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = DisplayConfig {
            busy_poll_limit: 0,
            ..DisplayConfig::default()
        };
        let result = Ks0108::new(SimulatedPanel::new(), NoopDelay::new(), config);
        assert!(matches!(result, Err(ConfigError::ZeroPollLimit)));
    }

    #[test]
    fn test_calls_before_init_are_refused() {
        let mut lcd = lcd();

        assert_eq!(lcd.cls(), Err(DisplayError::NotReady));
        assert_eq!(lcd.draw_line(0, 0, 1, 1), Err(DisplayError::NotReady));
        assert!(!lcd.is_ready());
        assert_eq!(lcd.space.panel().writes(), 0);
    }

    #[test]
    fn test_init_switches_both_controllers_on() {
        let mut lcd = lcd();
        lcd.init().unwrap();

        let panel = lcd.space.panel();
        assert!(panel.is_on(Controller::Left));
        assert!(panel.is_on(Controller::Right));
        assert_eq!(
            panel.commands(),
            &[
                (Controller::Left, Instruction::DisplayOn(true)),
                (Controller::Right, Instruction::DisplayOn(true)),
            ]
        );
        assert_eq!(&panel.control_history()[..3], &[0x3F, 0x1F, 0x3F]);
        assert_eq!(lcd.state(), HandleState::Ready);
        assert_eq!(lcd.cursor(), PixelAddress::HOME);
    }

    #[test]
    fn test_bus_failure_faults_handle() {
        let mut lcd = ready_lcd();
        lcd.space.panel_mut().fail_writes_after(10);

        let result = lcd.cls();
        assert_eq!(result, Err(DisplayError::BusWrite(SimError::Write)));
        assert_eq!(lcd.state(), HandleState::Faulted);

        assert_eq!(lcd.draw_rect(0, 0, 4, 4), Err(DisplayError::Faulted));
    }

    #[test]
    fn test_busy_timeout_faults_handle() {
        let config = DisplayConfig {
            busy_poll_limit: 8,
            ..DisplayConfig::default()
        };
        let mut lcd = Ks0108::new(SimulatedPanel::new(), NoopDelay::new(), config).unwrap();
        lcd.init().unwrap();
        lcd.space.panel_mut().set_stuck_busy(Controller::Left, true);

        assert_eq!(
            lcd.set_pixel(3, 3),
            Err(DisplayError::BusyTimeout {
                controller: Controller::Left
            })
        );
        assert_eq!(lcd.state(), HandleState::Faulted);
    }

    #[test]
    fn test_init_recovers_faulted_handle() {
        let mut lcd = ready_lcd();
        lcd.space.panel_mut().fail_reads(true);
        assert!(lcd.set_pixel(1, 1).is_err());
        assert_eq!(lcd.state(), HandleState::Faulted);

        lcd.space.panel_mut().fail_reads(false);
        lcd.init().unwrap();
        assert!(lcd.is_ready());
        lcd.set_pixel(1, 1).unwrap();
    }

    #[test]
    fn test_coordinate_errors_do_not_fault() {
        let mut lcd = ready_lcd();

        assert!(matches!(
            lcd.set_pixel(200, 0),
            Err(DisplayError::InvalidCoordinate { .. })
        ));
        assert!(lcd.is_ready());
    }

    #[test]
    fn test_null_string_has_no_bus_traffic() {
        let mut lcd = ready_lcd();

        assert_eq!(lcd.display_string(None, None), Err(DisplayError::NullArgument));
        assert_eq!(lcd.space.panel().writes(), 0);
        assert!(lcd.is_ready());
    }

    #[test]
    fn test_text_cell_bounds() {
        let mut lcd = ready_lcd();

        assert_eq!(
            lcd.display_string_at("x", 8, 0),
            Err(DisplayError::coordinate(0u8, 8u8))
        );
        assert_eq!(
            lcd.display_string_at("x", 0, 22),
            Err(DisplayError::coordinate(22u8, 0u8))
        );

        lcd.set_text_cell(7, 21).unwrap();
        assert_eq!(lcd.cursor(), PixelAddress::new(126, 7).unwrap());
    }

    #[test]
    fn test_display_string_at_cell() {
        let mut lcd = ready_lcd();
        lcd.display_string_at("Hi", 2, 3).unwrap();

        let panel = lcd.space.panel();
        // 'H' starts at column 18 of page 2
        assert_eq!(panel.cell(18, 2), 0x7F);
        assert_eq!(panel.cell(22, 2), 0x7F);
        assert_eq!(lcd.cursor(), PixelAddress::new(30, 2).unwrap());
    }

    #[test]
    fn test_unknown_font_falls_back_to_builtin() {
        let mut lcd = ready_lcd();
        lcd.display_string_with_font_at("A", 9, 0, 0).unwrap();

        let panel = lcd.space.panel();
        let drawn: [u8; 6] = core::array::from_fn(|i| panel.cell(i as u8, 0));
        assert_eq!(drawn, [0x7E, 0x11, 0x11, 0x11, 0x7E, 0x00]);
    }

    #[test]
    fn test_proportional_font_is_narrower() {
        let mut lcd = ready_lcd();
        lcd.display_string_with_font_at("il", FontId::Proportional as u8, 0, 0)
            .unwrap();

        // 'i' and 'l' are 3 columns wide plus a spacer each
        assert_eq!(lcd.cursor(), PixelAddress::new(8, 0).unwrap());
    }

    #[test]
    fn test_tall_font_uses_two_pages() {
        let mut lcd = ready_lcd();
        lcd.display_string_with_font_at("|", FontId::Tall as u8, 1, 0)
            .unwrap();

        let panel = lcd.space.panel();
        assert_eq!(panel.cell(0, 1), 0xFF);
        assert_eq!(panel.cell(0, 2), 0x3F);
    }

    #[test]
    fn test_start_line_through_trait() {
        let mut lcd = ready_lcd();

        assert!(matches!(
            GraphicDisplay::set_start_line(&mut lcd, 64),
            Err(DisplayError::InvalidCoordinate { .. })
        ));
        GraphicDisplay::set_start_line(&mut lcd, 63).unwrap();
        assert_eq!(lcd.space.panel().commands().len(), 2);
    }

    #[test]
    fn test_hrule_through_extension() {
        let mut lcd = ready_lcd();
        lcd.draw_hrule(40).unwrap();

        let panel = lcd.space.panel();
        assert_eq!(panel.lit_pixels(), 128);
        assert!(panel.pixel(0, 40));
        assert!(panel.pixel(127, 40));
    }

    #[test]
    fn test_busy_controller_is_waited_for() {
        let mut lcd = ready_lcd();
        lcd.space.panel_mut().set_busy_after_op(2);

        lcd.draw_line(0, 10, 127, 10).unwrap();
        assert_eq!(lcd.space.panel().lit_pixels(), 128);
    }

    #[test]
    fn test_teardown_returns_resources() {
        let mut lcd = ready_lcd();
        lcd.set_pixel(0, 0).unwrap();

        let (panel, delay) = lcd.teardown();
        assert!(panel.pixel(0, 0));
        assert!(delay.total_ns() > 0);
    }
}
