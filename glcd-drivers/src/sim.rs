//! Simulated controller pair
//!
//! A [`ByteBus`] that behaves like the two KS0108 controllers sitting
//! behind the expanders. Control-port writes are decoded edge by edge:
//! the falling edge of Enable with RW low latches an instruction (RS low)
//! or a data byte (RS high) into the selected controller, and data-port
//! reads with Enable and RW high return status (RS low) or display RAM
//! (RS high).
//!
//! Display RAM reads go through a one-deep output latch, so the first
//! read after an address change returns whatever the latch held before.
//!
//! The panel also keeps an instruction trace, bus-operation counters and
//! hooks for injecting write or read failures.

use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use glcd_core::command::{Instruction, STATUS_BUSY, STATUS_OFF};
use glcd_core::control::{EN, RS, RST, RW};
use glcd_core::geometry::{COLUMNS_PER_CONTROLLER, CONTROLLERS, PAGES, PAGE_HEIGHT};
use glcd_core::{ControlLines, Controller};
use glcd_hal::{ByteBus, Port};

/// Injected bus failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    Write,
    Read,
}

impl core::fmt::Display for SimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SimError::Write => write!(f, "simulated write failure"),
            SimError::Read => write!(f, "simulated read failure"),
        }
    }
}

impl core::error::Error for SimError {}

/// One 64x64 controller
#[derive(Debug, Clone)]
struct SimChip {
    vram: [[u8; COLUMNS_PER_CONTROLLER as usize]; PAGES as usize],
    page: u8,
    column: u8,
    start_line: u8,
    on: bool,
    output_latch: u8,
    busy_polls: u32,
    busy_after_op: u32,
    stuck_busy: bool,
}

impl SimChip {
    fn new() -> Self {
        Self {
            vram: [[0; COLUMNS_PER_CONTROLLER as usize]; PAGES as usize],
            page: 0,
            column: 0,
            start_line: 0,
            on: false,
            output_latch: 0,
            busy_polls: 0,
            busy_after_op: 0,
            stuck_busy: false,
        }
    }

    fn reset(&mut self) {
        self.page = 0;
        self.column = 0;
        self.start_line = 0;
        self.on = false;
    }

    fn execute(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::DisplayOn(on) => self.on = on,
            Instruction::SetY(y) => self.column = y,
            Instruction::SetPage(page) => self.page = page,
            Instruction::StartLine(line) => self.start_line = line,
        }
        self.busy_polls = self.busy_after_op;
    }

    fn write(&mut self, byte: u8) {
        self.vram[self.page as usize][self.column as usize] = byte;
        self.column = (self.column + 1) % COLUMNS_PER_CONTROLLER;
        self.busy_polls = self.busy_after_op;
    }

    fn read(&mut self) -> u8 {
        let out = self.output_latch;
        self.output_latch = self.vram[self.page as usize][self.column as usize];
        self.column = (self.column + 1) % COLUMNS_PER_CONTROLLER;
        self.busy_polls = self.busy_after_op;
        out
    }

    fn status(&mut self) -> u8 {
        let mut status = if self.on { 0 } else { STATUS_OFF };
        if self.stuck_busy {
            status |= STATUS_BUSY;
        } else if self.busy_polls > 0 {
            self.busy_polls -= 1;
            status |= STATUS_BUSY;
        }
        status
    }
}

/// Dual-controller panel behind a simulated expander pair
#[derive(Debug, Clone)]
pub struct SimulatedPanel {
    chips: [SimChip; CONTROLLERS],
    control: u8,
    data: Option<u8>,
    control_history: Vec<u8>,
    commands: Vec<(Controller, Instruction)>,
    writes: usize,
    reads: usize,
    write_budget: Option<usize>,
    fail_reads: bool,
    select_violations: usize,
}

impl Default for SimulatedPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPanel {
    /// Powered-up panel: RAM clear, both controllers off, lines high
    pub fn new() -> Self {
        Self {
            chips: [SimChip::new(), SimChip::new()],
            control: ControlLines::IDLE.bits(),
            data: None,
            control_history: Vec::new(),
            commands: Vec::new(),
            writes: 0,
            reads: 0,
            write_budget: None,
            fail_reads: false,
            select_violations: 0,
        }
    }

    fn chip(&self, controller: Controller) -> &SimChip {
        &self.chips[controller.index()]
    }

    fn chip_mut(&mut self, controller: Controller) -> &mut SimChip {
        &mut self.chips[controller.index()]
    }

    fn on_control(&mut self, previous: u8, next: u8) {
        let lines = ControlLines::from_bits(next);

        if !lines.is_set(RST) {
            for chip in self.chips.iter_mut() {
                chip.reset();
            }
            return;
        }

        let falling_enable = previous & EN != 0 && !lines.is_set(EN);
        if !falling_enable || lines.is_set(RW) {
            return;
        }

        let Some(controller) = lines.selected() else {
            self.select_violations += 1;
            return;
        };
        let byte = self.data.unwrap_or(0xFF);

        if lines.is_set(RS) {
            self.chip_mut(controller).write(byte);
        } else if let Some(instruction) = Instruction::decode(byte) {
            self.chip_mut(controller).execute(instruction);
            self.commands.push((controller, instruction));
        }
    }

    /// Display RAM byte at panel column `x` and `page`
    pub fn cell(&self, x: u8, page: u8) -> u8 {
        let controller = Controller::for_column(x);
        let local = (x % COLUMNS_PER_CONTROLLER) as usize;
        self.chip(controller).vram[page as usize][local]
    }

    /// Preload display RAM
    pub fn set_cell(&mut self, x: u8, page: u8, byte: u8) {
        let controller = Controller::for_column(x);
        let local = (x % COLUMNS_PER_CONTROLLER) as usize;
        self.chip_mut(controller).vram[page as usize][local] = byte;
    }

    /// Whether the pixel at `(x, y)` is lit
    pub fn pixel(&self, x: u8, y: u8) -> bool {
        self.cell(x, y / PAGE_HEIGHT) & (1 << (y % PAGE_HEIGHT)) != 0
    }

    /// Number of lit pixels on the whole panel
    pub fn lit_pixels(&self) -> u32 {
        self.chips
            .iter()
            .flat_map(|chip| chip.vram.iter().flatten())
            .map(|byte| byte.count_ones())
            .sum()
    }

    pub fn is_on(&self, controller: Controller) -> bool {
        self.chip(controller).on
    }

    pub fn start_line(&self, controller: Controller) -> u8 {
        self.chip(controller).start_line
    }

    /// Page and column counters of one controller
    pub fn counters(&self, controller: Controller) -> (u8, u8) {
        let chip = self.chip(controller);
        (chip.page, chip.column)
    }

    /// Instructions latched so far, in order
    pub fn commands(&self) -> &[(Controller, Instruction)] {
        &self.commands
    }

    /// Every byte written to the control port, in order
    pub fn control_history(&self) -> &[u8] {
        &self.control_history
    }

    pub fn last_control(&self) -> Option<u8> {
        self.control_history.last().copied()
    }

    pub fn last_data(&self) -> Option<u8> {
        self.data
    }

    /// Successful port writes
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Successful port reads
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Strobes that found both or neither controller selected
    pub fn select_violations(&self) -> usize {
        self.select_violations
    }

    /// Forget the trace and counters; RAM and registers are kept
    pub fn clear_trace(&mut self) {
        self.control_history.clear();
        self.commands.clear();
        self.writes = 0;
        self.reads = 0;
    }

    /// Report BUSY for the next `polls` status reads
    pub fn set_busy_polls(&mut self, controller: Controller, polls: u32) {
        self.chip_mut(controller).busy_polls = polls;
    }

    /// Report BUSY for `polls` status reads after every operation
    pub fn set_busy_after_op(&mut self, polls: u32) {
        for chip in self.chips.iter_mut() {
            chip.busy_after_op = polls;
        }
    }

    /// Keep BUSY set forever
    pub fn set_stuck_busy(&mut self, controller: Controller, stuck: bool) {
        self.chip_mut(controller).stuck_busy = stuck;
    }

    /// Let `count` more writes succeed, then fail every write
    pub fn fail_writes_after(&mut self, count: usize) {
        self.write_budget = Some(count);
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }
}

impl ByteBus for SimulatedPanel {
    type Error = SimError;

    fn write(&mut self, port: Port, byte: u8) -> Result<(), SimError> {
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                return Err(SimError::Write);
            }
            *budget -= 1;
        }
        self.writes += 1;

        match port {
            Port::Data => self.data = Some(byte),
            Port::Control => {
                let previous = self.control;
                self.control = byte;
                self.control_history.push(byte);
                self.on_control(previous, byte);
            }
        }
        Ok(())
    }

    fn read(&mut self, port: Port) -> Result<u8, SimError> {
        if self.fail_reads {
            return Err(SimError::Read);
        }
        self.reads += 1;

        if port == Port::Control {
            return Ok(self.control);
        }

        let lines = ControlLines::from_bits(self.control);
        if !lines.is_set(EN) || !lines.is_set(RW) {
            return Ok(0xFF);
        }
        let Some(controller) = lines.selected() else {
            return Ok(0xFF);
        };

        let chip = self.chip_mut(controller);
        Ok(if lines.is_set(RS) {
            chip.read()
        } else {
            chip.status()
        })
    }
}

/// Delay provider that returns immediately, tallying the requested time
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDelay {
    total_ns: u64,
}

impl NoopDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time requested so far
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
