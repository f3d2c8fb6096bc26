//! Byte bus abstraction
//!
//! The display's parallel interface is split over two 8-bit ports. Each
//! port accepts whole-byte writes and reads; there is no notion of
//! individual pins at this layer.

/// One of the two byte-wide ports wired to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// D0-D7 parallel data lines
    Data,
    /// RS, R/W, E, CS1, CS2 and RST lines
    Control,
}

/// Byte-oriented bus carrying the display's data and control ports
///
/// A single implementation owns the physical bus for both ports, so the
/// two endpoints can share one I2C peripheral.
pub trait ByteBus {
    /// Error type for bus operations
    type Error;

    /// Drive `byte` onto the given port
    fn write(&mut self, port: Port, byte: u8) -> Result<(), Self::Error>;

    /// Sample the given port
    ///
    /// Callers are responsible for putting the port in input mode first
    /// (see [`INPUT_MODE`]).
    fn read(&mut self, port: Port) -> Result<u8, Self::Error>;
}

/// Byte pattern that releases a quasi-bidirectional expander port so it
/// can be sampled
pub const INPUT_MODE: u8 = 0xFF;

impl<T: ByteBus + ?Sized> ByteBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, port: Port, byte: u8) -> Result<(), Self::Error> {
        T::write(self, port, byte)
    }

    fn read(&mut self, port: Port) -> Result<u8, Self::Error> {
        T::read(self, port)
    }
}
