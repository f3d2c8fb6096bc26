//! PCF8574 port-expander pair over I2C
//!
//! Two PCF8574 expanders on the same I2C bus emulate the display's
//! parallel interface:
//!
//! ```text
//! data expander    P7 P6 P5 P4  P3  P2 P1 P0
//!                  D7 D6 D5 D4  D3  D2 D1 D0
//!
//! control expander P7 P6 P5  P4  P3  P2 P1 P0
//!                        RST CS2 CS1 E  RW RS
//! ```

use embedded_hal::i2c::I2c;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bus::{ByteBus, Port};

/// I2C addresses of the two expanders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExpanderAddresses {
    /// 7-bit address of the D0-D7 expander
    pub data: u8,
    /// 7-bit address of the control-line expander
    pub control: u8,
}

impl Default for ExpanderAddresses {
    fn default() -> Self {
        Self {
            data: 0x20,
            control: 0x21,
        }
    }
}

/// Invalid expander addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Address does not fit in 7 bits
    OutOfRange(u8),
    /// Data and control expanders share an address
    Conflict(u8),
}

impl core::fmt::Display for AddressError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AddressError::OutOfRange(a) => write!(f, "I2C address {a:#04x} is not a 7-bit address"),
            AddressError::Conflict(a) => write!(f, "data and control expanders both at {a:#04x}"),
        }
    }
}

impl core::error::Error for AddressError {}

impl ExpanderAddresses {
    /// Create an address pair
    pub const fn new(data: u8, control: u8) -> Self {
        Self { data, control }
    }

    /// Check that both addresses are distinct 7-bit addresses
    pub fn validate(&self) -> Result<(), AddressError> {
        for addr in [self.data, self.control] {
            if addr > 0x7F {
                return Err(AddressError::OutOfRange(addr));
            }
        }
        if self.data == self.control {
            return Err(AddressError::Conflict(self.data));
        }
        Ok(())
    }

    /// Address of the expander behind `port`
    pub fn of(&self, port: Port) -> u8 {
        match port {
            Port::Data => self.data,
            Port::Control => self.control,
        }
    }
}

/// Data and control PCF8574 expanders sharing one I2C bus
pub struct Pcf8574Pair<I2C> {
    i2c: I2C,
    addresses: ExpanderAddresses,
}

impl<I2C: I2c> Pcf8574Pair<I2C> {
    /// Create the pair, rejecting invalid addressing
    pub fn new(i2c: I2C, addresses: ExpanderAddresses) -> Result<Self, AddressError> {
        addresses.validate()?;
        Ok(Self { i2c, addresses })
    }

    /// Get the configured addresses
    pub fn addresses(&self) -> ExpanderAddresses {
        self.addresses
    }

    /// Release the underlying I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> ByteBus for Pcf8574Pair<I2C> {
    type Error = I2C::Error;

    fn write(&mut self, port: Port, byte: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.addresses.of(port), &[byte])
    }

    fn read(&mut self, port: Port) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.i2c.read(self.addresses.of(port), &mut buf)?;
        Ok(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Mock I2C bus recording single-byte writes and answering reads
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        read_value: u8,
        fail: bool,
    }

    impl MockI2c {
        fn new(read_value: u8) -> Self {
            Self {
                writes: Vec::new(),
                read_value,
                fail: false,
            }
        }
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(data) => self.writes.push((address, data.to_vec())),
                    Operation::Read(buf) => buf.fill(self.read_value),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_default_addresses() {
        let addrs = ExpanderAddresses::default();
        assert_eq!(addrs.of(Port::Data), 0x20);
        assert_eq!(addrs.of(Port::Control), 0x21);
        assert!(addrs.validate().is_ok());
    }

    #[test]
    fn test_address_validation() {
        assert_eq!(
            ExpanderAddresses::new(0x80, 0x21).validate(),
            Err(AddressError::OutOfRange(0x80))
        );
        assert_eq!(
            ExpanderAddresses::new(0x27, 0x27).validate(),
            Err(AddressError::Conflict(0x27))
        );
        assert!(Pcf8574Pair::new(MockI2c::new(0), ExpanderAddresses::new(0x27, 0x27)).is_err());
    }

    #[test]
    fn test_write_routes_to_port_address() {
        let mut pair =
            Pcf8574Pair::new(MockI2c::new(0), ExpanderAddresses::new(0x38, 0x39)).unwrap();

        pair.write(Port::Data, 0xA5).unwrap();
        pair.write(Port::Control, 0x3F).unwrap();

        let i2c = pair.release();
        assert_eq!(i2c.writes, vec![(0x38, vec![0xA5]), (0x39, vec![0x3F])]);
    }

    #[test]
    fn test_read_returns_port_byte() {
        let mut pair = Pcf8574Pair::new(MockI2c::new(0x80), ExpanderAddresses::default()).unwrap();
        assert_eq!(pair.read(Port::Data).unwrap(), 0x80);
    }

    #[test]
    fn test_bus_error_propagates() {
        let mut i2c = MockI2c::new(0);
        i2c.fail = true;
        let mut pair = Pcf8574Pair::new(i2c, ExpanderAddresses::default()).unwrap();

        assert_eq!(pair.write(Port::Control, 0x00), Err(ErrorKind::Other));
        assert_eq!(pair.read(Port::Data), Err(ErrorKind::Other));
    }
}
