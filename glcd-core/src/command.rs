//! Controller instruction encodings

/// Display on/off (`0x3E | on`)
pub const DISPLAY_ON_OFF: u8 = 0x3E;

/// Set Y (column) address (`0x40 | y`, y < 64)
pub const SET_Y_ADDRESS: u8 = 0x40;

/// Set X (page) address (`0xB8 | page`, page < 8)
pub const SET_PAGE: u8 = 0xB8;

/// Display start line (`0xC0 | line`, line < 64)
pub const START_LINE: u8 = 0xC0;

/// Status register: controller busy with the previous instruction
pub const STATUS_BUSY: u8 = 0x80;

/// Status register: display off
pub const STATUS_OFF: u8 = 0x20;

/// Status register: controller in reset
pub const STATUS_RESET: u8 = 0x10;

/// A decoded controller instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction {
    DisplayOn(bool),
    SetY(u8),
    SetPage(u8),
    StartLine(u8),
}

impl Instruction {
    /// Encode for the data lines
    pub fn encode(self) -> u8 {
        match self {
            Instruction::DisplayOn(on) => DISPLAY_ON_OFF | on as u8,
            Instruction::SetY(y) => SET_Y_ADDRESS | (y & 0x3F),
            Instruction::SetPage(page) => SET_PAGE | (page & 0x07),
            Instruction::StartLine(line) => START_LINE | (line & 0x3F),
        }
    }

    /// Decode a byte latched with RS low
    pub fn decode(byte: u8) -> Option<Self> {
        match byte {
            b if b & 0xFE == DISPLAY_ON_OFF => Some(Instruction::DisplayOn(b & 1 != 0)),
            b if b & 0xC0 == SET_Y_ADDRESS => Some(Instruction::SetY(b & 0x3F)),
            b if b & 0xF8 == SET_PAGE => Some(Instruction::SetPage(b & 0x07)),
            b if b & 0xC0 == START_LINE => Some(Instruction::StartLine(b & 0x3F)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodings() {
        assert_eq!(Instruction::DisplayOn(true).encode(), 0x3F);
        assert_eq!(Instruction::DisplayOn(false).encode(), 0x3E);
        assert_eq!(Instruction::SetY(63).encode(), 0x7F);
        assert_eq!(Instruction::SetPage(7).encode(), 0xBF);
        assert_eq!(Instruction::StartLine(63).encode(), 0xFF);
    }

    #[test]
    fn test_decode_matches_encode() {
        for instr in [
            Instruction::DisplayOn(true),
            Instruction::SetY(17),
            Instruction::SetPage(5),
            Instruction::StartLine(40),
        ] {
            assert_eq!(Instruction::decode(instr.encode()), Some(instr));
        }
        assert_eq!(Instruction::decode(0x00), None);
    }
}
