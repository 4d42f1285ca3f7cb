//! TM1637 command bytes
//!
//! Three commands are used:
//! - Data command: write to display memory, fixed or auto-increment address
//! - Address command: first display-memory address to write
//! - Display control: display on/off and pulse-width (brightness)

use crate::segment::{DigitBytes, DIGIT_COUNT};

/// Data command, auto-increment address
pub const DATA_CMD_AUTO_ADDR: u8 = 0b0100_0000;
/// Data command, fixed address
pub const DATA_CMD_FIXED_ADDR: u8 = 0b0100_0100;
/// Address command base (low 3 bits select the address)
pub const ADDR_CMD: u8 = 0b1100_0000;
/// Display control command base
pub const DISPLAY_CTRL_CMD: u8 = 0b1000_0000;
/// Display-on bit of the display control command
pub const DISPLAY_ON_BIT: u8 = 0b0000_1000;

/// Display-memory address for each physical digit position
///
/// Position 0 is the rightmost digit. The 6-digit modules wire the grids
/// in two groups of three, so position 0 lives at address 3.
pub const DIGIT_ADDRESS: [u8; DIGIT_COUNT] = [0x3, 0x4, 0x5, 0x0, 0x1, 0x2];

/// Errors from digit addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Position outside 0-5
    InvalidPosition(u8),
}

/// A validated physical digit position (0 = rightmost)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitPosition(u8);

impl DigitPosition {
    /// Validate a position
    pub fn new(position: u8) -> Result<Self, AddressError> {
        if usize::from(position) < DIGIT_COUNT {
            Ok(Self(position))
        } else {
            Err(AddressError::InvalidPosition(position))
        }
    }

    /// Physical position
    pub fn index(self) -> u8 {
        self.0
    }

    /// Display-memory address of this digit
    pub fn address(self) -> u8 {
        DIGIT_ADDRESS[usize::from(self.0)]
    }

    /// Address command selecting this digit
    pub fn address_command(self) -> u8 {
        ADDR_CMD | self.address()
    }
}

impl TryFrom<u8> for DigitPosition {
    type Error = AddressError;

    fn try_from(position: u8) -> Result<Self, Self::Error> {
        Self::new(position)
    }
}

/// Display pulse width (8 levels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Brightness {
    /// 1/16 pulse width
    Level0,
    /// 2/16 pulse width
    Level1,
    /// 4/16 pulse width
    Level2,
    /// 10/16 pulse width
    Level3,
    /// 11/16 pulse width
    #[default]
    Level4,
    /// 12/16 pulse width
    Level5,
    /// 13/16 pulse width
    Level6,
    /// 14/16 pulse width
    Level7,
}

impl Brightness {
    /// 3-bit field of the display control command
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Level from the 3-bit field (upper bits ignored)
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Brightness::Level0,
            1 => Brightness::Level1,
            2 => Brightness::Level2,
            3 => Brightness::Level3,
            4 => Brightness::Level4,
            5 => Brightness::Level5,
            6 => Brightness::Level6,
            _ => Brightness::Level7,
        }
    }

    /// Pulse width in sixteenths of the grid period
    pub fn pulse_width_sixteenths(self) -> u8 {
        match self {
            Brightness::Level0 => 1,
            Brightness::Level1 => 2,
            Brightness::Level2 => 4,
            Brightness::Level3 => 10,
            Brightness::Level4 => 11,
            Brightness::Level5 => 12,
            Brightness::Level6 => 13,
            Brightness::Level7 => 14,
        }
    }
}

/// Display control command for the given power state and brightness
pub fn display_control(on: bool, brightness: Brightness) -> u8 {
    let on_bit = if on { DISPLAY_ON_BIT } else { 0 };
    DISPLAY_CTRL_CMD | on_bit | brightness.bits()
}

/// Reorder digits (position order) into display-memory (address) order
pub fn to_address_order(digits: &DigitBytes) -> DigitBytes {
    let mut memory = [0u8; DIGIT_COUNT];
    for (&address, &byte) in DIGIT_ADDRESS.iter().zip(digits.iter()) {
        memory[usize::from(address)] = byte;
    }
    memory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_addresses() {
        let expected = [3, 4, 5, 0, 1, 2];
        for (position, &address) in expected.iter().enumerate() {
            let digit = DigitPosition::new(position as u8).unwrap();
            assert_eq!(digit.address(), address);
        }
    }

    #[test]
    fn test_address_command_for_position_zero() {
        let digit = DigitPosition::new(0).unwrap();
        assert_eq!(digit.address_command(), 0b1100_0000 | 0x3);
    }

    #[test]
    fn test_invalid_position() {
        assert_eq!(DigitPosition::new(6), Err(AddressError::InvalidPosition(6)));
        assert_eq!(
            DigitPosition::try_from(255),
            Err(AddressError::InvalidPosition(255))
        );
    }

    #[test]
    fn test_display_control() {
        assert_eq!(display_control(true, Brightness::Level7), 0x8F);
        assert_eq!(display_control(false, Brightness::Level7), 0x87);
        assert_eq!(display_control(true, Brightness::Level0), 0x88);
        assert_eq!(display_control(false, Brightness::Level0), 0x80);
    }

    #[test]
    fn test_brightness_bits() {
        for bits in 0..8u8 {
            assert_eq!(Brightness::from_bits(bits).bits(), bits);
        }
        assert_eq!(Brightness::from_bits(0xF9), Brightness::Level1);
        assert_eq!(Brightness::Level3.pulse_width_sixteenths(), 10);
    }

    #[test]
    fn test_address_order() {
        let digits = [10, 11, 12, 13, 14, 15];
        assert_eq!(to_address_order(&digits), [13, 14, 15, 10, 11, 12]);
    }
}
