//! GPIO outputs for STM32F4
//!
//! The TM1637 acknowledges each byte by pulling DIO low while the master
//! holds the line released, so DIO must be an [`OpenDrainPin`]. CLK is only
//! ever driven by the master and can be a [`PushPullPin`]. Both lines need
//! pull-ups (the module boards carry them).

use embassy_stm32::gpio::{Level, Output, OutputOpenDrain, Pin, Speed};
use embassy_stm32::Peri;
use tickwire_hal::OutputPin;

/// Push-pull output pin, for CLK
pub struct PushPullPin<'d> {
    pin: Output<'d>,
}

impl<'d> PushPullPin<'d> {
    /// Configure a pin as a high-speed push-pull output, initially high
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            pin: Output::new(pin, Level::High, Speed::VeryHigh),
        }
    }

    /// Wrap an already configured output
    pub fn from_output(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for PushPullPin<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Open-drain output pin, for DIO
///
/// High releases the line to the pull-up so the display can drive its ACK.
pub struct OpenDrainPin<'d> {
    pin: OutputOpenDrain<'d>,
}

impl<'d> OpenDrainPin<'d> {
    /// Configure a pin as a high-speed open-drain output, initially released
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            pin: OutputOpenDrain::new(pin, Level::High, Speed::VeryHigh),
        }
    }

    /// Wrap an already configured open-drain output
    pub fn from_output(pin: OutputOpenDrain<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for OpenDrainPin<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
