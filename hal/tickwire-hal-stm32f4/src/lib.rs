//! STM32F4 bindings for the tickwire HAL
//!
//! Implements the `tickwire-hal` traits on top of `embassy-stm32`:
//!
//! - [`gpio::PushPullPin`] - push-pull output for the display clock
//! - [`gpio::OpenDrainPin`] - open-drain output for the display data line
//! - [`i2c::BlockingI2c`] - blocking I2C master for the DAC, with
//!   [`i2c::config_with_timeout`] to bound its transactions
//! - [`timer::BasicTickTimer`] - update-interrupt tick source
//! - [`timer::tick_timer_caps`] - capability table entry for a timer
//!
//! # Features
//!
//! - `stm32f446re` - Nucleo-F446RE
//! - `stm32f411re` - Nucleo-F411RE
//! - `defmt` - Enable debug formatting support
//!
//! The application still binds the timer's update vector to the display
//! engine's interrupt entry point.

#![no_std]

pub mod gpio;
pub mod i2c;
pub mod timer;

pub use gpio::{OpenDrainPin, PushPullPin};
pub use i2c::{config_with_timeout, BlockingI2c, I2cBusError};
pub use timer::{tick_timer_caps, BasicTickTimer};
