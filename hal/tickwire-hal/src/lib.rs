//! Tickwire Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the tickwire drivers are written
//! against. Chip-specific crates (STM32F4, ...) implement them, so the DAC
//! driver and the bit-banged display engine never touch registers directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (owns pins, bus, timer)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tickwire-drivers (MCP4725, TM1637)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tickwire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ tickwire-hal- │
//!             │    stm32f4    │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output, called from interrupt context
//! - [`i2c::I2cBus`] - Blocking I2C transactions with per-call timeouts
//! - [`timer::PeriodicTimer`] - Periodic update interrupt source
//! - [`peripheral::CapabilityTable`] - Clock/IRQ enable hooks resolved at startup

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod peripheral;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::I2cBus;
pub use peripheral::{CapabilityError, CapabilityTable, IrqPriority, PeripheralCaps};
pub use timer::PeriodicTimer;
