//! Peripheral driver implementations
//!
//! This crate provides drivers written against the `tickwire-hal` traits:
//!
//! - MCP4725 12-bit I2C DAC (blocking register I/O)
//! - TM1637 6-digit display, bit-banged from a timer interrupt
//! - Adapters for `embedded-hal` 1.0 pins and I2C buses

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod adapter;
pub mod dac;
pub mod display;
