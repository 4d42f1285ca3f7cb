//! Board-agnostic logic for the tickwire drivers
//!
//! This crate contains everything that does not depend on pins, buses
//! or timers:
//!
//! - 7-segment encoding of integers and fixed-point numbers
//! - TM1637 command bytes, digit address permutation and brightness levels
//! - TM1637 transfer state machine (window-end transition rule)
//! - Timer tick rate and prescaler math

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod segment;
pub mod timing;
pub mod tm1637;
