//! TM1637 protocol model
//!
//! The TM1637 speaks an I2C-like two-wire protocol without a device
//! address: each frame is delimited by start/stop conditions, bytes go
//! out LSB first, and a ninth clock is reserved for the chip's ACK.
//!
//! This module holds the parts of the protocol that do not touch pins:
//! command bytes, the digit-to-address permutation, and the transition
//! rule applied at the end of every byte window.

pub mod command;
pub mod state;

pub use command::{AddressError, Brightness, DigitPosition};
pub use state::{FrameFlags, TransferMethod, TransferState, WindowStep};
