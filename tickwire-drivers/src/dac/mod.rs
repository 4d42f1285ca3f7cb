//! DAC driver implementations

pub mod mcp4725;

pub use mcp4725::{Mcp4725, Mcp4725Config, Mcp4725Error, PowerDownMode, Readback};
