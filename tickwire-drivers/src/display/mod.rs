//! Display driver implementations

pub mod shared;
pub mod tm1637;

#[cfg(test)]
pub(crate) mod mock;

pub use shared::SharedTm1637;
pub use tm1637::{Tm1637, Tm1637Config};

use tickwire_core::segment::FormatError;
use tickwire_core::timing::TimingError;
use tickwire_core::tm1637::AddressError;

/// Display driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// A transfer is still in flight
    Busy,
    /// Digit position outside 0-5
    InvalidPosition(u8),
    /// Number cannot be shown
    Format(FormatError),
    /// Bit rate cannot be generated
    Timing(TimingError),
    /// No engine installed in the shared slot
    NotInstalled,
    /// Shared engine used from inside its own `with` closure
    Reentrant,
}

impl From<AddressError> for DisplayError {
    fn from(e: AddressError) -> Self {
        match e {
            AddressError::InvalidPosition(position) => DisplayError::InvalidPosition(position),
        }
    }
}

impl From<FormatError> for DisplayError {
    fn from(e: FormatError) -> Self {
        DisplayError::Format(e)
    }
}

impl From<TimingError> for DisplayError {
    fn from(e: TimingError) -> Self {
        DisplayError::Timing(e)
    }
}
