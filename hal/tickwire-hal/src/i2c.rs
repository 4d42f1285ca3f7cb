//! I2C bus abstractions
//!
//! Provides the blocking I2C master trait consumed by the DAC driver.
//! Every transaction carries its own timeout; only the presence probe
//! retries.

/// Timeout for a single bus transaction, in milliseconds
pub type TimeoutMs = u32;

/// I2C bus master
///
/// All operations are synchronous and bounded by the caller-supplied
/// timeout. Addresses are 7-bit; implementations shift in the R/W bit.
pub trait I2cBus {
    /// Error type for I2C operations (timeout, NACK, bus fault)
    type Error;

    /// Check that a device acknowledges its address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `trials` - Number of attempts before giving up
    /// * `timeout` - Timeout per attempt
    fn probe(&mut self, address: u8, trials: u32, timeout: TimeoutMs) -> Result<(), Self::Error>;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address (0x00 is the general-call address)
    /// * `data` - Bytes to write
    /// * `timeout` - Transaction timeout
    fn write(&mut self, address: u8, data: &[u8], timeout: TimeoutMs) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into; its length is the read length
    /// * `timeout` - Transaction timeout
    fn read(&mut self, address: u8, buf: &mut [u8], timeout: TimeoutMs)
        -> Result<(), Self::Error>;
}

/// Reserved general-call address
pub const GENERAL_CALL_ADDRESS: u8 = 0x00;
