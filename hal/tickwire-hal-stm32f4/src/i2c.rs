//! Blocking I2C master for STM32F4
//!
//! The embassy driver bounds each transaction with the timeout from its
//! `i2c::Config` (this needs the `time` feature and a time driver). Build
//! that config with [`config_with_timeout`] so the bus gives up after the
//! same time the DAC driver asks for.

use embassy_stm32::i2c::{Config, Error as I2cError, I2c, Master};
use embassy_stm32::mode::Blocking;
use embassy_time::Duration;
use tickwire_hal::i2c::{I2cBus, TimeoutMs};

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received
    Nack,
    /// Timeout
    Timeout,
    /// Overrun
    Overrun,
    /// Requested timeout is shorter than the one the bus was built with
    TimeoutUnsupported,
    /// Other error
    Other,
}

impl From<I2cError> for I2cBusError {
    fn from(e: I2cError) -> Self {
        match e {
            I2cError::Bus => I2cBusError::Bus,
            I2cError::Arbitration => I2cBusError::ArbitrationLost,
            I2cError::Nack => I2cBusError::Nack,
            I2cError::Timeout => I2cBusError::Timeout,
            I2cError::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}

/// Default embassy I2C config with a transaction timeout
pub fn config_with_timeout(timeout: TimeoutMs) -> Config {
    let mut config = Config::default();
    config.timeout = Duration::from_millis(u64::from(timeout));
    config
}

/// Blocking I2C bus
///
/// The embassy driver cannot change its timeout per call, so the bus
/// remembers the one it was configured with and refuses requests that ask
/// for less.
pub struct BlockingI2c<'d> {
    i2c: I2c<'d, Blocking, Master>,
    timeout: TimeoutMs,
}

impl<'d> BlockingI2c<'d> {
    /// Wrap a blocking embassy I2C master
    ///
    /// `timeout` must match the one given to [`config_with_timeout`] when
    /// the master was created.
    pub fn new(i2c: I2c<'d, Blocking, Master>, timeout: TimeoutMs) -> Self {
        Self { i2c, timeout }
    }

    /// Transaction timeout enforced by the embassy driver
    pub fn timeout(&self) -> TimeoutMs {
        self.timeout
    }

    /// Unwrap the bus
    pub fn release(self) -> I2c<'d, Blocking, Master> {
        self.i2c
    }

    fn check_timeout(&self, timeout: TimeoutMs) -> Result<(), I2cBusError> {
        if timeout < self.timeout {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "I2C timeout {=u32} ms below bus timeout {=u32} ms",
                timeout,
                self.timeout
            );
            return Err(I2cBusError::TimeoutUnsupported);
        }
        Ok(())
    }
}

impl I2cBus for BlockingI2c<'_> {
    type Error = I2cBusError;

    fn probe(&mut self, address: u8, trials: u32, timeout: TimeoutMs) -> Result<(), I2cBusError> {
        self.check_timeout(timeout)?;
        let mut result = self.i2c.blocking_write(address, &[]);
        for _ in 1..trials {
            if result.is_ok() {
                break;
            }
            result = self.i2c.blocking_write(address, &[]);
        }
        result.map_err(I2cBusError::from)
    }

    fn write(&mut self, address: u8, data: &[u8], timeout: TimeoutMs) -> Result<(), I2cBusError> {
        self.check_timeout(timeout)?;
        self.i2c.blocking_write(address, data).map_err(I2cBusError::from)
    }

    fn read(&mut self, address: u8, buf: &mut [u8], timeout: TimeoutMs) -> Result<(), I2cBusError> {
        self.check_timeout(timeout)?;
        self.i2c.blocking_read(address, buf).map_err(I2cBusError::from)
    }
}
