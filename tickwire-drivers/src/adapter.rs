//! `embedded-hal` 1.0 adapters
//!
//! Lets the drivers run on any HAL that implements the `embedded-hal`
//! traits, not only on a dedicated `tickwire-hal` binding.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin as EhOutputPin;
use embedded_hal::i2c::I2c;
use tickwire_hal::i2c::{I2cBus, TimeoutMs};
use tickwire_hal::OutputPin;

/// Output pin adapter
///
/// Only infallible pins are accepted: the display engine drives its lines
/// from an interrupt with nowhere to report an error.
pub struct EhPin<P> {
    pin: P,
    high: bool,
}

impl<P: EhOutputPin<Error = Infallible>> EhPin<P> {
    /// Wrap a pin; its level is assumed low until first written
    pub fn new(pin: P) -> Self {
        Self { pin, high: false }
    }

    /// Unwrap the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: EhOutputPin<Error = Infallible>> OutputPin for EhPin<P> {
    fn set_high(&mut self) {
        match self.pin.set_high() {
            Ok(()) => self.high = true,
            Err(never) => match never {},
        }
    }

    fn set_low(&mut self) {
        match self.pin.set_low() {
            Ok(()) => self.high = false,
            Err(never) => match never {},
        }
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Blocking I2C adapter
///
/// `embedded-hal` 1.0 has no per-transaction timeout, so the per-call value
/// is dropped here. The wrapped bus must bound its own transactions (a
/// timeout in its HAL configuration, or a bus watchdog); a bus that can hang
/// on a held SDA line hangs the DAC driver with it.
///
/// A probe is an empty write, retried up to `trials` times.
pub struct EhI2c<T> {
    i2c: T,
}

impl<T: I2c> EhI2c<T> {
    /// Wrap a bus
    pub fn new(i2c: T) -> Self {
        Self { i2c }
    }

    /// Unwrap the bus
    pub fn release(self) -> T {
        self.i2c
    }
}

impl<T: I2c> I2cBus for EhI2c<T> {
    type Error = T::Error;

    fn probe(&mut self, address: u8, trials: u32, _timeout: TimeoutMs) -> Result<(), Self::Error> {
        let mut result = self.i2c.write(address, &[]);
        for _ in 1..trials {
            if result.is_ok() {
                break;
            }
            result = self.i2c.write(address, &[]);
        }
        result
    }

    fn write(&mut self, address: u8, data: &[u8], _timeout: TimeoutMs) -> Result<(), Self::Error> {
        self.i2c.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8], _timeout: TimeoutMs) -> Result<(), Self::Error> {
        self.i2c.read(address, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dac::{Mcp4725, Mcp4725Config, Mcp4725Error};
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    /// Bus that NACKs the first `failures` transactions
    #[derive(Default)]
    struct FlakyI2c {
        failures: u32,
        transactions: u32,
        written: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for FlakyI2c {
        type Error = ErrorKind;
    }

    impl I2c for FlakyI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.transactions += 1;
            if self.failures > 0 {
                self.failures -= 1;
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.written.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.fill(0),
                }
            }
            Ok(())
        }
    }

    struct LevelPin {
        level: bool,
    }

    impl embedded_hal::digital::ErrorType for LevelPin {
        type Error = Infallible;
    }

    impl EhOutputPin for LevelPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.level = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.level = true;
            Ok(())
        }
    }

    #[test]
    fn test_pin_tracks_level() {
        let mut pin = EhPin::new(LevelPin { level: false });
        assert!(pin.is_set_low());

        pin.set_state(true);
        assert!(pin.is_set_high());
        assert!(pin.release().level);
    }

    #[test]
    fn test_probe_retries() {
        let mut bus = EhI2c::new(FlakyI2c {
            failures: 2,
            ..Default::default()
        });
        assert_eq!(bus.probe(0x60, 3, 5), Ok(()));
        assert_eq!(bus.release().transactions, 3);
    }

    #[test]
    fn test_probe_gives_up() {
        let mut bus = EhI2c::new(FlakyI2c {
            failures: 5,
            ..Default::default()
        });
        assert!(bus.probe(0x60, 3, 5).is_err());
        assert_eq!(bus.release().transactions, 3);
    }

    #[test]
    fn test_dac_over_embedded_hal() {
        let mut dac = Mcp4725::new(EhI2c::new(FlakyI2c::default()), Mcp4725Config::default());
        dac.init().unwrap();
        dac.write_register_fast(0x123).unwrap();

        let bus = dac.release().release();
        // Probe (empty write), init write, then the fast write
        assert_eq!(bus.written[0], (0x60, vec![]));
        assert_eq!(bus.written[2], (0x60, vec![0x01, 0x23]));
    }

    #[test]
    fn test_dac_absent_over_embedded_hal() {
        let bus = EhI2c::new(FlakyI2c {
            failures: 3,
            ..Default::default()
        });
        let mut dac = Mcp4725::new(bus, Mcp4725Config::default());
        assert_eq!(dac.init(), Err(Mcp4725Error::NotPresent));
    }
}
