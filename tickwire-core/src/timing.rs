//! Tick timing math
//!
//! One serial bit-cell spans two timer ticks (clock low, clock high), so
//! the timer runs at twice the bit rate. The timer is used as an
//! update-only counter with an auto-reload of 1, i.e. two counts per
//! update:
//!
//! ```text
//! tick_hz   = 2 * bit_rate_hz
//! prescaler = timer_clock_hz / (2 * tick_hz) - 1
//! ```

/// Auto-reload value used with [`TickTiming::prescaler`]
pub const AUTO_RELOAD: u16 = 1;

/// Errors from timing calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// Bit rate or timer clock is zero
    ZeroRate,
    /// Timer clock too slow for the requested rate
    RateTooHigh,
    /// Prescaler does not fit the 16-bit register
    PrescalerOverflow,
}

/// Serial bit timing for the bit-banged display link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickTiming {
    /// Bit-cells per second on the clock line
    pub bit_rate_hz: u32,
}

impl TickTiming {
    /// Create timing for a bit rate
    pub const fn new(bit_rate_hz: u32) -> Self {
        Self { bit_rate_hz }
    }

    /// Timer update rate (one update per half bit-cell)
    pub fn tick_hz(&self) -> u32 {
        self.bit_rate_hz.saturating_mul(2)
    }

    /// Half bit-cell duration in nanoseconds
    pub fn tick_period_ns(&self) -> Result<u32, TimingError> {
        let tick_hz = self.tick_hz();
        if tick_hz == 0 {
            return Err(TimingError::ZeroRate);
        }
        Ok(1_000_000_000 / tick_hz)
    }

    /// Prescaler for an update-only timer clocked at `timer_clock_hz`
    pub fn prescaler(&self, timer_clock_hz: u32) -> Result<u16, TimingError> {
        if self.bit_rate_hz == 0 || timer_clock_hz == 0 {
            return Err(TimingError::ZeroRate);
        }
        let counts_per_tick = u64::from(self.tick_hz()) * (u64::from(AUTO_RELOAD) + 1);
        let divider = u64::from(timer_clock_hz) / counts_per_tick;
        if divider == 0 {
            return Err(TimingError::RateTooHigh);
        }
        u16::try_from(divider - 1).map_err(|_| TimingError::PrescalerOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_rate_is_twice_bit_rate() {
        let timing = TickTiming::new(100_000);
        assert_eq!(timing.tick_hz(), 200_000);
        assert_eq!(timing.tick_period_ns(), Ok(5_000));
    }

    #[test]
    fn test_prescaler() {
        // 90 MHz timer clock, 100 kHz bits -> 200 kHz ticks -> 400 kHz counts
        let timing = TickTiming::new(100_000);
        assert_eq!(timing.prescaler(90_000_000), Ok(224));

        // Resulting update rate matches the tick rate
        let psc = u32::from(timing.prescaler(90_000_000).unwrap());
        assert_eq!(90_000_000 / ((psc + 1) * 2), timing.tick_hz());
    }

    #[test]
    fn test_prescaler_errors() {
        assert_eq!(
            TickTiming::new(0).prescaler(90_000_000),
            Err(TimingError::ZeroRate)
        );
        assert_eq!(TickTiming::new(100_000).prescaler(0), Err(TimingError::ZeroRate));
        assert_eq!(
            TickTiming::new(100_000).prescaler(100_000),
            Err(TimingError::RateTooHigh)
        );
        assert_eq!(
            TickTiming::new(1).prescaler(180_000_000),
            Err(TimingError::PrescalerOverflow)
        );
        assert_eq!(TickTiming::new(0).tick_period_ns(), Err(TimingError::ZeroRate));
    }
}
