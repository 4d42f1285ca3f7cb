//! Interrupt-shared display handle
//!
//! The engine is owned by a `critical_section::Mutex` so the foreground
//! and the timer interrupt never touch it at the same time. Blocking
//! requests retry the non-blocking ones, leaving the critical section
//! between attempts so the interrupt can keep ticking.
//!
//! # Spinning
//!
//! Blocking requests busy-wait without yielding and without a timeout.
//! They only return once the timer interrupt has finished the transfer in
//! flight, so calling them from the display timer's own interrupt, or from
//! an interrupt of equal or higher priority, spins forever. Use the
//! engine's `try_*` requests through [`SharedTm1637::with`] there.
//!
//! Calling back into the wrapper from inside a [`SharedTm1637::with`]
//! closure does not panic; it returns [`DisplayError::Reentrant`].
//!
//! ```ignore
//! static DISPLAY: SharedTm1637<Clk, Dio, Tim> = SharedTm1637::new();
//!
//! #[interrupt]
//! fn TIM7() {
//!     DISPLAY.on_interrupt();
//! }
//!
//! DISPLAY.install(Tm1637::new(clk, dio, tim, Tm1637Config::default())?);
//! DISPLAY.init()?;
//! DISPLAY.set_integer(1234)?;
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use tickwire_core::segment::DigitBytes;
use tickwire_core::tm1637::Brightness;
use tickwire_hal::{OutputPin, PeriodicTimer};

use super::tm1637::Tm1637;
use super::DisplayError;

/// Display engine shared with its timer interrupt
pub struct SharedTm1637<CLK, DIO, TIM> {
    inner: Mutex<RefCell<Option<Tm1637<CLK, DIO, TIM>>>>,
}

impl<CLK, DIO, TIM> SharedTm1637<CLK, DIO, TIM>
where
    CLK: OutputPin,
    DIO: OutputPin,
    TIM: PeriodicTimer,
{
    /// Create an empty slot, usable in a `static`
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Place an engine in the slot, returning the previous one
    ///
    /// Hands the engine back as `Err` when called from inside
    /// [`SharedTm1637::with`].
    pub fn install(
        &self,
        engine: Tm1637<CLK, DIO, TIM>,
    ) -> Result<Option<Tm1637<CLK, DIO, TIM>>, Tm1637<CLK, DIO, TIM>> {
        critical_section::with(|cs| match self.inner.borrow(cs).try_borrow_mut() {
            Ok(mut slot) => Ok(slot.replace(engine)),
            Err(_) => Err(engine),
        })
    }

    /// Remove the engine from the slot
    pub fn take(&self) -> Result<Option<Tm1637<CLK, DIO, TIM>>, DisplayError> {
        critical_section::with(|cs| {
            let mut slot = self
                .inner
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| DisplayError::Reentrant)?;
            Ok(slot.take())
        })
    }

    /// Timer interrupt entry point
    pub fn on_interrupt(&self) {
        critical_section::with(|cs| {
            if let Ok(mut slot) = self.inner.borrow(cs).try_borrow_mut() {
                if let Some(engine) = slot.as_mut() {
                    engine.on_interrupt();
                }
            }
        });
    }

    /// Run a closure on the engine inside a critical section
    ///
    /// Returns [`DisplayError::Reentrant`] when the engine is already
    /// borrowed, i.e. when called from inside another `with` closure.
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut Tm1637<CLK, DIO, TIM>) -> R,
    ) -> Result<R, DisplayError> {
        critical_section::with(|cs| {
            let mut slot = self
                .inner
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| DisplayError::Reentrant)?;
            slot.as_mut().map(f).ok_or(DisplayError::NotInstalled)
        })
    }

    /// Retry a request until the engine accepts it
    ///
    /// Spins while the engine reports [`DisplayError::Busy`], leaving the
    /// critical section between attempts. Never returns if the timer
    /// interrupt cannot preempt the caller; see the module docs.
    fn request<F>(&self, mut op: F) -> Result<(), DisplayError>
    where
        F: FnMut(&mut Tm1637<CLK, DIO, TIM>) -> Result<(), DisplayError>,
    {
        loop {
            match self.with(&mut op)? {
                Err(DisplayError::Busy) => core::hint::spin_loop(),
                result => return result,
            }
        }
    }

    /// Check if a new request would be accepted without waiting
    pub fn is_ready(&self) -> bool {
        self.with(|engine| engine.is_ready()).unwrap_or(false)
    }

    /// Wait until the transfer in flight has finished
    ///
    /// Spins like the blocking requests; see the module docs.
    pub fn wait_ready(&self) -> Result<(), DisplayError> {
        while !self.with(|engine| engine.is_ready())? {
            core::hint::spin_loop();
        }
        Ok(())
    }

    /// Blank the display and apply the configured power and brightness
    pub fn init(&self) -> Result<(), DisplayError> {
        self.clear_all()?;
        let on = self.with(|engine| engine.is_display_on())?;
        self.set_power(on)?;

        #[cfg(feature = "defmt")]
        defmt::info!("TM1637 initialized");
        Ok(())
    }

    /// Write one raw segment byte to a digit position
    pub fn set_digit(&self, position: u8, segments: u8) -> Result<(), DisplayError> {
        self.request(|engine| engine.try_set_digit(position, segments))
    }

    /// Write all six digits, least significant first
    pub fn write_digits(&self, digits: &DigitBytes) -> Result<(), DisplayError> {
        self.request(|engine| engine.try_write_digits(digits))
    }

    /// Show an integer (0-999999)
    pub fn set_integer(&self, value: u32) -> Result<(), DisplayError> {
        self.request(|engine| engine.try_set_integer(value))
    }

    /// Show a non-negative number with 1-3 decimals
    pub fn set_float(&self, value: f32, decimals: u8) -> Result<(), DisplayError> {
        self.request(|engine| engine.try_set_float(value, decimals))
    }

    /// Blank all digits
    pub fn clear_all(&self) -> Result<(), DisplayError> {
        self.request(|engine| engine.try_clear_all())
    }

    /// Switch the display on or off
    pub fn set_power(&self, on: bool) -> Result<(), DisplayError> {
        self.request(|engine| engine.try_set_power(on))
    }

    /// Switch the display on
    pub fn turn_on(&self) -> Result<(), DisplayError> {
        self.set_power(true)
    }

    /// Switch the display off
    pub fn turn_off(&self) -> Result<(), DisplayError> {
        self.set_power(false)
    }

    /// Change the brightness
    pub fn set_brightness(&self, brightness: Brightness) -> Result<(), DisplayError> {
        self.request(|engine| engine.try_set_brightness(brightness))
    }
}

impl<CLK, DIO, TIM> Default for SharedTm1637<CLK, DIO, TIM>
where
    CLK: OutputPin,
    DIO: OutputPin,
    TIM: PeriodicTimer,
{
    fn default() -> Self {
        Self::new()
    }
}
