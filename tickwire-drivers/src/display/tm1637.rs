//! TM1637 6-digit display driver
//!
//! The TM1637 link is bit-banged from a periodic timer interrupt. A
//! request (set a digit, show a number, change brightness) fills the
//! command and payload buffers, arms the state machine and starts the
//! timer; every timer update then advances the link by exactly one tick
//! until the transfer is complete and the timer is stopped again.
//!
//! # Frames
//!
//! ```text
//! single digit:  [START 0x44 STOP] [START 0xC0|addr byte STOP]
//! six digits:    [START 0x40 STOP] [START 0xC0 b0 b1 b2 b3 b4 b5 STOP]
//! control:       [START 0x80|on<<3|brightness STOP]
//! ```
//!
//! Only one transfer is in flight at a time. The `try_*` requests return
//! [`DisplayError::Busy`] instead of waiting; [`SharedTm1637`] wraps them
//! in a blocking API for use alongside the interrupt.
//!
//! [`SharedTm1637`]: super::SharedTm1637

use tickwire_core::segment::{self, DigitBytes, DIGIT_COUNT};
use tickwire_core::timing::TickTiming;
use tickwire_core::tm1637::command::{self, ADDR_CMD, DATA_CMD_AUTO_ADDR, DATA_CMD_FIXED_ADDR};
use tickwire_core::tm1637::state::{data_level, WINDOW_TICKS};
use tickwire_core::tm1637::{Brightness, DigitPosition, FrameFlags, TransferMethod, TransferState};
use tickwire_hal::{OutputPin, PeripheralCaps, PeriodicTimer};

use super::DisplayError;

/// Command buffer slots
pub mod slot {
    /// Data command
    pub const DATA: usize = 0;
    /// Address command
    pub const ADDRESS: usize = 1;
    /// Display control command
    pub const DISPLAY_CTRL: usize = 2;
}

/// Default serial bit rate
pub const DEFAULT_BIT_RATE_HZ: u32 = 100_000;

/// Display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tm1637Config {
    /// Serial bit timing
    pub timing: TickTiming,
    /// Display on after init
    pub display_on: bool,
    /// Brightness after init
    pub brightness: Brightness,
}

impl Default for Tm1637Config {
    fn default() -> Self {
        Self {
            timing: TickTiming::new(DEFAULT_BIT_RATE_HZ),
            display_on: true,
            brightness: Brightness::default(),
        }
    }
}

/// Timer-driven TM1637 engine
pub struct Tm1637<CLK, DIO, TIM> {
    clock: CLK,
    data: DIO,
    timer: TIM,

    state: TransferState,
    method: TransferMethod,
    flags: FrameFlags,
    commands: [u8; 3],
    payload: DigitBytes,
    cursor: u8,
    tick: u8,

    display_on: bool,
    brightness: Brightness,
}

impl<CLK, DIO, TIM> Tm1637<CLK, DIO, TIM>
where
    CLK: OutputPin,
    DIO: OutputPin,
    TIM: PeriodicTimer,
{
    /// Create the engine
    ///
    /// Releases both lines (idle high) and sets the timer rate. The timer
    /// stays stopped until the first request.
    pub fn new(
        mut clock: CLK,
        mut data: DIO,
        mut timer: TIM,
        config: Tm1637Config,
    ) -> Result<Self, DisplayError> {
        config.timing.tick_period_ns()?;

        clock.set_high();
        data.set_high();
        timer.stop_interrupt();
        timer.configure(config.timing.tick_hz());

        #[cfg(feature = "defmt")]
        defmt::debug!("TM1637 at {=u32} bit/s", config.timing.bit_rate_hz);

        Ok(Self {
            clock,
            data,
            timer,
            state: TransferState::Ready,
            method: TransferMethod::DisplayControl,
            flags: FrameFlags::SINGLE,
            commands: [
                DATA_CMD_AUTO_ADDR,
                ADDR_CMD,
                command::display_control(config.display_on, config.brightness),
            ],
            payload: [0; DIGIT_COUNT],
            cursor: 0,
            tick: 0,
            display_on: config.display_on,
            brightness: config.brightness,
        })
    }

    /// Create the engine and bring up its timer from a capability entry
    ///
    /// Runs the entry's clock hook, then [`Tm1637::new`], then enables the
    /// timer interrupt at the entry's priority. The interrupt is only
    /// unmasked once the engine exists, so install it in its
    /// [`SharedTm1637`] slot before the first request.
    ///
    /// ```ignore
    /// #[derive(Clone, Copy, PartialEq)]
    /// enum Periph {
    ///     DisplayTimer,
    /// }
    ///
    /// let mut caps: CapabilityTable<Periph, 4> = CapabilityTable::new();
    /// caps.register(Periph::DisplayTimer, tick_timer_caps::<TIM7>(None))?;
    ///
    /// let p = embassy_stm32::init(Default::default());
    /// let engine = Tm1637::new_with_caps(
    ///     PushPullPin::new(p.PA8),
    ///     OpenDrainPin::new(p.PA9),
    ///     BasicTickTimer::new(p.TIM7),
    ///     Tm1637Config::default(),
    ///     caps.resolve(Periph::DisplayTimer)?,
    /// )?;
    /// DISPLAY.install(engine);
    /// ```
    ///
    /// [`SharedTm1637`]: super::SharedTm1637
    pub fn new_with_caps(
        clock: CLK,
        data: DIO,
        timer: TIM,
        config: Tm1637Config,
        caps: &PeripheralCaps,
    ) -> Result<Self, DisplayError> {
        (caps.enable_clock)();
        let engine = Self::new(clock, data, timer, config)?;
        (caps.enable_interrupt)(caps.priority);
        Ok(engine)
    }

    fn ensure_ready(&self) -> Result<(), DisplayError> {
        if self.state.is_busy() {
            Err(DisplayError::Busy)
        } else {
            Ok(())
        }
    }

    /// Write one raw segment byte to a digit position (0 = rightmost)
    pub fn try_set_digit(&mut self, position: u8, segments: u8) -> Result<(), DisplayError> {
        let digit = DigitPosition::new(position).inspect_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("TM1637 has no digit {=u8}", position);
        })?;
        self.ensure_ready()?;

        let address = digit.address();
        self.commands[slot::DATA] = DATA_CMD_FIXED_ADDR;
        self.commands[slot::ADDRESS] = digit.address_command();
        self.payload[usize::from(address)] = segments;
        self.arm(
            TransferMethod::SingleByteFixedAddress,
            TransferState::SendingDataCmd,
            address,
        );
        Ok(())
    }

    /// Write all six digits, least significant (rightmost) first
    pub fn try_write_digits(&mut self, digits: &DigitBytes) -> Result<(), DisplayError> {
        self.ensure_ready()?;

        self.commands[slot::DATA] = DATA_CMD_AUTO_ADDR;
        self.commands[slot::ADDRESS] = ADDR_CMD;
        self.payload = command::to_address_order(digits);
        self.arm(
            TransferMethod::SixByteAutoAddress,
            TransferState::SendingDataCmd,
            0,
        );
        Ok(())
    }

    /// Show an integer (0-999999), right-aligned
    pub fn try_set_integer(&mut self, value: u32) -> Result<(), DisplayError> {
        let digits = segment::encode_integer(value).inspect_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("TM1637 cannot show {=u32}", value);
        })?;
        self.try_write_digits(&digits)
    }

    /// Show a non-negative number with 1-3 decimals (truncated)
    pub fn try_set_float(&mut self, value: f32, decimals: u8) -> Result<(), DisplayError> {
        let digits = segment::encode_float(value, decimals).inspect_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("TM1637 cannot show {=f32} with {=u8} decimals", value, decimals);
        })?;
        self.try_write_digits(&digits)
    }

    /// Blank all six digits
    pub fn try_clear_all(&mut self) -> Result<(), DisplayError> {
        self.try_write_digits(&[0; DIGIT_COUNT])
    }

    /// Switch the display on or off, keeping the brightness
    pub fn try_set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        self.display_on = on;
        self.send_display_control();
        Ok(())
    }

    /// Switch the display on
    pub fn try_turn_on(&mut self) -> Result<(), DisplayError> {
        self.try_set_power(true)
    }

    /// Switch the display off
    pub fn try_turn_off(&mut self) -> Result<(), DisplayError> {
        self.try_set_power(false)
    }

    /// Change the brightness, keeping the power state
    pub fn try_set_brightness(&mut self, brightness: Brightness) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        self.brightness = brightness;
        self.send_display_control();
        Ok(())
    }

    fn send_display_control(&mut self) {
        self.commands[slot::DISPLAY_CTRL] = command::display_control(self.display_on, self.brightness);
        self.arm(
            TransferMethod::DisplayControl,
            TransferState::SendingDisplayCtrlCmd,
            0,
        );
    }

    /// Start a transfer
    ///
    /// Buffers must be complete before the state leaves Ready: the
    /// interrupt only looks at them once it sees a busy state.
    fn arm(&mut self, method: TransferMethod, first: TransferState, cursor: u8) {
        self.method = method;
        self.flags = FrameFlags::SINGLE;
        self.cursor = cursor;
        self.tick = 0;
        self.state = first;
        self.timer.start_interrupt();

        #[cfg(feature = "defmt")]
        defmt::trace!("TM1637 transfer armed: {}", method);
    }

    /// Timer interrupt entry point
    ///
    /// Clears the update flag and advances one tick. Updates that were not
    /// raised by this timer are ignored.
    pub fn on_interrupt(&mut self) {
        if self.timer.acknowledge() {
            self.tick();
        }
    }

    /// Advance the link by one tick
    ///
    /// Does nothing while Ready.
    pub fn tick(&mut self) {
        if !self.state.is_busy() {
            return;
        }

        if self.tick == 0 && self.flags.start {
            self.start_condition();
        }

        match data_level(self.tick, self.current_byte()) {
            Some(level) => {
                self.clock.set_low();
                self.data.set_state(level);
            }
            None => self.clock.set_high(),
        }

        self.tick += 1;
        if self.tick == WINDOW_TICKS {
            self.tick = 0;
            self.end_window();
        }
    }

    fn current_byte(&self) -> u8 {
        match self.state {
            TransferState::SendingDataCmd => self.commands[slot::DATA],
            TransferState::SendingAddressCmd => self.commands[slot::ADDRESS],
            TransferState::SendingDisplayCtrlCmd => self.commands[slot::DISPLAY_CTRL],
            TransferState::SendingPayloadBytes => self.payload[usize::from(self.cursor)],
            TransferState::Ready => 0,
        }
    }

    fn end_window(&mut self) {
        let step = self.state.end_window(self.method, self.flags, self.cursor);
        self.flags = step.flags;
        self.cursor = step.cursor;

        if step.finished {
            // No further tick may run once the state reads Ready
            self.timer.stop_interrupt();
            self.stop_condition();
            self.state = TransferState::Ready;
            return;
        }

        if step.stop_condition {
            self.stop_condition();
        }
        self.state = step.next;
    }

    /// Data falls while the clock is high
    fn start_condition(&mut self) {
        self.data.set_low();
        self.clock.set_low();
    }

    /// Data rises while the clock is high
    fn stop_condition(&mut self) {
        self.clock.set_high();
        self.data.set_high();
    }

    /// Current transfer state
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Method of the current (or last) transfer
    pub fn method(&self) -> TransferMethod {
        self.method
    }

    /// Check if a new request would be accepted
    pub fn is_ready(&self) -> bool {
        !self.state.is_busy()
    }

    /// Data, address and display control command bytes
    pub fn commands(&self) -> &[u8; 3] {
        &self.commands
    }

    /// Display-memory image, in address order
    pub fn payload(&self) -> &DigitBytes {
        &self.payload
    }

    /// Payload index being sent
    pub fn payload_cursor(&self) -> u8 {
        self.cursor
    }

    /// Tick within the current byte window (0-18)
    pub fn tick_index(&self) -> u8 {
        self.tick
    }

    /// Current brightness setting
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Current power setting
    pub fn is_display_on(&self) -> bool {
        self.display_on
    }

    /// Stop the timer and release the pins and timer
    pub fn release(mut self) -> (CLK, DIO, TIM) {
        self.timer.stop_interrupt();
        (self.clock, self.data, self.timer)
    }
}
