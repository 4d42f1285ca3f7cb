//! Transfer state machine
//!
//! A transfer is a sequence of byte windows. Each window is 19 ticks:
//!
//! ```text
//! tick:  0  1  2  3 ... 14 15 16 17 18
//! CLK:   L  H  L  H ...  L  H  L  H  L
//! DIO:   b0    b1   ...  b7    ack   low
//! ```
//!
//! Even ticks drop the clock and set up the data line, odd ticks raise
//! the clock so the chip samples the bit. At the end of the window the
//! start/stop flags and the transfer method decide what comes next.

use crate::segment::DIGIT_COUNT;

/// Ticks per byte window (8 bits + ack slot, 2 ticks per bit-cell, final low phase)
pub const WINDOW_TICKS: u8 = 19;

/// Tick at which the data line is released for the chip's ACK
pub const ACK_TICK: u8 = 16;

/// Payload index of the last digit
pub const LAST_DIGIT: u8 = (DIGIT_COUNT - 1) as u8;

/// Transfer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// Idle, accepts a new request
    #[default]
    Ready,
    /// Shifting out the data command
    SendingDataCmd,
    /// Shifting out the address command
    SendingAddressCmd,
    /// Shifting out the display control command
    SendingDisplayCtrlCmd,
    /// Shifting out digit bytes
    SendingPayloadBytes,
}

/// How a transfer is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferMethod {
    /// One display control command in its own frame
    DisplayControl,
    /// Data command, then address + six bytes with auto-increment
    SixByteAutoAddress,
    /// Data command, then address + one byte at a fixed address
    SingleByteFixedAddress,
}

impl TransferMethod {
    /// Number of byte windows a transfer with this method takes
    pub fn window_count(self) -> u32 {
        match self {
            TransferMethod::DisplayControl => 1,
            TransferMethod::SixByteAutoAddress => 2 + DIGIT_COUNT as u32,
            TransferMethod::SingleByteFixedAddress => 3,
        }
    }

    /// Ticks from arming to Ready
    pub fn tick_count(self) -> u32 {
        self.window_count() * u32::from(WINDOW_TICKS)
    }
}

/// Start/stop condition flags for the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFlags {
    /// Issue a start condition before the first bit
    pub start: bool,
    /// Issue a stop condition after the window
    pub stop: bool,
}

impl FrameFlags {
    /// Start and stop: a self-contained one-byte frame
    pub const SINGLE: Self = Self {
        start: true,
        stop: true,
    };
}

/// Result of evaluating the window-end rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowStep {
    /// State for the next window (Ready when finished)
    pub next: TransferState,
    /// Flags for the next window
    pub flags: FrameFlags,
    /// Payload cursor for the next window
    pub cursor: u8,
    /// Issue a stop condition now
    pub stop_condition: bool,
    /// Transfer complete: disarm the timer before entering Ready
    pub finished: bool,
}

impl TransferState {
    /// Check if a transfer is in flight
    pub fn is_busy(&self) -> bool {
        !matches!(self, TransferState::Ready)
    }

    /// Apply the window-end rule
    ///
    /// Called once after tick 18 of every window.
    pub fn end_window(self, method: TransferMethod, flags: FrameFlags, cursor: u8) -> WindowStep {
        use TransferMethod::*;
        use TransferState::*;

        let stay = WindowStep {
            next: self,
            flags,
            cursor,
            stop_condition: false,
            finished: false,
        };
        let finish = WindowStep {
            next: Ready,
            flags,
            cursor,
            stop_condition: true,
            finished: true,
        };

        if flags.stop {
            match (self, method) {
                // Data command is its own frame; re-start for the address
                (SendingDataCmd, _) => WindowStep {
                    next: SendingAddressCmd,
                    flags: FrameFlags {
                        start: true,
                        stop: false,
                    },
                    stop_condition: true,
                    ..stay
                },
                (SendingDisplayCtrlCmd, DisplayControl) => finish,
                (SendingPayloadBytes, SingleByteFixedAddress) => finish,
                (SendingPayloadBytes, SixByteAutoAddress) if cursor == LAST_DIGIT => finish,
                _ => stay,
            }
        } else {
            match (self, method) {
                (SendingAddressCmd, _) => WindowStep {
                    next: SendingPayloadBytes,
                    flags: FrameFlags {
                        start: false,
                        stop: method == SingleByteFixedAddress,
                    },
                    ..stay
                },
                (SendingPayloadBytes, SixByteAutoAddress) => {
                    let cursor = cursor.saturating_add(1).min(LAST_DIGIT);
                    WindowStep {
                        flags: FrameFlags {
                            start: false,
                            stop: cursor == LAST_DIGIT,
                        },
                        cursor,
                        ..stay
                    }
                }
                _ => stay,
            }
        }
    }
}

/// Data line level to drive on a clock-low tick
///
/// Returns `None` on odd (clock-high) ticks, where the data line must not
/// change. Bits go out LSB first.
pub fn data_level(tick: u8, byte: u8) -> Option<bool> {
    if tick % 2 == 1 {
        return None;
    }
    match tick {
        t if t < ACK_TICK => Some((byte >> (t / 2)) & 0x1 == 1),
        // Released for the ACK, not sampled
        ACK_TICK => Some(true),
        // Low so the stop condition has a rising data edge
        _ => Some(false),
    }
}
