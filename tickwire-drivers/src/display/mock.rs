//! Test doubles for the display engine
//!
//! Both pins log into one shared trace so the decoder sees clock and data
//! edges in the order the engine produced them.

use std::sync::{Arc, Mutex};

use tickwire_hal::{OutputPin, PeriodicTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Clock,
    Data,
}

pub type Trace = Arc<Mutex<Vec<(Line, bool)>>>;

pub struct TracePin {
    line: Line,
    high: bool,
    trace: Trace,
}

impl OutputPin for TracePin {
    fn set_high(&mut self) {
        self.high = true;
        self.trace.lock().unwrap().push((self.line, true));
    }

    fn set_low(&mut self) {
        self.high = false;
        self.trace.lock().unwrap().push((self.line, false));
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Clock and data pins sharing one trace; both start low
pub fn pins() -> (TracePin, TracePin, Trace) {
    let trace: Trace = Arc::default();
    let clock = TracePin {
        line: Line::Clock,
        high: false,
        trace: trace.clone(),
    };
    let data = TracePin {
        line: Line::Data,
        high: false,
        trace: trace.clone(),
    };
    (clock, data, trace)
}

#[derive(Debug, Default)]
pub struct MockTimer {
    pub tick_hz: u32,
    pub running: bool,
    pub starts: u32,
    pub stops: u32,
}

impl PeriodicTimer for MockTimer {
    fn configure(&mut self, tick_hz: u32) {
        assert!(!self.running, "reconfigured while running");
        self.tick_hz = tick_hz;
    }

    fn start_interrupt(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop_interrupt(&mut self) {
        self.running = false;
        self.stops += 1;
    }

    fn acknowledge(&mut self) -> bool {
        self.running
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Decode a pin trace the way the chip would
///
/// Returns one entry per start/stop-delimited frame. Bits are sampled on
/// rising clock edges, LSB first; every ninth clock is the ACK slot.
pub fn decode_frames(trace: &[(Line, bool)]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut current: Option<Vec<u8>> = None;
    let mut clock = true;
    let mut data = true;
    let mut byte = 0u8;
    let mut bit = 0u8;

    for &(line, level) in trace {
        match line {
            Line::Data => {
                if clock && data && !level {
                    // Start
                    current = Some(Vec::new());
                    byte = 0;
                    bit = 0;
                } else if clock && !data && level {
                    // Stop
                    if let Some(frame) = current.take() {
                        frames.push(frame);
                    }
                }
                data = level;
            }
            Line::Clock => {
                if !clock && level {
                    if let Some(frame) = current.as_mut() {
                        if bit < 8 {
                            byte |= u8::from(data) << bit;
                            bit += 1;
                            if bit == 8 {
                                frame.push(byte);
                            }
                        } else {
                            byte = 0;
                            bit = 0;
                        }
                    }
                }
                clock = level;
            }
        }
    }
    frames
}
