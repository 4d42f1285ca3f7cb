//! Update-interrupt tick timer for STM32F4
//!
//! Any timer instance works (TIM6/TIM7 are the natural choice); only the
//! update event is used.

use embassy_stm32::interrupt::typelevel::Interrupt;
use embassy_stm32::interrupt::Priority;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::Timer;
use embassy_stm32::timer::CoreInstance;
use embassy_stm32::Peri;
use tickwire_hal::{IrqPriority, PeriodicTimer, PeripheralCaps};

/// Timer raising one update interrupt per tick
pub struct BasicTickTimer<'d, T: CoreInstance> {
    timer: Timer<'d, T>,
    running: bool,
}

impl<'d, T: CoreInstance> BasicTickTimer<'d, T> {
    /// Take a timer instance (enables its clock), stopped
    pub fn new(tim: Peri<'d, T>) -> Self {
        let timer = Timer::new(tim);
        timer.stop();
        timer.enable_update_interrupt(false);
        Self {
            timer,
            running: false,
        }
    }
}

impl<T: CoreInstance> PeriodicTimer for BasicTickTimer<'_, T> {
    fn configure(&mut self, tick_hz: u32) {
        self.timer.set_frequency(Hertz(tick_hz));
        // Loading the prescaler raises a spurious update flag
        self.timer.clear_update_interrupt();

        #[cfg(feature = "defmt")]
        defmt::debug!("tick timer at {=u32} Hz", tick_hz);
    }

    fn start_interrupt(&mut self) {
        self.timer.reset();
        self.timer.clear_update_interrupt();
        self.timer.enable_update_interrupt(true);
        self.running = true;
        self.timer.start();
    }

    fn stop_interrupt(&mut self) {
        self.timer.enable_update_interrupt(false);
        self.timer.stop();
        self.timer.clear_update_interrupt();
        self.running = false;
    }

    fn acknowledge(&mut self) -> bool {
        let pending = self.timer.clear_update_interrupt();
        pending && self.running
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

fn nvic_priority(priority: IrqPriority) -> Priority {
    match priority.raw() {
        0 => Priority::P0,
        1 => Priority::P1,
        2 => Priority::P2,
        3 => Priority::P3,
        4 => Priority::P4,
        5 => Priority::P5,
        6 => Priority::P6,
        7 => Priority::P7,
        8 => Priority::P8,
        9 => Priority::P9,
        10 => Priority::P10,
        11 => Priority::P11,
        12 => Priority::P12,
        13 => Priority::P13,
        14 => Priority::P14,
        _ => Priority::P15,
    }
}

// Also resets the timer, so it runs before the engine configures it
fn enable_timer_clock<T: CoreInstance>() {
    embassy_stm32::rcc::enable_and_reset::<T>();
}

fn enable_update_interrupt<T: CoreInstance>(priority: IrqPriority) {
    T::UpdateInterrupt::unpend();
    T::UpdateInterrupt::set_priority(nvic_priority(priority));
    // SAFETY: the handler bound to this vector only takes the display
    // engine's critical-section mutex, so unmasking it cannot break a
    // critical section held by the caller.
    unsafe { T::UpdateInterrupt::enable() };
}

/// Capability table entry for timer `T`
///
/// Defaults to the lowest priority so the display never preempts other
/// interrupts. Hand the resolved entry to `Tm1637::new_with_caps`, which
/// runs the clock hook before configuring the timer and unmasks the update
/// interrupt last.
pub fn tick_timer_caps<T: CoreInstance>(priority: Option<IrqPriority>) -> PeripheralCaps {
    PeripheralCaps {
        enable_clock: enable_timer_clock::<T>,
        enable_interrupt: enable_update_interrupt::<T>,
        priority: priority.unwrap_or(IrqPriority::lowest(0)),
    }
}
