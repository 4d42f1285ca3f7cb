//! Periodic timer abstraction
//!
//! The display engine is clocked by a timer update interrupt. One update
//! is one tick; two ticks make one serial bit-cell (clock low, clock high).

/// Periodic update-interrupt source
///
/// The application binds the timer's interrupt vector to the driver's
/// interrupt entry point; that binding is the callback registration.
pub trait PeriodicTimer {
    /// Set the update rate in Hz (one update per half bit-cell)
    ///
    /// Must not be called while the interrupt is running.
    fn configure(&mut self, tick_hz: u32);

    /// Start counting and enable the update interrupt
    fn start_interrupt(&mut self);

    /// Disable the update interrupt and stop counting
    ///
    /// After this returns no further update interrupt is raised.
    fn stop_interrupt(&mut self);

    /// Clear the pending update flag
    ///
    /// Returns true if an update was pending with the interrupt enabled,
    /// i.e. the interrupt was really raised by this timer.
    fn acknowledge(&mut self) -> bool;

    /// Check if the update interrupt is currently armed
    fn is_running(&self) -> bool;
}
