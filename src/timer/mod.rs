//! Capture timer configuration for the FS20 receive path.
//!
//! The receive front-end timestamps every edge of the demodulated signal with
//! an 8-bit free-running counter. The counter's prescaler is chosen at compile
//! time so that the longest pulse the decoder has to measure (1464 µs from a
//! WS300 weather station, rounded up to 1500 µs) still fits below 255 ticks.
//! Edge and timeout captures share the same wrapping time base; the counter is
//! never reset by a compare match.
//!
//! Contains:
//! - [`select_prescaler`]: compile-time prescaler search
//! - [`TimingBase`]: tick/µs conversions for the selected prescaler
//! - [`TickCounter`]: the hardware counter as seen by this crate
//! - [`start_capture_timer`]: receive-side timer setup
//! - `global_*` helpers and macros for interrupt-driven use (feature `timer-isr`)
//!
//! Selected prescalers for common clocks:
//!
//! | F_CPU   | PRESCALER | Tick    | 1500 µs in ticks |
//! |---------|-----------|---------|------------------|
//! |  1 MHz  |         8 |    8 µs |              187 |
//! |  8 MHz  |        64 |    8 µs |              187 |
//! | 16 MHz  |       128 |    8 µs |              187 |
//! | 20 MHz  |       128 |  6.4 µs |              234 |
//! | 32 MHz  |       256 |    8 µs |              187 |

use crate::consts::{FS20_LONGEST_PULSE_US, FS20_MAX_OVERFLOW, FS20_PRESCALERS};

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// Returns the smallest prescaler from [`FS20_PRESCALERS`] that keeps a
/// 1500 µs pulse below 255 ticks at `f_cpu` Hz, or `None` if the clock is
/// too fast for every candidate.
pub const fn select_prescaler(f_cpu: u32) -> Option<u32> {
    let mut i = 0;
    while i < FS20_PRESCALERS.len() {
        let prescaler = FS20_PRESCALERS[i];
        if f_cpu / 1_000_000 * FS20_LONGEST_PULSE_US / prescaler < FS20_MAX_OVERFLOW {
            return Some(prescaler);
        }
        i += 1;
    }
    None
}

/// Tick/µs conversion for one CPU clock and its selected prescaler.
///
/// Build it in a `const` so an unsupported clock fails the build:
///
/// ```rust
/// use ask868::timer::TimingBase;
///
/// const TIMING: TimingBase = TimingBase::new(16_000_000);
/// assert_eq!(TIMING.prescaler(), 128);
/// assert_eq!(TIMING.us_to_ticks(1500), 187);
/// ```
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TimingBase {
    f_cpu: u32,
    prescaler: u32,
}

impl TimingBase {
    /// Selects the prescaler for `f_cpu` Hz.
    ///
    /// # Panics
    /// If no candidate prescaler fits. In a `const` context this is a
    /// compile error.
    pub const fn new(f_cpu: u32) -> Self {
        match select_prescaler(f_cpu) {
            Some(prescaler) => Self { f_cpu, prescaler },
            None => panic!("F_CPU too large for the 8-bit pulse timer"),
        }
    }

    /// CPU clock in Hz.
    pub const fn f_cpu(&self) -> u32 {
        self.f_cpu
    }

    /// Selected clock prescaler.
    pub const fn prescaler(&self) -> u32 {
        self.prescaler
    }

    /// Converts microseconds to counter ticks, rounding down. Durations
    /// longer than the counter can hold saturate at `u8::MAX`.
    pub const fn us_to_ticks(&self, us: u16) -> u8 {
        let ticks = self.f_cpu / 1_000_000 * us as u32 / self.prescaler;
        if ticks > u8::MAX as u32 {
            u8::MAX
        } else {
            ticks as u8
        }
    }

    /// Converts counter ticks to microseconds, rounding down.
    pub const fn ticks_to_us(&self, ticks: u8) -> u16 {
        (1_000_000 * self.prescaler as u64 * ticks as u64 / self.f_cpu as u64) as u16
    }

    /// Length of one tick in whole microseconds.
    pub const fn tick_us(&self) -> u16 {
        self.ticks_to_us(1)
    }
}

/// The 8-bit capture counter and its compare unit.
///
/// Implemented by the platform for whichever hardware timer drives the
/// receive path. Register access happens from both the mainloop (setup) and
/// interrupt context (snapshots, compare re-arming).
pub trait TickCounter {
    /// Current counter value.
    fn now(&mut self) -> u8;

    /// Overwrites the counter value.
    fn set_counter(&mut self, ticks: u8);

    /// Starts the counter with the given clock prescaler.
    fn set_prescaler(&mut self, prescaler: u32);

    /// Puts the counter in normal (free-running, no clear on compare) mode.
    fn set_free_running(&mut self);

    /// Loads the compare register.
    fn set_compare(&mut self, ticks: u8);

    /// Clears a pending compare-match flag.
    ///
    /// The flag latches on every match even while the interrupt is disabled,
    /// so it has to be cleared before the interrupt is enabled again.
    fn clear_compare_flag(&mut self);

    /// Enables or disables the compare-match interrupt.
    fn enable_compare_interrupt(&mut self, enable: bool);

    /// Enables or disables the overflow interrupt.
    fn enable_overflow_interrupt(&mut self, enable: bool);
}

/// Configures `counter` for edge capture: counter cleared, prescaler from
/// `timing`, free-running, compare flag cleared, compare interrupt on,
/// overflow interrupt off.
pub fn start_capture_timer<C: TickCounter>(counter: &mut C, timing: &TimingBase) {
    counter.set_counter(0);
    counter.set_prescaler(timing.prescaler());
    counter.set_free_running();
    counter.clear_compare_flag();
    counter.enable_compare_interrupt(true);
    counter.enable_overflow_interrupt(false);
    debug!(
        "fs20: prescaler {}, tick {} us",
        timing.prescaler(),
        timing.tick_us()
    );
}

#[cfg(test)]
pub(crate) mod testing {
    use super::TickCounter;

    /// A simulated capture counter.
    #[derive(Debug, Default)]
    pub(crate) struct SimCounter {
        pub(crate) count: u8,
        pub(crate) compare: u8,
        pub(crate) prescaler: u32,
        pub(crate) free_running: bool,
        pub(crate) compare_irq: bool,
        pub(crate) compare_pending: bool,
        pub(crate) overflow_irq: bool,
    }

    impl SimCounter {
        /// Advances the counter by one tick and reports whether a compare
        /// interrupt fires on that tick.
        ///
        /// Like an AVR timer, a match latches the pending flag whether or not
        /// the interrupt is enabled; taking the interrupt clears it.
        pub(crate) fn step(&mut self) -> bool {
            self.count = self.count.wrapping_add(1);
            if self.count == self.compare {
                self.compare_pending = true;
            }
            if self.compare_irq && self.compare_pending {
                self.compare_pending = false;
                return true;
            }
            false
        }
    }

    impl TickCounter for SimCounter {
        fn now(&mut self) -> u8 {
            self.count
        }

        fn set_counter(&mut self, ticks: u8) {
            self.count = ticks;
        }

        fn set_prescaler(&mut self, prescaler: u32) {
            self.prescaler = prescaler;
        }

        fn set_free_running(&mut self) {
            self.free_running = true;
        }

        fn set_compare(&mut self, ticks: u8) {
            self.compare = ticks;
        }

        fn clear_compare_flag(&mut self) {
            self.compare_pending = false;
        }

        fn enable_compare_interrupt(&mut self, enable: bool) {
            self.compare_irq = enable;
        }

        fn enable_overflow_interrupt(&mut self, enable: bool) {
            self.overflow_irq = enable;
        }
    }
}
