//! HID idle-rate timer.
//!
//! The host may ask (SET_IDLE) for the current report to be repeated
//! every `rate × 4 ms` even when nothing changed. Rate 0 means "only on
//! change". [`IdleTimer::tick`] is driven by a fixed 4 ms ticker and
//! says when a repeat is due.

use crate::config::IDLE_TICK_MS;

/// Idle rate units in milliseconds, fixed by the HID class definition.
const IDLE_UNIT_MS: u32 = 4;

const _: () = assert!(IDLE_TICK_MS == IDLE_UNIT_MS as u64, "one timer tick must be one idle unit");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleTimer {
    rate: u8,
    counter: u8,
}

impl IdleTimer {
    /// Timer with repeats disabled.
    pub const fn new() -> Self {
        Self {
            rate: 0,
            counter: 0,
        }
    }

    /// Current rate in 4 ms units.
    pub fn rate(&self) -> u8 {
        self.rate
    }

    /// Set a new rate and restart the countdown.
    pub fn set_rate(&mut self, rate: u8) {
        self.rate = rate;
        self.counter = rate;
    }

    /// Restart the countdown, e.g. after a report went out for another
    /// reason.
    pub fn restart(&mut self) {
        self.counter = self.rate;
    }

    /// Advance by one tick. Returns `true` when a repeat is due; the
    /// counter is then reloaded.
    pub fn tick(&mut self) -> bool {
        if self.rate == 0 {
            return false;
        }
        self.counter = self.counter.saturating_sub(1);
        if self.counter == 0 {
            self.counter = self.rate;
            true
        } else {
            false
        }
    }
}

impl Default for IdleTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert the USB stack's millisecond idle duration into rate units.
/// `u32::MAX` is the stack's encoding of "indefinite" (rate 0).
pub fn rate_from_ms(duration_ms: u32) -> u8 {
    if duration_ms == u32::MAX {
        return 0;
    }
    u8::try_from(duration_ms / IDLE_UNIT_MS).unwrap_or(u8::MAX)
}

/// Convert rate units back into milliseconds.
pub fn ms_from_rate(rate: u8) -> u32 {
    u32::from(rate) * IDLE_UNIT_MS
}
