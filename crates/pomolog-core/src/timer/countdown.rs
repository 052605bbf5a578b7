/// Remaining-seconds counter for the active interval.
///
/// Only two things change `remaining`: a one-second `tick()` while armed,
/// or a full `reload()` when the mode changes or the session resets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
    armed: bool,
}

impl Countdown {
    pub fn new(total_secs: u64) -> Self {
        Self {
            remaining_secs: total_secs,
            armed: false,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Reassign the full duration. Arming state is left alone.
    pub fn reload(&mut self, total_secs: u64) {
        self.remaining_secs = total_secs;
    }

    /// Lower `remaining` to `max_secs` if it is above it.
    pub fn clamp_to(&mut self, max_secs: u64) {
        self.remaining_secs = self.remaining_secs.min(max_secs);
    }

    /// Decrement by one second, floored at zero.
    ///
    /// Returns `None` when disarmed (nothing happened), otherwise the new
    /// remaining value.
    pub fn tick(&mut self) -> Option<u64> {
        if !self.armed {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        Some(self.remaining_secs)
    }
}
