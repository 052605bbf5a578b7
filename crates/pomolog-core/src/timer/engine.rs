//! Session state machine.
//!
//! The engine owns the current mode, the countdown and the cycle counter.
//! It does not use internal threads or timers: the caller invokes `tick()`
//! once per second while the engine is running.
//!
//! ## State Transitions
//!
//! ```text
//! Work ──finish──▶ ShortBreak | LongBreak ──finish──▶ Work
//!   each crossed with Running / Paused
//! ```
//!
//! Ending an interval is split in two so that the caller can collect a memo
//! and write the log entry in between:
//!
//! ```ignore
//! if let TickOutcome::Finished(interval) = engine.tick() {
//!     // engine is paused here; prompt, log ...
//!     engine.advance();
//! }
//! ```

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::countdown::Countdown;
use super::mode::Mode;
use crate::events::{Event, Snapshot};
use crate::record::FinishedInterval;
use crate::settings::{Settings, SettingsField};

/// Result of a single one-second tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine was paused; nothing changed.
    Ignored,
    Counted { remaining_secs: u64 },
    /// The countdown reached zero. The engine is now paused and waiting for
    /// `advance()`.
    Finished(FinishedInterval),
}

pub struct SessionEngine {
    settings: Settings,
    mode: Mode,
    countdown: Countdown,
    completed_work_sessions: u32,
    mode_started_at: DateTime<Local>,
    session_started_at: Option<DateTime<Local>>,
    /// Bumped on every `start()`; tells one running stretch from the next.
    run_id: u64,
    clock: Arc<dyn Clock>,
}

impl SessionEngine {
    /// Create a paused engine in Work mode with a full countdown.
    pub fn new(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let settings = settings.sanitized();
        let countdown = Countdown::new(settings.duration_secs(Mode::Work));
        let mode_started_at = clock.now();
        Self {
            settings,
            mode: Mode::Work,
            countdown,
            completed_work_sessions: 0,
            mode_started_at,
            session_started_at: None,
            run_id: 0,
            clock,
        }
    }

    pub fn with_system_clock(settings: Settings) -> Self {
        Self::new(settings, Arc::new(SystemClock))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_armed()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    /// Full length of the current mode.
    pub fn total_secs(&self) -> u64 {
        self.settings.duration_secs(self.mode)
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn mode_started_at(&self) -> DateTime<Local> {
        self.mode_started_at
    }

    pub fn session_started_at(&self) -> Option<DateTime<Local>> {
        self.session_started_at
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn snapshot(&self, task: &str) -> Snapshot {
        Snapshot {
            mode: self.mode,
            running: self.is_running(),
            remaining_secs: self.remaining_secs(),
            total_secs: self.total_secs(),
            completed_work_sessions: self.completed_work_sessions,
            task: task.to_string(),
            session_started_at: self.session_started_at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the countdown. Returns `None` if already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        let now = self.clock.now();
        self.countdown.arm();
        self.run_id += 1;
        self.mode_started_at = now;
        self.session_started_at.get_or_insert(now);
        debug!(mode = %self.mode, remaining = self.remaining_secs(), "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs(),
            at: now,
        })
    }

    /// Disarm the countdown. Returns `None` if already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.countdown.disarm();
        debug!(mode = %self.mode, remaining = self.remaining_secs(), "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs(),
            at: self.clock.now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero finishes the interval exactly once: the engine pauses
    /// itself, so later ticks are `Ignored` until `advance()` and `start()`.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(remaining_secs) = self.countdown.tick() else {
            return TickOutcome::Ignored;
        };
        if remaining_secs == 0 {
            return TickOutcome::Finished(self.finish(false));
        }
        TickOutcome::Counted { remaining_secs }
    }

    /// End the current interval early, running or not.
    ///
    /// Like a natural finish, the caller must follow up with `advance()`.
    pub fn skip(&mut self) -> FinishedInterval {
        self.finish(true)
    }

    /// Back to a full countdown of the current mode with no cycles done.
    /// Nothing is logged.
    pub fn reset(&mut self) -> Event {
        self.pause();
        let now = self.clock.now();
        self.completed_work_sessions = 0;
        self.session_started_at = None;
        self.countdown.reload(self.total_secs());
        self.mode_started_at = now;
        debug!(mode = %self.mode, "session reset");
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs(),
            at: now,
        }
    }

    /// Move to the mode that follows the interval just finished.
    ///
    /// Work is followed by a long break every `cycles_before_long` work
    /// intervals and by a short break otherwise; any break is followed by
    /// Work. Starts the new interval straight away when `auto_start` is on.
    pub fn advance(&mut self) -> Vec<Event> {
        let from = self.mode;
        let to = self.next_mode();
        self.enter_mode(to);

        let mut events = vec![Event::ModeAdvanced {
            from,
            to,
            completed_work_sessions: self.completed_work_sessions,
            remaining_secs: self.remaining_secs(),
        }];
        debug!(%from, %to, cycles = self.completed_work_sessions, "mode advanced");

        if self.settings.auto_start {
            events.extend(self.start());
        }
        events
    }

    /// Manually switch to `mode`, pausing and reloading the countdown.
    pub fn select_mode(&mut self, mode: Mode) -> Event {
        self.pause();
        self.enter_mode(mode);
        Event::ModeSelected {
            mode,
            remaining_secs: self.remaining_secs(),
        }
    }

    /// Replace the settings. Takes effect at the next mode change, except
    /// that the remaining time never exceeds the new full duration.
    pub fn update_settings(&mut self, settings: Settings) -> Event {
        self.settings = settings.sanitized();
        self.countdown.clamp_to(self.total_secs());
        Event::SettingsChanged {
            settings: self.settings.clone(),
        }
    }

    /// Apply raw input to one settings field. `None` if it was rejected.
    pub fn apply_setting(&mut self, field: SettingsField, raw: &str) -> Option<Event> {
        let mut settings = self.settings.clone();
        settings
            .apply_input(field, raw)
            .then(|| self.update_settings(settings))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, skipped: bool) -> FinishedInterval {
        self.pause();
        if self.mode == Mode::Work {
            self.completed_work_sessions += 1;
        }
        let interval = FinishedInterval {
            mode: self.mode,
            started_at: self.mode_started_at,
            ended_at: self.clock.now(),
            skipped,
        };
        debug!(
            mode = %interval.mode,
            skipped,
            duration = interval.duration_secs(),
            "interval finished"
        );
        interval
    }

    fn next_mode(&self) -> Mode {
        match self.mode {
            Mode::Work => {
                if self.completed_work_sessions % self.settings.cycles_before_long() == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Work,
        }
    }

    fn enter_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.countdown.reload(self.settings.duration_secs(mode));
        self.mode_started_at = self.clock.now();
    }
}
