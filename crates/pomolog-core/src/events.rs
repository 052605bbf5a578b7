use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::settings::Settings;
use crate::timer::Mode;

/// Every state change in a session produces an Event.
/// Front-ends render from these; nothing else reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Local>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Local>,
    },
    Tick {
        mode: Mode,
        remaining_secs: u64,
    },
    /// An interval ended, naturally or by skip.
    IntervalFinished {
        mode: Mode,
        skipped: bool,
        duration_secs: u64,
        at: DateTime<Local>,
    },
    /// A log entry reached these files. Either may be missing when its
    /// write failed; a `Notice` follows in that case.
    EntryLogged {
        day_log: Option<PathBuf>,
        task_log: Option<PathBuf>,
    },
    ModeAdvanced {
        from: Mode,
        to: Mode,
        completed_work_sessions: u32,
        remaining_secs: u64,
    },
    ModeSelected {
        mode: Mode,
        remaining_secs: u64,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Local>,
    },
    TaskChanged {
        task: String,
    },
    SettingsChanged {
        settings: Settings,
    },
    /// Non-fatal problem the user should see, e.g. a failed log write.
    Notice {
        message: String,
    },
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub running: bool,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub completed_work_sessions: u32,
    pub task: String,
    pub session_started_at: Option<DateTime<Local>>,
}

impl Snapshot {
    /// `MM:SS` for the remaining time.
    pub fn clock_face(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// One-line status, e.g. `Work • Running • Cycle 2`.
    pub fn status_line(&self) -> String {
        let run = if self.running { "Running" } else { "Paused" };
        format!(
            "{} • {} • Cycle {}",
            self.mode, run, self.completed_work_sessions
        )
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
