use chrono::{DateTime, Local};

use crate::advisory::{classify, Advisory};
use crate::timer::Mode;

/// The boundaries of an interval that just ended.
///
/// Produced by the engine's completion path before any memo is collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedInterval {
    pub mode: Mode,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub skipped: bool,
}

impl FinishedInterval {
    /// Wall-clock length. A skipped interval is usually shorter than its
    /// nominal duration, so this is never derived from the countdown.
    pub fn duration_secs(&self) -> u64 {
        (self.ended_at - self.started_at).num_seconds().max(0) as u64
    }
}

/// Everything the journal needs to write one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub mode: Mode,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub duration_secs: u64,
    pub task: String,
    pub memo: Option<String>,
    /// Only present for breaks.
    pub advisory: Option<Advisory>,
}

impl SessionRecord {
    pub fn new(interval: &FinishedInterval, task: &str, memo: Option<String>) -> Self {
        let advisory = interval
            .mode
            .is_break()
            .then(|| classify(memo.as_deref().unwrap_or("")));
        Self {
            mode: interval.mode,
            started_at: interval.started_at,
            ended_at: interval.ended_at,
            duration_secs: interval.duration_secs(),
            task: task.trim().to_string(),
            memo,
            advisory,
        }
    }

    pub fn has_task(&self) -> bool {
        !self.task.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn interval(mode: Mode, secs: i64, skipped: bool) -> FinishedInterval {
        let start = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        FinishedInterval {
            mode,
            started_at: start,
            ended_at: start + Duration::seconds(secs),
            skipped,
        }
    }

    #[test]
    fn duration_is_wall_clock() {
        assert_eq!(interval(Mode::Work, 95, true).duration_secs(), 95);
    }

    #[test]
    fn work_records_have_no_advisory() {
        let r = SessionRecord::new(&interval(Mode::Work, 1500, false), "Essay", Some("x".into()));
        assert!(r.advisory.is_none());
    }

    #[test]
    fn skipped_break_gets_neutral_advisory() {
        let r = SessionRecord::new(&interval(Mode::ShortBreak, 10, true), "", None);
        let advisory = r.advisory.unwrap();
        assert_eq!(advisory.do_lines.len(), 2);
        assert!(advisory.dont_lines.is_empty());
    }

    #[test]
    fn task_is_trimmed() {
        let r = SessionRecord::new(&interval(Mode::Work, 1, false), "  Essay  ", None);
        assert_eq!(r.task, "Essay");
        assert!(r.has_task());
    }
}
