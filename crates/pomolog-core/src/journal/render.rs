//! Markdown rendering for log entries.
//!
//! The output is the on-disk format shared with existing logs, so headings,
//! bullet syntax and the trailing rule must stay byte-for-byte stable.

use chrono::{DateTime, Local, NaiveDate};

use crate::record::SessionRecord;

pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FMT: &str = "%Y-%m-%d";
pub const UNNAMED_TASK: &str = "(unnamed)";

pub fn day_title(date: NaiveDate) -> String {
    format!("# Pomodoro Log — {}\n\n", date.format(DATE_FMT))
}

pub fn task_title(task: &str) -> String {
    format!("# Task Log — {task}\n\n")
}

pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format(TIMESTAMP_FMT).to_string()
}

pub fn format_duration(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Render one record as a level-2 block ending in a horizontal rule.
pub fn render_entry(record: &SessionRecord) -> String {
    let start = format_timestamp(&record.started_at);
    let end = format_timestamp(&record.ended_at);
    let duration = format_duration(record.duration_secs);
    let task = if record.task.is_empty() {
        UNNAMED_TASK
    } else {
        record.task.as_str()
    };

    let mut out = format!("## {} • {start} → {end} ({duration})\n\n", record.mode.label());
    out.push_str(&kv("Task", task));
    out.push_str(&kv("Start", &start));
    out.push_str(&kv("End", &end));
    out.push_str(&kv("Duration", &duration));
    out.push('\n');

    if let Some(memo) = record.memo.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        out.push_str("#### Memo\n\n");
        out.push_str(memo);
        out.push_str("\n\n");
    }

    if record.mode.is_break() {
        if let Some(advisory) = &record.advisory {
            out.push_str(&bullet_section("Do", &advisory.do_lines));
            out.push_str(&bullet_section("Don't", &advisory.dont_lines));
        }
    }

    out.push_str("---\n\n");
    out
}

fn kv(key: &str, value: &str) -> String {
    format!("- **{key}**: {value}\n")
}

fn bullet_section(heading: &str, lines: &[&str]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = format!("#### {heading}\n\n");
    for line in lines {
        out.push_str(&format!("- {line}\n"));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::classify;
    use crate::timer::Mode;
    use chrono::{Duration, TimeZone};

    fn record(mode: Mode, task: &str, memo: Option<&str>) -> SessionRecord {
        let start = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        SessionRecord {
            mode,
            started_at: start,
            ended_at: start + Duration::seconds(25 * 60 + 3),
            duration_secs: 25 * 60 + 3,
            task: task.to_string(),
            memo: memo.map(str::to_string),
            advisory: mode.is_break().then(|| classify(memo.unwrap_or(""))),
        }
    }

    #[test]
    fn work_entry_layout() {
        let out = render_entry(&record(Mode::Work, "Essay", Some("Outlined chapter 2")));
        let expected = "\
## Work • 2024-05-01 09:00:00 → 2024-05-01 09:25:03 (25m 3s)

- **Task**: Essay
- **Start**: 2024-05-01 09:00:00
- **End**: 2024-05-01 09:25:03
- **Duration**: 25m 3s

#### Memo

Outlined chapter 2

---

";
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_task_uses_placeholder_and_blank_memo_is_omitted() {
        let out = render_entry(&record(Mode::Work, "", Some("   ")));
        assert!(out.contains("- **Task**: (unnamed)\n"));
        assert!(!out.contains("#### Memo"));
        assert!(!out.contains("#### Do"));
    }

    #[test]
    fn break_entry_renders_only_non_empty_sections() {
        let out = render_entry(&record(Mode::ShortBreak, "", Some("went for a walk")));
        assert!(out.starts_with("## Short Break • "));
        assert!(out.contains("#### Do\n\n- Repeat quick movement"));
        assert!(!out.contains("#### Don't"));
        assert!(out.ends_with("\n\n---\n\n"));
    }

    #[test]
    fn break_with_both_sections_orders_do_first() {
        let out = render_entry(&record(Mode::LongBreak, "", Some("yoga then reddit")));
        let do_at = out.find("#### Do\n").unwrap();
        let dont_at = out.find("#### Don't\n").unwrap();
        assert!(do_at < dont_at);
    }

    #[test]
    fn titles() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(day_title(date), "# Pomodoro Log — 2024-05-01\n\n");
        assert_eq!(task_title("Essay"), "# Task Log — Essay\n\n");
    }
}
