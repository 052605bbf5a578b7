//! Day + task rollup export.
//!
//! Reads today's day log and the current task log back from the journal,
//! joins them under a labelled separator, and hands the text to a save
//! destination chosen by the front-end.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ExportError, JournalError};
use crate::journal::{sanitize_task_name, Journal, DATE_FMT};

/// Front-end side of an export: where to save, and how.
pub trait ExportTarget: Send {
    /// `None` when the user backs out.
    fn choose_save_destination(&mut self, default_file_name: &str) -> Option<PathBuf>;

    fn write_text(&mut self, path: &Path, content: &str) -> std::io::Result<()>;
}

/// Writes to a fixed path, or to `dir/<default name>` when none is given.
#[derive(Debug, Clone)]
pub struct FileExportTarget {
    destination: Option<PathBuf>,
    dir: PathBuf,
}

impl FileExportTarget {
    pub fn new(destination: Option<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            destination,
            dir: dir.into(),
        }
    }
}

impl ExportTarget for FileExportTarget {
    fn choose_save_destination(&mut self, default_file_name: &str) -> Option<PathBuf> {
        Some(
            self.destination
                .clone()
                .unwrap_or_else(|| self.dir.join(default_file_name)),
        )
    }

    fn write_text(&mut self, path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    NothingToExport,
    Cancelled,
    Written(PathBuf),
}

pub fn task_rollup_heading(task: &str) -> String {
    format!("# Task Rollup — {task}\n\n")
}

/// Concatenate the day log for `date` and the log for `task`.
///
/// `None` when neither exists.
pub fn rollup(
    journal: &Journal,
    date: NaiveDate,
    task: Option<&str>,
) -> Result<Option<String>, JournalError> {
    let task = task.map(str::trim).filter(|t| !t.is_empty());
    let day = journal.read_day(date)?;
    let task_text = match task {
        Some(name) => journal.read_task(name)?.map(|text| (name, text)),
        None => None,
    };

    if day.is_none() && task_text.is_none() {
        return Ok(None);
    }

    let mut out = day.unwrap_or_default();
    if let Some((name, text)) = task_text {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&task_rollup_heading(name));
        out.push_str(&text);
    }
    Ok(Some(out))
}

pub fn default_file_name(date: NaiveDate, task: Option<&str>) -> String {
    let date = date.format(DATE_FMT);
    match task.map(sanitize_task_name).filter(|t| !t.is_empty()) {
        Some(task) => format!("Pomodoro_{date}_{task}.md"),
        None => format!("Pomodoro_{date}.md"),
    }
}

pub fn export_logs(
    journal: &Journal,
    date: NaiveDate,
    task: Option<&str>,
    target: &mut dyn ExportTarget,
) -> Result<ExportOutcome, ExportError> {
    let Some(content) = rollup(journal, date, task)? else {
        return Ok(ExportOutcome::NothingToExport);
    };
    let Some(path) = target.choose_save_destination(&default_file_name(date, task)) else {
        return Ok(ExportOutcome::Cancelled);
    };
    target
        .write_text(&path, &content)
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "logs exported");
    Ok(ExportOutcome::Written(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::LogLayout;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn seeded(dir: &TempDir, day: Option<&str>, task: Option<(&str, &str)>) -> Journal {
        let journal = Journal::new(LogLayout::new(dir.path()));
        if let Some(text) = day {
            fs::write(journal.layout().day_log(date()), text).unwrap();
        }
        if let Some((name, text)) = task {
            let path = journal.layout().task_log(name).unwrap();
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, text).unwrap();
        }
        journal
    }

    struct Refuse;

    impl ExportTarget for Refuse {
        fn choose_save_destination(&mut self, _default_file_name: &str) -> Option<PathBuf> {
            None
        }

        fn write_text(&mut self, _path: &Path, _content: &str) -> std::io::Result<()> {
            panic!("nothing should be written after a cancel");
        }
    }

    #[test]
    fn nothing_when_no_logs() {
        let dir = TempDir::new().unwrap();
        let journal = seeded(&dir, None, None);
        assert_eq!(rollup(&journal, date(), Some("Essay")).unwrap(), None);
        let mut target = FileExportTarget::new(None, dir.path());
        assert_eq!(
            export_logs(&journal, date(), Some("Essay"), &mut target).unwrap(),
            ExportOutcome::NothingToExport
        );
    }

    #[test]
    fn task_section_follows_day_section() {
        let dir = TempDir::new().unwrap();
        let journal = seeded(&dir, Some("DAY\n"), Some(("Essay", "TASK\n")));
        let text = rollup(&journal, date(), Some("Essay")).unwrap().unwrap();
        assert_eq!(text, "DAY\n\n# Task Rollup — Essay\n\nTASK\n");
    }

    #[test]
    fn task_only_rollup() {
        let dir = TempDir::new().unwrap();
        let journal = seeded(&dir, None, Some(("Essay", "TASK\n")));
        let text = rollup(&journal, date(), Some("Essay")).unwrap().unwrap();
        assert_eq!(text, "# Task Rollup — Essay\n\nTASK\n");
    }

    #[test]
    fn blank_task_is_ignored() {
        let dir = TempDir::new().unwrap();
        let journal = seeded(&dir, Some("DAY\n"), None);
        assert_eq!(rollup(&journal, date(), Some("  ")).unwrap().as_deref(), Some("DAY\n"));
    }

    #[test]
    fn writes_to_default_name() {
        let dir = TempDir::new().unwrap();
        let journal = seeded(&dir, Some("DAY\n"), None);
        let out_dir = dir.path().join("out");
        let mut target = FileExportTarget::new(None, &out_dir);

        let outcome = export_logs(&journal, date(), None, &mut target).unwrap();

        let expected = out_dir.join("Pomodoro_2024-05-01.md");
        assert_eq!(outcome, ExportOutcome::Written(expected.clone()));
        assert_eq!(fs::read_to_string(expected).unwrap(), "DAY\n");
    }

    #[test]
    fn cancelled_destination_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let journal = seeded(&dir, Some("DAY\n"), None);
        assert_eq!(
            export_logs(&journal, date(), None, &mut Refuse).unwrap(),
            ExportOutcome::Cancelled
        );
    }

    #[test]
    fn default_name_includes_sanitized_task() {
        assert_eq!(
            default_file_name(date(), Some("a/b")),
            "Pomodoro_2024-05-01_a-b.md"
        );
        assert_eq!(default_file_name(date(), Some("")), "Pomodoro_2024-05-01.md");
    }
}
