//! Append-only markdown journal.
//!
//! Every finished interval is appended to the day log and, when a task name
//! is set, to that task's log. Files are opened, appended and closed per
//! write; the first write to an empty file puts a title line above the
//! first entry. Nothing is ever rewritten.

mod layout;
mod render;

pub use layout::{sanitize_task_name, LogLayout};
pub use render::{
    day_title, format_duration, format_timestamp, render_entry, task_title, DATE_FMT,
    TIMESTAMP_FMT, UNNAMED_TASK,
};

use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{AppendError, JournalError};
use crate::record::SessionRecord;

/// Paths written by a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub day_log: PathBuf,
    pub task_log: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Journal {
    layout: LogLayout,
}

impl Journal {
    pub fn new(layout: LogLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LogLayout {
        &self.layout
    }

    /// Append `record` to its day log and, if it has a task, its task log.
    ///
    /// Both writes are attempted even if the first fails. On error the first
    /// failure is returned along with whichever log was still written.
    pub fn append(&self, record: &SessionRecord) -> Result<AppendOutcome, AppendError> {
        let block = render_entry(record);
        let date = record.ended_at.date_naive();

        let day_log = self.layout.day_log(date);
        let day_result = append_with_title(&day_log, &day_title(date), &block);

        let task_log = if record.has_task() {
            self.layout.task_log(&record.task)
        } else {
            None
        };
        let task_result = match &task_log {
            Some(path) => append_with_title(path, &task_title(&record.task), &block),
            None => Ok(()),
        };

        let first_error = match (day_result, task_result) {
            (Ok(()), Ok(())) => None,
            (Err(e), task) => Some((e, None, task.ok().and(task_log.clone()))),
            (Ok(()), Err(e)) => Some((e, Some(day_log.clone()), None)),
        };
        if let Some((source, day_log, task_log)) = first_error {
            return Err(AppendError {
                day_log,
                task_log,
                source,
            });
        }
        info!(
            mode = %record.mode,
            day_log = %day_log.display(),
            task_log = ?task_log,
            "journal entry appended"
        );
        Ok(AppendOutcome { day_log, task_log })
    }

    /// Contents of the day log for `date`, if it exists and is not empty.
    pub fn read_day(&self, date: NaiveDate) -> Result<Option<String>, JournalError> {
        read_existing(&self.layout.day_log(date))
    }

    /// Contents of the task log for `task`, if it exists and is not empty.
    pub fn read_task(&self, task: &str) -> Result<Option<String>, JournalError> {
        match self.layout.task_log(task) {
            Some(path) => read_existing(&path),
            None => Ok(None),
        }
    }
}

fn append_with_title(path: &Path, title: &str, block: &str) -> Result<(), JournalError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| JournalError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let append_err = |source| JournalError::Append {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(append_err)?;
    let is_new = file.metadata().map_err(append_err)?.len() == 0;

    let mut text = String::with_capacity(title.len() + block.len());
    if is_new {
        text.push_str(title);
    }
    text.push_str(block);
    file.write_all(text.as_bytes()).map_err(append_err)
}

fn read_existing(path: &Path) -> Result<Option<String>, JournalError> {
    match fs::read_to_string(path) {
        Ok(text) if text.is_empty() => Ok(None),
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(JournalError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
