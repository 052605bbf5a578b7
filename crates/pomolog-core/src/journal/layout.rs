use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::render::DATE_FMT;

const TASKS_DIR: &str = "tasks";
const MAX_TASK_FILE_CHARS: usize = 80;

/// Where the day and task logs live.
///
/// ```text
/// <root>/Pomodoro_2024-05-01.md
/// <root>/tasks/<sanitized task>.md
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLayout {
    root: PathBuf,
}

impl LogLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join(TASKS_DIR)
    }

    pub fn day_log(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("Pomodoro_{}.md", date.format(DATE_FMT)))
    }

    /// `None` for a blank task name.
    pub fn task_log(&self, task: &str) -> Option<PathBuf> {
        let name = sanitize_task_name(task);
        if name.is_empty() {
            return None;
        }
        Some(self.tasks_dir().join(format!("{name}.md")))
    }
}

fn is_path_hostile(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Turn a task name into a file stem.
///
/// Runs of path-hostile characters become a single `-`, whitespace runs
/// become a single space, and the result is cut to 80 characters.
pub fn sanitize_task_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_hostile = false;
    let mut prev_space = false;

    for c in name.trim().chars() {
        if is_path_hostile(c) && !c.is_whitespace() {
            if !prev_hostile {
                out.push('-');
            }
            prev_hostile = true;
            prev_space = false;
        } else if c.is_whitespace() {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
            prev_hostile = false;
        } else {
            out.push(c);
            prev_hostile = false;
            prev_space = false;
        }
    }

    out.trim()
        .chars()
        .take(MAX_TASK_FILE_CHARS)
        .collect()
}
