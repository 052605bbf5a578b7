//! # Pomolog Core Library
//!
//! This library provides the core logic for pomolog, a Pomodoro timer that
//! keeps a markdown journal of every interval. The `pomolog` CLI is a thin
//! front-end over it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A state machine cycling Work / Short Break / Long Break
//!   that requires the caller to invoke `tick()` once per second
//! - **Session**: The engine plus memo prompt, journal and sound cue; runs the
//!   completion path (memo, log entry, next mode)
//! - **Runtime**: A tokio actor owning the session, fed by a countdown driver
//! - **Journal**: Append-only day and task logs in markdown
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core timer state machine
//! - [`Session`]: Completion path and collaborators
//! - [`Journal`]: Markdown log writer and reader
//! - [`Config`]: Application configuration management

pub mod advisory;
pub mod cue;
pub mod error;
pub mod events;
pub mod export;
pub mod journal;
pub mod memo;
pub mod record;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod storage;
pub mod timer;

pub use advisory::{classify, Advisory};
pub use cue::{Cue, CueKind, SilentCue};
pub use error::{AppendError, ConfigError, CoreError, ExportError, JournalError};
pub use events::{Event, Snapshot};
pub use export::{export_logs, ExportOutcome, ExportTarget, FileExportTarget};
pub use journal::{Journal, LogLayout};
pub use memo::{MemoPrompt, NoPrompt};
pub use record::{FinishedInterval, SessionRecord};
pub use runtime::{Command, Runtime, SessionHandle};
pub use session::Session;
pub use settings::{Settings, SettingsField};
pub use storage::{data_dir, Config};
pub use timer::{Clock, ManualClock, Mode, SessionEngine, SystemClock, TickOutcome};
