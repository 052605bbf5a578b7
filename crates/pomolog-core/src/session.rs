//! A live timing session: the engine plus its collaborators.
//!
//! `Session` runs the completion path shared by natural finishes and
//! skips: collect a memo (natural finishes only), build the record with
//! break advice, append it to the journal, then advance the mode. A failed
//! append becomes a `Notice` event; the mode still advances.

use chrono::NaiveDate;
use tracing::warn;

use crate::cue::{Cue, CueKind};
use crate::error::ExportError;
use crate::events::{Event, Snapshot};
use crate::export::{export_logs, ExportOutcome, ExportTarget};
use crate::journal::Journal;
use crate::memo::{self, MemoPrompt};
use crate::record::{FinishedInterval, SessionRecord};
use crate::settings::{Settings, SettingsField};
use crate::timer::{Mode, SessionEngine, TickOutcome};

pub struct Session {
    engine: SessionEngine,
    task: String,
    journal: Journal,
    prompt: Box<dyn MemoPrompt>,
    cue: Box<dyn Cue>,
}

impl Session {
    pub fn new(
        engine: SessionEngine,
        journal: Journal,
        prompt: Box<dyn MemoPrompt>,
        cue: Box<dyn Cue>,
    ) -> Self {
        Self {
            engine,
            task: String::new(),
            journal,
            prompt,
            cue,
        }
    }

    pub fn with_task(mut self, task: &str) -> Self {
        self.task = task.trim().to_string();
        self
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot(&self.task)
    }

    pub fn start(&mut self) -> Vec<Event> {
        let events: Vec<Event> = self.engine.start().into_iter().collect();
        self.play_cues(&events);
        events
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.engine.pause().into_iter().collect()
    }

    pub fn toggle(&mut self) -> Vec<Event> {
        let events: Vec<Event> = self.engine.toggle().into_iter().collect();
        self.play_cues(&events);
        events
    }

    pub fn reset(&mut self) -> Vec<Event> {
        vec![self.engine.reset()]
    }

    pub fn select_mode(&mut self, mode: Mode) -> Vec<Event> {
        vec![self.engine.select_mode(mode)]
    }

    pub fn set_task(&mut self, task: &str) -> Vec<Event> {
        self.task = task.trim().to_string();
        vec![Event::TaskChanged {
            task: self.task.clone(),
        }]
    }

    /// Rejected input is not an error: the event carries the settings that
    /// are actually in effect.
    pub fn apply_setting(&mut self, field: SettingsField, raw: &str) -> Vec<Event> {
        let event = self
            .engine
            .apply_setting(field, raw)
            .unwrap_or_else(|| Event::SettingsChanged {
                settings: self.engine.settings().clone(),
            });
        vec![event]
    }

    pub fn update_settings(&mut self, settings: Settings) -> Vec<Event> {
        vec![self.engine.update_settings(settings)]
    }

    /// `Some(run_id)` while the countdown is armed.
    pub fn running_run(&self) -> Option<u64> {
        self.engine.is_running().then(|| self.engine.run_id())
    }

    /// One second has passed.
    pub async fn tick(&mut self) -> Vec<Event> {
        match self.count_down() {
            Ok(events) => events,
            Err(interval) => self.complete(interval).await,
        }
    }

    /// The synchronous half of `tick`. A finished interval comes back as
    /// `Err` with the engine paused; pass it to `complete`.
    pub fn count_down(&mut self) -> Result<Vec<Event>, FinishedInterval> {
        match self.engine.tick() {
            TickOutcome::Ignored => Ok(Vec::new()),
            TickOutcome::Counted { remaining_secs } => Ok(vec![Event::Tick {
                mode: self.engine.mode(),
                remaining_secs,
            }]),
            TickOutcome::Finished(interval) => Err(interval),
        }
    }

    /// End the current interval now. Always logs exactly one entry and
    /// always advances the mode.
    pub async fn skip(&mut self) -> Vec<Event> {
        let interval = self.engine.skip();
        self.complete(interval).await
    }

    /// Export the day log for `date` together with the current task's log.
    pub fn export(
        &self,
        date: NaiveDate,
        target: &mut dyn ExportTarget,
    ) -> Result<ExportOutcome, ExportError> {
        let task = (!self.task.is_empty()).then_some(self.task.as_str());
        export_logs(&self.journal, date, task, target)
    }

    /// Memo, journal entry, then the next mode.
    pub async fn complete(&mut self, interval: FinishedInterval) -> Vec<Event> {
        let mut events = vec![Event::IntervalFinished {
            mode: interval.mode,
            skipped: interval.skipped,
            duration_secs: interval.duration_secs(),
            at: interval.ended_at,
        }];
        self.play_cues(&events);

        let memo = if interval.skipped {
            None
        } else {
            memo::collect(self.prompt.as_mut(), interval.mode).await
        };

        let record = SessionRecord::new(&interval, &self.task, memo);
        match self.journal.append(&record) {
            Ok(outcome) => events.push(Event::EntryLogged {
                day_log: Some(outcome.day_log),
                task_log: outcome.task_log,
            }),
            Err(e) => {
                warn!(error = %e, "failed to append journal entry");
                if e.day_log.is_some() || e.task_log.is_some() {
                    events.push(Event::EntryLogged {
                        day_log: e.day_log.clone(),
                        task_log: e.task_log.clone(),
                    });
                }
                events.push(Event::Notice {
                    message: format!("Could not write log entry: {e}"),
                });
            }
        }

        let advanced = self.engine.advance();
        self.play_cues(&advanced);
        events.extend(advanced);
        events
    }

    fn play_cues(&self, events: &[Event]) {
        if !self.engine.settings().sound_enabled {
            return;
        }
        for event in events {
            match event {
                Event::TimerStarted { mode, .. } => self.cue.play(CueKind::IntervalStarted(*mode)),
                Event::IntervalFinished {
                    mode,
                    skipped: false,
                    ..
                } => self.cue.play(CueKind::IntervalFinished(*mode)),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::SilentCue;
    use crate::journal::LogLayout;
    use crate::memo::NoPrompt;
    use crate::timer::{Clock, ManualClock};
    use async_trait::async_trait;
    use chrono::{Local, TimeZone};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct Scripted(VecDeque<Option<String>>, Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl MemoPrompt for Scripted {
        async fn prompt_memo(&mut self, title: &str, _placeholder: &str) -> Option<String> {
            self.1.lock().unwrap().push(title.to_string());
            self.0.pop_front().flatten()
        }
    }

    struct Recorder(Arc<Mutex<Vec<CueKind>>>);

    impl Cue for Recorder {
        fn play(&self, cue: CueKind) {
            self.0.lock().unwrap().push(cue);
        }
    }

    fn session(dir: &TempDir, settings: Settings, prompt: Box<dyn MemoPrompt>) -> (Session, ManualClock) {
        let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let engine = SessionEngine::new(settings, Arc::new(clock.clone()));
        let journal = Journal::new(LogLayout::new(dir.path()));
        (Session::new(engine, journal, prompt, Box::new(SilentCue)), clock)
    }

    fn one_minute() -> Settings {
        Settings {
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn natural_finish_prompts_and_logs_memo() {
        let dir = TempDir::new().unwrap();
        let titles = Arc::new(Mutex::new(Vec::new()));
        let prompt = Scripted(VecDeque::from([Some("wrote intro".to_string())]), titles.clone());
        let (mut s, clock) = session(&dir, one_minute(), Box::new(prompt));
        s.set_task("Essay");

        s.start();
        let mut events = Vec::new();
        for _ in 0..60 {
            clock.advance_secs(1);
            events.extend(s.tick().await);
        }

        assert_eq!(titles.lock().unwrap().len(), 1);
        assert!(events.iter().any(|e| matches!(e, Event::EntryLogged { task_log: Some(_), .. })));
        assert_eq!(s.engine().mode(), Mode::ShortBreak);
        let day = s.journal().read_day(clock.now().date_naive()).unwrap().unwrap();
        assert!(day.contains("#### Memo\n\nwrote intro\n"));
        let task = s.journal().read_task("Essay").unwrap().unwrap();
        assert!(task.starts_with("# Task Log — Essay"));
    }

    #[tokio::test]
    async fn skip_never_prompts() {
        let dir = TempDir::new().unwrap();
        let titles = Arc::new(Mutex::new(Vec::new()));
        let prompt = Scripted(VecDeque::new(), titles.clone());
        let (mut s, clock) = session(&dir, Settings::default(), Box::new(prompt));

        s.start();
        clock.advance_secs(30);
        let events = s.skip().await;

        assert!(titles.lock().unwrap().is_empty());
        assert!(matches!(
            events.first(),
            Some(Event::IntervalFinished {
                skipped: true,
                duration_secs: 30,
                ..
            })
        ));
        assert_eq!(s.engine().mode(), Mode::ShortBreak);
        assert!(!s.is_running());
    }

    #[tokio::test]
    async fn skipped_break_logs_neutral_advice() {
        let dir = TempDir::new().unwrap();
        let (mut s, clock) = session(&dir, Settings::default(), Box::new(NoPrompt));
        s.skip().await;
        s.skip().await;

        let day = s.journal().read_day(clock.now().date_naive()).unwrap().unwrap();
        assert!(day.contains("## Short Break • "));
        assert!(day.contains("#### Do\n\n- Keep break short"));
        assert_eq!(s.engine().mode(), Mode::Work);
    }

    #[tokio::test]
    async fn reset_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut s, clock) = session(&dir, Settings::default(), Box::new(NoPrompt));
        s.start();
        clock.advance_secs(10);
        s.tick().await;
        s.reset();

        assert_eq!(s.journal().read_day(clock.now().date_naive()).unwrap(), None);
        assert_eq!(s.snapshot().remaining_secs, 25 * 60);
    }

    #[tokio::test]
    async fn failed_append_still_advances() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let engine = SessionEngine::new(Settings::default(), Arc::new(clock));
        let journal = Journal::new(LogLayout::new(&blocker));
        let mut s = Session::new(engine, journal, Box::new(NoPrompt), Box::new(SilentCue));

        let events = s.skip().await;

        assert!(events.iter().any(|e| matches!(e, Event::Notice { .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::EntryLogged { .. })));
        assert_eq!(s.engine().mode(), Mode::ShortBreak);
    }

    #[tokio::test]
    async fn failed_task_log_still_reports_day_entry() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tasks"), "").unwrap();
        let (mut s, _clock) = session(&dir, Settings::default(), Box::new(NoPrompt));
        s.set_task("Essay");

        let events = s.skip().await;

        let logged = events.iter().find_map(|e| match e {
            Event::EntryLogged { day_log, task_log } => Some((day_log.clone(), task_log.clone())),
            _ => None,
        });
        let (day_log, task_log) = logged.unwrap();
        assert!(day_log.unwrap().exists());
        assert_eq!(task_log, None);
        assert!(events.iter().any(|e| matches!(e, Event::Notice { .. })));
        assert_eq!(s.engine().mode(), Mode::ShortBreak);
    }

    #[tokio::test]
    async fn cues_follow_sound_setting() {
        let dir = TempDir::new().unwrap();
        let played = Arc::new(Mutex::new(Vec::new()));
        let (mut s, clock) = session(&dir, one_minute(), Box::new(NoPrompt));
        s.cue = Box::new(Recorder(played.clone()));

        s.start();
        for _ in 0..60 {
            clock.advance_secs(1);
            s.tick().await;
        }
        assert_eq!(
            *played.lock().unwrap(),
            vec![
                CueKind::IntervalStarted(Mode::Work),
                CueKind::IntervalFinished(Mode::Work)
            ]
        );

        s.apply_setting(SettingsField::SoundEnabled, "off");
        s.start();
        assert_eq!(played.lock().unwrap().len(), 2);
    }

    #[test]
    fn invalid_setting_echoes_current_value() {
        let dir = TempDir::new().unwrap();
        let (mut s, _) = session(&dir, Settings::default(), Box::new(NoPrompt));
        let events = s.apply_setting(SettingsField::ShortBreakMinutes, "lots");
        match &events[..] {
            [Event::SettingsChanged { settings }] => assert_eq!(settings.short_break_minutes, 5),
            other => panic!("unexpected events: {other:?}"),
        }
    }
}
