//! Session actor and countdown driver.
//!
//! One tokio task owns the [`Session`]; everything else talks to it through a
//! [`SessionHandle`]. While the session is running, a driver task posts a
//! `Tick` once per second into the same queue as user commands, so ticks
//! and commands are applied strictly one at a time.
//!
//! Each arming of the driver gets a fresh generation number. Ticks carry the
//! generation they were produced for and are dropped when it no longer
//! matches, which covers ticks already queued when the timer was paused,
//! reset or moved to the next interval.

use chrono::NaiveDate;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::error::{CoreError, Result};
use crate::events::{Event, Snapshot};
use crate::export::{ExportOutcome, ExportTarget};
use crate::session::Session;
use crate::settings::{Settings, SettingsField};
use crate::timer::Mode;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const QUEUE_DEPTH: usize = 64;

/// Requests accepted by the session actor.
pub enum Command {
    Start,
    Pause,
    Toggle,
    Skip,
    Reset,
    SelectMode(Mode),
    SetTask(String),
    ApplySetting {
        field: SettingsField,
        value: String,
    },
    UpdateSettings(Settings),
    Snapshot(oneshot::Sender<Snapshot>),
    Export {
        date: NaiveDate,
        target: Box<dyn ExportTarget>,
        reply: oneshot::Sender<Result<ExportOutcome>>,
    },
}

enum Message {
    Command(Command),
    Tick { generation: u64 },
    Shutdown,
}

/// Cloneable sender side of the session actor.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Message>,
}

impl SessionHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(Message::Command(command))
            .await
            .map_err(|_| CoreError::RuntimeClosed)
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)
    }

    pub async fn export(
        &self,
        date: NaiveDate,
        target: Box<dyn ExportTarget>,
    ) -> Result<ExportOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Export {
            date,
            target,
            reply,
        })
        .await?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)?
    }

    /// Ask the actor to stop after the messages already queued.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Message::Shutdown)
            .await
            .map_err(|_| CoreError::RuntimeClosed)
    }
}

pub struct Runtime {
    pub handle: SessionHandle,
    pub events: mpsc::UnboundedReceiver<Event>,
    /// Resolves to the session once the actor stops.
    pub task: JoinHandle<Session>,
}

/// Spawn the actor on the current tokio runtime.
///
/// The actor stops on `shutdown()` or once every handle is dropped.
pub fn spawn(session: Session) -> Runtime {
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    let (events_tx, events) = mpsc::unbounded_channel();
    let weak = tx.downgrade();
    let task = tokio::spawn(run(session, rx, weak, events_tx));
    Runtime {
        handle: SessionHandle { tx },
        events,
        task,
    }
}

async fn run(
    mut session: Session,
    mut rx: mpsc::Receiver<Message>,
    weak: mpsc::WeakSender<Message>,
    events: mpsc::UnboundedSender<Event>,
) -> Session {
    let mut driver = CountdownDriver::new(TICK_PERIOD, weak);

    while let Some(message) = rx.recv().await {
        let emitted = match message {
            Message::Shutdown => break,
            Message::Tick { generation } => {
                if !driver.is_current(generation) || !session.is_running() {
                    trace!(generation, "discarding stale tick");
                    continue;
                }
                match session.count_down() {
                    Ok(events) => events,
                    Err(interval) => {
                        // Engine is paused now; stop ticking before the memo
                        // prompt suspends us.
                        driver.sync(session.running_run());
                        session.complete(interval).await
                    }
                }
            }
            Message::Command(command) => apply(&mut session, command).await,
        };

        driver.sync(session.running_run());
        for event in emitted {
            let _ = events.send(event);
        }
    }

    driver.disarm();
    debug!("session actor stopped");
    session
}

async fn apply(session: &mut Session, command: Command) -> Vec<Event> {
    match command {
        Command::Start => session.start(),
        Command::Pause => session.pause(),
        Command::Toggle => session.toggle(),
        Command::Skip => session.skip().await,
        Command::Reset => session.reset(),
        Command::SelectMode(mode) => session.select_mode(mode),
        Command::SetTask(task) => session.set_task(&task),
        Command::ApplySetting { field, value } => session.apply_setting(field, &value),
        Command::UpdateSettings(settings) => session.update_settings(settings),
        Command::Snapshot(reply) => {
            let _ = reply.send(session.snapshot());
            Vec::new()
        }
        Command::Export {
            date,
            mut target,
            reply,
        } => {
            let result = session.export(date, &mut *target).map_err(CoreError::from);
            let _ = reply.send(result);
            Vec::new()
        }
    }
}

/// Once-per-second tick source, armed only while the engine runs.
struct CountdownDriver {
    period: Duration,
    tx: mpsc::WeakSender<Message>,
    generation: u64,
    /// Engine run the current ticker belongs to.
    armed_run: Option<u64>,
    ticker: Option<JoinHandle<()>>,
}

impl CountdownDriver {
    fn new(period: Duration, tx: mpsc::WeakSender<Message>) -> Self {
        Self {
            period,
            tx,
            generation: 0,
            armed_run: None,
            ticker: None,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.armed_run.is_some() && generation == self.generation
    }

    /// Match the ticker to the engine: one ticker per engine run, none while
    /// paused.
    fn sync(&mut self, run: Option<u64>) {
        if self.armed_run == run {
            return;
        }
        self.disarm();
        if let Some(run) = run {
            self.arm(run);
        }
    }

    fn arm(&mut self, run: u64) {
        self.generation += 1;
        self.armed_run = Some(run);
        let generation = self.generation;
        let period = self.period;
        let weak = self.tx.clone();
        trace!(generation, run, "countdown driver armed");

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(tx) = weak.upgrade() else { break };
                if tx.send(Message::Tick { generation }).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            trace!(generation = self.generation, "countdown driver disarmed");
        }
        if self.armed_run.take().is_some() {
            self.generation += 1;
        }
    }
}
