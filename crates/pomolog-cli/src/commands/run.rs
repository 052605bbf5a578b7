use async_trait::async_trait;
use chrono::Local;
use clap::Args;
use pomolog_core::events::format_clock;
use pomolog_core::journal::format_duration;
use pomolog_core::runtime::{self, Command, Runtime, SessionHandle};
use pomolog_core::{
    Config, Cue, CueKind, Event, FileExportTarget, Journal, MemoPrompt, Session, SessionEngine,
    Settings, Snapshot,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::sync::{mpsc, oneshot};

#[derive(Args)]
pub struct RunArgs {
    /// Task name for this session (remembered for next time)
    #[arg(long)]
    task: Option<String>,
    /// Start each interval automatically
    #[arg(long)]
    auto_start: bool,
    /// Disable sound cues
    #[arg(long)]
    no_sound: bool,
}

const HELP: &str = "\
commands:
  start | pause | <enter> to toggle | skip | reset
  mode work|short|long     switch mode (pauses)
  task <name>              set the task; empty clears it
  set <field> <value>      work, short, long, cycles, auto, sound
  reload                   re-read [timer] from the config file
  status                   show the timer
  export [path]            write today's day + task log to one file
  help | quit";

/// A memo question waiting for the next input line.
struct MemoAsk {
    title: String,
    placeholder: String,
    reply: oneshot::Sender<Option<String>>,
}

/// Forwards memo requests to the input loop and waits for its answer.
struct TerminalPrompt {
    asks: mpsc::UnboundedSender<MemoAsk>,
}

#[async_trait]
impl MemoPrompt for TerminalPrompt {
    async fn prompt_memo(&mut self, title: &str, placeholder: &str) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.asks
            .send(MemoAsk {
                title: title.to_string(),
                placeholder: placeholder.to_string(),
                reply,
            })
            .ok()?;
        rx.await.ok().flatten()
    }
}

/// Plays a freedesktop sound if one is installed, else rings the bell.
struct TerminalCue;

impl TerminalCue {
    fn candidates(cue: CueKind) -> [(&'static str, &'static str); 2] {
        let sound = match cue {
            CueKind::IntervalStarted(_) => "/usr/share/sounds/freedesktop/stereo/bell.oga",
            CueKind::IntervalFinished(_) => "/usr/share/sounds/freedesktop/stereo/complete.oga",
        };
        [
            ("paplay", sound),
            ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
        ]
    }
}

impl Cue for TerminalCue {
    fn play(&self, cue: CueKind) {
        let candidates = Self::candidates(cue);
        std::thread::spawn(move || {
            for (cmd, file) in candidates {
                if Path::new(file).exists() {
                    let spawned = std::process::Command::new(cmd)
                        .arg(file)
                        .stdout(Stdio::null())
                        .stderr(Stdio::null())
                        .spawn();
                    if spawned.is_ok() {
                        return;
                    }
                }
            }
            print!("\x07");
            let _ = io::stdout().flush();
        });
    }
}

/// One line of user input.
enum Input {
    Command(Command),
    SetTask(String),
    Reload,
    Status,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let input = match word.to_ascii_lowercase().as_str() {
        "" | "toggle" => Input::Command(Command::Toggle),
        "start" => Input::Command(Command::Start),
        "pause" => Input::Command(Command::Pause),
        "skip" => Input::Command(Command::Skip),
        "reset" => Input::Command(Command::Reset),
        "mode" => Input::Command(Command::SelectMode(rest.parse()?)),
        "task" => Input::SetTask(rest.to_string()),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: set <field> <value>")?;
            Input::Command(Command::ApplySetting {
                field: field.parse()?,
                value: value.trim().to_string(),
            })
        }
        "reload" => Input::Reload,
        "status" => Input::Status,
        "export" => Input::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(input)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(task) = &args.task {
        config.set("task", task)?;
        config.save()?;
    }

    let mut settings = config.timer.clone();
    if args.auto_start {
        settings.auto_start = true;
    }
    if args.no_sound {
        settings.sound_enabled = false;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(interactive(config, settings))
}

async fn interactive(
    mut config: Config,
    settings: Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let export_dir = std::env::current_dir()?;
    let (asks_tx, mut asks) = mpsc::unbounded_channel();
    let session = Session::new(
        SessionEngine::with_system_clock(settings),
        Journal::new(config.layout()?),
        Box::new(TerminalPrompt { asks: asks_tx }),
        Box::new(TerminalCue),
    )
    .with_task(&config.task);

    let Runtime {
        handle,
        mut events,
        task: actor,
    } = runtime::spawn(session);
    let mut lines = spawn_stdin_reader();

    println!("pomolog: type 'help' for commands");
    print_status(&handle.snapshot().await?);

    let mut pending: Option<MemoAsk> = None;
    loop {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event),
            Some(ask) = asks.recv() => {
                println!("\n{}\n{} (enter to save, /skip for none)", ask.title, ask.placeholder);
                pending = Some(ask);
            }
            line = lines.recv() => {
                let Some(line) = line else { break };
                if let Some(ask) = pending.take() {
                    let memo = (line.trim() != "/skip").then_some(line);
                    let _ = ask.reply.send(memo);
                    continue;
                }
                match parse_line(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{HELP}"),
                    // Replies wait on the actor, which may be holding for a
                    // memo; never block this loop on them.
                    Ok(Input::Status) => {
                        let handle = handle.clone();
                        tokio::spawn(async move {
                            if let Ok(snapshot) = handle.snapshot().await {
                                print_status(&snapshot);
                            }
                        });
                    }
                    Ok(Input::Export(path)) => spawn_export(&handle, path, &export_dir),
                    Ok(Input::SetTask(name)) => {
                        config.task = name.trim().to_string();
                        if let Err(e) = config.save() {
                            eprintln!("! could not remember task: {e}");
                        }
                        handle.send(Command::SetTask(name)).await?;
                    }
                    Ok(Input::Reload) => match Config::load() {
                        Ok(fresh) => {
                            config = fresh;
                            handle.send(Command::UpdateSettings(config.timer.clone())).await?;
                        }
                        Err(e) => eprintln!("! could not reload config: {e}"),
                    },
                    Ok(Input::Command(command)) => handle.send(command).await?,
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    // An unanswered memo is logged as empty.
    drop(pending.take());
    handle.shutdown().await?;
    actor.await?;
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn spawn_export(handle: &SessionHandle, path: Option<PathBuf>, dir: &Path) {
    let handle = handle.clone();
    let target = FileExportTarget::new(path, dir);
    tokio::spawn(async move {
        match handle
            .export(Local::now().date_naive(), Box::new(target))
            .await
        {
            Ok(outcome) => super::export::report(outcome),
            Err(e) => eprintln!("! export failed: {e}"),
        }
    });
}

fn print_status(snapshot: &Snapshot) {
    let task = if snapshot.task.is_empty() {
        "(no task)"
    } else {
        snapshot.task.as_str()
    };
    println!(
        "{}  {}  [{}]",
        snapshot.clock_face(),
        snapshot.status_line(),
        task
    );
}

fn print_event(event: &Event) {
    match event {
        Event::TimerStarted {
            mode,
            remaining_secs,
            ..
        } => println!("▶ {mode} {}", format_clock(*remaining_secs)),
        Event::TimerPaused {
            mode,
            remaining_secs,
            ..
        } => println!("⏸ {mode} paused at {}", format_clock(*remaining_secs)),
        Event::Tick { remaining_secs, .. } => {
            if remaining_secs % 60 == 0 {
                println!("  {} left", format_clock(*remaining_secs));
            }
        }
        Event::IntervalFinished {
            mode,
            skipped,
            duration_secs,
            ..
        } => {
            let how = if *skipped { "skipped" } else { "finished" };
            println!("{mode} {how} after {}", format_duration(*duration_secs));
        }
        Event::EntryLogged { day_log, task_log } => {
            for path in day_log.iter().chain(task_log) {
                println!("logged to {}", path.display());
            }
        }
        Event::ModeAdvanced {
            to,
            completed_work_sessions,
            remaining_secs,
            ..
        } => println!(
            "next: {to} {} • Cycle {completed_work_sessions}",
            format_clock(*remaining_secs)
        ),
        Event::ModeSelected {
            mode,
            remaining_secs,
        } => println!("mode: {mode} {}", format_clock(*remaining_secs)),
        Event::TimerReset {
            mode,
            remaining_secs,
            ..
        } => println!("reset: {mode} {}, cycles cleared", format_clock(*remaining_secs)),
        Event::TaskChanged { task } if task.is_empty() => println!("task cleared"),
        Event::TaskChanged { task } => println!("task: {task}"),
        Event::SettingsChanged { settings } => println!(
            "settings: work {}m, short {}m, long {}m, long break every {}, auto-start {}, sound {}",
            settings.work_minutes,
            settings.short_break_minutes,
            settings.long_break_minutes,
            settings.cycles_before_long,
            settings.auto_start,
            settings.sound_enabled
        ),
        Event::Notice { message } => eprintln!("! {message}"),
    }
}
