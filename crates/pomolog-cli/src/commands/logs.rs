use chrono::{Local, NaiveDate};
use clap::Subcommand;
use pomolog_core::{Config, Journal};

#[derive(Subcommand)]
pub enum LogsAction {
    /// Print a day log, or a task log with --task
    Show {
        /// Task name
        #[arg(long)]
        task: Option<String>,
        /// Day to show (YYYY-MM-DD, default today). Task logs span every day.
        #[arg(long, conflicts_with = "task")]
        date: Option<NaiveDate>,
    },
    /// Print where the logs are written
    Path,
}

pub fn run(action: LogsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let journal = Journal::new(config.layout()?);

    match action {
        LogsAction::Show { task, date } => {
            let (text, label) = match task.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => {
                    (journal.read_task(name)?, format!("task '{name}'"))
                }
                _ => {
                    let date = date.unwrap_or_else(|| Local::now().date_naive());
                    (journal.read_day(date)?, date.to_string())
                }
            };
            match text {
                Some(text) => print!("{text}"),
                None => println!("no log for {label}"),
            }
        }
        LogsAction::Path => {
            let layout = journal.layout();
            println!("root:  {}", layout.root().display());
            println!("today: {}", layout.day_log(Local::now().date_naive()).display());
            if let Some(path) = layout.task_log(&config.task) {
                println!("task:  {}", path.display());
            }
        }
    }
    Ok(())
}
