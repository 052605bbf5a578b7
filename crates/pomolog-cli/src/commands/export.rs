use chrono::{Local, NaiveDate};
use clap::Args;
use pomolog_core::{export_logs, Config, ExportOutcome, FileExportTarget, Journal};
use std::path::PathBuf;

#[derive(Args)]
pub struct ExportArgs {
    /// Task whose log is appended (default: last task used)
    #[arg(long)]
    task: Option<String>,
    /// Day to export (YYYY-MM-DD, default today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Output file (default: ./Pomodoro_<date>[_<task>].md)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let journal = Journal::new(config.layout()?);
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let task = args.task.unwrap_or(config.task);
    let task = Some(task.trim()).filter(|t| !t.is_empty());

    let mut target = FileExportTarget::new(args.output, std::env::current_dir()?);
    report(export_logs(&journal, date, task, &mut target)?);
    Ok(())
}

pub fn report(outcome: ExportOutcome) {
    match outcome {
        ExportOutcome::NothingToExport => println!("nothing to export"),
        ExportOutcome::Cancelled => println!("export cancelled"),
        ExportOutcome::Written(path) => println!("exported to {}", path.display()),
    }
}
