use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomolog", version, about = "Pomodoro timer with a markdown journal")]
struct Cli {
    /// Increase log verbosity (-v, -vv). POMOLOG_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive timer session
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Read back the markdown logs
    Logs {
        #[command(subcommand)]
        action: commands::logs::LogsAction,
    },
    /// Export the day log and a task log as one markdown file
    Export(commands::export::ExportArgs),
    /// Print break advice for a memo
    Advise {
        /// Memo text
        #[arg(required = true, num_args = 1..)]
        memo: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("POMOLOG_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Logs { action } => commands::logs::run(action),
        Commands::Export(args) => commands::export::run(args),
        Commands::Advise { memo } => commands::advise::run(&memo.join(" ")),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
