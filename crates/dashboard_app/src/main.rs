mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dashboard_logging::{dashboard_error, LogDestination, LogSettings};
use log::LevelFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

/// Terminal dashboard for uploading files and following download jobs.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about)]
struct Cli {
    /// RON config file; a missing file means defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service root URL, overrides the config file.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    log: LogTarget,

    #[arg(long, default_value = "./dashboard.log")]
    log_file: PathBuf,

    /// Record debug-level log lines.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = LogSettings {
        destination: cli.log.into(),
        file_path: cli.log_file.clone(),
        level: if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    };
    if !dashboard_logging::initialize(&logging) {
        eprintln!("Logging disabled: could not open {}", cli.log_file.display());
    }

    match start(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            dashboard_error!("Startup failed: {:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn start(cli: Cli) -> Result<()> {
    let mut config = terminal::config::load(cli.config.as_deref())
        .context("loading configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    terminal::app::run(config)
}
