use anyhow::{Context, Result};
use clap::Parser;
use logtop_cli::cli::{Cli, Commands};
use logtop_cli::commands;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = commands::load_config(cli.config.as_deref())?;

    // Logging needs LOG_FILE, so the config is loaded first and reported afterwards
    init_logging(cli.verbose, config.log_file.as_deref())?;
    commands::log_config(cli.config.as_deref(), &config);

    // Execute the command
    match cli.command {
        Commands::Report {
            force,
            log_dir,
            report_dir,
        } => {
            if let Some(dir) = log_dir {
                config.log_dir = dir;
            }
            if let Some(dir) = report_dir {
                config.report_dir = dir;
            }
            commands::report::execute(&config, force, cli.format)
        }
        Commands::Analyze {
            file,
            top,
            err_limit,
        } => {
            if let Some(n) = top {
                config.report_size = n;
            }
            if let Some(limit) = err_limit {
                config.err_limit = limit;
            }
            commands::analyze::execute(&file, &config, cli.format)
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut io::stdout()),
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("logtop=debug,logtop_cli=debug,logtop_core=debug")
        } else {
            EnvFilter::new("logtop=info,logtop_cli=info,logtop_core=info")
        }
    });

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_target(false)
                .without_time()
                .init();
        }
    }

    Ok(())
}
