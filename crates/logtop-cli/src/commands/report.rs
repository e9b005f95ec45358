use crate::OutputFormat;
use anyhow::{Context, Result};
use console::style;
use logtop_core::analysis::SlowUrlAnalyzer;
use logtop_core::log::{LogReader, find_latest};
use logtop_core::report::ReportWriter;
use logtop_core::{Config, Error};
use serde::Serialize;
use std::path::PathBuf;

/// What a report run did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The report for the latest log already existed
    Skipped { log_date: String, report: PathBuf },
    Written {
        log_date: String,
        log: PathBuf,
        report: PathBuf,
        lines: usize,
        parse_error_percent: f64,
        urls: usize,
    },
}

/// Build the report for the latest log unless it already exists
pub fn build_report(config: &Config, force: bool) -> Result<ReportOutcome> {
    let log = find_latest(&config.log_dir)?;
    let log_date = log.date.format("%Y-%m-%d").to_string();

    let writer = ReportWriter::from_config(config)?;
    if !writer.report_dir().is_dir() {
        return Err(Error::ReportDirNotFound(writer.report_dir().to_path_buf()).into());
    }

    if !force && writer.exists(log.date) {
        let report = writer.path_for(log.date);
        tracing::info!(
            "Report for {} already exists at {}, nothing to do",
            log_date,
            report.display()
        );
        return Ok(ReportOutcome::Skipped { log_date, report });
    }

    let reader = LogReader::open(&log)?;
    let analysis = SlowUrlAnalyzer::from_config(config)
        .analyze(reader)
        .with_context(|| format!("Failed to analyze {}", log.path.display()))?;

    let report = writer.write(log.date, &analysis.rows)?;

    Ok(ReportOutcome::Written {
        log_date,
        log: log.path,
        report,
        lines: analysis.stats.total_lines_seen,
        parse_error_percent: analysis.parse_error_percent,
        urls: analysis.rows.len(),
    })
}

pub fn execute(config: &Config, force: bool, format: OutputFormat) -> Result<()> {
    tracing::info!("Building report from logs in {}", config.log_dir.display());

    let outcome = build_report(config, force)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Table => output_table(&outcome),
        OutputFormat::Pretty => output_pretty(&outcome),
    }

    Ok(())
}

fn output_pretty(outcome: &ReportOutcome) {
    match outcome {
        ReportOutcome::Skipped { log_date, report } => {
            println!(
                "{} report for {} already exists: {}",
                style("Skipped").yellow().bold(),
                log_date,
                report.display()
            );
        }
        ReportOutcome::Written {
            log_date,
            log,
            report,
            lines,
            parse_error_percent,
            urls,
        } => {
            println!("\n{}", style("Report written").bold().green());
            println!("  Log:          {} ({})", log.display(), log_date);
            println!("  Lines:        {}", lines);
            println!("  Parse errors: {:.2}%", parse_error_percent);
            println!("  URLs:         {}", urls);
            println!("  Report:       {}", report.display());
            println!();
        }
    }
}

fn output_table(outcome: &ReportOutcome) {
    println!("Field,Value");
    match outcome {
        ReportOutcome::Skipped { log_date, report } => {
            println!("Status,skipped");
            println!("Log Date,{}", log_date);
            println!("Report,{}", report.display());
        }
        ReportOutcome::Written {
            log_date,
            log,
            report,
            lines,
            parse_error_percent,
            urls,
        } => {
            println!("Status,written");
            println!("Log Date,{}", log_date);
            println!("Log,{}", log.display());
            println!("Lines,{}", lines);
            println!("Parse Errors (%),{:.2}", parse_error_percent);
            println!("URLs,{}", urls);
            println!("Report,{}", report.display());
        }
    }
}
