use crate::OutputFormat;
use anyhow::{Context, Result};
use logtop_core::Config;
use logtop_core::analysis::{AnalysisReport, SlowUrlAnalyzer};
use logtop_core::log::LogReader;
use std::path::Path;

/// Analyze one log file and return the ranked URL statistics
pub fn analyze_log(file: &Path, config: &Config) -> Result<AnalysisReport> {
    tracing::debug!("Reading log file: {}", file.display());

    let reader = LogReader::open_file(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let report = SlowUrlAnalyzer::from_config(config)
        .analyze(reader)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    Ok(report)
}

pub fn execute(file: &Path, config: &Config, format: OutputFormat) -> Result<()> {
    tracing::info!("Analyzing log file: {}", file.display());

    let report = analyze_log(file, config)?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report, file),
    }

    Ok(())
}

fn output_pretty(report: &AnalysisReport, file: &Path) {
    use console::style;

    println!("\n{}", style("Slowest URLs").bold().cyan());
    println!("{}", style("============").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  File:          {}", file.display());
    println!("  Lines:         {}", report.stats.total_lines_seen);
    println!("  Parsed:        {}", report.stats.total_lines_parsed);
    println!("  Parse Errors:  {:.2}%", report.parse_error_percent);
    println!("  Unique URLs:   {}", report.distinct_urls);
    println!("  Total Time:    {:.3} s", report.stats.total_time_sum);

    if report.rows.is_empty() {
        println!();
        return;
    }

    println!("\n{}", style("By total time:").bold());
    for (i, row) in report.rows.iter().enumerate() {
        println!(
            "  {:>3}. [{:>9.3} s {:>6.2}%] {} (count {}, avg {:.3}, med {:.3}, max {:.3})",
            i + 1,
            row.time_sum,
            row.time_perc,
            style(&row.url).bold(),
            row.count,
            row.time_avg,
            row.time_med,
            row.time_max
        );
    }

    println!();
}

fn output_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &AnalysisReport) {
    println!("url,count,count_perc,time_sum,time_perc,time_avg,time_max,time_med");
    for row in &report.rows {
        println!(
            "{},{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
            csv_field(&row.url),
            row.count,
            row.count_perc,
            row.time_sum,
            row.time_perc,
            row.time_avg,
            row.time_max,
            row.time_med
        );
    }
}

/// Quote a field if it would break the comma-separated layout
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("/api/v2/banner"), "/api/v2/banner");
        assert_eq!(csv_field("/a?x=1,2"), "\"/a?x=1,2\"");
        assert_eq!(csv_field("/a\"b"), "\"/a\"\"b\"");
    }
}
