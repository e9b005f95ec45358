mod accumulator;
mod budget;
mod statistics;

pub use accumulator::Accumulator;
pub use budget::ErrorBudget;
pub use statistics::{ReportRow, median};

use crate::Result;
use crate::config::Config;
use crate::log::LogReader;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Line and time totals for one processed log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_lines_seen: usize,
    pub total_lines_parsed: usize,
    pub total_time_sum: f64,
}

impl RunStats {
    /// Percentage of lines that failed to parse, `None` when no lines were read
    pub fn parse_error_percent(&self) -> Option<f64> {
        if self.total_lines_seen == 0 {
            return None;
        }
        let failed = self.total_lines_seen - self.total_lines_parsed;
        Some(100.0 * failed as f64 / self.total_lines_seen as f64)
    }
}

/// All response times observed for one URL, with their sums
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    pub url: String,
    pub samples: Vec<f64>,
    pub count: usize,
    pub time_sum: f64,
}

/// Result of [`Accumulator::finalize`]: URL records in first-seen order plus run totals
#[derive(Debug)]
pub struct Aggregation {
    records: Vec<UrlRecord>,
    stats: RunStats,
}

impl Aggregation {
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn records(&self) -> &[UrlRecord] {
        &self.records
    }

    /// The `n` URLs with the largest total time, slowest first
    ///
    /// Equal totals keep first-seen order.
    pub fn top_urls(&self, n: usize) -> Vec<&UrlRecord> {
        self.ranked_indices(n)
            .into_iter()
            .map(|idx| &self.records[idx])
            .collect()
    }

    /// Turn the top `n` URLs into report rows, releasing all sample storage
    pub fn into_report_rows(self, n: usize) -> Vec<ReportRow> {
        let order = self.ranked_indices(n);
        let stats = self.stats;
        let mut slots: Vec<Option<UrlRecord>> = self.records.into_iter().map(Some).collect();

        order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .map(|record| ReportRow::from_record(record, &stats))
            .collect()
    }

    fn ranked_indices(&self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        // sort_by is stable, so ties stay in first-seen order
        order.sort_by(|&a, &b| {
            self.records[b]
                .time_sum
                .total_cmp(&self.records[a].time_sum)
        });
        order.truncate(n);
        order
    }
}

/// Everything a report is rendered from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub stats: RunStats,
    pub parse_error_percent: f64,
    pub distinct_urls: usize,
    pub rows: Vec<ReportRow>,
}

/// Runs the whole engine over one log: ingest, finalize, budget check, rank
pub struct SlowUrlAnalyzer {
    report_size: usize,
    budget: ErrorBudget,
}

impl SlowUrlAnalyzer {
    pub fn new(report_size: usize, budget: ErrorBudget) -> Self {
        Self {
            report_size,
            budget,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.report_size, ErrorBudget::new(config.err_limit))
    }

    pub fn analyze<R: BufRead>(&self, reader: R) -> Result<AnalysisReport> {
        tracing::debug!("Aggregating response times by URL");

        let mut accumulator = Accumulator::new();
        accumulator.ingest(LogReader::lines(reader))?;
        let aggregation = accumulator.finalize();

        let parse_error_percent = self.budget.check(aggregation.stats())?;
        let stats = *aggregation.stats();
        let distinct_urls = aggregation.records().len();
        let rows = aggregation.into_report_rows(self.report_size);

        tracing::info!(
            "Analysis complete: {} lines, {} parsed ({:.2}% errors), {} URLs, {} reported",
            stats.total_lines_seen,
            stats.total_lines_parsed,
            parse_error_percent,
            distinct_urls,
            rows.len()
        );

        Ok(AnalysisReport {
            stats,
            parse_error_percent,
            distinct_urls,
            rows,
        })
    }
}

impl Default for SlowUrlAnalyzer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const SAMPLE_LOG: &str = r#"3.3.3.3 - - [234 5ghd] "GET a h" 10.0
"GET a h" 10.0
"GET a h" 10.0
"GET b h" 5.0
"GET b h" 3.0
"#;

    fn aggregate(lines: &[&str]) -> Aggregation {
        let mut acc = Accumulator::new();
        for line in lines {
            let _ = acc.ingest_line(line);
        }
        acc.finalize()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_parse_error_percent() {
        let stats = RunStats {
            total_lines_seen: 4,
            total_lines_parsed: 3,
            total_time_sum: 1.0,
        };
        assert_eq!(stats.parse_error_percent(), Some(25.0));

        let empty = RunStats {
            total_lines_seen: 0,
            total_lines_parsed: 0,
            total_time_sum: 0.0,
        };
        assert_eq!(empty.parse_error_percent(), None);
    }

    #[test]
    fn test_parse_error_percent_is_exact_at_one_in_a_hundred() {
        let stats = RunStats {
            total_lines_seen: 100,
            total_lines_parsed: 99,
            total_time_sum: 9.9,
        };
        assert_eq!(stats.parse_error_percent(), Some(1.0));
    }

    #[test]
    fn test_two_url_example() {
        let agg = aggregate(&[r#""GET a h" 10.0"#, r#""GET a h" 10.0"#, r#""GET b h" 5.0"#]);
        assert_eq!(agg.stats().total_lines_parsed, 3);
        assert_eq!(agg.stats().total_time_sum, 25.0);

        let rows = agg.into_report_rows(1000);
        assert_eq!(rows.len(), 2);

        let a = &rows[0];
        assert_eq!(a.url, "a");
        assert_eq!(a.count, 2);
        assert_eq!(a.time_sum, 20.0);
        assert_eq!(a.time_avg, 10.0);
        assert_eq!(a.time_max, 10.0);
        assert_eq!(a.time_med, 10.0);
        assert_close(a.count_perc, 200.0 / 3.0);
        assert_close(a.time_perc, 80.0);

        let b = &rows[1];
        assert_eq!(b.url, "b");
        assert_eq!(b.count, 1);
        assert_eq!(b.time_sum, 5.0);
        assert_eq!(b.time_avg, 5.0);
        assert_eq!(b.time_max, 5.0);
        assert_eq!(b.time_med, 5.0);
        assert_close(b.count_perc, 100.0 / 3.0);
        assert_close(b.time_perc, 20.0);
    }

    #[test]
    fn test_top_one_excludes_rest() {
        let agg = aggregate(&[r#""GET a h" 10.0"#, r#""GET a h" 10.0"#, r#""GET b h" 5.0"#]);
        let rows = agg.into_report_rows(1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].url, "a");
        // Shares stay relative to the whole log
        assert_close(rows[0].time_perc, 80.0);
    }

    #[test]
    fn test_percentages_sum_to_100_over_all_urls() {
        let agg = aggregate(&[
            r#""GET a h" 10.0"#,
            r#""GET b h" 5.0"#,
            r#""GET c h" 0.01"#,
            r#""GET c h" 1.0"#,
            r#""GET d h" 33.0"#,
            r#""GET d h" 99.0"#,
            r#""GET e h" 6.8"#,
        ]);
        let rows = agg.into_report_rows(usize::MAX);
        assert_eq!(rows.len(), 5);

        let count_total: f64 = rows.iter().map(|r| r.count_perc).sum();
        let time_total: f64 = rows.iter().map(|r| r.time_perc).sum();
        assert_close(count_total, 100.0);
        assert_close(time_total, 100.0);
    }

    #[test]
    fn test_ranking_descending_with_stable_ties() {
        let agg = aggregate(&[
            r#""GET /tie1 h" 2.0"#,
            r#""GET /big h" 9.0"#,
            r#""GET /tie2 h" 1.0"#,
            r#""GET /tie2 h" 1.0"#,
            r#""GET /small h" 0.5"#,
        ]);

        let top: Vec<&str> = agg.top_urls(10).into_iter().map(|r| r.url.as_str()).collect();
        assert_eq!(top, vec!["/big", "/tie1", "/tie2", "/small"]);

        let top2: Vec<&str> = agg.top_urls(2).into_iter().map(|r| r.url.as_str()).collect();
        assert_eq!(top2, vec!["/big", "/tie1"]);

        // Ranking does not consume or alter the aggregation
        assert_eq!(agg.records().len(), 4);
        assert_eq!(agg.records()[0].time_sum, 2.0);
    }

    #[test]
    fn test_top_zero_is_empty() {
        let agg = aggregate(&[r#""GET a h" 1.0"#]);
        assert!(agg.top_urls(0).is_empty());
        assert!(agg.into_report_rows(0).is_empty());
    }

    #[test]
    fn test_analyzer_sample_log() {
        let analyzer = SlowUrlAnalyzer::new(2, ErrorBudget::default());
        let report = analyzer.analyze(SAMPLE_LOG.as_bytes()).unwrap();

        assert_eq!(report.stats.total_lines_seen, 5);
        assert_eq!(report.stats.total_lines_parsed, 5);
        assert_close(report.stats.total_time_sum, 38.0);
        assert_eq!(report.parse_error_percent, 0.0);
        assert_eq!(report.distinct_urls, 2);

        assert_eq!(report.rows[0].url, "a");
        assert_eq!(report.rows[0].count, 3);
        assert_eq!(report.rows[0].count_perc, 60.0);
        assert_close(report.rows[0].time_perc, 78.94736842105263);
        assert_eq!(report.rows[1].url, "b");
        assert_eq!(report.rows[1].time_med, 4.0);
    }

    #[test]
    fn test_analyzer_rejects_corrupt_log() {
        let log = format!("{}\"GET b h\" A\n", SAMPLE_LOG);
        let analyzer = SlowUrlAnalyzer::new(10, ErrorBudget::new(1.0));
        assert!(matches!(
            analyzer.analyze(log.as_bytes()),
            Err(Error::ParseBudgetExceeded { .. })
        ));
    }

    #[test]
    fn test_analyzer_accepts_log_at_default_limit() {
        let mut log = "\"GET /ok HTTP/1.1\" 0.1\n".repeat(99);
        log.push_str("\"GET /bad HTTP/1.1\" -\n");

        let report = SlowUrlAnalyzer::default().analyze(log.as_bytes()).unwrap();
        assert_eq!(report.parse_error_percent, 1.0);
        assert_eq!(report.stats.total_lines_parsed, 99);
        assert_eq!(report.rows[0].url, "/ok");
    }

    #[test]
    fn test_analyzer_single_bad_line() {
        let analyzer = SlowUrlAnalyzer::new(10, ErrorBudget::new(0.0));
        assert!(matches!(
            analyzer.analyze("\"GET b h\" -\n".as_bytes()),
            Err(Error::ParseBudgetExceeded { error_percent, .. }) if error_percent == 100.0
        ));
    }

    #[test]
    fn test_analyzer_empty_log() {
        let analyzer = SlowUrlAnalyzer::new(10, ErrorBudget::new(0.0));
        assert!(matches!(analyzer.analyze(&b""[..]), Err(Error::EmptyInput)));
    }
}
