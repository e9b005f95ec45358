use super::{Aggregation, RunStats, UrlRecord};
use crate::Result;
use crate::log::{ParseFailure, parse_line};
use std::collections::HashMap;
use std::io;

/// Collects response times per URL while a log is being read
///
/// URLs are kept in first-seen order so that ranking ties resolve
/// deterministically. Sums are only computed by [`Accumulator::finalize`].
#[derive(Debug, Default)]
pub struct Accumulator {
    index: HashMap<String, usize>,
    samples: Vec<(String, Vec<f64>)>,
    lines_seen: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one response time for a URL
    pub fn observe(&mut self, url: &str, time: f64) {
        match self.index.get(url) {
            Some(&idx) => self.samples[idx].1.push(time),
            None => {
                self.index.insert(url.to_string(), self.samples.len());
                self.samples.push((url.to_string(), vec![time]));
            }
        }
    }

    /// Count a raw log line and record it if it parses
    pub fn ingest_line(&mut self, line: &str) -> std::result::Result<(), ParseFailure> {
        self.lines_seen += 1;
        let record = parse_line(line)?;
        self.observe(record.url, record.response_time);
        Ok(())
    }

    /// Count a raw log line and record it if it is UTF-8 and parses
    pub fn ingest_bytes(&mut self, line: &[u8]) -> std::result::Result<(), ParseFailure> {
        match std::str::from_utf8(line) {
            Ok(line) => self.ingest_line(line),
            Err(_) => {
                self.lines_seen += 1;
                Err(ParseFailure::InvalidEncoding)
            }
        }
    }

    /// Feed every line of a log into the accumulator
    ///
    /// Unparseable lines are logged at debug level and skipped; read errors
    /// abort ingestion.
    pub fn ingest<I>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = io::Result<Vec<u8>>>,
    {
        for line in lines {
            let line = line?;
            if let Err(failure) = self.ingest_bytes(&line) {
                tracing::debug!("Skipping line {}: {}", self.lines_seen, failure);
            }
        }
        Ok(())
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    pub fn distinct_urls(&self) -> usize {
        self.samples.len()
    }

    /// Close ingestion and compute per-URL and run-wide sums in one pass
    pub fn finalize(self) -> Aggregation {
        let mut total_lines_parsed = 0;
        let mut total_time_sum = 0.0;

        let records: Vec<UrlRecord> = self
            .samples
            .into_iter()
            .map(|(url, samples)| {
                let count = samples.len();
                let time_sum: f64 = samples.iter().sum();
                total_lines_parsed += count;
                total_time_sum += time_sum;
                UrlRecord {
                    url,
                    samples,
                    count,
                    time_sum,
                }
            })
            .collect();

        tracing::debug!(
            "Aggregated {} URLs from {} of {} lines",
            records.len(),
            total_lines_parsed,
            self.lines_seen
        );

        Aggregation {
            records,
            stats: RunStats {
                total_lines_seen: self.lines_seen,
                total_lines_parsed,
                total_time_sum,
            },
        }
    }
}
