use super::{RunStats, UrlRecord};
use serde::{Deserialize, Serialize, Serializer};

/// Decimal digits kept for every float in a serialized report
const REPORT_PRECISION: i32 = 3;

/// Final statistics for one URL in the report
///
/// Percentages are shares of the whole log, not of the rows in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub url: String,
    pub count: usize,
    #[serde(serialize_with = "rounded")]
    pub count_perc: f64,
    #[serde(serialize_with = "rounded")]
    pub time_avg: f64,
    #[serde(serialize_with = "rounded")]
    pub time_max: f64,
    #[serde(serialize_with = "rounded")]
    pub time_med: f64,
    #[serde(serialize_with = "rounded")]
    pub time_perc: f64,
    #[serde(serialize_with = "rounded")]
    pub time_sum: f64,
}

impl ReportRow {
    /// Compute a row from a finalized record and the run totals
    pub fn from_record(record: UrlRecord, stats: &RunStats) -> Self {
        let UrlRecord {
            url,
            mut samples,
            count,
            time_sum,
        } = record;

        let count_perc = percent(count as f64, stats.total_lines_parsed as f64);
        let time_perc = percent(time_sum, stats.total_time_sum);
        let time_avg = if count == 0 { 0.0 } else { time_sum / count as f64 };
        let time_max = samples.iter().copied().fold(0.0, f64::max);
        let time_med = median(&mut samples);

        Self {
            url,
            count,
            count_perc,
            time_avg,
            time_max,
            time_med,
            time_perc,
            time_sum,
        }
    }
}

/// Median of the samples, sorting them in place
///
/// Even-length inputs average the two central values. Empty input yields 0.
pub fn median(samples: &mut [f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    samples.sort_by(f64::total_cmp);
    let mid = samples.len() / 2;
    if samples.len().is_multiple_of(2) {
        (samples[mid - 1] + samples[mid]) / 2.0
    } else {
        samples[mid]
    }
}

fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 { 100.0 * part / total } else { 0.0 }
}

fn rounded<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let scale = 10f64.powi(REPORT_PRECISION);
    serializer.serialize_f64((value * scale).round() / scale)
}
