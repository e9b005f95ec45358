mod writer;

pub use writer::ReportWriter;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Report template shipped with the crate
pub const DEFAULT_TEMPLATE: &str = include_str!("template.html");

/// Token in the template replaced by the JSON rows
pub const PLACEHOLDER: &str = "$table_json";

/// Where the report for a given log date lives
pub fn report_path(report_dir: &Path, date: NaiveDate) -> PathBuf {
    report_dir.join(format!("report-{}.html", date.format("%Y.%m.%d")))
}
