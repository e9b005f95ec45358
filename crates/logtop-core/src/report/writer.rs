use super::{DEFAULT_TEMPLATE, PLACEHOLDER, report_path};
use crate::analysis::ReportRow;
use crate::config::Config;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Renders report rows into the HTML template and stores them per log date
pub struct ReportWriter {
    report_dir: PathBuf,
    template: String,
}

impl ReportWriter {
    /// Create a writer, checking the template has exactly one placeholder
    pub fn new(report_dir: impl Into<PathBuf>, template: String) -> Result<Self> {
        let placeholders = template.matches(PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(Error::Template(format!(
                "expected exactly one {} placeholder, found {}",
                PLACEHOLDER, placeholders
            )));
        }

        Ok(Self {
            report_dir: report_dir.into(),
            template,
        })
    }

    pub fn with_default_template(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Build a writer for `REPORT_DIR`, loading `REPORT_TEMPLATE` if configured
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.report_template {
            Some(path) => {
                tracing::debug!("Loading report template from: {}", path.display());
                let template = fs::read_to_string(path).map_err(|e| {
                    Error::Template(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::new(&config.report_dir, template)
            }
            None => Ok(Self::with_default_template(&config.report_dir)),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        report_path(&self.report_dir, date)
    }

    /// Whether the report for this date was already produced
    pub fn exists(&self, date: NaiveDate) -> bool {
        self.path_for(date).is_file()
    }

    /// Substitute the serialized rows into the template
    pub fn render(&self, rows: &[ReportRow]) -> Result<String> {
        // "</" inside a JSON string would close the surrounding <script>
        let json = serde_json::to_string(rows)?.replace("</", "<\\/");
        Ok(self.template.replacen(PLACEHOLDER, &json, 1))
    }

    /// Render and store the report for `date`, returning its path
    ///
    /// The HTML is written next to its destination and renamed into place, so
    /// an interrupted run never leaves a partial report behind.
    pub fn write(&self, date: NaiveDate, rows: &[ReportRow]) -> Result<PathBuf> {
        if !self.report_dir.is_dir() {
            return Err(Error::ReportDirNotFound(self.report_dir.clone()));
        }

        let path = self.path_for(date);
        tracing::debug!("Writing report to: {}", path.display());

        let html = self.render(rows)?;
        let tmp_path = path.with_extension("html.tmp");
        fs::write(&tmp_path, html)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::info!(
            "Successfully wrote report with {} URLs to {}",
            rows.len(),
            path.display()
        );

        Ok(path)
    }
}
