use crate::{Error, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref LOG_NAME_PATTERN: Regex =
        Regex::new(r"^nginx-access-ui\.log-(\d{8})(\.gz)?$").unwrap();
}

/// A rotated access log selected for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub date: NaiveDate,
    pub compressed: bool,
}

impl LogFile {
    /// Recognize a rotated log by file name
    ///
    /// Returns `None` for names that are not `nginx-access-ui.log-YYYYMMDD[.gz]`
    /// or whose date is not a real calendar date.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let caps = LOG_NAME_PATTERN.captures(name)?;

        let date = match NaiveDate::parse_from_str(&caps[1], "%Y%m%d") {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!("Ignoring {} with malformed date: {}", name, e);
                return None;
            }
        };

        Some(Self {
            path: path.to_path_buf(),
            date,
            compressed: caps.get(2).is_some(),
        })
    }
}

/// Find the most recent rotated log in a directory
///
/// When a plain and a gzipped log exist for the same date the plain one wins.
pub fn find_latest(dir: &Path) -> Result<LogFile> {
    tracing::debug!("Scanning {} for rotated logs", dir.display());

    let entries = fs::read_dir(dir).map_err(|e| {
        Error::SourceNotFound(format!("cannot read log directory {}: {}", dir.display(), e))
    })?;

    let mut latest: Option<LogFile> = None;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(candidate) = LogFile::from_path(&path) else {
            continue;
        };

        let newer = match &latest {
            None => true,
            Some(current) => {
                (candidate.date, !candidate.compressed) > (current.date, !current.compressed)
            }
        };
        if newer {
            latest = Some(candidate);
        }
    }

    let latest = latest.ok_or_else(|| {
        Error::SourceNotFound(format!("no nginx-access-ui log in {}", dir.display()))
    })?;

    tracing::info!(
        "Latest log: {} ({})",
        latest.path.display(),
        latest.date.format("%Y-%m-%d")
    );

    Ok(latest)
}
