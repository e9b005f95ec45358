use super::RunStats;
use crate::{Error, Result};

/// Maximum share of unparseable lines tolerated before a log is rejected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBudget {
    limit: f64,
}

impl ErrorBudget {
    /// `limit` is a percentage, e.g. `1.0` for 1%
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Validate a finished run, returning its parse error percentage
    ///
    /// A log without any lines is reported as [`Error::EmptyInput`]; reaching
    /// the limit exactly is still within budget.
    pub fn check(&self, stats: &RunStats) -> Result<f64> {
        let error_percent = stats.parse_error_percent().ok_or(Error::EmptyInput)?;

        if error_percent > self.limit {
            tracing::error!(
                "Parse error rate {:.2}% exceeds limit {}%",
                error_percent,
                self.limit
            );
            return Err(Error::ParseBudgetExceeded {
                error_percent,
                limit: self.limit,
            });
        }

        tracing::debug!(
            "Parse error rate {:.2}% within limit {}%",
            error_percent,
            self.limit
        );
        Ok(error_percent)
    }
}

impl Default for ErrorBudget {
    fn default() -> Self {
        Self::new(1.0)
    }
}
