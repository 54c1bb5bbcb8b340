use std::fmt;

use serde::{Deserialize, Serialize};

/// One scored reason contributing to (or against) the risk score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub label: String,
    pub points: i64,
    #[serde(default)]
    pub detail: String,
}

impl Driver {
    pub fn new(label: impl Into<String>, points: i64, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            points,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.points > 0 { "+" } else { "" };
        write!(f, "{} ({sign}{} points)", self.label, self.points)?;
        if !self.detail.is_empty() {
            write!(f, ". {}", self.detail)?;
        }
        Ok(())
    }
}

/// Sort drivers by descending points. The sort is stable, so drivers with
/// equal points keep their accumulation order.
pub(crate) fn sort_drivers(drivers: &mut [Driver]) {
    drivers.sort_by(|a, b| b.points.cmp(&a.points));
}
