use std::fmt;

use serde::{Deserialize, Serialize};

use super::driver::Driver;

/// The engine's only output. Field names are serialized in camelCase and are
/// part of the stable interface consumed by renderers and summary templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct Decision {
    pub determination: String,
    pub risk_score: u32,
    pub risk_band: String,
    pub confidence: String,
    pub why_text: String,
    pub next_action: String,
    pub recommendations: Vec<String>,
    /// Sorted by descending points; ties keep accumulation order.
    pub drivers: Vec<Driver>,
}

impl Decision {
    /// The `n` highest-scoring drivers.
    #[must_use]
    pub fn top_drivers(&self, n: usize) -> &[Driver] {
        &self.drivers[..n.min(self.drivers.len())]
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (risk {} {}, confidence {})",
            self.determination, self.risk_score, self.risk_band, self.confidence
        )
    }
}
