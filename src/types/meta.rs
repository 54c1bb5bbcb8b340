/// Maps an unknowns count to a confidence label. Matches when
/// `unknowns <= max_unknowns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidenceBand {
    pub max_unknowns: u32,
    pub label: String,
}

/// Maps a clamped risk score to a band label. Matches when `score >= min`.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskBand {
    pub min: f64,
    pub label: String,
}

pub const DEFAULT_FALLBACK_LABEL: &str = "Low";
pub const DEFAULT_UNKNOWN_PENALTY_DETAIL: &str =
    "Critical uncertainty increases screening risk and reduces confidence.";

/// Score ceiling, band tables, and defaults shared by every stage.
///
/// Band tables are kept sorted: confidence bands by ascending
/// `max_unknowns`, risk bands by descending `min`. Both sorts are stable,
/// so document order breaks ties.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub(crate) risk_score_max: u32,
    pub(crate) confidence_bands: Vec<ConfidenceBand>,
    pub(crate) risk_bands: Vec<RiskBand>,
    pub(crate) baseline_risk: f64,
    pub(crate) fallback_confidence: String,
    pub(crate) fallback_risk_band: String,
    pub(crate) unknown_penalty_detail: String,
    pub(crate) max_recommendations: Option<usize>,
    pub(crate) summary: Option<Vec<String>>,
}

impl Meta {
    pub fn new(
        risk_score_max: u32,
        mut confidence_bands: Vec<ConfidenceBand>,
        mut risk_bands: Vec<RiskBand>,
        baseline_risk: f64,
    ) -> Self {
        confidence_bands.sort_by_key(|b| b.max_unknowns);
        risk_bands.sort_by(|a, b| b.min.total_cmp(&a.min));
        Self {
            risk_score_max,
            confidence_bands,
            risk_bands,
            baseline_risk,
            fallback_confidence: DEFAULT_FALLBACK_LABEL.to_owned(),
            fallback_risk_band: DEFAULT_FALLBACK_LABEL.to_owned(),
            unknown_penalty_detail: DEFAULT_UNKNOWN_PENALTY_DETAIL.to_owned(),
            max_recommendations: None,
            summary: None,
        }
    }

    #[must_use]
    pub fn with_fallback_confidence(mut self, label: impl Into<String>) -> Self {
        self.fallback_confidence = label.into();
        self
    }

    #[must_use]
    pub fn with_fallback_risk_band(mut self, label: impl Into<String>) -> Self {
        self.fallback_risk_band = label.into();
        self
    }

    #[must_use]
    pub fn with_unknown_penalty_detail(mut self, detail: impl Into<String>) -> Self {
        self.unknown_penalty_detail = detail.into();
        self
    }

    #[must_use]
    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = Some(max);
        self
    }

    #[must_use]
    pub fn with_summary(mut self, lines: Vec<String>) -> Self {
        self.summary = Some(lines);
        self
    }

    #[must_use]
    pub fn risk_score_max(&self) -> u32 {
        self.risk_score_max
    }

    #[must_use]
    pub fn baseline_risk(&self) -> f64 {
        self.baseline_risk
    }

    #[must_use]
    pub fn confidence_bands(&self) -> &[ConfidenceBand] {
        &self.confidence_bands
    }

    #[must_use]
    pub fn risk_bands(&self) -> &[RiskBand] {
        &self.risk_bands
    }

    #[must_use]
    pub fn unknown_penalty_detail(&self) -> &str {
        &self.unknown_penalty_detail
    }

    #[must_use]
    pub fn max_recommendations(&self) -> Option<usize> {
        self.max_recommendations
    }

    /// Summary template lines carried by the ruleset, if any.
    #[must_use]
    pub fn summary(&self) -> Option<&[String]> {
        self.summary.as_deref()
    }

    /// Round to the nearest integer and clamp to `[0, risk_score_max]`.
    /// Non-finite scores clamp to 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clamp_score(&self, raw: f64) -> u32 {
        if !raw.is_finite() {
            return 0;
        }
        let rounded = raw.round();
        if rounded <= 0.0 {
            0
        } else if rounded >= f64::from(self.risk_score_max) {
            self.risk_score_max
        } else {
            rounded as u32
        }
    }

    /// Confidence label for an unknowns count. The first band (ascending)
    /// whose `max_unknowns` covers the count wins; otherwise the fallback.
    #[must_use]
    pub fn confidence_for(&self, unknowns: u32) -> &str {
        self.confidence_bands
            .iter()
            .find(|band| unknowns <= band.max_unknowns)
            .map_or(self.fallback_confidence.as_str(), |band| band.label.as_str())
    }

    /// Risk band label for a clamped score. The first band (descending by
    /// `min`) with `score >= min` wins; otherwise the fallback.
    #[must_use]
    pub fn risk_band_for(&self, score: u32) -> &str {
        let score = f64::from(score);
        self.risk_bands
            .iter()
            .find(|band| score >= band.min)
            .map_or(self.fallback_risk_band.as_str(), |band| band.label.as_str())
    }
}
