use super::condition::{Condition, NumericGuard};
use super::driver::Driver;

/// Terminal payload of an early-exit rule.
///
/// Early exits carry a fixed score and their own unknowns count rather than
/// a point delta, because they run before any accumulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub determination: String,
    pub risk_score: f64,
    pub unknowns: u32,
    pub why_text: String,
    pub next_action: String,
    pub recommendations: Vec<String>,
    pub drivers: Vec<Driver>,
}

impl Outcome {
    pub fn new(determination: impl Into<String>, risk_score: f64) -> Self {
        Self {
            determination: determination.into(),
            risk_score,
            unknowns: 0,
            why_text: String::new(),
            next_action: String::new(),
            recommendations: Vec::new(),
            drivers: Vec::new(),
        }
    }
}

/// Terminal payload of a trigger or of the default outcome. The score comes
/// from the running accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub determination: String,
    pub why_text: String,
    pub next_action: String,
}

impl TriggerOutcome {
    pub fn new(determination: impl Into<String>) -> Self {
        Self {
            determination: determination.into(),
            why_text: String::new(),
            next_action: String::new(),
        }
    }

    #[must_use]
    pub fn why(mut self, text: impl Into<String>) -> Self {
        self.why_text = text.into();
        self
    }

    #[must_use]
    pub fn next(mut self, text: impl Into<String>) -> Self {
        self.next_action = text.into();
        self
    }
}

/// A first-match rule checked before any scoring. `when_all` is a
/// conjunction; an empty list always matches.
#[derive(Debug, Clone, PartialEq)]
pub struct EarlyExitRule {
    pub when_all: Vec<Condition>,
    pub outcome: Outcome,
}

/// Counts one unknown and adds `points` when `condition` matches.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownPenalty {
    pub condition: Condition,
    pub label: String,
    pub points: i64,
    /// Driver detail; the ruleset default is used when `None`.
    pub detail: Option<String>,
}

/// Terminates scoring when any of `when_any` matches. An empty `when_any`
/// never matches and is rejected at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct HighRiskTrigger {
    pub when_any: Vec<Condition>,
    pub driver: Driver,
    pub outcome: TriggerOutcome,
}

/// Terminates scoring when `when_all`, `when_any`, and `numeric` all pass.
/// Empty lists and a missing numeric guard pass vacuously.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalTrigger {
    pub when_all: Vec<Condition>,
    pub when_any: Vec<Condition>,
    pub numeric: Option<NumericGuard>,
    pub driver: Driver,
    pub outcome: TriggerOutcome,
}

/// Adds its driver when `when_all` and `numeric` pass; never terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct LowerRiskAdd {
    pub when_all: Vec<Condition>,
    pub numeric: Option<NumericGuard>,
    pub driver: Driver,
}

/// When a follow-up recommendation applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationTrigger {
    /// Some driver label contains this phrase (case-insensitive).
    DriverLabelContains(String),
    /// The resulting confidence label differs from this one.
    ConfidenceIsNot(String),
}

/// Follow-up recommendations appended on the scoring path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRule {
    pub when: RecommendationTrigger,
    pub recommendations: Vec<String>,
}

impl RecommendationRule {
    pub(crate) fn applies(&self, drivers: &[Driver], confidence: &str) -> bool {
        match &self.when {
            RecommendationTrigger::DriverLabelContains(phrase) => {
                let phrase = phrase.to_lowercase();
                drivers
                    .iter()
                    .any(|d| d.label.to_lowercase().contains(&phrase))
            }
            RecommendationTrigger::ConfidenceIsNot(label) => confidence != label,
        }
    }
}
