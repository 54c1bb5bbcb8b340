//! Serde schema of a ruleset document.
//!
//! These types mirror the JSON shape one-to-one and are deliberately loose:
//! every section is optional here so that [`compile`](crate::compile) can
//! report a missing or malformed section as a [`ConfigError`](super::ConfigError)
//! with a path, instead of a bare deserialization error.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use super::driver::Driver;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RulesetDocument {
    pub meta: Option<MetaDoc>,
    #[serde(default)]
    pub rules_in_order: Vec<EarlyExitDoc>,
    pub scoring: Option<ScoringDoc>,
    #[serde(default)]
    pub conditions: BTreeMap<String, ConditionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetaDoc {
    #[serde(default = "default_risk_score_max")]
    pub risk_score_max: u32,
    #[serde(default)]
    pub confidence_by_unknowns: Vec<ConfidenceBandDoc>,
    #[serde(default)]
    pub risk_bands: Vec<RiskBandDoc>,
    #[serde(default)]
    pub defaults: DefaultsDoc,
    pub max_recommendations: Option<usize>,
    pub summary: Option<Vec<String>>,
}

fn default_risk_score_max() -> u32 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfidenceBandDoc {
    pub max_unknowns: u32,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RiskBandDoc {
    pub min: f64,
    pub label: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DefaultsDoc {
    #[serde(default)]
    pub baseline_risk: f64,
    pub fallback_confidence: Option<String>,
    pub fallback_risk_band: Option<String>,
    pub unknown_penalty_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EarlyExitDoc {
    #[serde(default)]
    pub when_all: Vec<ConditionDoc>,
    pub outcome: OutcomeDoc,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OutcomeDoc {
    pub determination: Option<String>,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub unknowns: u32,
    #[serde(default)]
    pub why_text: String,
    #[serde(default)]
    pub next_action: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoringDoc {
    #[serde(default)]
    pub baseline_drivers: Vec<Driver>,
    #[serde(default)]
    pub unknown_penalties: Vec<PenaltyDoc>,
    #[serde(default)]
    pub high_risk_triggers: Vec<HighRiskTriggerDoc>,
    #[serde(default)]
    pub conditional_triggers: Vec<ConditionalTriggerDoc>,
    #[serde(default)]
    pub lower_risk_adds: Vec<LowerRiskAddDoc>,
    pub default_outcome: Option<OutcomeDoc>,
    #[serde(default)]
    pub default_recommendations: Vec<String>,
    #[serde(default)]
    pub recommendation_rules: Vec<RecommendationRuleDoc>,
}

/// An unknown penalty is itself a condition node carrying a label and
/// points, or names its condition under `when`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PenaltyDoc {
    pub when: Option<ConditionDoc>,
    #[serde(flatten)]
    pub node: ConditionNode,
    pub label: String,
    pub points: i64,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HighRiskTriggerDoc {
    #[serde(default)]
    pub when_any: Vec<ConditionDoc>,
    pub label: String,
    pub add_points: i64,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub outcome: OutcomeDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConditionalTriggerDoc {
    #[serde(default)]
    pub when_all: Vec<ConditionDoc>,
    #[serde(default)]
    pub when_any: Vec<ConditionDoc>,
    pub numeric: Option<ConditionDoc>,
    pub label: String,
    pub add_points: i64,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub outcome: OutcomeDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LowerRiskAddDoc {
    #[serde(default)]
    pub when_all: Vec<ConditionDoc>,
    pub numeric: Option<ConditionDoc>,
    pub label: String,
    pub add_points: i64,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendationRuleDoc {
    pub when_driver_label_contains: Option<String>,
    pub when_confidence_is_not: Option<String>,
    pub recommendations: Vec<String>,
}

/// A condition is either an expression string or a JSON node.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ConditionDoc {
    Expression(String),
    Node(ConditionNode),
}

/// Every key the condition grammar recognizes. Which keys are present
/// decides the kind; compilation rejects nodes with none or several.
///
/// A kind key set to `null` still counts as present, so it is reported as
/// an unsupported literal or a mixed node instead of vanishing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConditionNode {
    pub field: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub equals: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub not_equals: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub includes: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub gte: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub gt: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub lte: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub lt: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub is_number: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub all: Option<Vec<ConditionDoc>>,
    #[serde(default, deserialize_with = "present")]
    pub any: Option<Vec<ConditionDoc>>,
    #[serde(rename = "ref", default, deserialize_with = "present")]
    pub reference: Option<String>,
}

/// `Some` whenever the key exists, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
