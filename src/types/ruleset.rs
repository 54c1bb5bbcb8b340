use std::fmt;

use super::answers::Answers;
use super::condition::{Condition, NumericGuard};
use super::decision::Decision;
use super::driver::Driver;
use super::error::ConfigError;
use super::evaluation_report::EvaluationReport;
use super::meta::Meta;
use super::rule::{
    ConditionalTrigger, EarlyExitRule, HighRiskTrigger, LowerRiskAdd, Outcome,
    RecommendationRule, RecommendationTrigger, TriggerOutcome, UnknownPenalty,
};
use crate::summary::SummaryTemplate;

/// The scoring pipeline: every stage after the early exits.
#[derive(Debug, Clone, PartialEq)]
pub struct Scoring {
    pub(crate) baseline_drivers: Vec<Driver>,
    pub(crate) unknown_penalties: Vec<UnknownPenalty>,
    pub(crate) high_risk_triggers: Vec<HighRiskTrigger>,
    pub(crate) conditional_triggers: Vec<ConditionalTrigger>,
    pub(crate) lower_risk_adds: Vec<LowerRiskAdd>,
    pub(crate) default_outcome: TriggerOutcome,
    pub(crate) default_recommendations: Vec<String>,
    pub(crate) recommendation_rules: Vec<RecommendationRule>,
}

impl Scoring {
    #[must_use]
    pub fn baseline_drivers(&self) -> &[Driver] {
        &self.baseline_drivers
    }

    #[must_use]
    pub fn unknown_penalties(&self) -> &[UnknownPenalty] {
        &self.unknown_penalties
    }

    #[must_use]
    pub fn high_risk_triggers(&self) -> &[HighRiskTrigger] {
        &self.high_risk_triggers
    }

    #[must_use]
    pub fn conditional_triggers(&self) -> &[ConditionalTrigger] {
        &self.conditional_triggers
    }

    #[must_use]
    pub fn lower_risk_adds(&self) -> &[LowerRiskAdd] {
        &self.lower_risk_adds
    }

    #[must_use]
    pub fn default_outcome(&self) -> &TriggerOutcome {
        &self.default_outcome
    }

    #[must_use]
    pub fn default_recommendations(&self) -> &[String] {
        &self.default_recommendations
    }

    #[must_use]
    pub fn recommendation_rules(&self) -> &[RecommendationRule] {
        &self.recommendation_rules
    }
}

/// Builder for constructing a [`Ruleset`] in code.
///
/// # Example
///
/// ```
/// use screening_engine::{
///     field, Answers, ConfidenceBand, Driver, Meta, Outcome, RiskBand, RulesetBuilder,
///     TriggerOutcome,
/// };
///
/// let meta = Meta::new(
///     100,
///     vec![ConfidenceBand { max_unknowns: 0, label: "High".into() }],
///     vec![RiskBand { min: 0.0, label: "Low".into() }],
///     10.0,
/// );
/// let ruleset = RulesetBuilder::new(meta)
///     .early_exit([field("federal_nexus").neq("Yes")], Outcome::new("Outside Section 7", 0.0))
///     .high_risk_trigger(
///         [field("activities").includes("Insecticide application")],
///         Driver::new("Pesticide exposure risk", 60, ""),
///         TriggerOutcome::new("May Affect, Likely to Adversely Affect"),
///     )
///     .default_outcome(TriggerOutcome::new("May Affect, Not Likely to Adversely Affect"))
///     .compile()
///     .unwrap();
///
/// let decision = ruleset.evaluate(&Answers::new().set("federal_nexus", "No"));
/// assert_eq!(decision.determination, "Outside Section 7");
/// ```
#[derive(Debug)]
pub struct RulesetBuilder {
    meta: Meta,
    early_exits: Vec<EarlyExitRule>,
    baseline_drivers: Vec<Driver>,
    unknown_penalties: Vec<UnknownPenalty>,
    high_risk_triggers: Vec<HighRiskTrigger>,
    conditional_triggers: Vec<ConditionalTriggerBuilder>,
    lower_risk_adds: Vec<LowerRiskAdd>,
    default_outcome: Option<TriggerOutcome>,
    default_recommendations: Vec<String>,
    recommendation_rules: Vec<RecommendationRule>,
}

/// Intermediate builder passed to the conditional trigger closure.
///
/// Every guard is optional; a trigger with none fires unconditionally.
/// `.outcome()` must be called or compilation fails with
/// [`ConfigError::MissingDetermination`].
#[derive(Debug)]
pub struct ConditionalTriggerBuilder {
    when_all: Vec<Condition>,
    when_any: Vec<Condition>,
    numeric: Option<NumericGuard>,
    driver: Driver,
    outcome: Option<TriggerOutcome>,
}

impl ConditionalTriggerBuilder {
    #[must_use]
    pub fn when_all(mut self, condition: Condition) -> Self {
        self.when_all.push(condition);
        self
    }

    #[must_use]
    pub fn when_any(mut self, condition: Condition) -> Self {
        self.when_any.push(condition);
        self
    }

    #[must_use]
    pub fn numeric(mut self, guard: NumericGuard) -> Self {
        self.numeric = Some(guard);
        self
    }

    #[must_use]
    pub fn driver(mut self, driver: Driver) -> Self {
        self.driver = driver;
        self
    }

    #[must_use]
    pub fn outcome(mut self, outcome: TriggerOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

impl RulesetBuilder {
    #[must_use]
    pub fn new(meta: Meta) -> Self {
        Self {
            meta,
            early_exits: Vec::new(),
            baseline_drivers: Vec::new(),
            unknown_penalties: Vec::new(),
            high_risk_triggers: Vec::new(),
            conditional_triggers: Vec::new(),
            lower_risk_adds: Vec::new(),
            default_outcome: None,
            default_recommendations: Vec::new(),
            recommendation_rules: Vec::new(),
        }
    }

    /// Append an early-exit rule. Rules are checked in insertion order.
    #[must_use]
    pub fn early_exit(
        mut self,
        when_all: impl IntoIterator<Item = Condition>,
        outcome: Outcome,
    ) -> Self {
        self.early_exits.push(EarlyExitRule {
            when_all: when_all.into_iter().collect(),
            outcome,
        });
        self
    }

    #[must_use]
    pub fn baseline_driver(mut self, driver: Driver) -> Self {
        self.baseline_drivers.push(driver);
        self
    }

    /// Append an unknown penalty. Its driver detail is the ruleset default.
    #[must_use]
    pub fn unknown_penalty(mut self, condition: Condition, label: &str, points: i64) -> Self {
        self.unknown_penalties.push(UnknownPenalty {
            condition,
            label: label.to_owned(),
            points,
            detail: None,
        });
        self
    }

    #[must_use]
    pub fn high_risk_trigger(
        mut self,
        when_any: impl IntoIterator<Item = Condition>,
        driver: Driver,
        outcome: TriggerOutcome,
    ) -> Self {
        self.high_risk_triggers.push(HighRiskTrigger {
            when_any: when_any.into_iter().collect(),
            driver,
            outcome,
        });
        self
    }

    /// Define a conditional trigger through a closure.
    #[must_use]
    pub fn conditional_trigger(
        mut self,
        f: impl FnOnce(ConditionalTriggerBuilder) -> ConditionalTriggerBuilder,
    ) -> Self {
        let builder = f(ConditionalTriggerBuilder {
            when_all: Vec::new(),
            when_any: Vec::new(),
            numeric: None,
            driver: Driver::new("", 0, ""),
            outcome: None,
        });
        self.conditional_triggers.push(builder);
        self
    }

    #[must_use]
    pub fn lower_risk_add(
        mut self,
        when_all: impl IntoIterator<Item = Condition>,
        numeric: Option<NumericGuard>,
        driver: Driver,
    ) -> Self {
        self.lower_risk_adds.push(LowerRiskAdd {
            when_all: when_all.into_iter().collect(),
            numeric,
            driver,
        });
        self
    }

    #[must_use]
    pub fn default_outcome(mut self, outcome: TriggerOutcome) -> Self {
        self.default_outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn default_recommendations<S: Into<String>>(
        mut self,
        recommendations: impl IntoIterator<Item = S>,
    ) -> Self {
        self.default_recommendations
            .extend(recommendations.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn recommendation_rule<S: Into<String>>(
        mut self,
        when: RecommendationTrigger,
        recommendations: impl IntoIterator<Item = S>,
    ) -> Self {
        self.recommendation_rules.push(RecommendationRule {
            when,
            recommendations: recommendations.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Validate and freeze the ruleset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the default outcome or a trigger outcome
    /// is missing, a band table is empty, a high-risk trigger has no
    /// `when_any`, or a score or threshold is not finite.
    pub fn compile(self) -> Result<Ruleset, ConfigError> {
        let default_outcome = self.default_outcome.ok_or(ConfigError::MissingSection {
            section: "scoring.defaultOutcome",
        })?;

        let conditional_triggers = self
            .conditional_triggers
            .into_iter()
            .enumerate()
            .map(|(i, b)| {
                let outcome = b.outcome.ok_or_else(|| ConfigError::MissingDetermination {
                    path: format!("scoring.conditionalTriggers[{i}].outcome"),
                })?;
                Ok(ConditionalTrigger {
                    when_all: b.when_all,
                    when_any: b.when_any,
                    numeric: b.numeric,
                    driver: b.driver,
                    outcome,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        crate::compile::finish(
            self.meta,
            self.early_exits,
            Scoring {
                baseline_drivers: self.baseline_drivers,
                unknown_penalties: self.unknown_penalties,
                high_risk_triggers: self.high_risk_triggers,
                conditional_triggers,
                lower_risk_adds: self.lower_risk_adds,
                default_outcome,
                default_recommendations: self.default_recommendations,
                recommendation_rules: self.recommendation_rules,
            },
        )
    }
}

/// A compiled, immutable screening ruleset. Thread-safe and designed to
/// live behind `Arc`; swap the `Arc` to reload.
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub(crate) meta: Meta,
    pub(crate) early_exits: Vec<EarlyExitRule>,
    pub(crate) scoring: Scoring,
    pub(crate) summary: Option<SummaryTemplate>,
}

impl Ruleset {
    /// Evaluate the ruleset against one set of answers.
    ///
    /// Never fails: missing or malformed answers only make conditions
    /// false.
    pub fn evaluate(&self, answers: &Answers) -> Decision {
        crate::evaluate::evaluate(self, answers).decision
    }

    /// Evaluate with diagnostics: the exit stage, the unknowns count, and
    /// timing information.
    pub fn evaluate_detailed(&self, answers: &Answers) -> EvaluationReport {
        crate::evaluate::evaluate_detailed(self, answers)
    }

    /// Parse and compile a JSON ruleset document.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError`](crate::ScreenError) on malformed JSON or a
    /// structural defect in the document.
    pub fn from_json(input: &str) -> Result<Self, crate::ScreenError> {
        let document = serde_json::from_str(input)?;
        Ok(crate::compile::compile(document)?)
    }

    /// Compile an already-parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError`](crate::ScreenError) if the value does not
    /// have the ruleset shape or has a structural defect.
    pub fn from_value(value: serde_json::Value) -> Result<Self, crate::ScreenError> {
        let document = serde_json::from_value(value)?;
        Ok(crate::compile::compile(document)?)
    }

    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    #[must_use]
    pub fn early_exits(&self) -> &[EarlyExitRule] {
        &self.early_exits
    }

    #[must_use]
    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }

    /// Render the ruleset's `meta.summary` template for a decision.
    /// Returns `None` when the ruleset carries no template.
    #[must_use]
    pub fn summary(&self, decision: &Decision, answers: &Answers) -> Option<String> {
        self.summary
            .as_ref()
            .map(|t| t.render(decision, answers, self.meta.risk_score_max))
    }
}

#[cfg(feature = "binary-cache")]
impl Ruleset {
    /// Serialize this compiled ruleset to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata. Use [`cached_source_digest`](Self::cached_source_digest)
    /// to detect when the source document has changed.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a compiled ruleset from bytes produced by
    /// [`to_bytes`](Self::to_bytes). The ruleset is re-validated.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// The BLAKE3 digest of the source document embedded by
    /// [`to_bytes`](Self::to_bytes), if one was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) if the
    /// bytes are not a valid cache.
    pub fn cached_source_digest(
        bytes: &[u8],
    ) -> Result<Option<[u8; 32]>, crate::serial::DeserializeError> {
        crate::serial::source_digest(bytes)
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ruleset({} early exits, {} penalties, {} high-risk, {} conditional, {} lower-risk)",
            self.early_exits.len(),
            self.scoring.unknown_penalties.len(),
            self.scoring.high_risk_triggers.len(),
            self.scoring.conditional_triggers.len(),
            self.scoring.lower_risk_adds.len(),
        )
    }
}
