//! A data-driven decision engine for protected-species screening.
//!
//! A [`Ruleset`] is loaded from a JSON document (or built with
//! [`RulesetBuilder`]) and evaluated against a flat [`Answers`] map. The
//! result is a [`Decision`]: a determination, a clamped risk score and band,
//! a confidence label, explanatory text, recommendations, and the scored
//! drivers behind it.
//!
//! Evaluation runs in fixed stages and stops at the first exit:
//! early-exit rules, baseline, unknown penalties, high-risk triggers,
//! conditional triggers, lower-risk adds, and finally the default outcome.

mod compile;
mod error;
mod evaluate;
pub mod matcher;
pub mod parse;
#[cfg(feature = "binary-cache")]
pub mod serial;
pub mod summary;
mod types;

pub use error::ScreenError;
pub use matcher::{matches, matches_numeric};
pub use parse::{parse_condition, ParseError};
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use summary::SummaryTemplate;
pub use types::{
    all, any, field, Answer, Answers, Condition, ConditionalTrigger, ConditionalTriggerBuilder,
    ConfidenceBand, ConfigError, Decision, Driver, EarlyExitRule, EvaluationReport, ExitStage,
    Expr, FieldCondition, HighRiskTrigger, LowerRiskAdd, Meta, NumericGuard, NumericOp, Outcome,
    RecommendationRule, RecommendationTrigger, RiskBand, Ruleset, RulesetBuilder, Scoring,
    TriggerOutcome, UnknownPenalty, Value, DEFAULT_FALLBACK_LABEL, DEFAULT_UNKNOWN_PENALTY_DETAIL,
};
