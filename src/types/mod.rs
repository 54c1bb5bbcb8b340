mod answers;
mod condition;
mod decision;
pub(crate) mod document;
mod driver;
mod error;
mod evaluation_report;
mod expr;
pub(crate) mod meta;
mod rule;
mod ruleset;
mod value;

pub use answers::{Answer, Answers};
pub use condition::{all, any, field, Condition, FieldCondition, NumericGuard, NumericOp};
pub use decision::Decision;
pub(crate) use driver::sort_drivers;
pub use driver::Driver;
pub use error::ConfigError;
pub use evaluation_report::{EvaluationReport, ExitStage};
pub use expr::Expr;
pub use meta::{
    ConfidenceBand, Meta, RiskBand, DEFAULT_FALLBACK_LABEL, DEFAULT_UNKNOWN_PENALTY_DETAIL,
};
pub use rule::{
    ConditionalTrigger, EarlyExitRule, HighRiskTrigger, LowerRiskAdd, Outcome,
    RecommendationRule, RecommendationTrigger, TriggerOutcome, UnknownPenalty,
};
pub use ruleset::{ConditionalTriggerBuilder, Ruleset, RulesetBuilder, Scoring};
pub use value::Value;
