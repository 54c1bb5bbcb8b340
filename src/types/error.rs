use thiserror::Error;

use crate::parse::ParseError;

/// A structural defect in a ruleset document, reported at load time.
///
/// `path` locates the offending node, e.g.
/// `scoring.highRiskTriggers[0].whenAny[1]`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ruleset is missing required section '{section}'")]
    MissingSection { section: &'static str },

    #[error("condition at {path} has no recognized shape")]
    UnrecognizedCondition { path: String },

    #[error("condition at {path} mixes {first} and {second}")]
    AmbiguousCondition {
        path: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("condition at {path} has an unsupported literal (expected string, number, or boolean)")]
    UnsupportedLiteral { path: String },

    #[error("condition at {path} needs a 'field' for '{key}'")]
    MissingField { path: String, key: &'static str },

    #[error("invalid condition expression at {path}: {source}")]
    InvalidExpression {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("undefined condition reference '{reference}' at {path}")]
    UndefinedConditionRef { path: String, reference: String },

    #[error("cyclic condition reference detected: {}", cycle.join(" -> "))]
    CyclicConditionRef { cycle: Vec<String> },

    #[error("outcome at {path} has no determination")]
    MissingDetermination { path: String },

    #[error("non-finite number at {path}")]
    NonFiniteNumber { path: String },

    #[error("'{table}' must contain at least one band")]
    EmptyBandTable { table: &'static str },

    #[error("high-risk trigger at {path} has an empty 'whenAny' and can never fire")]
    EmptyTriggerGuard { path: String },

    #[error("'numeric' guard at {path} must be a single gte/gt/lte/lt comparison")]
    NotNumericGuard { path: String },

    #[error("invalid summary template at {path}: {source}")]
    InvalidTemplate {
        path: String,
        #[source]
        source: ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_section_message() {
        let err = ConfigError::MissingSection { section: "scoring" };
        assert_eq!(err.to_string(), "ruleset is missing required section 'scoring'");
    }

    #[test]
    fn ambiguous_condition_message() {
        let err = ConfigError::AmbiguousCondition {
            path: "rulesInOrder[0].whenAll[0]".into(),
            first: "all",
            second: "any",
        };
        assert_eq!(
            err.to_string(),
            "condition at rulesInOrder[0].whenAll[0] mixes all and any"
        );
    }

    #[test]
    fn cyclic_reference_message() {
        let err = ConfigError::CyclicConditionRef {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic condition reference detected: a -> b -> a");
    }

    #[test]
    fn undefined_reference_message() {
        let err = ConfigError::UndefinedConditionRef {
            path: "scoring.lowerRiskAdds[2].whenAll[0]".into(),
            reference: "spot_only".into(),
        };
        assert_eq!(
            err.to_string(),
            "undefined condition reference 'spot_only' at scoring.lowerRiskAdds[2].whenAll[0]"
        );
    }

    #[test]
    fn missing_determination_message() {
        let err = ConfigError::MissingDetermination {
            path: "scoring.highRiskTriggers[0].outcome".into(),
        };
        assert_eq!(
            err.to_string(),
            "outcome at scoring.highRiskTriggers[0].outcome has no determination"
        );
    }

    #[test]
    fn empty_band_table_message() {
        let err = ConfigError::EmptyBandTable {
            table: "meta.riskBands",
        };
        assert_eq!(err.to_string(), "'meta.riskBands' must contain at least one band");
    }

    #[test]
    fn not_numeric_guard_message() {
        let err = ConfigError::NotNumericGuard {
            path: "scoring.lowerRiskAdds[0].numeric".into(),
        };
        assert_eq!(
            err.to_string(),
            "'numeric' guard at scoring.lowerRiskAdds[0].numeric must be a single gte/gt/lte/lt comparison"
        );
    }
}
