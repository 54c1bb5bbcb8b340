use std::fmt;
use std::time::Duration;

use super::decision::Decision;

/// Where evaluation terminated. Indices point into the corresponding
/// ruleset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStage {
    EarlyExit(usize),
    HighRiskTrigger(usize),
    ConditionalTrigger(usize),
    Default,
}

impl ExitStage {
    /// Whether the scoring pipeline (baseline onwards) ran.
    #[must_use]
    pub fn scored(self) -> bool {
        !matches!(self, ExitStage::EarlyExit(_))
    }
}

impl fmt::Display for ExitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStage::EarlyExit(i) => write!(f, "rulesInOrder[{i}]"),
            ExitStage::HighRiskTrigger(i) => write!(f, "scoring.highRiskTriggers[{i}]"),
            ExitStage::ConditionalTrigger(i) => write!(f, "scoring.conditionalTriggers[{i}]"),
            ExitStage::Default => write!(f, "scoring.defaultOutcome"),
        }
    }
}

/// Detailed evaluation report returned by
/// [`Ruleset::evaluate_detailed()`](super::ruleset::Ruleset::evaluate_detailed).
///
/// Contains the decision, the stage that produced it, the unknowns count
/// behind the confidence label, and the wall-clock duration.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    decision: Decision,
    exit: ExitStage,
    unknowns: u32,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(
        decision: Decision,
        exit: ExitStage,
        unknowns: u32,
        duration: Duration,
    ) -> Self {
        Self {
            decision,
            exit,
            unknowns,
            duration,
        }
    }

    /// The decision, same as [`Ruleset::evaluate()`](super::ruleset::Ruleset::evaluate).
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn into_decision(self) -> Decision {
        self.decision
    }

    #[must_use]
    pub fn exit(&self) -> ExitStage {
        self.exit
    }

    /// Unknowns behind the confidence label: the early-exit outcome's own
    /// count, or the number of matched unknown penalties.
    #[must_use]
    pub fn unknowns(&self) -> u32 {
        self.unknowns
    }

    /// Wall-clock duration of the evaluation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decision: {}", self.decision)?;
        write!(f, ", exit: {}", self.exit)?;
        write!(f, ", unknowns: {}", self.unknowns)?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision() -> Decision {
        Decision {
            determination: "No Effect".into(),
            risk_score: 0,
            risk_band: "Low".into(),
            confidence: "High".into(),
            why_text: String::new(),
            next_action: String::new(),
            recommendations: vec![],
            drivers: vec![],
        }
    }

    #[test]
    fn report_accessors() {
        let report = EvaluationReport::new(
            decision(),
            ExitStage::HighRiskTrigger(1),
            2,
            Duration::from_nanos(500),
        );
        assert_eq!(report.decision().determination, "No Effect");
        assert_eq!(report.exit(), ExitStage::HighRiskTrigger(1));
        assert_eq!(report.unknowns(), 2);
        assert_eq!(report.duration(), Duration::from_nanos(500));
    }

    #[test]
    fn report_display() {
        let report =
            EvaluationReport::new(decision(), ExitStage::EarlyExit(0), 0, Duration::from_nanos(10));
        let s = report.to_string();
        assert!(s.contains("decision: No Effect"));
        assert!(s.contains("exit: rulesInOrder[0]"));
    }

    #[test]
    fn scored_stages() {
        assert!(!ExitStage::EarlyExit(3).scored());
        assert!(ExitStage::Default.scored());
        assert!(ExitStage::ConditionalTrigger(0).scored());
    }
}
