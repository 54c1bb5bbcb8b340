use std::ops::ControlFlow;
use std::time::Instant;

use tracing::{debug, trace};

use crate::matcher::{matches, matches_all, matches_any, matches_numeric};
use crate::types::sort_drivers;
use crate::{
    Answers, Decision, Driver, EarlyExitRule, EvaluationReport, ExitStage, Ruleset,
    TriggerOutcome,
};

/// Running state of the scoring pipeline. The score stays unrounded until
/// a stage returns.
#[derive(Debug, Clone, PartialEq)]
struct Accumulator {
    score: f64,
    unknowns: u32,
    drivers: Vec<Driver>,
}

impl Accumulator {
    #[allow(clippy::cast_precision_loss)]
    fn add(&mut self, driver: &Driver) {
        self.score += driver.points as f64;
        self.drivers.push(driver.clone());
    }
}

/// Where the pipeline stopped, with everything needed to build the
/// decision.
enum Exit<'r> {
    Early {
        index: usize,
        rule: &'r EarlyExitRule,
    },
    Scored {
        stage: ExitStage,
        outcome: &'r TriggerOutcome,
        acc: Accumulator,
    },
}

pub(crate) struct Evaluation {
    pub(crate) decision: Decision,
    pub(crate) exit: ExitStage,
    pub(crate) unknowns: u32,
}

pub(crate) fn evaluate(ruleset: &Ruleset, answers: &Answers) -> Evaluation {
    let exit = match pipeline(ruleset, answers) {
        ControlFlow::Break(exit) => exit,
        ControlFlow::Continue(acc) => Exit::Scored {
            stage: ExitStage::Default,
            outcome: &ruleset.scoring.default_outcome,
            acc,
        },
    };
    let evaluation = finish(ruleset, exit);
    debug!(
        exit = %evaluation.exit,
        determination = %evaluation.decision.determination,
        risk_score = evaluation.decision.risk_score,
        unknowns = evaluation.unknowns,
        "screening evaluated"
    );
    evaluation
}

pub(crate) fn evaluate_detailed(ruleset: &Ruleset, answers: &Answers) -> EvaluationReport {
    let start = Instant::now();
    let evaluation = evaluate(ruleset, answers);
    let duration = start.elapsed();
    EvaluationReport::new(
        evaluation.decision,
        evaluation.exit,
        evaluation.unknowns,
        duration,
    )
}

fn pipeline<'r>(ruleset: &'r Ruleset, answers: &Answers) -> ControlFlow<Exit<'r>, Accumulator> {
    early_exits(ruleset, answers)?;
    let acc = baseline(ruleset);
    let acc = unknown_penalties(ruleset, answers, acc)?;
    let acc = high_risk_triggers(ruleset, answers, acc)?;
    let acc = conditional_triggers(ruleset, answers, acc)?;
    lower_risk_adds(ruleset, answers, acc)
}

// -- Stages -----------------------------------------------------------------

fn early_exits<'r>(ruleset: &'r Ruleset, answers: &Answers) -> ControlFlow<Exit<'r>> {
    match ruleset
        .early_exits
        .iter()
        .position(|rule| matches_all(answers, &rule.when_all))
    {
        Some(index) => ControlFlow::Break(Exit::Early {
            index,
            rule: &ruleset.early_exits[index],
        }),
        None => ControlFlow::Continue(()),
    }
}

fn baseline(ruleset: &Ruleset) -> Accumulator {
    Accumulator {
        score: ruleset.meta.baseline_risk,
        unknowns: 0,
        drivers: ruleset.scoring.baseline_drivers.clone(),
    }
}

fn unknown_penalties<'r>(
    ruleset: &'r Ruleset,
    answers: &Answers,
    mut acc: Accumulator,
) -> ControlFlow<Exit<'r>, Accumulator> {
    for penalty in &ruleset.scoring.unknown_penalties {
        if matches(answers, &penalty.condition) {
            trace!(label = %penalty.label, points = penalty.points, "unknown penalty matched");
            let detail = penalty
                .detail
                .as_deref()
                .unwrap_or(&ruleset.meta.unknown_penalty_detail);
            acc.unknowns += 1;
            acc.add(&Driver::new(penalty.label.as_str(), penalty.points, detail));
        }
    }
    ControlFlow::Continue(acc)
}

fn high_risk_triggers<'r>(
    ruleset: &'r Ruleset,
    answers: &Answers,
    mut acc: Accumulator,
) -> ControlFlow<Exit<'r>, Accumulator> {
    let fired = ruleset
        .scoring
        .high_risk_triggers
        .iter()
        .enumerate()
        .find(|(_, trigger)| matches_any(answers, &trigger.when_any));
    match fired {
        Some((index, trigger)) => {
            acc.add(&trigger.driver);
            ControlFlow::Break(Exit::Scored {
                stage: ExitStage::HighRiskTrigger(index),
                outcome: &trigger.outcome,
                acc,
            })
        }
        None => ControlFlow::Continue(acc),
    }
}

fn conditional_triggers<'r>(
    ruleset: &'r Ruleset,
    answers: &Answers,
    mut acc: Accumulator,
) -> ControlFlow<Exit<'r>, Accumulator> {
    let fired = ruleset
        .scoring
        .conditional_triggers
        .iter()
        .enumerate()
        .find(|(_, trigger)| {
            matches_all(answers, &trigger.when_all)
                && (trigger.when_any.is_empty() || matches_any(answers, &trigger.when_any))
                && trigger
                    .numeric
                    .as_ref()
                    .is_none_or(|guard| matches_numeric(answers, guard))
        });
    match fired {
        Some((index, trigger)) => {
            acc.add(&trigger.driver);
            ControlFlow::Break(Exit::Scored {
                stage: ExitStage::ConditionalTrigger(index),
                outcome: &trigger.outcome,
                acc,
            })
        }
        None => ControlFlow::Continue(acc),
    }
}

fn lower_risk_adds<'r>(
    ruleset: &'r Ruleset,
    answers: &Answers,
    mut acc: Accumulator,
) -> ControlFlow<Exit<'r>, Accumulator> {
    for add in &ruleset.scoring.lower_risk_adds {
        let passes = matches_all(answers, &add.when_all)
            && add
                .numeric
                .as_ref()
                .is_none_or(|guard| matches_numeric(answers, guard));
        if passes {
            trace!(label = %add.driver.label, points = add.driver.points, "lower-risk add matched");
            acc.add(&add.driver);
        }
    }
    ControlFlow::Continue(acc)
}

// -- Decision assembly ------------------------------------------------------

fn finish(ruleset: &Ruleset, exit: Exit<'_>) -> Evaluation {
    let meta = &ruleset.meta;
    match exit {
        Exit::Early { index, rule } => {
            let outcome = &rule.outcome;
            let risk_score = meta.clamp_score(outcome.risk_score);
            let mut drivers = outcome.drivers.clone();
            sort_drivers(&mut drivers);
            Evaluation {
                decision: Decision {
                    determination: outcome.determination.clone(),
                    risk_score,
                    risk_band: meta.risk_band_for(risk_score).to_owned(),
                    confidence: meta.confidence_for(outcome.unknowns).to_owned(),
                    why_text: outcome.why_text.clone(),
                    next_action: outcome.next_action.clone(),
                    recommendations: outcome.recommendations.clone(),
                    drivers,
                },
                exit: ExitStage::EarlyExit(index),
                unknowns: outcome.unknowns,
            }
        }
        Exit::Scored {
            stage,
            outcome,
            mut acc,
        } => {
            let risk_score = meta.clamp_score(acc.score);
            let confidence = meta.confidence_for(acc.unknowns);
            sort_drivers(&mut acc.drivers);
            let recommendations = recommendations(ruleset, &acc.drivers, confidence);
            Evaluation {
                decision: Decision {
                    determination: outcome.determination.clone(),
                    risk_score,
                    risk_band: meta.risk_band_for(risk_score).to_owned(),
                    confidence: confidence.to_owned(),
                    why_text: outcome.why_text.clone(),
                    next_action: outcome.next_action.clone(),
                    recommendations,
                    drivers: acc.drivers,
                },
                exit: stage,
                unknowns: acc.unknowns,
            }
        }
    }
}

/// Default recommendations followed by every matching rule's additions,
/// first occurrence wins, capped at `maxRecommendations`.
fn recommendations(ruleset: &Ruleset, drivers: &[Driver], confidence: &str) -> Vec<String> {
    let scoring = &ruleset.scoring;
    let candidates = scoring.default_recommendations.iter().chain(
        scoring
            .recommendation_rules
            .iter()
            .filter(|rule| rule.applies(drivers, confidence))
            .flat_map(|rule| rule.recommendations.iter()),
    );

    let mut out: Vec<String> = Vec::new();
    for rec in candidates {
        if !out.contains(rec) {
            out.push(rec.clone());
        }
    }
    if let Some(max) = ruleset.meta.max_recommendations {
        out.truncate(max);
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::{
        field, Answers, ConfidenceBand, Driver, ExitStage, Meta, NumericOp, Outcome,
        RecommendationTrigger, RiskBand, Ruleset, RulesetBuilder, TriggerOutcome,
    };

    fn meta() -> Meta {
        Meta::new(
            100,
            vec![
                ConfidenceBand {
                    max_unknowns: 0,
                    label: "High".into(),
                },
                ConfidenceBand {
                    max_unknowns: 2,
                    label: "Medium".into(),
                },
            ],
            vec![
                RiskBand {
                    min: 70.0,
                    label: "High".into(),
                },
                RiskBand {
                    min: 40.0,
                    label: "Moderate".into(),
                },
                RiskBand {
                    min: 0.0,
                    label: "Low".into(),
                },
            ],
            10.0,
        )
    }

    fn ruleset() -> Ruleset {
        RulesetBuilder::new(meta().with_max_recommendations(3))
            .early_exit(
                [field("nexus").neq("Yes")],
                Outcome::new("Outside", 0.0),
            )
            .baseline_driver(Driver::new("Baseline", 10, ""))
            .unknown_penalty(field("timing").eq("Not sure"), "Timing uncertain", 7)
            .unknown_penalty(field("season").eq("Not sure"), "Season uncertain", 7)
            .high_risk_trigger(
                [field("acts").includes("Insecticide application")],
                Driver::new("Pesticide exposure", 60, ""),
                TriggerOutcome::new("LAA"),
            )
            .conditional_trigger(|t| {
                t.when_all(field("forage").eq("Yes"))
                    .numeric(field("acres").guard(NumericOp::Gte, 2.0))
                    .driver(Driver::new("Forage 2 acres or more", 25, ""))
                    .outcome(TriggerOutcome::new("Contact"))
            })
            .lower_risk_add(
                [field("forage").eq("Yes")],
                Some(field("acres").guard(NumericOp::Lt, 2.0)),
                Driver::new("Forage under 2 acres", 10, ""),
            )
            .default_outcome(TriggerOutcome::new("NLAA"))
            .default_recommendations(["Confirm the action area.", "Keep records."])
            .recommendation_rule(
                RecommendationTrigger::DriverLabelContains("pesticide".into()),
                ["Avoid insecticides.", "Keep records."],
            )
            .recommendation_rule(
                RecommendationTrigger::ConfidenceIsNot("High".into()),
                ["Replace 'Not sure' answers."],
            )
            .compile()
            .unwrap()
    }

    #[test]
    fn early_exit_short_circuits() {
        let report = ruleset().evaluate_detailed(&Answers::new());
        assert_eq!(report.exit(), ExitStage::EarlyExit(0));
        assert_eq!(report.decision().determination, "Outside");
        assert_eq!(report.decision().risk_score, 0);
        assert_eq!(report.decision().confidence, "High");
    }

    #[test]
    fn default_path_accumulates() {
        let answers = Answers::new()
            .set("nexus", "Yes")
            .set("timing", "Not sure")
            .set("forage", "Yes")
            .set("acres", "1.5");
        let report = ruleset().evaluate_detailed(&answers);
        assert_eq!(report.exit(), ExitStage::Default);
        assert_eq!(report.unknowns(), 1);
        let d = report.decision();
        assert_eq!(d.determination, "NLAA");
        assert_eq!(d.risk_score, 27);
        assert_eq!(d.confidence, "Medium");
        let labels: Vec<&str> = d.drivers.iter().map(|x| x.label.as_str()).collect();
        assert_eq!(labels, ["Baseline", "Forage under 2 acres", "Timing uncertain"]);
    }

    #[test]
    fn high_risk_skips_later_stages() {
        let answers = Answers::new()
            .set("nexus", "Yes")
            .set("acts", ["Insecticide application"])
            .set("forage", "Yes")
            .set("acres", "5");
        let report = ruleset().evaluate_detailed(&answers);
        assert_eq!(report.exit(), ExitStage::HighRiskTrigger(0));
        let d = report.decision();
        assert_eq!(d.risk_score, 70);
        assert_eq!(d.risk_band, "High");
        assert!(d.drivers.iter().all(|x| !x.label.starts_with("Forage")));
    }

    #[test]
    fn conditional_trigger_fires_on_numeric_guard() {
        let answers = Answers::new()
            .set("nexus", "Yes")
            .set("forage", "Yes")
            .set("acres", 2_i64);
        let report = ruleset().evaluate_detailed(&answers);
        assert_eq!(report.exit(), ExitStage::ConditionalTrigger(0));
        assert_eq!(report.decision().risk_score, 35);
    }

    #[test]
    fn blank_numeric_answer_falls_through_both_guards() {
        let answers = Answers::new()
            .set("nexus", "Yes")
            .set("forage", "Yes")
            .set("acres", "");
        let report = ruleset().evaluate_detailed(&answers);
        assert_eq!(report.exit(), ExitStage::Default);
        assert_eq!(report.decision().risk_score, 10);
    }

    #[test]
    fn recommendations_dedup_and_cap() {
        let answers = Answers::new()
            .set("nexus", "Yes")
            .set("timing", "Not sure")
            .set("acts", ["Insecticide application"]);
        let d = ruleset().evaluate(&answers);
        assert_eq!(
            d.recommendations,
            ["Confirm the action area.", "Keep records.", "Avoid insecticides."]
        );
    }

    #[test]
    fn confidence_rule_applies_when_not_high() {
        let rs = RulesetBuilder::new(meta())
            .unknown_penalty(field("timing").eq("Not sure"), "Timing uncertain", 7)
            .default_outcome(TriggerOutcome::new("NLAA"))
            .recommendation_rule(
                RecommendationTrigger::ConfidenceIsNot("High".into()),
                ["Replace 'Not sure' answers."],
            )
            .compile()
            .unwrap();
        let d = rs.evaluate(&Answers::new().set("timing", "Not sure"));
        assert_eq!(d.recommendations, ["Replace 'Not sure' answers."]);
        let d = rs.evaluate(&Answers::new());
        assert!(d.recommendations.is_empty());
    }

    #[test]
    fn penalty_detail_defaults_to_meta() {
        let d = ruleset().evaluate(&Answers::new().set("nexus", "Yes").set("season", "Not sure"));
        let penalty = d
            .drivers
            .iter()
            .find(|x| x.label == "Season uncertain")
            .unwrap();
        assert_eq!(penalty.detail, crate::DEFAULT_UNKNOWN_PENALTY_DETAIL);
    }

    #[test]
    fn score_is_clamped_only_at_return() {
        let rs = RulesetBuilder::new(meta())
            .unknown_penalty(field("a").eq("Yes"), "Credit", -30)
            .unknown_penalty(field("b").eq("Yes"), "B", 25)
            .default_outcome(TriggerOutcome::new("NLAA"))
            .compile()
            .unwrap();
        // 10 - 30 + 25: a running clamp at zero would give 25.
        let d = rs.evaluate(&Answers::new().set("a", "Yes").set("b", "Yes"));
        assert_eq!(d.risk_score, 5);
    }

    #[test]
    fn unguarded_conditional_trigger_always_fires() {
        let rs = RulesetBuilder::new(meta())
            .conditional_trigger(|t| {
                t.driver(Driver::new("Always", 5, ""))
                    .outcome(TriggerOutcome::new("Contact"))
            })
            .default_outcome(TriggerOutcome::new("NLAA"))
            .compile()
            .unwrap();
        let report = rs.evaluate_detailed(&Answers::new());
        assert_eq!(report.exit(), ExitStage::ConditionalTrigger(0));
        assert_eq!(report.decision().risk_score, 15);
    }
}
