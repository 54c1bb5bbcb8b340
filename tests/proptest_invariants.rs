
use proptest::prelude::*;
use screening_engine::ExitStage;
use strategies::{arb_answers, arb_ruleset, arb_scoring_ruleset, meta, RISK_SCORE_MAX};

// ---------------------------------------------------------------------------
// Invariant 1: Determinism
//
// The same ruleset + answers must always produce the same decision.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn determinism(gen in arb_ruleset(), answers in arb_answers()) {
        let ruleset = gen.compile();
        let first = ruleset.evaluate(&answers);
        for _ in 0..5 {
            let again = ruleset.evaluate(&answers);
            prop_assert_eq!(&first, &again, "determinism violated on repeated evaluation");
        }
    }

    #[test]
    fn determinism_recompile(gen in arb_ruleset(), answers in arb_answers()) {
        let d1 = gen.compile().evaluate(&answers);
        let d2 = gen.compile().evaluate(&answers);
        prop_assert_eq!(d1, d2, "determinism violated across recompilation");
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Score bounds
//
// The score is an integer in [0, riskScoreMax] and the band and confidence
// labels are the ones the band tables assign to it.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn score_within_bounds(gen in arb_ruleset(), answers in arb_answers()) {
        let ruleset = gen.compile();
        let report = ruleset.evaluate_detailed(&answers);
        let decision = report.decision();

        prop_assert!(decision.risk_score <= RISK_SCORE_MAX);
        prop_assert_eq!(
            decision.risk_band.as_str(),
            ruleset.meta().risk_band_for(decision.risk_score)
        );
        prop_assert_eq!(
            decision.confidence.as_str(),
            ruleset.meta().confidence_for(report.unknowns())
        );
    }

    #[test]
    fn score_is_clamped_accumulation(gen in arb_ruleset(), answers in arb_answers()) {
        let ruleset = gen.compile();
        let expected = gen.expected(&answers);
        let decision = ruleset.evaluate(&answers);
        prop_assert_eq!(decision.risk_score, meta(gen.baseline).clamp_score(expected.raw_score));
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Stage ordering
//
// Early exits win over everything, high-risk triggers over conditional
// triggers, and within a stage the first matching entry wins.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn exit_stage_follows_stage_order(gen in arb_ruleset(), answers in arb_answers()) {
        let report = gen.compile().evaluate_detailed(&answers);
        let expected = gen.expected(&answers);
        prop_assert_eq!(report.exit(), expected.exit);

        let determination = match expected.exit {
            ExitStage::EarlyExit(i) => format!("early_{i}"),
            ExitStage::HighRiskTrigger(i) => format!("high_{i}"),
            ExitStage::ConditionalTrigger(i) => format!("conditional_{i}"),
            ExitStage::Default => "default".to_owned(),
        };
        prop_assert_eq!(&report.decision().determination, &determination);
    }

    #[test]
    fn trigger_exit_skips_lower_risk_adds(gen in arb_scoring_ruleset(), answers in arb_answers()) {
        let decision = gen.compile().evaluate(&answers);
        let triggered = decision.determination != "default";
        let has_lower = decision.drivers.iter().any(|d| d.label.starts_with("lower_"));
        prop_assert!(!(triggered && has_lower), "lower-risk add applied after a trigger exit");
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Unknown accounting
//
// On the scoring path the unknowns count equals the number of matching
// penalties; on an early exit it is the outcome's own count.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn unknowns_match_penalties(gen in arb_ruleset(), answers in arb_answers()) {
        let report = gen.compile().evaluate_detailed(&answers);
        prop_assert_eq!(report.unknowns(), gen.expected(&answers).unknowns);
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Driver stability
//
// Drivers come back sorted by descending points, and drivers with equal
// points keep the order in which they were accumulated.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn drivers_sorted_and_stable(gen in arb_ruleset(), answers in arb_answers()) {
        let decision = gen.compile().evaluate(&answers);

        for pair in decision.drivers.windows(2) {
            prop_assert!(pair[0].points >= pair[1].points, "drivers not sorted: {:?}", decision.drivers);
        }

        let mut expected = gen.expected(&answers).drivers;
        expected.sort_by(|a, b| b.1.cmp(&a.1));
        let actual: Vec<(String, i64)> = decision
            .drivers
            .iter()
            .map(|d| (d.label.clone(), d.points))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
