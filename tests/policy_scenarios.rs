use screening_engine::{Answers, Decision, ExitStage, Ruleset};

const POLICY: &str = include_str!("../policies/rusty_patched_bumble_bee.json");

const NLAA: &str = "May Affect, Not Likely to Adversely Affect";
const LAA: &str = "May Affect, Likely to Adversely Affect";
const CONTACT: &str = "May Affect—Contact U.S. Fish and Wildlife Service";

const CONFIDENCE_REC: &str = "Increase confidence by replacing 'Not sure' answers with documented project details (maps, timing windows, chemical application plans, and acreage calculations).";

fn policy() -> Ruleset {
    Ruleset::from_json(POLICY).unwrap()
}

/// Federal nexus, High Potential Zone overlap, and habitat all confirmed.
fn in_scope() -> Answers {
    Answers::new()
        .set("federal_nexus", "Yes")
        .set("hpz_overlap", "Yes")
        .set("habitat_present", "Yes")
        .set("active_season_work", "No")
        .set("overwinter_season_ground", "No")
        .set("activities_selected", ["Mowing"])
}

fn labels(decision: &Decision) -> Vec<&str> {
    decision.drivers.iter().map(|d| d.label.as_str()).collect()
}

#[test]
fn policy_loads_from_file() {
    let document = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/policies/rusty_patched_bumble_bee.json"
    ))
    .unwrap();
    let ruleset = Ruleset::from_json(&document).unwrap();
    assert_eq!(ruleset.early_exits().len(), 5);
    assert_eq!(ruleset.scoring().unknown_penalties().len(), 5);
    assert_eq!(ruleset.scoring().high_risk_triggers().len(), 2);
    assert_eq!(ruleset.scoring().conditional_triggers().len(), 1);
    assert_eq!(ruleset.scoring().lower_risk_adds().len(), 2);
}

// ---------------------------------------------------------------------------
// Early exits
// ---------------------------------------------------------------------------

#[test]
fn no_federal_nexus_exits_first() {
    let ruleset = policy();
    let answers = in_scope().set("federal_nexus", "No");

    let report = ruleset.evaluate_detailed(&answers);
    assert_eq!(report.exit(), ExitStage::EarlyExit(0));

    let decision = report.decision();
    assert_eq!(
        decision.determination,
        "Outside Endangered Species Act Section 7 screening (no federal nexus)"
    );
    assert_eq!(decision.risk_score, 0);
    assert_eq!(decision.risk_band, "Low");
    assert_eq!(decision.confidence, "High");
    assert_eq!(labels(decision), ["No federal nexus"]);
    assert_eq!(decision.recommendations.len(), 3);
}

#[test]
fn missing_federal_nexus_is_treated_as_no_nexus() {
    let decision = policy().evaluate(&Answers::new());
    assert_eq!(labels(&decision), ["No federal nexus"]);
}

#[test]
fn uncertain_overlap_requires_coordination() {
    let answers = in_scope().set("hpz_overlap", "Not sure");
    let decision = policy().evaluate(&answers);

    assert_eq!(decision.determination, CONTACT);
    assert_eq!(decision.risk_score, 55);
    assert_eq!(decision.risk_band, "Moderate");
    assert_eq!(decision.confidence, "Low");
    assert_eq!(
        decision.recommendations.last().map(String::as_str),
        Some(CONFIDENCE_REC)
    );
}

#[test]
fn no_habitat_is_no_effect_with_medium_confidence() {
    let answers = in_scope().set("habitat_present", "No");
    let decision = policy().evaluate(&answers);

    assert_eq!(decision.determination, "No Effect");
    assert_eq!(decision.risk_score, 5);
    assert_eq!(decision.confidence, "Medium");
}

// ---------------------------------------------------------------------------
// Scoring path
// ---------------------------------------------------------------------------

#[test]
fn one_unknown_lowers_confidence_to_medium() {
    let answers = in_scope().set("active_season_work", "Not sure");
    let report = policy().evaluate_detailed(&answers);

    assert_eq!(report.exit(), ExitStage::Default);
    assert_eq!(report.unknowns(), 1);

    let decision = report.decision();
    assert_eq!(decision.determination, NLAA);
    assert_eq!(decision.risk_score, 17);
    assert_eq!(decision.risk_band, "Low");
    assert_eq!(decision.confidence, "Medium");
    assert_eq!(
        labels(decision),
        [
            "Baseline: High Potential Zone overlap and habitat present",
            "Active-season timing is uncertain",
        ]
    );
    assert_eq!(
        decision.drivers[1].detail,
        "Critical uncertainty increases screening risk and reduces confidence."
    );
    assert_eq!(decision.recommendations.len(), 4);
    assert_eq!(decision.recommendations[3], CONFIDENCE_REC);
}

#[test]
fn three_unknowns_fall_back_to_low_confidence() {
    let answers = in_scope()
        .set("active_season_work", "Not sure")
        .set("overwinter_season_ground", "Not sure")
        .set("forage_unavailable", "Not sure");
    let report = policy().evaluate_detailed(&answers);

    assert_eq!(report.unknowns(), 3);
    assert_eq!(report.decision().risk_score, 32);
    assert_eq!(report.decision().confidence, "Low");
    assert_eq!(report.decision().determination, NLAA);
}

#[test]
fn pesticide_trigger_skips_lower_risk_adds() {
    let answers = in_scope()
        .set(
            "activities_selected",
            ["Insecticide application", "Herbicide application"],
        )
        .set("insecticide_used", "Yes")
        .set("herbicide_used", "Yes")
        .set(
            "herbicide_method",
            "Spot-only (wicking, glove, cut-stump, basal bark, limited spot spray)",
        )
        .set("herbicide_exposure_risk", "No")
        .set("forage_unavailable", "Yes")
        .set("forage_acres", 1_i64);
    let report = policy().evaluate_detailed(&answers);

    assert_eq!(report.exit(), ExitStage::HighRiskTrigger(0));
    let decision = report.decision();
    assert_eq!(decision.determination, LAA);
    assert_eq!(decision.risk_score, 70);
    assert_eq!(decision.risk_band, "High");
    assert_eq!(
        labels(decision),
        [
            "Pesticide exposure risk (insecticide or fungicide)",
            "Baseline: High Potential Zone overlap and habitat present",
        ]
    );
    assert!(decision.recommendations[3].starts_with("Avoid insecticide and fungicide use"));
}

#[test]
fn unanswered_fungicide_question_counts_as_use() {
    let answers = in_scope().set("activities_selected", ["Fungicide application"]);
    let decision = policy().evaluate(&answers);
    assert_eq!(decision.determination, LAA);
}

#[test]
fn declined_insecticide_does_not_trigger() {
    let answers = in_scope()
        .set("activities_selected", ["Insecticide application"])
        .set("insecticide_used", "No");
    let decision = policy().evaluate(&answers);
    assert_eq!(decision.determination, NLAA);
    assert_eq!(decision.risk_score, 10);
}

#[test]
fn broadcast_herbicide_is_likely_adverse() {
    let answers = in_scope()
        .set("activities_selected", ["Herbicide application"])
        .set("herbicide_used", "Yes")
        .set(
            "herbicide_method",
            "Broadcast (boom, aerial, widespread application)",
        )
        .set("herbicide_exposure_risk", "No");
    let report = policy().evaluate_detailed(&answers);

    assert_eq!(report.exit(), ExitStage::HighRiskTrigger(1));
    assert_eq!(report.decision().risk_score, 45);
    assert_eq!(report.decision().risk_band, "Moderate");
    assert_eq!(report.decision().recommendations.len(), 5);
}

#[test]
fn uncertain_herbicide_use_is_penalized() {
    let answers = in_scope()
        .set("activities_selected", ["Herbicide application"])
        .set("herbicide_used", "Not sure");
    let decision = policy().evaluate(&answers);

    assert_eq!(decision.risk_score, 20);
    assert_eq!(decision.confidence, "Medium");
    // defaults, two herbicide follow-ups, and the confidence reminder
    assert_eq!(decision.recommendations.len(), 6);
}

#[test]
fn large_forage_loss_requires_coordination() {
    let answers = in_scope()
        .set("forage_unavailable", "Yes")
        .set("forage_acres", "2.5");
    let report = policy().evaluate_detailed(&answers);

    assert_eq!(report.exit(), ExitStage::ConditionalTrigger(0));
    let decision = report.decision();
    assert_eq!(decision.determination, CONTACT);
    assert_eq!(decision.risk_score, 35);
    assert_eq!(
        decision.drivers[0].label,
        "Forage habitat affected is 2 acres or more (default coordination threshold)"
    );
    assert!(decision.recommendations[3].starts_with("Reduce the foraging habitat impact area"));
}

#[test]
fn forage_threshold_is_inclusive() {
    let answers = in_scope()
        .set("forage_unavailable", "Yes")
        .set("forage_acres", 2_i64);
    assert_eq!(policy().evaluate(&answers).determination, CONTACT);
}

#[test]
fn small_forage_loss_and_spot_herbicide_add_points() {
    let answers = in_scope()
        .set("activities_selected", ["Herbicide application"])
        .set("herbicide_used", "Yes")
        .set(
            "herbicide_method",
            "Spot-only (wicking, glove, cut-stump, basal bark, limited spot spray)",
        )
        .set("herbicide_exposure_risk", "No")
        .set("forage_unavailable", "Yes")
        .set("forage_acres", 1.5);
    let decision = policy().evaluate(&answers);

    assert_eq!(decision.determination, NLAA);
    assert_eq!(decision.risk_score, 30);
    // equal points keep accumulation order
    assert_eq!(
        labels(&decision),
        [
            "Baseline: High Potential Zone overlap and habitat present",
            "Spot-only herbicide use with reported exposure controls",
            "Forage habitat affected is less than 2 acres",
        ]
    );
}

#[test]
fn missing_forage_acres_is_an_unknown() {
    let answers = in_scope()
        .set("activities_selected", ["Prescribed fire"])
        .set("forage_unavailable", "Yes");
    let report = policy().evaluate_detailed(&answers);

    assert_eq!(report.exit(), ExitStage::Default);
    assert_eq!(report.unknowns(), 1);

    let decision = report.decision();
    assert_eq!(decision.determination, NLAA);
    assert_eq!(decision.risk_score, 20);
    assert_eq!(decision.confidence, "Medium");
    assert_eq!(
        labels(decision),
        [
            "Baseline: High Potential Zone overlap and habitat present",
            "Forage habitat acres affected not provided",
        ]
    );
    assert_eq!(decision.recommendations.len(), 4);
    assert_eq!(decision.recommendations[3], CONFIDENCE_REC);
}

#[test]
fn blank_forage_acres_counts_as_not_provided() {
    let answers = in_scope()
        .set("forage_unavailable", "Yes")
        .set("forage_acres", "");
    let report = policy().evaluate_detailed(&answers);

    assert_eq!(report.exit(), ExitStage::Default);
    assert_eq!(report.unknowns(), 1);
    assert_eq!(report.decision().risk_score, 20);
    assert!(!labels(report.decision())
        .iter()
        .any(|l| l.starts_with("Forage habitat affected")));
}

#[test]
fn forage_acres_ignored_when_forage_not_reduced() {
    let answers = in_scope().set("forage_unavailable", "No");
    let report = policy().evaluate_detailed(&answers);
    assert_eq!(report.unknowns(), 0);
    assert_eq!(report.decision().risk_score, 10);
    assert_eq!(report.decision().confidence, "High");
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[test]
fn summary_renders_documentation_text() {
    let ruleset = policy();
    let answers = in_scope().set("active_season_work", "Not sure");
    let decision = ruleset.evaluate(&answers);

    let summary = ruleset.summary(&decision, &answers).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[0],
        "Rusty patched bumble bee (Bombus affinis) screening result: May Affect, Not Likely to Adversely Affect."
    );
    assert_eq!(lines[1], "Risk score: 17/100 (Low risk). Confidence: Medium.");
    assert_eq!(
        lines[2],
        "Federal nexus: Yes. High Potential Zone overlap: Yes. Habitat present: Yes."
    );
    assert_eq!(lines[3], "Activities evaluated: Mowing.");
    assert_eq!(
        lines[4],
        "Timing evaluated: Active-season work: Not sure. Overwintering-season ground disturbance: No."
    );
    assert!(lines[5].starts_with("Recommended next action: Prepare an informal consultation package"));
}

#[test]
fn summary_marks_missing_answers() {
    let ruleset = policy();
    let answers = Answers::new()
        .set("federal_nexus", "No")
        .set("activities_selected", Vec::<String>::new());
    let decision = ruleset.evaluate(&answers);

    let summary = ruleset.summary(&decision, &answers).unwrap();
    assert!(summary.contains("High Potential Zone overlap: Not provided."));
    assert!(summary.contains("Activities evaluated: None selected."));
}
