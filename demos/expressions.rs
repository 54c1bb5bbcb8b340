use screening_engine::{matches, parse_condition, Answers, Ruleset};

fn main() {
    // Expressions parse into the same condition trees JSON nodes describe
    let expr = parse_condition(
        "activities contains 'Herbicide application' AND (method == 'Broadcast' OR method == 'Not sure')",
    )
    .expect("failed to parse expression");
    let condition = expr.to_condition().expect("expression has no references");
    println!("Parsed: {condition}");

    let answers = Answers::new()
        .set("activities", ["Herbicide application"])
        .set("method", "Not sure");
    println!("Matches: {}", matches(&answers, &condition));

    // Named conditions can mix expressions and references
    let ruleset = Ruleset::from_json(
        r#"{
            "meta": {
                "riskScoreMax": 100,
                "confidenceByUnknowns": [{ "maxUnknowns": 0, "label": "High" }],
                "riskBands": [{ "min": 40, "label": "Moderate" }, { "min": 0, "label": "Low" }],
                "defaults": { "baselineRisk": 10 }
            },
            "conditions": {
                "sprayed": "activities contains 'Herbicide application'",
                "sprayed_widely": "sprayed AND method != 'Spot'"
            },
            "scoring": {
                "highRiskTriggers": [
                    {
                        "whenAny": ["sprayed_widely"],
                        "label": "Widespread herbicide",
                        "addPoints": 35,
                        "outcome": { "determination": "LAA" }
                    }
                ],
                "defaultOutcome": { "determination": "NLAA" }
            }
        }"#,
    )
    .expect("failed to compile ruleset");

    for method in ["Broadcast", "Spot"] {
        let decision = ruleset.evaluate(&answers.clone().set("method", method));
        println!("{method}: {decision}");
    }
}
