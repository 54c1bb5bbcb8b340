use screening_engine::{
    field, Answers, ConfidenceBand, Driver, Meta, RiskBand, RulesetBuilder, TriggerOutcome,
};

fn main() {
    let meta = Meta::new(
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
                min: 40.0,
                label: "Moderate".into(),
            },
            RiskBand {
                min: 0.0,
                label: "Low".into(),
            },
        ],
        10.0,
    );

    // Define the staged rules
    let ruleset = RulesetBuilder::new(meta)
        .unknown_penalty(
            field("work_timing").eq("Not sure"),
            "Work timing uncertain",
            7,
        )
        .high_risk_trigger(
            [field("activities").includes("Insecticide application")],
            Driver::new("Insecticide use", 60, "Direct exposure pathway"),
            TriggerOutcome::new("May Affect, Likely to Adversely Affect"),
        )
        .default_outcome(TriggerOutcome::new(
            "May Affect, Not Likely to Adversely Affect",
        ))
        .compile()
        .expect("failed to compile ruleset");

    println!("{ruleset}");

    // Evaluate against an answer map
    let answers = Answers::new()
        .set("activities", ["Mowing"])
        .set("work_timing", "Not sure");

    let decision = ruleset.evaluate(&answers);
    println!("Result: {decision}");
}
