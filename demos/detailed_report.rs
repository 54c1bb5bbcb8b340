use screening_engine::{Answers, Ruleset};

fn main() {
    let ruleset = Ruleset::from_json(include_str!("../policies/rusty_patched_bumble_bee.json"))
        .expect("failed to load policy");

    let answers = Answers::new()
        .set("federal_nexus", "Yes")
        .set("hpz_overlap", "Yes")
        .set("habitat_present", "Yes")
        .set("activities_selected", ["Mowing", "Herbicide application"])
        .set("herbicide_used", "Yes")
        .set("herbicide_method", "Not sure")
        .set("active_season_work", "Not sure");

    let report = ruleset.evaluate_detailed(&answers);

    println!("{report}");
    println!();
    println!("Exit stage: {}", report.exit());
    println!("Unknowns: {}", report.unknowns());
    println!("Top drivers:");
    for driver in report.decision().top_drivers(3) {
        println!("  {driver}");
    }
    println!("Duration: {:?}", report.duration());

    if let Some(summary) = ruleset.summary(report.decision(), &answers) {
        println!();
        println!("{summary}");
    }
}
