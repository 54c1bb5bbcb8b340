use std::sync::Arc;
use std::thread;

use screening_engine::{Answers, Ruleset};

fn main() {
    let ruleset = Arc::new(
        Ruleset::from_json(include_str!("../policies/rusty_patched_bumble_bee.json"))
            .expect("failed to load policy"),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let rs = Arc::clone(&ruleset);
            thread::spawn(move || {
                // Each thread screens a project with a different forage loss
                let acres = f64::from(i) * 0.75;
                let answers = Answers::new()
                    .set("federal_nexus", "Yes")
                    .set("hpz_overlap", "Yes")
                    .set("habitat_present", "Yes")
                    .set("forage_unavailable", "Yes")
                    .set("forage_acres", acres);

                let decision = rs.evaluate(&answers);
                println!(
                    "Thread {i} ({acres} acres): {} [{}]",
                    decision.determination, decision.risk_score
                );
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
