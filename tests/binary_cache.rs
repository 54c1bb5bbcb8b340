#![cfg(feature = "binary-cache")]

use screening_engine::{
    field, Answers, ConfidenceBand, DeserializeError, Driver, Meta, NumericOp, RiskBand, Ruleset,
    RulesetBuilder, TriggerOutcome,
};

const POLICY: &str = include_str!("../policies/rusty_patched_bumble_bee.json");

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn policy() -> Ruleset {
    Ruleset::from_json(POLICY).unwrap()
}

fn small_ruleset() -> Ruleset {
    let meta = Meta::new(
        10,
        vec![ConfidenceBand {
            max_unknowns: 0,
            label: "Sure".into(),
        }],
        vec![RiskBand {
            min: 0.0,
            label: "Any".into(),
        }],
        1.0,
    )
    .with_fallback_confidence("Unsure")
    .with_max_recommendations(1);

    RulesetBuilder::new(meta)
        .unknown_penalty(field("flag").eq(true), "flagged", 2)
        .conditional_trigger(|t| {
            t.numeric(field("count").guard(NumericOp::Gt, 3.0))
                .driver(Driver::new("many", 4, "more than three"))
                .outcome(TriggerOutcome::new("Review").why("count is high"))
        })
        .default_recommendations(["first", "second"])
        .default_outcome(TriggerOutcome::new("Clear"))
        .compile()
        .unwrap()
}

fn sample_answers() -> Vec<Answers> {
    let in_scope = Answers::new()
        .set("federal_nexus", "Yes")
        .set("hpz_overlap", "Yes")
        .set("habitat_present", "Yes");
    vec![
        Answers::new(),
        in_scope.clone(),
        in_scope.clone().set("hpz_overlap", "Not sure"),
        in_scope
            .clone()
            .set("activities_selected", ["Herbicide application"])
            .set("herbicide_used", "Yes")
            .set("herbicide_method", "Not sure"),
        in_scope
            .clone()
            .set("forage_unavailable", "Yes")
            .set("forage_acres", "4"),
        in_scope
            .set("active_season_work", "Not sure")
            .set("overwinter_season_ground", "Not sure")
            .set("forage_unavailable", "Not sure"),
    ]
}

// ---------------------------------------------------------------------------
// Round-trip
// ---------------------------------------------------------------------------

#[test]
fn policy_round_trip() {
    let original = policy();
    let bytes = original.to_bytes(None).unwrap();
    let restored = Ruleset::from_bytes(&bytes).unwrap();

    assert_eq!(original.meta(), restored.meta());
    assert_eq!(original.early_exits(), restored.early_exits());
    assert_eq!(original.scoring(), restored.scoring());

    for answers in sample_answers() {
        let expected = original.evaluate(&answers);
        let actual = restored.evaluate(&answers);
        assert_eq!(expected, actual);
        assert_eq!(
            original.summary(&expected, &answers),
            restored.summary(&actual, &answers)
        );
    }
}

#[test]
fn builder_round_trip_keeps_defaults() {
    let original = small_ruleset();
    let restored = Ruleset::from_bytes(&original.to_bytes(None).unwrap()).unwrap();
    assert_eq!(original.meta(), restored.meta());

    let answers = Answers::new().set("flag", true).set("count", 5_i64);
    let decision = restored.evaluate(&answers);
    assert_eq!(decision.determination, "Review");
    assert_eq!(decision.risk_score, 7);
    assert_eq!(decision.confidence, "Unsure");
    assert_eq!(decision.recommendations, ["first"]);
}

// ---------------------------------------------------------------------------
// Source digest
// ---------------------------------------------------------------------------

#[test]
fn source_digest_detects_stale_cache() {
    let bytes = policy().to_bytes(Some(POLICY)).unwrap();
    let digest = Ruleset::cached_source_digest(&bytes).unwrap();
    assert_eq!(digest, Some(*blake3::hash(POLICY.as_bytes()).as_bytes()));

    let edited = POLICY.replace("\"baselineRisk\": 10", "\"baselineRisk\": 12");
    assert_ne!(digest, Some(*blake3::hash(edited.as_bytes()).as_bytes()));
}

#[test]
fn no_source_digest_when_not_provided() {
    let bytes = policy().to_bytes(None).unwrap();
    assert_eq!(Ruleset::cached_source_digest(&bytes).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Corruption: byte flip -> ChecksumMismatch
// ---------------------------------------------------------------------------

#[test]
fn corruption_byte_flip() {
    let mut corrupted = policy().to_bytes(None).unwrap();
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xFF;

    let err = Ruleset::from_bytes(&corrupted).unwrap_err();
    assert!(
        matches!(err, DeserializeError::ChecksumMismatch),
        "expected ChecksumMismatch, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// Corruption: truncation -> LengthMismatch
// ---------------------------------------------------------------------------

#[test]
fn corruption_truncation() {
    let bytes = policy().to_bytes(None).unwrap();
    let truncated = &bytes[..33];

    let err = Ruleset::from_bytes(truncated).unwrap_err();
    assert!(
        matches!(err, DeserializeError::LengthMismatch { .. }),
        "expected LengthMismatch, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// Bad magic
// ---------------------------------------------------------------------------

#[test]
fn bad_magic() {
    let mut bad = policy().to_bytes(None).unwrap();
    bad[0..4].copy_from_slice(b"BAAD");

    let err = Ruleset::from_bytes(&bad).unwrap_err();
    assert!(
        matches!(err, DeserializeError::BadMagic),
        "expected BadMagic, got: {err}"
    );
    assert!(matches!(
        Ruleset::cached_source_digest(&bad),
        Err(DeserializeError::BadMagic)
    ));
}

// ---------------------------------------------------------------------------
// Version mismatch
// ---------------------------------------------------------------------------

#[test]
fn version_mismatch() {
    let mut bad = policy().to_bytes(None).unwrap();
    bad[4] = 99;
    bad[5] = 0;

    let err = Ruleset::from_bytes(&bad).unwrap_err();
    assert!(
        matches!(
            err,
            DeserializeError::IncompatibleVersion {
                blob: 99,
                supported: 1
            }
        ),
        "expected IncompatibleVersion, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// Cache on disk
// ---------------------------------------------------------------------------

#[test]
fn cache_survives_a_trip_through_disk() {
    let dir = std::env::temp_dir().join("screening_engine_test_binary_cache");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("policy.scrn");

    let original = policy();
    std::fs::write(&path, original.to_bytes(Some(POLICY)).unwrap()).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let restored = Ruleset::from_bytes(&bytes).unwrap();

    for answers in sample_answers() {
        assert_eq!(original.evaluate(&answers), restored.evaluate(&answers));
    }

    let _ = std::fs::remove_dir_all(&dir);
}
