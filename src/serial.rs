//! Binary serialization and deserialization of compiled rulesets.
//!
//! This module provides a stable binary format for persisting compiled
//! [`Ruleset`](crate::Ruleset) values, so a service can skip JSON parsing
//! and reference resolution on startup. The format consists of a 32-byte
//! fixed header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"SCRN"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::meta::{ConfidenceBand, RiskBand};
use crate::{
    Condition, ConditionalTrigger, Driver, EarlyExitRule, HighRiskTrigger, LowerRiskAdd, Meta,
    NumericGuard, NumericOp, Outcome, RecommendationRule, RecommendationTrigger, Ruleset, Scoring,
    TriggerOutcome, UnknownPenalty, Value,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"SCRN";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`Ruleset`](crate::Ruleset) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode ruleset: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// Errors that can occur when deserializing a [`Ruleset`](crate::Ruleset) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a screening ruleset binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRuleset {
    metadata: RulesetMetadata,
    meta: SerializedMeta,
    early_exits: Vec<SerializedEarlyExit>,
    scoring: SerializedScoring,
}

#[derive(Debug, Serialize, Deserialize)]
struct RulesetMetadata {
    early_exit_count: usize,
    penalty_count: usize,
    trigger_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedMeta {
    risk_score_max: u32,
    confidence_bands: Vec<(u32, String)>,
    risk_bands: Vec<(f64, String)>,
    baseline_risk: f64,
    fallback_confidence: String,
    fallback_risk_band: String,
    unknown_penalty_detail: String,
    max_recommendations: Option<usize>,
    summary: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedCondition {
    Equals { field: String, value: SerializedValue },
    NotEquals { field: String, value: SerializedValue },
    Includes { field: String, value: String },
    Numeric(SerializedGuard),
    IsNumber { field: String, expected: bool },
    All(Vec<SerializedCondition>),
    Any(Vec<SerializedCondition>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedValue {
    Number(f64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedGuard {
    field: String,
    op: SerializedNumericOp,
    threshold: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedNumericOp {
    Gte,
    Gt,
    Lte,
    Lt,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedOutcome {
    determination: String,
    risk_score: f64,
    unknowns: u32,
    why_text: String,
    next_action: String,
    recommendations: Vec<String>,
    drivers: Vec<Driver>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedTriggerOutcome {
    determination: String,
    why_text: String,
    next_action: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedEarlyExit {
    when_all: Vec<SerializedCondition>,
    outcome: SerializedOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedPenalty {
    condition: SerializedCondition,
    label: String,
    points: i64,
    detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedHighRisk {
    when_any: Vec<SerializedCondition>,
    driver: Driver,
    outcome: SerializedTriggerOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedConditional {
    when_all: Vec<SerializedCondition>,
    when_any: Vec<SerializedCondition>,
    numeric: Option<SerializedGuard>,
    driver: Driver,
    outcome: SerializedTriggerOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedLowerRisk {
    when_all: Vec<SerializedCondition>,
    numeric: Option<SerializedGuard>,
    driver: Driver,
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedRecommendationTrigger {
    DriverLabelContains(String),
    ConfidenceIsNot(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRecommendationRule {
    when: SerializedRecommendationTrigger,
    recommendations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedScoring {
    baseline_drivers: Vec<Driver>,
    unknown_penalties: Vec<SerializedPenalty>,
    high_risk_triggers: Vec<SerializedHighRisk>,
    conditional_triggers: Vec<SerializedConditional>,
    lower_risk_adds: Vec<SerializedLowerRisk>,
    default_outcome: SerializedTriggerOutcome,
    default_recommendations: Vec<String>,
    recommendation_rules: Vec<SerializedRecommendationRule>,
}

// ---------------------------------------------------------------------------
// Condition conversion
// ---------------------------------------------------------------------------

fn serialize_op(op: NumericOp) -> SerializedNumericOp {
    match op {
        NumericOp::Gte => SerializedNumericOp::Gte,
        NumericOp::Gt => SerializedNumericOp::Gt,
        NumericOp::Lte => SerializedNumericOp::Lte,
        NumericOp::Lt => SerializedNumericOp::Lt,
    }
}

fn deserialize_op(op: SerializedNumericOp) -> NumericOp {
    match op {
        SerializedNumericOp::Gte => NumericOp::Gte,
        SerializedNumericOp::Gt => NumericOp::Gt,
        SerializedNumericOp::Lte => NumericOp::Lte,
        SerializedNumericOp::Lt => NumericOp::Lt,
    }
}

fn serialize_value(value: &Value) -> SerializedValue {
    match value {
        Value::Number(v) => SerializedValue::Number(*v),
        Value::Bool(v) => SerializedValue::Bool(*v),
        Value::String(v) => SerializedValue::Str(v.clone()),
    }
}

fn deserialize_value(value: SerializedValue) -> Value {
    match value {
        SerializedValue::Number(v) => Value::Number(v),
        SerializedValue::Bool(v) => Value::Bool(v),
        SerializedValue::Str(v) => Value::String(v),
    }
}

fn serialize_guard(guard: &NumericGuard) -> SerializedGuard {
    SerializedGuard {
        field: guard.field.clone(),
        op: serialize_op(guard.op),
        threshold: guard.threshold,
    }
}

fn deserialize_guard(guard: SerializedGuard) -> NumericGuard {
    NumericGuard {
        field: guard.field,
        op: deserialize_op(guard.op),
        threshold: guard.threshold,
    }
}

fn serialize_condition(condition: &Condition) -> SerializedCondition {
    match condition {
        Condition::Equals { field, value } => SerializedCondition::Equals {
            field: field.clone(),
            value: serialize_value(value),
        },
        Condition::NotEquals { field, value } => SerializedCondition::NotEquals {
            field: field.clone(),
            value: serialize_value(value),
        },
        Condition::Includes { field, value } => SerializedCondition::Includes {
            field: field.clone(),
            value: value.clone(),
        },
        Condition::Numeric(guard) => SerializedCondition::Numeric(serialize_guard(guard)),
        Condition::IsNumber { field, expected } => SerializedCondition::IsNumber {
            field: field.clone(),
            expected: *expected,
        },
        Condition::All(items) => SerializedCondition::All(serialize_conditions(items)),
        Condition::Any(items) => SerializedCondition::Any(serialize_conditions(items)),
    }
}

fn serialize_conditions(conditions: &[Condition]) -> Vec<SerializedCondition> {
    conditions.iter().map(serialize_condition).collect()
}

fn deserialize_condition(condition: SerializedCondition) -> Condition {
    match condition {
        SerializedCondition::Equals { field, value } => Condition::Equals {
            field,
            value: deserialize_value(value),
        },
        SerializedCondition::NotEquals { field, value } => Condition::NotEquals {
            field,
            value: deserialize_value(value),
        },
        SerializedCondition::Includes { field, value } => Condition::Includes { field, value },
        SerializedCondition::Numeric(guard) => Condition::Numeric(deserialize_guard(guard)),
        SerializedCondition::IsNumber { field, expected } => Condition::IsNumber { field, expected },
        SerializedCondition::All(items) => Condition::All(deserialize_conditions(items)),
        SerializedCondition::Any(items) => Condition::Any(deserialize_conditions(items)),
    }
}

fn deserialize_conditions(conditions: Vec<SerializedCondition>) -> Vec<Condition> {
    conditions.into_iter().map(deserialize_condition).collect()
}

fn serialize_trigger_outcome(outcome: &TriggerOutcome) -> SerializedTriggerOutcome {
    SerializedTriggerOutcome {
        determination: outcome.determination.clone(),
        why_text: outcome.why_text.clone(),
        next_action: outcome.next_action.clone(),
    }
}

fn deserialize_trigger_outcome(outcome: SerializedTriggerOutcome) -> TriggerOutcome {
    TriggerOutcome {
        determination: outcome.determination,
        why_text: outcome.why_text,
        next_action: outcome.next_action,
    }
}

// ---------------------------------------------------------------------------
// Ruleset -> SerializedRuleset
// ---------------------------------------------------------------------------

fn ruleset_to_serialized(ruleset: &Ruleset, source_text: Option<&str>) -> SerializedRuleset {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());
    let meta = &ruleset.meta;
    let scoring = &ruleset.scoring;

    SerializedRuleset {
        metadata: RulesetMetadata {
            early_exit_count: ruleset.early_exits.len(),
            penalty_count: scoring.unknown_penalties.len(),
            trigger_count: scoring.high_risk_triggers.len() + scoring.conditional_triggers.len(),
            source_digest,
        },
        meta: SerializedMeta {
            risk_score_max: meta.risk_score_max,
            confidence_bands: meta
                .confidence_bands
                .iter()
                .map(|b| (b.max_unknowns, b.label.clone()))
                .collect(),
            risk_bands: meta
                .risk_bands
                .iter()
                .map(|b| (b.min, b.label.clone()))
                .collect(),
            baseline_risk: meta.baseline_risk,
            fallback_confidence: meta.fallback_confidence.clone(),
            fallback_risk_band: meta.fallback_risk_band.clone(),
            unknown_penalty_detail: meta.unknown_penalty_detail.clone(),
            max_recommendations: meta.max_recommendations,
            summary: meta.summary.clone(),
        },
        early_exits: ruleset
            .early_exits
            .iter()
            .map(|rule| SerializedEarlyExit {
                when_all: serialize_conditions(&rule.when_all),
                outcome: SerializedOutcome {
                    determination: rule.outcome.determination.clone(),
                    risk_score: rule.outcome.risk_score,
                    unknowns: rule.outcome.unknowns,
                    why_text: rule.outcome.why_text.clone(),
                    next_action: rule.outcome.next_action.clone(),
                    recommendations: rule.outcome.recommendations.clone(),
                    drivers: rule.outcome.drivers.clone(),
                },
            })
            .collect(),
        scoring: SerializedScoring {
            baseline_drivers: scoring.baseline_drivers.clone(),
            unknown_penalties: scoring
                .unknown_penalties
                .iter()
                .map(|p| SerializedPenalty {
                    condition: serialize_condition(&p.condition),
                    label: p.label.clone(),
                    points: p.points,
                    detail: p.detail.clone(),
                })
                .collect(),
            high_risk_triggers: scoring
                .high_risk_triggers
                .iter()
                .map(|t| SerializedHighRisk {
                    when_any: serialize_conditions(&t.when_any),
                    driver: t.driver.clone(),
                    outcome: serialize_trigger_outcome(&t.outcome),
                })
                .collect(),
            conditional_triggers: scoring
                .conditional_triggers
                .iter()
                .map(|t| SerializedConditional {
                    when_all: serialize_conditions(&t.when_all),
                    when_any: serialize_conditions(&t.when_any),
                    numeric: t.numeric.as_ref().map(serialize_guard),
                    driver: t.driver.clone(),
                    outcome: serialize_trigger_outcome(&t.outcome),
                })
                .collect(),
            lower_risk_adds: scoring
                .lower_risk_adds
                .iter()
                .map(|a| SerializedLowerRisk {
                    when_all: serialize_conditions(&a.when_all),
                    numeric: a.numeric.as_ref().map(serialize_guard),
                    driver: a.driver.clone(),
                })
                .collect(),
            default_outcome: serialize_trigger_outcome(&scoring.default_outcome),
            default_recommendations: scoring.default_recommendations.clone(),
            recommendation_rules: scoring
                .recommendation_rules
                .iter()
                .map(|r| SerializedRecommendationRule {
                    when: match &r.when {
                        RecommendationTrigger::DriverLabelContains(s) => {
                            SerializedRecommendationTrigger::DriverLabelContains(s.clone())
                        }
                        RecommendationTrigger::ConfidenceIsNot(s) => {
                            SerializedRecommendationTrigger::ConfidenceIsNot(s.clone())
                        }
                    },
                    recommendations: r.recommendations.clone(),
                })
                .collect(),
        },
    }
}

// ---------------------------------------------------------------------------
// SerializedRuleset -> Ruleset
// ---------------------------------------------------------------------------

fn serialized_to_ruleset(ser: SerializedRuleset) -> Result<Ruleset, DeserializeError> {
    validate(&ser)?;

    let m = ser.meta;
    let mut meta = Meta::new(
        m.risk_score_max,
        m.confidence_bands
            .into_iter()
            .map(|(max_unknowns, label)| ConfidenceBand {
                max_unknowns,
                label,
            })
            .collect(),
        m.risk_bands
            .into_iter()
            .map(|(min, label)| RiskBand { min, label })
            .collect(),
        m.baseline_risk,
    )
    .with_fallback_confidence(m.fallback_confidence)
    .with_fallback_risk_band(m.fallback_risk_band)
    .with_unknown_penalty_detail(m.unknown_penalty_detail);
    if let Some(max) = m.max_recommendations {
        meta = meta.with_max_recommendations(max);
    }
    if let Some(lines) = m.summary {
        meta = meta.with_summary(lines);
    }

    let early_exits = ser
        .early_exits
        .into_iter()
        .map(|rule| EarlyExitRule {
            when_all: deserialize_conditions(rule.when_all),
            outcome: Outcome {
                determination: rule.outcome.determination,
                risk_score: rule.outcome.risk_score,
                unknowns: rule.outcome.unknowns,
                why_text: rule.outcome.why_text,
                next_action: rule.outcome.next_action,
                recommendations: rule.outcome.recommendations,
                drivers: rule.outcome.drivers,
            },
        })
        .collect();

    let s = ser.scoring;
    let scoring = Scoring {
        baseline_drivers: s.baseline_drivers,
        unknown_penalties: s
            .unknown_penalties
            .into_iter()
            .map(|p| UnknownPenalty {
                condition: deserialize_condition(p.condition),
                label: p.label,
                points: p.points,
                detail: p.detail,
            })
            .collect(),
        high_risk_triggers: s
            .high_risk_triggers
            .into_iter()
            .map(|t| HighRiskTrigger {
                when_any: deserialize_conditions(t.when_any),
                driver: t.driver,
                outcome: deserialize_trigger_outcome(t.outcome),
            })
            .collect(),
        conditional_triggers: s
            .conditional_triggers
            .into_iter()
            .map(|t| ConditionalTrigger {
                when_all: deserialize_conditions(t.when_all),
                when_any: deserialize_conditions(t.when_any),
                numeric: t.numeric.map(deserialize_guard),
                driver: t.driver,
                outcome: deserialize_trigger_outcome(t.outcome),
            })
            .collect(),
        lower_risk_adds: s
            .lower_risk_adds
            .into_iter()
            .map(|a| LowerRiskAdd {
                when_all: deserialize_conditions(a.when_all),
                numeric: a.numeric.map(deserialize_guard),
                driver: a.driver,
            })
            .collect(),
        default_outcome: deserialize_trigger_outcome(s.default_outcome),
        default_recommendations: s.default_recommendations,
        recommendation_rules: s
            .recommendation_rules
            .into_iter()
            .map(|r| RecommendationRule {
                when: match r.when {
                    SerializedRecommendationTrigger::DriverLabelContains(s) => {
                        RecommendationTrigger::DriverLabelContains(s)
                    }
                    SerializedRecommendationTrigger::ConfidenceIsNot(s) => {
                        RecommendationTrigger::ConfidenceIsNot(s)
                    }
                },
                recommendations: r.recommendations,
            })
            .collect(),
    };

    crate::compile::finish(meta, early_exits, scoring)
        .map_err(|e| DeserializeError::Validation(e.to_string()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedRuleset) -> Result<(), DeserializeError> {
    let early_exit_count = ser.early_exits.len();
    let penalty_count = ser.scoring.unknown_penalties.len();
    let trigger_count =
        ser.scoring.high_risk_triggers.len() + ser.scoring.conditional_triggers.len();

    if ser.metadata.early_exit_count != early_exit_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} early exits but payload has {}",
            ser.metadata.early_exit_count, early_exit_count
        )));
    }
    if ser.metadata.penalty_count != penalty_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} unknown penalties but payload has {}",
            ser.metadata.penalty_count, penalty_count
        )));
    }
    if ser.metadata.trigger_count != trigger_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} triggers but payload has {}",
            ser.metadata.trigger_count, trigger_count
        )));
    }

    for window in ser.meta.confidence_bands.windows(2) {
        if window[0].0 > window[1].0 {
            return Err(DeserializeError::Validation(
                "confidence bands not sorted by ascending maxUnknowns".to_owned(),
            ));
        }
    }
    for window in ser.meta.risk_bands.windows(2) {
        if window[0].0 < window[1].0 {
            return Err(DeserializeError::Validation(
                "risk bands not sorted by descending min".to_owned(),
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] is engine_version (informational, not used for checks)
    // bytes[8..12] is flags (reserved)
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

fn read_payload(bytes: &[u8]) -> Result<SerializedRuleset, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    // Integrity check
    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedRuleset, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok(serialized)
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    ruleset: &Ruleset,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = ruleset_to_serialized(ruleset, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Ruleset, DeserializeError> {
    serialized_to_ruleset(read_payload(bytes)?)
}

pub(crate) fn source_digest(bytes: &[u8]) -> Result<Option<[u8; 32]>, DeserializeError> {
    Ok(read_payload(bytes)?.metadata.source_digest)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
