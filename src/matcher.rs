//! Pure evaluation of [`Condition`]s against an [`Answers`] map.
//!
//! Matching never fails: a missing field, a field of the wrong kind, or a
//! value that does not coerce to a number simply makes the predicate false
//! (or true, for `NotEquals`).

use crate::{Answer, Answers, Condition, NumericGuard};

/// Test `condition` against `answers`.
///
/// - `Equals` requires the field to be present and of the same kind as the
///   literal. `NotEquals` is its exact negation, so an absent field is
///   always "not equal".
/// - `Includes` requires a multi-select answer containing the value.
/// - `Numeric` coerces through [`Answer::as_number`]; a failed coercion is
///   false for every operator.
/// - `IsNumber` reports whether that coercion succeeds, so an absent or
///   blank field is "not a number".
/// - `All` over an empty list is true, `Any` over an empty list is false.
#[must_use]
pub fn matches(answers: &Answers, condition: &Condition) -> bool {
    match condition {
        Condition::Equals { field, value } => answers
            .get(field)
            .is_some_and(|answer| value.matches_answer(answer)),
        Condition::NotEquals { field, value } => !answers
            .get(field)
            .is_some_and(|answer| value.matches_answer(answer)),
        Condition::Includes { field, value } => answers
            .get(field)
            .and_then(Answer::as_choices)
            .is_some_and(|choices| choices.iter().any(|c| c == value)),
        Condition::Numeric(guard) => matches_numeric(answers, guard),
        Condition::IsNumber { field, expected } => {
            answers.get(field).and_then(Answer::as_number).is_some() == *expected
        }
        Condition::All(items) => items.iter().all(|c| matches(answers, c)),
        Condition::Any(items) => items.iter().any(|c| matches(answers, c)),
    }
}

/// Test a numeric guard. False when the field is missing or does not
/// coerce to a finite number.
#[must_use]
pub fn matches_numeric(answers: &Answers, guard: &NumericGuard) -> bool {
    answers
        .get(&guard.field)
        .and_then(Answer::as_number)
        .is_some_and(|n| guard.op.apply(n, guard.threshold))
}

pub(crate) fn matches_all(answers: &Answers, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(answers, c))
}

pub(crate) fn matches_any(answers: &Answers, conditions: &[Condition]) -> bool {
    conditions.iter().any(|c| matches(answers, c))
}
