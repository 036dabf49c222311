//! Pure answer validation.
//!
//! These functions have no side effects and can be called as often as needed.

use longhand_core::{Answer, AnswerSet, FieldId, Problem};

/// Returns true if `answer` holds the correct value for its field.
///
/// Answers for fields the problem does not have (a step out of range, a digit
/// position beyond the value, or a field of the other game mode) are never correct.
#[must_use]
pub fn validate(problem: &Problem, answer: &Answer) -> bool {
    problem.expected_value(answer.field) == Some(answer.value)
}

/// Returns true if `answers` completes `problem`.
///
/// A problem is complete when every field in its [field order] has an answer and
/// every recorded answer is marked correct. The correctness flags are taken as
/// recorded, so `answers` should be validated first.
///
/// [field order]: longhand_core::field_order
#[must_use]
pub fn is_complete(problem: &Problem, answers: &AnswerSet) -> bool {
    all_fields_filled(&problem.fields(), answers)
        && answers.iter().all(|answer| answer.correctness.is_correct())
}

/// Returns true if every field in `fields` has an answer.
#[must_use]
pub fn all_fields_filled(fields: &[FieldId], answers: &AnswerSet) -> bool {
    fields.iter().all(|&field| answers.contains(field))
}
