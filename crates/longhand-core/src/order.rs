//! Canonical field ordering.
//!
//! The same order drives keyboard navigation (next/previous with wraparound) and
//! the completeness check, so a problem is complete exactly when every field a
//! player can tab to holds a correct answer.

use crate::{digits::digit_count, field::FieldId, problem::Problem};

/// Returns every fillable field of `problem`, in entry order.
///
/// For each step, in step order:
///
/// 1. the primary field (`Sum` for addition, `Quotient` for division);
/// 2. multi-digit values, one field per digit, from the most significant position
///    down to position 0 (`Multiply`, then `Subtract`);
/// 3. the conditional field when the step has one (`Carry` for a column that carries,
///    `BringDown` for a division step that brings a digit down).
///
/// The order is computed fresh from the problem on every call.
#[must_use]
pub fn field_order(problem: &Problem) -> Vec<FieldId> {
    let mut fields = Vec::new();
    match problem {
        Problem::Addition(p) => {
            for (index, step) in p.steps().iter().enumerate() {
                fields.push(FieldId::sum(index));
                if step.carry > 0 {
                    fields.push(FieldId::carry(index));
                }
            }
        }
        Problem::Division(p) => {
            for (index, step) in p.steps().iter().enumerate() {
                fields.push(FieldId::quotient(index));
                for position in (0..digit_count(step.multiply)).rev() {
                    fields.push(FieldId::multiply(index, position));
                }
                for position in (0..digit_count(step.subtract)).rev() {
                    fields.push(FieldId::subtract(index, position));
                }
                if step.bring_down.is_some() {
                    fields.push(FieldId::bring_down(index));
                }
            }
        }
    }
    fields
}
