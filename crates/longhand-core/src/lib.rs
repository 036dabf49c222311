//! Core data model for longhand arithmetic practice.
//!
//! This crate describes a multi-step arithmetic problem the way it is worked on paper:
//! a [`Problem`] is split into [`steps`](step) (one per column for addition, one per
//! quotient digit for long division), and every value the player writes down is a
//! field addressed by a [`FieldId`].
//!
//! # Overview
//!
//! - [`field`]: game modes, the closed per-mode field kinds, and field identifiers
//! - [`step`]: per-column and per-division-step ground truth
//! - [`problem`]: the immutable problem value and its expected field values
//! - [`order`]: the canonical field ordering used for navigation and completeness
//! - [`answer`]: player answers with a three-state correctness flag
//! - [`digits`]: decimal digit helpers
//!
//! # Examples
//!
//! ```
//! use longhand_core::{FieldId, Problem, field_order};
//!
//! let problem = Problem::addition(47, 38);
//!
//! // 7 + 8 = 15 writes a 5 and carries a 1; 4 + 3 + 1 = 8 carries nothing.
//! assert_eq!(problem.expected_value(FieldId::sum(0)), Some(5));
//! assert_eq!(problem.expected_value(FieldId::carry(0)), Some(1));
//! assert_eq!(
//!     field_order(&problem),
//!     [FieldId::sum(0), FieldId::carry(0), FieldId::sum(1)],
//! );
//! ```

pub mod answer;
pub mod digits;
pub mod field;
pub mod order;
pub mod problem;
pub mod step;

pub use self::{
    answer::{Answer, AnswerSet, Correctness},
    digits::{digit_at, digit_count},
    field::{AdditionField, DivisionField, FieldId, FieldKind, GameMode},
    order::field_order,
    problem::{AdditionProblem, DivisionProblem, Problem},
    step::{AdditionStep, DivisionStep},
};
