//! Immutable arithmetic problems.

use std::num::NonZero;

use serde::{Deserialize, Serialize};

use crate::{
    digits::{digit_at, digit_count},
    field::{AdditionField, DivisionField, FieldId, FieldKind, GameMode},
    order,
    step::{AdditionStep, DivisionStep},
};

/// A column addition problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{addend1} + {addend2}")]
pub struct AdditionProblem {
    addend1: u32,
    addend2: u32,
    steps: Vec<AdditionStep>,
    is_editable: bool,
}

impl AdditionProblem {
    /// Builds the problem `addend1 + addend2` with all of its column steps.
    #[must_use]
    pub fn new(addend1: u32, addend2: u32) -> Self {
        Self {
            addend1,
            addend2,
            steps: AdditionStep::build_all(addend1, addend2),
            is_editable: false,
        }
    }

    /// Returns the first addend.
    #[must_use]
    pub fn addend1(&self) -> u32 {
        self.addend1
    }

    /// Returns the second addend.
    #[must_use]
    pub fn addend2(&self) -> u32 {
        self.addend2
    }

    /// Returns the column steps, ones column first.
    #[must_use]
    pub fn steps(&self) -> &[AdditionStep] {
        &self.steps
    }

    /// Returns the exact sum.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.addend1) + u64::from(self.addend2)
    }
}

/// A long division problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{dividend} ÷ {divisor}")]
pub struct DivisionProblem {
    dividend: u32,
    divisor: u32,
    quotient: u32,
    remainder: u32,
    steps: Vec<DivisionStep>,
    is_editable: bool,
}

impl DivisionProblem {
    /// Builds the problem `dividend ÷ divisor` with all of its steps.
    ///
    /// Returns `None` for a zero divisor or when an intermediate value overflows.
    #[must_use]
    pub fn new(dividend: u32, divisor: u32) -> Option<Self> {
        let nonzero = NonZero::new(divisor)?;
        let steps = DivisionStep::build_all(dividend, nonzero)?;
        Some(Self {
            dividend,
            divisor,
            quotient: dividend / divisor,
            remainder: dividend % divisor,
            steps,
            is_editable: false,
        })
    }

    /// Returns the dividend.
    #[must_use]
    pub fn dividend(&self) -> u32 {
        self.dividend
    }

    /// Returns the divisor.
    #[must_use]
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Returns the full quotient.
    #[must_use]
    pub fn quotient(&self) -> u32 {
        self.quotient
    }

    /// Returns the remainder.
    #[must_use]
    pub fn remainder(&self) -> u32 {
        self.remainder
    }

    /// Returns the division steps in the order they are worked.
    #[must_use]
    pub fn steps(&self) -> &[DivisionStep] {
        &self.steps
    }
}

/// A multi-step arithmetic problem.
///
/// Problems are never modified in place: editing builds a new value, so answers
/// recorded against an older problem can be told apart and invalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Problem {
    /// Column addition.
    Addition(AdditionProblem),
    /// Long division.
    Division(DivisionProblem),
}

impl Problem {
    /// Builds an addition problem.
    #[must_use]
    pub fn addition(addend1: u32, addend2: u32) -> Self {
        Problem::Addition(AdditionProblem::new(addend1, addend2))
    }

    /// Builds a division problem, or `None` for a zero divisor.
    #[must_use]
    pub fn division(dividend: u32, divisor: u32) -> Option<Self> {
        DivisionProblem::new(dividend, divisor).map(Problem::Division)
    }

    /// Builds a problem of the given mode from its two raw operands.
    #[must_use]
    pub fn from_operands(mode: GameMode, operand1: u32, operand2: u32) -> Option<Self> {
        match mode {
            GameMode::Addition => Some(Self::addition(operand1, operand2)),
            GameMode::Division => Self::division(operand1, operand2),
        }
    }

    /// Returns the game mode of the problem.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        match self {
            Problem::Addition(_) => GameMode::Addition,
            Problem::Division(_) => GameMode::Division,
        }
    }

    /// Returns the raw operands (addends, or dividend and divisor).
    #[must_use]
    pub fn operands(&self) -> (u32, u32) {
        match self {
            Problem::Addition(p) => (p.addend1, p.addend2),
            Problem::Division(p) => (p.dividend, p.divisor),
        }
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        match self {
            Problem::Addition(p) => p.steps.len(),
            Problem::Division(p) => p.steps.len(),
        }
    }

    /// Returns true if the problem has a step with the given index.
    #[must_use]
    pub fn has_step(&self, step: usize) -> bool {
        step < self.step_count()
    }

    /// Returns true if the player is currently editing the operands.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        match self {
            Problem::Addition(p) => p.is_editable,
            Problem::Division(p) => p.is_editable,
        }
    }

    /// Returns a copy of the problem with the editable flag set to `editable`.
    #[must_use]
    pub fn with_editable(&self, editable: bool) -> Self {
        let mut problem = self.clone();
        match &mut problem {
            Problem::Addition(p) => p.is_editable = editable,
            Problem::Division(p) => p.is_editable = editable,
        }
        problem
    }

    /// Returns every field the player has to fill, in entry order.
    ///
    /// See [`order::field_order`].
    #[must_use]
    pub fn fields(&self) -> Vec<FieldId> {
        order::field_order(self)
    }

    /// Returns the correct digit for `field`, or `None` if the field does not exist
    /// in this problem.
    ///
    /// Fields of the other game mode, steps out of range, and digit positions beyond
    /// the width of a value never exist.
    #[must_use]
    pub fn expected_value(&self, field: FieldId) -> Option<u32> {
        match (self, field.kind) {
            (Problem::Addition(p), FieldKind::Addition(kind)) => {
                let step = p.steps.get(field.step)?;
                if field.position != 0 {
                    return None;
                }
                Some(match kind {
                    AdditionField::Sum => step.sum,
                    AdditionField::Carry => step.carry,
                })
            }
            (Problem::Division(p), FieldKind::Division(kind)) => {
                let step = p.steps.get(field.step)?;
                match kind {
                    DivisionField::Quotient => (field.position == 0).then_some(step.quotient),
                    DivisionField::Multiply => digit_of(step.multiply, field.position),
                    DivisionField::Subtract => digit_of(step.subtract, field.position),
                    DivisionField::BringDown => {
                        (field.position == 0).then_some(step.bring_down).flatten()
                    }
                }
            }
            _ => None,
        }
    }
}

fn digit_of(value: u32, position: u8) -> Option<u32> {
    (position < digit_count(value)).then(|| digit_at(value, position))
}
