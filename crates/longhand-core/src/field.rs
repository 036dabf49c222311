//! Game modes and field identifiers.

use serde::{Deserialize, Serialize};

/// The kind of arithmetic being practiced.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum GameMode {
    /// Column addition of two addends.
    #[display("addition")]
    Addition,
    /// Long division of a dividend by a divisor.
    #[display("division")]
    Division,
}

/// A fillable value within one addition column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum AdditionField {
    /// The digit written below the column.
    #[display("sum")]
    Sum,
    /// The carry passed to the next column.
    #[display("carry")]
    Carry,
}

/// A fillable value within one long-division step.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum DivisionField {
    /// The quotient digit produced by the step.
    #[display("quotient")]
    Quotient,
    /// The product of the quotient digit and the divisor.
    #[display("multiply")]
    Multiply,
    /// The difference between the partial dividend and the product.
    #[display("subtract")]
    Subtract,
    /// The dividend digit brought down for the next step.
    #[display("bring-down")]
    BringDown,
}

/// A field kind, tagged by the game mode it belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
pub enum FieldKind {
    /// A field of an addition problem.
    Addition(AdditionField),
    /// A field of a division problem.
    Division(DivisionField),
}

impl FieldKind {
    /// Returns the game mode this kind belongs to.
    #[must_use]
    pub const fn mode(self) -> GameMode {
        match self {
            FieldKind::Addition(_) => GameMode::Addition,
            FieldKind::Division(_) => GameMode::Division,
        }
    }

    /// Returns the field entered first in every step of the given mode.
    #[must_use]
    pub const fn primary(mode: GameMode) -> Self {
        match mode {
            GameMode::Addition => FieldKind::Addition(AdditionField::Sum),
            GameMode::Division => FieldKind::Division(DivisionField::Quotient),
        }
    }
}

/// Identifies one fillable digit: `(step, kind, position)`.
///
/// `position` disambiguates the digits of a multi-digit value within a step;
/// position 0 is the least-significant digit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("step {step} {kind}[{position}]")]
pub struct FieldId {
    /// Index of the step within the problem.
    pub step: usize,
    /// Which value of the step.
    pub kind: FieldKind,
    /// Digit position within the value (0 = ones).
    pub position: u8,
}

impl FieldId {
    /// Creates a field identifier.
    #[must_use]
    pub fn new(step: usize, kind: impl Into<FieldKind>, position: u8) -> Self {
        Self {
            step,
            kind: kind.into(),
            position,
        }
    }

    /// The default focus of a mode: the primary field of the first step.
    #[must_use]
    pub const fn first_of(mode: GameMode) -> Self {
        Self {
            step: 0,
            kind: FieldKind::primary(mode),
            position: 0,
        }
    }

    /// The sum digit of an addition column.
    #[must_use]
    pub fn sum(step: usize) -> Self {
        Self::new(step, AdditionField::Sum, 0)
    }

    /// The carry out of an addition column.
    #[must_use]
    pub fn carry(step: usize) -> Self {
        Self::new(step, AdditionField::Carry, 0)
    }

    /// The quotient digit of a division step.
    #[must_use]
    pub fn quotient(step: usize) -> Self {
        Self::new(step, DivisionField::Quotient, 0)
    }

    /// One digit of the product of a division step.
    #[must_use]
    pub fn multiply(step: usize, position: u8) -> Self {
        Self::new(step, DivisionField::Multiply, position)
    }

    /// One digit of the difference of a division step.
    #[must_use]
    pub fn subtract(step: usize, position: u8) -> Self {
        Self::new(step, DivisionField::Subtract, position)
    }

    /// The brought-down digit of a division step.
    #[must_use]
    pub fn bring_down(step: usize) -> Self {
        Self::new(step, DivisionField::BringDown, 0)
    }
}
