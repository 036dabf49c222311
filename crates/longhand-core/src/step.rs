//! Per-step ground truth for addition columns and long-division steps.

use std::num::NonZero;

use serde::{Deserialize, Serialize};

use crate::digits::{digit_at, digit_count, digits_msb_first};

/// One column of a column addition, worked right to left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionStep {
    /// Index of the step within the problem.
    pub step_number: usize,
    /// Column index, 0 = ones column.
    pub column_position: usize,
    /// Digit of the first addend in this column (0 if the addend is shorter).
    pub digit1: u32,
    /// Digit of the second addend in this column (0 if the addend is shorter).
    pub digit2: u32,
    /// Digit written below the column.
    pub sum: u32,
    /// Carry passed to the next column (0 or 1).
    pub carry: u32,
    /// Carry received from the previous column (0 or 1).
    pub carry_received: u32,
}

impl AdditionStep {
    /// Works out every column of `addend1 + addend2`.
    ///
    /// A carry leaving the most significant column gets its own final step whose
    /// sum is the carry.
    #[must_use]
    pub fn build_all(addend1: u32, addend2: u32) -> Vec<Self> {
        let columns = digit_count(addend1).max(digit_count(addend2));
        let mut steps = Vec::with_capacity(usize::from(columns) + 1);
        let mut carry_in = 0;

        for column in 0..columns {
            let digit1 = digit_at(addend1, column);
            let digit2 = digit_at(addend2, column);
            let total = digit1 + digit2 + carry_in;
            let carry = u32::from(total >= 10);
            steps.push(Self {
                step_number: usize::from(column),
                column_position: usize::from(column),
                digit1,
                digit2,
                sum: total % 10,
                carry,
                carry_received: carry_in,
            });
            carry_in = carry;
        }

        if carry_in > 0 {
            let column = usize::from(columns);
            steps.push(Self {
                step_number: column,
                column_position: column,
                digit1: 0,
                digit2: 0,
                sum: carry_in,
                carry: 0,
                carry_received: 0,
            });
        }

        steps
    }
}

/// One quotient digit of a long division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionStep {
    /// Index of the step within the problem.
    pub step_number: usize,
    /// The number being divided in this step.
    pub partial_dividend: u32,
    /// Quotient digit (0-9).
    pub quotient: u32,
    /// `quotient * divisor`.
    pub multiply: u32,
    /// `partial_dividend - multiply`.
    pub subtract: u32,
    /// Next dividend digit, absent on the last step.
    pub bring_down: Option<u32>,
}

impl DivisionStep {
    /// Works out the schoolbook long division of `dividend` by `divisor`.
    ///
    /// The first partial dividend takes the fewest leading digits that reach the
    /// divisor (the whole dividend if none do). Returns `None` if an intermediate
    /// value does not fit in a `u32`.
    #[must_use]
    pub fn build_all(dividend: u32, divisor: NonZero<u32>) -> Option<Vec<Self>> {
        let divisor = divisor.get();
        let digits = digits_msb_first(dividend);

        let mut next = 0;
        let mut partial = 0u32;
        while next < digits.len() {
            partial = partial.checked_mul(10)?.checked_add(digits[next])?;
            next += 1;
            if partial >= divisor {
                break;
            }
        }

        let mut steps = Vec::with_capacity(digits.len() - next + 1);
        loop {
            let quotient = partial / divisor;
            let multiply = quotient * divisor;
            let subtract = partial - multiply;
            let bring_down = digits.get(next).copied();
            steps.push(Self {
                step_number: steps.len(),
                partial_dividend: partial,
                quotient,
                multiply,
                subtract,
                bring_down,
            });

            let Some(digit) = bring_down else {
                break;
            };
            partial = subtract.checked_mul(10)?.checked_add(digit)?;
            next += 1;
        }

        Some(steps)
    }
}
