//! Local problem generation.

use longhand_core::{AdditionStep, GameMode, Problem};
use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg64;

use crate::level::{Carrying, Level, LevelCatalog, LevelId, LevelRules};

/// How many random pairs a carrying level draws before accepting one without a carry.
const MAX_CARRY_ATTEMPTS: usize = 64;

/// Errors that can occur while generating a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenerateError {
    /// The level is not part of the catalog.
    #[display("level {level} is not configured")]
    UnknownLevel {
        /// The requested level.
        level: LevelId,
    },
    /// The operands cannot form a problem of the level's mode.
    #[display("operands {operand1} and {operand2} do not form a {mode} problem")]
    InvalidOperands {
        /// Mode of the level.
        mode: GameMode,
        /// First operand.
        operand1: u32,
        /// Second operand.
        operand2: u32,
    },
    /// No problem satisfies the level's rules.
    #[display("level {level} has rules no problem can satisfy")]
    UnsatisfiableRules {
        /// The misconfigured level.
        level: LevelId,
    },
}

/// Generates problems for levels.
///
/// Random problems come from a PCG generator, so a generator created with
/// [`ProblemGenerator::with_seed`] always produces the same sequence.
#[derive(Debug, Clone)]
pub struct ProblemGenerator {
    rng: Pcg64,
}

impl Default for ProblemGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemGenerator {
    /// Creates a generator seeded from the thread-local entropy source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Pcg64::from_rng(&mut rand::rng()),
        }
    }

    /// Creates a generator with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Generates a problem for `level`.
    ///
    /// With explicit `operands` the result is deterministic and the level only decides
    /// the mode; otherwise the operands are drawn at random within the level's rules.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidOperands`] if the operands cannot form a problem
    /// (a zero divisor), and [`GenerateError::UnsatisfiableRules`] if the level's rules
    /// admit no problem.
    pub fn generate(
        &mut self,
        level: &Level,
        operands: Option<(u32, u32)>,
    ) -> Result<Problem, GenerateError> {
        let (operand1, operand2) = match operands {
            Some(operands) => operands,
            None => self.random_operands(level)?,
        };
        Problem::from_operands(level.mode(), operand1, operand2).ok_or(
            GenerateError::InvalidOperands {
                mode: level.mode(),
                operand1,
                operand2,
            },
        )
    }

    /// Looks `level` up in `catalog` and generates a problem for it.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnknownLevel`] if the catalog does not configure the
    /// level, and any error of [`ProblemGenerator::generate`].
    pub fn generate_for(
        &mut self,
        catalog: &LevelCatalog,
        level: LevelId,
        operands: Option<(u32, u32)>,
    ) -> Result<Problem, GenerateError> {
        let level = catalog
            .get(level)
            .ok_or(GenerateError::UnknownLevel { level })?;
        self.generate(level, operands)
    }

    /// Generates `count` random problems for `level`.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`ProblemGenerator::generate`].
    pub fn generate_batch(
        &mut self,
        level: &Level,
        count: usize,
    ) -> Result<Vec<Problem>, GenerateError> {
        (0..count).map(|_| self.generate(level, None)).collect()
    }

    /// Shuffles `items` uniformly (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    fn random_operands(&mut self, level: &Level) -> Result<(u32, u32), GenerateError> {
        match level.rules {
            LevelRules::Addition {
                digits1,
                digits2,
                carrying: Carrying::Never,
            } => Ok(self.addends_without_carry(digits1, digits2)),
            LevelRules::Addition {
                digits1,
                digits2,
                carrying: Carrying::Required,
            } => Ok(self.addends_with_carry(digits1, digits2)),
            LevelRules::Division {
                dividend_digits,
                divisor_digits,
                exact,
            } => self
                .division_operands(dividend_digits, divisor_digits, exact)
                .ok_or(GenerateError::UnsatisfiableRules { level: level.id }),
        }
    }

    /// Builds the addends column by column so that no column sum exceeds 9.
    fn addends_without_carry(&mut self, digits1: u8, digits2: u8) -> (u32, u32) {
        let (mut addend1, mut addend2) = (0, 0);
        for column in (0..digits1.max(digits2)).rev() {
            let place = 10u32.pow(u32::from(column));
            let in1 = column < digits1;
            let in2 = column < digits2;
            let lead1 = u32::from(column + 1 == digits1);
            let lead2 = u32::from(column + 1 == digits2);

            // Leave room for a non-zero leading digit of the second addend.
            let max1 = if in2 { 9 - lead2 } else { 9 };
            let digit1 = if in1 {
                self.rng.random_range(lead1..=max1)
            } else {
                0
            };
            let digit2 = if in2 {
                self.rng.random_range(lead2..=9 - digit1)
            } else {
                0
            };
            addend1 += digit1 * place;
            addend2 += digit2 * place;
        }
        (addend1, addend2)
    }

    fn addends_with_carry(&mut self, digits1: u8, digits2: u8) -> (u32, u32) {
        let mut pair = (0, 0);
        for _ in 0..MAX_CARRY_ATTEMPTS {
            pair = (self.number_with_digits(digits1), self.number_with_digits(digits2));
            let carries = AdditionStep::build_all(pair.0, pair.1)
                .iter()
                .any(|step| step.carry > 0);
            if carries {
                break;
            }
        }
        pair
    }

    fn division_operands(
        &mut self,
        dividend_digits: u8,
        divisor_digits: u8,
        exact: bool,
    ) -> Option<(u32, u32)> {
        let (divisor_min, divisor_max) = digit_range(divisor_digits);
        // Dividing by one is not worth practicing.
        let divisor = self.rng.random_range(divisor_min.max(2)..=divisor_max);
        let (dividend_min, dividend_max) = digit_range(dividend_digits);

        let dividend = if exact {
            let quotient_min = dividend_min.div_ceil(divisor);
            let quotient_max = dividend_max / divisor;
            if quotient_min > quotient_max {
                return None;
            }
            self.rng.random_range(quotient_min..=quotient_max) * divisor
        } else {
            if dividend_max < divisor {
                return None;
            }
            self.rng.random_range(dividend_min.max(divisor)..=dividend_max)
        };
        Some((dividend, divisor))
    }

    fn number_with_digits(&mut self, digits: u8) -> u32 {
        let (min, max) = digit_range(digits);
        self.rng.random_range(min..=max)
    }
}

/// Smallest and largest positive numbers with `digits` decimal digits.
fn digit_range(digits: u8) -> (u32, u32) {
    let digits = u32::from(digits.clamp(1, 9));
    (10u32.pow(digits - 1), 10u32.pow(digits) - 1)
}
