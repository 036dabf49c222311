//! Level definitions and the built-in catalogs.

use longhand_core::GameMode;
use serde::{Deserialize, Serialize};

/// Numeric identifier of a level; the first level of every catalog is 1.
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
#[serde(transparent)]
pub struct LevelId(pub u32);

impl LevelId {
    /// The level every session starts with.
    pub const FIRST: Self = Self(1);

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Whether the columns of an addition level carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrying {
    /// No column ever carries.
    Never,
    /// At least one column carries.
    Required,
}

/// What a level's problems look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRules {
    /// Column addition.
    Addition {
        /// Digits of the first addend.
        digits1: u8,
        /// Digits of the second addend.
        digits2: u8,
        /// Carry constraint.
        carrying: Carrying,
    },
    /// Long division.
    Division {
        /// Digits of the dividend.
        dividend_digits: u8,
        /// Digits of the divisor.
        divisor_digits: u8,
        /// True if every problem divides without remainder.
        exact: bool,
    },
}

/// One playable level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    /// Identifier, unique within its catalog.
    pub id: LevelId,
    /// Short title shown to the player.
    pub name: &'static str,
    /// Generation rules.
    pub rules: LevelRules,
}

impl Level {
    /// Returns the game mode of the level.
    #[must_use]
    pub const fn mode(&self) -> GameMode {
        match self.rules {
            LevelRules::Addition { .. } => GameMode::Addition,
            LevelRules::Division { .. } => GameMode::Division,
        }
    }
}

const fn addition(id: u32, name: &'static str, digits: u8, carrying: Carrying) -> Level {
    Level {
        id: LevelId(id),
        name,
        rules: LevelRules::Addition {
            digits1: digits,
            digits2: digits,
            carrying,
        },
    }
}

const fn division(
    id: u32,
    name: &'static str,
    dividend_digits: u8,
    divisor_digits: u8,
    exact: bool,
) -> Level {
    Level {
        id: LevelId(id),
        name,
        rules: LevelRules::Division {
            dividend_digits,
            divisor_digits,
            exact,
        },
    }
}

const ADDITION_LEVELS: [Level; 6] = [
    addition(1, "Single digits", 1, Carrying::Never),
    addition(2, "Single digits with carrying", 1, Carrying::Required),
    addition(3, "Two digits", 2, Carrying::Never),
    addition(4, "Two digits with carrying", 2, Carrying::Required),
    addition(5, "Three digits", 3, Carrying::Required),
    addition(6, "Four digits", 4, Carrying::Required),
];

const DIVISION_LEVELS: [Level; 5] = [
    division(1, "Divide by one digit", 2, 1, true),
    division(2, "Remainders", 2, 1, false),
    division(3, "Three-digit dividends", 3, 1, false),
    division(4, "Two-digit divisors", 3, 2, true),
    division(5, "Four-digit dividends", 4, 2, false),
];

/// The ordered, fixed list of levels of one game mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    mode: GameMode,
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Creates a catalog from `levels`, in play order.
    ///
    /// # Panics
    ///
    /// Panics if a level belongs to another mode.
    #[must_use]
    pub fn new(mode: GameMode, levels: Vec<Level>) -> Self {
        assert!(levels.iter().all(|level| level.mode() == mode));
        Self { mode, levels }
    }

    /// The built-in addition levels.
    #[must_use]
    pub fn addition() -> Self {
        Self::new(GameMode::Addition, ADDITION_LEVELS.to_vec())
    }

    /// The built-in division levels.
    #[must_use]
    pub fn division() -> Self {
        Self::new(GameMode::Division, DIVISION_LEVELS.to_vec())
    }

    /// The built-in levels of `mode`.
    #[must_use]
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Addition => Self::addition(),
            GameMode::Division => Self::division(),
        }
    }

    /// Returns the game mode of every level in the catalog.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Returns the level with identifier `id`.
    #[must_use]
    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }

    /// Returns true if the catalog configures level `id`.
    #[must_use]
    pub fn contains(&self, id: LevelId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates over the level identifiers in play order.
    pub fn ids(&self) -> impl Iterator<Item = LevelId> + '_ {
        self.levels.iter().map(|level| level.id)
    }

    /// Iterates over the levels in play order.
    pub fn iter(&self) -> std::slice::Iter<'_, Level> {
        self.levels.iter()
    }

    /// Returns the number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if the catalog has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
