//! Level catalogs and local problem generation.
//!
//! A [`LevelCatalog`] is the ordered, fixed list of levels of one game mode. The
//! [`ProblemGenerator`] builds [`Problem`]s that follow a level's rules, either from
//! explicit operands (deterministic) or at random from a seedable PCG generator.
//!
//! # Examples
//!
//! ```
//! use longhand_generator::{LevelCatalog, LevelId, ProblemGenerator};
//!
//! let catalog = LevelCatalog::addition();
//! let mut generator = ProblemGenerator::with_seed(7);
//!
//! let problem = generator.generate_for(&catalog, LevelId::FIRST, None).unwrap();
//! assert!(problem.mode().is_addition());
//!
//! let edited = generator
//!     .generate_for(&catalog, LevelId::FIRST, Some((47, 38)))
//!     .unwrap();
//! assert_eq!(edited.operands(), (47, 38));
//!
//! // Unknown levels are a configuration error.
//! assert!(generator.generate_for(&catalog, LevelId(99), None).is_err());
//! ```
//!
//! [`Problem`]: longhand_core::Problem

pub mod generator;
pub mod level;

pub use self::{
    generator::{GenerateError, ProblemGenerator},
    level::{Carrying, Level, LevelCatalog, LevelId, LevelRules},
};
