//! Session and navigation controllers for longhand arithmetic practice.
//!
//! Two independent state machines make up a game:
//!
//! - [`GameSession`] owns levels, the current problem, answers, scoring, and the
//!   submission status. Problems come from a [`ProblemGenerator`] and, optionally, an
//!   external [`ProblemSource`].
//! - [`FieldNavigator`] owns the keyboard focus among the fields of the current
//!   problem and turns key presses into focus moves or a submit request.
//!
//! Both read the same [`Problem`] and [`AnswerSet`]; the pure functions in
//! [`validate`] decide correctness.
//!
//! # Examples
//!
//! ```
//! use longhand_core::{FieldId, Problem};
//! use longhand_game::{GameSession, LevelCatalog, LevelId};
//!
//! let session = GameSession::builder(LevelCatalog::addition()).seed(3).build();
//! session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(47, 38)]);
//!
//! session.submit_answer(FieldId::sum(0), 5);
//! session.submit_answer(FieldId::carry(0), 1);
//! session.submit_answer(FieldId::sum(1), 8);
//! session.submit_problem();
//!
//! let state = session.snapshot();
//! assert!(state.is_complete());
//! assert_eq!(state.score(), 10);
//! ```
//!
//! [`ProblemGenerator`]: longhand_generator::ProblemGenerator
//! [`Problem`]: longhand_core::Problem
//! [`AnswerSet`]: longhand_core::AnswerSet

pub mod config;
pub mod navigation;
pub mod session;
pub mod source;
mod task;
pub mod validate;

pub use longhand_generator::{Level, LevelCatalog, LevelId};

pub use self::{
    config::{FeatureFlags, SessionConfig},
    navigation::{FieldNavigator, Key, KeyEvent, KeyResponse, NavContext},
    session::{GameSession, LoadError, LoadStatus, SessionBuilder, SessionState},
    source::{FetchError, FetchFuture, PresetSource, ProblemSource},
};
