//! External problem sources.

use std::{collections::BTreeMap, future::Future, pin::Pin};

use longhand_core::Problem;
use longhand_generator::LevelId;

/// The pending result of [`ProblemSource::fetch_problems`].
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Vec<Problem>, FetchError>>>>;

/// Errors reported by a problem source.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FetchError {
    /// The source could not be reached.
    #[display("problem source unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
    /// The source answered with data that is not a problem list.
    #[display("problem source returned malformed data: {reason}")]
    Malformed {
        /// Human-readable cause.
        reason: String,
    },
}

/// A supplier of pre-built problems, such as a remote problem service.
///
/// Fetching may take any number of event-loop turns and may fail; a session
/// recovers from failures by generating the batch locally.
pub trait ProblemSource {
    /// Requests the pre-built problems of `level`.
    fn fetch_problems(&self, level: LevelId) -> FetchFuture;
}

impl<F> ProblemSource for F
where
    F: Fn(LevelId) -> FetchFuture,
{
    fn fetch_problems(&self, level: LevelId) -> FetchFuture {
        self(level)
    }
}

/// A source that serves a fixed list of problems per level.
///
/// Levels without an entry yield an empty list.
#[derive(Debug, Clone, Default)]
pub struct PresetSource {
    levels: BTreeMap<LevelId, Vec<Problem>>,
}

impl PresetSource {
    /// Creates a source with no problems.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `problems` to the list served for `level`.
    #[must_use]
    pub fn with_level(mut self, level: LevelId, problems: impl IntoIterator<Item = Problem>) -> Self {
        self.levels.entry(level).or_default().extend(problems);
        self
    }
}

impl ProblemSource for PresetSource {
    fn fetch_problems(&self, level: LevelId) -> FetchFuture {
        let problems = self.levels.get(&level).cloned().unwrap_or_default();
        Box::pin(std::future::ready(Ok(problems)))
    }
}
