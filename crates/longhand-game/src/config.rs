//! Session configuration.

use serde::{Deserialize, Serialize};

/// Switches read once per initialization or level load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Ask the external problem source for a batch before generating locally.
    pub use_external_source: bool,
    /// Unlock every configured level as soon as the session initializes.
    pub allow_level_skipping: bool,
}

/// Tunables of a [`GameSession`](crate::GameSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Feature switches.
    pub features: FeatureFlags,
    /// An external batch smaller than this is topped up with local problems.
    pub min_external_problems: usize,
    /// Number of problems in a level batch.
    pub batch_size: usize,
    /// Points awarded for completing a problem.
    pub points_per_problem: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            features: FeatureFlags::default(),
            min_external_problems: 8,
            batch_size: 10,
            points_per_problem: 10,
        }
    }
}

impl SessionConfig {
    /// Sets whether the external problem source is used.
    #[must_use]
    pub fn use_external_source(mut self, enabled: bool) -> Self {
        self.features.use_external_source = enabled;
        self
    }

    /// Sets whether every level is unlocked from the start.
    #[must_use]
    pub fn allow_level_skipping(mut self, enabled: bool) -> Self {
        self.features.allow_level_skipping = enabled;
        self
    }
}
