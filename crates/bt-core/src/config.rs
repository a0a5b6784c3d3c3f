use crate::TickContext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-tree settings, handed to the driver at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Trace every lifecycle transition at `DEBUG` on [`crate::LIFECYCLE_TARGET`].
    pub debug_behaviours: bool,

    /// Reset a root that ended on the previous tick before stepping it again, so
    /// every tick after completion starts a fresh activation.
    pub reset_on_completion: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            debug_behaviours: false,
            reset_on_completion: true,
        }
    }
}

impl TreeConfig {
    pub fn with_debug(mut self, debug_behaviours: bool) -> Self {
        self.debug_behaviours = debug_behaviours;
        self
    }

    pub fn context(&self, tick: u64, delta: f32) -> TickContext {
        TickContext::new(tick, delta).with_debug(self.debug_behaviours)
    }

    /// Parse a YAML document; missing fields keep their defaults.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }
}

#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid tree config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
