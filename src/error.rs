use thiserror::Error;

use crate::ConfigError;

/// Unified error type for the JSON loaders.
///
/// Returned by [`Ruleset::from_json()`](crate::Ruleset::from_json) and
/// [`Ruleset::from_value()`](crate::Ruleset::from_value). Expression syntax
/// errors arrive as [`ConfigError::InvalidExpression`]. Evaluation itself
/// never fails.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
