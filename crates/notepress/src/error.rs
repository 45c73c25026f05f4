//! CLI error types.

use notepress_config::ConfigError;
use notepress_wordpress::{PublishError, WordPressError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    WordPress(#[from] WordPressError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
