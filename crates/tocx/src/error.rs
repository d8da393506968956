//! CLI error types.

use tocx_config::ConfigError;
use tocx_export::ExportFailure;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Export(#[from] ExportFailure),

    #[error("{0}")]
    Validation(String),
}
