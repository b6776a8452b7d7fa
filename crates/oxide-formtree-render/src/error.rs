//! Error types for renderers.

use thiserror::Error;

/// Renderer configuration and output errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A template lacks a placeholder its slot requires.
    #[error("template for {slot} must contain the {placeholder} placeholder")]
    MissingPlaceholder {
        slot: String,
        placeholder: &'static str,
    },

    /// A `<qf:...>` section is opened but never closed.
    #[error("unclosed <qf:{0}> section in template")]
    UnclosedSection(String),

    /// Output could not be serialized.
    #[error("failed to serialize render output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for renderer operations.
pub type Result<T> = std::result::Result<T, RenderError>;
