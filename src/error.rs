//! Error types for the tile grid

use thiserror::Error;

/// Result type alias for grid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing templates or laying out tiles
#[derive(Error, Debug)]
pub enum Error {
    /// A row template could not be accepted
    #[error("Malformed template (row {row}): {reason}")]
    MalformedTemplate { row: usize, reason: String },

    /// Neither the requested template nor its fallback is registered
    #[error("Template not found: {key}")]
    TemplateNotFound { key: String },

    /// A post record could not be turned into a tile
    #[error("Invalid post data: {0}")]
    InvalidPost(String),

    /// The layout pass could not be computed
    #[error("Layout failed: {0}")]
    Layout(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Error::MalformedTemplate {
            row,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_template_message_names_row() {
        let err = Error::malformed(2, "spans sum to 3, expected 4");
        assert_eq!(
            err.to_string(),
            "Malformed template (row 2): spans sum to 3, expected 4"
        );
    }

    #[test]
    fn json_errors_convert() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
