//! Error types for the xmigen pipeline.
//!
//! Fatal conditions are [`XmiError`]s. Validation findings are not errors;
//! see [`ValidationError`](crate::validate::ValidationError).

use std::path::PathBuf;

use crate::generate::Level;

/// Top-level error enum for parsing and generation.
#[derive(Debug, thiserror::Error)]
pub enum XmiError {
    /// Malformed or unsupported XMI.
    #[error("Format error: {0}")]
    Format(String),

    /// The configured root package does not exist in the document.
    #[error("Root packaged element not found: {0}")]
    RootPackageNotFound(String),

    /// An `xmi:idref` that does not resolve to an element of the expected kind.
    #[error("Lookup error: {what} '{id}' not found")]
    Lookup { what: &'static str, id: String },

    /// A template (body, destination path or filter) failed to render.
    #[error("Render error in {level} template '{template}': {source}")]
    Render {
        level: Level,
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// A directory or output file could not be written.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Test-case serialization reached an instance already being serialized.
    #[error("Cycle error: instance reference cycle {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// The recipe could not be deserialized.
    #[error("Recipe error in {}: {source}", .path.display())]
    Recipe {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl XmiError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        XmiError::Format(message.into())
    }

    pub(crate) fn lookup(what: &'static str, id: impl Into<String>) -> Self {
        XmiError::Lookup {
            what,
            id: id.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        XmiError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, XmiError>;
