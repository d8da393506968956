//! Error types for the export pipeline.

use std::fmt;

use crate::pipeline::Stage;

/// Remote resource requested during an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// The source document rendered to HTML.
    Document,
    /// The ToC stylesheet.
    Stylesheet,
    /// The stored notebook contents (save requests).
    Contents,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "rendered document",
            Self::Stylesheet => "stylesheet",
            Self::Contents => "notebook contents",
        };
        f.write_str(name)
    }
}

/// Error from a single export step.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The endpoint could not be reached (connection failure, timeout).
    #[error("{resource} request failed: {message}")]
    Transport {
        /// Resource being requested.
        resource: Resource,
        /// Transport error description.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("{resource} request returned HTTP {status}: {message}")]
    Response {
        /// Resource being requested.
        resource: Resource,
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the raw response body.
        message: String,
    },

    /// The rendered document lacks an insertion point.
    #[error("rendered document has no <{0}> element")]
    StructuralInvariant(&'static str),

    /// HTML serialization failed.
    #[error("HTML serialization failed")]
    Html(#[source] std::io::Error),

    /// A local stylesheet could not be read.
    #[error("failed to read stylesheet {}", .path.display())]
    StylesheetFile {
        /// Stylesheet path.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The download sink could not store the document.
    #[error("failed to deliver {filename}")]
    Download {
        /// Filename of the export.
        filename: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Build a response error, preferring a structured `message` in the body.
    pub(crate) fn response(resource: Resource, status: u16, body: &str) -> Self {
        Self::Response {
            resource,
            status,
            message: response_message(body),
        }
    }
}

/// Extract the `message` field of a JSON error body, falling back to the raw text.
fn response_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|message| !message.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

/// An export that ended in the failed state.
#[derive(Debug, thiserror::Error)]
#[error("export failed while {stage}: {error}")]
pub struct ExportFailure {
    /// Stage that was running when the failure occurred.
    pub stage: Stage,
    /// What went wrong.
    #[source]
    pub error: ExportError,
}
