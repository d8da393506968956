//! ToC stylesheet sources.

use std::path::{Path, PathBuf};

use crate::error::ExportError;

/// Stylesheet shipped with tocx, matching the markup of `tocx_toc::render_toc`.
pub const BUNDLED_STYLESHEET: &str = include_str!("../style/toc.css");

/// Server route of the ToC stylesheet, relative to the base URL.
pub const DEFAULT_STYLESHEET_PATH: &str = "html-toc-export/toc-css";

/// Where the ToC stylesheet comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StylesheetSource {
    /// Fetched from the server at a path relative to the base URL.
    ///
    /// A 404 means the server does not provide one; the bundled stylesheet
    /// is used instead.
    Server(String),
    /// Read from a local file.
    File(PathBuf),
    /// [`BUNDLED_STYLESHEET`], without any request.
    Bundled,
}

impl StylesheetSource {
    /// Server route, with surrounding slashes removed.
    pub fn server(path: &str) -> Self {
        Self::Server(path.trim_matches('/').to_owned())
    }
}

impl Default for StylesheetSource {
    fn default() -> Self {
        Self::Server(DEFAULT_STYLESHEET_PATH.to_owned())
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, ExportError> {
    std::fs::read_to_string(path).map_err(|source| ExportError::StylesheetFile {
        path: path.to_path_buf(),
        source,
    })
}
