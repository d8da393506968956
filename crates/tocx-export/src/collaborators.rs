//! Services the export pipeline depends on.
//!
//! The pipeline never extracts headings, renders documents or writes files
//! itself. The host supplies implementations of these traits:
//!
//! - [`SourceDocument`]: the document being exported (path, dirty state, save)
//! - [`HeadingSource`]: the current heading list of a document
//! - [`RenderService`]: HTML rendering and stylesheet retrieval
//! - [`DownloadSink`]: receives the finished [`Download`]

use std::future::Future;

use tocx_toc::Heading;

use crate::error::ExportError;

/// MIME type of exported documents.
pub const HTML_MIME_TYPE: &str = "text/html";

/// The document being exported.
pub trait SourceDocument {
    /// Document path as known to the render service.
    fn path(&self) -> &str;

    /// Whether the document has modifications that are not persisted yet.
    fn is_dirty(&self) -> bool;

    /// Whether the document may be written.
    fn is_read_only(&self) -> bool;

    /// Persist pending modifications.
    ///
    /// The returned future resolves once the persisted content is visible to
    /// the render service.
    fn save(&self) -> impl Future<Output = Result<(), ExportError>> + Send;
}

/// Lookup of the heading list for a document.
pub trait HeadingSource {
    /// Ordered headings of the document at `path`.
    fn headings(&self, path: &str) -> Vec<Heading>;
}

/// Remote rendering of documents and the ToC stylesheet.
pub trait RenderService {
    /// Render the document at `path` to a standalone HTML page.
    fn render_html(&self, path: &str) -> impl Future<Output = Result<String, ExportError>> + Send;

    /// Fetch the stylesheet injected alongside the ToC.
    fn stylesheet(&self) -> impl Future<Output = Result<String, ExportError>> + Send;
}

/// Destination for finished exports.
pub trait DownloadSink {
    /// Hand over a finished export.
    fn deliver(&self, download: Download) -> Result<(), ExportError>;
}

/// A serialized export ready for download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    /// Suggested filename.
    pub filename: String,
    /// MIME type of `contents`.
    pub mime_type: &'static str,
    /// Document bytes.
    pub contents: Vec<u8>,
}

impl Download {
    /// Package HTML markup for download.
    pub fn html(filename: impl Into<String>, markup: String) -> Self {
        Self {
            filename: filename.into(),
            mime_type: HTML_MIME_TYPE,
            contents: markup.into_bytes(),
        }
    }
}

/// Heading source backed by an already extracted heading list.
///
/// Returns the same headings for every path, matching a host that tracks the
/// ToC of its active document only.
#[derive(Clone, Debug, Default)]
pub struct StaticHeadings {
    headings: Vec<Heading>,
}

impl StaticHeadings {
    /// Wrap an extracted heading list.
    pub fn new(headings: Vec<Heading>) -> Self {
        Self { headings }
    }
}

impl HeadingSource for StaticHeadings {
    fn headings(&self, _path: &str) -> Vec<Heading> {
        self.headings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_html() {
        let download = Download::html("out.html", "<p>hi</p>".to_owned());
        assert_eq!(download.filename, "out.html");
        assert_eq!(download.mime_type, "text/html");
        assert_eq!(download.contents, b"<p>hi</p>");
    }

    #[test]
    fn test_static_headings_ignores_path() {
        let source = StaticHeadings::new(vec![Heading::new("Intro", 1)]);
        assert_eq!(source.headings("a.ipynb"), vec![Heading::new("Intro", 1)]);
        assert_eq!(source.headings("b.ipynb"), vec![Heading::new("Intro", 1)]);
    }
}
