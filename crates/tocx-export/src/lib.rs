//! HTML export with an injected table of contents.
//!
//! An export renders a document to a standalone HTML page, prepends a ToC
//! built from the document's headings, appends the ToC stylesheet and hands
//! the result to a download sink.
//!
//! # Architecture
//!
//! - [`ExportPipeline`]: orchestrates save, fetch, synthesis, assembly and delivery
//! - [`SourceDocument`], [`HeadingSource`], [`RenderService`], [`DownloadSink`]:
//!   collaborators supplied by the host
//! - [`JupyterClient`] and [`JupyterDocument`]: collaborators backed by a
//!   Jupyter server
//! - [`NotebookHeadings`]: headings of notebook markdown cells
//! - [`StylesheetSource`]: server route, local file or the bundled stylesheet
//! - [`FileSink`]: writes downloads into a directory
//! - [`assemble`]: merges page, ToC fragment and stylesheet
//!
//! # Example
//!
//! ```ignore
//! use tocx_export::{
//!     Collaborators, ExportOptions, ExportPipeline, FileSink, JupyterClient,
//!     JupyterDocument, StaticHeadings,
//! };
//!
//! let client = JupyterClient::new("http://localhost:8888");
//! let document = JupyterDocument::new(&client, "notes.ipynb");
//! let headings = StaticHeadings::new(headings);
//! let sink = FileSink::new("exports");
//!
//! let pipeline = ExportPipeline::new(
//!     Collaborators { document: &document, headings: &headings, renderer: &client, sink: &sink },
//!     ExportOptions::default(),
//! );
//! let report = pipeline.run().await?;
//! ```

mod assemble;
mod client;
mod collaborators;
mod document;
mod error;
mod notebook;
mod pipeline;
mod sink;
mod stylesheet;

#[cfg(test)]
mod mock;

pub use assemble::{AssembledDocument, assemble};
pub use client::JupyterClient;
pub use collaborators::{
    Download, DownloadSink, HTML_MIME_TYPE, HeadingSource, RenderService, SourceDocument,
    StaticHeadings,
};
pub use document::JupyterDocument;
pub use error::{ExportError, ExportFailure, Resource};
pub use notebook::NotebookHeadings;
pub use pipeline::{
    Collaborators, DEFAULT_FILENAME, ExportOptions, ExportPipeline, ExportReport, Stage,
};
pub use sink::FileSink;
pub use stylesheet::{BUNDLED_STYLESHEET, DEFAULT_STYLESHEET_PATH, StylesheetSource};
