//! Export pipeline.
//!
//! One [`ExportPipeline::run`] call performs a single export:
//!
//! ```text
//! Idle → [Saving] → FetchingDocument → FetchingStyle → Synthesizing
//!      → Assembling → Serializing → Downloaded
//! ```
//!
//! Saving only happens for documents with unsaved, writable modifications.
//! The stylesheet is requested after the rendered document has arrived. Any
//! failure ends the run in [`Stage::Failed`] and nothing is delivered.

use std::fmt;

use serde::Serialize;
use tocx_toc::{count_nodes, render_toc, synthesize};
use tracing::{debug, error, info};

use crate::assemble::assemble;
use crate::collaborators::{Download, DownloadSink, HeadingSource, RenderService, SourceDocument};
use crate::error::{ExportError, ExportFailure};

/// Filename used when the caller does not supply one.
pub const DEFAULT_FILENAME: &str = "document.html";

/// Export pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Not started.
    Idle,
    /// Storing unsaved modifications of the document.
    Saving,
    /// Requesting the standalone HTML rendering.
    FetchingDocument,
    /// Requesting the ToC stylesheet.
    FetchingStyle,
    /// Building the heading tree and its markup.
    Synthesizing,
    /// Merging page, ToC and stylesheet.
    Assembling,
    /// Writing the merged tree back to HTML text.
    Serializing,
    /// The download sink accepted the document.
    Downloaded,
    /// A stage failed; nothing was delivered.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Saving => "saving",
            Self::FetchingDocument => "fetching document",
            Self::FetchingStyle => "fetching stylesheet",
            Self::Synthesizing => "synthesizing",
            Self::Assembling => "assembling",
            Self::Serializing => "serializing",
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Services used by one export.
pub struct Collaborators<'a, D, H, R, K> {
    /// The document being exported.
    pub document: &'a D,
    /// Headings of the document, in document order.
    pub headings: &'a H,
    /// Produces the HTML page and the stylesheet.
    pub renderer: &'a R,
    /// Receives the finished document.
    pub sink: &'a K,
}

/// Caller-supplied export settings.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Filename suggested to the download sink.
    pub filename: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_owned(),
        }
    }
}

/// Summary of a successful export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Stages entered, in order, ending with [`Stage::Downloaded`].
    pub stages: Vec<Stage>,
    /// Whether the document was saved before rendering.
    pub saved: bool,
    /// Filename handed to the download sink.
    pub filename: String,
    /// Size of the delivered document in bytes.
    pub bytes: usize,
    /// Number of ToC entries injected.
    pub toc_entries: usize,
}

/// Orchestrates save, fetch, synthesis, assembly and download.
pub struct ExportPipeline<'a, D, H, R, K> {
    collaborators: Collaborators<'a, D, H, R, K>,
    options: ExportOptions,
}

impl<'a, D, H, R, K> ExportPipeline<'a, D, H, R, K>
where
    D: SourceDocument,
    H: HeadingSource,
    R: RenderService,
    K: DownloadSink,
{
    /// A pipeline that exports through `collaborators`.
    pub fn new(collaborators: Collaborators<'a, D, H, R, K>, options: ExportOptions) -> Self {
        Self {
            collaborators,
            options,
        }
    }

    /// Run one export.
    ///
    /// # Errors
    ///
    /// Returns [`ExportFailure`] naming the stage that failed. No download is
    /// delivered in that case.
    pub async fn run(&self) -> Result<ExportReport, ExportFailure> {
        let Collaborators {
            document,
            headings,
            renderer,
            sink,
        } = &self.collaborators;
        let path = document.path();
        let mut progress = Progress::new(path);

        let saved = document.is_dirty() && !document.is_read_only();
        if saved {
            progress.enter(Stage::Saving);
            progress.check(document.save().await)?;
        }

        progress.enter(Stage::FetchingDocument);
        let source_html = progress.check(renderer.render_html(path).await)?;

        progress.enter(Stage::FetchingStyle);
        let stylesheet = progress.check(renderer.stylesheet().await)?;

        progress.enter(Stage::Synthesizing);
        let tree = synthesize(&headings.headings(path));
        let toc_entries = count_nodes(&tree);
        let fragment = render_toc(&tree);
        debug!("Synthesized {} ToC entries for {}", toc_entries, path);

        progress.enter(Stage::Assembling);
        let assembled = progress.check(assemble(&source_html, &fragment, &stylesheet))?;

        progress.enter(Stage::Serializing);
        let markup = progress.check(assembled.to_html())?;
        let bytes = markup.len();
        let filename = self.options.filename.clone();
        progress.check(sink.deliver(Download::html(filename.clone(), markup)))?;

        progress.enter(Stage::Downloaded);
        info!("Exported {} as {} ({} bytes)", path, filename, bytes);

        Ok(ExportReport {
            stages: progress.stages,
            saved,
            filename,
            bytes,
            toc_entries,
        })
    }
}

/// Stage bookkeeping for one run.
struct Progress<'p> {
    path: &'p str,
    current: Stage,
    stages: Vec<Stage>,
}

impl<'p> Progress<'p> {
    fn new(path: &'p str) -> Self {
        Self {
            path,
            current: Stage::Idle,
            stages: vec![Stage::Idle],
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Export of {}: {} -> {}", self.path, self.current, stage);
        self.current = stage;
        self.stages.push(stage);
    }

    /// Attribute a step failure to the current stage.
    fn check<T>(&self, result: Result<T, ExportError>) -> Result<T, ExportFailure> {
        result.map_err(|error| {
            error!("Export of {} failed while {}: {}", self.path, self.current, error);
            ExportFailure {
                stage: self.current,
                error,
            }
        })
    }
}
