//! Recording collaborators for the pipeline tests.
//!
//! [`MockDocument`], [`MockRenderService`] and [`MemorySink`] append every
//! call to a shared [`CallLog`], so tests can check the order of side
//! effects across collaborators.
//!
//! # Example
//!
//! ```ignore
//! use crate::mock::{CallLog, MemorySink, MockDocument, MockRenderService};
//!
//! let log = CallLog::default();
//! let document = MockDocument::new("a.ipynb", &log).dirty();
//! let renderer = MockRenderService::new(&log)
//!     .with_page("<html><head></head><body></body></html>")
//!     .with_stylesheet(".toc {}");
//! let sink = MemorySink::new(&log);
//! ```

use std::sync::{Arc, RwLock};

use crate::collaborators::{Download, DownloadSink, RenderService, SourceDocument};
use crate::error::{ExportError, Resource};

/// A collaborator call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Save(String),
    RenderHtml(String),
    Stylesheet,
    Deliver(String),
}

/// Ordered record of collaborator calls, shared between mocks.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<RwLock<Vec<Call>>>);

impl CallLog {
    /// Calls recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<Call> {
        self.0.read().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.0.write().unwrap().push(call);
    }
}

/// Canned outcome of a mocked request.
#[derive(Clone, Debug)]
enum Reply {
    Body(String),
    Status(u16, String),
    Unreachable,
}

impl Reply {
    fn into_result(self, resource: Resource) -> Result<String, ExportError> {
        match self {
            Self::Body(body) => Ok(body),
            Self::Status(status, body) => Err(ExportError::response(resource, status, &body)),
            Self::Unreachable => Err(ExportError::Transport {
                resource,
                message: "connection refused".to_owned(),
            }),
        }
    }
}

/// Mock source document.
#[derive(Debug)]
pub struct MockDocument {
    path: String,
    dirty: bool,
    read_only: bool,
    save_reply: Option<Reply>,
    log: CallLog,
}

impl MockDocument {
    /// A clean, writable document at `path`.
    pub fn new(path: impl Into<String>, log: &CallLog) -> Self {
        Self {
            path: path.into(),
            dirty: false,
            read_only: false,
            save_reply: None,
            log: log.clone(),
        }
    }

    /// Mark the document as having unsaved modifications.
    #[must_use]
    pub fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    /// Refuse saving: pending modifications stay unsaved.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Make saving fail with an HTTP status.
    #[must_use]
    pub fn with_save_status(mut self, status: u16, body: impl Into<String>) -> Self {
        self.save_reply = Some(Reply::Status(status, body.into()));
        self
    }
}

impl SourceDocument for MockDocument {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    async fn save(&self) -> Result<(), ExportError> {
        self.log.record(Call::Save(self.path.clone()));
        match self.save_reply.clone() {
            Some(reply) => reply.into_result(Resource::Contents).map(drop),
            None => Ok(()),
        }
    }
}

/// Mock render service.
///
/// Replies with 404 for the page and the stylesheet until configured.
#[derive(Debug)]
pub struct MockRenderService {
    page: Reply,
    stylesheet: Reply,
    log: CallLog,
}

impl MockRenderService {
    /// A service that records into `log` and has nothing to serve yet.
    pub fn new(log: &CallLog) -> Self {
        Self {
            page: Reply::Status(404, "Not Found".to_owned()),
            stylesheet: Reply::Status(404, "Not Found".to_owned()),
            log: log.clone(),
        }
    }

    /// Serve `html` as the rendered document.
    #[must_use]
    pub fn with_page(mut self, html: impl Into<String>) -> Self {
        self.page = Reply::Body(html.into());
        self
    }

    /// Answer render requests with an HTTP error.
    #[must_use]
    pub fn with_page_status(mut self, status: u16, body: impl Into<String>) -> Self {
        self.page = Reply::Status(status, body.into());
        self
    }

    /// Serve `css` as the ToC stylesheet.
    #[must_use]
    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = Reply::Body(css.into());
        self
    }

    /// Fail stylesheet requests with a transport error.
    #[must_use]
    pub fn with_unreachable_stylesheet(mut self) -> Self {
        self.stylesheet = Reply::Unreachable;
        self
    }
}

impl RenderService for MockRenderService {
    async fn render_html(&self, path: &str) -> Result<String, ExportError> {
        self.log.record(Call::RenderHtml(path.to_owned()));
        self.page.clone().into_result(Resource::Document)
    }

    async fn stylesheet(&self) -> Result<String, ExportError> {
        self.log.record(Call::Stylesheet);
        self.stylesheet.clone().into_result(Resource::Stylesheet)
    }
}

/// Download sink keeping deliveries in memory.
#[derive(Debug)]
pub struct MemorySink {
    downloads: RwLock<Vec<Download>>,
    failing: bool,
    log: CallLog,
}

impl MemorySink {
    /// An empty sink that accepts every delivery.
    pub fn new(log: &CallLog) -> Self {
        Self {
            downloads: RwLock::new(Vec::new()),
            failing: false,
            log: log.clone(),
        }
    }

    /// Reject every delivery with an I/O error.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Downloads delivered so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.read().unwrap().clone()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, download: Download) -> Result<(), ExportError> {
        self.log.record(Call::Deliver(download.filename.clone()));
        if self.failing {
            return Err(ExportError::Download {
                filename: download.filename,
                source: std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
            });
        }
        self.downloads.write().unwrap().push(download);
        Ok(())
    }
}
