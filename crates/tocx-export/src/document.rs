//! Notebook documents stored on a Jupyter server.

use crate::client::JupyterClient;
use crate::collaborators::SourceDocument;
use crate::error::ExportError;

/// A notebook on a Jupyter server, optionally carrying unsaved edits.
pub struct JupyterDocument<'a> {
    client: &'a JupyterClient,
    path: String,
    pending: Option<serde_json::Value>,
    read_only: bool,
}

impl<'a> JupyterDocument<'a> {
    /// A notebook whose server copy is current.
    pub fn new(client: &'a JupyterClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            pending: None,
            read_only: false,
        }
    }

    /// Attach notebook JSON that has not been stored on the server yet.
    #[must_use]
    pub fn with_pending_edits(mut self, notebook: serde_json::Value) -> Self {
        self.pending = Some(notebook);
        self
    }

    /// Mark the notebook as read-only; pending edits are then never stored.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

impl SourceDocument for JupyterDocument<'_> {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    async fn save(&self) -> Result<(), ExportError> {
        match &self.pending {
            Some(notebook) => self.client.save_notebook(&self.path, notebook.clone()).await,
            None => Ok(()),
        }
    }
}
