//! Download sink writing exports into a directory.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::collaborators::{Download, DownloadSink};
use crate::error::ExportError;

/// Saves downloads as files in an output directory.
#[derive(Debug)]
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `output_dir` (created on first delivery).
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Destination path for `filename`.
    ///
    /// Only the final path component is used, so a download can never leave
    /// the output directory.
    pub fn destination(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map_or_else(|| "document.html".into(), ToOwned::to_owned);
        self.output_dir.join(name)
    }
}

impl DownloadSink for FileSink {
    fn deliver(&self, download: Download) -> Result<(), ExportError> {
        let path = self.destination(&download.filename);
        let failed = |source| ExportError::Download {
            filename: download.filename.clone(),
            source,
        };

        std::fs::create_dir_all(&self.output_dir).map_err(failed)?;
        std::fs::write(&path, &download.contents).map_err(failed)?;

        info!(
            "Saved {} ({}, {} bytes)",
            path.display(),
            download.mime_type,
            download.contents.len()
        );
        Ok(())
    }
}
