//! `tocx export` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::Term;
use tocx_config::{CliSettings, Config, ExportConfig};
use tocx_export::{
    Collaborators, ExportOptions, ExportPipeline, ExportReport, FileSink, HeadingSource,
    JupyterClient, JupyterDocument, NotebookHeadings, StaticHeadings, StylesheetSource,
};
use tocx_toc::Heading;
use tracing::info;

use super::{read_headings, read_notebook};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Notebook path on the Jupyter server (e.g. `work/notes.ipynb`).
    notebook: String,

    /// JSON file with the heading list (default: extracted from --upload).
    #[arg(long)]
    headings: Option<PathBuf>,

    /// Local notebook holding unsaved edits, stored on the server before export.
    #[arg(long)]
    upload: Option<PathBuf>,

    /// Treat the notebook as read-only (never store edits).
    #[arg(long)]
    read_only: bool,

    /// Filename of the exported document (overrides config).
    #[arg(short = 'o', long)]
    filename: Option<String>,

    /// Directory to save the export into (overrides config).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover tocx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local ToC stylesheet used instead of the server's.
    #[arg(long, value_name = "FILE", conflicts_with = "bundled_stylesheet")]
    stylesheet: Option<PathBuf>,

    /// Use the stylesheet shipped with tocx instead of the server's.
    #[arg(long)]
    bundled_stylesheet: bool,

    /// Print the export report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Jupyter server URL (overrides config).
    #[arg(long)]
    server_url: Option<String>,

    /// Jupyter API token (overrides config).
    #[arg(long, env = "JUPYTER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input files or the export fail.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_url: self.server_url.clone(),
            token: self.token.clone(),
            output_dir: self.output_dir.clone(),
            filename: self.filename.clone(),
            stylesheet_file: self.stylesheet.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            info!("Using config {}", path.display());
        }

        let uploaded = self.upload.as_deref().map(read_notebook).transpose()?;
        let headings = StaticHeadings::new(self.resolve_headings(uploaded.as_ref(), &output)?);

        let client = JupyterClient::new(&config.server.base_url)
            .with_stylesheet(self.stylesheet_source(&config.export_resolved))
            .with_token(config.server.token.clone())
            .with_timeout(Duration::from_secs(config.server.timeout_secs));

        let mut document = JupyterDocument::new(&client, &self.notebook).read_only(self.read_only);
        if let Some(notebook) = uploaded {
            document = document.with_pending_edits(notebook);
        }
        let sink = FileSink::new(&config.export_resolved.output_dir);
        let filename = config.export_resolved.filename.clone();

        output.info(&format!(
            "Exporting {} from {}...",
            self.notebook, config.server.base_url
        ));

        let pipeline = ExportPipeline::new(
            Collaborators {
                document: &document,
                headings: &headings,
                renderer: &client,
                sink: &sink,
            },
            ExportOptions { filename },
        );
        let report = pipeline.run().await?;

        print_report(&output, &report, &sink);
        if self.json {
            Term::stdout().write_line(&report_json(&report)?)?;
        }
        Ok(())
    }

    fn stylesheet_source(&self, export: &ExportConfig) -> StylesheetSource {
        if self.bundled_stylesheet {
            return StylesheetSource::Bundled;
        }
        match &export.stylesheet_file {
            Some(path) => StylesheetSource::File(path.clone()),
            None => StylesheetSource::server(&export.stylesheet_path),
        }
    }

    /// Headings from `--headings`, else from the uploaded notebook.
    fn resolve_headings(
        &self,
        uploaded: Option<&serde_json::Value>,
        output: &Output,
    ) -> Result<Vec<Heading>, CliError> {
        if let Some(path) = &self.headings {
            return read_headings(path);
        }
        if let Some(notebook) = uploaded {
            return Ok(NotebookHeadings::from_notebook(notebook).headings(&self.notebook));
        }
        output.warning("No --headings or --upload given; the table of contents will be empty");
        Ok(Vec::new())
    }
}

fn report_json(report: &ExportReport) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn print_report(output: &Output, report: &ExportReport, sink: &FileSink) {
    if report.saved {
        output.info("Saved pending edits before export");
    }
    output.success(&format!(
        "Exported {} ({} bytes, {} ToC entries)",
        sink.destination(&report.filename).display(),
        report.bytes,
        report.toc_entries
    ));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use tocx_export::Stage;

    use super::*;

    fn args(headings: Option<PathBuf>) -> ExportArgs {
        ExportArgs {
            notebook: "work/a.ipynb".to_owned(),
            headings,
            upload: None,
            read_only: false,
            filename: None,
            output_dir: None,
            config: None,
            stylesheet: None,
            bundled_stylesheet: false,
            json: false,
            server_url: None,
            token: None,
            verbose: false,
        }
    }

    #[test]
    fn test_headings_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        std::fs::write(&path, r#"[{"text": "From file", "level": 2}]"#).unwrap();
        let notebook = serde_json::json!({
            "cells": [{"cell_type": "markdown", "source": "# From notebook"}]
        });

        let headings = args(Some(path))
            .resolve_headings(Some(&notebook), &Output::new())
            .unwrap();

        assert_eq!(headings, vec![Heading::new("From file", 2)]);
    }

    #[test]
    fn test_headings_fall_back_to_uploaded_notebook() {
        let notebook = serde_json::json!({
            "cells": [{"cell_type": "markdown", "source": "# From notebook"}]
        });

        let headings = args(None)
            .resolve_headings(Some(&notebook), &Output::new())
            .unwrap();

        assert_eq!(headings, vec![Heading::new("From notebook", 1)]);
    }

    #[test]
    fn test_no_heading_source_gives_empty_list() {
        let headings = args(None).resolve_headings(None, &Output::new()).unwrap();
        assert!(headings.is_empty());
    }

    #[test]
    fn test_stylesheet_source_selection() {
        let mut export = ExportConfig::default();
        assert_eq!(
            args(None).stylesheet_source(&export),
            StylesheetSource::Server("html-toc-export/toc-css".to_owned())
        );

        export.stylesheet_file = Some(PathBuf::from("/styles/toc.css"));
        assert_eq!(
            args(None).stylesheet_source(&export),
            StylesheetSource::File(PathBuf::from("/styles/toc.css"))
        );

        let mut bundled = args(None);
        bundled.bundled_stylesheet = true;
        assert_eq!(bundled.stylesheet_source(&export), StylesheetSource::Bundled);
    }

    #[test]
    fn test_report_json() {
        let report = ExportReport {
            stages: vec![Stage::Idle, Stage::FetchingDocument, Stage::Downloaded],
            saved: false,
            filename: "notes.html".to_owned(),
            bytes: 1024,
            toc_entries: 3,
        };

        let json: serde_json::Value = serde_json::from_str(&report_json(&report).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "stages": ["idle", "fetching_document", "downloaded"],
                "saved": false,
                "filename": "notes.html",
                "bytes": 1024,
                "toc_entries": 3
            })
        );
    }
}
