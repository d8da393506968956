//! `tocx toc` command implementation.

use std::path::PathBuf;

use clap::Args;
use console::Term;
use tocx_export::{HeadingSource, NotebookHeadings};
use tocx_toc::{HeadingNode, render_toc, synthesize};

use super::{read_headings, read_notebook};
use crate::error::CliError;

/// Deepest heading tree printed as JSON. Serialization nests once per level,
/// and serde_json refuses to read documents nested deeper than this anyway.
const MAX_JSON_DEPTH: usize = 128;

/// Arguments for the toc command.
#[derive(Args)]
pub(crate) struct TocArgs {
    /// JSON file with the heading list.
    #[arg(long, required_unless_present = "notebook", conflicts_with = "notebook")]
    headings: Option<PathBuf>,

    /// Local notebook to extract headings from.
    #[arg(long)]
    notebook: Option<PathBuf>,

    /// Print the heading tree as JSON instead of HTML.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl TocArgs {
    /// Execute the toc command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let rendered = self.render()?;
        Term::stdout().write_line(&rendered)?;
        Ok(())
    }

    fn render(&self) -> Result<String, CliError> {
        let headings = match (&self.headings, &self.notebook) {
            (Some(path), _) => read_headings(path)?,
            (None, Some(path)) => {
                NotebookHeadings::from_notebook(&read_notebook(path)?).headings("")
            }
            (None, None) => {
                return Err(CliError::Validation(
                    "either --headings or --notebook is required".to_owned(),
                ));
            }
        };

        let tree = synthesize(&headings);
        if self.json {
            let depth = tree.iter().map(HeadingNode::depth).max().unwrap_or(0);
            if depth > MAX_JSON_DEPTH {
                return Err(CliError::Validation(format!(
                    "heading tree is {depth} levels deep; JSON output supports at most {MAX_JSON_DEPTH}"
                )));
            }
            Ok(serde_json::to_string_pretty(&tree)?)
        } else {
            Ok(render_toc(&tree).into_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(headings: Option<PathBuf>, notebook: Option<PathBuf>, json: bool) -> TocArgs {
        TocArgs {
            headings,
            notebook,
            json,
            verbose: false,
        }
    }

    #[test]
    fn test_render_from_heading_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        std::fs::write(&path, r#"[{"text": "A", "level": 1}, {"text": "B", "level": 3}]"#)
            .unwrap();

        let html = args(Some(path), None, false).render().unwrap();
        assert_eq!(
            html,
            "<div id=\"toc-wrapper\" class=\"toc-wrapper\"><div class=\"toc\">\
             <ul id=\"navigate_menu\" class=\"toc toc-level-1\">\
             <li class=\"toc-item\"><span><h1>A</h1></span>\
             <ul class=\"toc-sublist toc-level-2\">\
             <li class=\"toc-item\"><span><h3>B</h3></span></li></ul></li>\
             </ul></div></div>"
        );
    }

    #[test]
    fn test_render_tree_json_from_notebook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ipynb");
        std::fs::write(
            &path,
            r##"{"cells": [{"cell_type": "markdown", "source": "# Intro\n## Detail"}]}"##,
        )
        .unwrap();

        let json = args(None, Some(path), true).render().unwrap();
        let tree: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            tree,
            serde_json::json!([
                {
                    "heading": {"text": "Intro", "level": 1},
                    "children": [
                        {"heading": {"text": "Detail", "level": 2}}
                    ]
                }
            ])
        );
    }

    #[test]
    fn test_json_rejects_very_deep_trees() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        let headings: Vec<serde_json::Value> = (1..=200)
            .map(|level| serde_json::json!({"text": "x", "level": level}))
            .collect();
        std::fs::write(&path, serde_json::to_string(&headings).unwrap()).unwrap();

        let err = args(Some(path.clone()), None, true).render().unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("200 levels deep"));

        let html = args(Some(path), None, false).render().unwrap();
        assert_eq!(html.matches("<li").count(), 200);
    }
}
