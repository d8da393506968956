//! Heading extraction from notebook markdown cells.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tocx_toc::Heading;

use crate::collaborators::HeadingSource;

/// Headings of a notebook's markdown cells, in document order.
#[derive(Clone, Debug, Default)]
pub struct NotebookHeadings {
    headings: Vec<Heading>,
}

impl NotebookHeadings {
    /// Extract headings from notebook JSON (nbformat 4).
    ///
    /// Code and raw cells are skipped. Cell sources may be a string or a list
    /// of lines.
    pub fn from_notebook(notebook: &serde_json::Value) -> Self {
        let cells = notebook
            .get("cells")
            .and_then(serde_json::Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let headings = cells
            .iter()
            .filter(|cell| {
                cell.get("cell_type").and_then(serde_json::Value::as_str) == Some("markdown")
            })
            .flat_map(|cell| markdown_headings(&cell_source(cell)))
            .collect();

        Self { headings }
    }
}

impl HeadingSource for NotebookHeadings {
    fn headings(&self, _path: &str) -> Vec<Heading> {
        self.headings.clone()
    }
}

fn cell_source(cell: &serde_json::Value) -> String {
    match cell.get("source") {
        Some(serde_json::Value::String(source)) => source.clone(),
        Some(serde_json::Value::Array(lines)) => lines
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect(),
        _ => String::new(),
    }
}

/// Collect ATX and setext headings with their plain text.
fn markdown_headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut current: Option<(u32, String)> = None;

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((heading_level_to_num(level), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = &mut current {
                    buffer.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, buffer)) = &mut current {
                    buffer.push(' ');
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    headings.push(Heading::new(text.trim(), level));
                }
            }
            _ => {}
        }
    }

    headings
}

fn heading_level_to_num(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
