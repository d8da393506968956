//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod toc;

pub(crate) use export::ExportArgs;
pub(crate) use toc::TocArgs;

use std::path::Path;

use tocx_toc::Heading;

use crate::error::CliError;

/// Read a heading list: a JSON array of `{"text": ..., "level": ...}` objects.
///
/// Levels start at 1.
pub(crate) fn read_headings(path: &Path) -> Result<Vec<Heading>, CliError> {
    let content = std::fs::read_to_string(path)?;
    let headings: Vec<Heading> = serde_json::from_str(&content)?;
    if let Some(index) = headings.iter().position(|heading| heading.level == 0) {
        return Err(CliError::Validation(format!(
            "{}: heading {} has level 0 (levels start at 1)",
            path.display(),
            index + 1
        )));
    }
    Ok(headings)
}

/// Read notebook JSON from disk.
pub(crate) fn read_notebook(path: &Path) -> Result<serde_json::Value, CliError> {
    let content = std::fs::read_to_string(path)?;
    let notebook: serde_json::Value = serde_json::from_str(&content)?;
    if !notebook.get("cells").is_some_and(serde_json::Value::is_array) {
        return Err(CliError::Validation(format!(
            "{} is not a notebook (no cells array)",
            path.display()
        )));
    }
    Ok(notebook)
}
