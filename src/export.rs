//! History export: plain text and notebook formats.

use std::path::Path;

use serde::Serialize;

use crate::error::ExportError;
use crate::history::{HistoryStore, Interaction};

/// Export the full chronological log as plain text. Returns the number of
/// records written; zero means nothing was exported (no file is created).
pub async fn export_text(store: &HistoryStore, path: &Path) -> Result<usize, ExportError> {
    let records = store.all_chronological().await?;
    if records.is_empty() {
        return Ok(0);
    }

    let mut out = String::new();
    for r in &records {
        out.push_str(&format!(
            "ID: {}\nRequest: {}\nResponse: {}\n{}\n",
            r.id,
            r.request,
            r.response,
            "-".repeat(40)
        ));
    }

    tokio::fs::write(path, out).await.map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(records.len())
}

/// Export the full chronological log as a Jupyter-style notebook: one
/// markdown cell per interaction, pairing the request with its response.
pub async fn export_notebook(store: &HistoryStore, path: &Path) -> Result<usize, ExportError> {
    let records = store.all_chronological().await?;
    let notebook = Notebook::from_interactions(&records);

    let json = serde_json::to_string_pretty(&notebook).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    tokio::fs::write(path, json).await.map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(records.len())
}

// Minimal nbformat v4 document. Only the fields a notebook reader requires.

#[derive(Debug, Serialize)]
struct Notebook {
    cells: Vec<Cell>,
    metadata: serde_json::Value,
    nbformat: u32,
    nbformat_minor: u32,
}

#[derive(Debug, Serialize)]
struct Cell {
    cell_type: &'static str,
    metadata: serde_json::Value,
    source: Vec<String>,
}

impl Notebook {
    fn from_interactions(records: &[Interaction]) -> Self {
        let cells = records
            .iter()
            .map(|r| Cell {
                cell_type: "markdown",
                metadata: serde_json::json!({}),
                source: vec![format!(
                    "**Request:** `{}`\n\n**Response:**\n{}",
                    r.request, r.response
                )],
            })
            .collect();

        Self {
            cells,
            metadata: serde_json::json!({}),
            nbformat: 4,
            nbformat_minor: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notebook_has_one_cell_per_interaction() {
        let records = vec![
            Interaction {
                id: 1,
                request: "what is a list?".to_string(),
                response: "a list is...".to_string(),
            },
            Interaction {
                id: 2,
                request: "and a tuple?".to_string(),
                response: "a tuple is...".to_string(),
            },
        ];
        let nb = Notebook::from_interactions(&records);
        assert_eq!(nb.cells.len(), 2);
        assert_eq!(nb.nbformat, 4);
        assert!(nb.cells[0].source[0].contains("what is a list?"));
        assert!(nb.cells[1].source[0].contains("a tuple is..."));
    }

    #[test]
    fn empty_history_yields_empty_notebook() {
        let nb = Notebook::from_interactions(&[]);
        assert!(nb.cells.is_empty());
    }
}
