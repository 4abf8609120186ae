//! Plain-text extraction from `.docx` contracts.
//!
//! Walks the document body in order, collecting every non-empty
//! paragraph and table-cell paragraph, joins them with newlines and
//! lower-cases the result. Extraction is deterministic: the same file
//! always yields the same normalized text.

use std::path::Path;

use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document parse failed: {0}")]
    Parse(String),
}

/// Extract normalized text from a contract, degrading leniently.
///
/// An unreadable or unparseable file yields empty text (logged at WARN):
/// the caller then reports every catalog clause as missing instead of
/// failing the request.
pub fn extract_text(path: &Path) -> String {
    match try_extract(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "contract unreadable, treating as empty"
            );
            String::new()
        }
    }
}

/// Strict variant of [`extract_text`] surfacing the failure cause.
pub fn try_extract(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    let docx = read_docx(&bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let mut parts: Vec<String> = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => push_paragraph(&mut parts, paragraph),
            DocumentChild::Table(table) => push_table(&mut parts, table),
            _ => {}
        }
    }

    Ok(parts.join("\n").to_lowercase())
}

fn push_paragraph(parts: &mut Vec<String>, paragraph: &Paragraph) {
    let text = paragraph_text(paragraph);
    if !text.trim().is_empty() {
        parts.push(text);
    }
}

/// Flatten a paragraph's runs into their text content.
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(text) = run_child {
                    out.push_str(&text.text);
                }
            }
        }
    }
    out
}

fn push_table(parts: &mut Vec<String>, table: &Table) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => push_paragraph(parts, paragraph),
                    TableCellContent::Table(nested) => push_table(parts, nested),
                    _ => {}
                }
            }
        }
    }
}
