//! Placeholder-clause annotation of non-compliant contracts.
//!
//! Appends one titled placeholder section per missing clause and writes
//! the result as a new document. The input file is never touched. An
//! unreadable source degrades to an empty base document (mirroring the
//! extractor's lenient policy, so the rest of the pipeline still runs);
//! failure to write the output is fatal for the request.

use std::collections::BTreeSet;
use std::path::Path;

use docx_rs::{read_docx, Docx, Paragraph, Run};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document save failed: {0}")]
    Save(String),
}

/// Append a placeholder section per missing clause and write the
/// annotated copy to `output`.
///
/// Clauses are appended in the set's (sorted) order. An empty missing
/// set still produces an output file, identical in content to the input.
pub fn annotate_document(
    input: &Path,
    output: &Path,
    missing: &BTreeSet<String>,
) -> Result<(), AnnotateError> {
    let mut docx = match load_source(input) {
        Ok(docx) => docx,
        Err(err) => {
            tracing::warn!(
                input = %input.display(),
                error = %err,
                "source contract unreadable, annotating an empty document"
            );
            Docx::new()
        }
    };

    for clause in missing {
        docx = docx
            .add_paragraph(section_heading(clause))
            .add_paragraph(placeholder_paragraph(clause));
    }

    let file = std::fs::File::create(output)?;
    docx.build()
        .pack(file)
        .map_err(|e| AnnotateError::Save(e.to_string()))?;

    tracing::debug!(
        output = %output.display(),
        placeholders = missing.len(),
        "annotated contract written"
    );
    Ok(())
}

fn load_source(input: &Path) -> Result<Docx, String> {
    let bytes = std::fs::read(input).map_err(|e| e.to_string())?;
    read_docx(&bytes).map_err(|e| e.to_string())
}

fn section_heading(clause: &str) -> Paragraph {
    let title = format!("{} Clause Added", title_case(clause));
    Paragraph::new()
        .style("Heading2")
        .add_run(Run::new().add_text(title).bold())
}

fn placeholder_paragraph(clause: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(placeholder_text(clause)))
}

/// Fixed placeholder template referencing the missing requirement.
pub fn placeholder_text(clause: &str) -> String {
    format!(
        "This clause is automatically added because the original contract \
         was missing the '{clause}' requirement."
    )
}

/// Upper-case the first letter of every word ("payment terms" -> "Payment Terms").
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
