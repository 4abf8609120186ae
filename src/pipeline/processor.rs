//! One-shot processing pipeline for an uploaded contract.
//!
//! extract → match → annotate → notify → audit, synchronously on the
//! request task. Only annotation failure aborts the run; notification
//! and audit outcomes are carried in the returned [`ProcessOutcome`] as
//! status values. There is no rollback: a saved annotated copy stays
//! available even when a later stage reports an error.

use crate::audit::{self, SheetStatus};
use crate::notify::{self, EmailStatus};
use crate::pipeline::annotate::{annotate_document, AnnotateError};
use crate::pipeline::extract::extract_text;
use crate::pipeline::matcher::{check_compliance, ComplianceResult};
use crate::state::AppState;

pub const EMAIL_SUBJECT: &str = "Compliance Checker Update";

/// Everything a handler needs to report one processed upload.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub result: ComplianceResult,
    pub annotated_filename: String,
    pub email_status: EmailStatus,
    pub sheet_status: SheetStatus,
}

/// Run the full pipeline for a contract already saved under the upload
/// directory.
pub async fn process_document(
    state: &AppState,
    saved_filename: &str,
) -> Result<ProcessOutcome, AnnotateError> {
    let saved_path = state.config.upload_dir.join(saved_filename);

    let text = extract_text(&saved_path);
    let result = check_compliance(&text, &state.catalog);
    tracing::info!(
        file = saved_filename,
        present = result.present.len(),
        missing = result.missing.len(),
        "contract checked"
    );

    let annotated_filename = annotated_name(saved_filename);
    let annotated_path = state.config.annotated_dir.join(&annotated_filename);
    annotate_document(&saved_path, &annotated_path, &result.missing)?;

    let team_name = state
        .config
        .smtp
        .as_ref()
        .map(|smtp| smtp.team_name.as_str())
        .unwrap_or("Team");
    let body = notify::summary_body(team_name, saved_filename, &result.missing);
    let email_status = notify::send_summary(state.config.smtp.as_ref(), EMAIL_SUBJECT, &body).await;

    let sheet_status = audit::log_run(
        state.config.sheets.as_ref(),
        saved_filename,
        &result.present,
        &result.missing,
        &email_status,
    )
    .await;

    tracing::info!(
        file = saved_filename,
        email = email_status.label(),
        sheet = sheet_status.label(),
        "contract processed"
    );

    Ok(ProcessOutcome {
        result,
        annotated_filename,
        email_status,
        sheet_status,
    })
}

/// `contract.docx` → `contract_modified.docx`.
pub fn annotated_name(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_modified.{ext}"),
        None => format!("{filename}_modified"),
    }
}
