//! Best-effort audit logging to a Google Sheets worksheet.
//!
//! One row per processed contract: filename, present clauses, missing
//! clauses, email status. The freshly appended row gets a background
//! tint — warning when anything is missing, clear when fully compliant.
//! Every failure path (feature disabled, credentials unreadable, network
//! or API error) folds into the returned [`SheetStatus`]; nothing here
//! can abort the pipeline.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::SheetsConfig;
use crate::notify::EmailStatus;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
/// Columns written per row: filename, present, missing, email status.
const ROW_COLUMNS: u32 = 4;

/// Audit outcome, carried as data through the pipeline, the run history
/// and the API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetStatus {
    Logged { message: String },
    Disabled { message: String },
    Error { message: String },
}

impl SheetStatus {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SheetStatus::Logged { .. } => "logged",
            SheetStatus::Disabled { .. } => "disabled",
            SheetStatus::Error { .. } => "error",
        }
    }
}

#[derive(Error, Debug)]
enum AuditError {
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected API response: {0}")]
    Malformed(String),
}

/// Bearer token read from the configured credentials file.
#[derive(Deserialize)]
struct SheetsCredentials {
    access_token: String,
}

/// Append one audit row and tint it.
///
/// Returns `Disabled` without any network activity when sheet logging is
/// not configured.
pub async fn log_run(
    sheets: Option<&SheetsConfig>,
    filename: &str,
    present: &BTreeSet<String>,
    missing: &BTreeSet<String>,
    email_status: &EmailStatus,
) -> SheetStatus {
    let Some(cfg) = sheets else {
        return SheetStatus::Disabled {
            message: "Google Sheets logging disabled".into(),
        };
    };

    match try_log(cfg, filename, present, missing, email_status).await {
        Ok(row) => {
            tracing::info!(file = filename, row, "audit row appended");
            SheetStatus::Logged {
                message: format!("Logged to Google Sheets (row {row})"),
            }
        }
        Err(err) => {
            tracing::warn!(file = filename, error = %err, "audit row failed");
            SheetStatus::Error {
                message: format!("Google Sheets error: {err}"),
            }
        }
    }
}

async fn try_log(
    cfg: &SheetsConfig,
    filename: &str,
    present: &BTreeSet<String>,
    missing: &BTreeSet<String>,
    email_status: &EmailStatus,
) -> Result<u32, AuditError> {
    let token = read_access_token(cfg)?;
    let client = reqwest::Client::builder()
        .timeout(cfg.timeout)
        .build()?;

    let row = append_row(&client, &token, cfg, filename, present, missing, email_status).await?;

    // Tinting is cosmetic: a formatting failure must not demote an
    // otherwise-logged row to an error status.
    if let Err(err) = tint_row(&client, &token, cfg, row, !missing.is_empty()).await {
        tracing::warn!(row, error = %err, "row tint failed");
    }

    Ok(row)
}

fn read_access_token(cfg: &SheetsConfig) -> Result<String, AuditError> {
    let raw = std::fs::read_to_string(&cfg.credentials_path).map_err(|e| {
        AuditError::Credentials(format!("{}: {e}", cfg.credentials_path.display()))
    })?;
    let creds: SheetsCredentials = serde_json::from_str(&raw)
        .map_err(|e| AuditError::Credentials(format!("malformed credentials file: {e}")))?;
    Ok(creds.access_token)
}

async fn append_row(
    client: &reqwest::Client,
    token: &str,
    cfg: &SheetsConfig,
    filename: &str,
    present: &BTreeSet<String>,
    missing: &BTreeSet<String>,
    email_status: &EmailStatus,
) -> Result<u32, AuditError> {
    let url = format!(
        "{SHEETS_API_BASE}/{}/values/{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
        cfg.spreadsheet_id, cfg.worksheet
    );
    let body = json!({
        "values": [[
            filename,
            clause_list(present),
            clause_list(missing),
            email_status.label(),
        ]]
    });

    let response = client.post(&url).bearer_auth(token).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuditError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let payload: Value = response.json().await?;
    let range = payload["updates"]["updatedRange"]
        .as_str()
        .ok_or_else(|| AuditError::Malformed("missing updates.updatedRange".into()))?;
    row_from_range(range)
        .ok_or_else(|| AuditError::Malformed(format!("unparseable range {range:?}")))
}

async fn tint_row(
    client: &reqwest::Client,
    token: &str,
    cfg: &SheetsConfig,
    row: u32,
    non_compliant: bool,
) -> Result<(), AuditError> {
    let sheet_id = resolve_sheet_id(client, token, cfg).await?;
    let url = format!("{SHEETS_API_BASE}/{}:batchUpdate", cfg.spreadsheet_id);
    let body = json!({
        "requests": [{
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": row - 1,
                    "endRowIndex": row,
                    "startColumnIndex": 0,
                    "endColumnIndex": ROW_COLUMNS,
                },
                "cell": { "userEnteredFormat": { "backgroundColor": row_tint(non_compliant) } },
                "fields": "userEnteredFormat.backgroundColor",
            }
        }]
    });

    let response = client.post(&url).bearer_auth(token).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuditError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

/// Numeric sheet id of the configured worksheet, resolved by title.
async fn resolve_sheet_id(
    client: &reqwest::Client,
    token: &str,
    cfg: &SheetsConfig,
) -> Result<i64, AuditError> {
    let url = format!(
        "{SHEETS_API_BASE}/{}?fields=sheets.properties",
        cfg.spreadsheet_id
    );
    let response = client.get(&url).bearer_auth(token).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuditError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let payload: Value = response.json().await?;
    let sheets = payload["sheets"]
        .as_array()
        .ok_or_else(|| AuditError::Malformed("missing sheets".into()))?;
    for sheet in sheets {
        let props = &sheet["properties"];
        if props["title"].as_str() == Some(cfg.worksheet.as_str()) {
            return props["sheetId"]
                .as_i64()
                .ok_or_else(|| AuditError::Malformed("missing sheetId".into()));
        }
    }
    Err(AuditError::Malformed(format!(
        "worksheet {:?} not found",
        cfg.worksheet
    )))
}

fn clause_list(clauses: &BTreeSet<String>) -> String {
    if clauses.is_empty() {
        "None".to_string()
    } else {
        clauses.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Background tint for the appended row: light red when clauses are
/// missing, light green when fully compliant.
fn row_tint(non_compliant: bool) -> Value {
    if non_compliant {
        json!({ "red": 1.0, "green": 0.6, "blue": 0.6 })
    } else {
        json!({ "red": 0.6, "green": 1.0, "blue": 0.6 })
    }
}

/// Row index from an A1-notation range like `Runs!A5:D5`.
fn row_from_range(range: &str) -> Option<u32> {
    let cell = range.rsplit('!').next()?;
    let first = cell.split(':').next()?;
    let digits: String = first.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|row| *row > 0)
}
