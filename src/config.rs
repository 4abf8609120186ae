//! Environment-sourced service configuration.
//!
//! Everything comes from the process environment (a `.env` file is loaded
//! in `main` before this runs). `Config::from_env` validates once at
//! startup; the optional capabilities (SMTP notification, Google Sheets
//! audit logging) become `Some` only when every setting they need is
//! present, so downstream code never probes the environment itself.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const APP_NAME: &str = "clausecheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen port when `PORT` is unset.
const DEFAULT_PORT: u16 = 5000;
/// Default SMTP submission port when `EMAIL_SMTP_PORT` is unset.
const DEFAULT_SMTP_PORT: u16 = 587;
/// Explicit transport timeout for the SMTP session.
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Explicit timeout for Google Sheets API calls.
const SHEETS_TIMEOUT: Duration = Duration::from_secs(15);

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("info,{APP_NAME}=debug")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{name} is required when {feature} is enabled")]
    MissingRequired {
        name: &'static str,
        feature: &'static str,
    },
}

/// UI theme preference exposed through the settings endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Theme> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// SMTP settings for the notification dispatcher.
///
/// Present only when host, sender and password are all configured. The
/// recipient list may still be empty, in which case the dispatcher
/// short-circuits with a `no_recipients` status.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Sender address, also used as the SMTP login.
    pub from: String,
    pub password: String,
    pub recipients: Vec<String>,
    pub team_name: String,
    pub timeout: Duration,
}

/// Google Sheets settings for the audit logger.
///
/// Present only when sheet logging is enabled via `GOOGLE_SHEETS_ENABLED`.
/// The credentials file is read lazily per append so a missing or stale
/// file degrades to an error status instead of failing startup.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub credentials_path: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub site_owner: String,
    pub default_theme: Theme,
    /// Where uploaded contracts are saved.
    pub upload_dir: PathBuf,
    /// Where annotated copies are written.
    pub annotated_dir: PathBuf,
    pub smtp: Option<SmtpConfig>,
    pub sheets: Option<SheetsConfig>,
}

impl Config {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an injected lookup function.
    ///
    /// Tests pass a map-backed lookup so they never mutate process
    /// environment variables.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, ConfigError> {
        let port = parse_port(&lookup, "PORT", DEFAULT_PORT)?;

        let default_theme = match lookup("DEFAULT_THEME") {
            None => Theme::Dark,
            Some(raw) => Theme::parse(raw.trim()).ok_or_else(|| ConfigError::Invalid {
                name: "DEFAULT_THEME",
                value: raw.clone(),
                reason: "expected \"dark\" or \"light\"".into(),
            })?,
        };

        let site_owner = non_empty(lookup("SITE_OWNER")).unwrap_or_else(|| "You".to_string());
        let upload_dir =
            PathBuf::from(non_empty(lookup("UPLOAD_DIR")).unwrap_or_else(|| "contracts".into()));
        let annotated_dir =
            PathBuf::from(non_empty(lookup("ANNOTATED_DIR")).unwrap_or_else(|| "modified".into()));

        let smtp = smtp_from_lookup(&lookup)?;
        let sheets = sheets_from_lookup(&lookup)?;

        Ok(Config {
            port,
            site_owner,
            default_theme,
            upload_dir,
            annotated_dir,
            smtp,
            sheets,
        })
    }
}

fn smtp_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<SmtpConfig>, ConfigError> {
    let host = non_empty(lookup("EMAIL_SMTP_HOST"));
    let from = non_empty(lookup("EMAIL_FROM"));
    let password = non_empty(lookup("EMAIL_PASSWORD"));

    let (Some(host), Some(from), Some(password)) = (host, from, password) else {
        return Ok(None);
    };

    let port = parse_port(lookup, "EMAIL_SMTP_PORT", DEFAULT_SMTP_PORT)?;
    let recipients = lookup("EMAIL_TO")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    let team_name = non_empty(lookup("EMAIL_TEAM_NAME")).unwrap_or_else(|| "Team".to_string());

    Ok(Some(SmtpConfig {
        host,
        port,
        from,
        password,
        recipients,
        team_name,
        timeout: SMTP_TIMEOUT,
    }))
}

fn sheets_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<SheetsConfig>, ConfigError> {
    let enabled = lookup("GOOGLE_SHEETS_ENABLED")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !enabled {
        return Ok(None);
    }

    let spreadsheet_id = non_empty(lookup("GOOGLE_SHEET_ID")).ok_or(ConfigError::MissingRequired {
        name: "GOOGLE_SHEET_ID",
        feature: "GOOGLE_SHEETS_ENABLED",
    })?;
    let worksheet = non_empty(lookup("GOOGLE_SHEET_TAB")).ok_or(ConfigError::MissingRequired {
        name: "GOOGLE_SHEET_TAB",
        feature: "GOOGLE_SHEETS_ENABLED",
    })?;
    let credentials_path =
        non_empty(lookup("GOOGLE_SHEETS_CREDENTIALS")).ok_or(ConfigError::MissingRequired {
            name: "GOOGLE_SHEETS_CREDENTIALS",
            feature: "GOOGLE_SHEETS_ENABLED",
        })?;

    Ok(Some(SheetsConfig {
        spreadsheet_id,
        worksheet,
        credentials_path: PathBuf::from(credentials_path),
        timeout: SHEETS_TIMEOUT,
    }))
}

fn parse_port(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u16,
) -> Result<u16, ConfigError> {
    match non_empty(lookup(name)) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
            reason: "expected a port number".into(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
