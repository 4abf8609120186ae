//! Shared application state.
//!
//! Built once at startup and cloned into every handler behind an `Arc`.
//! Configuration and the clause catalog are immutable; the run history
//! and the theme preference are the only mutable pieces, each guarded
//! for concurrent uploads.

use std::sync::{Arc, RwLock};

use crate::catalog::ClauseCatalog;
use crate::config::{Config, Theme};
use crate::history::{InMemoryHistory, RunStore};

pub struct AppState {
    pub config: Config,
    pub catalog: ClauseCatalog,
    pub history: Arc<dyn RunStore>,
    theme: RwLock<Theme>,
}

impl AppState {
    /// State with the default catalog and in-memory history.
    pub fn new(config: Config) -> AppState {
        let history = Arc::new(InMemoryHistory::default());
        AppState::with_store(config, ClauseCatalog::required_clauses(), history)
    }

    /// Injection point for a custom catalog or a different run store.
    pub fn with_store(
        config: Config,
        catalog: ClauseCatalog,
        history: Arc<dyn RunStore>,
    ) -> AppState {
        let theme = RwLock::new(config.default_theme);
        AppState {
            config,
            catalog,
            history,
            theme,
        }
    }

    /// Create the upload and annotated-output directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config.upload_dir)?;
        std::fs::create_dir_all(&self.config.annotated_dir)?;
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        match self.theme.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        match self.theme.write() {
            Ok(mut guard) => *guard = theme,
            Err(poisoned) => *poisoned.into_inner() = theme,
        }
    }
}
