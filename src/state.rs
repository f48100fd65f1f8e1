use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::DashboardConfig;
use crate::dashboard::{Controls, Dashboard};
use crate::data::filter::FilterCriteria;
use crate::data::loader::{load_file, LoadError};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded prediction table (None until a file loads). Read-only once
    /// loaded, so render passes share it.
    pub table: Option<Arc<Table>>,

    /// Path the current table came from, for "Reload".
    pub source_path: Option<PathBuf>,

    /// Current filter windows and threshold.
    pub controls: Controls,

    /// Output of the last render pass.
    pub dashboard: Option<Dashboard>,

    /// Controls the cached dashboard was computed for.
    rendered_for: Option<Controls>,

    /// Show pass-through columns in the preview table.
    pub show_extra_columns: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            table: None,
            source_path: None,
            controls: Controls {
                filter: FilterCriteria::default(),
                threshold: 0.5,
            },
            dashboard: None,
            rendered_for: None,
            show_extra_columns: false,
            status_message: None,
        }
    }

    /// Ingest a newly loaded table, reset controls and render.
    pub fn set_table(&mut self, table: Table) {
        self.controls = Controls::initial(&table, &self.config);
        self.table = Some(Arc::new(table));
        self.rendered_for = None;
        self.status_message = None;
        self.refresh();
    }

    /// Load a prediction file, replacing the current table on success.
    /// A file that no longer exists clears the dashboard; any other failure
    /// keeps whatever table was loaded before.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} records from {} (extra columns {:?})",
                    table.len(),
                    path.display(),
                    table.extra_columns
                );
                self.source_path = Some(path.to_path_buf());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                if matches!(e, LoadError::MissingFile(_)) {
                    self.table = None;
                    self.dashboard = None;
                    self.rendered_for = None;
                }
                self.status_message = Some(describe_load_error(&e));
            }
        }
    }

    /// Re-read the current source file.
    pub fn reload(&mut self) {
        if let Some(path) = self.source_path.clone() {
            self.load_path(&path);
        }
    }

    /// Recompute the dashboard if the controls changed since the last pass.
    /// Returns whether a render pass ran.
    pub fn refresh(&mut self) -> bool {
        let Some(table) = &self.table else {
            self.dashboard = None;
            return false;
        };
        if self.rendered_for == Some(self.controls) {
            return false;
        }
        self.dashboard = Some(Dashboard::build(table, &self.controls, &self.config));
        self.rendered_for = Some(self.controls);
        true
    }

    /// Write the current render pass as pretty JSON.
    pub fn export_dashboard(&self, path: &Path) -> Result<()> {
        let dashboard = self
            .dashboard
            .as_ref()
            .context("nothing to export: no dashboard has been rendered")?;
        let json = serde_json::to_string_pretty(dashboard).context("serialising dashboard")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported dashboard to {}", path.display());
        Ok(())
    }
}

/// User-facing text for a failed load.
pub fn describe_load_error(err: &LoadError) -> String {
    match err {
        LoadError::MissingFile(path) => format!(
            "Could not find the prediction file '{}'. Use File → Open… to choose one.",
            path.display()
        ),
        other => format!("Error: {other}"),
    }
}
