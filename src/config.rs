//! Filter configuration, per-site state and their persistence.
//!
//! Settings are loaded once, up front, and handed to the pure core as plain
//! values. Storage failures are never surfaced: a missing or unreadable file
//! yields the defaults and a failed save leaves the in-memory value intact.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;

/// Tokens whose presence in a table's `class` attribute marks it as layout.
pub const DEFAULT_LAYOUT_TOKENS: [&str; 5] = ["layout", "nav", "menu", "toolbar", "sidebar"];

/// When the extract affordance of a registered table is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Shown while the pointer is over the table.
    #[default]
    Hover,
    /// Shown for every visible table.
    Always,
}

/// Knobs of the data-table heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// When `false` every table is treated as a data table.
    pub enabled: bool,
    pub min_rows: usize,
    pub min_cols: usize,
    /// Interactive-cell fraction above which a table is rejected.
    pub max_interactive_ratio: f64,
    pub hover_mode: DisplayMode,
    pub layout_tokens: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_rows: 2,
            min_cols: 2,
            max_interactive_ratio: 0.7,
            hover_mode: DisplayMode::Hover,
            layout_tokens: DEFAULT_LAYOUT_TOKENS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Everything kept in the settings store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub table_filter_config: FilterConfig,
    pub disabled_sites: Vec<String>,
}

impl Settings {
    #[must_use]
    pub fn is_disabled(&self, site: &str) -> bool {
        self.disabled_sites.iter().any(|s| s == site)
    }

    /// Flips the disabled state of `site` and returns the new state.
    pub fn toggle_site(&mut self, site: &str) -> bool {
        if let Some(idx) = self.disabled_sites.iter().position(|s| s == site) {
            self.disabled_sites.remove(idx);
            false
        } else {
            self.disabled_sites.push(site.to_string());
            true
        }
    }

    /// Re-enables `site`. Returns `true` if it was disabled.
    pub fn remove_site(&mut self, site: &str) -> bool {
        let before = self.disabled_sites.len();
        self.disabled_sites.retain(|s| s != site);
        before != self.disabled_sites.len()
    }
}

/// Identifier used for per-site state: the host name, or `file://<path>` for
/// local files.
///
/// # Errors
/// Returns an error if `raw` is not an absolute URL.
pub fn site_key(raw: &str) -> Result<String> {
    let url = Url::parse(raw)?;
    if url.scheme() == "file" {
        return Ok(format!("file://{}", url.path()));
    }
    Ok(url.host_str().unwrap_or_default().to_string())
}

/// Key-value persistence for [`Settings`].
pub trait SettingsStore {
    /// # Errors
    /// Returns an error if the backing store cannot be read or parsed.
    fn load(&self) -> Result<Settings>;

    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Loads settings, falling back to defaults on any failure.
pub fn load_or_default(store: &dyn SettingsStore) -> Settings {
    match store.load() {
        Ok(settings) => settings,
        Err(err) => {
            debug!(%err, "settings unavailable, using defaults");
            Settings::default()
        }
    }
}

/// Saves settings, logging and discarding any failure.
pub fn save_quietly(store: &dyn SettingsStore, settings: &Settings) {
    if let Err(err) = store.save(settings) {
        warn!(%err, "failed to persist settings");
    }
}

/// Settings kept as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings> {
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Cross-component notification: the enabled state of the current site
/// changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteStatus {
    pub disabled: bool,
}
