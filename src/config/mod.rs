//! Configuration management for chain-viewer.
//!
//! Handles:
//! - Display options for the list and table views
//! - Graph colors and layout hints
//! - The default view
//! - Where overlays are persisted

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::Table;
use tracing::warn;

use crate::error::{Result, ViewerError};
use crate::export::{GraphLayout, ProjectionOptions, RoleColors, TimestampStyle, ViewKind};
use crate::export::{DEFAULT_TABLE_WIDTH, DEFAULT_TOOLTIP_CHARS};
use crate::util::atomic_write;

/// Per-directory config filename, merged over the global config.
pub const LOCAL_CONFIG_FILENAME: &str = ".chainview.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Graph rendering options.
    #[serde(default)]
    pub graph: GraphConfig,
    /// View selection.
    #[serde(default)]
    pub view: ViewConfig,
    /// Overlay persistence.
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl Config {
    /// Load configuration with overrides from `dir`.
    ///
    /// Looks for `.chainview.toml` in `dir` and layers it over the global
    /// configuration.
    pub fn load_for_dir(dir: &Path) -> Result<Self> {
        let global = default_config_path().ok().filter(|p| p.exists());
        Self::load_layers(global.as_deref(), &dir.join(LOCAL_CONFIG_FILENAME))
    }

    /// Layer the `local` file over the `global` one, key by key.
    ///
    /// A key written in `local` wins even when it holds the default value;
    /// keys it leaves out keep their global value. A missing local file is
    /// skipped, an unreadable global one is ignored.
    pub fn load_layers(global: Option<&Path>, local: &Path) -> Result<Self> {
        let mut table = match global.map(read_table) {
            Some(Ok(table)) => table,
            Some(Err(e)) => {
                warn!(error = %e, "ignoring unreadable global config");
                Table::new()
            }
            None => Table::new(),
        };
        if local.exists() {
            merge_tables(&mut table, read_table(local)?);
        }
        Self::from_table(table)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::from_table(read_table(path)?)
    }

    fn from_table(table: Table) -> Result<Self> {
        let config: Self = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ViewerError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no view can work with.
    pub fn validate(&self) -> Result<()> {
        if self.display.table_width == 0 {
            return Err(ViewerError::InvalidConfig {
                message: "display.table_width must be greater than 0".to_string(),
            });
        }
        if self.display.tooltip_chars == 0 {
            return Err(ViewerError::InvalidConfig {
                message: "display.tooltip_chars must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to a specific path, atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ViewerError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())
    }

    /// Projector options derived from this configuration.
    #[must_use]
    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            table_width: self.display.table_width,
            tooltip_chars: self.display.tooltip_chars,
            timestamps: self.display.timestamps,
            colors: self.graph.colors.clone(),
            layout: self.graph.layout.clone(),
        }
    }
}

/// Display options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters of table display text before the ellipsis.
    #[serde(default = "default_table_width")]
    pub table_width: usize,
    /// Characters of graph tooltips before `...`.
    #[serde(default = "default_tooltip_chars")]
    pub tooltip_chars: usize,
    /// Characters of the conversation preview in `stats`.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Timestamp rendering.
    #[serde(default)]
    pub timestamps: TimestampStyle,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            table_width: default_table_width(),
            tooltip_chars: default_tooltip_chars(),
            preview_chars: default_preview_chars(),
            timestamps: TimestampStyle::Utc,
        }
    }
}

/// Graph rendering options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Node colors by role.
    #[serde(default)]
    pub colors: RoleColors,
    /// Layout hints.
    #[serde(default)]
    pub layout: GraphLayout,
}

/// View selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// View shown when none is requested.
    #[serde(default)]
    pub default: ViewKind,
}

/// Overlay persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Persist favorites and delete markers.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Store file; the user data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_table_width() -> usize {
    DEFAULT_TABLE_WIDTH
}

fn default_tooltip_chars() -> usize {
    DEFAULT_TOOLTIP_CHARS
}

fn default_preview_chars() -> usize {
    crate::analytics::DEFAULT_PREVIEW_CHARS
}

fn read_table(path: &Path) -> Result<Table> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ViewerError::io(format!("Failed to read config file: {}", path.display()), e)
    })?;
    toml::from_str(&content).map_err(|e| ViewerError::InvalidConfig {
        message: format!("{}: {e}", path.display()),
    })
}

/// Recursively copy `over` into `base`; tables merge, everything else replaces.
fn merge_tables(base: &mut Table, over: Table) {
    for (key, value) in over {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(value)) => {
                merge_tables(inner, value);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| ViewerError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("chain-viewer").join("config.toml"))
}
