/// Config schema types (language, enablement, themes, paths, catalog).
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loader::data_dir;

/// Identifier of the language whose strings are authored directly in the host.
pub const SOURCE_LANGUAGE: &str = "english";

/// Top-level host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamedockConfig {
    /// Active UI language id (`english` or a locale-style id such as `de_DE`).
    pub language: String,
    /// Identifiers of extensions the user has turned off.
    pub disabled_extensions: Vec<String>,
    pub themes: ThemesConfig,
    pub paths: PathsConfig,
    pub catalog: CatalogConfig,
}

impl Default for GamedockConfig {
    fn default() -> Self {
        Self {
            language: SOURCE_LANGUAGE.into(),
            disabled_extensions: Vec::new(),
            themes: ThemesConfig::default(),
            paths: PathsConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

/// Which shell a theme applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Desktop,
    Fullscreen,
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Desktop => f.write_str("desktop"),
            Self::Fullscreen => f.write_str("fullscreen"),
        }
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "fullscreen" => Ok(Self::Fullscreen),
            other => Err(format!("unknown theme mode '{other}'")),
        }
    }
}

/// Single-choice theme selection per mode. `None` means the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemesConfig {
    pub desktop: Option<String>,
    pub fullscreen: Option<String>,
}

impl ThemesConfig {
    pub fn selected(&self, mode: ThemeMode) -> Option<&str> {
        match mode {
            ThemeMode::Desktop => self.desktop.as_deref(),
            ThemeMode::Fullscreen => self.fullscreen.as_deref(),
        }
    }

    /// Set the selection for `mode`. Returns `true` if the value changed.
    pub fn select(&mut self, mode: ThemeMode, id: impl Into<String>) -> bool {
        let id = id.into();
        let slot = match mode {
            ThemeMode::Desktop => &mut self.desktop,
            ThemeMode::Fullscreen => &mut self.fullscreen,
        };
        if slot.as_deref() == Some(id.as_str()) {
            return false;
        }
        *slot = Some(id);
        true
    }
}

/// Filesystem locations. Unset entries resolve under the data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub extensions: Vec<PathBuf>,
    pub themes: Vec<PathBuf>,
    pub localization: Option<PathBuf>,
    pub extensions_data: Option<PathBuf>,
}

impl PathsConfig {
    pub fn extension_roots(&self) -> Vec<PathBuf> {
        if self.extensions.is_empty() {
            vec![data_dir().join("Extensions")]
        } else {
            self.extensions.clone()
        }
    }

    pub fn theme_roots(&self) -> Vec<PathBuf> {
        if self.themes.is_empty() {
            vec![data_dir().join("Themes")]
        } else {
            self.themes.clone()
        }
    }

    pub fn localization_dir(&self) -> PathBuf {
        self.localization
            .clone()
            .unwrap_or_else(|| data_dir().join("Localization"))
    }

    pub fn extensions_data_dir(&self) -> PathBuf {
        self.extensions_data
            .clone()
            .unwrap_or_else(|| data_dir().join("ExtensionsData"))
    }

    /// Durable uninstall queue file.
    pub fn uninstall_queue_path(&self) -> PathBuf {
        data_dir().join("uninstall-queue.json")
    }
}

/// Online add-on catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: "https://api.gamedock.app/addons".into(),
            timeout_secs: 30,
        }
    }
}
