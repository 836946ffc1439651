use std::{fmt, path::PathBuf, str::FromStr};

use {
    gamedock_config::ThemeMode,
    semver::{Version, VersionReq},
    serde::{Deserialize, Serialize},
};

// ── Extension kind ───────────────────────────────────────────────────────────

/// Closed set of things the host can discover on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExtensionKind {
    LibraryConnector,
    MetadataProvider,
    GenericPlugin,
    Script,
    ThemeDesktop,
    ThemeFullscreen,
}

/// The browsing list an installed item is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    LibraryConnectors,
    MetadataProviders,
    OtherPlugins,
    DesktopThemes,
    FullscreenThemes,
}

impl ExtensionKind {
    pub const ALL: [Self; 6] = [
        Self::LibraryConnector,
        Self::MetadataProvider,
        Self::GenericPlugin,
        Self::Script,
        Self::ThemeDesktop,
        Self::ThemeFullscreen,
    ];

    pub fn category(self) -> Category {
        match self {
            Self::LibraryConnector => Category::LibraryConnectors,
            Self::MetadataProvider => Category::MetadataProviders,
            Self::GenericPlugin | Self::Script => Category::OtherPlugins,
            Self::ThemeDesktop => Category::DesktopThemes,
            Self::ThemeFullscreen => Category::FullscreenThemes,
        }
    }

    /// Themes are chosen one-per-mode and never instantiated.
    pub fn theme_mode(self) -> Option<ThemeMode> {
        match self {
            Self::ThemeDesktop => Some(ThemeMode::Desktop),
            Self::ThemeFullscreen => Some(ThemeMode::Fullscreen),
            Self::LibraryConnector | Self::MetadataProvider | Self::GenericPlugin | Self::Script => {
                None
            },
        }
    }

    pub fn is_theme(self) -> bool {
        self.theme_mode().is_some()
    }

    pub fn from_theme_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Desktop => Self::ThemeDesktop,
            ThemeMode::Fullscreen => Self::ThemeFullscreen,
        }
    }

    /// Script extensions keep user data in a per-id folder outside their install dir.
    pub fn has_external_data_dir(self) -> bool {
        matches!(self, Self::Script)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LibraryConnector => "LibraryConnector",
            Self::MetadataProvider => "MetadataProvider",
            Self::GenericPlugin => "GenericPlugin",
            Self::Script => "Script",
            Self::ThemeDesktop => "ThemeDesktop",
            Self::ThemeFullscreen => "ThemeFullscreen",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionKind {
    type Err = String;

    /// Accepts the canonical names plus the manifest spellings (`GameLibrary`,
    /// `Metadata`, `Generic`, `DesktopTheme`, ...), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "libraryconnector" | "gamelibrary" | "library" => Ok(Self::LibraryConnector),
            "metadataprovider" | "metadata" => Ok(Self::MetadataProvider),
            "genericplugin" | "generic" => Ok(Self::GenericPlugin),
            "script" => Ok(Self::Script),
            "themedesktop" | "desktoptheme" => Ok(Self::ThemeDesktop),
            "themefullscreen" | "fullscreentheme" => Ok(Self::ThemeFullscreen),
            _ => Err(format!("unknown extension kind '{s}'")),
        }
    }
}

// ── Descriptor ───────────────────────────────────────────────────────────────

/// Immutable record of one discovered extension or theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    pub id: String,
    pub name: String,
    pub author: Option<String>,
    pub kind: ExtensionKind,
    pub version: String,
    /// Entry point relative to `directory` (assembly, script file).
    pub module: Option<String>,
    pub icon: Option<String>,
    /// Host API versions this extension declares support for. `None` accepts any host.
    pub host_compat: Option<VersionReq>,
    pub directory: PathBuf,
    pub manifest_path: PathBuf,
}

impl ExtensionDescriptor {
    /// Final path component of the install directory.
    pub fn directory_name(&self) -> String {
        self.directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn module_path(&self) -> Option<PathBuf> {
        self.module.as_deref().map(|m| self.directory.join(m))
    }

    pub fn is_compatible_with(&self, host: &Version) -> bool {
        self.host_compat.as_ref().is_none_or(|req| req.matches(host))
    }
}
