use std::path::{Path, PathBuf};

use {gamedock_config::ThemeMode, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("extension '{id}' is not installed")]
    UnknownExtension { id: String },

    #[error("no {mode} theme with id '{id}' is installed")]
    UnknownTheme { mode: ThemeMode, id: String },

    #[error("theme '{id}' requires theme API {required}, running {host}")]
    IncompatibleTheme {
        id: String,
        required: String,
        host: String,
    },

    #[error("settings could not be read at startup; not overwriting them")]
    SettingsReadOnly,

    #[error("extension '{id}' already has a live instance")]
    InstanceAlreadyAttached { id: String },

    #[error("{context}: {source}")]
    Settings {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    #[must_use]
    pub fn unknown_extension(id: impl Into<String>) -> Self {
        Self::UnknownExtension { id: id.into() }
    }

    #[must_use]
    pub fn settings(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Settings {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A manifest that could not be turned into a descriptor. Recorded by the scan,
/// never raised out of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse manifest {path}: {reason}")]
pub struct ManifestParseError {
    pub path: PathBuf,
    pub reason: String,
}

impl ManifestParseError {
    #[must_use]
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Why an enabled extension did not produce a live instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionLoadError {
    #[error("extension '{id}' requires host API {required}, running {host}")]
    Incompatible {
        id: String,
        required: String,
        host: String,
    },

    #[error("extension '{id}' module not found at {path}")]
    MissingModule { id: String, path: PathBuf },

    #[error("extension '{id}' failed to initialize: {reason}")]
    Instantiate { id: String, reason: String },

    #[error("extension '{id}' panicked during initialization: {message}")]
    Panicked { id: String, message: String },
}

impl ExtensionLoadError {
    pub fn id(&self) -> &str {
        match self {
            Self::Incompatible { id, .. }
            | Self::MissingModule { id, .. }
            | Self::Instantiate { id, .. }
            | Self::Panicked { id, .. } => id,
        }
    }
}

/// A queued removal that could not be applied during the startup sweep.
#[derive(Debug, Error)]
pub enum UninstallApplyError {
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to remove {path}: not inside a managed directory")]
    OutsideRoots { path: PathBuf },
}
