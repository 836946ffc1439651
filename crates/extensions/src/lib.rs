//! Extension lifecycle: discovery, enablement, loading and deferred uninstall.
//!
//! Extensions live one directory each under the configured roots:
//! - `<root>/<dir>/extension.yaml` for plugins and scripts
//! - `<root>/<dir>/theme.yaml` for desktop and fullscreen themes
//!
//! [`ExtensionHost::start`] runs the startup order (sweep, scan, load) and
//! returns a [`Session`] for everything that happens afterwards.

pub mod discover;
pub mod enablement;
pub mod error;
pub mod host;
pub mod installed;
pub mod load;
pub mod manifest;
pub mod types;
pub mod uninstall;

pub use {
    discover::{DescriptorStore, ScanReport},
    enablement::{
        ConfigSettingsStore, DisabledIdSet, EnablementReconciler, ReconcileOutcome, Selection,
        SettingsStore,
    },
    error::{Error, ExtensionLoadError, ManifestParseError, Result, UninstallApplyError},
    host::{ExtensionHost, HostOptions, Session},
    installed::{InstalledExtension, InstalledExtensions, InstalledTheme},
    load::{ExtensionFactory, ExtensionInstance, LoadCoordinator, LoadOutcome, LoadedExtension},
    types::{Category, ExtensionDescriptor, ExtensionKind},
    uninstall::{SweepReport, UninstallQueue, UninstallRequest, safe_path_name},
};
