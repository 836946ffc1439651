//! Per-session views combining descriptors with runtime state, grouped the way
//! the add-ons browser lists them.

use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use {
    gamedock_config::{ThemeMode, ThemesConfig},
    semver::Version,
};

use crate::{
    enablement::{DisabledIdSet, Selection},
    error::{Error, ExtensionLoadError, Result},
    load::{ExtensionInstance, LoadOutcome},
    types::{Category, ExtensionDescriptor},
};

/// A plugin-kind extension as seen by the current session.
#[derive(Debug)]
pub struct InstalledExtension {
    pub descriptor: ExtensionDescriptor,
    pub enabled: bool,
    pub failure: Option<ExtensionLoadError>,
    pub pending_removal: bool,
    instance: OnceLock<Arc<dyn ExtensionInstance>>,
}

impl InstalledExtension {
    pub fn new(descriptor: ExtensionDescriptor, enabled: bool) -> Self {
        Self {
            descriptor,
            enabled,
            failure: None,
            pending_removal: false,
            instance: OnceLock::new(),
        }
    }

    pub fn instance(&self) -> Option<&Arc<dyn ExtensionInstance>> {
        self.instance.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.instance.get().is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Populate the live handle. Succeeds at most once per session.
    pub fn attach_instance(&self, instance: Arc<dyn ExtensionInstance>) -> Result<()> {
        self.instance
            .set(instance)
            .map_err(|_| Error::InstanceAlreadyAttached {
                id: self.descriptor.id.clone(),
            })
    }
}

/// A theme as seen by the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledTheme {
    pub descriptor: ExtensionDescriptor,
    pub selected: bool,
    pub pending_removal: bool,
    /// Whether the theme's declared API range accepts the host theme API.
    pub compatible: bool,
}

/// Installed items split into the five browsing lists, each sorted by name.
#[derive(Debug, Default)]
pub struct InstalledExtensions {
    pub library_connectors: Vec<InstalledExtension>,
    pub metadata_providers: Vec<InstalledExtension>,
    /// Generic plugins and scripts.
    pub other_plugins: Vec<InstalledExtension>,
    pub desktop_themes: Vec<InstalledTheme>,
    pub fullscreen_themes: Vec<InstalledTheme>,
}

impl InstalledExtensions {
    pub fn build(
        descriptors: &[ExtensionDescriptor],
        disabled: &DisabledIdSet,
        outcome: &LoadOutcome,
        themes: &ThemesConfig,
        theme_api: &Version,
        pending_removal: &[PathBuf],
    ) -> Self {
        let mut lists = Self::default();
        for descriptor in descriptors {
            let pending = pending_removal.contains(&descriptor.directory);
            let theme_in = |list: &mut Vec<InstalledTheme>, mode| {
                list.push(InstalledTheme {
                    selected: themes.selected(mode) == Some(descriptor.id.as_str()),
                    descriptor: descriptor.clone(),
                    pending_removal: pending,
                    compatible: descriptor.is_compatible_with(theme_api),
                });
            };
            let plugin = || {
                let entry = InstalledExtension {
                    failure: outcome.failure(&descriptor.id).cloned(),
                    pending_removal: pending,
                    ..InstalledExtension::new(descriptor.clone(), !disabled.contains(&descriptor.id))
                };
                if let Some(loaded) = outcome.loaded.get(&descriptor.id) {
                    // Fresh OnceLock, cannot already be set.
                    let _ = entry.attach_instance(Arc::clone(&loaded.instance));
                }
                entry
            };
            match descriptor.kind.category() {
                Category::LibraryConnectors => lists.library_connectors.push(plugin()),
                Category::MetadataProviders => lists.metadata_providers.push(plugin()),
                Category::OtherPlugins => lists.other_plugins.push(plugin()),
                Category::DesktopThemes => theme_in(&mut lists.desktop_themes, ThemeMode::Desktop),
                Category::FullscreenThemes => {
                    theme_in(&mut lists.fullscreen_themes, ThemeMode::Fullscreen);
                },
            }
        }

        for list in [
            &mut lists.library_connectors,
            &mut lists.metadata_providers,
            &mut lists.other_plugins,
        ] {
            list.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
        }
        for list in [&mut lists.desktop_themes, &mut lists.fullscreen_themes] {
            list.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
        }
        lists
    }

    /// All plugin entries across the three plugin lists.
    pub fn plugins(&self) -> impl Iterator<Item = &InstalledExtension> {
        self.library_connectors
            .iter()
            .chain(&self.metadata_providers)
            .chain(&self.other_plugins)
    }

    pub fn themes(&self) -> impl Iterator<Item = &InstalledTheme> {
        self.desktop_themes.iter().chain(&self.fullscreen_themes)
    }

    pub fn plugin(&self, id: &str) -> Option<&InstalledExtension> {
        self.plugins().find(|e| e.descriptor.id == id)
    }

    pub fn plugin_mut(&mut self, id: &str) -> Option<&mut InstalledExtension> {
        self.library_connectors
            .iter_mut()
            .chain(&mut self.metadata_providers)
            .chain(&mut self.other_plugins)
            .find(|e| e.descriptor.id == id)
    }

    /// Current checkbox state of every plugin, for the reconciler.
    pub fn selections(&self) -> Vec<Selection> {
        self.plugins()
            .map(|e| Selection {
                id: e.descriptor.id.clone(),
                kind: e.descriptor.kind,
                selected: e.enabled,
            })
            .collect()
    }
}
