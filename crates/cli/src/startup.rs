//! Host boot: config, extension session, then localization.

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    gamedock_config::GamedockConfig,
    gamedock_extensions::{
        ConfigSettingsStore, ExtensionDescriptor, ExtensionFactory, ExtensionHost,
        ExtensionInstance, ExtensionLoadError, HostOptions, Session,
    },
    gamedock_i18n::Localization,
    semver::Version,
    tracing::debug,
};

/// Host API version extensions declare compatibility against.
pub const HOST_API_VERSION: Version = Version::new(6, 0, 0);
/// Theme API version themes declare compatibility against.
pub const THEME_API_VERSION: Version = Version::new(2, 9, 0);

/// An extension whose entry module was found on disk.
#[derive(Debug)]
pub struct ModuleInstance {
    id: String,
}

impl ExtensionInstance for ModuleInstance {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Resolves each descriptor's declared module inside its directory.
pub struct ModuleFactory;

impl ExtensionFactory for ModuleFactory {
    fn instantiate(
        &self,
        descriptor: &ExtensionDescriptor,
    ) -> anyhow::Result<Arc<dyn ExtensionInstance>> {
        let missing = |path: PathBuf| ExtensionLoadError::MissingModule {
            id: descriptor.id.clone(),
            path,
        };
        let module = descriptor
            .module_path()
            .ok_or_else(|| missing(descriptor.directory.clone()))?;
        if !module.is_file() {
            return Err(missing(module).into());
        }
        debug!(id = %descriptor.id, module = %module.display(), "module resolved");
        Ok(Arc::new(ModuleInstance {
            id: descriptor.id.clone(),
        }))
    }
}

pub struct Host {
    pub config: GamedockConfig,
    pub config_path: PathBuf,
    pub session: Session<ConfigSettingsStore>,
    pub localization: Localization,
}

/// Load config, start the extension session, and apply the configured language
/// plus every loaded extension's strings.
pub fn boot() -> anyhow::Result<Host> {
    let config = gamedock_config::discover_and_load();
    let config_path = gamedock_config::find_or_default_config_path();
    boot_with(config, config_path)
}

pub fn boot_with(config: GamedockConfig, config_path: PathBuf) -> anyhow::Result<Host> {
    let options = HostOptions::from_config(&config, HOST_API_VERSION, THEME_API_VERSION);
    let store = ConfigSettingsStore::new(config_path.clone());
    let session = ExtensionHost::start(options, store, &ModuleFactory)
        .context("failed to start extension host")?;

    let mut localization = Localization::new(config.paths.localization_dir());
    // A broken language file leaves the source language active.
    if let Err(e) = localization.set_language(&config.language) {
        debug!(language = %config.language, error = %e, "staying on source language");
    }
    for loaded in session.loaded() {
        if let Err(e) = localization.load_extension_localization(&loaded.descriptor.directory) {
            debug!(id = %loaded.descriptor.id, error = %e, "extension strings skipped");
        }
    }

    Ok(Host {
        config,
        config_path,
        session,
        localization,
    })
}
