//! Startup sequence and the per-session handle the rest of the host talks to.

use std::path::PathBuf;

use {
    gamedock_config::{GamedockConfig, ThemeMode, ThemesConfig},
    semver::Version,
    tracing::{info, warn},
};

use crate::{
    discover::{DescriptorStore, ScanReport},
    enablement::{DisabledIdSet, EnablementReconciler, ReconcileOutcome, Selection, SettingsStore},
    error::{Error, Result},
    installed::InstalledExtensions,
    load::{ExtensionFactory, LoadCoordinator, LoadOutcome, LoadedExtension},
    types::ExtensionKind,
    uninstall::{SweepReport, UninstallQueue},
};

/// Where things live and which host API extensions are checked against.
#[derive(Debug, Clone)]
pub struct HostOptions {
    pub extension_roots: Vec<PathBuf>,
    pub theme_roots: Vec<PathBuf>,
    pub extensions_data_dir: PathBuf,
    pub uninstall_queue_path: PathBuf,
    pub host_api: Version,
    pub theme_api: Version,
}

impl HostOptions {
    pub fn from_config(config: &GamedockConfig, host_api: Version, theme_api: Version) -> Self {
        Self {
            extension_roots: config.paths.extension_roots(),
            theme_roots: config.paths.theme_roots(),
            extensions_data_dir: config.paths.extensions_data_dir(),
            uninstall_queue_path: config.paths.uninstall_queue_path(),
            host_api,
            theme_api,
        }
    }

    /// Extension roots followed by theme roots, in scan order.
    pub fn all_roots(&self) -> Vec<PathBuf> {
        self.extension_roots
            .iter()
            .chain(&self.theme_roots)
            .cloned()
            .collect()
    }
}

pub struct ExtensionHost;

impl ExtensionHost {
    /// Run the startup sequence: apply queued uninstalls, discover, load the
    /// enabled plugins, and build the installed views.
    ///
    /// Failures are logged and recorded on the returned [`Session`]. Settings
    /// that cannot be read fall back to defaults, and the session then refuses
    /// to write them so a hand-edited file is never clobbered.
    pub fn start<S: SettingsStore>(
        options: HostOptions,
        store: S,
        factory: &dyn ExtensionFactory,
    ) -> Result<Session<S>> {
        let roots = options.all_roots();
        let queue = UninstallQueue::new(
            options.uninstall_queue_path.clone(),
            options.extensions_data_dir.clone(),
        );

        let sweep = match queue.sweep(&roots) {
            Ok(report) => report,
            Err(e) => {
                warn!(path = %queue.path().display(), error = %e, "uninstall queue unreadable, skipping sweep");
                SweepReport::default()
            },
        };

        let scan = DescriptorStore::new(roots).scan();
        let mut settings_readable = true;
        let disabled = store.disabled_ids().unwrap_or_else(|e| {
            warn!(error = %e, "settings unreadable, starting with every extension enabled");
            settings_readable = false;
            DisabledIdSet::new()
        });

        let plugins: Vec<_> = scan
            .descriptors
            .iter()
            .filter(|d| !d.kind.is_theme())
            .cloned()
            .collect();
        let outcome = LoadCoordinator::new(factory, options.host_api.clone()).load(&plugins, &disabled);

        let themes = if settings_readable {
            ThemesConfig {
                desktop: store.selected_theme(ThemeMode::Desktop).unwrap_or_default(),
                fullscreen: store.selected_theme(ThemeMode::Fullscreen).unwrap_or_default(),
            }
        } else {
            ThemesConfig::default()
        };
        let pending: Vec<PathBuf> = sweep
            .retained
            .iter()
            .map(|(request, _)| request.directory.clone())
            .collect();
        let installed = InstalledExtensions::build(
            &scan.descriptors,
            &disabled,
            &outcome,
            &themes,
            &options.theme_api,
            &pending,
        );

        info!(
            discovered = scan.descriptors.len(),
            invalid = scan.errors.len(),
            loaded = outcome.loaded.len(),
            failed = outcome.failed.len(),
            disabled = disabled.len(),
            "extension host started"
        );

        Ok(Session {
            options,
            scan,
            sweep,
            outcome,
            installed,
            disabled_at_start: disabled,
            reconciler: EnablementReconciler::new(store),
            queue,
            settings_readable,
            restart_required: false,
        })
    }
}

/// State of one host run. Enablement, theme and uninstall changes made here
/// are persisted immediately and take effect on the next start.
pub struct Session<S> {
    options: HostOptions,
    scan: ScanReport,
    sweep: SweepReport,
    outcome: LoadOutcome,
    installed: InstalledExtensions,
    disabled_at_start: DisabledIdSet,
    reconciler: EnablementReconciler<S>,
    queue: UninstallQueue,
    settings_readable: bool,
    restart_required: bool,
}

impl<S: SettingsStore> Session<S> {
    pub fn scan_report(&self) -> &ScanReport {
        &self.scan
    }

    pub fn sweep_report(&self) -> &SweepReport {
        &self.sweep
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    pub fn loaded(&self) -> impl Iterator<Item = &LoadedExtension> {
        self.outcome.loaded.values()
    }

    pub fn installed(&self) -> &InstalledExtensions {
        &self.installed
    }

    pub fn restart_required(&self) -> bool {
        self.restart_required
    }

    /// `false` when the settings failed to load at startup. Writes are refused.
    pub fn settings_writable(&self) -> bool {
        self.settings_readable
    }

    /// Flip a plugin's checkbox. Nothing is persisted until [`Session::reconcile`].
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        let entry = self
            .installed
            .plugin_mut(id)
            .ok_or_else(|| Error::unknown_extension(id))?;
        entry.enabled = enabled;
        Ok(())
    }

    /// Current checkbox state of every plugin.
    pub fn selections(&self) -> Vec<Selection> {
        self.installed.selections()
    }

    /// Persist `selections` as the disabled set and mirror them onto the views.
    pub fn reconcile(&mut self, selections: &[Selection]) -> Result<ReconcileOutcome> {
        if !self.settings_readable {
            return Err(Error::SettingsReadOnly);
        }
        let outcome = self.reconciler.reconcile(selections)?;
        for selection in selections {
            if let Some(entry) = self.installed.plugin_mut(&selection.id) {
                entry.enabled = selection.selected;
            }
        }
        if outcome.disabled != self.disabled_at_start {
            self.restart_required = true;
        }
        Ok(outcome)
    }

    /// Queue the extension or theme with this id for removal at the next start.
    /// Returns `false` when it was already queued.
    pub fn request_uninstall(&mut self, id: &str) -> Result<bool> {
        let descriptor = self
            .scan
            .find(id)
            .ok_or_else(|| Error::unknown_extension(id))?;
        let queued = self.queue.enqueue(descriptor)?;

        if let Some(entry) = self.installed.plugin_mut(id) {
            entry.pending_removal = true;
        }
        for theme in self
            .installed
            .desktop_themes
            .iter_mut()
            .chain(&mut self.installed.fullscreen_themes)
            .filter(|t| t.descriptor.id == id)
        {
            theme.pending_removal = true;
        }
        if queued {
            self.restart_required = true;
        }
        Ok(queued)
    }

    /// Make `id` the theme for `mode`. Returns `false` if it already was.
    pub fn select_theme(&mut self, mode: ThemeMode, id: &str) -> Result<bool> {
        let kind = ExtensionKind::from_theme_mode(mode);
        let Some(descriptor) = self
            .scan
            .descriptors
            .iter()
            .find(|d| d.id == id && d.kind == kind)
        else {
            return Err(Error::UnknownTheme {
                mode,
                id: id.to_string(),
            });
        };
        if !descriptor.is_compatible_with(&self.options.theme_api) {
            return Err(Error::IncompatibleTheme {
                id: id.to_string(),
                required: descriptor
                    .host_compat
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                host: self.options.theme_api.to_string(),
            });
        }
        if !self.settings_readable {
            return Err(Error::SettingsReadOnly);
        }

        let store = self.reconciler.store();
        if store.selected_theme(mode)?.as_deref() == Some(id) {
            return Ok(false);
        }
        store.save_selected_theme(mode, id)?;

        let list = match mode {
            ThemeMode::Desktop => &mut self.installed.desktop_themes,
            ThemeMode::Fullscreen => &mut self.installed.fullscreen_themes,
        };
        for theme in list {
            theme.selected = theme.descriptor.id == id;
        }
        info!(%mode, id, "theme selected");
        self.restart_required = true;
        Ok(true)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            enablement::{ConfigSettingsStore, tests::MemoryStore},
            load::tests::RecordingFactory,
            manifest::{EXTENSION_MANIFEST, THEME_MANIFEST},
        },
        std::path::Path,
    };

    struct Env {
        _tmp: tempfile::TempDir,
        options: HostOptions,
    }

    fn env() -> Env {
        let tmp = tempfile::tempdir().unwrap();
        let options = HostOptions {
            extension_roots: vec![tmp.path().join("Extensions")],
            theme_roots: vec![tmp.path().join("Themes")],
            extensions_data_dir: tmp.path().join("ExtensionsData"),
            uninstall_queue_path: tmp.path().join("uninstall-queue.json"),
            host_api: Version::new(6, 0, 0),
            theme_api: Version::new(2, 9, 0),
        };
        Env { _tmp: tmp, options }
    }

    fn plugin(root: &Path, id: &str, kind: &str) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(EXTENSION_MANIFEST),
            format!("Id: {id}\nName: {id}\nVersion: 1.0\nModule: {id}.dll\nType: {kind}\n"),
        )
        .unwrap();
    }

    fn theme(root: &Path, id: &str, mode: &str) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(THEME_MANIFEST),
            format!("Id: {id}\nName: {id}\nVersion: 1\nMode: {mode}\n"),
        )
        .unwrap();
    }

    #[test]
    fn start_loads_enabled_plugins_only() {
        let env = env();
        let ext = &env.options.extension_roots[0];
        plugin(ext, "a", "GameLibrary");
        plugin(ext, "b", "MetadataProvider");
        theme(&env.options.theme_roots[0], "Dark", "Desktop");

        let store = MemoryStore::default();
        *store.disabled.lock().unwrap() = ["b"].into_iter().collect();
        let factory = RecordingFactory::default();

        let session = ExtensionHost::start(env.options.clone(), store, &factory).unwrap();
        assert_eq!(*factory.attempted.lock().unwrap(), vec!["a"]);
        assert_eq!(session.loaded().count(), 1);
        assert!(session.installed().plugin("a").unwrap().is_loaded());
        assert!(!session.installed().plugin("b").unwrap().enabled);
        assert_eq!(session.installed().desktop_themes.len(), 1);
        assert!(!session.restart_required());
    }

    #[test]
    fn reconcile_marks_restart_only_on_real_change() {
        let env = env();
        plugin(&env.options.extension_roots[0], "a", "GenericPlugin");
        let factory = RecordingFactory::default();
        let mut session =
            ExtensionHost::start(env.options.clone(), MemoryStore::default(), &factory).unwrap();

        assert!(!session.reconcile(&session.selections()).unwrap().changed);
        assert!(!session.restart_required());

        session.set_enabled("a", false).unwrap();
        let selections = session.selections();
        let outcome = session.reconcile(&selections).unwrap();
        assert!(outcome.changed);
        assert!(outcome.disabled.contains("a"));
        assert!(session.restart_required());

        assert!(matches!(
            session.set_enabled("nope", true),
            Err(Error::UnknownExtension { .. })
        ));
    }

    #[test]
    fn uninstall_is_applied_on_next_start() {
        let env = env();
        let ext = env.options.extension_roots[0].clone();
        plugin(&ext, "z", "Script");
        plugin(&ext, "keep", "GenericPlugin");
        let factory = RecordingFactory::default();

        let mut session =
            ExtensionHost::start(env.options.clone(), MemoryStore::default(), &factory).unwrap();
        assert!(session.request_uninstall("z").unwrap());
        assert!(!session.request_uninstall("z").unwrap());
        assert!(session.installed().plugin("z").unwrap().pending_removal);
        // Still on disk until the next start.
        assert!(ext.join("z").exists());
        drop(session);

        let session =
            ExtensionHost::start(env.options.clone(), MemoryStore::default(), &factory).unwrap();
        assert_eq!(session.sweep_report().applied.len(), 1);
        assert!(!ext.join("z").exists());
        assert!(session.scan_report().find("z").is_none());
        assert!(session.scan_report().find("keep").is_some());
    }

    #[test]
    fn select_theme_validates_mode_and_persists() {
        let env = env();
        let themes = &env.options.theme_roots[0];
        theme(themes, "Dark", "Desktop");
        theme(themes, "Couch", "Fullscreen");
        let factory = RecordingFactory::default();
        let mut session =
            ExtensionHost::start(env.options.clone(), MemoryStore::default(), &factory).unwrap();

        assert!(matches!(
            session.select_theme(ThemeMode::Desktop, "Couch"),
            Err(Error::UnknownTheme { .. })
        ));
        assert!(session.select_theme(ThemeMode::Desktop, "Dark").unwrap());
        assert!(!session.select_theme(ThemeMode::Desktop, "Dark").unwrap());
        assert!(session.installed().desktop_themes[0].selected);
        assert_eq!(
            session
                .reconciler
                .store()
                .selected_theme(ThemeMode::Desktop)
                .unwrap()
                .as_deref(),
            Some("Dark")
        );
    }

    #[test]
    fn incompatible_theme_is_flagged_and_cannot_be_selected() {
        let env = env();
        let dir = env.options.theme_roots[0].join("Future");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(THEME_MANIFEST),
            "Id: Future\nName: Future\nVersion: 1\nMode: Desktop\nThemeApiVersion: 99.0.0\n",
        )
        .unwrap();
        theme(&env.options.theme_roots[0], "Plain", "Desktop");
        let factory = RecordingFactory::default();
        let mut session =
            ExtensionHost::start(env.options.clone(), MemoryStore::default(), &factory).unwrap();

        let themes = &session.installed().desktop_themes;
        assert!(!themes.iter().find(|t| t.descriptor.id == "Future").unwrap().compatible);
        assert!(themes.iter().find(|t| t.descriptor.id == "Plain").unwrap().compatible);

        assert!(matches!(
            session.select_theme(ThemeMode::Desktop, "Future"),
            Err(Error::IncompatibleTheme { .. })
        ));
        assert_eq!(
            session
                .reconciler
                .store()
                .selected_theme(ThemeMode::Desktop)
                .unwrap(),
            None
        );
        assert!(!session.restart_required());
    }

    #[test]
    fn corrupt_config_starts_with_defaults_and_is_left_alone() {
        let env = env();
        plugin(&env.options.extension_roots[0], "a", "GenericPlugin");
        theme(&env.options.theme_roots[0], "Dark", "Desktop");
        let config = env._tmp.path().join("gamedock.toml");
        std::fs::write(&config, "language = [").unwrap();
        let factory = RecordingFactory::default();

        let mut session = ExtensionHost::start(
            env.options.clone(),
            ConfigSettingsStore::new(config.clone()),
            &factory,
        )
        .unwrap();
        assert!(!session.settings_writable());
        assert!(session.installed().plugin("a").unwrap().is_loaded());

        session.set_enabled("a", false).unwrap();
        let selections = session.selections();
        assert!(matches!(
            session.reconcile(&selections),
            Err(Error::SettingsReadOnly)
        ));
        assert!(matches!(
            session.select_theme(ThemeMode::Desktop, "Dark"),
            Err(Error::SettingsReadOnly)
        ));
        assert_eq!(std::fs::read_to_string(&config).unwrap(), "language = [");
    }
}
