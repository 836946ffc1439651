//! End-to-end lifecycle against a real config file and temp directories.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use {
    gamedock_config::ThemeMode,
    gamedock_extensions::{
        ConfigSettingsStore, Error, ExtensionDescriptor, ExtensionFactory, ExtensionHost,
        ExtensionInstance, ExtensionLoadError, HostOptions, SettingsStore,
    },
    semver::Version,
};

// ── Fixtures ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Live(String);

impl ExtensionInstance for Live {
    fn id(&self) -> &str {
        &self.0
    }
}

/// Fails every id in `broken`; records the rest.
#[derive(Default)]
struct Factory {
    broken: Vec<&'static str>,
    seen: Mutex<Vec<String>>,
}

impl ExtensionFactory for Factory {
    fn instantiate(&self, d: &ExtensionDescriptor) -> anyhow::Result<Arc<dyn ExtensionInstance>> {
        self.seen.lock().unwrap().push(d.id.clone());
        if self.broken.contains(&d.id.as_str()) {
            anyhow::bail!("entry point missing");
        }
        Ok(Arc::new(Live(d.id.clone())))
    }
}

fn write_plugin(root: &Path, id: &str, kind: &str, host_api: Option<&str>) {
    let dir = root.join(id);
    std::fs::create_dir_all(&dir).unwrap();
    let mut body = format!("Id: {id}\nName: {id}\nVersion: 1.0\nModule: {id}.dll\nType: {kind}\n");
    if let Some(req) = host_api {
        body.push_str(&format!("HostApi: \"{req}\"\n"));
    }
    std::fs::write(dir.join("extension.yaml"), body).unwrap();
}

fn options(base: &Path) -> HostOptions {
    HostOptions {
        extension_roots: vec![base.join("Extensions")],
        theme_roots: vec![base.join("Themes")],
        extensions_data_dir: base.join("ExtensionsData"),
        uninstall_queue_path: base.join("uninstall-queue.json"),
        host_api: Version::new(6, 2, 0),
        theme_api: Version::new(2, 9, 0),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn disable_then_restart_skips_the_extension() {
    let tmp = tempfile::tempdir().unwrap();
    let ext = tmp.path().join("Extensions");
    write_plugin(&ext, "steam", "GameLibrary", None);
    write_plugin(&ext, "igdb", "MetadataProvider", Some("^6"));
    write_plugin(&ext, "legacy", "GenericPlugin", Some("^5"));
    write_plugin(&ext, "flaky", "Script", None);
    std::fs::create_dir_all(ext.join("corrupt")).unwrap();
    std::fs::write(ext.join("corrupt").join("extension.yaml"), "Id: [broken").unwrap();

    let config = tmp.path().join("gamedock.toml");
    let factory = Factory {
        broken: vec!["flaky"],
        ..Default::default()
    };

    let mut session = ExtensionHost::start(
        options(tmp.path()),
        ConfigSettingsStore::new(config.clone()),
        &factory,
    )
    .unwrap();
    assert_eq!(session.scan_report().errors.len(), 1);
    let outcome = session.load_outcome();
    assert!(outcome.is_loaded("steam"));
    assert!(outcome.is_loaded("igdb"));
    assert!(matches!(
        outcome.failure("legacy"),
        Some(ExtensionLoadError::Incompatible { .. })
    ));
    assert!(matches!(
        outcome.failure("flaky"),
        Some(ExtensionLoadError::Instantiate { .. })
    ));

    let mut selections = session.selections();
    for s in &mut selections {
        s.selected = s.id != "steam";
    }
    assert!(session.reconcile(&selections).unwrap().changed);
    assert!(!session.installed().plugin("steam").unwrap().enabled);
    assert!(session.restart_required());
    drop(session);

    let persisted = ConfigSettingsStore::new(config.clone()).disabled_ids().unwrap();
    assert_eq!(persisted.to_vec(), vec!["steam"]);

    let factory = Factory::default();
    let session =
        ExtensionHost::start(options(tmp.path()), ConfigSettingsStore::new(config), &factory)
            .unwrap();
    assert!(!factory.seen.lock().unwrap().iter().any(|id| id == "steam"));
    let steam = session.installed().plugin("steam").unwrap();
    assert!(!steam.enabled);
    assert!(!steam.is_loaded());
    assert!(!steam.is_failed());
}

#[test]
fn uninstall_survives_restart_and_applies_before_scan() {
    let tmp = tempfile::tempdir().unwrap();
    let ext = tmp.path().join("Extensions");
    write_plugin(&ext, "doomed", "Script", None);
    let data = tmp.path().join("ExtensionsData").join("doomed");
    std::fs::create_dir_all(&data).unwrap();
    let config = tmp.path().join("gamedock.toml");

    let factory = Factory::default();
    let mut session = ExtensionHost::start(
        options(tmp.path()),
        ConfigSettingsStore::new(config.clone()),
        &factory,
    )
    .unwrap();
    assert!(session.request_uninstall("doomed").unwrap());
    assert!(matches!(
        session.request_uninstall("ghost"),
        Err(Error::UnknownExtension { .. })
    ));
    drop(session);
    assert!(tmp.path().join("uninstall-queue.json").exists());

    let session =
        ExtensionHost::start(options(tmp.path()), ConfigSettingsStore::new(config), &factory)
            .unwrap();
    assert!(!ext.join("doomed").exists());
    assert!(!data.exists());
    assert!(session.scan_report().find("doomed").is_none());
    assert!(!tmp.path().join("uninstall-queue.json").exists());
}

#[test]
fn theme_selection_lands_in_config() {
    let tmp = tempfile::tempdir().unwrap();
    let themes = tmp.path().join("Themes").join("Nord");
    std::fs::create_dir_all(&themes).unwrap();
    std::fs::write(
        themes.join("theme.yaml"),
        "Id: Nord\nName: Nord\nVersion: 2.1\nMode: Fullscreen\nThemeApiVersion: 2.0.0\n",
    )
    .unwrap();
    let config = tmp.path().join("gamedock.toml");

    let mut session = ExtensionHost::start(
        options(tmp.path()),
        ConfigSettingsStore::new(config.clone()),
        &Factory::default(),
    )
    .unwrap();
    assert!(session.select_theme(ThemeMode::Fullscreen, "Nord").unwrap());

    let raw = std::fs::read_to_string(&config).unwrap();
    assert!(raw.contains("fullscreen = \"Nord\""));
}
