//! The host's text resources: one [`ResourceOverlay`] plus the active language.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Mutex,
};

use {
    gamedock_config::SOURCE_LANGUAGE,
    tracing::{debug, info, warn},
};

use crate::{
    dictionary::{Dictionary, EntryFilter, load_dictionary},
    error::Result,
    languages::{COVERAGE_FILE, Language, available_languages},
    locale::LocaleContext,
    overlay::{Layer, LayerOrigin, ResourceOverlay},
};

/// Host strings in the source language, inside the localization directory.
pub const BASE_FILE: &str = "english.json";
/// Subdirectory of an extension holding its dictionaries.
pub const EXTENSION_LOCALIZATION_DIR: &str = "Localization";
/// An extension's source-language dictionary.
pub const EXTENSION_BASE_FILE: &str = "en_US.json";

const EXTENSION_BASE_LANGUAGE: &str = "en_US";

pub struct Localization {
    dir: PathBuf,
    overlay: ResourceOverlay,
    current: String,
    locale: LocaleContext,
    /// Extensions whose base layer is on the stack, in load order.
    extensions: Vec<PathBuf>,
    missing: Mutex<BTreeSet<String>>,
}

impl Localization {
    /// Start in the source language with the host base strings from `dir`,
    /// if present.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut overlay = ResourceOverlay::new();
        let base_path = dir.join(BASE_FILE);
        let base = if base_path.is_file() {
            load_dictionary(&base_path, EntryFilter::Base).unwrap_or_else(|e| {
                warn!(error = %e, "host base strings unavailable");
                Dictionary::new()
            })
        } else {
            debug!(path = %base_path.display(), "no host base strings");
            Dictionary::new()
        };
        overlay.push_layer(Layer::new(LayerOrigin::Base, base));

        Self {
            dir,
            overlay,
            current: SOURCE_LANGUAGE.to_string(),
            locale: LocaleContext::default(),
            extensions: Vec::new(),
            missing: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn current_language(&self) -> &str {
        &self.current
    }

    pub fn locale(&self) -> &LocaleContext {
        &self.locale
    }

    pub fn is_right_to_left(&self) -> bool {
        self.locale.is_right_to_left()
    }

    pub fn overlay(&self) -> &ResourceOverlay {
        &self.overlay
    }

    pub fn available_languages(&self) -> Vec<Language> {
        available_languages(&self.dir, &self.dir.join(COVERAGE_FILE))
    }

    /// Switch the active language.
    ///
    /// The new file is parsed before anything changes, so a parse error leaves
    /// the previous language in place. A language without a file behaves like
    /// the source language but keeps `id` as the current language.
    pub fn set_language(&mut self, id: &str) -> Result<()> {
        let path = self.dir.join(format!("{id}.json"));
        let layer = if id != SOURCE_LANGUAGE && path.is_file() {
            match load_dictionary(&path, EntryFilter::Language) {
                Ok(entries) => Some(Layer::new(LayerOrigin::Language(id.to_string()), entries)),
                Err(e) => {
                    warn!(error = %e, language = id, "keeping current language");
                    return Err(e);
                },
            }
        } else {
            None
        };

        self.overlay
            .remove_where(|o| matches!(o, LayerOrigin::Language(_)));
        self.overlay
            .remove_where(|o| matches!(o, LayerOrigin::ExtensionTranslation { .. }));

        self.locale = if layer.is_some() {
            LocaleContext::from_language_id(id)
        } else {
            LocaleContext::default()
        };
        if let Some(layer) = layer {
            self.overlay.push_layer(layer);
        } else if id != SOURCE_LANGUAGE {
            debug!(language = id, "no language file, using source strings");
        }
        self.current = id.to_string();

        for extension_dir in self.extensions.clone() {
            self.push_extension_translation(&extension_dir);
        }
        info!(language = id, locale = %self.locale.tag, "language set");
        Ok(())
    }

    /// Layer an extension's own strings (and their translation for the active
    /// language) onto the overlay. Returns `false` when the extension ships no
    /// source-language dictionary or was already loaded.
    pub fn load_extension_localization(&mut self, extension_dir: &Path) -> Result<bool> {
        if self.extensions.iter().any(|d| d == extension_dir) {
            debug!(dir = %extension_dir.display(), "extension strings already loaded");
            return Ok(false);
        }
        let base_path = extension_dir
            .join(EXTENSION_LOCALIZATION_DIR)
            .join(EXTENSION_BASE_FILE);
        if !base_path.is_file() {
            return Ok(false);
        }
        let entries = load_dictionary(&base_path, EntryFilter::Extension).inspect_err(|e| {
            warn!(error = %e, "skipping extension strings");
        })?;

        self.overlay.push_layer(Layer::new(
            LayerOrigin::ExtensionBase(extension_dir.to_path_buf()),
            entries,
        ));
        self.extensions.push(extension_dir.to_path_buf());
        self.push_extension_translation(extension_dir);
        Ok(true)
    }

    /// Place the extension's translation for the active language directly
    /// above its base layer. Missing or broken files are skipped.
    fn push_extension_translation(&mut self, extension_dir: &Path) {
        if self.current == SOURCE_LANGUAGE || self.current == EXTENSION_BASE_LANGUAGE {
            return;
        }
        let path = extension_dir
            .join(EXTENSION_LOCALIZATION_DIR)
            .join(format!("{}.json", self.current));
        if !path.is_file() {
            return;
        }
        let entries = match load_dictionary(&path, EntryFilter::Extension) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "skipping extension translation");
                return;
            },
        };
        let Some(base) = self
            .overlay
            .position(|o| *o == LayerOrigin::ExtensionBase(extension_dir.to_path_buf()))
        else {
            return;
        };
        self.overlay.insert_above(base, Layer::new(
            LayerOrigin::ExtensionTranslation {
                extension_dir: extension_dir.to_path_buf(),
                language: self.current.clone(),
            },
            entries,
        ));
    }

    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.overlay.resolve(key)
    }

    /// Resolved text, or `key` itself when no layer has it. Misses are recorded.
    pub fn text(&self, key: &str) -> String {
        if let Some(value) = self.overlay.resolve(key) {
            return value.to_string();
        }
        let first_miss = self
            .missing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string());
        if first_miss {
            debug!(key, language = %self.current, "missing translation");
        }
        key.to_string()
    }

    /// Keys that were requested but not found, sorted.
    pub fn missing_keys(&self) -> Vec<String> {
        self.missing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        _tmp: tempfile::TempDir,
        loc_dir: PathBuf,
        ext_dir: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let loc_dir = tmp.path().join("Localization");
        std::fs::create_dir_all(&loc_dir).unwrap();
        std::fs::write(
            loc_dir.join(BASE_FILE),
            r#"{"LOCSave": "Save", "LOCCancel": "Cancel", "LOCQuit": "Quit"}"#,
        )
        .unwrap();
        std::fs::write(
            loc_dir.join("de_DE.json"),
            r#"{"LanguageName": "Deutsch", "LOCSave": "Speichern", "LOCCancel": ""}"#,
        )
        .unwrap();
        std::fs::write(
            loc_dir.join("fr_FR.json"),
            r#"{"LanguageName": "Français", "LOCSave": "Enregistrer"}"#,
        )
        .unwrap();
        std::fs::write(loc_dir.join("xx_XX.json"), "{ nope").unwrap();

        let ext_dir = tmp.path().join("Extensions").join("Steam");
        let ext_loc = ext_dir.join(EXTENSION_LOCALIZATION_DIR);
        std::fs::create_dir_all(&ext_loc).unwrap();
        std::fs::write(
            ext_loc.join(EXTENSION_BASE_FILE),
            r#"{"LOCSteamLogin": "Log in", "LOCSteamEmpty": "", "LOCSteamCount": 3}"#,
        )
        .unwrap();
        std::fs::write(ext_loc.join("de_DE.json"), r#"{"LOCSteamLogin": "Anmelden"}"#).unwrap();
        std::fs::write(ext_loc.join("fr_FR.json"), r#"{"LOCSteamLogin": "Connexion"}"#).unwrap();

        Fixture {
            _tmp: tmp,
            loc_dir,
            ext_dir,
        }
    }

    #[test]
    fn source_language_resolves_base() {
        let f = fixture();
        let loc = Localization::new(&f.loc_dir);
        assert_eq!(loc.current_language(), SOURCE_LANGUAGE);
        assert_eq!(loc.text("LOCSave"), "Save");
        assert_eq!(loc.locale().tag, "en-US");
    }

    #[test]
    fn language_layer_wins_and_empty_falls_through() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        loc.set_language("de_DE").unwrap();
        assert_eq!(loc.text("LOCSave"), "Speichern");
        assert_eq!(loc.text("LOCCancel"), "Cancel");
        assert_eq!(loc.locale().tag, "de-DE");
        assert_eq!(
            loc.overlay()
                .position(|o| matches!(o, LayerOrigin::Language(_))),
            Some(1)
        );
    }

    #[test]
    fn switching_replaces_the_previous_language() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        loc.set_language("de_DE").unwrap();
        loc.set_language("fr_FR").unwrap();
        assert_eq!(loc.text("LOCSave"), "Enregistrer");
        assert_eq!(loc.overlay().len(), 2);

        loc.set_language(SOURCE_LANGUAGE).unwrap();
        assert_eq!(loc.text("LOCSave"), "Save");
        assert_eq!(loc.overlay().len(), 1);
    }

    #[test]
    fn parse_error_keeps_previous_state() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        loc.set_language("de_DE").unwrap();
        let err = loc.set_language("xx_XX").unwrap_err();
        assert_eq!(err.path, f.loc_dir.join("xx_XX.json"));
        assert_eq!(loc.current_language(), "de_DE");
        assert_eq!(loc.text("LOCSave"), "Speichern");
    }

    #[test]
    fn missing_language_file_uses_source_strings_and_default_locale() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        loc.set_language("de_DE").unwrap();
        loc.set_language("it_IT").unwrap();
        assert_eq!(loc.current_language(), "it_IT");
        assert_eq!(loc.text("LOCSave"), "Save");
        assert_eq!(loc.locale().tag, "en-US");
    }

    #[test]
    fn extension_strings_layer_with_translation() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        loc.set_language("de_DE").unwrap();
        assert!(loc.load_extension_localization(&f.ext_dir).unwrap());
        assert!(!loc.load_extension_localization(&f.ext_dir).unwrap());

        assert_eq!(loc.text("LOCSteamLogin"), "Anmelden");
        assert_eq!(loc.resolve("LOCSteamEmpty"), None);
        assert_eq!(loc.resolve("LOCSteamCount"), None);
        assert_eq!(loc.text("LOCSave"), "Speichern");
    }

    #[test]
    fn language_change_rebuilds_extension_translations() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        loc.load_extension_localization(&f.ext_dir).unwrap();
        assert_eq!(loc.text("LOCSteamLogin"), "Log in");

        loc.set_language("fr_FR").unwrap();
        assert_eq!(loc.text("LOCSteamLogin"), "Connexion");
        let base = loc
            .overlay()
            .position(|o| matches!(o, LayerOrigin::ExtensionBase(_)))
            .unwrap();
        assert!(matches!(
            &loc.overlay().layers()[base + 1].origin,
            LayerOrigin::ExtensionTranslation { language, .. } if language == "fr_FR"
        ));

        loc.set_language(SOURCE_LANGUAGE).unwrap();
        assert_eq!(loc.text("LOCSteamLogin"), "Log in");
    }

    #[test]
    fn extension_without_base_is_a_no_op() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        let bare = f._tmp.path().join("Extensions").join("Bare");
        std::fs::create_dir_all(bare.join(EXTENSION_LOCALIZATION_DIR)).unwrap();
        assert!(!loc.load_extension_localization(&bare).unwrap());
        assert_eq!(loc.overlay().len(), 1);
    }

    #[test]
    fn broken_extension_base_leaves_overlay_intact() {
        let f = fixture();
        let mut loc = Localization::new(&f.loc_dir);
        let broken = f._tmp.path().join("Extensions").join("Broken");
        let dir = broken.join(EXTENSION_LOCALIZATION_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(EXTENSION_BASE_FILE), "[").unwrap();
        assert!(loc.load_extension_localization(&broken).is_err());
        assert_eq!(loc.overlay().len(), 1);
    }

    #[test]
    fn misses_return_key_and_are_recorded_once() {
        let f = fixture();
        let loc = Localization::new(&f.loc_dir);
        assert_eq!(loc.text("LOCNope"), "LOCNope");
        assert_eq!(loc.text("LOCNope"), "LOCNope");
        assert_eq!(loc.text("LOCAlso"), "LOCAlso");
        assert_eq!(loc.missing_keys(), vec!["LOCAlso", "LOCNope"]);
    }
}
