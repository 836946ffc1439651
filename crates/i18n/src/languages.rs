//! Listing the UI languages shipped in the localization directory.

use std::{
    collections::HashMap,
    fmt,
    path::Path,
    sync::LazyLock,
};

use {
    gamedock_config::SOURCE_LANGUAGE,
    regex::Regex,
    tracing::{debug, warn},
    unicode_normalization::{UnicodeNormalization, char::is_combining_mark},
};

use crate::dictionary::{EntryFilter, LANGUAGE_NAME_KEY, load_dictionary};

/// Translation coverage file inside the localization directory.
pub const COVERAGE_FILE: &str = "locstatus.json";

// Literal pattern, cannot fail.
#[allow(clippy::unwrap_used)]
static LOCALE_FILE_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+_[a-zA-Z]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: String,
    pub name: String,
    /// `None` when no coverage is known (always for the source language).
    pub translated_percentage: Option<u8>,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.translated_percentage {
            Some(pct) => write!(f, "{}   ({}, {pct}%)", self.name, self.id),
            None => f.write_str(&self.name),
        }
    }
}

/// The source language plus every `xx_YY.json` in `dir` that parses, sorted by name.
pub fn available_languages(dir: &Path, coverage_file: &Path) -> Vec<Language> {
    let mut languages = vec![Language {
        id: SOURCE_LANGUAGE.to_string(),
        name: "English".to_string(),
        translated_percentage: None,
    }];

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "no localization directory");
            return languages;
        },
    };
    let coverage = read_coverage(coverage_file);

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !LOCALE_FILE_STEM.is_match(id) {
            continue;
        }
        let dictionary = match load_dictionary(&path, EntryFilter::Language) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "skipping language");
                continue;
            },
        };
        let name = dictionary
            .get(LANGUAGE_NAME_KEY)
            .cloned()
            .unwrap_or_else(|| id.to_string());
        languages.push(Language {
            id: id.to_string(),
            name,
            translated_percentage: coverage_for(&coverage, id),
        });
    }

    languages.sort_by_cached_key(|l| (collation_key(&l.name), l.name.clone()));
    languages
}

/// Case- and accent-insensitive sort key, so "Čeština" sorts with the C's.
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Coverage is keyed `xx-YY`, with a bare `xx` fallback.
fn coverage_for(coverage: &HashMap<String, u8>, id: &str) -> Option<u8> {
    let dashed = id.replace('_', "-");
    coverage.get(&dashed).copied().or_else(|| {
        id.split('_')
            .next()
            .and_then(|lang| coverage.get(lang).copied())
    })
}

fn read_coverage(path: &Path) -> HashMap<String, u8> {
    let Ok(content) = std::fs::read_to_string(path) else {
        debug!(path = %path.display(), "no translation coverage file");
        return HashMap::new();
    };
    match serde_json::from_str::<HashMap<String, u8>>(&content) {
        Ok(map) => map,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed coverage file");
            HashMap::new()
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_source_language_when_dir_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let langs = available_languages(&tmp.path().join("none"), &tmp.path().join("c.json"));
        assert_eq!(langs.len(), 1);
        assert_eq!(langs[0].id, SOURCE_LANGUAGE);
        assert_eq!(langs[0].to_string(), "English");
    }

    #[test]
    fn lists_parsed_languages_with_coverage() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("de_DE.json"), r#"{"LanguageName": "Deutsch"}"#).unwrap();
        std::fs::write(dir.join("pt_BR.json"), r#"{"LanguageName": "Português"}"#).unwrap();
        std::fs::write(dir.join("cs_CZ.json"), r#"{"LanguageName": "Čeština"}"#).unwrap();
        std::fs::write(dir.join("fr_FR.json"), "{ broken").unwrap();
        std::fs::write(dir.join("english.json"), r#"{"LOCSave": "Save"}"#).unwrap();
        std::fs::write(dir.join("notes.txt"), "x").unwrap();
        let coverage = dir.join(COVERAGE_FILE);
        std::fs::write(&coverage, r#"{"de-DE": 97, "pt": 40}"#).unwrap();

        let langs = available_languages(dir, &coverage);
        let ids: Vec<_> = langs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["cs_CZ", "de_DE", "english", "pt_BR"]);

        let de = &langs[1];
        assert_eq!(de.translated_percentage, Some(97));
        assert_eq!(de.to_string(), "Deutsch   (de_DE, 97%)");
        assert_eq!(langs[3].translated_percentage, Some(40));
        assert_eq!(langs[0].translated_percentage, None);
    }

    #[test]
    fn sorting_ignores_case_and_accents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("sv_SE.json"), r#"{"LanguageName": "svenska"}"#).unwrap();
        std::fs::write(dir.join("es_ES.json"), r#"{"LanguageName": "Español"}"#).unwrap();
        std::fs::write(dir.join("el_GR.json"), r#"{"LanguageName": "Ελληνικά"}"#).unwrap();
        std::fs::write(dir.join("tr_TR.json"), r#"{"LanguageName": "Türkçe"}"#).unwrap();
        std::fs::write(dir.join("pl_PL.json"), r#"{"LanguageName": "Polski"}"#).unwrap();

        let langs = available_languages(dir, &dir.join(COVERAGE_FILE));
        let names: Vec<_> = langs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec![
            "English", "Español", "Polski", "svenska", "Türkçe", "Ελληνικά"
        ]);
    }

    #[test]
    fn collation_key_folds_case_and_marks() {
        assert_eq!(collation_key("Čeština"), "cestina");
        assert_eq!(collation_key("Português"), "portugues");
        assert_eq!(collation_key("DEUTSCH"), "deutsch");
    }
}
