//! JSON string dictionaries.

use std::{collections::HashMap, path::Path};

use {serde_json::Value, tracing::debug};

use crate::error::{LocalizationParseError, Result};

/// Reserved key carrying a language's own display name.
pub const LANGUAGE_NAME_KEY: &str = "LanguageName";

/// Which entries survive loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter {
    /// Host language files: untranslated (empty) strings are dropped, other
    /// scalars are kept as text.
    Language,
    /// Extension files: only non-empty strings are kept.
    Extension,
    /// Host base strings: every scalar is kept.
    Base,
}

pub type Dictionary = HashMap<String, String>;

pub fn load_dictionary(path: &Path, filter: EntryFilter) -> Result<Dictionary> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LocalizationParseError::new(path, format!("unreadable: {e}")))?;
    parse_dictionary(&content, path, filter)
}

pub fn parse_dictionary(content: &str, path: &Path, filter: EntryFilter) -> Result<Dictionary> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| LocalizationParseError::new(path, e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(LocalizationParseError::new(
            path,
            "expected a JSON object of key/value pairs",
        ));
    };

    let total = map.len();
    let dictionary: Dictionary = map
        .into_iter()
        .filter_map(|(key, value)| keep(value, filter).map(|v| (key, v)))
        .collect();
    if dictionary.len() != total {
        debug!(
            path = %path.display(),
            dropped = total - dictionary.len(),
            "dropped untranslated or non-text entries"
        );
    }
    Ok(dictionary)
}

fn keep(value: Value, filter: EntryFilter) -> Option<String> {
    match (value, filter) {
        (Value::String(s), EntryFilter::Base) => Some(s),
        (Value::String(s), EntryFilter::Language | EntryFilter::Extension) => {
            (!s.is_empty()).then_some(s)
        },
        (Value::Number(n), EntryFilter::Language | EntryFilter::Base) => Some(n.to_string()),
        (Value::Bool(b), EntryFilter::Language | EntryFilter::Base) => Some(b.to_string()),
        (Value::Number(_) | Value::Bool(_), EntryFilter::Extension)
        | (Value::Null | Value::Array(_) | Value::Object(_), _) => None,
    }
}
