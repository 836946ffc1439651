use {
    gamedock_extensions::ExtensionKind,
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::warn,
};

use crate::error::{CatalogError, Result};

/// One publishable add-on from the online catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub kind: ExtensionKind,
    pub author: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Wire shape. Both camel and Pascal case keys are seen in the wild.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(alias = "Id", alias = "addonId", alias = "AddonId")]
    id: Option<String>,
    #[serde(alias = "Name")]
    name: Option<String>,
    #[serde(alias = "Type", alias = "type", alias = "Kind")]
    kind: Option<String>,
    #[serde(alias = "Author")]
    author: Option<String>,
    #[serde(alias = "Version")]
    version: Option<String>,
    #[serde(alias = "Description", alias = "ShortDescription", alias = "shortDescription")]
    description: Option<String>,
}

/// Accepts a bare array or `{"addons": [...]}`. Invalid entries are skipped.
pub fn parse_entries(payload: Value) -> Result<Vec<CatalogEntry>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("addons") {
            Some(Value::Array(items)) => items,
            _ => return Err(CatalogError::malformed("object without an 'addons' array")),
        },
        other => {
            return Err(CatalogError::malformed(format!(
                "expected a list, got {}",
                type_name(&other)
            )));
        },
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match validate(item) {
            Ok(entry) => entries.push(entry),
            Err(reason) => warn!(index, %reason, "skipping catalog entry"),
        }
    }
    Ok(entries)
}

fn validate(item: Value) -> std::result::Result<CatalogEntry, String> {
    let raw: RawEntry = serde_json::from_value(item).map_err(|e| e.to_string())?;
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let id = non_blank(raw.id).ok_or("missing id")?;
    let name = non_blank(raw.name).ok_or_else(|| format!("'{id}' has no name"))?;
    let kind = non_blank(raw.kind)
        .ok_or_else(|| format!("'{id}' has no kind"))?
        .parse::<ExtensionKind>()?;
    Ok(CatalogEntry {
        id,
        name,
        kind,
        author: non_blank(raw.author),
        version: non_blank(raw.version),
        description: non_blank(raw.description),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
