//! Extension and theme manifest parsing.
//!
//! Every extension directory carries exactly one YAML manifest:
//! ```text
//! # extension.yaml
//! Id: GogLibrary_Builtin
//! Name: GOG
//! Author: gamedock
//! Version: 2.1
//! Module: GogLibrary.dll
//! Type: GameLibrary
//! HostApi: ">=6.0.0, <7.0.0"
//!
//! # theme.yaml
//! Id: Harmony_d49ef7bc
//! Name: Harmony
//! Version: 1.4
//! Mode: Desktop
//! ThemeApiVersion: 2.5.0
//! ```

use std::path::{Path, PathBuf};

use {
    gamedock_config::ThemeMode,
    semver::VersionReq,
    serde::Deserialize,
    serde_yaml::Value,
};

use crate::{
    error::ManifestParseError,
    types::{ExtensionDescriptor, ExtensionKind},
};

pub const EXTENSION_MANIFEST: &str = "extension.yaml";
pub const THEME_MANIFEST: &str = "theme.yaml";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawExtensionManifest {
    id: Option<String>,
    name: Option<String>,
    author: Option<String>,
    version: Option<Value>,
    module: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
    icon: Option<String>,
    host_api: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawThemeManifest {
    id: Option<String>,
    name: Option<String>,
    author: Option<String>,
    version: Option<Value>,
    mode: Option<String>,
    theme_api_version: Option<String>,
}

/// Locate the manifest inside `dir`. Extension manifests win over theme manifests.
pub fn manifest_in(dir: &Path) -> Option<PathBuf> {
    [EXTENSION_MANIFEST, THEME_MANIFEST]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Read and parse the manifest at `manifest_path`, dispatching on its file name.
pub fn read_manifest(manifest_path: &Path) -> Result<ExtensionDescriptor, ManifestParseError> {
    let content = std::fs::read_to_string(manifest_path)
        .map_err(|e| ManifestParseError::new(manifest_path, format!("unreadable: {e}")))?;
    let is_theme = manifest_path
        .file_name()
        .is_some_and(|n| n == THEME_MANIFEST);
    if is_theme {
        parse_theme_manifest(&content, manifest_path)
    } else {
        parse_extension_manifest(&content, manifest_path)
    }
}

/// Parse an `extension.yaml` body.
pub fn parse_extension_manifest(
    content: &str,
    manifest_path: &Path,
) -> Result<ExtensionDescriptor, ManifestParseError> {
    let raw: RawExtensionManifest = serde_yaml::from_str(content)
        .map_err(|e| ManifestParseError::new(manifest_path, e.to_string()))?;

    let id = required(raw.id, "Id", manifest_path)?;
    let name = required(raw.name, "Name", manifest_path)?;
    let version = version_string(raw.version, manifest_path)?;
    let kind_raw = required(raw.kind, "Type", manifest_path)?;
    let kind: ExtensionKind = kind_raw
        .parse()
        .map_err(|e: String| ManifestParseError::new(manifest_path, e))?;
    if kind.is_theme() {
        return Err(ManifestParseError::new(
            manifest_path,
            format!("themes must use {THEME_MANIFEST}, found Type '{kind_raw}'"),
        ));
    }
    let host_compat = raw
        .host_api
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_requirement(&s, manifest_path))
        .transpose()?;

    Ok(ExtensionDescriptor {
        id,
        name,
        author: non_blank(raw.author),
        kind,
        version,
        module: non_blank(raw.module),
        icon: non_blank(raw.icon),
        host_compat,
        directory: parent_dir(manifest_path),
        manifest_path: manifest_path.to_path_buf(),
    })
}

/// Parse a `theme.yaml` body.
pub fn parse_theme_manifest(
    content: &str,
    manifest_path: &Path,
) -> Result<ExtensionDescriptor, ManifestParseError> {
    let raw: RawThemeManifest = serde_yaml::from_str(content)
        .map_err(|e| ManifestParseError::new(manifest_path, e.to_string()))?;

    let id = required(raw.id, "Id", manifest_path)?;
    let name = required(raw.name, "Name", manifest_path)?;
    let version = version_string(raw.version, manifest_path)?;
    let mode: ThemeMode = required(raw.mode, "Mode", manifest_path)?
        .parse()
        .map_err(|e: String| ManifestParseError::new(manifest_path, e))?;
    // A theme built against API x.y.z runs on any host theme API ^x.y.z.
    let host_compat = raw
        .theme_api_version
        .filter(|s| !s.trim().is_empty())
        .map(|v| parse_requirement(&format!("^{}", v.trim()), manifest_path))
        .transpose()?;

    Ok(ExtensionDescriptor {
        id,
        name,
        author: non_blank(raw.author),
        kind: ExtensionKind::from_theme_mode(mode),
        version,
        module: None,
        icon: None,
        host_compat,
        directory: parent_dir(manifest_path),
        manifest_path: manifest_path.to_path_buf(),
    })
}

fn required(
    value: Option<String>,
    field: &str,
    manifest_path: &Path,
) -> Result<String, ManifestParseError> {
    non_blank(value).ok_or_else(|| {
        ManifestParseError::new(manifest_path, format!("missing required field '{field}'"))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Versions are free-form (`1.0`, `2.1.3`); YAML may hand them over as numbers.
fn version_string(value: Option<Value>, manifest_path: &Path) -> Result<String, ManifestParseError> {
    let version = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(ManifestParseError::new(
                manifest_path,
                format!("field 'Version' must be a string or number, got {other:?}"),
            ));
        },
        None => String::new(),
    };
    if version.is_empty() {
        return Err(ManifestParseError::new(
            manifest_path,
            "missing required field 'Version'",
        ));
    }
    Ok(version)
}

fn parse_requirement(raw: &str, manifest_path: &Path) -> Result<VersionReq, ManifestParseError> {
    VersionReq::parse(raw.trim()).map_err(|e| {
        ManifestParseError::new(
            manifest_path,
            format!("invalid host compatibility range '{raw}': {e}"),
        )
    })
}

fn parent_dir(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
