use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, persist::write_atomic, schema::GamedockConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "gamedock.toml",
    "gamedock.yaml",
    "gamedock.yml",
    "gamedock.json",
];

const APP_NAME: &str = "gamedock";

static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);
static DATA_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Override the config directory (e.g. from `--config-dir`).
pub fn set_config_dir(path: PathBuf) {
    *CONFIG_DIR_OVERRIDE
        .write()
        .unwrap_or_else(|e| e.into_inner()) = Some(path);
}

/// Override the data directory (e.g. from `--data-dir`).
pub fn set_data_dir(path: PathBuf) {
    *DATA_DIR_OVERRIDE.write().unwrap_or_else(|e| e.into_inner()) = Some(path);
}

/// Returns the user-global config directory (`~/.config/gamedock/`), or the override.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return Some(dir);
    }
    directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory holding extensions, themes, and queue files.
///
/// Falls back to `./.gamedock` when no home directory can be determined.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = DATA_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return dir;
    }
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".gamedock"))
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<GamedockConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./gamedock.{toml,yaml,yml,json}` (project-local)
/// 2. `<config_dir>/gamedock.{toml,yaml,yml,json}` (user-global)
///
/// Returns `GamedockConfig::default()` if no config file is found or it fails to parse.
pub fn discover_and_load() -> GamedockConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    GamedockConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    // An explicit config dir wins over the working directory.
    let overridden = CONFIG_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .is_some();
    if !overridden {
        for name in CONFIG_FILENAMES {
            let p = PathBuf::from(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gamedock.toml")
}

/// Serialize `config` in the format implied by `path`'s extension and write it atomically.
pub fn save_config_to(config: &GamedockConfig, path: &Path) -> anyhow::Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let serialized = match ext {
        "toml" => toml::to_string_pretty(config)
            .map_err(|e| anyhow::anyhow!("serialize config: {e}"))?,
        "yaml" | "yml" => serde_yaml::to_string(config)?,
        "json" => serde_json::to_string_pretty(config)?,
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    };
    write_atomic(path, serialized)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Load the config at `path` (default if missing), apply `f`, and save it back.
///
/// The closure returns whether it changed anything; unchanged configs are not written.
pub fn update_config<F>(path: &Path, f: F) -> anyhow::Result<bool>
where
    F: FnOnce(&mut GamedockConfig) -> bool,
{
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        GamedockConfig::default()
    };
    if !f(&mut config) {
        return Ok(false);
    }
    save_config_to(&config, path)?;
    Ok(true)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<GamedockConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
