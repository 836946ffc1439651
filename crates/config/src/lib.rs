//! Configuration loading, env substitution, directory resolution and atomic
//! persistence for the gamedock host.
//!
//! Config files: `gamedock.toml`, `gamedock.yaml`, or `gamedock.json`
//! Searched in `./` then `~/.config/gamedock/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution in the raw text.

pub mod env_subst;
pub mod loader;
pub mod persist;
pub mod schema;

pub use {
    loader::{
        config_dir, data_dir, discover_and_load, find_or_default_config_path, load_config,
        save_config_to, set_config_dir, set_data_dir, update_config,
    },
    persist::write_atomic,
    schema::{
        CatalogConfig, GamedockConfig, PathsConfig, SOURCE_LANGUAGE, ThemeMode, ThemesConfig,
    },
};
