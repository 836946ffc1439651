//! CLI commands for UI languages and text lookup.

use {
    anyhow::{Context, Result},
    clap::Subcommand,
    gamedock_config::{SOURCE_LANGUAGE, update_config},
    gamedock_i18n::Localization,
};

use crate::startup;

#[derive(Subcommand)]
pub enum LanguageAction {
    /// List available UI languages with translation coverage.
    List,
    /// Set the UI language.
    Set { id: String },
}

pub fn handle_languages(action: LanguageAction) -> Result<()> {
    let host = startup::boot()?;

    match action {
        LanguageAction::List => {
            let current = host.localization.current_language();
            for language in host.localization.available_languages() {
                let marker = if language.id == current {
                    "*"
                } else {
                    " "
                };
                println!("  {marker} {language}");
            }
        },
        LanguageAction::Set { id } => {
            let known = host
                .localization
                .available_languages()
                .iter()
                .any(|l| l.id == id);
            if !known {
                anyhow::bail!("unknown language '{id}' (see `gamedock languages list`)");
            }

            // Parse before persisting so a broken file is never selected.
            let mut probe = Localization::new(host.localization.dir());
            probe
                .set_language(&id)
                .with_context(|| format!("language '{id}' cannot be loaded"))?;

            let changed = update_config(&host.config_path, |cfg| {
                if cfg.language == id {
                    return false;
                }
                cfg.language = id.clone();
                true
            })?;
            if changed {
                let name = if id == SOURCE_LANGUAGE {
                    "English"
                } else {
                    probe.resolve("LanguageName").unwrap_or(id.as_str())
                };
                println!("Language set to {name}. Restart gamedock to apply.");
            } else {
                println!("Language is already '{id}'.");
            }
        },
    }
    Ok(())
}

/// Print the resolved text for `key` in the configured language.
pub fn handle_text(key: &str) -> Result<()> {
    let host = startup::boot()?;
    println!("{}", host.localization.text(key));
    for missing in host.localization.missing_keys() {
        eprintln!("missing translation: {missing}");
    }
    Ok(())
}
