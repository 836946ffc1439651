//! CLI commands for installed extensions and themes.

use {
    anyhow::Result,
    clap::Subcommand,
    gamedock_config::ThemeMode,
    gamedock_extensions::{InstalledExtension, InstalledTheme},
    gamedock_i18n::Localization,
};

use crate::startup::{self, Host};

#[derive(Subcommand)]
pub enum ExtensionAction {
    /// List installed extensions by category.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Enable an extension (takes effect after restart).
    Enable { id: String },
    /// Disable an extension (takes effect after restart).
    Disable { id: String },
    /// Remove an extension or theme on the next start.
    Uninstall { id: String },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// List installed themes.
    List,
    /// Select the theme for a mode (desktop or fullscreen).
    Select { mode: ThemeMode, id: String },
}

pub fn handle_extensions(action: ExtensionAction) -> Result<()> {
    let mut host = startup::boot()?;

    match action {
        ExtensionAction::List { json } => list(&host, json),
        ExtensionAction::Enable { id } => set_enabled(&mut host, &id, true)?,
        ExtensionAction::Disable { id } => set_enabled(&mut host, &id, false)?,
        ExtensionAction::Uninstall { id } => {
            if host.session.request_uninstall(&id)? {
                println!("'{id}' will be removed the next time gamedock starts.");
            } else {
                println!("'{id}' is already queued for removal.");
            }
        },
    }
    Ok(())
}

pub fn handle_themes(action: ThemeAction) -> Result<()> {
    let mut host = startup::boot()?;

    match action {
        ThemeAction::List => {
            let installed = host.session.installed();
            print_themes("Desktop themes", &installed.desktop_themes);
            print_themes("Fullscreen themes", &installed.fullscreen_themes);
        },
        ThemeAction::Select { mode, id } => {
            if host.session.select_theme(mode, &id)? {
                println!("Selected {mode} theme '{id}'. Restart gamedock to apply.");
            } else {
                println!("'{id}' is already the {mode} theme.");
            }
        },
    }
    Ok(())
}

fn set_enabled(host: &mut Host, id: &str, enabled: bool) -> Result<()> {
    host.session.set_enabled(id, enabled)?;
    let selections = host.session.selections();
    let outcome = host.session.reconcile(&selections)?;
    if !outcome.changed {
        println!("No change.");
    } else if host.session.restart_required() {
        println!("Saved. Restart gamedock to apply.");
    } else {
        println!("Saved.");
    }
    Ok(())
}

fn list(host: &Host, json: bool) {
    let installed = host.session.installed();
    let groups = [
        ("Library connectors", &installed.library_connectors),
        ("Metadata providers", &installed.metadata_providers),
        ("Other plugins", &installed.other_plugins),
    ];

    if json {
        let entries: Vec<serde_json::Value> = installed
            .plugins()
            .map(|e| {
                serde_json::json!({
                    "id": e.descriptor.id,
                    "name": e.descriptor.name,
                    "kind": e.descriptor.kind.as_str(),
                    "version": e.descriptor.version,
                    "path": e.descriptor.directory,
                    "enabled": e.enabled,
                    "loaded": e.is_loaded(),
                    "error": e.failure.as_ref().map(ToString::to_string),
                    "pending_removal": e.pending_removal,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).unwrap_or_default()
        );
        return;
    }

    for (title, list) in groups {
        println!("{title}:");
        if list.is_empty() {
            println!("  (none)");
        }
        for entry in list {
            println!("  {}", describe(entry, &host.localization));
        }
    }

    let errors = &host.session.scan_report().errors;
    if !errors.is_empty() {
        println!("Unreadable manifests:");
        for err in errors {
            println!("  {err}");
        }
    }
}

fn describe(entry: &InstalledExtension, localization: &Localization) -> String {
    let label = |key: &str, fallback: &'static str| {
        localization.resolve(key).unwrap_or(fallback).to_string()
    };
    let status = if entry.pending_removal {
        label("LOCExtensionPendingRemoval", "pending removal")
    } else if let Some(err) = &entry.failure {
        format!("{}: {err}", label("LOCExtensionLoadFailed", "failed"))
    } else if !entry.enabled {
        label("LOCExtensionDisabled", "disabled")
    } else if entry.is_loaded() {
        label("LOCExtensionLoaded", "loaded")
    } else {
        String::new()
    };
    let d = &entry.descriptor;
    format!("{} ({}) {} [{}]", d.name, d.id, d.version, status)
}

fn print_themes(title: &str, themes: &[InstalledTheme]) {
    println!("{title}:");
    if themes.is_empty() {
        println!("  (none)");
    }
    for theme in themes {
        let marker = if theme.selected {
            "*"
        } else {
            " "
        };
        let pending = if theme.pending_removal {
            " (pending removal)"
        } else {
            ""
        };
        let incompatible = if theme.compatible {
            ""
        } else {
            " (incompatible)"
        };
        println!(
            "  {marker} {} ({}) {}{pending}{incompatible}",
            theme.descriptor.name, theme.descriptor.id, theme.descriptor.version
        );
    }
}
