mod catalog_commands;
mod extension_commands;
mod language_commands;
mod startup;

use {
    clap::{Parser, Subcommand},
    gamedock_extensions::ExtensionKind,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "gamedock", about = "gamedock: extensions, themes and languages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom config directory (overrides default ~/.config/gamedock/).
    #[arg(long, global = true, env = "GAMEDOCK_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
    /// Custom data directory (extensions, themes, localization, queue).
    #[arg(long, global = true, env = "GAMEDOCK_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the host and report what was loaded (default).
    Start,
    /// Installed extension management.
    Extensions {
        #[command(subcommand)]
        action: extension_commands::ExtensionAction,
    },
    /// Theme selection.
    Themes {
        #[command(subcommand)]
        action: extension_commands::ThemeAction,
    },
    /// UI language management.
    Languages {
        #[command(subcommand)]
        action: language_commands::LanguageAction,
    },
    /// Resolve a text resource key in the configured language.
    Text { key: String },
    /// Browse the online add-on catalog.
    Catalog {
        /// Only show add-ons of this kind (e.g. GameLibrary, Script, DesktopTheme).
        #[arg(long)]
        kind: Option<ExtensionKind>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn start() -> anyhow::Result<()> {
    let host = startup::boot()?;
    let outcome = host.session.load_outcome();
    let sweep = host.session.sweep_report();

    for (id, err) in &outcome.failed {
        warn!(id, error = %err, "extension unavailable this session");
    }
    info!(
        loaded = outcome.loaded.len(),
        failed = outcome.failed.len(),
        uninstalled = sweep.applied.len(),
        uninstall_pending = sweep.retained.len(),
        language = host.localization.current_language(),
        locale = %host.localization.locale().tag,
        "gamedock ready"
    );
    println!(
        "{} extension(s) loaded, {} failed, {} removed.",
        outcome.loaded.len(),
        outcome.failed.len(),
        sweep.applied.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "gamedock starting");

    // Apply directory overrides before anything loads config.
    if let Some(ref dir) = cli.config_dir {
        gamedock_config::set_config_dir(dir.clone());
    }
    if let Some(ref dir) = cli.data_dir {
        gamedock_config::set_data_dir(dir.clone());
    }

    match cli.command {
        None | Some(Commands::Start) => start(),
        Some(Commands::Extensions { action }) => extension_commands::handle_extensions(action),
        Some(Commands::Themes { action }) => extension_commands::handle_themes(action),
        Some(Commands::Languages { action }) => language_commands::handle_languages(action),
        Some(Commands::Text { key }) => language_commands::handle_text(&key),
        Some(Commands::Catalog { kind }) => catalog_commands::handle_catalog(kind).await,
    }
}
