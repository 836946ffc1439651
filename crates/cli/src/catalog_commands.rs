//! CLI command for browsing the online add-on catalog.

use {
    anyhow::Result,
    gamedock_catalog::{CatalogClient, CatalogSync},
    gamedock_extensions::ExtensionKind,
};

pub async fn handle_catalog(kind: Option<ExtensionKind>) -> Result<()> {
    let config = gamedock_config::discover_and_load();
    let client = CatalogClient::from_config(&config.catalog)?;

    let mut sync = CatalogSync::new(client);
    sync.open_view(kind);
    // Failures are logged by the sync and leave the list empty.
    sync.next_update().await;

    let entries = sync.entries();
    if entries.is_empty() {
        println!("No add-ons available.");
        return Ok(());
    }
    for entry in entries {
        let author = entry
            .author
            .as_deref()
            .map(|a| format!(" by {a}"))
            .unwrap_or_default();
        println!("  {} ({}) [{}]{author}", entry.name, entry.id, entry.kind);
        if let Some(desc) = &entry.description {
            println!("      {desc}");
        }
    }
    Ok(())
}
