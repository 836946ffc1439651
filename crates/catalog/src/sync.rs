//! Background catalog fetches applied on the owning task.
//!
//! Each `open_view` bumps a generation counter and spawns a fetch tagged with
//! it. Results come back over a channel and are applied only while their
//! generation is still the active view's; anything older is dropped.

use std::sync::Arc;

use {
    gamedock_extensions::ExtensionKind,
    tokio::sync::mpsc,
    tracing::{debug, warn},
};

use crate::{client::CatalogClient, error::Result, types::CatalogEntry};

/// A finished fetch on its way back to the owner.
#[derive(Debug)]
pub struct CatalogUpdate {
    pub generation: u64,
    pub result: Result<Vec<CatalogEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveView {
    kind: Option<ExtensionKind>,
    generation: u64,
}

pub struct CatalogSync {
    client: Arc<CatalogClient>,
    entries: Vec<CatalogEntry>,
    generation: u64,
    view: Option<ActiveView>,
    loading: bool,
    tx: mpsc::UnboundedSender<CatalogUpdate>,
    rx: mpsc::UnboundedReceiver<CatalogUpdate>,
}

impl CatalogSync {
    pub fn new(client: CatalogClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(client),
            entries: Vec::new(),
            generation: 0,
            view: None,
            loading: false,
            tx,
            rx,
        }
    }

    /// Activate a browsing view (optionally limited to one kind) and start a
    /// fetch in the background. Must be called inside a tokio runtime.
    pub fn open_view(&mut self, kind: Option<ExtensionKind>) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.view = Some(ActiveView { kind, generation });
        self.loading = true;

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch().await;
            // The receiver lives as long as the owner; a send error means it is gone.
            let _ = tx.send(CatalogUpdate { generation, result });
        });
        debug!(generation, ?kind, "catalog view opened");
        generation
    }

    /// Leave the view. Fetches still in flight will be discarded on arrival.
    pub fn close_view(&mut self) {
        self.generation += 1;
        self.view = None;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_open(&self) -> bool {
        self.view.is_some()
    }

    /// Entries of the last successful fetch, filtered to the open view's kind.
    pub fn entries(&self) -> Vec<&CatalogEntry> {
        let kind = self.view.and_then(|v| v.kind);
        self.entries
            .iter()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .collect()
    }

    /// Apply every result that has already arrived. Returns `true` if the
    /// list changed.
    pub fn apply_pending(&mut self) -> bool {
        let mut changed = false;
        while let Ok(update) = self.rx.try_recv() {
            changed |= self.apply(update);
        }
        changed
    }

    /// Wait for the next result and apply it. Returns `true` if the list changed.
    ///
    /// Returns `false` at once when no fetch for the current view is outstanding.
    pub async fn next_update(&mut self) -> bool {
        if !self.loading {
            return false;
        }
        match self.rx.recv().await {
            Some(update) => self.apply(update),
            None => false,
        }
    }

    fn apply(&mut self, update: CatalogUpdate) -> bool {
        let current = self.view.map(|v| v.generation);
        if current != Some(update.generation) {
            debug!(
                generation = update.generation,
                ?current,
                "discarding stale catalog result"
            );
            return false;
        }
        self.loading = false;
        match update.result {
            Ok(entries) => {
                self.entries = entries;
                true
            },
            Err(e) => {
                warn!(error = %e, kept = self.entries.len(), "catalog fetch failed, keeping previous list");
                false
            },
        }
    }
}
