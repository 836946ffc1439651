//! Persisted enablement state and the reconciler that writes it.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use {
    gamedock_config::{ThemeMode, load_config, update_config},
    serde::{Deserialize, Serialize},
    tracing::{debug, info},
};

use crate::{
    error::{Error, Result},
    types::ExtensionKind,
};

/// Identifiers of extensions the user has turned off. Order-independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisabledIdSet(BTreeSet<String>);

impl DisabledIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Sorted, for persistence.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for DisabledIdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The host settings this subsystem reads and writes.
pub trait SettingsStore: Send + Sync {
    fn disabled_ids(&self) -> Result<DisabledIdSet>;

    fn save_disabled_ids(&self, ids: &DisabledIdSet) -> Result<()>;

    fn selected_theme(&self, mode: ThemeMode) -> Result<Option<String>>;

    fn save_selected_theme(&self, mode: ThemeMode, id: &str) -> Result<()>;
}

/// [`SettingsStore`] backed by the host config file.
pub struct ConfigSettingsStore {
    path: PathBuf,
}

impl ConfigSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<gamedock_config::GamedockConfig> {
        if !self.path.exists() {
            return Ok(Default::default());
        }
        load_config(&self.path)
            .map_err(|e| Error::settings(format!("reading {}", self.path.display()), e))
    }
}

impl SettingsStore for ConfigSettingsStore {
    fn disabled_ids(&self) -> Result<DisabledIdSet> {
        Ok(self.read()?.disabled_extensions.into_iter().collect())
    }

    fn save_disabled_ids(&self, ids: &DisabledIdSet) -> Result<()> {
        update_config(&self.path, |cfg| {
            cfg.disabled_extensions = ids.to_vec();
            true
        })
        .map_err(|e| Error::settings(format!("writing {}", self.path.display()), e))?;
        Ok(())
    }

    fn selected_theme(&self, mode: ThemeMode) -> Result<Option<String>> {
        Ok(self.read()?.themes.selected(mode).map(str::to_string))
    }

    fn save_selected_theme(&self, mode: ThemeMode, id: &str) -> Result<()> {
        update_config(&self.path, |cfg| cfg.themes.select(mode, id))
            .map_err(|e| Error::settings(format!("writing {}", self.path.display()), e))?;
        Ok(())
    }
}

/// One row of the user's enable/disable choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub kind: ExtensionKind,
    pub selected: bool,
}

/// Outcome of [`EnablementReconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub disabled: DisabledIdSet,
    /// `true` when the persisted set was rewritten.
    pub changed: bool,
}

/// Computes the disabled set from a selection and persists it only on change.
pub struct EnablementReconciler<S> {
    store: S,
}

impl<S: SettingsStore> EnablementReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every unselected plugin id becomes disabled. Theme rows are ignored:
    /// themes use the single-choice selection instead.
    pub fn compute(selections: &[Selection]) -> DisabledIdSet {
        selections
            .iter()
            .filter(|s| match s.kind {
                ExtensionKind::LibraryConnector
                | ExtensionKind::MetadataProvider
                | ExtensionKind::GenericPlugin
                | ExtensionKind::Script => !s.selected,
                ExtensionKind::ThemeDesktop | ExtensionKind::ThemeFullscreen => false,
            })
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn reconcile(&self, selections: &[Selection]) -> Result<ReconcileOutcome> {
        let disabled = Self::compute(selections);
        let current = self.store.disabled_ids()?;
        if current == disabled {
            debug!(count = disabled.len(), "disabled extensions unchanged");
            return Ok(ReconcileOutcome {
                disabled,
                changed: false,
            });
        }
        self.store.save_disabled_ids(&disabled)?;
        info!(count = disabled.len(), "disabled extensions updated");
        Ok(ReconcileOutcome {
            disabled,
            changed: true,
        })
    }
}
