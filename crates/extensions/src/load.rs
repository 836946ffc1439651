//! Instantiating enabled extensions with per-extension failure isolation.

use std::{
    collections::BTreeMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use {
    semver::Version,
    tracing::{debug, info, warn},
};

use crate::{enablement::DisabledIdSet, error::ExtensionLoadError, types::ExtensionDescriptor};

/// A live, initialized extension.
pub trait ExtensionInstance: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;
}

/// Creates runtime instances from descriptors.
pub trait ExtensionFactory: Send + Sync {
    fn instantiate(
        &self,
        descriptor: &ExtensionDescriptor,
    ) -> anyhow::Result<Arc<dyn ExtensionInstance>>;
}

/// A descriptor paired with its live instance.
#[derive(Debug, Clone)]
pub struct LoadedExtension {
    pub descriptor: ExtensionDescriptor,
    pub instance: Arc<dyn ExtensionInstance>,
}

/// Every attempted descriptor lands in exactly one of `loaded` / `failed`.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub loaded: BTreeMap<String, LoadedExtension>,
    pub failed: BTreeMap<String, ExtensionLoadError>,
}

impl LoadOutcome {
    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.contains_key(id)
    }

    pub fn failure(&self, id: &str) -> Option<&ExtensionLoadError> {
        self.failed.get(id)
    }
}

pub struct LoadCoordinator<'a> {
    factory: &'a dyn ExtensionFactory,
    host_api: Version,
}

impl<'a> LoadCoordinator<'a> {
    pub fn new(factory: &'a dyn ExtensionFactory, host_api: Version) -> Self {
        Self { factory, host_api }
    }

    /// Attempt every descriptor whose id is not in `disabled`.
    ///
    /// Disabled descriptors are never attempted and never counted as failed.
    pub fn load(&self, descriptors: &[ExtensionDescriptor], disabled: &DisabledIdSet) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();

        for descriptor in descriptors {
            if disabled.contains(&descriptor.id) {
                debug!(id = %descriptor.id, "extension disabled, not loading");
                continue;
            }
            if outcome.loaded.contains_key(&descriptor.id)
                || outcome.failed.contains_key(&descriptor.id)
            {
                warn!(id = %descriptor.id, "extension id already attempted, skipping duplicate");
                continue;
            }

            match self.load_one(descriptor) {
                Ok(instance) => {
                    info!(id = %descriptor.id, kind = %descriptor.kind, "extension loaded");
                    outcome.loaded.insert(descriptor.id.clone(), LoadedExtension {
                        descriptor: descriptor.clone(),
                        instance,
                    });
                },
                Err(err) => {
                    warn!(id = %descriptor.id, error = %err, "extension failed to load");
                    outcome.failed.insert(descriptor.id.clone(), err);
                },
            }
        }

        outcome
    }

    fn load_one(
        &self,
        descriptor: &ExtensionDescriptor,
    ) -> Result<Arc<dyn ExtensionInstance>, ExtensionLoadError> {
        if !descriptor.is_compatible_with(&self.host_api) {
            return Err(ExtensionLoadError::Incompatible {
                id: descriptor.id.clone(),
                required: descriptor
                    .host_compat
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                host: self.host_api.to_string(),
            });
        }

        match catch_unwind(AssertUnwindSafe(|| self.factory.instantiate(descriptor))) {
            Ok(Ok(instance)) => Ok(instance),
            // Factories may report a typed load error through anyhow.
            Ok(Err(e)) => match e.downcast::<ExtensionLoadError>() {
                Ok(typed) => Err(typed),
                Err(e) => Err(ExtensionLoadError::Instantiate {
                    id: descriptor.id.clone(),
                    reason: format!("{e:#}"),
                }),
            },
            Err(payload) => Err(ExtensionLoadError::Panicked {
                id: descriptor.id.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
