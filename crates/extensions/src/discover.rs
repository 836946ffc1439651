//! Descriptor discovery: one manifest per directory, one level below each root.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    error::ManifestParseError,
    manifest::{manifest_in, read_manifest},
    types::ExtensionDescriptor,
};

/// Result of a scan: every descriptor that parsed, plus every manifest that didn't.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub descriptors: Vec<ExtensionDescriptor>,
    pub errors: Vec<ManifestParseError>,
}

impl ScanReport {
    pub fn find(&self, id: &str) -> Option<&ExtensionDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }
}

/// Filesystem-backed descriptor store. Scans roots in the order given.
pub struct DescriptorStore {
    roots: Vec<PathBuf>,
}

impl DescriptorStore {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Walk every root and parse the manifest of each child directory.
    ///
    /// Never fails: unreadable roots are skipped and bad manifests are recorded
    /// in [`ScanReport::errors`]. Within a root, directories are visited in
    /// sorted order; the first descriptor claiming an identifier wins.
    pub fn scan(&self) -> ScanReport {
        let mut report = ScanReport::default();
        let mut seen = HashSet::new();

        for root in &self.roots {
            if !root.is_dir() {
                debug!(root = %root.display(), "extension root missing, skipping");
                continue;
            }
            for dir in sorted_child_dirs(root) {
                let Some(manifest_path) = manifest_in(&dir) else {
                    continue;
                };
                match read_manifest(&manifest_path) {
                    Ok(descriptor) => {
                        if !seen.insert(descriptor.id.clone()) {
                            let err = ManifestParseError::new(
                                &manifest_path,
                                format!("duplicate extension id '{}'", descriptor.id),
                            );
                            warn!(error = %err, "skipping extension");
                            report.errors.push(err);
                            continue;
                        }
                        debug!(
                            id = %descriptor.id,
                            kind = %descriptor.kind,
                            dir = %dir.display(),
                            "discovered extension"
                        );
                        report.descriptors.push(descriptor);
                    },
                    Err(err) => {
                        warn!(error = %err, "skipping extension");
                        report.errors.push(err);
                    },
                }
            }
        }

        report
    }
}

fn sorted_child_dirs(root: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(root) {
        Ok(e) => e,
        Err(e) => {
            warn!(root = %root.display(), %e, "failed to read extension root");
            return Vec::new();
        },
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}
