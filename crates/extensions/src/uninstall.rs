//! Deferred uninstall: requests are persisted while the host runs and applied
//! by a sweep at the next startup, before discovery.

use std::path::{Path, PathBuf};

use {
    gamedock_config::write_atomic,
    serde::{Deserialize, Serialize},
    tracing::{debug, info, warn},
};

use crate::{
    error::{Result, UninstallApplyError},
    types::{ExtensionDescriptor, ExtensionKind},
};

/// One directory (plus optional data directory) slated for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UninstallRequest {
    pub extension_id: String,
    pub kind: ExtensionKind,
    pub directory: PathBuf,
    #[serde(default)]
    pub data_directory: Option<PathBuf>,
    pub queued_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QueueFile {
    version: u32,
    #[serde(default)]
    requests: Vec<UninstallRequest>,
}

impl Default for QueueFile {
    fn default() -> Self {
        Self {
            version: 1,
            requests: Vec::new(),
        }
    }
}

/// What a sweep did.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Requests whose targets are gone now (removed, or already missing).
    pub applied: Vec<UninstallRequest>,
    /// Requests that failed and stay queued for the next startup.
    pub retained: Vec<(UninstallRequest, UninstallApplyError)>,
    /// Requests pointing outside managed directories; dropped from the queue.
    pub rejected: Vec<(UninstallRequest, UninstallApplyError)>,
}

/// Durable queue stored as JSON with atomic writes.
pub struct UninstallQueue {
    path: PathBuf,
    extensions_data_dir: PathBuf,
}

impl UninstallQueue {
    pub fn new(path: PathBuf, extensions_data_dir: PathBuf) -> Self {
        Self {
            path,
            extensions_data_dir,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queued requests. A missing queue file means an empty queue.
    pub fn requests(&self) -> Result<Vec<UninstallRequest>> {
        Ok(self.load()?.requests)
    }

    /// Queue removal of `descriptor`'s directory. Returns `false` if it was already queued.
    pub fn enqueue(&self, descriptor: &ExtensionDescriptor) -> Result<bool> {
        let mut file = self.load()?;
        if file
            .requests
            .iter()
            .any(|r| r.directory == descriptor.directory)
        {
            debug!(id = %descriptor.id, "uninstall already queued");
            return Ok(false);
        }

        let data_directory = descriptor
            .kind
            .has_external_data_dir()
            .then(|| self.extensions_data_dir.join(safe_path_name(&descriptor.id)));
        file.requests.push(UninstallRequest {
            extension_id: descriptor.id.clone(),
            kind: descriptor.kind,
            directory: descriptor.directory.clone(),
            data_directory,
            queued_at_ms: now_ms(),
        });
        self.save(&file)?;
        info!(id = %descriptor.id, dir = %descriptor.directory.display(), "uninstall queued");
        Ok(true)
    }

    /// Apply every queued request. Must run before descriptor discovery.
    ///
    /// `roots` are the extension and theme roots; a target must sit strictly
    /// inside one of them (data directories inside the extensions data dir).
    /// Failures leave that request queued without blocking the others.
    pub fn sweep(&self, roots: &[PathBuf]) -> Result<SweepReport> {
        let file = self.load()?;
        let mut report = SweepReport::default();
        if file.requests.is_empty() {
            return Ok(report);
        }

        for request in file.requests {
            match self.apply(&request, roots) {
                Ok(()) => {
                    info!(id = %request.extension_id, dir = %request.directory.display(), "uninstall applied");
                    report.applied.push(request);
                },
                Err(err @ UninstallApplyError::OutsideRoots { .. }) => {
                    warn!(id = %request.extension_id, error = %err, "dropping uninstall request");
                    report.rejected.push((request, err));
                },
                Err(err) => {
                    warn!(id = %request.extension_id, error = %err, "uninstall failed, will retry next startup");
                    report.retained.push((request, err));
                },
            }
        }

        let remaining: Vec<UninstallRequest> =
            report.retained.iter().map(|(r, _)| r.clone()).collect();
        if remaining.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {},
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
                Err(e) => return Err(e.into()),
            }
        } else {
            self.save(&QueueFile {
                version: 1,
                requests: remaining,
            })?;
        }
        Ok(report)
    }

    fn apply(
        &self,
        request: &UninstallRequest,
        roots: &[PathBuf],
    ) -> std::result::Result<(), UninstallApplyError> {
        remove_inside(&request.directory, roots)?;
        let Some(data_dir) = &request.data_directory else {
            return Ok(());
        };
        // The data root may have moved since the request was queued; the
        // extension itself is gone either way.
        match remove_inside(data_dir, std::slice::from_ref(&self.extensions_data_dir)) {
            Ok(()) => Ok(()),
            Err(err @ UninstallApplyError::OutsideRoots { .. }) => {
                warn!(id = %request.extension_id, error = %err, "leaving data directory in place");
                Ok(())
            },
            Err(err) => Err(err),
        }
    }

    fn load(&self) -> Result<QueueFile> {
        if !self.path.exists() {
            return Ok(QueueFile::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, file: &QueueFile) -> Result<()> {
        let data = serde_json::to_string_pretty(file)?;
        write_atomic(&self.path, data)?;
        Ok(())
    }
}

/// Delete `target` if it exists and lies strictly inside one of `roots`.
/// A missing target counts as already removed.
fn remove_inside(target: &Path, roots: &[PathBuf]) -> std::result::Result<(), UninstallApplyError> {
    if !target.exists() {
        debug!(path = %target.display(), "uninstall target already gone");
        return Ok(());
    }
    let canonical = std::fs::canonicalize(target).map_err(|source| UninstallApplyError::Remove {
        path: target.to_path_buf(),
        source,
    })?;
    let inside = roots.iter().any(|root| {
        std::fs::canonicalize(root)
            .is_ok_and(|root| canonical != root && canonical.starts_with(&root))
    });
    if !inside {
        return Err(UninstallApplyError::OutsideRoots {
            path: target.to_path_buf(),
        });
    }
    std::fs::remove_dir_all(&canonical).map_err(|source| UninstallApplyError::Remove {
        path: target.to_path_buf(),
        source,
    })
}

/// Replace characters that are invalid in file names on any supported platform.
pub fn safe_path_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
