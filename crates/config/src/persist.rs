use std::path::{Path, PathBuf};

/// Write `data` to `path` by writing a sibling `.tmp` file and renaming it
/// over the target. A crash mid-write leaves the previous file untouched.
pub fn write_atomic(path: &Path, data: impl AsRef<[u8]>) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    std::fs::write(&tmp, data)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_new_file_and_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir/queue.json");
        write_atomic(&path, "[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(!tmp.path().join("nested/dir/queue.json.tmp").exists());
    }

    #[test]
    fn replaces_existing_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gamedock.toml");
        std::fs::write(&path, "language = \"english\"").unwrap();
        write_atomic(&path, "language = \"de_DE\"").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "language = \"de_DE\""
        );
    }

    #[test]
    fn tmp_path_keeps_full_file_name() {
        assert_eq!(
            tmp_path(Path::new("/a/b/uninstall-queue.json")),
            PathBuf::from("/a/b/uninstall-queue.json.tmp")
        );
    }
}
