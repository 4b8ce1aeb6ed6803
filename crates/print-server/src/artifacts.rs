use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Local files owned by one request.
///
/// Paths are tracked before the file is created so a half-written file is
/// still swept. [`TempArtifacts::sweep`] deletes everything tracked; if a
/// request is dropped before sweeping, `Drop` removes what is left.
#[derive(Debug, Default)]
pub struct TempArtifacts {
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn track(&mut self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path.clone());
        }
        path
    }

    pub fn tracked(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Best-effort removal. Already-missing files are fine; directories
    /// (extracted bundles) are removed with their contents.
    pub async fn sweep(&mut self) {
        for path in self.paths.drain(..) {
            let removed = match tokio::fs::symlink_metadata(&path).await {
                Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&path).await,
                Ok(_) => tokio::fs::remove_file(&path).await,
                Err(e) => Err(e),
            };
            match removed {
                Ok(()) => debug!(path = %path.display(), "swept temp file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to sweep temp file"),
            }
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        for path in &self.paths {
            remove_quietly(path);
        }
    }
}

fn remove_quietly(path: &Path) {
    let _ = match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        _ => std::fs::remove_file(path),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sweep_removes_existing_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifacts = TempArtifacts::default();
        let present = artifacts.track(dir.path().join("a.html"));
        artifacts.track(dir.path().join("never-created.pdf"));
        std::fs::write(&present, "x").unwrap();

        artifacts.sweep().await;

        assert!(!present.exists());
        assert!(artifacts.tracked().is_empty());
    }

    #[tokio::test]
    async fn sweep_removes_bundle_directories() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("x.bundle");
        std::fs::create_dir_all(bundle.join("site")).unwrap();
        std::fs::write(bundle.join("site/index.html"), "x").unwrap();

        let mut artifacts = TempArtifacts::default();
        artifacts.track(&bundle);
        artifacts.sweep().await;

        assert!(!bundle.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn drop_removes_unswept_directories() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("y.bundle");
        std::fs::create_dir_all(&bundle).unwrap();
        std::fs::write(bundle.join("index.html"), "x").unwrap();
        {
            let mut artifacts = TempArtifacts::default();
            artifacts.track(&bundle);
        }
        assert!(!bundle.exists());
    }

    #[test]
    fn drop_removes_unswept_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("left.pdf");
        std::fs::write(&path, "x").unwrap();
        {
            let mut artifacts = TempArtifacts::default();
            artifacts.track(&path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn tracking_twice_is_one_entry() {
        let mut artifacts = TempArtifacts::default();
        artifacts.track("/tmp/x.pdf");
        artifacts.track("/tmp/x.pdf");
        assert_eq!(artifacts.tracked().len(), 1);
    }
}
