//! Ephemeral byte-stream handles for preview and download.
//!
//! A [`MediaHandle`] owns a materialized file in a session-scoped
//! scratch directory and removes it when dropped. Release-exactly-once
//! and no-use-after-release are enforced by move semantics rather than
//! runtime checks: replacing the handle stored in an `Option` slot is
//! the release.

use std::path::{Path, PathBuf};

use promoclip_common::error::PromoclipResult;

/// An owned, externally consumable reference to a binary resource.
///
/// The file behind the handle lives exactly as long as the handle.
#[derive(Debug)]
pub struct MediaHandle {
    path: PathBuf,
    len: usize,
}

impl MediaHandle {
    /// Path to the materialized bytes, valid for the handle's lifetime.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "Handle file already gone");
        } else {
            tracing::debug!(path = %self.path.display(), "Handle released");
        }
    }
}

/// Allocates handles inside one scratch directory.
///
/// Handles must not outlive the registry that issued them: dropping
/// the registry removes the whole directory.
#[derive(Debug)]
pub struct HandleRegistry {
    dir: PathBuf,
    next_id: u64,
}

impl HandleRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> PromoclipResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, next_id: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Materialize bytes as a uniquely named file and hand ownership
    /// to the caller.
    pub fn register(
        &mut self,
        bytes: &[u8],
        label: &str,
        extension: &str,
    ) -> PromoclipResult<MediaHandle> {
        let id = self.next_id;
        self.next_id += 1;
        let path = self.dir.join(format!("{label}-{id}.{extension}"));
        std::fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Handle registered");
        Ok(MediaHandle {
            path,
            len: bytes.len(),
        })
    }
}

impl Drop for HandleRegistry {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            tracing::debug!(dir = %self.dir.display(), error = %e, "Scratch dir cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("promoclip-handles-{tag}-{}", std::process::id()))
    }

    #[test]
    fn test_replacing_a_handle_releases_the_file() {
        let mut registry = HandleRegistry::new(scratch_dir("replace")).unwrap();
        let mut slot = Some(registry.register(b"first", "preview", "mp4").unwrap());
        let first_path = slot.as_ref().unwrap().path().to_path_buf();
        assert!(first_path.exists());

        slot = Some(registry.register(b"second", "preview", "mp4").unwrap());
        assert!(!first_path.exists());
        assert!(slot.as_ref().unwrap().path().exists());
    }

    #[test]
    fn test_handles_get_unique_paths() {
        let mut registry = HandleRegistry::new(scratch_dir("unique")).unwrap();
        let a = registry.register(b"a", "output", "mp4").unwrap();
        let b = registry.register(b"b", "output", "mp4").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_registry_drop_removes_scratch_dir() {
        let dir = scratch_dir("teardown");
        {
            let mut registry = HandleRegistry::new(dir.clone()).unwrap();
            let _keep = registry.register(b"bytes", "output", "mp4").unwrap();
            assert!(dir.exists());
        }
        assert!(!dir.exists());
    }
}
