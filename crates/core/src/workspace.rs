//! Workspace file operations.
//!
//! [`WorkspaceService`] is the single entry point for everything the HTTP and
//! CLI surfaces do to the filesystem. It is stateless beyond its
//! [`WorkspaceConfig`]; the filesystem itself is the only store. Concurrent
//! operations on the same file are not guarded (last write wins), and no
//! atomic-rename or rollback guarantees are made.

use crate::paths::resolve_safe_path;
use crate::{WorkspaceConfig, WorkspaceError, WorkspaceResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

/// Name, size and last-modified time of a top-level workspace entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mtime: DateTime<Utc>,
}

/// Service for managing files within the workspace root.
///
/// All paths are resolved through the sandbox check before any filesystem
/// call; nothing outside the configured root is ever touched.
#[derive(Clone, Debug)]
pub struct WorkspaceService {
    cfg: WorkspaceConfig,
}

impl WorkspaceService {
    pub fn new(cfg: WorkspaceConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.cfg
    }

    /// List top-level entry names in the workspace, sorted.
    ///
    /// Directories appear by name like files do; nested uploads show up via
    /// their top-level directory.
    pub fn list(&self) -> WorkspaceResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.cfg.workspace_dir())? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// List top-level entries with size and last-modified time.
    pub fn list_with_info(&self) -> WorkspaceResult<Vec<FileInfo>> {
        let mut infos = Vec::new();
        for entry in fs::read_dir(self.cfg.workspace_dir())? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            infos.push(FileInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                mtime: DateTime::<Utc>::from(metadata.modified()?),
            });
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    /// Read a file as text. Invalid UTF-8 is replaced lossily rather than
    /// rejected, matching the behaviour of a text-mode read.
    pub fn read(&self, filename: &str) -> WorkspaceResult<String> {
        let bytes = self.read_bytes(filename)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read a file's raw bytes (download path).
    pub fn read_bytes(&self, filename: &str) -> WorkspaceResult<Vec<u8>> {
        let path = self.existing_file(filename)?;
        Ok(fs::read(path)?)
    }

    /// Create a file with the given content. Overwrites if it already exists.
    pub fn create(&self, filename: &str, content: &str) -> WorkspaceResult<()> {
        let path = resolve_safe_path(self.cfg.workspace_dir(), filename)?;
        fs::write(&path, content)?;
        tracing::debug!(file = %path.display(), "created file");
        Ok(())
    }

    /// Overwrite an existing file's content.
    ///
    /// # Errors
    /// `NotFound` if the file does not exist.
    pub fn update(&self, filename: &str, content: &str) -> WorkspaceResult<()> {
        let path = self.existing_file(filename)?;
        fs::write(&path, content)?;
        tracing::debug!(file = %path.display(), "updated file");
        Ok(())
    }

    /// Delete a file.
    ///
    /// # Errors
    /// `NotFound` if the file does not exist.
    pub fn delete(&self, filename: &str) -> WorkspaceResult<()> {
        let path = self.existing_file(filename)?;
        fs::remove_file(&path)?;
        tracing::debug!(file = %path.display(), "deleted file");
        Ok(())
    }

    /// Store one uploaded entry under its relative path.
    ///
    /// The directory component of `relative_name` is created (with parents)
    /// under the workspace root, and the file is written using only its base
    /// name inside that directory. Returns the resolved absolute path.
    pub fn store_upload(&self, relative_name: &str, bytes: &[u8]) -> WorkspaceResult<PathBuf> {
        let path = resolve_safe_path(self.cfg.workspace_dir(), relative_name)?;
        if let Some(parent) = path.parent() {
            if parent != self.cfg.workspace_dir() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, bytes)?;
        tracing::debug!(file = %path.display(), size = bytes.len(), "stored upload");
        Ok(path)
    }

    /// Resolve a filename and require that it names an existing file.
    fn existing_file(&self, filename: &str) -> WorkspaceResult<PathBuf> {
        let path = resolve_safe_path(self.cfg.workspace_dir(), filename)?;
        if !path.exists() {
            return Err(WorkspaceError::NotFound(filename.to_string()));
        }
        Ok(path)
    }
}
