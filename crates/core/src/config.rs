//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! workspace service. The intent is to avoid reading process-wide environment
//! variables during request handling, and to let tests construct independent
//! instances over temporary directories.

use crate::{WorkspaceError, WorkspaceResult};
use std::path::{Path, PathBuf};

/// Workspace configuration resolved at startup.
///
/// Holds the single directory tree the service is permitted to read and write.
/// The root is canonicalized at construction so later containment checks
/// compare canonical paths.
#[derive(Clone, Debug)]
pub struct WorkspaceConfig {
    workspace_dir: PathBuf,
}

impl WorkspaceConfig {
    /// Create a new `WorkspaceConfig`.
    ///
    /// # Errors
    /// Returns `WorkspaceError::Io` if the directory does not exist or cannot
    /// be canonicalized.
    pub fn new(workspace_dir: impl Into<PathBuf>) -> WorkspaceResult<Self> {
        let workspace_dir: PathBuf = workspace_dir.into();
        let workspace_dir = workspace_dir.canonicalize()?;
        if !workspace_dir.is_dir() {
            return Err(WorkspaceError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a directory: {}", workspace_dir.display()),
            )));
        }
        Ok(Self { workspace_dir })
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }
}
