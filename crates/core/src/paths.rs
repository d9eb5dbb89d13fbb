//! Path resolution and sandboxing.
//!
//! Every client-supplied filename passes through [`resolve_safe_path`] before
//! any filesystem call. The check is in two stages: a lexical walk over the
//! path components that rejects absolute paths and `..`, then a symlink check
//! that canonicalizes the deepest existing ancestor of the resolved path and
//! verifies it is still inside the canonicalized root. The second stage closes
//! the hole where a symlink inside the workspace points outside it.

use crate::{WorkspaceError, WorkspaceResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolve a client-supplied relative filename to an absolute path strictly
/// contained within `root`.
///
/// `root` must already be canonical (see `WorkspaceConfig::new`).
///
/// # Errors
/// - `MissingFilename` if the name is empty or whitespace-only
/// - `PathTraversal` if the name is absolute, contains `..`, or resolves
///   through a symlink to a location outside `root`
pub fn resolve_safe_path(root: &Path, filename: &str) -> WorkspaceResult<PathBuf> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(WorkspaceError::MissingFilename);
    }

    let relative = normalize_relative(trimmed)?;
    let resolved = root.join(&relative);

    // Lexical containment. Redundant after normalize_relative, but cheap and
    // keeps the invariant local to this function.
    if !resolved.starts_with(root) {
        return Err(WorkspaceError::PathTraversal(trimmed.to_string()));
    }

    // Symlink containment: find the deepest ancestor that exists on disk and
    // make sure it still lives under the root. Existence is probed with
    // `symlink_metadata`, which does not follow links, so a dangling symlink
    // counts as existing and gets checked rather than skipped. The target
    // itself may not exist yet (create/upload), so walk up until something
    // does.
    let mut existing = resolved.as_path();
    loop {
        match fs::symlink_metadata(existing) {
            Ok(metadata) => {
                let real = match existing.canonicalize() {
                    Ok(canonical) => canonical,
                    // A dangling symlink cannot be canonicalized; resolve one
                    // level by hand so a write through it is still contained.
                    Err(_) if metadata.file_type().is_symlink() => {
                        let target = fs::read_link(existing)?;
                        let target = if target.is_absolute() {
                            target
                        } else {
                            existing.parent().unwrap_or(root).join(target)
                        };
                        lexical_clean(&target)
                    }
                    Err(e) => return Err(e.into()),
                };
                if !real.starts_with(root) {
                    return Err(WorkspaceError::PathTraversal(trimmed.to_string()));
                }
                break;
            }
            Err(_) => match existing.parent() {
                Some(parent) => existing = parent,
                None => break,
            },
        }
    }

    Ok(resolved)
}

/// Lexically clean an absolute path: drop `.`, pop on `..`. Used only for
/// dangling symlink targets, where canonicalization is impossible.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Lexically normalize a relative path string, dropping `.` components and
/// rejecting anything that could step outside the root.
fn normalize_relative(filename: &str) -> WorkspaceResult<PathBuf> {
    let raw = Path::new(filename);
    if raw.is_absolute() {
        return Err(WorkspaceError::PathTraversal(filename.to_string()));
    }

    let mut normalized = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(WorkspaceError::PathTraversal(filename.to_string()));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(WorkspaceError::MissingFilename);
    }

    Ok(normalized)
}
