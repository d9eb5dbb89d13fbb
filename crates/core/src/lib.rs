//! # WFM Core
//!
//! Workspace service for the WFM file manager.
//!
//! Handles:
//! - Path resolution and sandboxing (all paths stay inside the workspace root)
//! - File CRUD (list, read, create, update, delete)
//! - Upload placement (nested relative paths, directories created on demand)
//!
//! The HTTP surface lives in `api-rest`; this crate is transport-agnostic and
//! can be driven directly (the `wfm` CLI does exactly that).

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod paths;
pub mod workspace;

pub use config::WorkspaceConfig;
pub use error::{WorkspaceError, WorkspaceResult};
pub use workspace::{FileInfo, WorkspaceService};
