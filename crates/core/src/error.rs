#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("filename required")]
    MissingFilename,
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid file path: {0}")]
    PathTraversal(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WorkspaceResult<T> = std::result::Result<T, WorkspaceError>;
