//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the WFM REST server on its own. The workspace's main `wfm-run` binary
//! is the usual entry point; this one is handy for development when only the
//! HTTP surface is needed.

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wfm_core::{WorkspaceConfig, WorkspaceService};

/// Main entry point for the WFM REST API server.
///
/// # Environment Variables
/// - `WFM_REST_ADDR`: Server address (default: "0.0.0.0:5050")
/// - `WFM_WORKSPACE_DIR`: Workspace root directory (default: "workspace")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the workspace directory does not exist,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("WFM_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5050".into());
    let workspace_dir = std::env::var("WFM_WORKSPACE_DIR").unwrap_or_else(|_| "workspace".into());

    let workspace_path = Path::new(&workspace_dir);
    if !workspace_path.exists() {
        anyhow::bail!(
            "Workspace directory does not exist: {}",
            workspace_path.display()
        );
    }

    tracing::info!("-- Starting WFM REST API on {}", addr);
    tracing::info!("-- Workspace root: {}", workspace_path.display());

    let cfg = WorkspaceConfig::new(workspace_path)?;
    let app = api_rest::router(WorkspaceService::new(cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
