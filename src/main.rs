//! Main entry point for the WFM application.
//!
//! Starts the REST server (default 0.0.0.0:5050) over a single workspace
//! directory. The browser client is served at `/`, Swagger UI at
//! `/swagger-ui`, and the raw workspace tree at `/workspace`.

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wfm_core::{WorkspaceConfig, WorkspaceService};

/// # Environment Variables
/// - `WFM_REST_ADDR`: Server address (default: "0.0.0.0:5050")
/// - `WFM_WORKSPACE_DIR`: Workspace root directory (default: "workspace"),
///   created if absent
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("wfm=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("WFM_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5050".into());
    let workspace_dir = std::env::var("WFM_WORKSPACE_DIR").unwrap_or_else(|_| "workspace".into());

    let workspace_path = Path::new(&workspace_dir);
    if !workspace_path.exists() {
        std::fs::create_dir_all(workspace_path)?;
    }

    tracing::info!("++ Starting WFM REST on {}", addr);
    tracing::info!("++ Workspace root: {}", workspace_path.display());

    let cfg = WorkspaceConfig::new(workspace_path)?;
    let app = api_rest::router(WorkspaceService::new(cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
