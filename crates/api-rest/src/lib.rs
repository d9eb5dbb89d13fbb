//! # API REST
//!
//! REST API implementation for WFM (Workspace File Manager).
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, multipart uploads,
//!   attachment downloads, static serving of the workspace tree)
//!
//! All filesystem work is delegated to `wfm-core`; this crate only maps
//! requests and errors onto the workspace service.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wfm_core::{WorkspaceError, WorkspaceService};

/// Embedded browser client, served at `/`.
const UI_PAGE: &str = include_str!("../assets/index.html");

/// Application state shared across REST API handlers.
///
/// Holds the workspace service; the service itself is stateless beyond its
/// configured root, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    workspace: WorkspaceService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_files,
        list_files_info,
        file_content,
        create_file,
        update_file,
        delete_file,
        upload_files,
        download_file,
    ),
    components(schemas(
        HealthRes,
        ListFilesRes,
        ListFilesInfoRes,
        FileInfoRes,
        FileContentRes,
        FileWriteReq,
        FileDeleteReq,
        MessageRes,
        UploadRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the WFM router over a workspace service.
///
/// `/workspace/*` serves the raw tree directly from disk; everything else
/// goes through the service (and therefore through the sandbox check).
pub fn router(workspace: WorkspaceService) -> Router {
    let workspace_dir = workspace.config().workspace_dir().to_path_buf();

    Router::new()
        .route("/", get(ui_page))
        .route("/health", get(health))
        .route("/files", get(list_files))
        .route("/files-info", get(list_files_info))
        .route("/file-content", get(file_content))
        .route(
            "/file",
            axum::routing::post(create_file)
                .put(update_file)
                .delete(delete_file),
        )
        .route("/upload", get(upload_method_hint).post(upload_files))
        .route("/download", get(download_file))
        .nest_service("/workspace", ServeDir::new(workspace_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { workspace })
}

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListFilesRes {
    pub files: Vec<String>,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct FileInfoRes {
    pub name: String,
    pub size: u64,
    pub mtime: chrono::DateTime<chrono::Utc>,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ListFilesInfoRes {
    pub files: Vec<FileInfoRes>,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct FileContentRes {
    pub content: String,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct FileWriteReq {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct FileDeleteReq {
    #[serde(default)]
    pub filename: String,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MessageRes {
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct UploadRes {
    pub message: String,
    pub files: Vec<String>,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(serde::Deserialize)]
pub struct FilenameQuery {
    filename: Option<String>,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// HTTP-facing error: a status code plus a JSON `{error}` body.
///
/// Path traversal is a rejected request (400), not an internal error; only
/// I/O failures surface as 500.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<WorkspaceError> for ApiError {
    fn from(err: WorkspaceError) -> Self {
        let status = match &err {
            WorkspaceError::MissingFilename => StatusCode::BAD_REQUEST,
            WorkspaceError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkspaceError::PathTraversal(_) => StatusCode::BAD_REQUEST,
            WorkspaceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("request failed: {}", self.message);
        }
        (self.status, Json(ErrorRes { error: self.message })).into_response()
    }
}

fn require_filename(filename: Option<String>) -> Result<String, ApiError> {
    match filename {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(WorkspaceError::MissingFilename.into()),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Serve the embedded browser client.
async fn ui_page() -> Html<&'static str> {
    Html(UI_PAGE)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "WFM REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "Top-level workspace entry names", body = ListFilesRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List the names of all top-level workspace entries.
#[axum::debug_handler]
async fn list_files(State(state): State<AppState>) -> Result<Json<ListFilesRes>, ApiError> {
    let files = state.workspace.list()?;
    Ok(Json(ListFilesRes { files }))
}

#[utoipa::path(
    get,
    path = "/files-info",
    responses(
        (status = 200, description = "Workspace entries with size and mtime", body = ListFilesInfoRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List workspace entries with byte size and last-modified timestamp.
#[axum::debug_handler]
async fn list_files_info(
    State(state): State<AppState>,
) -> Result<Json<ListFilesInfoRes>, ApiError> {
    let files = state
        .workspace
        .list_with_info()?
        .into_iter()
        .map(|info| FileInfoRes {
            name: info.name,
            size: info.size,
            mtime: info.mtime,
        })
        .collect();
    Ok(Json(ListFilesInfoRes { files }))
}

#[utoipa::path(
    get,
    path = "/file-content",
    params(
        ("filename" = String, Query, description = "Relative path of the file to read")
    ),
    responses(
        (status = 200, description = "File content", body = FileContentRes),
        (status = 400, description = "Missing or invalid filename", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes)
    )
)]
/// Read a file's content as text.
#[axum::debug_handler]
async fn file_content(
    State(state): State<AppState>,
    Query(query): Query<FilenameQuery>,
) -> Result<Json<FileContentRes>, ApiError> {
    let filename = require_filename(query.filename)?;
    let content = state.workspace.read(&filename)?;
    Ok(Json(FileContentRes { content }))
}

#[utoipa::path(
    post,
    path = "/file",
    request_body = FileWriteReq,
    responses(
        (status = 200, description = "File created", body = MessageRes),
        (status = 400, description = "Missing or invalid filename", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create a file. Overwrites silently if the file already exists.
#[axum::debug_handler]
async fn create_file(
    State(state): State<AppState>,
    Json(req): Json<FileWriteReq>,
) -> Result<Json<MessageRes>, ApiError> {
    state.workspace.create(&req.filename, &req.content)?;
    Ok(Json(MessageRes {
        message: "File created".into(),
    }))
}

#[utoipa::path(
    put,
    path = "/file",
    request_body = FileWriteReq,
    responses(
        (status = 200, description = "File updated", body = MessageRes),
        (status = 400, description = "Missing or invalid filename", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes)
    )
)]
/// Overwrite an existing file's content.
#[axum::debug_handler]
async fn update_file(
    State(state): State<AppState>,
    Json(req): Json<FileWriteReq>,
) -> Result<Json<MessageRes>, ApiError> {
    state.workspace.update(&req.filename, &req.content)?;
    Ok(Json(MessageRes {
        message: "File updated".into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/file",
    request_body = FileDeleteReq,
    responses(
        (status = 200, description = "File deleted", body = MessageRes),
        (status = 400, description = "Missing or invalid filename", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes)
    )
)]
/// Delete a file.
#[axum::debug_handler]
async fn delete_file(
    State(state): State<AppState>,
    Json(req): Json<FileDeleteReq>,
) -> Result<Json<MessageRes>, ApiError> {
    state.workspace.delete(&req.filename)?;
    Ok(Json(MessageRes {
        message: "File deleted".into(),
    }))
}

#[utoipa::path(
    post,
    path = "/upload",
    responses(
        (status = 200, description = "Files uploaded", body = UploadRes),
        (status = 400, description = "Malformed upload or invalid path", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Upload one or more files from a multipart request.
///
/// Each part's file name carries the relative path; intermediate directories
/// are created on demand. Parts are stored independently: if a later part
/// fails, files already written stay in place.
#[axum::debug_handler]
async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadRes>, ApiError> {
    let mut stored = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let Some(relative_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        state.workspace.store_upload(&relative_name, &bytes)?;
        stored.push(relative_name);
    }
    tracing::info!(count = stored.len(), "upload batch stored");
    Ok(Json(UploadRes {
        message: "Files uploaded".into(),
        files: stored,
    }))
}

/// GET /upload for clarity (not used for uploads).
async fn upload_method_hint() -> ApiError {
    ApiError {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: "Use POST /upload to upload files.".into(),
    }
}

#[utoipa::path(
    get,
    path = "/download",
    params(
        ("filename" = String, Query, description = "Relative path of the file to download")
    ),
    responses(
        (status = 200, description = "Raw file bytes as an attachment"),
        (status = 400, description = "Missing or invalid filename", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes)
    )
)]
/// Download a file's raw bytes with its base name as the suggested filename.
#[axum::debug_handler]
async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<FilenameQuery>,
) -> Result<Response, ApiError> {
    let filename = require_filename(query.filename)?;
    let bytes = state.workspace.read_bytes(&filename)?;

    // Quotes and control characters would break the quoted-string header
    // value, so they are stripped from the suggested name.
    let base_name: String = std::path::Path::new(&filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.clone())
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect();

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", base_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wfm_core::WorkspaceConfig;

    fn test_app(temp: &TempDir) -> Router {
        let cfg = WorkspaceConfig::new(temp.path()).unwrap();
        router(WorkspaceService::new(cfg))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn test_create_then_list_and_read() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/file",
                serde_json::json!({"filename": "a.txt", "content": "hi"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(Request::get("/files").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["files"], serde_json::json!(["a.txt"]));

        let response = app
            .oneshot(
                Request::get("/file-content?filename=a.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["content"], "hi");
    }

    #[tokio::test]
    async fn test_files_info_reports_size() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "12345").unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(Request::get("/files-info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["files"][0]["name"], "a.txt");
        assert_eq!(json["files"][0]["size"], 5);
        assert!(json["files"][0]["mtime"].is_string());
    }

    #[tokio::test]
    async fn test_missing_filename_is_400() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .clone()
            .oneshot(Request::get("/file-content").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());

        let response = app
            .oneshot(json_request(
                "POST",
                "/file",
                serde_json::json!({"content": "no name"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(json_request(
                "POST",
                "/file",
                serde_json::json!({"filename": "../evil.txt", "content": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("invalid"));
        assert!(!temp.path().parent().unwrap().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_update_missing_is_404() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(json_request(
                "PUT",
                "/file",
                serde_json::json!({"filename": "ghost.txt", "content": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "x").unwrap();
        let app = test_app(&temp);

        let response = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                "/file",
                serde_json::json!({"filename": "a.txt"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request(
                "DELETE",
                "/file",
                serde_json::json!({"filename": "a.txt"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_nested_paths() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let boundary = "wfm-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"sub/dir/file.txt\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             nested\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"flat.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             flat\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .clone()
            .oneshot(
                Request::post("/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["files"],
            serde_json::json!(["sub/dir/file.txt", "flat.txt"])
        );

        assert_eq!(
            std::fs::read_to_string(temp.path().join("sub/dir/file.txt")).unwrap(),
            "nested"
        );
        assert_eq!(
            std::fs::read_to_string(temp.path().join("flat.txt")).unwrap(),
            "flat"
        );
    }

    #[tokio::test]
    async fn test_upload_get_is_405() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(Request::get("/upload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_download_sets_attachment_headers() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("sub/report.bin"), b"\x00\x01\x02").unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(
                Request::get("/download?filename=sub/report.bin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.bin\""
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"\x00\x01\x02");
    }

    #[tokio::test]
    async fn test_download_strips_quotes_from_suggested_name() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a\".txt"), "quoted").unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(
                Request::get("/download?filename=a%22.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a.txt\""
        );
    }

    #[tokio::test]
    async fn test_download_missing_is_404() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(
                Request::get("/download?filename=ghost.bin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_workspace_static_serving() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("static.txt"), "served").unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(
                Request::get("/workspace/static.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"served");
    }

    #[tokio::test]
    async fn test_ui_page_served_at_root() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(std::str::from_utf8(&bytes).unwrap().contains("<html"));
    }
}
