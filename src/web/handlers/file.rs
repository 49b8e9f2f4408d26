//! File handlers for the HTTP API.
//!
//! Everything under `/api/file/` is served by one wildcard route per method;
//! the first path segment picks the operation (`new`, `info`, `exist`,
//! `update`) and the rest is the namespace path. `DELETE` takes the namespace
//! path directly.

use axum::{
    extract::{rejection::FormRejection, Form, Multipart, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::ingest::{IncomingFile, IngestionCoordinator};
use crate::namespace::NamespaceStore;
use crate::query::QueryService;
use crate::web::dto::{
    ApiResponse, DeleteResponse, ExistResponse, InfoResponse, NewRequest, NodeResponse,
    UpdateRequest,
};
use crate::web::error::{ApiError, STATUS_OK};
use crate::web::handlers::AppState;

/// GET /ping - Liveness check.
pub async fn ping() -> &'static str {
    "pong"
}

/// Split `info/a/b` into `("info", "a/b")`.
fn split_action(path: &str) -> (&str, &str) {
    let path = path.trim_start_matches('/');
    path.split_once('/').unwrap_or((path, ""))
}

fn expect_action(path: &str, expected: &str) -> Result<(), ApiError> {
    if path.trim_matches('/') == expected {
        Ok(())
    } else {
        Err(ApiError::not_found(format!("unknown endpoint: /api/file/{path}")))
    }
}

/// GET /api/file/info/*path and GET /api/file/exist/*path.
pub async fn get_node(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let (action, target) = split_action(&path);
    let query = QueryService::new(&state.db);

    match action {
        "info" => {
            let listing = query.info(target).await?;
            Ok(Json(ApiResponse::new(
                STATUS_OK,
                "query succeeded",
                InfoResponse::from(listing),
            ))
            .into_response())
        }
        "exist" => {
            let node = query.exists_at(target).await?;
            let exists = node.is_some();
            Ok(Json(ApiResponse::new(
                STATUS_OK,
                exists.to_string(),
                ExistResponse {
                    exists,
                    node: node.map(NodeResponse::from),
                },
            ))
            .into_response())
        }
        _ => Err(ApiError::not_found(format!(
            "unknown endpoint: /api/file/{path}"
        ))),
    }
}

/// POST /api/file/new - Create a directory or upload a batch of files.
pub async fn post_node(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    expect_action(&path, "new")?;
    let request = read_new_request(multipart).await?;
    let parent = request.parent()?.to_string();
    let coordinator = IngestionCoordinator::new(&state.db, state.uploader.as_ref(), &state.upload);

    if request.is_directory() {
        let node = coordinator
            .create_directory(&parent, &request.dir_name)
            .await?;
        return Ok(Json(ApiResponse::new(
            STATUS_OK,
            "mkdir succeeded",
            NodeResponse::from(node),
        ))
        .into_response());
    }

    let nodes = coordinator
        .upload_batch(&parent, request.files)
        .await?;
    let nodes: Vec<NodeResponse> = nodes.into_iter().map(NodeResponse::from).collect();
    Ok(Json(ApiResponse::new(STATUS_OK, "upload succeeded", nodes)).into_response())
}

async fn read_new_request(mut multipart: Multipart) -> Result<NewRequest, ApiError> {
    let mut request = NewRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "files" | "files[]" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ApiError::bad_request("File part without a filename"))?;
                let content = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read file content: {}", e);
                    ApiError::bad_request("Failed to read file")
                })?;
                request
                    .files
                    .push(IncomingFile::new(filename, content.to_vec()));
            }
            "flag" | "parent" | "dirName" => {
                let value = field.text().await.map_err(|e| {
                    tracing::error!("Failed to read field {}: {}", name, e);
                    ApiError::bad_request(format!("Invalid {name}"))
                })?;
                match name.as_str() {
                    "flag" => request.flag = value,
                    "parent" => request.parent = value,
                    _ => request.dir_name = value,
                }
            }
            _ => {}
        }
    }

    Ok(request)
}

/// PUT /api/file/update - Rename or move a node by ID.
pub async fn put_node(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    form: Result<Form<UpdateRequest>, FormRejection>,
) -> Result<Response, ApiError> {
    expect_action(&path, "update")?;
    let Form(request) = form.map_err(|e| ApiError::bad_request(format!("parameter error: {e}")))?;
    let id = request.node_id()?;

    let node = NamespaceStore::new(&state.db)
        .rename(id, &request.file_name)
        .await?;

    Ok(Json(ApiResponse::new(
        STATUS_OK,
        "update succeeded",
        NodeResponse::from(node),
    ))
    .into_response())
}

/// DELETE /api/file/*path - Delete a node and its subtree.
pub async fn delete_node(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let removed = NamespaceStore::new(&state.db).delete_subtree(&path).await?;

    Ok(Json(ApiResponse::new(
        STATUS_OK,
        "delete succeeded",
        DeleteResponse { removed },
    ))
    .into_response())
}
