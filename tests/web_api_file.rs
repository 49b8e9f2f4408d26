//! Web API File Tests
//!
//! Integration tests for the `/api/file` endpoints.

use anonfs::config::{ServerConfig, UploadConfig};
use anonfs::web::handlers::AppState;
use anonfs::web::router::create_router;
use anonfs::{AnonfsError, Database, NamespaceStore, RemoteUploader, UploadedFile};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;
use std::sync::Arc;

/// Provider double: refuses any file whose name contains "reject".
struct FakeUploader;

#[async_trait]
impl RemoteUploader for FakeUploader {
    async fn upload(
        &self,
        filename: &str,
        content: Vec<u8>,
        _token: Option<&str>,
    ) -> anonfs::Result<UploadedFile> {
        if filename.contains("reject") {
            return Err(AnonfsError::RemoteRejected {
                code: "31".to_string(),
                message: "The file is too large.".to_string(),
            });
        }
        Ok(UploadedFile {
            url: format!("https://files.example/{filename}"),
            size: format!("{} B", content.len()),
        })
    }
}

/// Create a test server with an in-memory database.
async fn create_test_server_with(config: ServerConfig) -> (TestServer, Arc<Database>) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    NamespaceStore::new(&db)
        .ensure_root()
        .await
        .expect("Failed to create root");
    let shared_db = Arc::new(db);

    let app_state = Arc::new(AppState::new(
        shared_db.clone(),
        Arc::new(FakeUploader),
        UploadConfig::default(),
    ));

    let router = create_router(app_state, &config);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, shared_db)
}

async fn create_test_server() -> (TestServer, Arc<Database>) {
    create_test_server_with(ServerConfig::default()).await
}

/// Create a directory through the API.
async fn mkdir(server: &TestServer, parent: &str, name: &str) -> Value {
    let form = MultipartForm::new()
        .add_text("flag", "directory")
        .add_text("parent", parent.to_string())
        .add_text("dirName", name.to_string());
    server.post("/api/file/new").multipart(form).await.json::<Value>()
}

/// Upload files through the API.
async fn upload(server: &TestServer, parent: &str, files: &[(&str, &str)]) -> Value {
    let mut form = MultipartForm::new().add_text("parent", parent.to_string());
    for (name, content) in files {
        form = form.add_part(
            "files",
            Part::bytes(content.as_bytes().to_vec())
                .file_name(name.to_string())
                .mime_type("text/plain"),
        );
    }
    server.post("/api/file/new").multipart(form).await.json::<Value>()
}

fn names(listing: &Value) -> Vec<String> {
    listing["data"]["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_ping() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/ping").await;
    response.assert_status_ok();
    response.assert_text("pong");
}

#[tokio::test]
async fn test_mkdir() {
    let (server, _db) = create_test_server().await;

    let body = mkdir(&server, "/", "docs").await;
    assert_eq!(body["status"], "2002");
    assert_eq!(body["data"]["fullPath"], "/docs");
    assert_eq!(body["data"]["category"], "directory");
    assert_eq!(body["data"]["size"], "4KB");
}

#[tokio::test]
async fn test_mkdir_duplicate() {
    let (server, _db) = create_test_server().await;

    mkdir(&server, "/", "docs").await;
    let body = mkdir(&server, "/", "docs").await;
    assert_eq!(body["status"], "3004");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_mkdir_missing_parent() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/file/new")
        .multipart(
            MultipartForm::new()
                .add_text("flag", "directory")
                .add_text("parent", "/nope")
                .add_text("dirName", "x"),
        )
        .await;

    // Domain failures keep HTTP 200 unless strict mode is on.
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "3003");
}

#[tokio::test]
async fn test_new_without_parent() {
    let (server, db) = create_test_server().await;

    let body = server
        .post("/api/file/new")
        .multipart(
            MultipartForm::new()
                .add_text("flag", "directory")
                .add_text("dirName", "orphan"),
        )
        .await
        .json::<Value>();
    assert_eq!(body["status"], "3003");

    let form = MultipartForm::new().add_part(
        "files",
        Part::bytes(b"x".to_vec()).file_name("orphan.txt"),
    );
    let body = server
        .post("/api/file/new")
        .multipart(form)
        .await
        .json::<Value>();
    assert_eq!(body["status"], "3003");

    let body = upload(&server, "", &[("orphan.txt", "x")]).await;
    assert_eq!(body["status"], "3003");

    let children = NamespaceStore::new(&db).list_children("/").await.unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
async fn test_info_root_lists_sorted_children() {
    let (server, _db) = create_test_server().await;

    mkdir(&server, "/", "zeta").await;
    mkdir(&server, "/", "alpha").await;
    upload(&server, "/", &[("middle.txt", "m")]).await;

    let body = server.get("/api/file/info/").await.json::<Value>();
    assert_eq!(body["status"], "2002");
    assert_eq!(body["data"]["isLeaf"], false);
    assert_eq!(names(&body), vec!["alpha", "middle.txt", "zeta"]);
}

#[tokio::test]
async fn test_info_file_is_leaf() {
    let (server, _db) = create_test_server().await;

    mkdir(&server, "/", "docs").await;
    upload(&server, "/docs", &[("a.txt", "hello")]).await;

    let body = server.get("/api/file/info/docs/a.txt").await.json::<Value>();
    assert_eq!(body["data"]["isLeaf"], true);
    let node = &body["data"]["nodes"][0];
    assert_eq!(node["url"], "https://files.example/a.txt");
    assert_eq!(node["size"], "5 B");
    assert_eq!(node["parent"], "/docs");
}

#[tokio::test]
async fn test_info_missing() {
    let (server, _db) = create_test_server().await;

    let body = server.get("/api/file/info/ghost").await.json::<Value>();
    assert_eq!(body["status"], "3005");
}

#[tokio::test]
async fn test_exist() {
    let (server, _db) = create_test_server().await;
    mkdir(&server, "/", "docs").await;

    let body = server.get("/api/file/exist/docs").await.json::<Value>();
    assert_eq!(body["status"], "2002");
    assert_eq!(body["message"], "true");
    assert_eq!(body["data"]["exists"], true);
    assert_eq!(body["data"]["node"]["name"], "docs");

    let body = server.get("/api/file/exist/nothing").await.json::<Value>();
    assert_eq!(body["message"], "false");
    assert_eq!(body["data"]["exists"], false);
}

#[tokio::test]
async fn test_upload_batch() {
    let (server, _db) = create_test_server().await;
    mkdir(&server, "/", "docs").await;

    let body = upload(&server, "/docs", &[("one.txt", "1"), ("two.txt", "22")]).await;
    assert_eq!(body["status"], "2002");
    let created = body["data"].as_array().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["fullPath"], "/docs/one.txt");
    assert_eq!(created[1]["fullPath"], "/docs/two.txt");
}

#[tokio::test]
async fn test_upload_batch_failure_rolls_back() {
    let (server, db) = create_test_server().await;

    let body = upload(
        &server,
        "/",
        &[("one.txt", "1"), ("reject.txt", "2"), ("three.txt", "3")],
    )
    .await;

    assert_eq!(body["status"], "31");
    assert_eq!(body["message"], "The file is too large.");

    let children = NamespaceStore::new(&db).list_children("/").await.unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
async fn test_upload_collision_is_disambiguated() {
    let (server, _db) = create_test_server().await;

    upload(&server, "/", &[("report.txt", "old")]).await;
    let body = upload(&server, "/", &[("report.txt", "new")]).await;

    assert_eq!(body["status"], "2002");
    let renamed = body["data"][0]["name"].as_str().unwrap();
    assert_ne!(renamed, "report.txt");
    assert!(renamed.ends_with("_report.txt"));

    let original = server
        .get("/api/file/info/report.txt")
        .await
        .json::<Value>();
    assert_eq!(original["data"]["nodes"][0]["size"], "3 B");
}

#[tokio::test]
async fn test_update_renames_directory_with_children() {
    let (server, _db) = create_test_server().await;

    let dir = mkdir(&server, "/", "a").await;
    let id = dir["data"]["id"].as_i64().unwrap();
    mkdir(&server, "/a", "b").await;

    let body = server
        .put("/api/file/update")
        .form(&[("fileName", "/x".to_string()), ("id", id.to_string())])
        .await
        .json::<Value>();
    assert_eq!(body["status"], "2002");
    assert_eq!(body["data"]["fullPath"], "/x");

    let child = server.get("/api/file/exist/x/b").await.json::<Value>();
    assert_eq!(child["data"]["node"]["parent"], "/x");
    let old = server.get("/api/file/exist/a/b").await.json::<Value>();
    assert_eq!(old["data"]["exists"], false);
}

#[tokio::test]
async fn test_update_bad_id() {
    let (server, _db) = create_test_server().await;

    let body = server
        .put("/api/file/update")
        .form(&[("fileName", "/x"), ("id", "not-a-number")])
        .await
        .json::<Value>();
    assert_eq!(body["status"], "3004");
}

#[tokio::test]
async fn test_update_name_taken() {
    let (server, _db) = create_test_server().await;

    let a = mkdir(&server, "/", "a").await;
    mkdir(&server, "/", "b").await;
    let id = a["data"]["id"].as_i64().unwrap();

    let body = server
        .put("/api/file/update")
        .form(&[("fileName", "/b".to_string()), ("id", id.to_string())])
        .await
        .json::<Value>();
    assert_eq!(body["status"], "3004");
}

// Moving under a parent that does not exist is rejected like create.
#[tokio::test]
async fn test_update_missing_new_parent() {
    let (server, _db) = create_test_server().await;

    let a = mkdir(&server, "/", "a").await;
    let id = a["data"]["id"].as_i64().unwrap();

    let body = server
        .put("/api/file/update")
        .form(&[("fileName", "/ghost/a".to_string()), ("id", id.to_string())])
        .await
        .json::<Value>();
    assert_eq!(body["status"], "3003");
}

#[tokio::test]
async fn test_delete_subtree() {
    let (server, _db) = create_test_server().await;

    mkdir(&server, "/", "a").await;
    mkdir(&server, "/a", "b").await;
    upload(&server, "/a/b", &[("c.txt", "c")]).await;

    let body = server.delete("/api/file/a").await.json::<Value>();
    assert_eq!(body["status"], "2002");
    assert_eq!(body["data"]["removed"], 3);

    let root = server.get("/api/file/info/").await.json::<Value>();
    assert!(names(&root).is_empty());
}

#[tokio::test]
async fn test_delete_missing_is_success() {
    let (server, _db) = create_test_server().await;

    let body = server.delete("/api/file/never/was").await.json::<Value>();
    assert_eq!(body["status"], "2002");
    assert_eq!(body["data"]["removed"], 0);
}

#[tokio::test]
async fn test_unknown_action() {
    let (server, _db) = create_test_server().await;

    let body = server.get("/api/file/list/").await.json::<Value>();
    assert_eq!(body["status"], "3005");
}

#[tokio::test]
async fn test_strict_http_status() {
    let (server, _db) = create_test_server_with(ServerConfig {
        strict_http_status: true,
        ..Default::default()
    })
    .await;

    mkdir(&server, "/", "docs").await;

    server
        .get("/api/file/info/docs")
        .await
        .assert_status_ok();
    server
        .get("/api/file/info/ghost")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .post("/api/file/new")
        .multipart(
            MultipartForm::new()
                .add_text("flag", "directory")
                .add_text("parent", "/")
                .add_text("dirName", "docs"),
        )
        .expect_failure()
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["status"], "3004");
}
