//! Remote upload client tests.
//!
//! A small axum app on 127.0.0.1:0 stands in for the upload provider.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anonfs::config::{ServerConfig, UploadConfig};
use anonfs::{
    AnonfsError, AppState, Database, NamespaceStore, RemoteUploader, UploadClient, WebServer,
};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What the stub provider saw in one request.
#[derive(Debug, Default, Clone)]
struct Received {
    part_filename: Option<String>,
    filename_field: Option<String>,
    token: Option<String>,
    content: Vec<u8>,
}

type Log = Arc<Mutex<Vec<Received>>>;

async fn read_upload(mut multipart: Multipart) -> Received {
    let mut received = Received::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or("") {
            "file" => {
                received.part_filename = field.file_name().map(|s| s.to_string());
                received.content = field.bytes().await.unwrap().to_vec();
            }
            "filename" => received.filename_field = Some(field.text().await.unwrap()),
            "token" => received.token = Some(field.text().await.unwrap()),
            _ => {}
        }
    }
    received
}

async fn accept(State(log): State<Log>, multipart: Multipart) -> impl IntoResponse {
    let received = read_upload(multipart).await;
    let name = received.part_filename.clone().unwrap_or_default();
    let size = received.content.len();
    log.lock().unwrap().push(received);

    axum::Json(json!({
        "status": true,
        "data": {
            "file": {
                "url": {
                    "full": format!("https://files.example/xyz/{name}"),
                    "short": "https://files.example/xyz"
                },
                "metadata": {
                    "id": "xyz",
                    "name": name,
                    "size": {"bytes": size, "readable": format!("{size} B")}
                }
            }
        }
    }))
}

async fn too_large(multipart: Multipart) -> impl IntoResponse {
    read_upload(multipart).await;
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        axum::Json(json!({
            "status": false,
            "error": {"message": "The file is too large.", "type": "ERROR_FILE_TOO_LARGE", "code": 31}
        })),
    )
}

async fn refused_with_ok(multipart: Multipart) -> impl IntoResponse {
    read_upload(multipart).await;
    axum::Json(json!({
        "status": false,
        "error": {"message": "Invalid token.", "type": "ERROR_INVALID_TOKEN", "code": 40}
    }))
}

async fn bad_gateway() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>")
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

/// Start the stub provider and return its base URL and request log.
async fn spawn_provider() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/upload", post(accept))
        .route("/too-large", post(too_large))
        .route("/refused", post(refused_with_ok))
        .route("/broken", post(bad_gateway))
        .route("/slow", post(slow))
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), log)
}

fn client_for(url: String) -> UploadClient {
    UploadClient::new(&UploadConfig {
        url,
        timeout_secs: 1,
        connect_timeout_secs: 1,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_upload_success() {
    let (base, log) = spawn_provider().await;
    let client = client_for(format!("{base}/upload"));

    let uploaded = client
        .upload("report.txt", b"hello world".to_vec(), Some("secret"))
        .await
        .unwrap();

    assert_eq!(uploaded.url, "https://files.example/xyz/report.txt");
    assert_eq!(uploaded.size, "11 B");

    let received = log.lock().unwrap()[0].clone();
    assert_eq!(received.part_filename.as_deref(), Some("report.txt"));
    assert_eq!(received.filename_field.as_deref(), Some("report.txt"));
    assert_eq!(received.token.as_deref(), Some("secret"));
    assert_eq!(received.content, b"hello world");
}

#[tokio::test]
async fn test_upload_without_token() {
    let (base, log) = spawn_provider().await;
    let client = client_for(format!("{base}/upload"));

    client.upload("a.txt", b"a".to_vec(), None).await.unwrap();
    assert_eq!(log.lock().unwrap()[0].token, None);
}

#[tokio::test]
async fn test_error_envelope_is_rejected() {
    let (base, _log) = spawn_provider().await;
    let client = client_for(format!("{base}/too-large"));

    let err = client.upload("big.bin", vec![0; 64], None).await.unwrap_err();
    match err {
        AnonfsError::RemoteRejected { code, message } => {
            assert_eq!(code, "31");
            assert_eq!(message, "The file is too large.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_envelope_with_http_200() {
    let (base, _log) = spawn_provider().await;
    let client = client_for(format!("{base}/refused"));

    let err = client.upload("a.txt", b"a".to_vec(), None).await.unwrap_err();
    assert!(matches!(
        err,
        AnonfsError::RemoteRejected { ref code, .. } if code == "40"
    ));
}

#[tokio::test]
async fn test_unreadable_response_is_unavailable() {
    let (base, _log) = spawn_provider().await;
    let client = client_for(format!("{base}/broken"));

    let err = client.upload("a.txt", b"a".to_vec(), None).await.unwrap_err();
    assert!(matches!(err, AnonfsError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn test_timeout_is_unavailable() {
    let (base, _log) = spawn_provider().await;
    let client = client_for(format!("{base}/slow"));

    let err = client.upload("a.txt", b"a".to_vec(), None).await.unwrap_err();
    assert!(matches!(err, AnonfsError::RemoteUnavailable(_)));
}

/// Full path: HTTP client -> anonfs server -> stub provider.
#[tokio::test]
async fn test_server_uploads_through_provider() {
    let (base, log) = spawn_provider().await;

    let db = Database::open_in_memory().await.unwrap();
    NamespaceStore::new(&db).ensure_root().await.unwrap();
    let upload = UploadConfig {
        url: format!("{base}/upload"),
        token: Some("secret".to_string()),
        ..Default::default()
    };
    let uploader = Arc::new(UploadClient::new(&upload).unwrap());
    let state = AppState::new(Arc::new(db), uploader, upload);

    let server_config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    };
    let addr = WebServer::new(&server_config, state)
        .unwrap()
        .run_with_addr()
        .await
        .unwrap();

    let form = reqwest::multipart::Form::new()
        .text("parent", "/")
        .part(
            "files",
            reqwest::multipart::Part::bytes(b"first".to_vec()).file_name("one.txt"),
        )
        .part(
            "files",
            reqwest::multipart::Part::bytes(b"second".to_vec()).file_name("two.txt"),
        );

    let body: Value = reqwest::Client::new()
        .post(format!("http://{addr}/api/file/new"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "2002");
    assert_eq!(body["data"][0]["url"], "https://files.example/xyz/one.txt");
    assert_eq!(body["data"][1]["size"], "6 B");

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert!(log.iter().all(|r| r.token.as_deref() == Some("secret")));
}
