//! Tests for the front-end asset server and its fall-through to the file loader.

use http::header::{CONTENT_TYPE, LOCATION};
use http::{Method, Request, StatusCode};
use pulseflow::services::asset_server::AssetServer;
use tempfile::TempDir;

fn get(uri: &str) -> Request<Vec<u8>> {
    Request::builder().uri(uri).body(Vec::new()).unwrap()
}

fn bundle() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>app</h1>").unwrap();
    std::fs::create_dir_all(dir.path().join("_app")).unwrap();
    std::fs::write(dir.path().join("_app").join("start.js"), "console.log(1)").unwrap();
    dir
}

#[test]
fn test_root_serves_bundle_index() {
    let dir = bundle();
    let server = AssetServer::new(Some(dir.path().to_path_buf()));
    let response = server.handle(&get("/"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"<h1>app</h1>");
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
}

#[test]
fn test_nested_asset_gets_js_type() {
    let dir = bundle();
    let server = AssetServer::new(Some(dir.path().to_path_buf()));
    let response = server.handle(&get("/_app/start.js"));
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.contains("javascript"), "got {}", content_type);
}

#[test]
fn test_escaped_asset_name_is_served() {
    let dir = bundle();
    std::fs::write(dir.path().join("_app").join("my font.css"), "body{}").unwrap();
    let server = AssetServer::new(Some(dir.path().to_path_buf()));
    let response = server.handle(&get("/_app/my%20font.css"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"body{}");
}

#[test]
fn test_encoded_parent_escape_is_not_served() {
    let dir = bundle();
    let server = AssetServer::new(Some(dir.path().join("_app")));
    let response = server.handle(&get("/%2e%2e/index.html"));
    assert_ne!(response.body(), b"<h1>app</h1>");
}

#[test]
fn test_unknown_asset_falls_through_to_redirect() {
    let dir = bundle();
    let server = AssetServer::new(Some(dir.path().to_path_buf()));
    let response = server.handle(&get("/missing.css"));
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/404");
}

#[test]
fn test_404_page_does_not_redirect_again() {
    let server = AssetServer::new(None);
    let response = server.handle(&get("/404"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_placeholder_without_bundle() {
    let server = AssetServer::new(None);
    let response = server.handle(&get("/"));
    assert_eq!(response.status(), StatusCode::OK);
    assert!(String::from_utf8_lossy(response.body()).contains("PulseFlow"));
}

#[test]
fn test_localroot_bypasses_bundle() {
    let dir = bundle();
    let files = TempDir::new().unwrap();
    let file = files.path().join("note.txt");
    std::fs::write(&file, "from disk").unwrap();

    let server = AssetServer::new(Some(dir.path().to_path_buf()));
    let path = file.to_string_lossy().replace('\\', "/");
    let uri = format!("/localroot/{}", path.trim_start_matches('/'));
    let response = server.handle(&get(&uri));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"from disk");
}

#[test]
fn test_post_goes_to_loader() {
    let dir = bundle();
    let server = AssetServer::new(Some(dir.path().to_path_buf()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/index.html")
        .body(b"x".to_vec())
        .unwrap();
    let response = server.handle(&request);
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[test]
fn test_parent_escape_is_not_served() {
    let dir = bundle();
    let server = AssetServer::new(Some(dir.path().join("_app")));
    let response = server.handle(&get("/../index.html"));
    assert_ne!(response.body(), b"<h1>app</h1>");
}
