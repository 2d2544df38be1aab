use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use flate2::read::GzDecoder;
use rawhttp::files::{FileError, FileStore};
use rawhttp::http::request::{Method, Request, RequestBuilder};
use rawhttp::http::response::StatusCode;
use rawhttp::router::{RouteError, Router};

fn get(path: &str) -> RequestBuilder {
    RequestBuilder::new().method(Method::GET).path(path)
}

fn post(path: &str, body: &[u8]) -> RequestBuilder {
    RequestBuilder::new()
        .method(Method::POST)
        .path(path)
        .header("Content-Length", body.len().to_string())
        .body(body.to_vec())
}

fn route(router: &Router, req: Request) -> rawhttp::http::response::Response {
    router.route(&req).unwrap()
}

/// Store whose every operation fails with a permission error.
struct LockedStore;

impl FileStore for LockedStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, FileError> {
        Err(FileError::Io {
            path: PathBuf::from(name),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        })
    }

    fn write(&self, name: &str, _contents: &[u8]) -> Result<(), FileError> {
        Err(FileError::Io {
            path: PathBuf::from(name),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        })
    }
}

#[test]
fn test_root_is_empty_ok() {
    let response = route(&Router::default(), get("/").build().unwrap());

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.body.is_empty());
}

#[test]
fn test_echo() {
    let response = route(&Router::default(), get("/echo/hello").build().unwrap());

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"hello".to_vec());
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.header("Content-Length"), Some("5"));
}

#[test]
fn test_echo_keeps_percent_encoding() {
    let response = route(&Router::default(), get("/echo/a%20b").build().unwrap());

    assert_eq!(response.body, b"a%20b".to_vec());
}

#[test]
fn test_user_agent() {
    let req = get("/user-agent").header("User-Agent", "test-agent").build().unwrap();
    let response = route(&Router::default(), req);

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"test-agent".to_vec());
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
}

#[test]
fn test_user_agent_missing_header() {
    let response = route(&Router::default(), get("/user-agent").build().unwrap());

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.body.is_empty());
    assert_eq!(response.header("Content-Length"), Some("0"));
}

#[test]
fn test_unknown_get_path_is_not_found() {
    let response = route(&Router::default(), get("/nonexistent").build().unwrap());

    assert_eq!(response.status, StatusCode::NotFound);
    assert!(response.body.is_empty());
}

#[test]
fn test_response_mirrors_request_version() {
    let req = get("/echo/x").version("HTTP/1.0").build().unwrap();
    let response = route(&Router::default(), req);

    assert_eq!(response.version, "HTTP/1.0");
}

#[test]
fn test_post_outside_files_is_bad_request() {
    let response = route(&Router::default(), post("/echo/x", b"hi").build().unwrap());

    assert_eq!(response.status, StatusCode::BadRequest);
}

#[test]
fn test_other_methods_are_not_allowed() {
    for path in ["/", "/echo/x", "/files/a", "/nowhere"] {
        let req = RequestBuilder::new()
            .method(Method::from("DELETE"))
            .path(path)
            .build()
            .unwrap();
        let response = route(&Router::default(), req);

        assert_eq!(response.status, StatusCode::MethodNotAllowed, "path {}", path);
    }
}

#[test]
fn test_files_without_directory_are_not_found() {
    let router = Router::default();
    assert!(!router.serves_files());

    let read = route(&router, get("/files/a.txt").build().unwrap());
    let write = route(&router, post("/files/a.txt", b"hi").build().unwrap());

    assert_eq!(read.status, StatusCode::NotFound);
    assert_eq!(write.status, StatusCode::NotFound);
}

#[test]
fn test_write_then_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::with_directory(Some(dir.path().to_path_buf()));

    let created = route(&router, post("/files/foo.txt", b"hi").build().unwrap());
    assert_eq!(created.status, StatusCode::Created);
    assert!(created.body.is_empty());

    let read = route(&router, get("/files/foo.txt").build().unwrap());
    assert_eq!(read.status, StatusCode::Ok);
    assert_eq!(read.body, b"hi".to_vec());
    assert_eq!(read.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(read.header("Content-Length"), Some("2"));
}

#[test]
fn test_write_truncates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("foo.txt"), b"previous contents").unwrap();
    let router = Router::with_directory(Some(dir.path().to_path_buf()));

    route(&router, post("/files/foo.txt", b"new").build().unwrap());

    assert_eq!(std::fs::read(dir.path().join("foo.txt")).unwrap(), b"new");
}

#[test]
fn test_write_requires_numeric_content_length() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::with_directory(Some(dir.path().to_path_buf()));

    let missing = RequestBuilder::new()
        .method(Method::POST)
        .path("/files/a")
        .body(b"hi".to_vec())
        .build()
        .unwrap();
    let garbage = RequestBuilder::new()
        .method(Method::POST)
        .path("/files/a")
        .header("Content-Length", "two")
        .build()
        .unwrap();

    let signed = RequestBuilder::new()
        .method(Method::POST)
        .path("/files/a")
        .header("Content-Length", "+2")
        .body(b"hi".to_vec())
        .build()
        .unwrap();

    assert_eq!(route(&router, missing).status, StatusCode::BadRequest);
    assert_eq!(route(&router, garbage).status, StatusCode::BadRequest);
    assert_eq!(route(&router, signed).status, StatusCode::BadRequest);
    assert!(!dir.path().join("a").exists());
}

#[test]
fn test_write_with_short_body_does_not_fault() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::with_directory(Some(dir.path().to_path_buf()));

    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/files/a")
        .header("Content-Length", "10")
        .body(b"hi".to_vec())
        .build()
        .unwrap();

    assert_eq!(route(&router, req).status, StatusCode::BadRequest);
}

#[test]
fn test_write_uses_only_declared_length() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::with_directory(Some(dir.path().to_path_buf()));

    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/files/a")
        .header("Content-Length", "2")
        .body(b"hi there".to_vec())
        .build()
        .unwrap();

    assert_eq!(route(&router, req).status, StatusCode::Created);
    assert_eq!(std::fs::read(dir.path().join("a")).unwrap(), b"hi");
}

#[test]
fn test_path_traversal_is_not_found() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(outer.path().join("secret"), b"top secret").unwrap();
    let router = Router::with_directory(Some(root));

    let response = route(&router, get("/files/../secret").build().unwrap());
    assert_eq!(response.status, StatusCode::NotFound);
    assert!(response.body.is_empty());

    let response = route(&router, get("/files/../../etc/passwd").build().unwrap());
    assert_eq!(response.status, StatusCode::NotFound);
}

#[test]
fn test_path_traversal_write_is_rejected() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    std::fs::create_dir(&root).unwrap();
    let router = Router::with_directory(Some(root));

    let response = route(&router, post("/files/../escaped", b"x").build().unwrap());

    assert_eq!(response.status, StatusCode::BadRequest);
    assert!(!outer.path().join("escaped").exists());
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::with_directory(Some(dir.path().to_path_buf()));

    let response = route(&router, get("/files/nope").build().unwrap());

    assert_eq!(response.status, StatusCode::NotFound);
}

#[test]
fn test_file_fault_escapes_router() {
    let router = Router::new(Some(Arc::new(LockedStore)));

    let read = router.route(&get("/files/a").build().unwrap());
    let write = router.route(&post("/files/a", b"hi").build().unwrap());

    assert!(matches!(read, Err(RouteError::Io(FileError::Io { .. }))));
    assert!(matches!(write, Err(RouteError::Io(FileError::Io { .. }))));
}

#[test]
fn test_gzip_compresses_body() {
    let req = get("/echo/abc").header("Accept-Encoding", "gzip").build().unwrap();
    let response = route(&Router::default(), req);

    assert_eq!(response.header("Content-Encoding"), Some("gzip"));
    assert_eq!(
        response.header("Content-Length"),
        Some(response.body.len().to_string().as_str())
    );

    let mut decoded = String::new();
    GzDecoder::new(&response.body[..])
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "abc");
}

#[test]
fn test_unsupported_encoding_is_ignored() {
    let req = get("/echo/abc")
        .header("Accept-Encoding", "invalid-encoding")
        .build()
        .unwrap();
    let response = route(&Router::default(), req);

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Encoding"), None);
    assert_eq!(response.body, b"abc".to_vec());
}

#[test]
fn test_gzip_skips_empty_body() {
    let req = get("/").header("Accept-Encoding", "gzip").build().unwrap();
    let response = route(&Router::default(), req);

    assert_eq!(response.header("Content-Encoding"), None);
    assert!(response.body.is_empty());
}
