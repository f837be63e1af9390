use std::io::Write;

use axum::routing::get;
use axum::Router;
use kiosk_infra::{load_catalog, CatalogError};

const SLIDES: &str = r#"[
    {"title": "Welcome", "image": "/img/welcome.png"},
    {"title": "Roadmap", "image": "/img/roadmap.png", "notes": "ignored"}
]"#;

async fn serve(router: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn loads_catalog_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SLIDES.as_bytes()).unwrap();

    let catalog = load_catalog(&reqwest::Client::new(), file.path().to_str().unwrap())
        .await
        .unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(1).unwrap().title, "Roadmap");
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let err = load_catalog(&reqwest::Client::new(), path.to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }), "{err:?}");
}

#[tokio::test]
async fn malformed_catalog_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"slides": "nope"}"#).unwrap();

    let err = load_catalog(&reqwest::Client::new(), file.path().to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn loads_catalog_over_http() {
    let addr = serve(Router::new().route("/data.json", get(|| async { SLIDES }))).await;

    let catalog = load_catalog(&reqwest::Client::new(), &format!("http://{addr}/data.json"))
        .await
        .unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(0).unwrap().image, "/img/welcome.png");
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let addr = serve(Router::new()).await;

    let err = load_catalog(&reqwest::Client::new(), &format!("http://{addr}/data.json"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, CatalogError::Status { status: 404, .. }),
        "{err:?}"
    );
}
