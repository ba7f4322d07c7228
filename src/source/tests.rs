//! Tests for remote sources

use super::*;
use crate::error::Error;
use crate::http::HttpClient;
use crate::types::SourceFile;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// GitHub Folder Tests
// ============================================================================

#[tokio::test]
async fn test_github_list_preserves_order() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/kariycha/trips/contents/data/source"))
        .and(query_param("ref", "main"))
        .and(header("Accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "yellow.parquet", "type": "file", "download_url": format!("{base}/raw/yellow.parquet")},
            {"name": "README.md", "type": "file", "download_url": format!("{base}/raw/README.md")},
            {"name": "green.parquet", "type": "file", "download_url": format!("{base}/raw/green.parquet")},
            {"name": "archive", "type": "dir", "download_url": null}
        ])))
        .mount(&mock_server)
        .await;

    let source = GithubFolderSource::with_client(
        &format!("{base}/repos/kariycha/trips/contents/data/source?ref=main"),
        HttpClient::new().unwrap(),
    )
    .unwrap();

    let files = source.list().await.unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["yellow.parquet", "README.md", "green.parquet", "archive"]
    );
    assert!(files[3].download_url.is_none());
}

#[tokio::test]
async fn test_github_list_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "API rate limit exceeded"
        })))
        .mount(&mock_server)
        .await;

    let source = GithubFolderSource::with_client(
        &format!("{}/repos/a/b/contents/c", mock_server.uri()),
        HttpClient::new().unwrap(),
    )
    .unwrap();

    let result = source.list().await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 403, .. })));
}

#[tokio::test]
async fn test_github_list_not_an_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "single"})))
        .mount(&mock_server)
        .await;

    let source = GithubFolderSource::with_client(
        &format!("{}/repos/a/b/contents/c", mock_server.uri()),
        HttpClient::new().unwrap(),
    )
    .unwrap();

    assert!(matches!(source.list().await, Err(Error::JsonParse(_))));
}

#[test]
fn test_github_invalid_listing_url() {
    let result = GithubFolderSource::with_client("not a url", HttpClient::new().unwrap());
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn test_fetch_without_download_url() {
    let source = GithubFolderSource::with_client(
        "https://api.github.com/repos/a/b/contents/c",
        HttpClient::new().unwrap(),
    )
    .unwrap();

    let entry = SourceFile {
        name: "dir.parquet".to_string(),
        download_url: None,
    };
    let result = source.fetch(&entry).await;
    match result {
        Err(Error::Retrieval { name, .. }) => assert_eq!(name, "dir.parquet"),
        other => panic!("Expected retrieval error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_missing_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/gone.parquet"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let source = GithubFolderSource::with_client(
        &format!("{}/listing", mock_server.uri()),
        HttpClient::new().unwrap(),
    )
    .unwrap();

    let entry = SourceFile::new(
        "gone.parquet",
        format!("{}/raw/gone.parquet", mock_server.uri()),
    );
    let err = source.fetch(&entry).await.unwrap_err();
    assert!(err.to_string().contains("gone.parquet"));
    assert!(err.to_string().contains("404"));
}

// ============================================================================
// Direct URL Tests
// ============================================================================

#[tokio::test]
async fn test_direct_url_lists_itself() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/source/green_tripdata_2025-05.parquet"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PAR1".to_vec()))
        .mount(&mock_server)
        .await;

    let url = format!(
        "{}/data/source/green_tripdata_2025-05.parquet",
        mock_server.uri()
    );
    let source = DirectUrlSource::new(&url).unwrap();
    assert_eq!(source.locator(), url);

    let files = source.list().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "green_tripdata_2025-05.parquet");

    let bytes = source.fetch(&files[0]).await.unwrap();
    assert_eq!(&bytes[..], b"PAR1");
}

#[test]
fn test_direct_url_without_file_name() {
    let result = DirectUrlSource::new("https://example.com/");
    assert!(matches!(result, Err(Error::Config { .. })));
}
