#![allow(clippy::unwrap_used)]
// Integration tests for `DroneClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dronesync_api::{DroneClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DroneClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DroneClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn records() -> serde_json::Value {
    json!([
        { "name": "fdr-1.bin", "date": "20240105T101500+0000", "url": "/data/fdr/fdr-1.bin" },
        { "name": "fdr-2.bin", "date": "20240105T111500+0000", "url": "/data/fdr/fdr-2.bin" }
    ])
}

// ── Flight logs ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_flight_logs() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/fdr/lite_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records()))
        .mount(&server)
        .await;

    let logs = client.list_flight_logs().await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].name, "fdr-1.bin");
    assert_eq!(logs[1].url_path, "/data/fdr/fdr-2.bin");
}

#[tokio::test]
async fn test_list_flight_logs_bad_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/fdr/lite_records"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_flight_logs().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_download_and_delete_flight_log() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/fdr/lite_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/fdr/fdr-1.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"FDR1".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/fdr/lite_records/lite_records/fdr-1.bin"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let logs = client.list_flight_logs().await.unwrap();
    let destination = dir.path().join("fdr-1.bin");
    client
        .download_flight_log(&logs[0], &destination)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&destination).unwrap(), b"FDR1");

    client.delete_flight_log(&logs[0]).await.unwrap();
}

#[tokio::test]
async fn test_download_not_found() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/fdr/lite_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/fdr/fdr-2.bin"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;

    let logs = client.list_flight_logs().await.unwrap();
    let result = client
        .download_flight_log(&logs[1], &dir.path().join("fdr-2.bin"))
        .await;
    assert!(
        matches!(result, Err(Error::Http { status: 404, .. })),
        "expected HTTP 404, got: {result:?}"
    );
}

// ── Certificate upload ──────────────────────────────────────────────

#[tokio::test]
async fn test_upload_certificate() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let cert = dir.path().join("drone.pem");
    std::fs::write(&cert, b"-----BEGIN CERTIFICATE-----").unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/v1/upload/certificate"))
        .and(body_bytes(b"-----BEGIN CERTIFICATE-----".to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.upload_certificate(&cert).await.unwrap();
}

#[tokio::test]
async fn test_upload_missing_file() {
    let (_server, client) = setup().await;
    let result = client
        .upload_certificate(std::path::Path::new("/nonexistent/drone.pem"))
        .await;
    assert!(matches!(result, Err(Error::Io(_))));
}
