//! Integration tests for manifest ingestion via POST /application.

mod common;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{SAMPLE_MANIFEST, spawn_app};

/// Stub every OSV query with an empty vulnerability list.
async fn mock_no_vulns(app: &common::TestApp) {
    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vulns": []})))
        .mount(&app.osv_server)
        .await;
}

#[tokio::test]
async fn ingesting_a_manifest_creates_the_application() {
    let app = spawn_app().await;

    let response = app
        .ingest("TestApp", "Test app with deps", SAMPLE_MANIFEST)
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "TestApp");
    assert_eq!(body["description"], "Test app with deps");
}

#[tokio::test]
async fn reingesting_replaces_the_previous_snapshot() {
    let app = spawn_app().await;
    mock_no_vulns(&app).await;

    let response = app
        .ingest("TestApp", "first import", SAMPLE_MANIFEST)
        .await;
    assert_eq!(response.status(), 200);

    // Second ingest under the same name: new manifest, new description.
    let response = app
        .ingest("TestApp", "second import", "requests>=2.31\n")
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["description"], "second import");

    let deps: Vec<Value> = app
        .client
        .get(app.url("/application/TestApp/dependencies"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0]["name"], "requests");
    assert_eq!(deps[0]["version_specs"], ">=2.31");
}

#[tokio::test]
async fn normalization_sorts_constraints_within_a_spec() {
    let app = spawn_app().await;
    mock_no_vulns(&app).await;

    let response = app
        .ingest("TestApp", "Test app with deps", SAMPLE_MANIFEST)
        .await;
    assert_eq!(response.status(), 200);

    let deps: Vec<Value> = app
        .client
        .get(app.url("/application/TestApp/dependencies"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(deps.len(), 2);
    assert_eq!(deps[0]["name"], "fastapi");
    assert_eq!(deps[0]["version_specs"], "==0.103.0");
    assert_eq!(deps[1]["name"], "uvicorn");
    // Constraint tokens are sorted, not kept in manifest order.
    assert_eq!(deps[1]["version_specs"], "<0.24.0,>=0.23.0");
}

#[tokio::test]
async fn duplicate_dependency_rejects_the_whole_manifest() {
    let app = spawn_app().await;

    let response = app
        .ingest("DupApp", "dup", "requests==2.31.0\nrequests>=2.0\n")
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "DUPLICATE_DEPENDENCY");

    // Nothing was stored.
    let response = app
        .client
        .get(app.url("/application/DupApp/dependencies"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn malformed_manifest_line_is_a_bad_request() {
    let app = spawn_app().await;

    let response = app
        .ingest("BadApp", "bad", "fastapi==0.103.0\n???not-a-requirement\n")
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "MANIFEST_PARSE_ERROR");
}

#[tokio::test]
async fn lenient_mode_skips_malformed_lines() {
    let app = spawn_app().await;
    mock_no_vulns(&app).await;

    let response = app
        .ingest_lenient("LenientApp", "lenient", "fastapi==0.103.0\n???broken\n")
        .await;
    assert_eq!(response.status(), 200);

    let deps: Vec<Value> = app
        .client
        .get(app.url("/application/LenientApp/dependencies"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0]["name"], "fastapi");
}

#[tokio::test]
async fn missing_form_field_is_unprocessable() {
    let app = spawn_app().await;

    // No requirements file attached.
    let form = reqwest::multipart::Form::new()
        .text("name", "NoFile")
        .text("description", "missing file");
    let response = app
        .client
        .post(app.url("/application"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
