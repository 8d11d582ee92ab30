//! Integration tests for the read endpoints and their OSV interaction.

mod common;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{SAMPLE_MANIFEST, spawn_app};

#[tokio::test]
async fn health_endpoint_reports_alive() {
    let app = spawn_app().await;

    let body: Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn application_overview_flags_vulnerable_applications() {
    let app = spawn_app().await;
    app.ingest("TestApp", "Test app with deps", SAMPLE_MANIFEST)
        .await;
    app.ingest("CleanApp", "nothing wrong", "requests>=2.31\n")
        .await;

    // Only the pinned fastapi version is known-vulnerable.
    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .and(body_partial_json(
            json!({"package": {"name": "fastapi"}, "version": "==0.103.0"}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"vulns": [{"id": "GHSA-1"}]})),
        )
        .mount(&app.osv_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vulns": []})))
        .mount(&app.osv_server)
        .await;

    let overview: Vec<Value> = app
        .client
        .get(app.url("/applications"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0]["name"], "TestApp");
    assert_eq!(overview[0]["vulnerable"], true);
    assert_eq!(overview[1]["name"], "CleanApp");
    assert_eq!(overview[1]["vulnerable"], false);
}

#[tokio::test]
async fn repeated_reads_are_served_from_the_lookup_cache() {
    let app = spawn_app().await;
    app.ingest("TestApp", "Test app with deps", "fastapi==0.103.0\n")
        .await;

    // The mock tolerates exactly one upstream hit for the spec.
    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vulns": []})))
        .expect(1)
        .mount(&app.osv_server)
        .await;

    for _ in 0..3 {
        let response = app
            .client
            .get(app.url("/application/TestApp/dependencies"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/application/ghost/dependencies"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["request_id"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unique_dependencies_collapse_repeated_pairs() {
    let app = spawn_app().await;
    app.ingest("one", "first", "shared==1.0\nonly-one>=2\n").await;
    app.ingest("two", "second", "shared==1.0\n").await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vulns": []})))
        .mount(&app.osv_server)
        .await;

    let unique: Vec<Value> = app
        .client
        .get(app.url("/dependencies"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0]["name"], "shared");
    assert_eq!(unique[0]["version_specs"], "==1.0");
    assert_eq!(unique[1]["name"], "only-one");
}

#[tokio::test]
async fn dependency_detail_reports_usage_per_version_spec() {
    let app = spawn_app().await;
    app.ingest("one", "first", "shared==1.0\n").await;
    app.ingest("two", "second", "shared==1.0\n").await;
    app.ingest("three", "third", "shared==2.0\n").await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .and(body_partial_json(json!({"version": "==1.0"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"vulns": [{"id": "GHSA-9"}]})),
        )
        .mount(&app.osv_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vulns": []})))
        .mount(&app.osv_server)
        .await;

    let details: Vec<Value> = app
        .client
        .get(app.url("/dependency/shared"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["version_specs"], "==1.0");
    assert_eq!(details[0]["usage_count"], 2);
    assert_eq!(details[0]["application_usage"], json!(["one", "two"]));
    assert_eq!(details[0]["osv_vulns"], json!([{"id": "GHSA-9"}]));
    assert_eq!(details[1]["version_specs"], "==2.0");
    assert_eq!(details[1]["usage_count"], 1);

    let response = app
        .client
        .get(app.url("/dependency/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn batched_detail_issues_a_single_upstream_call() {
    let app = spawn_app().await;
    app.ingest("one", "first", "shared==1.0\n").await;
    app.ingest("two", "second", "shared==2.0\n").await;

    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .and(body_partial_json(json!({
            "queries": [
                {"version": "==1.0", "package": {"name": "shared", "ecosystem": "PyPI"}},
                {"version": "==2.0", "package": {"name": "shared", "ecosystem": "PyPI"}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"vulns": [{"id": "GHSA-7"}]}, {"vulns": []}]
        })))
        .expect(1)
        .mount(&app.osv_server)
        .await;

    let details: Vec<Value> = app
        .client
        .get(app.url("/dependency/batch/shared"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["osv_vulns"], json!([{"id": "GHSA-7"}]));
    assert_eq!(details[1]["osv_vulns"], json!([]));
}

#[tokio::test]
async fn short_batch_response_is_a_lookup_error() {
    let app = spawn_app().await;
    app.ingest("one", "first", "shared==1.0\n").await;
    app.ingest("two", "second", "shared==2.0\n").await;

    // Two queries, only one result.
    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [{"vulns": []}]})),
        )
        .mount(&app.osv_server)
        .await;

    let response = app
        .client
        .get(app.url("/dependency/batch/shared"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VULNERABILITY_LOOKUP_ERROR");
}

#[tokio::test]
async fn upstream_failure_is_never_reported_as_safe() {
    let app = spawn_app().await;
    app.ingest("TestApp", "Test app with deps", "fastapi==0.103.0\n")
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.osv_server)
        .await;

    let response = app
        .client
        .get(app.url("/applications"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VULNERABILITY_LOOKUP_ERROR");
}

#[tokio::test]
async fn dependency_no_version_spans_all_specs() {
    let app = spawn_app().await;
    app.ingest("one", "first", "shared==1.0\n").await;
    app.ingest("two", "second", "shared==2.0\n").await;

    // The versionless probe sends an empty version string.
    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .and(body_partial_json(
            json!({"version": "", "package": {"name": "shared"}}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"vulns": [{"id": "GHSA-3"}]})),
        )
        .expect(1)
        .mount(&app.osv_server)
        .await;

    let detail: Value = app
        .client
        .get(app.url("/dependency-no-version/shared"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(detail["usage_count"], 2);
    assert_eq!(detail["application_usage"], json!(["one", "two"]));
    assert_eq!(detail["osv_vulns"], json!([{"id": "GHSA-3"}]));
    assert!(detail["version_specs"].is_null());
}

#[tokio::test]
async fn explicit_version_lookup_passes_the_spec_through() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .and(body_partial_json(json!({
            "version": "==0.103.0",
            "package": {"name": "fastapi", "ecosystem": "PyPI"}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"vulns": [{"id": "GHSA-5"}]})),
        )
        .mount(&app.osv_server)
        .await;

    let body: Value = app
        .client
        .post(app.url("/dependency-version"))
        .json(&json!({"name": "fastapi", "version_spec": "==0.103.0"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["version_spec"], "==0.103.0");
    assert_eq!(body["osv_vulns"], json!([{"id": "GHSA-5"}]));
}
