// HTTP server tests against a real listener on an ephemeral port

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use super::test_harness::*;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap()
}

fn assert_cors(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-headers"],
        "authorization, x-client-info, apikey, content-type"
    );
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
}

// Test: POST of an INSERT event brands the object end to end
#[tokio::test]
async fn test_post_insert_event_end_to_end() {
    let storage = Arc::new(MemoryStorage::with_object(BUCKET, "photo1.jpg", base_jpeg(1000, 800)));
    let harness = ServerHarness::start(pipeline(
        config_with_logo(),
        Some(storage.clone()),
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;

    let response = client()
        .post(harness.url("/functions/v1/brand-image"))
        .header("content-type", "application/json")
        .body(insert_event("photo1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(response.headers().contains_key("x-request-id"));

    let json: Value = response.json().await.unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "ok": true,
            "path": "photo1.jpg",
            "message": "Image branded, metadata injected, and saved"
        })
    );

    let uploads = storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(&uploads[0].data[..4], &[0xFF, 0xD8, 0xFF, 0xFE]);

    harness.stop().await;
}

// Test: OPTIONS preflight returns 204 with CORS headers
#[tokio::test]
async fn test_options_preflight() {
    let harness = ServerHarness::start(pipeline(
        config_with_logo(),
        None,
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;

    let response = client()
        .request(reqwest::Method::OPTIONS, harness.url("/"))
        .header("origin", "https://admin.heritage.test")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(&response);
    assert!(response.bytes().await.unwrap().is_empty());
}

// Test: GET and PUT are rejected with 405
#[tokio::test]
async fn test_non_post_methods_are_rejected() {
    let harness = ServerHarness::start(pipeline(
        config_with_logo(),
        None,
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;

    for method in [reqwest::Method::GET, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let response = client()
            .request(method.clone(), harness.url("/"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_cors(&response);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains(method.as_str()));
    }
}

// Test: malformed JSON body is a 400
#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let harness = ServerHarness::start(pipeline(
        config_with_logo(),
        None,
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;

    let response = client()
        .post(harness.url("/"))
        .body("{\"type\": \"INSERT\",")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().starts_with("Rejected input"));
}

// Test: skip outcomes are 200 with an Ignored message
#[tokio::test]
async fn test_skipped_event_is_ok() {
    let storage = Arc::new(MemoryStorage::default());
    let harness = ServerHarness::start(pipeline(
        config_with_logo(),
        Some(storage.clone()),
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;

    let response = client()
        .post(harness.url("/"))
        .body(event_body("INSERT", "buckets", BUCKET, "photo1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["ok"], true);
    assert!(json["message"].as_str().unwrap().contains("Ignored"));
    assert!(json.get("path").is_none());
    assert_eq!(storage.download_count(), 0);
}

// Test: configuration error is a 500 with detail in the body
#[tokio::test]
async fn test_missing_logo_url_is_server_error() {
    let storage = Arc::new(MemoryStorage::with_object(BUCKET, "photo1.jpg", base_jpeg(10, 10)));
    let harness = ServerHarness::start(pipeline(
        heritage_brander::config::Config::default(),
        Some(storage.clone()),
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;

    let response = client()
        .post(harness.url("/"))
        .body(insert_event("photo1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    let json: Value = response.json().await.unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Configuration error"));
    assert_eq!(storage.download_count(), 0);
}

// Test: concurrent deliveries for different objects are independent
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deliveries() {
    let storage = Arc::new(MemoryStorage::default());
    for i in 0..8 {
        storage.put(BUCKET, &format!("batch/{i}.jpg"), base_jpeg(160, 120));
    }
    let harness = ServerHarness::start(pipeline(
        config_with_logo(),
        Some(storage.clone()),
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;

    let client = client();
    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        let url = harness.url("/");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .body(insert_event(&format!("batch/{i}.jpg")))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let mut paths: Vec<String> = storage.uploads().into_iter().map(|u| u.path).collect();
    paths.sort();
    let mut expected: Vec<String> = (0..8).map(|i| format!("batch/{i}.jpg")).collect();
    expected.sort();
    assert_eq!(paths, expected);
}

// Test: shutdown stops the accept loop
#[tokio::test]
async fn test_shutdown_stops_server() {
    let harness = ServerHarness::start(pipeline(
        config_with_logo(),
        None,
        Arc::new(StaticLogo::new(logo_png())),
    ))
    .await;
    let url = harness.url("/");

    harness.stop().await;

    let result = client().post(url).body("{}").send().await;
    assert!(result.is_err());
}
