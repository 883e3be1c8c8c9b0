use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use divider_core::{ChunkerConfig, DividerSettings};
use divider_tests::{test_app, test_app_with};
use serde_json::{json, Value};
use tower::ServiceExt;

fn chunk_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chunks")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, parsed)
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app(0);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["default_max_chunk_size"], 1500);
}

#[tokio::test]
async fn short_prompt_comes_back_unmarked() {
    let (status, body) = send(test_app(10), chunk_request(json!({ "text": "hello there" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], json!(["hello there"]));
    assert_eq!(body["marked"], false);
    assert_eq!(body["max_chunk_size"], 1500);
}

#[tokio::test]
async fn long_prompt_is_divided_with_requested_size() {
    let text = "x".repeat(2000);
    let (status, body) = send(
        test_app(10),
        chunk_request(json!({ "text": text, "max_chunk_size": 1500 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_chunks"], 2);
    assert_eq!(body["input_chars"], 2000);
    assert_eq!(body["marked"], true);

    let last = body["chunks"][1].as_str().unwrap();
    assert!(last.ends_with("\n\n(FINISHED)"));
}

#[tokio::test]
async fn non_positive_size_is_bad_request() {
    for size in [json!(0), json!(-10), json!(99.5)] {
        let (status, body) = send(
            test_app(10),
            chunk_request(json!({ "text": "anything", "max_chunk_size": size })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");
    }
}

#[tokio::test]
async fn size_below_leading_marker_is_unprocessable() {
    let settings = DividerSettings {
        max_chunk_size: 1500,
        chunker: ChunkerConfig::new("Do not answer yet, more is coming.", "\n\n(FINISHED)"),
    };

    let (status, body) = send(
        test_app_with(settings, 10),
        chunk_request(json!({ "text": "short", "max_chunk_size": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "configuration_error");
}

#[tokio::test]
async fn rate_limit_kicks_in_per_ip() {
    let app = test_app(1);

    let first = chunk_request(json!({ "text": "one" }));
    let (status, _) = send(app.clone(), first).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app.clone(), chunk_request(json!({ "text": "two" }))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");

    let other_ip = Request::builder()
        .method("POST")
        .uri("/v1/chunks")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::from(json!({ "text": "three" }).to_string()))
        .unwrap();
    let (status, _) = send(app, other_ip).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let text = "y".repeat(divider_api::MAX_REQUEST_BODY_BYTES + 1);
    let (status, _) = send(test_app(10), chunk_request(json!({ "text": text }))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_reports_request_metrics() {
    let app = test_app(10);

    let (status, _) = send(
        app.clone(),
        chunk_request(json!({ "text": "z ".repeat(40), "max_chunk_size": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, health) = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(health["metrics"]["requests_total"], 1);
    assert!(health["metrics"]["chunks_produced_total"].as_u64().unwrap() > 1);
}
