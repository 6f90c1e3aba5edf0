// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

// Build full in-process app (config from the repo, classifier trained, /metrics mounted).
async fn build_app() -> Router {
    market_sentiment::app()
        .await
        .expect("app() should build Router in tests")
}

async fn metrics_text(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    String::from_utf8(body.to_vec()).unwrap()
}

#[serial_test::serial]
#[tokio::test]
async fn metrics_endpoint_contains_pipeline_series() {
    let app = build_app().await;

    let csv = "timestamp,text\n2025-09-01 09:00,strong rally\nnot a date,weak slump\n";
    for uri in ["/analyze", "/analyze?engine=classifier"] {
        let resp = app
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "text/csv")
                    .body(Body::from(csv))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let text = metrics_text(&app).await;
    for needle in [
        "sentiment_batches_total",
        "sentiment_records_scored_total",
        "ingest_rows_total",
        "ingest_timestamp_fallbacks_total",
        "classifier_train_ms",
        "classifier_vocabulary_size",
    ] {
        assert!(text.contains(needle), "missing {needle} in:\n{text}");
    }
    assert!(text.contains("engine=\"lexicon\""));
    assert!(text.contains("engine=\"classifier\""));
}

#[serial_test::serial]
#[tokio::test]
async fn app_can_be_built_twice_in_one_process() {
    let a = build_app().await;
    let b = build_app().await;
    // Both share the one process-wide recorder.
    assert!(metrics_text(&a).await.contains("classifier_train_ms"));
    assert!(metrics_text(&b).await.contains("classifier_train_ms"));
}
