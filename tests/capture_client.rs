//! ScreenshotOne client against a local HTTP server.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::Router;

use copyrot::capture::{CaptureError, PageCapture, ScreenshotOneClient};
use copyrot::config::CaptureSettings;

use common::{page_png, response, serve, PAGE_HEIGHT, PAGE_WIDTH};

fn settings(base: &str) -> CaptureSettings {
    CaptureSettings {
        api_url: format!("{}/take", base),
        access_key: Some("test-key".to_string()),
        retry_delay_secs: 0,
        rate_limit_delay_secs: 0,
        ..CaptureSettings::default()
    }
}

/// Server answering with `statuses[hit]`, then the test page once exhausted.
async fn scripted_server(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let page = page_png();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        let statuses = statuses.clone();
        let page = page.clone();
        async move {
            let hit = counter.fetch_add(1, Ordering::SeqCst);
            match statuses.get(hit) {
                Some(&status) => response(status, &[], b"upstream said no".to_vec()),
                None => response(200, &[("content-type", "image/png")], page),
            }
        }
    });
    (serve(app).await, hits)
}

#[tokio::test]
async fn test_invalid_key_is_fatal_without_retry() {
    let (base, hits) = scripted_server(vec![401, 401, 401]).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();

    let err = client.capture("https://acme.test").await.unwrap_err();

    assert!(matches!(err, CaptureError::InvalidCredentials));
    assert!(err.is_fatal());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhausted_quota_is_fatal() {
    let (base, hits) = scripted_server(vec![402]).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();

    let err = client.capture("https://acme.test").await.unwrap_err();

    assert!(matches!(err, CaptureError::QuotaExhausted));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let (base, hits) = scripted_server(vec![500, 429]).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();

    let capture = client.capture("https://acme.test").await.unwrap();

    assert_eq!((capture.width, capture.height), (PAGE_WIDTH, PAGE_HEIGHT));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_persistent_errors_give_up_after_max_attempts() {
    let (base, hits) = scripted_server(vec![503, 503, 503, 503]).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();

    let err = client.capture("https://acme.test").await.unwrap_err();

    match err {
        CaptureError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream said no");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_non_image_body_is_rejected() {
    let app = Router::new().fallback(|| async { response(200, &[], b"<html></html>".to_vec()) });
    let base = serve(app).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();

    let err = client.capture("https://acme.test").await.unwrap_err();

    assert!(matches!(err, CaptureError::InvalidImage(_)));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_capture_sends_full_page_parameters() {
    let seen: Arc<Mutex<Option<HashMap<String, String>>>> = Arc::new(Mutex::new(None));
    let recorder = seen.clone();
    let page = page_png();
    let app = Router::new().fallback(move |Query(params): Query<HashMap<String, String>>| {
        let recorder = recorder.clone();
        let page = page.clone();
        async move {
            *recorder.lock().unwrap() = Some(params);
            response(200, &[], page)
        }
    });
    let base = serve(app).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();

    client.capture("https://acme.test/about").await.unwrap();

    let params = seen.lock().unwrap().take().unwrap();
    assert_eq!(params["access_key"], "test-key");
    assert_eq!(params["url"], "https://acme.test/about");
    assert_eq!(params["full_page"], "true");
    assert_eq!(params["device_scale_factor"], "2");
    assert_eq!(params["format"], "png");
}

#[tokio::test]
async fn test_validate_maps_credential_errors() {
    let (base, _) = scripted_server(vec![401]).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();
    assert!(matches!(
        client.validate().await,
        Err(CaptureError::InvalidCredentials)
    ));

    let (base, _) = scripted_server(vec![]).await;
    let client = ScreenshotOneClient::new(&settings(&base)).unwrap();
    assert!(client.validate().await.is_ok());
}

#[test]
fn test_missing_access_key_is_rejected() {
    let settings = CaptureSettings::default();
    assert!(matches!(
        ScreenshotOneClient::new(&settings),
        Err(CaptureError::Config(_))
    ));
}
