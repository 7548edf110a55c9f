//! Archive submitters against local HTTP servers.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;

use copyrot::proof::{build_client, ArchiveTodayClient, WaybackClient};
use copyrot::retry::{CooldownKind, RetryPolicy};

use common::{response, serve};

fn quick_policy() -> RetryPolicy {
    RetryPolicy::exponential(3, Duration::from_millis(10), Duration::from_millis(40))
}

/// Router answering every request via `respond(hit_index)`.
fn counting_router<F>(hits: Arc<AtomicUsize>, respond: F) -> Router
where
    F: Fn(usize) -> axum::response::Response + Clone + Send + Sync + 'static,
{
    Router::new().fallback(move || {
        let hits = hits.clone();
        let respond = respond.clone();
        async move { respond(hits.fetch_add(1, Ordering::SeqCst)) }
    })
}

#[tokio::test]
async fn test_wayback_gives_up_after_three_server_errors() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(counting_router(hits.clone(), |_| response(500, &[], Vec::new()))).await;

    let client = WaybackClient::new(build_client().unwrap(), &format!("{}/save/", base))
        .with_policy(quick_policy());

    assert_eq!(client.save("https://acme.test").await, None);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_wayback_resolves_content_location_against_origin() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(counting_router(hits.clone(), |hit| {
        if hit == 0 {
            response(502, &[], Vec::new())
        } else {
            response(
                200,
                &[("content-location", "/web/20240603093000/https://acme.test")],
                Vec::new(),
            )
        }
    }))
    .await;

    let client = WaybackClient::new(build_client().unwrap(), &format!("{}/save/", base))
        .with_policy(quick_policy());

    let archived = client.save("https://acme.test").await;
    assert_eq!(
        archived,
        Some(format!("{}/web/20240603093000/https://acme.test", base))
    );
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_wayback_success_without_header_is_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(counting_router(hits.clone(), |_| response(200, &[], Vec::new()))).await;

    let client = WaybackClient::new(build_client().unwrap(), &format!("{}/save/", base))
        .with_policy(quick_policy());

    assert_eq!(client.save("https://acme.test").await, None);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_archive_today_rate_limit_waits_cooldown() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(counting_router(hits.clone(), |_| response(429, &[], Vec::new()))).await;

    let cooldown = Duration::from_millis(150);
    let client = ArchiveTodayClient::new(
        build_client().unwrap(),
        &format!("{}/submit/", base),
        "copyrot-test",
    )
    .with_policy(quick_policy().with_cooldown(cooldown, CooldownKind::Extra, &[429, 503]));

    let start = Instant::now();
    assert_eq!(client.save("https://acme.test").await, None);

    assert_eq!(hits.load(Ordering::SeqCst), 3);
    // Two waits between three attempts, each including the cooldown
    assert!(start.elapsed() >= cooldown * 2);
}

#[tokio::test]
async fn test_archive_today_reads_redirect_location() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(counting_router(hits.clone(), |_| {
        response(302, &[("location", "https://archive.ph/AbC12")], Vec::new())
    }))
    .await;

    let client = ArchiveTodayClient::new(
        build_client().unwrap(),
        &format!("{}/submit/", base),
        "copyrot-test",
    )
    .with_policy(quick_policy());

    assert_eq!(
        client.save("https://acme.test").await,
        Some("https://archive.ph/AbC12".to_string())
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_archive_today_reads_refresh_header() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(counting_router(hits.clone(), |_| {
        response(
            200,
            &[("refresh", "0;url=https://archive.ph/wip/XyZ9")],
            Vec::new(),
        )
    }))
    .await;

    let client = ArchiveTodayClient::new(
        build_client().unwrap(),
        &format!("{}/submit/", base),
        "copyrot-test",
    )
    .with_policy(quick_policy());

    assert_eq!(
        client.save("https://acme.test").await,
        Some("https://archive.ph/wip/XyZ9".to_string())
    );
}
