//! Integration tests for the HTTP surface.
//!
//! Each test binds a real listener on `127.0.0.1:0`, drives it with the hyper
//! client, and checks what a Prometheus scrape would see.

use std::net::SocketAddr;

use hello_service::{spawn, MetricsContext, RunningServer, ServiceConfig, GREETING};
use hyper::{Body, Client, Method, Request, StatusCode};
use tokio::sync::oneshot;

/// Test helper: start the service with its own registry.
fn start(process_name: &str) -> (RunningServer, MetricsContext, oneshot::Sender<()>) {
    // ---
    let metrics = MetricsContext::new(process_name).expect("metrics init");
    let cfg = ServiceConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)))
        .with_process_name(process_name);
    let (tx, rx) = oneshot::channel::<()>();
    let server = spawn(&cfg, metrics.clone(), async move {
        let _ = rx.await;
    })
    .expect("bind should succeed");
    (server, metrics, tx)
}

async fn send(addr: SocketAddr, method: Method, path: &str) -> (StatusCode, String) {
    // ---
    let req = Request::builder()
        .method(method)
        .uri(format!("http://{addr}{path}"))
        .body(Body::empty())
        .expect("valid request");
    let resp = Client::new().request(req).await.expect("request should complete");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("body should read");
    (status, String::from_utf8(body.to_vec()).expect("utf-8 body"))
}

/// Value of the request counter as scraped from `/metrics`.
async fn scraped_count(addr: SocketAddr) -> u64 {
    // ---
    let (status, body) = send(addr, Method::GET, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    body.lines()
        .find(|line| line.starts_with("rust_requests_total{"))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
        .expect("rust_requests_total sample present")
}

#[tokio::test]
async fn counter_increments_once_per_root_request() {
    // ---
    let (server, metrics, tx) = start("it-root");
    let addr = server.local_addr();

    assert_eq!(scraped_count(addr).await, 0);
    for expected in 1..=3 {
        let (status, body) = send(addr, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, GREETING);
        assert_eq!(scraped_count(addr).await, expected);
    }
    assert_eq!(metrics.requests_total.get(), 3);

    tx.send(()).expect("server still waiting");
    server.join().await.expect("clean shutdown");
}

#[tokio::test]
async fn scrapes_do_not_move_the_counter() {
    // ---
    let (server, _metrics, tx) = start("it-scrape");
    let addr = server.local_addr();

    send(addr, Method::GET, "/").await;
    for _ in 0..5 {
        assert_eq!(scraped_count(addr).await, 1);
    }

    tx.send(()).expect("server still waiting");
    server.join().await.expect("clean shutdown");
}

#[tokio::test]
async fn exposition_carries_help_type_and_process_label() {
    // ---
    let (server, _metrics, tx) = start("it-label");
    let addr = server.local_addr();
    send(addr, Method::GET, "/hello").await;

    let (_, body) = send(addr, Method::GET, "/metrics").await;
    assert!(body.contains("# HELP rust_requests_total Total number of requests"));
    assert!(body.contains("# TYPE rust_requests_total counter"));
    assert!(body.contains("rust_requests_total{process=\"it-label\"} 1"));

    tx.send(()).expect("server still waiting");
    server.join().await.expect("clean shutdown");
}

#[tokio::test]
async fn other_paths_count_and_metrics_rejects_post() {
    // ---
    let (server, _metrics, tx) = start("it-routes");
    let addr = server.local_addr();

    let (status, _) = send(addr, Method::GET, "/anything/else").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(addr, Method::POST, "/metrics").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(scraped_count(addr).await, 1);

    tx.send(()).expect("server still waiting");
    server.join().await.expect("clean shutdown");
}

#[tokio::test]
async fn concurrent_requests_are_all_counted() {
    // ---
    let (server, _metrics, tx) = start("it-concurrent");
    let addr = server.local_addr();

    let tasks: Vec<_> = (0..20)
        .map(|_| tokio::spawn(async move { send(addr, Method::GET, "/").await }))
        .collect();
    for task in tasks {
        let (status, _) = task.await.expect("request task");
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(scraped_count(addr).await, 20);

    tx.send(()).expect("server still waiting");
    server.join().await.expect("clean shutdown");
}
