//! HTTP handlers.
//!
//! Routing mirrors a catch-all `/` pattern: `/metrics` is the only named
//! route, every other path lands on the root handler and is counted.

use hello_metrics_common::{scrape_response, MetricsContext};
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use tracing::{debug, info};

/// Body returned by the root route.
pub const GREETING: &str = "Hello from Rust service!";

/// Path of the Prometheus scrape route.
pub const METRICS_PATH: &str = "/metrics";

/// Dispatch one request.
///
/// Never fails: every outcome, including a rejected method, is an HTTP
/// response. The error type only exists to satisfy `service_fn`.
pub async fn handle_request(
    req: Request<Body>,
    metrics: MetricsContext,
) -> Result<Response<Body>, hyper::Error> {
    // ---
    if req.uri().path() == METRICS_PATH {
        return Ok(handle_metrics(req.method(), &metrics));
    }
    Ok(handle_root(&req, &metrics))
}

fn handle_root(req: &Request<Body>, metrics: &MetricsContext) -> Response<Body> {
    // ---
    metrics.requests_total.inc();
    info!(method = %req.method(), path = req.uri().path(), "handled request");

    let mut resp = Response::new(Body::from(GREETING));
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    resp
}

fn handle_metrics(method: &Method, metrics: &MetricsContext) -> Response<Body> {
    // ---
    match *method {
        Method::GET | Method::HEAD => {
            debug!("serving scrape");
            scrape_response(metrics.registry())
        }
        _ => {
            let mut resp = Response::new(Body::from("method not allowed"));
            *resp.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
            resp.headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            resp
        }
    }
}
