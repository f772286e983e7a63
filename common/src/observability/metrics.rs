//! Prometheus metrics (Rust `prometheus` crate).
//!
//! One `MetricsContext` is intended per process. Each binary owns its registry
//! and decides whether the scrape route lives on its main listener, on a
//! dedicated one, or both.

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Name of the root-route request counter.
pub const REQUESTS_TOTAL: &str = "rust_requests_total";

/// Configuration for the dedicated Prometheus scrape listener.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    // ---
    /// Address to bind, e.g. `127.0.0.1:9100`. Port 0 picks a free port.
    pub bind: SocketAddr,
}

impl MetricsServerConfig {
    // ---
    pub fn new(bind: SocketAddr) -> Self {
        // ---
        Self { bind }
    }
}

/// Prometheus registry + the handles the service instruments.
///
/// Clones share the underlying registry and counter, so a clone can be moved
/// into every connection task.
#[derive(Clone)]
pub struct MetricsContext {
    // ---
    registry: Registry,

    /// Requests served by the root route.
    pub requests_total: IntCounter,
}

impl MetricsContext {
    // ---
    /// Create a new registry and register the standard metrics.
    ///
    /// `process_name` is applied as a constant label (`process=<name>`).
    pub fn new(process_name: &str) -> Result<Self> {
        // ---
        let registry = Registry::new_custom(
            None,
            Some(prometheus::labels! { "process".to_string() => process_name.to_string() }),
        )
        .context("failed to create metrics registry")?;

        let requests_total =
            IntCounter::with_opts(Opts::new(REQUESTS_TOTAL, "Total number of requests"))?;
        registry.register(Box::new(requests_total.clone()))?;

        // Process CPU/memory/fd families, like the default Go client registry.
        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            requests_total,
        })
    }

    /// Borrow the underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Gather metric families from this registry.
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        // ---
        self.registry.gather()
    }

    /// Render the registry in the text exposition format.
    pub fn encode_text(&self) -> Result<Vec<u8>> {
        // ---
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.gather(), &mut buffer)
            .context("failed to encode metrics")?;
        Ok(buffer)
    }

    /// Spawns a listener that only serves `GET /metrics`.
    ///
    /// Binding happens before this returns, so bind errors are reported to the
    /// caller and the returned address carries the real port.
    pub fn spawn_metrics_server(
        &self,
        cfg: MetricsServerConfig,
    ) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
        // ---
        let registry = Arc::new(self.registry.clone());
        let make_svc = make_service_fn(move |_conn| {
            let registry = Arc::clone(&registry);
            async move {
                Ok::<_, hyper::Error>(service_fn(move |req| {
                    let registry = Arc::clone(&registry);
                    async move { handle_metrics_request(req, registry).await }
                }))
            }
        });

        let server = Server::try_bind(&cfg.bind)
            .with_context(|| format!("failed to bind metrics listener on {}", cfg.bind))?
            .serve(make_svc);
        let local_addr = server.local_addr();

        let handle = tokio::spawn(async move {
            // ---
            server.await.context("metrics listener failed")?;
            Ok(())
        });
        Ok((local_addr, handle))
    }
}

/// Build the scrape response for `registry`.
///
/// Encoding failures turn into a 500 with the error text; a scrape never
/// mutates any metric.
pub fn scrape_response(registry: &Registry) -> Response<Body> {
    // ---
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("metrics encode failed: {e}");
        let mut resp = Response::new(Body::from(format!("encode error: {e}")));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        return resp;
    }

    let mut resp = Response::new(Body::from(buffer));
    resp.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static(prometheus::TEXT_FORMAT),
    );
    resp
}

async fn handle_metrics_request(
    req: Request<Body>,
    registry: Arc<Registry>,
) -> Result<Response<Body>, hyper::Error> {
    debug!("metrics listener: {} {}", req.method(), req.uri().path());
    match (req.method(), req.uri().path()) {
        (&Method::GET | &Method::HEAD, "/metrics") => Ok(scrape_response(&registry)),
        _ => {
            let mut resp = Response::new(Body::from("not found"));
            *resp.status_mut() = StatusCode::NOT_FOUND;
            Ok(resp)
        }
    }
}
