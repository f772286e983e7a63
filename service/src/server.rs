//! Listener setup and lifecycle.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use hello_metrics_common::{MetricsContext, MetricsServerConfig};
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::handlers::handle_request;

/// A bound, serving listener.
pub struct RunningServer {
    // ---
    local_addr: SocketAddr,
    handle: JoinHandle<Result<()>>,
}

impl RunningServer {
    // ---
    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server to finish after its shutdown signal fired.
    pub async fn join(self) -> Result<()> {
        // ---
        self.handle.await.context("server task did not complete")?
    }
}

/// Bind `cfg.listen` and serve the hello routes on a background task.
///
/// Binding is synchronous so the caller sees bind errors immediately. The
/// task drains in-flight connections once `shutdown` resolves.
///
/// Must be called from within a tokio runtime.
pub fn spawn<F>(cfg: &ServiceConfig, metrics: MetricsContext, shutdown: F) -> Result<RunningServer>
where
    F: Future<Output = ()> + Send + 'static,
{
    // ---
    let make_svc = make_service_fn(move |conn: &AddrStream| {
        let metrics = metrics.clone();
        let remote = conn.remote_addr();
        async move {
            tracing::trace!("connection from {remote}");
            Ok::<_, hyper::Error>(service_fn(move |req| handle_request(req, metrics.clone())))
        }
    });

    let server = Server::try_bind(&cfg.listen)
        .with_context(|| format!("failed to bind {}", cfg.listen))?
        .serve(make_svc);
    let local_addr = server.local_addr();

    let handle = tokio::spawn(async move {
        // ---
        server
            .with_graceful_shutdown(shutdown)
            .await
            .context("http server failed")?;
        Ok(())
    });

    Ok(RunningServer { local_addr, handle })
}

/// Start the service and block until `shutdown` resolves.
pub async fn run<F>(cfg: ServiceConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    // ---
    let metrics = MetricsContext::new(&cfg.process_name)?;

    let metrics_task = match cfg.metrics_bind {
        Some(bind) => {
            let (addr, handle) = metrics.spawn_metrics_server(MetricsServerConfig::new(bind))?;
            info!("Metrics listener on http://{addr}/metrics");
            Some(handle)
        }
        None => None,
    };

    let server = spawn(&cfg, metrics, shutdown)?;
    info!("Listening on http://{}", server.local_addr());

    let result = server.join().await;

    if let Some(handle) = metrics_task {
        handle.abort();
        if let Ok(Err(e)) = handle.await {
            warn!("metrics listener exited with error: {e:#}");
        }
    }

    info!("Shut down");
    result
}
