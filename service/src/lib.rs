//! Hello service library.
//!
//! A root route that counts every request and a `/metrics` route that
//! exposes the count for Prometheus. The binary in `src/bin` is a thin CLI
//! over [`run`]; tests drive [`spawn`] directly.

pub mod config;
pub mod handlers;
pub mod server;

pub use config::ServiceConfig;
pub use handlers::{handle_request, GREETING, METRICS_PATH};
pub use hello_metrics_common::MetricsContext;
pub use server::{run, spawn, RunningServer};
