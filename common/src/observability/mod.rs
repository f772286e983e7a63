//! Observability utilities (metrics + tracing).

mod metrics;
mod tracing;

pub use metrics::{scrape_response, MetricsContext, MetricsServerConfig, REQUESTS_TOTAL};
pub use tracing::init_tracing;
