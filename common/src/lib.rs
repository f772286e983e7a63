//! Shared plumbing for the hello-metrics binaries.
//!
//! Holds the ambient pieces every binary needs: the Prometheus registry and
//! scrape endpoint, tracing setup, and the CLI color policy.

pub mod cli;
pub mod observability;

pub use cli::ColorWhen;
pub use observability::{
    init_tracing, scrape_response, MetricsContext, MetricsServerConfig, REQUESTS_TOTAL,
};
