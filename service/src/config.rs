//! Runtime configuration for the hello service.

use std::net::SocketAddr;

/// Port the service answers on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8081;

/// Default value of the `process` constant label on every metric.
pub const DEFAULT_PROCESS_NAME: &str = "hello-service";

/// Settings needed to start the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    // ---
    /// Address of the main listener (root route and `/metrics`).
    pub listen: SocketAddr,

    /// Optional extra listener that serves only `/metrics`.
    pub metrics_bind: Option<SocketAddr>,

    /// Constant `process` label applied to the registry.
    pub process_name: String,
}

impl ServiceConfig {
    // ---
    pub fn new(listen: SocketAddr) -> Self {
        // ---
        Self {
            listen,
            metrics_bind: None,
            process_name: DEFAULT_PROCESS_NAME.to_string(),
        }
    }

    pub fn with_metrics_bind(mut self, bind: SocketAddr) -> Self {
        self.metrics_bind = Some(bind);
        self
    }

    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = name.into();
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}
