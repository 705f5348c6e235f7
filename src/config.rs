//! Command line and environment configuration.

pub const DEFAULT_RUNTIME_ENDPOINT: &str = "unix:///var/run/cri-dockerd.sock";
pub const DEFAULT_BIND_ADDR: &str = ":9000";
pub const DEFAULT_METRICS_PREFIX: &str = "cri";

/// A CRI exporter to export container runtime info to Prometheus.
#[derive(Debug, Clone, PartialEq, Eq, clap::Parser)]
#[command(name = "cri-exporter", version, about)]
pub struct Config {
    /// The endpoint of the container runtime service.
    #[arg(
        long,
        env = "CRI_EXPORTER_RUNTIME_ENDPOINT",
        default_value = DEFAULT_RUNTIME_ENDPOINT
    )]
    pub container_runtime_endpoint: String,

    /// The address to bind the HTTP server to expose metrics. `:port` binds
    /// all interfaces.
    #[arg(long, env = "CRI_EXPORTER_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: String,

    /// The prefix for the metric names. Empty for no prefix.
    #[arg(
        long,
        env = "CRI_EXPORTER_METRICS_PREFIX",
        default_value = DEFAULT_METRICS_PREFIX
    )]
    pub metrics_name_prefix: String,
}

impl Config {
    /// The bind address in a form [`tokio::net::TcpListener::bind`] accepts.
    pub fn listen_addr(&self) -> String {
        let addr = self.bind_addr.trim();
        if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_owned()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container_runtime_endpoint: DEFAULT_RUNTIME_ENDPOINT.to_owned(),
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            metrics_name_prefix: DEFAULT_METRICS_PREFIX.to_owned(),
        }
    }
}
