//! CRI Exporter: exposes the state of a Kubernetes container runtime as
//! Prometheus metrics.
//!
//! On every scrape of `/metrics` the exporter queries the runtime over its CRI
//! gRPC API (version, health conditions, runtime config, pods, images,
//! containers and image filesystem usage) and renders the answers as gauges.
//! Nothing is cached between scrapes.
use std::time::Duration;

use tokio::net::TcpListener;

pub mod api;
pub mod config;
pub mod cri;
pub mod error;
pub mod grpc;
pub mod metrics;
#[cfg(test)]
mod testutil;

pub use config::Config;
pub use error::{Error, Result};

pub mod runtime {
    pub mod v1 {
        tonic::include_proto!("runtime.v1");
    }
}

/// Upper bound for in-flight requests to finish after a shutdown signal.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the exporter until SIGINT or SIGTERM.
///
/// # Errors
///
/// Possible errors include:
/// - An unparsable runtime endpoint or metric name prefix.
/// - Failure to bind the HTTP listener.
/// - The HTTP server failing, or not shutting down within [`SHUTDOWN_TIMEOUT`].
pub async fn run(config: Config) -> Result<()> {
    log::info!(
        "Using container runtime endpoint `{}`",
        config.container_runtime_endpoint
    );
    let agent = cri::CriAgent::connect(&config.container_runtime_endpoint)?;
    let capabilities = metrics::Capabilities::detect();
    log::debug!("Runtime capabilities: {:?}", capabilities);
    let collector =
        metrics::RuntimeCollector::new(agent, &config.metrics_name_prefix, capabilities)?;
    let server = api::APIServer::new(collector)?;

    let listener = bind(&config.listen_addr()).await?;
    serve(server, listener, shutdown_signal(), SHUTDOWN_TIMEOUT).await
}

/// Binds the HTTP listener on `addr`.
///
/// # Errors
///
/// Returns [`Error::Bind`] if the address is invalid or already in use.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.to_owned(),
            source,
        })?;
    match listener.local_addr() {
        Ok(local) => log::info!("Listening on {}", local),
        Err(_) => log::info!("Listening on {}", addr),
    }
    Ok(listener)
}

/// Serves `server` on `listener` until `shutdown` resolves, then gives
/// in-flight requests `grace` to finish.
///
/// # Errors
///
/// Returns the error `shutdown` resolves to, a server failure, or
/// [`Error::ShutdownTimeout`] if requests are still running after `grace`.
pub async fn serve<F>(
    server: api::APIServer,
    listener: TcpListener,
    shutdown: F,
    grace: Duration,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(server.serve(listener, async move {
        let _ = shutdown_rx.await;
    }));

    tokio::select! {
        joined = &mut server => return server_result(joined),
        signal = shutdown => {
            if let Err(err) = signal {
                server.abort();
                return Err(err);
            }
        }
    }

    log::info!("Shutting down HTTP server");
    let _ = shutdown_tx.send(());
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => server_result(joined),
        Err(_) => Err(Error::ShutdownTimeout(grace)),
    }
}

fn server_result(
    joined: std::result::Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<()> {
    joined.map_err(Error::ServerTask)?.map_err(Error::Serve)
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).map_err(Error::Signal)?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.map_err(Error::Signal)?;
                log::info!("Received SIGINT");
            }
            _ = sigterm.recv() => log::info!("Received SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map_err(Error::Signal)?;
        log::info!("Received Ctrl+C");
    }

    Ok(())
}
