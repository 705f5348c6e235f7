use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;

use crate::cri::RuntimeAgent;
use crate::metrics::{self, Exposition, RuntimeCollector};

/// Header Prometheus attaches to every scrape with its timeout in seconds.
const SCRAPE_TIMEOUT_HEADER: &str = "x-prometheus-scrape-timeout-seconds";

struct AppState<A> {
    collector: RuntimeCollector<A>,
    exposition: Exposition,
}

async fn export_metrics<A>(state: State<Arc<AppState<A>>>, headers: HeaderMap) -> Response
where
    A: RuntimeAgent + Send + Sync + 'static,
{
    let samples = match state
        .collector
        .collect_within(scrape_timeout(&headers))
        .await
    {
        Ok(samples) => samples,
        Err(err) => {
            log::error!("Failed to collect container runtime metrics: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to collect container runtime metrics",
            )
                .into_response();
        }
    };

    match state
        .exposition
        .encode(state.collector.descriptors(), &samples)
    {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, state.exposition.content_type())],
            body,
        )
            .into_response(),
        Err(err) => {
            log::error!("Failed to encode metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

fn scrape_timeout(headers: &HeaderMap) -> Option<Duration> {
    let seconds = headers
        .get(SCRAPE_TIMEOUT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()?;
    let timeout = Duration::try_from_secs_f64(seconds).ok()?;
    (!timeout.is_zero()).then_some(timeout)
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    /// Creates the server exposing `collector` on `/metrics`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process-wide collectors cannot be registered.
    pub fn new<A>(collector: RuntimeCollector<A>) -> metrics::Result<Self>
    where
        A: RuntimeAgent + Send + Sync + 'static,
    {
        let exposition = Exposition::new(collector.descriptors())?;
        let state = Arc::new(AppState {
            collector,
            exposition,
        });
        let router = axum::Router::new()
            .route("/metrics", get(export_metrics::<A>))
            .with_state(state);
        Ok(Self { router })
    }

    pub fn router(&self) -> axum::Router {
        self.router.clone()
    }

    /// Serves requests on `listener` until `shutdown` resolves, then waits for
    /// in-flight requests to finish.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
