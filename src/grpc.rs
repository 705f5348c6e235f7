use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{pin, task};

use hyper_util::rt::TokioIo;
use tonic::transport::{Channel, Endpoint};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("container runtime endpoint must not be empty")]
    Empty,
    #[error("container runtime endpoint `{0}` has an empty socket path")]
    EmptySocketPath(String),
    #[error("unsupported scheme in container runtime endpoint `{0}`")]
    UnsupportedScheme(String),
    #[error("invalid container runtime endpoint `{uri}`: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: tonic::transport::Error,
    },
}

/// Address of a container runtime's CRI service.
///
/// Accepted forms:
///
/// * `unix:///run/containerd/containerd.sock`, `unix:/run/x.sock` or a bare
///   absolute path for a local socket.
/// * `tcp://host:port`, `http://host:port` or `host:port` for a plaintext TCP
///   connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEndpoint {
    Unix(PathBuf),
    Tcp(String),
}

impl FromStr for RuntimeEndpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Empty);
        }

        if let Some(path) = s.strip_prefix("unix://").or_else(|| s.strip_prefix("unix:")) {
            if path.is_empty() {
                return Err(Error::EmptySocketPath(s.to_owned()));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if s.starts_with('/') {
            return Ok(Self::Unix(PathBuf::from(s)));
        }
        if let Some(addr) = s.strip_prefix("tcp://") {
            return Ok(Self::Tcp(format!("http://{addr}")));
        }
        if s.starts_with("http://") {
            return Ok(Self::Tcp(s.to_owned()));
        }
        if s.contains("://") {
            return Err(Error::UnsupportedScheme(s.to_owned()));
        }

        Ok(Self::Tcp(format!("http://{s}")))
    }
}

#[derive(Debug, Clone)]
struct UnixConnector {
    path: PathBuf,
}

impl tower::Service<hyper::Uri> for UnixConnector {
    type Response = TokioIo<tokio::net::UnixStream>;

    type Error = std::io::Error;

    type Future = pin::Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: hyper::Uri) -> Self::Future {
        let path = self.path.clone();
        Box::pin(async move {
            let stream = tokio::net::UnixStream::connect(path).await?;

            Ok(TokioIo::new(stream))
        })
    }
}

/// Creates a channel for the given endpoint.
///
/// The connection is established on first use and re-established after
/// failures, so a runtime that is down at startup does not prevent the
/// channel from being created. Must be called within a tokio runtime.
///
/// # Errors
///
/// Returns [`Error::InvalidUri`] if a TCP endpoint is not a valid URI.
pub fn channel_for_endpoint(endpoint: &RuntimeEndpoint) -> Result<Channel, Error> {
    match endpoint {
        RuntimeEndpoint::Unix(path) => Ok(channel_for_unix_socket(path)),
        RuntimeEndpoint::Tcp(uri) => {
            log::debug!("Creating channel for {}...", uri);
            let endpoint =
                Endpoint::from_shared(uri.clone()).map_err(|source| Error::InvalidUri {
                    uri: uri.clone(),
                    source,
                })?;
            Ok(endpoint.connect_lazy())
        }
    }
}

pub fn channel_for_unix_socket(path: impl AsRef<Path>) -> Channel {
    let path = path.as_ref();
    log::debug!("Creating channel for {}...", path.display());
    let connector = UnixConnector {
        path: path.to_path_buf(),
    };
    // The authority is never resolved; the connector always dials the socket.
    Endpoint::from_static("http://[::]:50051").connect_with_connector_lazy(connector)
}
