#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid metric descriptor `{name}`: {source}")]
    Descriptor {
        name: String,
        #[source]
        source: prometheus::Error,
    },
    #[error("failed to register process collector: {0}")]
    Register(#[source] prometheus::Error),
    #[error("failed to build metric `{name}`: {source}")]
    Metric {
        name: String,
        #[source]
        source: prometheus::Error,
    },
    #[error("failed to register metric `{name}`: {source}")]
    RegisterMetric {
        name: String,
        #[source]
        source: prometheus::Error,
    },
    #[error("failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
