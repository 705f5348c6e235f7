use std::fmt;

use crate::grpc;

/// A remote call issued against the container runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Version,
    ListContainers,
    Status,
    RuntimeConfig,
    ListPods,
    ListImages,
    FilesystemInfo,
}

impl Call {
    /// Fully qualified name of the gRPC method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Call::Version => "runtime.v1.RuntimeService/Version",
            Call::ListContainers => "runtime.v1.RuntimeService/ListContainers",
            Call::Status => "runtime.v1.RuntimeService/Status",
            Call::RuntimeConfig => "runtime.v1.RuntimeService/RuntimeConfig",
            Call::ListPods => "runtime.v1.RuntimeService/ListPodSandbox",
            Call::ListImages => "runtime.v1.ImageService/ListImages",
            Call::FilesystemInfo => "runtime.v1.ImageService/ImageFsInfo",
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Endpoint(#[from] grpc::Error),
    #[error("call `{call}` to the container runtime failed: {source}")]
    Rpc {
        call: Call,
        #[source]
        source: Box<tonic::Status>,
    },
}

impl Error {
    pub fn rpc(call: Call, status: tonic::Status) -> Self {
        Self::Rpc {
            call,
            source: Box::new(status),
        }
    }

    /// The call that failed, if the error originated from a remote call.
    pub fn call(&self) -> Option<Call> {
        match self {
            Error::Rpc { call, .. } => Some(*call),
            Error::Endpoint(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
