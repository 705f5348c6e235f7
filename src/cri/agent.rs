use std::future::Future;

use tonic::transport::Channel;

use crate::grpc::{self, RuntimeEndpoint};
use crate::runtime::v1::image_service_client::ImageServiceClient;
use crate::runtime::v1::runtime_service_client::RuntimeServiceClient;
use crate::runtime::v1::{
    ImageFsInfoRequest, ImageFsInfoResponse, ListContainersRequest, ListContainersResponse,
    ListImagesRequest, ListImagesResponse, ListPodSandboxRequest, ListPodSandboxResponse,
    RuntimeConfigRequest, RuntimeConfigResponse, StatusRequest, StatusResponse, VersionRequest,
    VersionResponse,
};

use super::{Call, Error, Result};

/// Read-only queries against a container runtime.
///
/// Every operation is a single remote call without retries. Dropping the
/// returned future cancels the call.
pub trait RuntimeAgent {
    /// Returns the runtime name, runtime version and runtime API version.
    fn get_version(&self) -> impl Future<Output = Result<VersionResponse>> + Send;

    /// Lists all containers known to the runtime.
    fn list_containers(&self) -> impl Future<Output = Result<ListContainersResponse>> + Send;

    /// Returns the runtime health conditions.
    fn get_status(&self) -> impl Future<Output = Result<StatusResponse>> + Send;

    /// Returns the runtime configuration. Not every runtime implements it.
    fn get_runtime_config(&self) -> impl Future<Output = Result<RuntimeConfigResponse>> + Send;

    /// Lists all pod sandboxes known to the runtime.
    fn list_pods(&self) -> impl Future<Output = Result<ListPodSandboxResponse>> + Send;

    /// Lists all images known to the runtime.
    fn list_images(&self) -> impl Future<Output = Result<ListImagesResponse>> + Send;

    /// Returns usage of the filesystems used to store images.
    fn get_filesystem_info(&self) -> impl Future<Output = Result<ImageFsInfoResponse>> + Send;
}

/// [`RuntimeAgent`] backed by the CRI runtime and image services.
///
/// Both clients share one multiplexed channel; cloning the agent is cheap.
#[derive(Debug, Clone)]
pub struct CriAgent {
    runtime: RuntimeServiceClient<Channel>,
    image: ImageServiceClient<Channel>,
}

impl CriAgent {
    pub fn new(channel: Channel) -> Self {
        Self {
            runtime: RuntimeServiceClient::new(channel.clone()),
            image: ImageServiceClient::new(channel),
        }
    }

    /// Creates an agent for the given endpoint address.
    ///
    /// The connection is made lazily, so this succeeds even if the runtime is
    /// not reachable yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Endpoint`] if the endpoint cannot be parsed.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let endpoint: RuntimeEndpoint = endpoint.parse()?;
        let channel = grpc::channel_for_endpoint(&endpoint)?;
        Ok(Self::new(channel))
    }
}

impl RuntimeAgent for CriAgent {
    async fn get_version(&self) -> Result<VersionResponse> {
        let response = self
            .runtime
            .clone()
            .version(VersionRequest::default())
            .await
            .map_err(|status| Error::rpc(Call::Version, status))?;
        Ok(response.into_inner())
    }

    async fn list_containers(&self) -> Result<ListContainersResponse> {
        let response = self
            .runtime
            .clone()
            .list_containers(ListContainersRequest::default())
            .await
            .map_err(|status| Error::rpc(Call::ListContainers, status))?;
        Ok(response.into_inner())
    }

    async fn get_status(&self) -> Result<StatusResponse> {
        let response = self
            .runtime
            .clone()
            .status(StatusRequest::default())
            .await
            .map_err(|status| Error::rpc(Call::Status, status))?;
        Ok(response.into_inner())
    }

    async fn get_runtime_config(&self) -> Result<RuntimeConfigResponse> {
        let response = self
            .runtime
            .clone()
            .runtime_config(RuntimeConfigRequest::default())
            .await
            .map_err(|status| Error::rpc(Call::RuntimeConfig, status))?;
        Ok(response.into_inner())
    }

    async fn list_pods(&self) -> Result<ListPodSandboxResponse> {
        let response = self
            .runtime
            .clone()
            .list_pod_sandbox(ListPodSandboxRequest::default())
            .await
            .map_err(|status| Error::rpc(Call::ListPods, status))?;
        Ok(response.into_inner())
    }

    async fn list_images(&self) -> Result<ListImagesResponse> {
        let response = self
            .image
            .clone()
            .list_images(ListImagesRequest::default())
            .await
            .map_err(|status| Error::rpc(Call::ListImages, status))?;
        Ok(response.into_inner())
    }

    async fn get_filesystem_info(&self) -> Result<ImageFsInfoResponse> {
        let response = self
            .image
            .clone()
            .image_fs_info(ImageFsInfoRequest::default())
            .await
            .map_err(|status| Error::rpc(Call::FilesystemInfo, status))?;
        Ok(response.into_inner())
    }
}
