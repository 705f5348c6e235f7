use std::time::Duration;

use crate::cri::{self, Call, RuntimeAgent};
use crate::runtime::v1::{
    CgroupDriver, Container, FilesystemIdentifier, FilesystemUsage, Image, ImageFsInfoResponse,
    LinuxRuntimeConfiguration, ListContainersResponse, ListImagesResponse,
    ListPodSandboxResponse, PodSandbox, RuntimeCondition, RuntimeConfigResponse, RuntimeStatus,
    StatusResponse, UInt64Value, VersionResponse,
};

/// Scripted [`RuntimeAgent`] with single-call fault injection.
///
/// `cgroup_driver: None` makes the runtime config call fail as unsupported.
#[derive(Debug, Clone, Default)]
pub struct MockAgent {
    pub version: VersionResponse,
    pub conditions: Vec<(&'static str, bool, &'static str)>,
    pub omit_status: bool,
    pub cgroup_driver: Option<CgroupDriver>,
    pub pods: usize,
    pub images: usize,
    pub containers: usize,
    pub filesystems: Vec<(&'static str, u64, u64)>,
    pub failing: Option<Call>,
    pub delay: Option<Duration>,
}

impl MockAgent {
    /// containerd 1.7.0, ready, two pods, no images, one container and one
    /// image filesystem.
    pub fn scenario() -> Self {
        Self {
            version: VersionResponse {
                version: "1.0".to_owned(),
                runtime_name: "containerd".to_owned(),
                runtime_version: "1.7.0".to_owned(),
                runtime_api_version: "v1".to_owned(),
            },
            conditions: vec![("Ready", true, "")],
            pods: 2,
            images: 0,
            containers: 1,
            filesystems: vec![("/var/lib", 1000, 10)],
            ..Self::default()
        }
    }

    async fn enter(&self, call: Call) -> cri::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing == Some(call) {
            return Err(cri::Error::rpc(
                call,
                tonic::Status::unavailable("connection refused"),
            ));
        }
        Ok(())
    }
}

impl RuntimeAgent for MockAgent {
    async fn get_version(&self) -> cri::Result<VersionResponse> {
        self.enter(Call::Version).await?;
        Ok(self.version.clone())
    }

    async fn list_containers(&self) -> cri::Result<ListContainersResponse> {
        self.enter(Call::ListContainers).await?;
        Ok(ListContainersResponse {
            containers: vec![Container::default(); self.containers],
        })
    }

    async fn get_status(&self) -> cri::Result<StatusResponse> {
        self.enter(Call::Status).await?;
        if self.omit_status {
            return Ok(StatusResponse::default());
        }
        let conditions = self
            .conditions
            .iter()
            .map(|(r#type, status, reason)| RuntimeCondition {
                r#type: (*r#type).to_owned(),
                status: *status,
                reason: (*reason).to_owned(),
                message: String::new(),
            })
            .collect();
        Ok(StatusResponse {
            status: Some(RuntimeStatus { conditions }),
            ..Default::default()
        })
    }

    async fn get_runtime_config(&self) -> cri::Result<RuntimeConfigResponse> {
        self.enter(Call::RuntimeConfig).await?;
        match self.cgroup_driver {
            Some(driver) => Ok(RuntimeConfigResponse {
                linux: Some(LinuxRuntimeConfiguration {
                    cgroup_driver: driver as i32,
                }),
            }),
            None => Err(cri::Error::rpc(
                Call::RuntimeConfig,
                tonic::Status::unimplemented("unknown method RuntimeConfig"),
            )),
        }
    }

    async fn list_pods(&self) -> cri::Result<ListPodSandboxResponse> {
        self.enter(Call::ListPods).await?;
        Ok(ListPodSandboxResponse {
            items: vec![PodSandbox::default(); self.pods],
        })
    }

    async fn list_images(&self) -> cri::Result<ListImagesResponse> {
        self.enter(Call::ListImages).await?;
        Ok(ListImagesResponse {
            images: vec![Image::default(); self.images],
        })
    }

    async fn get_filesystem_info(&self) -> cri::Result<ImageFsInfoResponse> {
        self.enter(Call::FilesystemInfo).await?;
        let image_filesystems = self
            .filesystems
            .iter()
            .map(|(mountpoint, used_bytes, inodes_used)| FilesystemUsage {
                timestamp: 0,
                fs_id: Some(FilesystemIdentifier {
                    mountpoint: (*mountpoint).to_owned(),
                }),
                used_bytes: Some(UInt64Value { value: *used_bytes }),
                inodes_used: Some(UInt64Value {
                    value: *inodes_used,
                }),
            })
            .collect();
        Ok(ImageFsInfoResponse {
            image_filesystems,
            ..Default::default()
        })
    }
}
