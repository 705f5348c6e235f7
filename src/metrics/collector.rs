use std::time::Duration;

use prometheus::core::Desc;

use crate::cri::{self, RuntimeAgent};
use crate::error::ResultOkLogExt;
use crate::runtime::v1::{
    CgroupDriver, FilesystemUsage, RuntimeConfigResponse, StatusResponse, VersionResponse,
};

use super::{Descriptors, MetricKind, Result};

/// Optional runtime calls the collector may issue, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether to query the runtime configuration (cgroup driver). The call
    /// only carries Linux settings.
    pub runtime_config: bool,
}

impl Capabilities {
    /// Capabilities of the platform the exporter was built for.
    pub fn detect() -> Self {
        Self {
            runtime_config: cfg!(target_os = "linux"),
        }
    }
}

/// A single gauge value produced during one scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub kind: MetricKind,
    /// Label values in the order of [`MetricKind::label_names`].
    pub labels: Vec<String>,
    pub value: f64,
}

impl Sample {
    fn new(kind: MetricKind, labels: Vec<String>, value: f64) -> Self {
        Self {
            kind,
            labels,
            value,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("failed to query container runtime: {0}")]
    Runtime(#[from] cri::Error),
    #[error("collection did not finish within {0:?}")]
    Timeout(Duration),
}

/// Collects container runtime metrics on demand.
///
/// Holds no state besides the agent and the descriptors, so concurrent scrapes
/// may share one collector.
#[derive(Debug)]
pub struct RuntimeCollector<A> {
    agent: A,
    descriptors: Descriptors,
    capabilities: Capabilities,
}

impl<A> RuntimeCollector<A>
where
    A: RuntimeAgent + Sync,
{
    /// # Errors
    ///
    /// Returns [`super::Error::Descriptor`] if `prefix` does not produce valid
    /// metric names.
    pub fn new(agent: A, prefix: &str, capabilities: Capabilities) -> Result<Self> {
        Ok(Self {
            agent,
            descriptors: Descriptors::new(prefix)?,
            capabilities,
        })
    }

    /// Returns the descriptors of every metric this collector can emit,
    /// independent of the runtime's state.
    pub fn describe(&self) -> &[Desc] {
        self.descriptors.all()
    }

    pub fn descriptors(&self) -> &Descriptors {
        &self.descriptors
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Queries the runtime and maps every response to samples.
    ///
    /// Calls are issued sequentially. A failing runtime config call only drops
    /// the `runtime_config` sample; any other failing call aborts the whole
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Runtime`] with the first failed call.
    pub async fn collect(&self) -> std::result::Result<Vec<Sample>, CollectError> {
        let mut samples = Vec::with_capacity(MetricKind::ALL.len());

        let version = self.agent.get_version().await?;
        samples.push(version_sample(&version));

        let status = self.agent.get_status().await?;
        samples.extend(status_samples(&status));

        if self.capabilities.runtime_config {
            // cri-dockerd does not implement RuntimeConfig.
            if let Some(config) = self
                .agent
                .get_runtime_config()
                .await
                .ok_log(log::Level::Debug)
            {
                samples.push(config_sample(&config));
            }
        }

        let pods = self.agent.list_pods().await?;
        samples.push(count_sample(MetricKind::RuntimePodsCount, pods.items.len()));

        let images = self.agent.list_images().await?;
        samples.push(count_sample(MetricKind::ImagesCount, images.images.len()));

        let containers = self.agent.list_containers().await?;
        samples.push(count_sample(
            MetricKind::ContainersCount,
            containers.containers.len(),
        ));

        let fs = self.agent.get_filesystem_info().await?;
        samples.extend(fs.image_filesystems.iter().flat_map(filesystem_samples));

        log::trace!("Collected {} runtime samples", samples.len());
        Ok(samples)
    }

    /// Like [`RuntimeCollector::collect`], but gives up once `deadline` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Timeout`] if the deadline elapses first.
    pub async fn collect_within(
        &self,
        deadline: Option<Duration>,
    ) -> std::result::Result<Vec<Sample>, CollectError> {
        match deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.collect())
                .await
                .map_err(|_| CollectError::Timeout(deadline))?,
            None => self.collect().await,
        }
    }
}

fn version_sample(version: &VersionResponse) -> Sample {
    Sample::new(
        MetricKind::RuntimeVersion,
        vec![
            version.version.clone(),
            version.runtime_name.clone(),
            version.runtime_version.clone(),
            version.runtime_api_version.clone(),
        ],
        1.0,
    )
}

fn status_samples(status: &StatusResponse) -> Vec<Sample> {
    status
        .status
        .iter()
        .flat_map(|s| s.conditions.iter())
        .map(|condition| {
            Sample::new(
                MetricKind::RuntimeStatus,
                vec![condition.r#type.clone(), condition.reason.clone()],
                if condition.status { 1.0 } else { 0.0 },
            )
        })
        .collect()
}

fn config_sample(config: &RuntimeConfigResponse) -> Sample {
    let driver = config
        .linux
        .as_ref()
        .map(|linux| linux.cgroup_driver())
        .unwrap_or(CgroupDriver::Systemd);
    Sample::new(
        MetricKind::RuntimeConfig,
        vec![driver.as_str_name().to_owned()],
        1.0,
    )
}

fn count_sample(kind: MetricKind, count: usize) -> Sample {
    Sample::new(kind, Vec::new(), count as f64)
}

fn filesystem_samples(usage: &FilesystemUsage) -> [Sample; 2] {
    let mountpoint = usage
        .fs_id
        .as_ref()
        .map(|id| id.mountpoint.clone())
        .unwrap_or_default();
    let used_bytes = usage.used_bytes.as_ref().map_or(0, |v| v.value);
    let inodes_used = usage.inodes_used.as_ref().map_or(0, |v| v.value);
    [
        Sample::new(
            MetricKind::FsInfoUsedBytes,
            vec![mountpoint.clone()],
            used_bytes as f64,
        ),
        Sample::new(
            MetricKind::FsInfoUsedInodes,
            vec![mountpoint],
            inodes_used as f64,
        ),
    ]
}
