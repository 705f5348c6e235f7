//! Translation of container runtime state into Prometheus metrics.
//!
//! [`RuntimeCollector`] queries a [`RuntimeAgent`](crate::cri::RuntimeAgent)
//! once per scrape and maps the responses to [`Sample`]s. [`Exposition`]
//! renders those samples, together with the process-wide collectors, in the
//! Prometheus text format.
//!
//! # Exported metrics
//!
//! All names carry the configured prefix (`cri` by default):
//!
//! - `runtime_version{version, runtime_name, runtime_version, runtime_api_version}`
//! - `runtime_status{type, reason}`, one per runtime condition
//! - `runtime_config{cgroup_driver}`, only where the runtime supports it
//! - `runtime_pods_count`, `images_count`, `containers_count`
//! - `fs_info_used_bytes{mountpoint}`, `fs_info_used_inodes{mountpoint}`
mod collector;
mod error;
mod exposition;
mod schema;

pub use collector::{Capabilities, CollectError, RuntimeCollector, Sample};
pub use error::{Error, Result};
pub use exposition::Exposition;
pub use schema::{Descriptors, MetricKind};
