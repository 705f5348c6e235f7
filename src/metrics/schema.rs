use std::collections::HashMap;

use prometheus::core::Desc;

use super::{Error, Result};

/// The metrics exported for a container runtime.
///
/// The discriminant doubles as the index into [`Descriptors`], so the
/// variant order must match [`MetricKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    RuntimeVersion,
    RuntimeStatus,
    RuntimeConfig,
    RuntimePodsCount,
    ImagesCount,
    ContainersCount,
    FsInfoUsedBytes,
    FsInfoUsedInodes,
}

impl MetricKind {
    pub const ALL: [MetricKind; 8] = [
        MetricKind::RuntimeVersion,
        MetricKind::RuntimeStatus,
        MetricKind::RuntimeConfig,
        MetricKind::RuntimePodsCount,
        MetricKind::ImagesCount,
        MetricKind::ContainersCount,
        MetricKind::FsInfoUsedBytes,
        MetricKind::FsInfoUsedInodes,
    ];

    /// Metric name without the prefix.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::RuntimeVersion => "runtime_version",
            MetricKind::RuntimeStatus => "runtime_status",
            MetricKind::RuntimeConfig => "runtime_config",
            MetricKind::RuntimePodsCount => "runtime_pods_count",
            MetricKind::ImagesCount => "images_count",
            MetricKind::ContainersCount => "containers_count",
            MetricKind::FsInfoUsedBytes => "fs_info_used_bytes",
            MetricKind::FsInfoUsedInodes => "fs_info_used_inodes",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricKind::RuntimeVersion => "The version of the container runtime",
            MetricKind::RuntimeStatus => "The status of the container runtime",
            MetricKind::RuntimeConfig => "The configuration of the container runtime",
            MetricKind::RuntimePodsCount => "The number of pods in the container runtime",
            MetricKind::ImagesCount => "The number of images in the container runtime",
            MetricKind::ContainersCount => "The number of containers in the container runtime",
            MetricKind::FsInfoUsedBytes => {
                "The number of used bytes in the filesystem of mountpoint"
            }
            MetricKind::FsInfoUsedInodes => {
                "The number of used inodes in the filesystem of mountpoint"
            }
        }
    }

    /// Names of the variable labels, in the order sample label values use.
    pub fn label_names(self) -> &'static [&'static str] {
        match self {
            MetricKind::RuntimeVersion => &[
                "version",
                "runtime_name",
                "runtime_version",
                "runtime_api_version",
            ],
            MetricKind::RuntimeStatus => &["type", "reason"],
            MetricKind::RuntimeConfig => &["cgroup_driver"],
            MetricKind::RuntimePodsCount
            | MetricKind::ImagesCount
            | MetricKind::ContainersCount => &[],
            MetricKind::FsInfoUsedBytes | MetricKind::FsInfoUsedInodes => &["mountpoint"],
        }
    }
}

/// The fixed set of metric descriptors, built once from the name prefix.
#[derive(Debug, Clone)]
pub struct Descriptors {
    prefix: String,
    descs: Vec<Desc>,
}

impl Descriptors {
    /// Builds the descriptors for all [`MetricKind`]s.
    ///
    /// Leading and trailing underscores are trimmed from `prefix`. An empty
    /// prefix yields unprefixed metric names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] if a prefixed name is not a valid
    /// Prometheus metric name.
    pub fn new(prefix: &str) -> Result<Self> {
        let prefix = prefix.trim_matches('_').to_owned();
        let descs = MetricKind::ALL
            .iter()
            .map(|kind| {
                let name = qualified_name(&prefix, kind.name());
                Desc::new(
                    name.clone(),
                    kind.help().to_owned(),
                    kind.label_names().iter().map(|l| (*l).to_owned()).collect(),
                    HashMap::new(),
                )
                .map_err(|source| Error::Descriptor { name, source })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { prefix, descs })
    }

    pub fn all(&self) -> &[Desc] {
        &self.descs
    }

    pub fn get(&self, kind: MetricKind) -> &Desc {
        &self.descs[kind as usize]
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Applies the prefix to an arbitrary metric name.
    pub fn qualified_name(&self, name: &str) -> String {
        qualified_name(&self.prefix, name)
    }
}

fn qualified_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}_{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(descriptors: &Descriptors) -> Vec<String> {
        descriptors.all().iter().map(|d| d.fq_name.clone()).collect()
    }

    #[test]
    fn test_default_prefix() {
        let descriptors = Descriptors::new("cri").unwrap();
        assert_eq!(
            names(&descriptors),
            vec![
                "cri_runtime_version",
                "cri_runtime_status",
                "cri_runtime_config",
                "cri_runtime_pods_count",
                "cri_images_count",
                "cri_containers_count",
                "cri_fs_info_used_bytes",
                "cri_fs_info_used_inodes",
            ]
        );
    }

    #[test]
    fn test_custom_prefix_is_honoured() {
        let descriptors = Descriptors::new("node").unwrap();
        assert_eq!(descriptors.prefix(), "node");
        assert_eq!(
            descriptors.get(MetricKind::ImagesCount).fq_name,
            "node_images_count"
        );
    }

    #[test]
    fn test_empty_prefix_has_no_leading_underscore() {
        let descriptors = Descriptors::new("").unwrap();
        assert_eq!(
            descriptors.get(MetricKind::RuntimeVersion).fq_name,
            "runtime_version"
        );
        assert_eq!(descriptors.qualified_name("build_info"), "build_info");
    }

    #[test]
    fn test_prefix_underscores_are_trimmed() {
        let descriptors = Descriptors::new("_cri_").unwrap();
        assert_eq!(descriptors.prefix(), "cri");
        assert_eq!(
            descriptors.get(MetricKind::ContainersCount).fq_name,
            "cri_containers_count"
        );
    }

    #[test]
    fn test_invalid_prefix_is_rejected() {
        let err = Descriptors::new("my-exporter").unwrap_err();
        match err {
            Error::Descriptor { name, .. } => assert_eq!(name, "my-exporter_runtime_version"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_descriptor_index_matches_kind() {
        let descriptors = Descriptors::new("cri").unwrap();
        for kind in MetricKind::ALL {
            let desc = descriptors.get(kind);
            assert_eq!(desc.fq_name, format!("cri_{}", kind.name()));
            assert_eq!(desc.help, kind.help());
            assert_eq!(desc.variable_labels, kind.label_names());
        }
    }
}
