use prometheus::{GaugeVec, IntGaugeVec, Opts, Registry, TextEncoder};

use super::{Descriptors, Error, MetricKind, Result, Sample};

/// Renders scrape results in the Prometheus text exposition format.
///
/// Process-wide metrics (process statistics and build info) live in a
/// long-lived registry; runtime samples are rendered into a fresh registry per
/// scrape so nothing carries over between scrapes.
pub struct Exposition {
    process: Registry,
}

impl Exposition {
    /// # Errors
    ///
    /// Returns [`Error::Register`] if a process-wide collector cannot be
    /// registered.
    pub fn new(descriptors: &Descriptors) -> Result<Self> {
        let process = Registry::new();

        #[cfg(target_os = "linux")]
        process
            .register(Box::new(
                prometheus::process_collector::ProcessCollector::for_self(),
            ))
            .map_err(Error::Register)?;

        let build_info = IntGaugeVec::new(
            Opts::new(
                descriptors.qualified_name("build_info"),
                "A metric with a constant '1' value labeled by the version of the exporter",
            ),
            &["version"],
        )
        .map_err(Error::Register)?;
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);
        process
            .register(Box::new(build_info))
            .map_err(Error::Register)?;

        Ok(Self { process })
    }

    /// The `Content-Type` of [`Exposition::encode`]'s output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Encodes the samples of one scrape followed by the process-wide metrics.
    ///
    /// Metrics without samples are left out entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Metric`] if a sample does not fit its descriptor,
    /// [`Error::RegisterMetric`] if a metric cannot be registered for the scrape
    /// and [`Error::Encode`] if encoding fails.
    pub fn encode(&self, descriptors: &Descriptors, samples: &[Sample]) -> Result<String> {
        let gauges = MetricKind::ALL
            .iter()
            .map(|kind| {
                let desc = descriptors.get(*kind);
                GaugeVec::new(
                    Opts::new(desc.fq_name.clone(), desc.help.clone()),
                    kind.label_names(),
                )
                .map_err(|source| Error::Metric {
                    name: desc.fq_name.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for sample in samples {
            let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
            gauges[sample.kind as usize]
                .get_metric_with_label_values(labels.as_slice())
                .map_err(|source| Error::Metric {
                    name: descriptors.get(sample.kind).fq_name.clone(),
                    source,
                })?
                .set(sample.value);
        }

        let scrape = Registry::new();
        for (kind, gauge) in MetricKind::ALL.iter().zip(gauges) {
            register_gauge(&scrape, &descriptors.get(*kind).fq_name, gauge)?;
        }

        let mut families = scrape.gather();
        families.extend(self.process.gather());

        TextEncoder::new()
            .encode_to_string(&families)
            .map_err(Error::Encode)
    }
}

fn register_gauge(registry: &Registry, name: &str, gauge: GaugeVec) -> Result<()> {
    registry
        .register(Box::new(gauge))
        .map_err(|source| Error::RegisterMetric {
            name: name.to_owned(),
            source,
        })
}

impl std::fmt::Debug for Exposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exposition").finish_non_exhaustive()
    }
}
