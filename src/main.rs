use clap::Parser;

/// Entry point for the CRI exporter.
///
/// Parses the configuration from flags and environment variables, then serves
/// container runtime metrics on `/metrics` until interrupted.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cri-exporter --container-runtime-endpoint unix:///run/containerd/containerd.sock
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = cri_exporter::Config::parse();
    cri_exporter::run(config).await?;
    Ok(())
}
