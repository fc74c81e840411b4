use anyhow::Result;
use metadata_core::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH};
use metadata_core::{ReportConfig, SharedMetadata};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config_path = config_path();
    info!("Starting metadata-report with config {}", config_path.display());

    let config = ReportConfig::load(&config_path)?;
    let metadata = SharedMetadata::new(config.build_metadata());
    report(&metadata).await?;

    let Some(interval) = config.interval() else {
        return Ok(());
    };

    // Periodic rescan loop
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, exiting...");
                return Ok(());
            }
        }

        let config = match ReportConfig::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                error!("Error reloading config: {}", e);
                continue;
            }
        };

        let changed = sync_services(&metadata, &config).await;
        if changed == 0 && metadata.has_reported().await {
            debug!("Services unchanged at revision {}", metadata.revision().await);
            continue;
        }

        if let Err(e) = report(&metadata).await {
            error!("Error reporting metadata: {}", e);
        }
    }
}

/// First argument, then the environment, then the default file name
fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Bring the registered services in line with the config, returning how
/// many services were added, replaced or removed
async fn sync_services(metadata: &SharedMetadata, config: &ReportConfig) -> usize {
    let current = metadata.snapshot().await;
    let desired = config.build_metadata();
    let mut changed = 0;

    for (match_key, info) in current.services() {
        if desired.get_service(match_key).is_none() {
            info!("Service {} is no longer exported", match_key);
            metadata.remove_service(Some(info)).await;
            changed += 1;
        }
    }

    for (match_key, info) in desired.services() {
        if current.get_service(match_key) != Some(info) {
            info!("Service {} is exported", match_key);
            metadata.add_service(Some(info.clone())).await;
            changed += 1;
        }
    }

    changed
}

/// Calculate and report the revision, printing the reported metadata as JSON
async fn report(metadata: &SharedMetadata) -> Result<()> {
    let snapshot = metadata.report().await;
    info!(
        "App {} exports {} services at revision {}",
        snapshot.app,
        snapshot.service_count(),
        snapshot.revision
    );

    println!("{}", serde_json::to_string(&snapshot)?);
    Ok(())
}
