//! Harvest the configured listing page range and print one JSON record per line
//!
//! Usage: `harvest [CONFIG_PATH]`. Without a path the per-user config file is
//! used (and created with defaults on first run).

use anyhow::{Context, Result};
use tracing::{info, warn};

use product_harvester_lib::infrastructure::{
    ConfigManager, HttpClient, ListingCrawler, bootstrap_console_logging,
    init_logging_with_config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let manager = match std::env::args().nth(1) {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = {
        let _startup_logging = bootstrap_console_logging();
        manager.load_config().await?
    };

    init_logging_with_config(&config.logging)?;
    info!("Using configuration {:?}", manager.config_path());
    info!(
        "Harvesting pages {}..={} from {}",
        config.site.first_page, config.site.last_page, config.site.base_url
    );

    let client = HttpClient::from_app_config(&config)?;
    let crawler = ListingCrawler::from_app_config(client, &config)
        .context("Extraction rules in the configuration are not usable")?;

    let report = crawler.harvest_pages(&config.site).await;

    for record in &report.records {
        println!(
            "{}",
            serde_json::to_string(record).context("Failed to serialize record")?
        );
    }
    for failure in &report.failures {
        warn!("Failed: {} ({})", failure.url, failure.error);
    }

    info!(
        "Done: {} records, {} failed pages",
        report.records.len(),
        report.failures.len()
    );
    Ok(())
}
