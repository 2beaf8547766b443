//! AirTouch climate demo server
//!
//! Sets up the AirTouch integration against simulated consoles described in
//! a YAML file and logs every climate state change until interrupted.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use airtouch_api::memory::MemoryAirTouch;
use airtouch_api::AirTouch;
use anyhow::{Context, Result};
use ha_airtouch::{async_setup_entry, async_unload_entry, AirTouchEntry};
use ha_climate::{ClimatePlatform, StateStore};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

const DEFAULT_CONFIG: &str = "airtouch.yaml";

/// Log state changes until the store is dropped
async fn log_state_changes(states: Arc<StateStore>) {
    let mut changes = states.subscribe();
    drop(states);

    loop {
        match changes.recv().await {
            Ok(change) => match change.new_state {
                Some(state) => info!(
                    entity_id = %change.entity_id,
                    state = %state.state,
                    attributes = %serde_json::Value::Object(state.attributes),
                    "State changed"
                ),
                None => info!(entity_id = %change.entity_id, "State removed"),
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("State change log lagged, skipped {} changes", skipped)
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = ServerConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;

    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting AirTouch demo with {} consoles", config.consoles.len());

    let states = Arc::new(StateStore::new());
    let platform = ClimatePlatform::with_state_store(states.clone());
    let logger = tokio::spawn(log_state_changes(states));

    let entry = AirTouchEntry {
        entry_id: path.display().to_string(),
        consoles: config
            .consoles
            .into_iter()
            .map(|console| MemoryAirTouch::new(console) as Arc<dyn AirTouch>)
            .collect(),
    };
    let loaded = async_setup_entry(&entry, &platform).await;

    tokio::select! {
        _ = platform.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for Ctrl-C")?;
            info!("Shutting down...");
        }
    }

    async_unload_entry(&loaded, &platform).await;
    drop(platform);
    logger.await.context("state change logger")?;

    Ok(())
}
