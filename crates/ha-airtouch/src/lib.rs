//! Polyaire AirTouch climate integration
//!
//! Exposes AirTouch air conditioners and zones as climate entities. All
//! device communication goes through the [`airtouch_api`] traits; entity
//! registration and state publishing go through the [`ha_climate`]
//! platform.

pub mod climate;
pub mod devices;
pub mod entities;
pub mod mapping;

use std::sync::Arc;

use airtouch_api::AirTouch;
use futures::future::join_all;
use ha_climate::ClimatePlatform;
use tracing::info;

pub use climate::{discover_entities, AcClimateEntity, ZoneClimateEntity};

/// Integration domain
pub const DOMAIN: &str = "airtouch";

/// A configured AirTouch entry and the consoles connected for it
pub struct AirTouchEntry {
    pub entry_id: String,
    pub consoles: Vec<Arc<dyn AirTouch>>,
}

/// Entities registered for an entry
#[derive(Debug, Clone)]
pub struct LoadedEntry {
    pub entry_id: String,
    pub entity_ids: Vec<String>,
}

/// Set up the AirTouch climate entities of an entry
pub async fn async_setup_entry(entry: &AirTouchEntry, platform: &ClimatePlatform) -> LoadedEntry {
    let entities = discover_entities(&entry.consoles);
    let entity_ids = platform.add_entities(entities).await;

    info!(
        entry_id = %entry.entry_id,
        "Set up {} AirTouch climate entities",
        entity_ids.len()
    );

    LoadedEntry {
        entry_id: entry.entry_id.clone(),
        entity_ids,
    }
}

/// Remove the entities of a loaded entry
pub async fn async_unload_entry(loaded: &LoadedEntry, platform: &ClimatePlatform) {
    join_all(
        loaded
            .entity_ids
            .iter()
            .map(|entity_id| platform.remove_entity(entity_id)),
    )
    .await;
    info!(entry_id = %loaded.entry_id, "Unloaded AirTouch climate entities");
}
