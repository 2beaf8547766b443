//! Climate entity platform
//!
//! Owns the registered climate entities, assigns their entity ids, publishes
//! their state and routes service calls to them. Entities ask for a refresh
//! through their [`EntityHandle`]; requests are coalesced per entity and
//! only real changes reach the [`StateStore`].

use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::service::{dispatch, ClimateServiceCall};
use crate::state::friendly_name;
use crate::{
    ClimateEntity, ClimateError, ClimateResult, ClimateState, EntityHandle, StateStore, DOMAIN,
};

/// Registered climate entities and their published state
pub struct ClimatePlatform {
    entities: DashMap<String, Arc<dyn ClimateEntity>>,
    /// unique_id -> entity_id
    unique_ids: DashMap<String, String>,
    states: Arc<StateStore>,
    update_tx: mpsc::UnboundedSender<String>,
    update_rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl ClimatePlatform {
    pub fn new() -> Self {
        Self::with_state_store(Arc::new(StateStore::new()))
    }

    /// Create a platform publishing into an existing store
    pub fn with_state_store(states: Arc<StateStore>) -> Self {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        Self {
            entities: DashMap::new(),
            unique_ids: DashMap::new(),
            states,
            update_tx,
            update_rx: Mutex::new(update_rx),
        }
    }

    /// The store this platform publishes into
    pub fn states(&self) -> &Arc<StateStore> {
        &self.states
    }

    /// Register a batch of entities
    ///
    /// Each entity gets an entity id, is notified through `added_to_hass`
    /// and has its initial state written. Entities whose unique id is
    /// already registered are skipped. Returns the assigned entity ids.
    pub async fn add_entities(&self, entities: Vec<Arc<dyn ClimateEntity>>) -> Vec<String> {
        let mut added = Vec::with_capacity(entities.len());

        for entity in entities {
            if let Some(unique_id) = entity.unique_id() {
                if let Some(existing) = self.unique_ids.get(&unique_id) {
                    warn!(
                        unique_id = %unique_id,
                        existing = %existing.value(),
                        "Platform {} does not generate unique IDs. ID {} already exists - ignoring",
                        DOMAIN,
                        unique_id
                    );
                    continue;
                }
            }

            let entity_id = self.claim_entity_id(entity.clone());
            if let Some(unique_id) = entity.unique_id() {
                self.unique_ids.insert(unique_id, entity_id.clone());
            }

            entity
                .added_to_hass(EntityHandle::new(entity_id.clone(), self.update_tx.clone()))
                .await;
            self.write_state(&entity_id);

            debug!(entity_id = %entity_id, "Added climate entity");
            added.push(entity_id);
        }

        if !added.is_empty() {
            info!("Added {} climate entities", added.len());
        }
        added
    }

    /// Reserve a free entity id for the entity and store it under that id
    fn claim_entity_id(&self, entity: Arc<dyn ClimateEntity>) -> String {
        let base = friendly_name(entity.as_ref())
            .or_else(|| entity.unique_id())
            .map(|name| slugify(&name))
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| DOMAIN.to_string());

        let mut suffix = 1;
        loop {
            let candidate = if suffix == 1 {
                format!("{}.{}", DOMAIN, base)
            } else {
                format!("{}.{}_{}", DOMAIN, base, suffix)
            };
            match self.entities.entry(candidate.clone()) {
                dashmap::mapref::entry::Entry::Vacant(slot) => {
                    slot.insert(entity);
                    return candidate;
                }
                dashmap::mapref::entry::Entry::Occupied(_) => suffix += 1,
            }
        }
    }

    /// Get a registered entity
    pub fn entity(&self, entity_id: &str) -> Option<Arc<dyn ClimateEntity>> {
        self.entities.get(entity_id).map(|e| e.value().clone())
    }

    /// Entity id registered for a unique id
    pub fn entity_id_for(&self, unique_id: &str) -> Option<String> {
        self.unique_ids.get(unique_id).map(|e| e.value().clone())
    }

    /// All registered entity ids
    pub fn entity_ids(&self) -> Vec<String> {
        self.entities.iter().map(|r| r.key().clone()).collect()
    }

    /// Re-read an entity and publish its state if it changed
    pub fn write_state(&self, entity_id: &str) -> Option<ClimateState> {
        let entity = self.entity(entity_id)?;
        self.states
            .set(ClimateState::from_entity(entity_id, entity.as_ref()))
    }

    /// Call a service on one entity
    #[instrument(skip(self, call), fields(service = call.service()))]
    pub async fn call_service(&self, entity_id: &str, call: ClimateServiceCall) -> ClimateResult<()> {
        let entity = self
            .entity(entity_id)
            .ok_or_else(|| ClimateError::EntityNotFound(entity_id.to_string()))?;

        dispatch(entity.as_ref(), call).await?;
        self.write_state(entity_id);
        Ok(())
    }

    /// Call a service described by name and JSON data
    ///
    /// Targets every entity listed under `entity_id` in the data.
    pub async fn handle_service_call(&self, service: &str, data: &Value) -> ClimateResult<()> {
        let call = ClimateServiceCall::from_service_data(service, data)?;

        let entity_ids: Vec<String> = match data.get("entity_id") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(arr)) => arr
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => {
                return Err(ClimateError::InvalidServiceData(
                    "entity_id is required".to_string(),
                ))
            }
        };

        for entity_id in entity_ids {
            self.call_service(&entity_id, call.clone()).await?;
        }
        Ok(())
    }

    /// Remove an entity, releasing whatever it acquired when added
    pub async fn remove_entity(&self, entity_id: &str) -> bool {
        let Some((_, entity)) = self.entities.remove(entity_id) else {
            return false;
        };
        if let Some(unique_id) = entity.unique_id() {
            self.unique_ids.remove(&unique_id);
        }

        entity.will_remove_from_hass().await;
        self.states.remove(entity_id);
        debug!(entity_id, "Removed climate entity");
        true
    }

    /// Publish every queued refresh request. Returns the number of states that changed.
    pub async fn process_pending_updates(&self) -> usize {
        let mut rx = self.update_rx.lock().await;
        let mut pending = Vec::new();
        while let Ok(entity_id) = rx.try_recv() {
            pending.push(entity_id);
        }
        drop(rx);

        self.publish(pending)
    }

    /// Publish refresh requests as they arrive
    ///
    /// The platform keeps its own sender, so this never returns; it runs
    /// until the future is cancelled. While it runs, `process_pending_updates`
    /// waits for it.
    pub async fn run(&self) {
        let mut rx = self.update_rx.lock().await;
        while let Some(first) = rx.recv().await {
            let mut pending = vec![first];
            while let Ok(entity_id) = rx.try_recv() {
                pending.push(entity_id);
            }
            self.publish(pending);
        }
    }

    fn publish(&self, pending: Vec<String>) -> usize {
        let mut seen = HashSet::new();
        pending
            .into_iter()
            .filter(|entity_id| seen.insert(entity_id.clone()))
            .filter(|entity_id| self.write_state(entity_id).is_some())
            .count()
    }
}

impl Default for ClimatePlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a display name into an object id
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}
