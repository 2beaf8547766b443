//! Climate state storage with change broadcasting

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, instrument, trace};

use crate::ClimateState;

/// Default channel capacity for state change subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A published state transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChanged {
    pub entity_id: String,
    pub old_state: Option<ClimateState>,
    pub new_state: Option<ClimateState>,
}

/// Tracks the last published state of every climate entity
///
/// Writes that do not change the state value or attributes are dropped, so
/// subscribers only see real transitions.
pub struct StateStore {
    states: DashMap<String, ClimateState>,
    changes: broadcast::Sender<StateChanged>,
}

impl StateStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            states: DashMap::new(),
            changes,
        }
    }

    /// Store a state, returning it if it differs from the previous one
    #[instrument(skip(self, state), fields(entity_id = %state.entity_id))]
    pub fn set(&self, state: ClimateState) -> Option<ClimateState> {
        let old_state = self.states.get(&state.entity_id).map(|s| s.clone());

        let new_state = match &old_state {
            Some(existing) if *existing == state => {
                trace!("State unchanged");
                return None;
            }
            Some(existing) => state.succeeding(existing),
            None => state,
        };

        debug!(state = %new_state.state, "Writing climate state");
        self.states
            .insert(new_state.entity_id.clone(), new_state.clone());

        // Ignore send errors - they just mean no active receivers
        let _ = self.changes.send(StateChanged {
            entity_id: new_state.entity_id.clone(),
            old_state,
            new_state: Some(new_state.clone()),
        });

        Some(new_state)
    }

    /// Get the current state of an entity
    pub fn get(&self, entity_id: &str) -> Option<ClimateState> {
        self.states.get(entity_id).map(|s| s.clone())
    }

    /// Get the state value as a string, or None if entity doesn't exist
    pub fn get_state(&self, entity_id: &str) -> Option<String> {
        self.states.get(entity_id).map(|s| s.state.clone())
    }

    /// Get all states
    pub fn all(&self) -> Vec<ClimateState> {
        self.states.iter().map(|r| r.value().clone()).collect()
    }

    /// Remove an entity's state
    pub fn remove(&self, entity_id: &str) -> Option<ClimateState> {
        let old_state = self.states.remove(entity_id).map(|(_, s)| s);

        if let Some(state) = &old_state {
            trace!(entity_id, "Removing climate state");
            let _ = self.changes.send(StateChanged {
                entity_id: entity_id.to_string(),
                old_state: Some(state.clone()),
                new_state: None,
            });
        }

        old_state
    }

    /// Subscribe to state transitions
    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.changes.subscribe()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
