//! Update subscriptions shared by AirTouch entities
//!
//! An entity subscribes to the vendor objects it reads from when it is
//! added and must release those subscriptions when it is removed. Each
//! subscription is an [`UpdateSubscription`] guard that unsubscribes on
//! drop, so releasing them cannot be missed on any removal path.

use std::sync::Arc;

use airtouch_api::{AirConditioner, UpdateCallback, Zone};
use ha_climate::EntityHandle;
use tokio::sync::Mutex;
use tracing::trace;

/// Registration with a vendor update stream, released on drop
pub struct UpdateSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl UpdateSubscription {
    /// Refresh the entity whenever the AC reports a state change
    pub fn ac_state(ac: &Arc<dyn AirConditioner>, handle: EntityHandle) -> Self {
        let id = ac.subscribe_ac_state(refresh_callback(handle));
        let ac = ac.clone();
        Self {
            release: Some(Box::new(move || {
                ac.unsubscribe_ac_state(id);
            })),
        }
    }

    /// Refresh the entity whenever the zone reports a change
    pub fn zone(zone: &Arc<dyn Zone>, handle: EntityHandle) -> Self {
        let id = zone.subscribe(refresh_callback(handle));
        let zone = zone.clone();
        Self {
            release: Some(Box::new(move || {
                zone.unsubscribe(id);
            })),
        }
    }
}

impl Drop for UpdateSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

fn refresh_callback(handle: EntityHandle) -> UpdateCallback {
    Arc::new(move |changed_id| {
        // Home Assistant drops the write if nothing visible changed
        trace!(entity_id = handle.entity_id(), changed_id, "AirTouch update");
        handle.schedule_update_ha_state();
    })
}

/// The subscriptions an entity currently holds
#[derive(Default)]
pub struct Subscriptions(Mutex<Vec<UpdateSubscription>>);

impl Subscriptions {
    /// Hold a new set of subscriptions, releasing any previous ones
    pub async fn hold(&self, subscriptions: Vec<UpdateSubscription>) {
        *self.0.lock().await = subscriptions;
    }

    /// Release every held subscription
    pub async fn release(&self) {
        self.0.lock().await.clear();
    }
}
