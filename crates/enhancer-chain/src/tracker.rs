//! Watching externally provided resources.
//!
//! A [`ResourceTracker`] delivers the bytes of named resources to registered
//! [`ResourceListener`]s whenever they become available or change, and tells
//! them when a resource goes away.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, trace};

/// Returned by listeners to tell the tracker whether to keep delivering events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchDecision {
    KeepWatching,
    StopWatching,
}

/// Receives resource events. Implementations are called from arbitrary
/// threads, possibly concurrently with their other methods.
pub trait ResourceListener: Send + Sync {
    /// The resource became available or its content changed
    fn on_available(&self, name: &str, bytes: &[u8]) -> WatchDecision;

    /// The resource is no longer available
    fn on_unavailable(&self, name: &str) -> WatchDecision;
}

/// Handle of a listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackingId(u64);

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tracking-{}", self.0)
    }
}

/// Registry of resource listeners
pub trait ResourceTracker: Send + Sync {
    /// Start watching `name`. If the resource is already available the
    /// listener is notified before this returns.
    fn add(&self, name: &str, listener: Arc<dyn ResourceListener>) -> TrackingId;

    /// Stop delivering events to a registration; returns `false` for unknown ids
    fn remove(&self, id: TrackingId) -> bool;
}

struct Registration {
    name: String,
    listener: Arc<dyn ResourceListener>,
}

#[derive(Default)]
struct TrackerState {
    resources: HashMap<String, Arc<[u8]>>,
    registrations: BTreeMap<TrackingId, Registration>,
}

/// A [`ResourceTracker`] whose resources are published programmatically.
///
/// Listeners are invoked without holding the state lock, so they may read
/// from the tracker and remove registrations. Events of one resource are
/// delivered one update at a time and in publication order: a listener
/// never sees an older content after a newer one. Listeners must therefore
/// not publish, withdraw or watch the resource they are notified about.
#[derive(Default)]
pub struct InMemoryResourceTracker {
    state: RwLock<TrackerState>,
    deliveries: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    next_id: AtomicU64,
}

impl InMemoryResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store new content for `name` and notify its listeners
    pub fn publish(&self, name: &str, bytes: impl Into<Vec<u8>>) {
        let bytes: Arc<[u8]> = Arc::from(bytes.into());
        let lane = self.delivery_lane(name);
        let _delivering = lane.lock().unwrap_or_else(PoisonError::into_inner);
        let listeners = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.resources.insert(name.to_string(), bytes.clone());
            Self::listeners_of(&state, name)
        };
        debug!(resource = name, bytes = bytes.len(), listeners = listeners.len(), "Resource published");

        let stopped: Vec<TrackingId> = listeners
            .into_iter()
            .filter(|(_, listener)| {
                listener.on_available(name, &bytes) == WatchDecision::StopWatching
            })
            .map(|(id, _)| id)
            .collect();
        self.remove_all(stopped);
    }

    /// Remove `name` and notify its listeners; returns `false` if the
    /// resource was not available
    pub fn withdraw(&self, name: &str) -> bool {
        let lane = self.delivery_lane(name);
        let _delivering = lane.lock().unwrap_or_else(PoisonError::into_inner);
        let listeners = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.resources.remove(name).is_none() {
                return false;
            }
            Self::listeners_of(&state, name)
        };
        debug!(resource = name, listeners = listeners.len(), "Resource withdrawn");

        let stopped: Vec<TrackingId> = listeners
            .into_iter()
            .filter(|(_, listener)| listener.on_unavailable(name) == WatchDecision::StopWatching)
            .map(|(id, _)| id)
            .collect();
        self.remove_all(stopped);
        true
    }

    /// Current content of `name`
    pub fn resource(&self, name: &str) -> Option<Vec<u8>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.resources.get(name).map(|bytes| bytes.to_vec())
    }

    /// Names of all available resources, sorted
    pub fn resource_names(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = state.resources.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of active registrations
    pub fn listener_count(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.registrations.len()
    }

    /// Serializes the state change and the notifications of one resource
    fn delivery_lane(&self, name: &str) -> Arc<Mutex<()>> {
        let mut deliveries = self.deliveries.lock().unwrap_or_else(PoisonError::into_inner);
        deliveries.entry(name.to_string()).or_default().clone()
    }

    fn listeners_of(
        state: &TrackerState,
        name: &str,
    ) -> Vec<(TrackingId, Arc<dyn ResourceListener>)> {
        state
            .registrations
            .iter()
            .filter(|(_, registration)| registration.name == name)
            .map(|(id, registration)| (*id, registration.listener.clone()))
            .collect()
    }

    fn remove_all(&self, ids: Vec<TrackingId>) {
        for id in ids {
            trace!(%id, "Listener stopped watching");
            self.remove(id);
        }
    }
}

impl ResourceTracker for InMemoryResourceTracker {
    fn add(&self, name: &str, listener: Arc<dyn ResourceListener>) -> TrackingId {
        let id = TrackingId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let lane = self.delivery_lane(name);
        let _delivering = lane.lock().unwrap_or_else(PoisonError::into_inner);
        let current = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.registrations.insert(
                id,
                Registration {
                    name: name.to_string(),
                    listener: listener.clone(),
                },
            );
            state.resources.get(name).cloned()
        };
        debug!(resource = name, %id, available = current.is_some(), "Listener registered");

        if let Some(bytes) = current {
            if listener.on_available(name, &bytes) == WatchDecision::StopWatching {
                self.remove(id);
            }
        }
        id
    }

    fn remove(&self, id: TrackingId) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.registrations.remove(&id).is_some()
    }
}

impl fmt::Debug for InMemoryResourceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryResourceTracker")
            .field("resources", &self.resource_names())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
