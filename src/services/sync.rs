//! Dirty tracking and debounced outbound sync. Each trip runs its own
//! little state machine, Clean -> Dirty -> Syncing -> Clean (or Failed),
//! with an independent debounce timer, so edits to one trip can never
//! swallow the pending sync of another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::settings::CategoryKind;
use crate::models::{
    expense::Expense, itinerary::ItineraryItem, note::Note, recommendation::Recommendation,
    trip::Trip,
};
use crate::store::AppState;

pub type SharedState = Arc<Mutex<AppState>>;

/// Full-replace body for `POST /sync`: the trip and the exact current
/// local set of its children.
#[derive(Debug, Clone, Serialize)]
pub struct SyncPayload {
    pub trip: Trip,
    pub itinerary: Vec<ItineraryItem>,
    pub expenses: Vec<Expense>,
    pub recommendations: Vec<Recommendation>,
    pub notes: Vec<Note>,
}

/// The remote side of a sync, kept behind a trait so tests can count
/// calls without a server.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    async fn push_trip(&self, payload: SyncPayload) -> Result<(), AppError>;
    async fn delete_trip(&self, trip_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Clean,
    Dirty,
    Syncing,
    /// Last push failed; local state stays as-is (optimistic, no rollback)
    /// and diverges until the next successful sync or full reload.
    Failed,
}

struct Inner {
    remote: Arc<dyn RemoteSink>,
    snapshot: SharedState,
    debounce: Duration,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    phases: Mutex<HashMap<String, SyncPhase>>,
}

impl Inner {
    fn set_phase(&self, trip_id: &str, phase: SyncPhase) {
        self.phases
            .lock()
            .expect("phase map poisoned")
            .insert(trip_id.to_string(), phase);
    }

    /// Snapshot the trip and its children under the lock, then push
    /// without holding it.
    fn build_payload(&self, trip_id: &str) -> Option<SyncPayload> {
        let state = self.snapshot.lock().expect("snapshot poisoned");
        let trip = state.trips.iter().find(|t| t.id == trip_id)?.clone();

        for item in state.itinerary.iter().filter(|i| i.trip_id == trip_id) {
            if !state.settings.knows(CategoryKind::Schedule, &item.category) {
                debug!(item = %item.id, category = %item.category, "unknown schedule category");
            }
        }

        Some(SyncPayload {
            itinerary: state
                .itinerary
                .iter()
                .filter(|i| i.trip_id == trip_id)
                .cloned()
                .collect(),
            expenses: state
                .expenses
                .iter()
                .filter(|e| e.trip_id == trip_id)
                .cloned()
                .collect(),
            recommendations: state
                .recommendations
                .iter()
                .filter(|r| r.trip_id == trip_id)
                .cloned()
                .collect(),
            notes: state
                .notes
                .iter()
                .filter(|n| n.trip_id == trip_id)
                .cloned()
                .collect(),
            trip,
        })
    }

    async fn run_sync(&self, trip_id: &str) {
        self.timers
            .lock()
            .expect("timer map poisoned")
            .remove(trip_id);

        let Some(payload) = self.build_payload(trip_id) else {
            // trip vanished while the timer was pending
            self.set_phase(trip_id, SyncPhase::Clean);
            return;
        };

        self.set_phase(trip_id, SyncPhase::Syncing);
        match self.remote.push_trip(payload).await {
            Ok(()) => {
                info!(trip_id = %trip_id, "trip synced");
                self.set_phase(trip_id, SyncPhase::Clean);
            }
            Err(err) => {
                warn!(trip_id = %trip_id, error = %err, "trip sync failed, local state kept");
                self.set_phase(trip_id, SyncPhase::Failed);
            }
        }
    }
}

/// Observes applied actions and coalesces bursts of edits into one
/// outbound call per trip per quiet period.
#[derive(Clone)]
pub struct SyncScheduler {
    inner: Arc<Inner>,
}

impl SyncScheduler {
    pub fn new(remote: Arc<dyn RemoteSink>, snapshot: SharedState, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                remote,
                snapshot,
                debounce,
                timers: Mutex::new(HashMap::new()),
                phases: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn phase_of(&self, trip_id: &str) -> SyncPhase {
        self.inner
            .phases
            .lock()
            .expect("phase map poisoned")
            .get(trip_id)
            .copied()
            .unwrap_or(SyncPhase::Clean)
    }

    /// A mutation touched `trip_id`: (re)arm its debounce timer. Only the
    /// timer of this trip is reset; other trips keep counting down.
    pub fn mark_dirty(&self, trip_id: &str) {
        self.inner.set_phase(trip_id, SyncPhase::Dirty);

        let mut timers = self.inner.timers.lock().expect("timer map poisoned");
        if let Some(previous) = timers.remove(trip_id) {
            previous.abort();
        }

        let task_inner = Arc::clone(&self.inner);
        let id = trip_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(task_inner.debounce).await;
            task_inner.run_sync(&id).await;
        });
        timers.insert(trip_id.to_string(), handle);
    }

    /// Drop any pending timer without syncing.
    pub fn cancel(&self, trip_id: &str) {
        let mut timers = self.inner.timers.lock().expect("timer map poisoned");
        if let Some(handle) = timers.remove(trip_id) {
            handle.abort();
        }
        self.inner.set_phase(trip_id, SyncPhase::Clean);
    }

    /// Trip deletion skips the debounce entirely: cancel whatever is
    /// pending and fire the remote delete now.
    pub fn delete_now(&self, trip_id: &str) {
        self.cancel(trip_id);
        let inner = Arc::clone(&self.inner);
        let id = trip_id.to_string();
        tokio::spawn(async move {
            match inner.remote.delete_trip(&id).await {
                Ok(()) => info!(trip_id = %id, "trip deleted remotely"),
                Err(err) => warn!(trip_id = %id, error = %err, "remote trip delete failed"),
            }
        });
    }
}
