//! The dispatch pipeline: validate, gate on role, reduce, then hand the
//! affected trip to the sync scheduler. Local state is optimistic; once
//! an action passes validation it is applied immediately and never rolled
//! back, whatever the remote later says.

use crate::error::AppError;
use crate::models::expense::SplitType;
use crate::models::recommendation::MAX_IMAGES;
use crate::permissions;
use crate::services::sync::{SharedState, SyncScheduler};
use crate::settle;
use crate::store::{apply, Action, AppState};

#[derive(Clone)]
pub struct Store {
    snapshot: SharedState,
    scheduler: SyncScheduler,
    user_id: String,
}

impl Store {
    /// The snapshot handle is shared: the scheduler reads from the same
    /// one when a debounce timer fires.
    pub fn new(snapshot: SharedState, user_id: impl Into<String>, scheduler: SyncScheduler) -> Self {
        Self {
            snapshot,
            scheduler,
            user_id: user_id.into(),
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.snapshot.lock().expect("snapshot poisoned").clone()
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    pub fn dispatch(&self, action: Action) -> Result<(), AppError> {
        let mut guard = self.snapshot.lock().expect("snapshot poisoned");

        validate(&guard, &action)?;
        self.check_permission(&guard, &action)?;

        // trip id has to be resolved before the entity it points at is gone
        let trip_id = action.trip_id(&guard);
        let is_delete = matches!(action, Action::DeleteTrip { .. });
        let is_mutation = action.is_trip_mutation();

        let next = apply(std::mem::take(&mut *guard), action);
        *guard = next;
        drop(guard);

        if let Some(trip_id) = trip_id {
            if is_delete {
                self.scheduler.delete_now(&trip_id);
            } else if is_mutation {
                self.scheduler.mark_dirty(&trip_id);
            }
        }
        Ok(())
    }

    fn check_permission(&self, state: &AppState, action: &Action) -> Result<(), AppError> {
        // creating a trip needs no prior role; the creator becomes owner
        if matches!(action, Action::AddTrip(_)) || !action.is_trip_mutation() {
            return Ok(());
        }
        let Some(trip_id) = action.trip_id(state) else {
            // unknown entity: the reducer treats it as a no-op anyway
            return Ok(());
        };
        let Some(trip) = state.trips.iter().find(|t| t.id == trip_id) else {
            return Ok(());
        };

        let role = permissions::role_of(trip, &self.user_id);
        let allowed = match action {
            Action::DeleteTrip { .. } => permissions::can_delete_trip(role),
            Action::UpdateTrip(_) => permissions::can_edit_metadata(role),
            _ => permissions::can_edit_children(role),
        };
        if !allowed {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

/// Synchronous pre-mutation checks. Anything rejected here never touches
/// the snapshot.
fn validate(state: &AppState, action: &Action) -> Result<(), AppError> {
    match action {
        Action::AddTrip(trip) | Action::UpdateTrip(trip) => {
            if trip.title.trim().is_empty() {
                return Err(AppError::Validation("trip title is required".into()));
            }
            if trip.days == 0 {
                return Err(AppError::Validation("a trip needs at least one day".into()));
            }
        }
        Action::AddExpense(expense) | Action::UpdateExpense(expense) => {
            if expense.title.trim().is_empty() {
                return Err(AppError::Validation("expense title is required".into()));
            }
            if expense.amount < 0.0 {
                return Err(AppError::Validation("expense amount cannot be negative".into()));
            }
            if expense.split_type == SplitType::Custom {
                settle::validate_custom_splits(expense.amount, &expense.custom_splits)?;
            }
        }
        Action::AddItem(item) | Action::UpdateItem(item) => {
            if item.title.trim().is_empty() {
                return Err(AppError::Validation("itinerary title is required".into()));
            }
            if let Some(trip) = state.trips.iter().find(|t| t.id == item.trip_id) {
                if item.day_index >= trip.days {
                    return Err(AppError::Validation(format!(
                        "day {} is outside the trip's {} days",
                        item.day_index, trip.days
                    )));
                }
            }
        }
        Action::AddRec(rec) | Action::UpdateRec(rec) => {
            if rec.images.len() > MAX_IMAGES {
                return Err(AppError::Validation(format!(
                    "a recommendation holds at most {MAX_IMAGES} images"
                )));
            }
        }
        Action::AddNote(note) | Action::UpdateNote(note) => {
            if note.images.len() > MAX_IMAGES {
                return Err(AppError::Validation(format!(
                    "a note holds at most {MAX_IMAGES} images"
                )));
            }
        }
        _ => {}
    }
    Ok(())
}
