//! The local domain store: one normalized in-memory snapshot per device,
//! mutated only through [`Action`]s by the pure reducer [`apply`]. The
//! remote side never feeds back in here except through
//! [`Action::ReplaceState`] during bootstrap.

use serde::{Deserialize, Serialize};

use crate::models::{
    expense::Expense, itinerary::ItineraryItem, note::Note, recommendation::Recommendation,
    settings::AppSettings, trip::Trip,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub trips: Vec<Trip>,
    pub itinerary: Vec<ItineraryItem>,
    pub expenses: Vec<Expense>,
    pub recommendations: Vec<Recommendation>,
    pub notes: Vec<Note>,
    pub settings: AppSettings,
}

impl AppState {
    /// Expenses of one trip, newest first.
    pub fn expenses_of(&self, trip_id: &str) -> Vec<Expense> {
        let mut expenses: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| e.trip_id == trip_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        expenses
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub enum Action {
    AddTrip(Trip),
    UpdateTrip(Trip),
    DeleteTrip { trip_id: String },
    AddItem(ItineraryItem),
    UpdateItem(ItineraryItem),
    DeleteItem { id: String },
    SwapDays { trip_id: String, day_a: u32, day_b: u32 },
    AddExpense(Expense),
    UpdateExpense(Expense),
    DeleteExpense { id: String },
    AddRec(Recommendation),
    UpdateRec(Recommendation),
    DeleteRec { id: String },
    ReorderRec { id: String, direction: Direction },
    AddNote(Note),
    UpdateNote(Note),
    DeleteNote { id: String },
    ReorderNote { id: String, direction: Direction },
    UpdateSettings(AppSettings),
    ReplaceState(AppState),
}

impl Action {
    /// The trip a mutation lands on, resolved against the *pre-mutation*
    /// state. Deletes and reorders only carry an entity id, so the lookup
    /// has to happen before the entity disappears.
    pub fn trip_id(&self, state: &AppState) -> Option<String> {
        let find_item = |id: &str| {
            state
                .itinerary
                .iter()
                .find(|i| i.id == id)
                .map(|i| i.trip_id.clone())
        };
        let find_expense = |id: &str| {
            state
                .expenses
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.trip_id.clone())
        };
        let find_rec = |id: &str| {
            state
                .recommendations
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.trip_id.clone())
        };
        let find_note = |id: &str| {
            state
                .notes
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.trip_id.clone())
        };

        match self {
            Action::AddTrip(t) | Action::UpdateTrip(t) => Some(t.id.clone()),
            Action::DeleteTrip { trip_id } | Action::SwapDays { trip_id, .. } => {
                Some(trip_id.clone())
            }
            Action::AddItem(i) | Action::UpdateItem(i) => Some(i.trip_id.clone()),
            Action::DeleteItem { id } => find_item(id),
            Action::AddExpense(e) | Action::UpdateExpense(e) => Some(e.trip_id.clone()),
            Action::DeleteExpense { id } => find_expense(id),
            Action::AddRec(r) | Action::UpdateRec(r) => Some(r.trip_id.clone()),
            Action::DeleteRec { id } | Action::ReorderRec { id, .. } => find_rec(id),
            Action::AddNote(n) | Action::UpdateNote(n) => Some(n.trip_id.clone()),
            Action::DeleteNote { id } | Action::ReorderNote { id, .. } => find_note(id),
            Action::UpdateSettings(_) | Action::ReplaceState(_) => None,
        }
    }

    /// Whether this action changes trip data that the remote store cares
    /// about. Settings are device-local; ReplaceState *comes from* the
    /// remote and must not bounce back.
    pub fn is_trip_mutation(&self) -> bool {
        !matches!(self, Action::UpdateSettings(_) | Action::ReplaceState(_))
    }

}

fn replace_by_id<T, F: Fn(&T) -> &str>(items: &mut [T], replacement: T, id_of: F) {
    let id = id_of(&replacement).to_string();
    if let Some(pos) = items.iter().position(|item| id_of(item) == id) {
        items[pos] = replacement;
    }
}

/// Order + identity accessors for the two reorderable collections.
trait Sequenced {
    fn id(&self) -> &str;
    fn trip_id(&self) -> &str;
    fn order(&self) -> i64;
    fn set_order(&mut self, order: i64);
}

impl Sequenced for Recommendation {
    fn id(&self) -> &str {
        &self.id
    }
    fn trip_id(&self) -> &str {
        &self.trip_id
    }
    fn order(&self) -> i64 {
        self.order
    }
    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

impl Sequenced for Note {
    fn id(&self) -> &str {
        &self.id
    }
    fn trip_id(&self) -> &str {
        &self.trip_id
    }
    fn order(&self) -> i64 {
        self.order
    }
    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

/// Swap the `order` values of the target and its direct neighbor within
/// the same trip. No-op at either edge or when the id is unknown. Equal
/// `order` values make the neighbor choice implementation-defined (stable
/// sort order); callers should not rely on ties.
fn reorder<T: Sequenced>(items: &mut [T], id: &str, direction: Direction) {
    let Some(target_pos) = items.iter().position(|item| item.id() == id) else {
        return;
    };
    let trip_id = items[target_pos].trip_id().to_string();

    let mut siblings: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.trip_id() == trip_id)
        .map(|(idx, _)| idx)
        .collect();
    siblings.sort_by_key(|&idx| items[idx].order());

    let Some(rank) = siblings.iter().position(|&idx| idx == target_pos) else {
        return;
    };

    let neighbor_rank = match direction {
        Direction::Up if rank == 0 => return,
        Direction::Up => rank - 1,
        Direction::Down if rank + 1 == siblings.len() => return,
        Direction::Down => rank + 1,
    };
    let neighbor_pos = siblings[neighbor_rank];

    let a = items[target_pos].order();
    let b = items[neighbor_pos].order();
    items[target_pos].set_order(b);
    items[neighbor_pos].set_order(a);
}

/// The reducer: total and side-effect-free. Unknown ids fall through as
/// no-ops rather than errors.
pub fn apply(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::AddTrip(trip) => state.trips.push(trip),
        Action::UpdateTrip(trip) => replace_by_id(&mut state.trips, trip, |t| t.id.as_str()),
        Action::DeleteTrip { trip_id } => {
            // Cascade in one step so no reader ever sees orphaned children.
            state.trips.retain(|t| t.id != trip_id);
            state.itinerary.retain(|i| i.trip_id != trip_id);
            state.expenses.retain(|e| e.trip_id != trip_id);
            state.recommendations.retain(|r| r.trip_id != trip_id);
            state.notes.retain(|n| n.trip_id != trip_id);
        }

        Action::AddItem(item) => state.itinerary.push(item),
        Action::UpdateItem(item) => replace_by_id(&mut state.itinerary, item, |i| i.id.as_str()),
        Action::DeleteItem { id } => state.itinerary.retain(|i| i.id != id),
        Action::SwapDays { trip_id, day_a, day_b } => {
            for item in state
                .itinerary
                .iter_mut()
                .filter(|i| i.trip_id == trip_id)
            {
                if item.day_index == day_a {
                    item.day_index = day_b;
                } else if item.day_index == day_b {
                    item.day_index = day_a;
                }
            }
        }

        Action::AddExpense(expense) => state.expenses.push(expense),
        Action::UpdateExpense(expense) => replace_by_id(&mut state.expenses, expense, |e| e.id.as_str()),
        Action::DeleteExpense { id } => state.expenses.retain(|e| e.id != id),

        Action::AddRec(rec) => state.recommendations.push(rec),
        Action::UpdateRec(rec) => replace_by_id(&mut state.recommendations, rec, |r| r.id.as_str()),
        Action::DeleteRec { id } => state.recommendations.retain(|r| r.id != id),
        Action::ReorderRec { id, direction } => {
            reorder(&mut state.recommendations, &id, direction)
        }

        Action::AddNote(note) => state.notes.push(note),
        Action::UpdateNote(note) => replace_by_id(&mut state.notes, note, |n| n.id.as_str()),
        Action::DeleteNote { id } => state.notes.retain(|n| n.id != id),
        Action::ReorderNote { id, direction } => reorder(&mut state.notes, &id, direction),

        Action::UpdateSettings(settings) => state.settings = settings,
        Action::ReplaceState(next) => return next,
    }
    state
}
