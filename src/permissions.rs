//! Who may do what to a trip. A trip has exactly one owner (its creator)
//! and any number of editors who joined via short code; everyone else
//! sees nothing.

use crate::models::trip::{Trip, TripRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Editor,
    None,
}

pub fn role_of(trip: &Trip, user_id: &str) -> Role {
    match trip
        .members
        .iter()
        .find(|m| m.user_id == user_id)
        .map(|m| m.role)
    {
        Some(TripRole::Owner) => Role::Owner,
        Some(TripRole::Editor) => Role::Editor,
        None => Role::None,
    }
}

/// Trip metadata (title, dates, participants) and trip deletion are
/// owner-only.
pub fn can_edit_metadata(role: Role) -> bool {
    role == Role::Owner
}

pub fn can_delete_trip(role: Role) -> bool {
    role == Role::Owner
}

/// Itinerary, expenses, recommendations and notes are open to anyone who
/// is a member at all.
pub fn can_edit_children(role: Role) -> bool {
    matches!(role, Role::Owner | Role::Editor)
}

pub fn can_view(role: Role) -> bool {
    role != Role::None
}

/// The subset of trips the user is allowed to see at all. The remote
/// already scopes its listing to members, so this mostly guards against
/// a snapshot assembled from stale or foreign data.
pub fn visible_trips<'a>(trips: &'a [Trip], user_id: &str) -> Vec<&'a Trip> {
    trips
        .iter()
        .filter(|trip| can_view(role_of(trip, user_id)))
        .collect()
}
