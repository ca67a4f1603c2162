pub mod expense;
pub mod itinerary;
pub mod note;
pub mod recommendation;
pub mod settings;
pub mod trip;
pub mod user;
