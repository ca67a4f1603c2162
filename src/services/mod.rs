pub mod api;
pub mod sync;
