pub mod config;
pub mod error;
pub mod models;
pub mod permissions;
pub mod services;
pub mod settle;
pub mod state;
pub mod store;
