// Public API for integration tests and the sync client

pub mod activation;
pub mod api;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod selection;
pub mod state;
pub mod store;
pub mod types;
