//! JSON-file backed todo list served over a small REST API.

pub mod app;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;
pub mod store;
pub mod telemetry;

pub use app::{build_router, AppState};
pub use config::Config;
pub use store::{JsonFileStore, MemoryStore, TodoStore};
