pub mod config;
pub mod crud;
pub mod models;
pub mod service;
pub mod storage;
pub mod telemetry;

pub use config::{LogFormat, Settings};
pub use service::{AppState, build_router, create_app};
pub use storage::{InMemoryItemStore, InMemoryUserStore, ItemStore, UserStore};
pub use models::*;
