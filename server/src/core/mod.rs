//! Core server infrastructure: configuration, shared state, background tasks.

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
