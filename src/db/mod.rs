//! Database module

pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::Database;
pub use repositories::{
    chunk::ChunkRepository, focus_session::FocusSessionRepository, stats::StatsRepository,
    task::TaskRepository,
};
