//! Application state

use chrono::{Local, NaiveDate};

use crate::db::{
    ChunkRepository, Database, FocusSessionRepository, StatsRepository, TaskRepository,
};

pub struct AppState {
    pub db: Database,
    pub tasks: TaskRepository,
    pub chunks: ChunkRepository,
    pub sessions: FocusSessionRepository,
    pub stats: StatsRepository,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            tasks: TaskRepository::new(db.clone()),
            chunks: ChunkRepository::new(db.clone()),
            sessions: FocusSessionRepository::new(db.clone()),
            stats: StatsRepository::new(db.clone()),
            db,
        }
    }

    /// Calendar day that streaks are counted against
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
