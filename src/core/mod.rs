//! Application state and domain rules

pub mod rules;
pub mod state;

pub use state::AppState;
