//! Tomo - personal productivity tracker with chunked tasks, focus sessions and XP streaks

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
