//! Gamification and completion rules
//!
//! Everything here is pure: callers load the records, apply a rule, and
//! persist the result inside their own transaction.

use chrono::{Duration, NaiveDate};

use crate::db::repositories::chunk::{Chunk, ChunkStatus};
use crate::db::repositories::stats::UserStats;

/// XP needed per level.
pub const XP_PER_LEVEL: i64 = 100;

/// Level reached with `total_xp` experience points.
pub fn level_for_xp(total_xp: i64) -> i64 {
    total_xp.div_euclid(XP_PER_LEVEL) + 1
}

/// Apply one logged focus session to the stats record.
///
/// Streaks count calendar days: a session the day after `last_active_date`
/// extends the streak, a second session on the same day leaves it alone, and
/// anything else starts over at 1. `xp_earned` is trusted as-is.
pub fn record_activity(stats: &mut UserStats, xp_earned: i64, today: NaiveDate) {
    stats.total_xp += xp_earned;
    stats.current_level = level_for_xp(stats.total_xp);

    let yesterday = today - Duration::days(1);
    match stats.last_active_date {
        Some(last) if last == yesterday => stats.current_streak += 1,
        Some(last) if last == today => {}
        _ => stats.current_streak = 1,
    }

    stats.longest_streak = stats.longest_streak.max(stats.current_streak);
    stats.last_active_date = Some(today);
}

/// Fraction of chunks marked complete. An empty task counts as done.
pub fn progress(chunks: &[Chunk]) -> f64 {
    if chunks.is_empty() {
        return 1.0;
    }
    let completed = chunks
        .iter()
        .filter(|c| c.status == ChunkStatus::Complete)
        .count();
    completed as f64 / chunks.len() as f64
}

/// True when every chunk is complete (vacuously true for no chunks).
pub fn all_chunks_complete(chunks: &[Chunk]) -> bool {
    chunks.iter().all(|c| c.status == ChunkStatus::Complete)
}

/// What finishing a task is worth, logged as a focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionReward {
    pub xp_earned: i64,
    pub duration: i64,
}

impl CompletionReward {
    /// Reward for completing a task directly.
    pub fn manual() -> Self {
        Self {
            xp_earned: 10,
            duration: 5,
        }
    }

    /// Reward for finishing a task through its chunks.
    pub fn for_chunks(count: usize) -> Self {
        let count = count as i64;
        Self {
            xp_earned: 5 * count,
            duration: 10 * count,
        }
    }
}
