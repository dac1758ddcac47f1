//! User stats repository
//!
//! `user_stats` holds exactly one row (`id = 1`). The free functions take a
//! plain connection so writers can run them inside their own transaction.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::core::rules;
use crate::db::schema::STATS_ROW_ID;
use crate::db::Database;

use super::date_column;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_xp: i64,
    pub current_level: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: Option<NaiveDate>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_xp: 0,
            current_level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
        }
    }
}

pub(crate) fn load(conn: &Connection) -> rusqlite::Result<Option<UserStats>> {
    let result = conn.query_row(
        "SELECT total_xp, current_level, current_streak, longest_streak, last_active_date
         FROM user_stats WHERE id = ?1",
        params![STATS_ROW_ID],
        |row| {
            Ok(UserStats {
                total_xp: row.get(0)?,
                current_level: row.get(1)?,
                current_streak: row.get(2)?,
                longest_streak: row.get(3)?,
                last_active_date: date_column(row, 4)?,
            })
        },
    );

    match result {
        Ok(stats) => Ok(Some(stats)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

fn save(conn: &Connection, stats: &UserStats) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE user_stats
         SET total_xp = ?1, current_level = ?2, current_streak = ?3,
             longest_streak = ?4, last_active_date = ?5
         WHERE id = ?6",
        params![
            stats.total_xp,
            stats.current_level,
            stats.current_streak,
            stats.longest_streak,
            stats.last_active_date.map(|d| d.to_string()),
            STATS_ROW_ID,
        ],
    )?;
    Ok(())
}

/// Credit `xp_earned` for activity on `today`. A missing stats row is left
/// missing.
pub(crate) fn record_activity(
    conn: &Connection,
    xp_earned: i64,
    today: NaiveDate,
) -> rusqlite::Result<Option<UserStats>> {
    let Some(mut stats) = load(conn)? else {
        tracing::warn!("No user_stats row; skipping XP update");
        return Ok(None);
    };

    rules::record_activity(&mut stats, xp_earned, today);
    save(conn, &stats)?;

    tracing::debug!(
        "Stats updated: xp={} level={} streak={}",
        stats.total_xp,
        stats.current_level,
        stats.current_streak
    );
    Ok(Some(stats))
}

pub struct StatsRepository {
    db: Database,
}

impl StatsRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Read the singleton stats row
    pub async fn get(&self) -> Result<Option<UserStats>> {
        self.db
            .run(|conn| load(conn).context("Failed to read user stats"))
            .await
    }

    /// Create the stats row if it is missing and return it
    pub async fn ensure(&self) -> Result<UserStats> {
        self.db
            .run(|conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO user_stats (id) VALUES (?1)",
                    params![STATS_ROW_ID],
                )?;
                load(conn)?.context("user_stats row missing after insert")
            })
            .await
    }
}
