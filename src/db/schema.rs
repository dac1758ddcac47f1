//! SQL schema definitions

pub const SCHEMA: &str = r#"
-- Tasks table
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    step TEXT,
    mood TEXT,
    is_chunked INTEGER NOT NULL DEFAULT 0,
    is_archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Chunks table
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'not_started',
    task_id TEXT NOT NULL,
    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
);

-- Focus sessions table (append-only; titles are snapshots, not references)
CREATE TABLE IF NOT EXISTS focus_sessions (
    id TEXT PRIMARY KEY,
    task_title TEXT NOT NULL,
    chunk_title TEXT,
    duration INTEGER NOT NULL,
    xp_earned INTEGER NOT NULL DEFAULT 0,
    mood TEXT,
    created_at TEXT NOT NULL
);

-- User stats singleton
CREATE TABLE IF NOT EXISTS user_stats (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    total_xp INTEGER NOT NULL DEFAULT 0,
    current_level INTEGER NOT NULL DEFAULT 1,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_active_date TEXT
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_chunks_task_id ON chunks(task_id);
CREATE INDEX IF NOT EXISTS idx_focus_sessions_created_at ON focus_sessions(created_at);
"#;

/// Row id of the single `user_stats` record.
pub const STATS_ROW_ID: i64 = 1;
