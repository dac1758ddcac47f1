// Repository tests for Tomo

use chrono::NaiveDate;
use tempfile::TempDir;
use tomo::db::{
    repositories::{
        chunk::ChunkStatus,
        focus_session::NewFocusSession,
        task::{NewTask, TaskCompletion},
    },
    ChunkRepository, Database, FocusSessionRepository, StatsRepository, TaskRepository,
};

fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(db_path).unwrap();
    (db, temp_dir)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        ..NewTask::default()
    }
}

fn new_session(title: &str, xp: i64) -> NewFocusSession {
    NewFocusSession {
        task_title: title.to_string(),
        chunk_title: None,
        duration: 25,
        xp_earned: xp,
        mood: Some("focused".to_string()),
    }
}

#[tokio::test]
async fn test_database_initialization() {
    let (db, _temp) = create_test_db();
    assert!(db.path().contains("test.db"));
    assert!(db.health_check().await.unwrap());
}

#[tokio::test]
async fn test_stats_row_created_once() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::new(&db_path).unwrap();
    FocusSessionRepository::new(db)
        .create(new_session("Read", 40), day(2024, 1, 1))
        .await
        .unwrap();

    // Reopening must not reset the existing row
    let db = Database::new(&db_path).unwrap();
    let stats = StatsRepository::new(db).get().await.unwrap().unwrap();
    assert_eq!(stats.total_xp, 40);
}

#[tokio::test]
async fn test_fresh_stats() {
    let (db, _temp) = create_test_db();
    let stats = StatsRepository::new(db).get().await.unwrap().unwrap();

    assert_eq!(stats.total_xp, 0);
    assert_eq!(stats.current_level, 1);
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.longest_streak, 0);
    assert_eq!(stats.last_active_date, None);
}

#[tokio::test]
async fn test_create_and_list_tasks() {
    let (db, _temp) = create_test_db();
    let repo = TaskRepository::new(db);

    let task = repo
        .create(NewTask {
            title: "Write report".to_string(),
            step: Some("outline".to_string()),
            mood: Some("Stressed".to_string()),
            is_chunked: true,
            is_archived: false,
        })
        .await
        .unwrap();

    assert!(!task.id.is_empty());
    assert!(task.chunks.is_empty());
    assert!(task.is_chunked);

    repo.create(new_task("Laundry")).await.unwrap();

    let tasks = repo.list().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Write report");
    assert_eq!(tasks[0].step.as_deref(), Some("outline"));
    assert_eq!(tasks[1].title, "Laundry");
    assert!(!tasks[1].is_chunked);
    assert!(!tasks[1].is_archived);
}

#[tokio::test]
async fn test_chunks_listed_with_their_task() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let chunks = ChunkRepository::new(db);

    let a = tasks.create(new_task("A")).await.unwrap();
    let b = tasks.create(new_task("B")).await.unwrap();
    chunks.create(&a.id, "a1".into(), ChunkStatus::NotStarted).await.unwrap().unwrap();
    chunks.create(&b.id, "b1".into(), ChunkStatus::InProgress).await.unwrap().unwrap();
    chunks.create(&a.id, "a2".into(), ChunkStatus::NotStarted).await.unwrap().unwrap();

    let listed = tasks.list().await.unwrap();
    let titles: Vec<Vec<&str>> = listed
        .iter()
        .map(|t| t.chunks.iter().map(|c| c.title.as_str()).collect())
        .collect();
    assert_eq!(titles, vec![vec!["a1", "a2"], vec!["b1"]]);
    assert_eq!(listed[1].chunks[0].status, ChunkStatus::InProgress);
}

#[tokio::test]
async fn test_chunk_for_missing_task() {
    let (db, _temp) = create_test_db();
    let chunks = ChunkRepository::new(db);

    let result = chunks
        .create("nonexistent-id", "orphan".into(), ChunkStatus::NotStarted)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_mark_chunk_complete_reports_progress() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let chunks = ChunkRepository::new(db);

    let task = tasks.create(new_task("Essay")).await.unwrap();
    let mut ids = Vec::new();
    for title in ["intro", "body", "outro"] {
        let chunk = chunks
            .create(&task.id, title.into(), ChunkStatus::NotStarted)
            .await
            .unwrap()
            .unwrap();
        ids.push(chunk.id);
    }

    let first = chunks.mark_complete(&ids[0]).await.unwrap().unwrap();
    assert!((first.task_progress - 1.0 / 3.0).abs() < 1e-9);

    let second = chunks.mark_complete(&ids[1]).await.unwrap().unwrap();
    assert_eq!(second.chunk.status, ChunkStatus::Complete);
    assert!((second.task_progress - 2.0 / 3.0).abs() < 1e-9);

    // Completing again is idempotent
    let again = chunks.mark_complete(&ids[1]).await.unwrap().unwrap();
    assert!((again.task_progress - 2.0 / 3.0).abs() < 1e-9);

    let stored = chunks.get(&ids[2]).await.unwrap().unwrap();
    assert_eq!(stored.status, ChunkStatus::NotStarted);

    assert!(chunks.mark_complete("nonexistent-id").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_task_cascades_to_chunks() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let chunks = ChunkRepository::new(db);

    let task = tasks.create(new_task("Tidy desk")).await.unwrap();
    chunks.create(&task.id, "papers".into(), ChunkStatus::NotStarted).await.unwrap().unwrap();

    assert!(tasks.delete(&task.id).await.unwrap());
    assert!(tasks.get(&task.id).await.unwrap().is_none());
    assert!(chunks.list_for_task(&task.id).await.unwrap().is_empty());

    assert!(!tasks.delete(&task.id).await.unwrap());
}

#[tokio::test]
async fn test_complete_task_logs_and_deletes() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let sessions = FocusSessionRepository::new(db.clone());
    let stats = StatsRepository::new(db);

    let task = tasks.create(new_task("Write report")).await.unwrap();
    let logged = tasks
        .complete(&task.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(logged.task_title, "Write report");
    assert_eq!(logged.xp_earned, 10);
    assert_eq!(logged.duration, 5);

    assert!(tasks.list().await.unwrap().is_empty());
    assert_eq!(sessions.list().await.unwrap(), vec![logged]);

    // Only POST /focus-sessions/ credits XP and streaks
    let stats = stats.get().await.unwrap().unwrap();
    assert_eq!(stats.total_xp, 0);
    assert_eq!(stats.current_level, 1);
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.last_active_date, None);

    assert!(tasks.complete(&task.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_complete_if_chunks_done() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let chunks = ChunkRepository::new(db.clone());
    let sessions = FocusSessionRepository::new(db.clone());
    let stats = StatsRepository::new(db);

    let task = tasks.create(new_task("Move house")).await.unwrap();
    let mut ids = Vec::new();
    for title in ["pack", "drive", "unpack", "clean"] {
        let chunk = chunks
            .create(&task.id, title.into(), ChunkStatus::NotStarted)
            .await
            .unwrap()
            .unwrap();
        ids.push(chunk.id);
    }
    chunks.mark_complete(&ids[0]).await.unwrap();

    let outcome = tasks
        .complete_if_chunks_done(&task.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        outcome,
        TaskCompletion::ChunksRemaining { complete: 1, total: 4 }
    );
    assert!(tasks.get(&task.id).await.unwrap().is_some());
    assert!(sessions.list().await.unwrap().is_empty());

    for id in &ids[1..] {
        chunks.mark_complete(id).await.unwrap();
    }

    let outcome = tasks
        .complete_if_chunks_done(&task.id)
        .await
        .unwrap()
        .unwrap();
    let TaskCompletion::Logged(session) = outcome else {
        panic!("expected the task to be logged");
    };
    assert_eq!(session.xp_earned, 20);
    assert_eq!(session.duration, 40);

    assert!(tasks.get(&task.id).await.unwrap().is_none());
    assert!(chunks.list_for_task(&task.id).await.unwrap().is_empty());
    assert_eq!(sessions.list().await.unwrap().len(), 1);
    assert_eq!(stats.get().await.unwrap().unwrap().total_xp, 0);
}

#[tokio::test]
async fn test_failed_delete_rolls_back_completion_log() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let sessions = FocusSessionRepository::new(db.clone());

    let task = tasks.create(new_task("Locked")).await.unwrap();
    db.conn()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER block_task_delete BEFORE DELETE ON tasks
             BEGIN SELECT RAISE(ABORT, 'task delete blocked'); END;",
        )
        .unwrap();

    assert!(tasks.complete(&task.id).await.is_err());

    assert!(sessions.list().await.unwrap().is_empty());
    let remaining = tasks.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, task.id);
}

#[tokio::test]
async fn test_concurrent_completions_log_once() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let sessions = FocusSessionRepository::new(db.clone());
    let stats = StatsRepository::new(db.clone());

    let task = tasks.create(new_task("Race")).await.unwrap();
    let other = TaskRepository::new(db);

    let (a, b, logged_session) = tokio::join!(
        tasks.complete(&task.id),
        other.complete(&task.id),
        sessions.create(new_session("Read", 30), day(2024, 6, 1)),
    );
    logged_session.unwrap();
    let logged = [a.unwrap(), b.unwrap()]
        .into_iter()
        .filter(Option::is_some)
        .count();
    assert_eq!(logged, 1);
    assert_eq!(sessions.list().await.unwrap().len(), 2);
    assert_eq!(stats.get().await.unwrap().unwrap().total_xp, 30);
}

#[tokio::test]
async fn test_corrupt_rows_are_reported() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let chunks = ChunkRepository::new(db.clone());
    let sessions = FocusSessionRepository::new(db.clone());

    let task = tasks.create(new_task("Garbled")).await.unwrap();
    let chunk = chunks
        .create(&task.id, "part".into(), ChunkStatus::NotStarted)
        .await
        .unwrap()
        .unwrap();
    sessions.create(new_session("Read", 5), day(2024, 6, 1)).await.unwrap();

    let conn = db.conn().unwrap();
    conn.execute("UPDATE chunks SET status = 'finished' WHERE id = ?1", [&chunk.id])
        .unwrap();
    conn.execute("UPDATE focus_sessions SET created_at = 'yesterday'", [])
        .unwrap();
    drop(conn);

    assert!(chunks.get(&chunk.id).await.is_err());
    assert!(tasks.list().await.is_err());
    assert!(sessions.list().await.is_err());
}

#[tokio::test]
async fn test_focus_sessions_newest_first() {
    let (db, _temp) = create_test_db();
    let repo = FocusSessionRepository::new(db);

    for title in ["first", "second", "third"] {
        repo.create(new_session(title, 5), day(2024, 6, 1)).await.unwrap();
    }

    let titles: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.task_title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_session_history_survives_task_deletion() {
    let (db, _temp) = create_test_db();
    let tasks = TaskRepository::new(db.clone());
    let sessions = FocusSessionRepository::new(db);

    let task = tasks.create(new_task("Study")).await.unwrap();
    sessions
        .create(
            NewFocusSession {
                chunk_title: Some("chapter 1".to_string()),
                ..new_session(&task.title, 15)
            },
            day(2024, 6, 1),
        )
        .await
        .unwrap();
    tasks.delete(&task.id).await.unwrap();

    let history = sessions.list().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].task_title, "Study");
    assert_eq!(history[0].chunk_title.as_deref(), Some("chapter 1"));
}

#[tokio::test]
async fn test_streak_across_days() {
    let (db, _temp) = create_test_db();
    let sessions = FocusSessionRepository::new(db.clone());
    let stats = StatsRepository::new(db);

    sessions.create(new_session("a", 60), day(2024, 6, 1)).await.unwrap();
    sessions.create(new_session("b", 60), day(2024, 6, 2)).await.unwrap();
    sessions.create(new_session("c", 10), day(2024, 6, 2)).await.unwrap();

    let current = stats.get().await.unwrap().unwrap();
    assert_eq!(current.total_xp, 130);
    assert_eq!(current.current_level, 2);
    assert_eq!(current.current_streak, 2);
    assert_eq!(current.longest_streak, 2);
    assert_eq!(current.last_active_date, Some(day(2024, 6, 2)));

    // Two-day gap
    sessions.create(new_session("d", 0), day(2024, 6, 4)).await.unwrap();
    let current = stats.get().await.unwrap().unwrap();
    assert_eq!(current.current_streak, 1);
    assert_eq!(current.longest_streak, 2);
}

#[tokio::test]
async fn test_in_memory_database() {
    let db = Database::in_memory().unwrap();
    let stats = StatsRepository::new(db.clone()).ensure().await.unwrap();
    assert_eq!(stats.current_level, 1);

    let tasks = TaskRepository::new(db);
    tasks.create(new_task("Scratch")).await.unwrap();
    assert_eq!(tasks.list().await.unwrap().len(), 1);
}
