//! Route handlers
//!
//! Each handler validates its body, calls one repository operation and
//! shapes the result. Missing records become `ApiError::NotFound`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::core::{rules, AppState};
use crate::db::repositories::{
    chunk::{Chunk, ChunkStatus},
    focus_session::FocusSession,
    stats::UserStats,
    task::{Task, TaskCompletion},
};

use super::error::{ApiError, ApiResult};
use super::types::*;

type AppStateRef = State<Arc<AppState>>;

pub async fn health(State(state): AppStateRef) -> ApiResult<Json<HealthResponse>> {
    let ok = state.db.health_check().await?;
    Ok(Json(HealthResponse {
        ok,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

pub async fn create_task(
    State(state): AppStateRef,
    payload: Result<Json<TaskCreate>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(body) = payload?;
    let task = state.tasks.create(body.into()).await?;
    Ok(Json(task))
}

pub async fn list_tasks(State(state): AppStateRef) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list().await?))
}

pub async fn get_task(
    State(state): AppStateRef,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskDetail>> {
    let task = state
        .tasks
        .get(&task_id)
        .await?
        .ok_or(ApiError::not_found("Task"))?;
    let progress = rules::progress(&task.chunks);
    Ok(Json(TaskDetail { task, progress }))
}

pub async fn delete_task(
    State(state): AppStateRef,
    Path(task_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.tasks.delete(&task_id).await? {
        return Err(ApiError::not_found("Task"));
    }
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

pub async fn create_chunk(
    State(state): AppStateRef,
    Path(task_id): Path<String>,
    payload: Result<Json<ChunkCreate>, JsonRejection>,
) -> ApiResult<Json<Chunk>> {
    let Json(body) = payload?;
    let chunk = state
        .chunks
        .create(&task_id, body.title, body.status.unwrap_or_default())
        .await?
        .ok_or(ApiError::not_found("Task"))?;
    Ok(Json(chunk))
}

pub async fn complete_chunk(
    State(state): AppStateRef,
    Path(chunk_id): Path<String>,
) -> ApiResult<Json<ChunkCompleteResponse>> {
    let updated = state
        .chunks
        .mark_complete(&chunk_id)
        .await?
        .ok_or(ApiError::not_found("Chunk"))?;

    Ok(Json(ChunkCompleteResponse {
        chunk_id: updated.chunk.id,
        status: ChunkStatus::Complete,
        task_progress: updated.task_progress,
    }))
}

pub async fn complete_task(
    State(state): AppStateRef,
    Path(task_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .tasks
        .complete(&task_id)
        .await?
        .ok_or(ApiError::not_found("Task"))?;
    Ok(Json(MessageResponse::new("Task completed and logged")))
}

pub async fn check_chunks_and_complete(
    State(state): AppStateRef,
    Path(task_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let outcome = state
        .tasks
        .complete_if_chunks_done(&task_id)
        .await?
        .ok_or(ApiError::not_found("Task"))?;

    let message = match outcome {
        TaskCompletion::Logged(_) => "All chunks complete. Task archived.",
        TaskCompletion::ChunksRemaining { .. } => "Not all chunks are complete yet.",
    };
    Ok(Json(MessageResponse::new(message)))
}

pub async fn create_focus_session(
    State(state): AppStateRef,
    payload: Result<Json<FocusSessionCreate>, JsonRejection>,
) -> ApiResult<Json<FocusSession>> {
    let Json(body) = payload?;
    let session = state.sessions.create(body.into(), state.today()).await?;
    Ok(Json(session))
}

pub async fn list_focus_sessions(
    State(state): AppStateRef,
) -> ApiResult<Json<Vec<FocusSession>>> {
    Ok(Json(state.sessions.list().await?))
}

pub async fn get_stats(State(state): AppStateRef) -> ApiResult<Json<UserStats>> {
    let stats = state
        .stats
        .get()
        .await?
        .ok_or(ApiError::not_found("Stats"))?;
    Ok(Json(stats))
}
