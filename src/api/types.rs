//! Request and response bodies

use serde::{Deserialize, Serialize};

use crate::db::repositories::chunk::ChunkStatus;
use crate::db::repositories::focus_session::NewFocusSession;
use crate::db::repositories::task::{NewTask, Task};

/// `POST /tasks/`
#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub is_chunked: bool,
    #[serde(default)]
    pub is_archived: bool,
}

impl From<TaskCreate> for NewTask {
    fn from(body: TaskCreate) -> Self {
        NewTask {
            title: body.title,
            step: body.step,
            mood: body.mood,
            is_chunked: body.is_chunked,
            is_archived: body.is_archived,
        }
    }
}

/// `POST /tasks/{task_id}/chunks/`
#[derive(Debug, Deserialize)]
pub struct ChunkCreate {
    pub title: String,
    /// Missing or null means `not_started`
    #[serde(default)]
    pub status: Option<ChunkStatus>,
}

/// `POST /focus-sessions/`
#[derive(Debug, Deserialize)]
pub struct FocusSessionCreate {
    pub task_title: String,
    #[serde(default)]
    pub chunk_title: Option<String>,
    pub duration: i64,
    pub xp_earned: i64,
    #[serde(default)]
    pub mood: Option<String>,
}

impl From<FocusSessionCreate> for NewFocusSession {
    fn from(body: FocusSessionCreate) -> Self {
        NewFocusSession {
            task_title: body.task_title,
            chunk_title: body.chunk_title,
            duration: body.duration,
            xp_earned: body.xp_earned,
            mood: body.mood,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `PATCH /chunks/{chunk_id}/complete`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChunkCompleteResponse {
    pub chunk_id: String,
    pub status: ChunkStatus,
    pub task_progress: f64,
}

/// `GET /tasks/{task_id}/`
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub progress: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
}
