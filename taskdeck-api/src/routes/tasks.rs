/// Task endpoints
///
/// # Endpoints
///
/// - `POST /api/tasks` - create a task
/// - `GET /api/tasks?page=&limit=` - role-filtered paginated list
/// - `PATCH /api/tasks/:task_id` - partial update, ownership enforced
/// - `PATCH /api/tasks/bulk` - guarded bulk update
///
/// # Visibility rule
///
/// Admins operate on every task; everyone else only on tasks where they
/// are the assignee. List totals are counted under the same filter the
/// page was fetched with, so client-side page math stays correct.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::PageQuery,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::{
        task::{CreateTask, Task, UpdateTask},
        user::{Role, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    pub due_date: Option<NaiveDate>,

    /// Required for admin creation; ignored for everyone else
    pub assigned_to: Option<Uuid>,
}

/// Paginated task list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,

    /// Total under the requester's visibility filter, not the global count
    pub total: i64,

    pub page: i64,

    pub limit: i64,
}

/// Bulk update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    pub task_ids: Vec<Uuid>,

    pub update_data: UpdateTask,
}

/// Bulk update response
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    pub message: String,

    /// Number of tasks written
    pub updated: u64,
}

/// Creates a task
///
/// Admins must name an assignee. Non-admin requests are always assigned
/// to the requester; a client-supplied `assignedTo` is ignored, not an
/// error, so a compromised client cannot plant tasks on other users.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let assigned_to = match auth.role() {
        Role::Admin => {
            let assignee = req.assigned_to.ok_or_else(|| {
                ApiError::BadRequest(
                    "assignedTo is required when an admin creates a task".to_string(),
                )
            })?;

            // Fail with a clear 400 instead of bubbling an FK violation.
            User::find_by_id(&state.db, assignee)
                .await?
                .ok_or_else(|| ApiError::BadRequest("Assigned user does not exist".to_string()))?;

            assignee
        }
        Role::User => auth.user_id(),
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            assigned_to,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, assigned_to = %task.assigned_to, "task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists tasks visible to the requester, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let (page, limit) = query.normalize();
    let offset = query.offset();

    let (tasks, total) = match auth.role() {
        Role::Admin => (
            Task::list_all(&state.db, limit, offset).await?,
            Task::count_all(&state.db).await?,
        ),
        Role::User => (
            Task::list_for_assignee(&state.db, auth.user_id(), limit, offset).await?,
            Task::count_for_assignee(&state.db, auth.user_id()).await?,
        ),
    };

    Ok(Json(TaskListResponse {
        tasks,
        total,
        page,
        limit,
    }))
}

/// Partially updates one task
///
/// Only supplied fields change. Admin updates must carry `assignedTo`
/// and may reassign; assignee updates may touch everything except
/// `assignedTo`, which is stripped rather than rejected (mirroring the
/// create path).
///
/// # Errors
///
/// - `404 Not Found`: no task with this id
/// - `400 Bad Request`: admin update without `assignedTo`
/// - `403 Forbidden`: non-admin updating a task assigned to someone else
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(mut update): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    match auth.role() {
        Role::Admin => {
            let assignee = update.assigned_to.ok_or_else(|| {
                ApiError::BadRequest(
                    "assignedTo is required when an admin updates a task".to_string(),
                )
            })?;

            if assignee != task.assigned_to {
                User::find_by_id(&state.db, assignee).await?.ok_or_else(|| {
                    ApiError::BadRequest("Assigned user does not exist".to_string())
                })?;
            }
        }
        Role::User => {
            if task.assigned_to != auth.user_id() {
                return Err(ApiError::Forbidden(
                    "You can only update your own tasks".to_string(),
                ));
            }
            update.assigned_to = None;
        }
    }

    let updated = Task::update(&state.db, task_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(updated))
}

/// Applies one partial update to a set of tasks, all-or-nothing
///
/// Every targeted task must exist and be updatable by the requester
/// before anything is written. The permissive bulk path this replaces let
/// any authenticated caller mass-mutate arbitrary tasks; here a non-admin
/// touching a single foreign task fails the whole request with 403.
///
/// # Errors
///
/// - `400 Bad Request`: empty id list, empty update, or a non-admin
///   attempting to reassign
/// - `404 Not Found`: at least one id has no task
/// - `403 Forbidden`: at least one task is outside the requester's scope
pub async fn bulk_update_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<BulkUpdateRequest>,
) -> ApiResult<Json<BulkUpdateResponse>> {
    if req.task_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "taskIds must contain at least one id".to_string(),
        ));
    }
    if req.update_data.is_empty() {
        return Err(ApiError::BadRequest(
            "updateData must contain at least one field".to_string(),
        ));
    }

    match auth.role() {
        Role::Admin => {
            if let Some(assignee) = req.update_data.assigned_to {
                User::find_by_id(&state.db, assignee).await?.ok_or_else(|| {
                    ApiError::BadRequest("Assigned user does not exist".to_string())
                })?;
            }
        }
        Role::User => {
            if req.update_data.assigned_to.is_some() {
                return Err(ApiError::BadRequest(
                    "Only admins can reassign tasks".to_string(),
                ));
            }
        }
    }

    let unique_ids: HashSet<Uuid> = req.task_ids.iter().copied().collect();
    let ids: Vec<Uuid> = unique_ids.into_iter().collect();

    let tasks = Task::find_by_ids(&state.db, &ids).await?;
    if tasks.len() != ids.len() {
        return Err(ApiError::NotFound(
            "One or more tasks not found".to_string(),
        ));
    }

    match auth.role() {
        Role::Admin => {}
        Role::User => {
            if tasks.iter().any(|t| t.assigned_to != auth.user_id()) {
                return Err(ApiError::Forbidden(
                    "You can only update your own tasks".to_string(),
                ));
            }
        }
    }

    let updated = Task::update_many(&state.db, &ids, req.update_data).await?;

    tracing::debug!(
        requester = %auth.user_id(),
        updated,
        "bulk task update applied"
    );

    Ok(Json(BulkUpdateResponse {
        message: "Tasks updated".to_string(),
        updated,
    }))
}
