/// Task model and database operations
///
/// Tasks are always assigned to exactly one user (`assigned_to`), which is
/// what the per-role visibility rules key on: admins operate on the whole
/// table, everyone else only on rows where they are the assignee.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     due_date DATE,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     assigned_to UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// Optional calendar due date
    pub due_date: Option<NaiveDate>,

    pub completed: bool,

    /// The user this task is assigned to; always set
    pub assigned_to: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    /// Resolved by the handler: the admin-supplied assignee, or the
    /// requester for non-admin creation.
    pub assigned_to: Uuid,
}

/// Partial update for a task
///
/// Only fields that are `Some` are written. `due_date` uses a double
/// Option so a JSON `null` clears the date while an absent field leaves
/// it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,

    pub description: Option<String>,

    #[serde(default, with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    pub completed: Option<bool>,

    pub assigned_to: Option<Uuid>,
}

/// Serde helper distinguishing an absent field from an explicit null.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

impl UpdateTask {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
            && self.assigned_to.is_none()
    }
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, due_date, assigned_to)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, due_date, completed, assigned_to,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, completed, assigned_to,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Loads all tasks for a set of ids
    ///
    /// Order is unspecified; callers match rows back by id. Missing ids
    /// simply produce fewer rows, which the bulk-update handler treats as
    /// not-found.
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, completed, assigned_to,
                   created_at, updated_at
            FROM tasks
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists all tasks with pagination, newest first (admin view)
    pub async fn list_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, completed, assigned_to,
                   created_at, updated_at
            FROM tasks
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts all tasks (admin view)
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Lists tasks assigned to one user, newest first
    pub async fn list_for_assignee(
        pool: &PgPool,
        assignee: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, completed, assigned_to,
                   created_at, updated_at
            FROM tasks
            WHERE assigned_to = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(assignee)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks assigned to one user
    ///
    /// Must use the same filter as [`Task::list_for_assignee`] so page
    /// counts computed by the client stay correct.
    pub async fn count_for_assignee(pool: &PgPool, assignee: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE assigned_to = $1")
                .bind(assignee)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Applies a partial update to one task
    ///
    /// Only fields present in `data` are written; everything else stays as
    /// is. Returns the updated task, or None if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = build_update_clause("WHERE id = $1", &data);
        query.push_str(
            " RETURNING id, title, description, due_date, completed, assigned_to, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Applies the same partial update to every task in the id set
    ///
    /// Permission filtering is the caller's job; this only performs the
    /// write. Returns the number of rows touched.
    pub async fn update_many(
        pool: &PgPool,
        ids: &[Uuid],
        data: UpdateTask,
    ) -> Result<u64, sqlx::Error> {
        if data.is_empty() {
            return Ok(0);
        }

        let query = build_update_clause("WHERE id = ANY($1)", &data);

        let mut q = sqlx::query(&query).bind(ids);
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected())
    }
}

/// Builds a dynamic UPDATE statement for the fields present in `data`
///
/// `filter` is the WHERE clause; its single placeholder occupies `$1`,
/// field binds follow in declaration order.
fn build_update_clause(filter: &str, data: &UpdateTask) -> String {
    let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
    let mut bind_count = 1;

    if data.title.is_some() {
        bind_count += 1;
        query.push_str(&format!(", title = ${}", bind_count));
    }
    if data.description.is_some() {
        bind_count += 1;
        query.push_str(&format!(", description = ${}", bind_count));
    }
    if data.due_date.is_some() {
        bind_count += 1;
        query.push_str(&format!(", due_date = ${}", bind_count));
    }
    if data.completed.is_some() {
        bind_count += 1;
        query.push_str(&format!(", completed = ${}", bind_count));
    }
    if data.assigned_to.is_some() {
        bind_count += 1;
        query.push_str(&format!(", assigned_to = ${}", bind_count));
    }

    query.push(' ');
    query.push_str(filter);

    query
}
