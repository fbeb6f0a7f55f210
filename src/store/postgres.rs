//! PostgreSQL user store.
//!
//! Each user is one row; the task list is a `JSONB` array in the `todo` column, kept
//! in insertion order. Task mutations rewrite the array inside a single `UPDATE`, so
//! the row lock serializes concurrent writers.

use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, Task, TaskUpdate, User};

const USER_COLUMNS: &str = "id, name, email, password, role, todo";

/// Matches rows whose `todo` array holds an element with `_id = $2`.
const HAS_TASK: &str = "todo @> jsonb_build_array(jsonb_build_object('_id', $2::text))";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: Option<String>,
    email: String,
    password: String,
    role: String,
    todo: Json<Vec<Task>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: row.role,
            todo: row.todo.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Applies the schema in `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn user_exists(&self, id: Uuid) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Builds the error for an embedded-task statement that matched no row.
    async fn missing(&self, owner: Option<Uuid>, task_id: Uuid) -> StoreError {
        if let Some(user_id) = owner {
            match self.user_exists(user_id).await {
                Ok(false) => return StoreError::not_found("User", user_id.to_string()),
                Err(e) => return e,
                Ok(true) => {}
            }
        }
        StoreError::not_found("Task", task_id.to_string())
    }
}

/// SQL expression producing the replacement for the matched element `elem`.
fn patch_expression(update: &TaskUpdate) -> &'static str {
    match update {
        TaskUpdate::Fields { .. } => {
            "elem || jsonb_build_object('name', $3::text, 'description', $4::text)"
        }
        TaskUpdate::Status(_) => "elem || jsonb_build_object('status', $3::text)",
        TaskUpdate::ToggleCompleted => {
            "elem || jsonb_build_object('completed', NOT COALESCE((elem->>'completed')::boolean, false))"
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let user = user.into_user();
        let sql = format!(
            "INSERT INTO users (id, name, email, password, role, todo) \
             VALUES ($1, $2, $3, $4, $5, '[]'::jsonb) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::already_exists("User", user.email.clone())
                } else {
                    StoreError::from(e)
                }
            })?;
        Ok(row.into())
    }

    async fn save(&self, user: &User) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password = $4, role = $5, todo = $6 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.role)
            .bind(Json(&user.todo))
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::from)
            .ok_or_else(|| StoreError::not_found("User", user.id.to_string()))
    }

    async fn push_task(&self, user_id: Uuid, task: Task) -> StoreResult<Task> {
        let result =
            sqlx::query("UPDATE users SET todo = todo || jsonb_build_array($2::jsonb) WHERE id = $1")
                .bind(user_id)
                .bind(Json(&task))
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User", user_id.to_string()));
        }
        log::debug!("appended task {} to user {}", task.id, user_id);
        Ok(task)
    }

    async fn update_task(
        &self,
        owner: Option<Uuid>,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> StoreResult<Task> {
        let sql = format!(
            "UPDATE users SET todo = ( \
                 SELECT jsonb_agg(CASE WHEN elem->>'_id' = $2::text THEN {patch} ELSE elem END ORDER BY pos) \
                 FROM jsonb_array_elements(todo) WITH ORDINALITY AS t(elem, pos) \
             ) \
             WHERE ($1::uuid IS NULL OR id = $1::uuid) AND {HAS_TASK} \
             RETURNING ( \
                 SELECT elem FROM jsonb_array_elements(todo) AS t(elem) \
                 WHERE elem->>'_id' = $2::text LIMIT 1 \
             )",
            patch = patch_expression(&update),
        );

        let mut query = sqlx::query_scalar::<_, Json<Task>>(&sql)
            .bind(owner)
            .bind(task_id.to_string());
        query = match update {
            TaskUpdate::Fields { name, description } => query.bind(name).bind(description),
            TaskUpdate::Status(status) => query.bind(status),
            TaskUpdate::ToggleCompleted => query,
        };

        match query.fetch_optional(&self.pool).await? {
            Some(Json(task)) => Ok(task),
            None => Err(self.missing(owner, task_id).await),
        }
    }

    async fn remove_task(&self, user_id: Uuid, task_id: Uuid) -> StoreResult<()> {
        let sql = format!(
            "UPDATE users SET todo = ( \
                 SELECT COALESCE(jsonb_agg(elem ORDER BY pos), '[]'::jsonb) \
                 FROM jsonb_array_elements(todo) WITH ORDINALITY AS t(elem, pos) \
                 WHERE elem->>'_id' <> $2::text \
             ) \
             WHERE id = $1 AND {HAS_TASK}"
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(task_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing(Some(user_id), task_id).await);
        }
        Ok(())
    }
}
