//! Persistence for user documents and their embedded task lists.
//!
//! Every task mutation is a single atomic operation against the owning document,
//! so concurrent requests touching the same list never overwrite each other.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewUser, Task, TaskUpdate, User};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Trait for user document storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Gets a user by email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Gets a user by ID.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Creates a new user. Fails with `AlreadyExists` when the email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Rewrites a whole user document.
    async fn save(&self, user: &User) -> StoreResult<User>;

    /// Appends a task to the end of a user's list.
    async fn push_task(&self, user_id: Uuid, task: Task) -> StoreResult<Task>;

    /// Applies `update` to the embedded task matching `task_id` and returns it.
    ///
    /// With `owner` set only that user's list is searched; without it the first
    /// document holding the task is updated.
    async fn update_task(
        &self,
        owner: Option<Uuid>,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> StoreResult<Task>;

    /// Removes one task, leaving the order of the others untouched.
    async fn remove_task(&self, user_id: Uuid, task_id: Uuid) -> StoreResult<()>;
}
