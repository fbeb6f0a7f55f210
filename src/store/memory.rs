//! In-memory user store, used by the test suites and for running without a database.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, Task, TaskUpdate, User};

/// In-memory user store. Each operation runs under a single lock acquisition.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored user documents.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn find_task(todo: &mut [Task], task_id: Uuid) -> Option<&mut Task> {
    todo.iter_mut().find(|t| t.id == task_id)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::already_exists("User", user.email));
        }
        let user = user.into_user();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user.clone())
            }
            None => Err(StoreError::not_found("User", user.id.to_string())),
        }
    }

    async fn push_task(&self, user_id: Uuid, task: Task) -> StoreResult<Task> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::not_found("User", user_id.to_string()))?;
        user.todo.push(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        owner: Option<Uuid>,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> StoreResult<Task> {
        let mut users = self.users.write().await;
        let task = match owner {
            Some(user_id) => {
                let user = users
                    .get_mut(&user_id)
                    .ok_or_else(|| StoreError::not_found("User", user_id.to_string()))?;
                find_task(&mut user.todo, task_id)
            }
            None => users
                .values_mut()
                .find_map(|u| find_task(&mut u.todo, task_id)),
        }
        .ok_or_else(|| StoreError::not_found("Task", task_id.to_string()))?;

        update.apply(task);
        Ok(task.clone())
    }

    async fn remove_task(&self, user_id: Uuid, task_id: Uuid) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::not_found("User", user_id.to_string()))?;
        let index = user
            .todo
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| StoreError::not_found("Task", task_id.to_string()))?;
        user.todo.remove(index);
        Ok(())
    }
}
