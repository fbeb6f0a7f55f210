use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::Task;

/// The only role this service hands out.
pub const DEFAULT_ROLE: &str = "user";

/// A user document: account fields plus the embedded task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    /// bcrypt hash; never leaves the service.
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub todo: Vec<Task>,
}

/// Fields required to create a user document.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl NewUser {
    pub fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            password: self.password_hash,
            role: self.role,
            todo: Vec::new(),
        }
    }
}

/// The user record as returned to clients: no password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: String,
    pub todo: Vec<Task>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            todo: user.todo,
        }
    }
}

/// Profile projection served by the profile endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
