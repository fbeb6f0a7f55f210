pub mod task;
pub mod user;

pub use task::{CreateTaskRequest, Task, TaskUpdate, UpdateTaskRequest};
pub use user::{NewUser, PublicUser, User, UserProfile};
