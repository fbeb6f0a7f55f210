use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Status given to every task when it is created.
pub const INITIAL_STATUS: &str = "inprogress";

/// A task embedded in its owner's `todo` list.
///
/// Tasks have no existence outside their parent user document; the id is only
/// unique within the list it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier generated when the task is created (UUID v4).
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// The name of the task.
    pub name: String,
    /// An optional description for the task.
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form status label, e.g. `"inprogress"`.
    pub status: String,
    /// Completion flag, toggled independently of `status`.
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates a new `Task` with a fresh id, the initial status and `completed` unset.
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            status: INITIAL_STATUS.to_string(),
            completed: false,
        }
    }
}

/// A mutation applied in place to one embedded task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    /// Replace name and description.
    Fields {
        name: String,
        description: Option<String>,
    },
    /// Replace the status label.
    Status(String),
    /// Flip `completed`.
    ToggleCompleted,
}

impl TaskUpdate {
    pub fn apply(&self, task: &mut Task) {
        match self {
            TaskUpdate::Fields { name, description } => {
                task.name = name.clone();
                task.description = description.clone();
            }
            TaskUpdate::Status(status) => task.status = status.clone(),
            TaskUpdate::ToggleCompleted => task.completed = !task.completed,
        }
    }
}

/// Payload for creating a task.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(
        required(message = "Task name is required"),
        length(min = 1, message = "Task name is required")
    )]
    pub task_name: Option<String>,
    pub task_description: Option<String>,
}

/// Payload for replacing a task's name and description.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(
        required(message = "Task name is required"),
        length(min = 1, message = "Task name is required")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
}
