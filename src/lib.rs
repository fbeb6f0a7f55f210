#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Account registration and login (bcrypt password hashing, JWT access and refresh"]
#![doc = "tokens) plus CRUD over a per-user task list embedded in the user document."]
#![doc = "The binary (`main.rs`) wires these pieces into an Actix Web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
pub use crate::store::{MemoryUserStore, PgUserStore, UserStore};
