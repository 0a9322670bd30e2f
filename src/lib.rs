#![doc = "The `taskmanager` library crate."]
#![doc = ""]
#![doc = "Accounts, stateless session tokens, the per-request identity filter, task storage"]
#![doc = "and the HTTP routes of the task manager. The binary (`main.rs`) wires these into an"]
#![doc = "actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
