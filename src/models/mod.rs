pub mod task;
pub mod user;

pub use task::{CreateTaskRequest, Page, Task, TaskRange, TaskUpdate};
pub use user::User;
