pub mod task;
pub mod user;

pub use task::{
    CreateTaskRequest, SortDirection, Task, TaskListQuery, TaskQuery, TaskSort, TaskSortField,
    UpdateTaskRequest,
};
pub use user::{SignupRequest, UpdateUserRequest, User};
