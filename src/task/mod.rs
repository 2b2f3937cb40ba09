//! Task data model.
//!
//! Defines the task record, its status and priority, the creation and
//! update inputs, and the pure view projections used for rendering.

mod model;
mod priority;
pub mod serde_time;
mod status;
pub mod view;

pub use model::{NewTask, Task, TaskId, TaskPatch};
pub use priority::Priority;
pub use status::TaskStatus;
pub use view::{BadgeInfo, DueDatePhrase, TaskStats};
