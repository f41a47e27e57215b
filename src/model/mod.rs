pub mod error;
pub mod filter;
pub mod profile;
pub mod task;

pub use error::ModelError;
pub use filter::TaskFilter;
pub use profile::{Profile, ProfileForm};
pub use task::{Task, TaskForm, TaskId, TaskPriority, TaskStatus};
