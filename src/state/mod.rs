//! State module describing tasks and their links
//!
//! # Components
//!
//! - `TaskId`: Positive, never-reused identifier of a submitted batch
//! - `LinkRecord`: One URL of a batch together with its probed availability
//! - `TaskState`: The two lifecycle states (pending, completed) a task moves through

mod link;
mod task_id;
mod task_state;

// Re-export main types
pub use link::LinkRecord;
pub use task_id::TaskId;
pub use task_state::TaskState;
