//! Engine module for task orchestration
//!
//! This module contains the task lifecycle logic, including:
//! - Accepting batches and assigning identifiers
//! - Probing every link of a batch in parallel
//! - Moving finished tasks from pending to completed
//! - Resuming tasks left pending by an interrupted run

mod recovery;
mod task_engine;

pub use task_engine::TaskEngine;
