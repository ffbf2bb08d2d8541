//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work asynchronously across multiple threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with the world
//! 5. The result can apply itself to the world and spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - Tasks own their inputs; the only shared object is the frozen world map

use crate::core::spatial_key::SpatialKey;
use crate::engine_state::voxels::world::World;

/// Follow-up work returned by the main-thread half of a task.
pub type TaskSet = Vec<Box<dyn Task + Send>>;

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks are the primary mechanism for offloading work from the main thread to
/// background workers. They should be self-contained and own all the data they
/// need to perform their work.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a background thread. Failures are carried inside the returned
    /// result so the main thread can log them and recover.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;

    /// The chunk this task works on, handed back to the world if the task is
    /// lost with its worker.
    fn chunk_key(&self) -> Option<SpatialKey> {
        None
    }
}

/// A trait representing the result of processing a `Task`.
///
/// # Implementation Guidelines
/// - Must be `Send` to be transferred back to the main thread
/// - Should avoid expensive computations in `handle_result()`
pub trait TaskResult: Send {
    /// Applies the result to the world on the main thread.
    ///
    /// # Returns
    /// New tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, world: &mut World) -> TaskSet;
}
