//! # Task System Core Traits
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the coordinating thread
//! 5. The result installs its output and may spawn follow-up tasks
//!
//! ## Thread Safety
//! Tasks own everything they read. A task never borrows the world, so workers
//! cannot observe a half-applied edit.

use crate::engine_state::rendering::meshing::MeshManager;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should be self-contained and own all the data they need, typically an
/// immutable snapshot taken on the coordinating thread.
pub trait Task: Send {
    /// Performs the work and returns a result.
    ///
    /// Runs on a background thread. Must not block on the coordinating thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The output of a processed [`Task`].
pub trait TaskResult: Send {
    /// Applies the result on the coordinating thread.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, mesh_manager: &mut MeshManager) -> Vec<Box<dyn Task + Send>>;
}
