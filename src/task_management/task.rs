//! # Task System Core Traits
//!
//! ## Task Lifecycle
//! 1. A `Task` is published via `TaskManager::publish_task()`
//! 2. The task's `process()` method runs on a worker thread, or inline on the
//!    owner thread when the manager has no workers
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is applied to the chunk store on the
//!    owner thread
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the owner thread
//! - Tasks own everything they read; shared inputs are behind an `Arc`

use crate::voxels::chunk_store::ChunkStore;

/// A unit of work that can be executed off the owner thread.
///
/// Tasks should be self-contained and own all the data they need. They must
/// not panic out of `process()`: a failure is reported through the result.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a background thread. Must be thread-safe and not access
    /// thread-local data.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
pub trait TaskResult: Send {
    /// Applies the result on the owner thread. Keep it fast: it runs inside
    /// the frame that calls `process_tasks`.
    fn handle_result(self: Box<Self>, store: &mut ChunkStore);
}
