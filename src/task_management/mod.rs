//! # Task Management System
//!
//! A cross-platform pool for running chunk generation off the owner thread,
//! on native threads or on Web Workers under WASM.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, applied to the chunk store
//! - `TaskChannel`: Communication channel between the owner thread and one worker
//!
//! ## Platform-Specific Behavior
//!
//! ### Native (Desktop)
//! - Uses `std::thread` for true multi-threading
//! - Each worker has a dedicated channel for task distribution
//!
//! ### Web (WASM)
//! - Uses the `wasm_thread` crate, which backs threads with Web Workers
//! - Tasks are processed asynchronously but may not run in parallel
//!
//! ### Inline
//! A manager created with zero workers runs queued tasks on the owner thread
//! when `process_completed_tasks()` is called, at most
//! [`INLINE_TASKS_PER_PASS`] per call.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks asynchronously and return results
//! 4. Results are applied on the owner thread in `process_completed_tasks()`
//!
//! Results arrive in whatever order the workers finish. There is no
//! cancellation; the store decides what to do with results nobody wants any
//! more.

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};

use log::{debug, info, warn};
use task::{Task, TaskResult};

#[cfg(target_family = "wasm")]
mod wasm_imports {
    pub use wasm_thread as thread;
    pub use wasm_thread::JoinHandle;
}

#[cfg(target_family = "wasm")]
use self::wasm_imports::*;

#[cfg(not(target_family = "wasm"))]
use std::thread::{self, JoinHandle};

use crate::voxels::chunk_store::ChunkStore;

/// A communication channel between the owner thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the owner thread to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread (kept alive by this struct)
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of live worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept small so queued work can still be reprioritised by the store before
/// it reaches a worker.
pub const MAX_TASKS_IN_FLIGHT: usize = 2;

/// Tasks run per `process_completed_tasks()` call when there are no workers.
pub const INLINE_TASKS_PER_PASS: usize = 4;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// A worker that fails to spawn is logged and skipped; with no workers
    /// at all the manager runs tasks inline.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {num_workers} generation workers (available parallelism: {:?})",
                thread::available_parallelism()
            );
        }

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }),
                Err(err) => warn!("Failed to spawn generation worker {index}: {err}"),
            }
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of live worker channels. Zero means tasks run inline.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks waiting for a worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Tasks handed to workers whose results have not been received yet.
    pub fn in_flight_count(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Number of tasks that can be published right now without waiting in the
    /// queue: free worker slots, or one inline pass when there are no workers.
    pub fn available_capacity(&self) -> usize {
        let slots = if self.channels.is_empty() {
            INLINE_TASKS_PER_PASS
        } else {
            (self.channels.len() * MAX_TASKS_IN_FLIGHT).saturating_sub(self.in_flight_count())
        };
        slots.saturating_sub(self.queued_tasks.len())
    }

    /// Returns true when nothing is queued and nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.in_flight_count() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// Returns the task back when the worker has disconnected. The dead
    /// channel is dropped from the pool.
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                self.drop_channel(channel_idx);
                Err(task.0)
            }
        }
    }

    fn drop_channel(&mut self, channel_idx: usize) {
        let channel = self.channels.remove(channel_idx);
        warn!(
            "Generation worker disconnected with {} tasks in flight",
            channel.num_tasks_in_flight
        );
        self.current_channel = 0;
    }

    /// Finds an available worker channel using round-robin, starting from the
    /// last used channel. Channels at `MAX_TASKS_IN_FLIGHT` are skipped.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel % self.channels.len();
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers, oldest first, until the queue is empty
    /// or every worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Applies every result the workers have finished, without blocking.
    ///
    /// Without workers this runs up to [`INLINE_TASKS_PER_PASS`] queued tasks
    /// inline instead. Returns the number of results applied.
    pub fn process_completed_tasks(&mut self, store: &mut ChunkStore) -> usize {
        if self.channels.is_empty() {
            return self.run_inline(store, INLINE_TASKS_PER_PASS);
        }

        let mut handled = 0;
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                result.handle_result(store);
                handled += 1;
            }
        }
        handled
    }

    /// Blocks until one more result is available and applies it.
    ///
    /// Returns false when there was nothing to wait for.
    pub fn wait_for_result(&mut self, store: &mut ChunkStore) -> bool {
        if self.channels.is_empty() {
            return self.run_inline(store, 1) > 0;
        }

        let Some(channel_idx) = self
            .channels
            .iter()
            .position(|channel| channel.num_tasks_in_flight > 0)
        else {
            return false;
        };

        match self.channels[channel_idx].result_receiver.recv() {
            Ok(result) => {
                self.channels[channel_idx].num_tasks_in_flight -= 1;
                result.handle_result(store);
                true
            }
            Err(_) => {
                self.drop_channel(channel_idx);
                false
            }
        }
    }

    fn run_inline(&mut self, store: &mut ChunkStore, limit: usize) -> usize {
        let mut handled = 0;
        while handled < limit {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            task.process().handle_result(store);
            handled += 1;
        }
        if handled > 0 {
            debug!("Ran {handled} tasks inline, {} still queued", self.queued_tasks.len());
        }
        handled
    }
}
