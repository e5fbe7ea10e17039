//! # Task Management System
//!
//! A small worker pool for executing CPU-bound work off the coordinating
//! thread.
//!
//! ## Architecture Overview
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the coordinator and one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send results back
//! 4. Results are handled on the coordinating thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks, which go through the same queue
//!
//! A manager created with zero workers runs tasks inline in
//! [`TaskManager::wait_for_all`].
//!
//! ## Example Usage
//! ```no_run
//! # use voxel_engine_core::engine_state::{rendering::meshing::MeshManager, task_management::TaskManager};
//! let mut task_manager = TaskManager::new(4);
//! let mut mesh_manager = MeshManager::new(1024);
//!
//! // In the main loop:
//! task_manager.process_completed_tasks(&mut mesh_manager);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, info};
use task::{Task, TaskResult};

use super::rendering::meshing::MeshManager;

/// A communication channel between the coordinator and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the coordinator to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// Dropping the manager closes every task channel, which ends the workers once
/// they finish their current task.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping this at 1 leaves the backlog in the coordinator's queue, where it is
/// handed to whichever worker frees up first.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);
        info!(
            "Starting {} task workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks sent to workers whose results have not been handled yet.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Whether any task is queued or running.
    pub fn has_pending(&self) -> bool {
        !self.queued_tasks.is_empty() || self.tasks_in_flight() > 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker has disconnected
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
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel, round-robin from the last used one.
    ///
    /// Channels that have reached `MAX_TASKS_IN_FLIGHT` are skipped.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately sent to an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    error!("Task worker {} has disconnected", channel_idx);
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

    /// Hands queued tasks to workers until the queue is empty or every worker
    /// is busy. Tasks are dispatched oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // disconnected worker, keep the task for later
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Handles every result that has already arrived, without blocking.
    ///
    /// Follow-up tasks returned by the results are published afterwards.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self, mesh_manager: &mut MeshManager) -> usize {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                tasks_to_queue.extend(result.handle_result(mesh_manager));
                handled += 1;
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }

    /// Blocks until every queued and in-flight task, including follow-ups, has
    /// been processed and its result handled.
    ///
    /// Without workers the queued tasks are processed on the calling thread.
    pub fn wait_for_all(&mut self, mesh_manager: &mut MeshManager) {
        if self.channels.is_empty() {
            while let Some(task) = self.queued_tasks.pop_front() {
                let follow_up = task.process().handle_result(mesh_manager);
                self.queued_tasks.extend(follow_up);
            }
            return;
        }

        while self.has_pending() {
            self.process_queued_tasks();
            if self.tasks_in_flight() == 0 {
                error!(
                    "No task worker accepted work, {} tasks left queued",
                    self.queued_tasks.len()
                );
                return;
            }

            let mut tasks_to_queue = Vec::new();
            for channel in &mut self.channels {
                if channel.num_tasks_in_flight == 0 {
                    continue;
                }
                match channel.result_receiver.recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        tasks_to_queue.extend(result.handle_result(mesh_manager));
                    }
                    Err(_) => {
                        error!("Task worker exited with {} tasks in flight", channel.num_tasks_in_flight);
                        channel.num_tasks_in_flight = 0;
                    }
                }
            }

            for task in tasks_to_queue {
                self.publish_task(task);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::rendering::meshing::Mesh;

    /// Installs an empty mesh at `(x, 0, 0)` and spawns `follow_ups` more
    /// tasks at increasing `x`.
    struct MarkerTask {
        x: i32,
        follow_ups: i32,
    }

    struct MarkerResult {
        x: i32,
        follow_ups: i32,
    }

    impl Task for MarkerTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(MarkerResult {
                x: self.x,
                follow_ups: self.follow_ups,
            })
        }
    }

    impl TaskResult for MarkerResult {
        fn handle_result(self: Box<Self>, mesh_manager: &mut MeshManager) -> Vec<Box<dyn Task + Send>> {
            mesh_manager.install(Point3::new(self.x, 0, 0), Mesh::new());
            if self.follow_ups == 0 {
                return Vec::new();
            }
            vec![Box::new(MarkerTask {
                x: self.x + 1,
                follow_ups: self.follow_ups - 1,
            })]
        }
    }

    #[test]
    fn workers_process_everything() {
        let mut task_manager = TaskManager::new(3);
        let mut mesh_manager = MeshManager::new(64);

        for x in 0..10 {
            task_manager.publish_task(Box::new(MarkerTask { x: x * 100, follow_ups: 0 }));
        }
        assert!(task_manager.tasks_in_flight() <= 3 * MAX_TASKS_IN_FLIGHT);
        assert!(task_manager.has_pending());

        task_manager.wait_for_all(&mut mesh_manager);
        assert!(!task_manager.has_pending());
        assert_eq!(mesh_manager.len(), 10);
    }

    #[test]
    fn follow_up_tasks_are_scheduled() {
        let mut task_manager = TaskManager::new(2);
        let mut mesh_manager = MeshManager::new(64);

        task_manager.publish_task(Box::new(MarkerTask { x: 0, follow_ups: 4 }));
        task_manager.wait_for_all(&mut mesh_manager);

        assert_eq!(mesh_manager.len(), 5);
        assert!((0..5).all(|x| mesh_manager.is_chunk_meshed(Point3::new(x, 0, 0))));
    }

    #[test]
    fn without_workers_tasks_run_inline() {
        let mut task_manager = TaskManager::new(0);
        let mut mesh_manager = MeshManager::new(64);

        assert!(!task_manager.publish_task(Box::new(MarkerTask { x: 7, follow_ups: 1 })));
        assert_eq!(task_manager.queued_task_count(), 1);
        assert_eq!(task_manager.process_completed_tasks(&mut mesh_manager), 0);

        task_manager.wait_for_all(&mut mesh_manager);
        assert_eq!(task_manager.queued_task_count(), 0);
        assert!(mesh_manager.is_chunk_meshed(Point3::new(8, 0, 0)));
    }

    #[test]
    fn polling_eventually_handles_results() {
        let mut task_manager = TaskManager::new(1);
        let mut mesh_manager = MeshManager::new(64);
        task_manager.publish_task(Box::new(MarkerTask { x: 1, follow_ups: 0 }));
        task_manager.publish_task(Box::new(MarkerTask { x: 2, follow_ups: 0 }));
        assert_eq!(task_manager.queued_task_count(), 1);

        let mut handled = 0;
        while handled < 2 {
            handled += task_manager.process_completed_tasks(&mut mesh_manager);
            task_manager.process_queued_tasks();
            thread::yield_now();
        }
        assert_eq!(mesh_manager.len(), 2);
    }
}
