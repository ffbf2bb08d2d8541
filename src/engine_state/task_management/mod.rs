//! # Task Management System
//!
//! This module provides a task management system for executing work
//! asynchronously across a fixed pool of worker threads.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the main thread and worker threads
//!
//! Each worker has a dedicated channel pair. Tasks are dispatched round-robin
//! to workers with spare capacity and queued in FIFO order otherwise.
//!
//! Every channel remembers the chunk keys of its in-flight tasks. When a worker
//! dies those chunks are handed back to the world with `World::reclaim_chunk`,
//! so nothing stays Loading forever.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks asynchronously and return results
//! 4. Results are applied to the world on the main thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks (a generated chunk asks to be meshed)
//! 6. The cycle continues until all work is complete
//!
//! ## Performance Considerations
//! - **Task Granularity**: one chunk per task, large enough to amortize the channel hop
//! - **Memory**: Each task owns its data; results move back without copying
//! - **Blocking**: Tasks never block on the main thread or on each other
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! // Publish a task for background processing
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In your main/game loop:
//! task_manager.process_completed_tasks(&mut world);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use log::{debug, info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

use super::voxels::world::World;
use crate::core::spatial_key::SpatialKey;

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `in_flight`: Chunk keys of the tasks currently being processed, oldest first
/// - `disconnected`: Set once the worker is found dead; no new tasks are sent to it
/// - `_worker`: Handle to the worker thread (kept alive by this struct)
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    in_flight: VecDeque<Option<SpatialKey>>,
    disconnected: bool,
    _worker: JoinHandle<()>,
}

impl TaskChannel {
    fn has_capacity(&self) -> bool {
        !self.disconnected && self.in_flight.len() < MAX_TASKS_IN_FLIGHT
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting task results and applying them to the world
/// - Handling task queuing when all workers are busy
///
/// Dropping the manager closes every task channel, which ends the workers'
/// receive loops.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// This is set to 1 to ensure tasks are processed in order within each channel.
/// Increasing this value would allow for pipelining but would require more
/// sophisticated task dependency management.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} workers (available parallelism: {:?})",
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
                in_flight: VecDeque::new(),
                disconnected: false,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (worker disconnected)
    ///
    /// # Notes
    /// - Records the task's chunk key as in flight on success
    /// - Marks the channel disconnected on failure and hands the task back for requeueing
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        let key = task.chunk_key();
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.in_flight.push_back(key);
                Ok(())
            }
            Err(err) => {
                warn!("Worker {channel_idx} disconnected, requeueing its task");
                channel.disconnected = true;
                Err(err.0)
            }
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin starting from the last used channel. Channels that have
    /// reached `MAX_TASKS_IN_FLIGHT` or whose worker died are skipped.
    ///
    /// # Returns
    /// - `Some(usize)` index of an available channel
    /// - `None` if all channels are busy or there are no channels available
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| self.channels[idx].has_capacity())
    }

    /// Publishes a new task for execution.
    ///
    /// The task will be executed as soon as a worker becomes available, or queued
    /// if all workers are busy.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let mut task = task;
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                Err(returned) => task = returned,
            }
        }

        self.queued_tasks.push_back(task);
        false
    }

    /// Schedules queued tasks, oldest first, until the queue is empty or all
    /// workers are busy. Call once per frame.
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

    /// Applies every completed task result to the world.
    ///
    /// Must be called on the main thread. Results are processed in the order
    /// they are received per worker; follow-up tasks they return are published
    /// after all results have been drained. Tasks lost with a dead worker are
    /// reclaimed through the world.
    pub fn process_completed_tasks(&mut self, world: &mut World) {
        let mut tasks_to_queue = Vec::new();

        for (idx, channel) in self.channels.iter_mut().enumerate() {
            if channel.disconnected && channel.in_flight.is_empty() {
                continue;
            }
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.in_flight.pop_front();
                        tasks_to_queue.extend(result.handle_result(world));
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        warn!(
                            "Worker {idx} disconnected with {} task(s) in flight",
                            channel.in_flight.len()
                        );
                        channel.disconnected = true;
                        for key in channel.in_flight.drain(..).flatten() {
                            tasks_to_queue.extend(world.reclaim_chunk(key));
                        }
                        break;
                    }
                }
            }
        }

        if !tasks_to_queue.is_empty() {
            debug!("Publishing {} follow-up tasks", tasks_to_queue.len());
        }
        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }

    /// True when nothing is queued and no worker has a task in flight.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty()
            && self
                .channels
                .iter()
                .all(|channel| channel.in_flight.is_empty())
    }

    /// Number of tasks waiting for a worker.
    pub fn queued_len(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Number of tasks currently being processed.
    pub fn in_flight(&self) -> usize {
        self.channels.iter().map(|channel| channel.in_flight.len()).sum()
    }
}
