//! A fixed pool of reusable worker threads.
//!
//! Each worker owns a thread and a task channel. Tasks are submitted to a
//! specific worker and run one at a time in submission order. Submitting
//! returns a [`TaskHandle`] whose [`wait`](TaskHandle::wait) blocks until the
//! task has finished.
//!
//! # Lifecycle
//!
//! - A worker is busy from the moment its task starts until the task returns;
//!   it then picks up the next queued task or goes idle.
//! - Dropping a handle without waiting is allowed: the task still runs and its
//!   result is discarded.
//! - A panicking task is caught on the worker thread and reported through its
//!   handle; the worker keeps serving tasks.
//! - Dropping the pool closes every task channel, lets queued tasks finish,
//!   and joins all threads.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use crate::error::{Error, Result, WorkerError};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    index: usize,
    sender: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(index: usize) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let thread = thread::Builder::new()
            .name(format!("huffpar-worker-{index}"))
            .spawn(move || run_worker(index, receiver))?;

        Ok(Self {
            index,
            sender: Some(sender),
            thread: Some(thread),
        })
    }
}

fn run_worker(index: usize, tasks: Receiver<Job>) {
    trace!(worker = index, "worker started");
    // Ends once the pool drops the sender and the queue is drained.
    while let Ok(job) = tasks.recv() {
        job();
    }
    trace!(worker = index, "worker stopped");
}

/// Blocking handle to the result of a submitted task.
#[must_use = "dropping a handle discards the task's result"]
#[derive(Debug)]
pub struct TaskHandle<R> {
    worker: usize,
    result: Receiver<thread::Result<R>>,
}

impl<R> TaskHandle<R> {
    /// Index of the worker running the task.
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Block until the task finishes and return its value.
    ///
    /// # Errors
    /// - `WorkerError::Panicked` if the task panicked
    /// - `WorkerError::Disconnected` if the worker thread is gone
    pub fn wait(self) -> Result<R> {
        match self.result.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                warn!(worker = self.worker, %message, "task panicked");
                Err(WorkerError::Panicked {
                    worker: self.worker,
                    message,
                }
                .into())
            }
            Err(_) => Err(WorkerError::Disconnected {
                worker: self.worker,
            }
            .into()),
        }
    }
}

/// A fixed set of long-lived worker threads.
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Spawn `workers` threads.
    ///
    /// # Errors
    /// - `Error::Config` if `workers` is 0
    /// - `Error::Io` if a thread cannot be spawned
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config("worker pool needs at least one worker".into()));
        }

        let workers = (0..workers)
            .map(Worker::spawn)
            .collect::<Result<Vec<_>>>()?;
        debug!(workers = workers.len(), "worker pool started");

        Ok(Self { workers })
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Always false: a pool has at least one worker.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Run `task` on worker `index`.
    ///
    /// If the worker is busy the task waits behind the tasks already queued
    /// for it.
    ///
    /// # Errors
    /// - `WorkerError::InvalidWorker` if `index >= len()`
    /// - `WorkerError::Disconnected` if the worker thread has exited
    pub fn submit<F, R>(&self, index: usize, task: F) -> Result<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let worker = self.workers.get(index).ok_or(WorkerError::InvalidWorker {
            index,
            workers: self.workers.len(),
        })?;
        let sender = worker
            .sender
            .as_ref()
            .ok_or(WorkerError::Disconnected { worker: index })?;

        let (result_tx, result_rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(task));
            // The handle may have been dropped; the result is then discarded.
            let _ = result_tx.send(result);
        });

        sender
            .send(job)
            .map_err(|_| WorkerError::Disconnected { worker: index })?;
        trace!(worker = index, "task submitted");

        Ok(TaskHandle {
            worker: index,
            result: result_rx,
        })
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for worker in &mut self.workers {
            worker.sender.take();
        }
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!(worker = worker.index, "worker thread panicked");
                }
            }
        }
        debug!(workers = self.workers.len(), "worker pool stopped");
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
