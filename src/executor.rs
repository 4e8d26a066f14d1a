//! Host execution context abstraction.
//!
//! Hosts embedding this library (editors, TUIs) usually cannot accept
//! callbacks from arbitrary threads: buffer mutation is only safe on one
//! designated thread. [`HostExecutor`] generalizes "run this on the host's
//! main thread": the stream driver submits every `on_chunk`/`on_exit`
//! callback through it instead of calling them directly.
//!
//! Jobs submitted to one executor must run in submission order on one
//! logical context; the runner relies on this for its ordering guarantee
//! (no chunk delivery after exit delivery).

use tokio::sync::mpsc;

/// A unit of work to run on the host context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Submits jobs to the host's single designated execution context.
pub trait HostExecutor: Send + Sync {
    /// Enqueue a job. Must preserve submission order.
    ///
    /// Implementations must not block the submitting thread on job
    /// completion; the submitter is the stream driver task.
    fn submit(&self, job: Job);
}

/// Executor that runs each job immediately on the submitting thread.
///
/// Suitable for tests and for hosts that are happy to receive callbacks
/// on the stream driver task.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl InlineExecutor {
    /// Create a new inline executor.
    pub fn new() -> Self {
        Self
    }
}

impl HostExecutor for InlineExecutor {
    fn submit(&self, job: Job) {
        job();
    }
}

/// Executor that enqueues jobs for a host-owned drain loop.
///
/// This is the generalized "editor main thread" case: the host keeps the
/// [`JobQueue`] on its designated thread and drains it from its own event
/// loop. Jobs submitted after the queue is dropped are discarded, which is
/// how late callbacks from a cancelled run become no-ops.
#[derive(Debug, Clone)]
pub struct QueueExecutor {
    tx: mpsc::UnboundedSender<Job>,
}

impl QueueExecutor {
    /// Create an executor plus the queue the host drains.
    pub fn new() -> (Self, JobQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, JobQueue { rx })
    }
}

impl HostExecutor for QueueExecutor {
    fn submit(&self, job: Job) {
        // Receiver gone means the host shut down; drop the job.
        let _ = self.tx.send(job);
    }
}

/// Receiving half of a [`QueueExecutor`], owned by the host thread.
pub struct JobQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl JobQueue {
    /// Wait for the next job, or `None` once all executors are dropped.
    pub async fn next_job(&mut self) -> Option<Job> {
        self.rx.recv().await
    }

    /// Run every job already in the queue; returns how many ran.
    pub fn drain_ready(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Run jobs until all executors are dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.next_job().await {
            job();
        }
    }
}
