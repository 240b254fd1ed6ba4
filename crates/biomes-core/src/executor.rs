//! A queue-backed [`MutationExecutor`].
//!
//! [`mutation_queue`] splits the executor into a cheap, cloneable sending
//! half that the core dispatches into, and a receiving half owned by
//! whatever rewrites terrain. Dispatch never blocks: the core's contract
//! ends once the job is enqueued.

use tokio::sync::mpsc;

use biomes_types::MutationJob;

use crate::collaborators::{ExecutorError, MutationExecutor};

/// Create a connected executor / queue pair.
pub fn mutation_queue() -> (QueuedExecutor, MutationQueue) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (QueuedExecutor { sender }, MutationQueue { receiver })
}

/// Sending half. Implements [`MutationExecutor`].
#[derive(Debug, Clone)]
pub struct QueuedExecutor {
    sender: mpsc::UnboundedSender<MutationJob>,
}

impl QueuedExecutor {
    /// Whether the receiving half has been dropped or closed.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl MutationExecutor for QueuedExecutor {
    fn is_accepting(&self) -> bool {
        !self.is_closed()
    }

    fn dispatch(&self, job: MutationJob) -> Result<(), ExecutorError> {
        self.sender
            .send(job)
            .map_err(|rejected| ExecutorError::QueueClosed { job: rejected.0.id })
    }
}

/// Receiving half, drained by the terrain writer.
#[derive(Debug)]
pub struct MutationQueue {
    receiver: mpsc::UnboundedReceiver<MutationJob>,
}

impl MutationQueue {
    /// Wait for the next job. Returns `None` once every sender is gone and
    /// the queue is empty.
    pub async fn next(&mut self) -> Option<MutationJob> {
        self.receiver.recv().await
    }

    /// Take the next job if one is already queued.
    pub fn try_next(&mut self) -> Option<MutationJob> {
        self.receiver.try_recv().ok()
    }

    /// Number of jobs waiting.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether no jobs are waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Stop accepting new jobs. Already queued jobs can still be taken.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}
