//! Off-thread morphometrics computation
//!
//! Morphometrics is the one expensive stage (hull + box counting), so it is
//! kept off the interactive path: the caller serializes the tree into an
//! owned [`TreeSnapshot`] message, a worker computes, and one result message
//! comes back. No mutable state is shared between caller and worker.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::morphometrics::{compute_morphometrics, Morphometrics};
use crate::snapshot::TreeSnapshot;

struct Job {
    snapshot: TreeSnapshot,
    response: mpsc::Sender<Morphometrics>,
}

/// A fixed pool of worker threads draining a shared job queue.
///
/// Dropping the pool closes the queue; workers drain what is left and exit.
pub struct AnalysisPool {
    sender: mpsc::Sender<Job>,
}

impl AnalysisPool {
    pub fn new(num_workers: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        for worker_id in 0..num_workers.max(1) {
            let receiver = Arc::clone(&receiver);
            std::thread::spawn(move || Self::worker_thread(worker_id, receiver));
        }

        Self { sender }
    }

    fn worker_thread(worker_id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) {
        tracing::debug!("analysis worker {worker_id} started");
        loop {
            let job = {
                let guard = receiver.lock().expect("queue lock poisoned");
                guard.recv()
            };
            let Ok(job) = job else {
                tracing::debug!("analysis worker {worker_id} shutting down");
                break;
            };

            let result = compute_morphometrics(&job.snapshot);
            if job.response.send(result).is_err() {
                tracing::warn!("analysis result dropped: caller went away");
            }
        }
    }

    /// Submit one snapshot and block until its result arrives.
    pub fn compute_blocking(&self, snapshot: TreeSnapshot) -> Result<Morphometrics> {
        let (response, receiver) = mpsc::channel();
        self.sender
            .send(Job { snapshot, response })
            .map_err(|_| anyhow!("analysis pool is shut down"))?;
        receiver.recv().map_err(|_| anyhow!("analysis worker died"))
    }
}
