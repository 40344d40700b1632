//! Bulk batch analysis
//!
//! Parsing is cheap and happens on the calling side; only the morphometrics
//! step runs on the worker pool. Results arrive out of submission order on a
//! channel as they complete; a per-file failure becomes a record with
//! `error` set and never aborts the rest of the batch.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use serde::{Deserialize, Serialize};

use neurotrace_core::{compute_stats, parse_file};

use crate::morphometrics::compute_morphometrics;
use crate::snapshot::TreeSnapshot;

/// Upper bound on pool size regardless of hardware parallelism.
pub const MAX_BATCH_WORKERS: usize = 8;

/// One input file: name (drives format detection) plus full content.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub file_name: String,
    pub content: String,
}

/// Per-file summary row, mirroring what a results table shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub file_name: String,
    pub node_count: usize,
    pub total_length: f64,
    pub total_surface: f64,
    pub total_volume: f64,
    pub branch_count: usize,
    pub tip_count: usize,
    pub max_strahler_order: u32,
    pub convex_hull_volume: f64,
    pub fractal_dimension: f64,
    pub error: Option<String>,
}

/// A parsed file waiting for its morphometrics pass.
struct BatchTask {
    file_name: String,
    node_count: usize,
    snapshot: TreeSnapshot,
}

/// Handle owned by the caller: a stream of records, progress counters, and a
/// cancel switch.
pub struct BatchHandle {
    pub results: mpsc::Receiver<BatchRecord>,
    total: usize,
    done: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl BatchHandle {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::SeqCst)
    }

    /// Stop dispatch. Queued tasks are dropped; results already in flight
    /// are discarded by the receiving side when the handle drops.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

fn pool_size(n_files: usize) -> usize {
    let hardware = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    hardware.min(MAX_BATCH_WORKERS).min(n_files).max(1)
}

/// Run morphometrics over a set of files on a fixed-size worker pool.
///
/// Files are parsed here, on the calling thread; unparseable files produce
/// an error record immediately. Everything else is queued for the workers.
pub fn run_batch(files: Vec<BatchInput>, workers: Option<usize>) -> BatchHandle {
    let total = files.len();
    let workers = workers.unwrap_or_else(|| pool_size(total));
    let (result_tx, result_rx) = mpsc::channel::<BatchRecord>();
    let done = Arc::new(AtomicUsize::new(0));
    let cancelled = Arc::new(AtomicBool::new(false));

    let mut tasks: VecDeque<BatchTask> = VecDeque::new();
    for file in files {
        match parse_file(&file.file_name, &file.content) {
            Ok(morphology) => tasks.push_back(BatchTask {
                file_name: file.file_name,
                node_count: compute_stats(&morphology).total_nodes,
                snapshot: TreeSnapshot::from(&morphology),
            }),
            Err(err) => {
                done.fetch_add(1, Ordering::SeqCst);
                let _ = result_tx.send(BatchRecord {
                    file_name: file.file_name,
                    error: Some(err.to_string()),
                    ..Default::default()
                });
            }
        }
    }

    tracing::debug!(total, workers, queued = tasks.len(), "starting batch analysis");

    let queue = Arc::new(Mutex::new(tasks));
    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let result_tx = result_tx.clone();
        let done = Arc::clone(&done);
        let cancelled = Arc::clone(&cancelled);

        std::thread::spawn(move || {
            loop {
                if cancelled.load(Ordering::SeqCst) {
                    break;
                }
                let task = queue.lock().expect("queue lock poisoned").pop_front();
                let Some(task) = task else { break };

                let metrics = compute_morphometrics(&task.snapshot);
                let record = BatchRecord {
                    file_name: task.file_name,
                    node_count: task.node_count,
                    total_length: metrics.total_length,
                    total_surface: metrics.total_surface,
                    total_volume: metrics.total_volume,
                    branch_count: metrics.branch_count,
                    tip_count: metrics.tip_count,
                    max_strahler_order: metrics.max_strahler_order,
                    convex_hull_volume: metrics.convex_hull_volume,
                    fractal_dimension: metrics.fractal_dimension,
                    error: None,
                };

                done.fetch_add(1, Ordering::SeqCst);
                if result_tx.send(record).is_err() {
                    // caller dropped the handle; nothing left to report to
                    break;
                }
            }
        });
    }

    BatchHandle {
        results: result_rx,
        total,
        done,
        cancelled,
    }
}
