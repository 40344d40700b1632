//! NeuroTrace Analysis — morphometrics, dendrogram layout, Sholl analysis,
//! and the off-thread computation pool

pub mod batch;
pub mod dendrogram;
pub mod hull;
pub mod morphometrics;
pub mod pool;
pub mod sholl;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use batch::{run_batch, BatchHandle, BatchInput, BatchRecord, MAX_BATCH_WORKERS};
pub use dendrogram::{dendrogram_layout, DendroNode};
pub use hull::convex_hull_volume;
pub use morphometrics::{compute_morphometrics, strahler_orders, Morphometrics, SegmentTortuosity};
pub use pool::AnalysisPool;
pub use sholl::{compute_sholl, sholl_csv, ShollPoint};
pub use snapshot::TreeSnapshot;
