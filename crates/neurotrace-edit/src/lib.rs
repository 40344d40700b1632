//! NeuroTrace Edit — reversible editing of morphology trees with bounded
//! undo/redo history

pub mod engine;
pub mod ops;

#[cfg(test)]
mod tests;

pub use engine::EditEngine;
pub use ops::{apply_ops, invert_batch, TreeOp};
