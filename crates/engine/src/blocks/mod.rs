//! Free-form collision rectangles authored at runtime.

mod block;
mod editor;

pub use block::{BlockLoad, BlockSet, CollisionBlock};
pub use editor::{BlockEditor, MIN_BLOCK_SIZE, RESIZE_STEP};
