//! Pipeline harness
//!
//! Bounded lock-free ring and the optional reader/compute thread split

mod ring;
mod runner;

pub use ring::{LockFreeQueue, QueueError};
pub use runner::run_split;
