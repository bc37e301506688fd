//! Market data module
//!
//! Memory-mapped CSV tick source for replay

mod reader;
mod types;

pub use reader::{DataError, TickReader};
pub use types::Tick;
