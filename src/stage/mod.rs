//! Stage abstraction.
//!
//! - [`traits`] - Interfaces the engine reads from and authors through
//! - [`memory`] - In-memory prims and attributes that record every sample

mod traits;
mod memory;

pub use traits::*;
pub use memory::{MemAttribute, MemPrim};
