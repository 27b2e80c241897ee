//! Prim wrappers: per-prim sync state, the factory registry and batch
//! processing.

mod registry;
mod prim_wrapper;
pub mod batch;

pub use registry::{Registry, SchemaKind, WrapperFactory};
pub use prim_wrapper::PrimWrapper;
pub use batch::{process, BatchReport};
