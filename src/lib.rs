//! # gusd
//!
//! Attribute and time-sample synchronization between a USD-like scene
//! description and a Houdini-like geometry attribute model.
//!
//! The engine converts typed USD values to tuple-structured geometry
//! buffers and back, routes primvars by interpolation, authors only the
//! time samples needed to reproduce a step function of values (with hold
//! samples before each change), tracks transforms the same way, and maps
//! geometry subset families to per-face attributes and face groups.
//!
//! ## Modules
//!
//! - [`util`] - Value types, storage classes, errors, math helpers
//! - [`core`] - Time codes, domains, values, metadata, diff caches
//! - [`geom`] - Data arrays, conversion, primvar routing, transforms, subsets
//! - [`stage`] - Traits the engine reads and authors through, plus an in-memory stage
//! - [`wrapper`] - Per-prim wrappers, the factory registry, batch processing
//! - [`config`] - Engine options
//! - [`logging`] - Subscriber setup for hosts
//!
//! ## Example
//!
//! ```ignore
//! use gusd::prelude::*;
//!
//! let registry = Registry::with_defaults();
//! let mut prim = MemPrim::new("/World/mesh", "Mesh");
//! let mut wrapper = registry.define_for_read(&prim)?;
//!
//! let cd = DataArray::from_vec(vec![1.0f32, 0.0, 0.0], 3).with_type_info(TypeInfo::Color);
//! for frame in 1..=24 {
//!     wrapper.update_primvar_from_geometry(&mut prim, Owner::Detail, "Cd", &cd, frame.into(), false)?;
//! }
//! ```

pub mod util;
pub mod core;
pub mod geom;
pub mod stage;
pub mod wrapper;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use util::{Error, Result};
pub use config::SyncOptions;
pub use geom::convert_value;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::SyncOptions;
    pub use crate::core::{AttributeKey, Interpolation, MetaData, Owner, TimeCode, Value};
    pub use crate::geom::{
        compute_subsets, convert_value, groups_from_partition, load_primvars, partition_to_subsets, AttributeList,
        DataArray, DomainCounts, LoadedAttributes, NamePattern, TypeInfo,
    };
    pub use crate::stage::*;
    pub use crate::util::{Error, Result, ValueType};
    pub use crate::wrapper::{PrimWrapper, Registry, SchemaKind};
}
