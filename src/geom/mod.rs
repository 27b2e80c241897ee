//! Geometry side of the sync engine.
//!
//! This module provides:
//! - [`DataArray`] - Tuple-structured attribute buffers (dense, indirect, broadcast)
//! - [`AttributeList`] - Named attribute lists per owner
//! - [`convert_value`] / [`array_to_value`] - USD value <-> buffer conversion
//! - [`load_primvars`] / [`LoadedAttributes`] - Interpolation routing
//! - [`XformCache`] - Transform keyframe tracking
//! - [`compute_subsets`] / [`partition_to_subsets`] - Geometry subset partitioning

mod data_array;
mod attribute;
mod convert;
mod pattern;
mod primvar;
mod xform;
mod subset;

pub use data_array::{ArrayElement, ArrayStorage, DataArray, TypeInfo};
pub use attribute::AttributeList;
pub use convert::{array_to_value, convert_value, type_info_for, value_type_for_array};
pub use pattern::NamePattern;
pub use primvar::{
    houdini_name, load_primvars, usd_primvar_name, DomainCounts, LoadedAttributes, PrimvarDescriptor,
};
pub use xform::XformCache;
pub use subset::{
    compute_subsets, groups_from_partition, groups_to_subsets, partition_to_subsets, FaceGroup, SubsetResult,
    INT_SENTINEL, STRING_SENTINEL,
};
