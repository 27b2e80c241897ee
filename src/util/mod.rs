//! Utility types and functions for gusd.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Storage`] - Element storage classes of geometry arrays
//! - [`ValueType`] - USD value type names (base + role + array)
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod pod;
mod data_type;
mod error;
mod math;

pub use pod::*;
pub use data_type::*;
pub use error::*;
pub use math::*;
