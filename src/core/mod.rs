//! Core layer - fundamental types shared by every component.
//!
//! This module provides:
//! - [`TimeCode`] - Sample times, including the default (unsampled) slot
//! - [`Interpolation`] / [`Owner`] / [`AttributeKey`] - Domains on both sides
//! - [`Value`] / [`ValueData`] - Typed USD-side values
//! - [`MetaData`] - Key-value metadata storage
//! - [`AttributeHistory`] / [`TrackedSample`] - Diff caches for sample authoring

mod time_code;
mod interpolation;
mod value;
mod metadata;
mod history;

pub use time_code::TimeCode;
pub use interpolation::{AttributeKey, Interpolation, Owner};
pub use value::{Value, ValueData};
pub use metadata::MetaData;
pub use history::{AttributeHistory, SampleKind, Snapshot, TrackedSample};
