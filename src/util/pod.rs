//! Storage types - the fundamental element types of geometry data arrays.

use bytemuck::{Pod, Zeroable};
use half::f16;
use std::fmt;

/// Storage class of a geometry data array.
///
/// This is the element type as the geometry layer sees it. Booleans have no
/// storage of their own and travel as `Uint8`, which is why the router keeps
/// a separate list of boolean attribute names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Storage {
    /// Unsigned 8-bit integer
    Uint8 = 0,
    /// Signed 32-bit integer
    Int32 = 1,
    /// Signed 64-bit integer
    Int64 = 2,
    /// 16-bit floating point (IEEE 754 half precision)
    Real16 = 3,
    /// 32-bit floating point
    Real32 = 4,
    /// 64-bit floating point
    Real64 = 5,
    /// Interned string (index into a string table)
    String = 6,
}

impl Storage {
    /// Returns the name of this storage as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Real16 => "fpreal16",
            Self::Real32 => "fpreal32",
            Self::Real64 => "fpreal64",
            Self::String => "string",
        }
    }

    /// Returns true if this is an integer storage.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Uint8 | Self::Int32 | Self::Int64)
    }

    /// Returns true if this is a floating point storage.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Real16 | Self::Real32 | Self::Real64)
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for numeric component types a data array can hold directly.
pub trait GeoPod: Pod + Zeroable + Copy + Default + PartialEq + Send + Sync + 'static {
    /// Widen to f64 for cross-precision conversion.
    fn to_f64(self) -> f64;

    /// Widen to i64 without going through floating point.
    fn to_i64(self) -> i64;
}

impl GeoPod for u8 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl GeoPod for i32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl GeoPod for i64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self
    }
}

impl GeoPod for f16 {
    #[inline]
    fn to_f64(self) -> f64 {
        self.to_f64()
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self.to_f64() as i64
    }
}

impl GeoPod for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl GeoPod for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}
