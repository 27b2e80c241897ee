//! Abstract traits for the scene-description side of the sync engine.
//!
//! The engine never talks to a concrete USD stage. Everything it reads or
//! authors goes through these traits, so a host can back them with a real
//! stage and tests can back them with [`super::MemPrim`].

use glam::DMat4;

use crate::core::{Interpolation, MetaData, TimeCode, Value};
use crate::util::{Result, ValueType};

/// Namespace prefix of primvar attributes.
pub const PRIMVARS_PREFIX: &str = "primvars:";

// ============================================================================
// Attribute Traits
// ============================================================================

/// Identity shared by attribute readers and writers.
pub trait Attribute: Send + Sync {
    /// Full attribute path, e.g. `/World/mesh.primvars:Cd`.
    fn path(&self) -> &str;

    /// Attribute name, e.g. `primvars:Cd`.
    fn name(&self) -> &str;
}

/// Reader interface for a single attribute.
pub trait AttributeSource: Attribute {
    /// Declared USD type name. May be outside the supported set.
    fn type_name(&self) -> &str;

    /// Value at `time`, or `None` if the attribute has no opinion.
    fn get(&self, time: TimeCode) -> Option<Value>;

    /// Attribute metadata.
    fn metadata(&self) -> &MetaData;
}

/// Writer interface for a single attribute.
pub trait AttributeSink: Attribute {
    /// Declared value type, or `None` for types outside the supported set.
    fn value_type(&self) -> Option<ValueType>;

    /// Author a time sample.
    fn set(&mut self, value: &Value, time: TimeCode) -> Result<()>;

    /// Author a metadata entry.
    fn set_metadata(&mut self, key: &str, value: Value) -> Result<()>;

    /// True if the metadata key has an authored value.
    fn has_metadata(&self, key: &str) -> bool;
}

/// Reader interface for a primvar.
///
/// Interpolation and element size default to what USD assumes when the
/// metadata is missing: constant and 1.
pub trait PrimvarSource: AttributeSource {
    /// Primvar name without the `primvars:` namespace.
    fn primvar_name(&self) -> &str {
        let name = self.name();
        name.strip_prefix(PRIMVARS_PREFIX).unwrap_or(name)
    }

    fn interpolation(&self) -> Interpolation {
        self.metadata()
            .get_str(MetaData::INTERPOLATION)
            .map(Interpolation::parse)
            .unwrap_or_default()
    }

    fn element_size(&self) -> usize {
        self.metadata()
            .get_i64(MetaData::ELEMENT_SIZE)
            .filter(|&n| n > 0)
            .map_or(1, |n| n as usize)
    }

    /// Index array of an indexed primvar at `time`.
    fn indices(&self, time: TimeCode) -> Option<Vec<i32>>;
}

// ============================================================================
// Prim Traits
// ============================================================================

/// Identity shared by every prim-level interface.
pub trait Prim: Send + Sync {
    /// Prim path.
    fn path(&self) -> &str;

    /// Schema type name, e.g. `Mesh`.
    fn type_name(&self) -> &str;
}

/// Reader interface for a prim's primvars.
pub trait PrimSource: Prim {
    /// All primvars authored on the prim, in a stable order.
    fn primvars(&self) -> Vec<&dyn PrimvarSource>;
}

/// Writer interface for creating attributes on a prim.
pub trait PrimSink: Prim {
    /// Get the attribute `name`, creating it with type `ty` if missing.
    ///
    /// Fails if the attribute exists with a different type.
    fn attribute_mut(&mut self, name: &str, ty: ValueType) -> Result<&mut dyn AttributeSink>;
}

// ============================================================================
// Subsets
// ============================================================================

/// Element type a subset restricts.
pub const FACE_ELEMENT: &str = "face";

/// How the subsets of one family relate to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FamilyType {
    /// Every face is in exactly one subset.
    Partition,
    /// Every face is in at most one subset.
    NonOverlapping,
    /// No constraint.
    #[default]
    Unrestricted,
}

impl FamilyType {
    /// Parse a family type token. Unknown tokens are unrestricted.
    pub fn parse(s: &str) -> Self {
        match s {
            "partition" => Self::Partition,
            "nonOverlapping" => Self::NonOverlapping,
            _ => Self::Unrestricted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partition => "partition",
            Self::NonOverlapping => "nonOverlapping",
            Self::Unrestricted => "unrestricted",
        }
    }

    /// True if faces map to at most one subset of the family.
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, Self::Unrestricted)
    }
}

/// A geometry subset as read from or written to the stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeomSubset {
    /// Subset prim name.
    pub name: String,
    /// Family the subset belongs to; empty for none.
    pub family: String,
    /// Element type, normally `face`.
    pub element_type: String,
    /// Element indices.
    pub indices: Vec<i32>,
    /// Custom data, e.g. the stored partition value.
    pub metadata: MetaData,
}

impl GeomSubset {
    /// Face subset with no family.
    pub fn faces(name: impl Into<String>, indices: Vec<i32>) -> Self {
        Self {
            name: name.into(),
            family: String::new(),
            element_type: FACE_ELEMENT.to_string(),
            indices,
            metadata: MetaData::new(),
        }
    }

    /// Set the family.
    pub fn in_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    /// Store a partition value.
    pub fn with_partition_value(mut self, value: impl Into<Value>) -> Self {
        self.metadata.set(MetaData::PARTITION_VALUE, value);
        self
    }
}

/// Reader interface for a prim's geometry subsets.
pub trait SubsetSource: Prim {
    /// All subsets at `time`.
    fn subsets(&self, time: TimeCode) -> Vec<GeomSubset>;

    /// Family type of `family`.
    fn family_type(&self, family: &str) -> FamilyType;
}

// ============================================================================
// Transforms
// ============================================================================

/// Transform authoring on a prim, including the layer queries needed to
/// decide whether stronger opinions must be cleared first.
pub trait XformTarget: Prim {
    /// True if the current edit target maps namespace identically.
    fn edit_target_is_identity(&self) -> bool;

    /// True if a layer stronger than the edit target has xform ops.
    fn has_stronger_xform_ops(&self) -> bool;

    /// Clear xform ops on layers stronger than the edit target.
    fn clear_stronger_xform_ops(&mut self) -> Result<()>;

    /// Author the local transform at `time`.
    fn set_transform(&mut self, matrix: &DMat4, time: TimeCode) -> Result<()>;
}
