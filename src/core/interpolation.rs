//! Interpolation domains and attribute owners.
//!
//! USD primvars declare an [`Interpolation`]; geometry attributes live on an
//! [`Owner`]. The two vocabularies map onto each other almost one to one,
//! with USD's `varying` folding into point data.

use std::fmt;

/// Scope of primvar data on a USD prim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// One value for the entire prim.
    #[default]
    Constant,
    /// One value per face.
    Uniform,
    /// One value per point, linearly interpolated.
    Varying,
    /// One value per point, interpolated with the surface basis.
    Vertex,
    /// One value per face-vertex.
    FaceVarying,
}

impl Interpolation {
    /// Parse from the USD token. Unknown tokens fall back to constant, which
    /// is also USD's behavior for unauthored interpolation.
    pub fn parse(s: &str) -> Self {
        match s {
            "constant" => Self::Constant,
            "uniform" => Self::Uniform,
            "varying" => Self::Varying,
            "vertex" => Self::Vertex,
            "faceVarying" => Self::FaceVarying,
            _ => Self::Constant,
        }
    }

    /// USD token for this interpolation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Uniform => "uniform",
            Self::Varying => "varying",
            Self::Vertex => "vertex",
            Self::FaceVarying => "faceVarying",
        }
    }

    /// Geometry owner that receives data of this interpolation.
    pub fn owner(&self) -> Owner {
        match self {
            Self::Constant => Owner::Detail,
            Self::Uniform => Owner::Primitive,
            Self::Varying | Self::Vertex => Owner::Point,
            Self::FaceVarying => Owner::Vertex,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner domain of a geometry attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Owner {
    /// Per point.
    Point,
    /// Per face-vertex.
    Vertex,
    /// Per primitive (face).
    Primitive,
    /// Whole object.
    Detail,
}

impl Owner {
    pub const ALL: [Owner; 4] = [Self::Point, Self::Vertex, Self::Primitive, Self::Detail];

    /// Interpolation authored for attributes of this owner.
    pub fn interpolation(&self) -> Interpolation {
        match self {
            Self::Point => Interpolation::Vertex,
            Self::Vertex => Interpolation::FaceVarying,
            Self::Primitive => Interpolation::Uniform,
            Self::Detail => Interpolation::Constant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Vertex => "vertex",
            Self::Primitive => "primitive",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a tracked attribute on one wrapper: owner plus name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeKey {
    pub owner: Owner,
    pub name: String,
}

impl AttributeKey {
    pub fn new(owner: Owner, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.name)
    }
}
