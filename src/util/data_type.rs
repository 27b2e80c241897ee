//! ValueType - the closed set of USD value type names the engine understands.

use super::Storage;
use std::fmt;

/// Base (non-array, role-less) USD value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    Int,
    Int64,
    Half,
    Float,
    Double,
    Int2,
    Int3,
    Int4,
    Half2,
    Half3,
    Half4,
    Float2,
    Float3,
    Float4,
    Double2,
    Double3,
    Double4,
    Quath,
    Quatf,
    Quatd,
    Matrix2d,
    Matrix3d,
    Matrix4d,
    String,
    Token,
    Asset,
}

impl BaseType {
    /// Every supported base type, for name lookup.
    pub const ALL: [BaseType; 27] = [
        Self::Bool,
        Self::Int,
        Self::Int64,
        Self::Half,
        Self::Float,
        Self::Double,
        Self::Int2,
        Self::Int3,
        Self::Int4,
        Self::Half2,
        Self::Half3,
        Self::Half4,
        Self::Float2,
        Self::Float3,
        Self::Float4,
        Self::Double2,
        Self::Double3,
        Self::Double4,
        Self::Quath,
        Self::Quatf,
        Self::Quatd,
        Self::Matrix2d,
        Self::Matrix3d,
        Self::Matrix4d,
        Self::String,
        Self::Token,
        Self::Asset,
    ];

    /// Number of scalar components in one value of this type.
    #[inline]
    pub const fn tuple_size(self) -> usize {
        match self {
            Self::Bool | Self::Int | Self::Int64 | Self::Half | Self::Float | Self::Double => 1,
            Self::String | Self::Token | Self::Asset => 1,
            Self::Int2 | Self::Half2 | Self::Float2 | Self::Double2 => 2,
            Self::Int3 | Self::Half3 | Self::Float3 | Self::Double3 => 3,
            Self::Int4 | Self::Half4 | Self::Float4 | Self::Double4 => 4,
            Self::Quath | Self::Quatf | Self::Quatd => 4,
            Self::Matrix2d => 4,
            Self::Matrix3d => 9,
            Self::Matrix4d => 16,
        }
    }

    /// Storage class the geometry layer uses for this type.
    #[inline]
    pub const fn storage(self) -> Storage {
        match self {
            Self::Bool => Storage::Uint8,
            Self::Int | Self::Int2 | Self::Int3 | Self::Int4 => Storage::Int32,
            Self::Int64 => Storage::Int64,
            Self::Half | Self::Half2 | Self::Half3 | Self::Half4 | Self::Quath => Storage::Real16,
            Self::Float | Self::Float2 | Self::Float3 | Self::Float4 | Self::Quatf => {
                Storage::Real32
            }
            Self::Double
            | Self::Double2
            | Self::Double3
            | Self::Double4
            | Self::Quatd
            | Self::Matrix2d
            | Self::Matrix3d
            | Self::Matrix4d => Storage::Real64,
            Self::String | Self::Token | Self::Asset => Storage::String,
        }
    }

    /// USD type name (without role or array suffix).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Half => "half",
            Self::Float => "float",
            Self::Double => "double",
            Self::Int2 => "int2",
            Self::Int3 => "int3",
            Self::Int4 => "int4",
            Self::Half2 => "half2",
            Self::Half3 => "half3",
            Self::Half4 => "half4",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Double2 => "double2",
            Self::Double3 => "double3",
            Self::Double4 => "double4",
            Self::Quath => "quath",
            Self::Quatf => "quatf",
            Self::Quatd => "quatd",
            Self::Matrix2d => "matrix2d",
            Self::Matrix3d => "matrix3d",
            Self::Matrix4d => "matrix4d",
            Self::String => "string",
            Self::Token => "token",
            Self::Asset => "asset",
        }
    }

    /// Look up a base type by its USD name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Find the base type with the given storage and tuple size.
    ///
    /// Tuple size 4 resolves to the plain vector type; callers that want a
    /// quaternion or a 2x2 matrix pick it through the role.
    pub fn from_storage(storage: Storage, tuple_size: usize) -> Option<Self> {
        let t = match (storage, tuple_size) {
            (Storage::Uint8, 1) => Self::Bool,
            (Storage::Int32, 1) => Self::Int,
            (Storage::Int32, 2) => Self::Int2,
            (Storage::Int32, 3) => Self::Int3,
            (Storage::Int32, 4) => Self::Int4,
            (Storage::Int64, 1) => Self::Int64,
            (Storage::Real16, 1) => Self::Half,
            (Storage::Real16, 2) => Self::Half2,
            (Storage::Real16, 3) => Self::Half3,
            (Storage::Real16, 4) => Self::Half4,
            (Storage::Real32, 1) => Self::Float,
            (Storage::Real32, 2) => Self::Float2,
            (Storage::Real32, 3) => Self::Float3,
            (Storage::Real32, 4) => Self::Float4,
            (Storage::Real64, 1) => Self::Double,
            (Storage::Real64, 2) => Self::Double2,
            (Storage::Real64, 3) => Self::Double3,
            (Storage::Real64, 4) => Self::Double4,
            (Storage::Real64, 9) => Self::Matrix3d,
            (Storage::Real64, 16) => Self::Matrix4d,
            (Storage::String, 1) => Self::String,
            _ => return None,
        };
        Some(t)
    }

    #[inline]
    pub const fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::Token | Self::Asset)
    }

    #[inline]
    pub const fn is_quaternion(self) -> bool {
        matches!(self, Self::Quath | Self::Quatf | Self::Quatd)
    }

    #[inline]
    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::Matrix2d | Self::Matrix3d | Self::Matrix4d)
    }
}

/// Semantic role attached to a value type (`color3f` is `float3` with the
/// Color role).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeRole {
    #[default]
    None,
    Point,
    Vector,
    Normal,
    Color,
    TexCoord,
    Frame,
}

impl TypeRole {
    /// Prefix used in USD role type names (`point3f`, `texCoord2f`).
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Point => "point",
            Self::Vector => "vector",
            Self::Normal => "normal",
            Self::Color => "color",
            Self::TexCoord => "texCoord",
            Self::Frame => "frame",
        }
    }
}

/// A full USD value type: base type, role and array-ness.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    /// The base value type
    pub base: BaseType,
    /// Semantic role
    pub role: TypeRole,
    /// `true` for `T[]` types
    pub is_array: bool,
}

impl ValueType {
    /// Scalar (non-array) type without role.
    #[inline]
    pub const fn scalar(base: BaseType) -> Self {
        Self {
            base,
            role: TypeRole::None,
            is_array: false,
        }
    }

    /// Array type without role.
    #[inline]
    pub const fn array(base: BaseType) -> Self {
        Self {
            base,
            role: TypeRole::None,
            is_array: true,
        }
    }

    /// Same type with a role.
    #[inline]
    pub const fn with_role(mut self, role: TypeRole) -> Self {
        self.role = role;
        self
    }

    /// Scalar counterpart of an array type.
    #[inline]
    pub const fn element(mut self) -> Self {
        self.is_array = false;
        self
    }

    /// Array counterpart of a scalar type.
    #[inline]
    pub const fn as_array(mut self) -> Self {
        self.is_array = true;
        self
    }

    #[inline]
    pub const fn tuple_size(&self) -> usize {
        self.base.tuple_size()
    }

    #[inline]
    pub const fn storage(&self) -> Storage {
        self.base.storage()
    }

    // === Common predefined types ===

    pub const BOOL: Self = Self::scalar(BaseType::Bool);
    pub const INT: Self = Self::scalar(BaseType::Int);
    pub const FLOAT: Self = Self::scalar(BaseType::Float);
    pub const DOUBLE: Self = Self::scalar(BaseType::Double);
    pub const STRING: Self = Self::scalar(BaseType::String);
    pub const TOKEN: Self = Self::scalar(BaseType::Token);
    pub const MATRIX4D: Self = Self::scalar(BaseType::Matrix4d);
    pub const INT_ARRAY: Self = Self::array(BaseType::Int);
    pub const FLOAT_ARRAY: Self = Self::array(BaseType::Float);
    pub const POINT3F_ARRAY: Self = Self::array(BaseType::Float3).with_role(TypeRole::Point);
    pub const NORMAL3F_ARRAY: Self = Self::array(BaseType::Float3).with_role(TypeRole::Normal);
    pub const COLOR3F_ARRAY: Self = Self::array(BaseType::Float3).with_role(TypeRole::Color);
    pub const TEXCOORD2F_ARRAY: Self = Self::array(BaseType::Float2).with_role(TypeRole::TexCoord);

    /// Parse a USD type name such as `color3f[]`, `token` or `matrix4d`.
    ///
    /// Returns `None` for names outside the supported set.
    pub fn parse(name: &str) -> Option<Self> {
        let (stem, is_array) = match name.strip_suffix("[]") {
            Some(stem) => (stem, true),
            None => (name, false),
        };
        if let Some(base) = BaseType::from_name(stem) {
            return Some(Self { base, role: TypeRole::None, is_array });
        }
        if stem == "frame4d" {
            return Some(Self { base: BaseType::Matrix4d, role: TypeRole::Frame, is_array });
        }
        // Role types are spelled <role><N><h|f|d>
        for role in [
            TypeRole::Point,
            TypeRole::Vector,
            TypeRole::Normal,
            TypeRole::Color,
            TypeRole::TexCoord,
        ] {
            let Some(rest) = stem.strip_prefix(role.prefix()) else {
                continue;
            };
            let base = match rest {
                "2h" => BaseType::Half2,
                "3h" => BaseType::Half3,
                "4h" => BaseType::Half4,
                "2f" => BaseType::Float2,
                "3f" => BaseType::Float3,
                "4f" => BaseType::Float4,
                "2d" => BaseType::Double2,
                "3d" => BaseType::Double3,
                "4d" => BaseType::Double4,
                _ => return None,
            };
            return Some(Self { base, role, is_array });
        }
        None
    }

    /// The USD spelling of this type.
    pub fn name(&self) -> String {
        let mut s = match self.role {
            TypeRole::None => self.base.name().to_string(),
            TypeRole::Frame => "frame4d".to_string(),
            role => {
                let suffix = match self.base.storage() {
                    Storage::Real16 => 'h',
                    Storage::Real64 => 'd',
                    _ => 'f',
                };
                format!("{}{}{}", role.prefix(), self.base.tuple_size(), suffix)
            }
        };
        if self.is_array {
            s.push_str("[]");
        }
        s
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let t = ValueType::parse("float3[]").unwrap();
        assert_eq!(t.base, BaseType::Float3);
        assert!(t.is_array);
        assert_eq!(t.tuple_size(), 3);
        assert_eq!(ValueType::parse("matrix4d").unwrap(), ValueType::MATRIX4D);
        assert!(ValueType::parse("dictionary").is_none());
    }

    #[test]
    fn test_parse_roles() {
        let t = ValueType::parse("color3f[]").unwrap();
        assert_eq!(t, ValueType::COLOR3F_ARRAY);
        assert_eq!(t.name(), "color3f[]");

        let t = ValueType::parse("texCoord2h").unwrap();
        assert_eq!(t.base, BaseType::Half2);
        assert_eq!(t.role, TypeRole::TexCoord);
        assert_eq!(t.name(), "texCoord2h");

        let t = ValueType::parse("normal3d[]").unwrap();
        assert_eq!(t.storage(), Storage::Real64);
        assert!(ValueType::parse("point7f").is_none());
    }

    #[test]
    fn test_storage_mapping() {
        assert_eq!(BaseType::Bool.storage(), Storage::Uint8);
        assert_eq!(BaseType::Quath.storage(), Storage::Real16);
        assert_eq!(BaseType::Token.storage(), Storage::String);
        assert_eq!(BaseType::Matrix3d.tuple_size(), 9);
        assert_eq!(BaseType::from_storage(Storage::Real32, 3), Some(BaseType::Float3));
        assert_eq!(BaseType::from_storage(Storage::Real32, 5), None);
    }

    #[test]
    fn test_name_roundtrip() {
        for base in BaseType::ALL {
            let t = ValueType::array(base);
            assert_eq!(ValueType::parse(&t.name()), Some(t));
        }
    }
}
