//! Typed USD values.
//!
//! A [`Value`] is what a USD attribute holds at one time: a type name from
//! the supported set plus its components, flattened. Scalars are stored as a
//! one-element sequence so scalar and array values share every code path.

use glam::{DMat2, DMat3, DMat4, DQuat, DVec2, DVec3, DVec4, IVec2, IVec3, IVec4, Quat, Vec2, Vec3, Vec4};
use half::f16;

use crate::util::{matrix_from_flat, matrix_to_flat, BaseType, Error, Result, TypeRole, ValueType};

/// Flattened components of a value, by storage precision.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueData {
    Bool(Vec<bool>),
    Int(Vec<i32>),
    Int64(Vec<i64>),
    Half(Vec<f16>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    String(Vec<String>),
}

impl ValueData {
    /// Number of scalar components.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Half(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Int64(_) => "int64",
            Self::Half(_) => "half",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
        }
    }

    /// True if this component vector is the right precision for `base`.
    fn matches(&self, base: BaseType) -> bool {
        use BaseType::*;
        match self {
            Self::Bool(_) => base == Bool,
            Self::Int(_) => matches!(base, Int | Int2 | Int3 | Int4),
            Self::Int64(_) => base == Int64,
            Self::Half(_) => matches!(base, Half | Half2 | Half3 | Half4 | Quath),
            Self::Float(_) => matches!(base, Float | Float2 | Float3 | Float4 | Quatf),
            Self::Double(_) => matches!(
                base,
                Double | Double2 | Double3 | Double4 | Quatd | Matrix2d | Matrix3d | Matrix4d
            ),
            Self::String(_) => base.is_string_like(),
        }
    }
}

/// A value held by a USD attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A value of a supported type.
    Typed { ty: ValueType, data: ValueData },
    /// A value whose type is outside the supported set (dictionaries,
    /// relationships, custom types). Carried so it can be reported.
    Opaque { type_name: String },
}

impl Value {
    /// Create a typed value, checking that the components fit the type.
    pub fn new(ty: ValueType, data: ValueData) -> Result<Self> {
        if !data.matches(ty.base) {
            return Err(Error::TypeMismatch {
                expected: ty.name(),
                actual: data.kind().to_string(),
            });
        }
        let n = data.len();
        let tuple = ty.tuple_size();
        if n % tuple != 0 || (!ty.is_array && n != tuple) {
            return Err(Error::TypeMismatch {
                expected: format!("{} ({} components per element)", ty.name(), tuple),
                actual: format!("{} components", n),
            });
        }
        Ok(Self::Typed { ty, data })
    }

    /// Opaque value of an unsupported type.
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::Opaque {
            type_name: type_name.into(),
        }
    }

    /// The value type, `None` for opaque values.
    pub fn ty(&self) -> Option<ValueType> {
        match self {
            Self::Typed { ty, .. } => Some(*ty),
            Self::Opaque { .. } => None,
        }
    }

    /// USD spelling of the held type.
    pub fn type_name(&self) -> String {
        match self {
            Self::Typed { ty, .. } => ty.name(),
            Self::Opaque { type_name } => type_name.clone(),
        }
    }

    pub fn data(&self) -> Option<&ValueData> {
        match self {
            Self::Typed { data, .. } => Some(data),
            Self::Opaque { .. } => None,
        }
    }

    /// Number of elements (1 for scalars, array length for arrays).
    pub fn len(&self) -> usize {
        match self {
            Self::Typed { ty, data } => data.len() / ty.tuple_size(),
            Self::Opaque { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Constructors for common shapes ===

    pub fn bool(v: bool) -> Self {
        Self::Typed { ty: ValueType::BOOL, data: ValueData::Bool(vec![v]) }
    }

    pub fn int(v: i32) -> Self {
        Self::Typed { ty: ValueType::INT, data: ValueData::Int(vec![v]) }
    }

    pub fn int64(v: i64) -> Self {
        Self::Typed { ty: ValueType::scalar(BaseType::Int64), data: ValueData::Int64(vec![v]) }
    }

    pub fn half(v: f16) -> Self {
        Self::Typed { ty: ValueType::scalar(BaseType::Half), data: ValueData::Half(vec![v]) }
    }

    pub fn float(v: f32) -> Self {
        Self::Typed { ty: ValueType::FLOAT, data: ValueData::Float(vec![v]) }
    }

    pub fn double(v: f64) -> Self {
        Self::Typed { ty: ValueType::DOUBLE, data: ValueData::Double(vec![v]) }
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::Typed { ty: ValueType::STRING, data: ValueData::String(vec![v.into()]) }
    }

    pub fn token(v: impl Into<String>) -> Self {
        Self::Typed { ty: ValueType::TOKEN, data: ValueData::String(vec![v.into()]) }
    }

    pub fn asset(v: impl Into<String>) -> Self {
        Self::Typed {
            ty: ValueType::scalar(BaseType::Asset),
            data: ValueData::String(vec![v.into()]),
        }
    }

    pub fn bool_array(v: Vec<bool>) -> Self {
        Self::Typed { ty: ValueType::array(BaseType::Bool), data: ValueData::Bool(v) }
    }

    pub fn int_array(v: Vec<i32>) -> Self {
        Self::Typed { ty: ValueType::INT_ARRAY, data: ValueData::Int(v) }
    }

    pub fn int64_array(v: Vec<i64>) -> Self {
        Self::Typed { ty: ValueType::array(BaseType::Int64), data: ValueData::Int64(v) }
    }

    pub fn float_array(v: Vec<f32>) -> Self {
        Self::Typed { ty: ValueType::FLOAT_ARRAY, data: ValueData::Float(v) }
    }

    pub fn double_array(v: Vec<f64>) -> Self {
        Self::Typed { ty: ValueType::array(BaseType::Double), data: ValueData::Double(v) }
    }

    pub fn string_array(v: Vec<String>) -> Self {
        Self::Typed { ty: ValueType::array(BaseType::String), data: ValueData::String(v) }
    }

    pub fn token_array(v: Vec<String>) -> Self {
        Self::Typed { ty: ValueType::array(BaseType::Token), data: ValueData::String(v) }
    }

    /// `float2[]` with an optional role (texCoord2f[] for UVs).
    pub fn vec2_array(v: &[Vec2], role: TypeRole) -> Self {
        Self::Typed {
            ty: ValueType::array(BaseType::Float2).with_role(role),
            data: ValueData::Float(v.iter().flat_map(|p| p.to_array()).collect()),
        }
    }

    /// `float3[]` with an optional role (point3f[], color3f[], ...).
    pub fn vec3_array(v: &[Vec3], role: TypeRole) -> Self {
        Self::Typed {
            ty: ValueType::array(BaseType::Float3).with_role(role),
            data: ValueData::Float(v.iter().flat_map(|p| p.to_array()).collect()),
        }
    }

    pub fn vec4_array(v: &[Vec4], role: TypeRole) -> Self {
        Self::Typed {
            ty: ValueType::array(BaseType::Float4).with_role(role),
            data: ValueData::Float(v.iter().flat_map(|p| p.to_array()).collect()),
        }
    }

    /// `quatf[]`; components in (i, j, k, real) order.
    pub fn quatf_array(v: &[Quat]) -> Self {
        Self::Typed {
            ty: ValueType::array(BaseType::Quatf),
            data: ValueData::Float(v.iter().flat_map(|q| q.to_array()).collect()),
        }
    }

    pub fn matrix4d_array(v: &[DMat4]) -> Self {
        Self::Typed {
            ty: ValueType::array(BaseType::Matrix4d),
            data: ValueData::Double(v.iter().flat_map(matrix_to_flat).collect()),
        }
    }

    // === Typed accessors ===

    pub fn as_bool(&self) -> Option<bool> {
        match self.data()? {
            ValueData::Bool(v) if !self.is_array() => v.first().copied(),
            _ => None,
        }
    }

    /// Integer scalar of either width.
    pub fn as_i64(&self) -> Option<i64> {
        if self.is_array() || self.tuple_size() != 1 {
            return None;
        }
        match self.data()? {
            ValueData::Int(v) => v.first().map(|&i| i as i64),
            ValueData::Int64(v) => v.first().copied(),
            _ => None,
        }
    }

    /// String-like scalar (string, token or asset).
    pub fn as_str(&self) -> Option<&str> {
        match self.data()? {
            ValueData::String(v) if !self.is_array() => v.first().map(String::as_str),
            _ => None,
        }
    }

    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        match self.data()? {
            ValueData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32_slice(&self) -> Option<&[i32]> {
        match self.data()? {
            ValueData::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self.data()? {
            ValueData::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_matrix4d(&self) -> Option<DMat4> {
        match (self.ty()?, self.data()?) {
            (ty, ValueData::Double(v)) if ty.base == BaseType::Matrix4d && !ty.is_array => {
                let arr: [f64; 16] = v.as_slice().try_into().ok()?;
                Some(matrix_from_flat(&arr))
            }
            _ => None,
        }
    }

    fn is_array(&self) -> bool {
        self.ty().is_some_and(|t| t.is_array)
    }

    fn tuple_size(&self) -> usize {
        self.ty().map_or(0, |t| t.tuple_size())
    }
}

// === Scalar conversions from glam ===

macro_rules! impl_from_glam {
    ($glam:ty, $base:ident, $variant:ident, $to:ident) => {
        impl From<$glam> for Value {
            fn from(v: $glam) -> Self {
                Self::Typed {
                    ty: ValueType::scalar(BaseType::$base),
                    data: ValueData::$variant(v.$to().to_vec()),
                }
            }
        }
    };
}

impl_from_glam!(Vec2, Float2, Float, to_array);
impl_from_glam!(Vec3, Float3, Float, to_array);
impl_from_glam!(Vec4, Float4, Float, to_array);
impl_from_glam!(DVec2, Double2, Double, to_array);
impl_from_glam!(DVec3, Double3, Double, to_array);
impl_from_glam!(DVec4, Double4, Double, to_array);
impl_from_glam!(IVec2, Int2, Int, to_array);
impl_from_glam!(IVec3, Int3, Int, to_array);
impl_from_glam!(IVec4, Int4, Int, to_array);
impl_from_glam!(Quat, Quatf, Float, to_array);
impl_from_glam!(DQuat, Quatd, Double, to_array);
impl_from_glam!(DMat2, Matrix2d, Double, to_cols_array);
impl_from_glam!(DMat3, Matrix3d, Double, to_cols_array);
impl_from_glam!(DMat4, Matrix4d, Double, to_cols_array);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::double(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::string(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_precision() {
        let ok = Value::new(ValueType::FLOAT_ARRAY, ValueData::Float(vec![1.0, 2.0]));
        assert!(ok.is_ok());
        let bad = Value::new(ValueType::FLOAT_ARRAY, ValueData::Double(vec![1.0]));
        assert!(matches!(bad, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_new_validates_tuple() {
        let bad = Value::new(ValueType::POINT3F_ARRAY, ValueData::Float(vec![0.0; 7]));
        assert!(bad.is_err());
        let scalar = Value::new(ValueType::scalar(BaseType::Float3), ValueData::Float(vec![0.0; 6]));
        assert!(scalar.is_err());
    }

    #[test]
    fn test_len_and_type_name() {
        let v = Value::vec3_array(&[Vec3::ZERO, Vec3::ONE], TypeRole::Color);
        assert_eq!(v.len(), 2);
        assert_eq!(v.type_name(), "color3f[]");

        let o = Value::opaque("dictionary");
        assert_eq!(o.ty(), None);
        assert_eq!(o.type_name(), "dictionary");
        assert!(o.is_empty());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::int(4).as_i64(), Some(4));
        assert_eq!(Value::int64(-2).as_i64(), Some(-2));
        assert_eq!(Value::token("a").as_str(), Some("a"));
        assert_eq!(Value::int_array(vec![1]).as_i64(), None);

        let m = DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(Value::from(m).as_matrix4d(), Some(m));
    }
}
