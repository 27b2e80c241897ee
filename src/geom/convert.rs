//! Conversion between typed USD values and geometry data arrays.
//!
//! [`convert_value`] is the read direction (value -> array) and
//! [`array_to_value`] the write direction. Both are pure; failures come back
//! as [`Error`] values for the caller to log and skip.

use half::f16;

use super::{DataArray, TypeInfo};
use crate::core::{Value, ValueData};
use crate::util::{BaseType, Error, Result, Storage, TypeRole, ValueType};

/// Geometry type info implied by a USD value type.
pub fn type_info_for(ty: ValueType) -> TypeInfo {
    if ty.base.is_quaternion() {
        return TypeInfo::Quaternion;
    }
    match ty.base {
        BaseType::Matrix3d => TypeInfo::Matrix3,
        BaseType::Matrix4d => TypeInfo::Matrix4,
        _ => TypeInfo::from_role(ty.role),
    }
}

/// Convert a USD value into a tuple-structured data array.
///
/// `element_size` is the primvar element size (0 is treated as 1). Array
/// values must hold a whole number of elements; otherwise the conversion
/// fails and no data is produced. The resulting tuple size is the base
/// type's arity times the element size. String-like values become an
/// interned string array.
///
/// `path` is only used to label errors.
pub fn convert_value(value: &Value, element_size: usize, path: &str) -> Result<DataArray> {
    let (ty, data) = match value {
        Value::Typed { ty, data } => (*ty, data),
        Value::Opaque { type_name } => return Err(Error::unsupported(path, type_name.clone())),
    };

    let element_size = if ty.is_array { element_size.max(1) } else { 1 };
    let len = value.len();
    if len % element_size != 0 {
        return Err(Error::ElementSize {
            path: path.to_string(),
            len,
            element_size,
        });
    }

    let tuple_size = ty.tuple_size() * element_size;
    let array = match data {
        ValueData::Bool(v) => DataArray::from_vec(v.iter().map(|&b| b as u8).collect(), tuple_size),
        ValueData::Int(v) => DataArray::from_vec(v.clone(), tuple_size),
        ValueData::Int64(v) => DataArray::from_vec(v.clone(), tuple_size),
        ValueData::Half(v) => DataArray::from_vec(v.clone(), tuple_size),
        ValueData::Float(v) => DataArray::from_vec(v.clone(), tuple_size),
        ValueData::Double(v) => DataArray::from_vec(v.clone(), tuple_size),
        ValueData::String(v) => DataArray::from_strings(v.as_slice(), tuple_size),
    };

    // Roles describe single tuples; once elements are packed the role no
    // longer applies to the array as a whole.
    let type_info = if element_size == 1 { type_info_for(ty) } else { TypeInfo::None };
    Ok(array.with_type_info(type_info))
}

/// Build a USD value of type `ty` from a data array.
///
/// Scalar types take the first entry, array types take every entry. The
/// array's tuple size must be a multiple of the type's arity (the multiple
/// being the element size). Numeric storage is cast to the target
/// precision; boolean targets read non-zero as `true`.
pub fn array_to_value(array: &DataArray, ty: ValueType) -> Result<Value> {
    let arity = ty.tuple_size();
    if array.tuple_size() % arity != 0 {
        return Err(Error::TypeMismatch {
            expected: format!("{} (tuple multiple of {})", ty.name(), arity),
            actual: format!("tuple size {}", array.tuple_size()),
        });
    }

    let wants_string = ty.base.is_string_like();
    let has_string = array.storage() == Storage::String;
    if wants_string != has_string {
        return Err(Error::TypeMismatch {
            expected: ty.name(),
            actual: array.storage().name().to_string(),
        });
    }

    if !ty.is_array && array.is_empty() {
        return Err(Error::TypeMismatch {
            expected: ty.name(),
            actual: "empty array".to_string(),
        });
    }

    let take = if ty.is_array {
        array.entries() * array.tuple_size()
    } else {
        arity
    };

    let data = if wants_string {
        let mut s = array.to_strings();
        s.truncate(take);
        ValueData::String(s)
    } else if array.storage().is_integer() && !ty.storage().is_float() {
        let mut v = array.to_i64_vec();
        v.truncate(take);
        integer_data(ty, v)?
    } else {
        let mut v = array.to_f64_vec();
        v.truncate(take);
        float_data(ty.base, v)
    };

    Value::new(ty, data)
}

/// Integer components for `ty`. Values that do not fit a 32-bit target
/// fail the conversion instead of wrapping.
fn integer_data(ty: ValueType, v: Vec<i64>) -> Result<ValueData> {
    let data = match ty.base.storage() {
        Storage::Uint8 => ValueData::Bool(v.into_iter().map(|x| x != 0).collect()),
        Storage::Int64 => ValueData::Int64(v),
        _ => ValueData::Int(
            v.into_iter()
                .map(|x| {
                    i32::try_from(x).map_err(|_| Error::TypeMismatch {
                        expected: ty.name(),
                        actual: format!("out of range value {}", x),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(data)
}

fn float_data(base: BaseType, v: Vec<f64>) -> ValueData {
    match base.storage() {
        Storage::Uint8 => ValueData::Bool(v.into_iter().map(|x| x != 0.0).collect()),
        Storage::Int32 => ValueData::Int(v.into_iter().map(|x| x as i32).collect()),
        Storage::Int64 => ValueData::Int64(v.into_iter().map(|x| x as i64).collect()),
        Storage::Real16 => ValueData::Half(v.into_iter().map(f16::from_f64).collect()),
        Storage::Real32 => ValueData::Float(v.into_iter().map(|x| x as f32).collect()),
        _ => ValueData::Double(v),
    }
}

/// Choose the USD type to author for a data array.
///
/// `as_array` selects `T[]` over `T`; `as_bool` marks uint8 data that
/// carries booleans. Returns `None` when no supported type has the array's
/// shape.
pub fn value_type_for_array(array: &DataArray, as_array: bool, as_bool: bool) -> Option<ValueType> {
    let storage = array.storage();
    let tuple = array.tuple_size();
    let info = array.type_info();

    let base = match (info, storage, tuple) {
        (_, Storage::Uint8, 1) if as_bool => BaseType::Bool,
        // uint8 without the bool marker widens to int
        (_, Storage::Uint8, n) => BaseType::from_storage(Storage::Int32, n)?,
        (TypeInfo::Quaternion, Storage::Real16, 4) => BaseType::Quath,
        (TypeInfo::Quaternion, Storage::Real32, 4) => BaseType::Quatf,
        (TypeInfo::Quaternion, Storage::Real64, 4) => BaseType::Quatd,
        // USD matrices are double precision only
        (_, s, 16) if s.is_float() => BaseType::Matrix4d,
        (_, s, 9) if s.is_float() => BaseType::Matrix3d,
        (TypeInfo::Matrix3 | TypeInfo::Matrix4, s, 4) if s.is_float() => BaseType::Matrix2d,
        (_, s, n) => BaseType::from_storage(s, n)?,
    };

    let role = info.role();
    let role_fits = match (role, base.tuple_size(), base.storage()) {
        (TypeRole::None, _, _) => true,
        _ if base.is_quaternion() || base.is_matrix() => false,
        (TypeRole::Point | TypeRole::Normal | TypeRole::Vector, 3, s) => s.is_float(),
        (TypeRole::Color, 3 | 4, s) => s.is_float(),
        (TypeRole::TexCoord, 2 | 3, s) => s.is_float(),
        _ => false,
    };

    let mut ty = ValueType::scalar(base);
    if role_fits {
        ty = ty.with_role(role);
    }
    if as_array {
        ty = ty.as_array();
    }
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DMat4, DVec3, Quat, Vec3};

    #[test]
    fn test_convert_color_array() {
        let v = Value::vec3_array(&[Vec3::X, Vec3::Y], TypeRole::Color);
        let a = convert_value(&v, 1, "/m.primvars:displayColor").unwrap();
        assert_eq!(a.entries(), 2);
        assert_eq!(a.tuple_size(), 3);
        assert_eq!(a.storage(), Storage::Real32);
        assert_eq!(a.type_info(), TypeInfo::Color);
        assert_eq!(a.get_f64(1, 1), Some(1.0));
    }

    #[test]
    fn test_element_size_mismatch() {
        let v = Value::float_array(vec![0.0; 7]);
        let err = convert_value(&v, 3, "/m.primvars:w").unwrap_err();
        match err {
            Error::ElementSize { len, element_size, path } => {
                assert_eq!(len, 7);
                assert_eq!(element_size, 3);
                assert_eq!(path, "/m.primvars:w");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_element_size_packs_tuples() {
        let v = Value::float_array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let a = convert_value(&v, 3, "/m.primvars:w").unwrap();
        assert_eq!(a.entries(), 2);
        assert_eq!(a.tuple_size(), 3);
    }

    #[test]
    fn test_opaque_vs_empty() {
        let err = convert_value(&Value::opaque("dictionary"), 1, "/m.custom");
        assert!(matches!(err, Err(Error::UnsupportedType { .. })));

        let empty = convert_value(&Value::float_array(vec![]), 1, "/m.w").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_strings_interned() {
        let v = Value::token_array(vec!["a".into(), "b".into(), "a".into()]);
        let a = convert_value(&v, 1, "/m.name").unwrap();
        assert_eq!(a.storage(), Storage::String);
        assert_eq!(a.string_table().map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_scalar_types() {
        let a = convert_value(&Value::from(Quat::IDENTITY), 1, "/x.q").unwrap();
        assert_eq!(a.type_info(), TypeInfo::Quaternion);
        assert_eq!(a.get_f64(0, 3), Some(1.0));

        let m = DMat4::from_translation(DVec3::new(4.0, 5.0, 6.0));
        let a = convert_value(&Value::from(m), 1, "/x.m").unwrap();
        assert_eq!(a.tuple_size(), 16);
        assert_eq!(a.get_f64(0, 12), Some(4.0));

        let a = convert_value(&Value::bool(true), 1, "/x.b").unwrap();
        assert_eq!(a.storage(), Storage::Uint8);
        assert_eq!(a.get_i64(0, 0), Some(1));
    }

    #[test]
    fn test_array_to_value_casts() {
        let a = DataArray::from_vec(vec![1.5f64, 2.5, 3.5], 3);
        let v = array_to_value(&a, ValueType::array(BaseType::Float3)).unwrap();
        assert_eq!(v.as_f32_slice(), Some(&[1.5f32, 2.5, 3.5][..]));

        let b = DataArray::from_vec(vec![0u8, 2], 1);
        let v = array_to_value(&b, ValueType::array(BaseType::Bool)).unwrap();
        assert_eq!(v, Value::bool_array(vec![false, true]));
    }

    #[test]
    fn test_array_to_value_scalar_takes_first() {
        let a = DataArray::from_vec(vec![7i32, 8, 9], 1);
        let v = array_to_value(&a, ValueType::INT).unwrap();
        assert_eq!(v.as_i64(), Some(7));
        assert!(array_to_value(&DataArray::from_vec(Vec::<i32>::new(), 1), ValueType::INT).is_err());
    }

    #[test]
    fn test_array_to_value_rejects_shape() {
        let a = DataArray::from_vec(vec![1.0f32; 4], 2);
        assert!(array_to_value(&a, ValueType::array(BaseType::Float3)).is_err());
        let s = DataArray::from_strings(&["x"], 1);
        assert!(array_to_value(&s, ValueType::FLOAT).is_err());
    }

    #[test]
    fn test_array_to_value_no_int_wraparound() {
        let big = DataArray::from_vec(vec![5_000_000_000i64, 1], 1);
        let err = array_to_value(&big, ValueType::INT_ARRAY).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));

        let v = array_to_value(&big, ValueType::array(BaseType::Int64)).unwrap();
        assert_eq!(v.data(), Some(&ValueData::Int64(vec![5_000_000_000, 1])));
    }

    #[test]
    fn test_value_type_inference() {
        let cd = DataArray::from_vec(vec![0.0f32; 6], 3).with_type_info(TypeInfo::Color);
        assert_eq!(value_type_for_array(&cd, true, false), Some(ValueType::COLOR3F_ARRAY));

        let q = DataArray::from_vec(vec![0.0f32; 4], 4).with_type_info(TypeInfo::Quaternion);
        assert_eq!(
            value_type_for_array(&q, true, false),
            Some(ValueType::array(BaseType::Quatf))
        );

        let flag = DataArray::from_vec(vec![1u8], 1);
        assert_eq!(value_type_for_array(&flag, false, true), Some(ValueType::BOOL));
        assert_eq!(value_type_for_array(&flag, false, false), Some(ValueType::INT));

        let odd = DataArray::from_vec(vec![0.0f32; 5], 5);
        assert_eq!(value_type_for_array(&odd, true, false), None);
    }
}
