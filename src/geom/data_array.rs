//! Geometry data arrays.
//!
//! A [`DataArray`] is the runtime geometry side of every conversion: a
//! sequence of fixed-size tuples over one [`Storage`] class. Arrays are
//! cheap to clone (the backing storage is shared) and come in three layouts:
//!
//! - dense: entry `i` lives at `i * tuple_size` in the backing storage,
//! - indirect: entry `i` reads backing entry `indices[i]`,
//! - constant: every entry reads the same backing entry (zero-stride broadcast).
//!
//! [`DataArray::harden`] produces a dense, independent copy. The diff cache
//! only ever retains hardened arrays, never views into caller geometry.

use std::collections::HashMap;
use std::sync::Arc;

use half::f16;

use crate::core::Snapshot;
use crate::util::{Error, GeoPod, Result, Storage, TypeRole};

/// Semantic interpretation of tuple data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeInfo {
    #[default]
    None,
    Point,
    Vector,
    Normal,
    Color,
    TexCoord,
    Quaternion,
    Matrix3,
    Matrix4,
}

impl TypeInfo {
    /// Geometry type info for a USD role.
    pub fn from_role(role: TypeRole) -> Self {
        match role {
            TypeRole::None => Self::None,
            TypeRole::Point => Self::Point,
            TypeRole::Vector => Self::Vector,
            TypeRole::Normal => Self::Normal,
            TypeRole::Color => Self::Color,
            TypeRole::TexCoord => Self::TexCoord,
            TypeRole::Frame => Self::Matrix4,
        }
    }

    /// USD role for this type info. Quaternions and matrices are base types
    /// in USD, not roles.
    pub fn role(self) -> TypeRole {
        match self {
            Self::Point => TypeRole::Point,
            Self::Vector => TypeRole::Vector,
            Self::Normal => TypeRole::Normal,
            Self::Color => TypeRole::Color,
            Self::TexCoord => TypeRole::TexCoord,
            Self::None | Self::Quaternion | Self::Matrix3 | Self::Matrix4 => TypeRole::None,
        }
    }
}

/// Backing storage of a data array.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayStorage {
    Uint8(Vec<u8>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Real16(Vec<f16>),
    Real32(Vec<f32>),
    Real64(Vec<f64>),
    /// Interned strings: each component is an index into `table`.
    String { table: Vec<String>, indices: Vec<i32> },
}

impl ArrayStorage {
    pub fn storage(&self) -> Storage {
        match self {
            Self::Uint8(_) => Storage::Uint8,
            Self::Int32(_) => Storage::Int32,
            Self::Int64(_) => Storage::Int64,
            Self::Real16(_) => Storage::Real16,
            Self::Real32(_) => Storage::Real32,
            Self::Real64(_) => Storage::Real64,
            Self::String { .. } => Storage::String,
        }
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        match self {
            Self::Uint8(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Real16(v) => v.len(),
            Self::Real32(v) => v.len(),
            Self::Real64(v) => v.len(),
            Self::String { indices, .. } => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Numeric component types with direct array storage.
pub trait ArrayElement: GeoPod {
    fn wrap(v: Vec<Self>) -> ArrayStorage;
    fn slice(s: &ArrayStorage) -> Option<&[Self]>;
}

macro_rules! impl_array_element {
    ($t:ty, $variant:ident) => {
        impl ArrayElement for $t {
            #[inline]
            fn wrap(v: Vec<Self>) -> ArrayStorage {
                ArrayStorage::$variant(v)
            }
            #[inline]
            fn slice(s: &ArrayStorage) -> Option<&[Self]> {
                match s {
                    ArrayStorage::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_array_element!(u8, Uint8);
impl_array_element!(i32, Int32);
impl_array_element!(i64, Int64);
impl_array_element!(f16, Real16);
impl_array_element!(f32, Real32);
impl_array_element!(f64, Real64);

#[derive(Clone, Debug)]
enum Layout {
    Dense,
    /// Every entry reads this backing entry.
    Constant(usize),
    Indirect(Arc<[usize]>),
}

/// Tuple-structured geometry attribute data.
#[derive(Clone, Debug)]
pub struct DataArray {
    storage: Arc<ArrayStorage>,
    tuple_size: usize,
    entries: usize,
    type_info: TypeInfo,
    layout: Layout,
}

impl DataArray {
    /// Dense array over the given components.
    ///
    /// Trailing components that do not fill a whole tuple are not addressable.
    pub fn new(storage: ArrayStorage, tuple_size: usize) -> Self {
        let tuple_size = tuple_size.max(1);
        let entries = storage.len() / tuple_size;
        Self {
            storage: Arc::new(storage),
            tuple_size,
            entries,
            type_info: TypeInfo::None,
            layout: Layout::Dense,
        }
    }

    /// Dense numeric array.
    pub fn from_vec<T: ArrayElement>(v: Vec<T>, tuple_size: usize) -> Self {
        Self::new(T::wrap(v), tuple_size)
    }

    /// Dense string array; repeated strings share one table slot.
    pub fn from_strings<S: AsRef<str>>(values: &[S], tuple_size: usize) -> Self {
        let mut table: Vec<String> = Vec::new();
        let mut lookup: HashMap<&str, i32> = HashMap::new();
        let mut indices = Vec::with_capacity(values.len());
        for s in values {
            let s = s.as_ref();
            let idx = *lookup.entry(s).or_insert_with(|| {
                table.push(s.to_string());
                (table.len() - 1) as i32
            });
            indices.push(idx);
        }
        Self::new(ArrayStorage::String { table, indices }, tuple_size)
    }

    /// Attach type info.
    pub fn with_type_info(mut self, type_info: TypeInfo) -> Self {
        self.type_info = type_info;
        self
    }

    /// View of `src` where entry `i` reads `src[indices[i]]`.
    ///
    /// Fails if any index is out of range. Nested views are collapsed so
    /// lookups stay one hop deep.
    pub fn indirect(src: &DataArray, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= src.entries) {
            return Err(Error::other(format!(
                "remap index {} out of range for {} entries",
                bad, src.entries
            )));
        }
        let layout = match &src.layout {
            Layout::Dense => Layout::Indirect(indices.into()),
            Layout::Constant(k) => Layout::Constant(*k),
            Layout::Indirect(map) => Layout::Indirect(indices.iter().map(|&i| map[i]).collect()),
        };
        Ok(Self {
            storage: Arc::clone(&src.storage),
            tuple_size: src.tuple_size,
            entries: indices.len(),
            type_info: src.type_info,
            layout,
        })
    }

    /// Zero-stride broadcast of entry 0 of `src` to `count` entries.
    ///
    /// Shares the backing storage; no data is duplicated. An empty source
    /// yields an empty array.
    pub fn broadcast(src: &DataArray, count: usize) -> Self {
        if src.entries == 0 {
            return Self {
                entries: 0,
                ..src.clone()
            };
        }
        Self {
            storage: Arc::clone(&src.storage),
            tuple_size: src.tuple_size,
            entries: count,
            type_info: src.type_info,
            layout: Layout::Constant(src.source_index(0)),
        }
    }

    /// Logical number of tuples.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    #[inline]
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    #[inline]
    pub fn storage(&self) -> Storage {
        self.storage.storage()
    }

    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Number of components physically held by the backing storage.
    pub fn backing_len(&self) -> usize {
        self.storage.len()
    }

    /// True if this array is a zero-stride broadcast.
    pub fn is_constant_view(&self) -> bool {
        matches!(self.layout, Layout::Constant(_))
    }

    /// True if both arrays share backing storage.
    pub fn shares_storage(&self, other: &DataArray) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Backing entry read by logical entry `i`.
    #[inline]
    fn source_index(&self, i: usize) -> usize {
        match &self.layout {
            Layout::Dense => i,
            Layout::Constant(k) => *k,
            Layout::Indirect(map) => map[i],
        }
    }

    /// Backing component offset of logical entry `i`.
    #[inline]
    fn offset(&self, i: usize) -> usize {
        self.source_index(i) * self.tuple_size
    }

    /// Direct access to dense numeric data.
    ///
    /// `None` for views and for a different element type; use
    /// [`DataArray::harden`] first to get a dense array.
    pub fn as_slice<T: ArrayElement>(&self) -> Option<&[T]> {
        match self.layout {
            Layout::Dense => T::slice(&self.storage),
            _ => None,
        }
    }

    /// Component `c` of entry `i`, widened to f64. `None` out of range or
    /// for string storage.
    pub fn get_f64(&self, i: usize, c: usize) -> Option<f64> {
        if i >= self.entries || c >= self.tuple_size {
            return None;
        }
        let k = self.offset(i) + c;
        Some(match &*self.storage {
            ArrayStorage::Uint8(v) => v[k].to_f64(),
            ArrayStorage::Int32(v) => v[k].to_f64(),
            ArrayStorage::Int64(v) => v[k].to_f64(),
            ArrayStorage::Real16(v) => v[k].to_f64(),
            ArrayStorage::Real32(v) => v[k].to_f64(),
            ArrayStorage::Real64(v) => v[k],
            ArrayStorage::String { .. } => return None,
        })
    }

    /// Component `c` of entry `i` as an integer. Floats truncate.
    pub fn get_i64(&self, i: usize, c: usize) -> Option<i64> {
        if i >= self.entries || c >= self.tuple_size {
            return None;
        }
        let k = self.offset(i) + c;
        Some(match &*self.storage {
            ArrayStorage::Uint8(v) => v[k].to_i64(),
            ArrayStorage::Int32(v) => v[k].to_i64(),
            ArrayStorage::Int64(v) => v[k],
            ArrayStorage::Real16(v) => GeoPod::to_i64(v[k]),
            ArrayStorage::Real32(v) => v[k].to_i64(),
            ArrayStorage::Real64(v) => v[k].to_i64(),
            ArrayStorage::String { .. } => return None,
        })
    }

    /// Component `c` of entry `i` for string arrays.
    pub fn get_str(&self, i: usize, c: usize) -> Option<&str> {
        if i >= self.entries || c >= self.tuple_size {
            return None;
        }
        match &*self.storage {
            ArrayStorage::String { table, indices } => {
                let idx = indices[self.offset(i) + c];
                usize::try_from(idx).ok().and_then(|t| table.get(t)).map(String::as_str)
            }
            _ => None,
        }
    }

    /// The string table of a string array.
    pub fn string_table(&self) -> Option<&[String]> {
        match &*self.storage {
            ArrayStorage::String { table, .. } => Some(table),
            _ => None,
        }
    }

    /// All logical components, widened to f64, in entry order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.entries * self.tuple_size);
        for i in 0..self.entries {
            for c in 0..self.tuple_size {
                out.push(self.get_f64(i, c).unwrap_or(0.0));
            }
        }
        out
    }

    /// All logical components as integers, in entry order.
    pub fn to_i64_vec(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.entries * self.tuple_size);
        for i in 0..self.entries {
            for c in 0..self.tuple_size {
                out.push(self.get_i64(i, c).unwrap_or(0));
            }
        }
        out
    }

    /// All logical string components, in entry order.
    pub fn to_strings(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.entries * self.tuple_size);
        for i in 0..self.entries {
            for c in 0..self.tuple_size {
                out.push(self.get_str(i, c).unwrap_or_default().to_string());
            }
        }
        out
    }

    /// Dense, independent deep copy.
    ///
    /// The result shares nothing with `self`; later edits to the source
    /// geometry can never reach it.
    pub fn harden(&self) -> DataArray {
        let t = self.tuple_size;
        let n = self.entries;

        fn gather<T: Copy>(v: &[T], a: &DataArray, t: usize, n: usize) -> Vec<T> {
            let mut out = Vec::with_capacity(n * t);
            for i in 0..n {
                let k = a.offset(i);
                out.extend_from_slice(&v[k..k + t]);
            }
            out
        }

        let storage = match &*self.storage {
            ArrayStorage::Uint8(v) => ArrayStorage::Uint8(gather(v, self, t, n)),
            ArrayStorage::Int32(v) => ArrayStorage::Int32(gather(v, self, t, n)),
            ArrayStorage::Int64(v) => ArrayStorage::Int64(gather(v, self, t, n)),
            ArrayStorage::Real16(v) => ArrayStorage::Real16(gather(v, self, t, n)),
            ArrayStorage::Real32(v) => ArrayStorage::Real32(gather(v, self, t, n)),
            ArrayStorage::Real64(v) => ArrayStorage::Real64(gather(v, self, t, n)),
            ArrayStorage::String { table, indices } => ArrayStorage::String {
                table: table.clone(),
                indices: gather(indices, self, t, n),
            },
        };
        Self {
            storage: Arc::new(storage),
            tuple_size: t,
            entries: n,
            type_info: self.type_info,
            layout: Layout::Dense,
        }
    }

    /// Exact value equality.
    ///
    /// Numeric data is compared byte for byte, so a NaN equals an identical
    /// NaN and `0.0` differs from `-0.0`. Strings compare by content, not by
    /// table index. Type info is not part of the value.
    pub fn bitwise_eq(&self, other: &DataArray) -> bool {
        if self.tuple_size != other.tuple_size
            || self.entries != other.entries
            || self.storage() != other.storage()
        {
            return false;
        }
        let t = self.tuple_size;

        fn cmp<T: bytemuck::Pod>(a: &[T], b: &[T], x: &DataArray, y: &DataArray, t: usize) -> bool {
            (0..x.entries).all(|i| {
                let (ka, kb) = (x.offset(i), y.offset(i));
                bytemuck::cast_slice::<T, u8>(&a[ka..ka + t])
                    == bytemuck::cast_slice::<T, u8>(&b[kb..kb + t])
            })
        }

        match (&*self.storage, &*other.storage) {
            (ArrayStorage::Uint8(a), ArrayStorage::Uint8(b)) => cmp(a, b, self, other, t),
            (ArrayStorage::Int32(a), ArrayStorage::Int32(b)) => cmp(a, b, self, other, t),
            (ArrayStorage::Int64(a), ArrayStorage::Int64(b)) => cmp(a, b, self, other, t),
            (ArrayStorage::Real16(a), ArrayStorage::Real16(b)) => cmp(a, b, self, other, t),
            (ArrayStorage::Real32(a), ArrayStorage::Real32(b)) => cmp(a, b, self, other, t),
            (ArrayStorage::Real64(a), ArrayStorage::Real64(b)) => cmp(a, b, self, other, t),
            (ArrayStorage::String { .. }, ArrayStorage::String { .. }) => (0..self.entries)
                .all(|i| (0..t).all(|c| self.get_str(i, c) == other.get_str(i, c))),
            _ => false,
        }
    }
}

impl Snapshot for DataArray {
    fn harden(&self) -> Self {
        DataArray::harden(self)
    }

    fn same_as(&self, other: &Self) -> bool {
        self.bitwise_eq(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_access() {
        let a = DataArray::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
        assert_eq!(a.entries(), 2);
        assert_eq!(a.get_f64(1, 2), Some(6.0));
        assert_eq!(a.get_f64(2, 0), None);
        assert_eq!(a.as_slice::<f32>().map(|s| s.len()), Some(6));
        assert!(a.as_slice::<f64>().is_none());
    }

    #[test]
    fn test_string_interning() {
        let a = DataArray::from_strings(&["a", "b", "a", "a"], 1);
        assert_eq!(a.entries(), 4);
        assert_eq!(a.string_table().map(|t| t.len()), Some(2));
        assert_eq!(a.get_str(2, 0), Some("a"));
        assert_eq!(a.to_strings(), vec!["a", "b", "a", "a"]);
    }

    #[test]
    fn test_broadcast_shares_storage() {
        let c = DataArray::from_vec(vec![0.5f32, 0.25, 1.0], 3);
        let b = DataArray::broadcast(&c, 1000);
        assert_eq!(b.entries(), 1000);
        assert_eq!(b.backing_len(), 3);
        assert!(b.shares_storage(&c));
        assert!(b.is_constant_view());
        assert_eq!(b.get_f64(999, 1), Some(0.25));
    }

    #[test]
    fn test_indirect_collapses() {
        let src = DataArray::from_vec(vec![10i32, 20, 30], 1);
        let a = DataArray::indirect(&src, &[2, 0]).unwrap();
        let b = DataArray::indirect(&a, &[1, 1, 0]).unwrap();
        assert_eq!(b.to_i64_vec(), vec![10, 10, 30]);
        assert!(DataArray::indirect(&src, &[3]).is_err());
    }

    #[test]
    fn test_broadcast_of_indirect() {
        let src = DataArray::from_vec(vec![10i32, 20, 30], 1);
        let one = DataArray::indirect(&src, &[2]).unwrap();
        let b = DataArray::broadcast(&one, 4);
        assert_eq!(b.to_i64_vec(), vec![30, 30, 30, 30]);
    }

    #[test]
    fn test_harden_is_independent() {
        let src = DataArray::from_vec(vec![1u8, 2, 3], 1);
        let view = DataArray::indirect(&src, &[2, 1]).unwrap();
        let hard = view.harden();
        assert!(!hard.shares_storage(&src));
        assert_eq!(hard.as_slice::<u8>(), Some(&[3u8, 2][..]));
    }

    #[test]
    fn test_bitwise_eq_nan() {
        let a = DataArray::from_vec(vec![1.0f32, f32::NAN], 1);
        let b = DataArray::from_vec(vec![1.0f32, f32::NAN], 1);
        assert!(a.bitwise_eq(&b));

        let c = DataArray::from_vec(vec![0.0f32], 1);
        let d = DataArray::from_vec(vec![-0.0f32], 1);
        assert!(!c.bitwise_eq(&d));
    }

    #[test]
    fn test_bitwise_eq_across_layouts() {
        let dense = DataArray::from_vec(vec![7i32, 7, 7], 1);
        let one = DataArray::from_vec(vec![7i32], 1);
        let wide = DataArray::broadcast(&one, 3);
        assert!(dense.bitwise_eq(&wide));
        assert!(!dense.bitwise_eq(&DataArray::broadcast(&one, 2)));
        assert!(!dense.bitwise_eq(&DataArray::from_vec(vec![7i64, 7, 7], 1)));
    }

    #[test]
    fn test_string_eq_ignores_table_order() {
        let a = DataArray::from_strings(&["x", "y"], 1);
        let b = DataArray::new(
            ArrayStorage::String {
                table: vec!["y".into(), "x".into()],
                indices: vec![1, 0],
            },
            1,
        );
        assert!(a.bitwise_eq(&b));
    }
}
