//! Geometry subset partitioning.
//!
//! USD groups faces with `GeomSubset` prims organised in families. On the
//! geometry side the same information is either a face group (for subsets
//! with no family or an unrestricted family) or one per-face classification
//! attribute per exclusive family (`partition` / `nonOverlapping`).
//!
//! Classification values come from the subset's stored `partitionValue`
//! (int or string) when present, else from the subset name with a redundant
//! `<family>_` prefix removed. Faces no subset covers keep the sentinel:
//! `-1` for integer families, `""` for string families.

use std::collections::HashMap;

use tracing::warn;

use super::{AttributeList, DataArray};
use crate::config::SyncOptions;
use crate::core::{MetaData, TimeCode, Value};
use crate::stage::{FamilyType, GeomSubset, SubsetSource, FACE_ELEMENT};
use crate::util::{Error, Result, Storage};

/// Sentinel for faces outside every subset of an integer family.
pub const INT_SENTINEL: i32 = -1;

/// Sentinel for faces outside every subset of a string family.
pub const STRING_SENTINEL: &str = "";

/// Named list of face indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceGroup {
    pub name: String,
    pub faces: Vec<usize>,
}

impl FaceGroup {
    pub fn new(name: impl Into<String>, faces: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            faces,
        }
    }
}

/// Result of [`compute_subsets`].
#[derive(Debug, Default)]
pub struct SubsetResult {
    /// Face groups from family-less and unrestricted subsets.
    pub groups: Vec<FaceGroup>,
    /// One per-face attribute per exclusive family, named after the family.
    pub partitions: AttributeList,
    /// Skipped subsets and ignored indices.
    pub warnings: Vec<Error>,
}

impl SubsetResult {
    fn warn(&mut self, err: Error) {
        warn!("{}", err);
        self.warnings.push(err);
    }
}

/// Per-face value of one subset.
#[derive(Clone, Debug, PartialEq)]
enum PartitionValue {
    Int(i32),
    Str(String),
}

// ============================================================================
// Read path
// ============================================================================

/// Read the subsets of a prim with `face_count` faces.
pub fn compute_subsets(
    source: &dyn SubsetSource,
    time: TimeCode,
    face_count: usize,
    options: &SyncOptions,
) -> SubsetResult {
    let mut out = SubsetResult::default();
    let mut families: Vec<(String, Vec<GeomSubset>)> = Vec::new();

    for subset in source.subsets(time) {
        let path = format!("{}/{}", source.path(), subset.name);
        if subset.element_type != FACE_ELEMENT {
            out.warn(Error::SubsetElementType {
                path,
                element_type: subset.element_type.clone(),
            });
            continue;
        }

        let exclusive = !subset.family.is_empty() && source.family_type(&subset.family).is_exclusive();
        if !exclusive {
            let faces = valid_faces(&mut out, &path, &subset.indices, face_count);
            out.groups.push(FaceGroup::new(subset.name, faces));
            continue;
        }

        match families.iter_mut().find(|(f, _)| *f == subset.family) {
            Some((_, members)) => members.push(subset),
            None => families.push((subset.family.clone(), vec![subset])),
        }
    }

    for (family, members) in families {
        let array = classify_family(&mut out, source.path(), &family, &members, face_count, options);
        out.partitions.insert(family, array);
    }
    out
}

/// Build the per-face attribute of one exclusive family.
fn classify_family(
    out: &mut SubsetResult,
    prim_path: &str,
    family: &str,
    members: &[GeomSubset],
    face_count: usize,
    options: &SyncOptions,
) -> DataArray {
    // The first well-typed stored value decides the attribute type; without
    // any the family is classified by subset name.
    let is_int = members
        .iter()
        .filter_map(|s| s.metadata.get(MetaData::PARTITION_VALUE))
        .find_map(|v| match (v.as_i64(), v.as_str()) {
            (Some(_), _) => Some(true),
            (None, Some(_)) => Some(false),
            _ => None,
        })
        .unwrap_or(false);

    let mut ints = vec![INT_SENTINEL; if is_int { face_count } else { 0 }];
    let mut strs = vec![String::new(); if is_int { 0 } else { face_count }];

    for subset in members {
        let path = format!("{}/{}", prim_path, subset.name);
        let value = match partition_value(subset, family, is_int, options) {
            Ok(v) => v,
            Err(actual) => {
                out.warn(Error::SubsetMetadata {
                    path,
                    family: family.to_string(),
                    actual,
                });
                continue;
            }
        };
        for face in valid_faces(out, &path, &subset.indices, face_count) {
            match &value {
                PartitionValue::Int(v) => ints[face] = *v,
                PartitionValue::Str(s) => strs[face].clone_from(s),
            }
        }
    }

    if is_int {
        DataArray::from_vec(ints, 1)
    } else {
        DataArray::from_strings(strs.as_slice(), 1)
    }
}

/// Value a subset assigns to its faces, or the offending type name.
fn partition_value(
    subset: &GeomSubset,
    family: &str,
    is_int: bool,
    options: &SyncOptions,
) -> std::result::Result<PartitionValue, String> {
    match subset.metadata.get(MetaData::PARTITION_VALUE) {
        Some(v) => match (is_int, v.as_i64(), v.as_str()) {
            (true, Some(i), _) => i32::try_from(i).map(PartitionValue::Int).map_err(|_| v.type_name()),
            (false, _, Some(s)) => Ok(PartitionValue::Str(s.to_string())),
            _ => Err(v.type_name()),
        },
        None => {
            let name = subset_label(&subset.name, family, options.strip_partition_prefix);
            if is_int {
                name.parse().map(PartitionValue::Int).map_err(|_| "name".to_string())
            } else {
                Ok(PartitionValue::Str(name.to_string()))
            }
        }
    }
}

/// Subset name with a redundant `<family>_` prefix removed.
fn subset_label<'a>(name: &'a str, family: &str, strip: bool) -> &'a str {
    if !strip {
        return name;
    }
    name.strip_prefix(family)
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(name)
}

/// In-range face indices; others are reported and dropped.
fn valid_faces(out: &mut SubsetResult, path: &str, indices: &[i32], face_count: usize) -> Vec<usize> {
    let mut faces = Vec::with_capacity(indices.len());
    for &i in indices {
        match usize::try_from(i) {
            Ok(f) if f < face_count => faces.push(f),
            _ => out.warn(Error::other(format!(
                "{}: face index {} out of range for {} faces",
                path, i, face_count
            ))),
        }
    }
    faces
}

// ============================================================================
// Write path
// ============================================================================

/// Per-value face lists of a classification attribute.
///
/// Groups are in first-appearance order; sentinel faces are left out.
/// Integer values are named by their decimal form.
pub fn groups_from_partition(attribute: &DataArray) -> Result<Vec<FaceGroup>> {
    let labels = partition_labels(attribute)?;
    let mut groups: Vec<FaceGroup> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();
    for (face, label) in labels.into_iter().enumerate() {
        let Some(label) = label else { continue };
        let idx = *lookup.entry(label.clone()).or_insert_with(|| {
            groups.push(FaceGroup::new(label, Vec::new()));
            groups.len() - 1
        });
        groups[idx].faces.push(face);
    }
    Ok(groups)
}

/// Subsets of one family from a classification attribute.
///
/// Each distinct value becomes a subset named `<family>_<value>` with the
/// value stored as `partitionValue`. The family type is `partition` when
/// every face is classified, `nonOverlapping` otherwise.
pub fn partition_to_subsets(family: &str, attribute: &DataArray) -> Result<(FamilyType, Vec<GeomSubset>)> {
    let is_int = attribute.storage() != Storage::String;
    let groups = groups_from_partition(attribute)?;
    let covered: usize = groups.iter().map(|g| g.faces.len()).sum();

    let mut subsets = Vec::with_capacity(groups.len());
    for g in groups {
        let value = if is_int {
            let v: i32 = g.name.parse().map_err(|_| Error::other(format!("bad partition value {}", g.name)))?;
            Value::int(v)
        } else {
            Value::string(g.name.clone())
        };
        let name = format!("{}_{}", family, sanitize_name(&g.name));
        subsets.push(
            GeomSubset::faces(name, g.faces.iter().map(|&f| f as i32).collect())
                .in_family(family)
                .with_partition_value(value),
        );
    }

    let family_type = if covered == attribute.entries() {
        FamilyType::Partition
    } else {
        FamilyType::NonOverlapping
    };
    Ok((family_type, subsets))
}

/// Unrestricted, family-less subsets from face groups.
pub fn groups_to_subsets(groups: &[FaceGroup]) -> Vec<GeomSubset> {
    groups
        .iter()
        .map(|g| GeomSubset::faces(sanitize_name(&g.name), g.faces.iter().map(|&f| f as i32).collect()))
        .collect()
}

/// Per-face label, `None` for the sentinel.
fn partition_labels(attribute: &DataArray) -> Result<Vec<Option<String>>> {
    if attribute.tuple_size() != 1 {
        return Err(Error::TypeMismatch {
            expected: "tuple size 1".to_string(),
            actual: format!("tuple size {}", attribute.tuple_size()),
        });
    }
    let labels = match attribute.storage() {
        Storage::String => (0..attribute.entries())
            .map(|i| attribute.get_str(i, 0).filter(|s| *s != STRING_SENTINEL).map(str::to_string))
            .collect(),
        s if s.is_integer() => (0..attribute.entries())
            .map(|i| attribute.get_i64(i, 0).filter(|&v| v != INT_SENTINEL as i64).map(|v| v.to_string()))
            .collect(),
        s => {
            return Err(Error::TypeMismatch {
                expected: "int or string".to_string(),
                actual: s.name().to_string(),
            })
        }
    };
    Ok(labels)
}

/// Make a string usable as a prim name.
fn sanitize_name(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
