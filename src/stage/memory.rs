//! In-memory stage implementation.
//!
//! [`MemPrim`] and [`MemAttribute`] hold values and record every authored
//! time sample in time order. Reads use held interpolation: the value at a
//! time is the last sample at or before it (or the first sample before the
//! range). A host can use these as a staging area; the tests use them to
//! assert exactly what the engine authored.

use std::collections::HashMap;

use glam::DMat4;

use super::traits::*;
use crate::core::{Interpolation, MetaData, TimeCode, Value};
use crate::util::{Error, Result, ValueType};

/// Insert `value` at `time`, keeping samples sorted and replacing any
/// sample already at that time.
fn insert_sample<T>(samples: &mut Vec<(TimeCode, T)>, time: TimeCode, value: T) {
    let idx = samples.partition_point(|(t, _)| *t < time);
    match samples.get_mut(idx) {
        Some(slot) if slot.0 == time => slot.1 = value,
        _ => samples.insert(idx, (time, value)),
    }
}

/// Held lookup: last sample at or before `time`, else the first sample.
fn held_sample<T>(samples: &[(TimeCode, T)], time: TimeCode) -> Option<&T> {
    let idx = samples.partition_point(|(t, _)| *t <= time);
    samples.get(idx.saturating_sub(1)).map(|(_, v)| v)
}

// ============================================================================
// MemAttribute
// ============================================================================

/// Attribute with a default value and time samples.
#[derive(Clone, Debug)]
pub struct MemAttribute {
    path: String,
    name: String,
    type_name: String,
    ty: Option<ValueType>,
    default: Option<Value>,
    samples: Vec<(TimeCode, Value)>,
    metadata: MetaData,
    indices: Option<Vec<i32>>,
}

impl MemAttribute {
    /// Create a typed attribute on the prim at `prim_path`.
    pub fn new(prim_path: &str, name: &str, ty: ValueType) -> Self {
        Self {
            path: format!("{}.{}", prim_path, name),
            name: name.to_string(),
            type_name: ty.name(),
            ty: Some(ty),
            default: None,
            samples: Vec::new(),
            metadata: MetaData::new(),
            indices: None,
        }
    }

    /// Create an attribute whose type is outside the supported set.
    pub fn opaque(prim_path: &str, name: &str, type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            ty: None,
            default: Some(Value::opaque(type_name)),
            ..Self::new(prim_path, name, ValueType::INT)
        }
    }

    /// Create a primvar `primvars:<name>` with the given interpolation.
    pub fn primvar(prim_path: &str, name: &str, ty: ValueType, interpolation: Interpolation) -> Self {
        Self::new(prim_path, &format!("{}{}", PRIMVARS_PREFIX, name), ty)
            .with_metadata(MetaData::INTERPOLATION, Value::token(interpolation.as_str()))
    }

    /// Set the default (unsampled) value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Add a time sample.
    pub fn with_sample(mut self, time: impl Into<TimeCode>, value: Value) -> Self {
        insert_sample(&mut self.samples, time.into(), value);
        self
    }

    /// Set a metadata entry.
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.set(key, value);
        self
    }

    /// Set the primvar element size.
    pub fn with_element_size(self, element_size: i32) -> Self {
        self.with_metadata(MetaData::ELEMENT_SIZE, element_size)
    }

    /// Make this an indexed primvar.
    pub fn with_indices(mut self, indices: Vec<i32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Authored time samples in time order.
    pub fn samples(&self) -> &[(TimeCode, Value)] {
        &self.samples
    }

    /// Times of the authored samples.
    pub fn sample_times(&self) -> Vec<f64> {
        self.samples.iter().map(|(t, _)| t.value()).collect()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

impl Attribute for MemAttribute {
    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl AttributeSource for MemAttribute {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get(&self, time: TimeCode) -> Option<Value> {
        if time.is_default() || self.samples.is_empty() {
            return self.default.clone();
        }
        held_sample(&self.samples, time).cloned()
    }

    fn metadata(&self) -> &MetaData {
        &self.metadata
    }
}

impl PrimvarSource for MemAttribute {
    fn indices(&self, _time: TimeCode) -> Option<Vec<i32>> {
        self.indices.clone()
    }
}

impl AttributeSink for MemAttribute {
    fn value_type(&self) -> Option<ValueType> {
        self.ty
    }

    fn set(&mut self, value: &Value, time: TimeCode) -> Result<()> {
        let ty = self
            .ty
            .ok_or_else(|| Error::unsupported(self.path.clone(), self.type_name.clone()))?;
        if value.ty() != Some(ty) {
            return Err(Error::TypeMismatch {
                expected: ty.name(),
                actual: value.type_name(),
            });
        }
        if time.is_default() {
            self.default = Some(value.clone());
        } else {
            insert_sample(&mut self.samples, time, value.clone());
        }
        Ok(())
    }

    fn set_metadata(&mut self, key: &str, value: Value) -> Result<()> {
        self.metadata.set(key, value);
        Ok(())
    }

    fn has_metadata(&self, key: &str) -> bool {
        self.metadata.contains(key)
    }
}

// ============================================================================
// MemPrim
// ============================================================================

/// Prim holding attributes, subsets and transform samples.
#[derive(Clone, Debug)]
pub struct MemPrim {
    path: String,
    type_name: String,
    attributes: Vec<MemAttribute>,
    subsets: Vec<GeomSubset>,
    family_types: HashMap<String, FamilyType>,
    xform_samples: Vec<(TimeCode, DMat4)>,
    edit_target_identity: bool,
    stronger_xform_ops: bool,
    stronger_clears: usize,
}

impl MemPrim {
    /// Create an empty prim with an identity edit target.
    pub fn new(path: &str, type_name: &str) -> Self {
        Self {
            path: path.to_string(),
            type_name: type_name.to_string(),
            attributes: Vec::new(),
            subsets: Vec::new(),
            family_types: HashMap::new(),
            xform_samples: Vec::new(),
            edit_target_identity: true,
            stronger_xform_ops: false,
            stronger_clears: 0,
        }
    }

    /// Add or replace an attribute.
    pub fn with_attribute(mut self, attr: MemAttribute) -> Self {
        self.add_attribute(attr);
        self
    }

    /// Add or replace an attribute.
    pub fn add_attribute(&mut self, attr: MemAttribute) {
        match self.attributes.iter_mut().find(|a| a.name == attr.name) {
            Some(slot) => *slot = attr,
            None => self.attributes.push(attr),
        }
    }

    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&MemAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get a primvar by name without namespace.
    pub fn primvar(&self, name: &str) -> Option<&MemAttribute> {
        self.attribute(&format!("{}{}", PRIMVARS_PREFIX, name))
    }

    pub fn attributes(&self) -> &[MemAttribute] {
        &self.attributes
    }

    /// Add a subset.
    pub fn with_subset(mut self, subset: GeomSubset) -> Self {
        self.add_subset(subset);
        self
    }

    /// Add a subset.
    pub fn add_subset(&mut self, subset: GeomSubset) {
        self.subsets.push(subset);
    }

    /// Set a family's type.
    pub fn with_family_type(mut self, family: &str, family_type: FamilyType) -> Self {
        self.set_family_type(family, family_type);
        self
    }

    /// Set a family's type.
    pub fn set_family_type(&mut self, family: &str, family_type: FamilyType) {
        self.family_types.insert(family.to_string(), family_type);
    }

    /// Configure the edit target mapping and stronger-layer xform ops.
    pub fn with_layering(mut self, edit_target_identity: bool, stronger_xform_ops: bool) -> Self {
        self.edit_target_identity = edit_target_identity;
        self.stronger_xform_ops = stronger_xform_ops;
        self
    }

    /// Authored transform samples in time order.
    pub fn xform_samples(&self) -> &[(TimeCode, DMat4)] {
        &self.xform_samples
    }

    /// Number of times stronger-layer xform ops were cleared.
    pub fn stronger_clears(&self) -> usize {
        self.stronger_clears
    }
}

impl Prim for MemPrim {
    fn path(&self) -> &str {
        &self.path
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl PrimSource for MemPrim {
    fn primvars(&self) -> Vec<&dyn PrimvarSource> {
        self.attributes
            .iter()
            .filter(|a| a.name.starts_with(PRIMVARS_PREFIX) && !a.name.ends_with(":indices"))
            .map(|a| a as &dyn PrimvarSource)
            .collect()
    }
}

impl PrimSink for MemPrim {
    fn attribute_mut(&mut self, name: &str, ty: ValueType) -> Result<&mut dyn AttributeSink> {
        let idx = match self.attributes.iter().position(|a| a.name == name) {
            Some(idx) => {
                let existing = &self.attributes[idx];
                if existing.ty != Some(ty) {
                    return Err(Error::TypeMismatch {
                        expected: existing.type_name.clone(),
                        actual: ty.name(),
                    });
                }
                idx
            }
            None => {
                self.attributes.push(MemAttribute::new(&self.path, name, ty));
                self.attributes.len() - 1
            }
        };
        Ok(&mut self.attributes[idx])
    }
}

impl SubsetSource for MemPrim {
    fn subsets(&self, _time: TimeCode) -> Vec<GeomSubset> {
        self.subsets.clone()
    }

    fn family_type(&self, family: &str) -> FamilyType {
        self.family_types.get(family).copied().unwrap_or_default()
    }
}

impl XformTarget for MemPrim {
    fn edit_target_is_identity(&self) -> bool {
        self.edit_target_identity
    }

    fn has_stronger_xform_ops(&self) -> bool {
        self.stronger_xform_ops
    }

    fn clear_stronger_xform_ops(&mut self) -> Result<()> {
        self.stronger_xform_ops = false;
        self.stronger_clears += 1;
        Ok(())
    }

    fn set_transform(&mut self, matrix: &DMat4, time: TimeCode) -> Result<()> {
        insert_sample(&mut self.xform_samples, time, *matrix);
        Ok(())
    }
}
