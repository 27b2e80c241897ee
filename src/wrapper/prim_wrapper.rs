//! Per-prim sync state and entry points.
//!
//! A [`PrimWrapper`] is created for each prim being exported or imported and
//! lives for the whole session. It owns the attribute history and transform
//! cache; nothing else holds on to them.

use glam::DMat4;
use tracing::debug;

use super::SchemaKind;
use crate::config::SyncOptions;
use crate::core::{AttributeHistory, AttributeKey, MetaData, Owner, TimeCode, Value};
use crate::geom::{
    array_to_value, compute_subsets, load_primvars, usd_primvar_name, value_type_for_array, DataArray, DomainCounts,
    LoadedAttributes, NamePattern, SubsetResult, XformCache,
};
use crate::stage::{AttributeSink, PrimSink, PrimSource, SubsetSource, XformTarget, PRIMVARS_PREFIX};
use crate::util::{BaseType, Error, Result, Storage, ValueType};

/// Sync state of one prim.
#[derive(Debug)]
pub struct PrimWrapper {
    path: String,
    kind: SchemaKind,
    options: SyncOptions,
    history: AttributeHistory<DataArray>,
    xform: XformCache,
}

impl PrimWrapper {
    /// Wrapper with default options.
    pub fn new(path: &str, kind: SchemaKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
            options: SyncOptions::default(),
            history: AttributeHistory::new(),
            xform: XformCache::new(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Attribute history, for inspection.
    pub fn history(&self) -> &AttributeHistory<DataArray> {
        &self.history
    }

    /// Transform cache, for inspection.
    pub fn xform_cache(&self) -> &XformCache {
        &self.xform
    }

    // === Write path ===

    /// Author a geometry attribute onto a USD attribute if it changed.
    ///
    /// The value is converted to the attribute's declared type. Returns
    /// `Ok(true)` iff a sample was authored at `time`.
    pub fn update_attribute_from_geometry(
        &mut self,
        attr: &mut dyn AttributeSink,
        owner: Owner,
        name: &str,
        array: &DataArray,
        time: TimeCode,
    ) -> Result<bool> {
        let ty = attr
            .value_type()
            .ok_or_else(|| Error::unsupported(attr.path(), "unknown"))?;
        let key = AttributeKey::new(owner, name);
        self.history.record(&key, array, time, |a, t, _| {
            let value = array_to_value(a, ty)?;
            attr.set(&value, t)
        })
    }

    /// Author a geometry attribute as a primvar if it changed.
    ///
    /// The primvar is created on first use with a type inferred from the
    /// array, and gets `interpolation` (from `owner`) and, for packed
    /// tuples, `elementSize` metadata. `as_bool` marks uint8 data holding
    /// booleans. Returns `Ok(true)` iff a sample was authored at `time`.
    pub fn update_primvar_from_geometry(
        &mut self,
        prim: &mut dyn PrimSink,
        owner: Owner,
        name: &str,
        array: &DataArray,
        time: TimeCode,
        as_bool: bool,
    ) -> Result<bool> {
        let usd_name = usd_primvar_name(name, self.options.rename_display_primvars);
        let attr_name = format!("{}{}", PRIMVARS_PREFIX, usd_name.replace(':', "_"));
        let (ty, element_size) = primvar_type(array, as_bool).ok_or_else(|| Error::TypeMismatch {
            expected: "a primvar type".to_string(),
            actual: format!("{} with tuple size {}", array.storage().name(), array.tuple_size()),
        })?;

        let attr = prim.attribute_mut(&attr_name, ty)?;
        if !attr.has_metadata(MetaData::INTERPOLATION) {
            attr.set_metadata(MetaData::INTERPOLATION, Value::token(owner.interpolation().as_str()))?;
            if element_size > 1 {
                attr.set_metadata(MetaData::ELEMENT_SIZE, Value::int(element_size as i32))?;
            }
            debug!(attribute = attr.path(), ty = %ty, "created primvar");
        }

        let key = AttributeKey::new(owner, name);
        self.history.record(&key, array, time, |a, t, _| {
            let value = array_to_value(a, ty)?;
            attr.set(&value, t)
        })
    }

    /// Author the local transform if it changed.
    ///
    /// Honours `identity_tolerance` and `force_transforms` from the options.
    pub fn update_transform(&mut self, target: &mut dyn XformTarget, xform: &DMat4, time: TimeCode) -> Result<bool> {
        self.xform.update(
            target,
            xform,
            time,
            self.options.force_transforms,
            self.options.identity_tolerance,
        )
    }

    /// Forget all history, e.g. at the start of a new export session.
    pub fn clear_caches(&mut self) {
        self.history.clear();
        self.xform.clear();
    }

    // === Read path ===

    /// Load primvars into per-owner attribute lists.
    ///
    /// `pattern` defaults to the options' primvar pattern.
    pub fn load_primvars(
        &self,
        prim: &dyn PrimSource,
        time: TimeCode,
        pattern: Option<&str>,
        counts: DomainCounts,
        remap: Option<&[usize]>,
    ) -> LoadedAttributes {
        let pattern = NamePattern::new(pattern.unwrap_or(&self.options.primvar_pattern));
        load_primvars(prim, time, &pattern, counts, remap, &self.options)
    }

    /// Read face groups and partition attributes.
    pub fn compute_subsets(&self, source: &dyn SubsetSource, time: TimeCode, face_count: usize) -> SubsetResult {
        compute_subsets(source, time, face_count, &self.options)
    }
}

/// Primvar type and element size for an array.
///
/// Tuples that match no USD type are authored as scalars packed with an
/// element size. Int64 data keeps its width.
fn primvar_type(array: &DataArray, as_bool: bool) -> Option<(ValueType, usize)> {
    if let Some(ty) = value_type_for_array(array, true, as_bool) {
        return Some((ty, 1));
    }
    let storage = match array.storage() {
        Storage::Int64 => Storage::Int64,
        s if s.is_integer() => Storage::Int32,
        s => s,
    };
    let base = BaseType::from_storage(storage, 1)?;
    Some((ValueType::array(base), array.tuple_size()))
}
