//! Prim wrapper registry.
//!
//! Maps USD schema type names to read factories and native geometry
//! primitive types to write factories. The registry is an explicit object:
//! the host builds it once (usually with [`Registry::with_defaults`]),
//! then shares it by reference.
//!
//! Type names resolve to a closed [`SchemaKind`]. Names outside the base set
//! go through a static table of known derived schemas; the outcome, including
//! [`SchemaKind::Unhandled`], is cached so each unknown name is looked up and
//! reported once.

use std::collections::{HashMap, HashSet};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::PrimWrapper;
use crate::stage::Prim;
use crate::util::{Error, Result};

/// Schema families the engine knows how to wrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaKind {
    Mesh,
    Points,
    BasisCurves,
    NurbsCurves,
    PointInstancer,
    Xform,
    Scope,
    Unhandled,
}

impl SchemaKind {
    /// Every kind with a wrapper.
    pub const HANDLED: [SchemaKind; 7] = [
        Self::Mesh,
        Self::Points,
        Self::BasisCurves,
        Self::NurbsCurves,
        Self::PointInstancer,
        Self::Xform,
        Self::Scope,
    ];

    /// USD type name of the kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Mesh => "Mesh",
            Self::Points => "Points",
            Self::BasisCurves => "BasisCurves",
            Self::NurbsCurves => "NurbsCurves",
            Self::PointInstancer => "PointInstancer",
            Self::Xform => "Xform",
            Self::Scope => "Scope",
            Self::Unhandled => "",
        }
    }

    /// Kind of a base type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::HANDLED.into_iter().find(|k| k.type_name() == name)
    }

    /// Kind of a known derived type name: the nearest handled ancestor.
    fn from_derived(name: &str) -> Option<Self> {
        let kind = match name {
            // Intrinsic gprims and other xformables carry only a transform
            // the engine can sync.
            "Cube" | "Sphere" | "Cylinder" | "Cone" | "Capsule" | "Plane" => Self::Xform,
            "Camera" | "SkelRoot" | "Skeleton" => Self::Xform,
            "DistantLight" | "DomeLight" | "SphereLight" | "RectLight" | "DiskLight" | "CylinderLight" => Self::Xform,
            "HermiteCurves" => Self::BasisCurves,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// Creates a wrapper for the prim at a path.
pub type WrapperFactory = fn(&str) -> PrimWrapper;

/// Read and write factory registry.
pub struct Registry {
    readers: HashMap<SchemaKind, WrapperFactory>,
    writers: HashMap<String, (SchemaKind, WrapperFactory)>,
    /// Lazily resolved non-base type names.
    resolved: RwLock<HashMap<String, SchemaKind>>,
    /// Handled kinds already reported as having no reader.
    missing_readers: Mutex<HashSet<SchemaKind>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
            writers: HashMap::new(),
            resolved: RwLock::new(HashMap::new()),
            missing_readers: Mutex::new(HashSet::new()),
        }
    }

    /// Registry with a reader for every handled kind and writers for the
    /// standard native primitive types.
    pub fn with_defaults() -> Self {
        let mut r = Self::new();
        r.register_reader(SchemaKind::Mesh, |p| PrimWrapper::new(p, SchemaKind::Mesh));
        r.register_reader(SchemaKind::Points, |p| PrimWrapper::new(p, SchemaKind::Points));
        r.register_reader(SchemaKind::BasisCurves, |p| PrimWrapper::new(p, SchemaKind::BasisCurves));
        r.register_reader(SchemaKind::NurbsCurves, |p| PrimWrapper::new(p, SchemaKind::NurbsCurves));
        r.register_reader(SchemaKind::PointInstancer, |p| PrimWrapper::new(p, SchemaKind::PointInstancer));
        r.register_reader(SchemaKind::Xform, |p| PrimWrapper::new(p, SchemaKind::Xform));
        r.register_reader(SchemaKind::Scope, |p| PrimWrapper::new(p, SchemaKind::Scope));

        r.register_writer("PolygonMesh", SchemaKind::Mesh, |p| PrimWrapper::new(p, SchemaKind::Mesh));
        r.register_writer("SubdivisionMesh", SchemaKind::Mesh, |p| PrimWrapper::new(p, SchemaKind::Mesh));
        r.register_writer("PointMesh", SchemaKind::Points, |p| PrimWrapper::new(p, SchemaKind::Points));
        r.register_writer("CurveMesh", SchemaKind::BasisCurves, |p| PrimWrapper::new(p, SchemaKind::BasisCurves));
        r.register_writer("NurbsCurveMesh", SchemaKind::NurbsCurves, |p| {
            PrimWrapper::new(p, SchemaKind::NurbsCurves)
        });
        r.register_writer("Instancer", SchemaKind::PointInstancer, |p| {
            PrimWrapper::new(p, SchemaKind::PointInstancer)
        });
        r.register_writer("Transform", SchemaKind::Xform, |p| PrimWrapper::new(p, SchemaKind::Xform));
        r.register_writer("Group", SchemaKind::Scope, |p| PrimWrapper::new(p, SchemaKind::Scope));
        r
    }

    /// Register a read factory. Returns `false` and keeps the existing one
    /// if `kind` is already registered or unhandled.
    pub fn register_reader(&mut self, kind: SchemaKind, factory: WrapperFactory) -> bool {
        if !kind.is_handled() || self.readers.contains_key(&kind) {
            warn!(kind = ?kind, "duplicate or invalid reader registration ignored");
            return false;
        }
        self.readers.insert(kind, factory);
        true
    }

    /// Register a write factory for a native primitive type.
    pub fn register_writer(&mut self, native_type: &str, kind: SchemaKind, factory: WrapperFactory) -> bool {
        if self.writers.contains_key(native_type) {
            warn!(native_type, "duplicate writer registration ignored");
            return false;
        }
        self.writers.insert(native_type.to_string(), (kind, factory));
        true
    }

    /// Resolve a USD type name to a kind.
    pub fn resolve(&self, type_name: &str) -> SchemaKind {
        if let Some(kind) = SchemaKind::from_type_name(type_name) {
            return kind;
        }
        if let Some(&kind) = self.resolved.read().get(type_name) {
            return kind;
        }

        // Two threads may both get here for the same name; they compute the
        // same kind, so whichever insert lands last is harmless.
        let kind = SchemaKind::from_derived(type_name).unwrap_or(SchemaKind::Unhandled);
        let previous = self.resolved.write().insert(type_name.to_string(), kind);
        if previous.is_none() {
            if kind.is_handled() {
                debug!(type_name, kind = ?kind, "resolved derived schema");
            } else {
                warn!(type_name, "no wrapper for schema type");
            }
        }
        kind
    }

    /// Read factory for a USD type name.
    ///
    /// A handled kind with no registered reader is reported once.
    pub fn reader_for(&self, type_name: &str) -> Option<WrapperFactory> {
        let kind = self.resolve(type_name);
        let factory = self.readers.get(&kind).copied();
        if factory.is_none() && kind.is_handled() && self.missing_readers.lock().insert(kind) {
            warn!(type_name, kind = ?kind, "no reader registered for schema");
        }
        factory
    }

    /// Number of handled kinds reported as missing a reader.
    pub fn missing_reader_count(&self) -> usize {
        self.missing_readers.lock().len()
    }

    /// Create a read wrapper for `prim`.
    pub fn define_for_read(&self, prim: &dyn Prim) -> Result<PrimWrapper> {
        let factory = self
            .reader_for(prim.type_name())
            .ok_or_else(|| Error::UnknownSchema(prim.type_name().to_string()))?;
        Ok(factory(prim.path()))
    }

    /// Create a write wrapper for a native primitive type at `path`.
    pub fn define_for_write(&self, native_type: &str, path: &str) -> Result<PrimWrapper> {
        let (_, factory) = self
            .writers
            .get(native_type)
            .ok_or_else(|| Error::UnknownSchema(native_type.to_string()))?;
        Ok(factory(path))
    }

    /// USD schema a native primitive type is written as.
    pub fn write_kind(&self, native_type: &str) -> Option<SchemaKind> {
        self.writers.get(native_type).map(|(k, _)| *k)
    }

    /// Number of cached non-base resolutions.
    pub fn resolved_len(&self) -> usize {
        self.resolved.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::MemPrim;

    #[test]
    fn test_base_names() {
        for kind in SchemaKind::HANDLED {
            assert_eq!(SchemaKind::from_type_name(kind.type_name()), Some(kind));
        }
        assert_eq!(SchemaKind::from_type_name("Cube"), None);
    }

    #[test]
    fn test_resolve_caches() {
        let r = Registry::with_defaults();
        assert_eq!(r.resolve("Mesh"), SchemaKind::Mesh);
        assert_eq!(r.resolved_len(), 0);

        assert_eq!(r.resolve("Sphere"), SchemaKind::Xform);
        assert_eq!(r.resolve("MyCustomThing"), SchemaKind::Unhandled);
        assert_eq!(r.resolve("MyCustomThing"), SchemaKind::Unhandled);
        assert_eq!(r.resolved_len(), 2);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut r = Registry::with_defaults();
        assert!(!r.register_reader(SchemaKind::Mesh, |p| PrimWrapper::new(p, SchemaKind::Mesh)));
        assert!(!r.register_reader(SchemaKind::Unhandled, |p| PrimWrapper::new(p, SchemaKind::Mesh)));
        assert!(!r.register_writer("PolygonMesh", SchemaKind::Mesh, |p| PrimWrapper::new(p, SchemaKind::Mesh)));
    }

    #[test]
    fn test_define() {
        let r = Registry::with_defaults();
        let w = r.define_for_read(&MemPrim::new("/a", "Sphere")).unwrap();
        assert_eq!(w.kind(), SchemaKind::Xform);
        assert_eq!(w.path(), "/a");

        let err = r.define_for_read(&MemPrim::new("/b", "Volume")).unwrap_err();
        assert!(matches!(err, Error::UnknownSchema(ref t) if t == "Volume"));

        let w = r.define_for_write("PointMesh", "/pts").unwrap();
        assert_eq!(w.kind(), SchemaKind::Points);
        assert_eq!(r.write_kind("Group"), Some(SchemaKind::Scope));
        assert!(r.define_for_write("Volume", "/v").is_err());
    }

    #[test]
    fn test_empty_registry() {
        let r = Registry::new();
        assert!(r.reader_for("Mesh").is_none());
        assert!(r.reader_for("Mesh").is_none());
        assert!(r.define_for_read(&MemPrim::new("/m", "Mesh")).is_err());
        assert_eq!(r.missing_reader_count(), 1);

        assert!(r.reader_for("Sphere").is_none());
        assert_eq!(r.missing_reader_count(), 2);
        assert_eq!(Registry::with_defaults().missing_reader_count(), 0);
    }
}
