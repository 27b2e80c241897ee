//! Primvar routing.
//!
//! Converted primvar arrays are sorted into per-owner attribute lists by
//! interpolation. The router enforces the minimum entry count of each
//! domain and promotes constants onto primitives or points as zero-stride
//! broadcasts. Per-attribute failures are collected as warnings; routing
//! always continues with the next primvar.

use tracing::{debug, warn};

use super::{convert_value, AttributeList, DataArray, NamePattern};
use crate::config::SyncOptions;
use crate::core::{Interpolation, Owner, TimeCode};
use crate::stage::{PrimSource, PrimvarSource};
use crate::util::{BaseType, Error, Result};

/// Element counts of the target geometry.
///
/// `None` means the geometry has no attribute list for that owner, e.g. a
/// point cloud has neither vertices nor primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DomainCounts {
    pub points: Option<usize>,
    pub vertices: Option<usize>,
    pub primitives: Option<usize>,
}

impl DomainCounts {
    /// Polygon mesh counts.
    pub fn mesh(points: usize, vertices: usize, faces: usize) -> Self {
        Self {
            points: Some(points),
            vertices: Some(vertices),
            primitives: Some(faces),
        }
    }

    /// Point cloud counts.
    pub fn points(points: usize) -> Self {
        Self {
            points: Some(points),
            ..Default::default()
        }
    }

    /// Count for an owner; detail always has one element.
    pub fn get(&self, owner: Owner) -> Option<usize> {
        match owner {
            Owner::Point => self.points,
            Owner::Vertex => self.vertices,
            Owner::Primitive => self.primitives,
            Owner::Detail => Some(1),
        }
    }
}

/// What the router needs to know about one primvar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimvarDescriptor {
    /// Attribute name on the geometry side.
    pub name: String,
    pub interpolation: Interpolation,
    pub element_size: usize,
    /// Fewest entries the data may have.
    pub min_count: usize,
}

impl PrimvarDescriptor {
    /// Descriptor with the minimum count taken from `counts`.
    pub fn new(name: impl Into<String>, interpolation: Interpolation, element_size: usize, counts: &DomainCounts) -> Self {
        let min_count = counts.get(interpolation.owner()).unwrap_or(0);
        Self {
            name: name.into(),
            interpolation,
            element_size: element_size.max(1),
            min_count,
        }
    }
}

/// Result of routing a prim's primvars.
#[derive(Debug, Default)]
pub struct LoadedAttributes {
    pub point: Option<AttributeList>,
    pub vertex: Option<AttributeList>,
    pub primitive: Option<AttributeList>,
    /// Constants that were not promoted.
    pub constant: AttributeList,
    /// Promoted constants with tuple size above one.
    pub promoted_vector: Vec<String>,
    /// Promoted numeric constants with tuple size one.
    pub promoted_scalar: Vec<String>,
    /// Promoted boolean constants.
    pub promoted_bool: Vec<String>,
    /// Every boolean attribute, whatever its owner.
    pub bool_names: Vec<String>,
    /// Per-attribute failures, in encounter order.
    pub warnings: Vec<Error>,
}

impl LoadedAttributes {
    /// Empty result with a list for every owner `counts` has.
    pub fn for_counts(counts: &DomainCounts) -> Self {
        Self {
            point: counts.points.map(|_| AttributeList::new()),
            vertex: counts.vertices.map(|_| AttributeList::new()),
            primitive: counts.primitives.map(|_| AttributeList::new()),
            ..Default::default()
        }
    }

    /// List for an owner, if present.
    pub fn list(&self, owner: Owner) -> Option<&AttributeList> {
        match owner {
            Owner::Point => self.point.as_ref(),
            Owner::Vertex => self.vertex.as_ref(),
            Owner::Primitive => self.primitive.as_ref(),
            Owner::Detail => Some(&self.constant),
        }
    }

    fn list_mut(&mut self, owner: Owner) -> Option<&mut AttributeList> {
        match owner {
            Owner::Point => self.point.as_mut(),
            Owner::Vertex => self.vertex.as_mut(),
            Owner::Primitive => self.primitive.as_mut(),
            Owner::Detail => Some(&mut self.constant),
        }
    }

    /// Find an attribute by name in any list.
    pub fn find(&self, name: &str) -> Option<(Owner, &DataArray)> {
        Owner::ALL
            .iter()
            .find_map(|&o| self.list(o).and_then(|l| l.get(name)).map(|a| (o, a)))
    }

    /// Route one converted primvar array.
    ///
    /// Vertex and varying data is indirected through `remap` first when one
    /// is given. Returns the owner the array landed on, or `None` if the
    /// geometry has no list for it.
    pub fn route(
        &mut self,
        desc: &PrimvarDescriptor,
        array: DataArray,
        remap: Option<&[usize]>,
        is_bool: bool,
        counts: &DomainCounts,
        promote_constants: bool,
    ) -> Result<Option<Owner>> {
        let owner = desc.interpolation.owner();

        let array = match (desc.interpolation, remap) {
            (Interpolation::Vertex | Interpolation::Varying, Some(map)) => DataArray::indirect(&array, map)?,
            _ => array,
        };

        let min_count = if owner == Owner::Detail { 1 } else { desc.min_count };
        if array.entries() < min_count {
            return Err(Error::Cardinality {
                name: desc.name.clone(),
                domain: desc.interpolation.as_str(),
                expected: min_count,
                actual: array.entries(),
            });
        }

        let landed = if owner == Owner::Detail {
            Some(self.route_constant(desc, array, is_bool, counts, promote_constants))
        } else if let Some(list) = self.list_mut(owner) {
            list.insert(desc.name.clone(), array);
            Some(owner)
        } else {
            debug!(attribute = %desc.name, owner = %owner, "no attribute list for owner");
            None
        };

        if is_bool && landed.is_some() {
            self.bool_names.push(desc.name.clone());
        }
        Ok(landed)
    }

    fn route_constant(
        &mut self,
        desc: &PrimvarDescriptor,
        array: DataArray,
        is_bool: bool,
        counts: &DomainCounts,
        promote: bool,
    ) -> Owner {
        let target = if !promote {
            None
        } else if let (Some(n), Some(_)) = (counts.primitives, self.primitive.as_ref()) {
            Some((Owner::Primitive, n))
        } else if let (Some(n), Some(_)) = (counts.points, self.point.as_ref()) {
            Some((Owner::Point, n))
        } else {
            None
        };

        let Some((owner, n)) = target else {
            self.constant.insert(desc.name.clone(), array);
            return Owner::Detail;
        };

        let promoted = if is_bool {
            &mut self.promoted_bool
        } else if array.tuple_size() > 1 {
            &mut self.promoted_vector
        } else {
            &mut self.promoted_scalar
        };
        promoted.push(desc.name.clone());

        let broadcast = DataArray::broadcast(&array, n);
        if let Some(list) = self.list_mut(owner) {
            list.insert(desc.name.clone(), broadcast);
        }
        owner
    }

    /// Record a failure and log it.
    pub fn warn(&mut self, err: Error) {
        warn!("{}", err);
        self.warnings.push(err);
    }
}

/// Geometry-side name of a USD primvar.
///
/// Namespace separators become underscores; `displayColor` and
/// `displayOpacity` map to `Cd` and `Alpha` when `rename_display` is set.
pub fn houdini_name(primvar: &str, rename_display: bool) -> String {
    match primvar {
        "displayColor" if rename_display => "Cd".to_string(),
        "displayOpacity" if rename_display => "Alpha".to_string(),
        _ => primvar.replace(':', "_"),
    }
}

/// USD primvar name for a geometry attribute; inverse of [`houdini_name`]
/// for the display renames.
pub fn usd_primvar_name(attribute: &str, rename_display: bool) -> &str {
    match attribute {
        "Cd" if rename_display => "displayColor",
        "Alpha" if rename_display => "displayOpacity",
        _ => attribute,
    }
}

/// Load the primvars of `prim` at `time` into per-owner attribute lists.
///
/// Primvars are selected by `pattern` on their USD name. Each selected
/// primvar is converted, flattened through its indices if indexed, and
/// routed. Failures are logged and collected in
/// [`LoadedAttributes::warnings`]; they never abort the load.
pub fn load_primvars(
    prim: &dyn PrimSource,
    time: TimeCode,
    pattern: &NamePattern,
    counts: DomainCounts,
    remap: Option<&[usize]>,
    options: &SyncOptions,
) -> LoadedAttributes {
    let mut out = LoadedAttributes::for_counts(&counts);

    for pv in prim.primvars() {
        let usd_name = pv.primvar_name();
        if !pattern.matches(usd_name) {
            continue;
        }
        let name = houdini_name(usd_name, options.rename_display_primvars);
        if let Err(err) = load_one(&mut out, pv, &name, time, &counts, remap, options) {
            out.warn(err);
        }
    }

    debug!(
        prim = prim.path(),
        warnings = out.warnings.len(),
        "loaded primvars"
    );
    out
}

fn load_one(
    out: &mut LoadedAttributes,
    pv: &dyn PrimvarSource,
    name: &str,
    time: TimeCode,
    counts: &DomainCounts,
    remap: Option<&[usize]>,
    options: &SyncOptions,
) -> Result<()> {
    let Some(value) = pv.get(time) else {
        debug!(attribute = pv.path(), "primvar has no value");
        return Ok(());
    };

    let element_size = pv.element_size();
    let mut array = convert_value(&value, element_size, pv.path())?;

    if let Some(indices) = pv.indices(time) {
        let indices = indices
            .iter()
            .map(|&i| usize::try_from(i))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::other(format!("{}: negative primvar index", pv.path())))?;
        array = DataArray::indirect(&array, &indices)?;
    }

    let is_bool = value.ty().is_some_and(|t| t.base == BaseType::Bool);
    let desc = PrimvarDescriptor::new(name, pv.interpolation(), element_size, counts);
    out.route(&desc, array, remap, is_bool, counts, options.promote_constants)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(n: usize) -> DataArray {
        DataArray::from_vec((0..n).map(|i| i as f32).collect(), 1)
    }

    #[test]
    fn test_route_by_interpolation() {
        let counts = DomainCounts::mesh(4, 6, 2);
        let mut out = LoadedAttributes::for_counts(&counts);
        let d = PrimvarDescriptor::new("w", Interpolation::Vertex, 1, &counts);
        assert_eq!(out.route(&d, floats(4), None, false, &counts, true).unwrap(), Some(Owner::Point));
        let d = PrimvarDescriptor::new("uv", Interpolation::FaceVarying, 1, &counts);
        assert_eq!(out.route(&d, floats(6), None, false, &counts, true).unwrap(), Some(Owner::Vertex));
        let d = PrimvarDescriptor::new("id", Interpolation::Uniform, 1, &counts);
        assert_eq!(out.route(&d, floats(2), None, false, &counts, true).unwrap(), Some(Owner::Primitive));
    }

    #[test]
    fn test_cardinality_skip() {
        let counts = DomainCounts::mesh(4, 6, 2);
        let mut out = LoadedAttributes::for_counts(&counts);
        let d = PrimvarDescriptor::new("w", Interpolation::Vertex, 1, &counts);
        let err = out.route(&d, floats(3), None, false, &counts, true).unwrap_err();
        assert!(matches!(err, Error::Cardinality { expected: 4, actual: 3, .. }));
        assert!(out.point.as_ref().map_or(false, |l| l.is_empty()));
    }

    #[test]
    fn test_constant_promotion_order() {
        let c = DataArray::from_vec(vec![0.5f32, 0.5, 0.5], 3);

        let counts = DomainCounts::mesh(4, 6, 2);
        let mut out = LoadedAttributes::for_counts(&counts);
        let d = PrimvarDescriptor::new("Cd", Interpolation::Constant, 1, &counts);
        assert_eq!(out.route(&d, c.clone(), None, false, &counts, true).unwrap(), Some(Owner::Primitive));
        assert_eq!(out.promoted_vector, vec!["Cd"]);

        let counts = DomainCounts::points(10);
        let mut out = LoadedAttributes::for_counts(&counts);
        assert_eq!(out.route(&d, c.clone(), None, false, &counts, true).unwrap(), Some(Owner::Point));
        let a = out.point.as_ref().and_then(|l| l.get("Cd")).unwrap();
        assert_eq!(a.entries(), 10);
        assert_eq!(a.backing_len(), 3);

        let counts = DomainCounts::default();
        let mut out = LoadedAttributes::for_counts(&counts);
        assert_eq!(out.route(&d, c, None, false, &counts, true).unwrap(), Some(Owner::Detail));
        assert!(out.promoted_vector.is_empty());
    }

    #[test]
    fn test_constant_without_promotion() {
        let counts = DomainCounts::mesh(4, 6, 2);
        let mut out = LoadedAttributes::for_counts(&counts);
        let d = PrimvarDescriptor::new("s", Interpolation::Constant, 1, &counts);
        assert_eq!(out.route(&d, floats(1), None, false, &counts, false).unwrap(), Some(Owner::Detail));
        assert!(out.constant.contains("s"));
    }

    #[test]
    fn test_bool_names_recorded() {
        let counts = DomainCounts::mesh(2, 2, 2);
        let mut out = LoadedAttributes::for_counts(&counts);
        let flags = DataArray::from_vec(vec![1u8, 0], 1);
        let d = PrimvarDescriptor::new("visible", Interpolation::Uniform, 1, &counts);
        out.route(&d, flags.clone(), None, true, &counts, true).unwrap();
        let d = PrimvarDescriptor::new("on", Interpolation::Constant, 1, &counts);
        out.route(&d, flags, None, true, &counts, true).unwrap();
        assert_eq!(out.bool_names, vec!["visible", "on"]);
        assert_eq!(out.promoted_bool, vec!["on"]);
    }

    #[test]
    fn test_scalar_constant_promotion() {
        let counts = DomainCounts::mesh(4, 6, 3);
        let mut out = LoadedAttributes::for_counts(&counts);
        let d = PrimvarDescriptor::new("width", Interpolation::Constant, 1, &counts);
        assert_eq!(out.route(&d, floats(1), None, false, &counts, true).unwrap(), Some(Owner::Primitive));
        assert_eq!(out.promoted_scalar, vec!["width"]);
        assert!(out.promoted_vector.is_empty() && out.promoted_bool.is_empty());
        let a = out.primitive.as_ref().and_then(|l| l.get("width")).unwrap();
        assert_eq!(a.entries(), 3);
        assert!(a.is_constant_view());
    }

    #[test]
    fn test_bool_without_list_not_recorded() {
        let counts = DomainCounts::points(2);
        let mut out = LoadedAttributes::for_counts(&counts);
        let flags = DataArray::from_vec(vec![1u8, 0], 1);
        let d = PrimvarDescriptor::new("visible", Interpolation::Uniform, 1, &counts);
        assert_eq!(out.route(&d, flags, None, true, &counts, true).unwrap(), None);
        assert!(out.bool_names.is_empty());
        assert!(out.find("visible").is_none());
    }

    #[test]
    fn test_remap_vertex_data() {
        let counts = DomainCounts::points(4);
        let mut out = LoadedAttributes::for_counts(&counts);
        let d = PrimvarDescriptor::new("w", Interpolation::Varying, 1, &counts);
        out.route(&d, floats(2), Some(&[0, 0, 1, 1]), false, &counts, true).unwrap();
        let a = out.point.as_ref().and_then(|l| l.get("w")).unwrap();
        assert_eq!(a.to_f64_vec(), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_names() {
        assert_eq!(houdini_name("displayColor", true), "Cd");
        assert_eq!(houdini_name("displayColor", false), "displayColor");
        assert_eq!(houdini_name("ri:attributes:id", true), "ri_attributes_id");
        assert_eq!(usd_primvar_name("Alpha", true), "displayOpacity");
        assert_eq!(usd_primvar_name("N", true), "N");
    }
}
