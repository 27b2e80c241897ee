//! Integration tests for the read path: value conversion, primvar loading
//! and geometry subsets.

use glam::{Vec2, Vec3};
use gusd::prelude::*;
use gusd::util::{BaseType, Storage, TypeRole};

fn mesh_with_primvars() -> MemPrim {
    let p = "/World/mesh";
    MemPrim::new(p, "Mesh")
        .with_attribute(
            MemAttribute::primvar(p, "displayColor", ValueType::COLOR3F_ARRAY, Interpolation::Constant)
                .with_default(Value::vec3_array(&[Vec3::new(0.2, 0.4, 0.6)], TypeRole::Color)),
        )
        .with_attribute(
            MemAttribute::primvar(p, "st", ValueType::TEXCOORD2F_ARRAY, Interpolation::FaceVarying)
                .with_default(Value::vec2_array(&[Vec2::ZERO; 6], TypeRole::TexCoord)),
        )
        .with_attribute(
            MemAttribute::primvar(p, "skel:weights", ValueType::FLOAT_ARRAY, Interpolation::Vertex)
                .with_element_size(2)
                .with_default(Value::float_array(vec![0.5; 8])),
        )
        .with_attribute(
            MemAttribute::primvar(p, "short", ValueType::FLOAT_ARRAY, Interpolation::Vertex)
                .with_default(Value::float_array(vec![1.0; 3])),
        )
        .with_attribute(
            MemAttribute::primvar(p, "bad", ValueType::FLOAT_ARRAY, Interpolation::Vertex)
                .with_element_size(3)
                .with_default(Value::float_array(vec![1.0; 7])),
        )
        .with_attribute(
            MemAttribute::primvar(p, "hidden", ValueType::array(BaseType::Bool), Interpolation::Uniform)
                .with_default(Value::bool_array(vec![false, true])),
        )
        .with_attribute(
            MemAttribute::primvar(p, "id", ValueType::INT_ARRAY, Interpolation::Uniform)
                .with_indices(vec![1, 0])
                .with_default(Value::int_array(vec![10, 20])),
        )
}

#[test]
fn test_element_size_seven_by_three_rejected() {
    let v = Value::float_array(vec![0.0; 7]);
    let err = convert_value(&v, 3, "/m.primvars:w").expect_err("7 values cannot pack into 3s");
    assert!(matches!(err, Error::ElementSize { len: 7, element_size: 3, .. }));
}

#[test]
fn test_unsupported_distinct_from_empty() {
    assert!(matches!(
        convert_value(&Value::opaque("dictionary"), 1, "/m.custom"),
        Err(Error::UnsupportedType { .. })
    ));
    let empty = convert_value(&Value::int_array(vec![]), 1, "/m.ids").expect("empty is valid");
    assert_eq!(empty.entries(), 0);
}

#[test]
fn test_load_primvars_routes_and_warns() {
    let prim = mesh_with_primvars();
    let wrapper = PrimWrapper::new("/World/mesh", SchemaKind::Mesh);
    // 4 points, 6 face-vertices, 2 faces
    let loaded = wrapper.load_primvars(&prim, TimeCode::DEFAULT, None, DomainCounts::mesh(4, 6, 2), None);

    // constant color promoted to a primitive broadcast
    let (owner, cd) = loaded.find("Cd").expect("Cd should be loaded");
    assert_eq!(owner, Owner::Primitive);
    assert_eq!(cd.entries(), 2);
    assert!(cd.is_constant_view());
    assert_eq!(cd.backing_len(), 3);
    assert_eq!(cd.get_f64(1, 2), Some(0.6000000238418579));
    assert_eq!(loaded.promoted_vector, vec!["Cd"]);

    let (owner, st) = loaded.find("st").expect("st should be loaded");
    assert_eq!(owner, Owner::Vertex);
    assert_eq!(st.type_info(), TypeInfo::TexCoord);

    // namespaced name flattened, element size packed
    let (owner, w) = loaded.find("skel_weights").expect("weights should be loaded");
    assert_eq!(owner, Owner::Point);
    assert_eq!((w.entries(), w.tuple_size()), (4, 2));

    // indexed primvar flattened through its indices
    let (_, id) = loaded.find("id").expect("id should be loaded");
    assert_eq!(id.to_i64_vec(), vec![20, 10]);

    assert_eq!(loaded.bool_names, vec!["hidden"]);
    assert_eq!(
        loaded.find("hidden").map(|(o, a)| (o, a.storage())),
        Some((Owner::Primitive, Storage::Uint8))
    );

    // "short" fails cardinality, "bad" fails element size
    assert!(loaded.find("short").is_none());
    assert!(loaded.find("bad").is_none());
    assert_eq!(loaded.warnings.len(), 2);
    assert!(loaded.warnings.iter().any(|e| matches!(e, Error::Cardinality { .. })));
    assert!(loaded.warnings.iter().any(|e| matches!(e, Error::ElementSize { .. })));
}

#[test]
fn test_load_primvars_pattern() {
    let prim = mesh_with_primvars();
    let wrapper = PrimWrapper::new("/World/mesh", SchemaKind::Mesh);
    let loaded = wrapper.load_primvars(
        &prim,
        TimeCode::DEFAULT,
        Some("* ^short ^bad ^skel:*"),
        DomainCounts::mesh(4, 6, 2),
        None,
    );
    assert!(loaded.warnings.is_empty());
    assert!(loaded.find("skel_weights").is_none());
    assert!(loaded.find("Cd").is_some());
}

#[test]
fn test_constant_kept_without_lists() {
    let prim = mesh_with_primvars();
    let options = SyncOptions {
        rename_display_primvars: false,
        ..Default::default()
    };
    let loaded = load_primvars(
        &prim,
        TimeCode::DEFAULT,
        &NamePattern::new("displayColor"),
        DomainCounts::default(),
        None,
        &options,
    );
    let cd = loaded.constant.get("displayColor").expect("constant should stay on detail");
    assert_eq!(cd.entries(), 1);
    assert!(loaded.promoted_vector.is_empty());
}

#[test]
fn test_subset_round_trip() {
    let prim = MemPrim::new("/World/mesh", "Mesh")
        .with_subset(GeomSubset::faces("a", vec![0, 1]).in_family("part"))
        .with_subset(GeomSubset::faces("b", vec![2]).in_family("part"))
        .with_family_type("part", FamilyType::Partition);
    let wrapper = PrimWrapper::new("/World/mesh", SchemaKind::Mesh);

    let result = wrapper.compute_subsets(&prim, TimeCode::DEFAULT, 3);
    let attr = result.partitions.get("part").expect("partition attribute");
    assert_eq!(attr.to_strings(), vec!["a", "a", "b"]);

    let groups = groups_from_partition(attr).expect("string partition");
    let sets: Vec<(String, Vec<usize>)> = groups.into_iter().map(|g| (g.name, g.faces)).collect();
    assert_eq!(sets, vec![("a".to_string(), vec![0, 1]), ("b".to_string(), vec![2])]);
}

#[test]
fn test_partition_write_then_read() {
    let attr = DataArray::from_vec(vec![5i32, 5, 9, -1], 1);
    let (family_type, subsets) = partition_to_subsets("mat", &attr).expect("int partition");

    let mut prim = MemPrim::new("/m", "Mesh").with_family_type("mat", family_type);
    for s in subsets {
        prim.add_subset(s);
    }
    let read = compute_subsets(&prim, TimeCode::DEFAULT, 4, &SyncOptions::default());
    assert!(read.warnings.is_empty());
    assert_eq!(read.partitions.get("mat").map(|a| a.to_i64_vec()), Some(vec![5, 5, 9, -1]));
}
