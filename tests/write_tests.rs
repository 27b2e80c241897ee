//! Integration tests for the write path: diff-cached attribute and primvar
//! authoring, and transform keyframing.

use glam::{DMat4, DVec3};
use gusd::prelude::*;

fn frames(n: usize) -> impl Iterator<Item = TimeCode> {
    (1..=n).map(|f| TimeCode::new(f as f64))
}

#[test]
fn test_step_function_sample_set() {
    let registry = Registry::with_defaults();
    let mut prim = MemPrim::new("/World/mesh", "Mesh");
    let mut wrapper = registry.define_for_read(&prim).expect("Mesh should be handled");

    let v0 = DataArray::from_vec(vec![0.0f32, 0.0, 0.0], 3);
    let v1 = DataArray::from_vec(vec![1.0f32, 0.0, 0.0], 3);
    let values = [&v0, &v0, &v1, &v1, &v1, &v0];

    for (t, v) in frames(6).zip(values) {
        wrapper
            .update_primvar_from_geometry(&mut prim, Owner::Point, "rest", v, t, false)
            .expect("Failed to author primvar");
    }

    let pv = prim.primvar("rest").expect("primvar should exist");
    assert_eq!(pv.sample_times(), vec![1.0, 2.0, 3.0, 5.0, 6.0]);

    let expected = [
        Value::float_array(vec![0.0, 0.0, 0.0]),
        Value::float_array(vec![0.0, 0.0, 0.0]),
        Value::float_array(vec![1.0, 0.0, 0.0]),
        Value::float_array(vec![1.0, 0.0, 0.0]),
        Value::float_array(vec![0.0, 0.0, 0.0]),
    ];
    for ((_, got), want) in pv.samples().iter().zip(expected) {
        assert_eq!(got.data(), want.data());
    }
}

#[test]
fn test_nan_buffers_not_reauthored() {
    let mut wrapper = PrimWrapper::new("/pts", SchemaKind::Points);
    let mut attr = MemAttribute::new("/pts", "widths", ValueType::FLOAT_ARRAY);
    let nan = DataArray::from_vec(vec![f32::NAN, 1.0], 1);

    let authored: Vec<bool> = frames(3)
        .map(|t| {
            wrapper
                .update_attribute_from_geometry(&mut attr, Owner::Point, "width", &nan.harden(), t)
                .expect("Failed to author")
        })
        .collect();

    assert_eq!(authored, vec![true, false, false]);
    assert_eq!(attr.num_samples(), 1);
}

#[test]
fn test_views_compare_by_value() {
    let mut wrapper = PrimWrapper::new("/m", SchemaKind::Mesh);
    let mut prim = MemPrim::new("/m", "Mesh");

    let dense = DataArray::from_vec(vec![0.25f32; 4], 1);
    let single = DataArray::from_vec(vec![0.25f32], 1);
    let broadcast = DataArray::broadcast(&single, 4);

    assert!(wrapper
        .update_primvar_from_geometry(&mut prim, Owner::Point, "w", &dense, TimeCode::new(1.0), false)
        .unwrap());
    assert!(!wrapper
        .update_primvar_from_geometry(&mut prim, Owner::Point, "w", &broadcast, TimeCode::new(2.0), false)
        .unwrap());
}

#[test]
fn test_owners_tracked_separately() {
    let mut wrapper = PrimWrapper::new("/m", SchemaKind::Mesh);
    let mut prim = MemPrim::new("/m", "Mesh");
    let a = DataArray::from_vec(vec![1i32, 2], 1);

    wrapper
        .update_primvar_from_geometry(&mut prim, Owner::Point, "id", &a, TimeCode::new(1.0), false)
        .unwrap();
    let key = AttributeKey::new(Owner::Point, "id");
    assert!(wrapper.history().get(&key).is_some());
    assert!(wrapper.history().get(&AttributeKey::new(Owner::Primitive, "id")).is_none());
}

#[test]
fn test_identity_transform_elision() {
    let mut wrapper = PrimWrapper::new("/World/xf", SchemaKind::Xform);
    let mut prim = MemPrim::new("/World/xf", "Xform");

    let authored = wrapper
        .update_transform(&mut prim, &DMat4::IDENTITY, TimeCode::new(1.0))
        .expect("Failed to update transform");
    assert!(!authored);
    assert!(prim.xform_samples().is_empty());

    let moved = DMat4::from_translation(DVec3::new(0.0, 2.0, 0.0));
    assert!(wrapper.update_transform(&mut prim, &moved, TimeCode::new(2.0)).unwrap());
    assert_eq!(prim.xform_samples().len(), 1);
    assert_eq!(prim.xform_samples()[0], (TimeCode::new(2.0), moved));
}

#[test]
fn test_forced_transforms_from_options() {
    let options = SyncOptions {
        force_transforms: true,
        ..Default::default()
    };
    let mut wrapper = PrimWrapper::new("/xf", SchemaKind::Xform).with_options(options);
    let mut prim = MemPrim::new("/xf", "Xform");

    for t in frames(3) {
        assert!(wrapper.update_transform(&mut prim, &DMat4::IDENTITY, t).unwrap());
    }
    assert_eq!(prim.xform_samples().len(), 3);
}

#[test]
fn test_stronger_layer_cleared_before_first_transform() {
    let mut wrapper = PrimWrapper::new("/xf", SchemaKind::Xform);
    let mut prim = MemPrim::new("/xf", "Xform").with_layering(false, true);
    let moved = DMat4::from_scale(DVec3::splat(2.0));

    wrapper.update_transform(&mut prim, &moved, TimeCode::new(1.0)).unwrap();
    assert_eq!(prim.stronger_clears(), 1);
    assert!(!prim.has_stronger_xform_ops());

    wrapper.clear_caches();
    assert!(!wrapper.xform_cache().has_authored());
}
