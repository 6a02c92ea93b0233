//! End-to-end import of GLB and glTF inputs.

mod common;

use std::fs;
use std::sync::Arc;

use common::{chunk, glb, init_logger, Fixture};
use gltf_import_core::{EntityKind, GltfError};
use gltf_import_io::container::{GLB_CHUNK_BIN, GLB_CHUNK_JSON};
use gltf_import_io::{import, import_slice, import_with, ContainerFormat, EmbeddedOnly, ImportOptions};
use serde_json::json;

fn triangle_scene(indices: Option<&[u16]>) -> Fixture {
    let mut fixture = Fixture::new();
    let position = fixture.triangle_positions();
    let mut primitive = json!({"attributes": {"POSITION": position}});
    if let Some(indices) = indices {
        primitive["indices"] = json!(fixture.accessor_u16(indices));
    }
    fixture
        .set("meshes", json!([{"name": "Tri", "primitives": [primitive]}]))
        .set("nodes", json!([{"mesh": 0, "translation": [1.0, 2.0, 3.0]}]))
        .set("scenes", json!([{"nodes": [0]}]));
    fixture
}

#[test]
fn glb_and_text_import_identically() {
    init_logger();
    let fixture = triangle_scene(Some(&[0, 1, 2]));
    let options = ImportOptions::default();

    let from_glb = import_slice(&fixture.to_glb(), &EmbeddedOnly, &options).unwrap();
    let from_text = import_slice(&fixture.to_gltf(), &EmbeddedOnly, &options).unwrap();

    assert_eq!(from_glb.format(), ContainerFormat::Glb { version: 2 });
    assert_eq!(from_text.format(), ContainerFormat::Json);
    assert_eq!(from_glb.meshes(), from_text.meshes());
    assert_eq!(from_glb.scenes(), from_text.scenes());
    assert_eq!(from_glb.buffers()[0].byte_length(), from_text.buffers()[0].byte_length());
}

#[test]
fn missing_indices_become_identity() {
    let fixture = triangle_scene(None);
    let gltf = import_slice(&fixture.to_glb(), &EmbeddedOnly, &ImportOptions::default()).unwrap();
    let primitive = &gltf.meshes()[0].primitives[0];
    assert_eq!(primitive.indices, vec![0, 1, 2]);
    assert_eq!(primitive.vertex_count(), 3);
}

#[test]
fn unsigned_short_indices_decode() {
    let mut fixture = Fixture::new();
    let position = fixture.accessor_f32(&[0.0; 12], "VEC3");
    let indices = fixture.accessor_u16(&[1, 2, 3]);
    fixture.set(
        "meshes",
        json!([{"primitives": [{"attributes": {"POSITION": position}, "indices": indices}]}]),
    );
    let gltf = import_slice(&fixture.to_glb(), &EmbeddedOnly, &ImportOptions::default()).unwrap();
    assert_eq!(gltf.meshes()[0].primitives[0].indices, vec![1, 2, 3]);
    assert_eq!(gltf.accessor(indices).unwrap().len(), 3);
}

#[test]
fn dangling_buffer_view_is_fatal() {
    let mut fixture = triangle_scene(None);
    fixture.push_view(&[0; 4]);
    fixture.push_view(&[0; 4]);
    fixture.json_mut()["accessors"]
        .as_array_mut()
        .unwrap()
        .push(json!({"bufferView": 99, "componentType": 5126, "count": 1, "type": "SCALAR"}));

    let err = import_slice(&fixture.to_glb(), &EmbeddedOnly, &ImportOptions::default()).unwrap_err();
    assert!(err.is_structural());
    assert!(matches!(
        err,
        GltfError::IndexOutOfBounds {
            kind: EntityKind::BufferView,
            index: 99,
            len: 3
        }
    ));
}

#[test]
fn extra_binary_chunk_is_rejected() {
    let json = br#"{"asset":{"version":"2.0"},"buffers":[{"byteLength":4}]}"#;
    let data = glb(&[
        chunk(GLB_CHUNK_JSON, json, b' '),
        chunk(GLB_CHUNK_BIN, &[0; 4], 0),
        chunk(GLB_CHUNK_BIN, &[0; 4], 0),
    ]);
    assert!(matches!(
        import_slice(&data, &EmbeddedOnly, &ImportOptions::default()),
        Err(GltfError::BufferCountMismatch { chunks: 2, buffers: 1 })
    ));
}

#[test]
fn external_buffer_beside_document() {
    let fixture = triangle_scene(Some(&[2, 1, 0]));
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("scene data.bin"), fixture.bin()).unwrap();
    let path = dir.path().join("scene.gltf");
    fs::write(&path, fixture.to_gltf_external("scene%20data.bin")).unwrap();

    let gltf = import(&path).unwrap();
    assert_eq!(gltf.meshes()[0].primitives[0].indices, vec![2, 1, 0]);
    assert_eq!(gltf.meshes()[0].display_name(), "Tri");
}

#[test]
fn external_buffer_from_base_path() {
    let fixture = triangle_scene(None);
    let docs = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    fs::write(data.path().join("tri.bin"), fixture.bin()).unwrap();
    let path = docs.path().join("tri.gltf");
    fs::write(&path, fixture.to_gltf_external("tri.bin")).unwrap();

    assert!(matches!(import(&path), Err(GltfError::Io(_))));

    let options = ImportOptions::default().with_base_path(data.path());
    let gltf = import_with(&path, &options).unwrap();
    assert_eq!(gltf.meshes()[0].primitives[0].vertex_count(), 3);
}

#[test]
fn accessors_decode_once_on_demand() {
    let mut fixture = triangle_scene(None);
    let unused = fixture.accessor_f32(&[1.0, 2.0], "SCALAR");
    let gltf = import_slice(&fixture.to_glb(), &EmbeddedOnly, &ImportOptions::default()).unwrap();
    assert_eq!(gltf.decoded_accessor_count(), 1);

    let first = gltf.accessor(unused).unwrap();
    let second = gltf.accessor(unused).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(gltf.decoded_accessor_count(), 2);
    assert_eq!(first.as_f32().unwrap().as_flat(), &[1.0, 2.0]);
}

#[test]
fn node_transform_converts_to_z_up() {
    let fixture = triangle_scene(None);
    let gltf = import_slice(&fixture.to_glb(), &EmbeddedOnly, &ImportOptions::default()).unwrap();
    let node = gltf.root_scene().node(0).unwrap();
    let srt = node.transform.converted(gltf.axis_conversion());
    assert_eq!(srt.translation, glam::Vec3::new(1.0, -3.0, 2.0));
}

#[test]
fn unreferenced_accessor_range_is_fatal() {
    let mut fixture = triangle_scene(None);
    let view = fixture.push_view(&[0; 4]);
    fixture.json_mut()["accessors"]
        .as_array_mut()
        .unwrap()
        .push(json!({"bufferView": view, "componentType": 5126, "count": 1000, "type": "MAT4"}));

    let err = import_slice(&fixture.to_glb(), &EmbeddedOnly, &ImportOptions::default()).unwrap_err();
    assert!(err.is_structural());
    assert!(matches!(
        err,
        GltfError::AccessorOutOfBounds {
            accessor: 1,
            required: 64000,
            available: 4
        }
    ));
}
