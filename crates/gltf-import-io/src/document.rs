//! Typed glTF JSON document.
//!
//! Every struct keeps the keys it does not read in `unknown`, so the graph
//! builder can report them. The document is read-only once parsed.

use std::collections::BTreeMap;

use gltf_import_core::{Diagnostics, EntityKind, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Keys not recognized by the importer.
pub type UnknownFields = Map<String, Value>;

// ============================================================================
// Root
// ============================================================================

/// The root JSON object of a glTF asset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub asset: Option<GltfAsset>,
    /// Default scene index (if present).
    pub scene: Option<usize>,
    #[serde(default)]
    pub scenes: Vec<GltfScene>,
    #[serde(default)]
    pub nodes: Vec<GltfNode>,
    #[serde(default)]
    pub meshes: Vec<GltfMesh>,
    #[serde(default)]
    pub accessors: Vec<GltfAccessor>,
    #[serde(default)]
    pub buffer_views: Vec<GltfBufferView>,
    #[serde(default)]
    pub buffers: Vec<GltfBuffer>,
    #[serde(default)]
    pub materials: Vec<GltfMaterial>,
    #[serde(default)]
    pub textures: Vec<GltfTexture>,
    #[serde(default)]
    pub images: Vec<GltfImage>,
    #[serde(default)]
    pub samplers: Vec<GltfSampler>,
    #[serde(default)]
    pub animations: Vec<GltfAnimation>,
    #[serde(default)]
    pub skins: Vec<GltfSkin>,
    #[serde(default)]
    pub cameras: Vec<GltfCamera>,
    #[serde(default)]
    pub extensions_used: Vec<String>,
    #[serde(default)]
    pub extensions_required: Vec<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfAsset {
    #[serde(default)]
    pub version: String,
    pub min_version: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

// ============================================================================
// Scene graph
// ============================================================================

/// A glTF scene containing root node indices.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfScene {
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<usize>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// A glTF node in the scene graph.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfNode {
    pub name: Option<String>,
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub skin: Option<usize>,
    #[serde(default)]
    pub children: Vec<usize>,
    /// 4x4 transformation matrix (column-major).
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    /// Rotation quaternion [x, y, z, w].
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    /// Morph weights overriding the mesh defaults.
    #[serde(default)]
    pub weights: Vec<f32>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfMesh {
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<GltfPrimitive>,
    /// Default morph target weights.
    #[serde(default)]
    pub weights: Vec<f32>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfPrimitive {
    #[serde(default)]
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: Option<u32>,
    #[serde(default)]
    pub targets: Vec<BTreeMap<String, usize>>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfAccessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    #[serde(default)]
    pub normalized: bool,
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: String,
    #[serde(default)]
    pub min: Vec<f64>,
    #[serde(default)]
    pub max: Vec<f64>,
    /// Sparse substitution block; only its presence is read.
    pub sparse: Option<Value>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfBufferView {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<u32>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfBuffer {
    pub byte_length: usize,
    pub uri: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

// ============================================================================
// Materials and textures
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfMaterial {
    pub name: Option<String>,
    pub pbr_metallic_roughness: Option<GltfPbr>,
    pub emissive_texture: Option<GltfTextureInfo>,
    pub emissive_factor: Option<[f32; 3]>,
    #[serde(default)]
    pub double_sided: bool,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfPbr {
    pub base_color_factor: Option<[f32; 4]>,
    pub base_color_texture: Option<GltfTextureInfo>,
    pub metallic_factor: Option<f32>,
    pub roughness_factor: Option<f32>,
    pub metallic_roughness_texture: Option<GltfTextureInfo>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfTextureInfo {
    pub index: usize,
    #[serde(default)]
    pub tex_coord: u32,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfTexture {
    pub name: Option<String>,
    pub sampler: Option<usize>,
    pub source: Option<usize>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfImage {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: Option<usize>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfSampler {
    pub name: Option<String>,
    pub mag_filter: Option<u32>,
    pub min_filter: Option<u32>,
    pub wrap_s: Option<u32>,
    pub wrap_t: Option<u32>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

// ============================================================================
// Cameras, skins and animations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfCamera {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub camera_type: String,
    pub perspective: Option<GltfPerspective>,
    pub orthographic: Option<GltfOrthographic>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfPerspective {
    pub aspect_ratio: Option<f32>,
    pub yfov: f32,
    pub zfar: Option<f32>,
    pub znear: f32,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfOrthographic {
    pub xmag: f32,
    pub ymag: f32,
    pub zfar: f32,
    pub znear: f32,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfSkin {
    pub name: Option<String>,
    pub inverse_bind_matrices: Option<usize>,
    pub skeleton: Option<usize>,
    #[serde(default)]
    pub joints: Vec<usize>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfAnimation {
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<GltfChannel>,
    #[serde(default)]
    pub samplers: Vec<GltfAnimationSampler>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfChannel {
    pub sampler: usize,
    pub target: GltfChannelTarget,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfChannelTarget {
    pub node: Option<usize>,
    pub path: String,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfAnimationSampler {
    pub input: usize,
    pub output: usize,
    pub interpolation: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

// ============================================================================
// Parsing and unknown-field reporting
// ============================================================================

impl Document {
    /// Parses a document from UTF-8 JSON bytes.
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Reports every unrecognized key in the document, plus each declared
    /// extension, as diagnostics.
    pub fn report_unknown_fields(&self, diagnostics: &mut Diagnostics) {
        diagnostics.report_unknown_fields(EntityKind::Document, None, &self.unknown);
        if let Some(asset) = &self.asset {
            diagnostics.report_unknown_fields(EntityKind::Document, None, &asset.unknown);
        }
        for name in self.extensions_used.iter().filter(|n| !n.is_empty()) {
            diagnostics.unsupported(EntityKind::Document, None, format!("extension {}", name));
        }
        for name in self.extensions_required.iter().filter(|n| !n.is_empty()) {
            diagnostics.unsupported(EntityKind::Document, None, format!("required extension {}", name));
        }

        for (i, scene) in self.scenes.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Scene, Some(i), &scene.unknown);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Node, Some(i), &node.unknown);
        }
        for (i, mesh) in self.meshes.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Mesh, Some(i), &mesh.unknown);
            for primitive in &mesh.primitives {
                diagnostics.report_unknown_fields(EntityKind::Primitive, Some(i), &primitive.unknown);
            }
        }
        for (i, accessor) in self.accessors.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Accessor, Some(i), &accessor.unknown);
        }
        for (i, view) in self.buffer_views.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::BufferView, Some(i), &view.unknown);
        }
        for (i, buffer) in self.buffers.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Buffer, Some(i), &buffer.unknown);
        }
        for (i, material) in self.materials.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Material, Some(i), &material.unknown);
            if let Some(pbr) = &material.pbr_metallic_roughness {
                diagnostics.report_unknown_fields(EntityKind::Pbr, Some(i), &pbr.unknown);
                for info in [&pbr.base_color_texture, &pbr.metallic_roughness_texture]
                    .into_iter()
                    .flatten()
                {
                    diagnostics.report_unknown_fields(EntityKind::Pbr, Some(i), &info.unknown);
                }
            }
            if let Some(info) = &material.emissive_texture {
                diagnostics.report_unknown_fields(EntityKind::Material, Some(i), &info.unknown);
            }
        }
        for (i, texture) in self.textures.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Texture, Some(i), &texture.unknown);
        }
        for (i, image) in self.images.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Image, Some(i), &image.unknown);
        }
        for (i, sampler) in self.samplers.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Sampler, Some(i), &sampler.unknown);
        }
        for (i, camera) in self.cameras.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Camera, Some(i), &camera.unknown);
            if let Some(p) = &camera.perspective {
                diagnostics.report_unknown_fields(EntityKind::Camera, Some(i), &p.unknown);
            }
            if let Some(o) = &camera.orthographic {
                diagnostics.report_unknown_fields(EntityKind::Camera, Some(i), &o.unknown);
            }
        }
        for (i, skin) in self.skins.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Skin, Some(i), &skin.unknown);
        }
        for (i, animation) in self.animations.iter().enumerate() {
            diagnostics.report_unknown_fields(EntityKind::Animation, Some(i), &animation.unknown);
            for channel in &animation.channels {
                diagnostics.report_unknown_fields(EntityKind::Channel, Some(i), &channel.unknown);
                diagnostics.report_unknown_fields(EntityKind::Channel, Some(i), &channel.target.unknown);
            }
            for sampler in &animation.samplers {
                diagnostics.report_unknown_fields(EntityKind::AnimationSampler, Some(i), &sampler.unknown);
            }
        }
    }
}
