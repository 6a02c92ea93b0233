//! Reference graph builder.
//!
//! Turns a parsed [`Container`] into a fully resolved [`Gltf`]: every index
//! reference is checked, meshes and skins are decoded, scenes are walked and
//! animation channels are attached to the nodes they drive.
//!
//! Resolution runs leaf-first: buffer views, accessor layouts, images and
//! textures, meshes (materials on demand), skins, cameras, scenes, then
//! animations. Accessors are decoded lazily through a per-import cache.

use std::collections::HashSet;
use std::sync::Arc;

use glam::Mat4;
use gltf_import_core::{
    decode_accessor, AccessorCache, AccessorData, AccessorLayout, AccessorType, AxisConversion, Buffer, BufferView,
    ComponentType, Diagnostics, EntityKind, GltfError, Resolve, Result,
};
use log::{debug, info};

use crate::animation::{Animation, Channel, Interpolation, Keyframes, TargetPath};
use crate::camera::Camera;
use crate::check_index;
use crate::container::{Container, ContainerFormat};
use crate::document::{Document, GltfAnimation, GltfPrimitive, GltfSkin};
use crate::material::{Image, ImageSource, Material, Texture};
use crate::mesh::{Attributes, Mesh, MorphTarget, Primitive, PrimitiveMode, Semantic};
use crate::scene::Scene;
use crate::skin::Skin;
use crate::ImportOptions;

// ============================================================================
// Binary data
// ============================================================================

/// Buffers, views and accessor layouts, with lazily decoded accessors.
#[derive(Debug)]
struct DataStore {
    buffers: Vec<Buffer>,
    views: Vec<BufferView>,
    layouts: Vec<AccessorLayout>,
    cache: AccessorCache,
}

impl DataStore {
    fn accessor(&self, index: usize) -> Result<Arc<AccessorData>> {
        self.cache.get_or_decode(index, || {
            let layout = self.layouts.resolve(index, EntityKind::Accessor)?;
            decode_accessor(index, layout, &self.views, &self.buffers)
        })
    }

    fn layout(&self, index: usize) -> Result<&AccessorLayout> {
        self.layouts.resolve(index, EntityKind::Accessor)
    }
}

fn resolve_views(document: &Document, buffers: &[Buffer]) -> Result<Vec<BufferView>> {
    document
        .buffer_views
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let view = BufferView {
                buffer: def.buffer,
                byte_offset: def.byte_offset,
                byte_length: def.byte_length,
                byte_stride: def.byte_stride,
            };
            view.bytes(i, buffers)?;
            Ok(view)
        })
        .collect()
}

fn resolve_layouts(
    document: &Document,
    views: &[BufferView],
    diagnostics: &mut Diagnostics,
) -> Result<Vec<AccessorLayout>> {
    let mut layouts = Vec::with_capacity(document.accessors.len());
    for (i, def) in document.accessors.iter().enumerate() {
        let component_type = ComponentType::from_code(def.component_type).ok_or_else(|| {
            GltfError::InvalidGltf(format!("accessor {} has unknown componentType {}", i, def.component_type))
        })?;
        let accessor_type = AccessorType::parse(&def.accessor_type).ok_or_else(|| {
            GltfError::InvalidGltf(format!("accessor {} has unknown type '{}'", i, def.accessor_type))
        })?;
        if def.normalized {
            diagnostics.unsupported(EntityKind::Accessor, Some(i), "normalized integers are decoded unscaled");
        }
        if def.sparse.is_some() {
            diagnostics.unsupported(EntityKind::Accessor, Some(i), "sparse values are not substituted");
        }
        let layout = AccessorLayout {
            buffer_view: def.buffer_view,
            byte_offset: def.byte_offset,
            component_type,
            accessor_type,
            count: def.count,
            normalized: def.normalized,
            sparse: def.sparse.is_some(),
        };
        layout.validate(i, views)?;
        layouts.push(layout);
    }
    Ok(layouts)
}

// ============================================================================
// Resolved graph
// ============================================================================

/// A fully resolved glTF asset.
///
/// Scenes are ordered root first. Entity arrays keep their document order,
/// so the indices stored on nodes and primitives index straight into them.
#[derive(Debug)]
pub struct Gltf {
    document: Document,
    format: ContainerFormat,
    data: DataStore,
    textures: Vec<Texture>,
    images: Vec<Image>,
    materials: Vec<Option<Arc<Material>>>,
    default_material: Arc<Material>,
    meshes: Vec<Mesh>,
    skins: Vec<Skin>,
    cameras: Vec<Camera>,
    scenes: Vec<Scene>,
    animations: Vec<Animation>,
    diagnostics: Diagnostics,
    axis: AxisConversion,
}

impl Gltf {
    /// The scene to import: the document's `scene`, or the first scene.
    pub fn root_scene(&self) -> &Scene {
        &self.scenes[0]
    }

    /// All built scenes, root first. Secondary scenes follow in document
    /// order unless disabled in [`ImportOptions`].
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    pub fn skin(&self, index: usize) -> Option<&Skin> {
        self.skins.get(index)
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn camera(&self, index: usize) -> Option<&Camera> {
        self.cameras.get(index)
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn animation(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }

    /// Material `index`, if any primitive uses it.
    pub fn material(&self, index: usize) -> Option<&Arc<Material>> {
        self.materials.get(index)?.as_ref()
    }

    /// The material shared by primitives that name none and carry no
    /// vertex colors.
    pub fn default_material(&self) -> &Arc<Material> {
        &self.default_material
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Encoded bytes of an image stored in a buffer view. URI images yield
    /// `None`.
    pub fn image_data(&self, index: usize) -> Result<Option<&[u8]>> {
        let image = self.images.resolve(index, EntityKind::Image)?;
        match &image.source {
            ImageSource::BufferView { view, .. } => {
                let bytes = self
                    .data
                    .views
                    .resolve(*view, EntityKind::BufferView)?
                    .bytes(*view, &self.data.buffers)?;
                Ok(Some(bytes))
            }
            ImageSource::Uri(_) => Ok(None),
        }
    }

    /// Decodes accessor `index`, or returns the cached decode.
    pub fn accessor(&self, index: usize) -> Result<Arc<AccessorData>> {
        self.data.accessor(index)
    }

    /// Number of accessors decoded so far.
    pub fn decoded_accessor_count(&self) -> usize {
        self.data.cache.decoded_count()
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.data.buffers
    }

    pub fn buffer_views(&self) -> &[BufferView] {
        &self.data.views
    }

    /// Non-fatal findings collected while parsing and resolving.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The axis conversion this asset was imported with.
    pub fn axis_conversion(&self) -> AxisConversion {
        self.axis
    }

    /// The parsed JSON document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }
}

/// Resolves a parsed container into a [`Gltf`].
pub(crate) fn build(container: Container, mut diagnostics: Diagnostics, options: &ImportOptions) -> Result<Gltf> {
    let Container {
        format,
        document,
        buffers,
    } = container;

    document.report_unknown_fields(&mut diagnostics);

    let views = resolve_views(&document, &buffers)?;
    let layouts = resolve_layouts(&document, &views, &mut diagnostics)?;
    let data = DataStore {
        cache: AccessorCache::new(layouts.len()),
        buffers,
        views,
        layouts,
    };

    let resolved = Builder::new(&document, &data, diagnostics).run(options)?;

    info!(
        "Imported {} scene(s), {} mesh(es), {} skin(s), {} animation(s) with {} diagnostic(s)",
        resolved.scenes.len(),
        resolved.meshes.len(),
        resolved.skins.len(),
        resolved.animations.len(),
        resolved.diagnostics.len()
    );

    Ok(Gltf {
        document,
        format,
        data,
        textures: resolved.textures,
        images: resolved.images,
        materials: resolved.materials,
        default_material: resolved.default_material,
        meshes: resolved.meshes,
        skins: resolved.skins,
        cameras: resolved.cameras,
        scenes: resolved.scenes,
        animations: resolved.animations,
        diagnostics: resolved.diagnostics,
        axis: options.axis_conversion,
    })
}

// ============================================================================
// Builder
// ============================================================================

struct Resolved {
    textures: Vec<Texture>,
    images: Vec<Image>,
    materials: Vec<Option<Arc<Material>>>,
    default_material: Arc<Material>,
    meshes: Vec<Mesh>,
    skins: Vec<Skin>,
    cameras: Vec<Camera>,
    scenes: Vec<Scene>,
    animations: Vec<Animation>,
    diagnostics: Diagnostics,
}

struct Builder<'a> {
    document: &'a Document,
    data: &'a DataStore,
    textures: Vec<Texture>,
    materials: Vec<Option<Arc<Material>>>,
    default_material: Arc<Material>,
    diagnostics: Diagnostics,
}

impl<'a> Builder<'a> {
    fn new(document: &'a Document, data: &'a DataStore, diagnostics: Diagnostics) -> Self {
        Self {
            document,
            data,
            textures: Vec::new(),
            materials: vec![None; document.materials.len()],
            default_material: Arc::new(Material::default_material()),
            diagnostics,
        }
    }

    fn run(mut self, options: &ImportOptions) -> Result<Resolved> {
        let document = self.document;

        let images = document
            .images
            .iter()
            .enumerate()
            .map(|(i, def)| Image::from_def(i, def, self.data.views.len()))
            .collect::<Result<Vec<_>>>()?;
        self.textures = document
            .textures
            .iter()
            .enumerate()
            .map(|(i, def)| Texture::from_def(i, def, images.len(), document.samplers.len()))
            .collect::<Result<Vec<_>>>()?;
        self.check_references()?;

        let meshes = document
            .meshes
            .iter()
            .enumerate()
            .map(|(i, def)| {
                debug!("Mesh {} ({} primitives)", i, def.primitives.len());
                let primitives = def
                    .primitives
                    .iter()
                    .map(|p| self.primitive(i, p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Mesh {
                    index: i,
                    name: def.name.clone(),
                    primitives,
                    weights: def.weights.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let skins = document
            .skins
            .iter()
            .enumerate()
            .map(|(i, def)| self.skin(i, def))
            .collect::<Result<Vec<_>>>()?;

        let cameras = document
            .cameras
            .iter()
            .enumerate()
            .map(|(i, def)| Camera::from_def(i, def))
            .collect::<Result<Vec<_>>>()?;

        self.check_node_references(meshes.len(), cameras.len(), skins.len())?;

        let mut scenes = self.scenes(options)?;
        for scene in &mut scenes {
            mark_skin_roots(scene, &skins);
        }

        let animations = document
            .animations
            .iter()
            .enumerate()
            .map(|(i, def)| self.animation(i, def, &skins, &mut scenes))
            .collect::<Result<Vec<_>>>()?;

        Ok(Resolved {
            textures: self.textures,
            images,
            materials: self.materials,
            default_material: self.default_material,
            meshes,
            skins,
            cameras,
            scenes,
            animations,
            diagnostics: self.diagnostics,
        })
    }

    // ------------------------------------------------------------------------
    // Meshes
    // ------------------------------------------------------------------------

    fn primitive(&mut self, mesh: usize, def: &GltfPrimitive) -> Result<Primitive> {
        let mut attributes = Attributes::new();
        for (name, &accessor) in &def.attributes {
            match Semantic::parse(name) {
                Some(semantic) => {
                    attributes.insert(semantic, self.data.accessor(accessor)?);
                }
                None => self.diagnostics.unknown_attribute(EntityKind::Primitive, Some(mesh), name),
            }
        }

        let vertex_count = attributes.get(&Semantic::Position).map(|p| p.len());
        let indices = match (def.indices, vertex_count) {
            (Some(accessor), _) => self.data.accessor(accessor)?.to_indices().ok_or_else(|| {
                GltfError::InvalidGltf(format!(
                    "mesh {} uses accessor {} as indices but it is not an unsigned integer scalar",
                    mesh, accessor
                ))
            })?,
            (None, Some(count)) => (0..count as u32).collect(),
            (None, None) => {
                return Err(GltfError::InvalidGltf(format!(
                    "mesh {} has a primitive with neither POSITION nor indices",
                    mesh
                )))
            }
        };
        if let Some(count) = vertex_count {
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= count) {
                self.diagnostics.degraded(
                    EntityKind::Primitive,
                    Some(mesh),
                    format!("index {} exceeds vertex count {}", bad, count),
                );
            }
        }

        let mode = match def.mode {
            Some(code) => PrimitiveMode::from_code(code)
                .ok_or_else(|| GltfError::InvalidGltf(format!("mesh {} has unknown primitive mode {}", mesh, code)))?,
            None => PrimitiveMode::default(),
        };

        let material = match def.material {
            Some(index) => self.material(index)?,
            None if attributes.contains_key(&Semantic::Color(0)) => Arc::new(Material::vertex_color()),
            None => Arc::clone(&self.default_material),
        };

        let mut targets = Vec::with_capacity(def.targets.len());
        for target in &def.targets {
            let mut displaced = Attributes::new();
            for (name, &accessor) in target {
                match Semantic::parse(name).filter(|s| s.is_morphable()) {
                    Some(semantic) => {
                        displaced.insert(semantic, self.data.accessor(accessor)?);
                    }
                    None => self.diagnostics.unknown_attribute(EntityKind::Primitive, Some(mesh), name),
                }
            }
            targets.push(MorphTarget { attributes: displaced });
        }

        Ok(Primitive {
            attributes,
            indices,
            material,
            mode,
            targets,
        })
    }

    /// Material `index`, built on first use and shared afterwards.
    fn material(&mut self, index: usize) -> Result<Arc<Material>> {
        let def = self.document.materials.resolve(index, EntityKind::Material)?;
        if let Some(material) = &self.materials[index] {
            return Ok(Arc::clone(material));
        }
        debug!("Material {}", index);
        let material = Arc::new(Material::from_def(index, def, &self.textures)?);
        self.materials[index] = Some(Arc::clone(&material));
        Ok(material)
    }

    // ------------------------------------------------------------------------
    // Skins and node references
    // ------------------------------------------------------------------------

    fn skin(&mut self, index: usize, def: &GltfSkin) -> Result<Skin> {
        let nodes = self.document.nodes.len();
        for &joint in &def.joints {
            check_index(EntityKind::Node, joint, nodes)?;
        }
        if let Some(skeleton) = def.skeleton {
            check_index(EntityKind::Node, skeleton, nodes)?;
        }

        let mut inverse_bind_matrices = Vec::with_capacity(def.joints.len());
        if let Some(accessor) = def.inverse_bind_matrices {
            if self.data.layout(accessor)?.accessor_type != AccessorType::Mat4 {
                return Err(GltfError::InvalidGltf(format!(
                    "skin {} inverseBindMatrices accessor {} is not MAT4",
                    index, accessor
                )));
            }
            let matrices = self.data.accessor(accessor)?.to_f32();
            if matrices.len() != def.joints.len() {
                self.diagnostics.degraded(
                    EntityKind::Skin,
                    Some(index),
                    format!("{} inverse bind matrices for {} joints", matrices.len(), def.joints.len()),
                );
            }
            inverse_bind_matrices.extend(matrices.iter().take(def.joints.len()).map(Mat4::from_cols_slice));
        }
        inverse_bind_matrices.resize(def.joints.len(), Mat4::IDENTITY);

        debug!("Skin {} ({} joints)", index, def.joints.len());
        Ok(Skin {
            index,
            name: def.name.clone(),
            joints: def.joints.clone(),
            skeleton: def.skeleton,
            inverse_bind_matrices,
        })
    }

    /// Checks references that are otherwise only followed on demand:
    /// material textures, sampler accessors and scene roots.
    fn check_references(&self) -> Result<()> {
        let document = self.document;
        for material in &document.materials {
            let pbr = material.pbr_metallic_roughness.as_ref();
            let infos = [
                pbr.and_then(|p| p.base_color_texture.as_ref()),
                pbr.and_then(|p| p.metallic_roughness_texture.as_ref()),
                material.emissive_texture.as_ref(),
            ];
            for info in infos.into_iter().flatten() {
                check_index(EntityKind::Texture, info.index, self.textures.len())?;
            }
        }
        let accessors = self.data.layouts.len();
        for animation in &document.animations {
            for sampler in &animation.samplers {
                check_index(EntityKind::Accessor, sampler.input, accessors)?;
                check_index(EntityKind::Accessor, sampler.output, accessors)?;
            }
        }
        for scene in &document.scenes {
            for &node in &scene.nodes {
                check_index(EntityKind::Node, node, document.nodes.len())?;
            }
        }
        Ok(())
    }

    fn check_node_references(&self, meshes: usize, cameras: usize, skins: usize) -> Result<()> {
        let nodes = self.document.nodes.len();
        for node in &self.document.nodes {
            if let Some(mesh) = node.mesh {
                check_index(EntityKind::Mesh, mesh, meshes)?;
            }
            if let Some(camera) = node.camera {
                check_index(EntityKind::Camera, camera, cameras)?;
            }
            if let Some(skin) = node.skin {
                check_index(EntityKind::Skin, skin, skins)?;
            }
            for &child in &node.children {
                check_index(EntityKind::Node, child, nodes)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Scenes
    // ------------------------------------------------------------------------

    fn scenes(&self, options: &ImportOptions) -> Result<Vec<Scene>> {
        let document = self.document;

        if document.scenes.is_empty() {
            let children: HashSet<usize> = document.nodes.iter().flat_map(|n| n.children.iter().copied()).collect();
            let roots: Vec<usize> = (0..document.nodes.len()).filter(|i| !children.contains(i)).collect();
            debug!("No scenes declared; using {} parentless node(s) as roots", roots.len());
            return Ok(vec![Scene::build(None, None, roots, &document.nodes)?]);
        }

        let root = document.scene.unwrap_or(0);
        check_index(EntityKind::Scene, root, document.scenes.len())?;

        let mut order = vec![root];
        if options.secondary_scenes {
            order.extend((0..document.scenes.len()).filter(|&i| i != root));
        }

        order
            .into_iter()
            .map(|i| {
                let def = &document.scenes[i];
                debug!("Scene {} ({} root nodes)", i, def.nodes.len());
                Scene::build(Some(i), def.name.clone(), def.nodes.clone(), &document.nodes)
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Animations
    // ------------------------------------------------------------------------

    fn animation(
        &mut self,
        index: usize,
        def: &GltfAnimation,
        skins: &[Skin],
        scenes: &mut [Scene],
    ) -> Result<Animation> {
        let mut channels = Vec::with_capacity(def.channels.len());

        for (c, channel_def) in def.channels.iter().enumerate() {
            let sampler = def.samplers.resolve(channel_def.sampler, EntityKind::AnimationSampler)?;

            let Some(node) = channel_def.target.node else {
                self.diagnostics
                    .unsupported(EntityKind::Channel, Some(index), format!("channel {} has no target node", c));
                continue;
            };
            check_index(EntityKind::Node, node, self.document.nodes.len())?;

            let Some(path) = TargetPath::parse(&channel_def.target.path) else {
                self.diagnostics.unsupported(
                    EntityKind::Channel,
                    Some(index),
                    format!("channel {} targets path '{}'", c, channel_def.target.path),
                );
                continue;
            };

            let interpolation = match sampler.interpolation.as_deref() {
                None => Interpolation::default(),
                Some(name) => Interpolation::parse(name).unwrap_or_else(|| {
                    self.diagnostics.unsupported(
                        EntityKind::AnimationSampler,
                        Some(index),
                        format!("interpolation '{}', using LINEAR", name),
                    );
                    Interpolation::default()
                }),
            };

            let input = self.data.accessor(sampler.input)?;
            let times = input.as_f32().filter(|e| e.components() == 1).ok_or_else(|| {
                GltfError::InvalidGltf(format!(
                    "animation {} sampler input accessor {} is not a float scalar",
                    index, sampler.input
                ))
            })?;
            let values = self.data.accessor(sampler.output)?.to_f32().into_flat();

            let (keyframes, mismatched) = Keyframes::from_samples(path, interpolation, times.as_flat(), &values);
            if mismatched {
                self.diagnostics.degraded(
                    EntityKind::Channel,
                    Some(index),
                    format!(
                        "channel {}: {} output values for {} keyframes, kept {}",
                        c,
                        values.len(),
                        times.len(),
                        keyframes.len()
                    ),
                );
            }

            let channel = Arc::new(Channel {
                animation: index,
                index: c,
                node,
                path,
                interpolation,
                keyframes,
            });

            let is_joint = skins.iter().any(|s| s.contains_joint(node))
                || scenes.iter().any(|s| s.node(node).is_some_and(|n| n.is_joint));
            if is_joint && channel.has_non_uniform_scale() {
                self.diagnostics.unsupported(
                    EntityKind::Channel,
                    Some(index),
                    format!("channel {}: non-uniform scale on joint node {}", c, node),
                );
            }

            let mut attached = false;
            for scene in scenes.iter_mut() {
                if let Some(target) = scene.node_mut(node) {
                    target.set_anim(index, Arc::clone(&channel));
                    attached = true;
                }
            }
            if !attached {
                self.diagnostics.degraded(
                    EntityKind::Channel,
                    Some(index),
                    format!("channel {} targets node {} which is in no scene", c, node),
                );
            }

            channels.push(channel);
        }

        debug!("Animation {} ({} of {} channels)", index, channels.len(), def.channels.len());
        Ok(Animation {
            index,
            name: def.name.clone(),
            channels,
        })
    }
}

/// Marks each skin's detached skeleton root as a joint in `scene`.
fn mark_skin_roots(scene: &mut Scene, skins: &[Skin]) {
    for skin in skins {
        if let Some(root) = skin.detached_root() {
            if let Some(node) = scene.node_mut(root) {
                debug!("Node {} is the skeleton root of skin {}", root, skin.index);
                node.is_joint = true;
                node.joint_skin = Some(skin.index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::EmbeddedOnly;

    fn import(json: &str) -> Result<Gltf> {
        let mut diagnostics = Diagnostics::new();
        let container = Container::from_slice(json.as_bytes(), &EmbeddedOnly, &mut diagnostics)?;
        build(container, diagnostics, &ImportOptions::default())
    }

    #[test]
    fn test_synthesized_scene_roots() {
        let gltf = import(r#"{"nodes":[{"children":[1]},{},{}]}"#).unwrap();
        assert_eq!(gltf.scenes().len(), 1);
        let scene = gltf.root_scene();
        assert_eq!(scene.index, None);
        assert_eq!(scene.roots, vec![0, 2]);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_root_scene_first() {
        let json = r#"{"scene":1,"scenes":[{"nodes":[0]},{"nodes":[1]},{"nodes":[0]}],"nodes":[{},{}]}"#;
        let gltf = import(json).unwrap();
        let order: Vec<_> = gltf.scenes().iter().map(|s| s.index).collect();
        assert_eq!(order, vec![Some(1), Some(0), Some(2)]);
    }

    #[test]
    fn test_root_scene_only() {
        let json = r#"{"scene":1,"scenes":[{"nodes":[0]},{"nodes":[1]}],"nodes":[{},{}]}"#;
        let mut diagnostics = Diagnostics::new();
        let container = Container::from_slice(json.as_bytes(), &EmbeddedOnly, &mut diagnostics).unwrap();
        let options = ImportOptions::default().with_secondary_scenes(false);
        let gltf = build(container, diagnostics, &options).unwrap();
        assert_eq!(gltf.scenes().len(), 1);
        assert_eq!(gltf.root_scene().index, Some(1));
    }

    #[test]
    fn test_bad_scene_index() {
        let json = r#"{"scene":4,"scenes":[{"nodes":[]}]}"#;
        assert!(matches!(
            import(json),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Scene, index: 4, len: 1 })
        ));
    }

    #[test]
    fn test_bad_mesh_reference() {
        let json = r#"{"scenes":[{"nodes":[0]}],"nodes":[{"mesh":2}]}"#;
        assert!(matches!(
            import(json),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Mesh, index: 2, len: 0 })
        ));
    }

    #[test]
    fn test_unknown_component_type() {
        let json = r#"{"accessors":[{"componentType":5124,"count":1,"type":"SCALAR"}]}"#;
        assert!(matches!(import(json), Err(GltfError::InvalidGltf(_))));
    }

    #[test]
    fn test_unused_sampler_accessor() {
        let json = r#"{"animations":[{"channels":[],"samplers":[{"input":555,"output":777}]}]}"#;
        assert!(matches!(
            import(json),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Accessor, index: 555, len: 0 })
        ));
    }

    #[test]
    fn test_skipped_channel_sampler_accessor() {
        let json = r#"{
            "animations":[{
                "channels":[{"sampler":0,"target":{"path":"translation"}}],
                "samplers":[{"input":0,"output":999}]
            }],
            "accessors":[{"componentType":5126,"count":1,"type":"SCALAR"}]
        }"#;
        assert!(matches!(
            import(json),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Accessor, index: 999, len: 1 })
        ));
    }

    #[test]
    fn test_unused_material_texture() {
        let json = r#"{"materials":[{"pbrMetallicRoughness":{"baseColorTexture":{"index":50}}}]}"#;
        assert!(matches!(
            import(json),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Texture, index: 50, len: 0 })
        ));
        let json = r#"{"materials":[{"emissiveTexture":{"index":1}}],"textures":[{}]}"#;
        assert!(matches!(
            import(json),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Texture, index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_skipped_scene_roots_are_checked() {
        let json = r#"{"scenes":[{"nodes":[0]},{"nodes":[42]}],"nodes":[{}]}"#;
        let mut diagnostics = Diagnostics::new();
        let container = Container::from_slice(json.as_bytes(), &EmbeddedOnly, &mut diagnostics).unwrap();
        let options = ImportOptions::default().with_secondary_scenes(false);
        assert!(matches!(
            build(container, diagnostics, &options),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Node, index: 42, len: 1 })
        ));
    }

    #[test]
    fn test_unused_accessor_range() {
        let json = r#"{
            "buffers":[{"byteLength":4,"uri":"data:application/octet-stream;base64,AAAAAA=="}],
            "bufferViews":[{"buffer":0,"byteLength":4}],
            "accessors":[{"bufferView":0,"componentType":5126,"count":1000,"type":"MAT4"}]
        }"#;
        assert!(matches!(
            import(json),
            Err(GltfError::AccessorOutOfBounds { accessor: 0, required: 64000, available: 4 })
        ));
    }

    #[test]
    fn test_unused_view_range() {
        let json = r#"{
            "buffers":[{"byteLength":4,"uri":"data:application/octet-stream;base64,AAAAAA=="}],
            "bufferViews":[{"buffer":0,"byteOffset":2,"byteLength":8}]
        }"#;
        assert!(matches!(
            import(json),
            Err(GltfError::ViewOutOfBounds { view: 0, buffer: 0, start: 2, end: 10, buffer_len: 4 })
        ));
    }

    #[test]
    fn test_huge_unbacked_accessor() {
        let json = r#"{
            "meshes":[{"primitives":[{"attributes":{"POSITION":0}}]}],
            "accessors":[{"componentType":5126,"count":4611686018427387904,"type":"VEC3"}]
        }"#;
        assert!(matches!(import(json), Err(GltfError::InvalidGltf(_))));
    }

    #[test]
    fn test_camera_node() {
        let json = r#"{
            "scenes":[{"nodes":[0]}],
            "nodes":[{"camera":0}],
            "cameras":[{"type":"perspective","perspective":{"yfov":1.0,"znear":0.01}}]
        }"#;
        let gltf = import(json).unwrap();
        assert_eq!(gltf.cameras().len(), 1);
        assert_eq!(gltf.root_scene().node(0).unwrap().camera, Some(0));
    }
}
