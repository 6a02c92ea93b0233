//! Collaborator interface for turning a resolved graph into host objects.
//!
//! The importer stops at a resolved [`Gltf`]. Creating objects in a host
//! application (an editor, an engine, a printer) is delegated to a
//! [`Materializer`], driven depth-first by [`materialize`].
//!
//! # Usage
//!
//! ```ignore
//! use gltf_import_io::{import, materialize, Materializer};
//!
//! let gltf = import("model.glb")?;
//! let mut host = MyHost::new();
//! let created = materialize(&gltf, &mut host)?;
//! ```

use std::sync::Arc;

use gltf_import_core::{EntityKind, GltfError};

use crate::animation::{Animation, Channel};
use crate::camera::Camera;
use crate::graph::Gltf;
use crate::mesh::Mesh;
use crate::scene::{Node, Scene};
use crate::skin::Skin;

/// Creates host objects for the nodes of a resolved scene.
///
/// Each node becomes exactly one object. The kind is chosen with a fixed
/// priority: a node with a mesh becomes a mesh object, else one with a
/// camera becomes a camera, else a skeleton root becomes a bone, else the
/// node becomes an empty. `parent` is the handle created for the node's
/// parent, `None` for scene roots.
pub trait Materializer {
    /// Reference to a created host object.
    type Handle: Clone;
    type Error: From<GltfError>;

    fn create_mesh_object(
        &mut self,
        gltf: &Gltf,
        node: &Node,
        mesh: &Mesh,
        parent: Option<&Self::Handle>,
    ) -> Result<Self::Handle, Self::Error>;

    fn create_camera(
        &mut self,
        gltf: &Gltf,
        node: &Node,
        camera: &Camera,
        parent: Option<&Self::Handle>,
    ) -> Result<Self::Handle, Self::Error>;

    /// Called for skeleton roots; `skin` is the skin the node is the root of.
    fn create_bone(
        &mut self,
        gltf: &Gltf,
        node: &Node,
        skin: &Skin,
        parent: Option<&Self::Handle>,
    ) -> Result<Self::Handle, Self::Error>;

    fn create_empty(&mut self, gltf: &Gltf, node: &Node, parent: Option<&Self::Handle>)
        -> Result<Self::Handle, Self::Error>;

    /// Applies the channels of one animation to a created object.
    ///
    /// Called once per animation that targets the node, after the object is
    /// created. Default: ignore animations.
    fn apply_animation(
        &mut self,
        _gltf: &Gltf,
        _handle: &Self::Handle,
        _animation: &Animation,
        _channels: &[Arc<Channel>],
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Materializes the root scene. See [`materialize_scene`].
pub fn materialize<M: Materializer>(gltf: &Gltf, materializer: &mut M) -> Result<Vec<(usize, M::Handle)>, M::Error> {
    materialize_scene(gltf, gltf.root_scene(), materializer)
}

/// Walks `scene` depth-first from its roots, creating one host object per
/// node with its parent's handle.
///
/// Returns `(node index, handle)` pairs in creation order.
pub fn materialize_scene<M: Materializer>(
    gltf: &Gltf,
    scene: &Scene,
    materializer: &mut M,
) -> Result<Vec<(usize, M::Handle)>, M::Error> {
    let mut created = Vec::with_capacity(scene.len());
    let mut stack: Vec<(usize, Option<M::Handle>)> = scene.roots.iter().rev().map(|&root| (root, None)).collect();

    while let Some((index, parent)) = stack.pop() {
        let Some(node) = scene.node(index) else {
            continue;
        };
        let handle = create(gltf, node, parent.as_ref(), materializer)?;

        for (&animation, channels) in &node.animations {
            let animation = gltf
                .animation(animation)
                .ok_or_else(|| GltfError::out_of_bounds(EntityKind::Animation, animation, gltf.animations().len()))?;
            materializer.apply_animation(gltf, &handle, animation, channels)?;
        }

        stack.extend(node.children.iter().rev().map(|&child| (child, Some(handle.clone()))));
        created.push((index, handle));
    }

    Ok(created)
}

fn create<M: Materializer>(
    gltf: &Gltf,
    node: &Node,
    parent: Option<&M::Handle>,
    materializer: &mut M,
) -> Result<M::Handle, M::Error> {
    if let Some(index) = node.mesh {
        let mesh = gltf
            .mesh(index)
            .ok_or_else(|| GltfError::out_of_bounds(EntityKind::Mesh, index, gltf.meshes().len()))?;
        return materializer.create_mesh_object(gltf, node, mesh, parent);
    }
    if let Some(index) = node.camera {
        let camera = gltf
            .camera(index)
            .ok_or_else(|| GltfError::out_of_bounds(EntityKind::Camera, index, gltf.cameras().len()))?;
        return materializer.create_camera(gltf, node, camera, parent);
    }
    if let Some(index) = node.joint_skin.filter(|_| node.is_joint) {
        let skin = gltf
            .skin(index)
            .ok_or_else(|| GltfError::out_of_bounds(EntityKind::Skin, index, gltf.skins().len()))?;
        return materializer.create_bone(gltf, node, skin, parent);
    }
    materializer.create_empty(gltf, node, parent)
}
