//! Scenes and nodes.
//!
//! Each scene owns the nodes reachable from its roots, stored flat in visit
//! order. Hierarchy is expressed by index (`children`, `parent`), so two
//! scenes may each hold their own copy of a shared node.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use gltf_import_core::{EntityKind, GltfError, LocalTransform, Resolve, Result};
use log::debug;

use crate::animation::Channel;
use crate::document::GltfNode;

/// A node as placed in one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub index: usize,
    pub name: Option<String>,
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub skin: Option<usize>,
    pub children: Vec<usize>,
    pub transform: LocalTransform,
    /// Morph weights overriding the mesh defaults.
    pub weights: Vec<f32>,
    /// Set while walking the scene; `None` for roots.
    pub parent: Option<usize>,
    /// The node is a skeleton root and should become a bone.
    pub is_joint: bool,
    /// The skin this node is a skeleton root of.
    pub joint_skin: Option<usize>,
    /// Channels targeting this node, grouped by animation index.
    pub animations: BTreeMap<usize, Vec<Arc<Channel>>>,
}

impl Node {
    pub(crate) fn from_def(index: usize, def: &GltfNode, parent: Option<usize>) -> Self {
        let transform = match &def.matrix {
            Some(m) => LocalTransform::from_matrix(m),
            None => LocalTransform::from_trs(def.translation, def.rotation, def.scale),
        };
        Self {
            index,
            name: def.name.clone(),
            mesh: def.mesh,
            camera: def.camera,
            skin: def.skin,
            children: def.children.clone(),
            transform,
            weights: def.weights.clone(),
            parent,
            is_joint: false,
            joint_skin: None,
            animations: BTreeMap::new(),
        }
    }

    /// Attaches a channel under its animation index.
    pub fn set_anim(&mut self, animation: usize, channel: Arc<Channel>) {
        self.animations.entry(animation).or_default().push(channel);
    }

    /// Channels of `animation` targeting this node.
    pub fn channels(&self, animation: usize) -> &[Arc<Channel>] {
        self.animations.get(&animation).map_or(&[], Vec::as_slice)
    }

    pub fn is_animated(&self) -> bool {
        !self.animations.is_empty()
    }

    /// The node name, or `Node_<index>` when unnamed.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("Node_{}", self.index))
    }
}

/// A scene: root nodes plus every node reachable from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// `None` for a scene synthesized from a document without scenes.
    pub index: Option<usize>,
    pub name: Option<String>,
    pub roots: Vec<usize>,
    nodes: Vec<Node>,
    lookup: HashMap<usize, usize>,
}

impl Scene {
    /// Walks the hierarchy depth-first from `roots`, registering every node.
    ///
    /// A node reached twice (shared by two parents, or part of a cycle) is a
    /// structural error.
    pub(crate) fn build(index: Option<usize>, name: Option<String>, roots: Vec<usize>, defs: &[GltfNode]) -> Result<Self> {
        let mut scene = Scene {
            index,
            name,
            roots,
            nodes: Vec::new(),
            lookup: HashMap::new(),
        };

        let mut stack: Vec<(usize, Option<usize>)> = scene.roots.iter().rev().map(|&root| (root, None)).collect();
        while let Some((node_index, parent)) = stack.pop() {
            let def = defs.resolve(node_index, EntityKind::Node)?;
            if scene.lookup.contains_key(&node_index) {
                return Err(GltfError::InvalidGltf(format!(
                    "node {} is reached more than once in {}",
                    node_index,
                    scene.label()
                )));
            }
            debug!("Node {} (parent {:?})", node_index, parent);

            scene.lookup.insert(node_index, scene.nodes.len());
            scene.nodes.push(Node::from_def(node_index, def, parent));
            stack.extend(def.children.iter().rev().map(|&child| (child, Some(node_index))));
        }

        Ok(scene)
    }

    fn label(&self) -> String {
        match self.index {
            Some(i) => format!("scene {}", i),
            None => "the default scene".to_string(),
        }
    }

    /// Looks up a node by its document index.
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.lookup.get(&index).map(|&slot| &self.nodes[slot])
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        let slot = *self.lookup.get(&index)?;
        self.nodes.get_mut(slot)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.lookup.contains_key(&index)
    }

    /// All nodes in depth-first visit order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order traversal from the roots, yielding each node
    /// with its depth (roots are at depth 0).
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            scene: self,
            stack: self.roots.iter().rev().map(|&root| (root, 0)).collect(),
        }
    }
}

/// Iterator returned by [`Scene::walk`].
pub struct Walk<'a> {
    scene: &'a Scene,
    stack: Vec<(usize, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, depth)) = self.stack.pop() {
            if let Some(node) = self.scene.node(index) {
                self.stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
                return Some((depth, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Interpolation, Keyframes, TargetPath};

    fn defs(children: &[&[usize]]) -> Vec<GltfNode> {
        children
            .iter()
            .map(|c| GltfNode {
                children: c.to_vec(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_walk_order_and_parents() {
        // 0 -> (1 -> 3), 2
        let nodes = defs(&[&[1, 2], &[3], &[], &[]]);
        let scene = Scene::build(Some(0), None, vec![0], &nodes).unwrap();
        let order: Vec<_> = scene.walk().map(|(depth, n)| (n.index, depth)).collect();
        assert_eq!(order, vec![(0, 0), (1, 1), (3, 2), (2, 1)]);
        assert_eq!(scene.node(3).unwrap().parent, Some(1));
        assert_eq!(scene.node(0).unwrap().parent, None);
        assert_eq!(scene.len(), 4);
    }

    #[test]
    fn test_unreached_nodes_are_absent() {
        let nodes = defs(&[&[], &[]]);
        let scene = Scene::build(Some(0), None, vec![1], &nodes).unwrap();
        assert!(scene.contains(1));
        assert!(!scene.contains(0));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let nodes = defs(&[&[1], &[0]]);
        assert!(matches!(
            Scene::build(Some(0), None, vec![0], &nodes),
            Err(GltfError::InvalidGltf(_))
        ));
    }

    #[test]
    fn test_shared_child_is_rejected() {
        let nodes = defs(&[&[2], &[2], &[]]);
        assert!(Scene::build(Some(0), None, vec![0, 1], &nodes).is_err());
    }

    #[test]
    fn test_child_out_of_bounds() {
        let nodes = defs(&[&[5]]);
        assert!(matches!(
            Scene::build(Some(0), None, vec![0], &nodes),
            Err(GltfError::IndexOutOfBounds { index: 5, len: 1, .. })
        ));
    }

    #[test]
    fn test_set_anim_groups_by_animation() {
        let nodes = defs(&[&[]]);
        let mut scene = Scene::build(Some(0), None, vec![0], &nodes).unwrap();
        let channel = |animation| {
            Arc::new(Channel {
                animation,
                index: 0,
                node: 0,
                path: TargetPath::Translation,
                interpolation: Interpolation::Linear,
                keyframes: Keyframes::Translation(Vec::new()),
            })
        };
        let node = scene.node_mut(0).unwrap();
        node.set_anim(1, channel(1));
        node.set_anim(0, channel(0));
        node.set_anim(1, channel(1));
        assert_eq!(node.channels(1).len(), 2);
        assert_eq!(node.channels(0).len(), 1);
        assert!(node.channels(7).is_empty());
        assert_eq!(node.animations.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    }
}
