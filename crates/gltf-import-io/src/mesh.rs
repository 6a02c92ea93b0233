//! Meshes and primitives.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use gltf_import_core::{AccessorData, Elements};

use crate::material::Material;

/// A recognized vertex attribute semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
}

impl Semantic {
    /// Parses a glTF attribute name such as `TEXCOORD_1`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "POSITION" => return Some(Semantic::Position),
            "NORMAL" => return Some(Semantic::Normal),
            "TANGENT" => return Some(Semantic::Tangent),
            _ => {}
        }
        let (prefix, set) = name.rsplit_once('_')?;
        let set: u32 = set.parse().ok()?;
        match prefix {
            "TEXCOORD" => Some(Semantic::TexCoord(set)),
            "COLOR" => Some(Semantic::Color(set)),
            "JOINTS" => Some(Semantic::Joints(set)),
            "WEIGHTS" => Some(Semantic::Weights(set)),
            _ => None,
        }
    }

    /// Whether a morph target may displace this attribute.
    pub fn is_morphable(self) -> bool {
        matches!(self, Semantic::Position | Semantic::Normal | Semantic::Tangent)
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semantic::Position => f.write_str("POSITION"),
            Semantic::Normal => f.write_str("NORMAL"),
            Semantic::Tangent => f.write_str("TANGENT"),
            Semantic::TexCoord(n) => write!(f, "TEXCOORD_{}", n),
            Semantic::Color(n) => write!(f, "COLOR_{}", n),
            Semantic::Joints(n) => write!(f, "JOINTS_{}", n),
            Semantic::Weights(n) => write!(f, "WEIGHTS_{}", n),
        }
    }
}

/// Decoded vertex attributes keyed by semantic.
pub type Attributes = BTreeMap<Semantic, Arc<AccessorData>>;

/// Primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PrimitiveMode::Points),
            1 => Some(PrimitiveMode::Lines),
            2 => Some(PrimitiveMode::LineLoop),
            3 => Some(PrimitiveMode::LineStrip),
            4 => Some(PrimitiveMode::Triangles),
            5 => Some(PrimitiveMode::TriangleStrip),
            6 => Some(PrimitiveMode::TriangleFan),
            _ => None,
        }
    }
}

/// Attribute displacements for one morph target.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphTarget {
    pub attributes: Attributes,
}

/// Geometry drawn with a single material.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub attributes: Attributes,
    /// Vertex indices; `0..vertex_count` when the document gives none.
    pub indices: Vec<u32>,
    pub material: Arc<Material>,
    pub mode: PrimitiveMode,
    pub targets: Vec<MorphTarget>,
}

impl Primitive {
    pub fn attribute(&self, semantic: Semantic) -> Option<&Arc<AccessorData>> {
        self.attributes.get(&semantic)
    }

    /// Number of vertices, taken from `POSITION`.
    pub fn vertex_count(&self) -> usize {
        self.attribute(Semantic::Position).map_or(0, |p| p.len())
    }

    pub fn positions(&self) -> Option<Vec<[f32; 3]>> {
        self.attribute(Semantic::Position)?.to_arrays::<3>()
    }

    pub fn normals(&self) -> Option<Vec<[f32; 3]>> {
        self.attribute(Semantic::Normal)?.to_arrays::<3>()
    }

    pub fn tex_coords(&self, set: u32) -> Option<Vec<[f32; 2]>> {
        self.attribute(Semantic::TexCoord(set))?.to_arrays::<2>()
    }

    /// Vertex colors, either RGB or RGBA per element.
    pub fn colors(&self, set: u32) -> Option<Elements<f32>> {
        Some(self.attribute(Semantic::Color(set))?.to_f32())
    }

    /// Joint indices per vertex, widened to `u32`.
    pub fn joints(&self, set: u32) -> Option<Vec<[u32; 4]>> {
        let data = self.attribute(Semantic::Joints(set))?;
        Some(
            data.to_arrays::<4>()?
                .into_iter()
                .map(|j| j.map(|v| v as u32))
                .collect(),
        )
    }

    pub fn weights(&self, set: u32) -> Option<Vec<[f32; 4]>> {
        self.attribute(Semantic::Weights(set))?.to_arrays::<4>()
    }

    /// Index triples, for triangle-list primitives only.
    pub fn triangles(&self) -> Option<impl Iterator<Item = [u32; 3]> + '_> {
        if self.mode != PrimitiveMode::Triangles {
            return None;
        }
        Some(self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]))
    }
}

/// A mesh: an ordered list of primitives plus default morph weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub index: usize,
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    pub weights: Vec<f32>,
}

impl Mesh {
    /// The mesh name, or `Mesh_<index>` when unnamed.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("Mesh_{}", self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitive(mode: PrimitiveMode, indices: Vec<u32>) -> Primitive {
        let mut attributes = Attributes::new();
        attributes.insert(
            Semantic::Position,
            Arc::new(AccessorData::F32(Elements::new(3, vec![0.0; 12]))),
        );
        attributes.insert(
            Semantic::Joints(0),
            Arc::new(AccessorData::U8(Elements::new(4, vec![0, 1, 2, 3, 4, 5, 6, 7]))),
        );
        Primitive {
            attributes,
            indices,
            material: Arc::new(Material::default_material()),
            mode,
            targets: Vec::new(),
        }
    }

    #[test]
    fn test_semantic_parse() {
        assert_eq!(Semantic::parse("POSITION"), Some(Semantic::Position));
        assert_eq!(Semantic::parse("TEXCOORD_1"), Some(Semantic::TexCoord(1)));
        assert_eq!(Semantic::parse("COLOR_0"), Some(Semantic::Color(0)));
        assert_eq!(Semantic::parse("JOINTS_0"), Some(Semantic::Joints(0)));
        assert_eq!(Semantic::parse("WEIGHTS_2"), Some(Semantic::Weights(2)));
        assert_eq!(Semantic::parse("_TEMPERATURE"), None);
        assert_eq!(Semantic::parse("TEXCOORD_x"), None);
        assert_eq!(Semantic::TexCoord(3).to_string(), "TEXCOORD_3");
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(PrimitiveMode::from_code(4), Some(PrimitiveMode::Triangles));
        assert_eq!(PrimitiveMode::from_code(0), Some(PrimitiveMode::Points));
        assert_eq!(PrimitiveMode::from_code(7), None);
        assert_eq!(PrimitiveMode::default(), PrimitiveMode::Triangles);
    }

    #[test]
    fn test_primitive_accessors() {
        let p = primitive(PrimitiveMode::Triangles, vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(p.vertex_count(), 4);
        assert_eq!(p.positions().unwrap().len(), 4);
        assert!(p.normals().is_none());
        assert_eq!(p.joints(0).unwrap(), vec![[0, 1, 2, 3], [4, 5, 6, 7]]);
        let triangles: Vec<_> = p.triangles().unwrap().collect();
        assert_eq!(triangles, vec![[0, 1, 2], [2, 3, 0]]);
    }

    #[test]
    fn test_strip_has_no_triangle_list() {
        let p = primitive(PrimitiveMode::TriangleStrip, vec![0, 1, 2, 3]);
        assert!(p.triangles().is_none());
    }
}
