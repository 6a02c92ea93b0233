//! Skins: joint lists and inverse bind matrices.

use glam::Mat4;
use gltf_import_core::AxisConversion;

/// A skin binding a mesh to a hierarchy of joint nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub index: usize,
    pub name: Option<String>,
    /// Joint node indices in bind order.
    pub joints: Vec<usize>,
    /// Declared skeleton root node.
    pub skeleton: Option<usize>,
    /// One matrix per joint; identity when the document gives none.
    pub inverse_bind_matrices: Vec<Mat4>,
}

impl Skin {
    /// The skeleton root, when it is a node other than the first joint.
    pub fn detached_root(&self) -> Option<usize> {
        let skeleton = self.skeleton?;
        match self.joints.first() {
            Some(&first) if first == skeleton => None,
            _ => Some(skeleton),
        }
    }

    pub fn contains_joint(&self, node: usize) -> bool {
        self.joints.contains(&node)
    }

    /// Inverse bind matrix of joint `i`, identity if out of range.
    pub fn inverse_bind_matrix(&self, i: usize) -> Mat4 {
        self.inverse_bind_matrices.get(i).copied().unwrap_or(Mat4::IDENTITY)
    }

    /// Inverse bind matrices re-expressed in the target coordinate system.
    pub fn converted_inverse_bind_matrices(&self, axis: AxisConversion) -> Vec<Mat4> {
        self.inverse_bind_matrices.iter().map(|&m| axis.matrix(m)).collect()
    }

    /// The skin name, or `Armature_<index>` when unnamed.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("Armature_{}", self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn skin(joints: Vec<usize>, skeleton: Option<usize>) -> Skin {
        let n = joints.len();
        Skin {
            index: 0,
            name: None,
            joints,
            skeleton,
            inverse_bind_matrices: vec![Mat4::IDENTITY; n],
        }
    }

    #[test]
    fn test_detached_root() {
        assert_eq!(skin(vec![5, 2, 7], Some(9)).detached_root(), Some(9));
        assert_eq!(skin(vec![5, 2, 7], Some(5)).detached_root(), None);
        assert_eq!(skin(vec![5, 2, 7], None).detached_root(), None);
        assert_eq!(skin(vec![], Some(1)).detached_root(), Some(1));
    }

    #[test]
    fn test_inverse_bind_conversion() {
        let mut s = skin(vec![0], None);
        s.inverse_bind_matrices[0] = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let converted = s.converted_inverse_bind_matrices(AxisConversion::YUpToZUp);
        let moved = converted[0].transform_point3(Vec3::ZERO);
        assert!(moved.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
        assert_eq!(s.inverse_bind_matrix(3), Mat4::IDENTITY);
        assert_eq!(s.display_name(), "Armature_0");
    }
}
