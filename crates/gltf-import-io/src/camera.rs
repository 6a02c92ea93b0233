//! Cameras.

use gltf_import_core::{GltfError, Result};

use crate::document::GltfCamera;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        yfov: f32,
        znear: f32,
        /// `None` means an infinite far plane.
        zfar: Option<f32>,
        aspect_ratio: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub index: usize,
    pub name: Option<String>,
    pub projection: Projection,
}

impl Camera {
    pub(crate) fn from_def(index: usize, def: &GltfCamera) -> Result<Self> {
        let projection = match (def.camera_type.as_str(), &def.perspective, &def.orthographic) {
            ("perspective", Some(p), _) => Projection::Perspective {
                yfov: p.yfov,
                znear: p.znear,
                zfar: p.zfar,
                aspect_ratio: p.aspect_ratio,
            },
            ("orthographic", _, Some(o)) => Projection::Orthographic {
                xmag: o.xmag,
                ymag: o.ymag,
                znear: o.znear,
                zfar: o.zfar,
            },
            (ty, _, _) => {
                return Err(GltfError::InvalidGltf(format!(
                    "camera {} of type '{}' has no matching projection block",
                    index, ty
                )))
            }
        };
        Ok(Self {
            index,
            name: def.name.clone(),
            projection,
        })
    }
}
