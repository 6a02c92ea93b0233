//! Node transforms and coordinate-system conversion
//!
//! glTF is right-handed with +Y up; the import target is right-handed with
//! +Z up. [`AxisConversion`] maps locations, rotations and whole matrices
//! between the two. Conversion is applied exactly once, when a consumer asks
//! for converted values; stored transforms always keep the source values.

use glam::{Mat4, Quat, Vec3, Vec4};

/// A decomposed transform: scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srt {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Srt {
    pub const IDENTITY: Srt = Srt {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Composes `T * R * S`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Returns true when the scale differs between axes.
    pub fn has_non_uniform_scale(&self) -> bool {
        !is_uniform(self.scale)
    }
}

impl Default for Srt {
    fn default() -> Self {
        Srt::IDENTITY
    }
}

/// Returns true when all three components are equal within a small tolerance.
pub fn is_uniform(scale: Vec3) -> bool {
    const EPSILON: f32 = 1e-5;
    (scale.x - scale.y).abs() <= EPSILON && (scale.y - scale.z).abs() <= EPSILON
}

/// A node's local transform as written in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalTransform {
    /// An explicit column-major matrix.
    Matrix(Mat4),
    /// Optional translation, rotation and scale; missing parts are identity.
    Trs {
        translation: Option<Vec3>,
        rotation: Option<Quat>,
        scale: Option<Vec3>,
    },
}

impl Default for LocalTransform {
    fn default() -> Self {
        LocalTransform::Trs {
            translation: None,
            rotation: None,
            scale: None,
        }
    }
}

impl LocalTransform {
    /// Builds a matrix transform from 16 column-major values.
    pub fn from_matrix(values: &[f32; 16]) -> Self {
        LocalTransform::Matrix(Mat4::from_cols_array(values))
    }

    /// Builds a TRS transform; rotation is `[x, y, z, w]`.
    pub fn from_trs(translation: Option<[f32; 3]>, rotation: Option<[f32; 4]>, scale: Option<[f32; 3]>) -> Self {
        LocalTransform::Trs {
            translation: translation.map(Vec3::from_array),
            rotation: rotation.map(Quat::from_array),
            scale: scale.map(Vec3::from_array),
        }
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, LocalTransform::Matrix(_))
    }

    /// The local matrix: the explicit one, or `T * R * S`.
    pub fn matrix(&self) -> Mat4 {
        match self {
            LocalTransform::Matrix(m) => *m,
            LocalTransform::Trs { .. } => self.decompose().matrix(),
        }
    }

    /// Splits the transform into translation, rotation and scale.
    pub fn decompose(&self) -> Srt {
        match *self {
            LocalTransform::Matrix(m) => {
                let (scale, rotation, translation) = m.to_scale_rotation_translation();
                Srt {
                    translation,
                    rotation,
                    scale,
                }
            }
            LocalTransform::Trs {
                translation,
                rotation,
                scale,
            } => Srt {
                translation: translation.unwrap_or(Vec3::ZERO),
                rotation: rotation.unwrap_or(Quat::IDENTITY),
                scale: scale.unwrap_or(Vec3::ONE),
            },
        }
    }

    /// Decomposed transform expressed in the target coordinate system.
    pub fn converted(&self, axis: AxisConversion) -> Srt {
        axis.srt(self.decompose())
    }

    /// Local matrix expressed in the target coordinate system.
    pub fn converted_matrix(&self, axis: AxisConversion) -> Mat4 {
        self.converted(axis).matrix()
    }
}

/// Coordinate-system conversion applied to imported values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisConversion {
    /// Keep glTF's Y-up coordinates.
    Identity,
    /// Convert Y-up to Z-up.
    #[default]
    YUpToZUp,
}

impl AxisConversion {
    /// Change-of-basis matrix taking source coordinates to target coordinates.
    pub fn basis(self) -> Mat4 {
        match self {
            AxisConversion::Identity => Mat4::IDENTITY,
            AxisConversion::YUpToZUp => Mat4::from_cols(
                Vec4::new(1.0, 0.0, 0.0, 0.0),
                Vec4::new(0.0, 0.0, 1.0, 0.0),
                Vec4::new(0.0, -1.0, 0.0, 0.0),
                Vec4::W,
            ),
        }
    }

    /// `(x, y, z)` becomes `(x, -z, y)`.
    pub fn location(self, v: Vec3) -> Vec3 {
        match self {
            AxisConversion::Identity => v,
            AxisConversion::YUpToZUp => Vec3::new(v.x, -v.z, v.y),
        }
    }

    pub fn inverse_location(self, v: Vec3) -> Vec3 {
        match self {
            AxisConversion::Identity => v,
            AxisConversion::YUpToZUp => Vec3::new(v.x, v.z, -v.y),
        }
    }

    /// The quaternion's vector part is converted like a location.
    pub fn rotation(self, q: Quat) -> Quat {
        match self {
            AxisConversion::Identity => q,
            AxisConversion::YUpToZUp => Quat::from_xyzw(q.x, -q.z, q.y, q.w),
        }
    }

    pub fn inverse_rotation(self, q: Quat) -> Quat {
        match self {
            AxisConversion::Identity => q,
            AxisConversion::YUpToZUp => Quat::from_xyzw(q.x, q.z, -q.y, q.w),
        }
    }

    /// Scale components are kept as they are.
    pub fn scale(self, s: Vec3) -> Vec3 {
        s
    }

    pub fn srt(self, srt: Srt) -> Srt {
        Srt {
            translation: self.location(srt.translation),
            rotation: self.rotation(srt.rotation),
            scale: self.scale(srt.scale),
        }
    }

    /// Re-expresses a whole matrix in the target basis (`C * m * C⁻¹`).
    pub fn matrix(self, m: Mat4) -> Mat4 {
        let c = self.basis();
        c * m * c.transpose()
    }

    pub fn inverse_matrix(self, m: Mat4) -> Mat4 {
        let c = self.basis();
        c.transpose() * m * c
    }
}
