//! Animation channels and keyframes.
//!
//! Keyframes are kept as authored: no resampling or interpolation is done.
//! [`Channel::converted_keyframes`] applies the axis conversion on request.

use std::sync::Arc;

use glam::{Quat, Vec3};
use gltf_import_core::transform::is_uniform;
use gltf_import_core::AxisConversion;

/// The node property a channel animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "translation" => Some(TargetPath::Translation),
            "rotation" => Some(TargetPath::Rotation),
            "scale" => Some(TargetPath::Scale),
            "weights" => Some(TargetPath::Weights),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TargetPath::Translation => "translation",
            TargetPath::Rotation => "rotation",
            TargetPath::Scale => "scale",
            TargetPath::Weights => "weights",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CatmullRomSpline,
    CubicSpline,
}

impl Interpolation {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "LINEAR" => Some(Interpolation::Linear),
            "STEP" => Some(Interpolation::Step),
            "CATMULLROMSPLINE" => Some(Interpolation::CatmullRomSpline),
            "CUBICSPLINE" => Some(Interpolation::CubicSpline),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Interpolation::Linear => "LINEAR",
            Interpolation::Step => "STEP",
            Interpolation::CatmullRomSpline => "CATMULLROMSPLINE",
            Interpolation::CubicSpline => "CUBICSPLINE",
        }
    }

    /// Output values stored per keyframe: three for cubic splines
    /// (in-tangent, value, out-tangent), one otherwise.
    pub const fn values_per_key(self) -> usize {
        match self {
            Interpolation::CubicSpline => 3,
            _ => 1,
        }
    }
}

/// A single keyframe. Tangents are present for cubic-spline channels only.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
    pub in_tangent: Option<T>,
    pub out_tangent: Option<T>,
}

impl<T> Keyframe<T> {
    fn map<U>(&self, f: impl Fn(&T) -> U) -> Keyframe<U> {
        Keyframe {
            time: self.time,
            value: f(&self.value),
            in_tangent: self.in_tangent.as_ref().map(&f),
            out_tangent: self.out_tangent.as_ref().map(&f),
        }
    }
}

/// A channel's keyframes, shaped by its target path.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyframes {
    Translation(Vec<Keyframe<Vec3>>),
    Rotation(Vec<Keyframe<Quat>>),
    Scale(Vec<Keyframe<Vec3>>),
    /// One weight per morph target in each keyframe.
    Weights(Vec<Keyframe<Vec<f32>>>),
}

impl Keyframes {
    /// Shapes flat sampler output into keyframes.
    ///
    /// Returns the keyframes and whether the output held a different number
    /// of values than the input times call for. Surplus values are dropped;
    /// times without values are dropped.
    pub fn from_samples(
        path: TargetPath,
        interpolation: Interpolation,
        times: &[f32],
        values: &[f32],
    ) -> (Self, bool) {
        let per_key = interpolation.values_per_key();
        let width = match path {
            TargetPath::Translation | TargetPath::Scale => 3,
            TargetPath::Rotation => 4,
            TargetPath::Weights if times.is_empty() => 0,
            TargetPath::Weights => values.len() / (times.len() * per_key),
        };
        let stride = width * per_key;
        let count = if stride == 0 { 0 } else { times.len().min(values.len() / stride) };
        let mismatched = values.len() != times.len() * stride;

        let keyframes = match path {
            TargetPath::Translation => {
                Keyframes::Translation(shape(times, values, count, width, per_key, Vec3::from_slice))
            }
            TargetPath::Rotation => {
                Keyframes::Rotation(shape(times, values, count, width, per_key, Quat::from_slice))
            }
            TargetPath::Scale => {
                Keyframes::Scale(shape(times, values, count, width, per_key, Vec3::from_slice))
            }
            TargetPath::Weights => {
                Keyframes::Weights(shape(times, values, count, width, per_key, <[f32]>::to_vec))
            }
        };
        (keyframes, mismatched)
    }

    pub fn path(&self) -> TargetPath {
        match self {
            Keyframes::Translation(_) => TargetPath::Translation,
            Keyframes::Rotation(_) => TargetPath::Rotation,
            Keyframes::Scale(_) => TargetPath::Scale,
            Keyframes::Weights(_) => TargetPath::Weights,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Keyframes::Translation(k) | Keyframes::Scale(k) => k.len(),
            Keyframes::Rotation(k) => k.len(),
            Keyframes::Weights(k) => k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn times(&self) -> Vec<f32> {
        match self {
            Keyframes::Translation(k) | Keyframes::Scale(k) => k.iter().map(|k| k.time).collect(),
            Keyframes::Rotation(k) => k.iter().map(|k| k.time).collect(),
            Keyframes::Weights(k) => k.iter().map(|k| k.time).collect(),
        }
    }
}

fn shape<T>(
    times: &[f32],
    values: &[f32],
    count: usize,
    width: usize,
    per_key: usize,
    make: impl Fn(&[f32]) -> T,
) -> Vec<Keyframe<T>> {
    if count == 0 {
        return Vec::new();
    }
    values
        .chunks_exact(width * per_key)
        .zip(times)
        .take(count)
        .map(|(chunk, &time)| {
            if per_key == 3 {
                Keyframe {
                    time,
                    in_tangent: Some(make(&chunk[..width])),
                    value: make(&chunk[width..2 * width]),
                    out_tangent: Some(make(&chunk[2 * width..])),
                }
            } else {
                Keyframe {
                    time,
                    value: make(chunk),
                    in_tangent: None,
                    out_tangent: None,
                }
            }
        })
        .collect()
}

/// One animated property of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Index of the owning animation.
    pub animation: usize,
    /// Position of the channel within its animation.
    pub index: usize,
    pub node: usize,
    pub path: TargetPath,
    pub interpolation: Interpolation,
    pub keyframes: Keyframes,
}

impl Channel {
    /// Keyframe values expressed in the target coordinate system. Morph
    /// weights are unaffected.
    pub fn converted_keyframes(&self, axis: AxisConversion) -> Keyframes {
        match &self.keyframes {
            Keyframes::Translation(k) => {
                Keyframes::Translation(k.iter().map(|k| k.map(|&v| axis.location(v))).collect())
            }
            Keyframes::Rotation(k) => {
                Keyframes::Rotation(k.iter().map(|k| k.map(|&q| axis.rotation(q))).collect())
            }
            Keyframes::Scale(k) => Keyframes::Scale(k.iter().map(|k| k.map(|&s| axis.scale(s))).collect()),
            Keyframes::Weights(k) => Keyframes::Weights(k.clone()),
        }
    }

    /// Returns true for scale channels with any non-uniform keyframe value.
    pub fn has_non_uniform_scale(&self) -> bool {
        match &self.keyframes {
            Keyframes::Scale(k) => k.iter().any(|k| !is_uniform(k.value)),
            _ => false,
        }
    }
}

/// A named group of channels played together.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub index: usize,
    pub name: Option<String>,
    /// Channels that resolved; skipped channels are reported as diagnostics.
    pub channels: Vec<Arc<Channel>>,
}

impl Animation {
    /// The animation name, or `Animation_<index>` when unnamed.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("Animation_{}", self.index))
    }
}
