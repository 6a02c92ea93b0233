//! Materials, textures and images.

use gltf_import_core::{EntityKind, GltfError, Resolve, Result};

use crate::check_index;
use crate::document::{GltfImage, GltfMaterial, GltfTexture, GltfTextureInfo};

/// A reference from a material slot to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
    pub texture: usize,
    /// Which `TEXCOORD_n` set the texture is sampled with.
    pub tex_coord: u32,
}

/// Where the base color of a material comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSource {
    /// A constant RGBA color.
    Constant([f32; 4]),
    /// A texture, unmodified.
    Texture(TextureRef),
    /// A texture multiplied by a constant RGBA factor.
    TextureWithFactor(TextureRef, [f32; 4]),
}

/// Metallic-roughness parameters, with glTF defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Pbr {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureRef>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureRef>,
}

impl Default for Pbr {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
        }
    }
}

impl Pbr {
    /// Resolves the base color to one of its three forms.
    pub fn base_color(&self) -> ColorSource {
        match self.base_color_texture {
            None => ColorSource::Constant(self.base_color_factor),
            Some(texture) if self.base_color_factor == [1.0; 4] => ColorSource::Texture(texture),
            Some(texture) => ColorSource::TextureWithFactor(texture, self.base_color_factor),
        }
    }
}

/// Emission, present when a material has an emissive texture or a non-black
/// emissive factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emissive {
    pub texture: Option<TextureRef>,
    pub factor: [f32; 3],
}

/// A resolved material.
///
/// Document materials are shared through `Arc`; each index is built once.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// `None` for synthesized materials.
    pub index: Option<usize>,
    pub name: Option<String>,
    pub pbr: Pbr,
    pub emissive: Option<Emissive>,
    pub double_sided: bool,
    /// Base color is taken from the `COLOR_0` vertex attribute.
    pub vertex_color: bool,
}

impl Material {
    /// Material for primitives that name none and have no vertex colors.
    pub fn default_material() -> Self {
        Self {
            index: None,
            name: None,
            pbr: Pbr::default(),
            emissive: None,
            double_sided: false,
            vertex_color: false,
        }
    }

    /// Material for primitives that name none but carry `COLOR_0`.
    pub fn vertex_color() -> Self {
        Self {
            vertex_color: true,
            ..Self::default_material()
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.index.is_none()
    }

    pub(crate) fn from_def(index: usize, def: &GltfMaterial, textures: &[Texture]) -> Result<Self> {
        let texture_ref = |info: &GltfTextureInfo| -> Result<TextureRef> {
            textures.resolve(info.index, EntityKind::Texture)?;
            Ok(TextureRef {
                texture: info.index,
                tex_coord: info.tex_coord,
            })
        };

        let mut pbr = Pbr::default();
        if let Some(p) = &def.pbr_metallic_roughness {
            if let Some(factor) = p.base_color_factor {
                pbr.base_color_factor = factor;
            }
            if let Some(metallic) = p.metallic_factor {
                pbr.metallic_factor = metallic;
            }
            if let Some(roughness) = p.roughness_factor {
                pbr.roughness_factor = roughness;
            }
            pbr.base_color_texture = p.base_color_texture.as_ref().map(texture_ref).transpose()?;
            pbr.metallic_roughness_texture = p
                .metallic_roughness_texture
                .as_ref()
                .map(texture_ref)
                .transpose()?;
        }

        let emissive_texture = def.emissive_texture.as_ref().map(texture_ref).transpose()?;
        let emissive = match (emissive_texture, def.emissive_factor) {
            (Some(texture), factor) => Some(Emissive {
                texture: Some(texture),
                factor: factor.unwrap_or([1.0; 3]),
            }),
            (None, Some(factor)) if factor != [0.0; 3] => Some(Emissive {
                texture: None,
                factor,
            }),
            _ => None,
        };

        Ok(Self {
            index: Some(index),
            name: def.name.clone(),
            pbr,
            emissive,
            double_sided: def.double_sided,
            vertex_color: false,
        })
    }
}

/// A texture: an image plus an optional sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub index: usize,
    pub name: Option<String>,
    pub source: Option<usize>,
    pub sampler: Option<usize>,
}

impl Texture {
    pub(crate) fn from_def(index: usize, def: &GltfTexture, images: usize, samplers: usize) -> Result<Self> {
        if let Some(source) = def.source {
            check_index(EntityKind::Image, source, images)?;
        }
        if let Some(sampler) = def.sampler {
            check_index(EntityKind::Sampler, sampler, samplers)?;
        }
        Ok(Self {
            index,
            name: def.name.clone(),
            source: def.source,
            sampler: def.sampler,
        })
    }
}

/// Where an image's encoded bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Uri(String),
    BufferView { view: usize, mime_type: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub index: usize,
    pub name: Option<String>,
    pub source: ImageSource,
}

impl Image {
    pub(crate) fn from_def(index: usize, def: &GltfImage, views: usize) -> Result<Self> {
        let source = match (&def.uri, def.buffer_view) {
            (_, Some(view)) => {
                check_index(EntityKind::BufferView, view, views)?;
                ImageSource::BufferView {
                    view,
                    mime_type: def.mime_type.clone(),
                }
            }
            (Some(uri), None) => ImageSource::Uri(uri.clone()),
            (None, None) => {
                return Err(GltfError::InvalidGltf(format!(
                    "image {} has neither uri nor bufferView",
                    index
                )))
            }
        };
        Ok(Self {
            index,
            name: def.name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::GltfPbr;

    fn info(index: usize) -> GltfTextureInfo {
        GltfTextureInfo {
            index,
            tex_coord: 0,
            unknown: Default::default(),
        }
    }

    fn textures(n: usize) -> Vec<Texture> {
        (0..n)
            .map(|index| Texture {
                index,
                name: None,
                source: None,
                sampler: None,
            })
            .collect()
    }

    #[test]
    fn test_pbr_defaults() {
        let material = Material::from_def(0, &GltfMaterial::default(), &[]).unwrap();
        assert_eq!(material.pbr.base_color_factor, [1.0; 4]);
        assert_eq!(material.pbr.metallic_factor, 1.0);
        assert_eq!(material.pbr.roughness_factor, 1.0);
        assert_eq!(material.pbr.base_color(), ColorSource::Constant([1.0; 4]));
        assert!(material.emissive.is_none());
    }

    #[test]
    fn test_base_color_sources() {
        let mut def = GltfMaterial {
            pbr_metallic_roughness: Some(GltfPbr {
                base_color_texture: Some(info(0)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let material = Material::from_def(0, &def, &textures(1)).unwrap();
        assert!(matches!(material.pbr.base_color(), ColorSource::Texture(t) if t.texture == 0));

        def.pbr_metallic_roughness.as_mut().unwrap().base_color_factor = Some([0.5, 0.5, 0.5, 1.0]);
        let material = Material::from_def(0, &def, &textures(1)).unwrap();
        let texture = TextureRef {
            texture: 0,
            tex_coord: 0,
        };
        assert_eq!(
            material.pbr.base_color(),
            ColorSource::TextureWithFactor(texture, [0.5, 0.5, 0.5, 1.0])
        );
    }

    #[test]
    fn test_emissive_texture_defaults_factor() {
        let def = GltfMaterial {
            emissive_texture: Some(info(1)),
            ..Default::default()
        };
        let material = Material::from_def(3, &def, &textures(2)).unwrap();
        let emissive = material.emissive.unwrap();
        assert_eq!(emissive.factor, [1.0; 3]);
        assert_eq!(emissive.texture.unwrap().texture, 1);
        assert_eq!(material.index, Some(3));
    }

    #[test]
    fn test_bad_texture_index() {
        let def = GltfMaterial {
            emissive_texture: Some(info(4)),
            ..Default::default()
        };
        assert!(matches!(
            Material::from_def(0, &def, &textures(2)),
            Err(GltfError::IndexOutOfBounds { kind: EntityKind::Texture, index: 4, len: 2 })
        ));
    }

    #[test]
    fn test_synthesized_materials() {
        assert!(Material::vertex_color().vertex_color);
        assert!(Material::vertex_color().is_synthesized());
        assert!(!Material::default_material().vertex_color);
    }
}
