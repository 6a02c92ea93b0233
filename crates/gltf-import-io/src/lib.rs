//! glTF 2.0 importer: container parsing and scene graph resolution.
//!
//! This crate reads `.glb` and `.gltf` inputs into a fully resolved,
//! validated scene graph. Every index reference is bounds-checked, accessor
//! data is decoded on demand and cached, and animation channels are attached
//! to the nodes they drive.
//!
//! # Supported Inputs
//!
//! | Input | Buffers |
//! |-------|---------|
//! | GLB   | binary chunks, in stream order; `uri` for buffers past the last chunk |
//! | glTF  | external files relative to the document, or `data:` URIs |
//!
//! # Example
//!
//! ```ignore
//! use gltf_import_io::{import_with, ImportOptions};
//! use gltf_import_core::AxisConversion;
//!
//! let options = ImportOptions::default().with_axis_conversion(AxisConversion::Identity);
//! let gltf = import_with("model.glb", &options)?;
//! for (depth, node) in gltf.root_scene().walk() {
//!     println!("{:indent$}{}", "", node.display_name(), indent = depth * 2);
//! }
//! for diagnostic in gltf.diagnostics() {
//!     eprintln!("{}", diagnostic);
//! }
//! ```
//!
//! Hosts that create their own objects implement [`Materializer`] and call
//! [`materialize`].

use std::fs;
use std::path::{Path, PathBuf};

use gltf_import_core::{AxisConversion, Diagnostics, EntityKind, GltfError, Result};
use log::debug;

pub mod animation;
pub mod camera;
pub mod container;
pub mod document;
pub mod graph;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod skin;
pub mod traits;

pub use animation::{Animation, Channel, Interpolation, Keyframe, Keyframes, TargetPath};
pub use camera::{Camera, Projection};
pub use container::{Container, ContainerFormat};
pub use document::Document;
pub use graph::Gltf;
pub use loader::{BufferLoader, EmbeddedOnly, FsLoader};
pub use material::{ColorSource, Emissive, Image, ImageSource, Material, Pbr, Texture, TextureRef};
pub use mesh::{Mesh, MorphTarget, Primitive, PrimitiveMode, Semantic};
pub use scene::{Node, Scene};
pub use skin::Skin;
pub use traits::{materialize, materialize_scene, Materializer};

/// Options controlling an import.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Coordinate conversion reported with the graph and applied by the
    /// `converted*` accessors.
    pub axis_conversion: AxisConversion,
    /// Directory external buffers are resolved against. Defaults to the
    /// input file's directory.
    pub base_path: Option<PathBuf>,
    /// Build every scene, not just the root scene.
    pub secondary_scenes: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            axis_conversion: AxisConversion::default(),
            base_path: None,
            secondary_scenes: true,
        }
    }
}

impl ImportOptions {
    pub fn with_axis_conversion(mut self, axis_conversion: AxisConversion) -> Self {
        self.axis_conversion = axis_conversion;
        self
    }

    pub fn with_base_path<P: Into<PathBuf>>(mut self, base_path: P) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_secondary_scenes(mut self, secondary_scenes: bool) -> Self {
        self.secondary_scenes = secondary_scenes;
        self
    }
}

/// Imports a `.glb` or `.gltf` file with default options.
pub fn import<P: AsRef<Path>>(path: P) -> Result<Gltf> {
    import_with(path, &ImportOptions::default())
}

/// Imports a `.glb` or `.gltf` file.
pub fn import_with<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<Gltf> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let loader = match &options.base_path {
        Some(base) => FsLoader::new(Some(base.clone())),
        None => FsLoader::for_file(path),
    };
    debug!("Importing {} ({} bytes)", path.display(), data.len());
    import_slice(&data, &loader, options)
}

/// Imports from in-memory bytes, loading external buffers through `loader`.
pub fn import_slice(data: &[u8], loader: &dyn BufferLoader, options: &ImportOptions) -> Result<Gltf> {
    let mut diagnostics = Diagnostics::new();
    let container = Container::from_slice(data, loader, &mut diagnostics)?;
    graph::build(container, diagnostics, options)
}

pub(crate) fn check_index(kind: EntityKind, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(GltfError::out_of_bounds(kind, index, len))
    }
}
