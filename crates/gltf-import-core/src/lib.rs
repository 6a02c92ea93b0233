//! glTF Import Core
//!
//! Leaf layer of the glTF scene importer: raw buffers, accessor layouts and
//! their decoding into typed element sequences, node transforms with axis
//! conversion, plus the error and diagnostic types shared by every layer.
//!
//! The container parser and the reference graph builder live in
//! `gltf-import-io`; this crate has no knowledge of the JSON document.
//!
//! # Example
//!
//! ```
//! use gltf_import_core::{decode_accessor, AccessorLayout, AccessorType, Buffer, BufferView, ComponentType};
//!
//! let buffers = vec![Buffer::new(0, 6, vec![0x01, 0x00, 0x02, 0x00, 0x03, 0x00])];
//! let views = vec![BufferView { buffer: 0, byte_offset: 0, byte_length: 6, byte_stride: None }];
//! let layout = AccessorLayout::packed(Some(0), ComponentType::UnsignedShort, AccessorType::Scalar, 3);
//!
//! let data = decode_accessor(0, &layout, &views, &buffers).unwrap();
//! assert_eq!(data.to_indices().unwrap(), vec![1, 2, 3]);
//! ```

pub mod accessor;
pub mod buffer;
pub mod component;
pub mod diagnostics;
pub mod error;
pub mod transform;

pub use accessor::{decode_accessor, AccessorCache, AccessorData, AccessorLayout, Elements};
pub use buffer::{Buffer, BufferView};
pub use component::{AccessorType, ComponentType};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, EntityKind};
pub use error::{GltfError, Resolve, Result};
pub use transform::{AxisConversion, LocalTransform, Srt};
