//! Error handling for glTF import operations
//!
//! Every failure here is fatal: the import is aborted and no partial graph is
//! returned. Tolerated problems (unknown fields, unsupported features) are
//! reported through [`crate::diagnostics`] instead.

use std::io;

use thiserror::Error;

use crate::diagnostics::EntityKind;

/// Errors that can occur when importing a glTF asset.
#[derive(Error, Debug)]
pub enum GltfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GLB container at byte {offset}: {reason}")]
    InvalidContainer { offset: usize, reason: String },

    #[error("{kind} index {index} out of bounds ({len} defined)")]
    IndexOutOfBounds {
        kind: EntityKind,
        index: usize,
        len: usize,
    },

    #[error("bufferView {view} spans bytes {start}..{end} but buffer {buffer} holds {buffer_len}")]
    ViewOutOfBounds {
        view: usize,
        buffer: usize,
        start: usize,
        end: usize,
        buffer_len: usize,
    },

    #[error("accessor {accessor} needs {required} bytes of its bufferView but only {available} are available")]
    AccessorOutOfBounds {
        accessor: usize,
        required: usize,
        available: usize,
    },

    #[error("GLB carries {chunks} binary chunks but the document declares {buffers} buffers")]
    BufferCountMismatch { chunks: usize, buffers: usize },

    #[error("buffer {buffer} has no binary chunk and no uri")]
    MissingBufferData { buffer: usize },

    #[error("Invalid glTF: {0}")]
    InvalidGltf(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

impl GltfError {
    /// Creates an out-of-bounds error for a reference into an entity array.
    pub fn out_of_bounds(kind: EntityKind, index: usize, len: usize) -> Self {
        GltfError::IndexOutOfBounds { kind, index, len }
    }

    /// Returns true for errors raised by malformed document structure, as
    /// opposed to I/O failures.
    pub fn is_structural(&self) -> bool {
        !matches!(self, GltfError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, GltfError>;

/// Bounds-checked lookup of an index reference into an entity array.
///
/// All cross-references in a glTF document are integer indices into sibling
/// arrays; resolving through this trait turns a dangling index into a
/// [`GltfError::IndexOutOfBounds`] naming the array it pointed into.
pub trait Resolve<T> {
    fn resolve(&self, index: usize, kind: EntityKind) -> Result<&T>;
}

impl<T> Resolve<T> for [T] {
    fn resolve(&self, index: usize, kind: EntityKind) -> Result<&T> {
        self.get(index)
            .ok_or_else(|| GltfError::out_of_bounds(kind, index, self.len()))
    }
}

impl<T> Resolve<T> for Vec<T> {
    fn resolve(&self, index: usize, kind: EntityKind) -> Result<&T> {
        self.as_slice().resolve(index, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_in_bounds() {
        let views = vec![10, 20, 30];
        assert_eq!(*views.resolve(2, EntityKind::BufferView).unwrap(), 30);
    }

    #[test]
    fn test_resolve_out_of_bounds() {
        let views = vec![10, 20, 30];
        match views.resolve(99, EntityKind::BufferView) {
            Err(GltfError::IndexOutOfBounds { kind, index, len }) => {
                assert_eq!(kind, EntityKind::BufferView);
                assert_eq!(index, 99);
                assert_eq!(len, 3);
            }
            other => panic!("expected IndexOutOfBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let err = GltfError::out_of_bounds(EntityKind::Accessor, 7, 2);
        assert_eq!(format!("{}", err), "accessor index 7 out of bounds (2 defined)");

        let err = GltfError::InvalidContainer {
            offset: 12,
            reason: "chunk extends past end of file".into(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid GLB container at byte 12: chunk extends past end of file"
        );
    }

    #[test]
    fn test_from_conversions() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: GltfError = io_error.into();
        assert!(matches!(err, GltfError::Io(_)));
        assert!(!err.is_structural());

        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GltfError = json_error.into();
        assert!(err.is_structural());
    }
}
