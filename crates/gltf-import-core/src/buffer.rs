//! Buffer management
//!
//! A [`Buffer`] owns the bytes behind one entry of the document's `buffers`
//! array. A [`BufferView`] names a byte sub-range of a buffer and is resolved
//! into a slice on demand; views are never materialized as separate copies.

use std::sync::Arc;

use crate::diagnostics::EntityKind;
use crate::error::{GltfError, Resolve, Result};

/// A raw binary blob, decoded from a GLB chunk, a data URI or an external file.
///
/// Cloning is cheap: the bytes are shared by every accessor reading from them.
#[derive(Debug, Clone)]
pub struct Buffer {
    index: usize,
    byte_length: usize,
    data: Arc<[u8]>,
}

impl Buffer {
    /// Creates a buffer from its declared byte length and actual contents.
    ///
    /// The two lengths may disagree (GLB chunks are padded to 4 bytes); range
    /// checks are always made against the actual contents.
    pub fn new(index: usize, byte_length: usize, data: Vec<u8>) -> Self {
        Self {
            index,
            byte_length,
            data: data.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte length declared in the document.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes actually held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true when fewer bytes were loaded than the document declares.
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.byte_length
    }

    /// Returns `length` bytes starting at `offset`, or `None` if the range
    /// leaves the buffer.
    pub fn slice(&self, offset: usize, length: usize) -> Option<&[u8]> {
        let end = offset.checked_add(length)?;
        self.data.get(offset..end)
    }
}

/// A byte sub-range of a [`Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Distance in bytes between the starts of consecutive elements, for
    /// interleaved vertex data. `None` means tightly packed.
    pub byte_stride: Option<usize>,
}

impl BufferView {
    /// Resolves this view (with index `view_index`, used for error reporting)
    /// into the byte slice it covers.
    pub fn bytes<'a>(&self, view_index: usize, buffers: &'a [Buffer]) -> Result<&'a [u8]> {
        let buffer = buffers.resolve(self.buffer, EntityKind::Buffer)?;
        buffer
            .slice(self.byte_offset, self.byte_length)
            .ok_or(GltfError::ViewOutOfBounds {
                view: view_index,
                buffer: self.buffer,
                start: self.byte_offset,
                end: self.byte_offset.saturating_add(self.byte_length),
                buffer_len: buffer.len(),
            })
    }
}
