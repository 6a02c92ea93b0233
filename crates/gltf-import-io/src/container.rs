//! Container framing for `.glb` and `.gltf` inputs.
//!
//! A GLB file is a 12-byte header followed by chunks. The first chunk holds
//! the JSON document; every later chunk is a binary payload, assigned to the
//! document's `buffers` in stream order. Text input is the JSON document on
//! its own, with buffers behind URIs.

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use gltf_import_core::{Buffer, Diagnostics, EntityKind, GltfError, Result};
use log::{debug, warn};

use crate::document::Document;
use crate::loader::{load_uri, BufferLoader, FsLoader};

// ============================================================================
// GLB Binary Format Constants
// ============================================================================

pub const GLB_MAGIC: u32 = 0x46546C67; // "glTF" in little-endian
pub const GLB_VERSION: u32 = 2;
pub const GLB_CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
pub const GLB_CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

const GLB_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Which framing the input used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Binary `.glb` container.
    Glb { version: u32 },
    /// Plain JSON `.gltf` text.
    Json,
}

/// A parsed document together with the bytes of every buffer it declares.
#[derive(Debug, Clone)]
pub struct Container {
    pub format: ContainerFormat,
    pub document: Document,
    /// One entry per `buffers` element, in order.
    pub buffers: Vec<Buffer>,
}

struct Chunk<'a> {
    offset: usize,
    tag: u32,
    data: &'a [u8],
}

impl Container {
    /// Open a `.glb` or `.gltf` file.
    ///
    /// The format is detected from the magic bytes. External buffers are
    /// resolved relative to the file's directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<(Self, Diagnostics)> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let loader = FsLoader::for_file(path);
        let mut diagnostics = Diagnostics::new();
        let container = Self::from_slice(&data, &loader, &mut diagnostics)?;
        Ok((container, diagnostics))
    }

    /// Parse from in-memory bytes, detecting GLB by its magic.
    pub fn from_slice(data: &[u8], loader: &dyn BufferLoader, diagnostics: &mut Diagnostics) -> Result<Self> {
        if is_glb(data) {
            Self::from_glb(data, loader, diagnostics)
        } else {
            Self::from_json(data, loader, diagnostics)
        }
    }

    /// Parse from GLB binary data.
    pub fn from_glb(data: &[u8], loader: &dyn BufferLoader, diagnostics: &mut Diagnostics) -> Result<Self> {
        if data.len() < GLB_HEADER_LEN {
            return Err(GltfError::InvalidContainer {
                offset: 0,
                reason: "file too small for GLB header".into(),
            });
        }
        let magic = LittleEndian::read_u32(&data[0..4]);
        if magic != GLB_MAGIC {
            return Err(GltfError::InvalidContainer {
                offset: 0,
                reason: "invalid GLB magic".into(),
            });
        }
        let version = LittleEndian::read_u32(&data[4..8]);
        if version != GLB_VERSION {
            warn!("GLB declares version {}, reading as version {}", version, GLB_VERSION);
        }
        let declared = LittleEndian::read_u32(&data[8..12]) as usize;
        if declared != data.len() {
            warn!("GLB header declares {} bytes but {} were read", declared, data.len());
        }

        let chunks = read_chunks(data)?;
        let (json, binary) = match chunks.split_first() {
            Some((first, rest)) if first.tag == GLB_CHUNK_JSON => (first, rest),
            Some(_) => {
                return Err(GltfError::InvalidContainer {
                    offset: GLB_HEADER_LEN,
                    reason: "first chunk is not JSON".into(),
                })
            }
            None => {
                return Err(GltfError::InvalidContainer {
                    offset: GLB_HEADER_LEN,
                    reason: "no JSON chunk".into(),
                })
            }
        };
        debug!("GLB v{}: JSON chunk of {} bytes, {} binary chunks", version, json.data.len(), binary.len());

        let document = Document::from_slice(json.data)?;
        if binary.len() > document.buffers.len() {
            return Err(GltfError::BufferCountMismatch {
                chunks: binary.len(),
                buffers: document.buffers.len(),
            });
        }

        let mut buffers = Vec::with_capacity(document.buffers.len());
        for (i, def) in document.buffers.iter().enumerate() {
            let bytes = if let Some(chunk) = binary.get(i) {
                if chunk.tag != GLB_CHUNK_BIN {
                    diagnostics.degraded(
                        EntityKind::Buffer,
                        Some(i),
                        format!("chunk at byte {} has tag {:#010x} instead of BIN", chunk.offset, chunk.tag),
                    );
                }
                chunk.data.to_vec()
            } else if let Some(uri) = &def.uri {
                load_uri(uri, loader)?
            } else {
                return Err(GltfError::MissingBufferData { buffer: i });
            };
            buffers.push(checked_buffer(i, def.byte_length, bytes, diagnostics));
        }

        Ok(Self {
            format: ContainerFormat::Glb { version },
            document,
            buffers,
        })
    }

    /// Parse from glTF JSON text, loading each buffer through its URI.
    pub fn from_json(data: &[u8], loader: &dyn BufferLoader, diagnostics: &mut Diagnostics) -> Result<Self> {
        let document = Document::from_slice(data)?;

        let mut buffers = Vec::with_capacity(document.buffers.len());
        for (i, def) in document.buffers.iter().enumerate() {
            let uri = def
                .uri
                .as_deref()
                .ok_or(GltfError::MissingBufferData { buffer: i })?;
            let bytes = load_uri(uri, loader)?;
            buffers.push(checked_buffer(i, def.byte_length, bytes, diagnostics));
        }

        Ok(Self {
            format: ContainerFormat::Json,
            document,
            buffers,
        })
    }
}

/// Returns true if `data` starts with the GLB magic.
pub fn is_glb(data: &[u8]) -> bool {
    data.len() >= 4 && LittleEndian::read_u32(&data[0..4]) == GLB_MAGIC
}

fn read_chunks(data: &[u8]) -> Result<Vec<Chunk<'_>>> {
    let mut chunks = Vec::new();
    let mut offset = GLB_HEADER_LEN;

    while offset + CHUNK_HEADER_LEN <= data.len() {
        let length = LittleEndian::read_u32(&data[offset..offset + 4]) as usize;
        let tag = LittleEndian::read_u32(&data[offset + 4..offset + 8]);
        let start = offset + CHUNK_HEADER_LEN;
        let end = start
            .checked_add(length)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| GltfError::InvalidContainer {
                offset,
                reason: format!("chunk of {} bytes extends past end of file", length),
            })?;

        chunks.push(Chunk {
            offset,
            tag,
            data: &data[start..end],
        });
        offset = end;
    }

    if offset < data.len() {
        debug!("Ignoring {} trailing bytes after last GLB chunk", data.len() - offset);
    }
    Ok(chunks)
}

fn checked_buffer(index: usize, byte_length: usize, bytes: Vec<u8>, diagnostics: &mut Diagnostics) -> Buffer {
    let buffer = Buffer::new(index, byte_length, bytes);
    if buffer.is_truncated() {
        diagnostics.degraded(
            EntityKind::Buffer,
            Some(index),
            format!("holds {} of {} declared bytes", buffer.len(), byte_length),
        );
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::EmbeddedOnly;

    fn chunk(tag: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn glb(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = Vec::new();
        out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        out.extend_from_slice(&GLB_VERSION.to_le_bytes());
        out.extend_from_slice(&((12 + body.len()) as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_glb_with_bin_chunk() {
        let json = br#"{"buffers":[{"byteLength":4}]}"#;
        let data = glb(&[chunk(GLB_CHUNK_JSON, json), chunk(GLB_CHUNK_BIN, &[1, 2, 3, 4])]);
        let mut diagnostics = Diagnostics::new();
        let container = Container::from_slice(&data, &EmbeddedOnly, &mut diagnostics).unwrap();
        assert_eq!(container.format, ContainerFormat::Glb { version: 2 });
        assert_eq!(container.buffers.len(), 1);
        assert_eq!(container.buffers[0].data(), &[1, 2, 3, 4]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_too_small() {
        let mut diagnostics = Diagnostics::new();
        let data = b"glTF\x02\x00\x00\x00";
        assert!(matches!(
            Container::from_glb(data, &EmbeddedOnly, &mut diagnostics),
            Err(GltfError::InvalidContainer { offset: 0, .. })
        ));
    }

    #[test]
    fn test_chunk_past_end() {
        let mut data = glb(&[chunk(GLB_CHUNK_JSON, b"{}")]);
        // Claim a longer JSON chunk than is present.
        data[12..16].copy_from_slice(&100u32.to_le_bytes());
        let mut diagnostics = Diagnostics::new();
        assert!(matches!(
            Container::from_slice(&data, &EmbeddedOnly, &mut diagnostics),
            Err(GltfError::InvalidContainer { offset: 12, .. })
        ));
    }

    #[test]
    fn test_first_chunk_must_be_json() {
        let data = glb(&[chunk(GLB_CHUNK_BIN, &[0; 4])]);
        let mut diagnostics = Diagnostics::new();
        assert!(matches!(
            Container::from_slice(&data, &EmbeddedOnly, &mut diagnostics),
            Err(GltfError::InvalidContainer { .. })
        ));
    }

    #[test]
    fn test_more_chunks_than_buffers() {
        let json = br#"{"buffers":[{"byteLength":4}]}"#;
        let data = glb(&[
            chunk(GLB_CHUNK_JSON, json),
            chunk(GLB_CHUNK_BIN, &[0; 4]),
            chunk(GLB_CHUNK_BIN, &[0; 4]),
        ]);
        let mut diagnostics = Diagnostics::new();
        assert!(matches!(
            Container::from_slice(&data, &EmbeddedOnly, &mut diagnostics),
            Err(GltfError::BufferCountMismatch { chunks: 2, buffers: 1 })
        ));
    }

    #[test]
    fn test_buffer_without_chunk_or_uri() {
        let json = br#"{"buffers":[{"byteLength":4},{"byteLength":4}]}"#;
        let data = glb(&[chunk(GLB_CHUNK_JSON, json), chunk(GLB_CHUNK_BIN, &[0; 4])]);
        let mut diagnostics = Diagnostics::new();
        assert!(matches!(
            Container::from_slice(&data, &EmbeddedOnly, &mut diagnostics),
            Err(GltfError::MissingBufferData { buffer: 1 })
        ));
    }

    #[test]
    fn test_unexpected_chunk_tag_is_degraded() {
        let json = br#"{"buffers":[{"byteLength":2}]}"#;
        let data = glb(&[chunk(GLB_CHUNK_JSON, json), chunk(0x1234_5678, &[9, 9])]);
        let mut diagnostics = Diagnostics::new();
        let container = Container::from_slice(&data, &EmbeddedOnly, &mut diagnostics).unwrap();
        assert_eq!(container.buffers[0].data(), &[9, 9]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_json_with_data_uri() {
        let json = br#"{"buffers":[{"byteLength":3,"uri":"data:application/octet-stream;base64,AAEC"}]}"#;
        let mut diagnostics = Diagnostics::new();
        let container = Container::from_slice(json, &EmbeddedOnly, &mut diagnostics).unwrap();
        assert_eq!(container.format, ContainerFormat::Json);
        assert_eq!(container.buffers[0].data(), &[0, 1, 2]);
    }

    #[test]
    fn test_short_buffer_is_degraded() {
        let json = br#"{"buffers":[{"byteLength":8,"uri":"data:application/octet-stream;base64,AAEC"}]}"#;
        let mut diagnostics = Diagnostics::new();
        let container = Container::from_slice(json, &EmbeddedOnly, &mut diagnostics).unwrap();
        assert!(container.buffers[0].is_truncated());
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_json_buffer_needs_uri() {
        let json = br#"{"buffers":[{"byteLength":3}]}"#;
        let mut diagnostics = Diagnostics::new();
        assert!(matches!(
            Container::from_slice(json, &EmbeddedOnly, &mut diagnostics),
            Err(GltfError::MissingBufferData { buffer: 0 })
        ));
    }
}
