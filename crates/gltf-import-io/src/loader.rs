//! Buffer URI loading.
//!
//! `data:` URIs are decoded in place. Any other URI is handed to a
//! [`BufferLoader`], which resolves it against wherever the asset came from.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gltf_import_core::{GltfError, Result};
use log::debug;

/// Resolves external (non-`data:`) buffer URIs to their bytes.
pub trait BufferLoader {
    fn load(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Loads external buffers from the filesystem, relative to a base directory.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    base: Option<PathBuf>,
}

impl FsLoader {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Loader resolving URIs relative to the directory holding `file`.
    pub fn for_file<P: AsRef<Path>>(file: P) -> Self {
        Self::new(file.as_ref().parent().map(Path::to_path_buf))
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }
}

impl BufferLoader for FsLoader {
    fn load(&self, uri: &str) -> Result<Vec<u8>> {
        let decoded = String::from_utf8_lossy(&percent_decode(uri)).into_owned();
        let path = match &self.base {
            Some(base) => base.join(&decoded),
            None => PathBuf::from(&decoded),
        };
        debug!("Loading external buffer {}", path.display());
        Ok(fs::read(&path)?)
    }
}

/// Rejects every external URI. Used for self-contained inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedOnly;

impl BufferLoader for EmbeddedOnly {
    fn load(&self, uri: &str) -> Result<Vec<u8>> {
        Err(GltfError::Unsupported(format!(
            "external buffer '{}' without a loader",
            uri
        )))
    }
}

/// A parsed `data:[<mediatype>][;base64],<data>` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime_type: &'a str,
    pub base64: bool,
    pub data: &'a str,
}

impl<'a> DataUri<'a> {
    pub fn parse(uri: &'a str) -> Option<DataUri<'a>> {
        let rest = uri.strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let (mime_type, base64) = match header.strip_suffix(";base64") {
            Some(mime_type) => (mime_type, true),
            None => (header, false),
        };
        Some(DataUri {
            mime_type,
            base64,
            data,
        })
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        if self.base64 {
            BASE64
                .decode(self.data)
                .map_err(|e| GltfError::InvalidGltf(format!("invalid base64 in data URI: {}", e)))
        } else {
            Ok(percent_decode(self.data))
        }
    }
}

/// Loads the bytes behind a buffer or image URI.
pub fn load_uri(uri: &str, loader: &dyn BufferLoader) -> Result<Vec<u8>> {
    if uri.starts_with("data:") {
        let data_uri = DataUri::parse(uri)
            .ok_or_else(|| GltfError::InvalidGltf("Invalid data URI: no comma".into()))?;
        data_uri.decode()
    } else {
        loader.load(uri)
    }
}

/// Decodes `%XX` escapes. Malformed escapes are kept as literal text.
fn percent_decode(input: &str) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut rest = input.as_bytes();

    while let Some((&first, tail)) = rest.split_first() {
        let escaped = match tail {
            [h, l, ..] if first == b'%' && h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => {
                std::str::from_utf8(&tail[..2])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            }
            _ => None,
        };
        match escaped {
            Some(byte) => {
                output.push(byte);
                rest = &tail[2..];
            }
            None => {
                output.push(first);
                rest = tail;
            }
        }
    }

    output
}
