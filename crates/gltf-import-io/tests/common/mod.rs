//! In-memory glTF/GLB fixtures for integration tests.
#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gltf_import_io::container::{GLB_CHUNK_BIN, GLB_CHUNK_JSON, GLB_MAGIC, GLB_VERSION};
use serde_json::{json, Value};

/// A document under construction plus its single binary buffer.
pub struct Fixture {
    json: Value,
    bin: Vec<u8>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            json: json!({
                "asset": {"version": "2.0"},
                "bufferViews": [],
                "accessors": [],
            }),
            bin: Vec::new(),
        }
    }

    /// Sets a top-level key such as `nodes` or `meshes`.
    pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.json[key] = value;
        self
    }

    pub fn json_mut(&mut self) -> &mut Value {
        &mut self.json
    }

    /// Appends bytes as a new buffer view and returns the view index.
    pub fn push_view(&mut self, bytes: &[u8]) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        push(
            &mut self.json["bufferViews"],
            json!({"buffer": 0, "byteOffset": offset, "byteLength": bytes.len()}),
        )
    }

    fn push_accessor(&mut self, bytes: &[u8], component_type: u32, count: usize, ty: &str) -> usize {
        let view = self.push_view(bytes);
        push(
            &mut self.json["accessors"],
            json!({"bufferView": view, "componentType": component_type, "count": count, "type": ty}),
        )
    }

    pub fn accessor_f32(&mut self, values: &[f32], ty: &str) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_accessor(&bytes, 5126, values.len() / components(ty), ty)
    }

    pub fn accessor_u16(&mut self, values: &[u16]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_accessor(&bytes, 5123, values.len(), "SCALAR")
    }

    pub fn accessor_u8(&mut self, values: &[u8], ty: &str) -> usize {
        self.push_accessor(values, 5121, values.len() / components(ty), ty)
    }

    /// A unit triangle as `POSITION`, returning its accessor index.
    pub fn triangle_positions(&mut self) -> usize {
        self.accessor_f32(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], "VEC3")
    }

    fn buffers(&self, uri: Option<String>) -> Value {
        let mut buffer = json!({"byteLength": self.bin.len()});
        if let Some(uri) = uri {
            buffer["uri"] = Value::String(uri);
        }
        json!([buffer])
    }

    fn document(&self, uri: Option<String>) -> Value {
        let mut json = self.json.clone();
        if !self.bin.is_empty() {
            json["buffers"] = self.buffers(uri);
        }
        json
    }

    pub fn bin(&self) -> &[u8] {
        &self.bin
    }

    /// Binary container: JSON chunk plus one BIN chunk.
    pub fn to_glb(&self) -> Vec<u8> {
        let json = serde_json::to_vec(&self.document(None)).unwrap();
        let mut chunks = vec![chunk(GLB_CHUNK_JSON, &json, b' ')];
        if !self.bin.is_empty() {
            chunks.push(chunk(GLB_CHUNK_BIN, &self.bin, 0));
        }
        glb(&chunks)
    }

    /// Text document with the buffer embedded as a `data:` URI.
    pub fn to_gltf(&self) -> Vec<u8> {
        let uri = format!("data:application/octet-stream;base64,{}", BASE64.encode(&self.bin));
        serde_json::to_vec(&self.document(Some(uri))).unwrap()
    }

    /// Text document referencing the buffer by relative `uri`.
    pub fn to_gltf_external(&self, uri: &str) -> Vec<u8> {
        serde_json::to_vec(&self.document(Some(uri.to_string()))).unwrap()
    }
}

fn components(ty: &str) -> usize {
    match ty {
        "SCALAR" => 1,
        "VEC2" => 2,
        "VEC3" => 3,
        "VEC4" | "MAT2" => 4,
        "MAT3" => 9,
        "MAT4" => 16,
        other => panic!("unknown accessor type {}", other),
    }
}

fn push(array: &mut Value, value: Value) -> usize {
    let array = array.as_array_mut().expect("fixture key is not an array");
    array.push(value);
    array.len() - 1
}

/// One GLB chunk, padded to four bytes with `pad`.
pub fn chunk(tag: u32, payload: &[u8], pad: u8) -> Vec<u8> {
    let mut payload = payload.to_vec();
    while payload.len() % 4 != 0 {
        payload.push(pad);
    }
    let mut out = Vec::with_capacity(8 + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// A GLB file from pre-built chunks.
pub fn glb(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body = chunks.concat();
    let mut out = Vec::with_capacity(12 + body.len());
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&((12 + body.len()) as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
