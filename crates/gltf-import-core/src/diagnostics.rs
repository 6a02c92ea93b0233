//! Non-fatal import diagnostics
//!
//! Problems that do not stop an import (unrecognized JSON keys, extensions,
//! features decoded without their full semantics) are collected here and
//! returned alongside the resolved graph.

use std::fmt;

use log::{info, warn};

/// The kind of glTF entity a diagnostic or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Document,
    Scene,
    Node,
    Mesh,
    Primitive,
    Material,
    Pbr,
    Texture,
    Image,
    Sampler,
    Camera,
    Skin,
    Accessor,
    BufferView,
    Buffer,
    Animation,
    Channel,
    AnimationSampler,
}

impl EntityKind {
    /// Name of the entity as it appears in glTF JSON.
    pub const fn name(self) -> &'static str {
        match self {
            EntityKind::Document => "document",
            EntityKind::Scene => "scene",
            EntityKind::Node => "node",
            EntityKind::Mesh => "mesh",
            EntityKind::Primitive => "primitive",
            EntityKind::Material => "material",
            EntityKind::Pbr => "pbrMetallicRoughness",
            EntityKind::Texture => "texture",
            EntityKind::Image => "image",
            EntityKind::Sampler => "sampler",
            EntityKind::Camera => "camera",
            EntityKind::Skin => "skin",
            EntityKind::Accessor => "accessor",
            EntityKind::BufferView => "bufferView",
            EntityKind::Buffer => "buffer",
            EntityKind::Animation => "animation",
            EntityKind::Channel => "channel",
            EntityKind::AnimationSampler => "animation sampler",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A JSON key this importer does not read.
    UnknownField(String),
    /// A primitive attribute semantic outside the recognized set.
    UnknownAttribute(String),
    /// A feature that was skipped or decoded without its full semantics.
    Unsupported(String),
    /// Data was usable but not as declared.
    Degraded(String),
}

impl DiagnosticKind {
    /// Returns true for kinds logged at warning level.
    pub fn is_warning(&self) -> bool {
        matches!(self, DiagnosticKind::Unsupported(_) | DiagnosticKind::Degraded(_))
    }
}

/// A single non-fatal finding, attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub entity: EntityKind,
    /// Index of the entity in its array; `None` for the document itself and
    /// for entities without one (primitives, channels are reported by parent).
    pub index: Option<usize>,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{} {}: ", self.entity, index)?,
            None => write!(f, "{}: ", self.entity)?,
        }
        match &self.kind {
            DiagnosticKind::UnknownField(key) => write!(f, "unknown field '{}'", key),
            DiagnosticKind::UnknownAttribute(name) => write!(f, "unknown attribute '{}'", name),
            DiagnosticKind::Unsupported(what) => write!(f, "unsupported: {}", what),
            DiagnosticKind::Degraded(what) => write!(f, "degraded: {}", what),
        }
    }
}

/// Ordered collection of diagnostics for one import.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and logs it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind.is_warning() {
            warn!("{}", diagnostic);
        } else {
            info!("{}", diagnostic);
        }
        self.entries.push(diagnostic);
    }

    fn record(&mut self, entity: EntityKind, index: Option<usize>, kind: DiagnosticKind) {
        self.push(Diagnostic { entity, index, kind });
    }

    pub fn unknown_field(&mut self, entity: EntityKind, index: Option<usize>, key: &str) {
        self.record(entity, index, DiagnosticKind::UnknownField(key.to_string()));
    }

    pub fn unknown_attribute(&mut self, entity: EntityKind, index: Option<usize>, name: &str) {
        self.record(entity, index, DiagnosticKind::UnknownAttribute(name.to_string()));
    }

    pub fn unsupported(&mut self, entity: EntityKind, index: Option<usize>, what: impl Into<String>) {
        self.record(entity, index, DiagnosticKind::Unsupported(what.into()));
    }

    pub fn degraded(&mut self, entity: EntityKind, index: Option<usize>, what: impl Into<String>) {
        self.record(entity, index, DiagnosticKind::Degraded(what.into()));
    }

    /// Reports every key of an entity's unrecognized-field map.
    ///
    /// An `extensions` object is reported as unsupported rather than unknown,
    /// naming each extension it carries.
    pub fn report_unknown_fields<'a, I>(&mut self, entity: EntityKind, index: Option<usize>, unknown: I)
    where
        I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
    {
        for (key, value) in unknown {
            if key == "extensions" {
                match value.as_object() {
                    Some(map) if !map.is_empty() => {
                        for name in map.keys() {
                            self.unsupported(entity, index, format!("extension {}", name));
                        }
                    }
                    _ => self.unsupported(entity, index, "extensions"),
                }
            } else if key != "extras" {
                self.unknown_field(entity, index, key);
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics of kinds logged at warning level.
    pub fn warning_count(&self) -> usize {
        self.entries.iter().filter(|d| d.kind.is_warning()).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
