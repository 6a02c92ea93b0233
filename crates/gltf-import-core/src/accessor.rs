//! Accessor decoding
//!
//! An accessor describes a typed, strided view over a buffer view. Decoding
//! unpacks its `count` elements into native flat storage; the
//! [`AccessorCache`] guarantees each accessor index is decoded at most once
//! per import, every later request sharing the same [`Arc`].

use std::cell::OnceCell;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use num_traits::AsPrimitive;

use crate::buffer::{Buffer, BufferView};
use crate::component::{AccessorType, ComponentType};
use crate::diagnostics::EntityKind;
use crate::error::{GltfError, Resolve, Result};

/// Everything needed to locate and unpack an accessor's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorLayout {
    /// `None` means the accessor has no backing data and decodes to zeros.
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub accessor_type: AccessorType,
    pub count: usize,
    /// Integer values are meant to be rescaled to [0, 1] or [-1, 1]. Decoding
    /// returns the raw integers.
    pub normalized: bool,
    /// The accessor carries a sparse substitution block. Decoding ignores it.
    pub sparse: bool,
}

impl AccessorLayout {
    /// Layout of a tightly packed, dense accessor at offset zero of its view.
    pub fn packed(
        buffer_view: Option<usize>,
        component_type: ComponentType,
        accessor_type: AccessorType,
        count: usize,
    ) -> Self {
        Self {
            buffer_view,
            byte_offset: 0,
            component_type,
            accessor_type,
            count,
            normalized: false,
            sparse: false,
        }
    }

    /// Size in bytes of one element.
    pub fn element_size(&self) -> usize {
        self.component_type.byte_length() * self.accessor_type.component_count()
    }

    /// Decoded size in bytes, or `None` if it does not fit in `usize`.
    pub fn decoded_size(&self) -> Option<usize> {
        self.count.checked_mul(self.element_size())
    }

    /// Checks that accessor `index` can be decoded from `views`, without
    /// reading any data, and returns the stride between elements.
    ///
    /// Accessors without a buffer view decode to zeros and are limited to
    /// [`MAX_UNBACKED_BYTES`].
    pub fn validate(&self, index: usize, views: &[BufferView]) -> Result<usize> {
        let element_size = self.element_size();
        let Some(view_index) = self.buffer_view else {
            return match self.decoded_size() {
                Some(size) if size <= MAX_UNBACKED_BYTES => Ok(element_size),
                _ => Err(GltfError::InvalidGltf(format!(
                    "accessor {} declares {} {} elements without a bufferView",
                    index, self.count, self.accessor_type
                ))),
            };
        };

        let view = views.resolve(view_index, EntityKind::BufferView)?;
        let stride = view.byte_stride.unwrap_or(element_size);
        if stride < element_size {
            return Err(GltfError::InvalidGltf(format!(
                "accessor {} has {}-byte elements but bufferView {} strides {} bytes",
                index, element_size, view_index, stride
            )));
        }

        let required = if self.count == 0 {
            0
        } else {
            (self.count - 1)
                .checked_mul(stride)
                .and_then(|n| n.checked_add(self.byte_offset))
                .and_then(|n| n.checked_add(element_size))
                .unwrap_or(usize::MAX)
        };
        if required > view.byte_length {
            return Err(GltfError::AccessorOutOfBounds {
                accessor: index,
                required,
                available: view.byte_length,
            });
        }
        Ok(stride)
    }
}

/// Largest zero-filled accessor, in decoded bytes, that has no buffer view.
pub const MAX_UNBACKED_BYTES: usize = 1 << 28;

/// Flat element storage with a fixed number of components per element.
#[derive(Debug, Clone, PartialEq)]
pub struct Elements<T> {
    components: usize,
    values: Vec<T>,
}

impl<T> Elements<T> {
    pub fn new(components: usize, values: Vec<T>) -> Self {
        debug_assert!(components > 0);
        debug_assert_eq!(values.len() % components, 0);
        Self { components, values }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len() / self.components
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// Components of element `index`.
    pub fn get(&self, index: usize) -> Option<&[T]> {
        let start = index.checked_mul(self.components)?;
        self.values.get(start..start + self.components)
    }

    pub fn iter(&self) -> std::slice::ChunksExact<'_, T> {
        self.values.chunks_exact(self.components)
    }

    pub fn as_flat(&self) -> &[T] {
        &self.values
    }

    pub fn into_flat(self) -> Vec<T> {
        self.values
    }
}

impl<T: Copy> Elements<T> {
    /// Applies `f` to every component, keeping the element shape.
    pub fn map<U>(&self, f: impl FnMut(T) -> U) -> Elements<U> {
        Elements {
            components: self.components,
            values: self.values.iter().copied().map(f).collect(),
        }
    }
}

impl<T: Default + Clone> Elements<T> {
    pub fn zeroed(components: usize, count: usize) -> Self {
        Self::new(components, vec![T::default(); components * count])
    }
}

/// Decoded accessor contents in their native component type.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessorData {
    I8(Elements<i8>),
    U8(Elements<u8>),
    I16(Elements<i16>),
    U16(Elements<u16>),
    U32(Elements<u32>),
    F32(Elements<f32>),
}

macro_rules! each_variant {
    ($data:expr, $e:ident => $body:expr) => {
        match $data {
            AccessorData::I8($e) => $body,
            AccessorData::U8($e) => $body,
            AccessorData::I16($e) => $body,
            AccessorData::U16($e) => $body,
            AccessorData::U32($e) => $body,
            AccessorData::F32($e) => $body,
        }
    };
}

impl AccessorData {
    fn zeroed(component_type: ComponentType, components: usize, count: usize) -> Self {
        match component_type {
            ComponentType::Byte => AccessorData::I8(Elements::zeroed(components, count)),
            ComponentType::UnsignedByte => AccessorData::U8(Elements::zeroed(components, count)),
            ComponentType::Short => AccessorData::I16(Elements::zeroed(components, count)),
            ComponentType::UnsignedShort => AccessorData::U16(Elements::zeroed(components, count)),
            ComponentType::UnsignedInt => AccessorData::U32(Elements::zeroed(components, count)),
            ComponentType::Float => AccessorData::F32(Elements::zeroed(components, count)),
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            AccessorData::I8(_) => ComponentType::Byte,
            AccessorData::U8(_) => ComponentType::UnsignedByte,
            AccessorData::I16(_) => ComponentType::Short,
            AccessorData::U16(_) => ComponentType::UnsignedShort,
            AccessorData::U32(_) => ComponentType::UnsignedInt,
            AccessorData::F32(_) => ComponentType::Float,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        each_variant!(self, e => e.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of components per element.
    pub fn components(&self) -> usize {
        each_variant!(self, e => e.components())
    }

    /// Borrows float data without conversion.
    pub fn as_f32(&self) -> Option<&Elements<f32>> {
        match self {
            AccessorData::F32(e) => Some(e),
            _ => None,
        }
    }

    /// Converts every component to `f32`. Integer values are not normalized.
    pub fn to_f32(&self) -> Elements<f32> {
        fn convert<T: AsPrimitive<f32>>(e: &Elements<T>) -> Elements<f32> {
            e.map(|v| v.as_())
        }
        each_variant!(self, e => convert(e))
    }

    /// Returns the data as vertex indices.
    ///
    /// Only unsigned integral scalar accessors qualify; anything else yields
    /// `None`.
    pub fn to_indices(&self) -> Option<Vec<u32>> {
        if self.components() != 1 {
            return None;
        }
        match self {
            AccessorData::U8(e) => Some(e.as_flat().iter().map(|&v| u32::from(v)).collect()),
            AccessorData::U16(e) => Some(e.as_flat().iter().map(|&v| u32::from(v)).collect()),
            AccessorData::U32(e) => Some(e.as_flat().to_vec()),
            _ => None,
        }
    }

    /// Converts to fixed-size `f32` arrays, or `None` if elements do not
    /// have exactly `N` components.
    pub fn to_arrays<const N: usize>(&self) -> Option<Vec<[f32; N]>> {
        if self.components() != N {
            return None;
        }
        let floats = self.to_f32();
        Some(
            floats
                .iter()
                .map(|chunk| {
                    let mut out = [0.0f32; N];
                    out.copy_from_slice(chunk);
                    out
                })
                .collect(),
        )
    }
}

fn unpack<T>(bytes: &[u8], layout: &AccessorLayout, stride: usize, read: impl Fn(&[u8]) -> T) -> Elements<T> {
    let width = layout.component_type.byte_length();
    let components = layout.accessor_type.component_count();
    let mut values = Vec::with_capacity(layout.count * components);
    for i in 0..layout.count {
        let start = layout.byte_offset + i * stride;
        for c in 0..components {
            let at = start + c * width;
            values.push(read(&bytes[at..at + width]));
        }
    }
    Elements::new(components, values)
}

/// Decodes accessor `index` described by `layout`.
///
/// Elements start at `view.byteOffset + layout.byte_offset` and are
/// `byteStride` bytes apart (tightly packed when the view has no stride).
/// The layout must pass [`AccessorLayout::validate`].
pub fn decode_accessor(
    index: usize,
    layout: &AccessorLayout,
    views: &[BufferView],
    buffers: &[Buffer],
) -> Result<AccessorData> {
    let stride = layout.validate(index, views)?;
    let Some(view_index) = layout.buffer_view else {
        let components = layout.accessor_type.component_count();
        return Ok(AccessorData::zeroed(layout.component_type, components, layout.count));
    };
    let bytes = views.resolve(view_index, EntityKind::BufferView)?.bytes(view_index, buffers)?;

    let data = match layout.component_type {
        ComponentType::Byte => AccessorData::I8(unpack(bytes, layout, stride, |b| b[0] as i8)),
        ComponentType::UnsignedByte => AccessorData::U8(unpack(bytes, layout, stride, |b| b[0])),
        ComponentType::Short => AccessorData::I16(unpack(bytes, layout, stride, LittleEndian::read_i16)),
        ComponentType::UnsignedShort => {
            AccessorData::U16(unpack(bytes, layout, stride, LittleEndian::read_u16))
        }
        ComponentType::UnsignedInt => AccessorData::U32(unpack(bytes, layout, stride, LittleEndian::read_u32)),
        ComponentType::Float => AccessorData::F32(unpack(bytes, layout, stride, LittleEndian::read_f32)),
    };
    Ok(data)
}

/// Per-import decode cache, one slot per accessor index.
#[derive(Debug, Default)]
pub struct AccessorCache {
    cells: Vec<OnceCell<Arc<AccessorData>>>,
}

impl AccessorCache {
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| OnceCell::new()).collect(),
        }
    }

    /// Number of accessor slots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cached data for `index` if it has been decoded.
    pub fn get(&self, index: usize) -> Option<Arc<AccessorData>> {
        self.cells.get(index)?.get().cloned()
    }

    /// Returns the cached data for `index`, running `decode` on first use.
    ///
    /// A failed decode leaves the slot empty.
    pub fn get_or_decode<F>(&self, index: usize, decode: F) -> Result<Arc<AccessorData>>
    where
        F: FnOnce() -> Result<AccessorData>,
    {
        let cell = self.cells.resolve(index, EntityKind::Accessor)?;
        if let Some(data) = cell.get() {
            return Ok(Arc::clone(data));
        }
        let data = Arc::new(decode()?);
        Ok(Arc::clone(cell.get_or_init(|| data)))
    }

    /// Number of accessors decoded so far.
    pub fn decoded_count(&self) -> usize {
        self.cells.iter().filter(|c| c.get().is_some()).count()
    }
}
