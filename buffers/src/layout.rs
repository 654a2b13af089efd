//! Attribute layouts and typed views.
//!
//! An [`AttributeLayout`] is an ordered set of named attribute elements that
//! share one item count. Each element owns its own byte storage with its own
//! stride, so a vertex layout with position, uv and color is stored as three
//! independent arrays.
//!
//! # Views
//!
//! Reading and writing goes through [`AttributeView`] and [`AttributeViewMut`],
//! obtained from the layout. A view borrows the layout, so any call that can
//! reallocate storage ([`AttributeLayout::resize`]) ends the view; fetch a new
//! one afterwards.
//!
//! ```ignore
//! let mut layout = AttributeLayout::new(LayoutDescriptor::vertex())?;
//! let position = layout.append_element(ElementDescriptor::position())?;
//! layout.resize(3)?;
//!
//! let mut positions = layout.view_mut(position)?;
//! positions.set_slice(0, &[Vec3::ZERO, Vec3::X, Vec3::Y])?;
//! ```
//!
//! # Sharing
//!
//! Cloning a layout duplicates the element list but both copies alias the same
//! bytes until one of them is resized. Views lock the shared storage without
//! blocking and fail with [`BufferError::StorageBorrowed`] on conflict.
//!
//! # Revision
//!
//! The revision counter increments on every content mutation made through
//! this layout's views or [`AttributeLayout::copy_items`]. Metadata changes
//! and resizing leave it untouched. Consumers compare it against the last
//! uploaded revision to decide whether to upload again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::accessor::{AttributeValue, Codec};
use crate::allocator::{Range, Relocation};
use crate::error::{BufferError, BufferResult};
use crate::format::{Format, FormatDescriptor};

/// What a layout's data is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutUsage {
    /// Per-vertex attributes (default).
    #[default]
    Vertex,
    /// Index data.
    Index,
    /// Per-instance attributes.
    Instance,
    /// Uniform data.
    Uniform,
}

/// Descriptor for creating an [`AttributeLayout`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LayoutDescriptor {
    /// Debug label for the layout.
    pub label: Option<String>,
    /// Binding usage.
    pub usage: LayoutUsage,
    /// Alignment the reported byte size is rounded up to.
    pub alignment: Option<usize>,
}

impl LayoutDescriptor {
    /// Create a descriptor with the given usage.
    pub fn new(usage: LayoutUsage) -> Self {
        Self {
            label: None,
            usage,
            alignment: None,
        }
    }

    /// Descriptor for a vertex layout.
    pub fn vertex() -> Self {
        Self::new(LayoutUsage::Vertex)
    }

    /// Descriptor for an index layout.
    pub fn index() -> Self {
        Self::new(LayoutUsage::Index)
    }

    /// Descriptor for an instance layout.
    pub fn instance() -> Self {
        Self::new(LayoutUsage::Instance)
    }

    /// Descriptor for a uniform layout, sized in multiples of 256 bytes.
    pub fn uniform() -> Self {
        Self::new(LayoutUsage::Uniform).with_alignment(256)
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Round the reported byte size up to `alignment` (must be a power of 2).
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

/// Descriptor for appending an element to a layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementDescriptor {
    /// Element name, unique within the layout.
    pub name: String,
    /// Data format.
    pub format: Format,
    /// Byte stride between items; the tight item size when `None`.
    pub stride: Option<usize>,
}

impl ElementDescriptor {
    /// Create a new element descriptor with a tight stride.
    pub fn new(name: impl Into<String>, format: Format) -> Self {
        Self {
            name: name.into(),
            format,
            stride: None,
        }
    }

    /// Set an explicit byte stride, e.g. to include GPU alignment padding.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }

    /// Create a position element (float3).
    pub fn position() -> Self {
        Self::new("position", Format::Rgb32Float)
    }

    /// Create a normal element (float3).
    pub fn normal() -> Self {
        Self::new("normal", Format::Rgb32Float)
    }

    /// Create a texcoord element (unorm16x2).
    pub fn uv() -> Self {
        Self::new("uv", Format::Rg16Unorm)
    }

    /// Create a color element (unorm8x4).
    pub fn color() -> Self {
        Self::new("color", Format::Rgba8Unorm)
    }

    /// Create an index element (u16 or u32).
    pub fn index(format: Format) -> Self {
        Self::new("index", format)
    }
}

/// One named attribute within a layout.
#[derive(Debug, Clone)]
pub struct AttributeElement {
    name: String,
    format: Format,
    stride: usize,
    item_size: usize,
    storage: Arc<RwLock<Vec<u8>>>,
}

impl AttributeElement {
    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Classification of the data format.
    pub fn descriptor(&self) -> FormatDescriptor {
        self.format.descriptor()
    }

    /// Byte stride between consecutive items.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Tight byte size of one item.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Returns true if another layout aliases this element's bytes.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.storage) > 1
    }
}

/// Upload metadata for one element, see [`AttributeLayout::bindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementBinding<'a> {
    /// Element name.
    pub name: &'a str,
    /// Data format.
    pub format: Format,
    /// Byte stride between items.
    pub stride: usize,
    /// Length of the element's storage in bytes.
    pub byte_len: usize,
}

/// Process-unique identity of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutId(u64);

impl LayoutId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// An ordered, named set of attribute elements sharing one item count.
#[derive(Debug)]
pub struct AttributeLayout {
    id: LayoutId,
    label: Option<String>,
    usage: LayoutUsage,
    alignment: Option<usize>,
    revision: u64,
    count: usize,
    elements: Vec<AttributeElement>,
}

impl AttributeLayout {
    /// Create an empty layout.
    ///
    /// Fails if the descriptor's alignment is not a power of 2.
    pub fn new(descriptor: LayoutDescriptor) -> BufferResult<Self> {
        if let Some(alignment) = descriptor.alignment {
            if !alignment.is_power_of_two() {
                return Err(BufferError::InvalidParameter(format!(
                    "alignment must be a power of 2, got {alignment}"
                )));
            }
        }
        Ok(Self {
            id: LayoutId::next(),
            label: descriptor.label,
            usage: descriptor.usage,
            alignment: descriptor.alignment,
            revision: 0,
            count: 0,
            elements: Vec::new(),
        })
    }

    /// Append an element and return its index, which never changes.
    ///
    /// The element gets zeroed storage for the current item count.
    pub fn append_element(&mut self, descriptor: ElementDescriptor) -> BufferResult<usize> {
        let ElementDescriptor {
            name,
            format,
            stride,
        } = descriptor;
        let item_size = format
            .byte_size()
            .ok_or(BufferError::UnsupportedFormat(format))?;
        let stride = stride.unwrap_or(item_size);
        if stride < item_size {
            return Err(BufferError::InvalidStride {
                format,
                stride,
                required: item_size,
            });
        }
        if self.element_index(&name).is_some() {
            return Err(BufferError::InvalidParameter(format!(
                "duplicate element name '{name}'"
            )));
        }
        let too_large =
            || BufferError::InvalidParameter(format!("element '{name}' is too large"));
        let bytes = stride.checked_mul(self.count).ok_or_else(too_large)?;
        let tight = self.stride().checked_add(item_size).ok_or_else(too_large)?;
        self.sized(tight, self.count).ok_or_else(too_large)?;

        self.elements.push(AttributeElement {
            name,
            format,
            stride,
            item_size,
            storage: Arc::new(RwLock::new(vec![0; bytes])),
        });
        Ok(self.elements.len() - 1)
    }

    /// Layout identity.
    pub fn id(&self) -> LayoutId {
        self.id
    }

    /// Debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Binding usage.
    pub fn usage(&self) -> LayoutUsage {
        self.usage
    }

    /// Content revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of items in every element.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Get an element by index.
    pub fn element(&self, index: usize) -> Option<&AttributeElement> {
        self.elements.get(index)
    }

    /// Iterate over elements in append order.
    pub fn elements(&self) -> impl Iterator<Item = &AttributeElement> {
        self.elements.iter()
    }

    /// Find an element index by name.
    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.name == name)
    }

    /// Sum of the tight item sizes of all elements.
    ///
    /// Declared strides may be larger when they include padding.
    pub fn stride(&self) -> usize {
        self.elements.iter().map(|e| e.item_size).sum()
    }

    /// Tight byte size of all items, rounded up to the layout's alignment.
    pub fn byte_size(&self) -> usize {
        // Representable for every count `resize` accepts.
        self.sized(self.stride(), self.count).unwrap_or(usize::MAX)
    }

    fn sized(&self, stride: usize, count: usize) -> Option<usize> {
        let size = stride.checked_mul(count)?;
        match self.alignment {
            Some(alignment) => align_up(size, alignment),
            None => Some(size),
        }
    }

    /// Upload metadata of every element, in append order.
    pub fn bindings(&self) -> impl Iterator<Item = ElementBinding<'_>> {
        let count = self.count;
        self.elements.iter().map(move |e| ElementBinding {
            name: &e.name,
            format: e.format,
            stride: e.stride,
            byte_len: e.stride * count,
        })
    }

    /// Change the item count of every element.
    ///
    /// Content is preserved up to `min(old, new)` items and new items are
    /// zeroed. Elements shared with a clone get fresh storage, which ends the
    /// sharing.
    pub fn resize(&mut self, count: usize) -> BufferResult<()> {
        if count == self.count {
            return Ok(());
        }
        self.check_resize(count)?;
        self.rebuild(count)?;

        log::debug!(
            "Resized layout {:?} ({}) from {} to {} items",
            self.label,
            self.id.0,
            self.count,
            count
        );
        self.count = count;
        Ok(())
    }

    /// Check whether [`resize`](Self::resize) to `count` items has
    /// representable sizes, both per element and for the whole layout.
    pub fn check_resize(&self, count: usize) -> BufferResult<()> {
        let fits = self
            .elements
            .iter()
            .all(|e| e.stride.checked_mul(count).is_some())
            && self.sized(self.stride(), count).is_some();
        if fits {
            Ok(())
        } else {
            Err(BufferError::InvalidParameter(format!(
                "cannot resize to {count} items"
            )))
        }
    }

    /// Give every element storage of its own, ending any sharing with clones.
    ///
    /// Afterwards no view or move on this layout can fail with
    /// [`BufferError::StorageBorrowed`]. Content and revision are unchanged.
    pub fn detach(&mut self) -> BufferResult<()> {
        if self.elements.iter().any(AttributeElement::is_shared) {
            self.rebuild(self.count)?;
        }
        Ok(())
    }

    /// Reallocate storage for `count` items, copying shared elements.
    fn rebuild(&mut self, count: usize) -> BufferResult<()> {
        // Copy shared storage first so a busy clone fails the call before
        // anything changes.
        let mut detached = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            if element.is_shared() {
                let old = element
                    .storage
                    .try_read()
                    .ok_or(BufferError::StorageBorrowed)?;
                let mut data = vec![0; element.stride * count];
                let keep = old.len().min(data.len());
                data[..keep].copy_from_slice(&old[..keep]);
                detached.push(Some(data));
            } else {
                detached.push(None);
            }
        }

        for (element, data) in self.elements.iter_mut().zip(detached) {
            let len = element.stride * count;
            match data {
                Some(data) => element.storage = Arc::new(RwLock::new(data)),
                None => match Arc::get_mut(&mut element.storage) {
                    Some(storage) => storage.get_mut().resize(len, 0),
                    None => element.storage = Arc::new(RwLock::new(vec![0; len])),
                },
            }
        }
        Ok(())
    }

    /// Move `from.len` items of every element from `from.start` to `to`.
    ///
    /// Overlapping ranges are handled like `memmove`.
    pub fn copy_items(&mut self, from: Range, to: usize) -> BufferResult<()> {
        self.relocate(&[Relocation { from, to }])
    }

    /// Apply a sequence of moves to every element, in order.
    ///
    /// All ranges are checked and all storage is locked before the first
    /// byte moves, so either every move happens or none does.
    pub fn relocate(&mut self, relocations: &[Relocation]) -> BufferResult<()> {
        for relocation in relocations {
            self.check_range(relocation.from)?;
            self.check_range(relocation.target())?;
        }
        let moves: Vec<&Relocation> = relocations
            .iter()
            .filter(|r| !r.from.is_empty() && r.from.start != r.to)
            .collect();
        if moves.is_empty() {
            return Ok(());
        }

        let mut guards = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let guard = element
                .storage
                .try_write()
                .ok_or(BufferError::StorageBorrowed)?;
            guards.push((element.stride, guard));
        }
        for (stride, data) in &mut guards {
            let stride = *stride;
            for relocation in &moves {
                let from = relocation.from;
                data.copy_within(
                    from.start * stride..from.end() * stride,
                    relocation.to * stride,
                );
            }
        }
        drop(guards);

        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    /// Read-only view over all items of an element.
    pub fn view(&self, element: usize) -> BufferResult<AttributeView<'_>> {
        self.view_range(element, Range::new(0, self.count))
    }

    /// Read-only view over a range of items; indices are relative to the range.
    pub fn view_range(&self, element: usize, range: Range) -> BufferResult<AttributeView<'_>> {
        self.check_range(range)?;
        let element = self
            .elements
            .get(element)
            .ok_or(BufferError::ElementNotFound(element))?;
        let data = element
            .storage
            .try_read()
            .ok_or(BufferError::StorageBorrowed)?;
        Ok(AttributeView {
            window: Window::new(element, range),
            data,
        })
    }

    /// Writable view over all items of an element.
    pub fn view_mut(&mut self, element: usize) -> BufferResult<AttributeViewMut<'_>> {
        self.view_range_mut(element, Range::new(0, self.count))
    }

    /// Writable view over a range of items; indices are relative to the range.
    pub fn view_range_mut(
        &mut self,
        element: usize,
        range: Range,
    ) -> BufferResult<AttributeViewMut<'_>> {
        self.check_range(range)?;
        let element = self
            .elements
            .get(element)
            .ok_or(BufferError::ElementNotFound(element))?;
        let data = element
            .storage
            .try_write()
            .ok_or(BufferError::StorageBorrowed)?;
        Ok(AttributeViewMut {
            window: Window::new(element, range),
            data,
            revision: &mut self.revision,
        })
    }

    fn check_range(&self, range: Range) -> BufferResult<()> {
        match range.start.checked_add(range.len) {
            Some(end) if end <= self.count => Ok(()),
            _ => Err(BufferError::InvalidRange(range)),
        }
    }
}

static_assertions::assert_impl_all!(AttributeLayout: Send, Sync);

impl Clone for AttributeLayout {
    /// Duplicate the element list; the clone aliases the same bytes and gets
    /// a fresh identity.
    fn clone(&self) -> Self {
        Self {
            id: LayoutId::next(),
            label: self.label.clone(),
            usage: self.usage,
            alignment: self.alignment,
            revision: self.revision,
            count: self.count,
            elements: self.elements.clone(),
        }
    }
}

/// Addressing shared by read-only and writable views.
#[derive(Debug, Clone, Copy)]
struct Window {
    format: Format,
    stride: usize,
    item_size: usize,
    base: usize,
    len: usize,
}

impl Window {
    fn new(element: &AttributeElement, range: Range) -> Self {
        Self {
            format: element.format,
            stride: element.stride,
            item_size: element.item_size,
            base: range.start,
            len: range.len,
        }
    }

    /// Byte offset of an item.
    #[inline]
    fn offset(&self, index: usize) -> BufferResult<usize> {
        if index >= self.len {
            return Err(BufferError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok((self.base + index) * self.stride)
    }

    /// Byte offset of the first item of a span.
    fn span(&self, offset: usize, count: usize) -> BufferResult<usize> {
        match offset.checked_add(count) {
            Some(end) if end <= self.len => Ok((self.base + offset) * self.stride),
            _ => Err(BufferError::IndexOutOfBounds {
                index: offset.saturating_add(count).saturating_sub(1),
                len: self.len,
            }),
        }
    }

    fn bytes<'d>(&self, data: &'d [u8]) -> &'d [u8] {
        &data[self.base * self.stride..(self.base + self.len) * self.stride]
    }

    fn get<T: AttributeValue>(&self, data: &[u8], index: usize) -> BufferResult<T> {
        let codec = Codec::resolve::<T>(self.format)?;
        let at = self.offset(index)?;
        Ok(codec.read(&data[at..]))
    }

    fn get_slice<T: AttributeValue>(
        &self,
        data: &[u8],
        offset: usize,
        out: &mut [T],
    ) -> BufferResult<()> {
        let codec = Codec::resolve::<T>(self.format)?;
        let start = self.span(offset, out.len())?;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = codec.read(&data[start + i * self.stride..]);
        }
        Ok(())
    }

    fn set<T: AttributeValue>(&self, data: &mut [u8], index: usize, value: T) -> BufferResult<()> {
        let codec = Codec::resolve::<T>(self.format)?;
        let at = self.offset(index)?;
        codec.write(&mut data[at..], value);
        Ok(())
    }

    fn set_slice<T: AttributeValue>(
        &self,
        data: &mut [u8],
        offset: usize,
        values: &[T],
    ) -> BufferResult<()> {
        let codec = Codec::resolve::<T>(self.format)?;
        let start = self.span(offset, values.len())?;

        if codec.is_identity() {
            let source: &[u8] = bytemuck::cast_slice(values);
            if self.stride == self.item_size {
                data[start..start + source.len()].copy_from_slice(source);
            } else {
                for (i, item) in source.chunks_exact(self.item_size).enumerate() {
                    let at = start + i * self.stride;
                    data[at..at + self.item_size].copy_from_slice(item);
                }
            }
            return Ok(());
        }

        for (i, value) in values.iter().enumerate() {
            codec.write(&mut data[start + i * self.stride..], *value);
        }
        Ok(())
    }
}

/// Read-only typed view over one element.
pub struct AttributeView<'a> {
    window: Window,
    data: RwLockReadGuard<'a, Vec<u8>>,
}

impl AttributeView<'_> {
    /// Number of addressable items.
    pub fn len(&self) -> usize {
        self.window.len
    }

    /// Returns true if the view has no items.
    pub fn is_empty(&self) -> bool {
        self.window.len == 0
    }

    /// Data format of the element.
    pub fn format(&self) -> Format {
        self.window.format
    }

    /// Byte stride between items.
    pub fn stride(&self) -> usize {
        self.window.stride
    }

    /// Read one item.
    pub fn get<T: AttributeValue>(&self, index: usize) -> BufferResult<T> {
        self.window.get(&self.data, index)
    }

    /// Read `out.len()` items starting at `offset`.
    pub fn get_slice<T: AttributeValue>(&self, offset: usize, out: &mut [T]) -> BufferResult<()> {
        self.window.get_slice(&self.data, offset, out)
    }

    /// Read every item.
    pub fn to_vec<T: AttributeValue>(&self) -> BufferResult<Vec<T>> {
        let mut out = vec![T::zeroed(); self.window.len];
        self.get_slice(0, &mut out)?;
        Ok(out)
    }

    /// Raw bytes of one item, without stride padding.
    pub fn item_bytes(&self, index: usize) -> BufferResult<&[u8]> {
        let at = self.window.offset(index)?;
        Ok(&self.data[at..at + self.window.item_size])
    }

    /// Raw bytes of the whole view, including stride padding.
    pub fn as_bytes(&self) -> &[u8] {
        self.window.bytes(&self.data)
    }
}

impl std::fmt::Debug for AttributeView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeView")
            .field("window", &self.window)
            .finish()
    }
}

/// Writable typed view over one element.
///
/// Every mutating call increments the owning layout's revision.
pub struct AttributeViewMut<'a> {
    window: Window,
    data: RwLockWriteGuard<'a, Vec<u8>>,
    revision: &'a mut u64,
}

impl AttributeViewMut<'_> {
    /// Number of addressable items.
    pub fn len(&self) -> usize {
        self.window.len
    }

    /// Returns true if the view has no items.
    pub fn is_empty(&self) -> bool {
        self.window.len == 0
    }

    /// Data format of the element.
    pub fn format(&self) -> Format {
        self.window.format
    }

    /// Byte stride between items.
    pub fn stride(&self) -> usize {
        self.window.stride
    }

    /// Read one item.
    pub fn get<T: AttributeValue>(&self, index: usize) -> BufferResult<T> {
        self.window.get(&self.data, index)
    }

    /// Read `out.len()` items starting at `offset`.
    pub fn get_slice<T: AttributeValue>(&self, offset: usize, out: &mut [T]) -> BufferResult<()> {
        self.window.get_slice(&self.data, offset, out)
    }

    /// Read every item.
    pub fn to_vec<T: AttributeValue>(&self) -> BufferResult<Vec<T>> {
        let mut out = vec![T::zeroed(); self.window.len];
        self.get_slice(0, &mut out)?;
        Ok(out)
    }

    /// Write one item.
    pub fn set<T: AttributeValue>(&mut self, index: usize, value: T) -> BufferResult<()> {
        self.window.set(&mut self.data, index, value)?;
        self.touch();
        Ok(())
    }

    /// Write `values` starting at `offset`.
    ///
    /// Produces exactly the bytes of calling [`set`](Self::set) per item, but
    /// copies whole blocks when the format is the value's natural one.
    pub fn set_slice<T: AttributeValue>(
        &mut self,
        offset: usize,
        values: &[T],
    ) -> BufferResult<()> {
        self.window.set_slice(&mut self.data, offset, values)?;
        self.touch();
        Ok(())
    }

    /// Write `value` to every item.
    pub fn fill<T: AttributeValue>(&mut self, value: T) -> BufferResult<()> {
        let codec = Codec::resolve::<T>(self.window.format)?;
        for index in 0..self.window.len {
            let at = (self.window.base + index) * self.window.stride;
            codec.write(&mut self.data[at..], value);
        }
        self.touch();
        Ok(())
    }

    /// Raw bytes of one item, without stride padding.
    pub fn item_bytes(&self, index: usize) -> BufferResult<&[u8]> {
        let at = self.window.offset(index)?;
        Ok(&self.data[at..at + self.window.item_size])
    }

    /// Writable raw bytes of one item, without stride padding.
    pub fn item_bytes_mut(&mut self, index: usize) -> BufferResult<&mut [u8]> {
        let at = self.window.offset(index)?;
        self.touch();
        Ok(&mut self.data[at..at + self.window.item_size])
    }

    /// Raw bytes of the whole view, including stride padding.
    pub fn as_bytes(&self) -> &[u8] {
        self.window.bytes(&self.data)
    }

    fn touch(&mut self) {
        *self.revision = self.revision.wrapping_add(1);
    }
}

impl std::fmt::Debug for AttributeViewMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeViewMut")
            .field("window", &self.window)
            .field("revision", &*self.revision)
            .finish()
    }
}

/// Align a value up to the given alignment, `None` on overflow.
#[inline]
fn align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    Some(value.checked_add(alignment - 1)? & !(alignment - 1))
}
