//! Dynamic mesh building over shared vertex and index buffers.
//!
//! A [`DynamicMeshBuilder`] packs many small meshes (UI canvases, debug
//! geometry, streamed chunks) into one vertex [`DynamicBuffer`] and one index
//! [`DynamicBuffer`]. Each mesh is addressed by a [`MeshHandle`]; its ranges
//! may move when a buffer compacts, but the handle keeps resolving to the
//! same geometry.
//!
//! Indices are stored as absolute vertex offsets, so a vertex relocation
//! rewrites the indices of the moved mesh in the same call.
//!
//! # Example
//!
//! ```ignore
//! let mut vertices = AttributeLayout::new(LayoutDescriptor::vertex())?;
//! let position = vertices.append_element(ElementDescriptor::position())?;
//!
//! let mut builder = DynamicMeshBuilder::new(vertices, MeshBuilderConfig::default())?;
//! let quad = builder.allocate(4, 6)?;
//! builder
//!     .map_vertices(quad, position)?
//!     .set_slice(0, &[Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::Y])?;
//! builder.write_indices(quad, &[0, 1, 2, 0, 2, 3])?;
//! ```

use std::collections::HashMap;

use crate::allocator::{AllocatorConfig, AllocatorStats, Range, Relocation};
use crate::dynamic::DynamicBuffer;
use crate::error::{BufferError, BufferResult};
use crate::format::Format;
use crate::layout::{AttributeLayout, AttributeViewMut, ElementDescriptor, LayoutDescriptor};

/// Index data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned integers (max 65536 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers (max ~4 billion vertices).
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }

    /// Storage format of the index element.
    pub fn format(&self) -> Format {
        match self {
            Self::Uint16 => Format::R16Uint,
            Self::Uint32 => Format::R32Uint,
        }
    }

    /// Number of vertices addressable by this format.
    pub fn max_vertices(&self) -> usize {
        match self {
            Self::Uint16 => 1 << 16,
            Self::Uint32 => (u32::MAX as usize).saturating_add(1),
        }
    }
}

/// Configuration for a [`DynamicMeshBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshBuilderConfig {
    /// Index format.
    pub index_format: IndexFormat,
    /// Vertex allocator configuration. The capacity limit is further capped
    /// by the index format.
    pub vertex_allocator: AllocatorConfig,
    /// Index allocator configuration.
    pub index_allocator: AllocatorConfig,
    /// Debug label, also used for the internal index layout.
    pub label: Option<String>,
}

impl MeshBuilderConfig {
    /// Set the index format.
    pub fn with_index_format(mut self, format: IndexFormat) -> Self {
        self.index_format = format;
        self
    }

    /// Set the vertex allocator configuration.
    pub fn with_vertex_allocator(mut self, config: AllocatorConfig) -> Self {
        self.vertex_allocator = config;
        self
    }

    /// Set the index allocator configuration.
    pub fn with_index_allocator(mut self, config: AllocatorConfig) -> Self {
        self.index_allocator = config;
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Opaque handle to a mesh inside a [`DynamicMeshBuilder`].
///
/// Handles are generational: once deallocated, a handle stays invalid even
/// if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle {
    index: u32,
    generation: u32,
}

impl MeshHandle {
    /// Slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Current ranges of a mesh, see [`DynamicMeshBuilder::ranges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshRanges {
    /// Range in the vertex layout.
    pub vertices: Range,
    /// Range in the index layout.
    pub indices: Range,
}

/// Usage snapshot of a [`DynamicMeshBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshBuilderStats {
    /// Live meshes.
    pub meshes: usize,
    /// Vertex allocator usage.
    pub vertices: AllocatorStats,
    /// Index allocator usage.
    pub indices: AllocatorStats,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    ranges: Option<MeshRanges>,
}

/// Packs meshes into shared vertex and index buffers.
#[derive(Debug)]
pub struct DynamicMeshBuilder {
    vertices: DynamicBuffer,
    indices: DynamicBuffer,
    index_format: IndexFormat,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    len: usize,
}

impl DynamicMeshBuilder {
    /// Create a builder over `vertex_layout`.
    ///
    /// The index layout is created internally with a single `index` element.
    pub fn new(vertex_layout: AttributeLayout, config: MeshBuilderConfig) -> BufferResult<Self> {
        let MeshBuilderConfig {
            index_format,
            mut vertex_allocator,
            index_allocator,
            label,
        } = config;
        vertex_allocator.max_capacity = vertex_allocator
            .max_capacity
            .min(index_format.max_vertices());

        let mut descriptor = LayoutDescriptor::index();
        if let Some(label) = &label {
            descriptor = descriptor.with_label(format!("{label}_indices"));
        }
        let mut index_layout = AttributeLayout::new(descriptor)?;
        index_layout.append_element(ElementDescriptor::index(index_format.format()))?;

        log::debug!(
            "Created dynamic mesh builder {:?} ({} vertex elements, {:?} indices)",
            label,
            vertex_layout.element_count(),
            index_format
        );

        Ok(Self {
            vertices: DynamicBuffer::new(vertex_layout, vertex_allocator)?,
            indices: DynamicBuffer::new(index_layout, index_allocator)?,
            index_format,
            slots: Vec::new(),
            free_slots: Vec::new(),
            len: 0,
        })
    }

    /// Index format.
    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// The shared vertex layout.
    pub fn vertex_layout(&self) -> &AttributeLayout {
        self.vertices.layout()
    }

    /// The shared index layout.
    pub fn index_layout(&self) -> &AttributeLayout {
        self.indices.layout()
    }

    /// Number of live meshes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no mesh is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Usage snapshot.
    pub fn stats(&self) -> MeshBuilderStats {
        MeshBuilderStats {
            meshes: self.len,
            vertices: self.vertices.allocator().stats(),
            indices: self.indices.allocator().stats(),
        }
    }

    /// Allocate a mesh with the given vertex and index counts.
    ///
    /// Both requests are planned first, so the call either fully succeeds or
    /// changes nothing. When vertices move or the index buffer reorganizes,
    /// the index layout stops sharing storage with its clones beforehand.
    pub fn allocate(
        &mut self,
        vertex_count: usize,
        index_count: usize,
    ) -> BufferResult<MeshHandle> {
        if self.free_slots.is_empty() && u32::try_from(self.slots.len()).is_err() {
            return Err(BufferError::InvalidParameter(
                "mesh handle table is full".to_string(),
            ));
        }
        let vertex_plan = self.vertices.plan(vertex_count)?;
        let index_plan = self.indices.plan(index_count)?;
        if !vertex_plan.relocations().is_empty() || !index_plan.is_in_place() {
            self.indices.layout_mut().detach()?;
        }

        let vertex_allocation = self.vertices.commit(vertex_plan)?;
        self.apply_vertex_relocations(&vertex_allocation.relocations)?;

        let index_allocation = match self.indices.commit(index_plan) {
            Ok(allocation) => allocation,
            Err(err) => {
                self.vertices.free(vertex_allocation.range)?;
                return Err(err);
            }
        };
        self.apply_index_relocations(&index_allocation.relocations);

        let ranges = MeshRanges {
            vertices: vertex_allocation.range,
            indices: index_allocation.range,
        };
        let handle = self.insert(ranges);
        log::trace!(
            "Allocated mesh {:?}: vertices {}, indices {}",
            handle,
            ranges.vertices,
            ranges.indices
        );
        Ok(handle)
    }

    /// Release a mesh's ranges and invalidate its handle.
    pub fn deallocate(&mut self, handle: MeshHandle) -> BufferResult<()> {
        let ranges = self.ranges(handle)?;
        self.vertices.free(ranges.vertices)?;
        self.indices.free(ranges.indices)?;

        let slot = &mut self.slots[handle.index as usize];
        slot.ranges = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.index);
        self.len -= 1;
        log::trace!("Deallocated mesh {handle:?}");
        Ok(())
    }

    /// Current ranges of a mesh.
    pub fn ranges(&self, handle: MeshHandle) -> BufferResult<MeshRanges> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.ranges)
            .ok_or(BufferError::InvalidHandle)
    }

    /// Typed view over one vertex element of a mesh. Indices are relative to
    /// the mesh's vertex range.
    pub fn map_vertices(
        &mut self,
        handle: MeshHandle,
        element: usize,
    ) -> BufferResult<AttributeViewMut<'_>> {
        let ranges = self.ranges(handle)?;
        self.vertices
            .layout_mut()
            .view_range_mut(element, ranges.vertices)
    }

    /// Typed view over a mesh's indices, as stored (absolute vertex offsets).
    pub fn map_indices(&mut self, handle: MeshHandle) -> BufferResult<AttributeViewMut<'_>> {
        let ranges = self.ranges(handle)?;
        self.indices.layout_mut().view_range_mut(0, ranges.indices)
    }

    /// Write mesh-local indices, stored rebased onto the mesh's vertex range.
    pub fn write_indices(&mut self, handle: MeshHandle, indices: &[u32]) -> BufferResult<()> {
        let ranges = self.ranges(handle)?;
        let base = ranges.vertices.start;
        let mut absolute = Vec::with_capacity(indices.len());
        for &index in indices {
            if index as usize >= ranges.vertices.len {
                return Err(BufferError::IndexOutOfBounds {
                    index: index as usize,
                    len: ranges.vertices.len,
                });
            }
            absolute.push((base + index as usize) as u32);
        }
        self.map_indices(handle)?.set_slice(0, &absolute)
    }

    /// Compact both buffers, keeping every handle's geometry intact.
    pub fn compact(&mut self) -> BufferResult<()> {
        if self.vertices.allocator().is_fragmented() || self.indices.allocator().is_fragmented() {
            self.indices.layout_mut().detach()?;
        }
        let vertices = self.vertices.compact()?;
        self.apply_vertex_relocations(&vertices.relocations)?;
        let indices = self.indices.compact()?;
        self.apply_index_relocations(&indices.relocations);
        Ok(())
    }

    fn insert(&mut self, ranges: MeshRanges) -> MeshHandle {
        self.len += 1;
        if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.slots[index as usize];
            slot.ranges = Some(ranges);
            return MeshHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            ranges: Some(ranges),
        });
        MeshHandle {
            index,
            generation: 0,
        }
    }

    /// Rewrite the indices that referenced moved vertex ranges, then point
    /// the owning meshes at the new starts.
    ///
    /// Slot ranges change only after every index write landed.
    fn apply_vertex_relocations(&mut self, relocations: &[Relocation]) -> BufferResult<()> {
        if relocations.is_empty() {
            return Ok(());
        }
        let owners = owners_by_start(&self.slots, |ranges| ranges.vertices);
        let moved: Vec<(usize, &Relocation)> = relocations
            .iter()
            .filter_map(|relocation| Some((*owners.get(&relocation.from.start)?, relocation)))
            .collect();

        let mut rewrites = Vec::new();
        for &(slot, relocation) in &moved {
            let Some(ranges) = self.slots[slot].ranges else {
                continue;
            };
            if ranges.indices.is_empty() {
                continue;
            }
            let mut indices: Vec<u32> = self
                .indices
                .layout()
                .view_range(0, ranges.indices)?
                .to_vec()?;
            if rewrite_indices(&mut indices, relocation) > 0 {
                rewrites.push((ranges.indices, indices));
            }
        }
        for (range, indices) in &rewrites {
            self.indices
                .layout_mut()
                .view_range_mut(0, *range)?
                .set_slice(0, indices)?;
        }

        for (slot, relocation) in moved {
            if let Some(ranges) = self.slots[slot].ranges.as_mut() {
                ranges.vertices.start = relocation.to;
            }
        }
        log::debug!("Rewrote indices for {} relocated meshes", rewrites.len());
        Ok(())
    }

    fn apply_index_relocations(&mut self, relocations: &[Relocation]) {
        if relocations.is_empty() {
            return;
        }
        let owners = owners_by_start(&self.slots, |ranges| ranges.indices);
        for relocation in relocations {
            if let Some(&slot) = owners.get(&relocation.from.start) {
                if let Some(ranges) = self.slots[slot].ranges.as_mut() {
                    ranges.indices.start = relocation.to;
                }
            }
        }
    }
}

/// Map from range start to the slot owning it, for non-empty ranges.
fn owners_by_start(
    slots: &[Slot],
    range: impl Fn(&MeshRanges) -> Range,
) -> HashMap<usize, usize> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(slot, entry)| {
            let r = range(entry.ranges.as_ref()?);
            (!r.is_empty()).then_some((r.start, slot))
        })
        .collect()
}

/// Rewrite absolute indices that point into a relocated vertex range.
///
/// Every `v` in `[from.start, from.end())` becomes `v - from.start + to`;
/// other values are left alone. Returns the number of rewritten indices.
pub fn rewrite_indices(indices: &mut [u32], relocation: &Relocation) -> usize {
    let mut rewritten = 0;
    for index in indices.iter_mut() {
        if let Some(moved) = relocation.remap(*index as usize) {
            *index = moved as u32;
            rewritten += 1;
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn builder(config: MeshBuilderConfig) -> DynamicMeshBuilder {
        let mut layout = AttributeLayout::new(LayoutDescriptor::vertex()).unwrap();
        layout.append_element(ElementDescriptor::position()).unwrap();
        DynamicMeshBuilder::new(layout, config).unwrap()
    }

    #[test]
    fn test_index_format() {
        assert_eq!(IndexFormat::Uint16.format(), Format::R16Uint);
        assert_eq!(IndexFormat::Uint32.format(), Format::R32Uint);
        assert_eq!(IndexFormat::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint16.max_vertices(), 65536);
    }

    #[test]
    fn test_first_allocation_starts_at_zero() {
        let mut b = builder(MeshBuilderConfig::default());
        let handle = b.allocate(4, 6).unwrap();
        assert_eq!(
            b.ranges(handle).unwrap(),
            MeshRanges {
                vertices: Range::new(0, 4),
                indices: Range::new(0, 6),
            }
        );
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_stale_handle() {
        let mut b = builder(MeshBuilderConfig::default());
        let first = b.allocate(4, 6).unwrap();
        b.deallocate(first).unwrap();
        assert_eq!(b.deallocate(first), Err(BufferError::InvalidHandle));

        // Slot reuse does not revive the old handle.
        let second = b.allocate(4, 6).unwrap();
        assert_eq!(second.index(), first.index());
        assert_ne!(second, first);
        assert_eq!(b.ranges(first), Err(BufferError::InvalidHandle));
        assert!(!b.is_empty());
    }

    #[test]
    fn test_write_indices_rebases() {
        let config = MeshBuilderConfig::default().with_index_format(IndexFormat::Uint32);
        let mut b = builder(config);
        let _pad = b.allocate(3, 0).unwrap();
        let quad = b.allocate(4, 6).unwrap();
        b.write_indices(quad, &[0, 1, 2, 0, 2, 3]).unwrap();

        let stored: Vec<u32> = b.map_indices(quad).unwrap().to_vec().unwrap();
        assert_eq!(stored, vec![3, 4, 5, 3, 5, 6]);

        assert!(matches!(
            b.write_indices(quad, &[4]),
            Err(BufferError::IndexOutOfBounds { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_uint16_caps_vertices() {
        let mut b = builder(MeshBuilderConfig::default());
        assert!(matches!(
            b.allocate(70_000, 3),
            Err(BufferError::AllocationExhausted { .. })
        ));
        assert!(b.is_empty());
    }

    #[test]
    fn test_failed_index_request_changes_nothing() {
        let config = MeshBuilderConfig::default()
            .with_index_allocator(AllocatorConfig::default().with_max_capacity(8));
        let mut b = builder(config);
        let before = b.stats();
        assert!(b.allocate(4, 9).is_err());
        assert_eq!(b.stats(), before);
    }

    #[test]
    fn test_compaction_rewrites_indices() {
        let config = MeshBuilderConfig::default().with_vertex_allocator(
            AllocatorConfig::default()
                .with_initial_capacity(8)
                .with_max_capacity(8),
        );
        let mut b = builder(config);
        let first = b.allocate(3, 3).unwrap();
        let second = b.allocate(3, 3).unwrap();
        b.map_vertices(second, 0)
            .unwrap()
            .set_slice(0, &[Vec3::X, Vec3::Y, Vec3::Z])
            .unwrap();
        b.write_indices(second, &[2, 1, 0]).unwrap();
        b.deallocate(first).unwrap();

        // 5 free vertices split 3 + 2; 4 only fit after compaction.
        let third = b.allocate(4, 3).unwrap();
        assert_eq!(b.ranges(third).unwrap().vertices, Range::new(3, 4));

        let moved = b.ranges(second).unwrap();
        assert_eq!(moved.vertices, Range::new(0, 3));
        let stored: Vec<u32> = b.map_indices(second).unwrap().to_vec().unwrap();
        assert_eq!(stored, vec![2, 1, 0]);
        let positions: Vec<Vec3> = b.map_vertices(second, 0).unwrap().to_vec().unwrap();
        assert_eq!(positions, vec![Vec3::X, Vec3::Y, Vec3::Z]);
    }

    /// Two 3-vertex meshes in an 8-vertex buffer, the first one freed, so a
    /// 4-vertex request has to move the second mesh down to 0.
    fn fragmented_builder() -> (DynamicMeshBuilder, MeshHandle) {
        let config = MeshBuilderConfig::default().with_vertex_allocator(
            AllocatorConfig::default()
                .with_initial_capacity(8)
                .with_max_capacity(8),
        );
        let mut b = builder(config);
        let first = b.allocate(3, 3).unwrap();
        let second = b.allocate(3, 3).unwrap();
        b.write_indices(second, &[2, 1, 0]).unwrap();
        b.deallocate(first).unwrap();
        (b, second)
    }

    #[test]
    fn test_vertex_move_with_index_clone_being_read() {
        let (mut b, second) = fragmented_builder();
        let alias = b.index_layout().clone();
        let reader = alias.view(0).unwrap();

        let third = b.allocate(4, 3).unwrap();
        assert_eq!(b.ranges(third).unwrap().vertices, Range::new(3, 4));
        assert_eq!(b.ranges(second).unwrap().vertices, Range::new(0, 3));
        let stored: Vec<u32> = b.map_indices(second).unwrap().to_vec().unwrap();
        assert_eq!(stored, vec![2, 1, 0]);
        let vertices = b.stats().vertices;
        assert_eq!(vertices.live_len, 7);
        assert_eq!(vertices.live_len + vertices.free_len, vertices.capacity);

        // The clone kept the bytes it saw before the move.
        let old: Vec<u32> = reader.to_vec().unwrap();
        assert_eq!(&old[3..6], &[5, 4, 3]);
    }

    #[test]
    fn test_vertex_move_blocked_by_index_clone_changes_nothing() {
        let (mut b, second) = fragmented_builder();
        let mut alias = b.index_layout().clone();
        let writer = alias.view_mut(0).unwrap();

        let stats = b.stats();
        let ranges = b.ranges(second).unwrap();
        assert!(matches!(b.allocate(4, 3), Err(BufferError::StorageBorrowed)));
        assert!(matches!(b.compact(), Err(BufferError::StorageBorrowed)));
        assert_eq!(b.stats(), stats);
        assert_eq!(b.ranges(second).unwrap(), ranges);
        drop(writer);

        let stored: Vec<u32> = b.map_indices(second).unwrap().to_vec().unwrap();
        assert_eq!(stored, vec![5, 4, 3]);
        b.allocate(4, 3).unwrap();
        let stored: Vec<u32> = b.map_indices(second).unwrap().to_vec().unwrap();
        assert_eq!(stored, vec![2, 1, 0]);
    }

    #[test]
    fn test_rewrite_indices_only_touches_source_range() {
        let relocation = Relocation {
            from: Range::new(10, 4),
            to: 2,
        };
        let mut indices = vec![9, 10, 13, 14, 2];
        assert_eq!(rewrite_indices(&mut indices, &relocation), 2);
        assert_eq!(indices, vec![9, 2, 5, 14, 2]);
    }
}
