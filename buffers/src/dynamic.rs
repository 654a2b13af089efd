//! A layout paired with a range allocator.
//!
//! [`DynamicBuffer`] keeps an [`AttributeLayout`]'s item count equal to its
//! allocator's capacity and moves bytes whenever the allocator compacts, so
//! callers only deal with ranges and relocations.

use crate::allocator::{AllocatorConfig, Compaction, Range, RangeAllocator, Relocation};
use crate::error::{BufferError, BufferResult};
use crate::layout::AttributeLayout;

/// Result of [`DynamicBuffer::allocate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// The allocated range.
    pub range: Range,
    /// Ranges moved by a compaction that made room, in application order.
    ///
    /// Owners of the moved ranges must patch their stored offsets.
    pub relocations: Vec<Relocation>,
}

/// An attribute layout whose items are handed out as ranges.
#[derive(Debug)]
pub struct DynamicBuffer {
    layout: AttributeLayout,
    allocator: RangeAllocator,
}

impl DynamicBuffer {
    /// Wrap a layout. Its item count is reset to the allocator's initial
    /// capacity.
    pub fn new(mut layout: AttributeLayout, config: AllocatorConfig) -> BufferResult<Self> {
        let allocator = RangeAllocator::new(config);
        layout.resize(allocator.capacity())?;
        Ok(Self { layout, allocator })
    }

    /// The backing layout.
    pub fn layout(&self) -> &AttributeLayout {
        &self.layout
    }

    /// The backing layout, for writing through views.
    ///
    /// Resizing it directly breaks the pairing with the allocator.
    pub fn layout_mut(&mut self) -> &mut AttributeLayout {
        &mut self.layout
    }

    /// The range bookkeeping.
    pub fn allocator(&self) -> &RangeAllocator {
        &self.allocator
    }

    /// Allocate `len` items.
    ///
    /// Tries first-fit, then compacts if the free space is fragmented, then
    /// grows. Fails without changing anything when the request cannot be
    /// met, whether by the capacity limit or by the layout's byte size.
    pub fn allocate(&mut self, len: usize) -> BufferResult<Allocation> {
        if let Some(range) = self.allocator.try_allocate(len) {
            return Ok(Allocation {
                range,
                relocations: Vec::new(),
            });
        }
        let plan = self.plan(len)?;
        self.commit(plan)
    }

    /// Check whether [`allocate`](Self::allocate) would succeed for `len`
    /// items, counting space compaction would recover.
    pub fn check_allocation(&self, len: usize) -> BufferResult<()> {
        if len == 0 || self.allocator.largest_free() >= len {
            return Ok(());
        }
        self.plan(len).map(|_| ())
    }

    /// Return a range to the allocator. The bytes are left as they are.
    pub fn free(&mut self, range: Range) -> BufferResult<()> {
        self.allocator.free(range)
    }

    /// Compact the allocator and move the bytes of every relocated range.
    pub fn compact(&mut self) -> BufferResult<Compaction> {
        let mut allocator = self.allocator.clone();
        let compaction = allocator.compact();
        self.layout.relocate(&compaction.relocations)?;
        self.allocator = allocator;
        Ok(compaction)
    }

    /// Work out an allocation of `len` items on a copy of the allocator.
    ///
    /// Nothing is changed; [`commit`](Self::commit) applies the result.
    pub(crate) fn plan(&self, len: usize) -> BufferResult<Plan> {
        let limit = self.allocator.config().max_capacity;
        if !matches!(self.allocator.live_len().checked_add(len), Some(n) if n <= limit) {
            log::warn!(
                "Refused allocation of {len} items in {:?} (capacity {})",
                self.layout.label(),
                self.allocator.capacity()
            );
            return Err(BufferError::AllocationExhausted {
                requested: len,
                capacity: self.allocator.capacity(),
                limit,
            });
        }

        let mut allocator = self.allocator.clone();
        let mut relocations = Vec::new();
        let range = match allocator.try_allocate(len) {
            Some(range) => range,
            None => {
                if allocator.is_fragmented() {
                    relocations = allocator.compact().relocations;
                }
                allocator.allocate(len)?
            }
        };
        let grows = allocator.capacity() > self.layout.count();
        if grows {
            if let Err(err) = self.layout.check_resize(allocator.capacity()) {
                log::warn!(
                    "Refused allocation of {len} items in {:?}: {err}",
                    self.layout.label()
                );
                return Err(err);
            }
        }
        Ok(Plan {
            allocator,
            range,
            relocations,
            grows,
        })
    }

    /// Apply a plan made by [`plan`](Self::plan) against the current state.
    ///
    /// Storage grows before any bytes move; growth detaches shared storage,
    /// so a failure can only happen before anything changed.
    pub(crate) fn commit(&mut self, plan: Plan) -> BufferResult<Allocation> {
        let Plan {
            allocator,
            range,
            relocations,
            grows,
        } = plan;
        if grows {
            self.layout.resize(allocator.capacity())?;
        }
        self.layout.relocate(&relocations)?;
        self.allocator = allocator;
        Ok(Allocation { range, relocations })
    }
}

/// An allocation worked out but not yet applied.
#[derive(Debug)]
pub(crate) struct Plan {
    allocator: RangeAllocator,
    range: Range,
    relocations: Vec<Relocation>,
    grows: bool,
}

impl Plan {
    /// Ranges the commit will move.
    pub(crate) fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    /// Returns true if committing only hands out free space.
    pub(crate) fn is_in_place(&self) -> bool {
        self.relocations.is_empty() && !self.grows
    }
}
