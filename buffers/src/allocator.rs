//! Sub-allocation of item ranges inside a growable arena.
//!
//! A [`RangeAllocator`] hands out contiguous `[start, start + len)` ranges of
//! items. It only does bookkeeping: the bytes live in whatever storage the
//! caller pairs it with (see [`DynamicBuffer`](crate::DynamicBuffer)).
//!
//! # Strategy
//!
//! - Allocation is first-fit over a free list kept sorted by start.
//! - Freed ranges are merged with adjacent free ranges immediately, so the
//!   free list never holds two touching ranges.
//! - When nothing fits, capacity grows to the larger of twice the current
//!   capacity and the current capacity plus a growth chunk, and never less
//!   than the request needs at the tail.
//! - [`RangeAllocator::compact`] slides live ranges down to start at 0 and
//!   reports each move as a [`Relocation`], so owners can move bytes and patch
//!   any stored offsets.
//!
//! # Example
//!
//! ```ignore
//! let mut allocator = RangeAllocator::new(AllocatorConfig::default());
//! let a = allocator.allocate(4)?;
//! let b = allocator.allocate(8)?;
//! allocator.free(a)?;
//!
//! let compaction = allocator.compact();
//! for relocation in &compaction.relocations {
//!     layout.copy_items(relocation.from, relocation.to)?;
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{BufferError, BufferResult};

/// A half-open range of items, `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Range {
    /// First item.
    pub start: usize,
    /// Number of items.
    pub len: usize,
}

impl Range {
    /// Create a new range.
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last item.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Returns true if the range holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if `index` lies inside the range.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    /// The same range as a `std::ops::Range`.
    pub fn as_std(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// One live range moved by [`RangeAllocator::compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relocation {
    /// Where the range was.
    pub from: Range,
    /// Where it starts now. Always below `from.start`.
    pub to: usize,
}

impl Relocation {
    /// The range after the move.
    pub fn target(&self) -> Range {
        Range::new(self.to, self.from.len)
    }

    /// Translate an absolute item index that pointed into the old range.
    ///
    /// Returns `None` for indices outside `from`.
    pub fn remap(&self, index: usize) -> Option<usize> {
        self.from
            .contains(index)
            .then(|| index - self.from.start + self.to)
    }
}

/// Result of [`RangeAllocator::compact`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compaction {
    /// Moves in ascending order of `from.start`.
    ///
    /// Applying them one after another with overlapping copies (`memmove`)
    /// never clobbers a range that has not moved yet.
    pub relocations: Vec<Relocation>,
    /// How far the end of the highest live range dropped.
    pub reclaimed: usize,
}

impl Compaction {
    /// Returns true if nothing moved.
    pub fn is_empty(&self) -> bool {
        self.relocations.is_empty()
    }
}

/// Configuration for a [`RangeAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocatorConfig {
    /// Capacity the allocator starts with.
    pub initial_capacity: usize,
    /// Minimum capacity added by one growth step.
    pub growth_chunk: usize,
    /// Capacity the allocator never grows beyond.
    pub max_capacity: usize,
}

impl AllocatorConfig {
    /// Default growth chunk, in items.
    pub const DEFAULT_GROWTH_CHUNK: usize = 1024;

    /// Set the starting capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the minimum growth step.
    pub fn with_growth_chunk(mut self, chunk: usize) -> Self {
        self.growth_chunk = chunk;
        self
    }

    /// Set the capacity limit.
    pub fn with_max_capacity(mut self, capacity: usize) -> Self {
        self.max_capacity = capacity;
        self
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            growth_chunk: Self::DEFAULT_GROWTH_CHUNK,
            max_capacity: usize::MAX,
        }
    }
}

/// Snapshot of allocator usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocatorStats {
    /// Total items managed.
    pub capacity: usize,
    /// End of the highest live range.
    pub used: usize,
    /// Items in live ranges.
    pub live_len: usize,
    /// Items in free ranges.
    pub free_len: usize,
    /// Number of live ranges.
    pub live_ranges: usize,
    /// Number of free ranges.
    pub free_ranges: usize,
    /// Length of the largest free range.
    pub largest_free: usize,
}

/// First-fit range allocator with eager coalescing.
#[derive(Debug, Clone)]
pub struct RangeAllocator {
    config: AllocatorConfig,
    capacity: usize,
    /// Sorted by start, pairwise non-adjacent.
    free: Vec<Range>,
    /// Live ranges, start to length.
    live: BTreeMap<usize, usize>,
}

impl RangeAllocator {
    /// Create an allocator with the configured initial capacity.
    pub fn new(config: AllocatorConfig) -> Self {
        let capacity = config.initial_capacity.min(config.max_capacity);
        let free = if capacity > 0 {
            vec![Range::new(0, capacity)]
        } else {
            Vec::new()
        };
        Self {
            config,
            capacity,
            free,
            live: BTreeMap::new(),
        }
    }

    /// The allocator's configuration.
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Total items managed.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// End of the highest live range, 0 when nothing is live.
    pub fn used(&self) -> usize {
        self.live
            .iter()
            .next_back()
            .map_or(0, |(&start, &len)| start + len)
    }

    /// Items in live ranges.
    pub fn live_len(&self) -> usize {
        self.live.values().sum()
    }

    /// Items in free ranges.
    pub fn free_len(&self) -> usize {
        self.free.iter().map(|r| r.len).sum()
    }

    /// Length of the largest free range.
    pub fn largest_free(&self) -> usize {
        self.free.iter().map(|r| r.len).max().unwrap_or(0)
    }

    /// Returns true if some free space is not at the tail, i.e. compaction
    /// would move something.
    pub fn is_fragmented(&self) -> bool {
        self.free.iter().any(|r| r.end() != self.capacity)
    }

    /// Returns true if `range` is currently live.
    pub fn is_live(&self, range: Range) -> bool {
        self.live.get(&range.start) == Some(&range.len)
    }

    /// Iterate live ranges in ascending order.
    pub fn live_ranges(&self) -> impl Iterator<Item = Range> + '_ {
        self.live.iter().map(|(&start, &len)| Range::new(start, len))
    }

    /// Iterate free ranges in ascending order.
    pub fn free_ranges(&self) -> impl Iterator<Item = Range> + '_ {
        self.free.iter().copied()
    }

    /// Usage snapshot.
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            capacity: self.capacity,
            used: self.used(),
            live_len: self.live_len(),
            free_len: self.free_len(),
            live_ranges: self.live.len(),
            free_ranges: self.free.len(),
            largest_free: self.largest_free(),
        }
    }

    /// Check whether [`allocate`](Self::allocate) would succeed for `len`
    /// items, by fitting or by growing.
    pub fn check_allocation(&self, len: usize) -> BufferResult<()> {
        if len == 0 || self.find_fit(len).is_some() {
            return Ok(());
        }
        self.grown_capacity(len).map(|_| ())
    }

    /// Allocate without growing.
    pub fn try_allocate(&mut self, len: usize) -> Option<Range> {
        if len == 0 {
            return Some(Range::default());
        }
        let slot = self.find_fit(len)?;
        let hole = &mut self.free[slot];
        let range = Range::new(hole.start, len);
        if hole.len == len {
            self.free.remove(slot);
        } else {
            hole.start += len;
            hole.len -= len;
        }
        self.live.insert(range.start, range.len);
        log::trace!("Allocated {range}");
        Some(range)
    }

    /// Allocate, growing capacity when nothing fits.
    pub fn allocate(&mut self, len: usize) -> BufferResult<Range> {
        if let Some(range) = self.try_allocate(len) {
            return Ok(range);
        }
        let capacity = match self.grown_capacity(len) {
            Ok(capacity) => capacity,
            Err(err) => {
                log::warn!(
                    "Refused allocation of {len} items (capacity {}, limit {})",
                    self.capacity,
                    self.config.max_capacity
                );
                return Err(err);
            }
        };
        self.grow_to(capacity);
        self.try_allocate(len)
            .ok_or(BufferError::AllocationExhausted {
                requested: len,
                capacity: self.capacity,
                limit: self.config.max_capacity,
            })
    }

    /// Return a live range to the free list.
    ///
    /// Empty ranges are accepted and ignored. Anything that is not exactly a
    /// live range yields [`BufferError::InvalidRange`].
    pub fn free(&mut self, range: Range) -> BufferResult<()> {
        if range.is_empty() {
            return Ok(());
        }
        if !self.is_live(range) {
            return Err(BufferError::InvalidRange(range));
        }
        self.live.remove(&range.start);
        self.insert_free(range);
        log::trace!("Freed {range}");
        Ok(())
    }

    /// Slide every live range down so they are contiguous from 0, in their
    /// original order.
    pub fn compact(&mut self) -> Compaction {
        let used = self.used();
        let mut relocations = Vec::new();
        let mut live = BTreeMap::new();
        let mut cursor = 0;
        for (&start, &len) in &self.live {
            if start != cursor {
                relocations.push(Relocation {
                    from: Range::new(start, len),
                    to: cursor,
                });
            }
            live.insert(cursor, len);
            cursor += len;
        }
        self.live = live;
        self.free.clear();
        if cursor < self.capacity {
            self.free.push(Range::new(cursor, self.capacity - cursor));
        }

        let compaction = Compaction {
            relocations,
            reclaimed: used - cursor,
        };
        log::debug!(
            "Compacted {} ranges: {} relocated, {} items reclaimed",
            self.live.len(),
            compaction.relocations.len(),
            compaction.reclaimed
        );
        debug_assert!(self.validate().is_ok());
        compaction
    }

    /// Release everything, keeping the capacity.
    pub fn clear(&mut self) {
        self.live.clear();
        self.free.clear();
        if self.capacity > 0 {
            self.free.push(Range::new(0, self.capacity));
        }
    }

    /// Check the bookkeeping invariants: no overlap, sorted and coalesced free
    /// list, and free plus live covering the capacity exactly.
    pub fn validate(&self) -> Result<(), String> {
        let mut ranges: Vec<(Range, bool)> = self
            .free
            .iter()
            .map(|&r| (r, false))
            .chain(self.live_ranges().map(|r| (r, true)))
            .collect();
        ranges.sort_by_key(|(r, _)| r.start);

        let mut cursor = 0;
        let mut previous_free = false;
        for (range, live) in ranges {
            if range.is_empty() {
                return Err(format!("Empty range {range} is tracked"));
            }
            if range.start != cursor {
                return Err(format!(
                    "Range {range} does not start at {cursor} (overlap or gap)"
                ));
            }
            if !live && previous_free {
                return Err(format!("Free range {range} was not coalesced"));
            }
            previous_free = !live;
            cursor = range.end();
        }
        if cursor != self.capacity {
            return Err(format!(
                "Ranges cover {cursor} items but capacity is {}",
                self.capacity
            ));
        }
        Ok(())
    }

    fn find_fit(&self, len: usize) -> Option<usize> {
        self.free.iter().position(|r| r.len >= len)
    }

    /// Capacity after growing for a request of `len` items.
    fn grown_capacity(&self, len: usize) -> BufferResult<usize> {
        let exhausted = BufferError::AllocationExhausted {
            requested: len,
            capacity: self.capacity,
            limit: self.config.max_capacity,
        };
        let tail = match self.free.last() {
            Some(r) if r.end() == self.capacity => r.len,
            _ => 0,
        };
        let required = match self.capacity.checked_add(len - tail) {
            Some(required) if required <= self.config.max_capacity => required,
            _ => return Err(exhausted),
        };
        let doubled = self.capacity.saturating_mul(2);
        let chunked = self.capacity.saturating_add(self.config.growth_chunk);
        Ok(doubled
            .max(chunked)
            .min(self.config.max_capacity)
            .max(required))
    }

    fn grow_to(&mut self, capacity: usize) {
        let old = self.capacity;
        match self.free.last_mut() {
            Some(tail) if tail.end() == old => tail.len += capacity - old,
            _ => self.free.push(Range::new(old, capacity - old)),
        }
        self.capacity = capacity;
        log::debug!("Grew range allocator from {old} to {capacity} items");
    }

    fn insert_free(&mut self, range: Range) {
        let slot = self.free.partition_point(|r| r.start < range.start);
        let merges_prev = slot > 0 && self.free[slot - 1].end() == range.start;
        let merges_next = slot < self.free.len() && self.free[slot].start == range.end();

        match (merges_prev, merges_next) {
            (true, true) => {
                let next = self.free.remove(slot);
                self.free[slot - 1].len += range.len + next.len;
            }
            (true, false) => self.free[slot - 1].len += range.len,
            (false, true) => {
                let next = &mut self.free[slot];
                next.start = range.start;
                next.len += range.len;
            }
            (false, false) => self.free.insert(slot, range),
        }
    }
}

impl Default for RangeAllocator {
    fn default() -> Self {
        Self::new(AllocatorConfig::default())
    }
}
