//! # RedLilium Buffers
//!
//! Typed CPU-side buffer layer for RedLilium Engine.
//!
//! - [`format`] - Format enumeration and O(1) classification
//! - [`accessor`] - Semantic value types and their conversion to stored bytes
//! - [`layout`] - Named attribute layouts with typed views
//! - [`allocator`] - First-fit range allocator with compaction
//! - [`dynamic`] - A layout paired with a range allocator
//! - [`builder`] - Many meshes packed into shared vertex and index buffers

pub mod accessor;
pub mod allocator;
pub mod builder;
pub mod dynamic;
pub mod error;
pub mod format;
pub mod layout;

pub use accessor::{AttributeValue, Color32, Scalar};
pub use allocator::{
    AllocatorConfig, AllocatorStats, Compaction, Range, RangeAllocator, Relocation,
};
pub use builder::{
    rewrite_indices, DynamicMeshBuilder, IndexFormat, MeshBuilderConfig, MeshBuilderStats,
    MeshHandle, MeshRanges,
};
pub use dynamic::{Allocation, DynamicBuffer};
pub use error::{BufferError, BufferResult};
pub use format::{classify, ComponentWidth, Format, FormatDescriptor, FormatFlags, NumericKind};
pub use layout::{
    AttributeElement, AttributeLayout, AttributeView, AttributeViewMut, ElementBinding,
    ElementDescriptor, LayoutDescriptor, LayoutId, LayoutUsage,
};

/// Buffers library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
