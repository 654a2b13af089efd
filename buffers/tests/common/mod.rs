//! Shared helpers for buffer integration tests.

#![allow(dead_code)]

use redlilium_buffers::{
    AttributeLayout, DynamicMeshBuilder, ElementDescriptor, Format, LayoutDescriptor,
    MeshBuilderConfig,
};

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Element indices of [`ui_layout`].
pub struct UiElements {
    pub position: usize,
    pub uv: usize,
    pub color: usize,
}

/// Position (float32x3), uv (unorm16x2) and color (unorm8x4) vertex layout.
pub fn ui_layout(count: usize) -> (AttributeLayout, UiElements) {
    let mut layout =
        AttributeLayout::new(LayoutDescriptor::vertex().with_label("ui_vertices")).unwrap();
    let elements = UiElements {
        position: layout.append_element(ElementDescriptor::position()).unwrap(),
        uv: layout.append_element(ElementDescriptor::uv()).unwrap(),
        color: layout.append_element(ElementDescriptor::color()).unwrap(),
    };
    layout.resize(count).unwrap();
    (layout, elements)
}

/// Layout with one element of `format`, optionally with a padded stride.
pub fn single_element(format: Format, stride: Option<usize>, count: usize) -> AttributeLayout {
    let mut layout = AttributeLayout::new(LayoutDescriptor::vertex()).unwrap();
    let mut descriptor = ElementDescriptor::new("value", format);
    if let Some(stride) = stride {
        descriptor = descriptor.with_stride(stride);
    }
    layout.append_element(descriptor).unwrap();
    layout.resize(count).unwrap();
    layout
}

/// Builder over [`ui_layout`].
pub fn ui_builder(config: MeshBuilderConfig) -> (DynamicMeshBuilder, UiElements) {
    let (layout, elements) = ui_layout(0);
    (DynamicMeshBuilder::new(layout, config).unwrap(), elements)
}

/// Deterministic xorshift sequence for randomized scenarios.
pub struct Sequence(u64);

impl Sequence {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Value in `[low, high)`.
    pub fn range(&mut self, low: usize, high: usize) -> usize {
        low + (self.next() % (high - low) as u64) as usize
    }
}
