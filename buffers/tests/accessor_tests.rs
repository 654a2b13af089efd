//! Integration tests for typed attribute access.
//!
//! # Test Categories
//!
//! - **Round-trip Tests**: float formats store values exactly
//! - **Normalization Tests**: normalized formats stay within one step
//! - **Conversion Tests**: mixed value type and format combinations
//! - **Bulk Write Tests**: `set_slice` matches per-item `set`
//! - **Layout Tests**: a UI vertex layout end to end

mod common;

use glam::{IVec4, UVec2, UVec4, Vec2, Vec3, Vec4};
use rstest::rstest;

use common::{init_logging, single_element, ui_layout};
use redlilium_buffers::{AttributeValue, BufferError, Color32, Format, Range};

fn assert_vec4_near(actual: Vec4, expected: Vec4) {
    assert!(
        (actual - expected).abs().max_element() < 1e-6,
        "{actual:?} != {expected:?}"
    );
}

// ============================================================================
// Round-trip Tests
// ============================================================================

#[rstest]
#[case::zero(0.0)]
#[case::pi(std::f32::consts::PI)]
#[case::negative_large(-1.0e30)]
#[case::min_positive(f32::MIN_POSITIVE)]
#[case::max(f32::MAX)]
fn test_float32_roundtrip_is_exact(#[case] value: f32) {
    let mut layout = single_element(Format::R32Float, None, 2);
    layout.view_mut(0).unwrap().set(1, value).unwrap();
    let read: f32 = layout.view(0).unwrap().get(1).unwrap();
    assert_eq!(read.to_bits(), value.to_bits());
}

#[rstest]
#[case::vec3(Format::Rgb32Float)]
#[case::vec3_padded(Format::Rgba32Float)]
fn test_float32_vector_roundtrip(#[case] format: Format) {
    let mut layout = single_element(format, None, 1);
    let value = Vec3::new(1.5, -2.25, 1.0e-7);
    layout.view_mut(0).unwrap().set(0, value).unwrap();
    assert_eq!(layout.view(0).unwrap().get::<Vec3>(0).unwrap(), value);
}

#[rstest]
#[case::halves(Vec4::new(0.5, -0.5, 0.25, -0.125))]
#[case::integers(Vec4::new(1.0, -2.0, 1024.0, 2048.0))]
#[case::extremes(Vec4::new(65504.0, -65504.0, 6.103515625e-5, 0.0))]
fn test_float16_representable_roundtrip(#[case] value: Vec4) {
    let mut layout = single_element(Format::Rgba16Float, None, 1);
    layout.view_mut(0).unwrap().set(0, value).unwrap();
    assert_eq!(layout.view(0).unwrap().get::<Vec4>(0).unwrap(), value);
}

// ============================================================================
// Normalization Tests
// ============================================================================

#[rstest]
#[case::unorm8(Format::R8Unorm, 8, false)]
#[case::unorm16(Format::R16Unorm, 16, false)]
#[case::snorm8(Format::R8Snorm, 8, true)]
#[case::snorm16(Format::R16Snorm, 16, true)]
fn test_normalized_error_is_bounded(
    #[case] format: Format,
    #[case] bits: u32,
    #[case] signed: bool,
) {
    init_logging();
    let steps = 1000;
    let (low, max) = if signed {
        (-1.0, ((1u32 << (bits - 1)) - 1) as f32)
    } else {
        (0.0, ((1u32 << bits) - 1) as f32)
    };
    let values: Vec<f32> = (0..=steps)
        .map(|i| low + (1.0 - low) * i as f32 / steps as f32)
        .collect();

    let mut layout = single_element(format, None, values.len());
    layout.view_mut(0).unwrap().set_slice(0, &values).unwrap();
    let read: Vec<f32> = layout.view(0).unwrap().to_vec().unwrap();

    for (written, read) in values.iter().zip(read) {
        assert!(
            (read - written).abs() <= 1.0 / max,
            "{format:?}: wrote {written}, read {read}"
        );
    }
}

#[test]
fn test_normalized_clamps_out_of_range() {
    let mut layout = single_element(Format::Rg16Unorm, None, 1);
    layout
        .view_mut(0)
        .unwrap()
        .set(0, Vec2::new(-3.0, 7.0))
        .unwrap();
    assert_eq!(
        layout.view(0).unwrap().get::<Vec2>(0).unwrap(),
        Vec2::new(0.0, 1.0)
    );
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[rstest]
#[case::unorm8(
    Format::Rgba8Unorm,
    Vec4::new(0.0, 0.5, 1.0, 2.0),
    Vec4::new(0.0, 128.0 / 255.0, 1.0, 1.0)
)]
#[case::snorm8(
    Format::Rgba8Snorm,
    Vec4::new(-1.0, -0.5, 0.5, 1.0),
    Vec4::new(-1.0, -64.0 / 127.0, 64.0 / 127.0, 1.0)
)]
#[case::sint16_cast(
    Format::Rgba16Sint,
    Vec4::new(-3.7, 2.2, 40000.0, -40000.0),
    Vec4::new(-3.0, 2.0, 32767.0, -32768.0)
)]
#[case::uint8_cast(
    Format::Rgba8Uint,
    Vec4::new(-1.0, 12.9, 255.0, 256.0),
    Vec4::new(0.0, 12.0, 255.0, 255.0)
)]
#[case::fewer_components(
    Format::Rg32Float,
    Vec4::new(1.0, 2.0, 3.0, 4.0),
    Vec4::new(1.0, 2.0, 0.0, 0.0)
)]
#[case::single_component(
    Format::R16Uint,
    Vec4::new(7.0, 9.0, 9.0, 9.0),
    Vec4::new(7.0, 0.0, 0.0, 0.0)
)]
#[case::typeless_as_unsigned(
    Format::Rgba8Typeless,
    Vec4::new(1.0, 2.0, 3.0, 300.0),
    Vec4::new(1.0, 2.0, 3.0, 255.0)
)]
fn test_float_conversions(
    #[case] format: Format,
    #[case] written: Vec4,
    #[case] expected: Vec4,
) {
    let mut layout = single_element(format, None, 1);
    layout.view_mut(0).unwrap().set(0, written).unwrap();
    assert_vec4_near(layout.view(0).unwrap().get(0).unwrap(), expected);
}

#[rstest]
#[case::sint8(
    Format::Rgba8Sint,
    IVec4::new(-200, 100, 127, 300),
    IVec4::new(-128, 100, 127, 127)
)]
#[case::uint16(
    Format::Rgba16Uint,
    IVec4::new(-5, 0, 65535, 70000),
    IVec4::new(0, 0, 65535, 65535)
)]
#[case::float32(
    Format::Rgba32Float,
    IVec4::new(-7, 0, 16, 1 << 20),
    IVec4::new(-7, 0, 16, 1 << 20)
)]
#[case::snorm16_raw(
    Format::Rgba16Snorm,
    IVec4::new(-32768, -1, 1, 32767),
    IVec4::new(-32768, -1, 1, 32767)
)]
fn test_integer_conversions(
    #[case] format: Format,
    #[case] written: IVec4,
    #[case] expected: IVec4,
) {
    let mut layout = single_element(format, None, 1);
    layout.view_mut(0).unwrap().set(0, written).unwrap();
    assert_eq!(layout.view(0).unwrap().get::<IVec4>(0).unwrap(), expected);
}

#[test]
fn test_unsigned_vector_into_wider_format() {
    let mut layout = single_element(Format::Rgba16Uint, None, 1);
    layout
        .view_mut(0)
        .unwrap()
        .set(0, UVec2::new(3, 4))
        .unwrap();
    assert_eq!(
        layout.view(0).unwrap().get::<UVec4>(0).unwrap(),
        UVec4::new(3, 4, 0, 0)
    );
}

#[test]
fn test_color_against_float_format() {
    let mut layout = single_element(Format::Rgba32Float, None, 1);
    let color = Color32::new(255, 128, 0, 255);
    layout.view_mut(0).unwrap().set(0, color).unwrap();

    let view = layout.view(0).unwrap();
    assert_vec4_near(view.get(0).unwrap(), Vec4::new(1.0, 128.0 / 255.0, 0.0, 1.0));
    assert_eq!(view.get::<Color32>(0).unwrap(), color);
}

#[test]
fn test_out_of_bounds_access() {
    let mut layout = single_element(Format::R32Float, None, 3);
    assert_eq!(
        layout.view(0).unwrap().get::<f32>(3),
        Err(BufferError::IndexOutOfBounds { index: 3, len: 3 })
    );
    assert!(layout
        .view_mut(0)
        .unwrap()
        .set_slice(2, &[1.0f32, 2.0])
        .is_err());
    assert_eq!(layout.revision(), 0);
}

// ============================================================================
// Bulk Write Tests
// ============================================================================

fn assert_bulk_matches_per_item<T: AttributeValue>(
    format: Format,
    stride: Option<usize>,
    values: &[T],
) {
    let mut bulk = single_element(format, stride, values.len());
    bulk.view_mut(0).unwrap().set_slice(0, values).unwrap();

    let mut each = single_element(format, stride, values.len());
    {
        let mut view = each.view_mut(0).unwrap();
        for (index, value) in values.iter().enumerate() {
            view.set(index, *value).unwrap();
        }
    }

    assert_eq!(
        bulk.view(0).unwrap().as_bytes(),
        each.view(0).unwrap().as_bytes(),
        "{format:?} with stride {stride:?}"
    );
}

#[rstest]
#[case::tight(None)]
#[case::padded(Some(32))]
fn test_bulk_write_matches_per_item(#[case] stride: Option<usize>) {
    let positions: Vec<Vec3> = (0..17).map(|i| Vec3::splat(i as f32 * 0.5)).collect();
    let ids: Vec<u32> = (0..17).map(|i| i * 1000).collect();
    let offsets: Vec<IVec4> = (0..17).map(|i| IVec4::splat(i - 8)).collect();
    let colors: Vec<Color32> = (0..17u8)
        .map(|i| Color32::new(i, i * 2, i * 3, 255))
        .collect();
    let weights: Vec<Vec4> = (0..17).map(|i| Vec4::splat(i as f32 / 16.0)).collect();

    // Natural formats take the identity path.
    assert_bulk_matches_per_item(Format::Rgb32Float, stride, &positions);
    assert_bulk_matches_per_item(Format::R32Uint, stride, &ids);
    assert_bulk_matches_per_item(Format::Rgba32Sint, stride, &offsets);
    assert_bulk_matches_per_item(Format::Rgba8Unorm, stride, &colors);
    // Converting formats.
    assert_bulk_matches_per_item(Format::Rgba16Float, stride, &positions);
    assert_bulk_matches_per_item(Format::R16Uint, stride, &ids);
    assert_bulk_matches_per_item(Format::Rgba8Sint, stride, &offsets);
    assert_bulk_matches_per_item(Format::Rgba16Unorm, stride, &weights);
}

#[test]
fn test_padding_bytes_are_untouched() {
    let mut layout = single_element(Format::Rgb32Float, Some(16), 3);
    layout
        .view_mut(0)
        .unwrap()
        .set_slice(0, &[Vec3::ONE; 3])
        .unwrap();
    let view = layout.view(0).unwrap();
    for item in view.as_bytes().chunks_exact(16) {
        assert_eq!(&item[12..], &[0, 0, 0, 0]);
    }
}

#[test]
fn test_bulk_write_into_range_view() {
    let mut layout = single_element(Format::R32Uint, None, 8);
    layout
        .view_range_mut(0, Range::new(4, 4))
        .unwrap()
        .set_slice(1, &[7u32, 8, 9])
        .unwrap();
    let all: Vec<u32> = layout.view(0).unwrap().to_vec().unwrap();
    assert_eq!(all, vec![0, 0, 0, 0, 0, 7, 8, 9]);
}

// ============================================================================
// Layout Tests
// ============================================================================

#[test]
fn test_ui_vertex_layout() {
    init_logging();
    let (mut layout, elements) = ui_layout(4);
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(100.0, 0.0, 0.0),
        Vec3::new(100.0, 50.0, 0.0),
        Vec3::new(0.0, 50.0, 0.0),
    ];
    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    layout
        .view_mut(elements.position)
        .unwrap()
        .set_slice(0, &positions)
        .unwrap();
    layout.view_mut(elements.uv).unwrap().set_slice(0, &uvs).unwrap();
    layout
        .view_mut(elements.color)
        .unwrap()
        .fill(Color32::WHITE)
        .unwrap();

    assert_eq!(layout.stride(), 20);
    assert_eq!(layout.byte_size(), 80);
    assert_eq!(layout.revision(), 3);

    let read: Vec<Vec3> = layout.view(elements.position).unwrap().to_vec().unwrap();
    assert_eq!(read, positions);
    let read: Vec<Vec2> = layout.view(elements.uv).unwrap().to_vec().unwrap();
    assert_eq!(read, uvs);

    let colors = layout.view(elements.color).unwrap();
    for index in 0..4 {
        let bytes: [u8; 4] = colors.item_bytes(index).unwrap().try_into().unwrap();
        assert_eq!(u32::from_ne_bytes(bytes), 0xFFFF_FFFF);
    }
    assert_eq!(Color32::WHITE.to_bits(), 0xFFFF_FFFF);

    let bindings: Vec<_> = layout.bindings().map(|b| (b.name, b.byte_len)).collect();
    assert_eq!(bindings, vec![("position", 48), ("uv", 16), ("color", 16)]);
}
