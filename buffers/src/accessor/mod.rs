//! Conversion between semantic values and packed attribute bytes.
//!
//! A semantic value is one of:
//!
//! - a float vector of 1 to 4 components (`f32`, `[f32; N]`, [`Vec2`], [`Vec3`], [`Vec4`])
//! - a signed integer vector (`i32`, `[i32; N]`, [`IVec2`], [`IVec3`], [`IVec4`])
//! - an unsigned integer vector (`u32`, `[u32; N]`, [`UVec2`], [`UVec3`], [`UVec4`])
//! - a packed 4x8-bit color ([`Color32`])
//!
//! Each value type has a *natural* descriptor (32-bit float, 32-bit signed or
//! unsigned integer, 8-bit unorm for colors, with its component count). When an
//! element's format classifies exactly as the natural descriptor, bytes are
//! copied as-is. Otherwise every component is converted:
//!
//! | stored            | float value             | integer value        |
//! |-------------------|-------------------------|----------------------|
//! | float (32/16 bit) | as-is / widened         | cast, saturating     |
//! | normalized int    | `v / max`               | raw stored integer   |
//! | raw int, typeless | cast, no scaling        | raw stored integer   |
//!
//! Writing applies the inverse; floats written to normalized formats are
//! clamped, scaled and rounded to the nearest integer (ties away from zero).
//! Missing components read as zero, extra components are dropped, and format
//! components the value does not provide are written as zero.
//!
//! Bytes are stored in native byte order.

mod convert;

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, IVec3, IVec4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

pub use convert::{normalize, quantize, Component};
pub(crate) use convert::Codec;

use crate::format::{ComponentWidth, FormatDescriptor, NumericKind};

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for u8 {}
}

/// Scalar type of one component of a semantic value.
///
/// Implemented for `f32`, `i32`, `u32` and `u8` (color channels).
pub trait Scalar: Pod + PartialEq + std::fmt::Debug + sealed::Sealed {
    /// Numeric kind of the natural representation.
    const KIND: NumericKind;
    /// Component width of the natural representation.
    const WIDTH: ComponentWidth;

    /// Convert a loaded component of a format with the given kind and bit width.
    fn decode(component: Component, kind: NumericKind, bits: u32) -> Self;

    /// Convert to a component for a format with the given kind and bit width.
    fn encode(self, kind: NumericKind, bits: u32) -> Component;
}

impl Scalar for f32 {
    const KIND: NumericKind = NumericKind::Float;
    const WIDTH: ComponentWidth = ComponentWidth::W32;

    #[inline]
    fn decode(component: Component, kind: NumericKind, bits: u32) -> Self {
        match component {
            Component::Float(f) => f,
            Component::Int(v) if kind.is_normalized() => normalize(v, bits, kind.is_signed()),
            Component::Int(v) => v as f32,
        }
    }

    #[inline]
    fn encode(self, kind: NumericKind, bits: u32) -> Component {
        match kind {
            NumericKind::Float => Component::Float(self),
            NumericKind::SignedNorm | NumericKind::UnsignedNorm => {
                Component::Int(quantize(self, bits, kind.is_signed()))
            }
            NumericKind::SignedInt | NumericKind::UnsignedInt | NumericKind::Typeless => {
                Component::Int(self as i64)
            }
        }
    }
}

impl Scalar for i32 {
    const KIND: NumericKind = NumericKind::SignedInt;
    const WIDTH: ComponentWidth = ComponentWidth::W32;

    #[inline]
    fn decode(component: Component, _kind: NumericKind, _bits: u32) -> Self {
        match component {
            Component::Float(f) => f as i32,
            Component::Int(v) => v.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        }
    }

    #[inline]
    fn encode(self, kind: NumericKind, _bits: u32) -> Component {
        match kind {
            NumericKind::Float => Component::Float(self as f32),
            _ => Component::Int(self as i64),
        }
    }
}

impl Scalar for u32 {
    const KIND: NumericKind = NumericKind::UnsignedInt;
    const WIDTH: ComponentWidth = ComponentWidth::W32;

    #[inline]
    fn decode(component: Component, _kind: NumericKind, _bits: u32) -> Self {
        match component {
            Component::Float(f) => f as u32,
            Component::Int(v) => v.clamp(0, u32::MAX as i64) as u32,
        }
    }

    #[inline]
    fn encode(self, kind: NumericKind, _bits: u32) -> Component {
        match kind {
            NumericKind::Float => Component::Float(self as f32),
            _ => Component::Int(self as i64),
        }
    }
}

/// Color channels behave as 8-bit unorm values, except against raw integer
/// formats where the channel is the stored integer.
impl Scalar for u8 {
    const KIND: NumericKind = NumericKind::UnsignedNorm;
    const WIDTH: ComponentWidth = ComponentWidth::W8;

    #[inline]
    fn decode(component: Component, kind: NumericKind, bits: u32) -> Self {
        match component {
            Component::Float(f) => quantize(f, 8, false) as u8,
            Component::Int(v) if kind.is_normalized() => {
                quantize(normalize(v, bits, kind.is_signed()), 8, false) as u8
            }
            Component::Int(v) => v.clamp(0, u8::MAX as i64) as u8,
        }
    }

    #[inline]
    fn encode(self, kind: NumericKind, bits: u32) -> Component {
        let unit = self as f32 / 255.0;
        match kind {
            NumericKind::Float => Component::Float(unit),
            NumericKind::SignedNorm | NumericKind::UnsignedNorm => {
                Component::Int(quantize(unit, bits, kind.is_signed()))
            }
            NumericKind::SignedInt | NumericKind::UnsignedInt | NumericKind::Typeless => {
                Component::Int(self as i64)
            }
        }
    }
}

/// A semantic value that can be read from and written to an attribute.
///
/// Implementors are plain-old-data made of exactly [`Self::COMPONENTS`]
/// scalars, which is what lets the identity path copy bytes directly.
pub trait AttributeValue: Pod {
    /// Component scalar type.
    type Scalar: Scalar;
    /// Number of components, 1 to 4.
    const COMPONENTS: usize;
    /// Type name used in error messages.
    const NAME: &'static str;
    /// Descriptor of the format whose bytes equal this type's bytes.
    const NATURAL: FormatDescriptor = FormatDescriptor::new(
        <Self::Scalar as Scalar>::KIND,
        <Self::Scalar as Scalar>::WIDTH,
        Self::COMPONENTS as u8,
    );

    /// The value's components, padded with zero to four.
    #[inline]
    fn to_components(self) -> [Self::Scalar; 4] {
        let mut out = [Self::Scalar::zeroed(); 4];
        let scalars: &[Self::Scalar] = bytemuck::cast_slice(std::slice::from_ref(&self));
        out[..Self::COMPONENTS].copy_from_slice(scalars);
        out
    }

    /// Build a value from its first [`Self::COMPONENTS`] components.
    #[inline]
    fn from_components(components: [Self::Scalar; 4]) -> Self {
        let mut value = Self::zeroed();
        let scalars: &mut [Self::Scalar] =
            bytemuck::cast_slice_mut(std::slice::from_mut(&mut value));
        scalars.copy_from_slice(&components[..Self::COMPONENTS]);
        value
    }
}

macro_rules! impl_attribute_value {
    ($($ty:ty => ($scalar:ty, $count:literal, $name:literal)),* $(,)?) => {
        $(
            impl AttributeValue for $ty {
                type Scalar = $scalar;
                const COMPONENTS: usize = $count;
                const NAME: &'static str = $name;
            }
        )*
    };
}

impl_attribute_value! {
    f32 => (f32, 1, "f32"),
    [f32; 2] => (f32, 2, "[f32; 2]"),
    [f32; 3] => (f32, 3, "[f32; 3]"),
    [f32; 4] => (f32, 4, "[f32; 4]"),
    Vec2 => (f32, 2, "Vec2"),
    Vec3 => (f32, 3, "Vec3"),
    Vec4 => (f32, 4, "Vec4"),
    i32 => (i32, 1, "i32"),
    [i32; 2] => (i32, 2, "[i32; 2]"),
    [i32; 3] => (i32, 3, "[i32; 3]"),
    [i32; 4] => (i32, 4, "[i32; 4]"),
    IVec2 => (i32, 2, "IVec2"),
    IVec3 => (i32, 3, "IVec3"),
    IVec4 => (i32, 4, "IVec4"),
    u32 => (u32, 1, "u32"),
    [u32; 2] => (u32, 2, "[u32; 2]"),
    [u32; 3] => (u32, 3, "[u32; 3]"),
    [u32; 4] => (u32, 4, "[u32; 4]"),
    UVec2 => (u32, 2, "UVec2"),
    UVec3 => (u32, 3, "UVec3"),
    UVec4 => (u32, 4, "UVec4"),
    Color32 => (u8, 4, "Color32"),
}

/// An 8-bit-per-channel RGBA color.
///
/// Stored in an `Rgba8Unorm` element it occupies exactly its four bytes in
/// `r, g, b, a` order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color32 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color32 {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize a linear `[0, 1]` RGBA vector.
    pub fn from_vec4(color: Vec4) -> Self {
        let channel = |f: f32| quantize(f, 8, false) as u8;
        Self::new(channel(color.x), channel(color.y), channel(color.z), channel(color.w))
    }

    /// Channels as a `[0, 1]` RGBA vector.
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(
            normalize(self.r as i64, 8, false),
            normalize(self.g as i64, 8, false),
            normalize(self.b as i64, 8, false),
            normalize(self.a as i64, 8, false),
        )
    }

    /// The four channel bytes as one native-endian word.
    pub fn to_bits(self) -> u32 {
        u32::from_ne_bytes([self.r, self.g, self.b, self.a])
    }
}
