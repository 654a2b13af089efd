//! Component level conversion between stored bytes and semantic scalars.

use half::f16;

use crate::error::{BufferError, BufferResult};
use crate::format::{ComponentWidth, Format, NumericKind};

use super::{AttributeValue, Scalar};

/// One component as loaded from storage, before semantic conversion.
///
/// Integers of every width and signedness widen losslessly into `i64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component {
    /// A floating point component (16-bit floats are widened).
    Float(f32),
    /// An integer component (normalized or raw).
    Int(i64),
}

/// Largest stored integer of a normalized component.
#[inline]
fn norm_max(bits: u32, signed: bool) -> f64 {
    if signed {
        ((1u64 << (bits - 1)) - 1) as f64
    } else {
        ((1u64 << bits) - 1) as f64
    }
}

/// Map a stored normalized integer to a float.
///
/// Signed results are clamped to -1 since the most negative integer has no
/// positive counterpart.
#[inline]
pub fn normalize(value: i64, bits: u32, signed: bool) -> f32 {
    let f = value as f64 / norm_max(bits, signed);
    if signed {
        f.max(-1.0) as f32
    } else {
        f as f32
    }
}

/// Map a float to a stored normalized integer.
///
/// The input is clamped to [0, 1] or [-1, 1], scaled and rounded to the
/// nearest integer with ties away from zero. NaN stores 0.
#[inline]
pub fn quantize(value: f32, bits: u32, signed: bool) -> i64 {
    if value.is_nan() {
        return 0;
    }
    let low = if signed { -1.0 } else { 0.0 };
    let clamped = (value as f64).clamp(low, 1.0);
    (clamped * norm_max(bits, signed)).round() as i64
}

/// Physical storage of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lane {
    F32,
    F16,
    I32,
    U32,
    I16,
    U16,
    I8,
    U8,
}

impl Lane {
    /// Storage lane for a classified format, `None` when components are not
    /// individually addressable.
    fn resolve(kind: NumericKind, width: ComponentWidth) -> Option<Self> {
        let signed = kind.is_signed();
        match (kind, width) {
            (_, ComponentWidth::Other) => None,
            (NumericKind::Float, ComponentWidth::W32) => Some(Self::F32),
            (NumericKind::Float, ComponentWidth::W16) => Some(Self::F16),
            (NumericKind::Float, ComponentWidth::W8) => None,
            (_, ComponentWidth::W32) => Some(if signed { Self::I32 } else { Self::U32 }),
            (_, ComponentWidth::W16) => Some(if signed { Self::I16 } else { Self::U16 }),
            (_, ComponentWidth::W8) => Some(if signed { Self::I8 } else { Self::U8 }),
        }
    }

    fn bytes(self) -> usize {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F16 | Self::I16 | Self::U16 => 2,
            Self::I8 | Self::U8 => 1,
        }
    }

    fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    #[inline]
    fn load(self, bytes: &[u8]) -> Component {
        match self {
            Self::F32 => Component::Float(f32::from_ne_bytes(array(bytes))),
            Self::F16 => Component::Float(f16::from_ne_bytes(array(bytes)).to_f32()),
            Self::I32 => Component::Int(i32::from_ne_bytes(array(bytes)) as i64),
            Self::U32 => Component::Int(u32::from_ne_bytes(array(bytes)) as i64),
            Self::I16 => Component::Int(i16::from_ne_bytes(array(bytes)) as i64),
            Self::U16 => Component::Int(u16::from_ne_bytes(array(bytes)) as i64),
            Self::I8 => Component::Int(bytes[0] as i8 as i64),
            Self::U8 => Component::Int(bytes[0] as i64),
        }
    }

    /// Store a component, saturating integers to the lane's range.
    #[inline]
    fn store(self, bytes: &mut [u8], component: Component) {
        match self {
            Self::F32 => bytes[..4].copy_from_slice(&as_f32(component).to_ne_bytes()),
            Self::F16 => {
                let half = f16::from_f32(as_f32(component));
                bytes[..2].copy_from_slice(&half.to_ne_bytes());
            }
            Self::I32 => {
                let v = saturate(component, i32::MIN as i64, i32::MAX as i64) as i32;
                bytes[..4].copy_from_slice(&v.to_ne_bytes());
            }
            Self::U32 => {
                let v = saturate(component, 0, u32::MAX as i64) as u32;
                bytes[..4].copy_from_slice(&v.to_ne_bytes());
            }
            Self::I16 => {
                let v = saturate(component, i16::MIN as i64, i16::MAX as i64) as i16;
                bytes[..2].copy_from_slice(&v.to_ne_bytes());
            }
            Self::U16 => {
                let v = saturate(component, 0, u16::MAX as i64) as u16;
                bytes[..2].copy_from_slice(&v.to_ne_bytes());
            }
            Self::I8 => bytes[0] = saturate(component, i8::MIN as i64, i8::MAX as i64) as i8 as u8,
            Self::U8 => bytes[0] = saturate(component, 0, u8::MAX as i64) as u8,
        }
    }
}

#[inline]
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

#[inline]
fn as_f32(component: Component) -> f32 {
    match component {
        Component::Float(f) => f,
        Component::Int(v) => v as f32,
    }
}

#[inline]
fn saturate(component: Component, min: i64, max: i64) -> i64 {
    match component {
        // `as` saturates and maps NaN to 0.
        Component::Float(f) => (f as i64).clamp(min, max),
        Component::Int(v) => v.clamp(min, max),
    }
}

/// A resolved conversion between one value type and one format.
///
/// Resolving once per view call keeps the per-item loop free of table lookups.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Codec {
    kind: NumericKind,
    lane: Lane,
    components: usize,
    identity: bool,
}

impl Codec {
    /// Resolve the conversion for `T`, failing for formats without
    /// addressable components.
    pub fn resolve<T: AttributeValue>(format: Format) -> BufferResult<Self> {
        let descriptor = format.descriptor();
        let lane = Lane::resolve(descriptor.kind(), descriptor.width()).ok_or(
            BufferError::UnsupportedConversion {
                format,
                value: T::NAME,
            },
        )?;
        Ok(Self {
            kind: descriptor.kind(),
            lane,
            components: descriptor.components(),
            identity: descriptor == T::NATURAL,
        })
    }

    /// True when the stored bytes are exactly the bytes of `T`.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Tight byte size of one item.
    pub fn item_size(&self) -> usize {
        self.lane.bytes() * self.components
    }

    /// Decode one item from the start of `bytes`.
    #[inline]
    pub fn read<T: AttributeValue>(&self, bytes: &[u8]) -> T {
        if self.identity {
            return bytemuck::pod_read_unaligned(&bytes[..std::mem::size_of::<T>()]);
        }
        let width = self.lane.bytes();
        let bits = self.lane.bits();
        let mut components = [<T::Scalar as bytemuck::Zeroable>::zeroed(); 4];
        let shared = self.components.min(T::COMPONENTS);
        for (c, slot) in components.iter_mut().take(shared).enumerate() {
            let stored = self.lane.load(&bytes[c * width..]);
            *slot = T::Scalar::decode(stored, self.kind, bits);
        }
        T::from_components(components)
    }

    /// Encode one item into the start of `bytes`.
    #[inline]
    pub fn write<T: AttributeValue>(&self, bytes: &mut [u8], value: T) {
        if self.identity {
            bytes[..std::mem::size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
            return;
        }
        let width = self.lane.bytes();
        let bits = self.lane.bits();
        let components = value.to_components();
        let zero = <T::Scalar as bytemuck::Zeroable>::zeroed();
        for c in 0..self.components {
            let scalar = if c < T::COMPONENTS { components[c] } else { zero };
            self.lane
                .store(&mut bytes[c * width..], scalar.encode(self.kind, bits));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unsigned() {
        assert_eq!(normalize(0, 8, false), 0.0);
        assert_eq!(normalize(255, 8, false), 1.0);
        assert_eq!(normalize(65535, 16, false), 1.0);
        assert!((normalize(128, 8, false) - 128.0 / 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_signed_clamps_minimum() {
        assert_eq!(normalize(127, 8, true), 1.0);
        assert_eq!(normalize(-127, 8, true), -1.0);
        assert_eq!(normalize(-128, 8, true), -1.0);
        assert_eq!(normalize(-32768, 16, true), -1.0);
    }

    #[test]
    fn test_quantize_rounds_to_nearest() {
        assert_eq!(quantize(1.0, 8, false), 255);
        assert_eq!(quantize(0.5, 8, false), 128); // 127.5 rounds away from zero
        assert_eq!(quantize(0.25, 16, false), 16384); // 16383.75
        assert_eq!(quantize(-0.5, 8, true), -64); // -63.5
        assert_eq!(quantize(2.0, 8, false), 255);
        assert_eq!(quantize(-3.0, 16, true), -32767);
        assert_eq!(quantize(f32::NAN, 16, false), 0);
    }

    #[test]
    fn test_lane_store_saturates() {
        let mut bytes = [0u8; 4];
        Lane::U8.store(&mut bytes, Component::Int(300));
        assert_eq!(bytes[0], 255);
        Lane::I16.store(&mut bytes, Component::Int(-40000));
        assert_eq!(i16::from_ne_bytes([bytes[0], bytes[1]]), i16::MIN);
        Lane::U32.store(&mut bytes, Component::Float(-5.0));
        assert_eq!(u32::from_ne_bytes(bytes), 0);
    }

    #[test]
    fn test_lane_half_float() {
        let mut bytes = [0u8; 2];
        Lane::F16.store(&mut bytes, Component::Float(0.5));
        assert_eq!(Lane::F16.load(&bytes), Component::Float(0.5));
    }

    #[test]
    fn test_lane_resolution() {
        assert_eq!(
            Lane::resolve(NumericKind::Typeless, ComponentWidth::W16),
            Some(Lane::U16)
        );
        assert_eq!(
            Lane::resolve(NumericKind::SignedNorm, ComponentWidth::W8),
            Some(Lane::I8)
        );
        assert_eq!(Lane::resolve(NumericKind::Float, ComponentWidth::W8), None);
        assert_eq!(
            Lane::resolve(NumericKind::UnsignedNorm, ComponentWidth::Other),
            None
        );
    }
}
