//! Format enumeration and classification.
//!
//! Every [`Format`] maps to exactly one [`FormatDescriptor`]: the numeric kind
//! of its components, the width bucket of one component and the component
//! count. The mapping is a constant table indexed by the format's ordinal, so
//! [`classify`] is a single array read.
//!
//! Formats whose components do not fall in a 32, 16 or 8 bit bucket (packed
//! 10:10:10:2, depth-stencil pairs, block compressed) classify with
//! [`ComponentWidth::Other`] and have no per-item byte size. Their block
//! parameters are still available through [`Format::block_size`] and
//! [`Format::block_dimensions`].

mod table;

use bitflags::bitflags;
use static_assertions::{assert_eq_size, const_assert_eq};

pub use table::Format;

use table::ENTRIES;

/// Numeric interpretation of a format's components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NumericKind {
    /// Signed integer mapped to [-1, 1].
    SignedNorm,
    /// Signed integer, read as-is.
    SignedInt,
    /// Unsigned integer mapped to [0, 1].
    UnsignedNorm,
    /// Unsigned integer, read as-is.
    UnsignedInt,
    /// IEEE floating point.
    Float,
    /// Untyped bits, read as unsigned integers.
    Typeless,
}

impl NumericKind {
    /// Returns true for normalized kinds.
    pub fn is_normalized(self) -> bool {
        matches!(self, Self::SignedNorm | Self::UnsignedNorm)
    }

    /// Returns true for kinds whose stored integers carry a sign.
    pub fn is_signed(self) -> bool {
        matches!(self, Self::SignedNorm | Self::SignedInt)
    }
}

/// Width bucket of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentWidth {
    /// 32 bits per component.
    W32,
    /// 16 bits per component.
    W16,
    /// 8 bits per component.
    W8,
    /// Packed, shared or block compressed components.
    Other,
}

impl ComponentWidth {
    /// Bytes per component, or `None` for [`ComponentWidth::Other`].
    pub const fn bytes(self) -> Option<usize> {
        match self {
            Self::W32 => Some(4),
            Self::W16 => Some(2),
            Self::W8 => Some(1),
            Self::Other => None,
        }
    }

    /// Bits per component, or `None` for [`ComponentWidth::Other`].
    pub const fn bits(self) -> Option<u32> {
        match self.bytes() {
            Some(bytes) => Some(bytes as u32 * 8),
            None => None,
        }
    }
}

/// Classification of a [`Format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    kind: NumericKind,
    width: ComponentWidth,
    components: u8,
}

assert_eq_size!(FormatDescriptor, [u8; 3]);

impl FormatDescriptor {
    /// Create a descriptor. `components` must be in `1..=4`.
    pub const fn new(kind: NumericKind, width: ComponentWidth, components: u8) -> Self {
        assert!(components >= 1 && components <= 4);
        Self {
            kind,
            width,
            components,
        }
    }

    /// Numeric kind of every component.
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    /// Width bucket of one component.
    pub fn width(&self) -> ComponentWidth {
        self.width
    }

    /// Number of components, 1 to 4.
    pub fn components(&self) -> usize {
        self.components as usize
    }

    /// Bytes per component, when the width falls in a bucket.
    pub fn component_bytes(&self) -> Option<usize> {
        self.width.bytes()
    }

    /// Size in bytes of one tightly packed item.
    ///
    /// Returns `None` for packed and block compressed formats, which callers
    /// must special-case.
    pub fn byte_size(&self) -> Option<usize> {
        self.width.bytes().map(|bytes| bytes * self.components())
    }
}

bitflags! {
    /// Properties of a format not captured by its [`FormatDescriptor`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatFlags: u8 {
        /// Color values are sRGB encoded.
        const SRGB = 1 << 0;
        /// Format carries depth.
        const DEPTH = 1 << 1;
        /// Format carries stencil.
        const STENCIL = 1 << 2;
        /// Pixels are stored as 4x4 compressed blocks.
        const BLOCK_COMPRESSED = 1 << 3;
        /// Components share bytes with each other.
        const PACKED = 1 << 4;
    }
}

impl Format {
    /// Number of defined formats.
    pub const COUNT: usize = 100;

    /// The ordinal of this format.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Look a format up by its ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Classification of this format.
    #[inline]
    pub fn descriptor(self) -> FormatDescriptor {
        ENTRIES[self as usize].descriptor
    }

    /// Additional properties of this format.
    pub fn flags(self) -> FormatFlags {
        ENTRIES[self as usize].flags
    }

    /// Size in bytes of one tightly packed item, see [`FormatDescriptor::byte_size`].
    pub fn byte_size(self) -> Option<usize> {
        self.descriptor().byte_size()
    }

    /// Returns true if color values are sRGB encoded.
    pub fn is_srgb(self) -> bool {
        self.flags().contains(FormatFlags::SRGB)
    }

    /// Returns true if this is a depth or stencil format.
    pub fn is_depth_stencil(self) -> bool {
        self.flags().intersects(FormatFlags::DEPTH | FormatFlags::STENCIL)
    }

    /// Returns true if this format has a stencil component.
    pub fn has_stencil(self) -> bool {
        self.flags().contains(FormatFlags::STENCIL)
    }

    /// Returns true for block compressed formats.
    pub fn is_block_compressed(self) -> bool {
        self.flags().contains(FormatFlags::BLOCK_COMPRESSED)
    }

    /// Width and height in pixels of one block.
    pub fn block_dimensions(self) -> (u32, u32) {
        if self.is_block_compressed() {
            (4, 4)
        } else {
            (1, 1)
        }
    }

    /// Returns the size in bytes per pixel/block.
    ///
    /// `None` for formats that are not byte addressable (`Unknown`, `R1Unorm`).
    pub fn block_size(self) -> Option<u32> {
        match ENTRIES[self as usize].block_size {
            0 => None,
            size => Some(size as u32),
        }
    }
}

const_assert_eq!(Format::COUNT, Format::Bc7UnormSrgb as usize + 1);

/// Classify a format. Total over every defined format.
#[inline]
pub fn classify(format: Format) -> FormatDescriptor {
    format.descriptor()
}
