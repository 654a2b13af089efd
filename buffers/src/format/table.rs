//! The format enumeration and its classification table.
//!
//! Both are generated from one list so an entry can never drift from its
//! variant. Ordinals are stable: new formats are appended at the end.

use super::{ComponentWidth, FormatDescriptor, FormatFlags, NumericKind};

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub(super) struct FormatEntry {
    pub descriptor: FormatDescriptor,
    pub flags: FormatFlags,
    /// Bytes per pixel or per compressed block, 0 when not byte addressable.
    pub block_size: u8,
}

macro_rules! format_table {
    (
        $(
            $(#[$meta:meta])*
            $name:ident = $ordinal:literal =>
                ($kind:ident, $width:ident, $count:literal, $block:literal, [$($flag:ident),*])
        ),* $(,)?
    ) => {
        /// Packed attribute and pixel formats.
        ///
        /// The discriminant is the format's ordinal. Ordinals never change
        /// meaning; new formats are appended.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[repr(u8)]
        pub enum Format {
            $(
                $(#[$meta])*
                $name = $ordinal,
            )*
        }

        impl Format {
            /// Every format, in ordinal order.
            pub const ALL: [Format; Format::COUNT] = [$(Format::$name),*];
        }

        pub(super) const ENTRIES: [FormatEntry; Format::COUNT] = [
            $(
                FormatEntry {
                    descriptor: FormatDescriptor::new(
                        NumericKind::$kind,
                        ComponentWidth::$width,
                        $count,
                    ),
                    flags: FormatFlags::from_bits_retain(0 $(| FormatFlags::$flag.bits())*),
                    block_size: $block,
                },
            )*
        ];
    };
}

format_table! {
    /// Unknown or unset format.
    #[default]
    Unknown = 0 => (Typeless, Other, 1, 0, []),

    // 128-bit
    /// Four 32-bit components, typeless.
    Rgba32Typeless = 1 => (Typeless, W32, 4, 16, []),
    /// Four 32-bit floats.
    Rgba32Float = 2 => (Float, W32, 4, 16, []),
    /// Four 32-bit unsigned integers.
    Rgba32Uint = 3 => (UnsignedInt, W32, 4, 16, []),
    /// Four 32-bit signed integers.
    Rgba32Sint = 4 => (SignedInt, W32, 4, 16, []),

    // 96-bit
    /// Three 32-bit components, typeless.
    Rgb32Typeless = 5 => (Typeless, W32, 3, 12, []),
    /// Three 32-bit floats.
    Rgb32Float = 6 => (Float, W32, 3, 12, []),
    /// Three 32-bit unsigned integers.
    Rgb32Uint = 7 => (UnsignedInt, W32, 3, 12, []),
    /// Three 32-bit signed integers.
    Rgb32Sint = 8 => (SignedInt, W32, 3, 12, []),

    // 64-bit
    /// Four 16-bit components, typeless.
    Rgba16Typeless = 9 => (Typeless, W16, 4, 8, []),
    /// Four 16-bit floats.
    Rgba16Float = 10 => (Float, W16, 4, 8, []),
    /// Four 16-bit unsigned normalized integers.
    Rgba16Unorm = 11 => (UnsignedNorm, W16, 4, 8, []),
    /// Four 16-bit unsigned integers.
    Rgba16Uint = 12 => (UnsignedInt, W16, 4, 8, []),
    /// Four 16-bit signed normalized integers.
    Rgba16Snorm = 13 => (SignedNorm, W16, 4, 8, []),
    /// Four 16-bit signed integers.
    Rgba16Sint = 14 => (SignedInt, W16, 4, 8, []),
    /// Two 32-bit components, typeless.
    Rg32Typeless = 15 => (Typeless, W32, 2, 8, []),
    /// Two 32-bit floats.
    Rg32Float = 16 => (Float, W32, 2, 8, []),
    /// Two 32-bit unsigned integers.
    Rg32Uint = 17 => (UnsignedInt, W32, 2, 8, []),
    /// Two 32-bit signed integers.
    Rg32Sint = 18 => (SignedInt, W32, 2, 8, []),
    /// 32-bit red, 8-bit green, 24 unused bits, typeless.
    R32G8X24Typeless = 19 => (Typeless, Other, 2, 8, [PACKED]),
    /// 32-bit float depth, 8-bit stencil, 24 unused bits.
    Depth32FloatStencil8X24 = 20 => (Float, Other, 2, 8, [DEPTH, STENCIL, PACKED]),
    /// 32-bit float red view of a depth-stencil format.
    R32FloatX8X24Typeless = 21 => (Float, Other, 1, 8, [PACKED]),
    /// 8-bit stencil view of a 64-bit depth-stencil format.
    X32TypelessG8X24Uint = 22 => (UnsignedInt, Other, 1, 8, [PACKED]),

    // 32-bit
    /// 10-bit RGB with 2-bit alpha, typeless.
    Rgb10A2Typeless = 23 => (Typeless, Other, 4, 4, [PACKED]),
    /// 10-bit RGB with 2-bit alpha, unsigned normalized.
    Rgb10A2Unorm = 24 => (UnsignedNorm, Other, 4, 4, [PACKED]),
    /// 10-bit RGB with 2-bit alpha, unsigned integers.
    Rgb10A2Uint = 25 => (UnsignedInt, Other, 4, 4, [PACKED]),
    /// 11-bit red and green, 10-bit blue floats.
    Rg11B10Float = 26 => (Float, Other, 3, 4, [PACKED]),
    /// Four 8-bit components, typeless.
    Rgba8Typeless = 27 => (Typeless, W8, 4, 4, []),
    /// Four 8-bit unsigned normalized integers.
    Rgba8Unorm = 28 => (UnsignedNorm, W8, 4, 4, []),
    /// Four 8-bit unsigned normalized integers, sRGB encoded.
    Rgba8UnormSrgb = 29 => (UnsignedNorm, W8, 4, 4, [SRGB]),
    /// Four 8-bit unsigned integers.
    Rgba8Uint = 30 => (UnsignedInt, W8, 4, 4, []),
    /// Four 8-bit signed normalized integers.
    Rgba8Snorm = 31 => (SignedNorm, W8, 4, 4, []),
    /// Four 8-bit signed integers.
    Rgba8Sint = 32 => (SignedInt, W8, 4, 4, []),
    /// Two 16-bit components, typeless.
    Rg16Typeless = 33 => (Typeless, W16, 2, 4, []),
    /// Two 16-bit floats.
    Rg16Float = 34 => (Float, W16, 2, 4, []),
    /// Two 16-bit unsigned normalized integers.
    Rg16Unorm = 35 => (UnsignedNorm, W16, 2, 4, []),
    /// Two 16-bit unsigned integers.
    Rg16Uint = 36 => (UnsignedInt, W16, 2, 4, []),
    /// Two 16-bit signed normalized integers.
    Rg16Snorm = 37 => (SignedNorm, W16, 2, 4, []),
    /// Two 16-bit signed integers.
    Rg16Sint = 38 => (SignedInt, W16, 2, 4, []),
    /// One 32-bit component, typeless.
    R32Typeless = 39 => (Typeless, W32, 1, 4, []),
    /// 32-bit float depth.
    Depth32Float = 40 => (Float, W32, 1, 4, [DEPTH]),
    /// One 32-bit float.
    R32Float = 41 => (Float, W32, 1, 4, []),
    /// One 32-bit unsigned integer.
    R32Uint = 42 => (UnsignedInt, W32, 1, 4, []),
    /// One 32-bit signed integer.
    R32Sint = 43 => (SignedInt, W32, 1, 4, []),
    /// 24-bit red, 8-bit green, typeless.
    R24G8Typeless = 44 => (Typeless, Other, 2, 4, [PACKED]),
    /// 24-bit normalized depth with 8-bit stencil.
    Depth24UnormStencil8 = 45 => (UnsignedNorm, Other, 2, 4, [DEPTH, STENCIL, PACKED]),
    /// 24-bit normalized red view of a depth-stencil format.
    R24UnormX8Typeless = 46 => (UnsignedNorm, Other, 1, 4, [PACKED]),
    /// 8-bit stencil view of a 32-bit depth-stencil format.
    X24TypelessG8Uint = 47 => (UnsignedInt, Other, 1, 4, [PACKED]),

    // 16-bit
    /// Two 8-bit components, typeless.
    Rg8Typeless = 48 => (Typeless, W8, 2, 2, []),
    /// Two 8-bit unsigned normalized integers.
    Rg8Unorm = 49 => (UnsignedNorm, W8, 2, 2, []),
    /// Two 8-bit unsigned integers.
    Rg8Uint = 50 => (UnsignedInt, W8, 2, 2, []),
    /// Two 8-bit signed normalized integers.
    Rg8Snorm = 51 => (SignedNorm, W8, 2, 2, []),
    /// Two 8-bit signed integers.
    Rg8Sint = 52 => (SignedInt, W8, 2, 2, []),
    /// One 16-bit component, typeless.
    R16Typeless = 53 => (Typeless, W16, 1, 2, []),
    /// One 16-bit float.
    R16Float = 54 => (Float, W16, 1, 2, []),
    /// 16-bit normalized depth.
    Depth16Unorm = 55 => (UnsignedNorm, W16, 1, 2, [DEPTH]),
    /// One 16-bit unsigned normalized integer.
    R16Unorm = 56 => (UnsignedNorm, W16, 1, 2, []),
    /// One 16-bit unsigned integer.
    R16Uint = 57 => (UnsignedInt, W16, 1, 2, []),
    /// One 16-bit signed normalized integer.
    R16Snorm = 58 => (SignedNorm, W16, 1, 2, []),
    /// One 16-bit signed integer.
    R16Sint = 59 => (SignedInt, W16, 1, 2, []),

    // 8-bit
    /// One 8-bit component, typeless.
    R8Typeless = 60 => (Typeless, W8, 1, 1, []),
    /// One 8-bit unsigned normalized integer.
    R8Unorm = 61 => (UnsignedNorm, W8, 1, 1, []),
    /// One 8-bit unsigned integer.
    R8Uint = 62 => (UnsignedInt, W8, 1, 1, []),
    /// One 8-bit signed normalized integer.
    R8Snorm = 63 => (SignedNorm, W8, 1, 1, []),
    /// One 8-bit signed integer.
    R8Sint = 64 => (SignedInt, W8, 1, 1, []),
    /// 8-bit alpha, unsigned normalized.
    A8Unorm = 65 => (UnsignedNorm, W8, 1, 1, []),
    /// 1-bit monochrome.
    R1Unorm = 66 => (UnsignedNorm, Other, 1, 0, [PACKED]),

    // Special packed layouts
    /// Three 9-bit mantissas sharing a 5-bit exponent.
    Rgb9E5SharedExp = 67 => (Float, Other, 3, 4, [PACKED]),
    /// 4:2:2 packed RGBG.
    Rg8Bg8Unorm = 68 => (UnsignedNorm, Other, 4, 4, [PACKED]),
    /// 4:2:2 packed GRGB.
    Gr8Gb8Unorm = 69 => (UnsignedNorm, Other, 4, 4, [PACKED]),

    // Block compressed (BC1-BC5)
    /// BC1 block compression, typeless.
    Bc1Typeless = 70 => (Typeless, Other, 4, 8, [BLOCK_COMPRESSED]),
    /// BC1 block compression, unsigned normalized.
    Bc1Unorm = 71 => (UnsignedNorm, Other, 4, 8, [BLOCK_COMPRESSED]),
    /// BC1 block compression, sRGB encoded.
    Bc1UnormSrgb = 72 => (UnsignedNorm, Other, 4, 8, [BLOCK_COMPRESSED, SRGB]),
    /// BC2 block compression, typeless.
    Bc2Typeless = 73 => (Typeless, Other, 4, 16, [BLOCK_COMPRESSED]),
    /// BC2 block compression, unsigned normalized.
    Bc2Unorm = 74 => (UnsignedNorm, Other, 4, 16, [BLOCK_COMPRESSED]),
    /// BC2 block compression, sRGB encoded.
    Bc2UnormSrgb = 75 => (UnsignedNorm, Other, 4, 16, [BLOCK_COMPRESSED, SRGB]),
    /// BC3 block compression, typeless.
    Bc3Typeless = 76 => (Typeless, Other, 4, 16, [BLOCK_COMPRESSED]),
    /// BC3 block compression, unsigned normalized.
    Bc3Unorm = 77 => (UnsignedNorm, Other, 4, 16, [BLOCK_COMPRESSED]),
    /// BC3 block compression, sRGB encoded.
    Bc3UnormSrgb = 78 => (UnsignedNorm, Other, 4, 16, [BLOCK_COMPRESSED, SRGB]),
    /// BC4 single channel block compression, typeless.
    Bc4Typeless = 79 => (Typeless, Other, 1, 8, [BLOCK_COMPRESSED]),
    /// BC4 single channel block compression, unsigned normalized.
    Bc4Unorm = 80 => (UnsignedNorm, Other, 1, 8, [BLOCK_COMPRESSED]),
    /// BC4 single channel block compression, signed normalized.
    Bc4Snorm = 81 => (SignedNorm, Other, 1, 8, [BLOCK_COMPRESSED]),
    /// BC5 two channel block compression, typeless.
    Bc5Typeless = 82 => (Typeless, Other, 2, 16, [BLOCK_COMPRESSED]),
    /// BC5 two channel block compression, unsigned normalized.
    Bc5Unorm = 83 => (UnsignedNorm, Other, 2, 16, [BLOCK_COMPRESSED]),
    /// BC5 two channel block compression, signed normalized.
    Bc5Snorm = 84 => (SignedNorm, Other, 2, 16, [BLOCK_COMPRESSED]),

    // BGR(A) layouts
    /// 5-bit blue, 6-bit green, 5-bit red.
    B5G6R5Unorm = 85 => (UnsignedNorm, Other, 3, 2, [PACKED]),
    /// 5-bit BGR with 1-bit alpha.
    Bgr5A1Unorm = 86 => (UnsignedNorm, Other, 4, 2, [PACKED]),
    /// Four 8-bit unsigned normalized integers in BGRA order.
    Bgra8Unorm = 87 => (UnsignedNorm, W8, 4, 4, []),
    /// 8-bit BGR with an unused byte.
    Bgrx8Unorm = 88 => (UnsignedNorm, W8, 4, 4, []),
    /// 10-bit extended range RGB with 2-bit alpha.
    Rgb10XrBiasA2Unorm = 89 => (UnsignedNorm, Other, 4, 4, [PACKED]),
    /// Four 8-bit components in BGRA order, typeless.
    Bgra8Typeless = 90 => (Typeless, W8, 4, 4, []),
    /// Four 8-bit unsigned normalized integers in BGRA order, sRGB encoded.
    Bgra8UnormSrgb = 91 => (UnsignedNorm, W8, 4, 4, [SRGB]),
    /// 8-bit BGR with an unused byte, typeless.
    Bgrx8Typeless = 92 => (Typeless, W8, 4, 4, []),
    /// 8-bit BGR with an unused byte, sRGB encoded.
    Bgrx8UnormSrgb = 93 => (UnsignedNorm, W8, 4, 4, [SRGB]),

    // Block compressed (BC6H, BC7)
    /// BC6H HDR block compression, typeless.
    Bc6hTypeless = 94 => (Typeless, Other, 3, 16, [BLOCK_COMPRESSED]),
    /// BC6H HDR block compression, unsigned half floats.
    Bc6hUfloat = 95 => (Float, Other, 3, 16, [BLOCK_COMPRESSED]),
    /// BC6H HDR block compression, signed half floats.
    Bc6hSfloat = 96 => (Float, Other, 3, 16, [BLOCK_COMPRESSED]),
    /// BC7 block compression, typeless.
    Bc7Typeless = 97 => (Typeless, Other, 4, 16, [BLOCK_COMPRESSED]),
    /// BC7 block compression, unsigned normalized.
    Bc7Unorm = 98 => (UnsignedNorm, Other, 4, 16, [BLOCK_COMPRESSED]),
    /// BC7 block compression, sRGB encoded.
    Bc7UnormSrgb = 99 => (UnsignedNorm, Other, 4, 16, [BLOCK_COMPRESSED, SRGB]),
}
