// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines data structures describing texture and sampler resources.

use crate::okhra_bitflags;

/// The dimensionality of a texture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// A two-dimensional texture holding one image.
    #[default]
    TwoD,
    /// A cubemap texture holding six face images.
    Cube,
}

/// The format of the texels in a texture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit-per-channel RGBA color.
    #[default]
    Rgba8,
    /// Single-channel 32-bit float, used for depth.
    Float32,
}

/// The six cubemap faces, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// The `+X` face.
    PositiveX = 0,
    /// The `-X` face.
    NegativeX = 1,
    /// The `+Y` face.
    PositiveY = 2,
    /// The `-Y` face.
    NegativeY = 3,
    /// The `+Z` face.
    PositiveZ = 4,
    /// The `-Z` face.
    NegativeZ = 5,
}

impl CubeFace {
    /// All six faces in canonical order (`+X, -X, +Y, -Y, +Z, -Z`).
    pub const ALL: [Self; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];

    /// The face's index in canonical order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Defines how texture coordinates outside `[0, 1]` are handled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Coordinates wrap around (tiling).
    Repeat,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirroredRepeat,
    /// Coordinates are clamped to the boundary texel.
    #[default]
    ClampToEdge,
    /// Coordinates outside the range return the sampler's border color.
    ClampToBorder,
}

/// The filtering mode for texture sampling.
///
/// The `*Mipmap*` variants select a mip level (or blend two) from the
/// derivative-driven LOD before applying the base filter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling from level 0.
    #[default]
    Nearest,
    /// Bilinear sampling from level 0.
    Linear,
    /// Point sampling from the nearest mip level.
    NearestMipmapNearest,
    /// Bilinear sampling from the nearest mip level.
    LinearMipmapNearest,
    /// Point sampling from the two nearest mip levels, blended.
    NearestMipmapLinear,
    /// Bilinear sampling from the two nearest mip levels, blended (trilinear).
    LinearMipmapLinear,
}

impl FilterMode {
    /// Returns `true` if this filter consults the mip chain.
    #[inline]
    pub const fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

/// The border color returned by [`WrapMode::ClampToBorder`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderColor {
    /// Opaque black-equivalent border (all channels zero).
    #[default]
    Black,
    /// White border (all channels one).
    White,
}

/// Describes how a sampler filters and addresses a texture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDesc {
    /// Minification filter.
    pub filter_min: FilterMode,
    /// Magnification filter.
    pub filter_mag: FilterMode,
    /// Wrap mode along the S (u) axis.
    pub wrap_s: WrapMode,
    /// Wrap mode along the T (v) axis.
    pub wrap_t: WrapMode,
    /// Wrap mode along the R axis (cubemaps).
    pub wrap_r: WrapMode,
    /// Border color for [`WrapMode::ClampToBorder`].
    pub border_color: BorderColor,
}

okhra_bitflags! {
    /// A set of flags describing the allowed usages of a texture.
    pub struct TextureUsage: u32 {
        /// The texture can be bound to a shader sampler.
        const SAMPLER = 1 << 0;
        /// The texture accepts image data uploads.
        const UPLOAD_DATA = 1 << 1;
        /// The texture can be a framebuffer color attachment.
        const ATTACHMENT_COLOR = 1 << 2;
        /// The texture can be a framebuffer depth attachment.
        const ATTACHMENT_DEPTH = 1 << 3;
        /// The texture is the renderer's presentable output.
        const RENDERER_OUTPUT = 1 << 4;
    }
}

/// A descriptor used to create a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Width of level 0, in texels.
    pub width: u32,
    /// Height of level 0, in texels.
    pub height: u32,
    /// The dimensionality of the texture.
    pub kind: TextureKind,
    /// The texel format.
    pub format: TextureFormat,
    /// Allowed usages.
    pub usage: TextureUsage,
    /// Whether a mip chain is generated for this texture.
    ///
    /// Ignored (with an error log) for multisample textures, which carry
    /// no mip chain and cannot be sampled.
    pub use_mipmaps: bool,
    /// Whether the texture stores 4 samples per texel.
    pub multi_sample: bool,
}

impl Default for TextureDesc {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            kind: TextureKind::TwoD,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::SAMPLER,
            use_mipmaps: false,
            multi_sample: false,
        }
    }
}

impl TextureDesc {
    /// Width of mip level `level`, clamped at 1.
    #[inline]
    pub fn level_width(&self, level: u32) -> u32 {
        (self.width >> level).max(1)
    }

    /// Height of mip level `level`, clamped at 1.
    #[inline]
    pub fn level_height(&self, level: u32) -> u32 {
        (self.height >> level).max(1)
    }
}
