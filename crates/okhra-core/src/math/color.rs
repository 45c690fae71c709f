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

//! Defines color representations used across the pipeline.
//!
//! Shading math happens on [`LinearRgba`] / [`Vec4`] floats; storage in
//! color buffers and `RGBA8` textures uses the packed [`Rgba8`] texel.
//! The pipeline performs no sRGB conversion; shaders apply their own
//! gamma.

use crate::math::vector::Vec4;

/// A color in linear RGBA space with `f32` components.
///
/// `f32` components allow values outside `[0, 1]`; the per-sample output
/// stage clamps before packing into [`Rgba8`].
pub type LinearRgba = Vec4;

/// A packed 8-bit-per-channel RGBA texel.
///
/// This is the storage format of color buffers and `RGBA8` textures.
/// `#[repr(C)]` fixes the byte order to `r, g, b, a`, which is also the
/// order expected by the PNG exporter.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Rgba8 {
    /// The red channel.
    pub r: u8,
    /// The green channel.
    pub g: u8,
    /// The blue channel.
    pub b: u8,
    /// The alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Transparent black (all channels zero).
    pub const ZERO: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Creates a texel from explicit channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs a unit-range color, clamping each component into `[0, 1]`
    /// and scaling by 255.
    #[inline]
    pub fn from_unit(c: Vec4) -> Self {
        let c = c.clamp_scalar(0.0, 1.0) * 255.0;
        Self::new(c.x as u8, c.y as u8, c.z as u8, c.w as u8)
    }

    /// Unpacks to a unit-range `Vec4` (each channel divided by 255).
    #[inline]
    pub fn to_unit(self) -> Vec4 {
        Vec4::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }

    /// Unpacks to a `Vec4` holding raw channel values in `[0, 255]`.
    #[inline]
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32)
    }
}

impl From<[u8; 4]> for Rgba8 {
    #[inline]
    fn from(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unit_clamps_and_scales() {
        let c = Rgba8::from_unit(Vec4::new(1.5, -0.5, 0.5, 1.0));
        assert_eq!(c, Rgba8::new(255, 0, 127, 255));
    }

    #[test]
    fn test_unit_roundtrip_endpoints() {
        assert_eq!(Rgba8::from_unit(Rgba8::WHITE.to_unit()), Rgba8::WHITE);
        assert_eq!(Rgba8::from_unit(Rgba8::ZERO.to_unit()), Rgba8::ZERO);
    }

    #[test]
    fn test_layout_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Rgba8>(), 4);
        let px = Rgba8::new(1, 2, 3, 4);
        assert_eq!(bytemuck::bytes_of(&px), &[1, 2, 3, 4]);
    }
}
