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

//! The texture sampling unit.
//!
//! Implements wrap modes, nearest/bilinear filtering, mip level selection
//! from a fractional LOD, and cubemap face selection. Samplers hold
//! immutable, reference-counted snapshots of a texture's mip chain, so
//! worker threads sample without any synchronization.

use crate::buffer::Buffer;
use okhra_core::math::{fract, lerp, Vec2, Vec3};
use okhra_core::renderer::{BorderColor, FilterMode, WrapMode};
use std::sync::Arc;

/// A storable, filterable texel.
pub trait Texel: Copy + Default + Send + Sync + 'static {
    /// The all-zero texel.
    const ZERO: Self;

    /// Linear interpolation between two texels.
    fn lerp(a: Self, b: Self, t: f32) -> Self;

    /// The texel for a border color.
    fn from_border(color: BorderColor) -> Self;
}

impl Texel for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        lerp(a, b, t)
    }

    #[inline]
    fn from_border(color: BorderColor) -> Self {
        match color {
            BorderColor::Black => 0.0,
            BorderColor::White => 1.0,
        }
    }
}

impl Texel for okhra_core::math::Rgba8 {
    const ZERO: Self = Self::new(0, 0, 0, 0);

    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self::new(
            lerp(a.r as f32, b.r as f32, t) as u8,
            lerp(a.g as f32, b.g as f32, t) as u8,
            lerp(a.b as f32, b.b as f32, t) as u8,
            lerp(a.a as f32, b.a as f32, t) as u8,
        )
    }

    #[inline]
    fn from_border(color: BorderColor) -> Self {
        match color {
            BorderColor::Black => Self::new(0, 0, 0, 0),
            BorderColor::White => Self::new(255, 255, 255, 255),
        }
    }
}

/// `(i mod n + n) mod n`, via bit masking when `n` is a power of two.
#[inline]
fn coord_mod(i: i32, n: i32) -> i32 {
    if n & (n - 1) == 0 {
        ((i & (n - 1)) + n) & (n - 1)
    } else {
        ((i % n) + n) % n
    }
}

/// Reflects a coordinate that went below zero.
#[inline]
fn coord_mirror(i: i32) -> i32 {
    if i >= 0 {
        i
    } else {
        -1 - i
    }
}

/// Fetches the texel at integer coordinates, resolving out-of-range
/// access through the wrap mode.
pub fn pixel_with_wrap<T: Texel>(
    buffer: &Buffer<T>,
    mut x: i32,
    mut y: i32,
    wrap: WrapMode,
    border: T,
) -> T {
    let w = buffer.width() as i32;
    let h = buffer.height() as i32;
    if w == 0 || h == 0 {
        return T::ZERO;
    }
    match wrap {
        WrapMode::Repeat => {
            x = coord_mod(x, w);
            y = coord_mod(y, h);
        }
        WrapMode::MirroredRepeat => {
            x = coord_mod(x, 2 * w);
            y = coord_mod(y, 2 * h);
            x -= w;
            y -= h;
            x = coord_mirror(x);
            y = coord_mirror(y);
            x = w - 1 - x;
            y = h - 1 - y;
        }
        WrapMode::ClampToEdge => {
            x = x.clamp(0, w - 1);
            y = y.clamp(0, h - 1);
        }
        WrapMode::ClampToBorder => {
            if x < 0 || x >= w || y < 0 || y >= h {
                return border;
            }
        }
    }
    buffer.get(x as u32, y as u32).unwrap_or(T::ZERO)
}

/// Point-samples `uv` (unit range) with an integer texel offset.
pub fn sample_nearest<T: Texel>(
    buffer: &Buffer<T>,
    uv: Vec2,
    wrap: WrapMode,
    offset: [i32; 2],
    border: T,
) -> T {
    let tex_uv = uv * Vec2::new(buffer.width() as f32, buffer.height() as f32);
    let x = tex_uv.x.floor() as i32 + offset[0];
    let y = tex_uv.y.floor() as i32 + offset[1];
    pixel_with_wrap(buffer, x, y, wrap, border)
}

/// Bilinearly samples `uv` (unit range) with an integer texel offset.
pub fn sample_bilinear<T: Texel>(
    buffer: &Buffer<T>,
    uv: Vec2,
    wrap: WrapMode,
    offset: [i32; 2],
    border: T,
) -> T {
    let tex_uv = uv * Vec2::new(buffer.width() as f32, buffer.height() as f32)
        + Vec2::new(offset[0] as f32, offset[1] as f32);
    sample_pixel_bilinear(buffer, tex_uv, wrap, border)
}

/// Bilinearly samples at texel-space coordinates.
///
/// The four taps surround `uv - 0.5`; blend weights are the fractional
/// parts, so sampling exactly at a texel center returns that texel.
pub fn sample_pixel_bilinear<T: Texel>(buffer: &Buffer<T>, uv: Vec2, wrap: WrapMode, border: T) -> T {
    let x = (uv.x - 0.5).floor() as i32;
    let y = (uv.y - 0.5).floor() as i32;

    let s1 = pixel_with_wrap(buffer, x, y, wrap, border);
    let s2 = pixel_with_wrap(buffer, x + 1, y, wrap, border);
    let s3 = pixel_with_wrap(buffer, x, y + 1, wrap, border);
    let s4 = pixel_with_wrap(buffer, x + 1, y + 1, wrap, border);

    let fx = fract(uv.x - 0.5);
    let fy = fract(uv.y - 0.5);
    T::lerp(T::lerp(s1, s2, fx), T::lerp(s3, s4, fx), fy)
}

/// Produces a down-sampled copy of `src` with the given dimensions, used
/// for mip chain generation. Sampling clamps to the source edges.
pub fn downsample_bilinear<T: Texel>(src: &Buffer<T>, width: u32, height: u32) -> Buffer<T> {
    let mut dst = Buffer::new(width, height);
    let ratio_x = src.width() as f32 / width.max(1) as f32;
    let ratio_y = src.height() as f32 / height.max(1) as f32;
    let delta = Vec2::new(0.5 * ratio_x, 0.5 * ratio_y);
    for y in 0..height {
        for x in 0..width {
            let uv = Vec2::new(x as f32 * ratio_x, y as f32 * ratio_y) + delta;
            let texel = sample_pixel_bilinear(src, uv, WrapMode::ClampToEdge, T::ZERO);
            dst.set(x, y, texel);
        }
    }
    dst
}

/// A bound 2-D sampler: a snapshot of a texture's mip chain plus the
/// filtering state resolved from its [`okhra_core::renderer::SamplerDesc`].
#[derive(Clone)]
pub struct Sampler2d<T: Texel> {
    levels: Vec<Arc<Buffer<T>>>,
    filter: FilterMode,
    wrap: WrapMode,
    border: T,
}

impl<T: Texel> Sampler2d<T> {
    /// Creates a sampler over a mip chain (level 0 first).
    pub fn new(levels: Vec<Arc<Buffer<T>>>, filter: FilterMode, wrap: WrapMode, border: T) -> Self {
        Self {
            levels,
            filter,
            wrap,
            border,
        }
    }

    /// Width of level 0.
    #[inline]
    pub fn width(&self) -> u32 {
        self.levels.first().map_or(0, |b| b.width())
    }

    /// Height of level 0.
    #[inline]
    pub fn height(&self) -> u32 {
        self.levels.first().map_or(0, |b| b.height())
    }

    /// Returns `true` if the sampler's filter consults the mip chain.
    #[inline]
    pub fn uses_mipmaps(&self) -> bool {
        self.filter.uses_mipmaps()
    }

    /// Dimensions of the mip level nearest to `level` (clamped).
    pub fn level_size(&self, level: usize) -> (u32, u32) {
        let level = level.min(self.levels.len().saturating_sub(1));
        self.levels
            .get(level)
            .map_or((0, 0), |b| (b.width(), b.height()))
    }

    /// Samples at `uv` with a fractional `lod`.
    #[inline]
    pub fn sample(&self, uv: Vec2, lod: f32) -> T {
        self.sample_offset(uv, lod, [0, 0])
    }

    /// Samples at `uv` with a fractional `lod` and an integer texel offset.
    pub fn sample_offset(&self, uv: Vec2, lod: f32, offset: [i32; 2]) -> T {
        if self.levels.is_empty() {
            return T::ZERO;
        }
        match self.filter {
            FilterMode::Nearest => {
                sample_nearest(&self.levels[0], uv, self.wrap, offset, self.border)
            }
            FilterMode::Linear => {
                sample_bilinear(&self.levels[0], uv, self.wrap, offset, self.border)
            }
            FilterMode::NearestMipmapNearest | FilterMode::LinearMipmapNearest => {
                let max_level = self.levels.len() as i32 - 1;
                let level = (((lod + 0.5).ceil() as i32) - 1).clamp(0, max_level) as usize;
                self.sample_level(uv, level, offset)
            }
            FilterMode::NearestMipmapLinear | FilterMode::LinearMipmapLinear => {
                let max_level = self.levels.len() as i32 - 1;
                let hi = (lod.floor() as i32).clamp(0, max_level) as usize;
                let lo = ((hi as i32) + 1).clamp(0, max_level) as usize;
                let texel_hi = self.sample_level(uv, hi, offset);
                if hi == lo {
                    texel_hi
                } else {
                    let texel_lo = self.sample_level(uv, lo, offset);
                    T::lerp(texel_hi, texel_lo, fract(lod))
                }
            }
        }
    }

    /// Samples one specific mip level with the base (non-mip) filter.
    fn sample_level(&self, uv: Vec2, level: usize, offset: [i32; 2]) -> T {
        let buffer = &self.levels[level];
        match self.filter {
            FilterMode::Nearest | FilterMode::NearestMipmapNearest | FilterMode::NearestMipmapLinear => {
                sample_nearest(buffer, uv, self.wrap, offset, self.border)
            }
            _ => sample_bilinear(buffer, uv, self.wrap, offset, self.border),
        }
    }
}

/// A bound cubemap sampler: six face samplers in canonical order.
///
/// Face-local sampling always clamps to the face edges regardless of the
/// texture's wrap mode.
#[derive(Clone)]
pub struct SamplerCube<T: Texel> {
    faces: [Sampler2d<T>; 6],
}

impl<T: Texel> SamplerCube<T> {
    /// Creates a cubemap sampler from six per-face mip chains, in
    /// canonical face order (`+X, -X, +Y, -Y, +Z, -Z`).
    pub fn new(faces: [Vec<Arc<Buffer<T>>>; 6], filter: FilterMode, border: T) -> Self {
        Self {
            faces: faces
                .map(|levels| Sampler2d::new(levels, filter, WrapMode::ClampToEdge, border)),
        }
    }

    /// Width of face level 0.
    #[inline]
    pub fn width(&self) -> u32 {
        self.faces[0].width()
    }

    /// Height of face level 0.
    #[inline]
    pub fn height(&self) -> u32 {
        self.faces[0].height()
    }

    /// Dimensions of a face's mip level (clamped).
    pub fn level_size(&self, level: usize) -> (u32, u32) {
        self.faces[0].level_size(level)
    }

    /// Samples the cube in direction `dir` with a fractional `lod`.
    pub fn sample(&self, dir: Vec3, lod: f32) -> T {
        let (face, uv) = Self::direction_to_face_uv(dir);
        self.faces[face].sample(uv, lod)
    }

    /// Maps a direction to `(face index, face uv)`.
    ///
    /// The face is the axis of largest magnitude; the remaining two axes
    /// are remapped into `[0, 1]` per the canonical cubemap convention,
    /// with v flipped before the final remap.
    pub fn direction_to_face_uv(dir: Vec3) -> (usize, Vec2) {
        let abs_x = dir.x.abs();
        let abs_y = dir.y.abs();
        let abs_z = dir.z.abs();

        let (face, max_axis, uc, vc) = if abs_x >= abs_y && abs_x >= abs_z {
            if dir.x > 0.0 {
                (0, abs_x, -dir.z, dir.y)
            } else {
                (1, abs_x, dir.z, dir.y)
            }
        } else if abs_y >= abs_x && abs_y >= abs_z {
            if dir.y > 0.0 {
                (2, abs_y, dir.x, -dir.z)
            } else {
                (3, abs_y, dir.x, dir.z)
            }
        } else if dir.z > 0.0 {
            (4, abs_z, dir.x, dir.y)
        } else {
            (5, abs_z, -dir.x, dir.y)
        };

        // Flip v, then remap from [-1, 1] to [0, 1].
        let u = 0.5 * (uc / max_axis + 1.0);
        let v = 0.5 * (-vc / max_axis + 1.0);
        (face, Vec2::new(u, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okhra_core::math::Rgba8;

    fn checker2x2() -> Buffer<Rgba8> {
        // Row-major: black, red / green, blue.
        Buffer::from_texels(
            2,
            2,
            vec![
                Rgba8::new(0, 0, 0, 255),
                Rgba8::new(255, 0, 0, 255),
                Rgba8::new(0, 255, 0, 255),
                Rgba8::new(0, 0, 255, 255),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bilinear_center_averages_corners() {
        let buf = checker2x2();
        let sampler = Sampler2d::new(
            vec![Arc::new(buf)],
            FilterMode::Linear,
            WrapMode::ClampToEdge,
            Rgba8::ZERO,
        );
        let texel = sampler.sample(Vec2::new(0.5, 0.5), 0.0);
        // (0 + 255 + 0 + 0) / 4 per channel, up to quantization.
        assert!((texel.r as i32 - 64).abs() <= 1, "r = {}", texel.r);
        assert!((texel.g as i32 - 64).abs() <= 1, "g = {}", texel.g);
        assert!((texel.b as i32 - 64).abs() <= 1, "b = {}", texel.b);
        assert_eq!(texel.a, 255);
    }

    #[test]
    fn test_nearest_picks_containing_texel() {
        let buf = checker2x2();
        let sampler = Sampler2d::new(
            vec![Arc::new(buf)],
            FilterMode::Nearest,
            WrapMode::ClampToEdge,
            Rgba8::ZERO,
        );
        assert_eq!(
            sampler.sample(Vec2::new(0.25, 0.25), 0.0),
            Rgba8::new(0, 0, 0, 255)
        );
        assert_eq!(
            sampler.sample(Vec2::new(0.75, 0.25), 0.0),
            Rgba8::new(255, 0, 0, 255)
        );
        assert_eq!(
            sampler.sample(Vec2::new(0.25, 0.75), 0.0),
            Rgba8::new(0, 255, 0, 255)
        );
    }

    #[test]
    fn test_clamp_to_border_returns_border() {
        let buf = checker2x2();
        let sampler = Sampler2d::new(
            vec![Arc::new(buf)],
            FilterMode::Nearest,
            WrapMode::ClampToBorder,
            Rgba8::from_border(BorderColor::White),
        );
        assert_eq!(
            sampler.sample(Vec2::new(2.0, 0.25), 0.0),
            Rgba8::new(255, 255, 255, 255)
        );
        assert_eq!(
            sampler.sample(Vec2::new(-0.5, 0.25), 0.0),
            Rgba8::new(255, 255, 255, 255)
        );
        // In-range still reads the texture.
        assert_eq!(
            sampler.sample(Vec2::new(0.75, 0.25), 0.0),
            Rgba8::new(255, 0, 0, 255)
        );
    }

    #[test]
    fn test_repeat_wraps_power_of_two() {
        let buf = checker2x2();
        // (2.75, 0.25) wraps to (0.75, 0.25) -> red.
        assert_eq!(
            sample_nearest(
                &buf,
                Vec2::new(2.75, 0.25),
                WrapMode::Repeat,
                [0, 0],
                Rgba8::ZERO
            ),
            Rgba8::new(255, 0, 0, 255)
        );
        // Negative coordinates wrap positively.
        assert_eq!(
            sample_nearest(
                &buf,
                Vec2::new(-0.25, 0.25),
                WrapMode::Repeat,
                [0, 0],
                Rgba8::ZERO
            ),
            Rgba8::new(255, 0, 0, 255)
        );
    }

    #[test]
    fn test_repeat_wraps_non_power_of_two() {
        let buf: Buffer<f32> =
            Buffer::from_texels(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            pixel_with_wrap(&buf, 4, 0, WrapMode::Repeat, 0.0),
            2.0
        );
        assert_eq!(
            pixel_with_wrap(&buf, -1, 0, WrapMode::Repeat, 0.0),
            3.0
        );
    }

    #[test]
    fn test_mirrored_repeat_reflects() {
        let buf: Buffer<f32> = Buffer::from_texels(4, 1, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        // One texel past the right edge reflects back onto the last texel.
        assert_eq!(
            pixel_with_wrap(&buf, 4, 0, WrapMode::MirroredRepeat, 0.0),
            3.0
        );
        assert_eq!(
            pixel_with_wrap(&buf, 5, 0, WrapMode::MirroredRepeat, 0.0),
            2.0
        );
        // One texel before the left edge reflects onto the first texel.
        assert_eq!(
            pixel_with_wrap(&buf, -1, 0, WrapMode::MirroredRepeat, 0.0),
            0.0
        );
    }

    #[test]
    fn test_mipmap_nearest_level_selection() {
        // Two levels: level 0 all 0.0, level 1 all 1.0.
        let l0: Buffer<f32> = Buffer::from_texels(2, 2, vec![0.0; 4]).unwrap();
        let l1: Buffer<f32> = Buffer::from_texels(1, 1, vec![1.0]).unwrap();
        let sampler = Sampler2d::new(
            vec![Arc::new(l0), Arc::new(l1)],
            FilterMode::NearestMipmapNearest,
            WrapMode::ClampToEdge,
            0.0,
        );
        // level = clamp(ceil(lod + 0.5) - 1, 0, max)
        assert_eq!(sampler.sample(Vec2::new(0.5, 0.5), 0.0), 0.0);
        assert_eq!(sampler.sample(Vec2::new(0.5, 0.5), 0.4), 0.0);
        assert_eq!(sampler.sample(Vec2::new(0.5, 0.5), 0.6), 1.0);
        assert_eq!(sampler.sample(Vec2::new(0.5, 0.5), 3.0), 1.0);
    }

    #[test]
    fn test_mipmap_linear_blends_levels() {
        let l0: Buffer<f32> = Buffer::from_texels(2, 2, vec![0.0; 4]).unwrap();
        let l1: Buffer<f32> = Buffer::from_texels(1, 1, vec![1.0]).unwrap();
        let sampler = Sampler2d::new(
            vec![Arc::new(l0), Arc::new(l1)],
            FilterMode::NearestMipmapLinear,
            WrapMode::ClampToEdge,
            0.0,
        );
        let v = sampler.sample(Vec2::new(0.5, 0.5), 0.25);
        assert!((v - 0.25).abs() < 1e-6, "v = {v}");
    }

    #[test]
    fn test_cube_face_selection() {
        let (face, uv) = SamplerCube::<f32>::direction_to_face_uv(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(face, 0);
        assert!((uv.x - 0.5).abs() < 1e-6 && (uv.y - 0.5).abs() < 1e-6);

        let (face, _) = SamplerCube::<f32>::direction_to_face_uv(Vec3::new(0.0, -1.0, 0.001));
        assert_eq!(face, 3);

        let (face, _) = SamplerCube::<f32>::direction_to_face_uv(Vec3::new(-2.0, 1.0, 1.0));
        assert_eq!(face, 1);
        let (face, _) = SamplerCube::<f32>::direction_to_face_uv(Vec3::new(0.1, 0.2, -3.0));
        assert_eq!(face, 5);
    }

    #[test]
    fn test_cube_solid_faces_return_face_color() {
        let faces = [0, 1, 2, 3, 4, 5].map(|i| {
            vec![Arc::new(
                Buffer::from_texels(2, 2, vec![i as f32 * 10.0; 4]).unwrap(),
            )]
        });
        let cube = SamplerCube::new(faces, FilterMode::Nearest, 0.0);
        assert_eq!(cube.sample(Vec3::new(1.0, 0.0, 0.0), 0.0), 0.0);
        assert_eq!(cube.sample(Vec3::new(-1.0, 0.0, 0.0), 0.0), 10.0);
        assert_eq!(cube.sample(Vec3::new(0.0, 1.0, 0.0), 0.0), 20.0);
        assert_eq!(cube.sample(Vec3::new(0.0, -1.0, 0.0), 0.0), 30.0);
        assert_eq!(cube.sample(Vec3::new(0.0, 0.0, 1.0), 0.0), 40.0);
        assert_eq!(cube.sample(Vec3::new(0.0, 0.0, -1.0), 0.0), 50.0);
    }

    #[test]
    fn test_downsample_halves_dimensions() {
        let src: Buffer<f32> =
            Buffer::from_texels(4, 2, vec![2.0; 8]).unwrap();
        let dst = downsample_bilinear(&src, 2, 1);
        assert_eq!(dst.width(), 2);
        assert_eq!(dst.height(), 1);
        assert_eq!(dst.get(0, 0), Some(2.0));
        assert_eq!(dst.get(1, 0), Some(2.0));
    }
}
