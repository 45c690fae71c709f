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

//! The 2x2 pixel-quad shading unit.
//!
//! Quads are the smallest unit handed to the fragment shader: all four
//! pixels interpolate their varyings (covered or not) so screen-space
//! derivatives stay defined. Each worker thread owns one long-lived
//! [`PixelQuadContext`] holding its varying scratch and shader clone.

use crate::shader::ShaderProgram;
use crate::vertex::VaryingArena;
use okhra_core::math::{Vec2, Vec4};
use std::cell::UnsafeCell;

/// Pixels per quad.
pub const QUAD_PIXELS: usize = 4;

/// Maximum samples per pixel (the 4x MSAA mode).
pub const MAX_SAMPLES: usize = 4;

/// Sub-pixel position of the single-sample mode: the pixel center.
const SAMPLE_OFFSET_1X: Vec2 = Vec2::new(0.5, 0.5);

/// Sub-pixel positions of the 4x rotated-grid pattern.
const SAMPLE_OFFSETS_4X: [Vec2; 4] = [
    Vec2::new(0.375, 0.125),
    Vec2::new(0.875, 0.375),
    Vec2::new(0.125, 0.625),
    Vec2::new(0.625, 0.875),
];

/// Per-sample rasterization state.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleContext {
    /// Window-space position; z and w are filled in by interpolation.
    pub position: Vec4,
    /// Barycentric weights at this sample.
    pub barycentric: Vec4,
    /// Whether the sample lies inside the triangle (and survives depth
    /// clipping / early-z).
    pub inside: bool,
    /// Framebuffer texel x addressed by this sample.
    pub fbo_x: i32,
    /// Framebuffer texel y addressed by this sample.
    pub fbo_y: i32,
}

/// Per-pixel rasterization state: up to four samples plus coverage.
#[derive(Debug, Default, Clone, Copy)]
pub struct PixelContext {
    /// The sample slots; only the first `sample_count` are live.
    pub samples: [SampleContext; MAX_SAMPLES],
    /// Live samples per pixel (1 or 4).
    pub sample_count: usize,
    /// Whether any sample is covered.
    pub inside: bool,
}

impl PixelContext {
    /// Positions the samples of the pixel whose top-left corner is
    /// `(x, y)`.
    pub fn init(&mut self, x: f32, y: f32, sample_count: usize) {
        self.sample_count = sample_count.clamp(1, MAX_SAMPLES);
        self.inside = false;
        let single = self.sample_count == 1;
        for (index, sample) in self.samples[..self.sample_count].iter_mut().enumerate() {
            let offset = if single {
                SAMPLE_OFFSET_1X
            } else {
                SAMPLE_OFFSETS_4X[index]
            };
            sample.position = Vec4::new(x + offset.x, y + offset.y, 0.0, 0.0);
            sample.barycentric = Vec4::ZERO;
            sample.inside = false;
            sample.fbo_x = x as i32;
            sample.fbo_y = y as i32;
        }
    }

    /// Derives pixel coverage from sample coverage.
    #[inline]
    pub fn init_coverage(&mut self) {
        self.inside = self.samples[..self.sample_count].iter().any(|s| s.inside);
    }

    /// The sample whose barycentric drives varying interpolation and
    /// whose position becomes `FragCoord` (sample 0).
    #[inline]
    pub fn shading_sample(&self) -> &SampleContext {
        &self.samples[0]
    }
}

/// One worker thread's quad state: four pixels, their varying scratch,
/// and a cloned shader program.
pub struct PixelQuadContext {
    /// Facing flag of the triangle currently rasterized.
    pub front_facing: bool,
    /// The 2x2 pixels: top-left, top-right, bottom-left, bottom-right.
    pub pixels: [PixelContext; QUAD_PIXELS],
    /// Varying scratch, one aligned slot per pixel.
    pub varyings: VaryingArena,
    /// This thread's shader instance.
    pub shader: ShaderProgram,
}

impl PixelQuadContext {
    /// Creates a context with `varying_floats`-sized scratch slots.
    pub fn new(varying_floats: usize, shader: ShaderProgram) -> Self {
        Self {
            front_facing: true,
            pixels: [PixelContext::default(); QUAD_PIXELS],
            varyings: VaryingArena::new(varying_floats, QUAD_PIXELS),
            shader,
        }
    }

    /// Positions the quad with top-left pixel `(x, y)`.
    pub fn init(&mut self, x: f32, y: f32, sample_count: usize) {
        self.pixels[0].init(x, y, sample_count);
        self.pixels[1].init(x + 1.0, y, sample_count);
        self.pixels[2].init(x, y + 1.0, sample_count);
        self.pixels[3].init(x + 1.0, y + 1.0, sample_count);
    }

    /// Whether any pixel of the quad is covered.
    #[inline]
    pub fn any_inside(&self) -> bool {
        self.pixels.iter().any(|p| p.inside)
    }
}

/// A slab of per-worker state indexed by worker id.
///
/// The pool guarantees a worker only ever receives its own index, which
/// makes the interior mutability sound.
pub struct PerThread<T> {
    slots: Vec<UnsafeCell<T>>,
}

// Each slot is only touched by the worker owning its index.
unsafe impl<T: Send> Sync for PerThread<T> {}

impl<T> PerThread<T> {
    /// Wraps one state item per worker.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            slots: items.into_iter().map(UnsafeCell::new).collect(),
        }
    }

    /// The number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Borrows the slot for a worker.
    ///
    /// # Safety
    ///
    /// `index` must be the calling worker's own id; no two threads may
    /// use the same index concurrently, and the caller must not hold two
    /// live borrows of one slot.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn get_mut(&self, index: usize) -> &mut T {
        &mut *self.slots[index].get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_pixel_layout() {
        let mut quad = PixelQuadContext::new(0, ShaderProgram::new());
        quad.init(10.0, 20.0, 1);
        // Single-sample positions sit at pixel centers.
        assert_eq!(quad.pixels[0].samples[0].position.xy(), Vec2::new(10.5, 20.5));
        assert_eq!(quad.pixels[1].samples[0].position.xy(), Vec2::new(11.5, 20.5));
        assert_eq!(quad.pixels[2].samples[0].position.xy(), Vec2::new(10.5, 21.5));
        assert_eq!(quad.pixels[3].samples[0].position.xy(), Vec2::new(11.5, 21.5));
        assert_eq!(quad.pixels[3].samples[0].fbo_x, 11);
        assert_eq!(quad.pixels[3].samples[0].fbo_y, 21);
    }

    #[test]
    fn test_coverage_rules() {
        let mut pixel = PixelContext::default();
        pixel.init(0.0, 0.0, 4);
        assert_eq!(pixel.sample_count, 4);
        pixel.init_coverage();
        assert!(!pixel.inside);

        pixel.samples[2].inside = true;
        pixel.init_coverage();
        assert!(pixel.inside);
    }

    #[test]
    fn test_sample_positions_within_pixel() {
        let mut pixel = PixelContext::default();
        pixel.init(5.0, 7.0, 4);
        for sample in &pixel.samples {
            assert!(sample.position.x > 5.0 && sample.position.x < 6.0);
            assert!(sample.position.y > 7.0 && sample.position.y < 8.0);
        }
    }
}
