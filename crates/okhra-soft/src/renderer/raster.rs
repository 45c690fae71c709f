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

//! Rasterization: coverage, interpolation, shading, per-sample output.
//!
//! Triangles are tiled into 32x32 screen blocks, one worker task each;
//! inside a block the rasterizer walks 2x2 pixel quads. Points and lines
//! (including the wireframe/point polygon modes) run on the control
//! thread through the same per-sample output path.
//!
//! Worker tasks write the render targets through shared views; each
//! screen block belongs to exactly one task between barriers, which is
//! the safety argument for every `unsafe` write in this module.

use super::Viewport;
use crate::blend::blend_color;
use crate::buffer::Buffer;
use crate::depth::depth_test;
use crate::interp::{barycentric, interpolate_barycentric, interpolate_linear};
use crate::pool::ThreadPool;
use crate::quad::{PerThread, PixelQuadContext};
use crate::sampler::Texel;
use crate::shader::ShaderProgram;
use crate::texture::ImageBuffer;
use crate::vertex::{VaryingArena, VertexHolder};
use okhra_core::math::{Aabb2, Rgba8, Vec2, Vec4};
use okhra_core::renderer::RenderState;
use std::sync::Arc;

/// Edge length of the screen blocks fanned onto the worker pool.
const RASTER_BLOCK_SIZE: f32 = 32.0;

/// A shared view of one render-target plane pair, writable from raster
/// tasks.
pub(super) struct TargetView<T: Texel> {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Samples per pixel (1 or 4).
    pub samples: u32,
    /// Single-sample plane.
    pub single: Option<Arc<Buffer<T>>>,
    /// 4x per-sample plane.
    pub ms4: Option<Arc<Buffer<[T; 4]>>>,
}

impl<T: Texel> TargetView<T> {
    /// Snapshots an attachment level.
    pub fn from_image(image: &ImageBuffer<T>) -> Self {
        Self {
            width: image.width,
            height: image.height,
            samples: image.sample_count,
            single: image.buffer.clone(),
            ms4: image.buffer_ms4.clone(),
        }
    }

    /// Reads one sample; `None` out of bounds.
    pub fn get(&self, x: i32, y: i32, sample: usize) -> Option<T> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if self.samples > 1 {
            self.ms4
                .as_ref()
                .and_then(|buffer| buffer.get(x, y))
                .map(|texels| texels[sample])
        } else {
            self.single.as_ref().and_then(|buffer| buffer.get(x, y))
        }
    }

    /// Writes one sample.
    ///
    /// # Safety
    ///
    /// No other thread may access `(x, y)` concurrently (block ownership
    /// during rasterization, or control-thread exclusivity).
    pub unsafe fn set(&self, x: i32, y: i32, sample: usize, value: T) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if self.samples > 1 {
            if let Some(buffer) = &self.ms4 {
                if let Some(mut texels) = buffer.get(x, y) {
                    texels[sample] = value;
                    buffer.set_shared(x, y, texels);
                }
            }
        } else if let Some(buffer) = &self.single {
            buffer.set_shared(x, y, value);
        }
    }
}

/// Everything a raster task needs, shared immutably across the pool.
pub(super) struct RasterFrame {
    pub state: RenderState,
    pub viewport: Viewport,
    pub raster_samples: usize,
    pub early_z: bool,
    pub varyings: VaryingArena,
    pub color: Option<TargetView<Rgba8>>,
    pub depth: Option<TargetView<f32>>,
}

impl RasterFrame {
    /// Depth test with optional write-back; `true` when the sample
    /// passes (or depth testing is off).
    ///
    /// # Safety
    ///
    /// See [`TargetView::set`].
    unsafe fn depth_test_write(
        &self,
        x: i32,
        y: i32,
        depth: f32,
        sample: usize,
        skip_write: bool,
    ) -> bool {
        if !self.state.depth_test {
            return true;
        }
        let Some(target) = &self.depth else {
            return true;
        };

        // Depth clamping.
        let depth = depth.clamp(self.viewport.abs_min_depth, self.viewport.abs_max_depth);

        let Some(stored) = target.get(x, y, sample) else {
            return false;
        };
        if depth_test(depth, stored, self.state.depth_func) {
            if !skip_write && self.state.depth_mask {
                target.set(x, y, sample, depth);
            }
            true
        } else {
            false
        }
    }

    /// The per-sample output stage: depth test, blending, color write.
    ///
    /// # Safety
    ///
    /// See [`TargetView::set`].
    pub unsafe fn per_sample_operations(
        &self,
        x: i32,
        y: i32,
        depth: f32,
        color: Vec4,
        sample: usize,
    ) {
        if !self.depth_test_write(x, y, depth, sample, false) {
            return;
        }
        let Some(target) = &self.color else {
            return;
        };

        let mut color = color.clamp_scalar(0.0, 1.0);
        if self.state.blend {
            let dst = target
                .get(x, y, sample)
                .map_or(Vec4::ZERO, |texel| texel.to_unit());
            color = blend_color(color, dst, &self.state.blend_params);
        }

        target.set(x, y, sample, Rgba8::from_unit(color));
    }
}

/// Per-triangle constants handed to the block tasks.
#[derive(Debug, Clone, Copy)]
pub(super) struct TriangleSetup {
    pub front_facing: bool,
    /// `(v2.x, v1.x, v0.x, 0)`, the transposed layout the barycentric
    /// kernel consumes.
    pub flat_x: Vec4,
    /// `(v2.y, v1.y, v0.y, 0)`.
    pub flat_y: Vec4,
    /// Window-space z of the three vertices.
    pub z: [f32; 3],
    /// `1 / clip_w` of the three vertices.
    pub w: [f32; 3],
    /// Varying-arena slots of the three vertices.
    pub slots: [usize; 3],
}

impl TriangleSetup {
    pub fn from_vertices(
        v0: &VertexHolder,
        v1: &VertexHolder,
        v2: &VertexHolder,
        front_facing: bool,
    ) -> Self {
        Self {
            front_facing,
            flat_x: Vec4::new(v2.frag_pos.x, v1.frag_pos.x, v0.frag_pos.x, 0.0),
            flat_y: Vec4::new(v2.frag_pos.y, v1.frag_pos.y, v0.frag_pos.y, 0.0),
            z: [v0.frag_pos.z, v1.frag_pos.z, v2.frag_pos.z],
            w: [v0.frag_pos.w, v1.frag_pos.w, v2.frag_pos.w],
            slots: [v0.varying_slot, v1.varying_slot, v2.varying_slot],
        }
    }
}

/// Bounding box of the triangle, clamped to the viewport and expanded
/// by half a pixel.
fn triangle_bounding_box(setup: &TriangleSetup, width: f32, height: f32) -> Aabb2 {
    let xs = [setup.flat_x.x, setup.flat_x.y, setup.flat_x.z];
    let ys = [setup.flat_y.x, setup.flat_y.y, setup.flat_y.z];
    let min_x = (xs[0].min(xs[1]).min(xs[2]) - 0.5).max(0.0);
    let min_y = (ys[0].min(ys[1]).min(ys[2]) - 0.5).max(0.0);
    let max_x = (xs[0].max(xs[1]).max(xs[2]) + 0.5).min(width - 1.0);
    let max_y = (ys[0].max(ys[1]).max(ys[2]) + 0.5).min(height - 1.0);
    Aabb2::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
}

/// Partitions a triangle's bounding box into blocks and pushes one
/// raster task per block. The caller barriers on the pool afterwards.
pub(super) fn raster_triangle(
    pool: &ThreadPool,
    frame: &Arc<RasterFrame>,
    contexts: &Arc<PerThread<PixelQuadContext>>,
    setup: TriangleSetup,
) {
    let mut bounds = triangle_bounding_box(&setup, frame.viewport.width, frame.viewport.height);
    bounds.min = bounds.min - Vec2::ONE;

    let block_count_x = ((bounds.max.x - bounds.min.x + RASTER_BLOCK_SIZE - 1.0)
        / RASTER_BLOCK_SIZE) as i32;
    let block_count_y = ((bounds.max.y - bounds.min.y + RASTER_BLOCK_SIZE - 1.0)
        / RASTER_BLOCK_SIZE) as i32;

    for block_y in 0..block_count_y {
        for block_x in 0..block_count_x {
            let frame = Arc::clone(frame);
            let contexts = Arc::clone(contexts);
            pool.push(move |thread_id| {
                // Sound: the pool hands each worker its own id.
                let ctx = unsafe { contexts.get_mut(thread_id) };
                ctx.front_facing = setup.front_facing;

                let block_start_x = bounds.min.x + block_x as f32 * RASTER_BLOCK_SIZE;
                let block_start_y = bounds.min.y + block_y as f32 * RASTER_BLOCK_SIZE;

                let mut y = block_start_y + 1.0;
                while y < block_start_y + RASTER_BLOCK_SIZE && y <= bounds.max.y {
                    let mut x = block_start_x + 1.0;
                    while x < block_start_x + RASTER_BLOCK_SIZE && x <= bounds.max.x {
                        ctx.init(x, y, frame.raster_samples);
                        rasterize_pixel_quad(&frame, ctx, &setup);
                        x += 2.0;
                    }
                    y += 2.0;
                }
            });
        }
    }
}

/// Coverage, interpolation, shading, and output for one 2x2 quad.
fn rasterize_pixel_quad(frame: &RasterFrame, ctx: &mut PixelQuadContext, setup: &TriangleSetup) {
    let PixelQuadContext {
        front_facing,
        pixels,
        varyings,
        shader,
    } = ctx;

    // Per-sample coverage.
    for pixel in pixels.iter_mut() {
        for sample in pixel.samples[..pixel.sample_count].iter_mut() {
            sample.inside = barycentric(
                setup.flat_x,
                setup.flat_y,
                sample.position.xy(),
                &mut sample.barycentric,
            );
        }
        pixel.init_coverage();
    }
    if !pixels.iter().any(|p| p.inside) {
        return;
    }

    // Depth interpolation, depth clipping, perspective correction.
    let z = Vec4::new(setup.z[0], setup.z[1], setup.z[2], 0.0);
    let w = Vec4::new(setup.w[0], setup.w[1], setup.w[2], 0.0);
    for pixel in pixels.iter_mut() {
        for sample in pixel.samples[..pixel.sample_count].iter_mut() {
            if !sample.inside {
                continue;
            }
            sample.position.z = sample.barycentric.dot(z);
            sample.position.w = sample.barycentric.dot(w);

            if sample.position.z < frame.viewport.abs_min_depth
                || sample.position.z > frame.viewport.abs_max_depth
            {
                sample.inside = false;
                continue;
            }

            // Perspective-correct barycentric: weight by each vertex's
            // 1/w and renormalize by the interpolated 1/w.
            sample.barycentric = sample.barycentric * w * (1.0 / sample.position.w);
        }
    }

    // Early depth test, without depth writes.
    if frame.early_z && frame.state.depth_test {
        let mut any_inside = false;
        for pixel in pixels.iter_mut() {
            if !pixel.inside {
                continue;
            }
            let mut pixel_inside = false;
            for (sample_index, sample) in
                pixel.samples[..pixel.sample_count].iter_mut().enumerate()
            {
                if !sample.inside {
                    continue;
                }
                // The block owns these texels for the task's duration.
                sample.inside = unsafe {
                    frame.depth_test_write(
                        sample.fbo_x,
                        sample.fbo_y,
                        sample.position.z,
                        sample_index,
                        true,
                    )
                };
                pixel_inside |= sample.inside;
            }
            pixel.inside = pixel_inside;
            any_inside |= pixel_inside;
        }
        if !any_inside {
            return;
        }
    }

    // Varying interpolation: every quad pixel, covered or not, so the
    // derivative context stays defined.
    for (index, pixel) in pixels.iter().enumerate() {
        let bc = pixel.shading_sample().barycentric;
        interpolate_barycentric(
            varyings.slot_mut(index),
            frame.varyings.slot(setup.slots[0]),
            frame.varyings.slot(setup.slots[1]),
            frame.varyings.slot(setup.slots[2]),
            bc,
        );
    }

    // Fragment shading and per-sample output. Depth-only targets skip
    // the shader and just run the sample operations.
    let shade = frame.color.is_some();
    for (index, pixel) in pixels.iter().enumerate() {
        if !pixel.inside {
            continue;
        }
        let shading = pixel.shading_sample();
        let out = if shade {
            let quad = [
                varyings.slot(0),
                varyings.slot(1),
                varyings.slot(2),
                varyings.slot(3),
            ];
            shader.run_fragment(
                shading.position,
                *front_facing,
                varyings.slot(index),
                quad,
            )
        } else {
            crate::shader::FragmentOutput::default()
        };
        if out.discard {
            continue;
        }

        for (sample_index, sample) in pixel.samples[..pixel.sample_count].iter().enumerate() {
            if !sample.inside {
                continue;
            }
            unsafe {
                frame.per_sample_operations(
                    sample.fbo_x,
                    sample.fbo_y,
                    sample.position.z,
                    out.frag_color,
                    sample_index,
                );
            }
        }
    }
}

/// Rasterizes a square point of `point_size` pixels around a vertex.
/// Runs on the control thread with exclusive target access.
pub(super) fn draw_point(
    frame: &RasterFrame,
    program: &mut ShaderProgram,
    frag_pos: Vec4,
    varyings: &[f32],
    point_size: f32,
) {
    if frame.color.is_none() {
        return;
    }

    let left = frag_pos.x - point_size / 2.0 + 0.5;
    let right = left + point_size;
    let top = frag_pos.y - point_size / 2.0 + 0.5;
    let bottom = top + point_size;

    for x in (left as i32)..(right as i32) {
        for y in (top as i32)..(bottom as i32) {
            let coord = Vec4::new(x as f32, y as f32, frag_pos.z, frag_pos.w);
            let out = program.run_fragment(
                coord,
                true,
                varyings,
                [varyings, varyings, varyings, varyings],
            );
            if !out.discard {
                for sample in 0..frame.raster_samples {
                    // Control-thread exclusivity.
                    unsafe {
                        frame.per_sample_operations(x, y, coord.z, out.frag_color, sample);
                    }
                }
            }
        }
    }
}

/// Bresenham line rasterization; z, w, and varyings interpolate along
/// the dominant axis and every step stamps through the point path with
/// `line_width`.
pub(super) fn draw_line(
    frame: &RasterFrame,
    program: &mut ShaderProgram,
    v0: &VertexHolder,
    v1: &VertexHolder,
    line_width: f32,
) {
    let mut x0 = v0.frag_pos.x as i32;
    let mut y0 = v0.frag_pos.y as i32;
    let mut x1 = v1.frag_pos.x as i32;
    let mut y1 = v1.frag_pos.y as i32;

    let mut z0 = v0.frag_pos.z;
    let mut z1 = v1.frag_pos.z;
    let mut w0 = v0.frag_pos.w;
    let mut w1 = v1.frag_pos.w;

    let mut slot0 = v0.varying_slot;
    let mut slot1 = v1.varying_slot;

    let steep = (x0 - x1).abs() < (y0 - y1).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
        std::mem::swap(&mut z0, &mut z1);
        std::mem::swap(&mut w0, &mut w1);
        std::mem::swap(&mut slot0, &mut slot1);
    }

    let dx = x1 - x0;
    let dy = y1 - y0;
    let mut error = 0;
    let d_error = 2 * dy.abs();

    let mut scratch = VaryingArena::new(frame.varyings.floats(), 1);

    let mut y = y0;
    for x in x0..=x1 {
        let t = if dx == 0 {
            0.0
        } else {
            (x - x0) as f32 / dx as f32
        };
        let mut pos = Vec4::new(
            x as f32,
            y as f32,
            okhra_core::math::lerp(z0, z1, t),
            okhra_core::math::lerp(w0, w1, t),
        );
        if steep {
            std::mem::swap(&mut pos.x, &mut pos.y);
        }
        interpolate_linear(
            scratch.slot_mut(0),
            frame.varyings.slot(slot0),
            frame.varyings.slot(slot1),
            t,
        );
        draw_point(frame, program, pos, scratch.slot(0), line_width);

        error += d_error;
        if error > dx {
            y += if y1 > y0 { 1 } else { -1 };
            error -= 2 * dx;
        }
    }
}

/// Averages the four color samples of every pixel into the resolved
/// plane, one worker task per row.
pub(super) fn resolve_msaa(
    pool: &ThreadPool,
    source: &Arc<Buffer<[Rgba8; 4]>>,
    target: &Arc<Buffer<Rgba8>>,
) {
    let height = source.height();
    let width = source.width();
    for row in 0..height {
        let source = Arc::clone(source);
        let target = Arc::clone(target);
        pool.push(move |_| {
            for x in 0..width {
                let Some(samples) = source.get(x, row) else {
                    continue;
                };
                let mut sum = Vec4::ZERO;
                for texel in &samples {
                    sum += texel.to_vec4();
                }
                let average = sum / samples.len() as f32;
                // Rows are disjoint across tasks.
                unsafe {
                    target.set_shared(
                        x,
                        row,
                        Rgba8::new(
                            average.x as u8,
                            average.y as u8,
                            average.z as u8,
                            average.w as u8,
                        ),
                    );
                }
            }
        });
    }
    pool.wait_tasks_finish();
}
