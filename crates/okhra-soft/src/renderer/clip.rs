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

//! Homogeneous clipping against the six frustum planes.
//!
//! Points are discarded when outside; lines use Liang-Barsky parametric
//! clipping; triangles use Sutherland-Hodgman, appending fan triangles
//! for each extra polygon vertex. Synthesized vertices interpolate the
//! raw input attributes and re-run the vertex shader so their clip
//! position and varyings stay self-consistent.

use super::{perspective_divide, viewport_transform, Viewport};
use crate::shader::ShaderProgram;
use crate::vertex::{
    PrimitiveHolder, VaryingArena, VertexArrayObject, VertexBytes, VertexHolder,
};
use okhra_core::math::{lerp, Vec4};
use okhra_core::renderer::{PolygonMode, PrimitiveType};

/// Frustum plane bits, in `+X, -X, +Y, -Y, +Z, -Z` order.
const FRUSTUM_CLIP_MASK: [u8; 6] = [1, 2, 4, 8, 16, 32];

/// Plane equations: a vertex is inside plane `i` iff
/// `dot(FRUSTUM_CLIP_PLANE[i], clip_pos) >= 0`.
const FRUSTUM_CLIP_PLANE: [Vec4; 6] = [
    Vec4::new(-1.0, 0.0, 0.0, 1.0),
    Vec4::new(1.0, 0.0, 0.0, 1.0),
    Vec4::new(0.0, -1.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 0.0, 1.0),
    Vec4::new(0.0, 0.0, -1.0, 1.0),
    Vec4::new(0.0, 0.0, 1.0, 1.0),
];

/// Which frustum planes `clip_pos` violates, as a 6-bit mask.
pub(super) fn frustum_clip_mask(clip_pos: Vec4) -> u8 {
    let mut mask = 0;
    if clip_pos.w < clip_pos.x {
        mask |= FRUSTUM_CLIP_MASK[0];
    }
    if clip_pos.w < -clip_pos.x {
        mask |= FRUSTUM_CLIP_MASK[1];
    }
    if clip_pos.w < clip_pos.y {
        mask |= FRUSTUM_CLIP_MASK[2];
    }
    if clip_pos.w < -clip_pos.y {
        mask |= FRUSTUM_CLIP_MASK[3];
    }
    if clip_pos.w < clip_pos.z {
        mask |= FRUSTUM_CLIP_MASK[4];
    }
    if clip_pos.w < -clip_pos.z {
        mask |= FRUSTUM_CLIP_MASK[5];
    }
    mask
}

/// The clipping stage's working set for one draw call.
pub(super) struct ClipStage<'a> {
    pub vertices: &'a mut Vec<VertexHolder>,
    pub primitives: &'a mut Vec<PrimitiveHolder>,
    pub varyings: &'a mut VaryingArena,
    pub program: &'a mut ShaderProgram,
    pub vao: &'a VertexArrayObject,
    pub viewport: Viewport,
}

impl ClipStage<'_> {
    /// Clips every live primitive, then consolidates vertex discard
    /// flags so later stages skip unreferenced vertices.
    pub fn run(&mut self, primitive_type: PrimitiveType, polygon_mode: PolygonMode) {
        let count = self.primitives.len();
        for index in 0..count {
            if self.primitives[index].discard {
                continue;
            }
            match primitive_type {
                PrimitiveType::Point => self.clip_point(index),
                PrimitiveType::Line => self.clip_line(index, false),
                PrimitiveType::Triangle => {
                    // Wireframe and point modes clip the edges instead,
                    // after face culling.
                    if polygon_mode == PolygonMode::Fill {
                        self.clip_triangle(index);
                    }
                }
            }
        }

        let arity = match primitive_type {
            PrimitiveType::Point => 1,
            PrimitiveType::Line => 2,
            PrimitiveType::Triangle => 3,
        };
        for vertex in self.vertices.iter_mut() {
            vertex.discard = true;
        }
        for prim in self.primitives.iter().filter(|p| !p.discard) {
            for &index in &prim.indices[..arity] {
                self.vertices[index].discard = false;
            }
        }
    }

    fn clip_point(&mut self, prim: usize) {
        let index = self.primitives[prim].indices[0];
        self.primitives[prim].discard = self.vertices[index].clip_mask != 0;
    }

    /// Liang-Barsky clipping of one line primitive. With
    /// `post_vertex_process` set, synthesized endpoints get perspective
    /// divide and viewport transform applied immediately (the wireframe
    /// path runs after those stages).
    fn clip_line(&mut self, prim: usize, post_vertex_process: bool) {
        let [i0, i1, _] = self.primitives[prim].indices;
        let mask0 = self.vertices[i0].clip_mask;
        let mask1 = self.vertices[i1].clip_mask;
        let p0 = self.vertices[i0].clip_pos;
        let p1 = self.vertices[i1].clip_pos;

        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;
        let mask = mask0 | mask1;
        if mask != 0 {
            for plane in 0..6 {
                if mask & FRUSTUM_CLIP_MASK[plane] == 0 {
                    continue;
                }
                let d0 = FRUSTUM_CLIP_PLANE[plane].dot(p0);
                let d1 = FRUSTUM_CLIP_PLANE[plane].dot(p1);
                if d0 < 0.0 && d1 < 0.0 {
                    self.primitives[prim].discard = true;
                    return;
                } else if d0 < 0.0 {
                    t0 = t0.max(-d0 / (d1 - d0));
                } else {
                    t1 = t1.min(d0 / (d0 - d1));
                }
            }
        }

        if mask0 != 0 {
            let index = self.new_vertex(i0, i1, t0, post_vertex_process);
            self.primitives[prim].indices[0] = index;
        }
        if mask1 != 0 {
            let index = self.new_vertex(i0, i1, t1, post_vertex_process);
            self.primitives[prim].indices[1] = index;
        }
    }

    /// Sutherland-Hodgman clipping of one triangle; the surviving
    /// polygon is fanned into extra triangles appended to the list.
    fn clip_triangle(&mut self, prim: usize) {
        let [i0, i1, i2] = self.primitives[prim].indices;
        let mask =
            self.vertices[i0].clip_mask | self.vertices[i1].clip_mask | self.vertices[i2].clip_mask;
        if mask == 0 {
            return;
        }

        let mut full_clip = false;
        let mut indices_in: Vec<usize> = vec![i0, i1, i2];
        let mut indices_out: Vec<usize> = Vec::new();

        for plane in 0..6 {
            if mask & FRUSTUM_CLIP_MASK[plane] == 0 {
                continue;
            }
            if indices_in.len() < 3 {
                full_clip = true;
                break;
            }
            indices_out.clear();

            let mut idx_pre = indices_in[0];
            let mut d_pre = FRUSTUM_CLIP_PLANE[plane].dot(self.vertices[idx_pre].clip_pos);

            // Close the polygon loop.
            indices_in.push(idx_pre);
            for i in 1..indices_in.len() {
                let idx = indices_in[i];
                let d = FRUSTUM_CLIP_PLANE[plane].dot(self.vertices[idx].clip_pos);

                if d_pre >= 0.0 {
                    indices_out.push(idx_pre);
                }

                if d_pre.is_sign_negative() != d.is_sign_negative() {
                    let t = if d < 0.0 {
                        d_pre / (d_pre - d)
                    } else {
                        -d_pre / (d - d_pre)
                    };
                    let index = self.new_vertex(idx_pre, idx, t, false);
                    indices_out.push(index);
                }

                idx_pre = idx;
                d_pre = d;
            }

            std::mem::swap(&mut indices_in, &mut indices_out);
        }

        if full_clip || indices_in.is_empty() {
            self.primitives[prim].discard = true;
            return;
        }

        let front_facing = self.primitives[prim].front_facing;
        self.primitives[prim].indices = [indices_in[0], indices_in[1], indices_in[2]];
        for i in 3..indices_in.len() {
            self.primitives.push(PrimitiveHolder {
                indices: [indices_in[0], indices_in[i - 1], indices_in[i]],
                discard: false,
                front_facing,
            });
        }
    }

    /// Replaces the live triangles with their clipped edge lines
    /// (wireframe polygon mode).
    pub fn triangles_to_edge_lines(&mut self) {
        let triangles: Vec<PrimitiveHolder> =
            self.primitives.iter().filter(|p| !p.discard).copied().collect();
        self.primitives.clear();
        for triangle in triangles {
            for edge in 0..3 {
                let line = PrimitiveHolder {
                    indices: [
                        triangle.indices[edge],
                        triangle.indices[(edge + 1) % 3],
                        triangle.indices[(edge + 1) % 3],
                    ],
                    discard: false,
                    front_facing: triangle.front_facing,
                };
                self.primitives.push(line);
                let index = self.primitives.len() - 1;
                self.clip_line(index, true);
            }
        }
    }

    /// Replaces the live triangles with their corner points (point
    /// polygon mode).
    pub fn triangles_to_corner_points(&mut self) {
        let triangles: Vec<PrimitiveHolder> =
            self.primitives.iter().filter(|p| !p.discard).copied().collect();
        self.primitives.clear();
        for triangle in triangles {
            for corner in 0..3 {
                let index = triangle.indices[corner];
                self.primitives.push(PrimitiveHolder {
                    indices: [index, index, index],
                    discard: self.vertices[index].clip_mask != 0,
                    front_facing: triangle.front_facing,
                });
            }
        }
    }

    /// Synthesizes the vertex at parameter `t` between two vertices:
    /// interpolates the raw float attributes, re-runs the vertex shader
    /// on them, and appends the result to the working list.
    fn new_vertex(&mut self, i0: usize, i1: usize, t: f32, post_vertex_process: bool) -> usize {
        let stride = self.vao.vertex_stride;
        let mut bytes = vec![0u8; stride].into_boxed_slice();
        {
            let b0 = self.vertices[i0].resolve_bytes(self.vao);
            let b1 = self.vertices[i1].resolve_bytes(self.vao);
            // Attributes are float-typed; interpolate them as such.
            for (k, chunk) in bytes.chunks_exact_mut(4).enumerate() {
                let f0 = f32::from_le_bytes(b0[k * 4..k * 4 + 4].try_into().unwrap());
                let f1 = f32::from_le_bytes(b1[k * 4..k * 4 + 4].try_into().unwrap());
                chunk.copy_from_slice(&lerp(f0, f1, t).to_le_bytes());
            }
        }

        let slot = self.varyings.push_slot();
        self.program.run_vertex(&bytes, self.varyings.slot_mut(slot));
        let clip_pos = self.program.builtin().position;

        let index = self.vertices.len();
        let mut vertex = VertexHolder {
            index,
            bytes: VertexBytes::Owned(bytes),
            varying_slot: slot,
            clip_pos,
            frag_pos: Vec4::ZERO,
            clip_mask: frustum_clip_mask(clip_pos),
            discard: false,
        };
        if post_vertex_process {
            perspective_divide(&mut vertex);
            viewport_transform(&mut vertex, &self.viewport);
        }
        self.vertices.push(vertex);
        index
    }
}
