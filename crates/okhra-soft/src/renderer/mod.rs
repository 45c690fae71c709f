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

//! The renderer: resource arenas and the seven-stage draw pipeline.
//!
//! One [`Renderer`] owns every resource (textures, framebuffers,
//! programs, vertex arrays) behind typed handles. A draw call runs
//! vertex processing, primitive assembly, clipping, perspective divide,
//! viewport transform, face culling, and rasterization in order; the
//! rasterization stage fans 32x32 screen blocks onto the worker pool and
//! barriers before returning. All invalid-state paths log and no-op.

mod clip;
mod raster;

use crate::buffer::Buffer;
use crate::error::SoftError;
use crate::framebuffer::Framebuffer;
use crate::pool::ThreadPool;
use crate::quad::{PerThread, PixelQuadContext};
use crate::sampler::{Sampler2d, SamplerCube, Texel};
use crate::shader::{BoundSampler, ShaderProgram};
use crate::texture::Texture;
use crate::uniform::{ShaderBindings, UniformBlock, UniformSampler};
use crate::vertex::{
    PrimitiveHolder, VaryingArena, VertexArrayObject, VertexBytes, VertexHolder,
};
use clip::ClipStage;
use log::error;
use okhra_core::math::{Rgba8, Vec3, Vec4};
use okhra_core::renderer::{
    Arena, ClearState, DepthFunction, FramebufferId, PolygonMode, PrimitiveType, ProgramId,
    RenderState, TextureDesc, TextureFormat, TextureId, TextureKind, VertexArray, VertexArrayId,
};
use raster::{RasterFrame, TargetView, TriangleSetup};
use std::path::Path;
use std::sync::Arc;

/// The viewport rectangle and depth range, with the origin/scale vectors
/// of the window transform precomputed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Depth-range near value.
    pub min_depth: f32,
    /// Depth-range far value.
    pub max_depth: f32,
    /// `min(min_depth, max_depth)`, the depth clip/clamp floor.
    pub abs_min_depth: f32,
    /// `max(min_depth, max_depth)`, the depth clip/clamp ceiling.
    pub abs_max_depth: f32,
    /// Window-transform origin `(x + w/2, y + h/2, min_depth, 0)`.
    pub inner_o: Vec4,
    /// Window-transform scale `(w/2, h/2, max_depth - min_depth, 1)`.
    pub inner_p: Vec4,
}

impl Viewport {
    /// Creates a viewport with the standard `[0, 1]` depth range.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        let (x, y) = (x as f32, y as f32);
        let (width, height) = (width as f32, height as f32);
        let (min_depth, max_depth) = (0.0, 1.0);
        Self {
            x,
            y,
            width,
            height,
            min_depth,
            max_depth,
            abs_min_depth: min_depth.min(max_depth),
            abs_max_depth: min_depth.max(max_depth),
            inner_o: Vec4::new(x + width / 2.0, y + height / 2.0, min_depth, 0.0),
            inner_p: Vec4::new(width / 2.0, height / 2.0, max_depth - min_depth, 1.0),
        }
    }
}

/// Divides a vertex's clip position through by w, keeping `1 / clip_w`
/// in the w slot for perspective correction.
fn perspective_divide(vertex: &mut VertexHolder) {
    let pos = vertex.clip_pos;
    let inv_w = 1.0 / pos.w;
    vertex.frag_pos = Vec4::new(pos.x * inv_w, pos.y * inv_w, pos.z * inv_w, inv_w);
}

/// Maps NDC to window coordinates; `frag_pos.w` passes through.
fn viewport_transform(vertex: &mut VertexHolder, viewport: &Viewport) {
    vertex.frag_pos = vertex.frag_pos * viewport.inner_p + viewport.inner_o;
}

/// Groups the index stream into primitives, discarding any primitive
/// that references a vertex out of range.
fn assemble(
    primitive_type: PrimitiveType,
    indices: &[i32],
    vertex_count: usize,
) -> Vec<PrimitiveHolder> {
    let arity = match primitive_type {
        PrimitiveType::Point => 1,
        PrimitiveType::Line => 2,
        PrimitiveType::Triangle => 3,
    };
    indices
        .chunks_exact(arity)
        .filter_map(|chunk| {
            let mut prim_indices = [0usize; 3];
            for (slot, &index) in prim_indices.iter_mut().zip(chunk) {
                if index < 0 || index as usize >= vertex_count {
                    error!("primitive discarded: index {index} out of range");
                    return None;
                }
                *slot = index as usize;
            }
            Some(PrimitiveHolder::new(prim_indices))
        })
        .collect()
}

/// The software renderer.
pub struct Renderer {
    textures: Arena<TextureId, Texture>,
    framebuffers: Arena<FramebufferId, Framebuffer>,
    programs: Arena<ProgramId, ShaderProgram>,
    vertex_arrays: Arena<VertexArrayId, VertexArrayObject>,

    viewport: Viewport,
    state: RenderState,
    framebuffer: Option<FramebufferId>,
    vertex_array: Option<VertexArrayId>,
    program: Option<ProgramId>,

    reverse_z: bool,
    early_z: bool,

    pool: ThreadPool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a renderer with one raster worker per hardware thread.
    pub fn new() -> Self {
        Self::with_threads(None)
    }

    /// Creates a renderer with an explicit worker count.
    pub fn with_threads(threads: Option<usize>) -> Self {
        Self {
            textures: Arena::new(),
            framebuffers: Arena::new(),
            programs: Arena::new(),
            vertex_arrays: Arena::new(),
            viewport: Viewport::default(),
            state: RenderState::default(),
            framebuffer: None,
            vertex_array: None,
            program: None,
            reverse_z: false,
            early_z: false,
            pool: ThreadPool::new(threads),
        }
    }

    // --- Configuration toggles ---

    /// Switches the reversed-Z convention: flips the *default* depth
    /// function and clear depth reported by [`Renderer::default_render_state`]
    /// and [`Renderer::default_clear_state`]. The caller is expected to
    /// supply a reversed projection matrix.
    pub fn set_reverse_z(&mut self, enable: bool) {
        self.reverse_z = enable;
    }

    /// Whether reversed-Z is active.
    pub fn reverse_z(&self) -> bool {
        self.reverse_z
    }

    /// Moves the depth test in front of the fragment shader.
    pub fn set_early_z(&mut self, enable: bool) {
        self.early_z = enable;
    }

    /// A render state whose depth function matches the Z convention
    /// (`Less`, or `GreaterEqual` under reversed-Z).
    pub fn default_render_state(&self) -> RenderState {
        RenderState {
            depth_func: if self.reverse_z {
                DepthFunction::GreaterEqual
            } else {
                DepthFunction::Less
            },
            ..RenderState::default()
        }
    }

    /// A clear state whose depth matches the Z convention (1.0, or 0.0
    /// under reversed-Z).
    pub fn default_clear_state(&self) -> ClearState {
        ClearState {
            clear_depth: if self.reverse_z { 0.0 } else { 1.0 },
            ..ClearState::default()
        }
    }

    // --- Resource creation ---

    /// Creates an empty framebuffer.
    pub fn create_framebuffer(&mut self) -> FramebufferId {
        self.framebuffers.insert(Framebuffer::new())
    }

    /// Creates a texture; `None` (with a log) for unsupported
    /// descriptions such as multisample cubemaps.
    pub fn create_texture(&mut self, desc: TextureDesc) -> Option<TextureId> {
        match Texture::new(desc) {
            Ok(texture) => Some(self.textures.insert(texture)),
            Err(err) => {
                error!("create texture failed: {err}");
                None
            }
        }
    }

    /// Creates a vertex array object from the caller's buffers.
    pub fn create_vertex_array_object(&mut self, vertex_array: &VertexArray) -> VertexArrayId {
        self.vertex_arrays
            .insert(VertexArrayObject::new(vertex_array))
    }

    /// Creates an empty shader program; link it through
    /// [`Renderer::program_mut`].
    pub fn create_shader_program(&mut self) -> ProgramId {
        self.programs.insert(ShaderProgram::new())
    }

    /// Creates a uniform block object.
    pub fn create_uniform_block(&self, name: &str, size: usize) -> UniformBlock {
        UniformBlock::new(name, size)
    }

    /// Creates a sampler uniform object.
    pub fn create_uniform_sampler(
        &self,
        name: &str,
        kind: TextureKind,
        format: TextureFormat,
    ) -> UniformSampler {
        UniformSampler::new(name, kind, format)
    }

    // --- Resource access ---

    /// Looks up a texture.
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    /// Mutable access to a texture.
    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id)
    }

    /// Mutable access to a program (for linking and defines).
    pub fn program_mut(&mut self, id: ProgramId) -> Option<&mut ShaderProgram> {
        self.programs.get_mut(id)
    }

    /// Uploads RGBA8 image data to a texture; logs and no-ops on any
    /// mismatch.
    pub fn texture_set_image_rgba8(&mut self, id: TextureId, buffers: Vec<Buffer<Rgba8>>) {
        let Some(texture) = self.textures.get_mut(id) else {
            error!("upload skipped: invalid texture handle");
            return;
        };
        if let Err(err) = texture.set_image_rgba8(buffers) {
            error!("upload skipped: {err}");
        }
    }

    /// Uploads float32 image data to a texture; logs and no-ops on any
    /// mismatch.
    pub fn texture_set_image_f32(&mut self, id: TextureId, buffers: Vec<Buffer<f32>>) {
        let Some(texture) = self.textures.get_mut(id) else {
            error!("upload skipped: invalid texture handle");
            return;
        };
        if let Err(err) = texture.set_image_f32(buffers) {
            error!("upload skipped: {err}");
        }
    }

    /// Exports a texture layer/level as PNG.
    pub fn texture_dump_image(
        &self,
        id: TextureId,
        path: &Path,
        layer: u32,
        level: u32,
    ) -> Result<(), SoftError> {
        let texture = self
            .textures
            .get(id)
            .ok_or(okhra_core::renderer::ResourceError::InvalidHandle { kind: "texture" })?;
        texture.dump_image(path, layer, level)
    }

    /// Attaches a 2-D color texture to a framebuffer.
    pub fn framebuffer_set_color_attachment(
        &mut self,
        framebuffer: FramebufferId,
        texture: TextureId,
        level: u32,
    ) {
        if let Some(fb) = self.framebuffers.get_mut(framebuffer) {
            fb.set_color_attachment(texture, level);
        }
    }

    /// Attaches one cube face as the color target (the general form).
    pub fn framebuffer_set_color_attachment_face(
        &mut self,
        framebuffer: FramebufferId,
        texture: TextureId,
        face: okhra_core::renderer::CubeFace,
        level: u32,
    ) {
        if let Some(fb) = self.framebuffers.get_mut(framebuffer) {
            fb.set_color_attachment_face(texture, face, level);
        }
    }

    /// Attaches a depth texture to a framebuffer.
    pub fn framebuffer_set_depth_attachment(
        &mut self,
        framebuffer: FramebufferId,
        texture: TextureId,
    ) {
        if let Some(fb) = self.framebuffers.get_mut(framebuffer) {
            fb.set_depth_attachment(texture);
        }
    }

    /// Replaces the vertex bytes of a vertex array object.
    pub fn vertex_array_update_data(&mut self, id: VertexArrayId, data: &[u8]) {
        if let Some(vao) = self.vertex_arrays.get_mut(id) {
            vao.update_vertex_data(data);
        }
    }

    // --- Pipeline state ---

    /// Binds the framebuffer drawn into by [`Renderer::clear`] and
    /// [`Renderer::draw`].
    pub fn set_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.framebuffer = Some(framebuffer);
    }

    /// Sets the viewport rectangle.
    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = Viewport::new(x, y, width, height);
    }

    /// Replaces the fixed-function render state.
    pub fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
    }

    /// Binds the vertex array object for subsequent draws.
    pub fn set_vertex_array_object(&mut self, vao: VertexArrayId) {
        self.vertex_array = Some(vao);
    }

    /// Binds the shader program for subsequent draws.
    pub fn set_shader_program(&mut self, program: ProgramId) {
        self.program = Some(program);
    }

    /// Applies a uniform binding set to the bound program: block bytes
    /// are copied into the program's uniform memory, sampler uniforms are
    /// resolved through the texture arena into bound samplers.
    pub fn set_shader_uniforms(&mut self, bindings: &ShaderBindings) {
        let Some(program_id) = self.program else {
            error!("uniforms skipped: no program bound");
            return;
        };
        let Some(program) = self.programs.get_mut(program_id) else {
            error!("uniforms skipped: invalid program handle");
            return;
        };
        if !program.is_linked() {
            error!("uniforms skipped: program not linked");
            return;
        }

        for block in bindings.blocks() {
            let location = program.cached_location(block.id(), block.name());
            if location >= 0 {
                program.bind_block_data(location, block.data());
            }
        }
        for sampler in bindings.samplers() {
            let location = program.cached_location(sampler.id(), sampler.name());
            if location >= 0 {
                let bound = resolve_sampler(&mut self.textures, sampler);
                program.bind_sampler(location, bound);
            }
        }
    }

    /// Clears the bound framebuffer's attachments, every sample included.
    pub fn clear(&mut self, clear_state: &ClearState) {
        let Some(fb) = self
            .framebuffer
            .and_then(|id| self.framebuffers.get(id))
            .copied()
        else {
            return;
        };

        if clear_state.color_flag {
            if let Some(level) = fb.color().and_then(|att| {
                self.textures
                    .get(att.texture)
                    .and_then(|t| t.image_rgba8(att.layer))
                    .and_then(|img| img.levels.get(att.level as usize))
            }) {
                let color = Rgba8::from_unit(clear_state.clear_color);
                // No raster tasks are in flight outside `draw`.
                unsafe {
                    if let Some(buffer) = &level.buffer {
                        buffer.fill_shared(color);
                    }
                    if let Some(buffer) = &level.buffer_ms4 {
                        buffer.fill_shared([color; 4]);
                    }
                }
            }
        }

        if clear_state.depth_flag {
            if let Some(level) = fb.depth().and_then(|att| {
                self.textures
                    .get(att.texture)
                    .and_then(|t| t.image_f32(att.layer))
                    .and_then(|img| img.levels.get(att.level as usize))
            }) {
                unsafe {
                    if let Some(buffer) = &level.buffer {
                        buffer.fill_shared(clear_state.clear_depth);
                    }
                    if let Some(buffer) = &level.buffer_ms4 {
                        buffer.fill_shared([clear_state.clear_depth; 4]);
                    }
                }
            }
        }
    }

    /// Draws the bound vertex array with the bound program into the
    /// bound framebuffer. Missing or invalid bindings log and no-op.
    pub fn draw(&mut self, primitive_type: PrimitiveType) {
        let (Some(fb_id), Some(vao_id), Some(program_id)) =
            (self.framebuffer, self.vertex_array, self.program)
        else {
            error!("draw skipped: framebuffer, vertex array, or program unbound");
            return;
        };
        let Some(fb) = self.framebuffers.get(fb_id).copied() else {
            error!("draw skipped: invalid framebuffer handle");
            return;
        };
        if !fb.is_valid(&self.textures) {
            error!("draw skipped: framebuffer incomplete");
            return;
        }

        // Resolve the render targets up front; the per-block tasks write
        // through these shared views.
        let color_target = fb.color().and_then(|att| {
            self.textures
                .get(att.texture)
                .and_then(|t| t.image_rgba8(att.layer))
                .and_then(|img| img.levels.get(att.level as usize))
                .map(TargetView::from_image)
        });
        let depth_target = fb.depth().and_then(|att| {
            self.textures
                .get(att.texture)
                .and_then(|t| t.image_f32(att.layer))
                .and_then(|img| img.levels.get(att.level as usize))
                .map(TargetView::from_image)
        });
        let raster_samples = color_target
            .as_ref()
            .map(|t| t.samples)
            .or_else(|| depth_target.as_ref().map(|t| t.samples))
            .unwrap_or(1) as usize;

        let Some(vao) = self.vertex_arrays.get(vao_id) else {
            error!("draw skipped: invalid vertex array handle");
            return;
        };
        let Some(program) = self.programs.get_mut(program_id) else {
            error!("draw skipped: invalid program handle");
            return;
        };
        if !program.is_linked() {
            error!("draw skipped: program not linked");
            return;
        }

        let state = self.state;
        let viewport = self.viewport;

        // Stage 1: vertex processing.
        let varying_floats = program.varying_floats();
        let mut varyings = VaryingArena::new(varying_floats, vao.vertex_count);
        let mut vertices = Vec::with_capacity(vao.vertex_count);
        program.set_point_size(state.point_size);
        for index in 0..vao.vertex_count {
            program.run_vertex(vao.vertex(index), varyings.slot_mut(index));
            let clip_pos = program.builtin().position;
            vertices.push(VertexHolder {
                index,
                bytes: VertexBytes::Vao(index),
                varying_slot: index,
                clip_pos,
                frag_pos: Vec4::ZERO,
                clip_mask: clip::frustum_clip_mask(clip_pos),
                discard: false,
            });
        }
        let point_size = program.builtin().point_size;

        // Stage 2: primitive assembly.
        let mut primitives = assemble(primitive_type, &vao.indices, vertices.len());

        // Stage 3: clipping. Triangles drawn in line/point polygon mode
        // skip it; their edges are clipped after face culling instead.
        {
            let mut stage = ClipStage {
                vertices: &mut vertices,
                primitives: &mut primitives,
                varyings: &mut varyings,
                program,
                vao,
                viewport,
            };
            stage.run(primitive_type, state.polygon_mode);
        }

        // Stages 4 + 5: perspective divide and viewport transform.
        for vertex in vertices.iter_mut().filter(|v| !v.discard) {
            perspective_divide(vertex);
            viewport_transform(vertex, &viewport);
        }

        // Stage 6: face culling.
        if primitive_type == PrimitiveType::Triangle {
            for triangle in primitives.iter_mut().filter(|p| !p.discard) {
                let v0 = vertices[triangle.indices[0]].frag_pos;
                let v1 = vertices[triangle.indices[1]].frag_pos;
                let v2 = vertices[triangle.indices[2]].frag_pos;
                let normal = (v1 - v0).xyz().cross((v2 - v0).xyz());
                let area = normal.dot(Vec3::Z);
                triangle.front_facing = area > 0.0;
                if state.cull_face {
                    triangle.discard = !triangle.front_facing;
                }
            }
        }

        // Polygon-mode conversion: wireframe and point modes turn live
        // triangles into edge lines / corner points, clipped here with
        // the post-transform rules.
        let raster_type = match (primitive_type, state.polygon_mode) {
            (PrimitiveType::Triangle, PolygonMode::Line) => {
                let mut stage = ClipStage {
                    vertices: &mut vertices,
                    primitives: &mut primitives,
                    varyings: &mut varyings,
                    program,
                    vao,
                    viewport,
                };
                stage.triangles_to_edge_lines();
                PrimitiveType::Line
            }
            (PrimitiveType::Triangle, PolygonMode::Point) => {
                let mut stage = ClipStage {
                    vertices: &mut vertices,
                    primitives: &mut primitives,
                    varyings: &mut varyings,
                    program,
                    vao,
                    viewport,
                };
                stage.triangles_to_corner_points();
                PrimitiveType::Point
            }
            _ => primitive_type,
        };

        // Stage 7: rasterization and per-sample output.
        let frame = Arc::new(RasterFrame {
            state,
            viewport,
            raster_samples,
            early_z: self.early_z,
            varyings,
            color: color_target,
            depth: depth_target,
        });

        match raster_type {
            PrimitiveType::Point => {
                for prim in primitives.iter().filter(|p| !p.discard) {
                    let vertex = &vertices[prim.indices[0]];
                    raster::draw_point(
                        &frame,
                        program,
                        vertex.frag_pos,
                        frame.varyings.slot(vertex.varying_slot),
                        point_size,
                    );
                }
            }
            PrimitiveType::Line => {
                for prim in primitives.iter().filter(|p| !p.discard) {
                    raster::draw_line(
                        &frame,
                        program,
                        &vertices[prim.indices[0]],
                        &vertices[prim.indices[1]],
                        state.line_width,
                    );
                }
            }
            PrimitiveType::Triangle => {
                let contexts = PerThread::new(
                    (0..self.pool.thread_count())
                        .map(|_| {
                            PixelQuadContext::new(varying_floats, program.clone_for_thread())
                        })
                        .collect(),
                );
                let contexts = Arc::new(contexts);
                for prim in primitives.iter().filter(|p| !p.discard) {
                    let setup = TriangleSetup::from_vertices(
                        &vertices[prim.indices[0]],
                        &vertices[prim.indices[1]],
                        &vertices[prim.indices[2]],
                        prim.front_facing,
                    );
                    raster::raster_triangle(&self.pool, &frame, &contexts, setup);
                }
                self.pool.wait_tasks_finish();
            }
        }

        // MSAA resolve: average the 4x color samples into the
        // single-sample plane.
        let multisampled_color = frame
            .color
            .as_ref()
            .is_some_and(|view| view.samples > 1);
        drop(frame);
        if multisampled_color {
            if let Some(att) = fb.color() {
                let resolved = self
                    .textures
                    .get_mut(att.texture)
                    .and_then(|t| t.image_rgba8_mut(att.layer))
                    .and_then(|img| img.levels.get_mut(att.level as usize))
                    .map(|level| (level.buffer_ms4.clone(), level.ensure_resolve_plane()));
                if let Some((Some(source), target)) = resolved {
                    raster::resolve_msaa(&self.pool, &source, &target);
                }
            }
        }
    }
}

/// Resolves a sampler uniform against the texture arena into an
/// immutable bound sampler, generating the mip chain at bind time when
/// the filter needs one that does not exist yet.
fn resolve_sampler(
    textures: &mut Arena<TextureId, Texture>,
    uniform: &UniformSampler,
) -> BoundSampler {
    let Some(texture_id) = uniform.texture() else {
        return BoundSampler::Empty;
    };
    let Some(texture) = textures.get_mut(texture_id) else {
        error!("sampler '{}': invalid texture handle", uniform.name());
        return BoundSampler::Empty;
    };
    if texture.desc.multi_sample {
        error!(
            "sampler '{}': multisample textures cannot be sampled",
            uniform.name()
        );
        return BoundSampler::Empty;
    }
    if texture.desc.kind != uniform.kind() || texture.desc.format != uniform.format() {
        error!(
            "sampler '{}': texture kind/format does not match the declaration",
            uniform.name()
        );
        return BoundSampler::Empty;
    }

    let sampler_desc = texture.sampler_desc;
    let needs_mipmaps = sampler_desc.filter_min.uses_mipmaps();
    let has_chain = match texture.desc.format {
        TextureFormat::Rgba8 => texture.image_rgba8(0).is_some_and(|i| i.levels.len() > 1),
        TextureFormat::Float32 => texture.image_f32(0).is_some_and(|i| i.levels.len() > 1),
    };
    if needs_mipmaps && !has_chain {
        texture.generate_mipmaps();
    }

    match (texture.desc.kind, texture.desc.format) {
        (TextureKind::TwoD, TextureFormat::Rgba8) => {
            let Some(image) = texture.image_rgba8(0) else {
                return BoundSampler::Empty;
            };
            BoundSampler::Tex2dRgba(Sampler2d::new(
                image.level_planes(),
                sampler_desc.filter_min,
                sampler_desc.wrap_s,
                Texel::from_border(sampler_desc.border_color),
            ))
        }
        (TextureKind::TwoD, TextureFormat::Float32) => {
            let Some(image) = texture.image_f32(0) else {
                return BoundSampler::Empty;
            };
            BoundSampler::Tex2dF32(Sampler2d::new(
                image.level_planes(),
                sampler_desc.filter_min,
                sampler_desc.wrap_s,
                Texel::from_border(sampler_desc.border_color),
            ))
        }
        (TextureKind::Cube, TextureFormat::Rgba8) => {
            let faces = std::array::from_fn(|face| {
                texture
                    .image_rgba8(face as u32)
                    .map(|i| i.level_planes())
                    .unwrap_or_default()
            });
            BoundSampler::CubeRgba(SamplerCube::new(
                faces,
                sampler_desc.filter_min,
                Texel::from_border(sampler_desc.border_color),
            ))
        }
        (TextureKind::Cube, TextureFormat::Float32) => {
            let faces = std::array::from_fn(|face| {
                texture
                    .image_f32(face as u32)
                    .map(|i| i.level_planes())
                    .unwrap_or_default()
            });
            BoundSampler::CubeF32(SamplerCube::new(
                faces,
                sampler_desc.filter_min,
                Texel::from_border(sampler_desc.border_color),
            ))
        }
    }
}
