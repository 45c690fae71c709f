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

//! The programmable shader execution model.
//!
//! A shader is user code behind the [`SoftShader`] trait. It declares a
//! static [`ShaderDescriptor`] (define names, uniform-block layout,
//! sampler slots, varying size) and reads its inputs through the stage
//! structs. Attribute and uniform bytes follow the declared layout, so
//! shaders view them as their own `bytemuck::Pod` structs; varyings are
//! an aligned `f32` array sized by the descriptor.
//!
//! Texture access goes through the [`FragmentStage`]: per-sampler LOD is
//! computed from the pixel quad's varying derivatives at the UV offset
//! the sampler slot declares.

use crate::sampler::{Sampler2d, SamplerCube, Texel};
use log::error;
use okhra_core::math::{Rgba8, Vec2, Vec3, Vec4};
use okhra_core::renderer::{TextureFormat, TextureKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Describes one uniform block within the shader's uniform memory.
#[derive(Debug, Clone, Copy)]
pub struct UniformBlockDesc {
    /// The binding name.
    pub name: &'static str,
    /// Byte offset of the block inside the uniform memory.
    pub offset: usize,
    /// Byte size of the block.
    pub size: usize,
}

/// Describes one sampler slot of the shader.
#[derive(Debug, Clone, Copy)]
pub struct SamplerSlotDesc {
    /// The binding name.
    pub name: &'static str,
    /// The texture kind this slot samples.
    pub kind: TextureKind,
    /// The texel format this slot samples.
    pub format: TextureFormat,
    /// Float offset (into the varyings) of the UV pair whose screen-space
    /// derivatives drive this sampler's LOD, if mipmapping applies.
    pub lod_varying: Option<usize>,
}

/// The static interface table of a shader pair.
#[derive(Debug, Clone, Copy)]
pub struct ShaderDescriptor {
    /// Define names, in flag order.
    pub defines: &'static [&'static str],
    /// Total byte size of the uniform memory.
    pub uniforms_size: usize,
    /// Uniform blocks at fixed offsets.
    pub blocks: &'static [UniformBlockDesc],
    /// Sampler slots.
    pub samplers: &'static [SamplerSlotDesc],
    /// Number of `f32` varyings carried from vertex to fragment stage.
    pub varying_floats: usize,
}

/// Views a varying slice as the shader's own varyings struct.
#[inline]
pub fn varyings_as<V: bytemuck::Pod>(varyings: &[f32]) -> &V {
    let bytes = bytemuck::cast_slice::<f32, u8>(varyings);
    bytemuck::from_bytes(&bytes[..std::mem::size_of::<V>()])
}

/// Views a mutable varying slice as the shader's own varyings struct.
#[inline]
pub fn varyings_as_mut<V: bytemuck::Pod>(varyings: &mut [f32]) -> &mut V {
    let bytes = bytemuck::cast_slice_mut::<f32, u8>(varyings);
    bytemuck::from_bytes_mut(&mut bytes[..std::mem::size_of::<V>()])
}

/// Copies the vertex bytes into the shader's attributes struct.
///
/// Vertex buffers carry no alignment guarantee, so this is a read, not a
/// cast.
#[inline]
pub fn attributes_as<A: bytemuck::Pod>(vertex: &[u8]) -> A {
    bytemuck::pod_read_unaligned(&vertex[..std::mem::size_of::<A>()])
}

/// Views the uniform bytes as the shader's uniforms struct.
#[inline]
pub fn uniforms_as<U: bytemuck::Pod>(uniforms: &[u8]) -> U {
    bytemuck::pod_read_unaligned(&uniforms[..std::mem::size_of::<U>()])
}

/// Inputs of one vertex shader invocation.
pub struct VertexStage<'a> {
    /// Raw bytes of the current vertex, laid out per the vertex array's
    /// attribute descriptions.
    pub vertex: &'a [u8],
    /// Define flags (one byte per declared define, 0 or 1).
    pub defines: &'a [u8],
    /// The uniform memory.
    pub uniforms: &'a [u8],
}

impl VertexStage<'_> {
    /// Whether define flag `index` is set.
    #[inline]
    pub fn define(&self, index: usize) -> bool {
        self.defines.get(index).copied().unwrap_or(0) != 0
    }
}

/// Outputs of one vertex shader invocation.
pub struct VertexOutput<'a> {
    /// Clip-space position (`gl_Position`).
    pub position: Vec4,
    /// Point size in pixels (`gl_PointSize`).
    pub point_size: f32,
    /// The vertex's varying slot.
    pub varyings: &'a mut [f32],
}

/// A sampler slot's bound state.
#[derive(Clone, Default)]
pub enum BoundSampler {
    /// Nothing bound; sampling returns zero.
    #[default]
    Empty,
    /// A 2-D RGBA8 texture.
    Tex2dRgba(Sampler2d<Rgba8>),
    /// A 2-D float (depth) texture.
    Tex2dF32(Sampler2d<f32>),
    /// An RGBA8 cubemap.
    CubeRgba(SamplerCube<Rgba8>),
    /// A float cubemap.
    CubeF32(SamplerCube<f32>),
}

/// Inputs of one fragment shader invocation.
pub struct FragmentStage<'a> {
    /// Window-space position: x, y at the shading sample, interpolated z,
    /// and `1 / clip_w` in w (`gl_FragCoord`).
    pub frag_coord: Vec4,
    /// Whether the primitive faces the viewer (`gl_FrontFacing`).
    pub front_facing: bool,
    /// Define flags.
    pub defines: &'a [u8],
    /// The uniform memory.
    pub uniforms: &'a [u8],
    /// This pixel's interpolated varyings.
    pub varyings: &'a [f32],
    pub(crate) samplers: &'a [BoundSampler],
    pub(crate) slots: &'a [SamplerSlotDesc],
    /// The four pixel-quad varying arrays (top-left, top-right,
    /// bottom-left, bottom-right) backing derivative estimation.
    pub(crate) quad: [&'a [f32]; 4],
}

impl FragmentStage<'_> {
    /// Whether define flag `index` is set.
    #[inline]
    pub fn define(&self, index: usize) -> bool {
        self.defines.get(index).copied().unwrap_or(0) != 0
    }

    /// Samples a 2-D RGBA8 slot with derivative-driven LOD; unit range.
    #[inline]
    pub fn texture_2d(&self, slot: usize, uv: Vec2) -> Vec4 {
        self.texture_2d_bias(slot, uv, 0.0)
    }

    /// Samples a 2-D RGBA8 slot with an LOD bias added to the
    /// derivative-driven level.
    pub fn texture_2d_bias(&self, slot: usize, uv: Vec2, bias: f32) -> Vec4 {
        match self.samplers.get(slot) {
            Some(BoundSampler::Tex2dRgba(sampler)) => {
                let lod = if sampler.uses_mipmaps() {
                    bias + self.sampler_lod(slot, sampler.width(), sampler.height())
                } else {
                    bias
                };
                sampler.sample(uv, lod).to_unit()
            }
            _ => Vec4::ZERO,
        }
    }

    /// Samples a 2-D RGBA8 slot at an explicit LOD.
    pub fn texture_2d_lod(&self, slot: usize, uv: Vec2, lod: f32) -> Vec4 {
        match self.samplers.get(slot) {
            Some(BoundSampler::Tex2dRgba(sampler)) => sampler.sample(uv, lod).to_unit(),
            _ => Vec4::ZERO,
        }
    }

    /// Samples a 2-D RGBA8 slot at an explicit LOD with an integer texel
    /// offset (the PCF building block).
    pub fn texture_2d_lod_offset(&self, slot: usize, uv: Vec2, lod: f32, offset: [i32; 2]) -> Vec4 {
        match self.samplers.get(slot) {
            Some(BoundSampler::Tex2dRgba(sampler)) => {
                sampler.sample_offset(uv, lod, offset).to_unit()
            }
            _ => Vec4::ZERO,
        }
    }

    /// Samples a 2-D float (depth) slot.
    pub fn texture_depth(&self, slot: usize, uv: Vec2) -> f32 {
        match self.samplers.get(slot) {
            Some(BoundSampler::Tex2dF32(sampler)) => sampler.sample(uv, 0.0),
            _ => 0.0,
        }
    }

    /// Samples a cubemap slot in direction `dir`; unit range for RGBA8,
    /// splatted for float cubemaps.
    #[inline]
    pub fn texture_cube(&self, slot: usize, dir: Vec3) -> Vec4 {
        self.texture_cube_lod(slot, dir, 0.0)
    }

    /// Samples a cubemap slot at an explicit LOD.
    pub fn texture_cube_lod(&self, slot: usize, dir: Vec3, lod: f32) -> Vec4 {
        match self.samplers.get(slot) {
            Some(BoundSampler::CubeRgba(sampler)) => sampler.sample(dir, lod).to_unit(),
            Some(BoundSampler::CubeF32(sampler)) => Vec4::splat(sampler.sample(dir, lod)),
            _ => Vec4::ZERO,
        }
    }

    /// Dimensions of a slot's mip level.
    pub fn texture_size(&self, slot: usize, level: usize) -> (u32, u32) {
        match self.samplers.get(slot) {
            Some(BoundSampler::Tex2dRgba(sampler)) => sampler.level_size(level),
            Some(BoundSampler::Tex2dF32(sampler)) => sampler.level_size(level),
            Some(BoundSampler::CubeRgba(sampler)) => sampler.level_size(level),
            Some(BoundSampler::CubeF32(sampler)) => sampler.level_size(level),
            _ => (0, 0),
        }
    }

    /// The mip LOD for a slot, from the pixel quad's UV derivatives.
    ///
    /// With quad UVs `p0..p3` and texel dimensions `(w, h)`:
    /// `dx = (p1 - p0) * (w, h)`, `dy = (p2 - p0) * (w, h)`,
    /// `lod = max(0.5 * log2(max(dx·dx, dy·dy)), 0)`, constant per quad.
    fn sampler_lod(&self, slot: usize, width: u32, height: u32) -> f32 {
        let Some(desc) = self.slots.get(slot) else {
            return 0.0;
        };
        let Some(offset) = desc.lod_varying else {
            return 0.0;
        };
        if self.quad[0].len() < offset + 2 {
            return 0.0;
        }
        let uv = |i: usize| {
            let v = self.quad[i];
            Vec2::new(v[offset], v[offset + 1])
        };
        let size = Vec2::new(width as f32, height as f32);
        let dx = (uv(1) - uv(0)) * size;
        let dy = (uv(2) - uv(0)) * size;
        let d = dx.dot(dx).max(dy.dot(dy));
        (0.5 * d.log2()).max(0.0)
    }
}

/// Outputs of one fragment shader invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FragmentOutput {
    /// The shaded color (`gl_FragColor`).
    pub frag_color: Vec4,
    /// When set, the fragment writes nothing.
    pub discard: bool,
}

/// A programmable shader stage.
///
/// The vertex and fragment members of a program are usually two types of
/// the same shader family sharing one descriptor; each overrides the
/// stage it implements.
pub trait SoftShader: Send + Sync {
    /// The static interface table. The vertex and fragment shaders of a
    /// program must report identical layouts.
    fn descriptor(&self) -> &'static ShaderDescriptor;

    /// The vertex stage entry point.
    fn vertex(&self, _stage: &VertexStage, _out: &mut VertexOutput) {}

    /// The fragment stage entry point.
    fn fragment(&self, _stage: &FragmentStage, _out: &mut FragmentOutput) {}

    /// Produces an independent instance for another worker thread. The
    /// clone shares uniform memory but owns its builtin state.
    fn clone_boxed(&self) -> Box<dyn SoftShader>;
}

impl Clone for Box<dyn SoftShader> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// The shader builtin block: one set per program instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShaderBuiltin {
    /// Vertex output: clip-space position.
    pub position: Vec4,
    /// Vertex output: point size in pixels.
    pub point_size: f32,
    /// Fragment input: window-space coordinate.
    pub frag_coord: Vec4,
    /// Fragment input: facing flag.
    pub front_facing: bool,
    /// Fragment output: color.
    pub frag_color: Vec4,
    /// Fragment output: discard flag.
    pub discard: bool,
}

/// A linked pair of shader stages plus their shared binding state.
pub struct ShaderProgram {
    vertex_shader: Option<Box<dyn SoftShader>>,
    fragment_shader: Option<Box<dyn SoftShader>>,
    requested_defines: Vec<String>,
    defines: Arc<Vec<u8>>,
    uniforms: Arc<Vec<u8>>,
    samplers: Arc<Vec<BoundSampler>>,
    // Uniform-object id -> resolved location.
    locations: HashMap<u32, i32>,
    builtin: ShaderBuiltin,
    linked: bool,
}

impl Default for ShaderProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgram {
    /// Creates an empty, unlinked program.
    pub fn new() -> Self {
        Self {
            vertex_shader: None,
            fragment_shader: None,
            requested_defines: Vec::new(),
            defines: Arc::new(Vec::new()),
            uniforms: Arc::new(Vec::new()),
            samplers: Arc::new(Vec::new()),
            locations: HashMap::new(),
            builtin: ShaderBuiltin::default(),
            linked: false,
        }
    }

    /// Requests a define flag by name; takes effect at link time.
    pub fn add_define(&mut self, name: &str) {
        self.requested_defines.push(name.to_owned());
    }

    /// Links a vertex/fragment pair, building the define and uniform
    /// memory from their shared descriptor.
    ///
    /// Returns `false` (leaving the program unlinked, so draws using it
    /// no-op) when the two stages disagree on their interface.
    pub fn set_shaders(
        &mut self,
        vertex_shader: Box<dyn SoftShader>,
        fragment_shader: Box<dyn SoftShader>,
    ) -> bool {
        let vs_desc = vertex_shader.descriptor();
        let fs_desc = fragment_shader.descriptor();
        if vs_desc.uniforms_size != fs_desc.uniforms_size
            || vs_desc.varying_floats != fs_desc.varying_floats
            || vs_desc.defines.len() != fs_desc.defines.len()
        {
            error!("shader link failed: vertex and fragment interfaces disagree");
            self.linked = false;
            return false;
        }

        let mut define_flags = vec![0u8; vs_desc.defines.len()];
        for name in &self.requested_defines {
            for (i, declared) in vs_desc.defines.iter().enumerate() {
                if *declared == *name {
                    define_flags[i] = 1;
                }
            }
        }

        self.defines = Arc::new(define_flags);
        self.uniforms = Arc::new(vec![0u8; vs_desc.uniforms_size]);
        self.samplers = Arc::new(vec![BoundSampler::Empty; vs_desc.samplers.len()]);
        self.locations.clear();
        self.vertex_shader = Some(vertex_shader);
        self.fragment_shader = Some(fragment_shader);
        self.linked = true;
        true
    }

    /// Whether the program holds a usable shader pair.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// The linked descriptor.
    pub fn descriptor(&self) -> Option<&'static ShaderDescriptor> {
        self.vertex_shader.as_ref().map(|s| s.descriptor())
    }

    /// The varying float count, 0 when unlinked.
    pub fn varying_floats(&self) -> usize {
        self.descriptor().map_or(0, |d| d.varying_floats)
    }

    /// Resolves a uniform name to a location: blocks first, then sampler
    /// slots. Returns -1 for an unknown name.
    pub fn uniform_location(&self, name: &str) -> i32 {
        let Some(desc) = self.descriptor() else {
            return -1;
        };
        for (i, block) in desc.blocks.iter().enumerate() {
            if block.name == name {
                return i as i32;
            }
        }
        for (i, slot) in desc.samplers.iter().enumerate() {
            if slot.name == name {
                return (desc.blocks.len() + i) as i32;
            }
        }
        -1
    }

    /// Looks up (and caches) the location for a uniform object.
    pub fn cached_location(&mut self, uniform_id: u32, name: &str) -> i32 {
        if let Some(&location) = self.locations.get(&uniform_id) {
            return location;
        }
        let location = self.uniform_location(name);
        self.locations.insert(uniform_id, location);
        location
    }

    /// Copies block data into the uniform memory at the block's offset.
    pub fn bind_block_data(&mut self, location: i32, data: &[u8]) {
        let Some(desc) = self.descriptor() else {
            return;
        };
        let Some(block) = desc.blocks.get(location as usize) else {
            return;
        };
        let offset = block.offset;
        let uniforms = Arc::make_mut(&mut self.uniforms);
        let end = (offset + data.len()).min(uniforms.len());
        if end > offset {
            uniforms[offset..end].copy_from_slice(&data[..end - offset]);
        }
    }

    /// Binds a resolved sampler to a location (block locations come
    /// first; see [`ShaderProgram::uniform_location`]).
    pub fn bind_sampler(&mut self, location: i32, sampler: BoundSampler) {
        let Some(desc) = self.descriptor() else {
            return;
        };
        if location < 0 || (location as usize) < desc.blocks.len() {
            return;
        }
        let slot = location as usize - desc.blocks.len();
        let samplers = Arc::make_mut(&mut self.samplers);
        if let Some(entry) = samplers.get_mut(slot) {
            *entry = sampler;
        }
    }

    /// The builtin block of this instance.
    #[inline]
    pub fn builtin(&self) -> &ShaderBuiltin {
        &self.builtin
    }

    /// Seeds the builtin point size (the render state's default) before
    /// vertex processing; the vertex shader may override it.
    #[inline]
    pub fn set_point_size(&mut self, point_size: f32) {
        self.builtin.point_size = point_size;
    }

    /// Runs the vertex shader for one vertex, writing its varying slot
    /// and updating the builtin position and point size.
    pub fn run_vertex(&mut self, vertex: &[u8], varyings: &mut [f32]) {
        let Some(shader) = self.vertex_shader.as_ref() else {
            return;
        };
        let stage = VertexStage {
            vertex,
            defines: &self.defines,
            uniforms: &self.uniforms,
        };
        let mut out = VertexOutput {
            position: Vec4::ZERO,
            point_size: self.builtin.point_size,
            varyings,
        };
        shader.vertex(&stage, &mut out);
        self.builtin.position = out.position;
        self.builtin.point_size = out.point_size;
    }

    /// Runs the fragment shader for one pixel.
    ///
    /// `quad` carries the four pixel-quad varying arrays for derivative
    /// estimation; pass the pixel's own varyings four times where no quad
    /// exists (point/line paths), which yields zero derivatives.
    pub fn run_fragment(
        &mut self,
        frag_coord: Vec4,
        front_facing: bool,
        varyings: &[f32],
        quad: [&[f32]; 4],
    ) -> FragmentOutput {
        let mut out = FragmentOutput::default();
        let Some(shader) = self.fragment_shader.as_ref() else {
            return out;
        };
        let Some(desc) = self.descriptor() else {
            return out;
        };
        let stage = FragmentStage {
            frag_coord,
            front_facing,
            defines: &self.defines,
            uniforms: &self.uniforms,
            varyings,
            samplers: &self.samplers,
            slots: desc.samplers,
            quad,
        };
        shader.fragment(&stage, &mut out);
        self.builtin.frag_coord = frag_coord;
        self.builtin.front_facing = front_facing;
        self.builtin.frag_color = out.frag_color;
        self.builtin.discard = out.discard;
        out
    }

    /// Clones the program for another worker thread: shader instances are
    /// duplicated, binding state is shared, the builtin block is owned.
    pub fn clone_for_thread(&self) -> Self {
        Self {
            vertex_shader: self.vertex_shader.clone(),
            fragment_shader: self.fragment_shader.clone(),
            requested_defines: self.requested_defines.clone(),
            defines: Arc::clone(&self.defines),
            uniforms: Arc::clone(&self.uniforms),
            samplers: Arc::clone(&self.samplers),
            locations: self.locations.clone(),
            builtin: self.builtin,
            linked: self.linked,
        }
    }
}
