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

//! End-to-end pipeline scenarios: clear, coverage, depth, blending,
//! texturing, MSAA, and the point/line/wireframe paths.

use okhra_core::math::{Rgba8, Vec2, Vec4};
use okhra_core::renderer::{
    BlendFactor, BlendFunction, DepthFunction, FilterMode, PolygonMode, PrimitiveType, SamplerDesc,
    TextureDesc, TextureFormat, TextureId, TextureKind, TextureUsage, VertexArray, VertexArrayId,
    VertexAttributeDesc, WrapMode,
};
use okhra_soft::buffer::Buffer;
use okhra_soft::shader::{
    attributes_as, uniforms_as, FragmentOutput, FragmentStage, SamplerSlotDesc, ShaderDescriptor,
    SoftShader, UniformBlockDesc, VertexOutput, VertexStage,
};
use okhra_soft::{Renderer, ShaderBindings, UniformBlock, UniformSampler};

// --- Test shaders ---

/// Flat-color family: clip-space position attribute, one color block.
#[derive(Clone)]
struct FlatVs;
#[derive(Clone)]
struct FlatFs;
/// A fragment stage that discards everything.
#[derive(Clone)]
struct DiscardFs;

static FLAT_DESC: ShaderDescriptor = ShaderDescriptor {
    defines: &[],
    uniforms_size: 16,
    blocks: &[UniformBlockDesc {
        name: "Color",
        offset: 0,
        size: 16,
    }],
    samplers: &[],
    varying_floats: 0,
};

impl SoftShader for FlatVs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &FLAT_DESC
    }

    fn vertex(&self, stage: &VertexStage, out: &mut VertexOutput) {
        let position: [f32; 4] = attributes_as(stage.vertex);
        out.position = Vec4::new(position[0], position[1], position[2], position[3]);
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

impl SoftShader for FlatFs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &FLAT_DESC
    }

    fn fragment(&self, stage: &FragmentStage, out: &mut FragmentOutput) {
        out.frag_color = uniforms_as(stage.uniforms);
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

impl SoftShader for DiscardFs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &FLAT_DESC
    }

    fn fragment(&self, _stage: &FragmentStage, out: &mut FragmentOutput) {
        out.discard = true;
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

/// Textured family: position + uv attributes, one sampler slot.
#[derive(Clone)]
struct TexturedVs;
#[derive(Clone)]
struct TexturedFs;

static TEXTURED_DESC: ShaderDescriptor = ShaderDescriptor {
    defines: &[],
    uniforms_size: 0,
    blocks: &[],
    samplers: &[SamplerSlotDesc {
        name: "u_tex",
        kind: TextureKind::TwoD,
        format: TextureFormat::Rgba8,
        lod_varying: Some(0),
    }],
    varying_floats: 2,
};

impl SoftShader for TexturedVs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &TEXTURED_DESC
    }

    fn vertex(&self, stage: &VertexStage, out: &mut VertexOutput) {
        let attributes: [f32; 6] = attributes_as(stage.vertex);
        out.position = Vec4::new(attributes[0], attributes[1], attributes[2], attributes[3]);
        out.varyings.copy_from_slice(&[attributes[4], attributes[5]]);
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

impl SoftShader for TexturedFs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &TEXTURED_DESC
    }

    fn fragment(&self, stage: &FragmentStage, out: &mut FragmentOutput) {
        let uv = Vec2::new(stage.varyings[0], stage.varyings[1]);
        out.frag_color = stage.texture_2d(0, uv);
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

/// Probe family: one scalar varying written straight to the red channel,
/// for observing interpolation behavior.
#[derive(Clone)]
struct ProbeVs;
#[derive(Clone)]
struct ProbeFs;

static PROBE_DESC: ShaderDescriptor = ShaderDescriptor {
    defines: &[],
    uniforms_size: 0,
    blocks: &[],
    samplers: &[],
    varying_floats: 1,
};

impl SoftShader for ProbeVs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &PROBE_DESC
    }

    fn vertex(&self, stage: &VertexStage, out: &mut VertexOutput) {
        let attributes: [f32; 5] = attributes_as(stage.vertex);
        out.position = Vec4::new(attributes[0], attributes[1], attributes[2], attributes[3]);
        out.varyings[0] = attributes[4];
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

impl SoftShader for ProbeFs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &PROBE_DESC
    }

    fn fragment(&self, stage: &FragmentStage, out: &mut FragmentOutput) {
        let value = stage.varyings[0];
        out.frag_color = Vec4::new(value, value, value, 1.0);
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

// --- Harness helpers ---

struct Target {
    renderer: Renderer,
    color: TextureId,
}

fn make_target(width: u32, height: u32, with_depth: bool, multi_sample: bool) -> Target {
    let mut renderer = Renderer::with_threads(Some(2));

    let color = renderer
        .create_texture(TextureDesc {
            width,
            height,
            kind: TextureKind::TwoD,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::ATTACHMENT_COLOR | TextureUsage::RENDERER_OUTPUT,
            use_mipmaps: false,
            multi_sample,
        })
        .unwrap();

    let fb = renderer.create_framebuffer();
    renderer.framebuffer_set_color_attachment(fb, color, 0);

    if with_depth {
        let depth = renderer
            .create_texture(TextureDesc {
                width,
                height,
                kind: TextureKind::TwoD,
                format: TextureFormat::Float32,
                usage: TextureUsage::ATTACHMENT_DEPTH,
                use_mipmaps: false,
                multi_sample,
            })
            .unwrap();
        renderer.framebuffer_set_depth_attachment(fb, depth);
    }

    renderer.set_framebuffer(fb);
    renderer.set_viewport(0, 0, width as i32, height as i32);
    Target { renderer, color }
}

fn read_pixel(target: &Target, x: u32, y: u32) -> Rgba8 {
    target
        .renderer
        .texture(target.color)
        .unwrap()
        .image_rgba8(0)
        .unwrap()
        .levels[0]
        .buffer
        .as_ref()
        .expect("single-sample plane")
        .get(x, y)
        .unwrap()
}

fn make_position_vao(renderer: &mut Renderer, positions: &[[f32; 4]]) -> VertexArrayId {
    let bytes: Vec<u8> = positions
        .iter()
        .flat_map(|p| bytemuck::cast_slice::<f32, u8>(p).to_vec())
        .collect();
    let indices: Vec<i32> = (0..positions.len() as i32).collect();
    let attributes = [VertexAttributeDesc {
        component_count: 4,
        stride: 16,
        offset: 0,
    }];
    renderer.create_vertex_array_object(&VertexArray {
        vertex_size: 16,
        attributes: &attributes,
        vertex_bytes: &bytes,
        indices: &indices,
    })
}

fn bind_flat_program(renderer: &mut Renderer, color: Vec4) -> ShaderBindings {
    let program = renderer.create_shader_program();
    renderer
        .program_mut(program)
        .unwrap()
        .set_shaders(Box::new(FlatVs), Box::new(FlatFs));
    renderer.set_shader_program(program);

    let mut bindings = ShaderBindings::new();
    let mut block = UniformBlock::new("Color", 16);
    block.set_value(&color);
    bindings.add_block(block);
    renderer.set_shader_uniforms(&bindings);
    bindings
}

/// Clip-space corners of a triangle covering the whole viewport.
const FULL_SCREEN: [[f32; 4]; 3] = [
    [-1.0, -1.0, 0.0, 1.0],
    [3.0, -1.0, 0.0, 1.0],
    [-1.0, 3.0, 0.0, 1.0],
];

fn full_screen_at_z(z: f32) -> [[f32; 4]; 3] {
    let mut tri = FULL_SCREEN;
    for vertex in &mut tri {
        vertex[2] = z;
    }
    tri
}

// --- Scenarios ---

#[test]
fn clear_fills_every_texel() {
    let mut target = make_target(16, 16, false, false);
    let mut clear = target.renderer.default_clear_state();
    clear.color_flag = true;
    clear.clear_color = Vec4::new(1.0, 0.0, 0.0, 1.0);
    target.renderer.clear(&clear);

    for y in 0..16 {
        for x in 0..16 {
            assert_eq!(read_pixel(&target, x, y), Rgba8::new(255, 0, 0, 255));
        }
    }
}

#[test]
fn full_screen_triangle_covers_viewport() {
    let mut target = make_target(4, 4, false, false);
    let vao = make_position_vao(&mut target.renderer, &FULL_SCREEN);
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::new(0.0, 1.0, 0.0, 1.0));
    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Triangle);

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(read_pixel(&target, x, y), Rgba8::new(0, 255, 0, 255));
        }
    }
}

#[test]
fn depth_test_resolves_overlap_in_either_order() {
    for reversed_order in [false, true] {
        let mut target = make_target(2, 2, true, false);
        let mut clear = target.renderer.default_clear_state();
        clear.color_flag = true;
        clear.depth_flag = true;
        target.renderer.clear(&clear);

        let mut state = target.renderer.default_render_state();
        state.depth_test = true;
        state.depth_mask = true;
        state.depth_func = DepthFunction::Less;
        target.renderer.set_render_state(state);

        let near = make_position_vao(&mut target.renderer, &full_screen_at_z(0.2));
        let far = make_position_vao(&mut target.renderer, &full_screen_at_z(0.8));

        let order = if reversed_order {
            [(near, [0.0f32, 0.0, 1.0, 1.0]), (far, [1.0, 0.0, 0.0, 1.0])]
        } else {
            [(far, [1.0f32, 0.0, 0.0, 1.0]), (near, [0.0, 0.0, 1.0, 1.0])]
        };

        let program = target.renderer.create_shader_program();
        target
            .renderer
            .program_mut(program)
            .unwrap()
            .set_shaders(Box::new(FlatVs), Box::new(FlatFs));
        target.renderer.set_shader_program(program);

        for (vao_id, color) in order {
            target.renderer.set_vertex_array_object(vao_id);
            let mut bindings = ShaderBindings::new();
            let mut block = UniformBlock::new("Color", 16);
            block.set_data(bytemuck::cast_slice(&color));
            bindings.add_block(block);
            target.renderer.set_shader_uniforms(&bindings);
            target.renderer.draw(PrimitiveType::Triangle);
        }

        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(
                    read_pixel(&target, x, y),
                    Rgba8::new(0, 0, 255, 255),
                    "order reversed = {reversed_order}, pixel ({x},{y})"
                );
            }
        }
    }
}

#[test]
fn alpha_blending_over_black() {
    let mut target = make_target(1, 1, false, false);
    let mut clear = target.renderer.default_clear_state();
    clear.color_flag = true;
    clear.clear_color = Vec4::new(0.0, 0.0, 0.0, 1.0);
    target.renderer.clear(&clear);

    // An unclipped triangle covering the pixel center exactly once;
    // the clipped full-screen triangle fans into two triangles whose
    // shared edge would pass through the center and blend twice.
    let vao = make_position_vao(
        &mut target.renderer,
        &[
            [-1.0, -1.0, 0.0, 1.0],
            [1.0, -1.0, 0.0, 1.0],
            [-1.0, 1.0, 0.0, 1.0],
        ],
    );
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::new(1.0, 0.0, 0.0, 0.5));

    let mut state = target.renderer.default_render_state();
    state.blend = true;
    state
        .blend_params
        .set_factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    state.blend_params.set_function(BlendFunction::Add);
    target.renderer.set_render_state(state);
    target.renderer.draw(PrimitiveType::Triangle);

    let pixel = read_pixel(&target, 0, 0);
    // rgb: 1.0 * 0.5 + 0.0 * 0.5 = 0.5.
    assert!((pixel.r as i32 - 128).abs() <= 1, "r = {}", pixel.r);
    assert_eq!(pixel.g, 0);
    assert_eq!(pixel.b, 0);
    // alpha: 0.5 * 0.5 + 1.0 * (1 - 0.5) = 0.75.
    assert!((pixel.a as i32 - 191).abs() <= 1, "a = {}", pixel.a);
}

#[test]
fn textured_triangle_samples_bilinear_center() {
    let mut target = make_target(1, 1, false, false);

    let texture = target
        .renderer
        .create_texture(TextureDesc {
            width: 2,
            height: 2,
            kind: TextureKind::TwoD,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::SAMPLER | TextureUsage::UPLOAD_DATA,
            use_mipmaps: false,
            multi_sample: false,
        })
        .unwrap();
    target.renderer.texture_mut(texture).unwrap().set_sampler_desc(SamplerDesc {
        filter_min: FilterMode::Linear,
        filter_mag: FilterMode::Linear,
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::ClampToEdge,
        wrap_r: WrapMode::ClampToEdge,
        ..SamplerDesc::default()
    });
    target.renderer.texture_set_image_rgba8(
        texture,
        vec![Buffer::from_texels(
            2,
            2,
            vec![
                Rgba8::new(0, 0, 0, 255),
                Rgba8::new(255, 0, 0, 255),
                Rgba8::new(0, 255, 0, 255),
                Rgba8::new(0, 0, 255, 255),
            ],
        )
        .unwrap()],
    );

    // Interleaved position + uv; uv (0.5, 0.5) lands at the pixel center.
    let vertices: [[f32; 6]; 3] = [
        [-1.0, -1.0, 0.0, 1.0, 0.0, 0.0],
        [3.0, -1.0, 0.0, 1.0, 2.0, 0.0],
        [-1.0, 3.0, 0.0, 1.0, 0.0, 2.0],
    ];
    let bytes: Vec<u8> = vertices
        .iter()
        .flat_map(|v| bytemuck::cast_slice::<f32, u8>(v).to_vec())
        .collect();
    let attributes = [
        VertexAttributeDesc {
            component_count: 4,
            stride: 24,
            offset: 0,
        },
        VertexAttributeDesc {
            component_count: 2,
            stride: 24,
            offset: 16,
        },
    ];
    let vao = target.renderer.create_vertex_array_object(&VertexArray {
        vertex_size: 24,
        attributes: &attributes,
        vertex_bytes: &bytes,
        indices: &[0, 1, 2],
    });
    target.renderer.set_vertex_array_object(vao);

    let program = target.renderer.create_shader_program();
    target
        .renderer
        .program_mut(program)
        .unwrap()
        .set_shaders(Box::new(TexturedVs), Box::new(TexturedFs));
    target.renderer.set_shader_program(program);

    let mut bindings = ShaderBindings::new();
    let mut sampler = UniformSampler::new("u_tex", TextureKind::TwoD, TextureFormat::Rgba8);
    sampler.set_texture(texture);
    bindings.add_sampler(sampler);
    target.renderer.set_shader_uniforms(&bindings);

    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Triangle);

    let pixel = read_pixel(&target, 0, 0);
    assert!((pixel.r as i32 - 64).abs() <= 2, "r = {}", pixel.r);
    assert!((pixel.g as i32 - 64).abs() <= 2, "g = {}", pixel.g);
    assert!((pixel.b as i32 - 64).abs() <= 2, "b = {}", pixel.b);
    assert_eq!(pixel.a, 255);
}

#[test]
fn zero_area_triangle_is_discarded() {
    let mut target = make_target(4, 4, false, false);
    let vao = make_position_vao(
        &mut target.renderer,
        &[
            [-1.0, -1.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 1.0, 0.0, 1.0],
        ],
    );
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::ONE);
    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Triangle);

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(read_pixel(&target, x, y), Rgba8::ZERO);
        }
    }
}

#[test]
fn discarding_fragment_shader_writes_nothing() {
    let mut target = make_target(4, 4, false, false);
    let vao = make_position_vao(&mut target.renderer, &FULL_SCREEN);
    target.renderer.set_vertex_array_object(vao);

    let program = target.renderer.create_shader_program();
    target
        .renderer
        .program_mut(program)
        .unwrap()
        .set_shaders(Box::new(FlatVs), Box::new(DiscardFs));
    target.renderer.set_shader_program(program);
    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Triangle);

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(read_pixel(&target, x, y), Rgba8::ZERO);
        }
    }
}

#[test]
fn back_face_culling_discards_clockwise_triangle() {
    let mut target = make_target(4, 4, false, false);
    // Reversed winding of the full-screen triangle.
    let vao = make_position_vao(
        &mut target.renderer,
        &[
            [-1.0, -1.0, 0.0, 1.0],
            [-1.0, 3.0, 0.0, 1.0],
            [3.0, -1.0, 0.0, 1.0],
        ],
    );
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::ONE);

    let mut state = target.renderer.default_render_state();
    state.cull_face = true;
    target.renderer.set_render_state(state);
    target.renderer.draw(PrimitiveType::Triangle);

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(read_pixel(&target, x, y), Rgba8::ZERO);
        }
    }
}

#[test]
fn early_z_matches_late_z_result() {
    for early in [false, true] {
        let mut target = make_target(2, 2, true, false);
        target.renderer.set_early_z(early);

        let mut clear = target.renderer.default_clear_state();
        clear.color_flag = true;
        clear.depth_flag = true;
        target.renderer.clear(&clear);

        let mut state = target.renderer.default_render_state();
        state.depth_test = true;
        target.renderer.set_render_state(state);

        let near = make_position_vao(&mut target.renderer, &full_screen_at_z(0.2));
        let far = make_position_vao(&mut target.renderer, &full_screen_at_z(0.8));

        let program = target.renderer.create_shader_program();
        target
            .renderer
            .program_mut(program)
            .unwrap()
            .set_shaders(Box::new(FlatVs), Box::new(FlatFs));
        target.renderer.set_shader_program(program);

        for (vao_id, color) in [
            (near, [0.0f32, 0.0, 1.0, 1.0]),
            (far, [1.0, 0.0, 0.0, 1.0]),
        ] {
            target.renderer.set_vertex_array_object(vao_id);
            let mut bindings = ShaderBindings::new();
            let mut block = UniformBlock::new("Color", 16);
            block.set_data(bytemuck::cast_slice(&color));
            bindings.add_block(block);
            target.renderer.set_shader_uniforms(&bindings);
            target.renderer.draw(PrimitiveType::Triangle);
        }

        assert_eq!(
            read_pixel(&target, 0, 0),
            Rgba8::new(0, 0, 255, 255),
            "early = {early}"
        );
    }
}

#[test]
fn reverse_z_prefers_greater_depth() {
    let mut target = make_target(2, 2, true, false);
    target.renderer.set_reverse_z(true);

    let mut clear = target.renderer.default_clear_state();
    assert_eq!(clear.clear_depth, 0.0);
    clear.color_flag = true;
    clear.depth_flag = true;
    target.renderer.clear(&clear);

    let mut state = target.renderer.default_render_state();
    assert_eq!(state.depth_func, DepthFunction::GreaterEqual);
    state.depth_test = true;
    target.renderer.set_render_state(state);

    let near = make_position_vao(&mut target.renderer, &full_screen_at_z(0.8));
    let far = make_position_vao(&mut target.renderer, &full_screen_at_z(0.2));

    let program = target.renderer.create_shader_program();
    target
        .renderer
        .program_mut(program)
        .unwrap()
        .set_shaders(Box::new(FlatVs), Box::new(FlatFs));
    target.renderer.set_shader_program(program);

    for (vao_id, color) in [
        (near, [0.0f32, 1.0, 0.0, 1.0]),
        (far, [1.0, 0.0, 0.0, 1.0]),
    ] {
        target.renderer.set_vertex_array_object(vao_id);
        let mut bindings = ShaderBindings::new();
        let mut block = UniformBlock::new("Color", 16);
        block.set_data(bytemuck::cast_slice(&color));
        bindings.add_block(block);
        target.renderer.set_shader_uniforms(&bindings);
        target.renderer.draw(PrimitiveType::Triangle);
    }

    // Under reversed-Z the larger depth value is closer.
    assert_eq!(read_pixel(&target, 0, 0), Rgba8::new(0, 255, 0, 255));
}

#[test]
fn msaa_resolve_averages_partial_coverage() {
    let mut target = make_target(2, 2, false, true);
    let mut clear = target.renderer.default_clear_state();
    clear.color_flag = true;
    target.renderer.clear(&clear);

    // Lower-left half of the viewport.
    let vao = make_position_vao(
        &mut target.renderer,
        &[
            [-1.0, -1.0, 0.0, 1.0],
            [1.0, -1.0, 0.0, 1.0],
            [-1.0, 1.0, 0.0, 1.0],
        ],
    );
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::new(0.0, 1.0, 0.0, 1.0));
    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Triangle);

    // Fully covered pixel.
    assert_eq!(read_pixel(&target, 0, 0).g, 255);
    // Fully uncovered pixel.
    assert_eq!(read_pixel(&target, 1, 1).g, 0);
    // The diagonal pixels have two of four samples covered.
    let edge = read_pixel(&target, 1, 0).g as i32;
    assert!((edge - 127).abs() <= 2, "edge = {edge}");
}

#[test]
fn point_rasterizes_sized_square() {
    let mut target = make_target(4, 4, false, false);
    let vao = make_position_vao(&mut target.renderer, &[[0.0, 0.0, 0.0, 1.0]]);
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::new(1.0, 1.0, 1.0, 1.0));

    let mut state = target.renderer.default_render_state();
    state.point_size = 2.0;
    target.renderer.set_render_state(state);
    target.renderer.draw(PrimitiveType::Point);

    let mut covered = Vec::new();
    for y in 0..4 {
        for x in 0..4 {
            if read_pixel(&target, x, y) != Rgba8::ZERO {
                covered.push((x, y));
            }
        }
    }
    assert_eq!(covered, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
}

#[test]
fn line_rasterizes_single_row() {
    let mut target = make_target(4, 4, false, false);
    let vao = make_position_vao(
        &mut target.renderer,
        &[[-0.9, -0.5, 0.0, 1.0], [0.9, -0.5, 0.0, 1.0]],
    );
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::new(0.0, 1.0, 0.0, 1.0));
    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Line);

    for x in 0..4 {
        assert_eq!(read_pixel(&target, x, 1), Rgba8::new(0, 255, 0, 255));
        assert_eq!(read_pixel(&target, x, 0), Rgba8::ZERO);
        assert_eq!(read_pixel(&target, x, 3), Rgba8::ZERO);
    }
}

#[test]
fn wireframe_mode_leaves_interior_unfilled() {
    let mut target = make_target(8, 8, false, false);
    let vao = make_position_vao(
        &mut target.renderer,
        &[
            [-0.75, -0.75, 0.0, 1.0],
            [0.75, -0.75, 0.0, 1.0],
            [-0.75, 0.75, 0.0, 1.0],
        ],
    );
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::ONE);

    let mut state = target.renderer.default_render_state();
    state.polygon_mode = PolygonMode::Line;
    target.renderer.set_render_state(state);
    target.renderer.draw(PrimitiveType::Triangle);

    // The bottom edge runs along window row 1.
    assert_ne!(read_pixel(&target, 4, 1), Rgba8::ZERO);
    // A pixel well inside the triangle stays untouched.
    assert_eq!(read_pixel(&target, 3, 3), Rgba8::ZERO);
}

#[test]
fn interpolation_is_perspective_correct() {
    let mut target = make_target(1, 1, false, false);

    // Vertices at NDC (-1,-1), (1,-1), (-1,1) with clip w of 1, 2, 4;
    // the varying is 0 at the first two corners mapped per-vertex below.
    // The pixel center lands at screen barycentric (0, 1/2, 1/2), so the
    // perspective-correct weight of each vertex is lambda_i/w_i
    // renormalized: (0, 2/3, 1/3). With attribute values (0, 1, 0) the
    // expected result is 2/3, while linear interpolation would give 1/2.
    let vertices: [[f32; 5]; 3] = [
        [-1.0, -1.0, 0.0, 1.0, 0.0],
        [2.0, -2.0, 0.0, 2.0, 1.0],
        [-4.0, 4.0, 0.0, 4.0, 0.0],
    ];
    let bytes: Vec<u8> = vertices
        .iter()
        .flat_map(|v| bytemuck::cast_slice::<f32, u8>(v).to_vec())
        .collect();
    let attributes = [VertexAttributeDesc {
        component_count: 4,
        stride: 20,
        offset: 0,
    }];
    let vao = target.renderer.create_vertex_array_object(&VertexArray {
        vertex_size: 20,
        attributes: &attributes,
        vertex_bytes: &bytes,
        indices: &[0, 1, 2],
    });
    target.renderer.set_vertex_array_object(vao);

    let program = target.renderer.create_shader_program();
    target
        .renderer
        .program_mut(program)
        .unwrap()
        .set_shaders(Box::new(ProbeVs), Box::new(ProbeFs));
    target.renderer.set_shader_program(program);
    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Triangle);

    let pixel = read_pixel(&target, 0, 0);
    let expected = (2.0 / 3.0 * 255.0) as i32;
    assert!(
        (pixel.r as i32 - expected).abs() <= 2,
        "r = {} (expected ~{expected})",
        pixel.r
    );
}

#[test]
fn zero_length_line_draws_single_point() {
    let mut target = make_target(4, 4, false, false);
    let vao = make_position_vao(
        &mut target.renderer,
        &[[0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.0, 1.0]],
    );
    target.renderer.set_vertex_array_object(vao);
    let _bindings = bind_flat_program(&mut target.renderer, Vec4::ONE);
    target
        .renderer
        .set_render_state(target.renderer.default_render_state());
    target.renderer.draw(PrimitiveType::Line);

    let mut covered = 0;
    for y in 0..4 {
        for x in 0..4 {
            if read_pixel(&target, x, y) != Rgba8::ZERO {
                covered += 1;
            }
        }
    }
    // A width-1 line of length zero stamps exactly one pixel.
    assert_eq!(covered, 1);
}

#[test]
fn draw_without_bindings_is_a_no_op() {
    let mut target = make_target(2, 2, false, false);
    // No VAO or program bound: the draw must not panic or write.
    target.renderer.draw(PrimitiveType::Triangle);
    assert_eq!(read_pixel(&target, 0, 0), Rgba8::ZERO);
}
