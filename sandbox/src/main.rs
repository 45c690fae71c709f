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

//! Offscreen demo: a Blinn-Phong shaded, checker-textured cube over a
//! floor plane, with a depth-only shadow pass, rendered at 4x MSAA and
//! dumped to PNG.

mod shaders;

use log::info;
use okhra_core::math::{Mat4, Rgba8, Vec3, Vec4, FRAC_PI_4};
use okhra_core::renderer::{
    BorderColor, FilterMode, PrimitiveType, SamplerDesc, TextureDesc, TextureFormat, TextureId,
    TextureKind, TextureUsage, VertexArray, VertexArrayId, VertexAttributeDesc, WrapMode,
};
use okhra_soft::buffer::Buffer;
use okhra_soft::{Renderer, ShaderBindings, UniformBlock, UniformSampler};
use shaders::{
    BlinnPhongFs, BlinnPhongVs, SceneUniforms, ShadowFs, ShadowUniforms, ShadowVs,
    DEFINE_ALBEDO_MAP, DEFINE_SHADOW_MAP,
};

const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;
const SHADOW_SIZE: u32 = 512;

/// Interleaved vertex: position, normal, uv.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

/// 24 vertices (4 per face) and 36 indices of a unit cube.
fn cube_mesh() -> (Vec<MeshVertex>, Vec<i32>) {
    // One entry per face: normal, tangent u, tangent v.
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, -Vec3::X, Vec3::Y),
        (Vec3::X, -Vec3::Z, Vec3::Y),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, -Vec3::Z),
        (-Vec3::Y, Vec3::X, Vec3::Z),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, tangent_u, tangent_v)) in faces.iter().enumerate() {
        let base = (face * 4) as i32;
        for (du, dv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = *normal + *tangent_u * du + *tangent_v * dv;
            vertices.push(MeshVertex {
                position: [position.x, position.y, position.z],
                normal: [normal.x, normal.y, normal.z],
                uv: [(du + 1.0) * 0.5, (dv + 1.0) * 0.5],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// A large floor quad at `y = -2`, uv tiled 4x.
fn floor_mesh() -> (Vec<MeshVertex>, Vec<i32>) {
    let corners = [
        ([-6.0, -2.0, 6.0], [0.0, 0.0]),
        ([6.0, -2.0, 6.0], [4.0, 0.0]),
        ([6.0, -2.0, -6.0], [4.0, 4.0]),
        ([-6.0, -2.0, -6.0], [0.0, 4.0]),
    ];
    let vertices = corners
        .iter()
        .map(|&(position, uv)| MeshVertex {
            position,
            normal: [0.0, 1.0, 0.0],
            uv,
        })
        .collect();
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

/// An 8x8 two-tone checkerboard, 64x64 texels.
fn checker_texture() -> Buffer<Rgba8> {
    let size = 64u32;
    let texels = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / 8 + y / 8) % 2 == 0 {
                Rgba8::new(230, 150, 60, 255)
            } else {
                Rgba8::new(60, 60, 70, 255)
            }
        })
        .collect();
    Buffer::from_texels(size, size, texels).unwrap()
}

fn make_vao(renderer: &mut Renderer, vertices: &[MeshVertex], indices: &[i32]) -> VertexArrayId {
    let attributes = [
        VertexAttributeDesc {
            component_count: 3,
            stride: 32,
            offset: 0,
        },
        VertexAttributeDesc {
            component_count: 3,
            stride: 32,
            offset: 12,
        },
        VertexAttributeDesc {
            component_count: 2,
            stride: 32,
            offset: 24,
        },
    ];
    renderer.create_vertex_array_object(&VertexArray {
        vertex_size: 32,
        attributes: &attributes,
        vertex_bytes: bytemuck::cast_slice(vertices),
        indices,
    })
}

fn create_target(renderer: &mut Renderer, format: TextureFormat, usage: TextureUsage, multi_sample: bool) -> TextureId {
    renderer
        .create_texture(TextureDesc {
            width: WIDTH,
            height: HEIGHT,
            kind: TextureKind::TwoD,
            format,
            usage,
            use_mipmaps: false,
            multi_sample,
        })
        .expect("render target")
}

fn main() {
    env_logger::init();

    let mut renderer = Renderer::new();

    // Main render targets, 4x multisampled.
    let color = create_target(
        &mut renderer,
        TextureFormat::Rgba8,
        TextureUsage::ATTACHMENT_COLOR | TextureUsage::RENDERER_OUTPUT,
        true,
    );
    let depth = create_target(
        &mut renderer,
        TextureFormat::Float32,
        TextureUsage::ATTACHMENT_DEPTH,
        true,
    );
    let framebuffer = renderer.create_framebuffer();
    renderer.framebuffer_set_color_attachment(framebuffer, color, 0);
    renderer.framebuffer_set_depth_attachment(framebuffer, depth);

    // Shadow map: depth-only, sampled by the surface pass.
    let shadow_map = renderer
        .create_texture(TextureDesc {
            width: SHADOW_SIZE,
            height: SHADOW_SIZE,
            kind: TextureKind::TwoD,
            format: TextureFormat::Float32,
            usage: TextureUsage::ATTACHMENT_DEPTH | TextureUsage::SAMPLER,
            use_mipmaps: false,
            multi_sample: false,
        })
        .expect("shadow map");
    renderer
        .texture_mut(shadow_map)
        .unwrap()
        .set_sampler_desc(SamplerDesc {
            filter_min: FilterMode::Nearest,
            filter_mag: FilterMode::Nearest,
            wrap_s: WrapMode::ClampToBorder,
            wrap_t: WrapMode::ClampToBorder,
            wrap_r: WrapMode::ClampToBorder,
            border_color: BorderColor::White,
        });
    let shadow_fb = renderer.create_framebuffer();
    renderer.framebuffer_set_depth_attachment(shadow_fb, shadow_map);

    // Albedo texture with trilinear mipmapping.
    let albedo = renderer
        .create_texture(TextureDesc {
            width: 64,
            height: 64,
            kind: TextureKind::TwoD,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::SAMPLER | TextureUsage::UPLOAD_DATA,
            use_mipmaps: true,
            multi_sample: false,
        })
        .expect("albedo texture");
    renderer
        .texture_mut(albedo)
        .unwrap()
        .set_sampler_desc(SamplerDesc {
            filter_min: FilterMode::LinearMipmapLinear,
            filter_mag: FilterMode::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
            ..SamplerDesc::default()
        });
    renderer.texture_set_image_rgba8(albedo, vec![checker_texture()]);

    // Geometry: a rotated cube and a static floor.
    let (cube_vertices, cube_indices) = cube_mesh();
    let (floor_vertices, floor_indices) = floor_mesh();
    let cube_vao = make_vao(&mut renderer, &cube_vertices, &cube_indices);
    let floor_vao = make_vao(&mut renderer, &floor_vertices, &floor_indices);

    let cube_model = Mat4::from_rotation_y(0.6) * Mat4::from_rotation_x(0.35);
    let draws = [(cube_vao, cube_model), (floor_vao, Mat4::IDENTITY)];

    // Transforms.
    let eye = Vec3::new(3.0, 2.5, 6.0);
    let view = Mat4::look_at(eye, Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective(FRAC_PI_4, WIDTH as f32 / HEIGHT as f32, 0.1, 100.0);
    let view_projection = projection * view;

    let light_position = Vec3::new(4.0, 6.0, 3.0);
    let light_view = Mat4::look_at(light_position, Vec3::ZERO, Vec3::Y);
    let light_projection = Mat4::perspective(FRAC_PI_4 * 1.6, 1.0, 0.5, 30.0);
    let light_view_projection = light_projection * light_view;

    // Programs.
    let shadow_program = renderer.create_shader_program();
    renderer
        .program_mut(shadow_program)
        .unwrap()
        .set_shaders(Box::new(ShadowVs), Box::new(ShadowFs));

    let scene_program = renderer.create_shader_program();
    {
        let program = renderer.program_mut(scene_program).unwrap();
        program.add_define(DEFINE_ALBEDO_MAP);
        program.add_define(DEFINE_SHADOW_MAP);
        program.set_shaders(Box::new(BlinnPhongVs), Box::new(BlinnPhongFs));
    }

    // Pass 1: depth-only shadow map from the light.
    renderer.set_framebuffer(shadow_fb);
    renderer.set_viewport(0, 0, SHADOW_SIZE as i32, SHADOW_SIZE as i32);
    renderer.set_shader_program(shadow_program);

    let mut state = renderer.default_render_state();
    state.depth_test = true;
    state.cull_face = true;
    renderer.set_render_state(state);

    let mut clear = renderer.default_clear_state();
    clear.depth_flag = true;
    renderer.clear(&clear);

    for (vao, model) in draws {
        renderer.set_vertex_array_object(vao);
        let mut bindings = ShaderBindings::new();
        let mut block = UniformBlock::new("ShadowPass", std::mem::size_of::<ShadowUniforms>());
        block.set_value(&ShadowUniforms {
            light_mvp: light_view_projection * model,
        });
        bindings.add_block(block);
        renderer.set_shader_uniforms(&bindings);
        renderer.draw(PrimitiveType::Triangle);
    }

    // Pass 2: lit surface pass into the multisampled target.
    renderer.set_framebuffer(framebuffer);
    renderer.set_viewport(0, 0, WIDTH as i32, HEIGHT as i32);
    renderer.set_shader_program(scene_program);
    renderer.set_render_state(state);

    let mut clear = renderer.default_clear_state();
    clear.color_flag = true;
    clear.depth_flag = true;
    clear.clear_color = Vec4::new(0.05, 0.05, 0.08, 1.0);
    renderer.clear(&clear);

    for (vao, model) in draws {
        renderer.set_vertex_array_object(vao);

        let uniforms = SceneUniforms {
            mvp: view_projection * model,
            model,
            shadow_mvp: light_view_projection * model,
            camera_position: [eye.x, eye.y, eye.z, 1.0],
            light_position: [light_position.x, light_position.y, light_position.z, 1.0],
            light_color: [1.0, 0.98, 0.92, 1.0],
            ambient_color: [0.12, 0.12, 0.16, 1.0],
            base_color: [0.8, 0.3, 0.2, 1.0],
            k_specular: [0.5, 0.0, 0.0, 0.0],
        };
        let mut bindings = ShaderBindings::new();
        let mut block = UniformBlock::new("Scene", std::mem::size_of::<SceneUniforms>());
        block.set_value(&uniforms);
        bindings.add_block(block);

        let mut albedo_sampler =
            UniformSampler::new("u_albedo", TextureKind::TwoD, TextureFormat::Rgba8);
        albedo_sampler.set_texture(albedo);
        bindings.add_sampler(albedo_sampler);

        let mut shadow_sampler =
            UniformSampler::new("u_shadow", TextureKind::TwoD, TextureFormat::Float32);
        shadow_sampler.set_texture(shadow_map);
        bindings.add_sampler(shadow_sampler);

        renderer.set_shader_uniforms(&bindings);
        renderer.draw(PrimitiveType::Triangle);
    }

    // Export.
    let color_path = std::path::Path::new("sandbox_color.png");
    renderer
        .texture_dump_image(color, color_path, 0, 0)
        .expect("dump color image");
    let shadow_path = std::path::Path::new("sandbox_shadow.png");
    renderer
        .texture_dump_image(shadow_map, shadow_path, 0, 0)
        .expect("dump shadow map");
    info!(
        "wrote {} and {}",
        color_path.display(),
        shadow_path.display()
    );
}
