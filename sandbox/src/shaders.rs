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

//! Demo shader families: a depth-only shadow pass and a Blinn-Phong
//! surface shader with optional albedo map and PCF shadows.

use okhra_core::math::{Mat3, Mat4, Vec2, Vec3, Vec4};
use okhra_core::renderer::{TextureFormat, TextureKind};
use okhra_soft::shader::{
    attributes_as, uniforms_as, varyings_as, varyings_as_mut, FragmentOutput, FragmentStage,
    SamplerSlotDesc, ShaderDescriptor, SoftShader, UniformBlockDesc, VertexOutput, VertexStage,
};

/// Define flag 0: sample the albedo map instead of the base color.
pub const DEFINE_ALBEDO_MAP: &str = "ALBEDO_MAP";
/// Define flag 1: apply the shadow map.
pub const DEFINE_SHADOW_MAP: &str = "SHADOW_MAP";

const ALBEDO_SLOT: usize = 0;
const SHADOW_SLOT: usize = 1;

/// The cube's vertex layout: position, normal, uv.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshAttributes {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

// --- Shadow pass ---

/// Uniforms of the depth-only pass.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniforms {
    /// Light-space model-view-projection.
    pub light_mvp: Mat4,
}

static SHADOW_DESC: ShaderDescriptor = ShaderDescriptor {
    defines: &[],
    uniforms_size: std::mem::size_of::<ShadowUniforms>(),
    blocks: &[UniformBlockDesc {
        name: "ShadowPass",
        offset: 0,
        size: std::mem::size_of::<ShadowUniforms>(),
    }],
    samplers: &[],
    varying_floats: 0,
};

/// Vertex stage of the shadow pass.
#[derive(Clone)]
pub struct ShadowVs;
/// Fragment stage of the shadow pass (depth writes only).
#[derive(Clone)]
pub struct ShadowFs;

impl SoftShader for ShadowVs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &SHADOW_DESC
    }

    fn vertex(&self, stage: &VertexStage, out: &mut VertexOutput) {
        let attributes: MeshAttributes = attributes_as(stage.vertex);
        let uniforms: ShadowUniforms = uniforms_as(stage.uniforms);
        let p = attributes.position;
        out.position = uniforms.light_mvp * Vec4::new(p[0], p[1], p[2], 1.0);
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

impl SoftShader for ShadowFs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &SHADOW_DESC
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

// --- Blinn-Phong surface pass ---

/// Uniforms of the surface pass.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Camera model-view-projection.
    pub mvp: Mat4,
    /// Model-to-world transform (rotation + translation only; its upper
    /// 3x3 doubles as the normal matrix).
    pub model: Mat4,
    /// Light-space model-view-projection for shadow lookups.
    pub shadow_mvp: Mat4,
    /// World-space camera position.
    pub camera_position: [f32; 4],
    /// World-space point light position.
    pub light_position: [f32; 4],
    /// Light color.
    pub light_color: [f32; 4],
    /// Ambient term.
    pub ambient_color: [f32; 4],
    /// Base color when no albedo map is bound.
    pub base_color: [f32; 4],
    /// Specular strength in x; yzw unused padding.
    pub k_specular: [f32; 4],
}

/// Varyings carried from vertex to fragment stage.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneVaryings {
    world_pos: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
    shadow_pos: [f32; 4],
}

const SCENE_VARYING_FLOATS: usize = std::mem::size_of::<SceneVaryings>() / 4;
// Float offset of `uv` inside the varyings; drives the albedo LOD.
const UV_VARYING_OFFSET: usize = 6;

static SCENE_DESC: ShaderDescriptor = ShaderDescriptor {
    defines: &[DEFINE_ALBEDO_MAP, DEFINE_SHADOW_MAP],
    uniforms_size: std::mem::size_of::<SceneUniforms>(),
    blocks: &[UniformBlockDesc {
        name: "Scene",
        offset: 0,
        size: std::mem::size_of::<SceneUniforms>(),
    }],
    samplers: &[
        SamplerSlotDesc {
            name: "u_albedo",
            kind: TextureKind::TwoD,
            format: TextureFormat::Rgba8,
            lod_varying: Some(UV_VARYING_OFFSET),
        },
        SamplerSlotDesc {
            name: "u_shadow",
            kind: TextureKind::TwoD,
            format: TextureFormat::Float32,
            lod_varying: None,
        },
    ],
    varying_floats: SCENE_VARYING_FLOATS,
};

/// Vertex stage of the surface pass.
#[derive(Clone)]
pub struct BlinnPhongVs;
/// Fragment stage of the surface pass.
#[derive(Clone)]
pub struct BlinnPhongFs;

impl SoftShader for BlinnPhongVs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &SCENE_DESC
    }

    fn vertex(&self, stage: &VertexStage, out: &mut VertexOutput) {
        let attributes: MeshAttributes = attributes_as(stage.vertex);
        let uniforms: SceneUniforms = uniforms_as(stage.uniforms);

        let p = attributes.position;
        let position = Vec4::new(p[0], p[1], p[2], 1.0);
        out.position = uniforms.mvp * position;

        let world = uniforms.model * position;
        let normal =
            Mat3::from_mat4(uniforms.model) * Vec3::new(attributes.normal[0], attributes.normal[1], attributes.normal[2]);
        let shadow = uniforms.shadow_mvp * position;

        let varyings: &mut SceneVaryings = varyings_as_mut(out.varyings);
        varyings.world_pos = [world.x, world.y, world.z];
        varyings.normal = [normal.x, normal.y, normal.z];
        varyings.uv = attributes.uv;
        varyings.shadow_pos = [shadow.x, shadow.y, shadow.z, shadow.w];
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}

impl BlinnPhongFs {
    /// 3x3 PCF over the shadow map; 1.0 = fully shadowed.
    fn shadow_factor(stage: &FragmentStage, shadow_pos: Vec4, normal: Vec3, light_dir: Vec3) -> f32 {
        if shadow_pos.w <= 0.0 {
            return 0.0;
        }
        let proj = shadow_pos.xyz() * (1.0 / shadow_pos.w);
        // Light NDC xy -> depth-map uv. The depth buffer stores the
        // light's window z unremapped, so compare against raw NDC z.
        let uv = Vec2::new(proj.x * 0.5 + 0.5, proj.y * 0.5 + 0.5);
        let current = proj.z;
        if !(0.0..=1.0).contains(&current) {
            return 0.0;
        }

        let bias = (0.003 * (1.0 - normal.dot(light_dir))).max(0.0005);
        let (width, height) = stage.texture_size(SHADOW_SLOT, 0);
        if width == 0 || height == 0 {
            return 0.0;
        }
        let texel = Vec2::new(1.0 / width as f32, 1.0 / height as f32);

        let mut shadow = 0.0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let offset = Vec2::new(dx as f32, dy as f32) * texel;
                let stored = stage.texture_depth(SHADOW_SLOT, uv + offset);
                if current - bias > stored {
                    shadow += 1.0;
                }
            }
        }
        shadow / 9.0
    }
}

impl SoftShader for BlinnPhongFs {
    fn descriptor(&self) -> &'static ShaderDescriptor {
        &SCENE_DESC
    }

    fn fragment(&self, stage: &FragmentStage, out: &mut FragmentOutput) {
        const SPECULAR_EXPONENT: f32 = 64.0;

        let uniforms: SceneUniforms = uniforms_as(stage.uniforms);
        let varyings: &SceneVaryings = varyings_as(stage.varyings);

        let uv = Vec2::new(varyings.uv[0], varyings.uv[1]);
        let base_color = if stage.define(0) {
            stage.texture_2d(ALBEDO_SLOT, uv)
        } else {
            Vec4::new(
                uniforms.base_color[0],
                uniforms.base_color[1],
                uniforms.base_color[2],
                uniforms.base_color[3],
            )
        };

        let world = Vec3::new(
            varyings.world_pos[0],
            varyings.world_pos[1],
            varyings.world_pos[2],
        );
        let normal = Vec3::new(varyings.normal[0], varyings.normal[1], varyings.normal[2])
            .normalize();
        let light_pos = Vec3::new(
            uniforms.light_position[0],
            uniforms.light_position[1],
            uniforms.light_position[2],
        );
        let camera_pos = Vec3::new(
            uniforms.camera_position[0],
            uniforms.camera_position[1],
            uniforms.camera_position[2],
        );
        let light_color = Vec3::new(
            uniforms.light_color[0],
            uniforms.light_color[1],
            uniforms.light_color[2],
        );
        let ambient = Vec3::new(
            uniforms.ambient_color[0],
            uniforms.ambient_color[1],
            uniforms.ambient_color[2],
        );

        let light_dir = (light_pos - world).normalize();
        let camera_dir = (camera_pos - world).normalize();
        let half_vector = (light_dir + camera_dir).normalize();

        let diffuse = normal.dot(light_dir).max(0.0);
        let specular = normal.dot(half_vector).max(0.0).powf(SPECULAR_EXPONENT)
            * uniforms.k_specular[0];

        let mut lit = light_color * (base_color.xyz() * diffuse + Vec3::splat(specular));
        if stage.define(1) {
            let shadow_pos = Vec4::new(
                varyings.shadow_pos[0],
                varyings.shadow_pos[1],
                varyings.shadow_pos[2],
                varyings.shadow_pos[3],
            );
            let shadow = Self::shadow_factor(stage, shadow_pos, normal, light_dir);
            lit = lit * (1.0 - shadow);
        }

        let color = ambient * base_color.xyz() + lit;
        out.frag_color = Vec4::from_vec3(color, base_color.w);
    }

    fn clone_boxed(&self) -> Box<dyn SoftShader> {
        Box::new(self.clone())
    }
}
