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

//! State descriptors controlling the per-draw fixed-function behavior.

use crate::math::Vec4;

/// The comparison function used for the depth test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthFunction {
    /// The test never passes.
    Never,
    /// Passes if the incoming depth is strictly less than the stored depth.
    #[default]
    Less,
    /// Passes if the incoming depth equals the stored depth.
    Equal,
    /// Passes if the incoming depth is less than or equal to the stored depth.
    LessEqual,
    /// Passes if the incoming depth is strictly greater than the stored depth.
    Greater,
    /// Passes if the incoming depth differs from the stored depth.
    NotEqual,
    /// Passes if the incoming depth is greater than or equal to the stored depth.
    GreaterEqual,
    /// The test always passes.
    Always,
}

/// A multiplier applied to the source or destination color in blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`.
    Zero,
    /// `1`.
    One,
    /// The source color.
    SrcColor,
    /// The source alpha.
    SrcAlpha,
    /// The destination color.
    DstColor,
    /// The destination alpha.
    DstAlpha,
    /// `1 - source color`.
    OneMinusSrcColor,
    /// `1 - source alpha`.
    OneMinusSrcAlpha,
    /// `1 - destination color`.
    OneMinusDstColor,
    /// `1 - destination alpha`.
    OneMinusDstAlpha,
}

/// The equation combining the weighted source and destination terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFunction {
    /// `src + dst`.
    Add,
    /// `src - dst`.
    Subtract,
    /// `dst - src`.
    ReverseSubtract,
    /// Component-wise minimum (weights are ignored by convention).
    Min,
    /// Component-wise maximum (weights are ignored by convention).
    Max,
}

/// The full set of blend equation parameters, split between the RGB and
/// alpha channels as in the fixed-function blend unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendParameters {
    /// Equation for the RGB channels.
    pub func_rgb: BlendFunction,
    /// Source factor for the RGB channels.
    pub src_rgb: BlendFactor,
    /// Destination factor for the RGB channels.
    pub dst_rgb: BlendFactor,
    /// Equation for the alpha channel.
    pub func_alpha: BlendFunction,
    /// Source factor for the alpha channel.
    pub src_alpha: BlendFactor,
    /// Destination factor for the alpha channel.
    pub dst_alpha: BlendFactor,
}

impl Default for BlendParameters {
    fn default() -> Self {
        Self {
            func_rgb: BlendFunction::Add,
            src_rgb: BlendFactor::One,
            dst_rgb: BlendFactor::Zero,
            func_alpha: BlendFunction::Add,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
        }
    }
}

impl BlendParameters {
    /// Sets the same source/destination factors for RGB and alpha.
    pub fn set_factors(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.src_rgb = src;
        self.src_alpha = src;
        self.dst_rgb = dst;
        self.dst_alpha = dst;
    }

    /// Sets the same equation for RGB and alpha.
    pub fn set_function(&mut self, func: BlendFunction) {
        self.func_rgb = func;
        self.func_alpha = func;
    }
}

/// How polygon primitives are rasterized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Rasterize only the corner points of each triangle.
    Point,
    /// Rasterize only the edges of each triangle (wireframe).
    Line,
    /// Fill the triangle interior.
    #[default]
    Fill,
}

/// The kind of primitive assembled from the index stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Isolated points, one index each.
    Point,
    /// Isolated line segments, two indices each.
    Line,
    /// Isolated triangles, three indices each.
    #[default]
    Triangle,
}

/// The complete per-draw fixed-function state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    /// Whether blending is applied in the per-sample output stage.
    pub blend: bool,
    /// The blend equation parameters (consulted only when `blend` is set).
    pub blend_params: BlendParameters,

    /// Whether the depth test runs.
    pub depth_test: bool,
    /// Whether passing samples write their depth back.
    pub depth_mask: bool,
    /// The depth comparison function.
    pub depth_func: DepthFunction,

    /// Whether back faces are culled. Only back-face culling is supported.
    pub cull_face: bool,
    /// How triangles are rasterized.
    pub polygon_mode: PolygonMode,

    /// Line width, in pixels, for line primitives and wireframe mode.
    pub line_width: f32,
    /// Point size, in pixels, used when the shader does not override it.
    pub point_size: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            blend: false,
            blend_params: BlendParameters::default(),
            depth_test: false,
            depth_mask: true,
            depth_func: DepthFunction::Less,
            cull_face: false,
            polygon_mode: PolygonMode::Fill,
            line_width: 1.0,
            point_size: 1.0,
        }
    }
}

/// What `Renderer::clear` writes into the bound framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearState {
    /// Whether the color attachment is cleared.
    pub color_flag: bool,
    /// Whether the depth attachment is cleared.
    pub depth_flag: bool,
    /// The clear color, in unit range.
    pub clear_color: Vec4,
    /// The clear depth.
    pub clear_depth: f32,
}

impl Default for ClearState {
    fn default() -> Self {
        Self {
            color_flag: false,
            depth_flag: false,
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
        }
    }
}
