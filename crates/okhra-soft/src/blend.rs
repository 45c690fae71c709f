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

//! The fixed-function blend equation.
//!
//! RGB and alpha are weighted and combined separately:
//! `out.rgb = func(src.rgb * src_factor, dst.rgb * dst_factor)`, with the
//! factors drawn from the source/destination colors and alphas.

use okhra_core::math::{Vec3, Vec4};
use okhra_core::renderer::{BlendFactor, BlendFunction, BlendParameters};

fn factor_rgb(src: Vec3, src_a: f32, dst: Vec3, dst_a: f32, factor: BlendFactor) -> Vec3 {
    match factor {
        BlendFactor::Zero => Vec3::ZERO,
        BlendFactor::One => Vec3::ONE,
        BlendFactor::SrcColor => src,
        BlendFactor::SrcAlpha => Vec3::splat(src_a),
        BlendFactor::DstColor => dst,
        BlendFactor::DstAlpha => Vec3::splat(dst_a),
        BlendFactor::OneMinusSrcColor => Vec3::ONE - src,
        BlendFactor::OneMinusSrcAlpha => Vec3::splat(1.0 - src_a),
        BlendFactor::OneMinusDstColor => Vec3::ONE - dst,
        BlendFactor::OneMinusDstAlpha => Vec3::splat(1.0 - dst_a),
    }
}

fn factor_alpha(src_a: f32, dst_a: f32, factor: BlendFactor) -> f32 {
    match factor {
        BlendFactor::Zero => 0.0,
        BlendFactor::One => 1.0,
        BlendFactor::SrcColor | BlendFactor::SrcAlpha => src_a,
        BlendFactor::DstColor | BlendFactor::DstAlpha => dst_a,
        BlendFactor::OneMinusSrcColor | BlendFactor::OneMinusSrcAlpha => 1.0 - src_a,
        BlendFactor::OneMinusDstColor | BlendFactor::OneMinusDstAlpha => 1.0 - dst_a,
    }
}

fn func_rgb(a: Vec3, b: Vec3, func: BlendFunction) -> Vec3 {
    match func {
        BlendFunction::Add => a + b,
        BlendFunction::Subtract => a - b,
        BlendFunction::ReverseSubtract => b - a,
        BlendFunction::Min => a.min(b),
        BlendFunction::Max => a.max(b),
    }
}

fn func_alpha(a: f32, b: f32, func: BlendFunction) -> f32 {
    match func {
        BlendFunction::Add => a + b,
        BlendFunction::Subtract => a - b,
        BlendFunction::ReverseSubtract => b - a,
        BlendFunction::Min => a.min(b),
        BlendFunction::Max => a.max(b),
    }
}

/// Blends a source fragment color against the destination pixel color.
pub fn blend_color(src: Vec4, dst: Vec4, params: &BlendParameters) -> Vec4 {
    let src_rgb = src.xyz();
    let dst_rgb = dst.xyz();

    let src_f = factor_rgb(src_rgb, src.w, dst_rgb, dst.w, params.src_rgb);
    let dst_f = factor_rgb(src_rgb, src.w, dst_rgb, dst.w, params.dst_rgb);
    let rgb = func_rgb(src_rgb * src_f, dst_rgb * dst_f, params.func_rgb);

    let src_af = factor_alpha(src.w, dst.w, params.src_alpha);
    let dst_af = factor_alpha(src.w, dst.w, params.dst_alpha);
    let alpha = func_alpha(src.w * src_af, dst.w * dst_af, params.func_alpha);

    Vec4::from_vec3(rgb, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_over() -> BlendParameters {
        let mut params = BlendParameters::default();
        params.set_factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        params.set_function(BlendFunction::Add);
        params
    }

    #[test]
    fn test_default_replaces_destination() {
        let src = Vec4::new(0.3, 0.4, 0.5, 0.6);
        let dst = Vec4::new(0.9, 0.9, 0.9, 0.9);
        // ONE / ZERO / ADD is a plain overwrite.
        let out = blend_color(src, dst, &BlendParameters::default());
        assert_eq!(out, src);
    }

    #[test]
    fn test_alpha_over_half() {
        let src = Vec4::new(1.0, 0.0, 0.0, 0.5);
        let dst = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let out = blend_color(src, dst, &alpha_over());
        assert!((out.x - 0.5).abs() < 1e-6);
        assert!((out.y - 0.0).abs() < 1e-6);
        assert!((out.z - 0.0).abs() < 1e-6);
        // a = 0.5 * 0.5 + 1.0 * 0.5
        assert!((out.w - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_subtract() {
        let mut params = BlendParameters::default();
        params.set_factors(BlendFactor::One, BlendFactor::One);
        params.set_function(BlendFunction::ReverseSubtract);
        let out = blend_color(
            Vec4::new(0.25, 0.25, 0.25, 0.25),
            Vec4::new(1.0, 0.5, 0.25, 1.0),
            &params,
        );
        assert!((out.x - 0.75).abs() < 1e-6);
        assert!((out.y - 0.25).abs() < 1e-6);
        assert!((out.z - 0.0).abs() < 1e-6);
        assert!((out.w - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_min_max_componentwise() {
        let mut params = BlendParameters::default();
        params.set_factors(BlendFactor::One, BlendFactor::One);
        params.set_function(BlendFunction::Min);
        let src = Vec4::new(0.2, 0.8, 0.5, 1.0);
        let dst = Vec4::new(0.6, 0.1, 0.5, 0.0);
        let out = blend_color(src, dst, &params);
        assert_eq!(out, Vec4::new(0.2, 0.1, 0.5, 0.0));

        params.set_function(BlendFunction::Max);
        let out = blend_color(src, dst, &params);
        assert_eq!(out, Vec4::new(0.6, 0.8, 0.5, 1.0));
    }

    #[test]
    fn test_dst_color_factor() {
        let mut params = BlendParameters::default();
        params.set_factors(BlendFactor::DstColor, BlendFactor::Zero);
        let src = Vec4::new(0.5, 1.0, 0.25, 1.0);
        let dst = Vec4::new(0.5, 0.5, 1.0, 0.5);
        let out = blend_color(src, dst, &params);
        assert!((out.x - 0.25).abs() < 1e-6);
        assert!((out.y - 0.5).abs() < 1e-6);
        assert!((out.z - 0.25).abs() < 1e-6);
        assert!((out.w - 0.5).abs() < 1e-6);
    }
}
