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

//! Attribute interpolation and barycentric evaluation.
//!
//! Every routine has a portable scalar implementation; on x86-64 the
//! barycentric evaluation uses an SSE cross product and the varying
//! interpolation an 8-wide AVX2+FMA kernel (4-wide SSE next, scalar
//! tail) when the feature set is present at runtime and all varying
//! slots carry the 32-byte alignment the arena guarantees.

use crate::vertex::VARYING_ALIGNMENT;
use okhra_core::math::{lerp, Vec2, Vec4};

/// Linearly interpolates two attribute arrays element-wise.
pub fn interpolate_linear(out: &mut [f32], a: &[f32], b: &[f32], t: f32) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = lerp(x, y, t);
    }
}

/// Evaluates barycentric coordinates of `p` against a triangle given in
/// transposed form: `flat_x = (v2.x, v1.x, v0.x, 0)` and likewise for y.
///
/// Writes `(λ0, λ1, λ2, 0)` into `bc` and returns whether `p` lies inside
/// (all weights non-negative). A degenerate triangle returns `false`
/// without touching `bc`.
#[inline]
pub fn barycentric(flat_x: Vec4, flat_y: Vec4, p: Vec2, bc: &mut Vec4) -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        // SSE2 is part of the x86-64 baseline.
        unsafe { barycentric_sse(flat_x, flat_y, p, bc) }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        barycentric_scalar(flat_x, flat_y, p, bc)
    }
}

/// Portable implementation of [`barycentric`].
pub fn barycentric_scalar(flat_x: Vec4, flat_y: Vec4, p: Vec2, bc: &mut Vec4) -> bool {
    let v0 = Vec2::new(flat_x.z, flat_y.z);

    // Cross product of (v2 - v0, v1 - v0, v0 - p) per axis; u.z is twice
    // the signed triangle area.
    let ax = flat_x.x - v0.x;
    let bx = flat_x.y - v0.x;
    let cx = v0.x - p.x;
    let ay = flat_y.x - v0.y;
    let by = flat_y.y - v0.y;
    let cy = v0.y - p.y;

    let ux = bx * cy - cx * by;
    let uy = cx * ay - ax * cy;
    let uz = ax * by - bx * ay;

    if uz.abs() < f32::EPSILON {
        return false;
    }

    let ux = ux / uz;
    let uy = uy / uz;
    *bc = Vec4::new(1.0 - (ux + uy), uy, ux, 0.0);
    bc.x >= 0.0 && bc.y >= 0.0 && bc.z >= 0.0
}

/// SSE evaluation of [`barycentric`], one shuffle-based cross product.
#[cfg(target_arch = "x86_64")]
unsafe fn barycentric_sse(flat_x: Vec4, flat_y: Vec4, p: Vec2, bc: &mut Vec4) -> bool {
    use std::arch::x86_64::*;

    let v0 = Vec2::new(flat_x.z, flat_y.z);

    let vec0 = _mm_sub_ps(
        _mm_loadu_ps(&flat_x.x),
        _mm_set_ps(0.0, p.x, v0.x, v0.x),
    );
    let vec1 = _mm_sub_ps(
        _mm_loadu_ps(&flat_y.x),
        _mm_set_ps(0.0, p.y, v0.y, v0.y),
    );

    // u = vec0.yzx * vec1.zxy - (vec0.yzx * vec1).yzx
    let tmp0 = _mm_shuffle_ps::<0xC9>(vec0, vec0); // yzxw
    let tmp1 = _mm_shuffle_ps::<0xD2>(vec1, vec1); // zxyw
    let tmp2 = _mm_mul_ps(tmp0, vec1);
    let tmp3 = _mm_shuffle_ps::<0xC9>(tmp2, tmp2);
    let u = _mm_sub_ps(_mm_mul_ps(tmp0, tmp1), tmp3);

    let mut lanes = [0.0f32; 4];
    _mm_storeu_ps(lanes.as_mut_ptr(), u);

    if lanes[2].abs() < f32::EPSILON {
        return false;
    }

    let ux = lanes[0] / lanes[2];
    let uy = lanes[1] / lanes[2];
    *bc = Vec4::new(1.0 - (ux + uy), uy, ux, 0.0);
    bc.x >= 0.0 && bc.y >= 0.0 && bc.z >= 0.0
}

/// Weighted sum of three attribute arrays: `out[i] = Σ λ_k · v_k[i]`.
///
/// Takes the SIMD path when available and all four arrays are 32-byte
/// aligned (always true for varying-arena slots).
pub fn interpolate_barycentric(out: &mut [f32], v0: &[f32], v1: &[f32], v2: &[f32], bc: Vec4) {
    let count = out.len().min(v0.len()).min(v1.len()).min(v2.len());

    #[cfg(target_arch = "x86_64")]
    {
        let aligned = (out.as_ptr() as usize) % VARYING_ALIGNMENT == 0
            && (v0.as_ptr() as usize) % VARYING_ALIGNMENT == 0
            && (v1.as_ptr() as usize) % VARYING_ALIGNMENT == 0
            && (v2.as_ptr() as usize) % VARYING_ALIGNMENT == 0;
        if aligned && avx2_fma_available() {
            unsafe {
                x86::interpolate_barycentric_fma(
                    out.as_mut_ptr(),
                    v0.as_ptr(),
                    v1.as_ptr(),
                    v2.as_ptr(),
                    count,
                    [bc.x, bc.y, bc.z],
                );
            }
            return;
        }
    }

    interpolate_barycentric_scalar(&mut out[..count], v0, v1, v2, bc);
}

/// Portable implementation of [`interpolate_barycentric`].
pub fn interpolate_barycentric_scalar(
    out: &mut [f32],
    v0: &[f32],
    v1: &[f32],
    v2: &[f32],
    bc: Vec4,
) {
    for (i, o) in out.iter_mut().enumerate() {
        *o = v0[i] * bc.x + v1[i] * bc.y + v2[i] * bc.z;
    }
}

/// Runtime check for the AVX2+FMA interpolation kernel.
#[cfg(target_arch = "x86_64")]
fn avx2_fma_available() -> bool {
    use std::sync::OnceLock;
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        std::arch::is_x86_feature_detected!("avx2") && std::arch::is_x86_feature_detected!("fma")
    })
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::*;

    /// 8-wide FMA weighted sum with a 4-wide and scalar tail.
    ///
    /// # Safety
    ///
    /// All pointers must be 32-byte aligned and valid for `count` floats
    /// rounded up to the lane width actually read (never past the aligned
    /// slot the arena allocated). AVX2 and FMA must be available.
    #[target_feature(enable = "avx2,fma")]
    pub unsafe fn interpolate_barycentric_fma(
        out: *mut f32,
        v0: *const f32,
        v1: *const f32,
        v2: *const f32,
        count: usize,
        bc: [f32; 3],
    ) {
        let mut idx = 0;

        let avx_end = count & !7;
        if avx_end > 0 {
            let b0 = _mm256_set1_ps(bc[0]);
            let b1 = _mm256_set1_ps(bc[1]);
            let b2 = _mm256_set1_ps(bc[2]);
            while idx < avx_end {
                let mut sum = _mm256_mul_ps(_mm256_load_ps(v0.add(idx)), b0);
                sum = _mm256_fmadd_ps(_mm256_load_ps(v1.add(idx)), b1, sum);
                sum = _mm256_fmadd_ps(_mm256_load_ps(v2.add(idx)), b2, sum);
                _mm256_store_ps(out.add(idx), sum);
                idx += 8;
            }
        }

        let sse_end = idx + ((count - idx) & !3);
        if sse_end > idx {
            let b0 = _mm_set1_ps(bc[0]);
            let b1 = _mm_set1_ps(bc[1]);
            let b2 = _mm_set1_ps(bc[2]);
            while idx < sse_end {
                let mut sum = _mm_mul_ps(_mm_load_ps(v0.add(idx)), b0);
                sum = _mm_fmadd_ps(_mm_load_ps(v1.add(idx)), b1, sum);
                sum = _mm_fmadd_ps(_mm_load_ps(v2.add(idx)), b2, sum);
                _mm_store_ps(out.add(idx), sum);
                idx += 4;
            }
        }

        while idx < count {
            *out.add(idx) = *v0.add(idx) * bc[0] + *v1.add(idx) * bc[1] + *v2.add(idx) * bc[2];
            idx += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::VaryingArena;

    #[test]
    fn test_interpolate_linear_endpoints() {
        let a = [0.0, 10.0, -4.0];
        let b = [1.0, 20.0, 4.0];
        let mut out = [0.0; 3];
        interpolate_linear(&mut out, &a, &b, 0.0);
        assert_eq!(out, a);
        interpolate_linear(&mut out, &a, &b, 1.0);
        assert_eq!(out, b);
        interpolate_linear(&mut out, &a, &b, 0.5);
        assert_eq!(out, [0.5, 15.0, 0.0]);
    }

    fn flat(v0: Vec2, v1: Vec2, v2: Vec2) -> (Vec4, Vec4) {
        (
            Vec4::new(v2.x, v1.x, v0.x, 0.0),
            Vec4::new(v2.y, v1.y, v0.y, 0.0),
        )
    }

    #[test]
    fn test_barycentric_weights() {
        let v0 = Vec2::new(0.0, 0.0);
        let v1 = Vec2::new(4.0, 0.0);
        let v2 = Vec2::new(0.0, 4.0);
        let (fx, fy) = flat(v0, v1, v2);

        let mut bc = Vec4::ZERO;
        assert!(barycentric(fx, fy, Vec2::new(1.0, 1.0), &mut bc));
        assert!((bc.x - 0.5).abs() < 1e-6);
        assert!((bc.y - 0.25).abs() < 1e-6);
        assert!((bc.z - 0.25).abs() < 1e-6);

        // At a vertex, the weights collapse onto that vertex.
        assert!(barycentric(fx, fy, v0, &mut bc));
        assert!((bc.x - 1.0).abs() < 1e-6);

        // Outside the triangle at least one weight is negative.
        assert!(!barycentric(fx, fy, Vec2::new(-1.0, 1.0), &mut bc));
        assert!(bc.x < 0.0 || bc.y < 0.0 || bc.z < 0.0);
    }

    #[test]
    fn test_barycentric_degenerate() {
        // All three vertices on a line: zero area.
        let (fx, fy) = flat(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
        );
        let mut bc = Vec4::new(9.0, 9.0, 9.0, 9.0);
        assert!(!barycentric(fx, fy, Vec2::new(0.5, 0.5), &mut bc));
        // A degenerate triangle leaves the output untouched.
        assert_eq!(bc, Vec4::new(9.0, 9.0, 9.0, 9.0));
    }

    #[test]
    fn test_barycentric_matches_scalar() {
        let (fx, fy) = flat(
            Vec2::new(2.5, 1.0),
            Vec2::new(9.0, 3.5),
            Vec2::new(4.0, 8.0),
        );
        for y in 0..10 {
            for x in 0..10 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let mut a = Vec4::ZERO;
                let mut b = Vec4::ZERO;
                let ia = barycentric(fx, fy, p, &mut a);
                let ib = barycentric_scalar(fx, fy, p, &mut b);
                assert_eq!(ia, ib, "at {p:?}");
                for k in 0..3 {
                    assert!((a[k] - b[k]).abs() < 1e-5, "at {p:?} lane {k}");
                }
            }
        }
    }

    #[test]
    fn test_interpolate_barycentric_matches_scalar() {
        // 19 floats exercises the 8-wide, 4-wide, and scalar tails.
        let floats = 19;
        let mut arena = VaryingArena::new(floats, 4);
        for slot in 0..3 {
            for i in 0..floats {
                arena.slot_mut(slot)[i] = (slot * 100 + i * 7) as f32 * 0.125;
            }
        }
        let bc = Vec4::new(0.2, 0.3, 0.5, 0.0);

        let mut expected = vec![0.0; floats];
        interpolate_barycentric_scalar(
            &mut expected,
            arena.slot(0),
            arena.slot(1),
            arena.slot(2),
            bc,
        );

        // A second arena keeps every pointer 32-byte aligned while the
        // source slots stay borrowed, so the SIMD path is actually taken
        // when the host supports it.
        let mut out = VaryingArena::new(floats, 1);
        interpolate_barycentric(
            out.slot_mut(0),
            arena.slot(0),
            arena.slot(1),
            arena.slot(2),
            bc,
        );

        for i in 0..floats {
            assert!(
                (out.slot(0)[i] - expected[i]).abs() < 1e-4,
                "element {i}: {} vs {}",
                out.slot(0)[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_weights_partition_unity() {
        use approx::assert_relative_eq;

        let (fx, fy) = flat(
            Vec2::new(0.0, 0.0),
            Vec2::new(7.0, 1.0),
            Vec2::new(3.0, 6.0),
        );
        let mut bc = Vec4::ZERO;
        assert!(barycentric(fx, fy, Vec2::new(3.0, 2.0), &mut bc));
        assert_relative_eq!(bc.x + bc.y + bc.z, 1.0, epsilon = 1e-6);
    }
}
