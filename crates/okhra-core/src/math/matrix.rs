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

//! Provides column-major 3x3 and 4x4 matrix types.
//!
//! Matrices are stored as arrays of column vectors, so `m * v` follows the
//! usual GLSL convention and the raw float layout can be handed to shader
//! uniform blocks unchanged.

use super::vector::{Vec3, Vec4};
use std::ops::Mul;

// --- Mat3 ---

/// A 3x3 column-major matrix with `f32` components.
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat3 {
    /// The columns of the matrix.
    pub cols: [Vec3; 3],
}

impl Mat3 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// Creates a matrix from three column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    /// Extracts the upper-left 3x3 block of a [`Mat4`].
    #[inline]
    pub fn from_mat4(m: Mat4) -> Self {
        Self::from_cols(m.cols[0].xyz(), m.cols[1].xyz(), m.cols[2].xyz())
    }

    /// Returns the transpose of the matrix.
    pub fn transpose(self) -> Self {
        let [a, b, c] = self.cols;
        Self::from_cols(
            Vec3::new(a.x, b.x, c.x),
            Vec3::new(a.y, b.y, c.y),
            Vec3::new(a.z, b.z, c.z),
        )
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            cols: [self * rhs.cols[0], self * rhs.cols[1], self * rhs.cols[2]],
        }
    }
}

// --- Mat4 ---

/// A 4x4 column-major matrix with `f32` components.
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ],
    };

    /// Creates a matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Creates a translation matrix.
    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = Vec4::new(t.x, t.y, t.z, 1.0);
        m
    }

    /// Creates a uniform or non-uniform scale matrix.
    pub fn from_scale(s: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(s.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, s.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, s.z, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    /// Creates a rotation matrix around the X-axis by `angle` radians.
    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, c, s, 0.0),
            Vec4::new(0.0, -s, c, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    /// Creates a rotation matrix around the Y-axis by `angle` radians.
    pub fn from_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::new(c, 0.0, -s, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(s, 0.0, c, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    /// Creates a rotation matrix around the Z-axis by `angle` radians.
    pub fn from_rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::new(c, s, 0.0, 0.0),
            Vec4::new(-s, c, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    /// Creates a right-handed perspective projection with a `[-1, 1]` clip
    /// z range (the OpenGL convention the pipeline's clipper expects).
    ///
    /// `fov_y` is the vertical field of view in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        Self::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, (far + near) / (near - far), -1.0),
            Vec4::new(0.0, 0.0, (2.0 * far * near) / (near - far), 0.0),
        )
    }

    /// Creates a right-handed view matrix looking from `eye` towards
    /// `center`, with `up` defining the vertical.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        let f = (center - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);
        Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
        )
    }

    /// Returns the transpose of the matrix.
    pub fn transpose(self) -> Self {
        let [a, b, c, d] = self.cols;
        Self::from_cols(
            Vec4::new(a.x, b.x, c.x, d.x),
            Vec4::new(a.y, b.y, c.y, d.y),
            Vec4::new(a.z, b.z, c.z, d.z),
            Vec4::new(a.w, b.w, c.w, d.w),
        )
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

impl Mul for Mat4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            cols: [
                self * rhs.cols[0],
                self * rhs.cols[1],
                self * rhs.cols[2],
                self * rhs.cols[3],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, FRAC_PI_2};

    fn vec4_approx_eq(a: Vec4, b: Vec4) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z) && approx_eq(a.w, b.w)
    }

    #[test]
    fn test_mat4_identity_default() {
        assert_eq!(Mat4::default(), Mat4::IDENTITY);
        let v = Vec4::new(1.0, -2.0, 3.0, 1.0);
        assert_eq!(Mat4::IDENTITY * v, v);
    }

    #[test]
    fn test_mat4_translation() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let p = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(vec4_approx_eq(p, Vec4::new(1.0, 2.0, 3.0, 1.0)));

        // Directions (w = 0) are unaffected by translation.
        let d = m * Vec4::new(0.0, 1.0, 0.0, 0.0);
        assert!(vec4_approx_eq(d, Vec4::new(0.0, 1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_mat4_rotation_z_quarter_turn() {
        let m = Mat4::from_rotation_z(FRAC_PI_2);
        let p = m * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(vec4_approx_eq(p, Vec4::new(0.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_mat4_mul_associates_with_transform() {
        let t = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let r = Mat4::from_rotation_z(FRAC_PI_2);
        let v = Vec4::new(1.0, 0.0, 0.0, 1.0);
        // Rotate first, then translate.
        let composed = t * r;
        assert!(vec4_approx_eq(composed * v, t * (r * v)));
        assert!(vec4_approx_eq(composed * v, Vec4::new(5.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_mat4_transpose_involution() {
        let m = Mat4::perspective(1.0, 1.5, 0.1, 100.0);
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn test_perspective_maps_near_far() {
        use approx::assert_relative_eq;

        let near = 0.1;
        let far = 100.0;
        let m = Mat4::perspective(FRAC_PI_2, 1.0, near, far);

        let pn = m * Vec4::new(0.0, 0.0, -near, 1.0);
        assert_relative_eq!(pn.z / pn.w, -1.0, epsilon = 1e-5);

        let pf = m * Vec4::new(0.0, 0.0, -far, 1.0);
        assert_relative_eq!(pf.z / pf.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_centers_target() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let m = Mat4::look_at(eye, Vec3::ZERO, Vec3::Y);
        let p = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        // The target lies straight ahead on the -Z axis in view space.
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.y, 0.0));
        assert!(approx_eq(p.z, -5.0));
    }

    #[test]
    fn test_mat3_from_mat4_rotation() {
        let m = Mat3::from_mat4(Mat4::from_rotation_y(FRAC_PI_2));
        let v = m * Vec3::X;
        assert!(approx_eq(v.x, 0.0));
        assert!(approx_eq(v.z, -1.0));
    }
}
