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

//! Provides the foundational mathematics primitives for the rasterizer.
//!
//! This module contains the vector, matrix, and color types that flow
//! through every pipeline stage, plus a handful of scalar helpers. All
//! angular functions operate in **radians**.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

// Re-export standard mathematical constants for convenience.
pub use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

// --- Declare Sub-Modules ---

pub mod color;
pub mod geometry;
pub mod matrix;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::color::{LinearRgba, Rgba8};
pub use self::geometry::Aabb2;
pub use self::matrix::{Mat3, Mat4};
pub use self::vector::{Vec2, Vec3, Vec4};

// --- Utility Functions ---

/// Returns `true` if `a` and `b` are within [`EPSILON`] of each other.
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Linearly interpolates between `a` and `b` by factor `t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Returns the fractional part of `x` (GLSL `fract`, always in `[0, 1)`).
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}
