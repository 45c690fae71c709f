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

//! Small geometric helper types.

use super::vector::Vec2;

/// A 2-D axis-aligned bounding box in screen space.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Aabb2 {
    /// The minimum corner.
    pub min: Vec2,
    /// The maximum corner.
    pub max: Vec2,
}

impl Aabb2 {
    /// Creates a bounding box from explicit corners.
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Returns the smallest box containing the three points.
    pub fn from_triangle(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y)),
            max: Vec2::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y)),
        }
    }

    /// Width of the box (may be negative if the box is inverted).
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the box (may be negative if the box is inverted).
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triangle_bounds() {
        let b = Aabb2::from_triangle(
            Vec2::new(1.0, 5.0),
            Vec2::new(-2.0, 0.0),
            Vec2::new(4.0, 3.0),
        );
        assert_eq!(b.min, Vec2::new(-2.0, 0.0));
        assert_eq!(b.max, Vec2::new(4.0, 5.0));
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 5.0);
    }
}
