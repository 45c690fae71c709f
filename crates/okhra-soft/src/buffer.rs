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

//! A 2-D texel grid with a pluggable storage layout.
//!
//! The layout affects address computation only: `get(x, y)` after a
//! matching `set(x, y, v)` returns `v` on every layout. Tiled and Morton
//! layouts pad the internal storage up to whole blocks.
//!
//! During rasterization each 32x32 screen block is owned by exactly one
//! worker task, so the raster stage writes through [`Buffer::set_shared`]
//! without locks. Everything outside that stage uses the ordinary
//! `&mut`-based API.

use std::cell::UnsafeCell;

/// The block edge of the tiled layout.
const TILE_SIZE: u32 = 4;
/// The block edge of the Morton layout.
const MORTON_BLOCK_SIZE: u32 = 32;

/// How a [`Buffer`] arranges texels in memory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferLayout {
    /// Row-major storage.
    #[default]
    Linear,
    /// 4x4 blocks, row-major inside each block.
    Tiled,
    /// 32x32 blocks with Morton (Z-order) addressing inside each block.
    Morton,
}

/// A width x height grid of texels.
pub struct Buffer<T> {
    width: u32,
    height: u32,
    // Storage dims, padded up to whole blocks for Tiled/Morton.
    inner_width: u32,
    layout: BufferLayout,
    data: UnsafeCell<Box<[T]>>,
}

// The `UnsafeCell` is only written through `set_shared`, whose contract
// confines concurrent writers to disjoint texels.
unsafe impl<T: Send> Send for Buffer<T> {}
unsafe impl<T: Send + Sync> Sync for Buffer<T> {}

/// Interleaves the low 5 bits of `x` and `y` (y into the odd bits).
#[inline]
fn morton_interleave(x: u32, y: u32) -> u32 {
    let mut out = 0;
    for bit in 0..5 {
        out |= ((x >> bit) & 1) << (2 * bit);
        out |= ((y >> bit) & 1) << (2 * bit + 1);
    }
    out
}

#[inline]
fn round_up(v: u32, block: u32) -> u32 {
    v.div_ceil(block) * block
}

impl<T: Copy + Default> Buffer<T> {
    /// Creates a zero-initialized buffer with the default (linear) layout.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_layout(width, height, BufferLayout::Linear)
    }

    /// Creates a zero-initialized buffer with an explicit layout.
    pub fn with_layout(width: u32, height: u32, layout: BufferLayout) -> Self {
        let (inner_width, inner_height) = match layout {
            BufferLayout::Linear => (width, height),
            BufferLayout::Tiled => (round_up(width, TILE_SIZE), round_up(height, TILE_SIZE)),
            BufferLayout::Morton => (
                round_up(width, MORTON_BLOCK_SIZE),
                round_up(height, MORTON_BLOCK_SIZE),
            ),
        };
        let len = inner_width as usize * inner_height as usize;
        Self {
            width,
            height,
            inner_width,
            layout,
            data: UnsafeCell::new(vec![T::default(); len].into_boxed_slice()),
        }
    }

    /// Creates a linear buffer initialized from row-major texel data.
    ///
    /// Returns `None` when `texels.len() != width * height`.
    pub fn from_texels(width: u32, height: u32, texels: Vec<T>) -> Option<Self> {
        if texels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            inner_width: width,
            layout: BufferLayout::Linear,
            data: UnsafeCell::new(texels.into_boxed_slice()),
        })
    }
}

impl<T: Copy> Buffer<T> {
    /// Width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The storage layout.
    #[inline]
    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        match self.layout {
            BufferLayout::Linear => (y * self.inner_width + x) as usize,
            BufferLayout::Tiled => {
                let blocks_per_row = self.inner_width / TILE_SIZE;
                let block = (y / TILE_SIZE) * blocks_per_row + x / TILE_SIZE;
                let inner = (y % TILE_SIZE) * TILE_SIZE + x % TILE_SIZE;
                (block * TILE_SIZE * TILE_SIZE + inner) as usize
            }
            BufferLayout::Morton => {
                let blocks_per_row = self.inner_width / MORTON_BLOCK_SIZE;
                let block = (y / MORTON_BLOCK_SIZE) * blocks_per_row + x / MORTON_BLOCK_SIZE;
                let inner = morton_interleave(x % MORTON_BLOCK_SIZE, y % MORTON_BLOCK_SIZE);
                (block * MORTON_BLOCK_SIZE * MORTON_BLOCK_SIZE + inner) as usize
            }
        }
    }

    /// Reads the texel at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        // No concurrent writer may target this texel (see `set_shared`).
        unsafe { Some((*self.data.get())[idx]) }
    }

    /// Writes the texel at `(x, y)`; out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.data.get_mut()[idx] = value;
    }

    /// Fills every texel (including layout padding) with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.get_mut().fill(value);
    }

    /// Writes a texel through a shared reference.
    ///
    /// # Safety
    ///
    /// Callers must confine concurrent writers to disjoint texels: the
    /// rasterizer assigns each triangle's screen blocks to single tasks
    /// and overlapping geometry within one draw must be ordered by the
    /// depth test, per the draw API's per-pixel ordering contract.
    #[inline]
    pub unsafe fn set_shared(&self, x: u32, y: u32, value: T) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        (*self.data.get())[idx] = value;
    }

    /// Fills every texel through a shared reference.
    ///
    /// # Safety
    ///
    /// The caller must have exclusive logical access to the buffer (no
    /// raster tasks in flight).
    pub unsafe fn fill_shared(&self, value: T) {
        (*self.data.get()).fill(value);
    }

    /// Borrows the raw storage.
    ///
    /// For non-linear layouts this is the block-ordered storage including
    /// padding; use [`Buffer::get`] for positional access.
    pub fn as_slice(&self) -> &[T] {
        // Sound for the same reason as `get`.
        unsafe { &*self.data.get() }
    }
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUTS: [BufferLayout; 3] = [
        BufferLayout::Linear,
        BufferLayout::Tiled,
        BufferLayout::Morton,
    ];

    #[test]
    fn test_set_get_roundtrip_all_layouts() {
        for layout in LAYOUTS {
            let mut buf: Buffer<u32> = Buffer::with_layout(37, 21, layout);
            for y in 0..21 {
                for x in 0..37 {
                    buf.set(x, y, y * 1000 + x);
                }
            }
            for y in 0..21 {
                for x in 0..37 {
                    assert_eq!(buf.get(x, y), Some(y * 1000 + x), "{layout:?} ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_out_of_bounds() {
        for layout in LAYOUTS {
            let mut buf: Buffer<u8> = Buffer::with_layout(8, 8, layout);
            buf.set(8, 0, 7);
            buf.set(0, 8, 7);
            assert_eq!(buf.get(8, 0), None);
            assert_eq!(buf.get(0, 8), None);
            assert_eq!(buf.get(7, 7), Some(0));
        }
    }

    #[test]
    fn test_fill() {
        let mut buf: Buffer<u16> = Buffer::with_layout(5, 3, BufferLayout::Tiled);
        buf.fill(42);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(buf.get(x, y), Some(42));
            }
        }
    }

    #[test]
    fn test_morton_interleave() {
        assert_eq!(morton_interleave(0, 0), 0);
        assert_eq!(morton_interleave(1, 0), 1);
        assert_eq!(morton_interleave(0, 1), 2);
        assert_eq!(morton_interleave(1, 1), 3);
        assert_eq!(morton_interleave(2, 2), 12);
        assert_eq!(morton_interleave(31, 31), 1023);
    }

    #[test]
    fn test_distinct_addresses_per_layout() {
        // Every (x, y) must map to a unique storage index.
        for layout in LAYOUTS {
            let buf: Buffer<u8> = Buffer::with_layout(33, 17, layout);
            let mut seen = std::collections::HashSet::new();
            for y in 0..17 {
                for x in 0..33 {
                    assert!(seen.insert(buf.index(x, y)), "{layout:?} ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_from_texels_requires_exact_len() {
        assert!(Buffer::from_texels(2, 2, vec![1u8; 4]).is_some());
        assert!(Buffer::from_texels(2, 2, vec![1u8; 3]).is_none());
    }
}
