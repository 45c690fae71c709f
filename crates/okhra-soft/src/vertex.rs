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

//! Vertex array objects and the per-draw working records.

use okhra_core::math::Vec4;
use okhra_core::renderer::VertexArray;

/// Byte alignment of every varying slot.
///
/// The AVX interpolation path loads 32-byte lanes, so slots are allocated
/// in [`AlignedBlock`] units and the alignment holds by construction.
pub const VARYING_ALIGNMENT: usize = 32;

/// Floats per [`AlignedBlock`].
const BLOCK_FLOATS: usize = VARYING_ALIGNMENT / std::mem::size_of::<f32>();

/// A 32-byte-aligned group of eight floats.
#[derive(Debug, Default, Clone, Copy)]
#[repr(C, align(32))]
pub struct AlignedBlock(pub [f32; BLOCK_FLOATS]);

// Eight f32s fill the struct exactly, so there is no padding.
unsafe impl bytemuck::Zeroable for AlignedBlock {}
unsafe impl bytemuck::Pod for AlignedBlock {}

/// A growable arena of equally sized, 32-byte-aligned varying slots.
pub struct VaryingArena {
    blocks: Vec<AlignedBlock>,
    blocks_per_slot: usize,
    floats: usize,
}

impl VaryingArena {
    /// Creates an arena whose slots hold `floats` varyings each, rounded
    /// up to whole aligned blocks, with `slots` slots preallocated.
    pub fn new(floats: usize, slots: usize) -> Self {
        let blocks_per_slot = floats.div_ceil(BLOCK_FLOATS);
        Self {
            blocks: vec![AlignedBlock::default(); blocks_per_slot * slots],
            blocks_per_slot,
            floats,
        }
    }

    /// The varying float count per slot (the shader-declared size).
    #[inline]
    pub fn floats(&self) -> usize {
        self.floats
    }

    /// The number of slots currently allocated.
    pub fn slot_count(&self) -> usize {
        if self.blocks_per_slot == 0 {
            0
        } else {
            self.blocks.len() / self.blocks_per_slot
        }
    }

    /// Appends a zeroed slot and returns its index.
    pub fn push_slot(&mut self) -> usize {
        let index = self.slot_count();
        self.blocks
            .extend(std::iter::repeat_n(AlignedBlock::default(), self.blocks_per_slot));
        index
    }

    /// Borrows a slot. The slice is empty when the shader declares no
    /// varyings.
    #[inline]
    pub fn slot(&self, index: usize) -> &[f32] {
        let start = index * self.blocks_per_slot;
        let blocks = &self.blocks[start..start + self.blocks_per_slot];
        &bytemuck::cast_slice(blocks)[..self.floats]
    }

    /// Borrows a slot mutably.
    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> &mut [f32] {
        let start = index * self.blocks_per_slot;
        let floats = self.floats;
        let blocks = &mut self.blocks[start..start + self.blocks_per_slot];
        &mut bytemuck::cast_slice_mut(blocks)[..floats]
    }
}

/// A vertex array object: a private copy of the caller's interleaved
/// vertex bytes and index buffer.
#[derive(Debug, Default)]
pub struct VertexArrayObject {
    /// Bytes per vertex.
    pub vertex_stride: usize,
    /// Number of vertices in the buffer.
    pub vertex_count: usize,
    /// The interleaved vertex bytes.
    pub vertex_bytes: Vec<u8>,
    /// The 32-bit index stream.
    pub indices: Vec<i32>,
}

impl VertexArrayObject {
    /// Copies the caller's buffers. The stride comes from attribute 0.
    pub fn new(vertex_array: &VertexArray) -> Self {
        let vertex_stride = vertex_array
            .attributes
            .first()
            .map_or(vertex_array.vertex_size, |a| a.stride);
        let vertex_count = if vertex_stride == 0 {
            0
        } else {
            vertex_array.vertex_bytes.len() / vertex_stride
        };
        Self {
            vertex_stride,
            vertex_count,
            vertex_bytes: vertex_array.vertex_bytes.to_vec(),
            indices: vertex_array.indices.to_vec(),
        }
    }

    /// Overwrites the vertex bytes in place, truncating to the original
    /// allocation if `data` is longer.
    pub fn update_vertex_data(&mut self, data: &[u8]) {
        let len = data.len().min(self.vertex_bytes.len());
        self.vertex_bytes[..len].copy_from_slice(&data[..len]);
    }

    /// The raw bytes of vertex `index`.
    #[inline]
    pub fn vertex(&self, index: usize) -> &[u8] {
        let start = index * self.vertex_stride;
        &self.vertex_bytes[start..start + self.vertex_stride]
    }
}

/// Where a working vertex's attribute bytes live.
#[derive(Debug, Clone)]
pub enum VertexBytes {
    /// A vertex of the bound VAO, by index.
    Vao(usize),
    /// A vertex synthesized during clipping.
    Owned(Box<[u8]>),
}

/// The per-input-vertex working record of a draw call.
///
/// Created by vertex processing, reused through face culling; clipping
/// appends new entries with owned attribute bytes.
#[derive(Debug, Clone)]
pub struct VertexHolder {
    /// This vertex's index in the working list.
    pub index: usize,
    /// The source of the raw attribute bytes.
    pub bytes: VertexBytes,
    /// Index of the varying slot in the draw's [`VaryingArena`].
    pub varying_slot: usize,
    /// Clip-space position written by the vertex shader.
    pub clip_pos: Vec4,
    /// Window-space position after perspective divide and viewport
    /// transform (`w` holds `1 / clip_w`).
    pub frag_pos: Vec4,
    /// Which frustum planes this vertex violates.
    pub clip_mask: u8,
    /// Whether the vertex is excluded from later stages.
    pub discard: bool,
}

impl VertexHolder {
    /// Resolves the attribute bytes against the bound VAO.
    #[inline]
    pub fn resolve_bytes<'a>(&'a self, vao: &'a VertexArrayObject) -> &'a [u8] {
        match &self.bytes {
            VertexBytes::Vao(index) => vao.vertex(*index),
            VertexBytes::Owned(bytes) => bytes,
        }
    }
}

/// One assembled primitive: up to three indices into the vertex working
/// list.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveHolder {
    /// Indices into the draw's `Vec<VertexHolder>`; points use one, lines
    /// two, triangles three.
    pub indices: [usize; 3],
    /// Whether the primitive is excluded from rasterization.
    pub discard: bool,
    /// Winding classification from the face-culling stage.
    pub front_facing: bool,
}

impl PrimitiveHolder {
    /// Creates a live primitive from its indices.
    pub fn new(indices: [usize; 3]) -> Self {
        Self {
            indices,
            discard: false,
            front_facing: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okhra_core::renderer::VertexAttributeDesc;

    #[test]
    fn test_varying_arena_alignment() {
        let mut arena = VaryingArena::new(5, 3);
        assert_eq!(arena.slot_count(), 3);
        for i in 0..3 {
            let slot = arena.slot_mut(i);
            assert_eq!(slot.len(), 5);
            slot.fill(i as f32);
            assert_eq!(slot.as_ptr() as usize % VARYING_ALIGNMENT, 0);
        }
        assert_eq!(arena.slot(2), &[2.0; 5]);
    }

    #[test]
    fn test_varying_arena_push_slot() {
        let mut arena = VaryingArena::new(9, 1);
        let s = arena.push_slot();
        assert_eq!(s, 1);
        assert_eq!(arena.slot_count(), 2);
        arena.slot_mut(s).fill(7.0);
        assert_eq!(arena.slot(0), &[0.0; 9]);
        assert_eq!(arena.slot(1), &[7.0; 9]);
    }

    #[test]
    fn test_vao_copies_and_strides() {
        let vertices: Vec<f32> = vec![
            0.0, 1.0, 2.0, // v0
            3.0, 4.0, 5.0, // v1
        ];
        let indices = vec![0, 1];
        let attributes = [VertexAttributeDesc {
            component_count: 3,
            stride: 12,
            offset: 0,
        }];
        let vao = VertexArrayObject::new(&VertexArray {
            vertex_size: 12,
            attributes: &attributes,
            vertex_bytes: bytemuck::cast_slice(&vertices),
            indices: &indices,
        });
        assert_eq!(vao.vertex_count, 2);
        assert_eq!(vao.vertex_stride, 12);
        // A Vec<u8> copy gives no alignment guarantee, so compare bytes.
        let expected: &[u8] = bytemuck::cast_slice(&vertices[3..6]);
        assert_eq!(vao.vertex(1), expected);
    }

    #[test]
    fn test_vao_update_truncates() {
        let bytes = vec![0u8; 8];
        let vao_src = VertexArray {
            vertex_size: 4,
            attributes: &[],
            vertex_bytes: &bytes,
            indices: &[],
        };
        let mut vao = VertexArrayObject::new(&vao_src);
        vao.update_vertex_data(&[1u8; 16]);
        assert_eq!(vao.vertex_bytes, vec![1u8; 8]);
    }
}
