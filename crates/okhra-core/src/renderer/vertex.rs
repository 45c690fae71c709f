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

//! Describes the memory layout of vertex and index data handed to a draw.

/// Describes a single float-typed vertex attribute within an interleaved
/// vertex buffer. Attribute 0 is the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeDesc {
    /// The number of `f32` components (1 to 4).
    pub component_count: u32,
    /// The byte distance between consecutive vertices.
    pub stride: usize,
    /// The byte offset of this attribute from the start of a vertex.
    pub offset: usize,
}

/// A borrowed view of interleaved vertex data plus a 32-bit index buffer.
///
/// The renderer copies both buffers when the vertex array object is
/// created and never mutates the caller's memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexArray<'a> {
    /// The byte size of one vertex (the interleave stride).
    pub vertex_size: usize,
    /// Per-attribute layout descriptions.
    pub attributes: &'a [VertexAttributeDesc],
    /// Tightly packed little-endian `f32` vertex bytes.
    pub vertex_bytes: &'a [u8],
    /// Tightly packed little-endian `i32` indices into the vertex buffer.
    pub indices: &'a [i32],
}
