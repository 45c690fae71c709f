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

//! Uniform binding objects.
//!
//! A [`UniformBlock`] is an opaque byte buffer copied into a program's
//! uniform memory at the offset its descriptor reports. A
//! [`UniformSampler`] binds a texture *handle*; the renderer resolves it
//! through its texture arena when the bindings are applied. Each object
//! carries a monotone id that programs use to cache name-to-location
//! resolution.

use log::error;
use okhra_core::renderer::{TextureFormat, TextureId, TextureKind};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_BLOCK_ID: AtomicU32 = AtomicU32::new(1);
static NEXT_SAMPLER_ID: AtomicU32 = AtomicU32::new(1);

/// A named, fixed-size byte buffer backing one shader uniform block.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    id: u32,
    name: String,
    data: Vec<u8>,
}

impl UniformBlock {
    /// Creates a zeroed block.
    pub fn new(name: &str, size: usize) -> Self {
        Self {
            id: NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_owned(),
            data: vec![0; size],
        }
    }

    /// The binding name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id used for location caching.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The current contents.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Copies `data` to the start of the block.
    pub fn set_data(&mut self, data: &[u8]) {
        self.set_sub_data(data, 0);
    }

    /// Copies `data` into the block at `offset`; the copy is clipped to
    /// the block size (with an error log) rather than growing it.
    pub fn set_sub_data(&mut self, data: &[u8], offset: usize) {
        if offset >= self.data.len() {
            error!(
                "uniform block '{}': offset {offset} outside {} bytes",
                self.name,
                self.data.len()
            );
            return;
        }
        let end = (offset + data.len()).min(self.data.len());
        if end - offset < data.len() {
            error!(
                "uniform block '{}': write of {} bytes at {offset} clipped",
                self.name,
                data.len()
            );
        }
        self.data[offset..end].copy_from_slice(&data[..end - offset]);
    }

    /// Convenience: copies a `Pod` value to the start of the block.
    pub fn set_value<T: bytemuck::NoUninit>(&mut self, value: &T) {
        self.set_data(bytemuck::bytes_of(value));
    }
}

/// A named sampler binding: texture kind/format plus a texture handle.
#[derive(Debug, Clone)]
pub struct UniformSampler {
    id: u32,
    name: String,
    kind: TextureKind,
    format: TextureFormat,
    texture: Option<TextureId>,
}

impl UniformSampler {
    /// Creates an unbound sampler uniform.
    pub fn new(name: &str, kind: TextureKind, format: TextureFormat) -> Self {
        Self {
            id: NEXT_SAMPLER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_owned(),
            kind,
            format,
            texture: None,
        }
    }

    /// The binding name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id used for location caching.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The declared texture kind.
    #[inline]
    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    /// The declared texel format.
    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Binds a texture handle.
    pub fn set_texture(&mut self, texture: TextureId) {
        self.texture = Some(texture);
    }

    /// The bound handle, if any.
    #[inline]
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }
}

/// The complete uniform binding set for a draw: block and sampler
/// uniforms addressed by name.
#[derive(Debug, Default, Clone)]
pub struct ShaderBindings {
    blocks: Vec<UniformBlock>,
    samplers: Vec<UniformSampler>,
}

impl ShaderBindings {
    /// Creates an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces, by name) a uniform block.
    pub fn add_block(&mut self, block: UniformBlock) {
        if let Some(existing) = self.blocks.iter_mut().find(|b| b.name() == block.name()) {
            *existing = block;
        } else {
            self.blocks.push(block);
        }
    }

    /// Adds (or replaces, by name) a sampler uniform.
    pub fn add_sampler(&mut self, sampler: UniformSampler) {
        if let Some(existing) = self
            .samplers
            .iter_mut()
            .find(|s| s.name() == sampler.name())
        {
            *existing = sampler;
        } else {
            self.samplers.push(sampler);
        }
    }

    /// All blocks.
    #[inline]
    pub fn blocks(&self) -> &[UniformBlock] {
        &self.blocks
    }

    /// All samplers.
    #[inline]
    pub fn samplers(&self) -> &[UniformSampler] {
        &self.samplers
    }

    /// Mutable access to a block by name.
    pub fn block_mut(&mut self, name: &str) -> Option<&mut UniformBlock> {
        self.blocks.iter_mut().find(|b| b.name() == name)
    }

    /// Mutable access to a sampler by name.
    pub fn sampler_mut(&mut self, name: &str) -> Option<&mut UniformSampler> {
        self.samplers.iter_mut().find(|s| s.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sub_data() {
        let mut block = UniformBlock::new("Params", 8);
        block.set_sub_data(&[1, 2, 3, 4], 2);
        assert_eq!(block.data(), &[0, 0, 1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_block_write_clipped() {
        let mut block = UniformBlock::new("Params", 4);
        block.set_sub_data(&[9; 8], 2);
        assert_eq!(block.data(), &[0, 0, 9, 9]);
        block.set_sub_data(&[7; 2], 8);
        assert_eq!(block.data(), &[0, 0, 9, 9]);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = UniformBlock::new("A", 4);
        let b = UniformBlock::new("B", 4);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_bindings_replace_by_name() {
        let mut bindings = ShaderBindings::new();
        let mut first = UniformBlock::new("Params", 4);
        first.set_data(&[1, 1, 1, 1]);
        bindings.add_block(first);

        let mut second = UniformBlock::new("Params", 4);
        second.set_data(&[2, 2, 2, 2]);
        bindings.add_block(second);

        assert_eq!(bindings.blocks().len(), 1);
        assert_eq!(bindings.blocks()[0].data(), &[2, 2, 2, 2]);
    }
}
