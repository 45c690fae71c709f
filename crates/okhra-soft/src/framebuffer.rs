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

//! Framebuffer objects: named pairs of texture attachments.

use crate::texture::Texture;
use okhra_core::renderer::{Arena, CubeFace, TextureFormat, TextureId};

/// One attachment point: a texture handle plus the cube face ("layer")
/// and mip level rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    /// The attached texture.
    pub texture: TextureId,
    /// Cube face index; 0 for 2-D textures.
    pub layer: u32,
    /// Mip level rendered into.
    pub level: u32,
}

/// A render target: optional color and depth attachments.
#[derive(Debug, Default, Clone, Copy)]
pub struct Framebuffer {
    color: Option<Attachment>,
    depth: Option<Attachment>,
}

impl Framebuffer {
    /// Creates a framebuffer with no attachments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a 2-D color texture at a mip level.
    pub fn set_color_attachment(&mut self, texture: TextureId, level: u32) {
        self.color = Some(Attachment {
            texture,
            layer: 0,
            level,
        });
    }

    /// Attaches one face of a cubemap color texture at a mip level, the
    /// fully general form; the 2-D variant is face `+X` / layer 0.
    pub fn set_color_attachment_face(&mut self, texture: TextureId, face: CubeFace, level: u32) {
        self.color = Some(Attachment {
            texture,
            layer: face.index() as u32,
            level,
        });
    }

    /// Attaches a depth texture (level 0).
    pub fn set_depth_attachment(&mut self, texture: TextureId) {
        self.depth = Some(Attachment {
            texture,
            layer: 0,
            level: 0,
        });
    }

    /// The color attachment, if any.
    #[inline]
    pub fn color(&self) -> Option<Attachment> {
        self.color
    }

    /// The depth attachment, if any.
    #[inline]
    pub fn depth(&self) -> Option<Attachment> {
        self.depth
    }

    /// Completeness check: at least one attachment, every attachment
    /// resolves to a texture of the right format, and all present
    /// attachments agree on dimensions and sample count.
    pub fn is_valid(&self, textures: &Arena<TextureId, Texture>) -> bool {
        if self.color.is_none() && self.depth.is_none() {
            return false;
        }

        let mut dims: Option<(u32, u32, bool)> = None;
        if let Some(attachment) = self.color {
            let Some(texture) = textures.get(attachment.texture) else {
                return false;
            };
            if texture.desc.format != TextureFormat::Rgba8 {
                return false;
            }
            dims = Some((
                texture.desc.level_width(attachment.level),
                texture.desc.level_height(attachment.level),
                texture.desc.multi_sample,
            ));
        }
        if let Some(attachment) = self.depth {
            let Some(texture) = textures.get(attachment.texture) else {
                return false;
            };
            if texture.desc.format != TextureFormat::Float32 {
                return false;
            }
            let depth_dims = (
                texture.desc.level_width(attachment.level),
                texture.desc.level_height(attachment.level),
                texture.desc.multi_sample,
            );
            if let Some(color_dims) = dims {
                if color_dims != depth_dims {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okhra_core::renderer::{TextureDesc, TextureKind, TextureUsage};

    fn make_texture(
        textures: &mut Arena<TextureId, Texture>,
        format: TextureFormat,
        width: u32,
        multi_sample: bool,
    ) -> TextureId {
        let texture = Texture::new(TextureDesc {
            width,
            height: width,
            kind: TextureKind::TwoD,
            format,
            usage: TextureUsage::ATTACHMENT_COLOR | TextureUsage::ATTACHMENT_DEPTH,
            use_mipmaps: false,
            multi_sample,
        })
        .unwrap();
        textures.insert(texture)
    }

    #[test]
    fn test_empty_framebuffer_invalid() {
        let textures = Arena::new();
        assert!(!Framebuffer::new().is_valid(&textures));
    }

    #[test]
    fn test_color_only_valid() {
        let mut textures = Arena::new();
        let color = make_texture(&mut textures, TextureFormat::Rgba8, 8, false);
        let mut fb = Framebuffer::new();
        fb.set_color_attachment(color, 0);
        assert!(fb.is_valid(&textures));
    }

    #[test]
    fn test_dimension_mismatch_invalid() {
        let mut textures = Arena::new();
        let color = make_texture(&mut textures, TextureFormat::Rgba8, 8, false);
        let depth = make_texture(&mut textures, TextureFormat::Float32, 4, false);
        let mut fb = Framebuffer::new();
        fb.set_color_attachment(color, 0);
        fb.set_depth_attachment(depth);
        assert!(!fb.is_valid(&textures));
    }

    #[test]
    fn test_sample_count_mismatch_invalid() {
        let mut textures = Arena::new();
        let color = make_texture(&mut textures, TextureFormat::Rgba8, 8, true);
        let depth = make_texture(&mut textures, TextureFormat::Float32, 8, false);
        let mut fb = Framebuffer::new();
        fb.set_color_attachment(color, 0);
        fb.set_depth_attachment(depth);
        assert!(!fb.is_valid(&textures));
    }

    #[test]
    fn test_wrong_format_attachment_invalid() {
        let mut textures = Arena::new();
        let depth_as_color = make_texture(&mut textures, TextureFormat::Float32, 8, false);
        let mut fb = Framebuffer::new();
        fb.set_color_attachment(depth_as_color, 0);
        assert!(!fb.is_valid(&textures));
    }
}
