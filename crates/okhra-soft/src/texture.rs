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

//! Texture storage: mip chains, multisample planes, upload, and PNG dump.

use crate::buffer::Buffer;
use crate::error::SoftError;
use crate::sampler::{downsample_bilinear, Texel};
use log::error;
use okhra_core::math::Rgba8;
use okhra_core::renderer::{ResourceError, SamplerDesc, TextureDesc, TextureFormat, TextureKind};
use std::path::Path;
use std::sync::Arc;

/// The only supported multisample count.
pub const MSAA_SAMPLE_COUNT: u32 = 4;

/// One mip level's pixel storage: a single-sample plane or, for 4x
/// targets, a per-sample plane holding four values per texel.
///
/// On a multisample target the per-sample plane receives all writes; the
/// single-sample plane is created lazily by the MSAA resolve and holds the
/// resolved output.
pub struct ImageBuffer<T: Texel> {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// 1 or [`MSAA_SAMPLE_COUNT`].
    pub sample_count: u32,
    /// The single-sample (or resolved) plane.
    pub buffer: Option<Arc<Buffer<T>>>,
    /// The 4x per-sample plane.
    pub buffer_ms4: Option<Arc<Buffer<[T; 4]>>>,
}

impl<T: Texel> ImageBuffer<T> {
    /// Creates zeroed storage. Sample counts other than 1 and 4 log an
    /// error and fall back to single-sample storage.
    pub fn new(width: u32, height: u32, samples: u32) -> Self {
        match samples {
            1 => Self {
                width,
                height,
                sample_count: 1,
                buffer: Some(Arc::new(Buffer::new(width, height))),
                buffer_ms4: None,
            },
            MSAA_SAMPLE_COUNT => Self {
                width,
                height,
                sample_count: MSAA_SAMPLE_COUNT,
                buffer: None,
                buffer_ms4: Some(Arc::new(Buffer::new(width, height))),
            },
            _ => {
                error!("create image buffer failed: {samples} samples not supported");
                Self::new(width, height, 1)
            }
        }
    }

    /// Wraps an uploaded single-sample buffer.
    pub fn from_buffer(buffer: Arc<Buffer<T>>) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            sample_count: 1,
            buffer: Some(buffer),
            buffer_ms4: None,
        }
    }

    /// Whether this level stores four samples per texel.
    #[inline]
    pub fn multi_sample(&self) -> bool {
        self.sample_count > 1
    }

    /// Returns the single-sample plane, creating it if missing (the MSAA
    /// resolve target).
    pub fn ensure_resolve_plane(&mut self) -> Arc<Buffer<T>> {
        self.buffer
            .get_or_insert_with(|| Arc::new(Buffer::new(self.width, self.height)))
            .clone()
    }
}

/// An ordered mip chain; level 0 carries the base dimensions.
pub struct TextureImage<T: Texel> {
    /// The mip levels, largest first.
    pub levels: Vec<ImageBuffer<T>>,
}

impl<T: Texel> TextureImage<T> {
    /// Creates a chain holding only the given base level.
    pub fn from_level0(level0: ImageBuffer<T>) -> Self {
        Self {
            levels: vec![level0],
        }
    }

    /// Width of level 0.
    pub fn width(&self) -> u32 {
        self.levels.first().map_or(0, |l| l.width)
    }

    /// Height of level 0.
    pub fn height(&self) -> u32 {
        self.levels.first().map_or(0, |l| l.height)
    }

    /// Rebuilds the mip chain below level 0.
    ///
    /// Level `i + 1` is `max(⌈w/2⌉, 1) x max(⌈h/2⌉, 1)` of level `i`,
    /// stopping once a side reaches 2. With `sample` set, each level is
    /// filled by bilinear downsampling of its predecessor (clamping to the
    /// source edges); otherwise the levels are allocated but left zeroed.
    /// Regeneration is idempotent.
    pub fn generate_mipmap(&mut self, sample: bool) {
        if self.levels.is_empty() {
            return;
        }
        if self.levels[0].multi_sample() {
            error!("generate mipmap ignored: multisample texture");
            return;
        }
        self.levels.truncate(1);

        let mut width = self.width();
        let mut height = self.height();
        while width > 2 && height > 2 {
            width = (width / 2).max(1);
            height = (height / 2).max(1);
            let level = if sample {
                let prev = self
                    .levels
                    .last()
                    .and_then(|l| l.buffer.clone())
                    .expect("single-sample chain");
                ImageBuffer::from_buffer(Arc::new(downsample_bilinear(&prev, width, height)))
            } else {
                ImageBuffer::new(width, height, 1)
            };
            self.levels.push(level);
        }
    }

    /// Snapshot of the chain's single-sample planes, for sampler binding.
    pub fn level_planes(&self) -> Vec<Arc<Buffer<T>>> {
        self.levels
            .iter()
            .filter_map(|l| l.buffer.clone())
            .collect()
    }
}

/// Typed texel storage of a texture: one image for 2-D, six for cubemaps.
pub enum TextureStorage {
    /// 8-bit RGBA images.
    Rgba8(Vec<TextureImage<Rgba8>>),
    /// 32-bit float (depth) images.
    Float32(Vec<TextureImage<f32>>),
}

/// A renderer-owned texture resource.
pub struct Texture {
    /// The creation description.
    pub desc: TextureDesc,
    /// Filtering and addressing state consulted when the texture is bound
    /// to a sampler uniform.
    pub sampler_desc: SamplerDesc,
    /// The texel storage.
    pub storage: TextureStorage,
}

impl Texture {
    /// Creates a texture with zeroed level-0 storage (plus an empty mip
    /// chain when `use_mipmaps` is set).
    pub fn new(desc: TextureDesc) -> Result<Self, ResourceError> {
        if desc.kind == TextureKind::Cube && desc.multi_sample {
            return Err(ResourceError::MultisampleUnsupported {
                operation: "cube texture",
            });
        }
        if desc.multi_sample && desc.use_mipmaps {
            error!("mipmaps ignored: requested on a multisample texture");
        }

        let image_count = match desc.kind {
            TextureKind::TwoD => 1,
            TextureKind::Cube => 6,
        };
        let samples = if desc.multi_sample {
            MSAA_SAMPLE_COUNT
        } else {
            1
        };

        fn build<T: Texel>(desc: &TextureDesc, count: usize, samples: u32) -> Vec<TextureImage<T>> {
            (0..count)
                .map(|_| {
                    let mut image = TextureImage::from_level0(ImageBuffer::new(
                        desc.width,
                        desc.height,
                        samples,
                    ));
                    if desc.use_mipmaps && samples == 1 {
                        image.generate_mipmap(false);
                    }
                    image
                })
                .collect()
        }

        let storage = match desc.format {
            TextureFormat::Rgba8 => TextureStorage::Rgba8(build(&desc, image_count, samples)),
            TextureFormat::Float32 => TextureStorage::Float32(build(&desc, image_count, samples)),
        };

        Ok(Self {
            desc,
            sampler_desc: SamplerDesc::default(),
            storage,
        })
    }

    /// Replaces the sampler state.
    pub fn set_sampler_desc(&mut self, sampler_desc: SamplerDesc) {
        self.sampler_desc = sampler_desc;
    }

    /// Uploads RGBA8 image data: one buffer for 2-D, six for cubemaps in
    /// canonical face order. Regenerates mipmaps when the texture was
    /// created with `use_mipmaps`.
    pub fn set_image_rgba8(&mut self, buffers: Vec<Buffer<Rgba8>>) -> Result<(), ResourceError> {
        let desc = self.desc;
        match &mut self.storage {
            TextureStorage::Rgba8(images) => Self::upload(&desc, images, buffers),
            TextureStorage::Float32(_) => Err(ResourceError::FormatMismatch {
                expected: "FLOAT32",
                got: "RGBA8",
            }),
        }
    }

    /// Uploads float32 image data; see [`Texture::set_image_rgba8`].
    pub fn set_image_f32(&mut self, buffers: Vec<Buffer<f32>>) -> Result<(), ResourceError> {
        let desc = self.desc;
        match &mut self.storage {
            TextureStorage::Float32(images) => Self::upload(&desc, images, buffers),
            TextureStorage::Rgba8(_) => Err(ResourceError::FormatMismatch {
                expected: "RGBA8",
                got: "FLOAT32",
            }),
        }
    }

    fn upload<T: Texel>(
        desc: &TextureDesc,
        images: &mut [TextureImage<T>],
        buffers: Vec<Buffer<T>>,
    ) -> Result<(), ResourceError> {
        if desc.multi_sample {
            return Err(ResourceError::MultisampleUnsupported {
                operation: "set_image_data",
            });
        }
        if buffers.len() != images.len() {
            return Err(ResourceError::LayerCountMismatch {
                expected: images.len(),
                got: buffers.len(),
            });
        }
        for buffer in &buffers {
            if buffer.width() != desc.width || buffer.height() != desc.height {
                return Err(ResourceError::SizeMismatch {
                    expected: (desc.width, desc.height),
                    got: (buffer.width(), buffer.height()),
                });
            }
        }
        for (image, buffer) in images.iter_mut().zip(buffers) {
            *image = TextureImage::from_level0(ImageBuffer::from_buffer(Arc::new(buffer)));
            if desc.use_mipmaps {
                image.generate_mipmap(true);
            }
        }
        Ok(())
    }

    /// Fully (re)builds the mip chains from the current level-0 contents.
    pub fn generate_mipmaps(&mut self) {
        if self.desc.multi_sample {
            error!("generate mipmaps ignored: multisample texture");
            return;
        }
        match &mut self.storage {
            TextureStorage::Rgba8(images) => {
                images.iter_mut().for_each(|i| i.generate_mipmap(true))
            }
            TextureStorage::Float32(images) => {
                images.iter_mut().for_each(|i| i.generate_mipmap(true))
            }
        }
    }

    /// The RGBA8 image of a layer (cube face index, or 0 for 2-D).
    pub fn image_rgba8(&self, layer: u32) -> Option<&TextureImage<Rgba8>> {
        match &self.storage {
            TextureStorage::Rgba8(images) => images.get(layer as usize),
            TextureStorage::Float32(_) => None,
        }
    }

    /// Mutable access to the RGBA8 image of a layer.
    pub fn image_rgba8_mut(&mut self, layer: u32) -> Option<&mut TextureImage<Rgba8>> {
        match &mut self.storage {
            TextureStorage::Rgba8(images) => images.get_mut(layer as usize),
            TextureStorage::Float32(_) => None,
        }
    }

    /// The float32 image of a layer.
    pub fn image_f32(&self, layer: u32) -> Option<&TextureImage<f32>> {
        match &self.storage {
            TextureStorage::Float32(images) => images.get(layer as usize),
            TextureStorage::Rgba8(_) => None,
        }
    }

    /// Mutable access to the float32 image of a layer.
    pub fn image_f32_mut(&mut self, layer: u32) -> Option<&mut TextureImage<f32>> {
        match &mut self.storage {
            TextureStorage::Float32(images) => images.get_mut(layer as usize),
            TextureStorage::Rgba8(_) => None,
        }
    }

    /// Exports one layer/level as a PNG file.
    ///
    /// Float32 texels are mapped linearly from `[0, 1]` to grayscale. The
    /// image is flipped vertically on export, so row 0 of the file is the
    /// top of the rendered image.
    pub fn dump_image(&self, path: &Path, layer: u32, level: u32) -> Result<(), SoftError> {
        if self.desc.multi_sample {
            return Err(ResourceError::MultisampleUnsupported {
                operation: "dump_image",
            }
            .into());
        }

        fn level_of<T: Texel>(
            images: &[TextureImage<T>],
            layer: u32,
            level: u32,
        ) -> Result<&Buffer<T>, ResourceError> {
            images
                .get(layer as usize)
                .ok_or(ResourceError::InvalidHandle {
                    kind: "texture layer",
                })?
                .levels
                .get(level as usize)
                .and_then(|l| l.buffer.as_deref())
                .ok_or(ResourceError::InvalidHandle {
                    kind: "texture level",
                })
        }

        let (pixels, width, height) = match &self.storage {
            TextureStorage::Rgba8(images) => {
                let buffer = level_of(images, layer, level)?;
                (
                    flatten_flipped(buffer, |texel: Rgba8| [texel.r, texel.g, texel.b, texel.a]),
                    buffer.width(),
                    buffer.height(),
                )
            }
            TextureStorage::Float32(images) => {
                let buffer = level_of(images, layer, level)?;
                (
                    flatten_flipped(buffer, |texel: f32| {
                        let g = (texel.clamp(0.0, 1.0) * 255.0) as u8;
                        [g, g, g, 255]
                    }),
                    buffer.width(),
                    buffer.height(),
                )
            }
        };

        image::save_buffer(path, &pixels, width, height, image::ExtendedColorType::Rgba8)?;
        Ok(())
    }
}

/// Reads a buffer row by row from the bottom up, converting each texel to
/// RGBA bytes.
fn flatten_flipped<T: Texel>(buffer: &Buffer<T>, convert: impl Fn(T) -> [u8; 4]) -> Vec<u8> {
    let (w, h) = (buffer.width(), buffer.height());
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for y in (0..h).rev() {
        for x in 0..w {
            let texel = buffer.get(x, y).unwrap_or(T::ZERO);
            out.extend_from_slice(&convert(texel));
        }
    }
    out
}

/// Decodes a PNG file into an RGBA8 buffer.
pub fn read_image_rgba8(path: &Path) -> Result<Buffer<Rgba8>, SoftError> {
    let decoded = image::open(path)?.into_rgba8();
    let (width, height) = decoded.dimensions();
    let texels = decoded
        .pixels()
        .map(|p| Rgba8::new(p.0[0], p.0[1], p.0[2], p.0[3]))
        .collect();
    Ok(Buffer::from_texels(width, height, texels).expect("decoded dimensions match"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use okhra_core::renderer::TextureUsage;

    fn desc_2d(width: u32, height: u32) -> TextureDesc {
        TextureDesc {
            width,
            height,
            kind: TextureKind::TwoD,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::SAMPLER | TextureUsage::UPLOAD_DATA,
            use_mipmaps: false,
            multi_sample: false,
        }
    }

    #[test]
    fn test_mip_dimensions_halve() {
        let mut image: TextureImage<f32> =
            TextureImage::from_level0(ImageBuffer::new(16, 9, 1));
        image.generate_mipmap(false);
        let dims: Vec<(u32, u32)> = image.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(dims[0], (16, 9));
        for pair in dims.windows(2) {
            assert_eq!(pair[1].0, (pair[0].0 / 2).max(1));
            assert_eq!(pair[1].1, (pair[0].1 / 2).max(1));
        }
        // Monotone non-increasing, down to a side of at most 2.
        let last = *dims.last().unwrap();
        assert!(last.0 <= 2 || last.1 <= 2);
    }

    #[test]
    fn test_mip_generation_idempotent() {
        let base = Buffer::from_texels(8, 8, vec![0.5f32; 64]).unwrap();
        let mut image = TextureImage::from_level0(ImageBuffer::from_buffer(Arc::new(base)));
        image.generate_mipmap(true);
        let count = image.levels.len();
        image.generate_mipmap(true);
        assert_eq!(image.levels.len(), count);
        // Constant image stays constant at every level.
        for level in &image.levels {
            let buffer = level.buffer.as_ref().unwrap();
            assert_eq!(buffer.get(0, 0), Some(0.5));
        }
    }

    #[test]
    fn test_upload_size_mismatch_rejected() {
        let mut texture = Texture::new(desc_2d(4, 4)).unwrap();
        let wrong = Buffer::new(2, 2);
        let err = texture.set_image_rgba8(vec![wrong]).unwrap_err();
        assert!(matches!(err, ResourceError::SizeMismatch { .. }));
    }

    #[test]
    fn test_upload_format_mismatch_rejected() {
        let mut texture = Texture::new(desc_2d(2, 2)).unwrap();
        let err = texture.set_image_f32(vec![Buffer::new(2, 2)]).unwrap_err();
        assert!(matches!(err, ResourceError::FormatMismatch { .. }));
    }

    #[test]
    fn test_cube_requires_six_layers() {
        let mut desc = desc_2d(2, 2);
        desc.kind = TextureKind::Cube;
        let mut texture = Texture::new(desc).unwrap();
        let err = texture
            .set_image_rgba8(vec![Buffer::new(2, 2)])
            .unwrap_err();
        assert!(matches!(
            err,
            ResourceError::LayerCountMismatch {
                expected: 6,
                got: 1
            }
        ));
    }

    #[test]
    fn test_multisample_upload_rejected() {
        let mut desc = desc_2d(2, 2);
        desc.multi_sample = true;
        let mut texture = Texture::new(desc).unwrap();
        let err = texture
            .set_image_rgba8(vec![Buffer::new(2, 2)])
            .unwrap_err();
        assert!(matches!(err, ResourceError::MultisampleUnsupported { .. }));
    }

    #[test]
    fn test_dump_and_read_roundtrip() {
        let mut texture = Texture::new(desc_2d(2, 2)).unwrap();
        let texels = vec![
            Rgba8::new(10, 20, 30, 255),
            Rgba8::new(40, 50, 60, 255),
            Rgba8::new(70, 80, 90, 255),
            Rgba8::new(100, 110, 120, 255),
        ];
        texture
            .set_image_rgba8(vec![Buffer::from_texels(2, 2, texels.clone()).unwrap()])
            .unwrap();

        let path = std::env::temp_dir().join("okhra_texture_roundtrip.png");
        texture.dump_image(&path, 0, 0).unwrap();
        let read_back = read_image_rgba8(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // The exporter flips vertically: file row 0 is buffer row h-1.
        assert_eq!(read_back.get(0, 0), Some(texels[2]));
        assert_eq!(read_back.get(1, 0), Some(texels[3]));
        assert_eq!(read_back.get(0, 1), Some(texels[0]));
        assert_eq!(read_back.get(1, 1), Some(texels[1]));
    }
}
