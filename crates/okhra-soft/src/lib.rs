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

//! # Okhra Soft
//!
//! A CPU software rasterization pipeline implementing the `okhra-core`
//! contracts: programmable vertex and fragment stages, homogeneous
//! clipping, perspective-correct interpolation, tiled multithreaded
//! rasterization with optional 4x MSAA, a full texture sampling unit
//! with mipmaps and cubemaps, depth testing (reversed-Z and early-Z
//! aware), and alpha blending.
//!
//! The entry point is [`renderer::Renderer`]; shaders implement
//! [`shader::SoftShader`].

pub mod blend;
pub mod buffer;
pub mod depth;
pub mod error;
pub mod framebuffer;
pub mod interp;
pub mod pool;
pub mod quad;
pub mod renderer;
pub mod sampler;
pub mod shader;
pub mod texture;
pub mod uniform;
pub mod vertex;

pub use error::SoftError;
pub use renderer::Renderer;
pub use shader::{
    FragmentOutput, FragmentStage, SamplerSlotDesc, ShaderDescriptor, SoftShader,
    UniformBlockDesc, VertexOutput, VertexStage,
};
pub use uniform::{ShaderBindings, UniformBlock, UniformSampler};
