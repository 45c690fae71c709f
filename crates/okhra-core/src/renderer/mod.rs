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

//! Provides the public, backend-agnostic rendering vocabulary.
//!
//! This module defines the "common language" of the rasterizer: the
//! descriptor and state types (like [`TextureDesc`] and [`RenderState`]),
//! typed resource handles, and the error types that form the stable,
//! public-facing contract. The concrete CPU implementation of these
//! contracts lives in the `okhra-soft` crate.

pub mod error;
pub mod handle;
pub mod state;
pub mod texture;
pub mod vertex;

// Re-export the most important types for easier use.
pub use self::error::ResourceError;
pub use self::handle::{Arena, FramebufferId, ProgramId, TextureId, VertexArrayId};
pub use self::state::{
    BlendFactor, BlendFunction, BlendParameters, ClearState, DepthFunction, PolygonMode,
    PrimitiveType, RenderState,
};
pub use self::texture::{
    BorderColor, CubeFace, FilterMode, SamplerDesc, TextureDesc, TextureFormat, TextureKind,
    TextureUsage, WrapMode,
};
pub use self::vertex::{VertexArray, VertexAttributeDesc};
