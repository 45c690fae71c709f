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

//! # Okhra Core
//!
//! Foundational crate containing the math primitives, renderer descriptors,
//! resource handles, and error contracts shared by every Okhra crate.
//!
//! This crate defines the "common language" of the rasterizer: *what* a
//! texture, sampler, render state, or vertex layout is. The *how*, the
//! actual CPU rasterization pipeline, lives in `okhra-soft`, which
//! implements these contracts.

#![warn(missing_docs)]

pub mod math;
pub mod renderer;
pub mod utils;

pub use math::{Mat3, Mat4, Rgba8, Vec2, Vec3, Vec4};
