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

//! Error type for operations that cross an external boundary.
//!
//! The draw path never returns errors (invalid state logs and no-ops);
//! `SoftError` covers the image import/export surface, where file I/O can
//! genuinely fail.

use okhra_core::renderer::ResourceError;

/// An error from the software renderer's resource or I/O surface.
#[derive(Debug, thiserror::Error)]
pub enum SoftError {
    /// A resource-level validation failure.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Reading or writing an image file failed.
    #[error("image I/O failed: {0}")]
    Image(#[from] image::ImageError),

    /// A filesystem operation failed.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
