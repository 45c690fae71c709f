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

//! Defines the error types for resource creation and binding.
//!
//! The draw path itself never raises errors: invalid state is logged and
//! the operation becomes a no-op. These types carry the diagnostics for
//! those logs and for the few operations that do return `Result`.

use std::fmt;

/// An error raised while creating, uploading to, or binding a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Uploaded image dimensions do not match the texture description.
    SizeMismatch {
        /// Expected `(width, height)`.
        expected: (u32, u32),
        /// Provided `(width, height)`.
        got: (u32, u32),
    },
    /// Uploaded data format does not match the texture format.
    FormatMismatch {
        /// A short description of the expected format.
        expected: &'static str,
        /// A short description of the provided format.
        got: &'static str,
    },
    /// The number of uploaded image layers does not match the texture kind
    /// (1 for 2-D, 6 for cubemaps).
    LayerCountMismatch {
        /// Expected layer count.
        expected: usize,
        /// Provided layer count.
        got: usize,
    },
    /// The operation is not supported on a multisample texture.
    MultisampleUnsupported {
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// A handle did not resolve in its arena.
    InvalidHandle {
        /// The resource kind the handle was for.
        kind: &'static str,
    },
    /// The framebuffer has no attachment, or its attachments disagree in
    /// dimensions or sample count.
    IncompleteFramebuffer,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::SizeMismatch { expected, got } => {
                write!(
                    f,
                    "image size mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, got.0, got.1
                )
            }
            ResourceError::FormatMismatch { expected, got } => {
                write!(f, "image format mismatch: expected {expected}, got {got}")
            }
            ResourceError::LayerCountMismatch { expected, got } => {
                write!(f, "layer count mismatch: expected {expected}, got {got}")
            }
            ResourceError::MultisampleUnsupported { operation } => {
                write!(f, "'{operation}' is not supported on a multisample texture")
            }
            ResourceError::InvalidHandle { kind } => {
                write!(f, "invalid {kind} handle")
            }
            ResourceError::IncompleteFramebuffer => {
                write!(f, "framebuffer is incomplete")
            }
        }
    }
}

impl std::error::Error for ResourceError {}
