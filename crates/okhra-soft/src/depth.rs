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

//! The depth comparison.

use okhra_core::renderer::DepthFunction;

/// Compares an incoming depth against the stored depth.
#[inline]
pub fn depth_test(incoming: f32, stored: f32, func: DepthFunction) -> bool {
    match func {
        DepthFunction::Never => false,
        DepthFunction::Less => incoming < stored,
        DepthFunction::Equal => incoming == stored,
        DepthFunction::LessEqual => incoming <= stored,
        DepthFunction::Greater => incoming > stored,
        DepthFunction::NotEqual => incoming != stored,
        DepthFunction::GreaterEqual => incoming >= stored,
        DepthFunction::Always => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DepthFunction::*;

    #[test]
    fn test_depth_functions() {
        assert!(!depth_test(0.1, 0.5, Never));
        assert!(depth_test(0.1, 0.5, Less));
        assert!(!depth_test(0.5, 0.5, Less));
        assert!(depth_test(0.5, 0.5, Equal));
        assert!(depth_test(0.5, 0.5, LessEqual));
        assert!(depth_test(0.9, 0.5, Greater));
        assert!(depth_test(0.4, 0.5, NotEqual));
        assert!(depth_test(0.5, 0.5, GreaterEqual));
        assert!(depth_test(0.0, 1.0, Always));
    }
}
