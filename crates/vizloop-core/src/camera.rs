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

//! The camera state copied into every frame.

use crate::math::Vec3;
use serde::{Deserialize, Serialize};

/// A snapshot of the viewer's camera.
///
/// The frame loop only copies this value into the bridge at the start of each
/// frame. Projection and navigation live with the renderer and the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// The camera position.
    pub position: Vec3,
    /// The point the camera looks at.
    pub target: Vec3,
    /// The up direction.
    pub up: Vec3,
    /// The vertical field of view in radians.
    pub fov_y_radians: f32,
    /// The viewport width in pixels.
    pub viewport_width: u32,
    /// The viewport height in pixels.
    pub viewport_height: u32,
}

impl Camera {
    /// Creates a camera looking at `target` from `position`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    /// Returns the viewport aspect ratio (width / height), or `1.0` for an empty viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.viewport_height == 0 {
            1.0
        } else {
            self.viewport_width as f32 / self.viewport_height as f32
        }
    }

    /// Returns the distance between the camera and its target.
    pub fn distance_to_target(&self) -> f32 {
        (self.target - self.position).length()
    }
}

impl Default for Camera {
    /// A camera 500 units in front of the origin with a 60° field of view.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 500.0),
            target: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y_radians: 60.0_f32.to_radians(),
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}
