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


//! A controller with an externally set camera and centering flag.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use vizloop_core::{Camera, FrameController};

/// A [`FrameController`] whose state is set directly, e.g. by an input layer
/// or a test.
#[derive(Debug)]
pub struct StaticController {
    camera: Mutex<Camera>,
    centering: AtomicBool,
    updates_begun: AtomicU64,
    updates_ended: AtomicU64,
}

impl StaticController {
    /// Creates a controller with centering disabled.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera: Mutex::new(camera),
            centering: AtomicBool::new(false),
            updates_begun: AtomicU64::new(0),
            updates_ended: AtomicU64::new(0),
        }
    }

    /// Replaces the camera used by the next frames.
    pub fn set_camera(&self, camera: Camera) {
        *self.camera.lock().unwrap_or_else(PoisonError::into_inner) = camera;
    }

    /// Enables or disables spatial bounds tracking.
    pub fn set_centering(&self, centering: bool) {
        self.centering.store(centering, Ordering::Relaxed);
    }

    /// Number of `begin_update_frame` calls so far.
    pub fn updates_begun(&self) -> u64 {
        self.updates_begun.load(Ordering::Acquire)
    }

    /// Number of `end_update_frame` calls so far.
    pub fn updates_ended(&self) -> u64 {
        self.updates_ended.load(Ordering::Acquire)
    }
}

impl Default for StaticController {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl FrameController for StaticController {
    fn begin_update_frame(&self) {
        self.updates_begun.fetch_add(1, Ordering::AcqRel);
    }

    fn end_update_frame(&self) {
        self.updates_ended.fetch_add(1, Ordering::AcqRel);
    }

    fn camera(&self) -> Camera {
        *self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_centering(&self) -> bool {
        self.centering.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizloop_core::Vec3;

    #[test]
    fn test_camera_and_centering() {
        let controller = StaticController::default();
        assert!(!controller.is_centering());
        controller.set_centering(true);
        assert!(controller.is_centering());

        let camera = Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        controller.set_camera(camera);
        assert_eq!(controller.camera(), camera);
    }

    #[test]
    fn test_update_counters() {
        let controller = StaticController::default();
        controller.begin_update_frame();
        controller.end_update_frame();
        controller.begin_update_frame();
        assert_eq!(controller.updates_begun(), 2);
        assert_eq!(controller.updates_ended(), 1);
    }
}
