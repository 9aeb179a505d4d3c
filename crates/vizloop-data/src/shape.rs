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


//! A settable overlay shape, written by an interaction tool.

use std::sync::{Mutex, PoisonError};
use vizloop_core::{Shape, ShapeProvider};

/// Holds the current shape of one interaction tool.
#[derive(Debug, Default)]
pub struct ShapeSlot {
    shape: Mutex<Option<Shape>>,
}

impl ShapeSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `shape` from the next frame on.
    pub fn set(&self, shape: Shape) {
        *self.shape.lock().unwrap_or_else(PoisonError::into_inner) = Some(shape);
    }

    /// Hides the shape.
    pub fn clear(&self) {
        *self.shape.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ShapeProvider for ShapeSlot {
    fn current_shape(&self) -> Option<Shape> {
        *self.shape.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
