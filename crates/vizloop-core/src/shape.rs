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

//! Overlay shapes drawn on top of the graph (selection drag region, pointer indicator).

use crate::bridge::UiPrimitive;
use crate::math::Rgba;

/// Fill used for the selection rectangle.
const SELECTION_FILL: Rgba = Rgba::new(0.3, 0.5, 0.9, 0.2);
/// Outline used for every overlay shape.
const OVERLAY_STROKE: Rgba = Rgba::new(0.3, 0.5, 0.9, 0.8);

/// A screen-space overlay shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// An axis-aligned rectangle, e.g. the region being drag-selected.
    Rectangle {
        /// One corner in screen pixels.
        from: (f32, f32),
        /// The opposite corner in screen pixels.
        to: (f32, f32),
    },
    /// A circle, e.g. the pointer's hover radius.
    Circle {
        /// The center in screen pixels.
        center: (f32, f32),
        /// The radius in pixels.
        radius: f32,
    },
}

impl Shape {
    /// Converts the shape into the primitive the renderer draws.
    ///
    /// Rectangle corners are normalized so that `min <= max` on both axes,
    /// whichever direction the user dragged in.
    pub fn ui_primitive(&self) -> UiPrimitive {
        match *self {
            Shape::Rectangle { from, to } => UiPrimitive::Rect {
                min: (from.0.min(to.0), from.1.min(to.1)),
                max: (from.0.max(to.0), from.1.max(to.1)),
                fill: SELECTION_FILL,
                stroke: OVERLAY_STROKE,
            },
            Shape::Circle { center, radius } => UiPrimitive::Circle {
                center,
                radius: radius.abs(),
                stroke: OVERLAY_STROKE,
            },
        }
    }
}

/// Exposes the current overlay shape of one interaction tool, if any.
pub trait ShapeProvider: Send + Sync {
    /// Returns the shape to draw this frame, or `None` when the tool is idle.
    fn current_shape(&self) -> Option<Shape>;
}

/// A provider that never has a shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShape;

impl ShapeProvider for NoShape {
    fn current_shape(&self) -> Option<Shape> {
        None
    }
}
