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

//! Contracts between the frame loop (producer) and the renderer side (consumer).
//!
//! A frame is written between a matched [`FrameBridge::begin_frame`] /
//! [`FrameBridge::end_frame`] pair. The consumer only reads completed frames, so
//! `end_frame` is the hand-off point.

use crate::camera::Camera;
use crate::error::FrameResult;
use crate::graph::{Edge, Node};
use crate::math::Rgba;
use crate::style::{EdgeStyler, NodeStyler};
use std::sync::Arc;

/// A screen-space primitive drawn over the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiPrimitive {
    /// A filled, outlined rectangle.
    Rect {
        /// The top-left corner in pixels.
        min: (f32, f32),
        /// The bottom-right corner in pixels.
        max: (f32, f32),
        /// The fill color.
        fill: Rgba,
        /// The outline color.
        stroke: Rgba,
    },
    /// An outlined circle.
    Circle {
        /// The center in pixels.
        center: (f32, f32),
        /// The radius in pixels.
        radius: f32,
        /// The outline color.
        stroke: Rgba,
    },
}

/// The producer side of the frame hand-off buffer.
///
/// Methods take `&self`: the bridge is shared between the loop thread and the
/// renderer, so implementations synchronize internally.
pub trait FrameBridge: Send + Sync {
    /// Opens a new frame with a copy of the camera state.
    fn begin_frame(&self, camera: Camera) -> FrameResult<()>;

    /// Sets the stylers used to resolve the appearance of the elements added to
    /// the open frame.
    fn set_stylers(
        &self,
        node_styler: Arc<dyn NodeStyler>,
        edge_styler: Arc<dyn EdgeStyler>,
    ) -> FrameResult<()>;

    /// Adds a node to the open frame.
    fn add_node(&self, node: &Node) -> FrameResult<()>;

    /// Adds an edge to the open frame.
    fn add_edge(&self, edge: &Edge) -> FrameResult<()>;

    /// Adds an overlay primitive to the open frame.
    fn add_primitive(&self, primitive: UiPrimitive) -> FrameResult<()>;

    /// Closes the open frame and makes it available to the consumer.
    fn end_frame(&self) -> FrameResult<()>;

    /// Drops the open frame without handing it to the consumer.
    ///
    /// Called when a frame cannot be completed. Does nothing if no frame is open.
    fn abort_frame(&self);
}

/// The visualization controller notified around each frame update.
pub trait FrameController: Send + Sync {
    /// Called before anything else in a frame.
    fn begin_update_frame(&self);

    /// Called once the frame content has been produced, before the bridge hands it off.
    fn end_update_frame(&self);

    /// Returns a copy of the current camera state.
    fn camera(&self) -> Camera;

    /// Returns `true` when the centering mode (spatial bounds tracking) is enabled.
    fn is_centering(&self) -> bool;
}
