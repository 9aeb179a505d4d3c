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

//! Styling strategies applied to nodes and edges when a frame is assembled.
//!
//! Stylers are treated as stateless per frame: the frame loop asks the
//! [`StyleSource`] for fresh instances at the start of every frame, so a style
//! change made by the user takes effect on the next frame without restarting
//! the loop.

use crate::graph::{Edge, Node};
use crate::math::Rgba;
use std::sync::Arc;

/// The resolved appearance of a node for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    /// The fill color.
    pub color: Rgba,
    /// The rendered size.
    pub size: f32,
    /// Whether the node label should be drawn.
    pub show_label: bool,
}

/// The resolved appearance of an edge for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    /// The stroke color.
    pub color: Rgba,
    /// The stroke thickness.
    pub thickness: f32,
}

/// Resolves the appearance of a node.
pub trait NodeStyler: Send + Sync {
    /// Returns the style of `node` for the current frame.
    fn style(&self, node: &Node) -> NodeStyle;
}

/// Resolves the appearance of an edge.
pub trait EdgeStyler: Send + Sync {
    /// Returns the style of `edge` for the current frame.
    fn style(&self, edge: &Edge) -> EdgeStyle;
}

/// Hands out the stylers to use for the next frame.
pub trait StyleSource: Send + Sync {
    /// Returns the node styler for the next frame.
    fn node_styler(&self) -> Arc<dyn NodeStyler>;

    /// Returns the edge styler for the next frame.
    fn edge_styler(&self) -> Arc<dyn EdgeStyler>;
}
