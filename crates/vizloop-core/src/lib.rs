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

//! # Vizloop Core
//!
//! Foundational crate containing the traits, core types, and interface contracts
//! shared by the frame update loop and the collaborators it feeds: the graph
//! model, the frame bridge, the styling strategies, the limits sink, the overlay
//! shape providers and the host workspace lifecycle.

#![warn(missing_docs)]

pub mod bridge;
pub mod camera;
pub mod error;
pub mod event;
pub mod graph;
pub mod limits;
pub mod math;
pub mod shape;
pub mod style;
pub mod utils;
pub mod workspace;

pub use bridge::{FrameBridge, FrameController, UiPrimitive};
pub use camera::Camera;
pub use error::{FrameError, FrameResult};
pub use event::EventBus;
pub use graph::{Edge, EdgeId, Graph, GraphModel, Node, NodeId};
pub use limits::{Bounds3, FrameLimits, GraphLimits, LimitsAccumulator, WeightRange};
pub use math::{Rgba, Vec3};
pub use shape::{NoShape, Shape, ShapeProvider};
pub use style::{EdgeStyle, EdgeStyler, NodeStyle, NodeStyler, StyleSource};
pub use utils::timer::Stopwatch;
pub use workspace::{GraphModelSource, Workspace, WorkspaceHost, WorkspaceId, WorkspaceListener};
