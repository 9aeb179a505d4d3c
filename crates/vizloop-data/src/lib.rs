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

//! # Vizloop Data
//!
//! Concrete implementations of the collaborators the frame loop talks to:
//! an in-memory graph store, a double-buffered frame bridge, a workspace hub
//! acting as host, basic stylers, overlay shape slots and a static controller.

#![warn(missing_docs)]

pub mod bridge;
pub mod controller;
pub mod definition;
pub mod graph_store;
pub mod hub;
pub mod shape;
pub mod style;

pub use bridge::{DoubleBufferBridge, EdgeDrawable, FrameSnapshot, FrameTiming, NodeInstance};
pub use controller::StaticController;
pub use definition::{EdgeDefinition, GraphDefinition, NodeDefinition};
pub use graph_store::{InMemoryGraph, InMemoryGraphModel};
pub use hub::WorkspaceHub;
pub use shape::ShapeSlot;
pub use style::{BasicEdgeStyler, BasicNodeStyler, VizModel, VizSettings};
