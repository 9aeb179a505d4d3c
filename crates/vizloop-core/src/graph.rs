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

//! Contracts for the graph data read by the frame loop.
//!
//! The frame loop never owns graph storage. It only needs a read-only,
//! visitor-style view of the nodes and edges of the currently selected model.
//! Storage, mutation and indexing are the concern of whichever crate
//! implements [`Graph`].

use crate::error::FrameResult;
use crate::math::{Rgba, Vec3};
use std::sync::Arc;

/// Stable identifier of a node within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Stable identifier of an edge within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

/// The per-node data the frame loop aggregates and forwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// The node identifier.
    pub id: NodeId,
    /// The node position in layout space.
    pub position: Vec3,
    /// The node size (radius) in layout units.
    pub size: f32,
    /// The node's own color, before styling.
    pub color: Rgba,
}

impl Node {
    /// Creates a node at `position` with the given size and the default color.
    pub fn new(id: u64, position: Vec3, size: f32) -> Self {
        Self {
            id: NodeId(id),
            position,
            size,
            color: Rgba::default(),
        }
    }
}

/// The per-edge data the frame loop aggregates and forwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// The edge identifier.
    pub id: EdgeId,
    /// The source node.
    pub source: NodeId,
    /// The target node.
    pub target: NodeId,
    /// The edge weight.
    pub weight: f32,
}

impl Edge {
    /// Creates an edge between two nodes.
    pub fn new(id: u64, source: NodeId, target: NodeId, weight: f32) -> Self {
        Self {
            id: EdgeId(id),
            source,
            target,
            weight,
        }
    }
}

/// A read-only view over the nodes and edges of a graph.
///
/// Implementations may be mutated concurrently by other threads; a visit only
/// has to be internally safe, not consistent with a single point in time.
pub trait Graph: Send + Sync {
    /// Calls `visitor` exactly once for every node currently in the graph.
    fn visit_nodes(&self, visitor: &mut dyn FnMut(&Node)) -> FrameResult<()>;

    /// Calls `visitor` exactly once for every edge currently in the graph.
    fn visit_edges(&self, visitor: &mut dyn FnMut(&Edge)) -> FrameResult<()>;

    /// Returns the current number of nodes.
    fn node_count(&self) -> usize;

    /// Returns the current number of edges.
    fn edge_count(&self) -> usize;
}

/// A graph model, the unit of graph state owned by a workspace.
pub trait GraphModel: Send + Sync {
    /// Returns the graph currently exposed by the model.
    fn graph(&self) -> Arc<dyn Graph>;
}
