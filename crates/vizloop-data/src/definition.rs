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

//! A serializable description of a graph, used to seed workspaces.

use crate::graph_store::InMemoryGraph;
use serde::{Deserialize, Serialize};
use vizloop_core::{Edge, FrameError, FrameResult, Graph, Node, NodeId, Rgba, Vec3};

/// The root container of a graph description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// All nodes of the graph.
    pub nodes: Vec<NodeDefinition>,
    /// All edges of the graph.
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

/// A serializable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// The node identifier.
    pub id: u64,
    /// The position as `(x, y, z)`.
    pub position: (f32, f32, f32),
    /// The node size.
    #[serde(default = "default_size")]
    pub size: f32,
    /// The node color as `(r, g, b, a)`.
    #[serde(default)]
    pub color: Option<(f32, f32, f32, f32)>,
}

/// A serializable edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    /// The edge identifier.
    pub id: u64,
    /// The source node identifier.
    pub source: u64,
    /// The target node identifier.
    pub target: u64,
    /// The edge weight.
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_size() -> f32 {
    1.0
}

fn default_weight() -> f32 {
    1.0
}

impl GraphDefinition {
    /// Parses a description written in RON.
    pub fn from_ron_str(source: &str) -> FrameResult<Self> {
        ron::from_str(source).map_err(|e| FrameError::Graph(e.to_string()))
    }

    /// Writes the description as pretty-printed RON.
    pub fn to_ron_string(&self) -> FrameResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| FrameError::Graph(e.to_string()))
    }

    /// Captures the current content of a graph.
    pub fn capture(graph: &dyn Graph) -> FrameResult<Self> {
        let mut definition = Self::default();
        graph.visit_nodes(&mut |node| {
            let c = node.color;
            definition.nodes.push(NodeDefinition {
                id: node.id.0,
                position: (node.position.x, node.position.y, node.position.z),
                size: node.size,
                color: Some((c.r, c.g, c.b, c.a)),
            });
        })?;
        graph.visit_edges(&mut |edge| {
            definition.edges.push(EdgeDefinition {
                id: edge.id.0,
                source: edge.source.0,
                target: edge.target.0,
                weight: edge.weight,
            });
        })?;
        Ok(definition)
    }

    /// Loads the description into `graph`, after the content it already holds.
    pub fn populate(&self, graph: &InMemoryGraph) -> FrameResult<()> {
        for def in &self.nodes {
            let (x, y, z) = def.position;
            let mut node = Node::new(def.id, Vec3::new(x, y, z), def.size);
            if let Some((r, g, b, a)) = def.color {
                node.color = Rgba::new(r, g, b, a);
            }
            graph.add_node(node);
        }
        for def in &self.edges {
            graph.add_edge(Edge::new(
                def.id,
                NodeId(def.source),
                NodeId(def.target),
                def.weight,
            ))?;
        }
        Ok(())
    }

    /// Builds a new graph from the description.
    pub fn build(&self) -> FrameResult<InMemoryGraph> {
        let graph = InMemoryGraph::new();
        self.populate(&graph)?;
        Ok(graph)
    }

    /// Generates a sunflower (phyllotaxis) layout of `node_count` nodes.
    ///
    /// Node `i` is linked to the `links_per_node` nodes that precede it, with a
    /// weight that decreases with the index distance. Sizes grow towards the
    /// center so the layout has a visible largest node.
    pub fn phyllotaxis(node_count: u64, links_per_node: u64, spacing: f32) -> Self {
        const GOLDEN_ANGLE: f32 = 2.399_963;

        let mut definition = Self::default();
        for i in 0..node_count {
            let radius = spacing * (i as f32).sqrt();
            let angle = i as f32 * GOLDEN_ANGLE;
            let t = i as f32 / node_count.max(1) as f32;
            let color = Rgba::lerp(Rgba::rgb(0.95, 0.55, 0.2), Rgba::rgb(0.2, 0.45, 0.9), t);
            definition.nodes.push(NodeDefinition {
                id: i,
                position: (radius * angle.cos(), radius * angle.sin(), 0.0),
                size: 1.0 + 4.0 * (1.0 - t),
                color: Some((color.r, color.g, color.b, color.a)),
            });
        }

        let mut next_edge = 0;
        for target in 1..node_count {
            for distance in 1..=links_per_node.min(target) {
                definition.edges.push(EdgeDefinition {
                    id: next_edge,
                    source: target - distance,
                    target,
                    weight: 1.0 / distance as f32,
                });
                next_edge += 1;
            }
        }
        definition
    }
}
