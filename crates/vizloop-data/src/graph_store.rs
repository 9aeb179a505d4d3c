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

//! An in-memory graph that can be edited while the frame loop reads it.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use vizloop_core::{
    Edge, EdgeId, FrameError, FrameResult, Graph, GraphModel, Node, NodeId, Rgba, Vec3,
};

#[derive(Debug, Default)]
struct GraphStore {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
}

/// A graph held in memory behind a reader-writer lock.
///
/// Nodes and edges are visited in id order. Edits from other threads wait for
/// an in-progress visit to finish and are seen by the next one.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    store: RwLock<GraphStore>,
}

impl InMemoryGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> FrameResult<RwLockReadGuard<'_, GraphStore>> {
        self.store
            .read()
            .map_err(|_| FrameError::Graph("graph store lock poisoned".to_string()))
    }

    // Every edit leaves the maps consistent before it can panic.
    fn write(&self) -> RwLockWriteGuard<'_, GraphStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a node, returning the node it replaced.
    pub fn add_node(&self, node: Node) -> Option<Node> {
        self.write().nodes.insert(node.id, node)
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&self, id: NodeId) -> Option<Node> {
        let mut store = self.write();
        let removed = store.nodes.remove(&id)?;
        store
            .edges
            .retain(|_, edge| edge.source != id && edge.target != id);
        Some(removed)
    }

    /// Inserts an edge. Both endpoints must already be in the graph.
    pub fn add_edge(&self, edge: Edge) -> FrameResult<Option<Edge>> {
        let mut store = self.write();
        for endpoint in [edge.source, edge.target] {
            if !store.nodes.contains_key(&endpoint) {
                return Err(FrameError::Graph(format!(
                    "edge {} references missing node {}",
                    edge.id.0, endpoint.0
                )));
            }
        }
        Ok(store.edges.insert(edge.id, edge))
    }

    /// Removes an edge.
    pub fn remove_edge(&self, id: EdgeId) -> Option<Edge> {
        self.write().edges.remove(&id)
    }

    /// Moves a node. Returns `false` if it does not exist.
    pub fn set_position(&self, id: NodeId, position: Vec3) -> bool {
        self.update_node(id, |node| node.position = position)
    }

    /// Resizes a node. Returns `false` if it does not exist.
    pub fn set_size(&self, id: NodeId, size: f32) -> bool {
        self.update_node(id, |node| node.size = size)
    }

    /// Recolors a node. Returns `false` if it does not exist.
    pub fn set_color(&self, id: NodeId, color: Rgba) -> bool {
        self.update_node(id, |node| node.color = color)
    }

    fn update_node(&self, id: NodeId, update: impl FnOnce(&mut Node)) -> bool {
        match self.write().nodes.get_mut(&id) {
            Some(node) => {
                update(node);
                true
            }
            None => false,
        }
    }

    /// Returns a copy of a node.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.read().ok()?.nodes.get(&id).copied()
    }

    /// Removes every node and edge.
    pub fn clear(&self) {
        let mut store = self.write();
        store.nodes.clear();
        store.edges.clear();
    }
}

impl Graph for InMemoryGraph {
    fn visit_nodes(&self, visitor: &mut dyn FnMut(&Node)) -> FrameResult<()> {
        self.read()?.nodes.values().for_each(visitor);
        Ok(())
    }

    fn visit_edges(&self, visitor: &mut dyn FnMut(&Edge)) -> FrameResult<()> {
        self.read()?.edges.values().for_each(visitor);
        Ok(())
    }

    fn node_count(&self) -> usize {
        self.read().map(|store| store.nodes.len()).unwrap_or(0)
    }

    fn edge_count(&self) -> usize {
        self.read().map(|store| store.edges.len()).unwrap_or(0)
    }
}

/// A graph model exposing one [`InMemoryGraph`].
#[derive(Debug, Default)]
pub struct InMemoryGraphModel {
    graph: Arc<InMemoryGraph>,
}

impl InMemoryGraphModel {
    /// Creates a model over an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model over an existing graph.
    pub fn from_graph(graph: Arc<InMemoryGraph>) -> Self {
        Self { graph }
    }

    /// Returns the concrete graph, for editing.
    pub fn store(&self) -> Arc<InMemoryGraph> {
        Arc::clone(&self.graph)
    }
}

impl GraphModel for InMemoryGraphModel {
    fn graph(&self) -> Arc<dyn Graph> {
        self.graph.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> InMemoryGraph {
        let graph = InMemoryGraph::new();
        graph.add_node(Node::new(1, Vec3::new(0.0, 0.0, 0.0), 1.0));
        graph.add_node(Node::new(2, Vec3::new(1.0, 0.0, 0.0), 1.0));
        graph.add_node(Node::new(3, Vec3::new(0.0, 1.0, 0.0), 1.0));
        graph
            .add_edge(Edge::new(10, NodeId(1), NodeId(2), 1.0))
            .expect("Endpoints exist");
        graph
            .add_edge(Edge::new(11, NodeId(2), NodeId(3), 2.0))
            .expect("Endpoints exist");
        graph
            .add_edge(Edge::new(12, NodeId(3), NodeId(1), 3.0))
            .expect("Endpoints exist");
        graph
    }

    #[test]
    fn test_visits_every_element_once_in_id_order() {
        let graph = triangle();
        let mut ids = Vec::new();
        graph
            .visit_nodes(&mut |node| ids.push(node.id.0))
            .expect("Visit should succeed");
        assert_eq!(ids, vec![1, 2, 3]);

        let mut weights = Vec::new();
        graph
            .visit_edges(&mut |edge| weights.push(edge.weight))
            .expect("Visit should succeed");
        assert_eq!(weights, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_edge_with_missing_endpoint_is_rejected() {
        let graph = triangle();
        let result = graph.add_edge(Edge::new(20, NodeId(1), NodeId(99), 1.0));
        assert!(matches!(result, Err(FrameError::Graph(_))));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_removing_node_drops_incident_edges() {
        let graph = triangle();
        assert!(graph.remove_node(NodeId(2)).is_some());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.remove_node(NodeId(2)).is_none());
    }

    #[test]
    fn test_node_updates() {
        let graph = triangle();
        assert!(graph.set_position(NodeId(1), Vec3::new(5.0, 5.0, 5.0)));
        assert!(graph.set_size(NodeId(1), 4.0));
        assert!(graph.set_color(NodeId(1), Rgba::WHITE));
        assert!(!graph.set_size(NodeId(42), 4.0));

        let node = graph.node(NodeId(1)).expect("Node exists");
        assert_eq!(node.position, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(node.size, 4.0);
        assert_eq!(node.color, Rgba::WHITE);
    }

    #[test]
    fn test_model_exposes_the_same_store() {
        let model = InMemoryGraphModel::new();
        model.store().add_node(Node::new(7, Vec3::ZERO, 1.0));
        assert_eq!(model.graph().node_count(), 1);

        model.store().clear();
        assert_eq!(model.graph().node_count(), 0);
    }
}
